use crate::rounding::round_2;
use crate::streams::Segment;

/// Acceptance floors for a stream map.
pub const MIN_STREAM_DENSITY: f64 = 0.30;
pub const MIN_AVERAGE_STREAM_LENGTH: i32 = 3;
pub const MIN_SUGGESTED_BPM: i32 = 130;

/// Beatmap-wide tempo-frequency table, folded over the kept segments.
///
/// Built after segmentation instead of mutated during it, so a discarded
/// segment never contributes. First-seen order is preserved.
pub fn tempo_frequency(segments: &[Segment]) -> Vec<(i32, u32)> {
    let mut table: Vec<(i32, u32)> = Vec::new();
    for segment in segments {
        for &(bpm, count) in &segment.tempo_counts {
            match table.iter_mut().find(|e| e.0 == bpm) {
                Some(entry) => entry.1 += count,
                None => table.push((bpm, count)),
            }
        }
    }
    table
}

/// The tempo with the highest count among entries with a positive count.
/// Ties resolve toward the higher tempo value.
pub fn suggested_bpm(table: &[(i32, u32)]) -> Option<i32> {
    table
        .iter()
        .filter(|&&(_, count)| count > 0)
        .max_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)))
        .map(|&(bpm, _)| bpm)
}

/// Fraction of the beatmap's notes that sit inside a kept stream segment,
/// rounded to two decimals. The `+ 1` converts the interval count back to a
/// note count.
pub fn stream_density(table: &[(i32, u32)], interval_count: usize) -> f64 {
    let total: u32 = table.iter().map(|&(_, count)| count).sum();
    round_2(f64::from(total) / (interval_count + 1) as f64)
}

/// Reduces the kept segments to one representative stream length.
///
/// A lone segment is its own answer. Otherwise segments are ranked by hit
/// count and combined under a cubic weighting that favors the longest runs
/// while shorter secondary runs still pull the figure down.
pub fn average_stream_length(segments: &[Segment]) -> i32 {
    match segments {
        [] => 0,
        [only] => only.hit_count as i32,
        _ => {
            let mut counts: Vec<u32> = segments.iter().map(|s| s.hit_count).collect();
            counts.sort_unstable_by(|a, b| b.cmp(a));
            let n = counts.len() as f64;
            let weight = 1.0 / (n - 1.0);
            let acc: f64 = counts
                .iter()
                .enumerate()
                .map(|(i, &hits)| f64::from(hits).powi(3) * (1.0 - weight * i as f64) * 2.0 / n)
                .sum();
            acc.cbrt().round() as i32
        }
    }
}
