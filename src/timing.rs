/// A beats-per-minute value active from `activation_time` onward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TempoRange {
    pub activation_time: i32,
    pub bpm: i32,
}

/// Extracts tempo ranges from raw `[TimingPoints]` lines, in file order.
///
/// Position 0 is the activation time, position 1 the beat length in
/// milliseconds. Lines with a non-positive beat length are inherited-tempo
/// markers and are skipped rather than converted, so they cannot
/// desynchronize the range list. Optional bpm bounds drop ranges outside
/// them before segmentation ever sees the range.
pub fn extract_tempo_ranges(
    lines: &[&[u8]],
    minimum_bpm: Option<i32>,
    maximum_bpm: Option<i32>,
) -> Vec<TempoRange> {
    lines
        .iter()
        .filter_map(|line| {
            let s = std::str::from_utf8(line).ok()?;
            let mut parts = s.split(',');
            let time = parts.next()?.trim().parse::<f64>().ok()?;
            let beat_length = parts.next()?.trim().parse::<f64>().ok()?;
            if !(beat_length > 0.0) {
                return None;
            }
            let bpm = (60_000.0 / beat_length).round() as i32;
            if minimum_bpm.is_some_and(|min| bpm < min) {
                return None;
            }
            if maximum_bpm.is_some_and(|max| bpm > max) {
                return None;
            }
            Some(TempoRange {
                activation_time: time.round() as i32,
                bpm,
            })
        })
        .collect()
}
