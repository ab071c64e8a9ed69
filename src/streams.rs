use crate::notes::Interval;
use crate::timing::TempoRange;

/// Spacing allowed between two notes, after removing both note radii.
const DISTANCE_THRESHOLD: f64 = 55.0;
/// Effective note radius is `54.4 - 4.48 * circle_size` playfield pixels.
const BASE_RADIUS: f64 = 54.4;
const RADIUS_PER_CS: f64 = 4.48;

/// Segments shorter than this are noise and are dropped outright.
const MIN_SEGMENT_HITS: u32 = 3;
/// Tempo buckets thinner than this are folded into the dominant bucket.
const MIN_BUCKET_COUNT: u32 = 3;

/// A maximal contiguous run of intervals classified as rapid single notes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segment {
    pub hit_count: u32,
    /// Per-tempo hit counts in first-seen order. A `Vec` keeps iteration
    /// deterministic, which the suggested-bpm tie-break relies on.
    pub tempo_counts: Vec<(i32, u32)>,
}

impl Segment {
    fn bump_tempo(&mut self, bpm: i32, n: u32) {
        match self.tempo_counts.iter_mut().find(|e| e.0 == bpm) {
            Some(entry) => entry.1 += n,
            None => self.tempo_counts.push((bpm, n)),
        }
    }

    /// The bucket with the highest count; ties resolve toward the higher
    /// tempo.
    pub fn dominant_tempo(&self) -> Option<(i32, u32)> {
        self.tempo_counts
            .iter()
            .copied()
            .max_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)))
    }

    /// Folds every bucket thinner than [`MIN_BUCKET_COUNT`] into the
    /// dominant bucket. The segment's total count is preserved.
    fn trim(&mut self) {
        let Some((dominant_bpm, _)) = self.dominant_tempo() else {
            return;
        };
        let mut folded = 0;
        self.tempo_counts.retain(|&(bpm, count)| {
            if bpm != dominant_bpm && count < MIN_BUCKET_COUNT {
                folded += count;
                false
            } else {
                true
            }
        });
        if folded > 0
            && let Some(entry) = self.tempo_counts.iter_mut().find(|e| e.0 == dominant_bpm)
        {
            entry.1 += folded;
        }
    }

    pub fn total_count(&self) -> u32 {
        self.tempo_counts.iter().map(|&(_, count)| count).sum()
    }
}

#[inline]
fn is_stream_spacing(distance: f64, circle_size: f64) -> bool {
    distance - 2.0 * (BASE_RADIUS - RADIUS_PER_CS * circle_size) < DISTANCE_THRESHOLD
}

#[inline]
fn is_stream_tempo(implied_bpm: i32, range_bpm: i32) -> bool {
    // The implied tempo may not fall more than 20% of the base tempo below
    // four times that tempo, which normalizes 1/4 subdivisions.
    ((i64::from(range_bpm) * 4 - i64::from(implied_bpm)) as f64) < f64::from(range_bpm) * 0.2
}

fn flush(kept: &mut Vec<Segment>, mut segment: Segment) {
    if segment.hit_count < MIN_SEGMENT_HITS {
        return;
    }
    segment.trim();
    kept.push(segment);
}

/// Walks intervals in order and builds the kept-segment list.
///
/// The active tempo range advances whenever an interval's time exceeds the
/// next range's activation time. An interval classifies as a stream hit iff
/// both the spacing and the tempo test hold; the first hit of a fresh
/// segment counts as 2 to cover the note that opened the pair. A non-hit
/// closes the open segment, which is kept (trimmed) only at
/// [`MIN_SEGMENT_HITS`] or more hits.
pub fn segment_streams(
    intervals: &[Interval],
    ranges: &[TempoRange],
    circle_size: f64,
) -> Vec<Segment> {
    let mut kept = Vec::new();
    if ranges.is_empty() {
        return kept;
    }

    let mut open = Segment::default();
    let mut active = 0usize;

    for interval in intervals {
        while active + 1 < ranges.len() && interval.time > ranges[active + 1].activation_time {
            active += 1;
        }
        let range = ranges[active];

        if is_stream_spacing(interval.distance, circle_size)
            && is_stream_tempo(interval.implied_bpm, range.bpm)
        {
            let inc = if open.hit_count == 0 { 2 } else { 1 };
            open.hit_count += inc;
            open.bump_tempo(range.bpm, inc);
        } else {
            flush(&mut kept, std::mem::take(&mut open));
        }
    }
    flush(&mut kept, open);

    kept
}
