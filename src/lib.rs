pub mod beatmap;
pub mod error;
pub mod notes;
pub mod parse;
pub mod rating;
pub mod report;
pub mod rounding;
pub mod stats;
pub mod streams;
pub mod timing;

// Re-export the primary data structures for library users
pub use error::{Error, Result};
pub use rating::{DOUBLE_TIME_RATE, DifficultyCalculator, DifficultyRating};
pub use report::{BeatmapSummary, Outcome, Rejection, StatisticsRecord};

use std::path::Path;

use crate::report::SegmentSummary;
use crate::rounding::{round_1, round_2};

/// Options for controlling beatmap analysis.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnalyzeOptions {
    /// Tempo ranges below this bpm are not eligible for stream detection.
    pub minimum_bpm: Option<i32>,
    /// Tempo ranges above this bpm are not eligible for stream detection.
    pub maximum_bpm: Option<i32>,
    /// Star rating from catalog metadata; the raw file carries none.
    pub stars: Option<f64>,
    /// Overrides the drain length computed from the hit objects.
    pub drain_length_s: Option<u32>,
}

/// Runs the stream-detection pipeline over a beatmap's raw bytes.
///
/// Malformed content truncates extraction and is absorbed; the only
/// outcomes are an accepted summary or an explicit rejection naming the
/// failed floor.
pub fn analyze(data: &[u8], options: AnalyzeOptions) -> Outcome {
    let sections = parse::extract_sections(data);
    let fields = parse::parse_difficulty_fields(&sections.difficulty);
    let ranges = timing::extract_tempo_ranges(
        &sections.timing_points,
        options.minimum_bpm,
        options.maximum_bpm,
    );
    let events = notes::parse_hit_events(&sections.hit_objects);
    let intervals = notes::build_intervals(&events);
    log::debug!(
        "{} tempo ranges, {} hit objects, {} intervals",
        ranges.len(),
        events.len(),
        intervals.len()
    );

    let segments = streams::segment_streams(&intervals, &ranges, fields.circle_size);
    if segments.is_empty() {
        return Outcome::Rejected(Rejection::NoStreams);
    }

    let table = stats::tempo_frequency(&segments);
    let density = stats::stream_density(&table, intervals.len());
    if density < stats::MIN_STREAM_DENSITY {
        return Outcome::Rejected(Rejection::LowDensity { density });
    }

    let average = stats::average_stream_length(&segments);
    if average < stats::MIN_AVERAGE_STREAM_LENGTH {
        return Outcome::Rejected(Rejection::ShortStreams { average });
    }

    // Non-empty segment list guarantees a populated table.
    let bpm = stats::suggested_bpm(&table).unwrap_or(0);
    if bpm < stats::MIN_SUGGESTED_BPM {
        return Outcome::Rejected(Rejection::LowTempo { bpm });
    }

    let base = StatisticsRecord {
        bpm,
        length_s: options
            .drain_length_s
            .unwrap_or_else(|| notes::drain_length_s(&events)),
        average_stream_length: average,
        stream_density: density,
        ar: round_1(fields.approach_rate),
        od: round_1(fields.overall_difficulty),
        stars: round_2(options.stars.unwrap_or(0.0)),
    };
    let segments = segments
        .iter()
        .map(|s| SegmentSummary {
            hit_count: s.hit_count,
            dominant_bpm: s.dominant_tempo().map_or(0, |(bpm, _)| bpm),
        })
        .collect();

    Outcome::Accepted(BeatmapSummary {
        base,
        double_time: None,
        segments,
        interval_count: intervals.len(),
    })
}

/// Opens a beatmap, analyzes it, and attaches the double-time record when
/// a calculator is supplied and the base record is accepted.
///
/// A calculator failure fails the whole beatmap: no partial record pair is
/// ever returned.
pub fn analyze_file(
    path: impl AsRef<Path>,
    options: AnalyzeOptions,
    calculator: Option<&dyn DifficultyCalculator>,
) -> Result<Outcome> {
    let path = path.as_ref();
    let opened = beatmap::open(path)?;
    let mut outcome = analyze(&opened.data, options);
    if let Outcome::Accepted(summary) = &mut outcome
        && let Some(calculator) = calculator
    {
        let rating = calculator.compute(path, DOUBLE_TIME_RATE)?;
        summary.double_time = Some(rating::double_time_record(&summary.base, rating));
    }
    Ok(outcome)
}
