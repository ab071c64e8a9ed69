use crate::stats::{MIN_AVERAGE_STREAM_LENGTH, MIN_STREAM_DENSITY, MIN_SUGGESTED_BPM};

/// The compact statistics record emitted per beatmap variant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatisticsRecord {
    pub bpm: i32,
    pub length_s: u32,
    pub average_stream_length: i32,
    pub stream_density: f64,
    pub ar: f64,
    pub od: f64,
    pub stars: f64,
}

/// One kept stream run, reduced to what the report shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentSummary {
    pub hit_count: u32,
    pub dominant_bpm: i32,
}

/// Everything the pipeline produces for an accepted beatmap.
#[derive(Debug, Clone, PartialEq)]
pub struct BeatmapSummary {
    pub base: StatisticsRecord,
    pub double_time: Option<StatisticsRecord>,
    pub segments: Vec<SegmentSummary>,
    pub interval_count: usize,
}

/// Why a beatmap fell below the acceptance floors. A normal outcome, not
/// an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rejection {
    NoStreams,
    LowDensity { density: f64 },
    ShortStreams { average: i32 },
    LowTempo { bpm: i32 },
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::NoStreams => write!(f, "no stream segments found"),
            Self::LowDensity { density } => {
                write!(f, "stream density {density:.2} below {MIN_STREAM_DENSITY}")
            }
            Self::ShortStreams { average } => write!(
                f,
                "average stream length {average} below {MIN_AVERAGE_STREAM_LENGTH}"
            ),
            Self::LowTempo { bpm } => {
                write!(f, "suggested bpm {bpm} below {MIN_SUGGESTED_BPM}")
            }
        }
    }
}

/// Binary pipeline outcome: a record pair, or an explicit rejection.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Accepted(BeatmapSummary),
    Rejected(Rejection),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
    Pretty,
    JSON,
}

pub fn print_summary(summary: &BeatmapSummary, mode: OutputMode) {
    match mode {
        OutputMode::Pretty => print_pretty(summary),
        OutputMode::JSON => print_json(summary),
    }
}

pub fn print_rejection(rejection: &Rejection, mode: OutputMode) {
    match mode {
        OutputMode::Pretty => println!("Not a stream map: {rejection}"),
        OutputMode::JSON => println!("{{\n  \"rejected\": \"{rejection}\"\n}}"),
    }
}

fn format_duration(seconds: u32) -> String {
    format!("{}m {:02}s", seconds / 60, seconds % 60)
}

fn print_pretty(summary: &BeatmapSummary) {
    println!("--- Stream Statistics ---");
    print_pretty_record(&summary.base);
    let runs: Vec<String> = summary
        .segments
        .iter()
        .map(|s| format!("{}@{}", s.hit_count, s.dominant_bpm))
        .collect();
    println!("Streams: {}", runs.join(" "));

    if let Some(dt) = &summary.double_time {
        println!("\n--- Double-Time ---");
        print_pretty_record(dt);
    }
}

fn print_pretty_record(record: &StatisticsRecord) {
    println!("BPM: {}", record.bpm);
    println!("Length: {}", format_duration(record.length_s));
    println!("Average Stream Length: {}", record.average_stream_length);
    println!("Stream Density: {:.2}", record.stream_density);
    println!(
        "AR: {:.1}  OD: {:.1}  Stars: {:.2}",
        record.ar, record.od, record.stars
    );
}

fn print_record_fields(record: &StatisticsRecord, indent: usize) {
    let pad = " ".repeat(indent);
    println!("{pad}\"suggested_bpm\": {},", record.bpm);
    println!("{pad}\"length_s\": {},", record.length_s);
    println!(
        "{pad}\"average_stream_length\": {},",
        record.average_stream_length
    );
    println!("{pad}\"stream_density\": {:.2},", record.stream_density);
    println!("{pad}\"ar\": {:.1},", record.ar);
    println!("{pad}\"od\": {:.1},", record.od);
    println!("{pad}\"stars\": {:.2}", record.stars);
}

fn print_json(summary: &BeatmapSummary) {
    println!("{{");
    println!("  \"base\": {{");
    print_record_fields(&summary.base, 4);
    println!("  }},");
    match &summary.double_time {
        Some(dt) => {
            println!("  \"double_time\": {{");
            print_record_fields(dt, 4);
            println!("  }},");
        }
        None => println!("  \"double_time\": null,"),
    }
    println!("  \"interval_count\": {},", summary.interval_count);
    let runs: Vec<String> = summary
        .segments
        .iter()
        .map(|s| format!("{{\"hits\": {}, \"bpm\": {}}}", s.hit_count, s.dominant_bpm))
        .collect();
    println!("  \"segments\": [{}]", runs.join(", "));
    println!("}}");
}
