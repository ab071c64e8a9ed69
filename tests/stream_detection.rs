use std::fmt::Write as _;
use std::path::Path;

use rosd::rating::{DifficultyCalculator, DifficultyRating, double_time_record};
use rosd::report::{Rejection, StatisticsRecord};
use rosd::{AnalyzeOptions, Outcome, analyze, analyze_file};

/// 180 BPM quarter-note streams sit 83ms apart (rounded down from 83.33).
const STREAM_GAP_MS: i32 = 83;

fn beatmap(timing_points: &str, objects: &[(i32, i32, i32)]) -> Vec<u8> {
    let mut out = String::from(
        "osu file format v14\n\
\n\
[General]\n\
AudioFilename: audio.mp3\n\
Mode: 0\n\
\n\
[Difficulty]\n\
HPDrainRate:5\n\
CircleSize:4\n\
OverallDifficulty:8.5\n\
ApproachRate:9\n\
SliderMultiplier:1.7\n\
SliderTickRate:1\n\
\n\
[TimingPoints]\n",
    );
    out.push_str(timing_points);
    out.push_str("\n\n[HitObjects]\n");
    for &(x, y, t) in objects {
        let _ = writeln!(out, "{x},{y},{t},1,0,0:0:0:0:");
    }
    out.into_bytes()
}

/// `count` notes starting at `start_ms`, one stream gap and 10px apart.
fn stream_run(start_ms: i32, count: i32, x0: i32, y: i32) -> Vec<(i32, i32, i32)> {
    (0..count)
        .map(|i| (x0 + i * 10, y, start_ms + i * STREAM_GAP_MS))
        .collect()
}

const TP_180: &str = "0,333.333333,4,2,0,60,1,0";

fn accepted(outcome: Outcome) -> rosd::BeatmapSummary {
    match outcome {
        Outcome::Accepted(summary) => summary,
        Outcome::Rejected(rejection) => panic!("expected acceptance, got: {rejection}"),
    }
}

#[test]
fn uniform_stream_classifies_as_one_full_density_segment() {
    let data = beatmap(TP_180, &stream_run(0, 21, 100, 192));
    let summary = accepted(analyze(&data, AnalyzeOptions::default()));

    assert_eq!(summary.segments.len(), 1);
    assert_eq!(summary.segments[0].hit_count, 21);
    assert_eq!(summary.segments[0].dominant_bpm, 180);
    assert_eq!(summary.interval_count, 20);
    assert_eq!(summary.base.bpm, 180);
    assert_eq!(summary.base.stream_density, 1.0);
    assert_eq!(summary.base.average_stream_length, 21);
    assert_eq!(summary.base.ar, 9.0);
    assert_eq!(summary.base.od, 8.5);
    assert!(summary.double_time.is_none());
}

#[test]
fn two_runs_reduce_by_the_cubic_rank_formula() {
    let mut objects = stream_run(0, 10, 100, 192);
    objects.extend(stream_run(3000, 20, 100, 50));
    let data = beatmap(TP_180, &objects);
    let summary = accepted(analyze(&data, AnalyzeOptions::default()));

    let hits: Vec<u32> = summary.segments.iter().map(|s| s.hit_count).collect();
    assert_eq!(hits, vec![10, 20]);
    assert_eq!(summary.interval_count, 29);
    assert_eq!(summary.base.stream_density, 1.0);

    // round(cbrt(20^3 * (1 - 0) * 2/2 + 10^3 * (1 - 0.5) * 2/2))
    let expected = (20f64.powi(3) * (1.0 - 0.0) * 2.0 / 2.0
        + 10f64.powi(3) * (1.0 - 0.5) * 2.0 / 2.0)
        .cbrt()
        .round() as i32;
    assert_eq!(summary.base.average_stream_length, expected);
    assert_eq!(expected, 20);
}

#[test]
fn sub_three_hit_bursts_contribute_nothing() {
    let mut objects = stream_run(0, 21, 100, 192);
    // A two-note burst: one stream interval, two hits, below the floor.
    objects.extend(stream_run(10_000, 2, 100, 50));
    let data = beatmap(TP_180, &objects);
    let summary = accepted(analyze(&data, AnalyzeOptions::default()));

    assert_eq!(summary.segments.len(), 1);
    assert_eq!(summary.segments[0].hit_count, 21);
    // 20 run intervals + the gap + the burst interval.
    assert_eq!(summary.interval_count, 22);
    // Had the burst leaked into the table this would read 1.0.
    assert_eq!(summary.base.stream_density, 0.91);
}

#[test]
fn density_at_the_floor_is_accepted() {
    let mut objects = stream_run(0, 3, 100, 192);
    // Seven half-beat notes: six more intervals, none classified.
    objects.extend((0..7).map(|i| (100 + i * 10, 300, 1000 + i * 500)));
    let data = beatmap(TP_180, &objects);
    let summary = accepted(analyze(&data, AnalyzeOptions::default()));

    assert_eq!(summary.interval_count, 9);
    assert_eq!(summary.base.stream_density, 0.3);
    assert_eq!(summary.base.average_stream_length, 3);
}

#[test]
fn sparse_maps_reject_on_density() {
    let mut objects = stream_run(0, 4, 100, 192);
    objects.extend((0..30).map(|i| (100 + (i % 20) * 10, 300, 1000 + i * 500)));
    let data = beatmap(TP_180, &objects);

    match analyze(&data, AnalyzeOptions::default()) {
        Outcome::Rejected(Rejection::LowDensity { density }) => assert_eq!(density, 0.12),
        other => panic!("expected density rejection, got {other:?}"),
    }
}

#[test]
fn slow_maps_reject_on_suggested_bpm() {
    // 120 BPM: quarter notes 125ms apart imply 480, inside the tempo window.
    let objects: Vec<_> = (0..21).map(|i| (100 + i * 10, 192, i * 125)).collect();
    let data = beatmap("0,500,4,2,0,60,1,0", &objects);

    match analyze(&data, AnalyzeOptions::default()) {
        Outcome::Rejected(Rejection::LowTempo { bpm }) => assert_eq!(bpm, 120),
        other => panic!("expected tempo rejection, got {other:?}"),
    }
}

#[test]
fn streamless_maps_reject_outright() {
    let objects: Vec<_> = (0..16).map(|i| (100 + (i % 20) * 10, 192, i * 500)).collect();
    let data = beatmap(TP_180, &objects);
    assert_eq!(
        analyze(&data, AnalyzeOptions::default()),
        Outcome::Rejected(Rejection::NoStreams)
    );
}

#[test]
fn bpm_bounds_make_ranges_ineligible() {
    let data = beatmap(TP_180, &stream_run(0, 21, 100, 192));
    let options = AnalyzeOptions {
        minimum_bpm: Some(200),
        ..Default::default()
    };
    assert_eq!(
        analyze(&data, options),
        Outcome::Rejected(Rejection::NoStreams)
    );
}

#[test]
fn inherited_timing_lines_do_not_desynchronize() {
    let timing = "0,333.333333,4,2,0,60,1,0\n500,-100,4,2,0,60,0,0";
    let data = beatmap(timing, &stream_run(0, 21, 100, 192));
    let summary = accepted(analyze(&data, AnalyzeOptions::default()));
    assert_eq!(summary.base.bpm, 180);
    assert_eq!(summary.base.stream_density, 1.0);
}

#[test]
fn malformed_hit_object_flushes_partial_results() {
    let mut data = beatmap(TP_180, &stream_run(0, 21, 100, 192));
    data.extend_from_slice(b"corrupted line\n310,192,2000,1,0,0:0:0:0:\n");
    let summary = accepted(analyze(&data, AnalyzeOptions::default()));
    // Everything before the corrupt line survives, everything after is gone.
    assert_eq!(summary.interval_count, 20);
    assert_eq!(summary.base.average_stream_length, 21);
}

#[test]
fn analysis_is_idempotent() {
    let mut objects = stream_run(0, 10, 100, 192);
    objects.extend(stream_run(3000, 20, 100, 50));
    let data = beatmap(TP_180, &objects);

    let first = analyze(&data, AnalyzeOptions::default());
    let second = analyze(&data, AnalyzeOptions::default());
    assert_eq!(first, second);
}

struct StubCalculator(DifficultyRating);

impl DifficultyCalculator for StubCalculator {
    fn compute(&self, _beatmap: &Path, _rate: f64) -> rosd::Result<DifficultyRating> {
        Ok(self.0)
    }
}

#[test]
fn double_time_rescale_is_independent_of_the_calculator() {
    let base = StatisticsRecord {
        bpm: 180,
        length_s: 90,
        average_stream_length: 21,
        stream_density: 1.0,
        ar: 9.0,
        od: 8.5,
        stars: 5.0,
    };
    for stars in [1.11, 6.66, 9.99] {
        let dt = double_time_record(
            &base,
            DifficultyRating {
                ar: 10.0,
                od: 9.5,
                stars,
            },
        );
        assert_eq!(dt.bpm, 270);
        assert_eq!(dt.length_s, 60);
    }
}

#[test]
fn accepted_file_gets_a_double_time_record() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stream.osu");
    std::fs::write(&path, beatmap(TP_180, &stream_run(0, 21, 100, 192))).unwrap();

    let stub = StubCalculator(DifficultyRating {
        ar: 10.333,
        od: 10.08,
        stars: 6.8149,
    });
    let options = AnalyzeOptions {
        stars: Some(5.0),
        drain_length_s: Some(90),
        ..Default::default()
    };
    let outcome = analyze_file(&path, options, Some(&stub)).unwrap();
    let summary = accepted(outcome);

    assert_eq!(summary.base.length_s, 90);
    let dt = summary.double_time.expect("double-time record");
    assert_eq!(dt.bpm, 270);
    assert_eq!(dt.length_s, 60);
    assert_eq!(dt.ar, 10.3);
    assert_eq!(dt.od, 10.1);
    assert_eq!(dt.stars, 6.81);
    assert_eq!(dt.average_stream_length, summary.base.average_stream_length);
}

#[test]
fn rejected_file_never_calls_the_calculator() {
    struct PanicCalculator;
    impl DifficultyCalculator for PanicCalculator {
        fn compute(&self, _: &Path, _: f64) -> rosd::Result<DifficultyRating> {
            panic!("calculator must not run for rejected maps");
        }
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("slow.osu");
    let objects: Vec<_> = (0..16).map(|i| (100 + (i % 20) * 10, 192, i * 500)).collect();
    std::fs::write(&path, beatmap(TP_180, &objects)).unwrap();

    let outcome = analyze_file(&path, AnalyzeOptions::default(), Some(&PanicCalculator)).unwrap();
    assert_eq!(outcome, Outcome::Rejected(Rejection::NoStreams));
}

#[cfg(unix)]
mod tool {
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    use rosd::Error;
    use rosd::rating::{
        DOUBLE_TIME_RATE, DifficultyCalculator, DifficultyRating, ToolCalculator,
    };

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn tool_output_is_decoded_from_json_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let tool = script(
            dir.path(),
            "calc.sh",
            r#"echo '{"ar": 10.3, "od": 10.1, "stars": 7.42}'"#,
        );
        let rating = ToolCalculator::new(&tool)
            .compute(Path::new("map.osu"), DOUBLE_TIME_RATE)
            .unwrap();
        assert_eq!(
            rating,
            DifficultyRating {
                ar: 10.3,
                od: 10.1,
                stars: 7.42
            }
        );
    }

    #[test]
    fn tool_exit_codes_fail_the_beatmap() {
        let dir = tempfile::tempdir().unwrap();
        let tool = script(dir.path(), "calc.sh", "echo 'no such map' >&2\nexit 3");
        let err = ToolCalculator::new(&tool)
            .compute(Path::new("map.osu"), DOUBLE_TIME_RATE)
            .unwrap_err();
        match err {
            Error::ToolExit { stderr, .. } => assert_eq!(stderr, "no such map"),
            other => panic!("expected exit failure, got {other}"),
        }
    }

    #[test]
    fn tool_garbage_output_fails_the_beatmap() {
        let dir = tempfile::tempdir().unwrap();
        let tool = script(dir.path(), "calc.sh", "echo 'not json'");
        let err = ToolCalculator::new(&tool)
            .compute(Path::new("map.osu"), DOUBLE_TIME_RATE)
            .unwrap_err();
        assert!(matches!(err, Error::ToolOutput(_)));
    }

    #[test]
    fn hung_tools_are_killed_at_the_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let tool = script(dir.path(), "calc.sh", "sleep 30");
        let err = ToolCalculator::new(&tool)
            .with_timeout(Duration::from_millis(200))
            .compute(Path::new("map.osu"), DOUBLE_TIME_RATE)
            .unwrap_err();
        assert!(matches!(err, Error::ToolTimeout(_)));
    }

    #[test]
    fn missing_tool_reports_launch_failure() {
        let err = ToolCalculator::new("/nonexistent/calculator")
            .compute(Path::new("map.osu"), DOUBLE_TIME_RATE)
            .unwrap_err();
        assert!(matches!(err, Error::ToolLaunch { .. }));
    }
}
