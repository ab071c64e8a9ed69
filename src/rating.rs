use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::report::StatisticsRecord;
use crate::rounding::{round_1, round_2};

/// Rate multiplier of the double-time modifier.
pub const DOUBLE_TIME_RATE: f64 = 1.5;

/// Difficulty figures produced by the external calculator.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DifficultyRating {
    pub ar: f64,
    pub od: f64,
    pub stars: f64,
}

/// Capability boundary around the external difficulty calculator, so the
/// pipeline can be driven by a deterministic stub in tests.
pub trait DifficultyCalculator {
    fn compute(&self, beatmap: &Path, rate: f64) -> Result<DifficultyRating>;
}

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Invokes a difficulty calculator binary as
/// `<binary> <beatmap> --rate <rate>` and decodes its JSON stdout.
///
/// The call is blocking and out-of-process; a deadline bounds it, and a
/// hang or non-zero exit is a failure for the whole beatmap. No retries
/// happen here; the batch layer owns that decision.
pub struct ToolCalculator {
    binary: PathBuf,
    timeout: Duration,
}

impl ToolCalculator {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: Duration::from_secs(30),
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl DifficultyCalculator for ToolCalculator {
    fn compute(&self, beatmap: &Path, rate: f64) -> Result<DifficultyRating> {
        let mut child = Command::new(&self.binary)
            .arg(beatmap)
            .arg("--rate")
            .arg(format!("{rate}"))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| Error::ToolLaunch {
                path: self.binary.clone(),
                source,
            })?;

        let deadline = Instant::now() + self.timeout;
        loop {
            if child.try_wait()?.is_some() {
                break;
            }
            if Instant::now() >= deadline {
                log::warn!("difficulty calculator exceeded {:?}, killing", self.timeout);
                let _ = child.kill();
                let _ = child.wait();
                return Err(Error::ToolTimeout(self.timeout));
            }
            thread::sleep(POLL_INTERVAL);
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(Error::ToolExit {
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(serde_json::from_slice(&output.stdout)?)
    }
}

/// Derives the double-time record from an accepted base record.
///
/// Tempo scales by the fixed 1.5x rate and the drain length compresses to
/// 2/3; the difficulty figures come from the external calculator, never
/// from a local recomputation.
pub fn double_time_record(base: &StatisticsRecord, rating: DifficultyRating) -> StatisticsRecord {
    StatisticsRecord {
        bpm: (f64::from(base.bpm) * DOUBLE_TIME_RATE).round() as i32,
        length_s: (f64::from(base.length_s) * 2.0 / 3.0).round() as u32,
        average_stream_length: base.average_stream_length,
        stream_density: base.stream_density,
        ar: round_1(rating.ar),
        od: round_1(rating.od),
        stars: round_2(rating.stars),
    }
}
