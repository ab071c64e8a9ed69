use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

/// Failures that abort a beatmap's pipeline run.
///
/// Malformed beatmap content is never represented here: the pipeline
/// truncates extraction at the malformed line and carries on with whatever
/// was accumulated. Only file access and the external difficulty calculator
/// can fail hard.
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to launch difficulty calculator {path:?}: {source}")]
    ToolLaunch {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("difficulty calculator failed ({status}): {stderr}")]
    ToolExit { status: ExitStatus, stderr: String },

    #[error("difficulty calculator timed out after {0:?}")]
    ToolTimeout(Duration),

    #[error("unparsable difficulty calculator output: {0}")]
    ToolOutput(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
