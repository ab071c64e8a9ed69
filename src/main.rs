use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use colored::Colorize;

use rosd::rating::ToolCalculator;
use rosd::report::{self, OutputMode};
use rosd::{AnalyzeOptions, DifficultyCalculator, Outcome};

/// osu! beatmap stream detector
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the .osu beatmap file
    beatmap: PathBuf,

    /// Emit the report as JSON
    #[arg(long)]
    json: bool,

    /// Ignore timing ranges below this BPM
    #[arg(long, value_name = "BPM")]
    min_bpm: Option<i32>,

    /// Ignore timing ranges above this BPM
    #[arg(long, value_name = "BPM")]
    max_bpm: Option<i32>,

    /// Star rating from the catalog, merged into the base record
    #[arg(long)]
    stars: Option<f64>,

    /// External difficulty calculator binary for the double-time record
    #[arg(long, value_name = "PATH")]
    calculator: Option<PathBuf>,

    /// Seconds to wait for the difficulty calculator
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

fn main() -> ExitCode {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .try_init();

    let args = Args::parse();
    let mode = if args.json {
        OutputMode::JSON
    } else {
        OutputMode::Pretty
    };
    let options = AnalyzeOptions {
        minimum_bpm: args.min_bpm,
        maximum_bpm: args.max_bpm,
        stars: args.stars,
        drain_length_s: None,
    };
    let tool = args
        .calculator
        .map(|path| ToolCalculator::new(path).with_timeout(Duration::from_secs(args.timeout_secs)));
    let calculator = tool.as_ref().map(|c| c as &dyn DifficultyCalculator);

    match rosd::analyze_file(&args.beatmap, options, calculator) {
        Ok(Outcome::Accepted(summary)) => {
            report::print_summary(&summary, mode);
            ExitCode::SUCCESS
        }
        Ok(Outcome::Rejected(rejection)) => {
            if mode == OutputMode::Pretty {
                eprintln!("{}", "REJECTED".red().bold());
            }
            report::print_rejection(&rejection, mode);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}
