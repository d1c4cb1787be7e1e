//! v2x-analyze — compare the Clean and Blocked runs of one scenario.
//!
//! ```text
//! v2x-analyze Downtown --logs-root runs --output-dir reports/Downtown
//! RUST_LOG=debug v2x-analyze Downtown --config thresholds.json --spike-factor 3
//! ```
//!
//! Flags override values from `--config`, which override the defaults.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::error;

use v2x_analyze::{analyze, load_config, PipelineError};
use v2x_core::AnalysisConfig;

#[derive(Parser, Debug)]
#[command(version, about = "Traffic-impact comparison of a malicious-RSU scenario")]
struct Args {
    /// Scenario name; logs are read from `<logs-root>/<scenario>-logs/`.
    scenario: String,

    /// Directory containing the `<scenario>-logs/` folders.
    #[arg(long, value_name = "DIR", default_value = ".")]
    logs_root: PathBuf,

    /// Where artifacts are written.  Default: `<scenario>-report`.
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// JSON file with analysis thresholds.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Rolling-median baseline window, in seconds.
    #[arg(long, value_name = "SECS")]
    spike_window: Option<f64>,

    /// Halting count must exceed the baseline by this factor to spike.
    #[arg(long, value_name = "FACTOR")]
    spike_factor: Option<f64>,

    /// Lower clamp on the baseline, in vehicles.  Off (0) by default.
    #[arg(long, value_name = "VEHICLES")]
    min_baseline: Option<f64>,

    /// Time-loss histogram bucket width, in seconds.
    #[arg(long, value_name = "SECS")]
    loss_hist_bucket: Option<f64>,

    /// Blocked/Clean length ratio below which an unfinished route is truncated.
    #[arg(long, value_name = "RATIO")]
    truncation_ratio: Option<f64>,

    /// Minimum vehicle-id overlap between the two runs.
    #[arg(long, value_name = "RATIO")]
    min_overlap_ratio: Option<f64>,
}

impl Args {
    fn analysis_config(&self) -> Result<AnalysisConfig, PipelineError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => AnalysisConfig::default(),
        };

        let overrides = [
            (self.spike_window, &mut config.spike_window_secs),
            (self.spike_factor, &mut config.spike_factor),
            (self.min_baseline, &mut config.min_baseline),
            (self.loss_hist_bucket, &mut config.loss_hist_bucket_secs),
            (self.truncation_ratio, &mut config.truncation_ratio),
            (self.min_overlap_ratio, &mut config.min_overlap_ratio),
        ];
        for (flag, field) in overrides {
            if let Some(value) = flag {
                *field = value;
            }
        }
        Ok(config)
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}-report", args.scenario)));

    let config = match args.analysis_config() {
        Ok(config) => config,
        Err(e) => {
            error!("{}: {} stage failed: {e}", args.scenario, e.stage());
            return ExitCode::from(e.exit_code());
        }
    };

    ExitCode::from(analyze(&args.scenario, &args.logs_root, &output_dir, &config))
}
