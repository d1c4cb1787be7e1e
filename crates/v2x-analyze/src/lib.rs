//! `v2x-analyze` — runs the whole comparison for one scenario.
//!
//! ```text
//! resolve + load (v2x-dataset / v2x-logs)
//!     → consistency check (v2x-dataset)
//!     → metrics (v2x-metrics)
//!     → artifacts (v2x-report)
//! ```
//!
//! Each stage runs only if the previous one succeeded.  [`run`] returns the
//! failure together with the [`Stage`] it came from; [`analyze`] maps it to
//! the process exit code:
//!
//! | Code | Meaning                                            |
//! |------|----------------------------------------------------|
//! | 0    | success                                            |
//! | 1    | bad configuration, missing or unparseable log      |
//! | 2    | Clean and Blocked runs do not share their demand   |
//! | 3    | an artifact could not be written                   |

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use log::{error, info};
use thiserror::Error;

use v2x_core::{AnalysisConfig, CoreError};
use v2x_dataset::{DatasetError, ScenarioDataset};
use v2x_metrics::{EngineError, OverlapRecord};
use v2x_report::{RenderError, SummaryRecord};


pub const EXIT_OK: u8 = 0;
pub const EXIT_INPUT: u8 = 1;
pub const EXIT_INCONSISTENT: u8 = 2;
pub const EXIT_RENDER: u8 = 3;

/// Pipeline stages, in execution order.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Stage {
    Configure,
    Load,
    Consistency,
    Analyze,
    Render,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Configure => "configure",
            Stage::Load => "load",
            Stage::Consistency => "consistency",
            Stage::Analyze => "analyze",
            Stage::Render => "render",
        })
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot read config file {}: {source}", .path.display())]
    ConfigFile {
        path:   PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", .path.display())]
    ConfigParse {
        path:   PathBuf,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Config(#[from] CoreError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl PipelineError {
    /// The stage that failed.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::ConfigFile { .. }
            | PipelineError::ConfigParse { .. }
            | PipelineError::Config(_)
            | PipelineError::Dataset(DatasetError::Config(_)) => Stage::Configure,
            PipelineError::Dataset(DatasetError::InconsistentScenario { .. }) => Stage::Consistency,
            PipelineError::Dataset(_) => Stage::Load,
            PipelineError::Engine(_) => Stage::Analyze,
            PipelineError::Render(_) => Stage::Render,
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self.stage() {
            Stage::Consistency => EXIT_INCONSISTENT,
            Stage::Render => EXIT_RENDER,
            Stage::Configure | Stage::Load | Stage::Analyze => EXIT_INPUT,
        }
    }
}

/// What a successful run produced.
#[derive(Clone, Debug)]
pub struct AnalysisOutcome {
    pub scenario:  String,
    pub overlap:   OverlapRecord,
    /// Written artifacts, in write order.
    pub artifacts: Vec<PathBuf>,
    pub summary:   SummaryRecord,
}

/// Read an [`AnalysisConfig`] from a JSON file.  Missing keys keep their
/// defaults; unknown keys are rejected.
pub fn load_config(path: &Path) -> Result<AnalysisConfig, PipelineError> {
    let text = fs::read_to_string(path).map_err(|source| PipelineError::ConfigFile {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| PipelineError::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Run every stage for `scenario`, writing artifacts under `output_dir`.
pub fn run(
    scenario:   &str,
    logs_root:  &Path,
    output_dir: &Path,
    config:     &AnalysisConfig,
) -> Result<AnalysisOutcome, PipelineError> {
    config.validate()?;

    info!("{scenario}: loading logs from {}", logs_root.display());
    let dataset = ScenarioDataset::build(scenario, logs_root, config.min_overlap_ratio)?;

    info!("{scenario}: computing metrics");
    let report = v2x_metrics::run_all(&dataset, config)?;

    info!("{scenario}: rendering to {}", output_dir.display());
    let artifacts = v2x_report::render(&report, output_dir)?;

    Ok(AnalysisOutcome {
        scenario: report.scenario.clone(),
        overlap: report.overlap,
        summary: SummaryRecord::from_report(&report),
        artifacts,
    })
}

/// [`run`], reduced to a process exit code.  Failures are logged with their
/// stage.
pub fn analyze(scenario: &str, logs_root: &Path, output_dir: &Path, config: &AnalysisConfig) -> u8 {
    match run(scenario, logs_root, output_dir, config) {
        Ok(outcome) => {
            info!(
                "{}: done, {} artifacts in {}",
                outcome.scenario,
                outcome.artifacts.len(),
                output_dir.display()
            );
            EXIT_OK
        }
        Err(e) => {
            error!("{scenario}: {} stage failed: {e}", e.stage());
            e.exit_code()
        }
    }
}
