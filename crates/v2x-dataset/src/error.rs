use std::path::PathBuf;

use thiserror::Error;

use v2x_core::{CoreError, Variant};
use v2x_logs::LogError;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("log directory {} does not exist", .path.display())]
    LogsDirNotFound { path: PathBuf },

    #[error("no {variant} {kind} log for scenario {scenario:?} (searched {})", display_paths(.searched))]
    MissingLog {
        scenario: String,
        variant:  Variant,
        kind:     &'static str,
        searched: Vec<PathBuf>,
    },

    #[error(transparent)]
    Log(#[from] LogError),

    #[error("{got} log passed where the {expected} log was expected")]
    VariantMismatch { expected: Variant, got: Variant },

    #[error(
        "scenario {scenario:?} is inconsistent: vehicle-id overlap {overlap:.3} is below the \
         minimum {min_overlap:.3} ({clean_only} vehicles only in Clean, {blocked_only} only in Blocked)"
    )]
    InconsistentScenario {
        scenario:     String,
        overlap:      f64,
        min_overlap:  f64,
        clean_only:   usize,
        blocked_only: usize,
    },

    #[error(transparent)]
    Config(#[from] CoreError),
}

pub type DatasetResult<T> = Result<T, DatasetError>;

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
