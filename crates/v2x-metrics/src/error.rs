use thiserror::Error;

use v2x_core::CoreError;

/// Failures of the metric engine.  The analyses themselves are total; the
/// only way to fail is an unusable configuration.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] CoreError),
}

pub type EngineResult<T> = Result<T, EngineError>;
