//! The `ArtifactWriter` trait implemented by every artifact backend.

use std::path::Path;

use v2x_metrics::AnalysisReport;

use crate::RenderResult;

/// A backend that writes a fixed set of files derived from one report.
pub trait ArtifactWriter {
    /// File names this writer creates, in the order it creates them.
    fn artifacts(&self) -> &'static [&'static str];

    /// Write every file in [`artifacts`][Self::artifacts] into `dir`.
    ///
    /// `dir` is a private staging directory; implementations may create
    /// files there freely and need no cleanup on error.
    fn write(&self, report: &AnalysisReport, dir: &Path) -> RenderResult<()>;
}
