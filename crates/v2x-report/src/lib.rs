//! `v2x-report` — turns an [`AnalysisReport`] into files on disk.
//!
//! | Module      | Artifacts                                                        |
//! |-------------|------------------------------------------------------------------|
//! | [`charts`]  | `congestion_halting.svg`, `congestion_running.svg`,              |
//! |             | `time_loss_histogram.svg`, `route_truncation_severity.svg`,      |
//! |             | `rerouting_efficiency.svg`, `average_impact.svg`,                |
//! |             | `route_length_comparison.svg`, `impact_timing.svg`               |
//! | [`tables`]  | `route_truncation.csv`, `congestion_spikes.csv`,                 |
//! |             | `time_loss_histogram.csv`                                        |
//! | [`summary`] | `summary.json`, `report.txt`                                     |
//! | `parquet`   | `rerouting_deltas.parquet` (feature `parquet`)                   |
//!
//! Every backend implements [`ArtifactWriter`].  [`render`] runs all of them
//! against a staging directory created inside the output directory and only
//! moves the files into place once every writer has succeeded; on any error,
//! including a rename that fails part-way through promotion, the staging
//! directory is removed and the output directory is left as it was.
//!
//! Output is a pure function of the report: no timestamps, fixed field order
//! and fixed chart geometry, so identical input gives byte-identical files.
//!
//! [`AnalysisReport`]: v2x_metrics::AnalysisReport

pub mod charts;
pub mod error;
pub mod render;
pub mod summary;
pub mod tables;
pub mod writer;

#[cfg(feature = "parquet")]
pub mod parquet;

#[cfg(test)]
mod tests;

pub use charts::ChartWriter;
pub use error::{RenderError, RenderResult};
pub use render::{default_writers, render, render_with};
pub use summary::{SummaryRecord, SummaryWriter};
pub use tables::TableWriter;
pub use writer::ArtifactWriter;

#[cfg(feature = "parquet")]
pub use crate::parquet::ParquetWriter;
