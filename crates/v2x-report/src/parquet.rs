//! Parquet output backend (feature `parquet`).
//!
//! Creates `rerouting_deltas.parquet`: one row per rerouted vehicle found in
//! both variants, sorted by vehicle id.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Float64Builder, StringBuilder, UInt32Builder};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;

use v2x_metrics::AnalysisReport;

use crate::{ArtifactWriter, RenderError, RenderResult};

pub const REROUTING_DELTAS: &str = "rerouting_deltas.parquet";

fn delta_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("vehicle_id",        DataType::Utf8,    false),
        Field::new("reroute_count",     DataType::UInt32,  false),
        Field::new("clean_time_loss",   DataType::Float64, false),
        Field::new("blocked_time_loss", DataType::Float64, false),
        Field::new("delta",             DataType::Float64, false),
    ]))
}

fn snappy_props() -> WriterProperties {
    WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build()
}

/// Writes the per-vehicle rerouting join table.
pub struct ParquetWriter;

impl ArtifactWriter for ParquetWriter {
    fn artifacts(&self) -> &'static [&'static str] {
        &[REROUTING_DELTAS]
    }

    fn write(&self, report: &AnalysisReport, dir: &Path) -> RenderResult<()> {
        let schema = delta_schema();

        let mut ids          = StringBuilder::new();
        let mut reroutes     = UInt32Builder::new();
        let mut clean_loss   = Float64Builder::new();
        let mut blocked_loss = Float64Builder::new();
        let mut deltas       = Float64Builder::new();

        for d in &report.rerouting.deltas {
            ids.append_value(d.id.as_str());
            reroutes.append_value(d.reroute_count);
            clean_loss.append_value(d.clean_time_loss);
            blocked_loss.append_value(d.blocked_time_loss);
            deltas.append_value(d.delta);
        }

        let batch = RecordBatch::try_new(
            Arc::clone(&schema),
            vec![
                Arc::new(ids.finish()),
                Arc::new(reroutes.finish()),
                Arc::new(clean_loss.finish()),
                Arc::new(blocked_loss.finish()),
                Arc::new(deltas.finish()),
            ],
        )?;

        let path = dir.join(REROUTING_DELTAS);
        let file = File::create(&path).map_err(RenderError::io(&path))?;
        let mut writer = ArrowWriter::try_new(file, schema, Some(snappy_props()))?;
        writer.write(&batch)?;
        writer.close()?;
        Ok(())
    }
}
