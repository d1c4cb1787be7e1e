//! CSV tables.
//!
//! Creates three files:
//! - `route_truncation.csv` — one `metric,value` row per truncation figure
//! - `congestion_spikes.csv` — one row per detected spike interval
//! - `time_loss_histogram.csv` — one row per shared bucket

use std::path::Path;

use csv::Writer;

use v2x_core::Variant;
use v2x_metrics::truncation::SEVERITY_BINS;
use v2x_metrics::AnalysisReport;

use crate::{ArtifactWriter, RenderResult};

pub const ROUTE_TRUNCATION: &str = "route_truncation.csv";
pub const CONGESTION_SPIKES: &str = "congestion_spikes.csv";
pub const TIME_LOSS_HISTOGRAM: &str = "time_loss_histogram.csv";

/// Writes the three CSV tables.
pub struct TableWriter;

impl ArtifactWriter for TableWriter {
    fn artifacts(&self) -> &'static [&'static str] {
        &[ROUTE_TRUNCATION, CONGESTION_SPIKES, TIME_LOSS_HISTOGRAM]
    }

    fn write(&self, report: &AnalysisReport, dir: &Path) -> RenderResult<()> {
        write_truncation(report, dir)?;
        write_spikes(report, dir)?;
        write_histogram(report, dir)
    }
}

fn write_truncation(report: &AnalysisReport, dir: &Path) -> RenderResult<()> {
    let t = &report.truncation;
    let mut w = Writer::from_path(dir.join(ROUTE_TRUNCATION))?;
    w.write_record(["metric", "value"])?;

    let mut rows: Vec<(String, String)> = vec![
        ("threshold".into(), t.threshold.to_string()),
        ("matched".into(), t.matched.to_string()),
        ("unmatched".into(), t.unmatched.to_string()),
        ("undefined_ratio".into(), t.undefined_ratio.to_string()),
        ("evaluated".into(), t.evaluated.to_string()),
        ("truncated".into(), t.truncated.to_string()),
        ("truncated_ratio".into(), t.truncated_ratio.to_string()),
        ("mean_severity".into(), opt(t.mean_severity)),
        ("intended_logged".into(), t.intended.logged.to_string()),
        ("intended_mean_ratio".into(), opt(t.intended.mean_ratio)),
        ("short_of_intended".into(), t.intended.short_of_intended.to_string()),
    ];
    for (k, &n) in t.severity_histogram.iter().enumerate() {
        let lo = k as f64 / SEVERITY_BINS as f64;
        let hi = (k + 1) as f64 / SEVERITY_BINS as f64;
        rows.push((format!("severity_{lo:.1}_{hi:.1}"), n.to_string()));
    }

    for (metric, value) in &rows {
        w.write_record([metric, value])?;
    }
    w.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn write_spikes(report: &AnalysisReport, dir: &Path) -> RenderResult<()> {
    let mut w = Writer::from_path(dir.join(CONGESTION_SPIKES))?;
    w.write_record(["variant", "start", "end", "duration", "peak_halting", "peak_time"])?;

    for v in Variant::ALL {
        for s in &report.congestion.variant(v).spikes {
            w.write_record(&[
                v.label().to_owned(),
                s.start.0.to_string(),
                s.end.0.to_string(),
                (s.end - s.start).to_string(),
                s.peak_halting.to_string(),
                s.peak_time.0.to_string(),
            ])?;
        }
    }
    w.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn write_histogram(report: &AnalysisReport, dir: &Path) -> RenderResult<()> {
    let t = &report.time_loss;
    let mut w = Writer::from_path(dir.join(TIME_LOSS_HISTOGRAM))?;
    w.write_record(["bucket_start", "bucket_end", "clean", "blocked"])?;

    for (k, edge) in t.edges.windows(2).enumerate() {
        w.write_record(&[
            edge[0].to_string(),
            edge[1].to_string(),
            t.clean.counts[k].to_string(),
            t.blocked.counts[k].to_string(),
        ])?;
    }
    w.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn opt(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
