//! Machine-readable `summary.json` and human-readable `report.txt`.

use std::fmt::{self, Write as _};
use std::fs;
use std::path::Path;

use serde::Serialize;

use v2x_core::Variant;
use v2x_metrics::engine::OverlapRecord;
use v2x_metrics::overview::VariantOverview;
use v2x_metrics::stats::Summary;
use v2x_metrics::{AnalysisReport, MetricResult, SpikeInterval};

use crate::{ArtifactWriter, RenderError, RenderResult};

pub const SUMMARY_JSON: &str = "summary.json";
pub const REPORT_TXT: &str = "report.txt";

/// Key figures of one run.  Field order is the JSON key order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SummaryRecord {
    pub scenario:   String,
    pub overlap:    OverlapRecord,
    pub congestion: CongestionSummary,
    pub time_loss:  TimeLossSummary,
    pub truncation: TruncationSummary,
    pub rerouting:  ReroutingSummary,
    pub overview:   OverviewSummary,
    /// The analyses behind the figures above, in run order.
    pub analyses:   Vec<AnalysisEntry>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisEntry {
    pub kind:          &'static str,
    pub computed_from: Vec<Variant>,
}

impl From<MetricResult<'_>> for AnalysisEntry {
    fn from(result: MetricResult<'_>) -> Self {
        Self {
            kind:          result.kind().name(),
            computed_from: result.computed_from().to_vec(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CongestionSummary {
    pub clean:   VariantSpikes,
    pub blocked: VariantSpikes,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VariantSpikes {
    pub baseline_available: bool,
    pub window_samples:     usize,
    pub spike_count:        usize,
    pub peak_halting:       Option<u32>,
    pub spikes:             Vec<SpikeInterval>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimeLossSummary {
    pub bucket_width: f64,
    pub bucket_count: usize,
    pub clean:        VariantLoss,
    pub blocked:      VariantLoss,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VariantLoss {
    pub completed:  usize,
    pub incomplete: usize,
    pub stats:      Option<Summary>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TruncationSummary {
    pub threshold:          f64,
    pub matched:            usize,
    pub unmatched:          usize,
    pub undefined_ratio:    usize,
    pub evaluated:          usize,
    pub truncated:          usize,
    pub truncated_ratio:    f64,
    pub mean_severity:      Option<f64>,
    pub severity_histogram: Vec<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReroutingSummary {
    pub rerouted:        usize,
    pub matched:         usize,
    pub unmatched:       usize,
    pub helped:          usize,
    pub hurt:            usize,
    pub neutral:         usize,
    pub helped_fraction: f64,
    pub hurt_fraction:   f64,
    pub mean_delta:      Option<f64>,
    pub median_delta:    Option<f64>,
    pub mean_ratio:      Option<f64>,
    pub undefined_ratio: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OverviewSummary {
    pub clean:               VariantOverview,
    pub blocked:             VariantOverview,
    pub speed_reduction:     Option<f64>,
    pub speed_reduction_pct: Option<f64>,
    pub added_delay:         Option<f64>,
}

impl SummaryRecord {
    pub fn from_report(report: &AnalysisReport) -> Self {
        let spikes = |v: Variant| {
            let c = report.congestion.variant(v);
            VariantSpikes {
                baseline_available: c.baseline_available,
                window_samples:     c.window_samples,
                spike_count:        c.spikes.len(),
                peak_halting:       c.spikes.iter().map(|s| s.peak_halting).max(),
                spikes:             c.spikes.clone(),
            }
        };
        let loss = |v: Variant| {
            let t = report.time_loss.variant(v);
            VariantLoss { completed: t.completed, incomplete: t.incomplete, stats: t.stats }
        };
        let t = &report.truncation;
        let r = &report.rerouting;
        let o = &report.overview;

        Self {
            scenario: report.scenario.clone(),
            overlap: report.overlap,
            congestion: CongestionSummary {
                clean:   spikes(Variant::Clean),
                blocked: spikes(Variant::Blocked),
            },
            time_loss: TimeLossSummary {
                bucket_width: report.time_loss.bucket_width,
                bucket_count: report.time_loss.edges.len().saturating_sub(1),
                clean:        loss(Variant::Clean),
                blocked:      loss(Variant::Blocked),
            },
            truncation: TruncationSummary {
                threshold:          t.threshold,
                matched:            t.matched,
                unmatched:          t.unmatched,
                undefined_ratio:    t.undefined_ratio,
                evaluated:          t.evaluated,
                truncated:          t.truncated,
                truncated_ratio:    t.truncated_ratio,
                mean_severity:      t.mean_severity,
                severity_histogram: t.severity_histogram.to_vec(),
            },
            rerouting: ReroutingSummary {
                rerouted:        r.rerouted,
                matched:         r.matched,
                unmatched:       r.unmatched,
                helped:          r.helped,
                hurt:            r.hurt,
                neutral:         r.neutral,
                helped_fraction: r.helped_fraction,
                hurt_fraction:   r.hurt_fraction,
                mean_delta:      r.mean_delta,
                median_delta:    r.median_delta,
                mean_ratio:      r.mean_ratio,
                undefined_ratio: r.undefined_ratio,
            },
            overview: OverviewSummary {
                clean:               o.clean.clone(),
                blocked:             o.blocked.clone(),
                speed_reduction:     o.speed_reduction,
                speed_reduction_pct: o.speed_reduction_pct,
                added_delay:         o.added_delay,
            },
            analyses: report.results().into_iter().map(AnalysisEntry::from).collect(),
        }
    }
}

/// Writes `summary.json` and `report.txt`.
pub struct SummaryWriter;

impl ArtifactWriter for SummaryWriter {
    fn artifacts(&self) -> &'static [&'static str] {
        &[SUMMARY_JSON, REPORT_TXT]
    }

    fn write(&self, report: &AnalysisReport, dir: &Path) -> RenderResult<()> {
        let record = SummaryRecord::from_report(report);

        let mut json = serde_json::to_vec_pretty(&record)?;
        json.push(b'\n');
        let path = dir.join(SUMMARY_JSON);
        fs::write(&path, json).map_err(RenderError::io(&path))?;

        let path = dir.join(REPORT_TXT);
        fs::write(&path, research_summary(&record)).map_err(RenderError::io(&path))?;
        Ok(())
    }
}

// ── report.txt ────────────────────────────────────────────────────────────────

/// Plain-text summary of the findings.
pub fn research_summary(s: &SummaryRecord) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_summary(&mut out, s);
    out
}

fn write_summary(out: &mut String, s: &SummaryRecord) -> fmt::Result {
    writeln!(out, "Malicious RSU impact report: {}", s.scenario)?;
    writeln!(out, "{}", "=".repeat(40))?;
    writeln!(out)?;
    writeln!(
        out,
        "Vehicles: {} shared, {} only in Clean, {} only in Blocked (overlap {:.3})",
        s.overlap.shared, s.overlap.clean_only, s.overlap.blocked_only, s.overlap.ratio
    )?;

    writeln!(out)?;
    writeln!(out, "Traffic overview")?;
    for v in [&s.overview.clean, &s.overview.blocked] {
        writeln!(
            out,
            "  {:<8} {} vehicles, {} completed, {:.1}% rerouted, mean speed {}, mean time loss {}",
            v.variant.label(),
            v.vehicles,
            v.completed,
            v.rerouted_pct,
            fmt_opt(v.mean_speed, "m/s"),
            fmt_opt(v.time_loss.map(|t| t.mean), "s"),
        )?;
        writeln!(
            out,
            "  {:<8} max time loss {}, std-dev {}, mean waiting time {}, mean route length {}",
            "",
            fmt_opt(v.time_loss.map(|t| t.max), "s"),
            fmt_opt(v.time_loss.map(|t| t.std_dev), "s"),
            fmt_opt(v.mean_waiting_time, "s"),
            fmt_opt(v.mean_route_length, "m"),
        )?;
    }
    if let (Some(r), Some(pct)) = (s.overview.speed_reduction, s.overview.speed_reduction_pct) {
        writeln!(out, "  Mean speed reduced by {r:.2} m/s ({pct:.1}%)")?;
    }
    if let Some(d) = s.overview.added_delay {
        writeln!(out, "  Added delay per vehicle: {d:.1} s")?;
    }

    writeln!(out)?;
    writeln!(out, "Congestion spikes")?;
    for (label, c) in [("Clean", &s.congestion.clean), ("Blocked", &s.congestion.blocked)] {
        if c.baseline_available {
            writeln!(
                out,
                "  {label:<8} {} spikes, peak {} halting",
                c.spike_count,
                c.peak_halting.map_or_else(|| "-".to_owned(), |p| p.to_string()),
            )?;
        } else {
            writeln!(out, "  {label:<8} series too short for a baseline window")?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Time loss (completed trips, {} s buckets)", s.time_loss.bucket_width)?;
    for (label, l) in [("Clean", &s.time_loss.clean), ("Blocked", &s.time_loss.blocked)] {
        writeln!(
            out,
            "  {label:<8} {} completed, {} incomplete, median {}",
            l.completed,
            l.incomplete,
            fmt_opt(l.stats.map(|st| st.median), "s"),
        )?;
    }

    let t = &s.truncation;
    writeln!(out)?;
    writeln!(out, "Route truncation (ratio < {})", t.threshold)?;
    writeln!(
        out,
        "  {} of {} vehicles truncated ({:.1}%), mean severity {}",
        t.truncated,
        t.evaluated,
        t.truncated_ratio * 100.0,
        fmt_opt(t.mean_severity, ""),
    )?;
    writeln!(
        out,
        "  {} unmatched, {} with zero Clean length",
        t.unmatched, t.undefined_ratio
    )?;

    let r = &s.rerouting;
    writeln!(out)?;
    writeln!(out, "Rerouting efficiency")?;
    writeln!(
        out,
        "  {} rerouted ({} unmatched): {} helped ({:.1}%), {} hurt ({:.1}%), {} unchanged",
        r.rerouted,
        r.unmatched,
        r.helped,
        r.helped_fraction * 100.0,
        r.hurt,
        r.hurt_fraction * 100.0,
        r.neutral,
    )?;
    writeln!(
        out,
        "  mean delta {}, median delta {}",
        fmt_opt(r.mean_delta, "s"),
        fmt_opt(r.median_delta, "s"),
    )?;
    Ok(())
}

fn fmt_opt(value: Option<f64>, unit: &str) -> String {
    match (value, unit) {
        (Some(v), "") => format!("{v:.2}"),
        (Some(v), unit) => format!("{v:.2} {unit}"),
        (None, _) => "n/a".to_owned(),
    }
}
