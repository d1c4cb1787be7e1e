//! SVG charts.
//!
//! Charts are drawn into an in-memory string with the plotters SVG backend
//! and then written out in one call.  Geometry, colors and fonts are fixed,
//! so the same report always yields the same bytes.

use std::error::Error;
use std::fs;
use std::ops::Range;
use std::path::Path;

use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;

use v2x_core::Variant;
use v2x_metrics::truncation::SEVERITY_BINS;
use v2x_metrics::{
    AnalysisReport, CongestionResult, ImpactTimingResult, MetricResult, OverviewResult,
    ReroutingResult, TimeLossResult, TruncationResult,
};

use crate::{ArtifactWriter, RenderError, RenderResult};

pub const CONGESTION_HALTING: &str = "congestion_halting.svg";
pub const CONGESTION_RUNNING: &str = "congestion_running.svg";
pub const TIME_LOSS_HISTOGRAM: &str = "time_loss_histogram.svg";
pub const TRUNCATION_SEVERITY: &str = "route_truncation_severity.svg";
pub const REROUTING_EFFICIENCY: &str = "rerouting_efficiency.svg";
pub const IMPACT_TIMING: &str = "impact_timing.svg";
pub const AVERAGE_IMPACT: &str = "average_impact.svg";
pub const ROUTE_LENGTH_COMPARISON: &str = "route_length_comparison.svg";

const SIZE: (u32, u32) = (960, 540);
const FONT: &str = "sans-serif";

const CLEAN: RGBColor = RGBColor(31, 119, 180);
const BLOCKED: RGBColor = RGBColor(214, 39, 40);
const HELPED: RGBColor = RGBColor(44, 160, 44);
const NEUTRAL: RGBColor = RGBColor(90, 90, 90);

type DrawResult = Result<(), Box<dyn Error>>;
type Root<'a> = DrawingArea<SVGBackend<'a>, Shift>;

/// Writes the eight SVG charts, each drawn from the analysis it depicts.
pub struct ChartWriter;

impl ArtifactWriter for ChartWriter {
    fn artifacts(&self) -> &'static [&'static str] {
        &[
            CONGESTION_HALTING,
            CONGESTION_RUNNING,
            TIME_LOSS_HISTOGRAM,
            TRUNCATION_SEVERITY,
            REROUTING_EFFICIENCY,
            AVERAGE_IMPACT,
            ROUTE_LENGTH_COMPARISON,
            IMPACT_TIMING,
        ]
    }

    fn write(&self, report: &AnalysisReport, dir: &Path) -> RenderResult<()> {
        for result in report.results() {
            for (name, svg) in draw(&report.scenario, result)? {
                let path = dir.join(name);
                fs::write(&path, svg).map_err(RenderError::io(&path))?;
            }
        }
        Ok(())
    }
}

/// The charts belonging to one analysis result, as `(file name, SVG)`.
pub fn draw(scenario: &str, result: MetricResult<'_>) -> RenderResult<Vec<(&'static str, String)>> {
    Ok(match result {
        MetricResult::CongestionSpikes(c) => vec![
            (CONGESTION_HALTING, congestion_halting(scenario, c)?),
            (CONGESTION_RUNNING, congestion_running(scenario, c)?),
        ],
        MetricResult::TimeLossDistribution(t) => {
            vec![(TIME_LOSS_HISTOGRAM, time_loss_histogram(scenario, t)?)]
        }
        MetricResult::RouteTruncation(t) => {
            vec![(TRUNCATION_SEVERITY, truncation_severity(scenario, t)?)]
        }
        MetricResult::ReroutingEfficiency(r) => {
            vec![(REROUTING_EFFICIENCY, rerouting_efficiency(scenario, r)?)]
        }
        MetricResult::Overview(o) => vec![
            (AVERAGE_IMPACT, average_impact(scenario, o)?),
            (ROUTE_LENGTH_COMPARISON, route_length_comparison(scenario, o)?),
        ],
        MetricResult::ImpactTiming(t) => vec![(IMPACT_TIMING, impact_timing(scenario, t)?)],
    })
}

// ── Charts ────────────────────────────────────────────────────────────────────

/// Halting vehicles over time, both variants overlaid, spike intervals shaded.
pub fn congestion_halting(scenario: &str, c: &CongestionResult) -> RenderResult<String> {
    let x = span(bounds(c.aligned.iter().map(|p| p.time.0)));
    let y_max = headroom(
        Variant::ALL
            .iter()
            .flat_map(|&v| c.variant(v).series.iter().map(|p| p.halting as f64)),
    );

    svg(CONGESTION_HALTING, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(format!("{}: halting vehicles", scenario), (FONT, 22))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(56)
            .build_cartesian_2d(x, 0.0..y_max)?;
        chart.configure_mesh().x_desc("time (s)").y_desc("halting vehicles").draw()?;

        for v in Variant::ALL {
            let color = color_of(v);
            chart.draw_series(c.variant(v).spikes.iter().map(|s| {
                Rectangle::new([(s.start.0, 0.0), (s.end.0, y_max)], color.mix(0.15).filled())
            }))?;
        }
        for v in Variant::ALL {
            let color = color_of(v);
            chart
                .draw_series(LineSeries::new(
                    c.variant(v).series.iter().map(|p| (p.time.0, p.halting as f64)),
                    color.stroke_width(2),
                ))?
                .label(format!("{v} ({} spikes)", c.variant(v).spikes.len()))
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }
        legend(&mut chart)
    })
}

/// Running vehicles over time, both variants overlaid.
pub fn congestion_running(scenario: &str, c: &CongestionResult) -> RenderResult<String> {
    let x = span(bounds(c.aligned.iter().map(|p| p.time.0)));
    let y_max = headroom(
        Variant::ALL
            .iter()
            .flat_map(|&v| c.variant(v).series.iter().map(|p| p.running as f64)),
    );

    svg(CONGESTION_RUNNING, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(format!("{}: running vehicles", scenario), (FONT, 22))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(56)
            .build_cartesian_2d(x, 0.0..y_max)?;
        chart.configure_mesh().x_desc("time (s)").y_desc("running vehicles").draw()?;

        for v in Variant::ALL {
            let color = color_of(v);
            chart
                .draw_series(LineSeries::new(
                    c.variant(v).series.iter().map(|p| (p.time.0, p.running as f64)),
                    color.stroke_width(2),
                ))?
                .label(v.label())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }
        legend(&mut chart)
    })
}

/// Side-by-side time-loss histograms on the shared bucket edges.
pub fn time_loss_histogram(scenario: &str, t: &TimeLossResult) -> RenderResult<String> {
    let x = span(match (t.edges.first(), t.edges.last()) {
        (Some(&lo), Some(&hi)) => Some((lo, hi)),
        _ => None,
    });
    let y_max = headroom(
        Variant::ALL
            .iter()
            .flat_map(|&v| t.variant(v).counts.iter().map(|&n| n as f64)),
    );

    svg(TIME_LOSS_HISTOGRAM, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(format!("{}: time-loss distribution", scenario), (FONT, 22))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(56)
            .build_cartesian_2d(x, 0.0..y_max)?;
        chart.configure_mesh().x_desc("time loss (s)").y_desc("vehicles").draw()?;

        for (half, v) in Variant::ALL.into_iter().enumerate() {
            let color = color_of(v);
            let vt = t.variant(v);
            let bars = t.edges.windows(2).zip(&vt.counts).map(move |(edge, &n)| {
                let mid = (edge[0] + edge[1]) / 2.0;
                let (lo, hi) = if half == 0 { (edge[0], mid) } else { (mid, edge[1]) };
                Rectangle::new([(lo, 0.0), (hi, n as f64)], color.mix(0.8).filled())
            });
            chart
                .draw_series(bars)?
                .label(format!("{v} ({} completed, {} incomplete)", vt.completed, vt.incomplete))
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 14, y + 5)], color.filled()));
        }
        legend(&mut chart)
    })
}

/// Distribution of truncation severity over `[0, 1]`.
pub fn truncation_severity(scenario: &str, t: &TruncationResult) -> RenderResult<String> {
    let y_max = headroom(t.severity_histogram.iter().map(|&n| n as f64));
    let width = 1.0 / SEVERITY_BINS as f64;

    svg(TRUNCATION_SEVERITY, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(
                format!(
                    "{}: route truncation ({} of {} vehicles)",
                    scenario, t.truncated, t.evaluated
                ),
                (FONT, 22),
            )
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(56)
            .build_cartesian_2d(0.0..1.0, 0.0..y_max)?;
        chart
            .configure_mesh()
            .x_desc("severity (1 - blocked / clean length)")
            .y_desc("vehicles")
            .draw()?;

        chart.draw_series(t.severity_histogram.iter().enumerate().map(|(k, &n)| {
            let lo = k as f64 * width;
            Rectangle::new([(lo, 0.0), (lo + width, n as f64)], BLOCKED.mix(0.8).filled())
        }))?;
        Ok(())
    })
}

/// Per-vehicle time-loss delta of rerouted vehicles, with the mean.
pub fn rerouting_efficiency(scenario: &str, r: &ReroutingResult) -> RenderResult<String> {
    let n = r.deltas.len();
    let (lo, hi) = bounds(r.deltas.iter().map(|d| d.delta)).unwrap_or((0.0, 0.0));
    let y = span(Some((lo.min(0.0), hi.max(0.0))));

    svg(REROUTING_EFFICIENCY, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(
                format!(
                    "{}: rerouting efficiency ({} helped, {} hurt)",
                    scenario, r.helped, r.hurt
                ),
                (FONT, 22),
            )
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(56)
            .build_cartesian_2d(0.0..n.max(1) as f64, y)?;
        chart
            .configure_mesh()
            .x_desc("rerouted vehicle")
            .y_desc("time-loss delta (s)")
            .draw()?;

        chart.draw_series(r.deltas.iter().enumerate().map(|(i, d)| {
            let color = if d.delta < 0.0 {
                HELPED
            } else if d.delta > 0.0 {
                BLOCKED
            } else {
                NEUTRAL
            };
            Rectangle::new([(i as f64 + 0.1, 0.0), (i as f64 + 0.9, d.delta)], color.filled())
        }))?;

        if let Some(mean) = r.mean_delta {
            chart
                .draw_series(LineSeries::new(
                    [(0.0, mean), (n.max(1) as f64, mean)],
                    BLACK.stroke_width(2),
                ))?
                .label(format!("mean delta {mean:.1} s"))
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLACK));
            legend(&mut chart)?;
        }
        Ok(())
    })
}

/// Departure time against time loss for every trip.
pub fn impact_timing(scenario: &str, t: &ImpactTimingResult) -> RenderResult<String> {
    let points = || t.clean.iter().chain(&t.blocked);
    let x = span(bounds(points().map(|p| p.depart.0)));
    let y_max = headroom(points().map(|p| p.time_loss));

    svg(IMPACT_TIMING, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(format!("{}: delay by departure time", scenario), (FONT, 22))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(56)
            .build_cartesian_2d(x, 0.0..y_max)?;
        chart.configure_mesh().x_desc("departure (s)").y_desc("time loss (s)").draw()?;

        for (v, series) in [(Variant::Clean, &t.clean), (Variant::Blocked, &t.blocked)] {
            let color = color_of(v);
            chart
                .draw_series(
                    series
                        .iter()
                        .map(|p| Circle::new((p.depart.0, p.time_loss), 3, color.mix(0.6).filled())),
                )?
                .label(v.label())
                .legend(move |(x, y)| Circle::new((x + 10, y), 4, color.filled()));
        }
        legend(&mut chart)
    })
}

/// Mean duration, time loss and waiting time per variant.
pub fn average_impact(scenario: &str, o: &OverviewResult) -> RenderResult<String> {
    const CATEGORIES: [&str; 3] = ["duration", "time loss", "waiting"];

    let values = |v: Variant| -> [f64; 3] {
        let vo = o.variant(v);
        [
            vo.mean_duration.unwrap_or(0.0),
            vo.time_loss.map(|s| s.mean).unwrap_or(0.0),
            vo.mean_waiting_time.unwrap_or(0.0),
        ]
    };
    let y_max = headroom(Variant::ALL.iter().flat_map(|&v| values(v)));

    svg(AVERAGE_IMPACT, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(format!("{}: average impact per vehicle", scenario), (FONT, 22))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(56)
            .build_cartesian_2d(-0.5..2.5, 0.0..y_max)?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(3)
            .x_label_formatter(&|x: &f64| {
                let k = x.round();
                if (x - k).abs() < 1e-6 && (0.0..3.0).contains(&k) {
                    CATEGORIES[k as usize].to_owned()
                } else {
                    String::new()
                }
            })
            .y_desc("seconds")
            .draw()?;

        for (offset, v) in [(-0.35, Variant::Clean), (0.0, Variant::Blocked)] {
            let color = color_of(v);
            let bars = values(v).into_iter().enumerate().map(move |(k, value)| {
                let lo = k as f64 + offset;
                Rectangle::new([(lo, 0.0), (lo + 0.35, value)], color.mix(0.8).filled())
            });
            chart
                .draw_series(bars)?
                .label(v.label())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 14, y + 5)], color.filled()));
        }
        legend(&mut chart)
    })
}

/// Traveled route length per variant as a box plot: quartile box, median
/// line, whiskers out to the shortest and longest route.
pub fn route_length_comparison(scenario: &str, o: &OverviewResult) -> RenderResult<String> {
    let y_max = headroom(
        Variant::ALL
            .iter()
            .filter_map(|&v| o.variant(v).route_length.map(|q| q.max)),
    );

    svg(ROUTE_LENGTH_COMPARISON, |root| {
        let mut chart = ChartBuilder::on(root)
            .caption(format!("{scenario}: route length comparison"), (FONT, 22))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(56)
            .build_cartesian_2d(-0.5..1.5, 0.0..y_max)?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(2)
            .x_label_formatter(&|x: &f64| {
                let k = x.round();
                if (x - k).abs() < 1e-6 && (0.0..2.0).contains(&k) {
                    Variant::ALL[k as usize].label().to_owned()
                } else {
                    String::new()
                }
            })
            .y_desc("route length (m)")
            .draw()?;

        for (k, v) in Variant::ALL.into_iter().enumerate() {
            let Some(q) = o.variant(v).route_length else { continue };
            let color = color_of(v);
            let (x, half, cap) = (k as f64, 0.2, 0.1);
            let stroke = color.stroke_width(2);

            chart.draw_series([
                PathElement::new(vec![(x, q.min), (x, q.q1)], stroke),
                PathElement::new(vec![(x, q.q3), (x, q.max)], stroke),
                PathElement::new(vec![(x - cap, q.min), (x + cap, q.min)], stroke),
                PathElement::new(vec![(x - cap, q.max), (x + cap, q.max)], stroke),
            ])?;
            chart
                .draw_series([Rectangle::new([(x - half, q.q1), (x + half, q.q3)], color.mix(0.3).filled())])?
                .label(format!("{v} (median {:.0} m)", q.median))
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 14, y + 5)], color.filled()));
            chart.draw_series([Rectangle::new([(x - half, q.q1), (x + half, q.q3)], stroke)])?;
            chart.draw_series([PathElement::new(
                vec![(x - half, q.median), (x + half, q.median)],
                BLACK.stroke_width(2),
            )])?;
        }
        legend(&mut chart)
    })
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Draw into a fresh SVG document and return its text.
fn svg<F>(artifact: &'static str, draw: F) -> RenderResult<String>
where
    F: FnOnce(&Root<'_>) -> DrawResult,
{
    let mut out = String::new();
    {
        let root = SVGBackend::with_string(&mut out, SIZE).into_drawing_area();
        let drawn = (|| -> DrawResult {
            root.fill(&WHITE)?;
            draw(&root)?;
            root.present()?;
            Ok(())
        })();
        drawn.map_err(|e| RenderError::Chart { artifact, message: e.to_string() })?;
    }
    Ok(out)
}

fn legend<'a, 'b: 'a>(
    chart: &mut ChartContext<'a, SVGBackend<'b>, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
) -> DrawResult {
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}

fn color_of(variant: Variant) -> RGBColor {
    match variant {
        Variant::Clean => CLEAN,
        Variant::Blocked => BLOCKED,
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

/// Axis range covering `bounds`, never empty.
fn span(bounds: Option<(f64, f64)>) -> Range<f64> {
    match bounds {
        Some((lo, hi)) if hi > lo => lo..hi,
        Some((lo, _)) => lo - 1.0..lo + 1.0,
        None => 0.0..1.0,
    }
}

/// Upper y bound leaving room above the tallest value.
fn headroom(values: impl Iterator<Item = f64>) -> f64 {
    let max = values.fold(0.0_f64, f64::max);
    if max > 0.0 { max * 1.1 } else { 1.0 }
}
