//! Network congestion spikes.
//!
//! For each variant the summary log gives a halting-vehicle series.  The
//! baseline at sample `i` is the median halting count over the trailing
//! window `[i - w, i)`, where `w` is `spike_window_secs` converted to samples
//! at the log's own sampling interval.  Sample `i` spikes when
//!
//! ```text
//! halting[i] > spike_factor × max(baseline[i], min_baseline)
//! ```
//!
//! and maximal runs of spiking samples form one [`SpikeInterval`].  A series
//! with no more than `w` samples has no baseline at all; it yields an empty
//! spike list with `baseline_available = false`.

use log::debug;
use serde::Serialize;

use v2x_core::{AnalysisConfig, SimTime, Variant};
use v2x_dataset::ScenarioDataset;
use v2x_logs::{ScenarioVariantLog, SummarySnapshot};

/// Timestamps closer than this are treated as the same sample when aligning.
const ALIGN_EPSILON: f64 = 1e-9;

/// One sample of the congestion series.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub time:       SimTime,
    pub running:    u32,
    pub halting:    u32,
    pub mean_speed: Option<f64>,
}

impl From<&SummarySnapshot> for SeriesPoint {
    fn from(s: &SummarySnapshot) -> Self {
        Self {
            time:       s.time,
            running:    s.running,
            halting:    s.halting,
            mean_speed: s.mean_speed,
        }
    }
}

/// A maximal run of consecutive spiking samples.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SpikeInterval {
    pub start:        SimTime,
    pub end:          SimTime,
    pub peak_halting: u32,
    pub peak_time:    SimTime,
}

/// Congestion analysis of one variant.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VariantCongestion {
    pub variant:            Variant,
    pub series:             Vec<SeriesPoint>,
    /// Rolling-median baseline per sample; `None` inside the first window.
    pub baseline:           Vec<Option<f64>>,
    pub window_samples:     usize,
    pub baseline_available: bool,
    pub spikes:             Vec<SpikeInterval>,
}

/// Both variants' values at one timestamp of the merged timeline.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AlignedPoint {
    pub time:    SimTime,
    pub clean:   Option<SeriesPoint>,
    pub blocked: Option<SeriesPoint>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CongestionResult {
    pub clean:   VariantCongestion,
    pub blocked: VariantCongestion,
    /// Union of both timelines, ascending.
    pub aligned: Vec<AlignedPoint>,
}

impl CongestionResult {
    pub fn variant(&self, variant: Variant) -> &VariantCongestion {
        match variant {
            Variant::Clean => &self.clean,
            Variant::Blocked => &self.blocked,
        }
    }
}

/// Detect congestion spikes in both variants of `dataset`.
pub fn congestion_spikes(dataset: &ScenarioDataset, config: &AnalysisConfig) -> CongestionResult {
    let clean = analyze_variant(dataset.clean(), config);
    let blocked = analyze_variant(dataset.blocked(), config);
    let aligned = align(&clean.series, &blocked.series);
    CongestionResult { clean, blocked, aligned }
}

/// Spike detection on a single variant's log.
pub fn analyze_variant(log: &ScenarioVariantLog, config: &AnalysisConfig) -> VariantCongestion {
    let series: Vec<SeriesPoint> = log.snapshots().iter().map(SeriesPoint::from).collect();
    let halting: Vec<f64> = series.iter().map(|p| p.halting as f64).collect();

    let window_samples = log
        .sampling_interval()
        .map(|interval| window_samples(config.spike_window_secs, interval))
        .unwrap_or(usize::MAX);

    let baseline = rolling_median(&halting, window_samples);
    let baseline_available = baseline.iter().any(Option::is_some);

    let spikes = if baseline_available {
        detect_spikes(&series, &baseline, config)
    } else {
        debug!(
            "{}: {} summary steps do not fill a {}s baseline window; no spikes reported",
            log.variant(),
            series.len(),
            config.spike_window_secs
        );
        Vec::new()
    };

    VariantCongestion {
        variant: log.variant(),
        series,
        baseline,
        window_samples,
        baseline_available,
        spikes,
    }
}

/// Number of samples covering `window_secs` at the given sampling interval.
pub fn window_samples(window_secs: f64, interval: f64) -> usize {
    if interval <= 0.0 {
        return usize::MAX;
    }
    ((window_secs / interval).ceil() as usize).max(1)
}

/// Trailing median over the `window` samples before each index.
pub fn rolling_median(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || window >= values.len() {
        return out;
    }

    let mut buf: Vec<f64> = Vec::with_capacity(window);
    for i in window..values.len() {
        buf.clear();
        buf.extend_from_slice(&values[i - window..i]);
        buf.sort_by(f64::total_cmp);
        let mid = window / 2;
        out[i] = Some(if window % 2 == 0 {
            (buf[mid - 1] + buf[mid]) / 2.0
        } else {
            buf[mid]
        });
    }
    out
}

fn detect_spikes(
    series:   &[SeriesPoint],
    baseline: &[Option<f64>],
    config:   &AnalysisConfig,
) -> Vec<SpikeInterval> {
    let mut spikes = Vec::new();
    let mut current: Option<SpikeInterval> = None;

    for (point, base) in series.iter().zip(baseline) {
        let spiking = base.is_some_and(|b| {
            point.halting as f64 > config.spike_factor * b.max(config.min_baseline)
        });

        if !spiking {
            spikes.extend(current.take());
            continue;
        }

        if let Some(open) = current.as_mut() {
            open.end = point.time;
            if point.halting > open.peak_halting {
                open.peak_halting = point.halting;
                open.peak_time = point.time;
            }
        } else {
            current = Some(SpikeInterval {
                start:        point.time,
                end:          point.time,
                peak_halting: point.halting,
                peak_time:    point.time,
            });
        }
    }
    spikes.extend(current);
    spikes
}

/// Merge two ascending series into one timeline.
fn align(clean: &[SeriesPoint], blocked: &[SeriesPoint]) -> Vec<AlignedPoint> {
    let mut out = Vec::with_capacity(clean.len().max(blocked.len()));
    let (mut i, mut j) = (0, 0);

    while i < clean.len() || j < blocked.len() {
        let point = match (clean.get(i), blocked.get(j)) {
            (Some(c), Some(b)) if (c.time - b.time).abs() <= ALIGN_EPSILON => {
                i += 1;
                j += 1;
                AlignedPoint { time: c.time, clean: Some(*c), blocked: Some(*b) }
            }
            (Some(c), Some(b)) if c.time < b.time => {
                i += 1;
                AlignedPoint { time: c.time, clean: Some(*c), blocked: None }
            }
            (Some(c), None) => {
                i += 1;
                AlignedPoint { time: c.time, clean: Some(*c), blocked: None }
            }
            (_, Some(b)) => {
                j += 1;
                AlignedPoint { time: b.time, clean: None, blocked: Some(*b) }
            }
            (None, None) => break,
        };
        out.push(point);
    }
    out
}
