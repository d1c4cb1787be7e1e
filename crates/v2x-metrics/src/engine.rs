//! Runs every analysis over one dataset.

use log::info;
use serde::Serialize;

use v2x_core::{AnalysisConfig, Variant};
use v2x_dataset::{OverlapStats, ScenarioDataset};

use crate::congestion::{congestion_spikes, CongestionResult};
use crate::overview::{impact_timing, overview, ImpactTimingResult, OverviewResult};
use crate::rerouting::{rerouting_efficiency, ReroutingResult};
use crate::time_loss::{time_loss_distribution, TimeLossResult};
use crate::truncation::{route_truncation, TruncationResult};
use crate::EngineResult;

/// The analyses the engine produces.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize)]
pub enum MetricKind {
    CongestionSpikes,
    TimeLossDistribution,
    RouteTruncation,
    ReroutingEfficiency,
    Overview,
    ImpactTiming,
}

impl MetricKind {
    pub const ALL: [MetricKind; 6] = [
        MetricKind::CongestionSpikes,
        MetricKind::TimeLossDistribution,
        MetricKind::RouteTruncation,
        MetricKind::ReroutingEfficiency,
        MetricKind::Overview,
        MetricKind::ImpactTiming,
    ];

    pub fn name(self) -> &'static str {
        match self {
            MetricKind::CongestionSpikes => "congestion_spikes",
            MetricKind::TimeLossDistribution => "time_loss_distribution",
            MetricKind::RouteTruncation => "route_truncation",
            MetricKind::ReroutingEfficiency => "rerouting_efficiency",
            MetricKind::Overview => "overview",
            MetricKind::ImpactTiming => "impact_timing",
        }
    }
}

/// A borrowed view of one analysis' output.
#[derive(Copy, Clone, Debug)]
pub enum MetricResult<'a> {
    CongestionSpikes(&'a CongestionResult),
    TimeLossDistribution(&'a TimeLossResult),
    RouteTruncation(&'a TruncationResult),
    ReroutingEfficiency(&'a ReroutingResult),
    Overview(&'a OverviewResult),
    ImpactTiming(&'a ImpactTimingResult),
}

impl MetricResult<'_> {
    pub fn kind(&self) -> MetricKind {
        match self {
            MetricResult::CongestionSpikes(_) => MetricKind::CongestionSpikes,
            MetricResult::TimeLossDistribution(_) => MetricKind::TimeLossDistribution,
            MetricResult::RouteTruncation(_) => MetricKind::RouteTruncation,
            MetricResult::ReroutingEfficiency(_) => MetricKind::ReroutingEfficiency,
            MetricResult::Overview(_) => MetricKind::Overview,
            MetricResult::ImpactTiming(_) => MetricKind::ImpactTiming,
        }
    }

    /// Variants whose records feed this result.
    ///
    /// Truncation and rerouting classify Blocked vehicles but always read the
    /// Clean counterpart as the reference, so every result spans both.
    pub fn computed_from(&self) -> &'static [Variant] {
        &Variant::ALL
    }
}

/// Copy of the dataset's overlap figures, kept with the results.
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct OverlapRecord {
    pub shared:       usize,
    pub clean_only:   usize,
    pub blocked_only: usize,
    pub ratio:        f64,
}

impl From<OverlapStats> for OverlapRecord {
    fn from(o: OverlapStats) -> Self {
        Self {
            shared:       o.shared,
            clean_only:   o.clean_only,
            blocked_only: o.blocked_only,
            ratio:        o.ratio,
        }
    }
}

/// Everything the engine derived from one dataset.  Read-only once built.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub scenario:   String,
    pub overlap:    OverlapRecord,
    pub congestion: CongestionResult,
    pub time_loss:  TimeLossResult,
    pub truncation: TruncationResult,
    pub rerouting:  ReroutingResult,
    pub overview:   OverviewResult,
    pub timing:     ImpactTimingResult,
}

impl AnalysisReport {
    /// All results in [`MetricKind::ALL`] order.
    pub fn results(&self) -> [MetricResult<'_>; 6] {
        [
            MetricResult::CongestionSpikes(&self.congestion),
            MetricResult::TimeLossDistribution(&self.time_loss),
            MetricResult::RouteTruncation(&self.truncation),
            MetricResult::ReroutingEfficiency(&self.rerouting),
            MetricResult::Overview(&self.overview),
            MetricResult::ImpactTiming(&self.timing),
        ]
    }
}

/// Validate `config` and run every analysis over `dataset`.
///
/// The analyses are independent pure functions of the same read-only
/// dataset.  With the `parallel` Cargo feature they run on Rayon's thread
/// pool; results are identical either way.
pub fn run_all(dataset: &ScenarioDataset, config: &AnalysisConfig) -> EngineResult<AnalysisReport> {
    config.validate()?;

    #[cfg(not(feature = "parallel"))]
    let (congestion, time_loss, truncation, rerouting, overview, timing) = (
        congestion_spikes(dataset, config),
        time_loss_distribution(dataset, config),
        route_truncation(dataset, config),
        rerouting_efficiency(dataset, config),
        overview(dataset, config),
        impact_timing(dataset, config),
    );

    #[cfg(feature = "parallel")]
    let (congestion, time_loss, truncation, rerouting, overview, timing) = {
        let ((congestion, time_loss), ((truncation, rerouting), (overview, timing))) = rayon::join(
            || rayon::join(|| congestion_spikes(dataset, config), || time_loss_distribution(dataset, config)),
            || {
                rayon::join(
                    || rayon::join(|| route_truncation(dataset, config), || rerouting_efficiency(dataset, config)),
                    || rayon::join(|| overview(dataset, config), || impact_timing(dataset, config)),
                )
            },
        );
        (congestion, time_loss, truncation, rerouting, overview, timing)
    };

    info!(
        "{}: {} Clean / {} Blocked spikes, {} truncated, {} rerouted ({} unmatched)",
        dataset.scenario(),
        congestion.clean.spikes.len(),
        congestion.blocked.spikes.len(),
        truncation.truncated,
        rerouting.rerouted,
        rerouting.unmatched,
    );

    Ok(AnalysisReport {
        scenario: dataset.scenario().to_owned(),
        overlap: dataset.overlap().into(),
        congestion,
        time_loss,
        truncation,
        rerouting,
        overview,
        timing,
    })
}
