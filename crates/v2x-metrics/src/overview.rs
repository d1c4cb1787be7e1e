//! Headline per-variant aggregates and the departure/delay scatter.

use serde::Serialize;

use v2x_core::{AnalysisConfig, SimTime, Variant};
use v2x_dataset::ScenarioDataset;
use v2x_logs::ScenarioVariantLog;

use crate::stats::{self, Quartiles, Summary};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VariantOverview {
    pub variant:           Variant,
    pub vehicles:          usize,
    pub completed:         usize,
    pub rerouted:          usize,
    /// Percentage of vehicles that rerouted at least once.
    pub rerouted_pct:      f64,
    /// Mean of the per-step mean speed over steps with running vehicles (m/s).
    pub mean_speed:        Option<f64>,
    /// Over all trips, completed or not.
    pub time_loss:         Option<Summary>,
    pub mean_waiting_time: Option<f64>,
    pub mean_duration:     Option<f64>,
    pub mean_route_length: Option<f64>,
    /// Traveled route length (m) over all trips.
    pub route_length:      Option<Quartiles>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OverviewResult {
    pub clean:               VariantOverview,
    pub blocked:             VariantOverview,
    /// Clean minus Blocked mean speed (m/s).
    pub speed_reduction:     Option<f64>,
    /// `speed_reduction` as a percentage of the Clean mean speed.
    pub speed_reduction_pct: Option<f64>,
    /// Blocked minus Clean mean time loss (s).
    pub added_delay:         Option<f64>,
}

impl OverviewResult {
    pub fn variant(&self, variant: Variant) -> &VariantOverview {
        match variant {
            Variant::Clean => &self.clean,
            Variant::Blocked => &self.blocked,
        }
    }
}

/// One vehicle in the departure-time vs. time-loss scatter.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ImpactPoint {
    pub depart:    SimTime,
    pub time_loss: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImpactTimingResult {
    pub clean:   Vec<ImpactPoint>,
    pub blocked: Vec<ImpactPoint>,
}

pub fn overview(dataset: &ScenarioDataset, _config: &AnalysisConfig) -> OverviewResult {
    let clean = summarize(dataset.clean());
    let blocked = summarize(dataset.blocked());

    let speed_reduction = match (clean.mean_speed, blocked.mean_speed) {
        (Some(c), Some(b)) => Some(c - b),
        _ => None,
    };
    let speed_reduction_pct = match (speed_reduction, clean.mean_speed) {
        (Some(r), Some(c)) if c > 0.0 => Some(r / c * 100.0),
        _ => None,
    };
    let added_delay = match (&clean.time_loss, &blocked.time_loss) {
        (Some(c), Some(b)) => Some(b.mean - c.mean),
        _ => None,
    };

    OverviewResult { clean, blocked, speed_reduction, speed_reduction_pct, added_delay }
}

/// Departure time against time loss for every trip, in log order.
pub fn impact_timing(dataset: &ScenarioDataset, _config: &AnalysisConfig) -> ImpactTimingResult {
    let points = |log: &ScenarioVariantLog| -> Vec<ImpactPoint> {
        log.trips()
            .iter()
            .map(|t| ImpactPoint { depart: t.depart, time_loss: t.time_loss })
            .collect()
    };
    ImpactTimingResult {
        clean:   points(dataset.clean()),
        blocked: points(dataset.blocked()),
    }
}

fn summarize(log: &ScenarioVariantLog) -> VariantOverview {
    let trips = log.trips();
    let rerouted = trips.iter().filter(|t| t.rerouted()).count();

    let speeds: Vec<f64> = log.snapshots().iter().filter_map(|s| s.mean_speed).collect();
    let losses: Vec<f64> = trips.iter().map(|t| t.time_loss).collect();
    let waits: Vec<f64> = trips.iter().map(|t| t.waiting_time).collect();
    let durations: Vec<f64> = trips.iter().filter_map(|t| t.duration).collect();
    let lengths: Vec<f64> = trips.iter().map(|t| t.route_length).collect();

    VariantOverview {
        variant:           log.variant(),
        vehicles:          trips.len(),
        completed:         trips.iter().filter(|t| t.completed()).count(),
        rerouted,
        rerouted_pct:      stats::fraction(rerouted, trips.len()) * 100.0,
        mean_speed:        stats::mean(&speeds),
        time_loss:         Summary::of(&losses),
        mean_waiting_time: stats::mean(&waits),
        mean_duration:     stats::mean(&durations),
        mean_route_length: stats::mean(&lengths),
        route_length:      Quartiles::of(&lengths),
    }
}
