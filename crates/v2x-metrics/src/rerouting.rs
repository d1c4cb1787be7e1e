//! V2X rerouting efficiency.
//!
//! Only vehicles that rerouted in the Blocked run are considered.  Each is
//! joined by id with its Clean trip and scored by
//!
//! ```text
//! delta = blocked time loss − clean time loss
//! ```
//!
//! Negative deltas mean the reroute helped, positive ones that it hurt.
//! Rerouted vehicles without a Clean counterpart are counted as `unmatched`.

use serde::Serialize;

use v2x_core::{AnalysisConfig, VehicleId};
use v2x_dataset::ScenarioDataset;

use crate::stats::{self, fraction};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RerouteDelta {
    pub id:                VehicleId,
    pub reroute_count:     u32,
    pub clean_time_loss:   f64,
    pub blocked_time_loss: f64,
    pub delta:             f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReroutingResult {
    /// Vehicles with at least one reroute in the Blocked run.
    pub rerouted:        usize,
    /// Rerouted vehicles found in the Clean run.
    pub matched:         usize,
    pub unmatched:       usize,
    pub helped:          usize,
    pub hurt:            usize,
    pub neutral:         usize,
    pub helped_fraction: f64,
    pub hurt_fraction:   f64,
    pub mean_delta:      Option<f64>,
    pub median_delta:    Option<f64>,
    /// Mean of `blocked / clean` time loss over vehicles where it is defined.
    pub mean_ratio:      Option<f64>,
    /// Matched vehicles with a Clean time loss of 0.
    pub undefined_ratio: usize,
    /// Per-vehicle deltas, sorted by id.
    pub deltas:          Vec<RerouteDelta>,
}

/// Score the reroutes triggered in the Blocked run.
pub fn rerouting_efficiency(dataset: &ScenarioDataset, _config: &AnalysisConfig) -> ReroutingResult {
    let mut rerouted = 0;
    let mut deltas = Vec::new();
    let mut ratios = Vec::new();
    let mut undefined_ratio = 0;

    for blocked in dataset.blocked().trips().iter().filter(|t| t.rerouted()) {
        rerouted += 1;
        let Some(clean) = dataset.clean().trip(blocked.id.as_str()) else {
            continue;
        };

        if clean.time_loss == 0.0 {
            undefined_ratio += 1;
        } else {
            ratios.push(blocked.time_loss / clean.time_loss);
        }

        deltas.push(RerouteDelta {
            id:                blocked.id.clone(),
            reroute_count:     blocked.reroute_count,
            clean_time_loss:   clean.time_loss,
            blocked_time_loss: blocked.time_loss,
            delta:             blocked.time_loss - clean.time_loss,
        });
    }

    deltas.sort_by(|a, b| a.id.cmp(&b.id));

    let values: Vec<f64> = deltas.iter().map(|d| d.delta).collect();
    let helped = values.iter().filter(|&&d| d < 0.0).count();
    let hurt = values.iter().filter(|&&d| d > 0.0).count();
    let matched = deltas.len();

    ReroutingResult {
        rerouted,
        matched,
        unmatched: rerouted - matched,
        helped,
        hurt,
        neutral: matched - helped - hurt,
        helped_fraction: fraction(helped, matched),
        hurt_fraction: fraction(hurt, matched),
        mean_delta: stats::mean(&values),
        median_delta: stats::median(&values),
        mean_ratio: stats::mean(&ratios),
        undefined_ratio,
        deltas,
    }
}
