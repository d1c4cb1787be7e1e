//! Route truncation.
//!
//! For every vehicle present in both variants, the Blocked traveled length is
//! compared with the Clean traveled length (and with the intended length when
//! the log carries one).  A vehicle is **truncated** when
//!
//! - `blocked / clean < truncation_ratio`, and
//! - its Blocked trip did not reach the original destination.
//!
//! Severity is `1 − blocked / clean`.  A Clean length of exactly 0 leaves the
//! ratio undefined; such vehicles are counted, not classified.

use serde::Serialize;

use v2x_core::{AnalysisConfig, VehicleId};
use v2x_dataset::ScenarioDataset;

use crate::stats::{self, fraction};

/// Number of equal-width severity bins over `[0, 1]`.
pub const SEVERITY_BINS: usize = 10;

/// One vehicle classified as truncated.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TruncatedVehicle {
    pub id:             VehicleId,
    pub clean_length:   f64,
    pub blocked_length: f64,
    pub severity:       f64,
    /// Blocked traveled / intended length, when the intended length is logged.
    pub intended_ratio: Option<f64>,
}

/// How Blocked trips compare with their own planned route.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IntendedComparison {
    /// Matched vehicles whose Blocked record logs an intended length.
    pub logged:            usize,
    pub mean_ratio:        Option<f64>,
    /// Logged vehicles that traveled less than `truncation_ratio` of it.
    pub short_of_intended: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TruncationResult {
    pub threshold:          f64,
    /// Vehicles present in both variants.
    pub matched:            usize,
    /// Vehicles present in only one variant.
    pub unmatched:          usize,
    /// Matched vehicles with a Clean length of 0.
    pub undefined_ratio:    usize,
    /// Matched vehicles with a defined ratio.
    pub evaluated:          usize,
    pub truncated:          usize,
    /// `truncated / evaluated`.
    pub truncated_ratio:    f64,
    /// Truncated vehicles, sorted by id.
    pub vehicles:           Vec<TruncatedVehicle>,
    /// Severity of every truncated vehicle, ascending.
    pub severities:         Vec<f64>,
    pub mean_severity:      Option<f64>,
    /// Counts over `[0, 0.1), [0.1, 0.2), …, [0.9, 1.0]`.
    pub severity_histogram: [u64; SEVERITY_BINS],
    pub intended:           IntendedComparison,
}

/// Classify truncated routes in the Blocked variant.
pub fn route_truncation(dataset: &ScenarioDataset, config: &AnalysisConfig) -> TruncationResult {
    let threshold = config.truncation_ratio;
    let overlap = dataset.overlap();

    let mut matched = 0;
    let mut undefined_ratio = 0;
    let mut vehicles = Vec::new();
    let mut intended_ratios = Vec::new();
    let mut short_of_intended = 0;

    for (clean, blocked) in dataset.matched_trips() {
        matched += 1;

        let intended_ratio = blocked
            .intended_route_length
            .filter(|&len| len > 0.0)
            .map(|len| blocked.route_length / len);
        if let Some(r) = intended_ratio {
            intended_ratios.push(r);
            if r < threshold {
                short_of_intended += 1;
            }
        }

        if clean.route_length == 0.0 {
            undefined_ratio += 1;
            continue;
        }

        let ratio = blocked.route_length / clean.route_length;
        if ratio < threshold && !blocked.reached_destination(threshold) {
            vehicles.push(TruncatedVehicle {
                id:             blocked.id.clone(),
                clean_length:   clean.route_length,
                blocked_length: blocked.route_length,
                severity:       1.0 - ratio,
                intended_ratio,
            });
        }
    }

    vehicles.sort_by(|a, b| a.id.cmp(&b.id));

    let mut severities: Vec<f64> = vehicles.iter().map(|v| v.severity).collect();
    severities.sort_by(f64::total_cmp);

    let mut severity_histogram = [0u64; SEVERITY_BINS];
    for &s in &severities {
        let bin = (s * SEVERITY_BINS as f64).floor().max(0.0) as usize;
        severity_histogram[bin.min(SEVERITY_BINS - 1)] += 1;
    }

    let evaluated = matched - undefined_ratio;
    TruncationResult {
        threshold,
        matched,
        unmatched: overlap.clean_only + overlap.blocked_only,
        undefined_ratio,
        evaluated,
        truncated: vehicles.len(),
        truncated_ratio: fraction(vehicles.len(), evaluated),
        mean_severity: stats::mean(&severities),
        severities,
        severity_histogram,
        vehicles,
        intended: IntendedComparison {
            logged: intended_ratios.len(),
            mean_ratio: stats::mean(&intended_ratios),
            short_of_intended,
        },
    }
}
