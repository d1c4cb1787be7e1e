//! The paired, validated dataset.

use std::path::Path;

use v2x_core::{Variant, VehicleId};
use v2x_logs::{ScenarioVariantLog, TripRecord};

use crate::{DatasetBuilder, DatasetResult};

/// How the vehicle-id sets of the two variants relate.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OverlapStats {
    /// Vehicles present in both variants.
    pub shared:       usize,
    pub clean_only:   usize,
    pub blocked_only: usize,
    /// `shared / (shared + clean_only + blocked_only)`; 0 for two empty sets.
    pub ratio:        f64,
}

impl OverlapStats {
    /// Compare the vehicle-id sets of two logs.
    pub fn between(clean: &ScenarioVariantLog, blocked: &ScenarioVariantLog) -> Self {
        let shared = clean
            .vehicle_ids()
            .filter(|id| blocked.contains_vehicle(id.as_str()))
            .count();
        let clean_only = clean.vehicle_count() - shared;
        let blocked_only = blocked.vehicle_count() - shared;
        let union = shared + clean_only + blocked_only;

        let ratio = if union == 0 { 0.0 } else { shared as f64 / union as f64 };
        Self { shared, clean_only, blocked_only, ratio }
    }
}

/// Clean and Blocked logs of one scenario, known to describe the same demand.
///
/// Read-only after construction, so any number of metric computations may
/// borrow it concurrently.
#[derive(Debug)]
pub struct ScenarioDataset {
    pub(crate) scenario: String,
    pub(crate) clean:    ScenarioVariantLog,
    pub(crate) blocked:  ScenarioVariantLog,
    pub(crate) overlap:  OverlapStats,
}

impl ScenarioDataset {
    /// Resolve, load and validate both variants of `scenario` under
    /// `logs_root`.
    ///
    /// Fails with `InconsistentScenario` when the id overlap is below
    /// `min_overlap_ratio`.
    pub fn build(scenario: &str, logs_root: &Path, min_overlap_ratio: f64) -> DatasetResult<Self> {
        DatasetBuilder::new(scenario, logs_root)
            .min_overlap_ratio(min_overlap_ratio)
            .build()
    }

    /// Pair two already-loaded logs, applying the same consistency check as
    /// [`build`][Self::build].
    pub fn from_logs(
        scenario:          &str,
        clean:             ScenarioVariantLog,
        blocked:           ScenarioVariantLog,
        min_overlap_ratio: f64,
    ) -> DatasetResult<Self> {
        DatasetBuilder::pair(scenario, clean, blocked, min_overlap_ratio)
    }

    #[inline]
    pub fn scenario(&self) -> &str {
        &self.scenario
    }

    #[inline]
    pub fn clean(&self) -> &ScenarioVariantLog {
        &self.clean
    }

    #[inline]
    pub fn blocked(&self) -> &ScenarioVariantLog {
        &self.blocked
    }

    pub fn variant(&self, variant: Variant) -> &ScenarioVariantLog {
        match variant {
            Variant::Clean => &self.clean,
            Variant::Blocked => &self.blocked,
        }
    }

    #[inline]
    pub fn overlap(&self) -> OverlapStats {
        self.overlap
    }

    /// The same vehicle's trip in the other variant, matched by id.
    pub fn counterpart(&self, trip: &TripRecord, of: Variant) -> Option<&TripRecord> {
        let other = match of {
            Variant::Clean => &self.blocked,
            Variant::Blocked => &self.clean,
        };
        other.trip(trip.id.as_str())
    }

    /// Every vehicle present in both variants as `(clean, blocked)`, in
    /// Clean-log order.
    pub fn matched_trips(&self) -> impl Iterator<Item = (&TripRecord, &TripRecord)> {
        self.clean
            .trips()
            .iter()
            .filter_map(|c| self.blocked.trip(c.id.as_str()).map(|b| (c, b)))
    }

    /// Ids present in exactly one variant, sorted.
    pub fn unmatched_ids(&self, variant: Variant) -> Vec<&VehicleId> {
        let (this, other) = match variant {
            Variant::Clean => (&self.clean, &self.blocked),
            Variant::Blocked => (&self.blocked, &self.clean),
        };
        let mut ids: Vec<&VehicleId> = this
            .vehicle_ids()
            .filter(|id| !other.contains_vehicle(id.as_str()))
            .collect();
        ids.sort();
        ids
    }
}
