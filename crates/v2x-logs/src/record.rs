//! Typed log records and the per-variant log container.

use rustc_hash::FxHashMap;

use v2x_core::{SimTime, Variant, VehicleId};

// ── TripRecord ────────────────────────────────────────────────────────────────

/// One vehicle's trip, as written when it arrived (or was removed).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TripRecord {
    pub id:                    VehicleId,
    pub depart:                SimTime,
    /// `None` when the trip never completed (the simulator writes `-1`).
    pub arrival:               Option<SimTime>,
    /// Distance actually traveled, in meters.
    pub route_length:          f64,
    /// Length of the originally planned route, when the run logs it.
    pub intended_route_length: Option<f64>,
    /// Total delay versus free-flow travel, in seconds.  Always `>= 0`.
    pub time_loss:             f64,
    pub duration:              Option<f64>,
    pub waiting_time:          f64,
    pub reroute_count:         u32,
    /// Removal reason when the vehicle was vaporized instead of arriving.
    pub vaporized:             Option<String>,
}

impl TripRecord {
    /// Did the vehicle reroute at least once?
    #[inline]
    pub fn rerouted(&self) -> bool {
        self.reroute_count > 0
    }

    /// `true` when the vehicle arrived normally.
    #[inline]
    pub fn completed(&self) -> bool {
        self.arrival.is_some() && self.vaporized.is_none()
    }

    /// Did the trip reach the destination it set out for?
    ///
    /// A completed trip whose traveled length falls below `ratio` times the
    /// logged intended length ended somewhere short of its original target.
    pub fn reached_destination(&self, ratio: f64) -> bool {
        if !self.completed() {
            return false;
        }
        match self.intended_route_length {
            Some(intended) if intended > 0.0 => self.route_length >= ratio * intended,
            _ => true,
        }
    }
}

// ── SummarySnapshot ───────────────────────────────────────────────────────────

/// Network-wide state at one sampling step.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SummarySnapshot {
    pub time:       SimTime,
    pub running:    u32,
    /// Mean speed over running vehicles in m/s; `None` when none are running.
    pub mean_speed: Option<f64>,
    pub halting:    u32,
}

// ── ScenarioVariantLog ────────────────────────────────────────────────────────

/// All records of one variant of one scenario.  Immutable after construction.
#[derive(Clone, Debug)]
pub struct ScenarioVariantLog {
    variant:   Variant,
    trips:     Vec<TripRecord>,
    snapshots: Vec<SummarySnapshot>,
    /// Vehicle id → index into `trips`.
    index:     FxHashMap<VehicleId, usize>,
}

impl ScenarioVariantLog {
    /// Bundle loaded records.  Trips are expected to have unique ids (the
    /// loader guarantees it); if not, lookups resolve to the first record.
    pub fn new(variant: Variant, trips: Vec<TripRecord>, snapshots: Vec<SummarySnapshot>) -> Self {
        let mut index = FxHashMap::with_capacity_and_hasher(trips.len(), Default::default());
        for (i, trip) in trips.iter().enumerate() {
            index.entry(trip.id.clone()).or_insert(i);
        }
        Self { variant, trips, snapshots, index }
    }

    #[inline]
    pub fn variant(&self) -> Variant {
        self.variant
    }

    #[inline]
    pub fn trips(&self) -> &[TripRecord] {
        &self.trips
    }

    #[inline]
    pub fn snapshots(&self) -> &[SummarySnapshot] {
        &self.snapshots
    }

    /// Look up a vehicle's trip by id.
    pub fn trip(&self, id: &str) -> Option<&TripRecord> {
        self.index.get(id).map(|&i| &self.trips[i])
    }

    pub fn contains_vehicle(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Iterate over the distinct vehicle ids of this variant.
    pub fn vehicle_ids(&self) -> impl Iterator<Item = &VehicleId> {
        self.index.keys()
    }

    pub fn vehicle_count(&self) -> usize {
        self.index.len()
    }

    /// Spacing between consecutive summary steps, or `None` with fewer than
    /// two snapshots.
    pub fn sampling_interval(&self) -> Option<f64> {
        match self.snapshots.as_slice() {
            [a, b, ..] => Some(b.time - a.time),
            _ => None,
        }
    }
}
