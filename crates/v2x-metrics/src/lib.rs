//! `v2x-metrics` — comparative traffic-impact metrics.
//!
//! Every analysis is a pure function `(&ScenarioDataset, &AnalysisConfig) ->
//! Result`; none mutates its input and none reads ambient state.
//!
//! | Module          | Analysis                                                |
//! |-----------------|---------------------------------------------------------|
//! | [`congestion`]  | halting-count spikes over a rolling-median baseline     |
//! | [`time_loss`]   | per-variant time-loss histograms on shared edges        |
//! | [`truncation`]  | routes cut short in the Blocked run                     |
//! | [`rerouting`]   | time-loss delta of vehicles that rerouted               |
//! | [`overview`]    | headline aggregates and the departure/delay scatter     |
//! | [`engine`]      | `run_all`, `AnalysisReport`, `MetricResult`             |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs the analyses concurrently on Rayon's thread pool. |
//!
//! # Edge cases are counted, never dropped
//!
//! Incomplete trips, vehicles missing from one variant and zero-valued
//! denominators each have their own counter in the corresponding result.

pub mod congestion;
pub mod engine;
pub mod error;
pub mod overview;
pub mod rerouting;
pub mod stats;
pub mod time_loss;
pub mod truncation;


pub use congestion::{congestion_spikes, CongestionResult, SpikeInterval};
pub use engine::{run_all, AnalysisReport, MetricKind, MetricResult, OverlapRecord};
pub use error::{EngineError, EngineResult};
pub use overview::{impact_timing, overview, ImpactTimingResult, OverviewResult};
pub use rerouting::{rerouting_efficiency, ReroutingResult};
pub use time_loss::{time_loss_distribution, TimeLossResult};
pub use truncation::{route_truncation, TruncationResult};
