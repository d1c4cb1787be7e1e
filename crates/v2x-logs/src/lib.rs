//! `v2x-logs` — typed loading of the simulator's output logs.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                    |
//! |--------------|-------------------------------------------------------------|
//! | [`record`]   | `TripRecord`, `SummarySnapshot`, `ScenarioVariantLog`       |
//! | [`loader`]   | `load_trips`, `load_summary`, `load_log`, `load_variant`    |
//! | [`error`]    | `LogError`, `LogResult<T>`                                  |
//!
//! # Source formats
//!
//! Both inputs are tag/attribute trees written by the micro-simulator:
//!
//! ```xml
//! <tripinfos>
//!     <tripinfo id="veh0" depart="0.00" arrival="212.00" duration="212.00"
//!               routeLength="1840.22" waitingTime="31.00" timeLoss="64.12"
//!               rerouteNo="1" vaporized=""/>
//! </tripinfos>
//!
//! <summary>
//!     <step time="0.00" running="12" halting="0" meanSpeed="11.83"/>
//! </summary>
//! ```
//!
//! Unknown attributes and child elements are ignored; required attributes are
//! never defaulted.  The loader performs validation only, no aggregation.

pub mod error;
pub mod loader;
pub mod record;

#[cfg(test)]
mod tests;

pub use error::{LogError, LogResult};
pub use loader::{
    load_log, load_summary, load_summary_str, load_trips, load_trips_str, load_variant,
    ParsedLog, RecordKind,
};
pub use record::{ScenarioVariantLog, SummarySnapshot, TripRecord};
