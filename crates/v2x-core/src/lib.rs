//! `v2x-core` — foundational types for the `v2x_impact` log analyzer.
//!
//! This crate is a dependency of every other `v2x-*` crate.  It has no
//! `v2x-*` dependencies and minimal external ones (only `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `VehicleId`                                           |
//! | [`time`]        | `SimTime`                                             |
//! | [`variant`]     | `Variant` (`Clean` / `Blocked`)                       |
//! | [`config`]      | `AnalysisConfig` and its defaults                     |
//! | [`error`]       | `CoreError`, `CoreResult`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod ids;
pub mod time;
pub mod variant;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::AnalysisConfig;
pub use error::{CoreError, CoreResult};
pub use ids::VehicleId;
pub use time::SimTime;
pub use variant::Variant;
