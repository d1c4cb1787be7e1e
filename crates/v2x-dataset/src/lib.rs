//! `v2x-dataset` — pairs the Clean and Blocked logs of one scenario.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                  |
//! |--------------|-----------------------------------------------------------|
//! | [`layout`]   | `ScenarioPaths`, `VariantPaths` — on-disk log resolution  |
//! | [`builder`]  | `DatasetBuilder`                                          |
//! | [`dataset`]  | `ScenarioDataset`, `OverlapStats`                         |
//! | [`error`]    | `DatasetError`, `DatasetResult<T>`                        |
//!
//! # Consistency
//!
//! Comparing two runs only makes sense when they share road network and
//! demand.  The best available evidence is the vehicle-id sets: their Jaccard
//! overlap must reach the configured minimum, otherwise construction fails
//! with [`DatasetError::InconsistentScenario`].  A `ScenarioDataset` value
//! therefore always satisfies the check, and metric code never needs to
//! re-verify it.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use v2x_dataset::ScenarioDataset;
//!
//! let dataset = ScenarioDataset::build("Downtown", Path::new("runs"), 0.9)?;
//! println!("{} shared vehicles", dataset.overlap().shared);
//! ```

pub mod builder;
pub mod dataset;
pub mod error;
pub mod layout;

#[cfg(test)]
mod tests;

pub use builder::DatasetBuilder;
pub use dataset::{OverlapStats, ScenarioDataset};
pub use error::{DatasetError, DatasetResult};
pub use layout::{ScenarioPaths, VariantPaths};
