//! Fluent builder for constructing a [`ScenarioDataset`].

use std::path::{Path, PathBuf};

use log::{info, warn};

use v2x_core::{CoreError, Variant};
use v2x_logs::{load_variant, ScenarioVariantLog};

use crate::{DatasetError, DatasetResult, OverlapStats, ScenarioDataset, ScenarioPaths};

/// Default minimum vehicle-id overlap between the two variants.
pub const DEFAULT_MIN_OVERLAP: f64 = 0.9;

/// Fluent builder for [`ScenarioDataset`].
///
/// # Required inputs
///
/// - scenario name — selects `<name>-logs/`
/// - logs root — the directory containing `<name>-logs/`
///
/// # Optional inputs (have defaults)
///
/// | Method                     | Default                                  |
/// |----------------------------|------------------------------------------|
/// | `.min_overlap_ratio(r)`    | `0.9`                                    |
/// | `.paths(p)`                | resolved by [`ScenarioPaths::resolve`]   |
///
/// # Example
///
/// ```rust,ignore
/// let dataset = DatasetBuilder::new("Downtown", Path::new("runs"))
///     .min_overlap_ratio(0.95)
///     .build()?;
/// ```
pub struct DatasetBuilder {
    scenario:    String,
    logs_root:   PathBuf,
    min_overlap: f64,
    paths:       Option<ScenarioPaths>,
}

impl DatasetBuilder {
    pub fn new(scenario: impl Into<String>, logs_root: impl AsRef<Path>) -> Self {
        Self {
            scenario:    scenario.into(),
            logs_root:   logs_root.as_ref().to_path_buf(),
            min_overlap: DEFAULT_MIN_OVERLAP,
            paths:       None,
        }
    }

    /// Minimum Jaccard overlap of vehicle ids, in `[0, 1]`.
    pub fn min_overlap_ratio(mut self, ratio: f64) -> Self {
        self.min_overlap = ratio;
        self
    }

    /// Use explicit log paths instead of the directory convention.
    pub fn paths(mut self, paths: ScenarioPaths) -> Self {
        self.paths = Some(paths);
        self
    }

    /// Resolve paths, load both variants and run the consistency check.
    pub fn build(self) -> DatasetResult<ScenarioDataset> {
        check_ratio(self.min_overlap)?;

        let paths = match self.paths {
            Some(p) => p,
            None => ScenarioPaths::resolve(&self.scenario, &self.logs_root)?,
        };

        // ── Load each variant independently ───────────────────────────────
        let clean = load_variant(Variant::Clean, &paths.clean.trips, &paths.clean.summary)?;
        let blocked = load_variant(Variant::Blocked, &paths.blocked.trips, &paths.blocked.summary)?;

        Self::pair(&self.scenario, clean, blocked, self.min_overlap)
    }

    /// Validate and pair two loaded logs.
    pub(crate) fn pair(
        scenario:    &str,
        clean:       ScenarioVariantLog,
        blocked:     ScenarioVariantLog,
        min_overlap: f64,
    ) -> DatasetResult<ScenarioDataset> {
        check_ratio(min_overlap)?;
        expect_variant(&clean, Variant::Clean)?;
        expect_variant(&blocked, Variant::Blocked)?;

        let overlap = OverlapStats::between(&clean, &blocked);
        if overlap.ratio < min_overlap {
            return Err(DatasetError::InconsistentScenario {
                scenario:     scenario.to_owned(),
                overlap:      overlap.ratio,
                min_overlap,
                clean_only:   overlap.clean_only,
                blocked_only: overlap.blocked_only,
            });
        }

        if overlap.clean_only + overlap.blocked_only > 0 {
            warn!(
                "{scenario}: {} vehicles only in Clean, {} only in Blocked; they are excluded from paired metrics",
                overlap.clean_only, overlap.blocked_only
            );
        }
        info!(
            "{scenario}: paired {} shared vehicles (overlap {:.3})",
            overlap.shared, overlap.ratio
        );

        Ok(ScenarioDataset {
            scenario: scenario.to_owned(),
            clean,
            blocked,
            overlap,
        })
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn check_ratio(ratio: f64) -> DatasetResult<()> {
    if (0.0..=1.0).contains(&ratio) {
        Ok(())
    } else {
        Err(CoreError::Config(format!("min_overlap_ratio must lie in [0, 1], got {ratio}")).into())
    }
}

fn expect_variant(log: &ScenarioVariantLog, expected: Variant) -> DatasetResult<()> {
    if log.variant() == expected {
        Ok(())
    } else {
        Err(DatasetError::VariantMismatch { expected, got: log.variant() })
    }
}
