//! Analysis configuration.
//!
//! Every threshold the metric engine uses lives in [`AnalysisConfig`] and is
//! passed explicitly into each computation.  There is no global state.

use crate::{CoreError, CoreResult};

/// Tunable parameters for one analysis run.
///
/// Typically built from CLI flags, optionally layered over a JSON file, and
/// handed by reference to the dataset builder and every metric.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct AnalysisConfig {
    /// Length of the trailing rolling-median window for the halting baseline,
    /// in seconds.  Default: 300.
    pub spike_window_secs: f64,

    /// A sample spikes when its halting count exceeds the baseline by more
    /// than this multiplier.  Default: 2.0.
    pub spike_factor: f64,

    /// Lower clamp applied to the baseline before multiplying.  Setting it to
    /// 1 stops a free-flowing network (median 0) from flagging every single
    /// stop.  Default: 0, no clamp.
    pub min_baseline: f64,

    /// Width of the time-loss histogram buckets, in seconds.  Default: 30.
    pub loss_hist_bucket_secs: f64,

    /// Blocked/Clean traveled-length ratio under which a vehicle that did not
    /// reach its destination counts as truncated.  Default: 0.95.
    pub truncation_ratio: f64,

    /// Minimum Jaccard overlap of vehicle ids between the two variants.
    /// Default: 0.9.
    pub min_overlap_ratio: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            spike_window_secs:     300.0,
            spike_factor:          2.0,
            min_baseline:          0.0,
            loss_hist_bucket_secs: 30.0,
            truncation_ratio:      0.95,
            min_overlap_ratio:     0.9,
        }
    }
}

impl AnalysisConfig {
    /// Reject values no analysis can work with.
    pub fn validate(&self) -> CoreResult<()> {
        positive("spike_window_secs", self.spike_window_secs)?;
        positive("spike_factor", self.spike_factor)?;
        positive("loss_hist_bucket_secs", self.loss_hist_bucket_secs)?;
        if !self.min_baseline.is_finite() || self.min_baseline < 0.0 {
            return Err(CoreError::Config(format!(
                "min_baseline must be a finite value >= 0, got {}",
                self.min_baseline
            )));
        }
        fraction("truncation_ratio", self.truncation_ratio)?;
        fraction("min_overlap_ratio", self.min_overlap_ratio)?;
        Ok(())
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn positive(name: &str, value: f64) -> CoreResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(CoreError::Config(format!("{name} must be a finite value > 0, got {value}")))
    }
}

fn fraction(name: &str, value: f64) -> CoreResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(CoreError::Config(format!("{name} must lie in [0, 1], got {value}")))
    }
}
