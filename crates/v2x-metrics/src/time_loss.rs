//! Time-loss distribution.
//!
//! Both variants are bucketed on one shared set of edges so the histograms
//! can be compared bar for bar.  With width `w`, minimum `lo` and maximum
//! `hi` over *both* variants:
//!
//! ```text
//! first edge = floor(lo / w) · w
//! last edge  = floor(hi / w) · w + w
//! bucket k   = [first + k·w, first + (k+1)·w)
//! ```
//!
//! Only completed trips contribute; vehicles that never arrived are counted
//! as `incomplete` per variant.

use serde::Serialize;

use v2x_core::{AnalysisConfig, Variant};
use v2x_dataset::ScenarioDataset;
use v2x_logs::ScenarioVariantLog;

use crate::stats::Summary;

/// Histogram of one variant on the shared edges.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct VariantTimeLoss {
    pub variant:    Variant,
    /// One count per bucket; `counts.len() == edges.len() - 1`.
    pub counts:     Vec<u64>,
    pub completed:  usize,
    pub incomplete: usize,
    pub stats:      Option<Summary>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimeLossResult {
    pub bucket_width: f64,
    /// Bucket boundaries shared by both variants; empty when no trip completed.
    pub edges:        Vec<f64>,
    pub clean:        VariantTimeLoss,
    pub blocked:      VariantTimeLoss,
}

impl TimeLossResult {
    pub fn variant(&self, variant: Variant) -> &VariantTimeLoss {
        match variant {
            Variant::Clean => &self.clean,
            Variant::Blocked => &self.blocked,
        }
    }

    /// Half-open `[lo, hi)` range of bucket `k`.
    pub fn bucket(&self, k: usize) -> Option<(f64, f64)> {
        Some((*self.edges.get(k)?, *self.edges.get(k + 1)?))
    }

    /// Index of the bucket holding `value`, if it lies inside the edges.
    pub fn bucket_of(&self, value: f64) -> Option<usize> {
        let (first, last) = (*self.edges.first()?, *self.edges.last()?);
        if value < first || value >= last {
            return None;
        }
        let k = (value / self.bucket_width).floor() - (first / self.bucket_width).round();
        Some((k.max(0.0) as usize).min(self.edges.len() - 2))
    }
}

/// Build comparable time-loss histograms for both variants.
pub fn time_loss_distribution(dataset: &ScenarioDataset, config: &AnalysisConfig) -> TimeLossResult {
    let width = config.loss_hist_bucket_secs;
    let clean_values = completed_losses(dataset.clean());
    let blocked_values = completed_losses(dataset.blocked());

    let range = clean_values
        .iter()
        .chain(&blocked_values)
        .fold(None, |acc: Option<(f64, f64)>, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        });

    let (first_bucket, bucket_count) = match range {
        Some((lo, hi)) => {
            let first = (lo / width).floor();
            let last = (hi / width).floor();
            (first, (last - first) as usize + 1)
        }
        None => (0.0, 0),
    };

    let edges: Vec<f64> = if bucket_count == 0 {
        Vec::new()
    } else {
        (0..=bucket_count).map(|k| (first_bucket + k as f64) * width).collect()
    };

    let bucketize = |log: &ScenarioVariantLog, values: &[f64]| {
        let mut counts = vec![0u64; bucket_count];
        for &v in values {
            let k = ((v / width).floor() - first_bucket).max(0.0) as usize;
            counts[k.min(bucket_count - 1)] += 1;
        }
        VariantTimeLoss {
            variant:    log.variant(),
            counts,
            completed:  values.len(),
            incomplete: log.trips().len() - values.len(),
            stats:      Summary::of(values),
        }
    };

    TimeLossResult {
        bucket_width: width,
        clean: bucketize(dataset.clean(), &clean_values),
        blocked: bucketize(dataset.blocked(), &blocked_values),
        edges,
    }
}

fn completed_losses(log: &ScenarioVariantLog) -> Vec<f64> {
    log.trips()
        .iter()
        .filter(|t| t.completed())
        .map(|t| t.time_loss)
        .collect()
}
