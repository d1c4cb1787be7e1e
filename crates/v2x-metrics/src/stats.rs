//! Small descriptive-statistics helpers shared by the analyses.

use serde::Serialize;

/// Descriptive statistics of a non-empty sample.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Summary {
    pub count:   usize,
    pub mean:    f64,
    pub median:  f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min:     f64,
    pub max:     f64,
}

impl Summary {
    /// `None` for an empty sample.
    pub fn of(values: &[f64]) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let (&min, &max) = (sorted.first()?, sorted.last()?);
        let mean = mean(&sorted)?;
        let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / sorted.len() as f64;

        Some(Self {
            count: sorted.len(),
            mean,
            median: median_sorted(&sorted)?,
            std_dev: variance.sqrt(),
            min,
            max,
        })
    }
}

/// Five-number summary, as drawn by a box plot.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Quartiles {
    pub min:    f64,
    pub q1:     f64,
    pub median: f64,
    pub q3:     f64,
    pub max:    f64,
}

impl Quartiles {
    /// `None` for an empty sample.  Quartiles interpolate linearly between
    /// the neighbouring order statistics.
    pub fn of(values: &[f64]) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let (&min, &max) = (sorted.first()?, sorted.last()?);
        Some(Self {
            min,
            q1: quantile_sorted(&sorted, 0.25),
            median: median_sorted(&sorted)?,
            q3: quantile_sorted(&sorted, 0.75),
            max,
        })
    }
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn median(values: &[f64]) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    median_sorted(&sorted)
}

fn median_sorted(sorted: &[f64]) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    Some(if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    })
}

/// `sorted` must be non-empty.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let (lo, hi) = (pos.floor() as usize, pos.ceil() as usize);
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// `part / whole`, or 0 when `whole` is 0.
pub fn fraction(part: usize, whole: usize) -> f64 {
    if whole == 0 { 0.0 } else { part as f64 / whole as f64 }
}
