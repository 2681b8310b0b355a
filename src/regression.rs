//! Regression measures over paired prediction/gold sequences.
//!
//! No confusion-matrix machinery here: every measure is a straight numeric
//! reduction over paired prediction/gold values. Degenerate inputs (empty
//! sequences, a zero-variance side) resolve through the same
//! [`ZeroDivision`] policy the classification measures use, never a panic.
//!
//! | Measure | Key | Notes |
//! |---------|-----|-------|
//! | Pearson correlation | `Correlation` | zero-variance side → policy |
//! | Spearman correlation | `SpearmanCorrelation` | average-rank ties |
//! | Mean absolute error | `MeanAbsoluteError` | |
//! | Mean squared error | `MeanSquaredError` | |
//! | Root mean squared error | `RootMeanSquaredError` | `sqrt(MSE)` |
//!
//! # Example
//!
//! ```rust
//! use tally::measure::ZeroDivision;
//! use tally::regression::pearson;
//!
//! let predictions = [1.0, 2.0, 3.0];
//! let golds = [2.0, 4.0, 6.0];
//! assert!((pearson(&predictions, &golds, ZeroDivision::Soft) - 1.0).abs() < 1e-9);
//! ```

use crate::measure::{keys, ratio, MeasureResult, ZeroDivision};
use crate::{Error, Result};

/// Pearson correlation coefficient between predictions and golds.
///
/// Only paired values enter the computation: a tail past the shorter
/// sequence is ignored ([`regression_measures`] rejects unequal lengths
/// up front). An empty input or a zero-variance side resolves through
/// the policy.
#[must_use]
pub fn pearson(predictions: &[f64], golds: &[f64], policy: ZeroDivision) -> f64 {
    let n = predictions.len().min(golds.len());
    let (predictions, golds) = (&predictions[..n], &golds[..n]);
    if n == 0 {
        return policy.resolve();
    }
    let mean_p = predictions.iter().sum::<f64>() / n as f64;
    let mean_g = golds.iter().sum::<f64>() / n as f64;

    let mut covariance = 0.0;
    let mut variance_p = 0.0;
    let mut variance_g = 0.0;
    for (p, g) in predictions.iter().zip(golds) {
        let dp = p - mean_p;
        let dg = g - mean_g;
        covariance += dp * dg;
        variance_p += dp * dp;
        variance_g += dg * dg;
    }

    ratio(covariance, (variance_p * variance_g).sqrt(), policy)
}

/// Spearman rank correlation between predictions and golds.
///
/// Both sequences are converted to ranks (ties share their average rank,
/// so the result does not depend on sort stability), then Pearson
/// correlation is taken over the ranks.
#[must_use]
pub fn spearman(predictions: &[f64], golds: &[f64], policy: ZeroDivision) -> f64 {
    pearson(&average_ranks(predictions), &average_ranks(golds), policy)
}

/// Mean absolute error over the paired values. An empty input resolves
/// through the policy; a tail past the shorter sequence is ignored.
#[must_use]
pub fn mean_absolute_error(predictions: &[f64], golds: &[f64], policy: ZeroDivision) -> f64 {
    let n = predictions.len().min(golds.len());
    let sum: f64 = predictions
        .iter()
        .zip(golds)
        .map(|(p, g)| (p - g).abs())
        .sum();
    ratio(sum, n as f64, policy)
}

/// Mean squared error over the paired values. An empty input resolves
/// through the policy; a tail past the shorter sequence is ignored.
#[must_use]
pub fn mean_squared_error(predictions: &[f64], golds: &[f64], policy: ZeroDivision) -> f64 {
    let n = predictions.len().min(golds.len());
    let sum: f64 = predictions
        .iter()
        .zip(golds)
        .map(|(p, g)| (p - g) * (p - g))
        .sum();
    ratio(sum, n as f64, policy)
}

/// Root mean squared error: `sqrt(MSE)`. A policy-resolved NaN from the
/// mean squared error flows through the square root unchanged.
#[must_use]
pub fn root_mean_squared_error(predictions: &[f64], golds: &[f64], policy: ZeroDivision) -> f64 {
    mean_squared_error(predictions, golds, policy).sqrt()
}

/// Compute the full regression measure set.
///
/// # Errors
///
/// [`Error::ShapeMismatch`] when the sequences differ in length.
pub fn regression_measures(
    predictions: &[f64],
    golds: &[f64],
    policy: ZeroDivision,
) -> Result<MeasureResult> {
    if predictions.len() != golds.len() {
        return Err(Error::shape_mismatch(format!(
            "{} predictions paired with {} gold values",
            predictions.len(),
            golds.len()
        )));
    }

    let mut result = MeasureResult::new();
    result.insert(keys::CORRELATION, pearson(predictions, golds, policy));
    result.insert(
        keys::SPEARMAN_CORRELATION,
        spearman(predictions, golds, policy),
    );
    result.insert(
        keys::MEAN_ABSOLUTE_ERROR,
        mean_absolute_error(predictions, golds, policy),
    );
    result.insert(
        keys::MEAN_SQUARED_ERROR,
        mean_squared_error(predictions, golds, policy),
    );
    result.insert(
        keys::ROOT_MEAN_SQUARED_ERROR,
        root_mean_squared_error(predictions, golds, policy),
    );
    Ok(result)
}

/// 1-based ranks with ties assigned the average of the positions they
/// span: `[1.0, 2.0, 2.0, 3.0]` ranks as `[1, 2.5, 2.5, 4]`.
fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    // total_cmp keeps the comparator a total order even for NaN input
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut ranks = vec![0.0; values.len()];
    let mut start = 0;
    while start < order.len() {
        let mut end = start;
        while end + 1 < order.len() && values[order[end + 1]] == values[order[start]] {
            end += 1;
        }
        let rank = (start + end) as f64 / 2.0 + 1.0;
        for &idx in &order[start..=end] {
            ranks[idx] = rank;
        }
        start = end + 1;
    }
    ranks
}
