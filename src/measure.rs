//! Measure calculators and the evaluation result mapping.
//!
//! Every classification measure here is computed from a
//! [`ContingencyTable`] with the four textbook formulas:
//!
//! ```text
//! precision = TP / (TP + FP)
//! recall    = TP / (TP + FN)
//! fscore    = 2·P·R / (P + R)
//! accuracy  = (TP + TN) / (TP + FP + FN + TN)
//! ```
//!
//! Division by zero is never an error and never a panic. It resolves
//! through the caller-supplied [`ZeroDivision`] policy: soft evaluation
//! turns a degenerate ratio into `0.0`, hard evaluation into `NaN`. The
//! policy applies uniformly, inside the F-score's own division and inside
//! macro averages included, so under hard evaluation one degenerate class
//! makes the macro value `NaN` rather than being silently skipped.
//!
//! [`MeasureResult`] is the name → value mapping every evaluator returns.
//! It is backed by an ordered map, so iteration, serialization, and
//! repeated runs on the same input are bit-identical.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::contingency::{combine, decompose, ContingencyTable};
use crate::matrix::ConfusionMatrix;

/// Well-known measure names used as [`MeasureResult`] keys.
pub mod keys {
    /// Arithmetic mean of per-class precisions.
    pub const MACRO_PRECISION: &str = "MacroPrecision";
    /// Arithmetic mean of per-class recalls.
    pub const MACRO_RECALL: &str = "MacroRecall";
    /// Arithmetic mean of per-class accuracies.
    pub const MACRO_ACCURACY: &str = "MacroAccuracy";
    /// Arithmetic mean of per-class F-scores.
    pub const MACRO_FSCORE: &str = "MacroFScore";
    /// Precision of the combined (summed) contingency table.
    pub const MICRO_PRECISION: &str = "MicroPrecision";
    /// Recall of the combined contingency table.
    pub const MICRO_RECALL: &str = "MicroRecall";
    /// Accuracy of the combined contingency table.
    pub const MICRO_ACCURACY: &str = "MicroAccuracy";
    /// F-score of the combined contingency table.
    pub const MICRO_FSCORE: &str = "MicroFScore";
    /// Diagonal mass over total mass of the confusion matrix. Exact-match
    /// accuracy in multi-label mode.
    pub const ACCURACY: &str = "Accuracy";

    /// Pearson correlation coefficient (regression mode).
    pub const CORRELATION: &str = "Correlation";
    /// Spearman rank correlation (regression mode).
    pub const SPEARMAN_CORRELATION: &str = "SpearmanCorrelation";
    /// Mean absolute error (regression mode).
    pub const MEAN_ABSOLUTE_ERROR: &str = "MeanAbsoluteError";
    /// Mean squared error (regression mode).
    pub const MEAN_SQUARED_ERROR: &str = "MeanSquaredError";
    /// Root mean squared error (regression mode).
    pub const ROOT_MEAN_SQUARED_ERROR: &str = "RootMeanSquaredError";

    /// Key for a per-label measure entry, e.g. `Precision_3`.
    #[must_use]
    pub fn individual(measure: &str, label: &str) -> String {
        format!("{measure}_{label}")
    }
}

/// Policy for resolving division by zero inside a measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZeroDivision {
    /// A degenerate ratio evaluates to `0.0`.
    #[default]
    Soft,
    /// A degenerate ratio evaluates to `NaN`.
    Hard,
}

impl ZeroDivision {
    /// The value a zero denominator resolves to under this policy.
    #[must_use]
    pub fn resolve(self) -> f64 {
        match self {
            ZeroDivision::Soft => 0.0,
            ZeroDivision::Hard => f64::NAN,
        }
    }
}

/// `numerator / denominator`, with a zero denominator resolved by the
/// policy instead of producing an IEEE infinity or NaN by accident.
#[must_use]
pub fn ratio(numerator: f64, denominator: f64, policy: ZeroDivision) -> f64 {
    if denominator == 0.0 {
        policy.resolve()
    } else {
        numerator / denominator
    }
}

/// `TP / (TP + FP)`.
#[must_use]
pub fn precision(table: &ContingencyTable, policy: ZeroDivision) -> f64 {
    ratio(
        table.true_positives,
        table.true_positives + table.false_positives,
        policy,
    )
}

/// `TP / (TP + FN)`.
#[must_use]
pub fn recall(table: &ContingencyTable, policy: ZeroDivision) -> f64 {
    ratio(
        table.true_positives,
        table.true_positives + table.false_negatives,
        policy,
    )
}

/// Harmonic mean of precision and recall. The outer division follows the
/// same policy; a NaN precision or recall from hard evaluation flows
/// through unchanged.
#[must_use]
pub fn fscore(table: &ContingencyTable, policy: ZeroDivision) -> f64 {
    let p = precision(table, policy);
    let r = recall(table, policy);
    ratio(2.0 * p * r, p + r, policy)
}

/// `(TP + TN) / (TP + FP + FN + TN)`.
#[must_use]
pub fn accuracy(table: &ContingencyTable, policy: ZeroDivision) -> f64 {
    ratio(table.true_positives + table.true_negatives, table.total(), policy)
}

/// Plain arithmetic mean over per-class values. An empty slice resolves
/// through the policy; NaN values propagate into the mean.
#[must_use]
pub fn macro_average(values: &[f64], policy: ZeroDivision) -> f64 {
    ratio(values.iter().sum(), values.len() as f64, policy)
}

/// Mapping from measure name to value.
///
/// NaN is a valid, meaningful value under hard evaluation; consumers
/// deciding between "measure is zero" and "measure was degenerate" should
/// run hard and check [`f64::is_nan`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeasureResult {
    values: BTreeMap<String, f64>,
}

impl MeasureResult {
    /// Create an empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a measure.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.values.insert(name.into(), value);
    }

    /// Look up a measure by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Number of measures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no measure has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Measures in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Move all entries of `other` into this result, overwriting
    /// duplicates.
    pub fn merge(&mut self, other: MeasureResult) {
        self.values.extend(other.values);
    }
}

impl fmt::Display for MeasureResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.values {
            writeln!(f, "{name} = {value}")?;
        }
        Ok(())
    }
}

impl FromIterator<(String, f64)> for MeasureResult {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        MeasureResult {
            values: iter.into_iter().collect(),
        }
    }
}

/// Compute the full classification measure set from a confusion matrix:
/// decompose into per-class tables, combine for the micro measures,
/// macro-average the per-class values, and add the overall accuracy.
///
/// With `individual_labels` set, per-label entries
/// (`Precision_<label>`, `Recall_<label>`, `FScore_<label>`,
/// `Accuracy_<label>`) are added for every decomposition label.
#[must_use]
pub fn classification_measures(
    matrix: &ConfusionMatrix,
    policy: ZeroDivision,
    individual_labels: bool,
) -> MeasureResult {
    let tables = decompose(matrix);
    let combined = combine(&tables);

    let per_class_precision: Vec<f64> = tables.iter().map(|t| precision(t, policy)).collect();
    let per_class_recall: Vec<f64> = tables.iter().map(|t| recall(t, policy)).collect();
    let per_class_fscore: Vec<f64> = tables.iter().map(|t| fscore(t, policy)).collect();
    let per_class_accuracy: Vec<f64> = tables.iter().map(|t| accuracy(t, policy)).collect();

    let mut result = MeasureResult::new();
    result.insert(keys::MACRO_PRECISION, macro_average(&per_class_precision, policy));
    result.insert(keys::MACRO_RECALL, macro_average(&per_class_recall, policy));
    result.insert(keys::MACRO_FSCORE, macro_average(&per_class_fscore, policy));
    result.insert(keys::MACRO_ACCURACY, macro_average(&per_class_accuracy, policy));
    result.insert(keys::MICRO_PRECISION, precision(&combined, policy));
    result.insert(keys::MICRO_RECALL, recall(&combined, policy));
    result.insert(keys::MICRO_FSCORE, fscore(&combined, policy));
    result.insert(keys::MICRO_ACCURACY, accuracy(&combined, policy));
    result.insert(keys::ACCURACY, ratio(matrix.diagonal(), matrix.total(), policy));

    if individual_labels {
        for (c, table) in tables.iter().enumerate() {
            let label = matrix.decomposition_label_name(c);
            result.insert(keys::individual("Precision", &label), precision(table, policy));
            result.insert(keys::individual("Recall", &label), recall(table, policy));
            result.insert(keys::individual("FScore", &label), fscore(table, policy));
            result.insert(keys::individual("Accuracy", &label), accuracy(table, policy));
        }
    }

    result
}
