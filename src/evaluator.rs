//! Learning-mode dispatch and the evaluation facade.
//!
//! External configuration names one of three learning modes; everything
//! else follows from it:
//!
//! | Mode | Records carry | Pipeline |
//! |------|---------------|----------|
//! | `singleLabel` | one class index per side | dense matrix → decompose → measures |
//! | `multiLabel` | score vectors + threshold | sparse matrix → decompose → measures |
//! | `regression` | one numeric per side | paired-sequence reductions |
//!
//! Each pipeline sits behind a small evaluator type implementing
//! [`Evaluator`], all with the same
//! `calculate_measures(&records) -> Result<MeasureResult>` contract. The
//! free functions [`evaluate_records`] and [`evaluate_lines`] are the
//! usual entry points; [`evaluate_lines_with_mode`] additionally parses
//! the mode from its raw configuration string and rejects unknown modes
//! before touching any record.
//!
//! # Example
//!
//! ```rust
//! use tally::{evaluate_lines, EvalConfig, LearningMode};
//!
//! let lines = ["0;0;0.5", "1;1;0.5", "1;0;0.5"];
//! let result =
//!     evaluate_lines(LearningMode::SingleLabel, lines, &EvalConfig::default()).unwrap();
//! assert!((result.get("Accuracy").unwrap() - 2.0 / 3.0).abs() < 1e-9);
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::matrix::ConfusionMatrix;
use crate::measure::{classification_measures, MeasureResult, ZeroDivision};
use crate::record::OutcomeRecord;
use crate::regression::regression_measures;
use crate::{Error, Result};

/// The three learning modes this engine evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LearningMode {
    /// One discrete class choice per record.
    SingleLabel,
    /// A score vector per record side, binarized by the record threshold.
    MultiLabel,
    /// One numeric prediction per record.
    Regression,
}

impl LearningMode {
    /// All available modes.
    pub fn all() -> &'static [LearningMode] {
        &[
            LearningMode::SingleLabel,
            LearningMode::MultiLabel,
            LearningMode::Regression,
        ]
    }

    /// Canonical configuration-string name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            LearningMode::SingleLabel => "singleLabel",
            LearningMode::MultiLabel => "multiLabel",
            LearningMode::Regression => "regression",
        }
    }

    /// Description of what this mode evaluates.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            LearningMode::SingleLabel => "One class per instance (dense confusion matrix)",
            LearningMode::MultiLabel => {
                "Thresholded label sets per instance (sparse combination matrix)"
            }
            LearningMode::Regression => "Numeric prediction per instance (correlation and error)",
        }
    }
}

impl FromStr for LearningMode {
    type Err = Error;

    /// Parse a mode from an external configuration string.
    ///
    /// Matching ignores case and `-`/`_` separators: `"single-label"`,
    /// `"singleLabel"`, and `"SINGLE_LABEL"` all parse to
    /// [`LearningMode::SingleLabel`].
    fn from_str(s: &str) -> Result<Self> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "singlelabel" => Ok(LearningMode::SingleLabel),
            "multilabel" => Ok(LearningMode::MultiLabel),
            "regression" => Ok(LearningMode::Regression),
            _ => Err(Error::invalid_learning_mode(s)),
        }
    }
}

impl std::fmt::Display for LearningMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Configuration for one evaluation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// How division by zero inside a measure resolves.
    pub zero_division: ZeroDivision,
    /// Add per-label measure entries (`Precision_<label>` and friends)
    /// to classification results. Ignored in regression mode.
    pub individual_labels: bool,
}

impl EvalConfig {
    /// Default configuration: soft evaluation, no per-label entries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the zero-division policy.
    #[must_use]
    pub fn with_zero_division(mut self, policy: ZeroDivision) -> Self {
        self.zero_division = policy;
        self
    }

    /// Request per-label measure entries.
    #[must_use]
    pub fn with_individual_labels(mut self, enabled: bool) -> Self {
        self.individual_labels = enabled;
        self
    }
}

/// One evaluation pipeline: records in, measure mapping out.
///
/// Implementations never mutate the records; running the same evaluator
/// twice on the same records yields bit-identical results.
pub trait Evaluator: Send + Sync {
    /// Compute every measure this pipeline defines.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedRecord`] when a record does not fit the mode,
    /// [`Error::ShapeMismatch`] when records disagree on shape.
    fn calculate_measures(&self, records: &[OutcomeRecord]) -> Result<MeasureResult>;
}

/// Single-label pipeline: dense confusion matrix, one-vs-rest
/// decomposition, micro/macro measures.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleLabelEvaluator {
    config: EvalConfig,
}

impl SingleLabelEvaluator {
    /// Create an evaluator with the given configuration.
    #[must_use]
    pub fn new(config: EvalConfig) -> Self {
        Self { config }
    }
}

impl Evaluator for SingleLabelEvaluator {
    fn calculate_measures(&self, records: &[OutcomeRecord]) -> Result<MeasureResult> {
        warn_if_empty(records);
        let matrix = ConfusionMatrix::from_single_label(records)?;
        Ok(classification_measures(
            &matrix,
            self.config.zero_division,
            self.config.individual_labels,
        ))
    }
}

/// Multi-label pipeline: sparse combination matrix over thresholded
/// bipartitions, decomposed per label position.
#[derive(Debug, Clone, Copy, Default)]
pub struct MultiLabelEvaluator {
    config: EvalConfig,
}

impl MultiLabelEvaluator {
    /// Create an evaluator with the given configuration.
    #[must_use]
    pub fn new(config: EvalConfig) -> Self {
        Self { config }
    }
}

impl Evaluator for MultiLabelEvaluator {
    fn calculate_measures(&self, records: &[OutcomeRecord]) -> Result<MeasureResult> {
        warn_if_empty(records);
        let matrix = ConfusionMatrix::from_multi_label(records)?;
        Ok(classification_measures(
            &matrix,
            self.config.zero_division,
            self.config.individual_labels,
        ))
    }
}

/// Regression pipeline: correlation and error measures over the paired
/// prediction/gold values.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegressionEvaluator {
    config: EvalConfig,
}

impl RegressionEvaluator {
    /// Create an evaluator with the given configuration.
    #[must_use]
    pub fn new(config: EvalConfig) -> Self {
        Self { config }
    }
}

impl Evaluator for RegressionEvaluator {
    fn calculate_measures(&self, records: &[OutcomeRecord]) -> Result<MeasureResult> {
        warn_if_empty(records);
        let mut predictions = Vec::with_capacity(records.len());
        let mut golds = Vec::with_capacity(records.len());
        for record in records {
            predictions.push(record.regression_value(&record.predicted, "predicted")?);
            golds.push(record.regression_value(&record.gold, "gold")?);
        }
        regression_measures(&predictions, &golds, self.config.zero_division)
    }
}

/// The evaluator for a learning mode, as a trait object.
#[must_use]
pub fn evaluator_for(mode: LearningMode, config: EvalConfig) -> Box<dyn Evaluator> {
    match mode {
        LearningMode::SingleLabel => Box::new(SingleLabelEvaluator::new(config)),
        LearningMode::MultiLabel => Box::new(MultiLabelEvaluator::new(config)),
        LearningMode::Regression => Box::new(RegressionEvaluator::new(config)),
    }
}

/// Evaluate pre-parsed records under a learning mode.
///
/// # Errors
///
/// Whatever the mode's pipeline reports: [`Error::MalformedRecord`] or
/// [`Error::ShapeMismatch`].
pub fn evaluate_records(
    mode: LearningMode,
    records: &[OutcomeRecord],
    config: &EvalConfig,
) -> Result<MeasureResult> {
    log::info!(
        "evaluating {} records in {} mode",
        records.len(),
        mode.name()
    );
    evaluator_for(mode, *config).calculate_measures(records)
}

/// Parse raw outcome lines, then evaluate them under a learning mode.
///
/// Blank lines and `#` comments are skipped; parse errors carry 1-based
/// line numbers.
///
/// # Errors
///
/// [`Error::MalformedRecord`] for an unparseable line, then whatever the
/// pipeline reports.
pub fn evaluate_lines<I, S>(
    mode: LearningMode,
    lines: I,
    config: &EvalConfig,
) -> Result<MeasureResult>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let records = OutcomeRecord::parse_lines(lines)?;
    evaluate_records(mode, &records, config)
}

/// Like [`evaluate_lines`], but with the learning mode still in its raw
/// configuration-string form.
///
/// # Errors
///
/// [`Error::InvalidLearningMode`] for an unrecognized mode string,
/// reported before any line is parsed; then as [`evaluate_lines`].
pub fn evaluate_lines_with_mode<I, S>(
    mode: &str,
    lines: I,
    config: &EvalConfig,
) -> Result<MeasureResult>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mode = LearningMode::from_str(mode)?;
    evaluate_lines(mode, lines, config)
}

fn warn_if_empty(records: &[OutcomeRecord]) {
    if records.is_empty() {
        log::warn!("evaluation run has no records; measures resolve via the zero-division policy");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::keys;

    fn single(predicted: f64, gold: f64) -> OutcomeRecord {
        OutcomeRecord::new("r", vec![predicted], vec![gold], 0.5)
    }

    #[test]
    fn test_mode_parsing_normalizes() {
        for raw in ["singleLabel", "single-label", "SINGLE_LABEL", "singlelabel"] {
            assert_eq!(
                LearningMode::from_str(raw).unwrap(),
                LearningMode::SingleLabel,
                "failed for {raw:?}"
            );
        }
        assert_eq!(
            LearningMode::from_str("multi_label").unwrap(),
            LearningMode::MultiLabel
        );
        assert_eq!(
            LearningMode::from_str("REGRESSION").unwrap(),
            LearningMode::Regression
        );
    }

    #[test]
    fn test_mode_parsing_rejects_unknown() {
        let err = LearningMode::from_str("clustering").unwrap_err();
        assert!(matches!(err, Error::InvalidLearningMode(_)));
        assert!(err.to_string().contains("clustering"));
    }

    #[test]
    fn test_mode_names_round_trip() {
        for mode in LearningMode::all() {
            assert_eq!(LearningMode::from_str(mode.name()).unwrap(), *mode);
        }
    }

    #[test]
    fn test_config_builder_and_default() {
        let config = EvalConfig::default();
        assert_eq!(config.zero_division, ZeroDivision::Soft);
        assert!(!config.individual_labels);

        let config = EvalConfig::new()
            .with_zero_division(ZeroDivision::Hard)
            .with_individual_labels(true);
        assert_eq!(config.zero_division, ZeroDivision::Hard);
        assert!(config.individual_labels);
    }

    #[test]
    fn test_single_label_evaluator() {
        let records = vec![single(0.0, 0.0), single(1.0, 1.0), single(1.0, 0.0)];
        let result = SingleLabelEvaluator::new(EvalConfig::default())
            .calculate_measures(&records)
            .unwrap();
        assert!((result.get(keys::ACCURACY).unwrap() - 2.0 / 3.0).abs() < 1e-9);
        assert!(result.get(keys::MACRO_PRECISION).is_some());
        assert!(result.get(keys::MICRO_FSCORE).is_some());
    }

    #[test]
    fn test_multi_label_evaluator() {
        let records = vec![
            OutcomeRecord::new("a", vec![0.9, 0.8], vec![1.0, 1.0], 0.5),
            OutcomeRecord::new("b", vec![0.9, 0.1], vec![1.0, 1.0], 0.5),
        ];
        let result = MultiLabelEvaluator::new(EvalConfig::default())
            .calculate_measures(&records)
            .unwrap();
        // label 0: TP=2; label 1: TP=1 FN=1 -> micro P = 3/3, R = 3/4
        assert!((result.get(keys::MICRO_PRECISION).unwrap() - 1.0).abs() < 1e-9);
        assert!((result.get(keys::MICRO_RECALL).unwrap() - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_regression_evaluator() {
        let records = vec![single(1.0, 1.0), single(2.0, 2.0), single(3.0, 3.0)];
        let result = RegressionEvaluator::new(EvalConfig::default())
            .calculate_measures(&records)
            .unwrap();
        assert!((result.get(keys::CORRELATION).unwrap() - 1.0).abs() < 1e-9);
        assert!((result.get(keys::MEAN_SQUARED_ERROR).unwrap() - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_evaluator_for_dispatch() {
        let records = vec![single(0.0, 0.0)];
        let config = EvalConfig::default();
        for mode in LearningMode::all() {
            let result = evaluator_for(*mode, config)
                .calculate_measures(&records)
                .unwrap();
            assert!(!result.is_empty(), "no measures for {mode}");
        }
    }

    #[test]
    fn test_evaluate_lines_with_mode_rejects_before_parsing() {
        // the bad mode must win over the bad line: mode is checked first
        let err = evaluate_lines_with_mode("banana", ["not a record"], &EvalConfig::default())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidLearningMode(_)));
    }

    #[test]
    fn test_evaluate_records_empty_run() {
        let soft =
            evaluate_records(LearningMode::SingleLabel, &[], &EvalConfig::default()).unwrap();
        assert!((soft.get(keys::ACCURACY).unwrap() - 0.0).abs() < 1e-12);

        let hard_config = EvalConfig::new().with_zero_division(ZeroDivision::Hard);
        let hard = evaluate_records(LearningMode::SingleLabel, &[], &hard_config).unwrap();
        assert!(hard.get(keys::ACCURACY).unwrap().is_nan());
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = EvalConfig::new()
            .with_zero_division(ZeroDivision::Hard)
            .with_individual_labels(true);
        let json = serde_json::to_string(&config).unwrap();
        let back: EvalConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);

        // missing fields fall back to defaults
        let partial: EvalConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(partial, EvalConfig::default());
    }

    #[test]
    fn test_mode_serde_uses_camel_case() {
        let json = serde_json::to_string(&LearningMode::SingleLabel).unwrap();
        assert_eq!(json, r#""singleLabel""#);
        let back: LearningMode = serde_json::from_str(r#""multiLabel""#).unwrap();
        assert_eq!(back, LearningMode::MultiLabel);
    }
}
