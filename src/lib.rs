//! # tally
//!
//! Classification and regression measures for Rust.
//!
//! - **Single-label**: dense confusion matrix, micro/macro precision,
//!   recall, F-score, accuracy
//! - **Multi-label**: sparse combination matrix over thresholded score
//!   vectors, decomposed one-vs-rest per label
//! - **Regression**: Pearson/Spearman correlation, MAE, MSE, RMSE
//!
//! ## Quick Start
//!
//! ```rust
//! use tally::{evaluate_lines, EvalConfig, LearningMode};
//!
//! // predicted ; gold ; threshold
//! let lines = ["0;0;0.5", "1;1;0.5", "2;1;0.5"];
//!
//! let result =
//!     evaluate_lines(LearningMode::SingleLabel, lines, &EvalConfig::default()).unwrap();
//! assert!((result.get("Accuracy").unwrap() - 2.0 / 3.0).abs() < 1e-9);
//! ```
//!
//! ## Learning Modes
//!
//! | Mode | Record sides hold | Measures |
//! |------|-------------------|----------|
//! | `singleLabel` | one class index | Accuracy, Micro*/Macro* (P, R, F, Acc) |
//! | `multiLabel` | score vectors | as above, over thresholded label sets |
//! | `regression` | one numeric | Correlation, SpearmanCorrelation, MAE, MSE, RMSE |
//!
//! ## Zero Division
//!
//! Degenerate ratios (a class never predicted, an empty run, zero
//! variance) are never errors. They resolve through
//! [`ZeroDivision`](measure::ZeroDivision): **soft** evaluation yields
//! `0.0`, **hard** evaluation yields `NaN` so degeneracy stays visible
//! in downstream aggregation.
//!
//! ## Lower-Level Access
//!
//! The pipeline stages are public for callers that want the
//! intermediates rather than the final mapping:
//!
//! ```rust
//! use tally::contingency;
//! use tally::matrix::ConfusionMatrix;
//!
//! let matrix = ConfusionMatrix::from_dense_counts(vec![
//!     vec![5.0, 1.0],
//!     vec![2.0, 3.0],
//! ]).unwrap();
//! let tables = contingency::decompose(&matrix);
//! assert_eq!(tables.len(), 2);
//! assert!((tables[0].true_positives - 5.0).abs() < 1e-12);
//! ```
//!
//! ## Design
//!
//! - **Mode-driven**: one configuration string selects the whole
//!   pipeline; everything downstream is dispatch over [`LearningMode`]
//! - **Frozen registries**: label registries are built in a scan pass
//!   and frozen before any matrix cell or contingency table exists
//! - **Deterministic**: ordered maps everywhere results are
//!   accumulated, so equal inputs give bit-identical outputs

#![warn(missing_docs)]

pub mod contingency;
mod error;
pub mod evaluator;
pub mod label;
pub mod matrix;
pub mod measure;
pub mod record;
pub mod regression;

pub use error::{Error, Result};
pub use evaluator::{
    evaluate_lines, evaluate_lines_with_mode, evaluate_records, evaluator_for, EvalConfig,
    Evaluator, LearningMode, MultiLabelEvaluator, RegressionEvaluator, SingleLabelEvaluator,
};
pub use matrix::ConfusionMatrix;
pub use measure::{MeasureResult, ZeroDivision};
pub use record::OutcomeRecord;
