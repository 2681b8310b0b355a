//! Outcome records and the persisted outcome-line parser.
//!
//! One [`OutcomeRecord`] holds the prediction/gold scores for a single
//! classified instance. The persisted format is one record per line:
//!
//! ```text
//! [id=]predictedValues;goldValues;threshold
//! ```
//!
//! `predictedValues` and `goldValues` are comma-separated numeric scores,
//! one per possible label; `threshold` binarizes rankings into label sets
//! in multi-label mode. Single-label runs encode one discrete class index
//! per side instead. Blank lines and `#` comments are skipped.
//!
//! ## Example
//!
//! ```rust
//! use tally::record::OutcomeRecord;
//!
//! let rec = OutcomeRecord::parse_line("a42=0.8,0.3;1.0,0.0;0.5", 1).unwrap();
//! assert_eq!(rec.id, "a42");
//! assert_eq!(rec.bipartition(&rec.predicted), vec![0]);
//! ```

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Largest class index accepted in single-label mode.
///
/// Caps the dense confusion matrix at 4096 × 4096 cells (128 MiB of
/// counts). A parseable number beyond the cap is a corrupt record, not a
/// class, and must stay a recoverable error.
pub const MAX_CLASS_INDEX: usize = 4095;

/// One classified instance: prediction scores, gold scores, and the
/// threshold used to binarize rankings.
///
/// Records are immutable once parsed; every evaluation pipeline takes
/// them by shared reference and never mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    /// Instance identifier. Taken from the optional `id=` line prefix,
    /// or the 1-based line number when absent.
    pub id: String,
    /// One score per possible label (or a single class index in
    /// single-label mode).
    pub predicted: Vec<f64>,
    /// Same shape as `predicted`.
    pub gold: Vec<f64>,
    /// Bipartition threshold for multi-label mode.
    pub threshold: f64,
    /// Instance weight. Parsed records default to 1.0; weighted corpora
    /// set it via [`OutcomeRecord::with_weight`].
    pub weight: f64,
}

impl OutcomeRecord {
    /// Create a record with weight 1.0.
    pub fn new(
        id: impl Into<String>,
        predicted: Vec<f64>,
        gold: Vec<f64>,
        threshold: f64,
    ) -> Self {
        OutcomeRecord {
            id: id.into(),
            predicted,
            gold,
            threshold,
            weight: 1.0,
        }
    }

    /// Set the instance weight.
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Parse one persisted outcome line.
    ///
    /// `line_no` is the 1-based source line number, used both for error
    /// attribution and as the fallback id when the line carries no
    /// `id=` prefix.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedRecord`] for a wrong field count, an empty score
    /// list, or a non-numeric score or threshold.
    pub fn parse_line(line: &str, line_no: usize) -> Result<Self> {
        let line = line.trim();

        // An id prefix is only recognized when the '=' comes before the
        // first ';'; otherwise the '=' belongs to the payload.
        let (id, payload) = match line.split_once('=') {
            Some((prefix, rest)) if !prefix.contains(';') => (prefix.to_string(), rest),
            _ => (line_no.to_string(), line),
        };

        let fields: Vec<&str> = payload.split(';').collect();
        if fields.len() != 3 {
            return Err(Error::malformed_line(
                line_no,
                format!("expected 3 ';'-separated fields, got {}", fields.len()),
            ));
        }

        let predicted = parse_scores(fields[0], "predicted", line_no)?;
        let gold = parse_scores(fields[1], "gold", line_no)?;
        let threshold: f64 = fields[2].trim().parse().map_err(|_| {
            Error::malformed_line(line_no, format!("non-numeric threshold {:?}", fields[2]))
        })?;

        Ok(OutcomeRecord {
            id,
            predicted,
            gold,
            threshold,
            weight: 1.0,
        })
    }

    /// Parse a whole outcome log.
    ///
    /// Blank lines and lines starting with `#` are skipped; everything
    /// else must parse. Errors carry the 1-based line number.
    ///
    /// # Errors
    ///
    /// The first [`Error::MalformedRecord`] encountered.
    pub fn parse_lines<I, S>(lines: I) -> Result<Vec<Self>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut records = Vec::new();
        for (idx, line) in lines.into_iter().enumerate() {
            let line = line.as_ref().trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            records.push(Self::parse_line(line, idx + 1)?);
        }
        Ok(records)
    }

    /// Indices whose score reaches the threshold (inclusive), in
    /// ascending order. The empty vector means no label was selected.
    #[must_use]
    pub fn bipartition(&self, scores: &[f64]) -> Vec<usize> {
        scores
            .iter()
            .enumerate()
            .filter(|(_, s)| **s >= self.threshold)
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of possible labels (the score-vector length).
    #[must_use]
    pub fn num_labels(&self) -> usize {
        self.gold.len()
    }

    /// Check that predicted and gold agree in length.
    ///
    /// # Errors
    ///
    /// [`Error::ShapeMismatch`] when they disagree.
    pub fn check_shape(&self) -> Result<()> {
        if self.predicted.len() != self.gold.len() {
            return Err(Error::shape_mismatch(format!(
                "record {:?}: predicted has {} scores, gold has {}",
                self.id,
                self.predicted.len(),
                self.gold.len()
            )));
        }
        Ok(())
    }

    /// Interpret one side as a discrete class index (single-label mode).
    ///
    /// The side must hold exactly one integer-valued score no larger
    /// than [`MAX_CLASS_INDEX`].
    ///
    /// # Errors
    ///
    /// [`Error::MalformedRecord`] for multi-valued sides, non-integer,
    /// negative, or out-of-range values.
    pub fn class_index(&self, scores: &[f64], side: &str) -> Result<usize> {
        if scores.len() != 1 {
            return Err(Error::malformed_record(format!(
                "record {:?}: single-label {side} side must hold 1 value, got {}",
                self.id,
                scores.len()
            )));
        }
        let value = scores[0];
        if value.fract() != 0.0 || value < 0.0 || !value.is_finite() {
            return Err(Error::malformed_record(format!(
                "record {:?}: {side} value {value} is not a class index",
                self.id
            )));
        }
        // saturating cast, so oversized values land in the range check
        let index = value as usize;
        if index > MAX_CLASS_INDEX {
            return Err(Error::malformed_record(format!(
                "record {:?}: {side} class {value} exceeds the class-index cap {MAX_CLASS_INDEX}",
                self.id
            )));
        }
        Ok(index)
    }

    /// Interpret one side as a regression value (regression mode).
    ///
    /// The side must hold exactly one finite score.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedRecord`] for multi-valued sides or non-finite
    /// values.
    pub fn regression_value(&self, scores: &[f64], side: &str) -> Result<f64> {
        if scores.len() != 1 {
            return Err(Error::malformed_record(format!(
                "record {:?}: regression {side} side must hold 1 value, got {}",
                self.id,
                scores.len()
            )));
        }
        let value = scores[0];
        if !value.is_finite() {
            return Err(Error::malformed_record(format!(
                "record {:?}: {side} value {value} is not finite",
                self.id
            )));
        }
        Ok(value)
    }
}

/// Check that every record in a run agrees on the number of possible
/// labels and that each record is internally consistent.
///
/// # Errors
///
/// [`Error::ShapeMismatch`] on the first disagreement.
pub fn check_uniform_shape(records: &[OutcomeRecord]) -> Result<()> {
    let mut expected: Option<usize> = None;
    for record in records {
        record.check_shape()?;
        match expected {
            None => expected = Some(record.num_labels()),
            Some(n) if n != record.num_labels() => {
                return Err(Error::shape_mismatch(format!(
                    "record {:?} has {} labels, run has {}",
                    record.id,
                    record.num_labels(),
                    n
                )));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn parse_scores(field: &str, side: &str, line_no: usize) -> Result<Vec<f64>> {
    let field = field.trim();
    if field.is_empty() {
        return Err(Error::malformed_line(
            line_no,
            format!("empty {side} score list"),
        ));
    }
    field
        .split(',')
        .map(|s| {
            s.trim().parse::<f64>().map_err(|_| {
                Error::malformed_line(line_no, format!("non-numeric {side} score {s:?}"))
            })
        })
        .collect()
}
