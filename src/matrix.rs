//! Confusion matrices over gold × predicted outcomes.
//!
//! One type, two shapes:
//!
//! - [`ConfusionMatrix::Dense`]: a square matrix sized by the class
//!   registry, for single-label runs where each record carries one
//!   discrete class index per side.
//! - [`ConfusionMatrix::Sparse`]: an ordered map-of-maps keyed by label
//!   *combination* strings, for multi-label runs where each side of a
//!   record is a score vector binarized by the record's threshold.
//!
//! Both shapes store the same logical relation, gold → predicted → count,
//! with `f64` counts so weighted instances accumulate exactly.
//!
//! Construction is two-pass: a scan over the records freezes the
//! [`LabelRegistry`] first, then a fill pass populates the cells. Nothing
//! can grow the registry once any cell exists, which is what makes the
//! decomposition in [`crate::contingency`] safe.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::label::{combination_name, LabelRegistry, LabelRegistryBuilder};
use crate::record::{check_uniform_shape, OutcomeRecord};
use crate::{Error, Result};

/// Gold × predicted count matrix, dense or sparse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConfusionMatrix {
    /// Square matrix for single-label runs. `counts[gold][predicted]`,
    /// both indices being class values straight from the records.
    Dense {
        /// Class registry; names are the class indices rendered as
        /// strings, in numeric order.
        registry: LabelRegistry,
        /// Row-major counts, gold on rows.
        counts: Vec<Vec<f64>>,
    },
    /// Combination-keyed matrix for multi-label runs.
    Sparse {
        /// Combination registry (includes the empty sentinel once it has
        /// been observed), in first-observation order.
        registry: LabelRegistry,
        /// Score-vector length shared by all records of the run. This,
        /// not the registry size, is the label count decomposition
        /// iterates over.
        num_labels: usize,
        /// Gold combination → predicted combination → accumulated weight.
        cells: BTreeMap<String, BTreeMap<String, f64>>,
    },
}

impl ConfusionMatrix {
    /// Build a dense matrix from single-label records.
    ///
    /// Each side of each record must hold exactly one integer-valued
    /// score, the class index. The matrix is sized by the largest index
    /// seen on either side; class `c` is registered under the name `"c"`.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedRecord`] when a side is not a single class
    /// index.
    pub fn from_single_label(records: &[OutcomeRecord]) -> Result<Self> {
        // Scan pass: indices come straight from the records, so the
        // registry is just 0..=max in numeric order.
        let mut num_classes = 0usize;
        for record in records {
            let gold = record.class_index(&record.gold, "gold")?;
            let predicted = record.class_index(&record.predicted, "predicted")?;
            num_classes = num_classes.max(gold + 1).max(predicted + 1);
        }

        let mut builder = LabelRegistryBuilder::new();
        for c in 0..num_classes {
            builder.observe(&c.to_string());
        }
        let registry = builder.freeze();

        // Fill pass.
        let mut counts = vec![vec![0.0; num_classes]; num_classes];
        for record in records {
            let gold = record.class_index(&record.gold, "gold")?;
            let predicted = record.class_index(&record.predicted, "predicted")?;
            counts[gold][predicted] += record.weight;
        }

        log::debug!(
            "built dense confusion matrix: {num_classes} classes, {} records",
            records.len()
        );
        Ok(ConfusionMatrix::Dense { registry, counts })
    }

    /// Build a dense matrix from raw counts.
    ///
    /// Class `c` is registered under the name `"c"`. Useful when the
    /// gold × predicted tallies already exist.
    ///
    /// # Errors
    ///
    /// [`Error::ShapeMismatch`] when `counts` is not square.
    pub fn from_dense_counts(counts: Vec<Vec<f64>>) -> Result<Self> {
        let n = counts.len();
        for (i, row) in counts.iter().enumerate() {
            if row.len() != n {
                return Err(Error::shape_mismatch(format!(
                    "dense matrix row {i} has {} columns, expected {n}",
                    row.len()
                )));
            }
        }
        let mut builder = LabelRegistryBuilder::new();
        for c in 0..n {
            builder.observe(&c.to_string());
        }
        Ok(ConfusionMatrix::Dense {
            registry: builder.freeze(),
            counts,
        })
    }

    /// Build a sparse combination matrix from multi-label records.
    ///
    /// Each side of each record is binarized with the record's threshold
    /// (inclusive) into a sorted comma-joined combination string; an
    /// empty bipartition maps to the empty-combination sentinel. The scan
    /// pass registers every combination observed on either side of any
    /// record, then the fill pass accumulates weights per
    /// (gold, predicted) combination cell.
    ///
    /// # Errors
    ///
    /// [`Error::ShapeMismatch`] when records disagree on the score-vector
    /// length.
    pub fn from_multi_label(records: &[OutcomeRecord]) -> Result<Self> {
        check_uniform_shape(records)?;
        let num_labels = records.first().map_or(0, OutcomeRecord::num_labels);

        // Scan pass: every combination on either side must be registered
        // before any cell is written, gold side first.
        let mut builder = LabelRegistryBuilder::new();
        let mut pairs = Vec::with_capacity(records.len());
        for record in records {
            let gold = combination_name(&record.bipartition(&record.gold));
            let predicted = combination_name(&record.bipartition(&record.predicted));
            builder.observe(&gold);
            builder.observe(&predicted);
            pairs.push((gold, predicted, record.weight));
        }
        let registry = builder.freeze();

        // Fill pass over the buffered bipartitions.
        let mut cells: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
        for (gold, predicted, weight) in pairs {
            *cells.entry(gold).or_default().entry(predicted).or_insert(0.0) += weight;
        }

        log::debug!(
            "built sparse confusion matrix: {} combinations over {num_labels} labels, {} records",
            registry.len(),
            records.len()
        );
        Ok(ConfusionMatrix::Sparse {
            registry,
            num_labels,
            cells,
        })
    }

    /// The frozen registry behind this matrix (classes for dense,
    /// combinations for sparse).
    #[must_use]
    pub fn registry(&self) -> &LabelRegistry {
        match self {
            ConfusionMatrix::Dense { registry, .. }
            | ConfusionMatrix::Sparse { registry, .. } => registry,
        }
    }

    /// Count stored for a (gold, predicted) pair of names; 0.0 when the
    /// cell was never touched.
    #[must_use]
    pub fn count(&self, gold: &str, predicted: &str) -> f64 {
        match self {
            ConfusionMatrix::Dense { registry, counts } => {
                match (registry.index_of(gold), registry.index_of(predicted)) {
                    (Some(g), Some(p)) => counts[g][p],
                    _ => 0.0,
                }
            }
            ConfusionMatrix::Sparse { cells, .. } => cells
                .get(gold)
                .and_then(|row| row.get(predicted))
                .copied()
                .unwrap_or(0.0),
        }
    }

    /// Total mass of the matrix (instance count, or summed weights).
    #[must_use]
    pub fn total(&self) -> f64 {
        match self {
            ConfusionMatrix::Dense { counts, .. } => {
                counts.iter().map(|row| row.iter().sum::<f64>()).sum()
            }
            ConfusionMatrix::Sparse { cells, .. } => cells
                .values()
                .map(|row| row.values().sum::<f64>())
                .sum(),
        }
    }

    /// Mass on the diagonal: cells whose gold and predicted name agree.
    #[must_use]
    pub fn diagonal(&self) -> f64 {
        match self {
            ConfusionMatrix::Dense { counts, .. } => {
                counts.iter().enumerate().map(|(i, row)| row[i]).sum()
            }
            ConfusionMatrix::Sparse { cells, .. } => cells
                .iter()
                .filter_map(|(gold, row)| row.get(gold))
                .sum(),
        }
    }

    /// Number of labels the decomposer produces tables for: registered
    /// classes for dense, score-vector positions for sparse.
    #[must_use]
    pub fn num_decomposition_labels(&self) -> usize {
        match self {
            ConfusionMatrix::Dense { registry, .. } => registry.len(),
            ConfusionMatrix::Sparse { num_labels, .. } => *num_labels,
        }
    }

    /// Display name for decomposition label `c`.
    #[must_use]
    pub fn decomposition_label_name(&self, c: usize) -> String {
        match self {
            ConfusionMatrix::Dense { registry, .. } => registry
                .name_of(c)
                .map_or_else(|| c.to_string(), str::to_string),
            ConfusionMatrix::Sparse { .. } => c.to_string(),
        }
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = match self {
            ConfusionMatrix::Dense { registry, .. } => {
                registry.names().map(str::to_string).collect()
            }
            ConfusionMatrix::Sparse { cells, .. } => {
                let mut names: Vec<String> = cells
                    .keys()
                    .chain(cells.values().flat_map(|row| row.keys()))
                    .cloned()
                    .collect();
                names.sort();
                names.dedup();
                names
            }
        };
        let shown = |name: &str| {
            if name.is_empty() {
                "(none)".to_string()
            } else {
                name.to_string()
            }
        };

        write!(f, "{:>12}", "Gold\\Pred")?;
        for name in &names {
            write!(f, " {:>8}", shown(name))?;
        }
        writeln!(f)?;
        for gold in &names {
            write!(f, "{:>12}", shown(gold))?;
            for predicted in &names {
                write!(f, " {:>8.1}", self.count(gold, predicted))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
