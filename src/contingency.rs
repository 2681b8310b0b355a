//! Binary contingency tables and confusion-matrix decomposition.
//!
//! Every classification measure in this crate reduces to one 2×2 table
//! per class: TP/FP/FN/TN relative to "is class c" vs "is not class c"
//! on both the gold and the predicted axis. [`decompose`] produces the N
//! per-class tables from a [`ConfusionMatrix`]; [`combine`] sums them
//! element-wise into the single table micro-averaged measures read from.

use serde::{Deserialize, Serialize};

use crate::label::combination_contains;
use crate::matrix::ConfusionMatrix;

/// One binary 2×2 contingency table.
///
/// Counts are `f64` because weighted instances accumulate fractional
/// mass. For a single-label matrix, `total()` of every per-class table
/// equals the instance count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ContingencyTable {
    /// Gold has the class, prediction has the class.
    pub true_positives: f64,
    /// Gold lacks the class, prediction has it.
    pub false_positives: f64,
    /// Gold has the class, prediction lacks it.
    pub false_negatives: f64,
    /// Neither side has the class.
    pub true_negatives: f64,
}

impl ContingencyTable {
    /// Create a table from explicit counts.
    #[must_use]
    pub fn new(tp: f64, fp: f64, fn_: f64, tn: f64) -> Self {
        ContingencyTable {
            true_positives: tp,
            false_positives: fp,
            false_negatives: fn_,
            true_negatives: tn,
        }
    }

    /// Sum of all four cells.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.true_positives + self.false_positives + self.false_negatives + self.true_negatives
    }

    /// Add another table's counts into this one.
    pub fn merge(&mut self, other: &ContingencyTable) {
        self.true_positives += other.true_positives;
        self.false_positives += other.false_positives;
        self.false_negatives += other.false_negatives;
        self.true_negatives += other.true_negatives;
    }
}

/// Decompose a confusion matrix into one-vs-rest binary tables, one per
/// decomposition label, in label order.
///
/// Dense matrices yield one table per registered class `c`:
/// `TP = M[c][c]`, `FN` = rest of row `c`, `FP` = rest of column `c`,
/// `TN` = everything else.
///
/// Sparse matrices yield one table per score-vector position `c`
/// (0..`num_labels`), scanning every non-zero combination cell: the cell
/// mass goes to TP/FN/FP/TN depending on whether `c` is a member of the
/// gold and predicted combination strings. The empty-combination
/// sentinel contains no label, so its cells only ever feed the absent
/// branches, keeping per-class totals equal to the matrix total.
#[must_use]
pub fn decompose(matrix: &ConfusionMatrix) -> Vec<ContingencyTable> {
    match matrix {
        ConfusionMatrix::Dense { counts, .. } => decompose_dense(counts),
        ConfusionMatrix::Sparse {
            num_labels, cells, ..
        } => decompose_sparse(*num_labels, cells),
    }
}

fn decompose_dense(counts: &[Vec<f64>]) -> Vec<ContingencyTable> {
    let n = counts.len();
    let total: f64 = counts.iter().map(|row| row.iter().sum::<f64>()).sum();

    (0..n)
        .map(|c| {
            let tp = counts[c][c];
            let row: f64 = counts[c].iter().sum();
            let col: f64 = counts.iter().map(|r| r[c]).sum();
            let fn_ = row - tp;
            let fp = col - tp;
            let tn = total - tp - fn_ - fp;
            ContingencyTable::new(tp, fp, fn_, tn)
        })
        .collect()
}

fn decompose_sparse(
    num_labels: usize,
    cells: &std::collections::BTreeMap<String, std::collections::BTreeMap<String, f64>>,
) -> Vec<ContingencyTable> {
    let mut tables = vec![ContingencyTable::default(); num_labels];
    for (gold, row) in cells {
        for (predicted, &count) in row {
            if count == 0.0 {
                continue;
            }
            for (c, table) in tables.iter_mut().enumerate() {
                let in_gold = combination_contains(gold, c);
                let in_predicted = combination_contains(predicted, c);
                match (in_gold, in_predicted) {
                    (true, true) => table.true_positives += count,
                    (true, false) => table.false_negatives += count,
                    (false, true) => table.false_positives += count,
                    (false, false) => table.true_negatives += count,
                }
            }
        }
    }
    tables
}

/// Element-wise sum of per-class tables; the input for micro measures.
#[must_use]
pub fn combine(tables: &[ContingencyTable]) -> ContingencyTable {
    let mut combined = ContingencyTable::default();
    for table in tables {
        combined.merge(table);
    }
    combined
}
