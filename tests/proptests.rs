//! Property tests for the evaluation pipeline.
//!
//! Tests identities that must hold for arbitrary inputs: decomposition
//! partitions the matrix, soft measures stay bounded, and evaluation is
//! deterministic.

use proptest::prelude::*;

use tally::contingency::{combine, decompose};
use tally::measure::{
    accuracy, classification_measures, fscore, keys, precision, recall, ZeroDivision,
};
use tally::regression::{
    mean_absolute_error, pearson, root_mean_squared_error, spearman,
};
use tally::{ConfusionMatrix, OutcomeRecord};

/// Square dense count matrices with non-negative cells.
fn dense_counts() -> impl Strategy<Value = Vec<Vec<f64>>> {
    (1usize..6).prop_flat_map(|n| {
        prop::collection::vec(prop::collection::vec(0.0f64..20.0, n), n)
    })
}

/// Multi-label record runs sharing one score-vector length.
fn multi_label_records() -> impl Strategy<Value = Vec<OutcomeRecord>> {
    (1usize..5).prop_flat_map(|num_labels| {
        prop::collection::vec(
            (
                prop::collection::vec(0.0f64..1.0, num_labels),
                prop::collection::vec(0.0f64..1.0, num_labels),
            ),
            1..20,
        )
        .prop_map(|sides| {
            sides
                .into_iter()
                .enumerate()
                .map(|(i, (predicted, gold))| {
                    OutcomeRecord::new(format!("r{i}"), predicted, gold, 0.5)
                })
                .collect()
        })
    })
}

proptest! {
    #[test]
    fn test_dense_decomposition_partitions_matrix(counts in dense_counts()) {
        let matrix = ConfusionMatrix::from_dense_counts(counts).unwrap();
        let tables = decompose(&matrix);

        prop_assert_eq!(tables.len(), matrix.num_decomposition_labels());
        for (c, table) in tables.iter().enumerate() {
            prop_assert!(
                (table.total() - matrix.total()).abs() < 1e-6,
                "class {} table total {} != matrix total {}",
                c, table.total(), matrix.total()
            );
        }
    }

    #[test]
    fn test_dense_combined_tp_is_diagonal(counts in dense_counts()) {
        let matrix = ConfusionMatrix::from_dense_counts(counts).unwrap();
        let combined = combine(&decompose(&matrix));

        prop_assert!(
            (combined.true_positives - matrix.diagonal()).abs() < 1e-6,
            "combined TP {} != diagonal {}",
            combined.true_positives, matrix.diagonal()
        );
    }

    #[test]
    fn test_soft_measures_bounded(counts in dense_counts()) {
        let matrix = ConfusionMatrix::from_dense_counts(counts).unwrap();
        let tables = decompose(&matrix);

        for table in &tables {
            for value in [
                precision(table, ZeroDivision::Soft),
                recall(table, ZeroDivision::Soft),
                fscore(table, ZeroDivision::Soft),
                accuracy(table, ZeroDivision::Soft),
            ] {
                prop_assert!(
                    (0.0..=1.0).contains(&value),
                    "soft measure {} out of [0, 1]", value
                );
            }
        }
    }

    #[test]
    fn test_micro_precision_equals_accuracy_for_dense(counts in dense_counts()) {
        let matrix = ConfusionMatrix::from_dense_counts(counts).unwrap();
        let result = classification_measures(&matrix, ZeroDivision::Soft, false);

        // summed FP mass is exactly the off-diagonal mass, so micro
        // precision collapses to the diagonal share
        let micro_p = result.get(keys::MICRO_PRECISION).unwrap();
        let acc = result.get(keys::ACCURACY).unwrap();
        prop_assert!((micro_p - acc).abs() < 1e-9, "micro P {} != accuracy {}", micro_p, acc);
    }

    #[test]
    fn test_sparse_decomposition_covers_positions(records in multi_label_records()) {
        let matrix = ConfusionMatrix::from_multi_label(&records).unwrap();
        let tables = decompose(&matrix);

        prop_assert_eq!(tables.len(), records[0].num_labels());
        // each record lands in exactly one quadrant per position
        for (c, table) in tables.iter().enumerate() {
            prop_assert!(
                (table.total() - records.len() as f64).abs() < 1e-6,
                "position {} table total {} != record count {}",
                c, table.total(), records.len()
            );
        }
    }

    #[test]
    fn test_multi_label_evaluation_deterministic(records in multi_label_records()) {
        let first = ConfusionMatrix::from_multi_label(&records).unwrap();
        let second = ConfusionMatrix::from_multi_label(&records).unwrap();
        prop_assert_eq!(&first, &second);

        let a = classification_measures(&first, ZeroDivision::Soft, true);
        let b = classification_measures(&second, ZeroDivision::Soft, true);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn test_correlations_bounded(
        pairs in prop::collection::vec((-100.0f64..100.0, -100.0f64..100.0), 2..40)
    ) {
        let predictions: Vec<f64> = pairs.iter().map(|(p, _)| *p).collect();
        let golds: Vec<f64> = pairs.iter().map(|(_, g)| *g).collect();

        let r = pearson(&predictions, &golds, ZeroDivision::Soft);
        let rho = spearman(&predictions, &golds, ZeroDivision::Soft);
        prop_assert!((-1.0 - 1e-9..=1.0 + 1e-9).contains(&r), "pearson {} out of range", r);
        prop_assert!((-1.0 - 1e-9..=1.0 + 1e-9).contains(&rho), "spearman {} out of range", rho);
    }

    #[test]
    fn test_rmse_dominates_mae(
        pairs in prop::collection::vec((-100.0f64..100.0, -100.0f64..100.0), 1..40)
    ) {
        let predictions: Vec<f64> = pairs.iter().map(|(p, _)| *p).collect();
        let golds: Vec<f64> = pairs.iter().map(|(_, g)| *g).collect();

        let mae = mean_absolute_error(&predictions, &golds, ZeroDivision::Soft);
        let rmse = root_mean_squared_error(&predictions, &golds, ZeroDivision::Soft);
        // quadratic mean never falls below the arithmetic mean
        prop_assert!(rmse + 1e-9 >= mae, "RMSE {} < MAE {}", rmse, mae);
    }
}
