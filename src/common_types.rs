//! This module contains common data structures used by the classifier and
//! its consumers.

use crate::error::{KnnError, Result};

/// An immutable pairing of a training sample matrix with its label vector.
///
/// The two halves are validated together at construction time and can only
/// be replaced together, so `labels()[j]` is always the ground-truth label
/// of `samples()[j]`.
///
/// - `F`: the feature scalar type (e.g. `f64`, `f32`).
/// - `L`: the label type (e.g. `i32`, `String`, `bool`).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrainingSet<F, L> {
    samples: Vec<Vec<F>>,
    labels: Vec<L>,
    num_features: usize,
}

impl<F, L> TrainingSet<F, L> {
    /// Binds samples and labels as an atomic pair.
    ///
    /// Fails with [`KnnError::ShapeMismatch`] when the row count differs
    /// from the label count or when the sample matrix is ragged, and with
    /// [`KnnError::InvalidParameter`] when the pair is empty.
    pub fn new(samples: Vec<Vec<F>>, labels: Vec<L>) -> Result<Self> {
        if samples.len() != labels.len() {
            return Err(KnnError::ShapeMismatch {
                what: "training samples vs. labels",
                expected: samples.len(),
                actual: labels.len(),
            });
        }
        if samples.is_empty() {
            return Err(KnnError::InvalidParameter(
                "training set must contain at least one sample".to_string(),
            ));
        }
        let num_features = samples[0].len();
        for row in &samples {
            if row.len() != num_features {
                return Err(KnnError::ShapeMismatch {
                    what: "training sample row",
                    expected: num_features,
                    actual: row.len(),
                });
            }
        }
        Ok(TrainingSet {
            samples,
            labels,
            num_features,
        })
    }

    /// Number of training samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// A constructed set is never empty, but the conventional check is
    /// provided for completeness.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Feature count shared by every sample row.
    pub fn num_features(&self) -> usize {
        self.num_features
    }

    pub fn samples(&self) -> &[Vec<F>] {
        &self.samples
    }

    pub fn labels(&self) -> &[L] {
        &self.labels
    }
}

/// A dense (num_query × num_train) matrix of pairwise distances, stored
/// row-major. Entry `[i][j]` is the distance from query sample `i` to
/// training sample `j`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistanceMatrix {
    num_query: usize,
    num_train: usize,
    values: Vec<f64>,
}

impl DistanceMatrix {
    /// Wraps a row-major value buffer. The buffer length must equal
    /// `num_query * num_train`.
    pub(crate) fn from_values(num_query: usize, num_train: usize, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), num_query * num_train);
        DistanceMatrix {
            num_query,
            num_train,
            values,
        }
    }

    /// Builds a matrix from nested rows, validating that they are
    /// rectangular.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let num_query = rows.len();
        let num_train = rows.first().map_or(0, Vec::len);
        let mut values = Vec::with_capacity(num_query * num_train);
        for row in rows {
            if row.len() != num_train {
                return Err(KnnError::ShapeMismatch {
                    what: "distance matrix row",
                    expected: num_train,
                    actual: row.len(),
                });
            }
            values.extend(row);
        }
        Ok(DistanceMatrix {
            num_query,
            num_train,
            values,
        })
    }

    /// Number of query rows.
    pub fn num_query(&self) -> usize {
        self.num_query
    }

    /// Number of training columns.
    pub fn num_train(&self) -> usize {
        self.num_train
    }

    /// The distances from query sample `i` to every training sample.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.num_train..(i + 1) * self.num_train]
    }

    /// Single entry accessor.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.num_train + j]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn training_set_rejects_row_label_mismatch() {
        let result = TrainingSet::new(vec![vec![1.0, 2.0], vec![3.0, 4.0]], vec!["a"]);
        assert!(matches!(
            result,
            Err(KnnError::ShapeMismatch {
                expected: 2,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn training_set_rejects_ragged_rows() {
        let result = TrainingSet::new(vec![vec![1.0, 2.0], vec![3.0]], vec!["a", "b"]);
        assert!(matches!(
            result,
            Err(KnnError::ShapeMismatch {
                expected: 2,
                actual: 1,
                ..
            })
        ));
    }

    #[test]
    fn training_set_rejects_empty_pair() {
        let result = TrainingSet::<f64, &str>::new(Vec::new(), Vec::new());
        assert!(matches!(result, Err(KnnError::InvalidParameter(_))));
    }

    #[test]
    fn training_set_exposes_shape() {
        let set = TrainingSet::new(vec![vec![1.0, 2.0], vec![3.0, 4.0]], vec!["a", "b"]).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.num_features(), 2);
        assert!(!set.is_empty());
        assert_eq!(set.labels(), ["a", "b"]);
    }

    #[test]
    fn distance_matrix_round_trips_rows() {
        let matrix =
            DistanceMatrix::from_rows(vec![vec![0.0, 1.0, 2.0], vec![3.0, 4.0, 5.0]]).unwrap();
        assert_eq!(matrix.num_query(), 2);
        assert_eq!(matrix.num_train(), 3);
        assert_eq!(matrix.row(0), [0.0, 1.0, 2.0]);
        assert_eq!(matrix.row(1), [3.0, 4.0, 5.0]);
        assert_eq!(matrix.get(1, 2), 5.0);
    }

    #[test]
    fn distance_matrix_rejects_ragged_rows() {
        let result = DistanceMatrix::from_rows(vec![vec![0.0, 1.0], vec![2.0]]);
        assert!(matches!(result, Err(KnnError::ShapeMismatch { .. })));
    }
}
