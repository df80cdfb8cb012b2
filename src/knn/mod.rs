//! Brute-force k-nearest-neighbor classification under the L1 metric.
//!
//! The pipeline has two stages used in sequence: a distance engine that
//! turns query samples into a dense [`DistanceMatrix`] against the bound
//! training set, and a label predictor that majority-votes the k nearest
//! training labels for each query row.

pub mod distances;
pub mod heap_utils;

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use num_traits::{AsPrimitive, Float};
use tracing::debug;

use crate::common_types::{DistanceMatrix, TrainingSet};
use crate::error::{KnnError, Result};
use self::heap_utils::KSmallest;

/// Selects which distance-matrix implementation to run.
///
/// The variants compute the identical mathematical quantity and exist for
/// correctness cross-checking and performance comparison; see
/// [`distances`] for the structural differences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DistanceStrategy {
    FullyVectorized,
    PartiallyVectorized,
    Unvectorized,
}

impl TryFrom<u8> for DistanceStrategy {
    type Error = KnnError;

    /// Maps the numeric selectors used by integer-speaking callers:
    /// 0 = fully vectorized, 1 = partially vectorized, 2 = unvectorized.
    /// Anything else is rejected rather than silently coerced.
    fn try_from(mode: u8) -> Result<Self> {
        match mode {
            0 => Ok(DistanceStrategy::FullyVectorized),
            1 => Ok(DistanceStrategy::PartiallyVectorized),
            2 => Ok(DistanceStrategy::Unvectorized),
            other => Err(KnnError::InvalidParameter(format!(
                "unrecognized distance strategy selector {other}; expected 0, 1 or 2"
            ))),
        }
    }
}

/// The K-Nearest Neighbors classifier.
///
/// Owns the neighbor count `k` and, after [`fit`](KnnClassifier::fit), a
/// [`TrainingSet`]. Training data is never mutated once bound; re-fitting
/// replaces the sample matrix and label vector together.
#[derive(Debug)]
pub struct KnnClassifier<F, L> {
    k: usize,
    training: Option<TrainingSet<F, L>>,
}

impl<F, L> KnnClassifier<F, L>
where
    F: Float + AsPrimitive<f64>,
    L: Clone + Eq + Hash,
{
    /// Creates a classifier voting over `k` neighbors.
    ///
    /// Fails with [`KnnError::InvalidParameter`] when `k` is zero.
    pub fn new(k: usize) -> Result<Self> {
        if k == 0 {
            return Err(KnnError::InvalidParameter(
                "k must be greater than 0".to_string(),
            ));
        }
        Ok(KnnClassifier { k, training: None })
    }

    /// The configured neighbor count.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Whether a training set is currently bound.
    pub fn is_fitted(&self) -> bool {
        self.training.is_some()
    }

    /// Binds training samples and labels as an atomic pair, replacing any
    /// previously bound set.
    ///
    /// Fails with [`KnnError::ShapeMismatch`] when the row count differs
    /// from the label count or the sample matrix is ragged, and with
    /// [`KnnError::InvalidParameter`] when the training set is empty.
    pub fn fit(&mut self, samples: Vec<Vec<F>>, labels: Vec<L>) -> Result<()> {
        let training = TrainingSet::new(samples, labels)?;
        debug!(
            num_train = training.len(),
            num_features = training.num_features(),
            "bound training set"
        );
        self.training = Some(training);
        Ok(())
    }

    fn training(&self) -> Result<&TrainingSet<F, L>> {
        self.training.as_ref().ok_or(KnnError::NotFitted)
    }

    /// Computes the L1 distance matrix between `queries` and the bound
    /// training set using the selected strategy.
    ///
    /// Pure apart from the bound training data: identical inputs produce
    /// identical matrices regardless of strategy (up to floating-point
    /// summation-order effects).
    ///
    /// Fails with [`KnnError::NotFitted`] before a successful `fit`, and
    /// with [`KnnError::ShapeMismatch`] when any query row's feature
    /// count differs from the training feature count.
    pub fn compute_distances(
        &self,
        queries: &[Vec<F>],
        strategy: DistanceStrategy,
    ) -> Result<DistanceMatrix> {
        let training = self.training()?;
        for row in queries {
            if row.len() != training.num_features() {
                return Err(KnnError::ShapeMismatch {
                    what: "query features",
                    expected: training.num_features(),
                    actual: row.len(),
                });
            }
        }
        debug!(
            num_query = queries.len(),
            num_train = training.len(),
            ?strategy,
            "computing distance matrix"
        );
        let values = match strategy {
            DistanceStrategy::FullyVectorized => {
                distances::fully_vectorized(queries, training.samples())
            }
            DistanceStrategy::PartiallyVectorized => {
                distances::partially_vectorized(queries, training.samples())
            }
            DistanceStrategy::Unvectorized => {
                distances::unvectorized(queries, training.samples())
            }
        };
        Ok(DistanceMatrix::from_values(
            queries.len(),
            training.len(),
            values,
        ))
    }

    /// Predicts one label per query row of `distances`.
    ///
    /// Dispatches on the number of distinct training labels: exactly two
    /// goes through [`predict_labels_binary`](Self::predict_labels_binary),
    /// anything else through
    /// [`predict_labels_multiclass`](Self::predict_labels_multiclass).
    /// The two paths are behaviorally identical; the split survives only
    /// as a semantic hint about the label alphabet.
    pub fn predict(&self, distances: &DistanceMatrix) -> Result<Vec<L>> {
        let training = self.training()?;
        let distinct: HashSet<&L> = training.labels().iter().collect();
        if distinct.len() == 2 {
            self.predict_labels_binary(distances)
        } else {
            self.predict_labels_multiclass(distances)
        }
    }

    /// Binary-class prediction path. Identical to the multiclass path;
    /// the name signals that the result is interpretable as one of
    /// exactly two classes.
    pub fn predict_labels_binary(&self, distances: &DistanceMatrix) -> Result<Vec<L>> {
        self.vote_rows(distances)
    }

    /// Multiclass prediction path over an arbitrary label alphabet.
    pub fn predict_labels_multiclass(&self, distances: &DistanceMatrix) -> Result<Vec<L>> {
        self.vote_rows(distances)
    }

    /// Convenience wrapper: distance computation followed by prediction.
    pub fn predict_samples(
        &self,
        queries: &[Vec<F>],
        strategy: DistanceStrategy,
    ) -> Result<Vec<L>> {
        let distances = self.compute_distances(queries, strategy)?;
        self.predict(&distances)
    }

    /// Predicts the label of a single query sample.
    pub fn predict_single(&self, query: &[F], strategy: DistanceStrategy) -> Result<L> {
        let mut predictions = self.predict_samples(&[query.to_vec()], strategy)?;
        predictions.pop().ok_or_else(|| {
            KnnError::InvalidParameter(
                "batch prediction returned no result for a single sample".to_string(),
            )
        })
    }

    /// Shared voting core.
    ///
    /// Per query row, selects exactly the k nearest training samples by
    /// stable `(distance, train_index)` rank, then predicts the most
    /// frequent label among them. A repeated distance value never expands
    /// the neighbor set beyond k; equal distances rank by training index.
    /// When several labels are equally frequent, the one owning the
    /// nearest neighbor wins.
    fn vote_rows(&self, distances: &DistanceMatrix) -> Result<Vec<L>> {
        let training = self.training()?;
        if self.k == 0 || self.k > training.len() {
            return Err(KnnError::InvalidParameter(format!(
                "k={} must be between 1 and the training-set size {}",
                self.k,
                training.len()
            )));
        }
        if distances.num_query() == 0 {
            return Ok(Vec::new());
        }
        if distances.num_train() != training.len() {
            return Err(KnnError::ShapeMismatch {
                what: "distance matrix columns vs. training samples",
                expected: training.len(),
                actual: distances.num_train(),
            });
        }

        debug!(
            num_query = distances.num_query(),
            k = self.k,
            "predicting labels"
        );
        let mut predictions = Vec::with_capacity(distances.num_query());
        for i in 0..distances.num_query() {
            let mut nearest = KSmallest::new(self.k);
            for (j, &distance) in distances.row(i).iter().enumerate() {
                nearest.push(distance, j);
            }
            let neighbor_labels: Vec<&L> = nearest
                .into_sorted()
                .into_iter()
                .map(|neighbor| &training.labels()[neighbor.index])
                .collect();
            let predicted = Self::majority_label(&neighbor_labels).ok_or_else(|| {
                KnnError::InvalidParameter(
                    "cannot vote over an empty neighbor set".to_string(),
                )
            })?;
            predictions.push(predicted);
        }
        Ok(predictions)
    }

    /// Majority vote over neighbor labels supplied in ascending
    /// `(distance, index)` order. The first label reaching the maximal
    /// count wins, which resolves count ties in favor of the label whose
    /// neighbor is nearest.
    fn majority_label(neighbor_labels: &[&L]) -> Option<L> {
        let mut counts: HashMap<&L, usize> = HashMap::with_capacity(neighbor_labels.len());
        for &label in neighbor_labels {
            *counts.entry(label).or_insert(0) += 1;
        }
        let mut best: Option<(&L, usize)> = None;
        for &label in neighbor_labels {
            let count = counts.get(label).copied().unwrap_or(0);
            match best {
                Some((_, best_count)) if best_count >= count => {}
                _ => best = Some((label, count)),
            }
        }
        best.map(|(label, _)| label.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const EPSILON: f64 = 1e-9;

    fn fitted_classifier() -> KnnClassifier<f64, &'static str> {
        let mut classifier = KnnClassifier::new(1).unwrap();
        classifier
            .fit(
                vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![5.0, 5.0]],
                vec!["a", "a", "b"],
            )
            .unwrap();
        classifier
    }

    #[test]
    fn new_rejects_zero_k() {
        let result = KnnClassifier::<f64, i32>::new(0);
        assert!(matches!(result, Err(KnnError::InvalidParameter(_))));
    }

    #[test]
    fn compute_distances_before_fit_fails() {
        let classifier = KnnClassifier::<f64, i32>::new(1).unwrap();
        let result =
            classifier.compute_distances(&[vec![0.0]], DistanceStrategy::FullyVectorized);
        assert!(matches!(result, Err(KnnError::NotFitted)));
    }

    #[test]
    fn predict_before_fit_fails() {
        let classifier = KnnClassifier::<f64, i32>::new(1).unwrap();
        let matrix = DistanceMatrix::from_rows(vec![vec![1.0, 2.0]]).unwrap();
        assert!(matches!(
            classifier.predict(&matrix),
            Err(KnnError::NotFitted)
        ));
    }

    #[test]
    fn fit_rejects_mismatched_labels() {
        let mut classifier = KnnClassifier::<f64, &str>::new(1).unwrap();
        let result = classifier.fit(vec![vec![0.0], vec![1.0]], vec!["a"]);
        assert!(matches!(result, Err(KnnError::ShapeMismatch { .. })));
        assert!(!classifier.is_fitted());
    }

    #[test]
    fn compute_distances_rejects_feature_mismatch() {
        let classifier = fitted_classifier();
        let result =
            classifier.compute_distances(&[vec![0.0, 1.0, 2.0]], DistanceStrategy::Unvectorized);
        assert!(matches!(
            result,
            Err(KnnError::ShapeMismatch {
                expected: 2,
                actual: 3,
                ..
            })
        ));
    }

    #[test]
    fn predict_rejects_k_larger_than_training_set() {
        let mut classifier = KnnClassifier::<f64, &str>::new(5).unwrap();
        classifier
            .fit(vec![vec![0.0], vec![1.0]], vec!["a", "b"])
            .unwrap();
        let distances = classifier
            .compute_distances(&[vec![0.5]], DistanceStrategy::FullyVectorized)
            .unwrap();
        assert!(matches!(
            classifier.predict(&distances),
            Err(KnnError::InvalidParameter(_))
        ));
    }

    #[test]
    fn predict_rejects_column_count_mismatch() {
        let classifier = fitted_classifier();
        let matrix = DistanceMatrix::from_rows(vec![vec![1.0, 2.0]]).unwrap();
        assert!(matches!(
            classifier.predict(&matrix),
            Err(KnnError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn strategy_selector_round_trips_and_rejects_unknown() {
        assert_eq!(
            DistanceStrategy::try_from(0).unwrap(),
            DistanceStrategy::FullyVectorized
        );
        assert_eq!(
            DistanceStrategy::try_from(1).unwrap(),
            DistanceStrategy::PartiallyVectorized
        );
        assert_eq!(
            DistanceStrategy::try_from(2).unwrap(),
            DistanceStrategy::Unvectorized
        );
        assert!(matches!(
            DistanceStrategy::try_from(3),
            Err(KnnError::InvalidParameter(_))
        ));
    }

    #[test]
    fn self_query_has_zero_diagonal() {
        let train = vec![vec![0.0, 0.0], vec![1.0, 1.0], vec![5.0, 5.0]];
        let mut classifier = KnnClassifier::<f64, i32>::new(1).unwrap();
        classifier.fit(train.clone(), vec![0, 1, 2]).unwrap();
        let distances = classifier
            .compute_distances(&train, DistanceStrategy::PartiallyVectorized)
            .unwrap();
        for i in 0..train.len() {
            assert!(distances.get(i, i).abs() < EPSILON);
        }
    }

    #[test]
    fn k1_copies_nearest_label() {
        let mut classifier = KnnClassifier::<f64, &str>::new(1).unwrap();
        classifier
            .fit(
                vec![vec![0.0, 0.0], vec![4.0, 4.0], vec![10.0, 10.0]],
                vec!["near", "mid", "far"],
            )
            .unwrap();
        let predictions = classifier
            .predict_samples(
                &[vec![1.0, 0.0], vec![4.0, 5.0], vec![9.0, 9.0]],
                DistanceStrategy::FullyVectorized,
            )
            .unwrap();
        assert_eq!(predictions, ["near", "mid", "far"]);
    }

    #[test]
    fn majority_wins_over_nearer_minority() {
        // Three "A" points at distance 1 and two "B" points at distance 2
        // from the query; with k=5 the majority label must win.
        let mut classifier = KnnClassifier::<f64, &str>::new(5).unwrap();
        classifier
            .fit(
                vec![
                    vec![1.0, 0.0],
                    vec![0.0, 1.0],
                    vec![-1.0, 0.0],
                    vec![1.0, 1.0],
                    vec![2.0, 0.0],
                ],
                vec!["A", "A", "A", "B", "B"],
            )
            .unwrap();
        let predictions = classifier
            .predict_samples(&[vec![0.0, 0.0]], DistanceStrategy::Unvectorized)
            .unwrap();
        assert_eq!(predictions, ["A"]);
    }

    #[test]
    fn end_to_end_tie_at_distance_one() {
        // Both [0,0] and [1,1] sit at L1 distance 1 from the query and
        // carry the same label, so the tie cannot change the outcome.
        let classifier = fitted_classifier();
        let predictions = classifier
            .predict_samples(&[vec![0.0, 1.0]], DistanceStrategy::FullyVectorized)
            .unwrap();
        assert_eq!(predictions, ["a"]);
    }

    #[test]
    fn vote_tie_resolves_to_nearest_neighbor_label() {
        // k=2 with one "A" and one "B" equidistant from the query: the
        // count tie resolves to the label of the lower training index.
        let mut classifier = KnnClassifier::<f64, &str>::new(2).unwrap();
        classifier
            .fit(vec![vec![0.0, 1.0], vec![1.0, 0.0]], vec!["A", "B"])
            .unwrap();
        for _ in 0..10 {
            let predictions = classifier
                .predict_samples(&[vec![0.0, 0.0]], DistanceStrategy::FullyVectorized)
                .unwrap();
            assert_eq!(predictions, ["A"]);
        }
    }

    #[test]
    fn binary_and_multiclass_paths_agree() {
        let mut classifier = KnnClassifier::<f64, i32>::new(3).unwrap();
        classifier
            .fit(
                vec![vec![0.0], vec![0.5], vec![1.0], vec![9.0], vec![10.0]],
                vec![0, 0, 0, 1, 1],
            )
            .unwrap();
        let distances = classifier
            .compute_distances(&[vec![0.2], vec![9.5]], DistanceStrategy::FullyVectorized)
            .unwrap();
        let binary = classifier.predict_labels_binary(&distances).unwrap();
        let multiclass = classifier.predict_labels_multiclass(&distances).unwrap();
        assert_eq!(binary, multiclass);
        assert_eq!(binary, [0, 1]);
    }

    #[test]
    fn empty_query_set_predicts_nothing() {
        let classifier = fitted_classifier();
        let distances = classifier
            .compute_distances(&[], DistanceStrategy::PartiallyVectorized)
            .unwrap();
        assert_eq!(distances.num_query(), 0);
        assert!(classifier.predict(&distances).unwrap().is_empty());
    }

    #[test]
    fn predict_single_wraps_batch_prediction() {
        let classifier = fitted_classifier();
        let label = classifier
            .predict_single(&[4.5, 4.5], DistanceStrategy::Unvectorized)
            .unwrap();
        assert_eq!(label, "b");
    }

    #[test]
    fn refit_replaces_training_data() {
        let mut classifier = fitted_classifier();
        classifier
            .fit(vec![vec![0.0, 0.0], vec![1.0, 1.0]], vec!["x", "y"])
            .unwrap();
        let label = classifier
            .predict_single(&[0.1, 0.0], DistanceStrategy::FullyVectorized)
            .unwrap();
        assert_eq!(label, "x");
    }

    #[test]
    fn strategies_agree_on_random_data() {
        let mut rng = StdRng::seed_from_u64(42);
        let train: Vec<Vec<f64>> = (0..30)
            .map(|_| (0..5).map(|_| rng.gen_range(-10.0..10.0)).collect())
            .collect();
        let labels: Vec<i32> = (0..30).map(|_| rng.gen_range(0..3)).collect();
        let queries: Vec<Vec<f64>> = (0..10)
            .map(|_| (0..5).map(|_| rng.gen_range(-10.0..10.0)).collect())
            .collect();

        let mut classifier = KnnClassifier::new(3).unwrap();
        classifier.fit(train, labels).unwrap();

        let full = classifier
            .predict_samples(&queries, DistanceStrategy::FullyVectorized)
            .unwrap();
        let partial = classifier
            .predict_samples(&queries, DistanceStrategy::PartiallyVectorized)
            .unwrap();
        let none = classifier
            .predict_samples(&queries, DistanceStrategy::Unvectorized)
            .unwrap();
        assert_eq!(full, partial);
        assert_eq!(full, none);
    }
}
