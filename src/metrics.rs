//! Classification and regression metrics over parallel prediction /
//! ground-truth arrays.
//!
//! These are plain reductions consumed downstream of `predict`; they
//! share the crate's error type so callers get the same eager shape
//! validation as the classifier.

use crate::error::{KnnError, Result};

/// The four headline binary-classification metrics, computed together
/// from one confusion-count pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinaryMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub accuracy: f64,
}

fn check_parallel(predicted: usize, actual: usize) -> Result<()> {
    if predicted != actual {
        return Err(KnnError::ShapeMismatch {
            what: "predictions vs. ground truth",
            expected: actual,
            actual: predicted,
        });
    }
    Ok(())
}

fn check_non_empty(len: usize) -> Result<()> {
    if len == 0 {
        return Err(KnnError::InvalidParameter(
            "metrics require at least one sample".to_string(),
        ));
    }
    Ok(())
}

/// A ratio that collapses to 0.0 when its denominator is empty (no
/// positive predictions, no positive truths).
fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Computes precision, recall, F1 and accuracy for binary classification.
///
/// `positive` names the class counted as positive; every other label is
/// treated as negative.
pub fn binary_classification_metrics<L: Eq>(
    predictions: &[L],
    truth: &[L],
    positive: &L,
) -> Result<BinaryMetrics> {
    check_parallel(predictions.len(), truth.len())?;
    check_non_empty(truth.len())?;

    let (mut tp, mut fp, mut tn, mut fn_) = (0u64, 0u64, 0u64, 0u64);
    for (predicted, actual) in predictions.iter().zip(truth) {
        match (predicted == positive, actual == positive) {
            (true, true) => tp += 1,
            (true, false) => fp += 1,
            (false, true) => fn_ += 1,
            (false, false) => tn += 1,
        }
    }

    Ok(BinaryMetrics {
        precision: ratio(tp, tp + fp),
        recall: ratio(tp, tp + fn_),
        f1: ratio(2 * tp, 2 * tp + fp + fn_),
        accuracy: ratio(tp + tn, tp + fp + tn + fn_),
    })
}

/// Ratio of accurate predictions to total samples, over an arbitrary
/// label alphabet.
pub fn multiclass_accuracy<L: Eq>(predictions: &[L], truth: &[L]) -> Result<f64> {
    check_parallel(predictions.len(), truth.len())?;
    check_non_empty(truth.len())?;
    let correct = predictions
        .iter()
        .zip(truth)
        .filter(|(predicted, actual)| predicted == actual)
        .count();
    Ok(correct as f64 / truth.len() as f64)
}

/// Mean squared error.
pub fn mse(predictions: &[f64], truth: &[f64]) -> Result<f64> {
    check_parallel(predictions.len(), truth.len())?;
    check_non_empty(truth.len())?;
    let total: f64 = predictions
        .iter()
        .zip(truth)
        .map(|(predicted, actual)| (actual - predicted).powi(2))
        .sum();
    Ok(total / truth.len() as f64)
}

/// Mean absolute error.
pub fn mae(predictions: &[f64], truth: &[f64]) -> Result<f64> {
    check_parallel(predictions.len(), truth.len())?;
    check_non_empty(truth.len())?;
    let total: f64 = predictions
        .iter()
        .zip(truth)
        .map(|(predicted, actual)| (actual - predicted).abs())
        .sum();
    Ok(total / truth.len() as f64)
}

/// Coefficient of determination (R²).
///
/// Undefined when the ground truth has zero variance, which is reported
/// as an [`KnnError::InvalidParameter`] instead of dividing by zero.
pub fn r_squared(predictions: &[f64], truth: &[f64]) -> Result<f64> {
    check_parallel(predictions.len(), truth.len())?;
    check_non_empty(truth.len())?;
    let mean = truth.iter().sum::<f64>() / truth.len() as f64;
    let ss_res: f64 = predictions
        .iter()
        .zip(truth)
        .map(|(predicted, actual)| (actual - predicted).powi(2))
        .sum();
    let ss_tot: f64 = truth.iter().map(|actual| (actual - mean).powi(2)).sum();
    if ss_tot == 0.0 {
        return Err(KnnError::InvalidParameter(
            "r-squared is undefined for constant ground truth".to_string(),
        ));
    }
    Ok(1.0 - ss_res / ss_tot)
}
