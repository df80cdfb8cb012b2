//! Brute-force k-nearest-neighbor classification under the L1 metric,
//! with companion evaluation metrics.
//!
//! The crate builds as a plain Rust library by default; enabling the
//! `python` feature additionally compiles the pyo3 bindings below into a
//! Python extension module.

pub mod common_types;
pub mod error;
pub mod knn;
pub mod metrics;

#[cfg(feature = "python")]
use knn::{DistanceStrategy as RustDistanceStrategy, KnnClassifier};
#[cfg(feature = "python")]
use pyo3::exceptions::PyValueError;
#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
impl From<error::KnnError> for PyErr {
    fn from(err: error::KnnError) -> Self {
        PyValueError::new_err(err.to_string())
    }
}

/// Computes precision, recall, F1 and accuracy for binary classification.
#[cfg(feature = "python")]
#[pyfunction]
fn binary_classification_metrics_py(
    predictions: Vec<String>,
    truth: Vec<String>,
    positive: String,
) -> PyResult<(f64, f64, f64, f64)> {
    let metrics = metrics::binary_classification_metrics(&predictions, &truth, &positive)?;
    Ok((
        metrics.precision,
        metrics.recall,
        metrics.f1,
        metrics.accuracy,
    ))
}

/// Ratio of accurate predictions to total samples.
#[cfg(feature = "python")]
#[pyfunction]
fn multiclass_accuracy_py(predictions: Vec<String>, truth: Vec<String>) -> PyResult<f64> {
    Ok(metrics::multiclass_accuracy(&predictions, &truth)?)
}

/// Mean squared error.
#[cfg(feature = "python")]
#[pyfunction]
fn mse_py(predictions: Vec<f64>, truth: Vec<f64>) -> PyResult<f64> {
    Ok(metrics::mse(&predictions, &truth)?)
}

/// Mean absolute error.
#[cfg(feature = "python")]
#[pyfunction]
fn mae_py(predictions: Vec<f64>, truth: Vec<f64>) -> PyResult<f64> {
    Ok(metrics::mae(&predictions, &truth)?)
}

/// Coefficient of determination (R²).
#[cfg(feature = "python")]
#[pyfunction]
fn r_squared_py(predictions: Vec<f64>, truth: Vec<f64>) -> PyResult<f64> {
    Ok(metrics::r_squared(&predictions, &truth)?)
}

/// Python-friendly representation of DistanceStrategy.
#[cfg(feature = "python")]
#[pyclass(name = "DistanceStrategy")]
#[derive(Clone)]
enum PyDistanceStrategy {
    FullyVectorized,
    PartiallyVectorized,
    Unvectorized,
}

#[cfg(feature = "python")]
impl From<PyDistanceStrategy> for RustDistanceStrategy {
    fn from(val: PyDistanceStrategy) -> Self {
        match val {
            PyDistanceStrategy::FullyVectorized => RustDistanceStrategy::FullyVectorized,
            PyDistanceStrategy::PartiallyVectorized => RustDistanceStrategy::PartiallyVectorized,
            PyDistanceStrategy::Unvectorized => RustDistanceStrategy::Unvectorized,
        }
    }
}

#[cfg(feature = "python")]
impl From<RustDistanceStrategy> for PyDistanceStrategy {
    fn from(val: RustDistanceStrategy) -> Self {
        match val {
            RustDistanceStrategy::FullyVectorized => PyDistanceStrategy::FullyVectorized,
            RustDistanceStrategy::PartiallyVectorized => PyDistanceStrategy::PartiallyVectorized,
            RustDistanceStrategy::Unvectorized => PyDistanceStrategy::Unvectorized,
        }
    }
}

#[cfg(feature = "python")]
#[pyclass(name = "KnnClassifier")]
struct PyKnnClassifier {
    classifier: KnnClassifier<f64, String>,
}

#[cfg(feature = "python")]
#[pymethods]
impl PyKnnClassifier {
    #[new]
    fn new(k: usize) -> PyResult<Self> {
        Ok(PyKnnClassifier {
            classifier: KnnClassifier::new(k)?,
        })
    }

    fn fit(&mut self, samples: Vec<Vec<f64>>, labels: Vec<String>) -> PyResult<()> {
        self.classifier.fit(samples, labels)?;
        Ok(())
    }

    fn compute_distances(
        &self,
        queries: Vec<Vec<f64>>,
        strategy: PyDistanceStrategy,
    ) -> PyResult<Vec<Vec<f64>>> {
        let matrix = self.classifier.compute_distances(&queries, strategy.into())?;
        Ok((0..matrix.num_query())
            .map(|i| matrix.row(i).to_vec())
            .collect())
    }

    fn predict(&self, distances: Vec<Vec<f64>>) -> PyResult<Vec<String>> {
        let matrix = common_types::DistanceMatrix::from_rows(distances)?;
        Ok(self.classifier.predict(&matrix)?)
    }

    fn predict_samples(
        &self,
        queries: Vec<Vec<f64>>,
        strategy: PyDistanceStrategy,
    ) -> PyResult<Vec<String>> {
        Ok(self.classifier.predict_samples(&queries, strategy.into())?)
    }

    fn predict_single(
        &self,
        query: Vec<f64>,
        strategy: PyDistanceStrategy,
    ) -> PyResult<String> {
        Ok(self.classifier.predict_single(&query, strategy.into())?)
    }

    #[getter]
    fn k(&self) -> usize {
        self.classifier.k()
    }

    #[getter]
    fn is_fitted(&self) -> bool {
        self.classifier.is_fitted()
    }
}

/// The Python module. The function name must match `lib.name` in
/// `Cargo.toml` for the extension to be importable.
#[cfg(feature = "python")]
#[pymodule]
fn knn_classification(_py: Python<'_>, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(binary_classification_metrics_py, m)?)?;
    m.add_function(wrap_pyfunction!(multiclass_accuracy_py, m)?)?;
    m.add_function(wrap_pyfunction!(mse_py, m)?)?;
    m.add_function(wrap_pyfunction!(mae_py, m)?)?;
    m.add_function(wrap_pyfunction!(r_squared_py, m)?)?;
    m.add_class::<PyDistanceStrategy>()?;
    m.add_class::<PyKnnClassifier>()?;
    Ok(())
}
