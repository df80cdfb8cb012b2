//! The three L1 distance-matrix builders.
//!
//! All three compute `dist[i][j] = Σ_f |query[i][f] - train[j][f]|` for
//! every (query, train) pair and differ only in
//! computational structure: one flat iterator expression over the whole
//! product, one loop over query rows with the row built by adaptors, or
//! explicit nested loops with a scalar accumulator. Keeping the variants
//! side by side lets tests cross-check their results.
//!
//! Every builder returns the row-major value buffer for a
//! (num_query × num_train) matrix; shape validation happens in the
//! classifier before these are called.

use num_traits::{AsPrimitive, Float};

/// L1 (Manhattan) distance between two equal-length feature vectors.
pub fn l1_distance<F>(a: &[F], b: &[F]) -> f64
where
    F: Float + AsPrimitive<f64>,
{
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (*x - *y).abs().as_())
        .sum()
}

/// Fully vectorized variant: the whole buffer is produced by a single
/// iterator expression over the (query × train) product, with no indexed
/// iteration.
pub fn fully_vectorized<F>(queries: &[Vec<F>], train: &[Vec<F>]) -> Vec<f64>
where
    F: Float + AsPrimitive<f64>,
{
    queries
        .iter()
        .flat_map(|query| train.iter().map(move |sample| l1_distance(query, sample)))
        .collect()
}

/// Partially vectorized variant: one explicit pass over query rows; each
/// row against all training samples is built by iterator adaptors.
pub fn partially_vectorized<F>(queries: &[Vec<F>], train: &[Vec<F>]) -> Vec<f64>
where
    F: Float + AsPrimitive<f64>,
{
    let mut values = Vec::with_capacity(queries.len() * train.len());
    for query in queries {
        values.extend(train.iter().map(|sample| l1_distance(query, sample)));
    }
    values
}

/// Unvectorized variant: explicit iteration over every (query, train)
/// pair and every feature, accumulating the absolute differences one by
/// one.
pub fn unvectorized<F>(queries: &[Vec<F>], train: &[Vec<F>]) -> Vec<f64>
where
    F: Float + AsPrimitive<f64>,
{
    let num_train = train.len();
    let mut values = vec![0.0; queries.len() * num_train];
    for (i, query) in queries.iter().enumerate() {
        for (j, sample) in train.iter().enumerate() {
            let mut total = 0.0;
            for f in 0..query.len() {
                total += (query[f] - sample[f]).abs().as_();
            }
            values[i * num_train + j] = total;
        }
    }
    values
}
