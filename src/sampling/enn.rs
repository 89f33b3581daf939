//! Edited Nearest Neighbours undersampling

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::{class_counts, nearest_neighbors, ResampleResult, Sampler};
use crate::error::{PipelineError, Result};

/// Edited Nearest Neighbours: removes every sample whose class disagrees
/// with the majority vote of its k nearest neighbours. Cleans all classes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditedNearestNeighbours {
    /// Number of neighbours for the vote
    n_neighbors: usize,
}

impl EditedNearestNeighbours {
    /// Create a new ENN cleaner
    pub fn new() -> Self {
        Self { n_neighbors: 3 }
    }

    /// Set number of neighbours
    pub fn with_n_neighbors(mut self, k: usize) -> Self {
        self.n_neighbors = k.max(1);
        self
    }

    /// Majority class among the voted neighbours; ties resolve to the
    /// smallest class label.
    fn majority_class(votes: &[i64]) -> i64 {
        let counts = class_counts(&Array1::from_vec(votes.to_vec()));
        counts
            .into_iter()
            .max_by_key(|&(class, count)| (count, std::cmp::Reverse(class)))
            .map(|(class, _)| class)
            .unwrap_or(0)
    }
}

impl Default for EditedNearestNeighbours {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for EditedNearestNeighbours {
    fn fit(&mut self, _x: &Array2<f64>, _y: &Array1<i64>) -> Result<()> {
        Ok(())
    }

    fn resample(&self, x: &Array2<f64>, y: &Array1<i64>) -> Result<ResampleResult> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(PipelineError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }

        let rows: Vec<Vec<f64>> = (0..n_samples)
            .map(|i| x.row(i).iter().copied().collect())
            .collect();

        let k = self.n_neighbors.min(n_samples.saturating_sub(1)).max(1);

        let kept: Vec<usize> = (0..n_samples)
            .filter(|&i| {
                let neighbors = nearest_neighbors(&rows[i], &rows, k, Some(i));
                let votes: Vec<i64> = neighbors.iter().map(|&j| y[j]).collect();
                Self::majority_class(&votes) == y[i]
            })
            .collect();

        let n_features = x.ncols();
        let result_x =
            Array2::from_shape_fn((kept.len(), n_features), |(i, j)| x[[kept[i], j]]);
        let result_y = Array1::from_vec(kept.iter().map(|&i| y[i]).collect());

        Ok(ResampleResult {
            x: result_x,
            y: result_y,
            n_synthetic: Vec::new(),
        })
    }
}
