//! Combined over/under-sampling (SMOTE + ENN)

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{class_counts, EditedNearestNeighbours, ResampleResult, Sampler, SMOTE};
use crate::error::Result;

/// SMOTE oversampling followed by Edited-Nearest-Neighbours cleaning, the
/// combined technique applied to the transformed training set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmoteEnn {
    smote: SMOTE,
    enn: EditedNearestNeighbours,
}

impl SmoteEnn {
    /// Create with default SMOTE and ENN settings
    pub fn new() -> Self {
        Self {
            smote: SMOTE::new(),
            enn: EditedNearestNeighbours::new(),
        }
    }

    /// Set the random seed of the oversampling step
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.smote = self.smote.with_seed(seed);
        self
    }

    /// Set k for the SMOTE neighbour search
    pub fn with_k_neighbors(mut self, k: usize) -> Self {
        self.smote = self.smote.with_k_neighbors(k);
        self
    }
}

impl Default for SmoteEnn {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for SmoteEnn {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<i64>) -> Result<()> {
        self.smote.fit(x, y)
    }

    fn resample(&self, x: &Array2<f64>, y: &Array1<i64>) -> Result<ResampleResult> {
        let oversampled = self.smote.resample(x, y)?;
        info!(
            before = y.len(),
            after = oversampled.y.len(),
            "SMOTE oversampling applied"
        );

        let cleaned = self.enn.resample(&oversampled.x, &oversampled.y)?;

        // ENN can erase an entire class on degenerate data; hand the trainer
        // the uncleaned result in that case.
        if class_counts(&cleaned.y).len() < class_counts(&oversampled.y).len() {
            warn!("ENN cleaning removed a class entirely, keeping SMOTE output");
            return Ok(oversampled);
        }

        info!(
            before = oversampled.y.len(),
            after = cleaned.y.len(),
            "ENN cleaning applied"
        );

        Ok(ResampleResult {
            x: cleaned.x,
            y: cleaned.y,
            n_synthetic: oversampled.n_synthetic,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_smoteenn_rebalances() {
        let x = array![
            [0.0, 0.0],
            [0.1, 0.1],
            [0.2, 0.0],
            [0.3, 0.2],
            [0.1, 0.3],
            [0.2, 0.2],
            [0.0, 0.2],
            [0.3, 0.0],
            [5.0, 5.0],
            [5.1, 5.2],
            [5.2, 5.1],
        ];
        let y = array![0i64, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1];

        let mut sampler = SmoteEnn::new().with_seed(42).with_k_neighbors(2);
        let result = sampler.fit_resample(&x, &y).unwrap();

        let counts = class_counts(&result.y);
        // Minority class grew toward the majority count
        assert!(counts.get(&1).copied().unwrap_or(0) > 3);
        assert_eq!(counts.len(), 2);
        assert_eq!(result.x.nrows(), result.y.len());
    }

    #[test]
    fn test_smoteenn_is_deterministic() {
        let x = array![
            [0.0, 0.0],
            [0.1, 0.1],
            [0.2, 0.0],
            [0.3, 0.2],
            [5.0, 5.0],
            [5.1, 5.2],
        ];
        let y = array![0i64, 0, 0, 0, 1, 1];

        let a = SmoteEnn::new().with_seed(3).fit_resample(&x, &y).unwrap();
        let b = SmoteEnn::new().with_seed(3).fit_resample(&x, &y).unwrap();
        assert_eq!(a.x, b.x);
        assert_eq!(a.y, b.y);
    }
}
