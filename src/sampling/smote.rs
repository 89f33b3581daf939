//! SMOTE (Synthetic Minority Over-sampling Technique)

use std::collections::BTreeMap;

use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{class_counts, class_indices, nearest_neighbors, ResampleResult, Sampler};
use crate::error::{PipelineError, Result};

/// SMOTE oversampler: synthesizes minority samples on the segment between a
/// random class member and one of its k nearest same-class neighbours.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SMOTE {
    /// Number of nearest neighbors
    k_neighbors: usize,
    /// Target minority size as a ratio of the majority class
    sampling_strategy: f64,
    /// Random seed
    seed: u64,
    /// Target samples per class, in ascending class order
    target_counts: Option<BTreeMap<i64, usize>>,
}

impl SMOTE {
    /// Create new SMOTE sampler
    pub fn new() -> Self {
        Self {
            k_neighbors: 5,
            sampling_strategy: 1.0, // balance classes
            seed: 42,
            target_counts: None,
        }
    }

    /// Set number of neighbors
    pub fn with_k_neighbors(mut self, k: usize) -> Self {
        self.k_neighbors = k.max(1);
        self
    }

    /// Set sampling strategy (ratio)
    pub fn with_sampling_strategy(mut self, ratio: f64) -> Self {
        self.sampling_strategy = ratio.clamp(0.1, 10.0);
        self
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Generate synthetic sample between two points
    fn generate_sample(&self, point: &[f64], neighbor: &[f64], rng: &mut ChaCha8Rng) -> Vec<f64> {
        let gap: f64 = rng.gen();
        point
            .iter()
            .zip(neighbor.iter())
            .map(|(&p, &n)| p + gap * (n - p))
            .collect()
    }
}

impl Default for SMOTE {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for SMOTE {
    fn fit(&mut self, _x: &Array2<f64>, y: &Array1<i64>) -> Result<()> {
        let counts = class_counts(y);

        if counts.len() < 2 {
            return Err(PipelineError::Data(
                "need at least 2 classes for SMOTE".to_string(),
            ));
        }

        let max_count = *counts.values().max().unwrap_or(&0);

        let mut targets = BTreeMap::new();
        for (&class, &count) in &counts {
            let target = (max_count as f64 * self.sampling_strategy) as usize;
            targets.insert(class, target.max(count));
        }

        self.target_counts = Some(targets);
        Ok(())
    }

    fn resample(&self, x: &Array2<f64>, y: &Array1<i64>) -> Result<ResampleResult> {
        let targets = self
            .target_counts
            .as_ref()
            .ok_or(PipelineError::ModelNotFitted)?;

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let indices = class_indices(y);
        let counts = class_counts(y);
        let n_features = x.ncols();

        // Only synthetic rows are materialized; originals are reused from x
        let mut synthetic_x: Vec<Vec<f64>> = Vec::new();
        let mut synthetic_y: Vec<i64> = Vec::new();
        let mut n_synthetic = Vec::new();

        for (&class, &target_count) in targets {
            let current_count = counts.get(&class).copied().unwrap_or(0);
            let n_to_generate = target_count.saturating_sub(current_count);

            if n_to_generate == 0 {
                n_synthetic.push(0);
                continue;
            }

            let class_idx = indices
                .get(&class)
                .ok_or_else(|| PipelineError::Data(format!("class {} has no samples", class)))?;
            let class_samples: Vec<Vec<f64>> = class_idx
                .iter()
                .map(|&i| x.row(i).iter().copied().collect())
                .collect();

            // Interpolation needs a neighbour distinct from the base point
            if class_samples.len() < 2 {
                warn!(class, "skipping SMOTE for class with fewer than 2 samples");
                n_synthetic.push(0);
                continue;
            }

            let k = self.k_neighbors.min(class_samples.len() - 1).max(1);

            for _ in 0..n_to_generate {
                let idx = rng.gen_range(0..class_samples.len());
                let sample = &class_samples[idx];

                let neighbors = nearest_neighbors(sample, &class_samples, k, Some(idx));
                let neighbor_idx = neighbors[rng.gen_range(0..neighbors.len())];
                let neighbor = &class_samples[neighbor_idx];

                synthetic_x.push(self.generate_sample(sample, neighbor, &mut rng));
                synthetic_y.push(class);
            }

            n_synthetic.push(n_to_generate);
        }

        let n_original = x.nrows();
        let n_total = n_original + synthetic_x.len();
        let result_x = Array2::from_shape_fn((n_total, n_features), |(i, j)| {
            if i < n_original {
                x[[i, j]]
            } else {
                synthetic_x[i - n_original][j]
            }
        });

        let mut all_y: Vec<i64> = y.iter().copied().collect();
        all_y.extend_from_slice(&synthetic_y);

        Ok(ResampleResult {
            x: result_x,
            y: Array1::from_vec(all_y),
            n_synthetic,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn imbalanced() -> (Array2<f64>, Array1<i64>) {
        let x = array![
            [0.0, 0.0],
            [0.1, 0.1],
            [0.2, 0.0],
            [0.3, 0.2],
            [0.1, 0.3],
            [0.2, 0.2],
            [5.0, 5.0],
            [5.1, 5.2],
        ];
        let y = array![0i64, 0, 0, 0, 0, 0, 1, 1];
        (x, y)
    }

    #[test]
    fn test_smote_balances_classes() {
        let (x, y) = imbalanced();
        let mut smote = SMOTE::new().with_k_neighbors(1).with_seed(42);
        let result = smote.fit_resample(&x, &y).unwrap();

        let counts = class_counts(&result.y);
        assert_eq!(counts.get(&0), Some(&6));
        assert_eq!(counts.get(&1), Some(&6));
        assert_eq!(result.x.nrows(), result.y.len());
    }

    #[test]
    fn test_synthetic_samples_interpolate() {
        let (x, y) = imbalanced();
        let mut smote = SMOTE::new().with_k_neighbors(1).with_seed(42);
        let result = smote.fit_resample(&x, &y).unwrap();

        // Synthetic minority rows lie on the segment between the two
        // original minority points
        for i in x.nrows()..result.x.nrows() {
            for j in 0..x.ncols() {
                let v = result.x[[i, j]];
                assert!((5.0..=5.2).contains(&v), "synthetic value {} out of range", v);
            }
        }
    }

    #[test]
    fn test_smote_is_deterministic() {
        let (x, y) = imbalanced();
        let a = SMOTE::new().with_seed(7).fit_resample(&x, &y).unwrap();
        let b = SMOTE::new().with_seed(7).fit_resample(&x, &y).unwrap();
        assert_eq!(a.x, b.x);
        assert_eq!(a.y, b.y);
    }

    #[test]
    fn test_single_class_errors() {
        let x = array![[0.0], [1.0]];
        let y = array![1i64, 1];
        let mut smote = SMOTE::new();
        assert!(smote.fit(&x, &y).is_err());
    }
}
