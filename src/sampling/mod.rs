//! Class rebalancing for the transformed training set
//!
//! Provides the combined over/under-sampling applied between transformation
//! and training: SMOTE oversampling of minority classes followed by
//! edited-nearest-neighbours cleaning.

mod combine;
mod enn;
mod smote;

pub use combine::SmoteEnn;
pub use enn::EditedNearestNeighbours;
pub use smote::SMOTE;

use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use ndarray::{Array1, Array2};

use crate::error::Result;

/// Result of resampling
#[derive(Debug, Clone)]
pub struct ResampleResult {
    /// Resampled features
    pub x: Array2<f64>,
    /// Resampled labels
    pub y: Array1<i64>,
    /// Synthetic samples generated per class, in ascending class order
    pub n_synthetic: Vec<usize>,
}

/// Trait for samplers
pub trait Sampler {
    /// Fit the sampler on data
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<i64>) -> Result<()>;

    /// Resample data
    fn resample(&self, x: &Array2<f64>, y: &Array1<i64>) -> Result<ResampleResult>;

    /// Fit and resample in one step
    fn fit_resample(&mut self, x: &Array2<f64>, y: &Array1<i64>) -> Result<ResampleResult> {
        self.fit(x, y)?;
        self.resample(x, y)
    }
}

/// Class distribution, in ascending class order so that iteration (and any
/// RNG consumption driven by it) is deterministic.
pub fn class_counts(y: &Array1<i64>) -> BTreeMap<i64, usize> {
    let mut counts = BTreeMap::new();
    for &label in y.iter() {
        *counts.entry(label).or_insert(0) += 1;
    }
    counts
}

/// Row indices per class, in ascending class order
pub fn class_indices(y: &Array1<i64>) -> BTreeMap<i64, Vec<usize>> {
    let mut indices = BTreeMap::new();
    for (i, &label) in y.iter().enumerate() {
        indices.entry(label).or_insert_with(Vec::new).push(i);
    }
    indices
}

/// Ordered float for BinaryHeap-based partial sort
#[derive(Debug, Clone, Copy)]
struct DistIdx(f64, usize);

impl PartialEq for DistIdx {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for DistIdx {}
impl PartialOrd for DistIdx {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for DistIdx {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
    }
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(ai, bi)| (ai - bi).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Indices of the k nearest neighbours of `point` within `data`, skipping
/// `skip` (the point's own index, when it is a member of `data`).
/// Heap-based partial sort: O(n log k).
pub(crate) fn nearest_neighbors(
    point: &[f64],
    data: &[Vec<f64>],
    k: usize,
    skip: Option<usize>,
) -> Vec<usize> {
    let mut heap: BinaryHeap<DistIdx> = BinaryHeap::with_capacity(k + 1);

    for (i, d) in data.iter().enumerate() {
        if skip == Some(i) {
            continue;
        }
        let dist = distance(point, d);
        if heap.len() < k {
            heap.push(DistIdx(dist, i));
        } else if let Some(&DistIdx(max_dist, _)) = heap.peek() {
            if dist < max_dist {
                heap.pop();
                heap.push(DistIdx(dist, i));
            }
        }
    }

    heap.into_iter().map(|DistIdx(_, i)| i).collect()
}
