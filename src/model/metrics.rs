//! Classification metrics

use std::path::Path;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// The four standard classification metrics computed on the held-out test
/// split. Serialized field names are the metrics-record keys; the configured
/// primary metric is looked up by that key via [`ClassificationMetrics::get`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    #[serde(rename = "Accuracy")]
    pub accuracy: f64,
    #[serde(rename = "F1_Score")]
    pub f1_score: f64,
    #[serde(rename = "Precision")]
    pub precision: f64,
    #[serde(rename = "Recall")]
    pub recall: f64,
}

impl ClassificationMetrics {
    /// Compute binary classification metrics, positive class 1
    pub fn compute(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let n = y_true.len().max(1) as f64;

        let correct: usize = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(t, p)| (*t - *p).abs() < 0.5)
            .count();
        let accuracy = correct as f64 / n;

        let (tp, fp, _tn, fn_) = confusion_counts(y_true, y_pred);

        let precision = if tp + fp > 0 {
            tp as f64 / (tp + fp) as f64
        } else {
            0.0
        };
        let recall = if tp + fn_ > 0 {
            tp as f64 / (tp + fn_) as f64
        } else {
            0.0
        };
        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Self {
            accuracy,
            f1_score,
            precision,
            recall,
        }
    }

    /// Look up a metric by its record key
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "Accuracy" => Some(self.accuracy),
            "F1_Score" => Some(self.f1_score),
            "Precision" => Some(self.precision),
            "Recall" => Some(self.recall),
            _ => None,
        }
    }

    /// Write the metrics record as YAML
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Read a metrics record from YAML
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Data(format!("failed to read {}: {}", path.display(), e))
        })?;
        Ok(serde_yaml::from_str(&raw)?)
    }
}

fn confusion_counts(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> (usize, usize, usize, usize) {
    let mut tp = 0;
    let mut fp = 0;
    let mut tn = 0;
    let mut fn_ = 0;

    for (t, p) in y_true.iter().zip(y_pred.iter()) {
        let t_bool = *t > 0.5;
        let p_bool = *p > 0.5;

        match (t_bool, p_bool) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (false, false) => tn += 1,
            (true, false) => fn_ += 1,
        }
    }

    (tp, fp, tn, fn_)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_perfect_prediction() {
        let y = array![1.0, 0.0, 1.0, 0.0];
        let metrics = ClassificationMetrics::compute(&y, &y);

        assert_eq!(metrics.accuracy, 1.0);
        assert_eq!(metrics.precision, 1.0);
        assert_eq!(metrics.recall, 1.0);
        assert_eq!(metrics.f1_score, 1.0);
    }

    #[test]
    fn test_known_confusion() {
        // tp=2, fp=1, fn=1, tn=4
        let y_true = array![1.0, 1.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let y_pred = array![1.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0];

        let metrics = ClassificationMetrics::compute(&y_true, &y_pred);
        assert!((metrics.accuracy - 0.75).abs() < 1e-10);
        assert!((metrics.precision - 2.0 / 3.0).abs() < 1e-10);
        assert!((metrics.recall - 2.0 / 3.0).abs() < 1e-10);
        assert!((metrics.f1_score - 2.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_metric_lookup_by_key() {
        let y = array![1.0, 0.0];
        let metrics = ClassificationMetrics::compute(&y, &y);

        assert_eq!(metrics.get("Accuracy"), Some(1.0));
        assert_eq!(metrics.get("F1_Score"), Some(1.0));
        assert_eq!(metrics.get("AUC"), None);
    }

    #[test]
    fn test_yaml_round_trip_uses_record_keys() {
        let y_true = array![1.0, 0.0, 1.0];
        let y_pred = array![1.0, 0.0, 0.0];
        let metrics = ClassificationMetrics::compute(&y_true, &y_pred);

        let yaml = serde_yaml::to_string(&metrics).unwrap();
        assert!(yaml.contains("Accuracy"));
        assert!(yaml.contains("F1_Score"));

        let restored: ClassificationMetrics = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(restored, metrics);
    }
}
