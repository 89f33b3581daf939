//! Application state

use tokio::sync::Mutex;

use crate::config::PipelineConfig;
use crate::pipeline::Predictor;

/// Shared state: the configuration and the predictor loaded once at
/// startup. The predictor is read-only after initialization; the mutex only
/// serializes training runs.
pub struct AppState {
    pub config: PipelineConfig,
    pub predictor: Predictor,
    pub training: Mutex<()>,
}

impl AppState {
    pub fn new(config: PipelineConfig, predictor: Predictor) -> Self {
        Self {
            config,
            predictor,
            training: Mutex::new(()),
        }
    }
}
