use once_cell::sync::OnceCell;
use tracing::{error, info};

use crate::entities::vitals::RiskLevel;
use super::model::{
    FileModelLoader, LoadError, ModelConfig, ModelLoader, PredictionError, RiskModel,
};

/// Lifecycle state of a predictor's underlying model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictorState {
    /// No load has been attempted yet
    Uninitialized,
    /// The model is loaded and serving predictions
    Ready,
    /// The load failed; the failure is cached for the process lifetime
    Failed,
}

/// A source of model-based risk predictions
pub trait Predictor: Send + Sync {
    /// Predict the risk level for a reading
    fn predict(&self, heart_rate: f64, spo2: f64, age: u32) -> Result<RiskLevel, PredictionError>;

    /// Report the predictor's lifecycle state
    fn state(&self) -> PredictorState {
        PredictorState::Ready
    }
}

/// Predictor backed by a lazily loaded risk model
///
/// The model is loaded at most once, on first use. Concurrent first uses
/// block until the single load finishes, and a failed load stays failed
/// rather than being retried on every call.
pub struct ModelPredictor {
    /// Where the model comes from
    loader: Box<dyn ModelLoader>,
    /// The load outcome, set exactly once
    model: OnceCell<Result<RiskModel, LoadError>>,
}

impl ModelPredictor {
    /// Create a predictor with the given loader
    pub fn new(loader: Box<dyn ModelLoader>) -> Self {
        Self {
            loader,
            model: OnceCell::new(),
        }
    }

    /// Create a predictor reading artifacts from the given paths
    pub fn from_files(
        model_path: impl Into<std::path::PathBuf>,
        encoder_path: impl Into<std::path::PathBuf>,
    ) -> Self {
        Self::new(Box::new(FileModelLoader::new(model_path, encoder_path)))
    }

    /// Create a predictor using artifact paths from the environment
    pub fn from_env() -> Self {
        let config = ModelConfig::from_env();
        Self::from_files(config.model_path, config.encoder_path)
    }

    /// Load the model if this is the first use, then return it
    ///
    /// Useful as an explicit warm-up so the first reading does not pay
    /// the load cost.
    pub fn ensure_loaded(&self) -> Result<&RiskModel, PredictionError> {
        let outcome = self.model.get_or_init(|| {
            info!("Loading risk model artifacts");
            match self.loader.load() {
                Ok(model) => {
                    info!("Risk model loaded successfully");
                    Ok(model)
                }
                Err(e) => {
                    error!("Failed to load risk model: {}", e);
                    Err(e)
                }
            }
        });

        match outcome {
            Ok(model) => Ok(model),
            Err(e) => Err(PredictionError::ModelUnavailable(e.to_string())),
        }
    }
}

impl Predictor for ModelPredictor {
    fn predict(&self, heart_rate: f64, spo2: f64, age: u32) -> Result<RiskLevel, PredictionError> {
        let model = self.ensure_loaded()?;
        model.predict(heart_rate, spo2, age)
    }

    fn state(&self) -> PredictorState {
        match self.model.get() {
            None => PredictorState::Uninitialized,
            Some(Ok(_)) => PredictorState::Ready,
            Some(Err(_)) => PredictorState::Failed,
        }
    }
}
