use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

use crate::entities::vitals::RiskLevel;

/// Feature order the model was trained with
const EXPECTED_FEATURES: [&str; 3] = ["heart_rate", "spo2", "age"];

/// Model kind accepted by the artifact loader
const EXPECTED_MODEL_KIND: &str = "multinomial_logistic_regression";

/// Error loading model artifacts from disk
#[derive(Debug, Error)]
pub enum LoadError {
    /// Artifact file could not be read
    #[error("Failed to read model artifact: {0}")]
    Io(String),

    /// Artifact file could not be parsed
    #[error("Failed to parse model artifact: {0}")]
    Parse(String),

    /// Artifact contents are inconsistent or unsupported
    #[error("Invalid model artifact: {0}")]
    Invalid(String),
}

/// Error producing a prediction
#[derive(Debug, Error)]
pub enum PredictionError {
    /// The model could not be loaded, so no prediction is possible
    #[error("Risk model unavailable: {0}")]
    ModelUnavailable(String),

    /// The inputs cannot be scored
    #[error("Invalid input for prediction: {0}")]
    InvalidInput(String),

    /// The winning score index has no matching class
    #[error("Model produced unknown class index: {0}")]
    UnknownClass(usize),
}

/// On-disk shape of the trained model artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskModelArtifact {
    /// Kind of model the coefficients belong to
    pub model: String,

    /// Feature names in the order the coefficient columns expect
    pub features: Vec<String>,

    /// One coefficient row per class
    pub coefficients: Vec<Vec<f64>>,

    /// One intercept per class
    pub intercepts: Vec<f64>,
}

/// On-disk shape of the label encoder artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelEncoderArtifact {
    /// Class labels in encoded order
    pub classes: Vec<String>,
}

/// A multinomial logistic regression model over heart rate, SpO2 and age
#[derive(Debug, Clone)]
pub struct RiskModel {
    /// Coefficient rows, one per class, in encoder order
    coefficients: Vec<[f64; 3]>,
    /// Intercepts, one per class, in encoder order
    intercepts: Vec<f64>,
    /// Risk levels in encoder order
    classes: Vec<RiskLevel>,
}

impl RiskModel {
    /// Build a model from its two artifacts, validating their consistency
    pub fn from_artifacts(
        model: RiskModelArtifact,
        encoder: LabelEncoderArtifact,
    ) -> Result<Self, LoadError> {
        if model.model != EXPECTED_MODEL_KIND {
            return Err(LoadError::Invalid(format!(
                "Unsupported model kind: {}", model.model
            )));
        }

        if model.features != EXPECTED_FEATURES {
            return Err(LoadError::Invalid(format!(
                "Unexpected feature order: {:?}", model.features
            )));
        }

        if encoder.classes.is_empty() {
            return Err(LoadError::Invalid("Label encoder has no classes".to_string()));
        }

        if model.coefficients.len() != encoder.classes.len()
            || model.intercepts.len() != encoder.classes.len()
        {
            return Err(LoadError::Invalid(format!(
                "Class count mismatch: {} coefficient rows, {} intercepts, {} classes",
                model.coefficients.len(),
                model.intercepts.len(),
                encoder.classes.len(),
            )));
        }

        let mut coefficients = Vec::with_capacity(model.coefficients.len());
        for row in &model.coefficients {
            if row.len() != EXPECTED_FEATURES.len() {
                return Err(LoadError::Invalid(format!(
                    "Coefficient row has {} entries, expected {}",
                    row.len(),
                    EXPECTED_FEATURES.len(),
                )));
            }
            if row.iter().any(|c| !c.is_finite()) {
                return Err(LoadError::Invalid("Non-finite coefficient in model".to_string()));
            }
            coefficients.push([row[0], row[1], row[2]]);
        }

        if model.intercepts.iter().any(|b| !b.is_finite()) {
            return Err(LoadError::Invalid("Non-finite intercept in model".to_string()));
        }

        let mut classes = Vec::with_capacity(encoder.classes.len());
        for label in &encoder.classes {
            let level = RiskLevel::from_label(label).ok_or_else(|| {
                LoadError::Invalid(format!("Unknown class label in encoder: {}", label))
            })?;
            classes.push(level);
        }

        Ok(Self {
            coefficients,
            intercepts: model.intercepts,
            classes,
        })
    }

    /// Score a reading and return the winning risk level
    ///
    /// Scores are linear (softmax is monotonic, so it is skipped) and ties
    /// resolve to the earliest class in encoder order.
    pub fn predict(&self, heart_rate: f64, spo2: f64, age: u32) -> Result<RiskLevel, PredictionError> {
        if !heart_rate.is_finite() || !spo2.is_finite() {
            return Err(PredictionError::InvalidInput(format!(
                "Non-finite vitals: heart_rate={}, spo2={}", heart_rate, spo2
            )));
        }

        let features = [heart_rate, spo2, f64::from(age)];

        let mut best_index = 0;
        let mut best_score = f64::NEG_INFINITY;
        for (index, (coefficients, intercept)) in
            self.coefficients.iter().zip(&self.intercepts).enumerate()
        {
            let score = intercept
                + coefficients.iter().zip(&features).map(|(c, x)| c * x).sum::<f64>();
            if score > best_score {
                best_score = score;
                best_index = index;
            }
        }

        self.classes
            .get(best_index)
            .copied()
            .ok_or(PredictionError::UnknownClass(best_index))
    }
}

/// Source of a risk model, abstracted so tests can substitute their own
pub trait ModelLoader: Send + Sync {
    /// Load and validate the model
    fn load(&self) -> Result<RiskModel, LoadError>;
}

/// Loader that reads the two JSON artifacts from disk
pub struct FileModelLoader {
    /// Path to the model artifact
    model_path: PathBuf,
    /// Path to the label encoder artifact
    encoder_path: PathBuf,
}

impl FileModelLoader {
    /// Create a loader for the given artifact paths
    pub fn new(model_path: impl Into<PathBuf>, encoder_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            encoder_path: encoder_path.into(),
        }
    }
}

impl ModelLoader for FileModelLoader {
    fn load(&self) -> Result<RiskModel, LoadError> {
        let model_text = fs::read_to_string(&self.model_path)
            .map_err(|e| LoadError::Io(format!("{}: {}", self.model_path.display(), e)))?;
        let encoder_text = fs::read_to_string(&self.encoder_path)
            .map_err(|e| LoadError::Io(format!("{}: {}", self.encoder_path.display(), e)))?;

        let model: RiskModelArtifact = serde_json::from_str(&model_text)
            .map_err(|e| LoadError::Parse(format!("{}: {}", self.model_path.display(), e)))?;
        let encoder: LabelEncoderArtifact = serde_json::from_str(&encoder_text)
            .map_err(|e| LoadError::Parse(format!("{}: {}", self.encoder_path.display(), e)))?;

        RiskModel::from_artifacts(model, encoder)
    }
}

/// Model artifact configuration
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Path to the model artifact
    pub model_path: PathBuf,
    /// Path to the label encoder artifact
    pub encoder_path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/risk_model.json"),
            encoder_path: PathBuf::from("models/label_encoder.json"),
        }
    }
}

impl ModelConfig {
    /// Create a model configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let model_path = env::var("RISK_MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.model_path);

        let encoder_path = env::var("LABEL_ENCODER_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.encoder_path);

        info!("Model configuration: model={}, encoder={}",
            model_path.display(), encoder_path.display());

        Self { model_path, encoder_path }
    }
}
