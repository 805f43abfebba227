// Risk classification for vital-signs readings
pub mod rules;
pub mod model;
pub mod predictor;
pub mod classifier;

// Re-export the classification surface for easier imports
pub use rules::classify_vitals;
pub use model::{FileModelLoader, LoadError, ModelConfig, ModelLoader, PredictionError, RiskModel};
pub use predictor::{ModelPredictor, Predictor, PredictorState};
pub use classifier::RiskClassifier;
