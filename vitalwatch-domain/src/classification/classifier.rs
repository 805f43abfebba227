use std::sync::Arc;
use tracing::warn;

use crate::entities::vitals::RiskLevel;
use super::predictor::{ModelPredictor, Predictor, PredictorState};
use super::rules::classify_vitals;

/// Risk classifier combining the trained model with the threshold rules
///
/// Classification is total: when the model cannot produce a prediction the
/// classifier falls back to the threshold rules, which ignore age, so every
/// reading always gets a risk level.
#[derive(Clone)]
pub struct RiskClassifier {
    /// The model-backed predictor, shared across clones
    predictor: Arc<dyn Predictor>,
}

impl RiskClassifier {
    /// Create a classifier over the given predictor
    pub fn new(predictor: Arc<dyn Predictor>) -> Self {
        Self { predictor }
    }

    /// Create a classifier using artifact paths from the environment
    pub fn from_env() -> Self {
        Self::new(Arc::new(ModelPredictor::from_env()))
    }

    /// Classify a reading, never failing
    pub fn classify(&self, heart_rate: f64, spo2: f64, age: u32) -> RiskLevel {
        match self.predictor.predict(heart_rate, spo2, age) {
            Ok(level) => level,
            Err(e) => {
                warn!("Risk model prediction unavailable ({}), falling back to threshold rules", e);
                classify_vitals(heart_rate, spo2)
            }
        }
    }

    /// Report the lifecycle state of the underlying predictor
    pub fn predictor_state(&self) -> PredictorState {
        self.predictor.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::model::PredictionError;
    use crate::testing::{FailingPredictor, StubPredictor};

    fn fallback_classifier() -> RiskClassifier {
        RiskClassifier::new(Arc::new(FailingPredictor::new("model missing")))
    }

    #[test]
    fn test_classify_uses_predictor_when_available() {
        let classifier = RiskClassifier::new(Arc::new(StubPredictor::new(RiskLevel::AtRisk)));

        // Vitals that the rules would call Normal still come back At Risk
        // because the model's answer wins when it is available.
        assert_eq!(classifier.classify(72.0, 98.0, 30), RiskLevel::AtRisk);
    }

    #[test]
    fn test_fallback_matches_threshold_rules() {
        let classifier = fallback_classifier();

        let cases = [
            (72.0, 98.0),
            (121.0, 95.0),
            (120.0, 95.0),
            (80.0, 89.0),
            (80.0, 90.0),
            (100.0, 95.0),
            (90.0, 96.0),
            (110.0, 85.0),
        ];

        for (heart_rate, spo2) in cases {
            assert_eq!(
                classifier.classify(heart_rate, spo2, 50),
                classify_vitals(heart_rate, spo2),
                "fallback diverged from rules at heart_rate={}, spo2={}",
                heart_rate, spo2,
            );
        }
    }

    #[test]
    fn test_fallback_ignores_age() {
        let classifier = fallback_classifier();

        let young = classifier.classify(110.0, 93.0, 8);
        let old = classifier.classify(110.0, 93.0, 95);
        assert_eq!(young, old);
        assert_eq!(young, RiskLevel::SlightlyNormal);
    }

    #[test]
    fn test_classify_is_total_on_nan_vitals() {
        // The model rejects NaN input, the rules then see all-false
        // comparisons, so classification still returns a level.
        let classifier = RiskClassifier::new(Arc::new(StubPredictor::new(RiskLevel::Normal)));
        assert_eq!(classifier.classify(f64::NAN, f64::NAN, 30), RiskLevel::Normal);

        let fallback = fallback_classifier();
        assert_eq!(fallback.classify(f64::NAN, f64::NAN, 30), RiskLevel::Normal);
    }

    #[test]
    fn test_predictor_state_is_surfaced() {
        let ready = RiskClassifier::new(Arc::new(StubPredictor::new(RiskLevel::Normal)));
        assert_eq!(ready.predictor_state(), PredictorState::Ready);

        let failed = fallback_classifier();
        assert_eq!(failed.predictor_state(), PredictorState::Failed);
    }

    #[test]
    fn test_clones_share_predictor() {
        let classifier = RiskClassifier::new(Arc::new(StubPredictor::new(RiskLevel::SlightlyNormal)));
        let clone = classifier.clone();

        assert_eq!(clone.classify(72.0, 98.0, 30), RiskLevel::SlightlyNormal);
        assert_eq!(clone.predictor_state(), classifier.predictor_state());
    }

    #[test]
    fn test_invalid_input_falls_back_to_rules() {
        // A predictor that always reports invalid input forces the rules path
        struct RejectingPredictor;

        impl crate::classification::predictor::Predictor for RejectingPredictor {
            fn predict(&self, _: f64, _: f64, _: u32) -> Result<RiskLevel, PredictionError> {
                Err(PredictionError::InvalidInput("rejected".to_string()))
            }
        }

        let classifier = RiskClassifier::new(Arc::new(RejectingPredictor));
        assert_eq!(classifier.classify(130.0, 92.0, 40), RiskLevel::AtRisk);
    }
}
