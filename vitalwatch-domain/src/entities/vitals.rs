use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Risk level assigned to a vital-signs reading
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RiskLevel {
    /// Vitals are within normal bounds
    Normal,

    /// Vitals are borderline (SpO2 90-94% or heart rate 101-120 bpm)
    #[serde(rename = "Slightly Normal")]
    SlightlyNormal,

    /// Vitals indicate danger (SpO2 below 90% or heart rate above 120 bpm)
    #[serde(rename = "At Risk")]
    AtRisk,
}

impl RiskLevel {
    /// The wire label for this risk level, as stored and reported
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Normal => "Normal",
            RiskLevel::SlightlyNormal => "Slightly Normal",
            RiskLevel::AtRisk => "At Risk",
        }
    }

    /// Parse a wire label back into a risk level
    pub fn from_label(label: &str) -> Option<RiskLevel> {
        match label {
            "Normal" => Some(RiskLevel::Normal),
            "Slightly Normal" => Some(RiskLevel::SlightlyNormal),
            "At Risk" => Some(RiskLevel::AtRisk),
            _ => None,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain model for a monitored subject
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    /// Unique identifier for the subject
    pub id: String,

    /// Display name of the subject
    pub name: String,

    /// Age of the subject in years
    pub age: u32,

    /// Optional gender of the subject
    pub gender: Option<String>,

    /// When the subject was registered
    pub created_at: String,
}

/// Request payload for registering a new subject
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateSubjectRequest {
    /// Display name of the subject
    #[validate(length(min = 1, max = 100, message = "Name must be between 1 and 100 characters"))]
    pub name: String,

    /// Age of the subject in years
    #[validate(range(min = 1, max = 130, message = "Age must be between 1 and 130"))]
    pub age: u32,

    /// Optional gender of the subject
    #[validate(length(max = 20, message = "Gender cannot exceed 20 characters"))]
    pub gender: Option<String>,
}

/// Domain model for a classified vital-signs record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthRecord {
    /// Unique identifier for the record
    pub id: String,

    /// Identifier of the subject the record belongs to
    pub subject_id: String,

    /// Heart rate in beats per minute
    pub heart_rate: f64,

    /// Blood oxygen saturation as a percentage
    pub spo2: f64,

    /// Optional raw infrared sensor value
    pub ir: Option<i64>,

    /// Optional raw red-light sensor value
    pub red: Option<i64>,

    /// Risk level assigned at ingest time
    pub status: RiskLevel,

    /// When the reading was recorded
    pub recorded_at: String,
}

/// Request payload for ingesting a new vital-signs reading
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateReadingRequest {
    /// Heart rate in beats per minute
    #[validate(range(min = 1.0, max = 500.0, message = "Heart rate must be between 1 and 500"))]
    pub heart_rate: f64,

    /// Blood oxygen saturation as a percentage
    #[validate(range(min = 0.0, max = 100.0, message = "SpO2 must be between 0 and 100"))]
    pub spo2: f64,

    /// Optional raw infrared sensor value
    pub ir: Option<i64>,

    /// Optional raw red-light sensor value
    pub red: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_level_wire_labels() {
        // Serialized labels must match the stored wire strings exactly
        assert_eq!(serde_json::to_string(&RiskLevel::Normal).unwrap(), "\"Normal\"");
        assert_eq!(serde_json::to_string(&RiskLevel::SlightlyNormal).unwrap(), "\"Slightly Normal\"");
        assert_eq!(serde_json::to_string(&RiskLevel::AtRisk).unwrap(), "\"At Risk\"");

        let parsed: RiskLevel = serde_json::from_str("\"At Risk\"").unwrap();
        assert_eq!(parsed, RiskLevel::AtRisk);
    }

    #[test]
    fn test_risk_level_label_round_trip() {
        for level in [RiskLevel::Normal, RiskLevel::SlightlyNormal, RiskLevel::AtRisk] {
            assert_eq!(RiskLevel::from_label(level.as_str()), Some(level));
        }

        assert_eq!(RiskLevel::from_label("Critical"), None);
        assert_eq!(RiskLevel::from_label("normal"), None);
    }

    #[test]
    fn test_create_reading_request_validation() {
        let valid = CreateReadingRequest {
            heart_rate: 72.0,
            spo2: 98.0,
            ir: Some(102_400),
            red: None,
        };
        assert!(valid.validate().is_ok());

        // Heart rate of zero is rejected
        let zero_heart_rate = CreateReadingRequest {
            heart_rate: 0.0,
            ..valid.clone()
        };
        assert!(zero_heart_rate.validate().is_err());

        // SpO2 above 100 percent is rejected
        let high_spo2 = CreateReadingRequest {
            spo2: 101.0,
            ..valid.clone()
        };
        assert!(high_spo2.validate().is_err());

        // Non-finite vitals fail the range checks as well
        let nan_vitals = CreateReadingRequest {
            heart_rate: f64::NAN,
            ..valid
        };
        assert!(nan_vitals.validate().is_err());
    }

    #[test]
    fn test_create_subject_request_validation() {
        let valid = CreateSubjectRequest {
            name: "Ada".to_string(),
            age: 36,
            gender: None,
        };
        assert!(valid.validate().is_ok());

        let empty_name = CreateSubjectRequest {
            name: String::new(),
            ..valid.clone()
        };
        assert!(empty_name.validate().is_err());

        let implausible_age = CreateSubjectRequest {
            age: 200,
            ..valid.clone()
        };
        assert!(implausible_age.validate().is_err());

        let oversized_gender = CreateSubjectRequest {
            gender: Some("x".repeat(21)),
            ..valid
        };
        assert!(oversized_gender.validate().is_err());
    }
}
