use serde::{Deserialize, Serialize};

/// Storage model for a monitored subject
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

/// Input data for registering a new subject
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSubjectRequest {
    /// Display name of the subject
    pub name: String,

    /// Age of the subject in years
    pub age: u32,

    /// Optional gender of the subject
    pub gender: Option<String>,
}

/// Storage model for a classified vital-signs record
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

    /// Risk status assigned at ingest time
    pub status: String,

    /// When the reading was recorded
    pub recorded_at: String,
}

/// Input data for appending a new vital-signs record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateHealthRecordRequest {
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

    /// Risk status assigned at ingest time
    pub status: String,
}
