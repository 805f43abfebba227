use crate::entities::vitals::{
    CreateReadingRequest, CreateSubjectRequest, HealthRecord, RiskLevel, Subject,
};
use uuid::Uuid;

/// Conversion functions between domain entities and data models
/// These functions follow the pattern convert_to_[target_layer]_[model_name]

/// Helper function to safely parse a string ID to UUID
///
/// This centralizes UUID parsing logic to ensure consistent handling across the application.
/// When an invalid UUID is provided, it returns a descriptive error message.
pub fn parse_string_to_uuid(id: &str) -> Result<Uuid, String> {
    Uuid::parse_str(id).map_err(|_| format!("Invalid UUID format: {}", id))
}

/// Convert from data model to domain entity for a subject
pub fn convert_to_domain_subject(data_subject: vitalwatch_data::models::Subject) -> Subject {
    Subject {
        id: data_subject.id,
        name: data_subject.name,
        age: data_subject.age,
        gender: data_subject.gender,
        created_at: data_subject.created_at,
    }
}

/// Convert from domain entity to data model for a subject create request
pub fn convert_to_data_create_subject(domain_request: &CreateSubjectRequest)
    -> vitalwatch_data::models::CreateSubjectRequest
{
    vitalwatch_data::models::CreateSubjectRequest {
        name: domain_request.name.clone(),
        age: domain_request.age,
        gender: domain_request.gender.clone(),
    }
}

/// Convert from data model to domain entity for a health record
///
/// The stored status label is parsed back into a typed risk level and an
/// unrecognized label is reported as an error rather than silently mapped.
pub fn convert_to_domain_record(data_record: vitalwatch_data::models::HealthRecord)
    -> Result<HealthRecord, String>
{
    let status = RiskLevel::from_label(&data_record.status)
        .ok_or_else(|| format!("Unknown risk status label: {}", data_record.status))?;

    Ok(HealthRecord {
        id: data_record.id,
        subject_id: data_record.subject_id,
        heart_rate: data_record.heart_rate,
        spo2: data_record.spo2,
        ir: data_record.ir,
        red: data_record.red,
        status,
        recorded_at: data_record.recorded_at,
    })
}

/// Convert from domain entity to data model for a record create request
pub fn convert_to_data_record_request(
    domain_request: &CreateReadingRequest,
    subject_id: &str,
    status: RiskLevel,
) -> vitalwatch_data::models::CreateHealthRecordRequest {
    vitalwatch_data::models::CreateHealthRecordRequest {
        subject_id: subject_id.to_string(),
        heart_rate: domain_request.heart_rate,
        spo2: domain_request.spo2,
        ir: domain_request.ir,
        red: domain_request.red,
        status: status.as_str().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_parse_string_to_uuid() {
        assert!(parse_string_to_uuid("123e4567-e89b-12d3-a456-426614174000").is_ok());

        let err = parse_string_to_uuid("not-a-uuid").unwrap_err();
        assert!(err.contains("Invalid UUID format"));
    }

    #[test]
    fn test_convert_to_domain_subject() {
        let data_subject = vitalwatch_data::models::Subject {
            id: "123e4567-e89b-12d3-a456-426614174000".to_string(),
            name: "Ada".to_string(),
            age: 36,
            gender: Some("female".to_string()),
            created_at: Utc::now().to_rfc3339(),
        };

        let domain_subject = convert_to_domain_subject(data_subject.clone());

        assert_eq!(domain_subject.id, data_subject.id);
        assert_eq!(domain_subject.name, data_subject.name);
        assert_eq!(domain_subject.age, data_subject.age);
        assert_eq!(domain_subject.gender, data_subject.gender);
        assert_eq!(domain_subject.created_at, data_subject.created_at);
    }

    #[test]
    fn test_convert_to_domain_record_parses_status() {
        let data_record = vitalwatch_data::models::HealthRecord {
            id: "123e4567-e89b-12d3-a456-426614174000".to_string(),
            subject_id: "223e4567-e89b-12d3-a456-426614174000".to_string(),
            heart_rate: 110.0,
            spo2: 93.0,
            ir: Some(102_400),
            red: Some(98_304),
            status: "Slightly Normal".to_string(),
            recorded_at: Utc::now().to_rfc3339(),
        };

        let domain_record = convert_to_domain_record(data_record).unwrap();
        assert_eq!(domain_record.status, RiskLevel::SlightlyNormal);
        assert_eq!(domain_record.heart_rate, 110.0);
    }

    #[test]
    fn test_convert_to_domain_record_rejects_unknown_status() {
        let data_record = vitalwatch_data::models::HealthRecord {
            id: "123e4567-e89b-12d3-a456-426614174000".to_string(),
            subject_id: "223e4567-e89b-12d3-a456-426614174000".to_string(),
            heart_rate: 72.0,
            spo2: 98.0,
            ir: None,
            red: None,
            status: "Critical".to_string(),
            recorded_at: Utc::now().to_rfc3339(),
        };

        let err = convert_to_domain_record(data_record).unwrap_err();
        assert!(err.contains("Unknown risk status label"));
    }

    #[test]
    fn test_convert_to_data_record_request() {
        let domain_request = CreateReadingRequest {
            heart_rate: 72.0,
            spo2: 98.0,
            ir: Some(1),
            red: Some(2),
        };

        let data_request = convert_to_data_record_request(
            &domain_request,
            "223e4567-e89b-12d3-a456-426614174000",
            RiskLevel::AtRisk,
        );

        assert_eq!(data_request.subject_id, "223e4567-e89b-12d3-a456-426614174000");
        assert_eq!(data_request.heart_rate, domain_request.heart_rate);
        assert_eq!(data_request.spo2, domain_request.spo2);
        assert_eq!(data_request.ir, domain_request.ir);
        assert_eq!(data_request.red, domain_request.red);
        assert_eq!(data_request.status, "At Risk");
    }
}
