use thiserror::Error;
use validator::Validate;
use async_trait::async_trait;

use crate::classification::RiskClassifier;
use crate::entities::conversions;
use crate::entities::vitals::{CreateReadingRequest, HealthRecord, RiskLevel};
use vitalwatch_data::repository::{
    HealthRecordRepositoryTrait, RepositoryError, SubjectRepositoryTrait,
};

/// Vitals ingestion service errors
#[derive(Debug, Error)]
pub enum VitalsServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Subject not found error
    #[error("Subject not found: {0}")]
    SubjectNotFound(String),

    /// Record not found error
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    /// Persistence error
    #[error("Persistence error: {0}")]
    PersistenceError(String),
}

/// Trait for vitals ingestion service operations
#[async_trait]
pub trait VitalsServiceTrait {
    /// Validate an incoming vital-signs reading
    fn validate_reading(&self, request: &CreateReadingRequest) -> Result<(), VitalsServiceError>;

    /// Classify a reading for a subject of the given age
    fn classify_reading(&self, request: &CreateReadingRequest, age: u32) -> RiskLevel;

    /// Ingest a reading for a subject: validate, classify and persist it
    async fn ingest_reading(
        &self,
        subject_id: &str,
        request: CreateReadingRequest,
    ) -> Result<HealthRecord, VitalsServiceError>;

    /// Get a page of a subject's history together with the total count
    async fn get_history(
        &self,
        subject_id: &str,
        limit: Option<usize>,
        offset: Option<usize>,
        sort_desc: Option<bool>,
    ) -> Result<(Vec<HealthRecord>, usize), VitalsServiceError>;

    /// Delete a record by ID, returning the deleted record
    async fn delete_record(&self, id: &str) -> Result<HealthRecord, VitalsServiceError>;
}

/// Vitals ingestion service for domain logic
pub struct VitalsService<S: SubjectRepositoryTrait, R: HealthRecordRepositoryTrait> {
    subjects: S,
    records: R,
    classifier: RiskClassifier,
}

impl<S: SubjectRepositoryTrait, R: HealthRecordRepositoryTrait> VitalsService<S, R> {
    /// Create a new vitals ingestion service
    pub fn new(subjects: S, records: R, classifier: RiskClassifier) -> Self {
        Self {
            subjects,
            records,
            classifier,
        }
    }

    /// Map repository errors to service errors
    fn map_repo_error(&self, err: RepositoryError) -> VitalsServiceError {
        match err {
            RepositoryError::Validation(msg) => VitalsServiceError::ValidationError(msg),
            RepositoryError::NotFound(msg) => VitalsServiceError::RecordNotFound(msg),
            _ => VitalsServiceError::PersistenceError(err.to_string()),
        }
    }
}

#[async_trait]
impl<S, R> VitalsServiceTrait for VitalsService<S, R>
where
    S: SubjectRepositoryTrait + Send + Sync,
    R: HealthRecordRepositoryTrait + Send + Sync,
{
    /// Validate an incoming vital-signs reading
    fn validate_reading(&self, request: &CreateReadingRequest) -> Result<(), VitalsServiceError> {
        // Use the validator crate's validation
        if let Err(validation_errors) = request.validate() {
            // Convert validation errors to a meaningful error message
            let error_message = validation_errors
                .field_errors()
                .iter()
                .map(|(field, errors)| {
                    let error_msgs: Vec<String> = errors
                        .iter()
                        .map(|err| {
                            if let Some(msg) = &err.message {
                                msg.to_string()
                            } else {
                                format!("Invalid {}", field)
                            }
                        })
                        .collect();
                    format!("{}: {}", field, error_msgs.join(", "))
                })
                .collect::<Vec<String>>()
                .join("; ");

            return Err(VitalsServiceError::ValidationError(error_message));
        }

        Ok(())
    }

    /// Classify a reading for a subject of the given age
    fn classify_reading(&self, request: &CreateReadingRequest, age: u32) -> RiskLevel {
        self.classifier.classify(request.heart_rate, request.spo2, age)
    }

    /// Ingest a reading for a subject: validate, classify and persist it
    async fn ingest_reading(
        &self,
        subject_id: &str,
        request: CreateReadingRequest,
    ) -> Result<HealthRecord, VitalsServiceError> {
        // Parse the subject ID using the centralized helper function
        let subject_uuid = conversions::parse_string_to_uuid(subject_id)
            .map_err(VitalsServiceError::ValidationError)?;

        // Validate the reading before touching storage
        self.validate_reading(&request)?;

        // Resolve the subject so classification can use their age
        let subject = self.subjects.get_by_id(subject_uuid)
            .await
            .map_err(|e| self.map_repo_error(e))?
            .ok_or_else(|| VitalsServiceError::SubjectNotFound(
                format!("Subject with ID {} not found", subject_id)
            ))?;

        // Classify the reading
        let status = self.classify_reading(&request, subject.age);

        // Convert domain entity to data model using the centralized conversion function
        let data_request = conversions::convert_to_data_record_request(&request, &subject.id, status);

        // Call repository method
        let data_record = self.records.append(data_request)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        // Convert back to domain entity using the centralized conversion function
        let domain_record = conversions::convert_to_domain_record(data_record)
            .map_err(VitalsServiceError::PersistenceError)?;

        Ok(domain_record)
    }

    /// Get a page of a subject's history together with the total count
    async fn get_history(
        &self,
        subject_id: &str,
        limit: Option<usize>,
        offset: Option<usize>,
        sort_desc: Option<bool>,
    ) -> Result<(Vec<HealthRecord>, usize), VitalsServiceError> {
        // Parse the subject ID using the centralized helper function
        let subject_uuid = conversions::parse_string_to_uuid(subject_id)
            .map_err(VitalsServiceError::ValidationError)?;

        // Call repository method. A subject with no records gets an empty
        // page rather than an error.
        let (data_records, total_count) = self.records.get_for_subject(
            subject_uuid,
            limit,
            offset,
            sort_desc,
        ).await
        .map_err(|e| self.map_repo_error(e))?;

        // Convert to domain entities using the centralized conversion function
        let domain_records = data_records.into_iter()
            .map(conversions::convert_to_domain_record)
            .collect::<Result<Vec<_>, String>>()
            .map_err(VitalsServiceError::PersistenceError)?;

        Ok((domain_records, total_count))
    }

    /// Delete a record by ID, returning the deleted record
    async fn delete_record(&self, id: &str) -> Result<HealthRecord, VitalsServiceError> {
        // Parse the record ID using the centralized helper function
        let record_uuid = conversions::parse_string_to_uuid(id)
            .map_err(VitalsServiceError::ValidationError)?;

        // Call repository method
        let data_record = self.records.delete(record_uuid)
            .await
            .map_err(|e| self.map_repo_error(e))?
            .ok_or_else(|| VitalsServiceError::RecordNotFound(
                format!("Health record with ID {} not found", id)
            ))?;

        // Convert to domain entity using the centralized conversion function
        let domain_record = conversions::convert_to_domain_record(data_record)
            .map_err(VitalsServiceError::PersistenceError)?;

        Ok(domain_record)
    }
}

/// Create a default vitals service using the repositories from the data layer
pub fn create_default_vitals_service(classifier: RiskClassifier) -> impl VitalsServiceTrait + Send + Sync {
    let subjects = vitalwatch_data::repository::SubjectRepository::new();
    let records = vitalwatch_data::repository::HealthRecordRepository::new();
    VitalsService::new(subjects, records, classifier)
}

/// Create a mock vitals service for testing
/// This function is only available when the mock feature is enabled
#[cfg(feature = "mock")]
pub fn create_mock_vitals_service() -> impl VitalsServiceTrait + Send {
    crate::testing::MockVitalsService::new()
}
