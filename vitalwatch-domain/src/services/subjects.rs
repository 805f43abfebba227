use thiserror::Error;
use validator::Validate;
use async_trait::async_trait;

use crate::entities::conversions;
use crate::entities::vitals::{CreateSubjectRequest, Subject};
use vitalwatch_data::repository::{RepositoryError, SubjectRepositoryTrait};

/// Subject service errors
#[derive(Debug, Error)]
pub enum SubjectServiceError {
    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Not found error
    #[error("Subject not found: {0}")]
    NotFound(String),

    /// Repository error
    #[error("Repository error: {0}")]
    RepositoryError(String),
}

/// Trait for subject service operations
#[async_trait]
pub trait SubjectServiceTrait {
    /// Validate a create subject request
    fn validate_create_request(
        &self,
        request: &CreateSubjectRequest,
    ) -> Result<(), SubjectServiceError>;

    /// Register a new subject
    async fn create_subject(&self, request: CreateSubjectRequest)
        -> Result<Subject, SubjectServiceError>;

    /// Get a subject by ID
    async fn get_subject(&self, id: &str) -> Result<Subject, SubjectServiceError>;

    /// Get the earliest-registered subject with the given name
    async fn get_subject_by_name(&self, name: &str) -> Result<Subject, SubjectServiceError>;

    /// Get a page of subjects together with the total count
    async fn list_subjects(
        &self,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<(Vec<Subject>, usize), SubjectServiceError>;
}

/// Subject service for domain logic
pub struct SubjectService<R: SubjectRepositoryTrait> {
    repository: R,
}

impl<R: SubjectRepositoryTrait> SubjectService<R> {
    /// Create a new subject service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Map repository errors to service errors
    fn map_repo_error(&self, err: RepositoryError) -> SubjectServiceError {
        match err {
            RepositoryError::NotFound(msg) => SubjectServiceError::NotFound(msg),
            RepositoryError::Validation(msg) => SubjectServiceError::ValidationError(msg),
            _ => SubjectServiceError::RepositoryError(err.to_string()),
        }
    }
}

#[async_trait]
impl<R: SubjectRepositoryTrait + Send + Sync> SubjectServiceTrait for SubjectService<R> {
    /// Validate a create subject request
    fn validate_create_request(
        &self,
        request: &CreateSubjectRequest,
    ) -> Result<(), SubjectServiceError> {
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

            return Err(SubjectServiceError::ValidationError(error_message));
        }

        Ok(())
    }

    /// Register a new subject
    async fn create_subject(&self, request: CreateSubjectRequest)
        -> Result<Subject, SubjectServiceError>
    {
        // Validate the request
        self.validate_create_request(&request)?;

        // Convert domain entity to data model using the centralized conversion function
        let data_request = conversions::convert_to_data_create_subject(&request);

        // Call repository method
        let data_subject = self.repository.create(data_request)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        // Convert back to domain entity using the centralized conversion function
        let domain_subject = conversions::convert_to_domain_subject(data_subject);

        Ok(domain_subject)
    }

    /// Get a subject by ID
    async fn get_subject(&self, id: &str) -> Result<Subject, SubjectServiceError> {
        // Convert to UUID using the centralized helper function
        let id_uuid = conversions::parse_string_to_uuid(id)
            .map_err(SubjectServiceError::ValidationError)?;

        // Call repository method
        let data_subject = self.repository.get_by_id(id_uuid)
            .await
            .map_err(|e| self.map_repo_error(e))?
            .ok_or_else(|| SubjectServiceError::NotFound(
                format!("Subject with ID {} not found", id)
            ))?;

        // Convert to domain entity using the centralized conversion function
        Ok(conversions::convert_to_domain_subject(data_subject))
    }

    /// Get the earliest-registered subject with the given name
    async fn get_subject_by_name(&self, name: &str) -> Result<Subject, SubjectServiceError> {
        // Call repository method
        let data_subject = self.repository.get_by_name(name)
            .await
            .map_err(|e| self.map_repo_error(e))?
            .ok_or_else(|| SubjectServiceError::NotFound(
                format!("Subject with name {} not found", name)
            ))?;

        // Convert to domain entity using the centralized conversion function
        Ok(conversions::convert_to_domain_subject(data_subject))
    }

    /// Get a page of subjects together with the total count
    async fn list_subjects(
        &self,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<(Vec<Subject>, usize), SubjectServiceError> {
        // Call repository method
        let (data_subjects, total_count) = self.repository.list(limit, offset)
            .await
            .map_err(|e| self.map_repo_error(e))?;

        // Convert to domain entities using the centralized conversion function
        let domain_subjects = data_subjects.into_iter()
            .map(conversions::convert_to_domain_subject)
            .collect();

        Ok((domain_subjects, total_count))
    }
}

/// Create a default subject service using the repository from the data layer
pub fn create_default_subject_service() -> impl SubjectServiceTrait + Send + Sync {
    let repository = vitalwatch_data::repository::SubjectRepository::new();
    SubjectService::new(repository)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;
    use vitalwatch_data::models::Subject as DataSubject;
    use vitalwatch_data::repository::tests::MockSubjectRepository;

    fn data_subject(name: &str, age: u32) -> DataSubject {
        DataSubject {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            age,
            gender: None,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    fn create_request(name: &str, age: u32) -> CreateSubjectRequest {
        CreateSubjectRequest {
            name: name.to_string(),
            age,
            gender: Some("female".to_string()),
        }
    }

    #[test]
    fn test_validate_create_request_valid() {
        let service = SubjectService::new(MockSubjectRepository::new());
        assert!(service.validate_create_request(&create_request("Ada", 36)).is_ok());
    }

    #[test]
    fn test_validate_create_request_empty_name() {
        let service = SubjectService::new(MockSubjectRepository::new());

        let result = service.validate_create_request(&create_request("", 36));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Name"));
    }

    #[test]
    fn test_validate_create_request_implausible_age() {
        let service = SubjectService::new(MockSubjectRepository::new());

        let result = service.validate_create_request(&create_request("Ada", 200));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Age"));
    }

    #[tokio::test]
    async fn test_create_subject_assigns_id() {
        let service = SubjectService::new(MockSubjectRepository::new());

        let subject = service.create_subject(create_request("Ada", 36)).await.unwrap();
        assert_eq!(subject.name, "Ada");
        assert_eq!(subject.age, 36);
        assert!(Uuid::parse_str(&subject.id).is_ok());
    }

    #[tokio::test]
    async fn test_create_subject_rejects_invalid_request() {
        let service = SubjectService::new(MockSubjectRepository::new());

        let err = service.create_subject(create_request("", 36)).await.unwrap_err();
        assert!(matches!(err, SubjectServiceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_get_subject_found() {
        let stored = data_subject("Grace", 45);
        let id = stored.id.clone();
        let service = SubjectService::new(MockSubjectRepository::with_subjects(vec![stored]));

        let subject = service.get_subject(&id).await.unwrap();
        assert_eq!(subject.id, id);
        assert_eq!(subject.name, "Grace");
    }

    #[tokio::test]
    async fn test_get_subject_not_found() {
        let service = SubjectService::new(MockSubjectRepository::new());

        let err = service.get_subject(&Uuid::new_v4().to_string()).await.unwrap_err();
        assert!(matches!(err, SubjectServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_get_subject_invalid_id() {
        let service = SubjectService::new(MockSubjectRepository::new());

        let err = service.get_subject("not-a-uuid").await.unwrap_err();
        assert!(matches!(err, SubjectServiceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_get_subject_by_name() {
        let stored = data_subject("Grace", 45);
        let service = SubjectService::new(MockSubjectRepository::with_subjects(vec![stored]));

        let subject = service.get_subject_by_name("Grace").await.unwrap();
        assert_eq!(subject.name, "Grace");

        let err = service.get_subject_by_name("nobody").await.unwrap_err();
        assert!(matches!(err, SubjectServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_list_subjects_pages() {
        let service = SubjectService::new(MockSubjectRepository::with_subjects(vec![
            data_subject("Ada", 36),
            data_subject("Grace", 45),
            data_subject("Edsger", 72),
        ]));

        let (page, total) = service.list_subjects(Some(2), None).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(page.len(), 2);

        let (rest, total) = service.list_subjects(None, Some(2)).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(rest.len(), 1);
    }
}
