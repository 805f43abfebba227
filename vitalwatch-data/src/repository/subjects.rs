use chrono::Utc;
use tracing::{debug, error};
use uuid::Uuid;
use async_trait::async_trait;

use crate::models::{CreateSubjectRequest, Subject};
use crate::database::get_db_pool;
use super::errors::RepositoryError;
use super::in_memory::InMemorySubjects;
use super::storage::DatabaseStorage;

/// Repository trait for monitored subjects
#[async_trait]
pub trait SubjectRepositoryTrait {
    /// Register a new subject from a request
    async fn create(&self, request: CreateSubjectRequest) -> Result<Subject, RepositoryError>;

    /// Get a subject by ID
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Subject>, RepositoryError>;

    /// Get the earliest-registered subject with the given name
    async fn get_by_name(&self, name: &str) -> Result<Option<Subject>, RepositoryError>;

    /// Get a page of subjects together with the total count
    async fn list(
        &self,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<(Vec<Subject>, usize), RepositoryError>;
}

/// Repository for monitored subjects.
/// Uses the database when available and falls back to in-memory storage.
#[derive(Debug, Clone, Default)]
pub struct SubjectRepository {
    /// In-memory storage for when database is not available
    storage: InMemorySubjects,
}

impl SubjectRepository {
    /// Create a new repository
    pub fn new() -> Self {
        Self {
            storage: InMemorySubjects::new(),
        }
    }
}

#[async_trait]
impl SubjectRepositoryTrait for SubjectRepository {
    /// Register a new subject from a request
    async fn create(&self, request: CreateSubjectRequest) -> Result<Subject, RepositoryError> {
        // Generate a unique ID and stamp the registration time
        let id = Uuid::new_v4();

        let subject = Subject {
            id: id.to_string(),
            name: request.name,
            age: request.age,
            gender: request.gender,
            created_at: Utc::now().to_rfc3339(),
        };

        // Try to store in database first
        match get_db_pool() {
            Ok(pool) => {
                debug!("Storing subject in database: {}", subject.id);
                match DatabaseStorage::insert_subject(&pool, &subject).await {
                    Ok(_) => Ok(subject),
                    Err(e) => {
                        error!("Failed to store subject in database: {}", e);
                        // Fall back to in-memory storage
                        self.storage.store_subject(&subject).await
                    }
                }
            },
            Err(e) => {
                // Database not available, use in-memory storage
                debug!("Database not available ({}), using in-memory storage", e);
                self.storage.store_subject(&subject).await
            }
        }
    }

    /// Get a subject by ID
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Subject>, RepositoryError> {
        // Try to get from database first
        match get_db_pool() {
            Ok(pool) => {
                debug!("Getting subject by ID from database: {}", id);
                match DatabaseStorage::get_subject_by_id(&pool, &id).await {
                    Ok(subject) => Ok(subject),
                    Err(e) => {
                        error!("Failed to get subject by ID from database: {}", e);
                        // Fall back to in-memory storage
                        self.storage.get_by_id(&id).await
                    }
                }
            },
            Err(e) => {
                // Database not available or error occurred, use in-memory storage
                debug!("Database not available ({}), using in-memory storage for get_by_id", e);
                self.storage.get_by_id(&id).await
            }
        }
    }

    /// Get the earliest-registered subject with the given name
    async fn get_by_name(&self, name: &str) -> Result<Option<Subject>, RepositoryError> {
        // Try to get from database first
        match get_db_pool() {
            Ok(pool) => {
                debug!("Getting subject by name from database: {}", name);
                match DatabaseStorage::get_subject_by_name(&pool, name).await {
                    Ok(subject) => Ok(subject),
                    Err(e) => {
                        error!("Failed to get subject by name from database: {}", e);
                        // Fall back to in-memory storage
                        self.storage.get_by_name(name).await
                    }
                }
            },
            Err(e) => {
                // Database not available or error occurred, use in-memory storage
                debug!("Database not available ({}), using in-memory storage for get_by_name", e);
                self.storage.get_by_name(name).await
            }
        }
    }

    /// Get a page of subjects together with the total count
    async fn list(
        &self,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<(Vec<Subject>, usize), RepositoryError> {
        // Try to get from database first
        match get_db_pool() {
            Ok(pool) => {
                debug!("Getting subjects from database");
                match DatabaseStorage::get_subjects(&pool, limit, offset).await {
                    Ok(result) => Ok(result),
                    Err(e) => {
                        error!("Failed to get subjects from database: {}", e);
                        // Fall back to in-memory storage
                        self.storage.get_page(limit, offset).await
                    }
                }
            },
            Err(e) => {
                // Database not available or error occurred, use in-memory storage
                debug!("Database not available ({}), using in-memory storage for list", e);
                self.storage.get_page(limit, offset).await
            }
        }
    }
}

/// Mock subject repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;

    /// Mock implementation of SubjectRepository for testing
    pub struct MockSubjectRepository {
        subjects: Vec<Subject>,
    }

    impl Default for MockSubjectRepository {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockSubjectRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self { subjects: Vec::new() }
        }

        /// Create a mock repository with predefined subjects
        pub fn with_subjects(subjects: Vec<Subject>) -> Self {
            Self { subjects }
        }
    }

    #[async_trait]
    impl SubjectRepositoryTrait for MockSubjectRepository {
        async fn create(&self, request: CreateSubjectRequest) -> Result<Subject, RepositoryError> {
            let subject = Subject {
                id: Uuid::new_v4().to_string(),
                name: request.name,
                age: request.age,
                gender: request.gender,
                created_at: Utc::now().to_rfc3339(),
            };

            Ok(subject)
        }

        async fn get_by_id(&self, id: Uuid) -> Result<Option<Subject>, RepositoryError> {
            let subject = self.subjects.iter()
                .find(|s| s.id == id.to_string())
                .cloned();

            Ok(subject)
        }

        async fn get_by_name(&self, name: &str) -> Result<Option<Subject>, RepositoryError> {
            let subject = self.subjects.iter()
                .find(|s| s.name == name)
                .cloned();

            Ok(subject)
        }

        async fn list(
            &self,
            limit: Option<usize>,
            offset: Option<usize>,
        ) -> Result<(Vec<Subject>, usize), RepositoryError> {
            let total = self.subjects.len();
            let offset = offset.unwrap_or(0);
            let limit = limit.unwrap_or(total);

            let page = self.subjects.iter()
                .skip(offset)
                .take(limit)
                .cloned()
                .collect();

            Ok((page, total))
        }
    }

    #[cfg(test)]
    mod unit_tests {
        use super::*;

        fn create_request(name: &str, age: u32) -> CreateSubjectRequest {
            CreateSubjectRequest {
                name: name.to_string(),
                age,
                gender: Some("female".to_string()),
            }
        }

        #[tokio::test]
        async fn test_in_memory_fallback_round_trip() {
            // No database pool is initialized in unit tests, so the
            // repository falls back to its in-memory store.
            let repo = SubjectRepository::new();

            let created = repo.create(create_request("Ada", 36)).await.unwrap();
            assert_eq!(created.name, "Ada");
            assert_eq!(created.age, 36);

            let id = Uuid::parse_str(&created.id).unwrap();
            let fetched = repo.get_by_id(id).await.unwrap();
            assert_eq!(fetched.unwrap().id, created.id);

            let by_name = repo.get_by_name("Ada").await.unwrap();
            assert_eq!(by_name.unwrap().id, created.id);

            let (page, total) = repo.list(None, None).await.unwrap();
            assert_eq!(total, 1);
            assert_eq!(page.len(), 1);
        }

        #[tokio::test]
        async fn test_clones_share_storage() {
            let repo = SubjectRepository::new();
            let clone = repo.clone();

            let created = repo.create(create_request("Grace", 45)).await.unwrap();

            let id = Uuid::parse_str(&created.id).unwrap();
            let seen_by_clone = clone.get_by_id(id).await.unwrap();
            assert!(seen_by_clone.is_some());
        }

        #[tokio::test]
        async fn test_get_by_name_missing() {
            let repo = SubjectRepository::new();
            let missing = repo.get_by_name("nobody").await.unwrap();
            assert!(missing.is_none());
        }
    }
}
