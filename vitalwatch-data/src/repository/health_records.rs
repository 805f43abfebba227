use chrono::Utc;
use tracing::{debug, error};
use uuid::Uuid;
use async_trait::async_trait;

use crate::models::{CreateHealthRecordRequest, HealthRecord};
use crate::database::get_db_pool;
use super::errors::RepositoryError;
use super::in_memory::InMemoryRecords;
use super::storage::DatabaseStorage;

/// Repository trait for classified vital-signs records
#[async_trait]
pub trait HealthRecordRepositoryTrait {
    /// Append a new record from a request
    async fn append(&self, request: CreateHealthRecordRequest) -> Result<HealthRecord, RepositoryError>;

    /// Get a page of records for one subject together with the total count
    async fn get_for_subject(
        &self,
        subject_id: Uuid,
        limit: Option<usize>,
        offset: Option<usize>,
        sort_desc: Option<bool>,
    ) -> Result<(Vec<HealthRecord>, usize), RepositoryError>;

    /// Get a record by ID
    async fn get_by_id(&self, id: Uuid) -> Result<Option<HealthRecord>, RepositoryError>;

    /// Delete a record by ID, returning the deleted record if present
    async fn delete(&self, id: Uuid) -> Result<Option<HealthRecord>, RepositoryError>;
}

/// Repository for classified vital-signs records.
/// Uses the database when available and falls back to in-memory storage.
#[derive(Debug, Clone, Default)]
pub struct HealthRecordRepository {
    /// In-memory storage for when database is not available
    storage: InMemoryRecords,
}

impl HealthRecordRepository {
    /// Create a new repository
    pub fn new() -> Self {
        Self {
            storage: InMemoryRecords::new(),
        }
    }
}

#[async_trait]
impl HealthRecordRepositoryTrait for HealthRecordRepository {
    /// Append a new record from a request
    async fn append(&self, request: CreateHealthRecordRequest) -> Result<HealthRecord, RepositoryError> {
        // Generate a unique ID and stamp the recording time
        let id = Uuid::new_v4();

        let record = HealthRecord {
            id: id.to_string(),
            subject_id: request.subject_id,
            heart_rate: request.heart_rate,
            spo2: request.spo2,
            ir: request.ir,
            red: request.red,
            status: request.status,
            recorded_at: Utc::now().to_rfc3339(),
        };

        // Try to store in database first
        match get_db_pool() {
            Ok(pool) => {
                debug!("Storing health record in database: {}", record.id);
                match DatabaseStorage::insert_record(&pool, &record).await {
                    Ok(_) => Ok(record),
                    Err(e) => {
                        error!("Failed to store record in database: {}", e);
                        // Fall back to in-memory storage
                        self.storage.store_record(&record).await
                    }
                }
            },
            Err(e) => {
                // Database not available, use in-memory storage
                debug!("Database not available ({}), using in-memory storage", e);
                self.storage.store_record(&record).await
            }
        }
    }

    /// Get a page of records for one subject together with the total count
    async fn get_for_subject(
        &self,
        subject_id: Uuid,
        limit: Option<usize>,
        offset: Option<usize>,
        sort_desc: Option<bool>,
    ) -> Result<(Vec<HealthRecord>, usize), RepositoryError> {
        let subject_id = subject_id.to_string();

        // Try to get from database first
        match get_db_pool() {
            Ok(pool) => {
                debug!("Getting health records for subject from database: {}", subject_id);
                match DatabaseStorage::get_records_for_subject(
                    &pool,
                    &subject_id,
                    limit,
                    offset,
                    sort_desc,
                ).await {
                    Ok(result) => Ok(result),
                    Err(e) => {
                        error!("Failed to get records for subject from database: {}", e);
                        // Fall back to in-memory storage
                        self.storage.get_for_subject(&subject_id, limit, offset, sort_desc).await
                    }
                }
            },
            Err(e) => {
                // Database not available or error occurred, use in-memory storage
                debug!("Database not available ({}), using in-memory storage for get_for_subject", e);
                self.storage.get_for_subject(&subject_id, limit, offset, sort_desc).await
            }
        }
    }

    /// Get a record by ID
    async fn get_by_id(&self, id: Uuid) -> Result<Option<HealthRecord>, RepositoryError> {
        // Try to get from database first
        match get_db_pool() {
            Ok(pool) => {
                debug!("Getting health record by ID from database: {}", id);
                match DatabaseStorage::get_record_by_id(&pool, &id).await {
                    Ok(record) => Ok(record),
                    Err(e) => {
                        error!("Failed to get record by ID from database: {}", e);
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

    /// Delete a record by ID, returning the deleted record if present
    async fn delete(&self, id: Uuid) -> Result<Option<HealthRecord>, RepositoryError> {
        // Try the database first
        match get_db_pool() {
            Ok(pool) => {
                debug!("Deleting health record from database: {}", id);
                match DatabaseStorage::delete_record(&pool, &id).await {
                    Ok(record) => Ok(record),
                    Err(e) => {
                        error!("Failed to delete record from database: {}", e);
                        // Fall back to in-memory storage
                        self.storage.remove(&id).await
                    }
                }
            },
            Err(e) => {
                // Database not available or error occurred, use in-memory storage
                debug!("Database not available ({}), using in-memory storage for delete", e);
                self.storage.remove(&id).await
            }
        }
    }
}

/// Mock health record repository for testing
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    use super::*;

    /// Mock implementation of HealthRecordRepository for testing
    pub struct MockHealthRecordRepository {
        records: Vec<HealthRecord>,
    }

    impl Default for MockHealthRecordRepository {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockHealthRecordRepository {
        /// Create a new empty mock repository
        pub fn new() -> Self {
            Self { records: Vec::new() }
        }

        /// Create a mock repository with predefined records
        pub fn with_records(records: Vec<HealthRecord>) -> Self {
            Self { records }
        }
    }

    #[async_trait]
    impl HealthRecordRepositoryTrait for MockHealthRecordRepository {
        async fn append(&self, request: CreateHealthRecordRequest) -> Result<HealthRecord, RepositoryError> {
            let record = HealthRecord {
                id: Uuid::new_v4().to_string(),
                subject_id: request.subject_id,
                heart_rate: request.heart_rate,
                spo2: request.spo2,
                ir: request.ir,
                red: request.red,
                status: request.status,
                recorded_at: Utc::now().to_rfc3339(),
            };

            Ok(record)
        }

        async fn get_for_subject(
            &self,
            subject_id: Uuid,
            limit: Option<usize>,
            offset: Option<usize>,
            sort_desc: Option<bool>,
        ) -> Result<(Vec<HealthRecord>, usize), RepositoryError> {
            let offset = offset.unwrap_or(0);
            let limit = limit.unwrap_or(usize::MAX);
            let sort_desc = sort_desc.unwrap_or(true);

            let mut filtered: Vec<HealthRecord> = self.records.iter()
                .filter(|record| record.subject_id == subject_id.to_string())
                .cloned()
                .collect();

            // Sort
            filtered.sort_by(|a, b| {
                let cmp = a.recorded_at.cmp(&b.recorded_at);
                if sort_desc {
                    cmp.reverse()
                } else {
                    cmp
                }
            });

            let total = filtered.len();

            // Apply pagination
            let paged = filtered
                .into_iter()
                .skip(offset)
                .take(limit)
                .collect();

            Ok((paged, total))
        }

        async fn get_by_id(&self, id: Uuid) -> Result<Option<HealthRecord>, RepositoryError> {
            let record = self.records.iter()
                .find(|r| r.id == id.to_string())
                .cloned();

            Ok(record)
        }

        async fn delete(&self, id: Uuid) -> Result<Option<HealthRecord>, RepositoryError> {
            let record = self.records.iter()
                .find(|r| r.id == id.to_string())
                .cloned();

            Ok(record)
        }
    }

    #[cfg(test)]
    mod unit_tests {
        use super::*;

        fn record_request(subject_id: &str, heart_rate: f64, spo2: f64) -> CreateHealthRecordRequest {
            CreateHealthRecordRequest {
                subject_id: subject_id.to_string(),
                heart_rate,
                spo2,
                ir: Some(102_400),
                red: Some(98_304),
                status: "Normal".to_string(),
            }
        }

        #[tokio::test]
        async fn test_in_memory_fallback_round_trip() {
            // No database pool is initialized in unit tests, so the
            // repository falls back to its in-memory store.
            let repo = HealthRecordRepository::new();
            let subject_id = Uuid::new_v4();

            let created = repo.append(record_request(&subject_id.to_string(), 72.0, 98.0)).await.unwrap();
            assert_eq!(created.subject_id, subject_id.to_string());
            assert_eq!(created.status, "Normal");

            let id = Uuid::parse_str(&created.id).unwrap();
            let fetched = repo.get_by_id(id).await.unwrap();
            assert_eq!(fetched.unwrap().id, created.id);
        }

        #[tokio::test]
        async fn test_get_for_subject_filters_by_subject() {
            let repo = HealthRecordRepository::new();
            let first = Uuid::new_v4();
            let second = Uuid::new_v4();

            repo.append(record_request(&first.to_string(), 70.0, 98.0)).await.unwrap();
            repo.append(record_request(&first.to_string(), 75.0, 97.0)).await.unwrap();
            repo.append(record_request(&second.to_string(), 80.0, 96.0)).await.unwrap();

            let (page, total) = repo.get_for_subject(first, None, None, None).await.unwrap();
            assert_eq!(total, 2);
            assert!(page.iter().all(|r| r.subject_id == first.to_string()));

            // A subject with no records gets an empty page, not an error
            let (empty, empty_total) = repo.get_for_subject(Uuid::new_v4(), None, None, None).await.unwrap();
            assert!(empty.is_empty());
            assert_eq!(empty_total, 0);
        }

        #[tokio::test]
        async fn test_pagination_limits_page_size() {
            let repo = HealthRecordRepository::new();
            let subject_id = Uuid::new_v4();

            for _ in 0..3 {
                repo.append(record_request(&subject_id.to_string(), 72.0, 98.0)).await.unwrap();
            }

            let (page, total) = repo.get_for_subject(subject_id, Some(2), None, None).await.unwrap();
            assert_eq!(page.len(), 2);
            assert_eq!(total, 3);
        }

        #[tokio::test]
        async fn test_delete_removes_record() {
            let repo = HealthRecordRepository::new();
            let subject_id = Uuid::new_v4();

            let created = repo.append(record_request(&subject_id.to_string(), 72.0, 98.0)).await.unwrap();
            let id = Uuid::parse_str(&created.id).unwrap();

            let deleted = repo.delete(id).await.unwrap();
            assert_eq!(deleted.unwrap().id, created.id);

            // Record is gone afterwards
            assert!(repo.get_by_id(id).await.unwrap().is_none());
            assert!(repo.delete(id).await.unwrap().is_none());
        }
    }
}
