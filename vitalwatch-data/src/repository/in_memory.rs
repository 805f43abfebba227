use std::sync::{Arc, Mutex};
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::{HealthRecord, Subject};
use super::errors::RepositoryError;

/// In-memory storage implementation for subjects
#[derive(Debug, Clone)]
pub struct InMemorySubjects {
    /// Storage for registered subjects
    subjects: Arc<Mutex<HashMap<String, Subject>>>,
}

impl Default for InMemorySubjects {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySubjects {
    /// Create a new in-memory subject store
    pub fn new() -> Self {
        Self {
            subjects: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Store a subject in memory
    pub async fn store_subject(&self, subject: &Subject) -> Result<Subject, RepositoryError> {
        let mut store = self.subjects.lock().map_err(|e| RepositoryError::MutexLock(e.to_string()))?;
        store.insert(subject.id.clone(), subject.clone());
        Ok(subject.clone())
    }

    /// Get a subject by ID from memory
    pub async fn get_by_id(&self, id: &Uuid) -> Result<Option<Subject>, RepositoryError> {
        let store = self.subjects.lock().map_err(|e| RepositoryError::MutexLock(e.to_string()))?;
        Ok(store.get(&id.to_string()).cloned())
    }

    /// Get the earliest-registered subject with the given name from memory
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Subject>, RepositoryError> {
        let store = self.subjects.lock().map_err(|e| RepositoryError::MutexLock(e.to_string()))?;

        let mut matches: Vec<Subject> = store.values()
            .filter(|subject| subject.name == name)
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Ok(matches.first().cloned())
    }

    /// Get a page of subjects from memory, oldest registration first
    pub async fn get_page(
        &self,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<(Vec<Subject>, usize), RepositoryError> {
        let store = self.subjects.lock().map_err(|e| RepositoryError::MutexLock(e.to_string()))?;

        let mut subjects: Vec<Subject> = store.values().cloned().collect();
        subjects.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        // Apply pagination
        let total = subjects.len();
        let offset = offset.unwrap_or(0);
        let limit = limit.unwrap_or(total);

        let page = subjects
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect();

        Ok((page, total))
    }
}

/// In-memory storage implementation for health records
#[derive(Debug, Clone)]
pub struct InMemoryRecords {
    /// Storage for classified vital-signs records
    records: Arc<Mutex<HashMap<String, HealthRecord>>>,
}

impl Default for InMemoryRecords {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRecords {
    /// Create a new in-memory record store
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Store a record in memory
    pub async fn store_record(&self, record: &HealthRecord) -> Result<HealthRecord, RepositoryError> {
        let mut store = self.records.lock().map_err(|e| RepositoryError::MutexLock(e.to_string()))?;
        store.insert(record.id.clone(), record.clone());
        Ok(record.clone())
    }

    /// Get a record by ID from memory
    pub async fn get_by_id(&self, id: &Uuid) -> Result<Option<HealthRecord>, RepositoryError> {
        let store = self.records.lock().map_err(|e| RepositoryError::MutexLock(e.to_string()))?;
        Ok(store.get(&id.to_string()).cloned())
    }

    /// Get a page of records for one subject from memory
    pub async fn get_for_subject(
        &self,
        subject_id: &str,
        limit: Option<usize>,
        offset: Option<usize>,
        sort_desc: Option<bool>,
    ) -> Result<(Vec<HealthRecord>, usize), RepositoryError> {
        let store = self.records.lock().map_err(|e| RepositoryError::MutexLock(e.to_string()))?;
        let sort_desc = sort_desc.unwrap_or(true);

        // First collect the subject's records
        let mut records: Vec<HealthRecord> = store.values()
            .filter(|record| record.subject_id == subject_id)
            .cloned()
            .collect();

        // Sort by recording time
        records.sort_by(|a, b| {
            let cmp = a.recorded_at.cmp(&b.recorded_at);
            if sort_desc {
                cmp.reverse()
            } else {
                cmp
            }
        });

        // Apply pagination
        let total = records.len();
        let offset = offset.unwrap_or(0);
        let limit = limit.unwrap_or(total);

        let page = records
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect();

        Ok((page, total))
    }

    /// Remove a record from memory, returning it if present
    pub async fn remove(&self, id: &Uuid) -> Result<Option<HealthRecord>, RepositoryError> {
        let mut store = self.records.lock().map_err(|e| RepositoryError::MutexLock(e.to_string()))?;
        Ok(store.remove(&id.to_string()))
    }
}
