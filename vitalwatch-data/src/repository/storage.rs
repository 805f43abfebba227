use tracing::debug;
use uuid::Uuid;

use crate::models::{HealthRecord, Subject};
use crate::database::DatabasePool;
use super::errors::RepositoryError;

/// Database storage operations for subjects and health records
pub struct DatabaseStorage;

impl DatabaseStorage {
    /// Store a subject in the database
    pub async fn insert_subject(pool: &DatabasePool, subject: &Subject) -> Result<(), RepositoryError> {
        debug!("Storing subject in database: id={}", subject.id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get().map_err(RepositoryError::Pool)?;

                conn.execute(
                    "INSERT INTO subjects (id, name, age, gender, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    (
                        &subject.id,
                        &subject.name,
                        subject.age,
                        &subject.gender,
                        &subject.created_at,
                    ),
                ).map_err(RepositoryError::Sqlite)?;

                Ok(())
            },

            #[allow(unreachable_patterns)]
            _ => Err(RepositoryError::Database("Unsupported database type or not implemented".to_string().into())),
        }
    }

    /// Get a subject by ID from the database
    pub async fn get_subject_by_id(pool: &DatabasePool, id: &Uuid) -> Result<Option<Subject>, RepositoryError> {
        debug!("Getting subject by ID from database: id={}", id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;

                let mut stmt = conn.prepare(
                    "SELECT id, name, age, gender, created_at
                     FROM subjects WHERE id = ?"
                )?;

                let subject = stmt.query_row([&id.to_string()], |row| {
                    Ok(Subject {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        age: row.get::<_, i64>(2)? as u32,
                        gender: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                });

                match subject {
                    Ok(subject) => Ok(Some(subject)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(RepositoryError::Sqlite(e)),
                }
            },

            #[allow(unreachable_patterns)]
            _ => Err(RepositoryError::Database("Unsupported database type or not implemented".to_string().into())),
        }
    }

    /// Get the earliest-registered subject with the given name from the database
    pub async fn get_subject_by_name(pool: &DatabasePool, name: &str) -> Result<Option<Subject>, RepositoryError> {
        debug!("Getting subject by name from database: name={}", name);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;

                let mut stmt = conn.prepare(
                    "SELECT id, name, age, gender, created_at
                     FROM subjects WHERE name = ?
                     ORDER BY created_at ASC, id ASC LIMIT 1"
                )?;

                let subject = stmt.query_row([name], |row| {
                    Ok(Subject {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        age: row.get::<_, i64>(2)? as u32,
                        gender: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                });

                match subject {
                    Ok(subject) => Ok(Some(subject)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(RepositoryError::Sqlite(e)),
                }
            },

            #[allow(unreachable_patterns)]
            _ => Err(RepositoryError::Database("Unsupported database type or not implemented".to_string().into())),
        }
    }

    /// Get a page of subjects from the database, oldest registration first
    pub async fn get_subjects(
        pool: &DatabasePool,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<(Vec<Subject>, usize), RepositoryError> {
        debug!("Getting subjects from database");

        let limit_val = limit.unwrap_or(100);
        let offset_val = offset.unwrap_or(0);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;

                let query = format!(
                    "SELECT id, name, age, gender, created_at
                     FROM subjects ORDER BY created_at ASC, id ASC
                     LIMIT {} OFFSET {}",
                    limit_val, offset_val
                );

                let mut stmt = conn.prepare(&query)?;

                let subjects = stmt.query_map([], |row| {
                    Ok(Subject {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        age: row.get::<_, i64>(2)? as u32,
                        gender: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                })?;

                let mut result = Vec::new();
                for subject in subjects {
                    result.push(subject?);
                }

                // Get total count for pagination
                let total: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM subjects",
                    [],
                    |row| row.get(0),
                )?;

                Ok((result, total as usize))
            },

            #[allow(unreachable_patterns)]
            _ => Err(RepositoryError::Database("Unsupported database type or not implemented".to_string().into())),
        }
    }

    /// Store a health record in the database
    pub async fn insert_record(pool: &DatabasePool, record: &HealthRecord) -> Result<(), RepositoryError> {
        debug!("Storing health record in database: id={}", record.id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get().map_err(RepositoryError::Pool)?;

                conn.execute(
                    "INSERT INTO health_records
                     (id, subject_id, heart_rate, spo2, ir, red, status, recorded_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                    (
                        &record.id,
                        &record.subject_id,
                        record.heart_rate,
                        record.spo2,
                        record.ir,
                        record.red,
                        &record.status,
                        &record.recorded_at,
                    ),
                ).map_err(RepositoryError::Sqlite)?;

                Ok(())
            },

            #[allow(unreachable_patterns)]
            _ => Err(RepositoryError::Database("Unsupported database type or not implemented".to_string().into())),
        }
    }

    /// Get a page of health records for one subject from the database
    pub async fn get_records_for_subject(
        pool: &DatabasePool,
        subject_id: &str,
        limit: Option<usize>,
        offset: Option<usize>,
        sort_desc: Option<bool>,
    ) -> Result<(Vec<HealthRecord>, usize), RepositoryError> {
        debug!("Getting health records for subject from database: subject_id={}", subject_id);

        let sort_direction = if sort_desc.unwrap_or(true) { "DESC" } else { "ASC" };
        let limit_val = limit.unwrap_or(100);
        let offset_val = offset.unwrap_or(0);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;

                let query = format!(
                    "SELECT id, subject_id, heart_rate, spo2, ir, red, status, recorded_at
                     FROM health_records WHERE subject_id = ?
                     ORDER BY recorded_at {} LIMIT {} OFFSET {}",
                    sort_direction, limit_val, offset_val
                );

                let mut stmt = conn.prepare(&query)?;

                let records = stmt.query_map([subject_id], |row| {
                    Ok(HealthRecord {
                        id: row.get(0)?,
                        subject_id: row.get(1)?,
                        heart_rate: row.get(2)?,
                        spo2: row.get(3)?,
                        ir: row.get(4)?,
                        red: row.get(5)?,
                        status: row.get(6)?,
                        recorded_at: row.get(7)?,
                    })
                })?;

                let mut result = Vec::new();
                for record in records {
                    result.push(record?);
                }

                // Get total count for pagination
                let total: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM health_records WHERE subject_id = ?",
                    [subject_id],
                    |row| row.get(0),
                )?;

                Ok((result, total as usize))
            },

            #[allow(unreachable_patterns)]
            _ => Err(RepositoryError::Database("Unsupported database type or not implemented".to_string().into())),
        }
    }

    /// Get a health record by ID from the database
    pub async fn get_record_by_id(pool: &DatabasePool, id: &Uuid) -> Result<Option<HealthRecord>, RepositoryError> {
        debug!("Getting health record by ID from database: id={}", id);

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;

                let mut stmt = conn.prepare(
                    "SELECT id, subject_id, heart_rate, spo2, ir, red, status, recorded_at
                     FROM health_records WHERE id = ?"
                )?;

                let record = stmt.query_row([&id.to_string()], |row| {
                    Ok(HealthRecord {
                        id: row.get(0)?,
                        subject_id: row.get(1)?,
                        heart_rate: row.get(2)?,
                        spo2: row.get(3)?,
                        ir: row.get(4)?,
                        red: row.get(5)?,
                        status: row.get(6)?,
                        recorded_at: row.get(7)?,
                    })
                });

                match record {
                    Ok(record) => Ok(Some(record)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(RepositoryError::Sqlite(e)),
                }
            },

            #[allow(unreachable_patterns)]
            _ => Err(RepositoryError::Database("Unsupported database type or not implemented".to_string().into())),
        }
    }

    /// Delete a health record from the database, returning it if present
    pub async fn delete_record(pool: &DatabasePool, id: &Uuid) -> Result<Option<HealthRecord>, RepositoryError> {
        debug!("Deleting health record from database: id={}", id);

        // Fetch the record first so the caller gets the deleted row back
        let record = match Self::get_record_by_id(pool, id).await? {
            Some(record) => record,
            None => return Ok(None),
        };

        match pool {
            DatabasePool::SQLite(pool) => {
                let conn = pool.get()?;

                conn.execute(
                    "DELETE FROM health_records WHERE id = ?",
                    [&id.to_string()],
                ).map_err(RepositoryError::Sqlite)?;

                Ok(Some(record))
            },

            #[allow(unreachable_patterns)]
            _ => Err(RepositoryError::Database("Unsupported database type or not implemented".to_string().into())),
        }
    }
}
