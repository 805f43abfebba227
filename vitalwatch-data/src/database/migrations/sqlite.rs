use rusqlite::Connection;
use tracing::{info};

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    info!("Running SQLite migrations");

    create_subjects_table(conn)?;
    create_health_records_table(conn)?;
    create_indexes(conn)?;

    info!("SQLite migrations completed successfully");
    Ok(())
}

/// Create the monitored subjects table
fn create_subjects_table(conn: &Connection) -> Result<(), String> {
    info!("Creating subjects table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS subjects (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            age INTEGER NOT NULL,
            gender TEXT,
            created_at TEXT NOT NULL
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

/// Create the health records table
fn create_health_records_table(conn: &Connection) -> Result<(), String> {
    info!("Creating health_records table if not exists");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS health_records (
            id TEXT PRIMARY KEY,
            subject_id TEXT NOT NULL REFERENCES subjects(id),
            heart_rate REAL NOT NULL,
            spo2 REAL NOT NULL,
            ir INTEGER,
            red INTEGER,
            status TEXT NOT NULL,
            recorded_at TEXT NOT NULL
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

/// Create indexes for efficient lookups
fn create_indexes(conn: &Connection) -> Result<(), String> {
    info!("Creating indexes on subjects and health_records");

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_subjects_name
        ON subjects (name)",
        [],
    ).map_err(|e| format!("Failed to create index: {}", e))?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_health_records_subject_recorded_at
        ON health_records (subject_id, recorded_at DESC)",
        [],
    ).map_err(|e| format!("Failed to create index: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_create_tables() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        // Both tables should exist after migrations
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'
                AND name IN ('subjects', 'health_records')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 2);

        // Running migrations twice should be a no-op
        run_migrations(&conn).unwrap();
    }
}
