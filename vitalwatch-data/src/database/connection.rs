//! Database connection module for the VitalWatch service
//!
//! Provides a process-wide SQLite connection pool with an in-memory
//! fallback for environments where the database file cannot be opened.

use std::env;
use std::sync::Arc;
use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing::{error, info, warn};

use super::migrations::run_sqlite_migrations;

/// Global database pool used throughout the application
static DB_POOL: OnceCell<DatabasePool> = OnceCell::new();

/// Supported database types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    /// SQLite database (file-based)
    Sqlite,
}

impl DatabaseType {
    /// Convert from string to database type
    pub fn from_str(s: &str) -> Result<Self, DatabaseError> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(DatabaseType::Sqlite),
            _ => Err(DatabaseError::UnsupportedDatabaseType(s.to_string())),
        }
    }
}

/// Database connection pool
#[derive(Debug, Clone)]
pub enum DatabasePool {
    /// SQLite connection pool
    #[cfg(feature = "sqlite")]
    SQLite(Arc<r2d2::Pool<r2d2_sqlite::SqliteConnectionManager>>),
}

/// Database error
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Environment variable not found
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    /// SQLite error
    #[error("SQLite error: {0}")]
    #[cfg(feature = "sqlite")]
    SqliteError(#[from] rusqlite::Error),

    /// SQLite connection pool error
    #[error("SQLite connection pool error: {0}")]
    #[cfg(feature = "sqlite")]
    SqlitePoolError(#[from] r2d2::Error),

    /// Database pool already initialized
    #[error("Database pool is already initialized")]
    PoolAlreadyInitialized,

    /// Database pool not initialized
    #[error("Database pool is not initialized")]
    PoolNotInitialized,

    /// Unsupported database type
    #[error("Unsupported database type: {0}")]
    UnsupportedDatabaseType(String),

    /// Migration error
    #[error("Database migration error: {0}")]
    MigrationError(String),

    /// Generic database error
    #[error("Database error: {0}")]
    GenericError(String),
}

impl From<String> for DatabaseError {
    fn from(error: String) -> Self {
        DatabaseError::GenericError(error)
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database type (only sqlite is supported)
    pub db_type: DatabaseType,
    /// Path to SQLite database file
    pub sqlite_path: Option<String>,
    /// Connection pool size
    pub pool_size: u32,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: DatabaseType::Sqlite,
            sqlite_path: Some("./data/vitalwatch.db".to_string()),
            pool_size: 5,
            max_connections: 10,
            timeout_seconds: 30,
        }
    }
}

impl DatabaseConfig {
    /// Create a new database configuration from environment variables
    pub fn from_env() -> Result<Self, DatabaseError> {
        // Get database type from environment or default to SQLite
        let db_type_str = env::var("DB_TYPE").unwrap_or_else(|_| "sqlite".to_string());
        let db_type = DatabaseType::from_str(&db_type_str)?;

        // Get SQLite database path
        let sqlite_path = env::var("DB_SQLITE_PATH").ok();

        if let Some(ref path) = sqlite_path {
            info!("Using SQLite database at: {}", path);
        } else {
            info!("No DB_SQLITE_PATH provided, will use default path: data/vitalwatch.db");
        }

        // Get pool size, max connections, and timeout with reasonable defaults
        let pool_size = env::var("DB_POOL_SIZE")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(10);

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(20);

        let timeout_seconds = env::var("DB_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);

        info!("Database configuration: pool_size={}, max_connections={}, timeout={}s",
            pool_size, max_connections, timeout_seconds);

        Ok(DatabaseConfig {
            db_type,
            sqlite_path,
            pool_size,
            max_connections,
            timeout_seconds,
        })
    }
}

/// Initialize the database connection pool
pub fn initialize_database_pool() -> Result<(), DatabaseError> {
    if DB_POOL.get().is_some() {
        return Err(DatabaseError::PoolAlreadyInitialized);
    }

    let config = DatabaseConfig::from_env()?;

    info!("Initializing database pool with type: {:?}", config.db_type);

    let pool = match config.db_type {
        DatabaseType::Sqlite => initialize_sqlite_pool(&config)?,
    };

    match DB_POOL.set(pool) {
        Ok(_) => {
            // Run database migrations
            run_migrations()?;
            Ok(())
        }
        Err(_) => Err(DatabaseError::PoolAlreadyInitialized),
    }
}

/// Get the database connection pool
pub fn get_db_pool() -> Result<DatabasePool, DatabaseError> {
    DB_POOL.get()
        .cloned()
        .ok_or(DatabaseError::PoolNotInitialized)
}

/// Initialize SQLite connection pool
fn initialize_sqlite_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    use rusqlite::OpenFlags;
    use std::fs;
    use std::path::Path;

    // Get the SQLite file path from config
    let sqlite_path = config.sqlite_path.clone()
        .unwrap_or_else(|| "data/vitalwatch.db".to_string());

    info!("Initializing SQLite database at: {}", sqlite_path);

    // Create parent directory if it doesn't exist
    if let Some(parent) = Path::new(&sqlite_path).parent() {
        if !parent.exists() {
            info!("Creating parent directory: {:?}", parent);
            match fs::create_dir_all(parent) {
                Ok(_) => info!("Created directory: {:?}", parent),
                Err(e) => {
                    warn!("Failed to create directory: {}, falling back to in-memory database", e);
                    return initialize_in_memory_sqlite_pool(config);
                }
            }
        }
    }

    // Set up connection options
    let manager = r2d2_sqlite::SqliteConnectionManager::file(&sqlite_path)
        .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE);

    // Create connection pool
    match r2d2::Pool::builder()
        .max_size(config.max_connections)
        .connection_timeout(std::time::Duration::from_secs(config.timeout_seconds))
        .build(manager)
    {
        Ok(pool) => {
            // Test connection to make sure it works
            match pool.get() {
                Ok(_) => {
                    info!("SQLite connection pool created successfully");
                    Ok(DatabasePool::SQLite(Arc::new(pool)))
                }
                Err(e) => {
                    error!("Failed to connect to SQLite database: {}", e);
                    warn!("Falling back to in-memory SQLite database");
                    initialize_in_memory_sqlite_pool(config)
                }
            }
        }
        Err(e) => {
            error!("Failed to create SQLite connection pool: {}", e);
            warn!("Falling back to in-memory SQLite database");
            initialize_in_memory_sqlite_pool(config)
        }
    }
}

/// Initialize an in-memory SQLite database as fallback
fn initialize_in_memory_sqlite_pool(config: &DatabaseConfig) -> Result<DatabasePool, DatabaseError> {
    info!("Initializing in-memory SQLite database");

    let manager = r2d2_sqlite::SqliteConnectionManager::memory();

    // A single shared connection: with the memory manager every pooled
    // connection would otherwise own a separate private database.
    let pool = r2d2::Pool::builder()
        .max_size(1)
        .connection_timeout(std::time::Duration::from_secs(config.timeout_seconds))
        .build(manager)?;

    // Initialize schema for the in-memory database
    let conn = pool.get()?;
    run_sqlite_migrations(&conn).map_err(DatabaseError::MigrationError)?;

    info!("In-memory SQLite database initialized successfully");
    Ok(DatabasePool::SQLite(Arc::new(pool)))
}

/// Run database migrations
fn run_migrations() -> Result<(), DatabaseError> {
    let pool = get_db_pool()?;

    info!("Running database migrations");

    match pool {
        DatabasePool::SQLite(ref pool) => {
            let conn = pool.get().map_err(DatabaseError::SqlitePoolError)?;
            run_sqlite_migrations(&conn).map_err(DatabaseError::MigrationError)?;
        }
    }

    info!("Database migrations completed successfully");

    Ok(())
}

/// Get information about the current database connection
pub fn get_connection_info() -> Option<String> {
    let pool = DB_POOL.get()?;

    match pool {
        DatabasePool::SQLite(pool) => {
            // Try to get a connection to verify it's working
            match pool.get() {
                Ok(conn) => {
                    // Get the database path or in-memory indicator
                    let connection_info = match conn.query_row(
                        "PRAGMA database_list",
                        [],
                        |row| row.get::<_, String>(2),
                    ) {
                        Ok(path) => {
                            if path.is_empty() || path == ":memory:" {
                                "SQLite in-memory database".to_string()
                            } else {
                                format!("SQLite database at {}", path)
                            }
                        }
                        Err(_) => "SQLite database (path unknown)".to_string(),
                    };

                    // Get connection stats
                    let state = pool.state();
                    let connection_info = format!("{} (connections: active={}, idle={}, healthy)",
                        connection_info,
                        state.connections,
                        state.idle_connections,
                    );

                    Some(connection_info)
                }
                Err(e) => {
                    error!("Failed to get SQLite connection: {}", e);
                    Some(format!("SQLite connection error: {}", e))
                }
            }
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.db_type, DatabaseType::Sqlite);
        assert!(config.sqlite_path.is_some());
        assert_eq!(config.pool_size, 5);
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_database_type_from_str() {
        assert_eq!(DatabaseType::from_str("sqlite").unwrap(), DatabaseType::Sqlite);
        assert_eq!(DatabaseType::from_str("SQLite").unwrap(), DatabaseType::Sqlite);
        assert!(DatabaseType::from_str("postgres").is_err());
        assert!(DatabaseType::from_str("unknown").is_err());
    }
}
