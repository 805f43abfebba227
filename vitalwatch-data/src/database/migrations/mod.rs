// Database migrations module

// Import specific functions from each module instead of using glob imports
mod sqlite;
pub use sqlite::run_migrations as run_sqlite_migrations;
