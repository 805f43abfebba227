// Domain entities and value objects
pub mod vitals;
pub mod conversions;

// Re-export common types for easier imports
pub use vitals::{CreateReadingRequest, CreateSubjectRequest, HealthRecord, RiskLevel, Subject};
