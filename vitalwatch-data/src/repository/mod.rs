// Repository module structure
pub mod errors;
mod subjects;
mod health_records;
mod in_memory;
mod storage;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use subjects::{SubjectRepository, SubjectRepositoryTrait};
pub use health_records::{HealthRecordRepository, HealthRecordRepositoryTrait};

// Re-export test modules for both testing and when mock feature is enabled
#[cfg(any(test, feature = "mock"))]
pub mod tests {
    pub use super::subjects::tests::MockSubjectRepository;
    pub use super::health_records::tests::MockHealthRecordRepository;
}
