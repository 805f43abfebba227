pub mod ingestion;
pub mod subjects;

// Domain services
// This module contains business logic implementations.

// Re-export service traits and factory functions
pub use ingestion::{VitalsServiceTrait, create_default_vitals_service};
pub use subjects::{SubjectServiceTrait, create_default_subject_service};

// Re-export mock service factory functions when the mock feature is enabled
#[cfg(feature = "mock")]
pub use ingestion::create_mock_vitals_service;
