// VitalWatch Domain
// This crate contains the business logic for the VitalWatch monitoring service

// Services that implement business logic
pub mod services;

// Risk classification for vital-signs readings
pub mod classification;

// Domain entities
pub mod entities;

// Health checks and system status
pub mod health;

// Re-export the database module from vitalwatch-data for convenience
pub use vitalwatch_data::database;

// Testing utilities - available in unit tests and with the mock feature
#[cfg(any(test, feature = "mock"))]
pub mod testing;
