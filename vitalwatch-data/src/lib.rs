// VitalWatch Data
// This crate handles storage access for the VitalWatch monitoring service

// Database connection management
pub mod database;

// Repository implementations for data access
pub mod repository;

// Data storage models
pub mod models;
