// Testing utilities and mock implementations for the domain layer
// This module is only available in tests or when the "mock" feature is enabled

// Re-export useful test mocks from the data layer
pub use vitalwatch_data::repository::tests::{MockHealthRecordRepository, MockSubjectRepository};

use crate::classification::model::{LabelEncoderArtifact, RiskModelArtifact};
use crate::classification::{
    classify_vitals, LoadError, ModelLoader, PredictionError, Predictor, PredictorState, RiskModel,
};
use crate::entities::vitals::{CreateReadingRequest, HealthRecord, RiskLevel};
use crate::health::{ComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth, SystemStatus};
use crate::services::ingestion::{VitalsServiceError, VitalsServiceTrait};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

/// Predictor that always answers with a fixed risk level
pub struct StubPredictor {
    level: RiskLevel,
}

impl StubPredictor {
    /// Create a predictor that answers with the given level
    pub fn new(level: RiskLevel) -> Self {
        Self { level }
    }
}

impl Predictor for StubPredictor {
    fn predict(&self, _heart_rate: f64, _spo2: f64, _age: u32) -> Result<RiskLevel, PredictionError> {
        Ok(self.level)
    }
}

/// Predictor whose model is permanently unavailable
pub struct FailingPredictor {
    message: String,
}

impl FailingPredictor {
    /// Create a predictor that fails with the given message
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

impl Predictor for FailingPredictor {
    fn predict(&self, _heart_rate: f64, _spo2: f64, _age: u32) -> Result<RiskLevel, PredictionError> {
        Err(PredictionError::ModelUnavailable(self.message.clone()))
    }

    fn state(&self) -> PredictorState {
        PredictorState::Failed
    }
}

/// Model loader that counts how many times it runs
///
/// Clones share the counter, so a test can keep one handle while a
/// predictor owns another.
#[derive(Clone)]
pub struct CountingLoader {
    calls: Arc<AtomicUsize>,
    fail: bool,
}

impl CountingLoader {
    /// Create a loader that succeeds with a small sample model
    pub fn new() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            fail: false,
        }
    }

    /// Create a loader that fails on every load
    pub fn failing() -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            fail: true,
        }
    }

    /// How many times load has been called so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for CountingLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelLoader for CountingLoader {
    fn load(&self) -> Result<RiskModel, LoadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.fail {
            return Err(LoadError::Io("loader configured to fail".to_string()));
        }

        // A small model that scores ordinary vitals as Normal and clearly
        // dangerous vitals as At Risk
        let model = RiskModelArtifact {
            model: "multinomial_logistic_regression".to_string(),
            features: vec![
                "heart_rate".to_string(),
                "spo2".to_string(),
                "age".to_string(),
            ],
            coefficients: vec![
                vec![0.4, -0.9, 0.0],
                vec![-0.3, 0.6, 0.0],
                vec![-0.1, 0.3, 0.0],
            ],
            intercepts: vec![40.0, -20.0, -20.0],
        };
        let encoder = LabelEncoderArtifact {
            classes: vec![
                "At Risk".to_string(),
                "Normal".to_string(),
                "Slightly Normal".to_string(),
            ],
        };

        RiskModel::from_artifacts(model, encoder)
    }
}

/// Mock implementation of the VitalsServiceTrait for testing
pub struct MockVitalsService {
    records: RwLock<HashMap<String, HealthRecord>>,
    should_fail_validation: bool,
    should_fail_ingestion: bool,
    subject_age: u32,
}

impl Default for MockVitalsService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockVitalsService {
    /// Create a new mock vitals service
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            should_fail_validation: false,
            should_fail_ingestion: false,
            subject_age: 30,
        }
    }

    /// Configure the mock to fail validation
    pub fn with_validation_failure(mut self) -> Self {
        self.should_fail_validation = true;
        self
    }

    /// Configure the mock to fail ingestion
    pub fn with_ingestion_failure(mut self) -> Self {
        self.should_fail_ingestion = true;
        self
    }

    /// Set the age assumed for every subject
    pub fn with_subject_age(mut self, age: u32) -> Self {
        self.subject_age = age;
        self
    }

    /// Add a pre-defined record to the mock
    pub fn with_record(self, record: HealthRecord) -> Self {
        {
            let mut records = self.records.write().unwrap();
            records.insert(record.id.clone(), record);
        }
        self
    }

    /// Add multiple pre-defined records to the mock
    pub fn with_records(self, records: Vec<HealthRecord>) -> Self {
        {
            let mut records_map = self.records.write().unwrap();
            for record in records {
                records_map.insert(record.id.clone(), record);
            }
        }
        self
    }
}

#[async_trait]
impl VitalsServiceTrait for MockVitalsService {
    fn validate_reading(&self, _request: &CreateReadingRequest) -> Result<(), VitalsServiceError> {
        if self.should_fail_validation {
            Err(VitalsServiceError::ValidationError(
                "Validation failed - mock is configured to fail validation".to_string(),
            ))
        } else {
            Ok(())
        }
    }

    fn classify_reading(&self, request: &CreateReadingRequest, _age: u32) -> RiskLevel {
        // The mock classifies with the threshold rules only
        classify_vitals(request.heart_rate, request.spo2)
    }

    async fn ingest_reading(
        &self,
        subject_id: &str,
        request: CreateReadingRequest,
    ) -> Result<HealthRecord, VitalsServiceError> {
        // First validate the request
        self.validate_reading(&request)?;

        if self.should_fail_ingestion {
            return Err(VitalsServiceError::PersistenceError(
                "Persistence error - mock is configured to fail ingestion".to_string(),
            ));
        }

        // The mock treats every well-formed subject ID as an existing
        // subject of the configured age
        let status = self.classify_reading(&request, self.subject_age);

        let record = HealthRecord {
            id: uuid::Uuid::new_v4().to_string(),
            subject_id: subject_id.to_string(),
            heart_rate: request.heart_rate,
            spo2: request.spo2,
            ir: request.ir,
            red: request.red,
            status,
            recorded_at: chrono::Utc::now().to_rfc3339(),
        };

        // Store the record
        let mut records = self.records.write().unwrap();
        let id = record.id.clone();
        records.insert(id, record.clone());

        Ok(record)
    }

    async fn get_history(
        &self,
        subject_id: &str,
        limit: Option<usize>,
        offset: Option<usize>,
        sort_desc: Option<bool>,
    ) -> Result<(Vec<HealthRecord>, usize), VitalsServiceError> {
        let records = self.records.read().unwrap();
        let mut records_vec: Vec<HealthRecord> = records
            .values()
            .filter(|r| r.subject_id == subject_id)
            .cloned()
            .collect();

        // Sort by recording time, newest first unless asked otherwise
        records_vec.sort_by(|a, b| {
            if sort_desc.unwrap_or(true) {
                b.recorded_at.cmp(&a.recorded_at)
            } else {
                a.recorded_at.cmp(&b.recorded_at)
            }
        });

        // Get total count before pagination
        let total_count = records_vec.len();

        // Apply pagination if provided
        if let Some(offset_val) = offset {
            if offset_val < records_vec.len() {
                records_vec = records_vec.split_off(offset_val);
            } else {
                records_vec = Vec::new();
            }
        }

        if let Some(limit_val) = limit {
            records_vec.truncate(limit_val);
        }

        Ok((records_vec, total_count))
    }

    async fn delete_record(&self, id: &str) -> Result<HealthRecord, VitalsServiceError> {
        let mut records = self.records.write().unwrap();

        match records.remove(id) {
            Some(record) => Ok(record),
            None => Err(VitalsServiceError::RecordNotFound(
                format!("Health record with ID {} not found", id),
            )),
        }
    }
}

/// Mock implementation of health services for testing system health
#[derive(Debug)]
pub struct MockHealthService {
    /// Database component status
    database_status: ComponentStatus,
    /// Risk model component status
    model_status: ComponentStatus,
    /// System status
    system_status: SystemStatus,
    /// Additional components
    components: HashMap<String, HealthComponent>,
}

impl Default for MockHealthService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHealthService {
    /// Create a new mock health service with all components healthy
    pub fn new() -> Self {
        Self {
            database_status: ComponentStatus::Healthy,
            model_status: ComponentStatus::Healthy,
            system_status: SystemStatus::Healthy,
            components: HashMap::new(),
        }
    }

    /// Configure the mock with a degraded database
    pub fn with_degraded_database(mut self) -> Self {
        self.database_status = ComponentStatus::Degraded;
        self
    }

    /// Configure the mock with an unhealthy database
    pub fn with_unhealthy_database(mut self) -> Self {
        self.database_status = ComponentStatus::Unhealthy;
        self
    }

    /// Configure the mock with a degraded risk model
    pub fn with_degraded_model(mut self) -> Self {
        self.model_status = ComponentStatus::Degraded;
        self
    }

    /// Set the overall system status
    pub fn with_system_status(mut self, status: SystemStatus) -> Self {
        self.system_status = status;
        self
    }

    /// Add a custom component with a specific status
    pub fn with_component(mut self, name: &str, status: ComponentStatus, details: Option<String>) -> Self {
        self.components.insert(
            name.to_string(),
            HealthComponent {
                status,
                details,
            },
        );
        self
    }
}

#[async_trait]
impl HealthServiceTrait for MockHealthService {
    /// Get the system health
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = HashMap::new();

        // Add database component
        components.insert(
            "database".to_string(),
            HealthComponent {
                status: self.database_status.clone(),
                details: match self.database_status {
                    ComponentStatus::Healthy => None,
                    ComponentStatus::Degraded => Some("Database is experiencing high load".to_string()),
                    ComponentStatus::Unhealthy => Some("Database connection failed".to_string()),
                },
            },
        );

        // Add risk model component
        components.insert(
            "risk_model".to_string(),
            HealthComponent {
                status: self.model_status.clone(),
                details: match self.model_status {
                    ComponentStatus::Healthy => None,
                    _ => Some("Risk model failed to load; threshold rules are classifying".to_string()),
                },
            },
        );

        // Add any additional components
        for (name, component) in &self.components {
            components.insert(name.clone(), component.clone());
        }

        SystemHealth {
            status: self.system_status.clone(),
            components,
        }
    }

    /// Check database status
    async fn check_database_status(&self) -> Result<bool, String> {
        match self.database_status {
            ComponentStatus::Healthy => Ok(true),
            ComponentStatus::Degraded => Ok(true),
            ComponentStatus::Unhealthy => Err("Database connection failed".to_string()),
        }
    }
}

/// Factory function to create a mock health service
pub fn create_mock_health_service() -> impl HealthServiceTrait {
    MockHealthService::new()
}
