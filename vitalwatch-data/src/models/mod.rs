// Data storage models

mod vitals;

pub use vitals::{
    CreateHealthRecordRequest, CreateSubjectRequest, HealthRecord, Subject,
};
