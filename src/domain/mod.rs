//! Domain layer: core business types.
//!
//! Pure types with no external service dependencies. Everything here is
//! serializable and transient: records and results live for one prediction
//! request only.

mod alert;
mod diagnosis;
mod patient;

pub use alert::Alert;
pub use diagnosis::{ConfidenceTier, Diagnosis, DiagnosisResult, RankedDiagnosis};
pub use patient::{
    Labs, PatientRecord, ResidenceArea, RiskHistory, Sex, Symptoms, Vitals, SYMPTOM_NAMES,
};
