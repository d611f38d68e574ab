//! # Clinsight
//!
//! Clinical decision-support inference core for primary-care differential
//! diagnosis: given one fully-populated patient encounter, rank the four
//! differential diagnoses (DM2, EDA, HTA, IRA) with a pre-trained
//! tree-ensemble classifier, flag out-of-range clinical values, optionally
//! attribute the prediction to individual features, and render a PDF
//! report.
//!
//! ## Architecture
//!
//! The crate follows hexagonal architecture:
//! - `domain`: core business types (PatientRecord, Diagnosis, Alert)
//! - `ports`: trait definitions for the model, explainer and renderer
//! - `adapters`: concrete implementations (JSON forest export, printpdf,
//!   log sanitization)
//! - `application`: use cases orchestrating the pipeline
//!
//! ## Lifecycle
//!
//! Resources (classifier, scaler, attribution names) load once per
//! process into an immutable [`application::ResourceBundle`]; every
//! prediction is a synchronous request against that shared bundle. A load
//! failure is fatal for the session, a per-request failure is local to
//! the request, and attribution failures degrade without blocking the
//! diagnosis.

pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

pub use domain::{Diagnosis, DiagnosisResult, PatientRecord};

/// Result type for Clinsight operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Main error type for the inference pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Loading a persisted artifact failed; fatal for the session.
    #[error("resource error: {0}")]
    Resource(#[from] application::ResourceError),

    /// Feature row shape or content disagrees with the loaded schema.
    #[error("feature schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Attribution resources missing or unusable; soft failure.
    #[error("attribution unavailable: {0}")]
    AttributionUnavailable(String),

    /// Report rendering failed.
    #[error("report error: {0}")]
    Render(#[from] ports::RenderError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<ports::ClassifierError> for PipelineError {
    fn from(err: ports::ClassifierError) -> Self {
        // Malformed-input failures from the model layer always surface as
        // schema mismatches, never as raw library errors.
        match err {
            ports::ClassifierError::SchemaMismatch(m) => Self::SchemaMismatch(m),
            ports::ClassifierError::InvalidModel(m) => Self::SchemaMismatch(m),
        }
    }
}
