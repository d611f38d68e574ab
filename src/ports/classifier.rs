//! Classifier port: trait for the pre-trained multiclass model.
//!
//! Abstracts the model artifact format from the application logic. The
//! pipeline only ever sees class probabilities and the training-time
//! feature schema recorded on the model.

use thiserror::Error;

/// Errors surfaced by classifier implementations.
#[derive(Debug, Error)]
pub enum ClassifierError {
    /// Input row does not match the model's feature schema.
    #[error("feature schema mismatch: {0}")]
    SchemaMismatch(String),

    /// The model artifact is internally inconsistent.
    #[error("invalid model: {0}")]
    InvalidModel(String),
}

/// Trait for a fitted multiclass classifier.
///
/// Implementations are read-only after construction and shared across all
/// predictions for the process lifetime.
pub trait Classifier: Send + Sync {
    /// Feature column names in the exact order the model was trained on.
    ///
    /// Feature vectors handed to [`predict_proba`](Self::predict_proba)
    /// must follow this order; it is never assumed or hardcoded elsewhere.
    fn feature_names(&self) -> &[String];

    /// Class labels in native class-index order.
    fn class_labels(&self) -> &[String];

    /// Class probabilities for a single feature row.
    ///
    /// The returned vector has one entry per class, summing to ~1.0.
    ///
    /// # Errors
    /// Returns [`ClassifierError::SchemaMismatch`] if `row` does not have
    /// exactly one value per feature column.
    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, ClassifierError>;
}

/// Trait for a fitted feature scaler.
///
/// Applies the training-time standardization to the designated numeric
/// columns; all other columns pass through untouched.
pub trait Scaler: Send + Sync {
    /// Names of the columns this scaler was fitted on.
    fn columns(&self) -> &[String];

    /// Scale a single value belonging to the named column.
    ///
    /// # Errors
    /// Returns [`ClassifierError::SchemaMismatch`] if the column is not one
    /// the scaler was fitted on.
    fn transform(&self, column: &str, value: f64) -> Result<f64, ClassifierError>;
}
