//! Explainer port: trait for per-feature attribution.

use super::ClassifierError;

/// Trait for computing feature attributions for one predicted class.
///
/// Implementations require access to the fitted model's internal structure
/// (tree paths), so a model may simply not support explanation; the
/// pipeline treats that as a soft degradation, not a failure.
pub trait Explainer: Send + Sync {
    /// Signed contribution of each feature to the given class's score,
    /// in the model's native units (not re-normalized).
    ///
    /// The returned vector follows the model's feature order. Its length
    /// is reconciled against the reference feature-name list by the
    /// caller, which truncates on mismatch rather than failing.
    ///
    /// # Errors
    /// Returns [`ClassifierError::SchemaMismatch`] on a malformed row and
    /// [`ClassifierError::InvalidModel`] if `class_index` is out of range.
    fn contributions(&self, row: &[f64], class_index: usize)
        -> Result<Vec<f64>, ClassifierError>;
}
