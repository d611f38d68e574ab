//! Inference engine: scaled features in, ranked diagnoses out.
//!
//! Applies the fitted scaler to the designated numeric columns, obtains
//! class probabilities, and ranks the top-3 classes. The only validation
//! performed here is schema-shape checking; clinical ranges are the
//! validator's job.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::application::features::FeatureVector;
use crate::application::resources::ResourceBundle;
use crate::domain::{Alert, Diagnosis, DiagnosisResult, RankedDiagnosis};
use crate::PipelineError;

/// Number of ranked differential diagnoses returned.
const TOP_K: usize = 3;

/// Scale the designated numeric columns; everything else passes through.
pub(crate) fn scale_row(
    bundle: &ResourceBundle,
    vector: &FeatureVector,
) -> Result<Vec<f64>, PipelineError> {
    let schema = bundle.schema();
    if vector.len() != schema.len() {
        return Err(PipelineError::SchemaMismatch(format!(
            "feature vector has {} values, schema expects {}",
            vector.len(),
            schema.len()
        )));
    }

    let mut row = Vec::with_capacity(vector.len());
    for (column, &value) in schema.columns().iter().zip(vector.values()) {
        if schema.is_scaled(column) {
            row.push(bundle.scaler().transform(column, value)?);
        } else {
            row.push(value);
        }
    }
    Ok(row)
}

/// Service running predictions against the shared resource bundle.
///
/// The bundle is read-only; the service holds a reference-counted handle
/// and performs no mutation, so one instance serves all interactions.
pub struct InferenceService {
    bundle: Arc<ResourceBundle>,
}

impl InferenceService {
    #[must_use]
    pub fn new(bundle: Arc<ResourceBundle>) -> Self {
        Self { bundle }
    }

    /// Predict the ranked differential diagnoses for one feature vector.
    ///
    /// Deterministic: the same vector against the same bundle yields the
    /// same ranking. Ties in probability break by ascending class index.
    ///
    /// # Errors
    /// Returns [`PipelineError::SchemaMismatch`] when the vector width or
    /// column content disagrees with the loaded schema; malformed-input
    /// failures from the model never escape as anything else.
    pub fn predict(
        &self,
        vector: &FeatureVector,
        alerts: Vec<Alert>,
    ) -> Result<DiagnosisResult, PipelineError> {
        let row = scale_row(&self.bundle, vector)?;
        let probs = self.bundle.classifier().predict_proba(&row)?;

        let mut indices: Vec<usize> = (0..probs.len()).collect();
        indices.sort_by(|&a, &b| {
            probs[b]
                .partial_cmp(&probs[a])
                .unwrap_or(Ordering::Equal)
                .then(a.cmp(&b))
        });

        let ranked: Vec<RankedDiagnosis> = indices
            .into_iter()
            .take(TOP_K)
            .map(|i| {
                Diagnosis::from_class_index(i)
                    .map(|diagnosis| RankedDiagnosis {
                        diagnosis,
                        probability: probs[i],
                    })
                    .ok_or_else(|| {
                        PipelineError::SchemaMismatch(format!(
                            "classifier produced unmapped class index {i}"
                        ))
                    })
            })
            .collect::<Result<_, _>>()?;

        let result = DiagnosisResult::new(ranked, alerts);
        tracing::info!(
            "Prediction complete: principal={} ({:.2}%), tier={:?}, alerts={}",
            result.principal().diagnosis,
            result.principal().probability * 100.0,
            result.tier,
            result.alerts.len()
        );
        Ok(result)
    }

    #[must_use]
    pub fn bundle(&self) -> &Arc<ResourceBundle> {
        &self.bundle
    }
}
