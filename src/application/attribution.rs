//! Attribution: per-feature contributions for the principal diagnosis.
//!
//! Optional component: it needs the explainer and the reference
//! feature-name list from the resource bundle. When either is missing the
//! service reports `AttributionUnavailable` and the caller shows the
//! diagnosis without explanation; attribution never blocks a report.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::application::features::FeatureVector;
use crate::application::inference::scale_row;
use crate::application::resources::ResourceBundle;
use crate::domain::Diagnosis;
use crate::PipelineError;

/// Number of top contributing factors reported.
const TOP_FEATURES: usize = 10;

/// One contributing factor: feature, the patient's original value, and
/// the signed contribution in the model's native units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributionEntry {
    pub feature: String,
    /// The pre-scaling value as entered, not the standardized one.
    pub patient_value: f64,
    pub contribution: f64,
}

impl AttributionEntry {
    /// Directional language for narrative rendering.
    #[must_use]
    pub fn direction(&self) -> &'static str {
        if self.contribution >= 0.0 {
            "increases probability"
        } else {
            "decreases probability"
        }
    }

    /// Narrative line as shown in the report.
    #[must_use]
    pub fn narrative(&self) -> String {
        format!(
            "{} (value {}): {} ({:+.4})",
            self.feature,
            self.patient_value,
            self.direction(),
            self.contribution
        )
    }
}

/// Ranked attribution for one predicted class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributionSet {
    /// The class being explained (the principal diagnosis).
    pub diagnosis: Diagnosis,
    /// Top entries, descending by absolute contribution.
    pub entries: Vec<AttributionEntry>,
}

/// Service computing attribution against the shared resource bundle.
pub struct AttributionService {
    bundle: Arc<ResourceBundle>,
}

impl AttributionService {
    #[must_use]
    pub fn new(bundle: Arc<ResourceBundle>) -> Self {
        Self { bundle }
    }

    /// Whether the loaded resources support attribution at all.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.bundle.explainer().is_some() && self.bundle.attribution_names().is_some()
    }

    /// Explain the given class for one feature vector.
    ///
    /// If the explainer's output length disagrees with the reference
    /// feature-name list, both are truncated to the shorter length: a
    /// lossy but non-fatal degradation, preferred over losing the report.
    ///
    /// # Errors
    /// Returns [`PipelineError::AttributionUnavailable`] when the bundle
    /// has no explainer, and [`PipelineError::SchemaMismatch`] for a
    /// malformed vector.
    pub fn explain(
        &self,
        vector: &FeatureVector,
        diagnosis: Diagnosis,
    ) -> Result<AttributionSet, PipelineError> {
        let explainer = self.bundle.explainer().ok_or_else(|| {
            PipelineError::AttributionUnavailable(
                "no explainer loaded (reference feature list missing)".into(),
            )
        })?;
        let names = self.bundle.attribution_names().ok_or_else(|| {
            PipelineError::AttributionUnavailable("reference feature list missing".into())
        })?;

        let row = scale_row(&self.bundle, vector)?;
        let contributions = explainer.contributions(&row, diagnosis as usize)?;

        // Depending on how the backend batches multiclass output, the
        // contribution count can disagree with the name list; reconcile
        // by truncating to the shorter side.
        let usable = contributions.len().min(names.len());
        if contributions.len() != names.len() {
            tracing::warn!(
                "Attribution shape mismatch: {} contributions vs {} names, truncating to {}",
                contributions.len(),
                names.len(),
                usable
            );
        }

        let mut entries: Vec<AttributionEntry> = (0..usable)
            .map(|i| AttributionEntry {
                feature: names[i].clone(),
                patient_value: vector.values().get(i).copied().unwrap_or(0.0),
                contribution: contributions[i],
            })
            .collect();
        entries.sort_by(|a, b| {
            b.contribution
                .abs()
                .partial_cmp(&a.contribution.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        entries.truncate(TOP_FEATURES);

        Ok(AttributionSet { diagnosis, entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::features::tests_support::vector_from;
    use crate::ports::{Classifier, ClassifierError, Explainer, Scaler};

    struct WideClassifier {
        features: Vec<String>,
    }

    impl Classifier for WideClassifier {
        fn feature_names(&self) -> &[String] {
            &self.features
        }

        fn class_labels(&self) -> &[String] {
            static LABELS: std::sync::OnceLock<Vec<String>> = std::sync::OnceLock::new();
            LABELS.get_or_init(|| vec!["DM2".into(), "EDA".into(), "HTA".into(), "IRA".into()])
        }

        fn predict_proba(&self, _row: &[f64]) -> Result<Vec<f64>, ClassifierError> {
            Ok(vec![0.25; 4])
        }
    }

    struct NoScaler;

    impl Scaler for NoScaler {
        fn columns(&self) -> &[String] {
            &[]
        }

        fn transform(&self, column: &str, _value: f64) -> Result<f64, ClassifierError> {
            Err(ClassifierError::SchemaMismatch(column.into()))
        }
    }

    /// Explainer returning one contribution per feature plus optional
    /// extra entries to simulate the multiclass batching mismatch.
    struct FixedExplainer {
        contributions: Vec<f64>,
    }

    impl Explainer for FixedExplainer {
        fn contributions(
            &self,
            _row: &[f64],
            _class_index: usize,
        ) -> Result<Vec<f64>, ClassifierError> {
            Ok(self.contributions.clone())
        }
    }

    fn bundle_with(
        n_features: usize,
        contributions: Vec<f64>,
        names: Option<Vec<String>>,
    ) -> Arc<ResourceBundle> {
        let features: Vec<String> = (0..n_features).map(|i| format!("f{i}")).collect();
        Arc::new(ResourceBundle::from_parts(
            Arc::new(WideClassifier { features }),
            Box::new(NoScaler),
            Some(Arc::new(FixedExplainer { contributions })),
            names,
        ))
    }

    #[test]
    fn test_entries_ranked_by_absolute_magnitude() {
        let names = (0..4).map(|i| format!("f{i}")).collect();
        let bundle = bundle_with(4, vec![0.1, -0.4, 0.02, 0.3], Some(names));
        let service = AttributionService::new(bundle);

        let set = service
            .explain(&vector_from(&[1.0, 2.0, 3.0, 4.0]), Diagnosis::Ira)
            .expect("explains");

        let order: Vec<&str> = set.entries.iter().map(|e| e.feature.as_str()).collect();
        assert_eq!(order, vec!["f1", "f3", "f0", "f2"]);
        // Original values ride along untransformed.
        assert!((set.entries[0].patient_value - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shape_mismatch_truncates_instead_of_failing() {
        // 42 contributions vs 40 names.
        let names: Vec<String> = (0..40).map(|i| format!("f{i}")).collect();
        let bundle = bundle_with(42, vec![0.01; 42], Some(names));
        let service = AttributionService::new(bundle);

        let values = vec![0.0; 42];
        let set = service
            .explain(&vector_from(&values), Diagnosis::Dm2)
            .expect("explains despite mismatch");
        assert_eq!(set.entries.len(), 10);
    }

    #[test]
    fn test_returns_fewer_than_ten_when_fewer_features_exist() {
        let names = (0..3).map(|i| format!("f{i}")).collect();
        let bundle = bundle_with(3, vec![0.3, 0.2, 0.1], Some(names));
        let service = AttributionService::new(bundle);

        let set = service
            .explain(&vector_from(&[1.0, 1.0, 1.0]), Diagnosis::Hta)
            .expect("explains");
        assert_eq!(set.entries.len(), 3);
    }

    #[test]
    fn test_unavailable_without_names() {
        let bundle = bundle_with(2, vec![0.1, 0.2], None);
        let service = AttributionService::new(bundle);

        assert!(!service.is_available());
        let err = service
            .explain(&vector_from(&[1.0, 1.0]), Diagnosis::Eda)
            .unwrap_err();
        assert!(matches!(err, PipelineError::AttributionUnavailable(_)));
    }

    #[test]
    fn test_direction_language() {
        let positive = AttributionEntry {
            feature: "glucose".into(),
            patient_value: 185.0,
            contribution: 0.04,
        };
        assert_eq!(positive.direction(), "increases probability");

        let negative = AttributionEntry {
            feature: "spo2".into(),
            patient_value: 98.0,
            contribution: -0.02,
        };
        assert_eq!(negative.direction(), "decreases probability");
        assert!(negative.narrative().contains("decreases probability"));
    }
}
