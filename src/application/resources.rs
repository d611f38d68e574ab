//! Resource loading: the fitted classifier, scaler and attribution names.
//!
//! Loaded once at startup and shared read-only for the process lifetime.
//! Never reloaded per request: a loaded [`ResourceBundle`] is immutable,
//! so the pipeline needs no locking and individual request failures cannot
//! corrupt it. A load failure is fatal for the session; the caller must
//! refuse predictions until the artifacts are fixed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::adapters::forest::{
    ExportedForestModel, ExportedScaler, ForestClassifier, StandardScaler,
};
use crate::domain::Diagnosis;
use crate::ports::{Classifier, Explainer, Scaler};

/// File names expected inside the resource directory.
const MODEL_FILE: &str = "model.json";
const SCALER_FILE: &str = "scaler.json";
const FEATURE_NAMES_FILE: &str = "feature_names.csv";

/// Errors while loading persisted resources.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// No file at the expected path.
    #[error("resource not found: {0}")]
    NotFound(PathBuf),

    /// File exists but could not be deserialized or failed a sanity check.
    #[error("resource corrupt at {path}: {cause}")]
    Corrupt { path: PathBuf, cause: String },
}

/// The feature column order the classifier expects, captured once at load.
///
/// The builder assembles vectors against this object and the engine
/// validates widths against it; nothing downstream reads order off the
/// live model again.
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    columns: Vec<String>,
    scaled: Vec<String>,
}

impl FeatureSchema {
    #[must_use]
    pub fn new(columns: Vec<String>, scaled: Vec<String>) -> Self {
        Self { columns, scaled }
    }

    /// Ordered column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Whether the named column goes through the fitted scaler.
    #[must_use]
    pub fn is_scaled(&self, column: &str) -> bool {
        self.scaled.iter().any(|c| c == column)
    }
}

/// Read-only bundle of loaded resources, shared across all predictions.
pub struct ResourceBundle {
    classifier: Arc<dyn Classifier>,
    scaler: Box<dyn Scaler>,
    schema: FeatureSchema,
    explainer: Option<Arc<dyn Explainer>>,
    /// Reference feature-name list for attribution, from the training CSV.
    attribution_names: Option<Vec<String>>,
}

// Manual impl: the trait-object fields have no Debug bound.
impl std::fmt::Debug for ResourceBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceBundle")
            .field("schema", &self.schema)
            .field("attribution", &self.explainer.is_some())
            .finish_non_exhaustive()
    }
}

impl ResourceBundle {
    /// Load all artifacts from `dir`.
    ///
    /// `model.json` and `scaler.json` are mandatory. `feature_names.csv`
    /// is optional: without it the explainer is not constructed and
    /// attribution degrades to unavailable, which is never fatal.
    ///
    /// # Errors
    /// Returns [`ResourceError::NotFound`] for a missing mandatory file and
    /// [`ResourceError::Corrupt`] for files that fail to parse or fail the
    /// cross-artifact sanity checks.
    pub fn load(dir: &Path) -> Result<Self, ResourceError> {
        let model_path = dir.join(MODEL_FILE);
        tracing::info!("Loading classifier from {:?}", model_path);
        let model: ExportedForestModel = read_json(&model_path)?;
        let forest = Arc::new(ForestClassifier::new(model).map_err(|e| {
            ResourceError::Corrupt {
                path: model_path.clone(),
                cause: e.to_string(),
            }
        })?);

        if forest.class_labels().len() != Diagnosis::ALL.len() {
            return Err(ResourceError::Corrupt {
                path: model_path.clone(),
                cause: format!(
                    "expected {} diagnosis classes, model has {}",
                    Diagnosis::ALL.len(),
                    forest.class_labels().len()
                ),
            });
        }

        let scaler_path = dir.join(SCALER_FILE);
        tracing::info!("Loading scaler from {:?}", scaler_path);
        let exported: ExportedScaler = read_json(&scaler_path)?;
        let scaler = StandardScaler::new(exported).map_err(|e| ResourceError::Corrupt {
            path: scaler_path.clone(),
            cause: e.to_string(),
        })?;

        // Every scaled column must exist in the classifier schema; a
        // disagreement means the artifacts come from different training
        // runs. Fail fast instead of silently reindexing at request time.
        for column in scaler.columns() {
            if !forest.feature_names().contains(column) {
                return Err(ResourceError::Corrupt {
                    path: scaler_path.clone(),
                    cause: format!("scaler column {column} not present in model schema"),
                });
            }
        }

        let schema = FeatureSchema::new(
            forest.feature_names().to_vec(),
            scaler.columns().to_vec(),
        );

        // Optional attribution resources; absence degrades, never fails.
        let names_path = dir.join(FEATURE_NAMES_FILE);
        let attribution_names = match read_feature_names(&names_path) {
            Ok(names) => Some(names),
            Err(e) => {
                tracing::warn!(
                    "Attribution unavailable, could not read {:?}: {}",
                    names_path,
                    e
                );
                None
            }
        };
        let explainer: Option<Arc<dyn Explainer>> = if attribution_names.is_some() {
            Some(forest.clone())
        } else {
            None
        };

        tracing::info!(
            "Resource bundle ready ({} features, {} scaled, attribution={})",
            schema.len(),
            scaler.columns().len(),
            explainer.is_some()
        );

        Ok(Self {
            classifier: forest,
            scaler: Box::new(scaler),
            schema,
            explainer,
            attribution_names,
        })
    }

    /// Build a bundle directly from already-constructed parts (tests and
    /// embedded deployments).
    #[must_use]
    pub fn from_parts(
        classifier: Arc<dyn Classifier>,
        scaler: Box<dyn Scaler>,
        explainer: Option<Arc<dyn Explainer>>,
        attribution_names: Option<Vec<String>>,
    ) -> Self {
        let schema = FeatureSchema::new(
            classifier.feature_names().to_vec(),
            scaler.columns().to_vec(),
        );
        Self {
            classifier,
            scaler,
            schema,
            explainer,
            attribution_names,
        }
    }

    #[must_use]
    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    #[must_use]
    pub fn scaler(&self) -> &dyn Scaler {
        self.scaler.as_ref()
    }

    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    #[must_use]
    pub fn explainer(&self) -> Option<&dyn Explainer> {
        self.explainer.as_deref()
    }

    #[must_use]
    pub fn attribution_names(&self) -> Option<&[String]> {
        self.attribution_names.as_deref()
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ResourceError> {
    if !path.exists() {
        return Err(ResourceError::NotFound(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path).map_err(|e| ResourceError::Corrupt {
        path: path.to_path_buf(),
        cause: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| ResourceError::Corrupt {
        path: path.to_path_buf(),
        cause: e.to_string(),
    })
}

/// Read the header row of the reference training CSV; the column headers
/// define the attribution feature-name list.
fn read_feature_names(path: &Path) -> Result<Vec<String>, ResourceError> {
    if !path.exists() {
        return Err(ResourceError::NotFound(path.to_path_buf()));
    }
    let mut reader =
        csv::Reader::from_path(path).map_err(|e| ResourceError::Corrupt {
            path: path.to_path_buf(),
            cause: e.to_string(),
        })?;
    let headers = reader.headers().map_err(|e| ResourceError::Corrupt {
        path: path.to_path_buf(),
        cause: e.to_string(),
    })?;
    let names: Vec<String> = headers.iter().map(str::to_string).collect();
    if names.is_empty() {
        return Err(ResourceError::Corrupt {
            path: path.to_path_buf(),
            cause: "feature name CSV has an empty header row".into(),
        });
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn minimal_model_json() -> String {
        // Four-class stump on feature 0 so the bundle passes the class
        // count check.
        serde_json::json!({
            "model_type": "random_forest",
            "n_classes": 4,
            "class_labels": ["DM2", "EDA", "HTA", "IRA"],
            "feature_names": ["age", "bmi"],
            "trees": [{
                "children_left": [1, -1, -1],
                "children_right": [2, -1, -1],
                "feature": [0, -1, -1],
                "threshold": [0.5, 0.0, 0.0],
                "value": [
                    [0.25, 0.25, 0.25, 0.25],
                    [0.7, 0.1, 0.1, 0.1],
                    [0.1, 0.1, 0.1, 0.7]
                ]
            }]
        })
        .to_string()
    }

    fn minimal_scaler_json() -> String {
        serde_json::json!({
            "columns": ["age", "bmi"],
            "mean": [40.0, 25.0],
            "scale": [10.0, 5.0]
        })
        .to_string()
    }

    fn write_file(dir: &Path, name: &str, content: &str) {
        let mut f = std::fs::File::create(dir.join(name)).expect("create file");
        f.write_all(content.as_bytes()).expect("write file");
    }

    #[test]
    fn test_load_full_bundle() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_file(dir.path(), MODEL_FILE, &minimal_model_json());
        write_file(dir.path(), SCALER_FILE, &minimal_scaler_json());
        write_file(dir.path(), FEATURE_NAMES_FILE, "age,bmi\n40,25\n");

        let bundle = ResourceBundle::load(dir.path()).expect("bundle loads");
        assert_eq!(bundle.schema().len(), 2);
        assert!(bundle.schema().is_scaled("age"));
        assert!(bundle.explainer().is_some());
        assert_eq!(bundle.attribution_names().expect("names").len(), 2);
    }

    #[test]
    fn test_missing_model_is_not_found_with_exact_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = ResourceBundle::load(dir.path()).unwrap_err();
        match err {
            ResourceError::NotFound(path) => {
                assert_eq!(path, dir.path().join(MODEL_FILE));
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_corrupt_model_reports_corrupt() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_file(dir.path(), MODEL_FILE, "not json at all");
        write_file(dir.path(), SCALER_FILE, &minimal_scaler_json());

        let err = ResourceBundle::load(dir.path()).unwrap_err();
        assert!(matches!(err, ResourceError::Corrupt { .. }));
    }

    #[test]
    fn test_missing_feature_csv_degrades_without_failing() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_file(dir.path(), MODEL_FILE, &minimal_model_json());
        write_file(dir.path(), SCALER_FILE, &minimal_scaler_json());

        let bundle = ResourceBundle::load(dir.path()).expect("bundle loads");
        assert!(bundle.explainer().is_none());
        assert!(bundle.attribution_names().is_none());
    }

    #[test]
    fn test_bundle_debug_shows_schema_not_artifacts() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_file(dir.path(), MODEL_FILE, &minimal_model_json());
        write_file(dir.path(), SCALER_FILE, &minimal_scaler_json());

        let bundle = ResourceBundle::load(dir.path()).expect("bundle loads");
        let rendered = format!("{bundle:?}");
        assert!(rendered.contains("ResourceBundle"));
        assert!(rendered.contains("schema"));
    }

    #[test]
    fn test_scaler_column_outside_schema_is_corrupt() {
        let dir = tempfile::tempdir().expect("tempdir");
        write_file(dir.path(), MODEL_FILE, &minimal_model_json());
        write_file(
            dir.path(),
            SCALER_FILE,
            &serde_json::json!({
                "columns": ["glucose"],
                "mean": [100.0],
                "scale": [20.0]
            })
            .to_string(),
        );

        let err = ResourceBundle::load(dir.path()).unwrap_err();
        assert!(matches!(err, ResourceError::Corrupt { .. }));
    }
}
