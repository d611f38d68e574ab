//! Forest adapter: tree-ensemble classifier loaded from a JSON export.
//!
//! The training pipeline exports the fitted random forest as plain node
//! arrays (sklearn layout: `children_left`, `children_right`, `feature`,
//! `threshold`, `value`), with per-node class distributions normalized to
//! probabilities. This adapter walks those arrays directly, so inference
//! needs no ML runtime at all.
//!
//! The same tree structure drives attribution: descending from root to
//! leaf, each split attributes the change in the class's node-value to the
//! split feature (path attribution). Contributions are averaged across
//! trees and reported in probability units, matching what a tree explainer
//! produces for the predicted class.

use serde::{Deserialize, Serialize};

use crate::ports::{Classifier, ClassifierError, Explainer, Scaler};

/// Sentinel used in `children_left`/`children_right` for leaf nodes.
const LEAF: i64 = -1;

/// One exported decision tree in sklearn node-array layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    /// Split feature index per node; unused for leaves.
    pub feature: Vec<i64>,
    /// Split threshold per node; `x[feature] <= threshold` goes left.
    pub threshold: Vec<f64>,
    /// Per-node class probability distribution.
    pub value: Vec<Vec<f64>>,
}

/// Model artifact exported by the training pipeline (`model.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedForestModel {
    pub model_type: String,
    pub n_classes: usize,
    pub class_labels: Vec<String>,
    pub feature_names: Vec<String>,
    pub trees: Vec<ExportedTree>,
}

/// Scaler artifact exported by the training pipeline (`scaler.json`).
///
/// Standardization parameters for the numeric columns only; categorical,
/// binary and symptom columns were never scaled during training.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedScaler {
    pub columns: Vec<String>,
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

/// Fitted forest classifier backed by the exported node arrays.
#[derive(Debug)]
pub struct ForestClassifier {
    model: ExportedForestModel,
}

impl ForestClassifier {
    /// Validate the exported arrays and wrap them.
    ///
    /// # Errors
    /// Returns [`ClassifierError::InvalidModel`] on inconsistent array
    /// lengths, out-of-range child or feature indices, or a class count
    /// that does not match the label list.
    pub fn new(model: ExportedForestModel) -> Result<Self, ClassifierError> {
        if model.n_classes == 0 || model.class_labels.len() != model.n_classes {
            return Err(ClassifierError::InvalidModel(format!(
                "class label count {} does not match n_classes {}",
                model.class_labels.len(),
                model.n_classes
            )));
        }
        if model.feature_names.is_empty() {
            return Err(ClassifierError::InvalidModel(
                "model has no feature names".into(),
            ));
        }
        if model.trees.is_empty() {
            return Err(ClassifierError::InvalidModel("model has no trees".into()));
        }

        let n_features = model.feature_names.len() as i64;
        for (t, tree) in model.trees.iter().enumerate() {
            let n = tree.children_left.len();
            if tree.children_right.len() != n
                || tree.feature.len() != n
                || tree.threshold.len() != n
                || tree.value.len() != n
            {
                return Err(ClassifierError::InvalidModel(format!(
                    "tree {t}: node array lengths disagree"
                )));
            }
            for node in 0..n {
                let (left, right) = (tree.children_left[node], tree.children_right[node]);
                let is_leaf = left == LEAF;
                if is_leaf != (right == LEAF) {
                    return Err(ClassifierError::InvalidModel(format!(
                        "tree {t} node {node}: half-leaf node"
                    )));
                }
                if !is_leaf {
                    if left < 0 || right < 0 || left as usize >= n || right as usize >= n {
                        return Err(ClassifierError::InvalidModel(format!(
                            "tree {t} node {node}: child index out of range"
                        )));
                    }
                    // Children must point forward, as in the sklearn
                    // export; a backward pointer makes descent cycle.
                    if left as usize <= node || right as usize <= node {
                        return Err(ClassifierError::InvalidModel(format!(
                            "tree {t} node {node}: child index does not advance"
                        )));
                    }
                    if tree.feature[node] < 0 || tree.feature[node] >= n_features {
                        return Err(ClassifierError::InvalidModel(format!(
                            "tree {t} node {node}: split feature out of range"
                        )));
                    }
                }
                if tree.value[node].len() != model.n_classes {
                    return Err(ClassifierError::InvalidModel(format!(
                        "tree {t} node {node}: value length != n_classes"
                    )));
                }
            }
        }

        tracing::info!(
            "Loaded {} model ({} trees, {} features, {} classes)",
            model.model_type,
            model.trees.len(),
            model.feature_names.len(),
            model.n_classes
        );

        Ok(Self { model })
    }

    fn check_row(&self, row: &[f64]) -> Result<(), ClassifierError> {
        let expected = self.model.feature_names.len();
        if row.len() != expected {
            return Err(ClassifierError::SchemaMismatch(format!(
                "expected {expected} features, got {}",
                row.len()
            )));
        }
        Ok(())
    }

    /// Descend one tree, returning the leaf's class distribution.
    fn tree_leaf<'a>(tree: &'a ExportedTree, row: &[f64]) -> &'a [f64] {
        let mut node = 0usize;
        while tree.children_left[node] != LEAF {
            let feature = tree.feature[node] as usize;
            node = if row[feature] <= tree.threshold[node] {
                tree.children_left[node] as usize
            } else {
                tree.children_right[node] as usize
            };
        }
        &tree.value[node]
    }
}

impl Classifier for ForestClassifier {
    fn feature_names(&self) -> &[String] {
        &self.model.feature_names
    }

    fn class_labels(&self) -> &[String] {
        &self.model.class_labels
    }

    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, ClassifierError> {
        self.check_row(row)?;

        let mut probs = vec![0.0; self.model.n_classes];
        for tree in &self.model.trees {
            let leaf = Self::tree_leaf(tree, row);
            for (p, v) in probs.iter_mut().zip(leaf) {
                *p += v;
            }
        }

        // Average over trees, then renormalize to absorb float drift in
        // the exported per-node distributions.
        let total: f64 = probs.iter().sum();
        if total > 0.0 {
            for p in &mut probs {
                *p /= total;
            }
        }
        Ok(probs)
    }
}

impl Explainer for ForestClassifier {
    fn contributions(&self, row: &[f64], class_index: usize) -> Result<Vec<f64>, ClassifierError> {
        self.check_row(row)?;
        if class_index >= self.model.n_classes {
            return Err(ClassifierError::InvalidModel(format!(
                "class index {class_index} out of range ({} classes)",
                self.model.n_classes
            )));
        }

        let n_features = self.model.feature_names.len();
        let mut contributions = vec![0.0; n_features];

        for tree in &self.model.trees {
            let mut node = 0usize;
            while tree.children_left[node] != LEAF {
                let feature = tree.feature[node] as usize;
                let child = if row[feature] <= tree.threshold[node] {
                    tree.children_left[node] as usize
                } else {
                    tree.children_right[node] as usize
                };
                contributions[feature] +=
                    tree.value[child][class_index] - tree.value[node][class_index];
                node = child;
            }
        }

        let n_trees = self.model.trees.len() as f64;
        for c in &mut contributions {
            *c /= n_trees;
        }
        Ok(contributions)
    }
}

/// Standard scaler backed by the exported mean/scale arrays.
pub struct StandardScaler {
    scaler: ExportedScaler,
}

impl StandardScaler {
    /// Validate the exported arrays and wrap them.
    ///
    /// # Errors
    /// Returns [`ClassifierError::InvalidModel`] on length mismatches or a
    /// zero scale entry.
    pub fn new(scaler: ExportedScaler) -> Result<Self, ClassifierError> {
        let n = scaler.columns.len();
        if n == 0 {
            return Err(ClassifierError::InvalidModel(
                "scaler has no columns".into(),
            ));
        }
        if scaler.mean.len() != n || scaler.scale.len() != n {
            return Err(ClassifierError::InvalidModel(
                "scaler parameter lengths do not match column count".into(),
            ));
        }
        if scaler.scale.iter().any(|&s| s == 0.0 || !s.is_finite()) {
            return Err(ClassifierError::InvalidModel(
                "scaler contains a zero or non-finite scale entry".into(),
            ));
        }
        Ok(Self { scaler })
    }

    fn index_of(&self, column: &str) -> Option<usize> {
        self.scaler.columns.iter().position(|c| c == column)
    }
}

impl Scaler for StandardScaler {
    fn columns(&self) -> &[String] {
        &self.scaler.columns
    }

    fn transform(&self, column: &str, value: f64) -> Result<f64, ClassifierError> {
        let i = self.index_of(column).ok_or_else(|| {
            ClassifierError::SchemaMismatch(format!("column {column} not covered by the scaler"))
        })?;
        Ok((value - self.scaler.mean[i]) / self.scaler.scale[i])
    }
}
