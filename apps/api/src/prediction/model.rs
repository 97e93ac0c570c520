//! Regression model: the trait seam plus the JSON artifact loader.
//!
//! The artifact is exported once from the training notebook and treated as
//! opaque: this module only evaluates it. Two model shapes are supported:
//!
//! ```json
//! {"feature_names": ["Średni Czas na 5 km", "Rocznik", "Płeć_LE"],
//!  "model": {"type": "linear", "intercept": 10321.0, "coefficients": [4.6, -5.0, -120.0]}}
//! ```
//!
//! and a gradient-boosted tree ensemble (`"type": "tree_ensemble"`), where each
//! tree is a flat node list: split nodes `{feature, threshold, left, right}`
//! send `x[feature] <= threshold` left, leaf nodes carry `{value}`.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::prediction::features::FEATURE_NAMES;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("feature schema mismatch: expected {expected:?}, found {found:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("expected {expected} feature values, got {got}")]
    FeatureCount { expected: usize, got: usize },

    #[error("feature values must be finite")]
    NonFiniteInput,

    #[error("model produced an unusable prediction: {0}")]
    InvalidOutput(f64),
}

/// A loaded regression model. Immutable after construction, so one instance
/// is shared across concurrent requests behind an `Arc` without locking.
pub trait RegressionModel: Send + Sync {
    /// Predicts a single value from one row ordered like `feature_names()`.
    fn predict(&self, row: &[f64]) -> Result<f64, ModelError>;

    fn feature_names(&self) -> &[String];

    /// Short model family name for logs and telemetry.
    fn kind(&self) -> &'static str;
}

#[derive(Debug, Clone, Deserialize)]
struct ModelArtifact {
    feature_names: Vec<String>,
    model: ModelSpec,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ModelSpec {
    Linear {
        intercept: f64,
        coefficients: Vec<f64>,
    },
    TreeEnsemble {
        #[serde(default)]
        base_score: f64,
        #[serde(default = "default_learning_rate")]
        learning_rate: f64,
        trees: Vec<Tree>,
    },
}

fn default_learning_rate() -> f64 {
    1.0
}

#[derive(Debug, Clone, Deserialize)]
struct Tree {
    nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// A model evaluated from a validated JSON artifact.
#[derive(Debug, Clone)]
pub struct ArtifactModel {
    feature_names: Vec<String>,
    spec: ModelSpec,
}

impl ArtifactModel {
    pub fn from_file(path: &Path) -> Result<Self, ModelError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        let artifact: ModelArtifact = serde_json::from_str(raw)?;

        if !artifact.feature_names.iter().map(String::as_str).eq(FEATURE_NAMES) {
            return Err(ModelError::SchemaMismatch {
                expected: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
                found: artifact.feature_names,
            });
        }

        validate_spec(&artifact.model, artifact.feature_names.len())?;

        Ok(Self {
            feature_names: artifact.feature_names,
            spec: artifact.model,
        })
    }
}

fn validate_spec(spec: &ModelSpec, n_features: usize) -> Result<(), ModelError> {
    match spec {
        ModelSpec::Linear {
            intercept,
            coefficients,
        } => {
            if coefficients.len() != n_features {
                return Err(ModelError::InvalidArtifact(format!(
                    "linear model has {} coefficients for {} features",
                    coefficients.len(),
                    n_features
                )));
            }
            if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
                return Err(ModelError::InvalidArtifact(
                    "linear model weights must be finite".to_string(),
                ));
            }
        }
        ModelSpec::TreeEnsemble {
            base_score,
            learning_rate,
            trees,
        } => {
            if !base_score.is_finite() || !learning_rate.is_finite() {
                return Err(ModelError::InvalidArtifact(
                    "base_score and learning_rate must be finite".to_string(),
                ));
            }
            if trees.is_empty() {
                return Err(ModelError::InvalidArtifact(
                    "tree ensemble has no trees".to_string(),
                ));
            }
            for (t, tree) in trees.iter().enumerate() {
                validate_tree(tree, n_features)
                    .map_err(|msg| ModelError::InvalidArtifact(format!("tree {t}: {msg}")))?;
            }
        }
    }
    Ok(())
}

/// Children must point forward in the node list, so evaluation always terminates.
fn validate_tree(tree: &Tree, n_features: usize) -> Result<(), String> {
    if tree.nodes.is_empty() {
        return Err("no nodes".to_string());
    }
    for (i, node) in tree.nodes.iter().enumerate() {
        match node {
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if *feature >= n_features {
                    return Err(format!("node {i} splits on unknown feature {feature}"));
                }
                if !threshold.is_finite() {
                    return Err(format!("node {i} has a non-finite threshold"));
                }
                for child in [left, right] {
                    if *child <= i || *child >= tree.nodes.len() {
                        return Err(format!("node {i} has invalid child {child}"));
                    }
                }
            }
            TreeNode::Leaf { value } => {
                if !value.is_finite() {
                    return Err(format!("leaf {i} has a non-finite value"));
                }
            }
        }
    }
    Ok(())
}

impl Tree {
    fn evaluate(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

impl RegressionModel for ArtifactModel {
    fn predict(&self, row: &[f64]) -> Result<f64, ModelError> {
        if row.len() != self.feature_names.len() {
            return Err(ModelError::FeatureCount {
                expected: self.feature_names.len(),
                got: row.len(),
            });
        }
        if row.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFiniteInput);
        }

        let value = match &self.spec {
            ModelSpec::Linear {
                intercept,
                coefficients,
            } => {
                intercept
                    + coefficients
                        .iter()
                        .zip(row)
                        .map(|(c, x)| c * x)
                        .sum::<f64>()
            }
            ModelSpec::TreeEnsemble {
                base_score,
                learning_rate,
                trees,
            } => {
                base_score
                    + learning_rate * trees.iter().map(|t| t.evaluate(row)).sum::<f64>()
            }
        };
        Ok(value)
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn kind(&self) -> &'static str {
        match self.spec {
            ModelSpec::Linear { .. } => "linear",
            ModelSpec::TreeEnsemble { .. } => "tree_ensemble",
        }
    }
}
