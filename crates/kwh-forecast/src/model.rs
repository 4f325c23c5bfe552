//! Gradient-boosted tree inference for `XGBoost` JSON models.
//!
//! Only the parts of the format needed for scoring are read: feature names,
//! base score, objective and the per-tree node arrays. Leaves are nodes whose
//! `left_children` entry is `-1`; their value is stored in
//! `split_conditions`.

use std::path::Path;

use kwh_core::FEATURE_NAMES;
use serde::Deserialize;

use crate::error::{ForecastError, Result};

/// Objectives whose output is the raw margin (identity link).
const SUPPORTED_OBJECTIVES: [&str; 4] = [
    "reg:squarederror",
    "reg:linear",
    "reg:pseudohubererror",
    "reg:absoluteerror",
];

#[derive(Deserialize)]
struct ModelDocument {
    learner: Learner,
}

#[derive(Deserialize)]
struct Learner {
    #[serde(default)]
    feature_names: Vec<String>,
    gradient_booster: GradientBooster,
    learner_model_param: LearnerModelParam,
    objective: Objective,
}

#[derive(Deserialize)]
struct GradientBooster {
    name: String,
    model: Option<TreeModel>,
}

#[derive(Deserialize)]
struct TreeModel {
    trees: Vec<RawTree>,
}

#[derive(Deserialize)]
struct RawTree {
    left_children: Vec<i32>,
    right_children: Vec<i32>,
    split_indices: Vec<u32>,
    split_conditions: Vec<f64>,
    #[serde(default)]
    default_left: Vec<Flag>,
}

/// Older exports write booleans, newer ones write 0/1.
#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

impl Flag {
    fn is_set(&self) -> bool {
        match self {
            Flag::Bool(b) => *b,
            Flag::Int(i) => *i != 0,
        }
    }
}

#[derive(Deserialize)]
struct LearnerModelParam {
    base_score: String,
}

#[derive(Deserialize)]
struct Objective {
    name: String,
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        default_left: bool,
    },
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn from_raw(raw: RawTree, index: usize, num_features: usize) -> Result<Self> {
        let invalid = |what: &str| ForecastError::InvalidModel(format!("tree {index}: {what}"));

        let len = raw.left_children.len();
        if len == 0 {
            return Err(invalid("no nodes"));
        }
        if raw.right_children.len() != len
            || raw.split_indices.len() != len
            || raw.split_conditions.len() != len
            || !(raw.default_left.is_empty() || raw.default_left.len() == len)
        {
            return Err(invalid("node arrays differ in length"));
        }

        let mut nodes = Vec::with_capacity(len);
        for i in 0..len {
            let threshold = raw.split_conditions[i];
            if raw.left_children[i] == -1 {
                nodes.push(Node::Leaf(threshold));
                continue;
            }

            // Children always come after their parent, so traversal terminates.
            let child = |c: i32| {
                usize::try_from(c)
                    .ok()
                    .filter(|&c| c > i && c < len)
                    .ok_or_else(|| invalid(&format!("node {i} has invalid child {c}")))
            };
            let left = child(raw.left_children[i])?;
            let right = child(raw.right_children[i])?;

            let feature = raw.split_indices[i] as usize;
            if feature >= num_features {
                return Err(invalid(&format!("node {i} splits on unknown feature {feature}")));
            }

            nodes.push(Node::Split {
                feature,
                threshold,
                left,
                right,
                default_left: raw.default_left.get(i).is_some_and(Flag::is_set),
            });
        }

        Ok(Self { nodes })
    }

    fn leaf_value(&self, features: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                Node::Leaf(value) => return value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    default_left,
                } => {
                    let x = features[feature];
                    let go_left = if x.is_nan() { default_left } else { x < threshold };
                    idx = if go_left { left } else { right };
                }
            }
        }
    }
}

/// A regression tree ensemble loaded from an `XGBoost` JSON model.
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    feature_names: Vec<String>,
    base_score: f64,
    trees: Vec<Tree>,
}

impl TreeEnsemble {
    /// Parse a model from its JSON text.
    ///
    /// When the model carries no feature names, the canonical
    /// [`FEATURE_NAMES`] order is assumed.
    ///
    /// # Errors
    ///
    /// Returns `ForecastError::Json` for malformed JSON and
    /// `ForecastError::InvalidModel` for unsupported boosters or objectives
    /// and for structurally invalid trees.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let doc: ModelDocument = serde_json::from_str(json)?;
        let learner = doc.learner;

        if !SUPPORTED_OBJECTIVES.contains(&learner.objective.name.as_str()) {
            return Err(ForecastError::InvalidModel(format!(
                "unsupported objective {:?}",
                learner.objective.name
            )));
        }
        if learner.gradient_booster.name != "gbtree" {
            return Err(ForecastError::InvalidModel(format!(
                "unsupported booster {:?}",
                learner.gradient_booster.name
            )));
        }

        let feature_names = if learner.feature_names.is_empty() {
            FEATURE_NAMES.iter().map(|s| (*s).to_string()).collect()
        } else {
            learner.feature_names
        };

        let base_score = parse_base_score(&learner.learner_model_param.base_score)?;

        let raw_trees = learner
            .gradient_booster
            .model
            .ok_or_else(|| ForecastError::InvalidModel("missing tree model".into()))?
            .trees;
        let trees = raw_trees
            .into_iter()
            .enumerate()
            .map(|(i, raw)| Tree::from_raw(raw, i, feature_names.len()))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            feature_names,
            base_score,
            trees,
        })
    }

    /// Load a model file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or [`Self::from_json_str`] rejects it.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path).map_err(|source| ForecastError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model = Self::from_json_str(&json)?;
        tracing::info!(
            path = %path.display(),
            trees = model.trees.len(),
            features = model.feature_names.len(),
            "Loaded regression model"
        );
        Ok(model)
    }

    /// Feature names in the order [`Self::predict`] expects them.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Number of trees in the ensemble.
    #[must_use]
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Score one feature vector. NaN entries are treated as missing.
    ///
    /// # Errors
    ///
    /// Returns `ForecastError::FeatureCount` if `features` has the wrong length.
    pub fn predict(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.feature_names.len() {
            return Err(ForecastError::FeatureCount {
                expected: self.feature_names.len(),
                got: features.len(),
            });
        }

        Ok(self.base_score
            + self
                .trees
                .iter()
                .map(|tree| tree.leaf_value(features))
                .sum::<f64>())
    }
}

/// Base scores are written as `"5E-1"` or, by newer versions, `"[5E-1]"`.
fn parse_base_score(raw: &str) -> Result<f64> {
    let trimmed = raw.trim().trim_start_matches('[').trim_end_matches(']');
    trimmed
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ForecastError::InvalidModel(format!("invalid base_score {raw:?}")))
}
