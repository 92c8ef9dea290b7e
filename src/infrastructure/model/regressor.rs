//! Regressors that can be evaluated from a serialized artifact

use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Child index marking a leaf
pub const TREE_LEAF: i64 = -1;

/// A fitted regression tree stored as parallel node arrays
///
/// Node `i` is a leaf when `children_left[i] == -1`; otherwise a sample goes
/// left when `x[feature[i]] <= threshold[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

impl DecisionTree {
    /// A single-node tree that always returns `value`
    pub fn leaf(value: f64) -> Self {
        Self {
            children_left: vec![TREE_LEAF],
            children_right: vec![TREE_LEAF],
            feature: vec![-2],
            threshold: vec![-2.0],
            value: vec![value],
        }
    }

    pub fn node_count(&self) -> usize {
        self.value.len()
    }

    fn validate(&self, index: usize, n_features: usize) -> Result<(), DomainError> {
        let n = self.node_count();
        let fail = |reason: String| DomainError::artifact(format!("Tree {}: {}", index, reason));

        if n == 0 {
            return Err(fail("has no nodes".to_string()));
        }

        if self.children_left.len() != n
            || self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
        {
            return Err(fail("node arrays differ in length".to_string()));
        }

        for node in 0..n {
            let left = self.children_left[node];
            let right = self.children_right[node];

            if left == TREE_LEAF {
                if right != TREE_LEAF {
                    return Err(fail(format!("node {} has only one child", node)));
                }
                if !self.value[node].is_finite() {
                    return Err(fail(format!("leaf {} has a non-finite value", node)));
                }
                continue;
            }

            // Children must point forward so traversal always terminates
            for child in [left, right] {
                if child <= node as i64 || child >= n as i64 {
                    return Err(fail(format!(
                        "node {} links to invalid child {}",
                        node, child
                    )));
                }
            }

            let feature = self.feature[node];
            if feature < 0 || feature >= n_features as i64 {
                return Err(fail(format!(
                    "node {} splits on feature {} but the schema has {}",
                    node, feature, n_features
                )));
            }

            if !self.threshold[node].is_finite() {
                return Err(fail(format!("node {} has a non-finite threshold", node)));
            }
        }

        Ok(())
    }

    fn predict(&self, row: &[f64]) -> f64 {
        let mut node = 0usize;

        loop {
            let left = self.children_left[node];
            if left == TREE_LEAF {
                return self.value[node];
            }

            let feature = self.feature[node] as usize;
            node = if row[feature] <= self.threshold[node] {
                left as usize
            } else {
                self.children_right[node] as usize
            };
        }
    }
}

/// Serialized regressor, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Regressor {
    /// Average of the tree outputs
    RandomForest { trees: Vec<DecisionTree> },
    /// `intercept + sum(coefficients[i] * x[i])`
    Linear {
        coefficients: Vec<f64>,
        intercept: f64,
    },
}

impl Regressor {
    pub fn kind(&self) -> &'static str {
        match self {
            Regressor::RandomForest { .. } => "random_forest",
            Regressor::Linear { .. } => "linear",
        }
    }

    /// Checks the regressor can be evaluated on rows of `n_features` values
    pub fn validate(&self, n_features: usize) -> Result<(), DomainError> {
        match self {
            Regressor::RandomForest { trees } => {
                if trees.is_empty() {
                    return Err(DomainError::artifact("Random forest has no trees"));
                }

                trees
                    .iter()
                    .enumerate()
                    .try_for_each(|(i, tree)| tree.validate(i, n_features))
            }
            Regressor::Linear {
                coefficients,
                intercept,
            } => {
                if coefficients.len() != n_features {
                    return Err(DomainError::artifact(format!(
                        "Linear model has {} coefficients for {} features",
                        coefficients.len(),
                        n_features
                    )));
                }

                if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
                    return Err(DomainError::artifact(
                        "Linear model parameters must be finite",
                    ));
                }

                Ok(())
            }
        }
    }

    /// Evaluates a validated regressor
    pub fn predict(&self, row: &[f64]) -> f64 {
        match self {
            Regressor::RandomForest { trees } => {
                let sum: f64 = trees.iter().map(|tree| tree.predict(row)).sum();
                sum / trees.len() as f64
            }
            Regressor::Linear {
                coefficients,
                intercept,
            } => {
                intercept
                    + coefficients
                        .iter()
                        .zip(row)
                        .map(|(c, x)| c * x)
                        .sum::<f64>()
            }
        }
    }
}
