//! Gradient-boosted decision tree ensembles
//!
//! The layout mirrors a multiclass boosting dump: every tree contributes a
//! leaf value to the margin of one class, margins start at `base_score`, and
//! probabilities are the softmax of the margins.

use crate::predictor::{argmax, check_finite, check_width, softmax, FeatureBatch, Predictor, ProbabilityError};
use serde::{Deserialize, Serialize};
use signalserve_core::{Error, Result};

/// A boosted ensemble of regression trees
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEnsemble {
    /// Row width the trees were trained on
    pub n_features: usize,

    /// Number of output classes
    pub n_classes: usize,

    /// Initial margin for every class
    #[serde(default)]
    pub base_score: f64,

    /// Trees in boosting order
    pub trees: Vec<Tree>,
}

/// One regression tree attached to a class
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    /// Class whose margin this tree adds to
    pub class: usize,

    /// Flat node list, root at index 0
    pub nodes: Vec<TreeNode>,
}

/// A node in a flattened tree
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Rows with `x[feature] < threshold` go to `yes`, the rest to `no`
    Split {
        feature: usize,
        threshold: f64,
        yes: usize,
        no: usize,
    },

    /// Terminal margin contribution
    Leaf { value: f64 },
}

impl Tree {
    fn validate(&self, tree_index: usize, n_features: usize, n_classes: usize) -> Result<()> {
        if self.class >= n_classes {
            return Err(Error::artifact(format!(
                "tree {} targets class {} but the ensemble has {} classes",
                tree_index, self.class, n_classes
            )));
        }
        if self.nodes.is_empty() {
            return Err(Error::artifact(format!("tree {} has no nodes", tree_index)));
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split { feature, yes, no, .. } = node {
                if *feature >= n_features {
                    return Err(Error::artifact(format!(
                        "tree {} node {} splits on feature {} (only {} features)",
                        tree_index, i, feature, n_features
                    )));
                }
                // Children must come after their parent so traversal always terminates.
                for child in [*yes, *no] {
                    if child <= i || child >= self.nodes.len() {
                        return Err(Error::artifact(format!(
                            "tree {} node {} has invalid child {}",
                            tree_index, i, child
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn leaf_value(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    yes,
                    no,
                } => {
                    index = if row[*feature] < *threshold { *yes } else { *no };
                }
            }
        }
    }
}

impl TreeEnsemble {
    /// Check class and node references of every tree
    pub fn validate(&self) -> Result<()> {
        if self.n_features == 0 {
            return Err(Error::artifact("tree_ensemble declares zero features"));
        }
        if self.n_classes < 2 {
            return Err(Error::artifact("tree_ensemble needs at least two classes"));
        }
        if self.trees.is_empty() {
            return Err(Error::artifact("tree_ensemble has no trees"));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(i, self.n_features, self.n_classes)?;
        }
        Ok(())
    }

    /// Per-class raw margins for one row of the ensemble's width
    pub fn margins(&self, row: &[f64]) -> Result<Vec<f64>> {
        check_width(row, self.n_features)?;

        let mut margins = vec![self.base_score; self.n_classes];
        for tree in &self.trees {
            margins[tree.class] += tree.leaf_value(row);
        }
        check_finite(&margins, "margin").map_err(Error::model_contract)?;
        Ok(margins)
    }
}

impl Predictor for TreeEnsemble {
    fn predict_class(&self, batch: &FeatureBatch<'_>) -> Result<Vec<usize>> {
        batch
            .rows()
            .iter()
            .map(|row| {
                Ok(argmax(&self.margins(row)?))
            })
            .collect()
    }

    fn predict_probabilities(
        &self,
        batch: &FeatureBatch<'_>,
    ) -> std::result::Result<Vec<Vec<f64>>, ProbabilityError> {
        batch
            .rows()
            .iter()
            .map(|row| {
                let margins = self
                    .margins(row)
                    .map_err(|e| ProbabilityError::Failed(e.to_string()))?;
                let probabilities = softmax(&margins);
                check_finite(&probabilities, "probability").map_err(ProbabilityError::Failed)?;
                Ok(probabilities)
            })
            .collect()
    }

    fn model_type(&self) -> &str {
        "tree_ensemble"
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.n_features)
    }

    fn n_classes(&self) -> Option<usize> {
        Some(self.n_classes)
    }
}
