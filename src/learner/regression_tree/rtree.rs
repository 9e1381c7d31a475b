use serde::{Serialize, Deserialize};

use std::fmt;

use crate::{
    LearnerError,
    Regressor,
    Sample,
};
use crate::learner::core::{Learner, check_training_sample};
use super::{
    node::Node,
    split_rule::{LR, Splitter},
};


/// The maxmial depth set as default.
pub const DEFAULT_MAX_DEPTH: usize = 2;
/// The minimal number of rows per leaf set as default.
pub const DEFAULT_MIN_LEAF: usize = 1;


/// A weighted least-squares regression tree (CART).
///
/// # Example
///
/// ```no_run
/// use ministack::prelude::*;
///
/// let tree = RegressionTree::new()
///     .max_depth(3)
///     .min_leaf(5);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    // The maximal depth of the output trees
    pub(crate) max_depth: usize,

    // The minimal number of positively-weighted rows in a leaf
    pub(crate) min_leaf: usize,
}


/// Regression Tree regressor.
/// This struct is just a wrapper of `Node`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTreeRegressor {
    root: Node,
}


impl Default for RegressionTree {
    fn default() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH, min_leaf: DEFAULT_MIN_LEAF }
    }
}


impl RegressionTree {
    /// Construct a new instance of `RegressionTree`.
    /// By default, `max_depth = 2` and `min_leaf = 1`.
    pub fn new() -> Self {
        Self::default()
    }


    /// Specify the maximal depth of the tree.
    /// A depth-1 tree is a constant.
    pub fn max_depth(mut self, depth: usize) -> Self {
        assert!(depth > 0);
        self.max_depth = depth;
        self
    }


    /// Specify the minimal number of rows in a leaf.
    pub fn min_leaf(mut self, min_leaf: usize) -> Self {
        assert!(min_leaf > 0);
        self.min_leaf = min_leaf;
        self
    }


    #[inline]
    fn full_tree(
        &self,
        sample: &Sample,
        weights: &[f64],
        indices: Vec<usize>,
        max_depth: usize,
    ) -> Node
    {
        let target = sample.target();
        let (sum_w, sum_wy) = indices.iter()
            .fold((0f64, 0f64), |(w, wy), &i| {
                (w + weights[i], wy + weights[i] * target[i])
            });
        let pred = sum_wy / sum_w;

        if max_depth <= 1 || indices.len() < 2 * self.min_leaf {
            return Node::leaf(pred);
        }

        // Find the best splitting rule.
        let rule = match self.best_split(sample, weights, &indices) {
            Some(rule) => rule,
            None => return Node::leaf(pred),
        };

        // Split the train data for left/right childrens
        let (lindices, rindices): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| rule.split(sample, i) == LR::Left);

        // If the split has no meaning, construct a leaf node.
        if lindices.is_empty() || rindices.is_empty() {
            return Node::leaf(pred);
        }

        let ltree = self.full_tree(sample, weights, lindices, max_depth-1);
        let rtree = self.full_tree(sample, weights, rindices, max_depth-1);

        Node::branch(rule, ltree, rtree)
    }


    /// Returns the split that maximizes the reduction of
    /// the weighted squared error, or `None` if no split helps.
    fn best_split(
        &self,
        sample: &Sample,
        weights: &[f64],
        indices: &[usize],
    ) -> Option<Splitter>
    {
        let target = sample.target();
        let (total_w, total_wy) = indices.iter()
            .fold((0f64, 0f64), |(w, wy), &i| {
                (w + weights[i], wy + weights[i] * target[i])
            });
        let base = total_wy.powi(2) / total_w;

        let mut best: Option<(f64, Splitter)> = None;
        for feature in sample.features() {
            let mut sorted = indices.to_vec();
            sorted.sort_by(|&a, &b| feature[a].total_cmp(&feature[b]));

            let mut left_w = 0f64;
            let mut left_wy = 0f64;
            for (k, pair) in sorted.windows(2).enumerate() {
                let (i, j) = (pair[0], pair[1]);
                left_w += weights[i];
                left_wy += weights[i] * target[i];

                let n_left = k + 1;
                let n_right = sorted.len() - n_left;
                if feature[i] == feature[j]
                    || n_left < self.min_leaf
                    || n_right < self.min_leaf
                {
                    continue;
                }
                let right_w = total_w - left_w;
                if left_w <= 0.0 || right_w <= 0.0 { continue; }

                let right_wy = total_wy - left_wy;
                let gain = left_wy.powi(2) / left_w
                    + right_wy.powi(2) / right_w
                    - base;
                if gain > best.as_ref().map(|b| b.0).unwrap_or(1e-12) {
                    let threshold = 0.5 * (feature[i] + feature[j]);
                    best = Some((gain, Splitter::new(feature.name(), threshold)));
                }
            }
        }
        best.map(|(_, rule)| rule)
    }
}


impl Learner for RegressionTree {
    type Model = RegressionTreeRegressor;


    fn name(&self) -> String {
        format!("Tree(depth={})", self.max_depth)
    }


    fn fit(&self, sample: &Sample, weights: &[f64])
        -> Result<Self::Model, LearnerError>
    {
        check_training_sample(sample, weights)?;

        let indices = (0..sample.shape().0)
            .filter(|&i| weights[i] > 0.0)
            .collect::<Vec<usize>>();

        let root = self.full_tree(sample, weights, indices, self.max_depth);
        Ok(RegressionTreeRegressor { root })
    }
}


impl RegressionTreeRegressor {
    /// Returns the number of leaves.
    pub fn n_leaves(&self) -> usize {
        self.root.n_leaves()
    }
}


impl Regressor for RegressionTreeRegressor {
    fn predict(&self, sample: &Sample, row: usize) -> f64 {
        self.root.predict(sample, row)
    }
}


impl fmt::Display for RegressionTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\
            ----------\n\
            # Regression Tree Learner\n\n\
            - Max depth: {}\n\
            - Min leaf:  {}\n\
            ----------\
            ",
            self.max_depth,
            self.min_leaf,
        )
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::Feature;

    #[test]
    fn test_step_function() {
        let x = vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![1.0, 1.0, 1.0, 4.0, 4.0, 4.0];
        let sample = Sample::from_columns(
            vec![Feature::from_values("x", x)], y.clone(),
        ).unwrap();

        let model = RegressionTree::new()
            .max_depth(2)
            .fit(&sample, &[1.0; 6])
            .unwrap();
        assert_eq!(model.n_leaves(), 2);
        assert_eq!(model.predict_all(&sample), y);
    }

    #[test]
    fn test_depth_one_is_weighted_mean() {
        let sample = Sample::from_columns(
            vec![Feature::from_values("x", vec![0.0, 1.0])], vec![0.0, 3.0],
        ).unwrap();
        let model = RegressionTree::new()
            .max_depth(1)
            .fit(&sample, &[2.0, 1.0])
            .unwrap();
        assert_eq!(model.predict(&sample, 0), 1.0);
    }
}
