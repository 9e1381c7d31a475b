//! Defines the inner representation
//! of the Regression Tree class.
use serde::{Serialize, Deserialize};

use crate::Sample;
use super::split_rule::{LR, Splitter};


/// Enumeration of `BranchNode` and `LeafNode`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// A node that have two childrens.
    Branch(BranchNode),


    /// A node that have no child.
    Leaf(LeafNode),
}


/// Represents the branch nodes of regression tree.
/// Each `BranchNode` must have two childrens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchNode {
    pub(super) rule: Splitter,
    pub(super) left: Box<Node>,
    pub(super) right: Box<Node>,
}


/// Represents the leaf nodes of regression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafNode {
    pub(super) prediction: f64,
}


impl Node {
    #[inline]
    pub(super) fn leaf(prediction: f64) -> Self {
        Self::Leaf(LeafNode { prediction })
    }


    #[inline]
    pub(super) fn branch(rule: Splitter, left: Node, right: Node) -> Self {
        Self::Branch(BranchNode {
            rule,
            left: Box::new(left),
            right: Box::new(right),
        })
    }


    /// Returns the predicted value for the `row`-th instance.
    #[inline]
    pub(crate) fn predict(&self, sample: &Sample, row: usize) -> f64 {
        match self {
            Node::Branch(ref node) => match node.rule.split(sample, row) {
                LR::Left => node.left.predict(sample, row),
                LR::Right => node.right.predict(sample, row),
            },
            Node::Leaf(ref node) => node.prediction,
        }
    }


    /// Returns the number of leaves.
    pub(crate) fn n_leaves(&self) -> usize {
        match self {
            Node::Branch(node) => node.left.n_leaves() + node.right.n_leaves(),
            Node::Leaf(_) => 1,
        }
    }
}
