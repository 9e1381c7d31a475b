//! Defines Regression Tree.

mod node;
mod split_rule;
mod rtree;


pub use rtree::{
    RegressionTree,
    RegressionTreeRegressor,
    DEFAULT_MAX_DEPTH,
    DEFAULT_MIN_LEAF,
};
