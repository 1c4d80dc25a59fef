//! Model module - regression trees and the random forest built from them

pub mod forest;
pub mod tree;

pub use forest::*;
pub use tree::*;
