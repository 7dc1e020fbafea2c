//! Ranking expressions and the declarative requests that build them.

pub mod expression;
pub mod spec;

pub use expression::{normalization_suffix, RankExpression};
pub use spec::RankSpec;
