//! tsrank — full-text ranking expressions for relational queries.
//!
//! Turns "rank this field by this term" requests into the `@@` match
//! predicate, the `ts_rank` / `ts_rank_cd` projection and the GROUP BY entry
//! a PostgreSQL query needs to carry them.

pub mod cli;
pub mod config;
pub mod error;
pub mod lookups;
pub mod observability;
pub mod query;
pub mod rank;
pub mod resolver;
pub mod sql;
pub mod types;

pub use config::SearchSchema;
pub use error::{ErrorKind, RankError, Result};
pub use query::{CompiledQuery, Query, QueryDelta};
pub use rank::{RankExpression, RankSpec};
pub use resolver::{ColumnResolver, LookupTemplate};
pub use types::{ColumnRef, NormalizationFlag, PredicateParam, RankFunction, RankVariant};
