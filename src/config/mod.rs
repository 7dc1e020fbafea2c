//! Search schema: YAML declaration of tsvector columns and the resolver built on it.

pub mod resolver;
pub mod schema;

pub use resolver::{ColumnSchemaResolver, ResolvedColumn};
pub use schema::{ColumnSchema, ModelSchema, RelationSchema, SearchSchema};
