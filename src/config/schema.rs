//! Search schema data structures for tsrank.
//!
//! Defines the YAML format that declares which model columns carry a
//! tsvector, which dictionaries each one accepts, and how models relate to
//! each other.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use tracing::debug;

use crate::error::{RankError, Result};
use crate::lookups::Lookup;
use crate::sql::{is_valid_dictionary, is_valid_identifier};

// ---------------------------------------------------------------------------
// Top-level schema
// ---------------------------------------------------------------------------

/// Root search schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSchema {
    /// Schema format version (currently "1.0").
    #[serde(default = "default_version")]
    pub version: String,

    /// Dictionary used by columns that declare none.
    #[serde(default = "default_dictionary")]
    pub default_dictionary: String,

    /// Models by name.
    #[serde(default)]
    pub models: BTreeMap<String, ModelSchema>,
}

impl Default for SearchSchema {
    fn default() -> Self {
        Self {
            version: default_version(),
            default_dictionary: default_dictionary(),
            models: BTreeMap::new(),
        }
    }
}

impl SearchSchema {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let schema: Self = serde_yaml::from_str(yaml)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Read, parse and validate a schema file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let schema = Self::from_yaml_str(&text)?;
        debug!(path = %path.display(), models = schema.models.len(), "search schema loaded");
        Ok(schema)
    }

    pub fn model(&self, name: &str) -> Option<&ModelSchema> {
        self.models.get(name)
    }

    /// Physical table of a model (the model name unless overridden).
    pub fn table_of<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        self.models
            .get(name)
            .map(|m| m.table.as_deref().unwrap_or(name))
    }

    /// Check names and cross references.
    pub fn validate(&self) -> Result<()> {
        if !is_valid_dictionary(&self.default_dictionary) {
            return Err(RankError::Schema(format!(
                "default dictionary `{}` is not a valid name",
                self.default_dictionary
            )));
        }

        for (model_name, model) in &self.models {
            check_identifier("model", model_name)?;
            if let Some(table) = &model.table {
                check_identifier("table", table)?;
            }

            for (column_name, column) in &model.columns {
                check_identifier("column", column_name)?;
                let declared = column.dictionary.iter().chain(&column.dictionaries);
                for dictionary in declared {
                    if !is_valid_dictionary(dictionary) {
                        return Err(RankError::Schema(format!(
                            "dictionary `{dictionary}` on {model_name}.{column_name} is not a valid name"
                        )));
                    }
                }
                if matches!(&column.lookups, Some(lookups) if lookups.is_empty()) {
                    return Err(RankError::Schema(format!(
                        "{model_name}.{column_name} declares an empty lookup list"
                    )));
                }
            }

            for (relation_name, relation) in &model.relations {
                check_identifier("relation", relation_name)?;
                check_identifier("column", &relation.column)?;
                check_identifier("column", &relation.target_column)?;
                if !self.models.contains_key(&relation.model) {
                    return Err(RankError::Schema(format!(
                        "relation {model_name}.{relation_name} points to unknown model `{}`",
                        relation.model
                    )));
                }
            }
        }
        Ok(())
    }
}

fn check_identifier(kind: &str, name: &str) -> Result<()> {
    if is_valid_identifier(name) {
        Ok(())
    } else {
        Err(RankError::Schema(format!("{kind} name `{name}` is not a valid identifier")))
    }
}

// ---------------------------------------------------------------------------
// ModelSchema
// ---------------------------------------------------------------------------

/// One model (table) and its searchable columns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelSchema {
    /// Physical table name; defaults to the model name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    /// tsvector columns by name.
    #[serde(default)]
    pub columns: BTreeMap<String, ColumnSchema>,

    /// Forward relations by attribute name.
    #[serde(default)]
    pub relations: BTreeMap<String, RelationSchema>,
}

// ---------------------------------------------------------------------------
// ColumnSchema
// ---------------------------------------------------------------------------

/// A tsvector column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Default dictionary; falls back to the schema default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dictionary: Option<String>,

    /// Additional dictionaries a request may name explicitly.
    #[serde(default)]
    pub dictionaries: Vec<String>,

    /// Enabled match lookups; all built-in lookups when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lookups: Option<Vec<Lookup>>,
}

impl ColumnSchema {
    pub fn enabled_lookups(&self) -> Vec<Lookup> {
        self.lookups
            .clone()
            .unwrap_or_else(|| Lookup::ALL.to_vec())
    }
}

// ---------------------------------------------------------------------------
// RelationSchema
// ---------------------------------------------------------------------------

/// Foreign key from this model to another one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationSchema {
    /// Target model name.
    pub model: String,

    /// Referencing column on this model's table.
    pub column: String,

    /// Referenced column on the target table.
    #[serde(default = "default_target_column")]
    pub target_column: String,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_version() -> String {
    "1.0".to_string()
}

fn default_dictionary() -> String {
    "english".to_string()
}

fn default_target_column() -> String {
    "id".to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    const BLOG: &str = r#"
version: "1.0"
default_dictionary: english
models:
  article:
    table: blog_article
    columns:
      body:
        dictionaries: [portuguese]
      title:
        dictionary: simple
        lookups: [search]
    relations:
      author:
        model: author
        column: author_id
  author:
    columns:
      bio: {}
"#;

    #[test]
    fn test_default_schema() {
        let schema = SearchSchema::default();
        assert_eq!(schema.version, "1.0");
        assert_eq!(schema.default_dictionary, "english");
        assert!(schema.models.is_empty());
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let schema = SearchSchema::from_yaml_str("{}").unwrap();
        assert_eq!(schema.default_dictionary, "english");
    }

    #[test]
    fn test_full_yaml_schema() {
        let schema = SearchSchema::from_yaml_str(BLOG).unwrap();
        assert_eq!(schema.table_of("article"), Some("blog_article"));
        assert_eq!(schema.table_of("author"), Some("author"));
        assert_eq!(schema.table_of("missing"), None);

        let article = schema.model("article").unwrap();
        assert_eq!(article.columns["body"].dictionaries, ["portuguese"]);
        assert_eq!(article.columns["body"].enabled_lookups(), Lookup::ALL.to_vec());
        assert_eq!(article.columns["title"].enabled_lookups(), vec![Lookup::Search]);
        assert_eq!(article.relations["author"].target_column, "id");
    }

    #[test]
    fn test_invalid_yaml_returns_error() {
        let err = SearchSchema::from_yaml_str("{{invalid yaml}}").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }

    #[test]
    fn test_yaml_roundtrip() {
        let schema = SearchSchema::from_yaml_str(BLOG).unwrap();
        let yaml = serde_yaml::to_string(&schema).unwrap();
        let back = SearchSchema::from_yaml_str(&yaml).unwrap();
        assert_eq!(back.models.len(), 2);
        assert_eq!(back.table_of("article"), Some("blog_article"));
    }

    #[test_case("default_dictionary: \"en'glish\"" ; "bad default dictionary")]
    #[test_case("models: {\"bad model\": {}}" ; "bad model name")]
    #[test_case("models: {a: {table: \"x.y\"}}" ; "bad table name")]
    #[test_case("models: {a: {columns: {b: {dictionaries: [\"x;\"]}}}}" ; "bad dictionary")]
    #[test_case("models: {a: {columns: {b: {lookups: []}}}}" ; "empty lookups")]
    #[test_case("models: {a: {relations: {r: {model: nowhere, column: r_id}}}}" ; "dangling relation")]
    fn invalid_schemas_are_rejected(yaml: &str) {
        let err = SearchSchema::from_yaml_str(yaml).unwrap_err();
        assert!(err.is_configuration(), "{err}");
    }

    #[test]
    fn unknown_lookup_name_fails_to_parse() {
        let yaml = "models: {a: {columns: {b: {lookups: [contains]}}}}";
        assert!(SearchSchema::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("search.yaml");
        std::fs::write(&path, BLOG).unwrap();
        let schema = SearchSchema::load(&path).unwrap();
        assert!(schema.model("author").is_some());
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SearchSchema::load(dir.path().join("nope.yaml")).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Io);
    }
}
