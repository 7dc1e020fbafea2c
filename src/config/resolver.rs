//! Attribute-path resolution against a [`SearchSchema`].

use crate::config::schema::{ColumnSchema, SearchSchema};
use crate::error::{RankError, Result};
use crate::lookups::Lookup;
use crate::query::Join;
use crate::resolver::{ColumnResolver, LookupTemplate};
use crate::types::{ColumnRef, PredicateParam, LOOKUP_SEP};

/// A tsvector column found by [`SearchSchema::resolve`].
#[derive(Debug, Clone)]
pub struct ResolvedColumn {
    pub column: ColumnRef,
    /// Joins needed to reach the column from the starting model, in order.
    pub joins: Vec<Join>,
    pub resolver: ColumnSchemaResolver,
}

/// [`ColumnResolver`] backed by a column declaration.
#[derive(Debug, Clone)]
pub struct ColumnSchemaResolver {
    column: ColumnRef,
    default_dictionary: String,
    dictionaries: Vec<String>,
    lookups: Vec<Lookup>,
}

impl ColumnSchemaResolver {
    pub fn new(column: ColumnRef, schema: &ColumnSchema, fallback_dictionary: &str) -> Self {
        Self {
            column,
            default_dictionary: schema
                .dictionary
                .clone()
                .unwrap_or_else(|| fallback_dictionary.to_string()),
            dictionaries: schema.dictionaries.clone(),
            lookups: schema.enabled_lookups(),
        }
    }

    fn lookup(&self, name: &str) -> Result<Lookup> {
        Lookup::from_name(name)
            .filter(|lookup| self.lookups.contains(lookup))
            .ok_or_else(|| RankError::UnknownLookup {
                lookup: name.to_string(),
                column: self.column.to_string(),
            })
    }
}

impl ColumnResolver for ColumnSchemaResolver {
    fn get_transform(&self, dictionary: &str) -> Result<()> {
        if dictionary == self.default_dictionary || self.dictionaries.iter().any(|d| d == dictionary)
        {
            Ok(())
        } else {
            Err(RankError::UnknownDictionary {
                dictionary: dictionary.to_string(),
                column: self.column.to_string(),
            })
        }
    }

    fn get_lookup(&self, name: &str) -> Result<LookupTemplate> {
        self.lookup(name).map(|lookup| lookup.template())
    }

    fn prepare_param(&self, lookup: &str, value: &str) -> Result<PredicateParam> {
        self.lookup(lookup).map(|lookup| lookup.prepare(value))
    }

    fn default_dictionary(&self) -> &str {
        &self.default_dictionary
    }
}

impl SearchSchema {
    /// Follow `path` (`relation__...__column`) from `model` to a tsvector column.
    pub fn resolve(&self, model: &str, path: &str) -> Result<ResolvedColumn> {
        let unresolved = |reason: String| RankError::Unresolved {
            model: model.to_string(),
            path: path.to_string(),
            reason,
        };

        let segments: Vec<&str> = path.split(LOOKUP_SEP).collect();
        let Some((column_name, relations)) = segments.split_last() else {
            return Err(unresolved("empty path".to_string()));
        };

        let mut current = model;
        let mut joins = Vec::new();
        for relation_name in relations {
            let schema = self
                .model(current)
                .ok_or_else(|| unresolved(format!("unknown model `{current}`")))?;
            let relation = schema.relations.get(*relation_name).ok_or_else(|| {
                unresolved(format!("`{current}` has no relation `{relation_name}`"))
            })?;
            let from_table = self.table_of(current).unwrap_or(current);
            let to_table = self.table_of(&relation.model).unwrap_or(&relation.model);
            joins.push(Join {
                table: to_table.to_string(),
                left: ColumnRef::table_column(from_table, relation.column.as_str()),
                right: ColumnRef::table_column(to_table, relation.target_column.as_str()),
            });
            current = &relation.model;
        }

        let schema = self
            .model(current)
            .ok_or_else(|| unresolved(format!("unknown model `{current}`")))?;
        let column_schema = schema.columns.get(*column_name).ok_or_else(|| {
            unresolved(format!("`{current}` has no search column `{column_name}`"))
        })?;

        let table = self.table_of(current).unwrap_or(current);
        let column = ColumnRef::table_column(table, *column_name);
        let resolver =
            ColumnSchemaResolver::new(column.clone(), column_schema, &self.default_dictionary);

        Ok(ResolvedColumn {
            column,
            joins,
            resolver,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn schema() -> SearchSchema {
        SearchSchema::from_yaml_str(
            r#"
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
      bio:
        dictionary: portuguese
"#,
        )
        .unwrap()
    }

    #[test]
    fn resolves_local_column() {
        let resolved = schema().resolve("article", "body").unwrap();
        assert_eq!(resolved.column, ColumnRef::table_column("blog_article", "body"));
        assert!(resolved.joins.is_empty());
        assert_eq!(resolved.resolver.default_dictionary(), "english");
    }

    #[test]
    fn resolves_related_column_with_join() {
        let resolved = schema().resolve("article", "author__bio").unwrap();
        assert_eq!(resolved.column, ColumnRef::table_column("author", "bio"));
        assert_eq!(
            resolved.joins,
            vec![Join {
                table: "author".into(),
                left: ColumnRef::table_column("blog_article", "author_id"),
                right: ColumnRef::table_column("author", "id"),
            }]
        );
        assert_eq!(resolved.resolver.default_dictionary(), "portuguese");
    }

    #[test]
    fn unresolvable_paths_are_configuration_errors() {
        let schema = schema();
        for (model, path) in [
            ("article", "summary"),
            ("article", "editor__bio"),
            ("comment", "body"),
        ] {
            let err = schema.resolve(model, path).unwrap_err();
            assert!(err.is_configuration(), "{model}/{path}: {err}");
        }
    }

    #[test]
    fn transforms_accept_default_and_declared_dictionaries() {
        let resolver = schema().resolve("article", "body").unwrap().resolver;
        assert!(resolver.get_transform("english").is_ok());
        assert!(resolver.get_transform("portuguese").is_ok());
        let err = resolver.get_transform("german").unwrap_err();
        assert!(matches!(err, RankError::UnknownDictionary { .. }));
        assert!(err.to_string().contains("\"blog_article\".\"body\""));
    }

    #[test]
    fn disabled_lookups_are_rejected() {
        let resolver = schema().resolve("article", "title").unwrap().resolver;
        assert!(resolver.get_lookup("search").is_ok());
        assert!(matches!(
            resolver.get_lookup("isearch"),
            Err(RankError::UnknownLookup { .. })
        ));
        assert!(resolver.prepare_param("tsquery", "a").is_err());
    }

    #[test]
    fn prepare_param_uses_lookup_rules() {
        let resolver = schema().resolve("article", "body").unwrap().resolver;
        let param = resolver.prepare_param("isearch", "red green").unwrap();
        assert_eq!(param.value(), "red | green");
    }
}
