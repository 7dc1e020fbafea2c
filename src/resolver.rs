//! The column capabilities a ranking request needs from the host schema.

use crate::error::Result;
use crate::types::{PredicateParam, PLACEHOLDER};

/// A parameterised match predicate exposed by a column lookup.
///
/// The template uses three markers: `{column}` for the quoted column,
/// `{dictionary}` for the search configuration and `{param}` for the bound
/// term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTemplate {
    pub name: String,
    pub sql: String,
}

impl LookupTemplate {
    pub fn new(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql: sql.into(),
        }
    }

    /// Render with a driver placeholder in place of the term.
    pub fn render(&self, column_sql: &str, dictionary: &str) -> String {
        self.sql
            .replace("{column}", column_sql)
            .replace("{dictionary}", dictionary)
            .replace("{param}", PLACEHOLDER)
    }
}

/// Search capabilities of one resolved, search-indexed column.
pub trait ColumnResolver {
    /// Check that `dictionary` is a transform registered on the column.
    fn get_transform(&self, dictionary: &str) -> Result<()>;

    /// Match predicate for the lookup called `name`.
    fn get_lookup(&self, name: &str) -> Result<LookupTemplate>;

    /// Coerce the raw search term into the value bound for `lookup`.
    fn prepare_param(&self, lookup: &str, value: &str) -> Result<PredicateParam>;

    /// Search configuration used when a request names none.
    fn default_dictionary(&self) -> &str;
}
