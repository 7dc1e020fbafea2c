//! Built-in match lookups of a tsvector column.
//!
//! All three share the `@@ to_tsquery(...)` predicate and differ only in how
//! the raw term is turned into a query string:
//!
//! | lookup    | `Hello world` becomes |
//! |-----------|-----------------------|
//! | `search`  | `Hello & world`       |
//! | `isearch` | `Hello \| world`      |
//! | `tsquery` | `Hello world`         |

use serde::{Deserialize, Serialize};

use crate::resolver::LookupTemplate;
use crate::types::PredicateParam;

const MATCH_TEMPLATE: &str = "{column} @@ to_tsquery('{dictionary}', {param})";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lookup {
    /// Every word must match.
    Search,
    /// Any word may match.
    ISearch,
    /// The term already is tsquery syntax.
    TsQuery,
}

impl Lookup {
    pub const ALL: [Self; 3] = [Self::Search, Self::ISearch, Self::TsQuery];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "search" => Some(Self::Search),
            "isearch" => Some(Self::ISearch),
            "tsquery" => Some(Self::TsQuery),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Search => "search",
            Self::ISearch => "isearch",
            Self::TsQuery => "tsquery",
        }
    }

    pub fn template(&self) -> LookupTemplate {
        LookupTemplate::new(self.as_str(), MATCH_TEMPLATE)
    }

    /// Turn a raw term into the bound query string.
    pub fn prepare(&self, term: &str) -> PredicateParam {
        let value = match self {
            Self::Search => join_words(term, " & "),
            Self::ISearch => join_words(term, " | "),
            Self::TsQuery => term.to_string(),
        };
        PredicateParam::new(self.as_str(), value)
    }
}

impl std::fmt::Display for Lookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn join_words(term: &str, op: &str) -> String {
    term.split_whitespace().collect::<Vec<_>>().join(op)
}
