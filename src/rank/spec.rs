//! Declarative ranking requests and their attachment to a query.

use tracing::debug;

use crate::error::{RankError, Result};
use crate::query::{ComputedExpression, Filter, QueryDelta};
use crate::rank::expression::RankExpression;
use crate::resolver::ColumnResolver;
use crate::sql::{is_valid_dictionary, is_valid_identifier, quote_name};
use crate::types::{
    ColumnRef, DictionarySource, NormalizationFlag, RankVariant, LOOKUP_SEP,
};

/// "Rank this field by this term" request.
///
/// Built from a single `(lookup path, term)` pair, the path being
/// `<attribute path>[__<dictionary>]__<lookup>`:
///
/// ```
/// use tsrank::RankSpec;
///
/// let spec = RankSpec::plain_rank([1, 2], [("body__search", "Hello world")]).unwrap();
/// assert_eq!(spec.lookup(), "body");
/// assert_eq!(spec.default_alias(), "body__plainrank");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankSpec {
    variant: RankVariant,
    lookup: String,
    rhs: String,
    dictionary: Option<String>,
    match_lookup: String,
    normalization: Vec<NormalizationFlag>,
}

impl RankSpec {
    /// Build a request of any variant.
    ///
    /// `pairs` must hold exactly one `(path, term)` entry.
    pub fn new<N, I, K, V>(variant: RankVariant, normalization: N, pairs: I) -> Result<Self>
    where
        N: IntoIterator<Item = i64>,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let normalization = NormalizationFlag::parse_all(normalization)?;

        let mut pairs = pairs.into_iter();
        let (path, rhs) = match (pairs.next(), pairs.next()) {
            (Some(pair), None) => pair,
            (None, _) => {
                return Err(RankError::contract(
                    "lookup arguments",
                    format!("{variant} needs one field lookup, got none"),
                ))
            }
            (Some(_), Some(_)) => {
                return Err(RankError::contract(
                    "lookup arguments",
                    format!(
                        "too many arguments for {variant}: expected 1, got {}",
                        2 + pairs.count()
                    ),
                ))
            }
        };

        let (lookup, dictionary, match_lookup) = split_path(variant, path.as_ref())?;
        let spec = Self {
            variant,
            lookup,
            rhs: rhs.into(),
            dictionary,
            match_lookup,
            normalization,
        };
        debug!(
            variant = %spec.variant,
            lookup = %spec.lookup,
            match_lookup = %spec.match_lookup,
            dictionary = spec.dictionary.as_deref().unwrap_or("<default>"),
            "rank spec built"
        );
        Ok(spec)
    }

    /// `ts_rank` with the column's default dictionary.
    pub fn plain_rank<N, I, K, V>(normalization: N, pairs: I) -> Result<Self>
    where
        N: IntoIterator<Item = i64>,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self::new(RankVariant::PLAIN_RANK, normalization, pairs)
    }

    /// `ts_rank_cd` with the column's default dictionary.
    pub fn cover_density_rank<N, I, K, V>(normalization: N, pairs: I) -> Result<Self>
    where
        N: IntoIterator<Item = i64>,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self::new(RankVariant::COVER_DENSITY_RANK, normalization, pairs)
    }

    /// `ts_rank` with the dictionary named in the path.
    pub fn plain_rank_with_dictionary<N, I, K, V>(normalization: N, pairs: I) -> Result<Self>
    where
        N: IntoIterator<Item = i64>,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self::new(RankVariant::PLAIN_RANK_WITH_DICTIONARY, normalization, pairs)
    }

    /// `ts_rank_cd` with the dictionary named in the path.
    pub fn cover_density_rank_with_dictionary<N, I, K, V>(
        normalization: N,
        pairs: I,
    ) -> Result<Self>
    where
        N: IntoIterator<Item = i64>,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self::new(
            RankVariant::COVER_DENSITY_RANK_WITH_DICTIONARY,
            normalization,
            pairs,
        )
    }

    pub fn variant(&self) -> RankVariant {
        self.variant
    }

    /// Attribute path leading to the search-indexed column.
    pub fn lookup(&self) -> &str {
        &self.lookup
    }

    pub fn rhs(&self) -> &str {
        &self.rhs
    }

    /// Explicit dictionary; `None` means the column default is used.
    pub fn dictionary(&self) -> Option<&str> {
        self.dictionary.as_deref()
    }

    pub fn match_lookup(&self) -> &str {
        &self.match_lookup
    }

    pub fn normalization(&self) -> &[NormalizationFlag] {
        &self.normalization
    }

    /// `<attribute path>__<variant tag, lower-cased>`.
    pub fn default_alias(&self) -> String {
        format!(
            "{}{LOOKUP_SEP}{}",
            self.lookup,
            self.variant.tag().to_lowercase()
        )
    }

    /// Resolve this request against `column` and produce the query changes.
    ///
    /// Every check runs before anything is built, so an error means the
    /// caller's query is left as it was.
    pub fn attach<R>(
        &self,
        alias: Option<&str>,
        column: &ColumnRef,
        resolver: &R,
    ) -> Result<QueryDelta>
    where
        R: ColumnResolver + ?Sized,
    {
        if alias.is_some_and(str::is_empty) {
            return Err(RankError::contract("alias", "must not be empty"));
        }

        let dictionary = match &self.dictionary {
            Some(dictionary) => {
                resolver.get_transform(dictionary)?;
                dictionary.clone()
            }
            None => resolver.default_dictionary().to_string(),
        };

        let template = resolver.get_lookup(&self.match_lookup)?;
        let predicate = template.render(&column.qualified(quote_name), &dictionary);
        let param = resolver.prepare_param(&self.match_lookup, &self.rhs)?;

        let expression = RankExpression::new(
            self.variant.function,
            column.clone(),
            dictionary,
            param.clone(),
            self.normalization.clone(),
        );
        let (sql, params) = expression.as_sql(quote_name);
        let alias = alias.map_or_else(|| self.default_alias(), str::to_string);

        debug!(
            alias = %alias,
            column = %column,
            dictionary = expression.dictionary(),
            "rank attached"
        );

        Ok(QueryDelta {
            filter: Filter {
                sql: predicate,
                params: vec![param],
            },
            alias,
            computed: ComputedExpression { sql, params },
            group_by: column.clone(),
        })
    }
}

/// Split a lookup path into (attribute path, dictionary, match lookup).
fn split_path(variant: RankVariant, path: &str) -> Result<(String, Option<String>, String)> {
    let segments: Vec<&str> = path.split(LOOKUP_SEP).collect();
    let suffix = variant.suffix_segments();

    if segments.len() <= suffix {
        let shape = match variant.dictionary {
            DictionarySource::ColumnDefault => "<field>__<lookup>",
            DictionarySource::Explicit => "<field>__<dictionary>__<lookup>",
        };
        return Err(RankError::contract(
            "lookup path",
            format!("`{path}` does not match {shape} for {variant}"),
        ));
    }
    if let Some(empty) = segments.iter().position(|s| s.is_empty()) {
        return Err(RankError::contract(
            "lookup path",
            format!("`{path}` has an empty segment at position {empty}"),
        ));
    }

    let split_at = segments.len() - suffix;
    let (attribute, tail) = segments.split_at(split_at);

    let match_lookup = tail[tail.len() - 1];
    if !is_valid_identifier(match_lookup) {
        return Err(RankError::contract(
            "lookup path",
            format!("`{match_lookup}` is not a lookup name"),
        ));
    }

    let dictionary = match variant.dictionary {
        DictionarySource::ColumnDefault => None,
        DictionarySource::Explicit => {
            let dictionary = tail[0];
            if !is_valid_dictionary(dictionary) {
                return Err(RankError::contract(
                    "lookup path",
                    format!("`{dictionary}` is not a dictionary name"),
                ));
            }
            Some(dictionary.to_string())
        }
    };

    Ok((
        attribute.join(LOOKUP_SEP),
        dictionary,
        match_lookup.to_string(),
    ))
}
