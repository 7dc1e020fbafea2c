//! Core domain types for tsrank.
//!
//! The ranking variants are modelled on two independent axes: which engine
//! ranking function is called ([`RankFunction`]) and where the search
//! configuration comes from ([`DictionarySource`]).

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{RankError, Result};
use crate::sql::quote_name;

/// Separator between segments of a lookup path (`body__english__search`).
pub const LOOKUP_SEP: &str = "__";

/// Positional parameter marker understood by the target driver.
pub const PLACEHOLDER: &str = "%s";

// ---------------------------------------------------------------------------
// RankFunction
// ---------------------------------------------------------------------------

/// Ranking functions provided by the text-search engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RankFunction {
    /// `ts_rank`: frequency of matching lexemes.
    Plain,
    /// `ts_rank_cd`: cover density, rewards lexemes that appear close together.
    CoverDensity,
}

impl RankFunction {
    /// SQL name of the function.
    pub fn sql_name(&self) -> &'static str {
        match self {
            Self::Plain => "ts_rank",
            Self::CoverDensity => "ts_rank_cd",
        }
    }
}

impl std::fmt::Display for RankFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.sql_name())
    }
}

// ---------------------------------------------------------------------------
// DictionarySource
// ---------------------------------------------------------------------------

/// Where the search configuration of a ranking request comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DictionarySource {
    /// Use the column's declared default dictionary.
    ColumnDefault,
    /// The dictionary is the second-to-last segment of the lookup path.
    Explicit,
}

// ---------------------------------------------------------------------------
// RankVariant
// ---------------------------------------------------------------------------

/// One of the four ranking requests (function x dictionary source).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RankVariant {
    pub function: RankFunction,
    pub dictionary: DictionarySource,
}

impl RankVariant {
    pub const PLAIN_RANK: Self = Self::new(RankFunction::Plain, DictionarySource::ColumnDefault);
    pub const COVER_DENSITY_RANK: Self =
        Self::new(RankFunction::CoverDensity, DictionarySource::ColumnDefault);
    pub const PLAIN_RANK_WITH_DICTIONARY: Self =
        Self::new(RankFunction::Plain, DictionarySource::Explicit);
    pub const COVER_DENSITY_RANK_WITH_DICTIONARY: Self =
        Self::new(RankFunction::CoverDensity, DictionarySource::Explicit);

    pub const fn new(function: RankFunction, dictionary: DictionarySource) -> Self {
        Self {
            function,
            dictionary,
        }
    }

    /// Variant name; its lower-cased form suffixes the default alias.
    pub fn tag(&self) -> &'static str {
        match (self.function, self.dictionary) {
            (RankFunction::Plain, DictionarySource::ColumnDefault) => "PlainRank",
            (RankFunction::CoverDensity, DictionarySource::ColumnDefault) => "CoverDensityRank",
            (RankFunction::Plain, DictionarySource::Explicit) => "PlainRankWithDictionary",
            (RankFunction::CoverDensity, DictionarySource::Explicit) => {
                "CoverDensityRankWithDictionary"
            }
        }
    }

    /// Number of trailing path segments that are not part of the attribute path.
    pub fn suffix_segments(&self) -> usize {
        match self.dictionary {
            DictionarySource::ColumnDefault => 1,
            DictionarySource::Explicit => 2,
        }
    }
}

impl std::fmt::Display for RankVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

// ---------------------------------------------------------------------------
// ColumnRef
// ---------------------------------------------------------------------------

/// A qualified column identifier, e.g. `["blog_article", "body"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnRef(Vec<String>);

impl ColumnRef {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    pub fn table_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self(vec![table.into(), column.into()])
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }

    /// Quote every part with `quote` and join them with `.`.
    pub fn qualified<Q>(&self, quote: Q) -> String
    where
        Q: Fn(&str) -> String,
    {
        self.0
            .iter()
            .map(|part| quote(part))
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.qualified(quote_name))
    }
}

// ---------------------------------------------------------------------------
// NormalizationFlag
// ---------------------------------------------------------------------------

/// A rank normalization option. Options are bit flags OR-ed together by the
/// engine; values outside the known set are passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizationFlag(u8);

impl NormalizationFlag {
    /// Ignore document length.
    pub const NONE: Self = Self(0);
    /// Divide by 1 + log of the document length.
    pub const LOG_LENGTH: Self = Self(1);
    /// Divide by the document length.
    pub const LENGTH: Self = Self(2);
    /// Divide by the mean harmonic distance between extents (`ts_rank_cd` only).
    pub const HARMONIC_DISTANCE: Self = Self(4);
    /// Divide by the number of unique words.
    pub const UNIQUE_WORDS: Self = Self(8);
    /// Divide by 1 + log of the number of unique words.
    pub const LOG_UNIQUE_WORDS: Self = Self(16);
    /// Divide by itself + 1.
    pub const SELF_PLUS_ONE: Self = Self(32);

    pub const fn new(value: u8) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Validate a list of raw integers.
    pub fn parse_all<I>(values: I) -> Result<Vec<Self>>
    where
        I: IntoIterator<Item = i64>,
    {
        values.into_iter().map(Self::try_from).collect()
    }
}

impl TryFrom<i64> for NormalizationFlag {
    type Error = RankError;

    fn try_from(value: i64) -> Result<Self> {
        u8::try_from(value).map(Self).map_err(|_| {
            RankError::contract(
                "normalization",
                format!("{value} is not a small non-negative integer"),
            )
        })
    }
}

impl From<u8> for NormalizationFlag {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for NormalizationFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// PredicateParam
// ---------------------------------------------------------------------------

/// The bound value of a text-search predicate.
///
/// Produced by a column resolver for one lookup and handed, unchanged, both to
/// the row filter and to the ranking call so that both evaluate the same
/// query. Callers cannot build one from a raw string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PredicateParam {
    lookup: String,
    value: String,
}

impl PredicateParam {
    pub(crate) fn new(lookup: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            lookup: lookup.into(),
            value: value.into(),
        }
    }

    /// Lookup this value was prepared for.
    pub fn lookup(&self) -> &str {
        &self.lookup
    }

    /// Driver-ready value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(RankVariant::PLAIN_RANK, "PlainRank", 1 ; "plain")]
    #[test_case(RankVariant::COVER_DENSITY_RANK, "CoverDensityRank", 1 ; "cover density")]
    #[test_case(RankVariant::PLAIN_RANK_WITH_DICTIONARY, "PlainRankWithDictionary", 2 ; "plain dictionary")]
    #[test_case(RankVariant::COVER_DENSITY_RANK_WITH_DICTIONARY, "CoverDensityRankWithDictionary", 2 ; "cover density dictionary")]
    fn variant_tags_and_suffixes(variant: RankVariant, tag: &str, suffix: usize) {
        assert_eq!(variant.tag(), tag);
        assert_eq!(variant.to_string(), tag);
        assert_eq!(variant.suffix_segments(), suffix);
    }

    #[test_case(RankFunction::Plain, "plain" ; "plain")]
    #[test_case(RankFunction::CoverDensity, "cover-density" ; "cover density")]
    fn rank_function_cli_names(function: RankFunction, name: &str) {
        assert_eq!(RankFunction::from_str(name, false), Ok(function));
        assert_eq!(function.to_possible_value().unwrap().get_name(), name);
    }

    #[test]
    fn dictionary_source_cli_names() {
        assert_eq!(
            DictionarySource::from_str("column-default", false),
            Ok(DictionarySource::ColumnDefault)
        );
        assert_eq!(
            DictionarySource::from_str("EXPLICIT", true),
            Ok(DictionarySource::Explicit)
        );
        assert!(DictionarySource::from_str("inferred", false).is_err());
    }

    #[test]
    fn normalization_constants_match_engine_bits() {
        let bits: Vec<u8> = [
            NormalizationFlag::NONE,
            NormalizationFlag::LOG_LENGTH,
            NormalizationFlag::LENGTH,
            NormalizationFlag::HARMONIC_DISTANCE,
            NormalizationFlag::UNIQUE_WORDS,
            NormalizationFlag::LOG_UNIQUE_WORDS,
            NormalizationFlag::SELF_PLUS_ONE,
        ]
        .iter()
        .map(NormalizationFlag::value)
        .collect();
        assert_eq!(bits, [0, 1, 2, 4, 8, 16, 32]);
        assert_eq!(NormalizationFlag::new(4), NormalizationFlag::HARMONIC_DISTANCE);
    }

    #[test]
    fn column_ref_display_quotes_parts() {
        let col = ColumnRef::table_column("article", "body");
        assert_eq!(col.to_string(), "\"article\".\"body\"");
        assert_eq!(col.qualified(|p| p.to_uppercase()), "ARTICLE.BODY");
    }

    #[test_case(0, Some(0) ; "zero")]
    #[test_case(32, Some(32) ; "largest documented flag")]
    #[test_case(255, Some(255) ; "upper bound")]
    #[test_case(256, None ; "too large")]
    #[test_case(-1, None ; "negative")]
    fn normalization_flag_from_int(raw: i64, expected: Option<u8>) {
        let parsed = NormalizationFlag::try_from(raw).ok().map(|f| f.value());
        assert_eq!(parsed, expected);
    }

    #[test]
    fn normalization_parse_all_reports_contract_error() {
        let err = NormalizationFlag::parse_all([1, 2, 1000]).unwrap_err();
        assert!(err.is_contract());
        assert!(err.to_string().contains("1000"));
    }

    #[test]
    fn variant_serializes_both_axes() {
        let json = serde_json::to_string(&RankVariant::COVER_DENSITY_RANK_WITH_DICTIONARY).unwrap();
        assert_eq!(json, r#"{"function":"cover-density","dictionary":"explicit"}"#);
    }
}
