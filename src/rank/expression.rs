//! A single ranking function call, rendered to SQL.

use crate::types::{ColumnRef, NormalizationFlag, PredicateParam, RankFunction, PLACEHOLDER};

/// `ts_rank` / `ts_rank_cd` over one column.
///
/// The ranking functions take the tsquery rather than the boolean match, so
/// the predicate parameter is bound again inside the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankExpression {
    function: RankFunction,
    target: ColumnRef,
    dictionary: String,
    param: PredicateParam,
    normalization: Vec<NormalizationFlag>,
}

impl RankExpression {
    pub fn new(
        function: RankFunction,
        target: ColumnRef,
        dictionary: impl Into<String>,
        param: PredicateParam,
        normalization: Vec<NormalizationFlag>,
    ) -> Self {
        Self {
            function,
            target,
            dictionary: dictionary.into(),
            param,
            normalization,
        }
    }

    pub fn function(&self) -> RankFunction {
        self.function
    }

    pub fn target(&self) -> &ColumnRef {
        &self.target
    }

    pub fn dictionary(&self) -> &str {
        &self.dictionary
    }

    pub fn normalization(&self) -> &[NormalizationFlag] {
        &self.normalization
    }

    /// Render the call and its single bound parameter.
    pub fn as_sql<Q>(&self, quote: Q) -> (String, Vec<PredicateParam>)
    where
        Q: Fn(&str) -> String,
    {
        let sql = format!(
            "{function}({column}, to_tsquery('{dictionary}', {PLACEHOLDER}){normalization})",
            function = self.function.sql_name(),
            column = self.target.qualified(quote),
            dictionary = self.dictionary,
            normalization = normalization_suffix(&self.normalization),
        );
        (sql, vec![self.param.clone()])
    }
}

/// `""` for no flags, otherwise `", "` followed by the flags OR-ed in order.
pub fn normalization_suffix(flags: &[NormalizationFlag]) -> String {
    if flags.is_empty() {
        return String::new();
    }
    let joined = flags
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("|");
    format!(", {joined}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookups::Lookup;
    use crate::sql::quote_name;
    use pretty_assertions::assert_eq;

    fn flags(values: &[u8]) -> Vec<NormalizationFlag> {
        values.iter().copied().map(NormalizationFlag::from).collect()
    }

    fn expression(function: RankFunction, normalization: &[u8]) -> RankExpression {
        RankExpression::new(
            function,
            ColumnRef::table_column("article", "body"),
            "english",
            Lookup::Search.prepare("Hello world"),
            flags(normalization),
        )
    }

    #[test]
    fn renders_plain_rank_without_normalization() {
        let (sql, params) = expression(RankFunction::Plain, &[]).as_sql(quote_name);
        assert_eq!(
            sql,
            "ts_rank(\"article\".\"body\", to_tsquery('english', %s))"
        );
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].value(), "Hello & world");
    }

    #[test]
    fn renders_cover_density_with_flags() {
        let (sql, _) = expression(RankFunction::CoverDensity, &[1, 4]).as_sql(quote_name);
        assert_eq!(
            sql,
            "ts_rank_cd(\"article\".\"body\", to_tsquery('english', %s), 1|4)"
        );
    }

    #[test]
    fn quote_function_is_applied_to_every_part() {
        let expr = RankExpression::new(
            RankFunction::Plain,
            ColumnRef::new(["public", "article", "body"]),
            "simple",
            Lookup::TsQuery.prepare("a"),
            Vec::new(),
        );
        let (sql, _) = expr.as_sql(|p| format!("`{p}`"));
        assert_eq!(sql, "ts_rank(`public`.`article`.`body`, to_tsquery('simple', %s))");
    }

    #[test]
    fn suffix_keeps_caller_order() {
        assert_eq!(normalization_suffix(&[]), "");
        assert_eq!(normalization_suffix(&flags(&[32])), ", 32");
        assert_eq!(normalization_suffix(&flags(&[4, 1, 4])), ", 4|1|4");
    }

    #[test]
    fn accessors_expose_fields() {
        let expr = expression(RankFunction::CoverDensity, &[2]);
        assert_eq!(expr.function(), RankFunction::CoverDensity);
        assert_eq!(expr.dictionary(), "english");
        assert_eq!(expr.target().parts(), ["article", "body"]);
        assert_eq!(expr.normalization(), flags(&[2]).as_slice());
    }
}
