//! Query representation and the deltas ranking requests fold into it.
//!
//! A [`RankSpec`](crate::RankSpec) never touches a query directly: `attach`
//! returns a [`QueryDelta`] and the owner of the [`Query`] folds it in with
//! [`Query::apply`].

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::SearchSchema;
use crate::error::Result;
use crate::rank::RankSpec;
use crate::sql::quote_name;
use crate::types::{ColumnRef, PredicateParam};

// ---------------------------------------------------------------------------
// Fragments
// ---------------------------------------------------------------------------

/// A WHERE fragment with its bound parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Filter {
    pub sql: String,
    pub params: Vec<PredicateParam>,
}

/// A projected expression with its bound parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComputedExpression {
    pub sql: String,
    pub params: Vec<PredicateParam>,
}

/// `INNER JOIN <table> ON <left> = <right>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Join {
    pub table: String,
    pub left: ColumnRef,
    pub right: ColumnRef,
}

impl Join {
    pub fn to_sql(&self) -> String {
        format!(
            "INNER JOIN {} ON {} = {}",
            quote_name(&self.table),
            self.left,
            self.right
        )
    }
}

/// Everything one ranking request adds to a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryDelta {
    pub filter: Filter,
    pub alias: String,
    pub computed: ComputedExpression,
    pub group_by: ColumnRef,
}

// ---------------------------------------------------------------------------
// Query
// ---------------------------------------------------------------------------

/// A single-table SELECT that ranking requests are folded into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Query {
    table: String,
    select: Vec<ColumnRef>,
    joins: Vec<Join>,
    filters: Vec<Filter>,
    computed: Vec<(String, ComputedExpression)>,
    group_by: Vec<ColumnRef>,
    order_by: Vec<String>,
}

/// SQL text and its parameters in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<PredicateParam>,
}

impl Query {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    /// Add a plain column of the base table to the projection.
    pub fn select(mut self, column: impl Into<String>) -> Self {
        let column = ColumnRef::table_column(self.table.clone(), column);
        if !self.select.contains(&column) {
            self.select.push(column);
        }
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn group_by(&self) -> &[ColumnRef] {
        &self.group_by
    }

    pub fn computed(&self, alias: &str) -> Option<&ComputedExpression> {
        self.computed
            .iter()
            .find(|(name, _)| name == alias)
            .map(|(_, expr)| expr)
    }

    pub fn computed_aliases(&self) -> impl Iterator<Item = &str> {
        self.computed.iter().map(|(alias, _)| alias.as_str())
    }

    pub fn add_filter(&mut self, sql: impl Into<String>, params: Vec<PredicateParam>) {
        self.filters.push(Filter {
            sql: sql.into(),
            params,
        });
    }

    /// Register `expr` under `alias`, returning the expression it replaced.
    pub fn add_computed(
        &mut self,
        alias: impl Into<String>,
        expr: ComputedExpression,
    ) -> Option<ComputedExpression> {
        let alias = alias.into();
        match self.computed.iter_mut().find(|(name, _)| *name == alias) {
            Some((_, slot)) => {
                warn!(alias = %alias, "computed expression overwritten");
                Some(std::mem::replace(slot, expr))
            }
            None => {
                self.computed.push((alias, expr));
                None
            }
        }
    }

    /// Append `column` to GROUP BY unless it is already there.
    pub fn add_group_by(&mut self, column: ColumnRef) -> bool {
        if self.group_by.contains(&column) {
            return false;
        }
        self.group_by.push(column);
        true
    }

    pub fn add_join(&mut self, join: Join) -> bool {
        if self.joins.contains(&join) {
            return false;
        }
        self.joins.push(join);
        true
    }

    /// Sort by a computed alias, best rank first.
    pub fn order_by_rank(mut self, alias: impl Into<String>) -> Self {
        self.order_by.push(alias.into());
        self
    }

    /// Fold a ranking delta into this query.
    pub fn apply(&mut self, delta: QueryDelta) {
        debug!(alias = %delta.alias, table = %self.table, "applying rank delta");
        self.filters.push(delta.filter);
        self.add_computed(delta.alias, delta.computed);
        self.add_group_by(delta.group_by);
    }

    /// Owned variant of [`Query::apply`].
    pub fn with(mut self, delta: QueryDelta) -> Self {
        self.apply(delta);
        self
    }

    /// Resolve `spec` on `model` through `schema` and fold the result in.
    ///
    /// Nothing is changed when resolution or attachment fails.
    pub fn annotate(
        &mut self,
        schema: &SearchSchema,
        model: &str,
        spec: &RankSpec,
        alias: Option<&str>,
    ) -> Result<()> {
        let resolved = schema.resolve(model, spec.lookup())?;
        let delta = spec.attach(alias, &resolved.column, &resolved.resolver)?;
        for join in resolved.joins {
            self.add_join(join);
        }
        self.apply(delta);
        Ok(())
    }

    pub fn compile(&self) -> CompiledQuery {
        let mut params = Vec::new();
        let mut projection: Vec<String> = self.select.iter().map(ToString::to_string).collect();
        for (alias, expr) in &self.computed {
            projection.push(format!("{} AS {}", expr.sql, quote_name(alias)));
            params.extend(expr.params.iter().cloned());
        }
        if projection.is_empty() {
            projection.push("*".to_string());
        }

        let mut sql = format!(
            "SELECT {} FROM {}",
            projection.join(", "),
            quote_name(&self.table)
        );

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.to_sql());
        }

        if !self.filters.is_empty() {
            let clauses: Vec<&str> = self.filters.iter().map(|f| f.sql.as_str()).collect();
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
            for filter in &self.filters {
                params.extend(filter.params.iter().cloned());
            }
        }

        if !self.group_by.is_empty() {
            let mut grouped = self.group_by.clone();
            for column in &self.select {
                if !grouped.contains(column) {
                    grouped.push(column.clone());
                }
            }
            let grouped: Vec<String> = grouped.iter().map(ToString::to_string).collect();
            sql.push_str(" GROUP BY ");
            sql.push_str(&grouped.join(", "));
        }

        if !self.order_by.is_empty() {
            let order: Vec<String> = self
                .order_by
                .iter()
                .map(|alias| format!("{} DESC", quote_name(alias)))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&order.join(", "));
        }

        CompiledQuery { sql, params }
    }
}
