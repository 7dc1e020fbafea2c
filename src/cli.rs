//! Command-line front end: print the SQL of a ranked query.

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use crate::config::SearchSchema;
use crate::error::{RankError, Result};
use crate::query::{CompiledQuery, Query};
use crate::rank::RankSpec;
use crate::types::{DictionarySource, RankFunction, RankVariant};

/// Build a ranked full-text query from a search schema.
#[derive(Debug, Parser)]
#[command(name = "tsrank", version, about)]
pub struct Cli {
    /// Search schema (YAML).
    #[arg(long, short)]
    pub schema: PathBuf,

    /// Model the query starts from.
    #[arg(long, short)]
    pub model: String,

    /// Ranking function.
    #[arg(long, value_enum, default_value_t = RankFunction::Plain)]
    pub function: RankFunction,

    /// Where the dictionary comes from.
    #[arg(long, value_enum, default_value_t = DictionarySource::ColumnDefault)]
    pub dictionary: DictionarySource,

    /// Normalization flag; repeat to OR several together.
    #[arg(long, short = 'n', allow_negative_numbers = true)]
    pub normalization: Vec<i64>,

    /// Name of the rank column (defaults to `<field>__<variant>`).
    #[arg(long)]
    pub alias: Option<String>,

    /// Extra columns of the base table to select.
    #[arg(long)]
    pub select: Vec<String>,

    /// Sort by rank, best first.
    #[arg(long)]
    pub order: bool,

    /// Print JSON instead of SQL text.
    #[arg(long)]
    pub json: bool,

    /// Lookup path, e.g. `body__search` or `body__portuguese__search`.
    pub lookup: String,

    /// Search term.
    pub term: String,
}

impl Cli {
    pub fn variant(&self) -> RankVariant {
        RankVariant::new(self.function, self.dictionary)
    }
}

/// Build the query described by `cli` and compile it.
pub fn build(cli: &Cli) -> Result<CompiledQuery> {
    let schema = SearchSchema::load(&cli.schema)?;
    let table = schema
        .table_of(&cli.model)
        .ok_or_else(|| RankError::Unresolved {
            model: cli.model.clone(),
            path: cli.lookup.clone(),
            reason: "unknown model".to_string(),
        })?
        .to_string();

    let spec = RankSpec::new(
        cli.variant(),
        cli.normalization.iter().copied(),
        [(cli.lookup.as_str(), cli.term.as_str())],
    )?;

    let mut query = cli
        .select
        .iter()
        .fold(Query::new(table), |query, column| query.select(column.as_str()));
    query.annotate(&schema, &cli.model, &spec, cli.alias.as_deref())?;
    if cli.order {
        let alias = cli.alias.clone().unwrap_or_else(|| spec.default_alias());
        query = query.order_by_rank(alias);
    }

    let compiled = query.compile();
    info!(variant = %spec.variant(), params = compiled.params.len(), "query compiled");
    Ok(compiled)
}

/// Run the CLI and return what should be printed.
pub fn run(cli: &Cli) -> Result<String> {
    let compiled = build(cli)?;
    if cli.json {
        return Ok(serde_json::to_string_pretty(&compiled)?);
    }
    let mut out = compiled.sql;
    for (i, param) in compiled.params.iter().enumerate() {
        out.push_str(&format!("\n-- ${}: {:?}", i + 1, param.value()));
    }
    Ok(out)
}
