//! Clap argument definitions for the `vault` CLI.

use clap::{ArgAction, Args, Parser, Subcommand};
use vault_config::Strategy;

/// Parses an index strategy name.
fn parse_strategy(s: &str) -> Result<Strategy, String> {
    s.parse()
}

/// Parses a similarity threshold.
fn parse_threshold(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err("threshold must be a finite number".to_string())
    }
}

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "vault")]
#[command(about = "Search the FTC open vault catalog", version)]
pub struct Cli {
    /// Log more (-v for progress, -vv for index decisions)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Category selection shared by commands that read the catalog.
#[derive(Args, Debug, Clone, Default)]
pub struct CategoryArgs {
    /// Category to read, as section/sub-section (repeatable) [default: from config]
    #[arg(short = 'c', long = "category")]
    pub categories: Vec<String>,
}

/// Arguments for `vault search`.
#[derive(Args, Debug, Clone)]
pub struct SearchCommand {
    /// Query words, joined with spaces
    #[arg(required = true)]
    pub queries: Vec<String>,

    #[command(flatten)]
    /// Categories to search.
    pub categories: CategoryArgs,

    /// Minimum similarity for a result [default: from config]
    #[arg(long, value_parser = parse_threshold)]
    pub threshold: Option<f64>,

    /// Index strategy: bag-of-words, tfidf, tfidf-reduced, external [default: from config]
    #[arg(long, value_parser = parse_strategy)]
    pub strategy: Option<Strategy>,

    /// Maximum results to print, 0 for all [default: from config]
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Show how the query is interpreted without searching
    #[arg(long)]
    pub explain: bool,
}

/// Arguments for `vault index`.
#[derive(Args, Debug, Clone)]
pub struct IndexCommand {
    #[command(flatten)]
    /// Categories to index.
    pub categories: CategoryArgs,

    /// Index strategy [default: from config]
    #[arg(long, value_parser = parse_strategy)]
    pub strategy: Option<Strategy>,
}

/// Arguments for `vault status`.
#[derive(Args, Debug, Clone)]
pub struct StatusCommand {
    #[command(flatten)]
    /// Categories whose fingerprint is reported.
    pub categories: CategoryArgs,
}

/// Arguments for `vault init`.
#[derive(Args, Debug, Clone)]
pub struct InitCommand {
    /// Create global ~/.vault.toml instead
    #[arg(long)]
    pub global: bool,

    /// Overwrite existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Supported `vault` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Rank catalog entries against a query
    #[command(after_help = "\
QUERY SYNTAX:
  term              Term adds weight to the ranking
  \"phrase\"          Words must appear in this order
  -term             Term must NOT appear
  term1 OR term2    Either term must appear
  (expr)            Grouping

FIELD QUERIES:
  title:term        Term must appear in the title
  author:term       Term must appear in the author
  language:term     Any record field name works as a prefix

Queries that cannot be parsed are searched as plain words.

EXAMPLES:
  vault search drivetrain
  vault search -c cad/drivetrains swerve
  vault search '\"field centric\" -mecanum'
  vault search 'language:kotlin (odometry OR roadrunner)'
  vault search --json --threshold 0.2 claw")]
    Search(SearchCommand),

    /// Build the index and persist it
    Index(IndexCommand),

    /// Show configuration, catalog and snapshot status
    Status(StatusCommand),

    /// Initialize vault configuration in current directory
    Init(InitCommand),
}
