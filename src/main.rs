use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use medq::{
    Dataset, HttpSummarizerBuilder, NegationPolicy, PhraseTable, SearchConfig, SearchOutcome,
    SearchService, Vocabulary,
};

/// medq - free-text medical record search
#[derive(Parser)]
#[command(name = "medq")]
#[command(about = "Turn free-text medical queries into boolean searches over a CSV dataset")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Parse a query, print its boolean expression and the matching records
    Query(QueryCommand),
    /// Print the vocabulary extracted from the dataset
    Terms(TermsCommand),
}

/// Run a free-text query against the dataset
#[derive(Parser)]
struct QueryCommand {
    /// The free-text query
    #[arg(value_name = "TEXT")]
    text: String,

    /// Path to the CSV dataset (falls back to MEDQ_DATA, then the
    /// platform data dir)
    #[arg(long, value_name = "PATH")]
    data: Option<PathBuf>,

    /// Comma-separated categorical columns to match against
    #[arg(long, value_name = "COLUMNS", default_value = "Gender,Symptoms,Occupation")]
    columns: String,

    /// Negation detection policy
    #[arg(long, value_enum, default_value_t = NegationMode::ClauseSplit)]
    negation: NegationMode,

    /// Column negated terms are checked against when filtering
    #[arg(long, value_name = "COLUMN", default_value = "Occupation")]
    negation_column: String,

    /// Summarize the query with the configured model server before parsing
    #[arg(long)]
    summarize: bool,

    /// Emit the result as JSON instead of a table
    #[arg(long)]
    json: bool,
}

/// Show the vocabulary the parser matches against
#[derive(Parser)]
struct TermsCommand {
    /// Path to the CSV dataset
    #[arg(long, value_name = "PATH")]
    data: Option<PathBuf>,

    /// Comma-separated categorical columns to extract
    #[arg(long, value_name = "COLUMNS", default_value = "Gender,Symptoms,Occupation")]
    columns: String,
}

/// How to detect negated terms in the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum NegationMode {
    /// Split the query on the first "without"
    ClauseSplit,
    /// Scan for fixed negation phrases
    Phrases,
}

fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Query(cmd) => handle_query(cmd),
        Commands::Terms(cmd) => handle_terms(cmd),
    };

    if let Err(e) = result {
        // Determine exit code based on error type
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e}");
        std::process::exit(exit_code);
    }
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors include validation failures like empty query text.
/// Internal errors include dataset load failures and I/O errors.
fn is_user_error(error: &anyhow::Error) -> bool {
    let error_msg = error.to_string();
    error_msg.contains("cannot be empty")
}

/// Handles the query command.
fn handle_query(cmd: &QueryCommand) -> Result<()> {
    if cmd.text.trim().is_empty() {
        anyhow::bail!("Query text cannot be empty");
    }

    let data_path = resolve_data_path(cmd.data.as_deref())?;
    let dataset = Dataset::load(&data_path).context("Failed to load dataset")?;

    let config = SearchConfig {
        columns: parse_columns(&cmd.columns),
        policy: match cmd.negation {
            NegationMode::ClauseSplit => NegationPolicy::ClauseSplit,
            NegationMode::Phrases => NegationPolicy::Phrases(PhraseTable::default()),
        },
        negation_column: cmd.negation_column.clone(),
    };

    let mut service = SearchService::with_config(dataset, config);
    if cmd.summarize {
        let summarizer = HttpSummarizerBuilder::new()
            .build()
            .context("Failed to configure summarizer")?;
        service = service.with_summarizer(Box::new(summarizer));
    }

    let outcome = service.search(&cmd.text);
    if cmd.json {
        print_json(&outcome, service.dataset())?;
    } else {
        print_outcome(&outcome, service.dataset());
    }

    Ok(())
}

/// Handles the terms command by printing the extracted vocabulary.
fn handle_terms(cmd: &TermsCommand) -> Result<()> {
    let data_path = resolve_data_path(cmd.data.as_deref())?;
    let dataset = Dataset::load(&data_path).context("Failed to load dataset")?;

    let columns = parse_columns(&cmd.columns);
    let vocab = Vocabulary::build(&dataset, &columns);

    for (col, terms) in vocab.iter() {
        println!("{col} ({} terms):", terms.len());
        for term in terms {
            println!("  {term}");
        }
    }

    Ok(())
}

/// Resolves the dataset path: CLI flag, then MEDQ_DATA, then the platform
/// data dir (`{data_dir}/medq/records.csv`).
fn resolve_data_path(flag: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = flag {
        return Ok(path.to_path_buf());
    }
    if let Ok(path) = std::env::var("MEDQ_DATA") {
        return Ok(PathBuf::from(path));
    }
    let data_dir =
        dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Failed to determine data directory"))?;
    Ok(data_dir.join("medq").join("records.csv"))
}

/// Parses a comma-separated column list, trimming whitespace and
/// dropping empty entries.
fn parse_columns(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Prints the boolean expression and a record table.
fn print_outcome(outcome: &SearchOutcome<'_>, dataset: &Dataset) {
    println!("{}", outcome.query);
    println!();

    if outcome.records.is_empty() {
        println!("No matching records.");
        return;
    }

    let columns = dataset.columns();
    let mut widths: Vec<usize> = columns.iter().map(String::len).collect();
    for record in &outcome.records {
        for (i, col) in columns.iter().enumerate() {
            let len = record.get(col).map_or(0, str::len);
            if len > widths[i] {
                widths[i] = len;
            }
        }
    }

    let header: Vec<String> = columns
        .iter()
        .zip(widths.iter().copied())
        .map(|(col, w)| format!("{col:w$}"))
        .collect();
    println!("{}", header.join("  "));

    for record in &outcome.records {
        let row: Vec<String> = columns
            .iter()
            .zip(widths.iter().copied())
            .map(|(col, w)| format!("{:w$}", record.get(col).unwrap_or("")))
            .collect();
        println!("{}", row.join("  "));
    }

    println!();
    println!(
        "{} of {} records matched.",
        outcome.records.len(),
        dataset.len()
    );
}

/// Prints the full outcome as one JSON object.
fn print_json(outcome: &SearchOutcome<'_>, dataset: &Dataset) -> Result<()> {
    let mut terms = serde_json::Map::new();
    for (col, matched) in &outcome.parsed.terms {
        terms.insert(col.clone(), serde_json::json!(matched));
    }
    let negations: Vec<&str> = outcome
        .parsed
        .negations
        .iter()
        .map(|n| n.term.as_str())
        .collect();
    let records: Vec<serde_json::Value> = outcome
        .records
        .iter()
        .map(|r| r.to_json(dataset.columns()))
        .collect();

    let output = serde_json::json!({
        "query": outcome.query,
        "terms": terms,
        "negations": negations,
        "records": records,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
