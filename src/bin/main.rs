//! Vantage CLI - Compute period comparisons over query results
//!
//! Usage:
//!   vantage compare <table.json> <measures.json> [--format <format>]
//!   vantage query <sql> <measures.json> [--database <path>] [--measure <column>...]
//!   vantage stores [--database <path>]
//!
//! Examples:
//!   vantage compare sales.json yoy.json
//!   vantage query -d sales.db "SELECT year, quarter, SUM(amount) AS sales FROM orders GROUP BY 1, 2" qoq.json
//!   vantage stores -d sales.db

use clap::{Parser, Subcommand, ValueEnum};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use vantage::comparison::execute_all;
use vantage::config::Settings;
use vantage::datastore::{Datastore, SqliteDatastore};
use vantage::model::ComparisonMeasure;
use vantage::table::{render, RowTable};

#[derive(Parser)]
#[command(name = "vantage")]
#[command(about = "Vantage - Period comparisons over analytical query results")]
#[command(version)]
struct Cli {
    /// Path to a config file (defaults to VANTAGE_CONFIG, ./vantage.toml, ~/.config/vantage)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply comparison measures to a JSON result table
    Compare {
        /// Path to the table JSON file
        table: PathBuf,

        /// Path to the comparison measures JSON file
        measures: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Run a query against a SQLite database and apply comparison measures
    Query {
        /// SQL query producing the result table
        sql: String,

        /// Path to the comparison measures JSON file
        measures: PathBuf,

        /// Additional measure columns of the query (not part of the row key)
        #[arg(short, long)]
        measure: Vec<String>,

        /// Path to the SQLite database (defaults to `datastore.path` from the config)
        #[arg(short, long)]
        database: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List the stores and typed fields of a SQLite database
    Stores {
        /// Path to the SQLite database (defaults to `datastore.path` from the config)
        #[arg(short, long)]
        database: Option<PathBuf>,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Aligned text table
    Text,
    /// JSON table
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(settings.logging.level.as_str()),
    )
    .init();

    match cli.command {
        Commands::Compare {
            table,
            measures,
            format,
        } => cmd_compare(&settings, table, measures, format),
        Commands::Query {
            sql,
            measures,
            measure,
            database,
            format,
        } => cmd_query(&settings, database, sql, measures, measure, format),
        Commands::Stores { database } => cmd_stores(&settings, database),
    }
}

/// Open the database given on the command line, or the configured one.
fn open_datastore(
    settings: &Settings,
    database: Option<PathBuf>,
) -> Result<SqliteDatastore, String> {
    let path = match database {
        Some(path) => path,
        None => settings
            .datastore
            .resolved_path()
            .map_err(|e| format!("Error resolving datastore path: {}", e))?
            .ok_or_else(|| "No database given and no datastore.path configured".to_string())?,
    };
    SqliteDatastore::open(&path)
        .map(|ds| ds.with_total_marker(settings.comparison.total_marker.clone()))
        .map_err(|e| format!("Error opening '{}': {}", path.display(), e))
}

fn load_measures(path: &Path) -> Result<Vec<ComparisonMeasure>, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Error reading file '{}': {}", path.display(), e))?;
    serde_json::from_str(&content)
        .map_err(|e| format!("Invalid measures in '{}': {}", path.display(), e))
}

fn cmd_compare(
    settings: &Settings,
    table: PathBuf,
    measures: PathBuf,
    format: OutputFormat,
) -> ExitCode {
    let marker = &settings.comparison.total_marker;
    let mut result = match RowTable::from_file(&table, marker) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error reading table '{}': {}", table.display(), e);
            return ExitCode::FAILURE;
        }
    };
    let measures = match load_measures(&measures) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    compare_and_print(settings, &mut result, &measures, format)
}

fn cmd_query(
    settings: &Settings,
    database: Option<PathBuf>,
    sql: String,
    measures: PathBuf,
    extra_measures: Vec<String>,
    format: OutputFormat,
) -> ExitCode {
    let measures = match load_measures(&measures) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let datastore = match open_datastore(settings, database) {
        Ok(ds) => ds,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let mut result = match datastore.query(&sql) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Query failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let measure_columns: HashSet<String> = measures
        .iter()
        .map(|m| m.measure.clone())
        .chain(extra_measures)
        .collect();
    result.mark_measures(&measure_columns);

    compare_and_print(settings, &mut result, &measures, format)
}

fn compare_and_print(
    settings: &Settings,
    table: &mut RowTable,
    measures: &[ComparisonMeasure],
    format: OutputFormat,
) -> ExitCode {
    if let Err(e) = execute_all(table, measures, settings.comparison.parallel_threshold) {
        eprintln!("Comparison failed: {}", e);
        return ExitCode::FAILURE;
    }

    match format {
        OutputFormat::Text => println!("{}", render(&*table)),
        OutputFormat::Json => {
            let json = table.to_json(&settings.comparison.total_marker);
            match serde_json::to_string_pretty(&json) {
                Ok(s) => println!("{}", s),
                Err(e) => {
                    eprintln!("Error serializing table: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }
    }
    ExitCode::SUCCESS
}

fn cmd_stores(settings: &Settings, database: Option<PathBuf>) -> ExitCode {
    let datastore = match open_datastore(settings, database) {
        Ok(ds) => ds,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let stores = match datastore.stores_by_name() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Introspection failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut names: Vec<&String> = stores.keys().collect();
    names.sort();
    for name in names {
        println!("{}", name);
        for field in &stores[name].fields {
            println!("  {} ({})", field.name, field.column_type);
        }
    }
    ExitCode::SUCCESS
}
