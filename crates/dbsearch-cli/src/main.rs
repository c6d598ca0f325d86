//! dbsearch CLI - find a substring in every text column of a database.

use clap::{Args, Parser, Subcommand};
use dbsearch::config::SslMode;
use dbsearch::{Config, DialectCatalog, Orchestrator, SearchError, TableIdentity, TextMatch};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};

const SEPARATOR_WIDTH: usize = 40;

#[derive(Parser)]
#[command(name = "dbsearch")]
#[command(about = "Search every text column of a database for a substring")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "warn")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search all tables for a substring
    ///
    /// Arguments are `DIALECT CONNECTION SUBSTRING`, or just `SUBSTRING` when
    /// the configuration file names the dialect and connection.
    Search {
        #[arg(required = true, num_args = 1..=3, value_name = "DIALECT CONNECTION SUBSTRING")]
        args: Vec<String>,

        /// Print one JSON object per match and a final summary
        #[arg(long)]
        output_json: bool,

        /// Skip tables that fail instead of stopping
        #[arg(long)]
        continue_on_error: bool,

        #[command(flatten)]
        driver: DriverArgs,
    },

    /// List tables with their primary-key and text columns
    Tables {
        #[arg(num_args = 0..=2, value_name = "DIALECT CONNECTION")]
        args: Vec<String>,

        /// Print table definitions as JSON
        #[arg(long)]
        output_json: bool,

        #[command(flatten)]
        driver: DriverArgs,
    },

    /// List the dialects compiled into this build
    Dialects,
}

#[derive(Args)]
struct DriverArgs {
    /// PostgreSQL: search every database on the server
    #[arg(long)]
    cross_database: bool,

    /// PostgreSQL TLS mode: disable, require, verify-ca, verify-full
    #[arg(long)]
    ssl_mode: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), SearchError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format);

    let mut config = match &cli.config {
        Some(path) => {
            let config = Config::load(path)?;
            info!("Loaded configuration from {:?}", path);
            config
        }
        None => Config::default(),
    };

    match cli.command {
        Commands::Dialects => {
            let catalog = DialectCatalog::with_builtins(&config.driver_options());
            for name in catalog.dialect_names() {
                println!("{}", name);
            }
        }

        Commands::Search {
            args,
            output_json,
            continue_on_error,
            driver,
        } => {
            let (targets, substring) = match args.as_slice() {
                [substring] => (&[][..], substring.clone()),
                [_, _, substring] => (&args[..2], substring.clone()),
                _ => {
                    return Err(SearchError::InvalidArgument(
                        "expected DIALECT CONNECTION SUBSTRING or just SUBSTRING".into(),
                    ))
                }
            };
            apply_targets(&mut config, targets);
            apply_driver_args(&mut config, &driver)?;
            config.search.continue_on_error |= continue_on_error;
            config.validate()?;

            let (dialect, connection) = require_targets(&config)?;
            let catalog = DialectCatalog::with_builtins(&config.driver_options());
            let mut orchestrator = Orchestrator::connect(&catalog, &dialect, &connection)
                .await?
                .continue_on_error(config.search.continue_on_error);

            let result = orchestrator
                .run(&substring, |table, m| {
                    if output_json {
                        println!("{}", match_json(table, m));
                    } else {
                        print_match(table, m);
                    }
                })
                .await;
            orchestrator.close().await?;
            let summary = result?;

            if output_json {
                println!("{}", serde_json::json!({ "summary": summary }));
            } else if !summary.failed_tables.is_empty() {
                eprintln!("Failed tables: {:?}", summary.failed_tables);
            }
        }

        Commands::Tables {
            args,
            output_json,
            driver,
        } => {
            match args.len() {
                0 | 2 => apply_targets(&mut config, &args),
                _ => {
                    return Err(SearchError::InvalidArgument(
                        "expected DIALECT CONNECTION or no arguments".into(),
                    ))
                }
            }
            apply_driver_args(&mut config, &driver)?;
            config.validate()?;

            let (dialect, connection) = require_targets(&config)?;
            let catalog = DialectCatalog::with_builtins(&config.driver_options());
            let mut orchestrator = Orchestrator::connect(&catalog, &dialect, &connection)
                .await?
                .continue_on_error(config.search.continue_on_error);

            let result = orchestrator.describe().await;
            orchestrator.close().await?;
            let description = result?;

            if output_json {
                println!("{}", serde_json::to_string_pretty(&description)?);
            } else {
                for def in &description.definitions {
                    println!("{}", def.identity());
                    println!("  Primary key: {}", join(def.primary_key_columns()));
                    println!("  Text columns: {}", join(def.text_columns()));
                }
                if !description.failed_tables.is_empty() {
                    eprintln!("Failed tables: {:?}", description.failed_tables);
                }
            }
        }
    }

    Ok(())
}

/// Positional `DIALECT CONNECTION` override the configuration file.
fn apply_targets(config: &mut Config, targets: &[String]) {
    if let [dialect, connection] = targets {
        config.dialect = Some(dialect.clone());
        config.connection = Some(connection.clone());
    }
}

fn apply_driver_args(config: &mut Config, driver: &DriverArgs) -> Result<(), SearchError> {
    config.postgres.cross_database |= driver.cross_database;
    if let Some(mode) = &driver.ssl_mode {
        config.postgres.ssl_mode = SslMode::parse(mode)?;
    }
    Ok(())
}

fn require_targets(config: &Config) -> Result<(String, String), SearchError> {
    let dialect = config.dialect.clone().ok_or_else(|| {
        SearchError::Config("no dialect given on the command line or in the config file".into())
    })?;
    let connection = config.connection.clone().ok_or_else(|| {
        SearchError::Config("no connection given on the command line or in the config file".into())
    })?;
    Ok((dialect, connection))
}

fn print_match(table: &TableIdentity, m: &TextMatch) {
    println!("{}", "=".repeat(SEPARATOR_WIDTH));
    println!("Table: {}", table);
    println!("Primary key values: {}", m.primary_key_display());
    println!("Matching column: {}", m.matching_column);
    println!("Matching value: {}", m.matching_value);
}

fn match_json(table: &TableIdentity, m: &TextMatch) -> serde_json::Value {
    serde_json::json!({
        "table": table.to_string(),
        "primary_key": m.row_primary_key,
        "column": m.matching_column,
        "value": m.matching_value,
    })
}

fn join<'a>(columns: impl IntoIterator<Item = &'a String>) -> String {
    columns
        .into_iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn setup_logging(verbosity: &str, format: &str) {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    // stdout carries the report only.
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
