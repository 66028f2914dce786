use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use delivery_analytics::analysis::{AnalysisReport, Query};
use delivery_analytics::config::{PipelineConfig, StoreConfig};
use delivery_analytics::report::processed::summarize_processed;
use delivery_analytics::{SqliteStore, run};

#[derive(Parser)]
#[command(name = "delivery-analytics", version, about = "Delivery data ETL and KPI queries")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Extract, clean, export and load the raw delivery extract
    Run {
        /// JSON configuration file; the environment still overrides it
        #[arg(long)]
        config: Option<PathBuf>,
        /// Root of the default raw/processed layout
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Raw delivery extract
        #[arg(long)]
        raw: Option<PathBuf>,
        /// SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,
        /// Clean and report without touching the store
        #[arg(long)]
        no_load: bool,
        /// Also write the validation report as JSON
        #[arg(long)]
        json_report: bool,
        /// Show a progress bar while loading
        #[arg(long)]
        progress: bool,
    },
    /// Run one of the analysis queries, or all of them
    Query {
        #[arg(value_enum, default_value_t = QueryName::All)]
        name: QueryName,
        /// SQLite database file
        #[arg(long)]
        db: Option<PathBuf>,
        /// Table to query; defaults to the configured table
        #[arg(long)]
        table: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Summarize the exported cleaned dataset
    Validate {
        /// Cleaned CSV; defaults to the processed dataset of the current layout
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum QueryName {
    All,
    Kpi,
    ByDay,
    ByArea,
    Weather,
    TopCategories,
}

impl QueryName {
    fn query(self) -> Option<Query> {
        match self {
            Self::All => None,
            Self::Kpi => Some(Query::Kpi),
            Self::ByDay => Some(Query::ByDay),
            Self::ByArea => Some(Query::ByArea),
            Self::Weather => Some(Query::Weather),
            Self::TopCategories => Some(Query::TopCategories),
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Configuration from a file, a data directory or the environment, then env overrides
fn base_config(
    config_file: Option<&PathBuf>,
    data_dir: Option<&PathBuf>,
) -> anyhow::Result<PipelineConfig> {
    let mut config = match (config_file, data_dir) {
        (Some(path), _) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        (None, Some(dir)) => PipelineConfig::with_data_dir(dir),
        (None, None) => PipelineConfig::from_env(),
    };
    config.apply_env(|key| std::env::var(key).ok());
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            config,
            data_dir,
            raw,
            db,
            no_load,
            json_report,
            progress,
        } => {
            let mut config = base_config(config.as_ref(), data_dir.as_ref())?;
            if let Some(raw) = raw {
                config.raw_dataset = raw;
            }
            if let Some(db) = db {
                config.store.path = db;
            }
            config.skip_load |= no_load;
            config.report.write_json |= json_report;
            config.store.show_progress |= progress;

            let outcome = run(&config).context("delivery pipeline failed")?;
            info!(
                "Run finished: {} rows cleaned, load {}",
                outcome.report.output_rows, outcome.report.load_status
            );
            info!("Validation report: {}", outcome.report_path.display());
        }
        Command::Query {
            name,
            db,
            table,
            format,
        } => {
            let defaults = base_config(None, None)?;
            let store_config = StoreConfig {
                path: db.unwrap_or(defaults.store.path),
                table: table.unwrap_or(defaults.store.table),
                show_progress: false,
            };
            let store = SqliteStore::open_read_only(&store_config)
                .with_context(|| format!("opening {}", store_config.path.display()))?;

            let output = match (name.query(), format) {
                (Some(query), OutputFormat::Text) => query.run(&store)?.to_string(),
                (Some(query), OutputFormat::Json) => {
                    serde_json::to_string_pretty(&query.run(&store)?)?
                }
                (None, OutputFormat::Text) => AnalysisReport::run_all(&store)?.to_string(),
                (None, OutputFormat::Json) => {
                    serde_json::to_string_pretty(&AnalysisReport::run_all(&store)?)?
                }
            };
            println!("{output}");
        }
        Command::Validate { path } => {
            let path = match path {
                Some(path) => path,
                None => base_config(None, None)?.processed_dataset,
            };
            let summary = summarize_processed(&path)
                .with_context(|| format!("summarizing {}", path.display()))?;
            println!("{summary}");
        }
    }

    Ok(())
}
