//! # ExoAI CLI Module
//!
//! Command-line consumer of the dashboard data layer. Every data command goes
//! through `Dashboard`, so with the service down the commands still answer,
//! printing an offline notice to stderr.
//!
//! ## Available Commands
//!
//! - `serve` - Start the offline stub backend
//! - `health` - Service health (default when no command is given)
//! - `models` - Offered models with their metrics
//! - `metrics` - Evaluation summary and confusion matrix
//! - `features` - Feature importance
//! - `predict` - Classify one object from `--feature name=value` pairs
//! - `dataset` - Browse the dataset, optionally exporting CSV
//! - `shap` - SHAP attributions of sample objects
//! - `predict-csv` - Annotate a CSV batch with predictions
//! - `history show|clear` - The persisted latest classification

mod commands;

use crate::client::TransportError;
use crate::config::{Config, ConfigError};
use clap::{Parser, Subcommand};
use exoai_core::{ExoError, Mission};
use std::path::PathBuf;
use thiserror::Error;

pub use commands::*;

// =============================================================================
// ERRORS
// =============================================================================

/// Failures that end a CLI invocation with exit code 1.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Core(#[from] ExoError),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// ExoAI - exoplanet classification dashboard data layer
///
/// Talks to the classification service and falls back to locally generated
/// data whenever it is unreachable.
#[derive(Parser, Debug)]
#[command(name = "exoai")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML config file (default: ./exoai.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the classification service
    #[arg(short = 'u', long, global = true)]
    pub url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(short, long, global = true)]
    pub timeout: Option<u64>,

    /// Path of the history database
    #[arg(long, global = true)]
    pub history_db: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the offline stub backend
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,

        /// Seed of the served dataset
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Show service health
    Health,

    /// List offered models
    Models,

    /// Show evaluation metrics
    Metrics,

    /// Show feature importance
    Features,

    /// Classify one object
    Predict {
        /// Model to use
        #[arg(short, long)]
        model: Option<String>,

        /// Feature value as name=value (repeatable)
        #[arg(short, long = "feature", value_name = "NAME=VALUE")]
        features: Vec<String>,
    },

    /// Browse the dataset
    Dataset {
        /// Keep only rows of this mission (kepler, k2, tess)
        #[arg(short, long)]
        mission: Option<Mission>,

        /// 1-based page number
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Rows per page
        #[arg(short, long, default_value = "25")]
        limit: u32,

        /// Case-insensitive id search
        #[arg(short, long)]
        search: Option<String>,

        /// Write the page as CSV to this file
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// Show SHAP attributions of sample objects
    Shap,

    /// Annotate a CSV batch with predictions
    PredictCsv {
        /// Input CSV file
        #[arg(short, long)]
        input: PathBuf,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Inspect or clear the latest classification
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryAction {
    /// Print the latest classification
    Show,
    /// Forget the latest classification
    Clear,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

impl Cli {
    /// Layered configuration with this invocation's flags applied last.
    pub fn resolve_config(&self) -> Result<Config, CliError> {
        let mut config = Config::load(self.config.as_deref())?.apply_env()?;
        if let Some(ref url) = self.url {
            config.client.base_url.clone_from(url);
        }
        if let Some(timeout) = self.timeout {
            config.client.timeout_secs = timeout;
        }
        if let Some(ref db) = self.history_db {
            config.storage.history_db.clone_from(db);
        }
        if let Some(Commands::Serve {
            ref host, port, ..
        }) = self.command
        {
            if let Some(host) = host {
                config.server.host.clone_from(host);
            }
            if let Some(port) = port {
                config.server.port = port;
            }
        }
        Ok(config)
    }
}

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), CliError> {
    let config = cli.resolve_config()?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Serve { seed, .. }) => cmd_serve(&config, seed, cli.quiet).await,
        Some(Commands::Health) | None => cmd_health(&config, json_mode).await,
        Some(Commands::Models) => cmd_models(&config, json_mode).await,
        Some(Commands::Metrics) => cmd_metrics(&config, json_mode).await,
        Some(Commands::Features) => cmd_features(&config, json_mode).await,
        Some(Commands::Predict { model, features }) => {
            cmd_predict(&config, json_mode, model, &features).await
        }
        Some(Commands::Dataset {
            mission,
            page,
            limit,
            search,
            csv,
        }) => {
            let query = exoai_core::DatasetQuery {
                mission,
                page,
                limit,
                search,
            };
            cmd_dataset(&config, json_mode, &query, csv.as_deref()).await
        }
        Some(Commands::Shap) => cmd_shap(&config, json_mode).await,
        Some(Commands::PredictCsv { input, output }) => {
            cmd_predict_csv(&config, &input, output.as_deref()).await
        }
        Some(Commands::History { action }) => cmd_history(&config, json_mode, action),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn predict_collects_repeated_features() {
        let cli = Cli::try_parse_from([
            "exoai",
            "predict",
            "--model",
            "adaboost",
            "-f",
            "orbital_period=12.5",
            "--feature",
            "transit_depth=900",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Predict { model, features }) => {
                assert_eq!(model.as_deref(), Some("adaboost"));
                assert_eq!(features, ["orbital_period=12.5", "transit_depth=900"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn dataset_parses_mission_and_paging() {
        let cli =
            Cli::try_parse_from(["exoai", "dataset", "--mission", "tess", "-p", "3", "-l", "10"])
                .unwrap();
        match cli.command {
            Some(Commands::Dataset {
                mission,
                page,
                limit,
                ..
            }) => {
                assert_eq!(mission, Some(Mission::Tess));
                assert_eq!((page, limit), (3, 10));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_mission_is_rejected() {
        assert!(Cli::try_parse_from(["exoai", "dataset", "--mission", "hubble"]).is_err());
    }

    #[test]
    fn flags_override_config_layers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exoai.toml");
        std::fs::write(
            &path,
            "[client]\nbase_url = \"http://file:1\"\ntimeout_secs = 30\n[server]\nport = 7000\n",
        )
        .unwrap();
        let path_str = path.to_string_lossy().to_string();

        let cli = Cli::try_parse_from([
            "exoai",
            "--config",
            path_str.as_str(),
            "--url",
            "http://flag:2",
            "serve",
            "--port",
            "7100",
        ])
        .unwrap();
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.client.timeout_secs, 30);
        assert_eq!(config.server.port, 7100);
        // EXOAI_API_URL may be set in the environment; the flag wins either way.
        assert_eq!(config.client.base_url, "http://flag:2");
    }
}
