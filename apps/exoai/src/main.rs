//! # ExoAI - dashboard data layer CLI
//!
//! ## Usage
//!
//! ```bash
//! # Query the classification service (falls back to substitute data)
//! exoai health
//! exoai dataset --mission kepler --page 2 --csv kepler.csv
//! exoai predict -f orbital_period=365 -f transit_depth=1200 ...
//!
//! # Serve substitute data on the service routes
//! exoai serve --port 8000
//! ```

use clap::Parser;
use exoai::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // EXOAI_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("EXOAI_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "exoai=info,tower_http=debug".into());

    // Logs go to stderr so --json-mode output on stdout stays parseable.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
