//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::{CliError, HistoryAction};
use crate::api;
use crate::client::ExoClient;
use crate::config::Config;
use crate::degrade::{Dashboard, Source};
use crate::notify::ConsoleNotifier;
use crate::workflow::{ClassifyState, ClassifyWorkflow};
use exoai_core::{
    ClassificationForm, DatasetQuery, HistoryStore, RedbStore, primitives::CLASS_ORDER,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum size of a CSV batch upload (50 MB).
const MAX_UPLOAD_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), CliError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| CliError::Io(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(CliError::InvalidArgument(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Resolve an input path to an existing regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, CliError> {
    let canonical = path.canonicalize().map_err(|e| {
        CliError::Io(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(CliError::Io(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Resolve an output path whose parent directory must exist.
fn validate_output_path(path: &Path) -> Result<PathBuf, CliError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        CliError::Io(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(CliError::Io(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| CliError::Io("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

// =============================================================================
// HELPERS
// =============================================================================

fn dashboard(config: &Config) -> Result<Dashboard, CliError> {
    let client = ExoClient::new(config.client_config())?;
    Ok(Dashboard::new(client, Arc::new(ConsoleNotifier)))
}

fn open_history(config: &Config) -> Result<HistoryStore<RedbStore>, CliError> {
    Ok(HistoryStore::new(RedbStore::open(&config.storage.history_db)?))
}

fn print_json<T: Serialize>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

/// Split `name=value` into its parts.
fn parse_feature_arg(arg: &str) -> Result<(String, String), CliError> {
    let (name, value) = arg.split_once('=').ok_or_else(|| {
        CliError::InvalidArgument(format!("expected NAME=VALUE, got '{}'", arg))
    })?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::InvalidArgument(format!(
            "missing feature name in '{}'",
            arg
        )));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn source_label(source: Source) -> &'static str {
    match source {
        Source::Live => "live",
        Source::Substitute => "substitute",
    }
}

// =============================================================================
// SERVE COMMAND
// =============================================================================

/// Start the offline stub backend.
pub async fn cmd_serve(config: &Config, seed: u64, quiet: bool) -> Result<(), CliError> {
    let addr = config.server_addr();

    if !quiet {
        println!("ExoAI stub backend v{}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Configuration:");
        println!("  Address:      {}", addr);
        println!("  Dataset seed: {}", seed);
        println!();
        println!("Endpoints:");
        println!("  GET  /health      - Health check");
        println!("  GET  /models      - Offered models");
        println!("  GET  /metrics     - Evaluation summary");
        println!("  GET  /features    - Feature importance");
        println!("  POST /predict     - Classify one object");
        println!("  GET  /dataset     - Paged dataset");
        println!("  GET  /shap/sample - Sample attributions");
        println!("  POST /predict-csv - Annotate a CSV batch");
        println!();
        println!("Press Ctrl+C to stop");
        println!();
    }

    api::run_server(&addr, api::AppState::new(seed))
        .await
        .map_err(|e| CliError::Io(format!("Server error: {}", e)))
}

// =============================================================================
// HEALTH COMMAND
// =============================================================================

/// Show service health.
pub async fn cmd_health(config: &Config, json_mode: bool) -> Result<(), CliError> {
    let dashboard = dashboard(config)?;
    let sourced = dashboard.health_sourced().await;

    if json_mode {
        print_json(&sourced.value);
        return Ok(());
    }

    println!("ExoAI Service Health");
    println!("====================");
    println!("Service:     {}", dashboard.client().base_url());
    println!("Status:      {}", sourced.value.status);
    println!(
        "Last ingest: {}",
        sourced.value.last_ingest_timestamp.to_rfc3339()
    );
    println!("Data:        {}", source_label(sourced.source));
    Ok(())
}

// =============================================================================
// MODEL CATALOG COMMANDS
// =============================================================================

/// List offered models.
pub async fn cmd_models(config: &Config, json_mode: bool) -> Result<(), CliError> {
    let models = dashboard(config)?.models().await;

    if json_mode {
        print_json(&models);
        return Ok(());
    }

    println!(
        "{:<18} {:<20} {:>8} {:>9} {:>8} {:>8}",
        "ID", "NAME", "ACCURACY", "PRECISION", "RECALL", "F1"
    );
    for model in &models {
        let m = &model.metrics;
        println!(
            "{:<18} {:<20} {:>8.3} {:>9.3} {:>8.3} {:>8.3}",
            model.id, model.display_name, m.accuracy, m.precision, m.recall, m.f1
        );
    }
    Ok(())
}

/// Show the evaluation summary.
pub async fn cmd_metrics(config: &Config, json_mode: bool) -> Result<(), CliError> {
    let summary = dashboard(config)?.metrics().await;

    if json_mode {
        print_json(&summary);
        return Ok(());
    }

    let o = &summary.overall;
    println!("Overall");
    println!("=======");
    println!("Accuracy:  {:.3}", o.accuracy);
    println!("Precision: {:.3}", o.precision);
    println!("Recall:    {:.3}", o.recall);
    println!("F1:        {:.3}", o.f1);
    println!();

    println!("Per Model (accuracy)");
    println!("====================");
    for (id, metrics) in &summary.per_model {
        println!("{:<18} {:.3}", id, metrics.accuracy);
    }
    println!();

    println!("Confusion Matrix (rows: actual, columns: predicted)");
    println!("===================================================");
    print!("{:<16}", "");
    for class in CLASS_ORDER {
        print!("{:>16}", class.as_str());
    }
    println!();
    for (class, row) in CLASS_ORDER.iter().zip(summary.confusion_matrix.iter()) {
        print!("{:<16}", class.as_str());
        for count in row {
            print!("{:>16}", count);
        }
        println!();
    }
    Ok(())
}

/// Show feature importance in service order.
pub async fn cmd_features(config: &Config, json_mode: bool) -> Result<(), CliError> {
    let features = dashboard(config)?.features().await;

    if json_mode {
        print_json(&features);
        return Ok(());
    }

    for feature in &features {
        let bar = "#".repeat((feature.importance * 40.0).round() as usize);
        println!(
            "{:<22} {:>6.3} {}",
            feature.feature_name, feature.importance, bar
        );
    }
    Ok(())
}

// =============================================================================
// PREDICT COMMAND
// =============================================================================

/// Classify one object and persist it as the latest classification.
pub async fn cmd_predict(
    config: &Config,
    json_mode: bool,
    model: Option<String>,
    features: &[String],
) -> Result<(), CliError> {
    let mut form = ClassificationForm::new();
    if let Some(model) = model {
        form = form.model(model);
    }
    for arg in features {
        let (name, value) = parse_feature_arg(arg)?;
        form = form.field(name, value);
    }

    let store = RedbStore::open(&config.storage.history_db)?;
    let mut workflow = ClassifyWorkflow::new(dashboard(config)?, store);

    match workflow.submit(&form).await {
        ClassifyState::Succeeded(result) => {
            if json_mode {
                print_json(result);
                return Ok(());
            }
            let p = &result.class_probabilities;
            println!("Prediction: {}", result.predicted_class);
            println!("Confidence: {:.2}", result.confidence());
            println!();
            println!("Probabilities");
            println!("  confirmed:      {:.3}", p.confirmed);
            println!("  candidate:      {:.3}", p.candidate);
            println!("  false_positive: {:.3}", p.false_positive);
            println!();
            println!("SHAP Contributions");
            for c in &result.shap_contributions {
                println!("  {:<22} {:>12.4} {:>+8.4}", c.feature, c.value, c.contribution);
            }
            println!();
            println!("{}", result.rationale);
            Ok(())
        }
        ClassifyState::Failed(errors) => {
            if json_mode {
                print_json(errors);
            } else {
                for e in &errors.0 {
                    eprintln!("  {}: {}", e.field, e.message);
                }
            }
            Err(CliError::Core(exoai_core::ExoError::Validation(
                errors.clone(),
            )))
        }
        ClassifyState::Idle | ClassifyState::Submitting => Err(CliError::InvalidArgument(
            "classification did not complete".to_string(),
        )),
    }
}

// =============================================================================
// DATASET COMMAND
// =============================================================================

/// Show one dataset page, optionally writing it as CSV.
pub async fn cmd_dataset(
    config: &Config,
    json_mode: bool,
    query: &DatasetQuery,
    csv: Option<&Path>,
) -> Result<(), CliError> {
    let page = dashboard(config)?.dataset(query).await;

    if let Some(path) = csv {
        let out = validate_output_path(path)?;
        let text = exoai_core::csv::export_rows(&page.rows)?;
        std::fs::write(&out, text)
            .map_err(|e| CliError::Io(format!("Failed to write '{}': {}", out.display(), e)))?;
        tracing::info!(rows = page.rows.len(), path = %out.display(), "dataset exported");
    }

    if json_mode {
        print_json(&page);
        return Ok(());
    }

    println!(
        "{:<10} {:<7} {:<15} {:>10} {:>8} {:>10} {:>7}",
        "ID", "MISSION", "LABEL", "PERIOD", "RADIUS", "DEPTH", "TEFF"
    );
    for row in &page.rows {
        println!(
            "{:<10} {:<7} {:<15} {:>10.2} {:>8.2} {:>10.1} {:>7.0}",
            row.id,
            row.mission.as_str(),
            row.label.as_str(),
            row.orbital_period,
            row.planetary_radius,
            row.transit_depth,
            row.stellar_teff
        );
    }
    println!();
    println!(
        "Page {} - {} of {} rows",
        query.page.max(1),
        page.rows.len(),
        page.total
    );
    Ok(())
}

// =============================================================================
// SHAP COMMAND
// =============================================================================

/// Show SHAP attributions of the sample objects.
pub async fn cmd_shap(config: &Config, json_mode: bool) -> Result<(), CliError> {
    let samples = dashboard(config)?.shap_samples().await;

    if json_mode {
        print_json(&samples);
        return Ok(());
    }

    for sample in &samples {
        println!("{}", sample.id);
        for c in &sample.shap {
            println!("  {:<22} {:>12.4} {:>+8.4}", c.feature, c.value, c.contribution);
        }
    }
    Ok(())
}

// =============================================================================
// PREDICT-CSV COMMAND
// =============================================================================

/// Annotate a CSV batch and write it to `output` or stdout.
pub async fn cmd_predict_csv(
    config: &Config,
    input: &Path,
    output: Option<&Path>,
) -> Result<(), CliError> {
    let input = validate_file_path(input)?;
    validate_file_size(&input, MAX_UPLOAD_FILE_SIZE)?;
    let bytes = std::fs::read(&input)
        .map_err(|e| CliError::Io(format!("Failed to read '{}': {}", input.display(), e)))?;
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "upload.csv".to_string());

    let annotated = dashboard(config)?.predict_csv(&file_name, bytes).await;

    match output {
        Some(path) => {
            let out = validate_output_path(path)?;
            std::fs::write(&out, &annotated).map_err(|e| {
                CliError::Io(format!("Failed to write '{}': {}", out.display(), e))
            })?;
            println!("Annotated CSV written to {}", out.display());
        }
        None => print!("{}", String::from_utf8_lossy(&annotated)),
    }
    Ok(())
}

// =============================================================================
// HISTORY COMMAND
// =============================================================================

/// Show or clear the persisted latest classification.
pub fn cmd_history(
    config: &Config,
    json_mode: bool,
    action: HistoryAction,
) -> Result<(), CliError> {
    let history = open_history(config)?;

    match action {
        HistoryAction::Show => {
            let entry = history.load_last()?;
            if json_mode {
                print_json(&entry);
                return Ok(());
            }
            match entry {
                Some(entry) => {
                    println!("Latest Classification");
                    println!("=====================");
                    println!("ID:         {}", entry.id);
                    println!("Timestamp:  {}", entry.timestamp.to_rfc3339());
                    println!("Prediction: {}", entry.result.predicted_class);
                    println!("Confidence: {:.2}", entry.result.confidence());
                    println!();
                    println!("Inputs");
                    for (name, value) in &entry.input_features {
                        println!("  {:<22} {}", name, value);
                    }
                }
                None => println!("No classification stored"),
            }
        }
        HistoryAction::Clear => {
            let existed = history.clear_last()?;
            if json_mode {
                print_json(&serde_json::json!({ "cleared": existed }));
            } else if existed {
                println!("Latest classification cleared");
            } else {
                println!("No classification stored");
            }
        }
    }
    Ok(())
}
