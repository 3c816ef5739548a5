use crate::{
    commands::Commands,
    config::{ImportConfig, resolve_settings},
    env::EnvManager,
    error::CliError,
    shutdown::{EXIT_INTERRUPTED, ShutdownCoordinator},
};
use clap::Parser;
use connectors::http::processor::HttpBatchProcessor;
use engine_config::report::{dry_run::PlanPreview, summary::ImportReport};
use engine_core::{input::normalizer::normalize, plan::batch::BatchPlan};
use engine_runtime::Importer;
use model::import::status::ImportStatus;
use std::{path::PathBuf, sync::Arc};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod env;
mod error;
mod operator;
mod output;
mod shutdown;

#[derive(Parser)]
#[command(name = "sluice", version, about = "Chunked, pausable batch importer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Logs go to stderr so stdout stays clean for reports
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Import {
            input,
            target,
            endpoint,
            timeout_secs,
            env_file,
            output,
            json,
        } => {
            let mut env = EnvManager::from_process();
            if let Some(path) = &env_file {
                env.load_from_file(path)?;
            }

            let config = ImportConfig::resolve(&input, target, endpoint, timeout_secs, &env)?;
            if run_import(config, output, json).await? {
                std::process::exit(EXIT_INTERRUPTED);
            }
        }
        Commands::Plan { input, json } => {
            let settings = resolve_settings(&input, &EnvManager::from_process())?;
            let text = tokio::fs::read_to_string(&input.file).await?;

            let records = normalize(&text, settings.header_detector().as_ref());
            if records.is_empty() {
                warn!(file = %input.file.display(), "Input contains no data rows");
            }
            let plan = BatchPlan::new(records.len(), settings.batch_size)?;
            let preview = PlanPreview::build(&records, &plan, &settings);

            if json {
                println!("{}", output::to_json(&preview)?);
            } else {
                output::print_plan(&preview);
            }
        }
    }

    Ok(())
}

/// Runs one import to the end. Returns `true` when it was stopped by a signal.
async fn run_import(
    config: ImportConfig,
    output_path: Option<PathBuf>,
    json: bool,
) -> Result<bool, CliError> {
    let text = tokio::fs::read_to_string(&config.file).await?;
    let processor = HttpBatchProcessor::new(config.endpoint.clone())?
        .with_api_token(config.api_token.clone());
    info!(endpoint = %processor.endpoint(), "Batches will be posted to endpoint");

    let importer = Arc::new(Importer::new(
        config.target,
        Arc::new(processor),
        config.settings,
    )?);
    let batch_size = importer.settings().batch_size;

    let shutdown = ShutdownCoordinator::new();
    shutdown.register_handlers();

    let mut progress = importer.subscribe();
    let run_id = importer.start(&text, batch_size)?;
    info!(
        run_id = %run_id,
        file = %config.file.display(),
        "Type 'pause', 'resume' or 'stop' and press Enter to control the import"
    );
    let operator = operator::listen(importer.clone());

    let mut finished = std::pin::pin!(importer.wait());
    let mut stop_sent = false;
    let state = loop {
        tokio::select! {
            result = &mut finished => break result?,
            changed = progress.changed() => {
                if changed.is_ok() {
                    output::print_progress(&progress.borrow_and_update());
                }
            }
            _ = shutdown.signalled(), if !stop_sent => {
                stop_sent = true;
                importer.stop();
            }
        }
    };
    operator.abort();
    output::print_progress(&state);

    let report = ImportReport::new(
        importer.target(),
        &state,
        importer.settings().error_tail,
        importer.metrics(),
    );
    match output_path {
        Some(path) => {
            output::write_report(&report, &path).await?;
            info!(path = %path.display(), "Report written");
        }
        None if json => println!("{}", output::to_json(&report)?),
        None => output::print_summary(&report),
    }

    Ok(shutdown.is_signalled() && state.status == ImportStatus::Stopped)
}
