//! `run`: the NDJSON line runner over stdin/stdout.

use std::sync::Arc;

use chrono::Utc;
use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;

use crate::advisor::PhoenixAdvisor;
use crate::cli::args::RunArgs;
use crate::config::{Configuration, load_config};
use crate::error::PhoenixError;
use crate::observability::{Event, EventEmitter, init_metrics};
use crate::runner::{Runner, RunnerConfig};

/// Loads the configuration and answers events until EOF or cancellation.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded, the events
/// file or metrics listener cannot be set up, or stdin/stdout fail.
pub async fn run(args: &RunArgs, cancel: CancellationToken) -> Result<(), PhoenixError> {
    let (config, config_path) = if args.no_config {
        tracing::info!("using built-in default configuration");
        (Arc::new(Configuration::default()), None)
    } else {
        tracing::info!(path = %args.config.display(), "loading configuration");
        (
            load_config(&args.config)?,
            Some(args.config.display().to_string()),
        )
    };

    if let Some(port) = args.metrics_port {
        init_metrics(Some(port))?;
        tracing::info!(port, "metrics endpoint listening");
    }

    let emitter = match &args.events_file {
        Some(path) => EventEmitter::from_file(path)?,
        None => EventEmitter::noop(),
    };
    let emitter = Arc::new(emitter);
    emitter.emit(Event::RunnerStarted {
        timestamp: Utc::now(),
        config_path,
        enabled: config.enabled,
    });

    let runner_config = RunnerConfig::from_env();
    tracing::info!(
        enabled = config.enabled,
        psi_min = config.psi_min,
        pe_max = config.pe_max,
        max_line_size = runner_config.max_line_size,
        "runner started"
    );

    let runner = Runner::new(PhoenixAdvisor::new(config), emitter, runner_config, cancel);
    runner
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await?;
    Ok(())
}
