//! `phoenix-resilience`: resilience-phase advisor CLI.

use std::sync::atomic::{AtomicI32, Ordering};

use tokio_util::sync::CancellationToken;

use phoenix_resilience::cli::{self, commands};
use phoenix_resilience::error::{ExitCode, PhoenixError};
use phoenix_resilience::observability::init_logging;

/// Exit code owed to the first shutdown signal, 0 if none arrived.
static SIGNAL_EXIT: AtomicI32 = AtomicI32::new(ExitCode::SUCCESS);

#[tokio::main]
async fn main() {
    let cli = match cli::parse_args(std::env::args_os()) {
        Ok(Some(cli)) => cli,
        Ok(None) => std::process::exit(ExitCode::SUCCESS),
        Err(PhoenixError::Usage(message)) => {
            eprint!("{message}");
            std::process::exit(ExitCode::USAGE_ERROR);
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    };

    if !cli.quiet {
        init_logging(cli.log_format, cli.verbose, cli.color);
    }

    let cancel = CancellationToken::new();
    tokio::spawn(handle_signals(cancel.clone()));

    let result = commands::dispatch(cli, cancel).await;

    match result {
        Ok(()) => std::process::exit(SIGNAL_EXIT.load(Ordering::SeqCst)),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

/// First SIGINT/SIGTERM cancels gracefully; a second one exits at once.
async fn handle_signals(cancel: CancellationToken) {
    let mut sigterm =
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(signal) => signal,
            Err(e) => {
                tracing::warn!(error = %e, "failed to register SIGTERM handler");
                if tokio::signal::ctrl_c().await.is_ok() {
                    SIGNAL_EXIT.store(ExitCode::INTERRUPTED, Ordering::SeqCst);
                    cancel.cancel();
                }
                return;
            }
        };

    let code = tokio::select! {
        _ = tokio::signal::ctrl_c() => ExitCode::INTERRUPTED,
        _ = sigterm.recv() => ExitCode::TERMINATED,
    };
    SIGNAL_EXIT.store(code, Ordering::SeqCst);
    tracing::info!("shutting down after current line (signal again to force)");
    cancel.cancel();

    tokio::select! {
        _ = tokio::signal::ctrl_c() => std::process::exit(ExitCode::INTERRUPTED),
        _ = sigterm.recv() => std::process::exit(ExitCode::TERMINATED),
    }
}
