//! CLI command dispatch and handlers.
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod advise;
pub mod completions;
pub mod incident;
pub mod run;
pub mod validate;
pub mod version;

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::cli::args::{Cli, Commands};
use crate::config::{Configuration, load_config};
use crate::error::PhoenixError;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// `cancel` is triggered by the signal handler; only long-running
/// commands observe it.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli, cancel: CancellationToken) -> Result<(), PhoenixError> {
    match cli.command {
        Commands::Run(args) => run::run(&args, cancel).await,
        Commands::Advise(args) => advise::run(&args),
        Commands::Incident(args) => incident::run(&args),
        Commands::Validate(args) => validate::run(&args),
        Commands::Completions(args) => {
            completions::run(&args);
            Ok(())
        }
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}

/// Loads `path` if given, otherwise returns the built-in defaults.
fn config_or_default(path: Option<&Path>) -> Result<Arc<Configuration>, PhoenixError> {
    match path {
        Some(path) => Ok(load_config(path)?),
        None => Ok(Arc::new(Configuration::default())),
    }
}
