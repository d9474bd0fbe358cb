//! Command-line interface.
//!
//! Argument definitions live in [`args`]; each subcommand has a handler
//! module under [`commands`].

pub mod args;
pub mod commands;

use std::ffi::OsString;

use clap::Parser;

use crate::error::PhoenixError;
use args::Cli;

/// Parses command-line arguments.
///
/// Help and version requests are printed to stdout and yield `Ok(None)`.
///
/// # Errors
///
/// Rejected arguments become [`PhoenixError::Usage`] carrying clap's
/// rendered message, so they exit with the usage code rather than clap's
/// default.
pub fn parse_args<I, T>(args: I) -> Result<Option<Cli>, PhoenixError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Cli::try_parse_from(args) {
        Ok(cli) => Ok(Some(cli)),
        Err(e) if e.use_stderr() => Err(PhoenixError::Usage(e.render().to_string())),
        Err(e) => {
            let _ = e.print();
            Ok(None)
        }
    }
}
