//! CLI argument definitions
//!
//! All Clap derive structs for `phoenix-resilience` command-line parsing.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

use crate::config::DEFAULT_CONFIG_PATH;
use crate::observability::LogFormat;

// ============================================================================
// Root CLI
// ============================================================================

/// Resilience-phase advisor: phase transitions from coherence/pressure
/// readings, and mitigations for incidents.
#[derive(Parser, Debug)]
#[command(name = "phoenix-resilience", author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output control.
    #[arg(long, default_value = "auto", global = true, env = "PHOENIX_COLOR")]
    pub color: ColorChoice,

    /// Log output format.
    #[arg(long, default_value = "human", global = true, env = "PHOENIX_LOG_FORMAT")]
    pub log_format: LogFormat,
}

// ============================================================================
// Commands
// ============================================================================

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer NDJSON events from stdin on stdout, one line per event.
    Run(RunArgs),

    /// Recommend the next phase for a single reading.
    Advise(AdviseArgs),

    /// Recommend a mitigation for a single incident.
    Incident(IncidentArgs),

    /// Validate configuration files.
    Validate(ValidateArgs),

    /// Generate shell completion scripts.
    Completions(CompletionsArgs),

    /// Display version information.
    Version(VersionArgs),
}

/// Arguments for `run`.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the YAML (or JSON) configuration file.
    #[arg(
        short,
        long,
        default_value = DEFAULT_CONFIG_PATH,
        env = "PHOENIX_CONFIG",
        conflicts_with = "no_config"
    )]
    pub config: PathBuf,

    /// Skip the configuration file and use built-in defaults.
    #[arg(long)]
    pub no_config: bool,

    /// Write structured JSONL events to this file.
    #[arg(long, env = "PHOENIX_EVENTS_FILE")]
    pub events_file: Option<PathBuf>,

    /// Serve Prometheus metrics on 127.0.0.1:<PORT>.
    #[arg(long, env = "PHOENIX_METRICS_PORT")]
    pub metrics_port: Option<u16>,
}

/// Arguments for `advise`.
#[derive(Args, Debug)]
pub struct AdviseArgs {
    /// Current phase (case-insensitive; unknown names are passed through).
    #[arg(long, default_value = "Normal")]
    pub phase: String,

    /// Coherence reading.
    #[arg(long, default_value_t = 0.208, allow_negative_numbers = true)]
    pub psi: f64,

    /// Pressure reading.
    #[arg(long, default_value_t = 2.5, allow_negative_numbers = true)]
    pub pe: f64,

    /// Configuration file; built-in defaults when omitted.
    #[arg(short, long, env = "PHOENIX_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Arguments for `incident`.
#[derive(Args, Debug)]
pub struct IncidentArgs {
    /// Threat classification (e.g. `injection`, `dos-attack`).
    #[arg(long)]
    pub threat: Option<String>,

    /// Affected realm.
    #[arg(long)]
    pub realm: Option<String>,

    /// Configuration file; built-in defaults when omitted.
    #[arg(short, long, env = "PHOENIX_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Configuration files to validate.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,

    /// Treat warnings as errors.
    #[arg(long)]
    pub strict: bool,
}

/// Arguments for shell completion generation.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Target shell for completion script.
    pub shell: Shell,
}

/// Arguments for version display.
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output format.
    #[arg(short, long, default_value = "human")]
    pub format: OutputFormat,
}

// ============================================================================
// CLI-Local Enums
// ============================================================================

/// Color output choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Auto-detect terminal support.
    #[default]
    Auto,
    /// Always use color.
    Always,
    /// Never use color.
    Never,
}

/// Output format for structured output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output.
    #[default]
    Human,
    /// JSON output.
    Json,
}

/// Shell type for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell.
    Bash,
    /// Zsh shell.
    Zsh,
    /// Fish shell.
    Fish,
    /// `PowerShell`.
    #[value(name = "powershell")]
    PowerShell,
    /// Elvish shell.
    Elvish,
}

// ============================================================================
// Tests
// ============================================================================
