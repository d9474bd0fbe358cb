//! Configuration loader
//!
//! Loading pipeline:
//! 1. Size check and raw read (UTF-8 BOM stripped)
//! 2. Parsing into a loosely-typed mapping through a [`ConfigParser`]
//! 3. Deserialization into the raw schema
//! 4. Freeze into a fully-defaulted [`Configuration`]
//! 5. Validation
//! 6. Wrap in `Arc`
//!
//! The decision core never touches this module; it only consumes the
//! resulting `Configuration`.

use crate::config::schema::{Configuration, RawDocument};
use crate::config::validation::Validator;
use crate::error::{ConfigError, ValidationIssue};

use serde_yaml::Value;
use std::path::Path;
use std::sync::Arc;

/// Default location of the configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/phoenix_resilience.yaml";

// ============================================================================
// Parsers
// ============================================================================

/// Turns raw configuration text into a loosely-typed mapping.
///
/// The loader depends only on this seam, never on a concrete format.
pub trait ConfigParser: Send + Sync {
    /// Short format name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Parses `text` into a value tree.
    ///
    /// # Errors
    ///
    /// Returns the parser's message and, when known, the 1-based line of
    /// the failure.
    fn parse(&self, text: &str) -> Result<Value, ParseFailure>;
}

/// A parser failure, before it is tied to a file path.
#[derive(Debug, Clone)]
pub struct ParseFailure {
    /// Line number where parsing failed, if the parser reports one.
    pub line: Option<usize>,
    /// Parser message.
    pub message: String,
}

/// YAML parser backed by `serde_yaml`.
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlParser;

impl ConfigParser for YamlParser {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn parse(&self, text: &str) -> Result<Value, ParseFailure> {
        serde_yaml::from_str(text).map_err(|e| ParseFailure {
            line: e.location().map(|l| l.line()),
            message: e.to_string(),
        })
    }
}

/// JSON parser backed by `serde_json`, producing the same value tree.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonParser;

impl ConfigParser for JsonParser {
    fn name(&self) -> &'static str {
        "json"
    }

    fn parse(&self, text: &str) -> Result<Value, ParseFailure> {
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(text).map_err(|e| ParseFailure {
            line: Some(e.line()),
            message: e.to_string(),
        })
    }
}

/// Picks a parser from the file extension: `.json` gets [`JsonParser`],
/// everything else [`YamlParser`].
#[must_use]
pub fn parser_for_path(path: &Path) -> Box<dyn ConfigParser> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => Box::new(JsonParser),
        _ => Box::new(YamlParser),
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Options for the configuration loader.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Maximum configuration file size in bytes.
    pub max_config_size: usize,

    /// Treat validation warnings as errors.
    pub strict: bool,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            max_config_size: env_or("PHOENIX_MAX_CONFIG_SIZE", 1024 * 1024),
            strict: false,
        }
    }
}

/// Result of loading a configuration file.
#[derive(Debug)]
pub struct LoadResult {
    /// The loaded and validated configuration.
    pub config: Arc<Configuration>,

    /// Warnings encountered during loading.
    pub warnings: Vec<LoadWarning>,
}

/// Warning during configuration loading.
#[derive(Debug, Clone)]
pub struct LoadWarning {
    /// Warning message.
    pub message: String,

    /// Location where the warning occurred.
    pub location: Option<String>,
}

impl From<ValidationIssue> for LoadWarning {
    fn from(issue: ValidationIssue) -> Self {
        Self {
            message: issue.message,
            location: Some(issue.path),
        }
    }
}

/// Configuration loader.
///
/// Handles the full pipeline from file to frozen `Configuration`.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: LoaderOptions,
}

impl ConfigLoader {
    /// Creates a new configuration loader with the given options.
    #[must_use]
    pub const fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    /// Creates a new configuration loader with default options.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(LoaderOptions::default())
    }

    /// Loads a configuration file, choosing the parser from its extension.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file is missing, unreadable or too large
    /// - Parsing fails or the document is not a mapping
    /// - A field has the wrong type
    /// - Validation fails (or, in strict mode, produces warnings)
    pub fn load(&self, path: &Path) -> Result<LoadResult, ConfigError> {
        let parser = parser_for_path(path);
        self.load_with(path, parser.as_ref())
    }

    /// Loads a configuration file with an explicit parser.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load).
    pub fn load_with(
        &self,
        path: &Path,
        parser: &dyn ConfigParser,
    ) -> Result<LoadResult, ConfigError> {
        let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
            path: path.to_path_buf(),
        })?;

        let file_size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if file_size > self.options.max_config_size {
            return Err(ConfigError::InvalidValue {
                field: "file_size".to_string(),
                value: format!("{file_size} bytes"),
                expected: format!("at most {} bytes", self.options.max_config_size),
            });
        }

        let raw_content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::InvalidData {
                ConfigError::ParseError {
                    path: path.to_path_buf(),
                    line: None,
                    message: "file is not valid UTF-8".to_string(),
                }
            } else {
                ConfigError::MissingFile {
                    path: path.to_path_buf(),
                }
            }
        })?;

        tracing::debug!(
            path = %path.display(),
            parser = parser.name(),
            bytes = raw_content.len(),
            "parsing configuration"
        );

        self.load_str(&raw_content, path, parser)
    }

    /// Runs the pipeline on already-read text. `origin` is only used in
    /// diagnostics.
    ///
    /// # Errors
    ///
    /// Same as [`load`](Self::load), minus the file access failures.
    pub fn load_str(
        &self,
        text: &str,
        origin: &Path,
        parser: &dyn ConfigParser,
    ) -> Result<LoadResult, ConfigError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);

        let root = parser.parse(text).map_err(|f| ConfigError::ParseError {
            path: origin.to_path_buf(),
            line: f.line,
            message: f.message,
        })?;

        let config = freeze(root, origin)?;

        let result = Validator::new().validate(&config);
        let mut errors = result.errors;
        let warnings = result.warnings;
        if self.options.strict {
            errors.extend(warnings.iter().cloned());
        }
        if !errors.is_empty() {
            return Err(ConfigError::ValidationError {
                path: origin.display().to_string(),
                errors,
            });
        }

        Ok(LoadResult {
            config: Arc::new(config),
            warnings: warnings.into_iter().map(LoadWarning::from).collect(),
        })
    }
}

/// Loads a configuration file with default loader options.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file is missing, malformed, or invalid.
pub fn load_config(path: &Path) -> Result<Arc<Configuration>, ConfigError> {
    let result = ConfigLoader::with_defaults().load(path)?;
    for warning in &result.warnings {
        tracing::warn!(
            location = warning.location.as_deref().unwrap_or("<unknown>"),
            "{}",
            warning.message
        );
    }
    Ok(result.config)
}

// ============================================================================
// Internals
// ============================================================================

/// Converts a parsed value tree into a `Configuration`.
fn freeze(root: Value, origin: &Path) -> Result<Configuration, ConfigError> {
    match root {
        // An empty document means "all defaults".
        Value::Null => Ok(Configuration::default()),
        Value::Mapping(_) => {
            let raw: RawDocument =
                serde_yaml::from_value(root).map_err(|e| ConfigError::InvalidValue {
                    field: "phoenix_resilience".to_string(),
                    value: e.to_string(),
                    expected: "numbers for thresholds and rates, non-negative integers for \
                               cycle counts, booleans for flags"
                        .to_string(),
                })?;
            Ok(raw.into_configuration())
        }
        other => Err(ConfigError::ParseError {
            path: origin.to_path_buf(),
            line: None,
            message: format!(
                "top-level document must be a mapping, got {}",
                value_kind(&other)
            ),
        }),
    }
}

const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Reads a numeric limit from the environment, falling back to `default`
/// when the variable is unset or does not parse.
pub(crate) fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ============================================================================
// Tests
// ============================================================================
