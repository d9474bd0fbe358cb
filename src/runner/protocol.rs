//! Line protocol.
//!
//! One JSON object per input line. Objects whose `type` is `"incident"`
//! are incidents; everything else is a reading with optional `psi`
//! (default 0.5), `pe` (default 0.1) and `phase` (default `"Normal"`).
//! Each input produces exactly one output object, or none if the line is
//! malformed.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::incident::{Incident, Mitigation};
use crate::phase::{PhaseInput, Reading};

/// Coherence assumed when a reading omits `psi`.
pub const DEFAULT_PSI: f64 = 0.5;

/// Pressure assumed when a reading omits `pe`.
pub const DEFAULT_PE: f64 = 0.1;

/// Phase assumed when a reading omits `phase`.
pub const DEFAULT_PHASE: &str = "Normal";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Ask for the next phase.
    Reading {
        /// Current phase as supplied.
        phase: PhaseInput,
        /// The health sample.
        reading: Reading,
    },
    /// Ask for a mitigation.
    Incident(Incident),
}

/// One output line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    /// Answer to a reading.
    NextPhase {
        /// Recommended phase.
        next_phase: String,
    },
    /// Answer to an incident.
    Mitigation(Mitigation),
}

/// Why a line produced no output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Empty or whitespace-only line.
    Blank,
    /// Longer than the configured limit.
    TooLong,
    /// Not valid UTF-8.
    InvalidUtf8,
    /// Not valid JSON.
    InvalidJson,
    /// Valid JSON, but not an object.
    NotAnObject,
    /// `psi` or `pe` present but not numeric.
    InvalidNumber,
}

impl SkipReason {
    /// Stable identifier for logs, events and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blank => "blank",
            Self::TooLong => "too_long",
            Self::InvalidUtf8 => "invalid_utf8",
            Self::InvalidJson => "invalid_json",
            Self::NotAnObject => "not_an_object",
            Self::InvalidNumber => "invalid_number",
        }
    }
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses one input line.
///
/// # Errors
///
/// Returns the [`SkipReason`] for lines that must be skipped.
pub fn parse_line(line: &str) -> Result<InputEvent, SkipReason> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(SkipReason::Blank);
    }
    let value: Value = serde_json::from_str(trimmed).map_err(|_| SkipReason::InvalidJson)?;
    parse_event(&value)
}

/// Interprets an already-parsed JSON value.
///
/// # Errors
///
/// Returns [`SkipReason::NotAnObject`] or [`SkipReason::InvalidNumber`].
pub fn parse_event(value: &Value) -> Result<InputEvent, SkipReason> {
    let obj = value.as_object().ok_or(SkipReason::NotAnObject)?;

    if obj.get("type").and_then(Value::as_str) == Some("incident") {
        return Ok(InputEvent::Incident(Incident::from_value(value)));
    }

    let psi = number_field(obj, "psi", DEFAULT_PSI)?;
    let pe = number_field(obj, "pe", DEFAULT_PE)?;
    let phase = match obj.get("phase") {
        None | Some(Value::Null) => DEFAULT_PHASE.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };

    Ok(InputEvent::Reading {
        phase: PhaseInput::new(phase),
        reading: Reading::new(psi, pe),
    })
}

/// Reads a numeric field. Accepts JSON numbers, numeric strings, and
/// booleans (as 1/0).
fn number_field(obj: &Map<String, Value>, key: &str, default: f64) -> Result<f64, SkipReason> {
    match obj.get(key) {
        None => Ok(default),
        Some(Value::Number(n)) => n.as_f64().ok_or(SkipReason::InvalidNumber),
        Some(Value::String(s)) => s.trim().parse().map_err(|_| SkipReason::InvalidNumber),
        Some(Value::Bool(b)) => Ok(if *b { 1.0 } else { 0.0 }),
        Some(_) => Err(SkipReason::InvalidNumber),
    }
}
