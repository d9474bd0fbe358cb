//! Configuration schema
//!
//! Two layers:
//!
//! - [`RawDocument`] mirrors the YAML file layout. Every section and field
//!   is optional so that partially specified files deserialize cleanly.
//! - [`Configuration`] is the frozen, fully-defaulted value object the
//!   advisor consumes.

use serde::de::{self, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Defaults
// ============================================================================

/// Default minimum coherence required to leave the crisis phase.
pub const DEFAULT_PSI_MIN: f64 = 0.21;

/// Default maximum tolerated pressure before leaving the normal phase.
pub const DEFAULT_PE_MAX: f64 = 2.4;

/// Default recovery growth rate.
pub const DEFAULT_RUBEDO_GROWTH: f64 = 1.618;

/// Default pressure discharge rate.
pub const DEFAULT_PRESSURE_DISCHARGE: f64 = 0.7;

/// Default number of recovery cycles.
pub const DEFAULT_RUBEDO_CYCLES: u32 = 8;

/// Default number of stabilization cycles.
pub const DEFAULT_STABILIZATION_CYCLES: u32 = 13;

// ============================================================================
// Frozen Configuration
// ============================================================================

/// Thresholds governing phase-transition sensitivity.
///
/// Immutable after construction; share it behind an `Arc`.
///
/// Only `enabled`, `psi_min` and `pe_max` are consulted by the transition
/// rules today. The remaining fields are carried so that richer,
/// rate-of-change based rules can be added without a schema change.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Configuration {
    /// Master switch. When `false`, `next_phase` is a pass-through.
    pub enabled: bool,

    /// Minimum coherence (Ψ) to move from `Nigredo` to `Rubedo`.
    pub psi_min: f64,

    /// Maximum pressure (PE) tolerated in `Normal`.
    pub pe_max: f64,

    /// Recovery growth rate. Not yet consulted by transition logic.
    pub rubedo_growth: f64,

    /// Pressure discharge rate. Not yet consulted by transition logic.
    pub pressure_discharge: f64,

    /// Recovery cycle count. Not yet consulted by transition logic.
    pub rubedo_cycles: u32,

    /// Stabilization cycle count. Not yet consulted by transition logic.
    pub stabilization_cycles: u32,

    /// Golden-ratio modulation flag. Not yet consulted by transition logic.
    pub phi_modulation: bool,

    /// Fibonacci cadence flag. Not yet consulted by transition logic.
    pub fibonacci_cadence: bool,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            enabled: true,
            psi_min: DEFAULT_PSI_MIN,
            pe_max: DEFAULT_PE_MAX,
            rubedo_growth: DEFAULT_RUBEDO_GROWTH,
            pressure_discharge: DEFAULT_PRESSURE_DISCHARGE,
            rubedo_cycles: DEFAULT_RUBEDO_CYCLES,
            stabilization_cycles: DEFAULT_STABILIZATION_CYCLES,
            phi_modulation: true,
            fibonacci_cadence: true,
        }
    }
}

impl Configuration {
    /// Returns a default configuration with the master switch turned off.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

// ============================================================================
// Raw File Schema
// ============================================================================

/// Top-level document of a configuration file.
///
/// Keys other than `phoenix_resilience` are ignored so the section can live
/// inside a larger engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDocument {
    /// The advisor's section.
    pub phoenix_resilience: Option<RawSection>,
}

/// The `phoenix_resilience` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSection {
    /// Master switch.
    #[serde(default, deserialize_with = "flag")]
    pub enabled: Option<bool>,
    /// Crisis thresholds.
    pub crisis_threshold: Option<RawCrisisThreshold>,
    /// Recovery rates.
    pub recovery_rates: Option<RawRecoveryRates>,
    /// Timing parameters.
    pub timing: Option<RawTiming>,
    /// Modulation flags.
    pub sacred_ratios: Option<RawSacredRatios>,
}

/// `phoenix_resilience.crisis_threshold`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCrisisThreshold {
    /// Minimum coherence to leave crisis.
    pub psi_min: Option<f64>,
    /// Maximum pressure before crisis.
    pub pe_max: Option<f64>,
}

/// `phoenix_resilience.recovery_rates`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRecoveryRates {
    /// Recovery growth rate.
    pub rubedo_growth: Option<f64>,
    /// Pressure discharge rate.
    pub pressure_discharge: Option<f64>,
}

/// `phoenix_resilience.timing`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTiming {
    /// Recovery cycle count.
    pub rubedo_cycles: Option<u32>,
    /// Stabilization cycle count.
    pub stabilization_cycles: Option<u32>,
}

/// `phoenix_resilience.sacred_ratios`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSacredRatios {
    /// Golden-ratio modulation.
    #[serde(default, deserialize_with = "flag")]
    pub phi_modulation: Option<bool>,
    /// Fibonacci cadence.
    #[serde(default, deserialize_with = "flag")]
    pub fibonacci_cadence: Option<bool>,
}

/// Parses a YAML 1.1 boolean word (`yes`/`no`, `on`/`off`, `y`/`n`,
/// `true`/`false`), ignoring case.
#[must_use]
pub fn parse_flag_word(word: &str) -> Option<bool> {
    match word.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "on" => Some(true),
        "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

/// Deserializes an optional flag that may be a real boolean or a YAML 1.1
/// boolean word. `serde_yaml` resolves only `true`/`false` as booleans.
fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum FlagValue {
        Bool(bool),
        Word(String),
    }

    match Option::<FlagValue>::deserialize(deserializer)? {
        None => Ok(None),
        Some(FlagValue::Bool(b)) => Ok(Some(b)),
        Some(FlagValue::Word(word)) => parse_flag_word(&word)
            .map(Some)
            .ok_or_else(|| de::Error::invalid_value(Unexpected::Str(&word), &"a boolean")),
    }
}

impl RawDocument {
    /// Freezes the raw document into a fully-defaulted [`Configuration`].
    ///
    /// Absent sections, absent fields and explicit nulls all fall back to
    /// the documented defaults.
    #[must_use]
    pub fn into_configuration(self) -> Configuration {
        let section = self.phoenix_resilience.unwrap_or_default();
        let crisis = section.crisis_threshold.unwrap_or_default();
        let rates = section.recovery_rates.unwrap_or_default();
        let timing = section.timing.unwrap_or_default();
        let ratios = section.sacred_ratios.unwrap_or_default();

        Configuration {
            enabled: section.enabled.unwrap_or(true),
            psi_min: crisis.psi_min.unwrap_or(DEFAULT_PSI_MIN),
            pe_max: crisis.pe_max.unwrap_or(DEFAULT_PE_MAX),
            rubedo_growth: rates.rubedo_growth.unwrap_or(DEFAULT_RUBEDO_GROWTH),
            pressure_discharge: rates
                .pressure_discharge
                .unwrap_or(DEFAULT_PRESSURE_DISCHARGE),
            rubedo_cycles: timing.rubedo_cycles.unwrap_or(DEFAULT_RUBEDO_CYCLES),
            stabilization_cycles: timing
                .stabilization_cycles
                .unwrap_or(DEFAULT_STABILIZATION_CYCLES),
            phi_modulation: ratios.phi_modulation.unwrap_or(true),
            fibonacci_cadence: ratios.fibonacci_cadence.unwrap_or(true),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
