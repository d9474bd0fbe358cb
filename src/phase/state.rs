//! Phase values and readings
//!
//! [`Phase`] is the closed set of operating modes. [`PhaseInput`] is what
//! callers actually hand in: a case-insensitive name that may or may not
//! be one of the three phases. Unrecognised names are kept verbatim so the
//! advisor can pass them through untouched.

use serde::Serialize;

/// Operating phase of the host system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    /// Healthy operation.
    Normal,
    /// Crisis: pressure exceeded the tolerated maximum.
    Nigredo,
    /// Recovery: coherence is back above the crisis threshold.
    Rubedo,
}

impl Phase {
    /// All phases, in cycle order.
    pub const ALL: [Self; 3] = [Self::Normal, Self::Nigredo, Self::Rubedo];

    /// Canonical name of the phase.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Nigredo => "Nigredo",
            Self::Rubedo => "Rubedo",
        }
    }

    /// Case-insensitive lookup by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(name))
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a string that names no phase.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown phase: {0}")]
pub struct UnknownPhase(pub String);

impl std::str::FromStr for Phase {
    type Err = UnknownPhase;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownPhase(s.to_string()))
    }
}

/// A caller-supplied phase, possibly unrecognised.
///
/// The original text is always retained: when no transition fires the
/// advisor hands it back exactly as received, casing included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseInput {
    raw: String,
    phase: Option<Phase>,
}

impl PhaseInput {
    /// Wraps a caller-supplied phase name.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let phase = Phase::from_name(&raw);
        Self { raw, phase }
    }

    /// The recognised phase, if any.
    #[must_use]
    pub const fn phase(&self) -> Option<Phase> {
        self.phase
    }

    /// The text exactly as supplied.
    #[must_use]
    pub fn as_raw(&self) -> &str {
        &self.raw
    }

    /// Consumes the input, returning the original text.
    #[must_use]
    pub fn into_raw(self) -> String {
        self.raw
    }
}

impl From<Phase> for PhaseInput {
    fn from(phase: Phase) -> Self {
        Self {
            raw: phase.as_str().to_string(),
            phase: Some(phase),
        }
    }
}

impl From<&str> for PhaseInput {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for PhaseInput {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

/// One health sample: coherence Ψ and pressure PE.
///
/// Neither value is range-checked. NaN never satisfies a threshold
/// comparison, so a NaN reading never causes a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    /// Coherence; higher is healthier. Typically in `[0, 1]`.
    pub psi: f64,
    /// Pressure; higher is worse. Typically non-negative.
    pub pe: f64,
}

impl Reading {
    /// Creates a reading.
    #[must_use]
    pub const fn new(psi: f64, pe: f64) -> Self {
        Self { psi, pe }
    }
}
