//! Phase transition rules
//!
//! The rules form an ordered list, first match wins. Each rule is gated on
//! a distinct source phase, so at most one can ever match.
//!
//! | from    | condition                  | to      |
//! |---------|----------------------------|---------|
//! | Normal  | `pe > pe_max`              | Nigredo |
//! | Nigredo | `psi >= psi_min`           | Rubedo  |
//! | Rubedo  | `psi >= 0.83 && pe <= 0.5` | Normal  |
//!
//! The comparison operators are part of the contract: pressure escalates
//! strictly above `pe_max` but stabilizes at or below `0.5`.

use crate::config::Configuration;
use crate::phase::state::{Phase, PhaseInput, Reading};

/// Coherence required to leave recovery. Fixed, not configurable.
pub const STABLE_PSI: f64 = 0.83;

/// Maximum pressure allowed to leave recovery. Fixed, not configurable.
pub const STABLE_PE: f64 = 0.5;

/// A single transition rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransitionRule {
    /// `Normal` → `Nigredo` on sustained pressure.
    PressureEscalation,
    /// `Nigredo` → `Rubedo` once coherence crosses the crisis threshold.
    CoherenceRecovery,
    /// `Rubedo` → `Normal` once coherence is high and pressure is low.
    Stabilization,
}

impl TransitionRule {
    /// Rules in evaluation order.
    pub const ORDERED: [Self; 3] = [
        Self::PressureEscalation,
        Self::CoherenceRecovery,
        Self::Stabilization,
    ];

    /// Phase this rule applies to.
    #[must_use]
    pub const fn source(self) -> Phase {
        match self {
            Self::PressureEscalation => Phase::Normal,
            Self::CoherenceRecovery => Phase::Nigredo,
            Self::Stabilization => Phase::Rubedo,
        }
    }

    /// Phase this rule moves to.
    #[must_use]
    pub const fn target(self) -> Phase {
        match self {
            Self::PressureEscalation => Phase::Nigredo,
            Self::CoherenceRecovery => Phase::Rubedo,
            Self::Stabilization => Phase::Normal,
        }
    }

    /// Stable identifier used in logs, events and metrics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::PressureEscalation => "pressure_escalation",
            Self::CoherenceRecovery => "coherence_recovery",
            Self::Stabilization => "stabilization",
        }
    }

    /// Whether the rule's threshold condition holds for `reading`.
    ///
    /// Does not look at the current phase; see [`matches`](Self::matches).
    #[must_use]
    pub fn condition_holds(self, config: &Configuration, reading: Reading) -> bool {
        match self {
            Self::PressureEscalation => reading.pe > config.pe_max,
            Self::CoherenceRecovery => reading.psi >= config.psi_min,
            Self::Stabilization => reading.psi >= STABLE_PSI && reading.pe <= STABLE_PE,
        }
    }

    /// Whether the rule fires for `current` and `reading`.
    #[must_use]
    pub fn matches(self, config: &Configuration, current: Phase, reading: Reading) -> bool {
        self.source() == current && self.condition_holds(config, reading)
    }

    /// Human-readable account of why the rule fired.
    #[must_use]
    pub fn reason(self, config: &Configuration, reading: Reading) -> String {
        match self {
            Self::PressureEscalation => {
                format!("pe {} > pe_max {}", reading.pe, config.pe_max)
            }
            Self::CoherenceRecovery => {
                format!("psi {} >= psi_min {}", reading.psi, config.psi_min)
            }
            Self::Stabilization => format!(
                "psi {} >= {STABLE_PSI} and pe {} <= {STABLE_PE}",
                reading.psi, reading.pe
            ),
        }
    }
}

/// Record of a fired transition.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseTransition {
    /// Phase before the transition.
    pub from: Phase,
    /// Phase after the transition.
    pub to: Phase,
    /// The rule that fired.
    pub rule: TransitionRule,
    /// Reading that triggered it.
    pub reading: Reading,
}

/// Evaluates the rule list for a recognised phase.
///
/// Returns `None` when the advisor is disabled or no rule fires.
#[must_use]
pub fn evaluate(
    config: &Configuration,
    current: Phase,
    reading: Reading,
) -> Option<PhaseTransition> {
    if !config.enabled {
        return None;
    }
    TransitionRule::ORDERED
        .into_iter()
        .find(|rule| rule.matches(config, current, reading))
        .map(|rule| PhaseTransition {
            from: current,
            to: rule.target(),
            rule,
            reading,
        })
}

/// Recommends the next phase.
#[must_use]
pub fn next_phase(config: &Configuration, current: Phase, psi: f64, pe: f64) -> Phase {
    evaluate(config, current, Reading::new(psi, pe)).map_or(current, |t| t.to)
}

/// Recommends the next phase for a caller-supplied phase name.
///
/// Matching is case-insensitive. When a rule fires the canonical name of
/// the new phase is returned; otherwise the input comes back verbatim,
/// including names that match no phase at all.
#[must_use]
pub fn next_phase_str(config: &Configuration, current: &str, psi: f64, pe: f64) -> String {
    advise(config, PhaseInput::new(current), Reading::new(psi, pe)).0
}

/// Shared implementation behind the string entry points. Returns the
/// resulting phase name and the transition, if one fired.
#[must_use]
pub fn advise(
    config: &Configuration,
    current: PhaseInput,
    reading: Reading,
) -> (String, Option<PhaseTransition>) {
    let transition = current
        .phase()
        .and_then(|phase| evaluate(config, phase, reading));
    match transition {
        Some(t) => (t.to.as_str().to_string(), Some(t)),
        None => (current.into_raw(), None),
    }
}

// ============================================================================
// Tests
// ============================================================================
