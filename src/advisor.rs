//! The advisor facade.
//!
//! [`PhoenixAdvisor`] binds the phase rules and the incident table to one
//! immutable [`Configuration`]. It holds no other state, so a single
//! instance can be shared freely across threads and tasks.

use std::sync::Arc;

use crate::config::Configuration;
use crate::incident::{Incident, Mitigation, on_incident};
use crate::phase::{Phase, PhaseInput, PhaseTransition, Reading, advise, next_phase};
use crate::runner::{InputEvent, Response, SkipReason, parse_event};

/// The interface a host engine integrates against.
pub trait ResiliencePlugin {
    /// Recommends the next phase for `current` given one reading.
    fn next_phase(&self, current: Phase, psi: f64, pe: f64) -> Phase;

    /// Recommends a mitigation for an incident.
    fn on_incident(&self, incident: &Incident) -> Mitigation;
}

/// Stateless resilience advisor.
#[derive(Debug, Clone)]
pub struct PhoenixAdvisor {
    config: Arc<Configuration>,
}

impl PhoenixAdvisor {
    /// Creates an advisor over a loaded configuration.
    #[must_use]
    pub const fn new(config: Arc<Configuration>) -> Self {
        Self { config }
    }

    /// Creates an advisor with the documented defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(Arc::new(Configuration::default()))
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Permissive variant of [`ResiliencePlugin::next_phase`] for phase
    /// names supplied as text. See [`crate::phase::next_phase_str`].
    #[must_use]
    pub fn next_phase_str(&self, current: &str, psi: f64, pe: f64) -> String {
        crate::phase::next_phase_str(&self.config, current, psi, pe)
    }

    /// Like [`next_phase_str`](Self::next_phase_str) but also returns the
    /// fired transition, if any.
    #[must_use]
    pub fn advise(
        &self,
        current: PhaseInput,
        reading: Reading,
    ) -> (String, Option<PhaseTransition>) {
        advise(&self.config, current, reading)
    }

    /// Answers one protocol event given as JSON, without any side effects.
    ///
    /// # Errors
    ///
    /// Returns the [`SkipReason`] if the value is not a usable event.
    pub fn handle_event(&self, event: &serde_json::Value) -> Result<Response, SkipReason> {
        Ok(match parse_event(event)? {
            InputEvent::Reading { phase, reading } => Response::NextPhase {
                next_phase: self.advise(phase, reading).0,
            },
            InputEvent::Incident(incident) => Response::Mitigation(self.on_incident(&incident)),
        })
    }
}

impl Default for PhoenixAdvisor {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ResiliencePlugin for PhoenixAdvisor {
    fn next_phase(&self, current: Phase, psi: f64, pe: f64) -> Phase {
        next_phase(&self.config, current, psi, pe)
    }

    fn on_incident(&self, incident: &Incident) -> Mitigation {
        on_incident(&self.config, incident)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plugin_interface() {
        let advisor = PhoenixAdvisor::with_defaults();
        assert_eq!(advisor.next_phase(Phase::Normal, 0.5, 3.0), Phase::Nigredo);
        assert_eq!(
            advisor.on_incident(&Incident::new("treasury-exploit", "vault")),
            Mitigation::capability_validation("vault".to_string())
        );
    }

    #[test]
    fn test_disabled_still_classifies_incidents() {
        let advisor = PhoenixAdvisor::new(Arc::new(Configuration::disabled()));
        assert_eq!(advisor.next_phase_str("Normal", 0.0, 99.0), "Normal");
        assert_eq!(
            advisor
                .on_incident(&Incident::with_threat("integrity-violation"))
                .kind(),
            "integrity_verify"
        );
    }

    #[test]
    fn test_shared_across_threads() {
        let advisor = Arc::new(PhoenixAdvisor::with_defaults());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let advisor = Arc::clone(&advisor);
                std::thread::spawn(move || {
                    let pe = if i % 2 == 0 { 3.0 } else { 1.0 };
                    advisor.next_phase(Phase::Normal, 0.5, pe)
                })
            })
            .collect();

        for (i, handle) in handles.into_iter().enumerate() {
            let expected = if i % 2 == 0 {
                Phase::Nigredo
            } else {
                Phase::Normal
            };
            assert_eq!(handle.join().unwrap(), expected);
        }
    }

    #[test]
    fn test_handle_event() {
        let advisor = PhoenixAdvisor::default();
        assert_eq!(
            advisor.handle_event(&serde_json::json!({"pe": 3.0})),
            Ok(Response::NextPhase {
                next_phase: "Nigredo".to_string()
            })
        );
        // Defaults alone (Normal, pe 0.1) fire no rule.
        assert_eq!(
            advisor.handle_event(&serde_json::json!({"psi": 0.1})),
            Ok(Response::NextPhase {
                next_phase: "Normal".to_string()
            })
        );
        assert_eq!(
            advisor.handle_event(&serde_json::json!({"type": "incident", "threatType": "injection"})),
            Ok(Response::Mitigation(Mitigation::rate_limit("default".to_string())))
        );
        assert_eq!(
            advisor.handle_event(&serde_json::json!({"pe": "lots"})),
            Err(SkipReason::InvalidNumber)
        );
        assert_eq!(
            advisor.handle_event(&serde_json::json!(42)),
            Err(SkipReason::NotAnObject)
        );
    }

    #[test]
    fn test_advise_reports_transition() {
        let advisor = PhoenixAdvisor::default();
        let (next, transition) = advisor.advise(PhaseInput::from("rubedo"), Reading::new(0.9, 0.2));
        assert_eq!(next, "Normal");
        assert_eq!(transition.map(|t| t.from), Some(Phase::Rubedo));
    }
}
