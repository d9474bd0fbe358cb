//! Phoenix resilience-phase advisor.
//!
//! Recommends a resilience phase (`Normal`, `Nigredo`, `Rubedo`) from
//! coherence (`psi`) and pressure (`pe`) readings, and a mitigation for
//! classified incidents. Decisions are pure functions of the input and an
//! immutable [`Configuration`].
//!
//! ```
//! use phoenix_resilience::{Configuration, Phase, next_phase};
//!
//! let config = Configuration::default();
//! assert_eq!(next_phase(&config, Phase::Normal, 0.208, 2.5), Phase::Nigredo);
//! ```

pub mod advisor;
pub mod cli;
pub mod config;
pub mod error;
pub mod incident;
pub mod observability;
pub mod phase;
pub mod runner;

pub use advisor::{PhoenixAdvisor, ResiliencePlugin};
pub use config::{Configuration, load_config};
pub use error::{ConfigError, PhoenixError};
pub use incident::{Incident, Mitigation, on_incident};
pub use phase::{Phase, next_phase, next_phase_str};
