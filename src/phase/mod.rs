//! Phase advisor
//!
//! A stateless three-phase cycle, `Normal → Nigredo → Rubedo → Normal`,
//! driven by one coherence/pressure reading at a time. The caller supplies
//! the current phase on every call; nothing is remembered between calls.
//!
//! # Architecture
//!
//! - [`Phase`], [`PhaseInput`], [`Reading`]: values handed in and out
//! - [`engine`]: the ordered transition rule list and `next_phase`

pub mod engine;
pub mod state;

pub use engine::{
    PhaseTransition, STABLE_PE, STABLE_PSI, TransitionRule, advise, evaluate, next_phase,
    next_phase_str,
};
pub use state::{Phase, PhaseInput, Reading, UnknownPhase};
