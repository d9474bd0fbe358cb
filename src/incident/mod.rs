//! Incident-to-mitigation mapping
//!
//! - [`Incident`]: a threat label plus the affected realm
//! - [`Mitigation`]: the recommended corrective action
//! - [`MITIGATION_TABLE`]: the auditable classification table

pub mod classify;
pub mod mitigation;

pub use classify::{
    Incident, MITIGATION_TABLE, MitigationCtor, ThreatClass, mitigation_for, on_incident,
    suggest_threat,
};
pub use mitigation::{DEFAULT_REALM, Mitigation, RateLimitMode};
