//! Mitigation recommendations
//!
//! Serialized as `{"kind": <kind>, "parameters": {...}}`, where the shape of
//! `parameters` depends on `kind`. A recommendation is advisory only; this
//! crate never executes one.

use serde::{Deserialize, Serialize};

/// Realm used when an incident does not name one.
pub const DEFAULT_REALM: &str = "default";

/// Rate limiting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RateLimitMode {
    /// Let the enforcement point choose limits.
    Auto,
}

/// A recommended corrective action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "parameters", rename_all = "snake_case")]
pub enum Mitigation {
    /// Throttle traffic into the realm.
    RateLimit {
        /// Affected realm.
        realm: String,
        /// Limiting mode.
        mode: RateLimitMode,
    },

    /// Re-check capabilities granted within the realm.
    CapabilityValidation {
        /// Affected realm.
        realm: String,
        /// Force revalidation of existing grants.
        revalidate: bool,
    },

    /// Verify stored data integrity for the realm.
    IntegrityVerify {
        /// Affected realm.
        realm: String,
        /// Recompute Merkle roots instead of trusting cached ones.
        recompute_merkle: bool,
    },

    /// Nothing to do. Serializes with an empty `parameters` object.
    None {},
}

impl Mitigation {
    /// `rate_limit` in automatic mode.
    #[must_use]
    pub const fn rate_limit(realm: String) -> Self {
        Self::RateLimit {
            realm,
            mode: RateLimitMode::Auto,
        }
    }

    /// `capability_validation` with revalidation.
    #[must_use]
    pub const fn capability_validation(realm: String) -> Self {
        Self::CapabilityValidation {
            realm,
            revalidate: true,
        }
    }

    /// `integrity_verify` with Merkle recomputation.
    #[must_use]
    pub const fn integrity_verify(realm: String) -> Self {
        Self::IntegrityVerify {
            realm,
            recompute_merkle: true,
        }
    }

    /// The empty recommendation.
    #[must_use]
    pub const fn none() -> Self {
        Self::None {}
    }

    /// Wire name of the mitigation kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::RateLimit { .. } => "rate_limit",
            Self::CapabilityValidation { .. } => "capability_validation",
            Self::IntegrityVerify { .. } => "integrity_verify",
            Self::None {} => "none",
        }
    }

    /// Realm the mitigation targets, if any.
    #[must_use]
    pub fn realm(&self) -> Option<&str> {
        match self {
            Self::RateLimit { realm, .. }
            | Self::CapabilityValidation { realm, .. }
            | Self::IntegrityVerify { realm, .. } => Some(realm),
            Self::None {} => None,
        }
    }

    /// Returns `true` for the empty recommendation.
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None {})
    }
}
