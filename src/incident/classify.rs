//! Incident classification
//!
//! A threat label is looked up in [`MITIGATION_TABLE`]. Labels with no
//! entry, including a missing label, map to [`Mitigation::None`].
//! Classification is total and never consults `Configuration::enabled`:
//! the master switch gates phase transitions only.

use serde_json::Value;

use crate::config::Configuration;
use crate::incident::mitigation::{DEFAULT_REALM, Mitigation};

// ============================================================================
// Threat classes
// ============================================================================

/// Known threat classifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThreatClass {
    /// `dos-attack`
    DosAttack,
    /// `injection`
    Injection,
    /// `capability-breach`
    CapabilityBreach,
    /// `treasury-exploit`
    TreasuryExploit,
    /// `integrity-violation`
    IntegrityViolation,
    /// Any other label, or none at all.
    Unrecognized,
}

impl ThreatClass {
    /// The recognised classes.
    pub const KNOWN: [Self; 5] = [
        Self::DosAttack,
        Self::Injection,
        Self::CapabilityBreach,
        Self::TreasuryExploit,
        Self::IntegrityViolation,
    ];

    /// Wire label, or `None` for [`ThreatClass::Unrecognized`].
    #[must_use]
    pub const fn label(self) -> Option<&'static str> {
        match self {
            Self::DosAttack => Some("dos-attack"),
            Self::Injection => Some("injection"),
            Self::CapabilityBreach => Some("capability-breach"),
            Self::TreasuryExploit => Some("treasury-exploit"),
            Self::IntegrityViolation => Some("integrity-violation"),
            Self::Unrecognized => None,
        }
    }

    /// Exact, case-sensitive lookup by label.
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|c| c.label() == Some(label))
            .unwrap_or(Self::Unrecognized)
    }
}

// ============================================================================
// Lookup table
// ============================================================================

/// Builds a mitigation for a realm.
pub type MitigationCtor = fn(String) -> Mitigation;

/// Classification to mitigation mapping. Classes absent here get
/// [`Mitigation::None`].
pub const MITIGATION_TABLE: [(ThreatClass, MitigationCtor); 5] = [
    (ThreatClass::DosAttack, Mitigation::rate_limit),
    (ThreatClass::Injection, Mitigation::rate_limit),
    (ThreatClass::CapabilityBreach, Mitigation::capability_validation),
    (ThreatClass::TreasuryExploit, Mitigation::capability_validation),
    (ThreatClass::IntegrityViolation, Mitigation::integrity_verify),
];

/// Builds the mitigation for `class` targeting `realm`.
#[must_use]
pub fn mitigation_for(class: ThreatClass, realm: String) -> Mitigation {
    MITIGATION_TABLE
        .iter()
        .find(|(c, _)| *c == class)
        .map_or_else(Mitigation::none, |(_, ctor)| ctor(realm))
}

// ============================================================================
// Incidents
// ============================================================================

/// A structured incident report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Incident {
    /// Threat label, if the report carried a usable one.
    pub threat: Option<String>,
    /// Affected realm.
    pub realm: String,
}

impl Default for Incident {
    fn default() -> Self {
        Self {
            threat: None,
            realm: DEFAULT_REALM.to_string(),
        }
    }
}

impl Incident {
    /// Creates an incident with an explicit threat label and realm.
    #[must_use]
    pub fn new(threat: impl Into<String>, realm: impl Into<String>) -> Self {
        Self {
            threat: Some(threat.into()),
            realm: realm.into(),
        }
    }

    /// Creates an incident in the default realm.
    #[must_use]
    pub fn with_threat(threat: impl Into<String>) -> Self {
        Self {
            threat: Some(threat.into()),
            ..Self::default()
        }
    }

    /// Reads an incident from a loosely-typed JSON object.
    ///
    /// - The label comes from `threatType`; when that is absent or empty
    ///   (null, `""`, `0`, `false`, `[]`, `{}`), `threat` is used instead.
    ///   A label that is not a string matches nothing.
    /// - `realm` defaults to `"default"` when absent or null. Non-string
    ///   realms are kept as their JSON text.
    /// - Anything that is not an object yields the default incident.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let label = obj
            .get("threatType")
            .filter(|v| is_truthy(v))
            .or_else(|| obj.get("threat"));
        let threat = label.and_then(Value::as_str).map(str::to_string);

        let realm = match obj.get("realm") {
            None | Some(Value::Null) => DEFAULT_REALM.to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };

        Self { threat, realm }
    }

    /// Classification of the threat label.
    #[must_use]
    pub fn class(&self) -> ThreatClass {
        self.threat
            .as_deref()
            .map_or(ThreatClass::Unrecognized, ThreatClass::from_label)
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Recommends a mitigation for an incident.
///
/// Total and independent of `config.enabled`.
#[must_use]
pub fn on_incident(_config: &Configuration, incident: &Incident) -> Mitigation {
    let class = incident.class();
    if class == ThreatClass::Unrecognized {
        if let Some(threat) = incident.threat.as_deref() {
            match suggest_threat(threat) {
                Some(suggestion) => tracing::debug!(
                    threat,
                    suggestion,
                    "unrecognized threat classification"
                ),
                None => tracing::debug!(threat, "unrecognized threat classification"),
            }
        }
    }
    mitigation_for(class, incident.realm.clone())
}

/// Suggests the closest known label for a misspelled one.
///
/// Returns the nearest label within a Damerau-Levenshtein distance of 3.
#[must_use]
pub fn suggest_threat(input: &str) -> Option<&'static str> {
    ThreatClass::KNOWN
        .into_iter()
        .filter_map(ThreatClass::label)
        .map(|label| (label, strsim::damerau_levenshtein(input, label)))
        .filter(|(_, dist)| *dist <= 3)
        .min_by_key(|(_, dist)| *dist)
        .map(|(label, _)| label)
}

// ============================================================================
// Tests
// ============================================================================
