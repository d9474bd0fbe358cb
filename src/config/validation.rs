//! Configuration validation
//!
//! Runs on the frozen [`Configuration`]. Non-finite thresholds are errors
//! because every comparison against them would be meaningless. Values that
//! are merely unusual produce warnings.
//!
//! Validation collects ALL issues rather than stopping at the first one.

use crate::config::schema::Configuration;
use crate::error::{Severity, ValidationIssue};

// ============================================================================
// Public API
// ============================================================================

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Validation errors (prevent loading).
    pub errors: Vec<ValidationIssue>,

    /// Validation warnings (informational).
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Returns `true` if there are any errors.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns `true` if validation passed (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Configuration validator.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<ValidationIssue>,
    warnings: Vec<ValidationIssue>,
}

impl Validator {
    /// Creates a new validator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a configuration and returns every issue found.
    pub fn validate(&mut self, config: &Configuration) -> ValidationResult {
        self.errors.clear();
        self.warnings.clear();

        self.validate_thresholds(config);
        self.validate_recovery_rates(config);
        self.validate_timing(config);

        ValidationResult {
            errors: std::mem::take(&mut self.errors),
            warnings: std::mem::take(&mut self.warnings),
        }
    }

    // ========================================================================
    // Checks
    // ========================================================================

    fn validate_thresholds(&mut self, config: &Configuration) {
        let psi_path = "crisis_threshold.psi_min";
        if config.psi_min.is_finite() {
            if !(0.0..=1.0).contains(&config.psi_min) {
                self.add_warning(
                    psi_path,
                    &format!(
                        "psi_min {} is outside [0, 1]; coherence readings usually are not",
                        config.psi_min
                    ),
                );
            }
        } else {
            self.add_error(psi_path, "psi_min must be a finite number");
        }

        let pe_path = "crisis_threshold.pe_max";
        if config.pe_max.is_finite() {
            if config.pe_max < 0.0 {
                self.add_warning(
                    pe_path,
                    &format!(
                        "pe_max {} is negative; Normal will escalate on any non-negative pressure",
                        config.pe_max
                    ),
                );
            }
        } else {
            self.add_error(pe_path, "pe_max must be a finite number");
        }
    }

    fn validate_recovery_rates(&mut self, config: &Configuration) {
        for (path, value) in [
            ("recovery_rates.rubedo_growth", config.rubedo_growth),
            (
                "recovery_rates.pressure_discharge",
                config.pressure_discharge,
            ),
        ] {
            if !value.is_finite() {
                self.add_error(path, "recovery rate must be a finite number");
            } else if value < 0.0 {
                self.add_warning(path, &format!("recovery rate {value} is negative"));
            }
        }
    }

    fn validate_timing(&mut self, config: &Configuration) {
        for (path, value) in [
            ("timing.rubedo_cycles", config.rubedo_cycles),
            ("timing.stabilization_cycles", config.stabilization_cycles),
        ] {
            if value == 0 {
                self.add_warning(path, "cycle count is zero");
            }
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn add_error(&mut self, path: &str, message: &str) {
        self.errors.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Error,
        });
    }

    fn add_warning(&mut self, path: &str, message: &str) {
        self.warnings.push(ValidationIssue {
            path: path.to_string(),
            message: message.to_string(),
            severity: Severity::Warning,
        });
    }
}

// ============================================================================
// Tests
// ============================================================================
