mod common;

use std::io::Write;

use common::PhoenixProcess;
use phoenix_resilience::config::{ConfigLoader, Configuration, load_config};
use phoenix_resilience::error::ConfigError;

#[test]
fn shipped_sample_matches_defaults() {
    let path =
        std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/phoenix_resilience.yaml");
    let config = load_config(&path).unwrap();
    assert_eq!(*config, Configuration::default());
}

#[test]
fn default_fixture_matches_defaults() {
    let config = load_config(&PhoenixProcess::fixture_path("default.yaml")).unwrap();
    assert_eq!(*config, Configuration::default());
}

#[test]
fn partial_fixture_completes_with_defaults() {
    let config = load_config(&PhoenixProcess::fixture_path("partial.yaml")).unwrap();
    assert_eq!(
        *config,
        Configuration {
            pe_max: 5.0,
            ..Configuration::default()
        }
    );
}

#[test]
fn empty_fixture_is_all_defaults() {
    let config = load_config(&PhoenixProcess::fixture_path("empty.yaml")).unwrap();
    assert_eq!(*config, Configuration::default());
}

#[test]
fn disabled_fixture() {
    let config = load_config(&PhoenixProcess::fixture_path("disabled.yaml")).unwrap();
    assert!(!config.enabled);
    assert!((config.psi_min - 0.21).abs() < f64::EPSILON);
}

#[test]
fn yaml11_off_disables_advisor() {
    let config = load_config(&PhoenixProcess::fixture_path("disabled_off.yaml")).unwrap();
    assert!(!config.enabled);
    assert!(!config.phi_modulation);
    assert!(config.fibonacci_cadence);
}

#[test]
fn json_fixture_loads() {
    let config = load_config(&PhoenixProcess::fixture_path("thresholds.json")).unwrap();
    assert!((config.psi_min - 0.5).abs() < f64::EPSILON);
    assert!((config.pe_max - 1.0).abs() < f64::EPSILON);
    assert_eq!(config.rubedo_cycles, 8);
}

#[test]
fn failures_are_typed() {
    let err = load_config(&PhoenixProcess::fixture_path("malformed.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }), "{err:?}");

    let err = load_config(&PhoenixProcess::fixture_path("wrong_type.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }), "{err:?}");

    let err = load_config(&PhoenixProcess::fixture_path("nan.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError { .. }), "{err:?}");

    let err = load_config(&PhoenixProcess::fixture_path("does_not_exist.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::MissingFile { .. }), "{err:?}");
}

#[test]
fn warnings_fixture_loads_with_warning() {
    let result = ConfigLoader::with_defaults()
        .load(&PhoenixProcess::fixture_path("warnings.yaml"))
        .unwrap();
    assert!((result.config.psi_min - 1.5).abs() < f64::EPSILON);
    assert_eq!(result.warnings.len(), 1);
}

#[test]
fn null_sections_fall_back_to_defaults() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(
        file,
        "phoenix_resilience:\n  crisis_threshold:\n  timing:\n    rubedo_cycles: ~\n  enabled:"
    )
    .unwrap();

    let config = load_config(file.path()).unwrap();
    assert_eq!(*config, Configuration::default());
}

#[test]
fn unrelated_top_level_keys_are_ignored() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(
        file,
        "other_plugin:\n  enabled: false\nphoenix_resilience:\n  timing:\n    stabilization_cycles: 21"
    )
    .unwrap();

    let config = load_config(file.path()).unwrap();
    assert!(config.enabled);
    assert_eq!(config.stabilization_cycles, 21);
}
