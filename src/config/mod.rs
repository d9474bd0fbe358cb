//! Configuration module
//!
//! Loads the `phoenix_resilience` section of a YAML (or JSON) file into an
//! immutable, fully-defaulted [`Configuration`].

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{
    ConfigLoader, ConfigParser, DEFAULT_CONFIG_PATH, JsonParser, LoadResult, LoadWarning,
    LoaderOptions, YamlParser, load_config,
};
pub use schema::Configuration;
pub use validation::{ValidationResult, Validator};
