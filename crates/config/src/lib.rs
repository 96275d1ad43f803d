//! Configuration management for the fund query engine
//!
//! Supports loading configuration from:
//! - YAML/TOML files under `config/`
//! - Environment variables (FINSPEAK_ prefix, `__` for nesting)
//!
//! Also carries the curated glossary used to explain financial terms.

pub mod glossary;
pub mod settings;

pub use glossary::{Glossary, GlossaryEntry};
pub use settings::{
    load_settings, load_settings_from, ClassifierConfig, DataConfig, ExplainConfig, ExplanationPolicy,
    GenerativeConfig, MatcherConfig, ObservabilityConfig, ServerConfig, Settings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid settings: {}", .0.join("; "))]
    Validation(Vec<String>),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
