//! Main settings module

use std::path::Path;

use config::{Config, Environment, File};
use finspeak_core::SUPPORTED_PERIOD_MONTHS;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Data source locations
    #[serde(default)]
    pub data: DataConfig,

    /// Fund-name matcher tunables
    #[serde(default)]
    pub matcher: MatcherConfig,

    /// Intent classifier tunables
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Term explanation policy and generative client
    #[serde(default)]
    pub explain: ExplainConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration, collecting every problem found
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        self.validate_server(&mut errors);
        self.validate_matcher(&mut errors);
        self.validate_classifier(&mut errors);
        self.validate_explain(&mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_server(&self, errors: &mut Vec<String>) {
        if self.server.port == 0 {
            errors.push("server.port cannot be 0".to_string());
        }
        if self.server.timeout_seconds == 0 {
            errors.push("server.timeout_seconds must be at least 1 second".to_string());
        }
        if self.server.search_limit == 0 {
            errors.push("server.search_limit must be at least 1".to_string());
        }
    }

    fn validate_matcher(&self, errors: &mut Vec<String>) {
        let matcher = &self.matcher;
        if !(0.0..=1.0).contains(&matcher.acceptance_threshold) {
            errors.push(format!(
                "matcher.acceptance_threshold must be within [0, 1], got {}",
                matcher.acceptance_threshold
            ));
        }
        if !(0.0..=1.0).contains(&matcher.min_margin) {
            errors.push(format!(
                "matcher.min_margin must be within [0, 1], got {}",
                matcher.min_margin
            ));
        }
        if matcher.max_candidates == 0 {
            errors.push("matcher.max_candidates must be at least 1".to_string());
        }
    }

    fn validate_classifier(&self, errors: &mut Vec<String>) {
        if let Some(months) = self.classifier.default_return_months {
            if !SUPPORTED_PERIOD_MONTHS.contains(&months) {
                errors.push(format!(
                    "classifier.default_return_months must be one of {:?}, got {}",
                    SUPPORTED_PERIOD_MONTHS, months
                ));
            }
        }
    }

    fn validate_explain(&self, errors: &mut Vec<String>) {
        let generative = &self.explain.generative;
        if !generative.enabled {
            return;
        }
        if generative.endpoint.trim().is_empty() {
            errors.push("explain.generative.endpoint is required when enabled".to_string());
        }
        if generative.model.trim().is_empty() {
            errors.push("explain.generative.model is required when enabled".to_string());
        }
        if generative.timeout_secs == 0 {
            errors.push("explain.generative.timeout_secs must be at least 1".to_string());
        }
        if !(0.0..=2.0).contains(&generative.temperature) {
            errors.push(format!(
                "explain.generative.temperature must be within [0, 2], got {}",
                generative.temperature
            ));
        }
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Default number of results returned by /api/search
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_timeout() -> u64 {
    30
}
fn default_true() -> bool {
    true
}
fn default_search_limit() -> usize {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_timeout(),
            cors_enabled: true,
            cors_origins: Vec::new(),
            search_limit: default_search_limit(),
        }
    }
}

/// Data source locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Fund master CSV (`fund_id,name,house,category`)
    #[serde(default = "default_funds_csv")]
    pub funds_csv: String,

    /// NAV history CSV (`fund_id,date,nav`)
    #[serde(default = "default_nav_history_csv")]
    pub nav_history_csv: String,

    /// Curated glossary (YAML or JSON); built-in glossary when unset
    #[serde(default)]
    pub glossary_path: Option<String>,
}

fn default_funds_csv() -> String {
    "data/funds.csv".to_string()
}
fn default_nav_history_csv() -> String {
    "data/nav_history.csv".to_string()
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            funds_csv: default_funds_csv(),
            nav_history_csv: default_nav_history_csv(),
            glossary_path: None,
        }
    }
}

/// Fund-name matcher tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Minimum score for the top candidate to be accepted
    #[serde(default = "default_acceptance_threshold")]
    pub acceptance_threshold: f64,

    /// Minimum lead of the top candidate over the runner-up
    #[serde(default = "default_min_margin")]
    pub min_margin: f64,

    /// Candidates reported back to the caller
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
}

fn default_acceptance_threshold() -> f64 {
    0.6
}
fn default_min_margin() -> f64 {
    0.1
}
fn default_max_candidates() -> usize {
    5
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            acceptance_threshold: default_acceptance_threshold(),
            min_margin: default_min_margin(),
            max_candidates: default_max_candidates(),
        }
    }
}

/// Intent classifier tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Period used when a return keyword appears without a period phrase.
    /// `None` turns such queries into `Unknown`.
    #[serde(default = "default_return_months")]
    pub default_return_months: Option<u32>,
}

fn default_return_months() -> Option<u32> {
    Some(12)
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            default_return_months: default_return_months(),
        }
    }
}

/// Order in which explainers are consulted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ExplanationPolicy {
    /// Curated glossary only
    CuratedOnly,
    /// Curated glossary, then the generative explainer on a miss
    #[default]
    CuratedThenGenerative,
}

/// Term explanation configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExplainConfig {
    #[serde(default)]
    pub policy: ExplanationPolicy,

    #[serde(default)]
    pub generative: GenerativeConfig,
}

/// OpenAI-compatible chat-completions client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerativeConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Base URL; `/chat/completions` is appended
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Bearer token; the server falls back to `GROQ_API_KEY`
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_endpoint() -> String {
    "https://api.groq.com/openai/v1".to_string()
}
fn default_model() -> String {
    "llama-3.1-70b-versatile".to_string()
}
fn default_llm_timeout() -> u64 {
    30
}
fn default_max_tokens() -> u32 {
    200
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_retries() -> u32 {
    2
}

impl Default for GenerativeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_endpoint(),
            model: default_model(),
            api_key: None,
            timeout_secs: default_llm_timeout(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            max_retries: default_max_retries(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Expose Prometheus metrics on /metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from files and environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (FINSPEAK_ prefix, e.g. `FINSPEAK_SERVER__PORT`)
/// 2. config/{env}.yaml (if env specified)
/// 3. config/default.yaml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new("config"), env)
}

/// Same as [`load_settings`] with an explicit configuration directory
pub fn load_settings_from(dir: &Path, env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::from(dir.join("default")).required(false));

    if let Some(env_name) = env {
        builder = builder.add_source(File::from(dir.join(env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("FINSPEAK")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate().map_err(ConfigError::Validation)?;

    tracing::debug!(
        port = settings.server.port,
        policy = ?settings.explain.policy,
        "Loaded settings"
    );
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.matcher.acceptance_threshold, 0.6);
        assert_eq!(settings.matcher.min_margin, 0.1);
        assert_eq!(settings.classifier.default_return_months, Some(12));
        assert_eq!(settings.explain.policy, ExplanationPolicy::CuratedThenGenerative);
        assert!(!settings.explain.generative.enabled);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_matcher_validation() {
        let mut settings = Settings::default();
        settings.matcher.acceptance_threshold = 1.5;
        settings.matcher.min_margin = -0.1;

        let errors = settings.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("acceptance_threshold"));
    }

    #[test]
    fn test_classifier_validation() {
        let mut settings = Settings::default();
        settings.classifier.default_return_months = Some(24);
        assert!(settings.validate().is_err());

        settings.classifier.default_return_months = None;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_generative_validation() {
        let mut settings = Settings::default();
        settings.explain.generative.enabled = true;
        settings.explain.generative.model = String::new();
        assert!(settings.validate().is_err());

        settings.explain.generative.model = "some-model".to_string();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_server_validation() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.yaml"),
            "server:\n  port: 9100\nmatcher:\n  acceptance_threshold: 0.7\n",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("staging.yaml"),
            "explain:\n  policy: curated_only\n",
        )
        .unwrap();

        let settings = load_settings_from(dir.path(), Some("staging")).unwrap();
        assert_eq!(settings.server.port, 9100);
        assert_eq!(settings.matcher.acceptance_threshold, 0.7);
        assert_eq!(settings.matcher.min_margin, 0.1);
        assert_eq!(settings.explain.policy, ExplanationPolicy::CuratedOnly);
    }

    #[test]
    fn test_invalid_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.yaml"),
            "matcher:\n  acceptance_threshold: 3.0\n",
        )
        .unwrap();

        let err = load_settings_from(dir.path(), None).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }
}
