//! Configuration management for fittrack
//!
//! This module handles loading, parsing, and validating application configuration
//! from YAML files and environment variables.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Exercise data API configuration
    #[serde(default)]
    pub exercise_api: Option<ExerciseApiConfig>,

    /// Generative recommendation API configuration
    #[serde(default)]
    pub recommender: Option<RecommenderConfig>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileRead(format!("Failed to read config file: {}", e)))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(yaml);
        serde_yaml::from_str(&expanded)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse YAML: {}", e)))
    }

    /// Load configuration from environment variables with prefix FITTRACK_
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Ok(host) = std::env::var("FITTRACK_SERVER_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("FITTRACK_SERVER_PORT") {
            config.server.port = port
                .parse()
                .map_err(|_| ConfigError::Parse("Invalid port number".to_string()))?;
        }

        if let Ok(path) = std::env::var("FITTRACK_DATABASE_PATH") {
            config.database.path = path;
        }

        if let Ok(secret) = std::env::var("FITTRACK_JWT_SECRET") {
            config.auth.jwt_secret = Some(secret);
        }
        if let Ok(lifetime) = std::env::var("FITTRACK_TOKEN_LIFETIME_SECS") {
            config.auth.token_lifetime_secs = Some(lifetime.parse().map_err(|_| {
                ConfigError::Parse("Invalid token lifetime".to_string())
            })?);
        }

        if let Ok(api_key) = std::env::var("FITTRACK_EXERCISE_API_KEY") {
            let mut exercise = config.exercise_api.take().unwrap_or_default();
            exercise.api_key = api_key;
            if let Ok(base_url) = std::env::var("FITTRACK_EXERCISE_API_URL") {
                exercise.base_url = base_url;
            }
            config.exercise_api = Some(exercise);
        }

        if let Ok(api_key) = std::env::var("FITTRACK_RECOMMENDER_API_KEY") {
            let mut recommender = config.recommender.take().unwrap_or_default();
            recommender.api_key = api_key;
            if let Ok(model) = std::env::var("FITTRACK_RECOMMENDER_MODEL") {
                recommender.model = model;
            }
            config.recommender = Some(recommender);
        }

        if let Ok(level) = std::env::var("FITTRACK_LOG_LEVEL") {
            config.logging.level = level;
        }

        Ok(config)
    }

    /// Check the invariants that must hold before the server starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.auth.jwt_secret.as_deref() {
            None => {
                return Err(ConfigError::MissingRequired("auth.jwt_secret".to_string()));
            }
            Some(secret) if secret.trim().is_empty() => {
                return Err(ConfigError::InvalidValue(
                    "auth.jwt_secret must not be empty".to_string(),
                ));
            }
            Some(_) => {}
        }

        if self.auth.token_lifetime_secs == Some(0) {
            return Err(ConfigError::InvalidValue(
                "auth.token_lifetime_secs must be greater than zero".to_string(),
            ));
        }

        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            return Err(ConfigError::InvalidValue(format!(
                "logging.format must be 'json' or 'pretty', got '{}'",
                self.logging.format
            )));
        }

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by CORS (empty allows any origin)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthConfig {
    /// Secret used to sign and verify bearer tokens
    pub jwt_secret: Option<String>,

    /// Token lifetime in seconds (None = tokens never expire)
    #[serde(default)]
    pub token_lifetime_secs: Option<u64>,

    /// Upper bound on the user lookup performed for each request
    #[serde(default = "default_lookup_timeout")]
    pub lookup_timeout_ms: u64,
}

impl AuthConfig {
    pub fn token_lifetime(&self) -> Option<Duration> {
        self.token_lifetime_secs.map(Duration::from_secs)
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            token_lifetime_secs: None,
            lookup_timeout_ms: default_lookup_timeout(),
        }
    }
}

fn default_lookup_timeout() -> u64 {
    5000
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    #[serde(default = "default_database_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "fittrack.db".to_string()
}

/// Exercise data API (RapidAPI ExerciseDB) configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExerciseApiConfig {
    /// Base URL of the upstream API
    #[serde(default = "default_exercise_base_url")]
    pub base_url: String,

    /// Value sent as `x-rapidapi-key`
    #[serde(default)]
    pub api_key: String,

    /// Value sent as `x-rapidapi-host`
    #[serde(default = "default_exercise_host")]
    pub api_host: String,

    /// Request timeout in seconds
    #[serde(default = "default_upstream_timeout")]
    pub timeout_secs: u64,
}

impl Default for ExerciseApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_exercise_base_url(),
            api_key: String::new(),
            api_host: default_exercise_host(),
            timeout_secs: default_upstream_timeout(),
        }
    }
}

fn default_exercise_base_url() -> String {
    "https://exercisedb.p.rapidapi.com".to_string()
}

fn default_exercise_host() -> String {
    "exercisedb.p.rapidapi.com".to_string()
}

fn default_upstream_timeout() -> u64 {
    30
}

/// Generative recommendation API configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommenderConfig {
    /// Base URL of the generative language API
    #[serde(default = "default_recommender_base_url")]
    pub base_url: String,

    /// Model name used in the `generateContent` path
    #[serde(default = "default_recommender_model")]
    pub model: String,

    /// API key sent as the `key` query parameter
    #[serde(default)]
    pub api_key: String,

    /// Request timeout in seconds
    #[serde(default = "default_upstream_timeout")]
    pub timeout_secs: u64,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            base_url: default_recommender_base_url(),
            model: default_recommender_model(),
            api_key: String::new(),
            timeout_secs: default_upstream_timeout(),
        }
    }
}

fn default_recommender_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_recommender_model() -> String {
    "gemini-1.5-flash".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level or `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: `json` or `pretty`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

/// Configuration error types
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Error reading configuration file
    #[error("Failed to read configuration file: {0}")]
    FileRead(String),

    /// Error parsing configuration
    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    /// Invalid configuration value
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// Missing required configuration
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

/// Expand environment variables in a string
///
/// Supports `${VAR_NAME}` syntax. Unset variables are left as written.
fn expand_env_vars(input: &str) -> String {
    let re = regex_lite::Regex::new(r"\$\{([^}]+)\}")
        .expect("Invalid regex pattern for environment variable expansion");

    re.replace_all(input, |caps: &regex_lite::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| caps[0].to_string())
    })
    .into_owned()
}
