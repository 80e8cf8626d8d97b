//! Endpoint configuration for the prediction function.

use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

pub const ENV_URL: &str = "DRUG_GUARDIAN_URL";
pub const ENV_API_KEY: &str = "DRUG_GUARDIAN_API_KEY";
pub const ENV_FUNCTION: &str = "DRUG_GUARDIAN_FUNCTION";
pub const ENV_TIMEOUT_SECS: &str = "DRUG_GUARDIAN_TIMEOUT_SECS";

/// Name of the remote function that produces predictions.
pub const DEFAULT_FUNCTION_NAME: &str = "predict-side-effects";

/// Upper bound on a single prediction call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration errors.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),
}

/// Where and how to reach the prediction function.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictorConfig {
    /// Project base URL, e.g. `https://abc.supabase.co`
    pub base_url: String,
    /// Function name appended under `/functions/v1/`
    pub function_name: String,
    /// Sent as bearer token and `apikey` header when present
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl PredictorConfig {
    /// Create a config with defaults for everything but the base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            function_name: DEFAULT_FUNCTION_NAME.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_function_name(mut self, function_name: impl Into<String>) -> Self {
        self.function_name = function_name.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(ENV_URL)
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing(ENV_URL))?;

        let mut config = Self::new(base_url.trim());

        if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.trim().is_empty()) {
            config.api_key = Some(key.trim().to_string());
        }

        if let Some(name) = lookup(ENV_FUNCTION).filter(|v| !v.trim().is_empty()) {
            config.function_name = name.trim().to_string();
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(raw.clone()))?;
            config.timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the URL and timeout without building a client.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout("timeout must be positive".into()));
        }
        self.endpoint_url().map(|_| ())
    }

    /// Full URL of the prediction function.
    pub fn endpoint_url(&self) -> Result<Url, ConfigError> {
        let base = self.base_url.trim().trim_end_matches('/');

        let parsed = Url::parse(base)
            .map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", base, e)))?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(format!(
                "scheme must be http or https, got: {}",
                parsed.scheme()
            )));
        }

        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(ConfigError::InvalidUrl(
                "URL must not contain credentials".into(),
            ));
        }

        if self.function_name.is_empty() || self.function_name.contains('/') {
            return Err(ConfigError::InvalidUrl(format!(
                "invalid function name: '{}'",
                self.function_name
            )));
        }

        Url::parse(&format!("{}/functions/v1/{}", base, self.function_name))
            .map_err(|e| ConfigError::InvalidUrl(e.to_string()))
    }
}
