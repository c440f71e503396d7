use secrecy::{ExposeSecret, SecretString};
use std::net::SocketAddr;

use crate::billing::validate_api_key;
use crate::error::ConfigError;
use crate::utils::{get_env_with_prefix, parse_env_with_prefix};
use crate::webhooks::verification::DEFAULT_TOLERANCE_SECONDS;

/// Main configuration for the webhook service
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub stripe: StripeConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum request body size in bytes (default: 1MB)
    pub max_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

/// Stripe credentials and client behaviour.
///
/// Secrets are redacted in `Debug` output.
#[derive(Debug, Clone)]
pub struct StripeConfig {
    /// Secret or restricted API key (`sk_...` / `rk_...`).
    pub api_key: SecretString,
    /// Endpoint signing secret (`whsec_...`).
    pub webhook_secret: SecretString,
    /// Maximum age of a signed delivery. `0` disables the check.
    pub webhook_tolerance_seconds: u64,
    /// Per-attempt timeout for Stripe API calls.
    pub timeout_seconds: u64,
    /// Retries after the first attempt on transient failures.
    pub max_retries: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            max_body_size: 1024 * 1024,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            api_key: SecretString::from(String::new()),
            webhook_secret: SecretString::from(String::new()),
            webhook_tolerance_seconds: DEFAULT_TOLERANCE_SECONDS,
            timeout_seconds: 20,
            max_retries: 2,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

impl StripeConfig {
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        !self.api_key.expose_secret().is_empty()
    }

    #[must_use]
    pub fn has_webhook_secret(&self) -> bool {
        !self.webhook_secret.expose_secret().is_empty()
    }
}

/// Builder for Config with environment variable support
#[must_use = "builder does nothing until you call build()"]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.config.server.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    /// Set the maximum request body size in bytes
    ///
    /// Stripe events are small; oversized bodies are rejected before the
    /// signature is checked.
    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.config.server.max_body_size = max_body_size;
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.config.logging.json = enabled;
        self
    }

    pub fn with_stripe_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.stripe.api_key = SecretString::from(key.into());
        self
    }

    pub fn with_webhook_secret(mut self, secret: impl Into<String>) -> Self {
        self.config.stripe.webhook_secret = SecretString::from(secret.into());
        self
    }

    pub fn with_webhook_tolerance(mut self, seconds: u64) -> Self {
        self.config.stripe.webhook_tolerance_seconds = seconds;
        self
    }

    pub fn with_stripe_timeout(mut self, seconds: u64) -> Self {
        self.config.stripe.timeout_seconds = seconds;
        self
    }

    pub fn with_stripe_max_retries(mut self, retries: u32) -> Self {
        self.config.stripe.max_retries = retries;
        self
    }

    /// Load configuration from environment variables with PICKUP_ prefix
    ///
    /// Unprefixed names are used as a fallback, so `STRIPE_API_KEY` and
    /// `PORT` work as set by most hosts.
    pub fn from_env(mut self) -> Self {
        if let Some(host) = get_env_with_prefix("HOST") {
            self.config.server.host = host;
        }
        if let Some(port) = parse_env_with_prefix("PORT") {
            self.config.server.port = port;
        }
        if let Some(size) = parse_env_with_prefix("MAX_BODY_SIZE") {
            self.config.server.max_body_size = size;
        }
        if let Some(level) = get_env_with_prefix("LOG_LEVEL") {
            self.config.logging.level = level;
        }
        if let Some(json) = get_env_with_prefix("LOG_JSON") {
            self.config.logging.json = json.parse().unwrap_or(false);
        }

        if let Some(key) = get_env_with_prefix("STRIPE_API_KEY") {
            self = self.with_stripe_api_key(key);
        }
        if let Some(secret) = get_env_with_prefix("STRIPE_WEBHOOK_SECRET") {
            self = self.with_webhook_secret(secret);
        }
        if let Some(tolerance) = parse_env_with_prefix("STRIPE_WEBHOOK_TOLERANCE") {
            self.config.stripe.webhook_tolerance_seconds = tolerance;
        }
        if let Some(timeout) = parse_env_with_prefix("STRIPE_TIMEOUT") {
            self.config.stripe.timeout_seconds = timeout;
        }
        if let Some(retries) = parse_env_with_prefix("STRIPE_MAX_RETRIES") {
            self.config.stripe.max_retries = retries;
        }

        self
    }

    /// Build the configuration, validating all settings
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration is invalid:
    /// - Invalid server address (host:port), zero port or zero body limit
    /// - Invalid log level
    /// - Missing or malformed Stripe API key
    /// - Missing webhook signing secret
    /// - Zero Stripe timeout
    pub fn build(self) -> Result<Config, ConfigError> {
        let config = self.config;

        config.server.addr().map_err(|e| ConfigError::Invalid {
            name: "HOST",
            reason: format!("{}:{} - {}", config.server.host, config.server.port, e),
        })?;

        if config.server.port == 0 {
            return Err(ConfigError::Invalid {
                name: "PORT",
                reason: "must be greater than 0".to_string(),
            });
        }

        if config.server.max_body_size == 0 {
            return Err(ConfigError::Invalid {
                name: "MAX_BODY_SIZE",
                reason: "must be greater than 0".to_string(),
            });
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid {
                name: "LOG_LEVEL",
                reason: format!(
                    "{} is not one of: {}",
                    config.logging.level,
                    valid_log_levels.join(", ")
                ),
            });
        }

        if !config.stripe.has_api_key() {
            return Err(ConfigError::Missing("STRIPE_API_KEY"));
        }
        validate_api_key(config.stripe.api_key.expose_secret()).map_err(|e| {
            ConfigError::Invalid {
                name: "STRIPE_API_KEY",
                reason: e.reason,
            }
        })?;

        if !config.stripe.has_webhook_secret() {
            return Err(ConfigError::Missing("STRIPE_WEBHOOK_SECRET"));
        }

        if config.stripe.timeout_seconds == 0 {
            return Err(ConfigError::Invalid {
                name: "STRIPE_TIMEOUT",
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
