use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;
use docroute_classifier::ClassifierConfig;
use docroute_core::settings::{
    SystemSettings, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_REVIEW_DESTINATION,
};

use crate::auth::jwt::JwtConfig;

/// A missing or unparseable environment variable.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is invalid ({value:?}): {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3001`).
    pub port: u16,
    pub database_url: String,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `120`).
    pub request_timeout_secs: u64,
    /// Upper bound on request bodies, uploads included (default: 100 MiB).
    pub max_upload_bytes: usize,
    /// Seconds between connectivity probes (default: `10`).
    pub health_probe_interval_secs: u64,
    pub jwt: JwtConfig,
    pub classifier: ClassifierConfig,
    /// Initial routing settings; changed at runtime through `/settings`.
    pub settings: SystemSettings,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                      | Default                 |
    /// |------------------------------|-------------------------|
    /// | `HOST`                       | `0.0.0.0`               |
    /// | `PORT`                       | `3001`                  |
    /// | `DATABASE_URL`               | required                |
    /// | `CORS_ORIGINS`               | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`       | `120`                   |
    /// | `MAX_UPLOAD_BYTES`           | `104857600`             |
    /// | `HEALTH_PROBE_INTERVAL_SECS` | `10`                    |
    /// | `JWT_SECRET`                 | required                |
    /// | `JWT_ACCESS_EXPIRY_MINS`     | `60`                    |
    /// | `CLASSIFIER_URL`             | required                |
    /// | `CLASSIFIER_API_KEY`         | unset                   |
    /// | `CLASSIFIER_MODEL`           | `document-router-v1`    |
    /// | `CLASSIFIER_TIMEOUT_SECS`    | `60`                    |
    /// | `CONFIDENCE_THRESHOLD`       | `0.8`                   |
    /// | `AUTO_ROUTING_ENABLED`       | `true`                  |
    /// | `DEFAULT_DESTINATION`        | `Unknown/Review Queue`  |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(&lookup);

        let cors_origins: Vec<String> = env
            .string_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        for origin in &cors_origins {
            HeaderValue::from_str(origin).map_err(|e| ConfigError::Invalid {
                var: "CORS_ORIGINS",
                value: origin.clone(),
                reason: e.to_string(),
            })?;
        }

        let jwt = JwtConfig {
            secret: env.required("JWT_SECRET")?,
            access_token_expiry_mins: env.parse_or("JWT_ACCESS_EXPIRY_MINS", 60)?,
        };

        let classifier = ClassifierConfig {
            url: env.required("CLASSIFIER_URL")?,
            api_key: env.optional("CLASSIFIER_API_KEY"),
            model: env.string_or("CLASSIFIER_MODEL", docroute_classifier::http::DEFAULT_MODEL),
            timeout: Duration::from_secs(env.positive_secs_or("CLASSIFIER_TIMEOUT_SECS", 60)?),
        };

        let settings = SystemSettings {
            confidence_threshold: env
                .parse_or("CONFIDENCE_THRESHOLD", DEFAULT_CONFIDENCE_THRESHOLD)?,
            auto_routing_enabled: env.parse_or("AUTO_ROUTING_ENABLED", true)?,
            default_destination: env.string_or("DEFAULT_DESTINATION", DEFAULT_REVIEW_DESTINATION),
        };
        settings.validate().map_err(|e| ConfigError::Invalid {
            var: "CONFIDENCE_THRESHOLD/DEFAULT_DESTINATION",
            value: format!(
                "{} / {:?}",
                settings.confidence_threshold, settings.default_destination
            ),
            reason: e.to_string(),
        })?;

        Ok(Self {
            host: env.string_or("HOST", "0.0.0.0"),
            port: env.parse_or("PORT", 3001)?,
            database_url: env.required("DATABASE_URL")?,
            cors_origins,
            request_timeout_secs: env.positive_secs_or("REQUEST_TIMEOUT_SECS", 120)?,
            max_upload_bytes: env.parse_or("MAX_UPLOAD_BYTES", 100 * 1024 * 1024)?,
            health_probe_interval_secs: env.positive_secs_or("HEALTH_PROBE_INTERVAL_SECS", 10)?,
            jwt,
            classifier,
            settings,
        })
    }

    pub fn health_probe_interval(&self) -> Duration {
        Duration::from_secs(self.health_probe_interval_secs)
    }
}

struct Env<'a, F: Fn(&str) -> Option<String>>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    /// Unset and blank values are treated the same.
    fn optional(&self, var: &str) -> Option<String> {
        (self.0)(var).filter(|v| !v.trim().is_empty())
    }

    fn required(&self, var: &'static str) -> Result<String, ConfigError> {
        self.optional(var).ok_or(ConfigError::Missing(var))
    }

    fn string_or(&self, var: &str, default: &str) -> String {
        self.optional(var).unwrap_or_else(|| default.to_string())
    }

    fn parse_or<T>(&self, var: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.optional(var) {
            None => Ok(default),
            Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
                var,
                reason: e.to_string(),
                value,
            }),
        }
    }

    /// A duration in whole seconds. Zero would make a timer fire or expire
    /// immediately, so it is refused.
    fn positive_secs_or(&self, var: &'static str, default: u64) -> Result<u64, ConfigError> {
        match self.parse_or(var, default)? {
            0 => Err(ConfigError::Invalid {
                var,
                value: "0".to_string(),
                reason: "must be at least 1 second".to_string(),
            }),
            secs => Ok(secs),
        }
    }
}
