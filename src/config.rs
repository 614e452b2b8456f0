//! Configuration loading and validation.
//!
//! Loads `gridwatch.toml` (or `$GRIDWATCH_CONFIG_PATH`), applies
//! `GRIDWATCH_*` environment overrides, then validates the result into a
//! [`ThresholdSet`]. Precedence: env vars > config file > defaults. A
//! missing file yields defaults, which then fail validation on the
//! required source URL.
//!
//! All validation happens here, before anything is fetched; the policy
//! assumes the boundary ordering invariant holds.

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::policy::ThresholdSet;

/// Configuration error. Fatal at startup; nothing is fetched afterwards.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file existed but could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that was attempted.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The config file was not valid TOML.
    #[error("failed to parse config TOML: {0}")]
    Toml(#[from] toml::de::Error),
    /// An environment override did not parse.
    #[error("invalid value {value:?} for {name}: expected {expected}")]
    InvalidOverride {
        /// The environment variable name.
        name: &'static str,
        /// The raw value that failed to parse.
        value: String,
        /// What was expected instead.
        expected: &'static str,
    },
    /// No source URL was configured.
    #[error("missing 'source.url' (set GRIDWATCH_SOURCE_URL or [source] url)")]
    MissingSourceUrl,
    /// A required ntfy field is empty while ntfy is enabled.
    #[error("missing 'ntfy.{0}' while ntfy is enabled")]
    MissingNtfyField(&'static str),
    /// The threshold boundaries violate the required ordering.
    #[error("invalid thresholds: {0}")]
    InvalidThresholds(&'static str),
}

/// Top-level gridwatch configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Frequency API settings.
    pub source: SourceConfig,
    /// ntfy notification settings.
    pub ntfy: NtfyConfig,
    /// Alert band boundaries.
    pub thresholds: ThresholdsConfig,
}

impl Config {
    /// Load configuration with precedence: env vars > TOML file > defaults.
    ///
    /// Config file path: `$GRIDWATCH_CONFIG_PATH` or `./gridwatch.toml`.
    /// A missing file is not an error.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from_file()?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load from the TOML file only, no env overrides.
    fn load_from_file() -> Result<Self, ConfigError> {
        let path = Self::config_path_with(|key| std::env::var(key).ok());
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                tracing::info!(path = %path.display(), "loading config from file");
                Self::from_toml(&contents)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("no config file found, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::Read {
                path: path.display().to_string(),
                source: e,
            }),
        }
    }

    /// Resolve the config file path using a custom env resolver (for testing).
    fn config_path_with(env: impl Fn(&str) -> Option<String>) -> PathBuf {
        match env("GRIDWATCH_CONFIG_PATH") {
            Some(p) => PathBuf::from(p),
            None => PathBuf::from("gridwatch.toml"),
        }
    }

    /// Parse a TOML string into a config.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Apply environment variable overrides (env > config > defaults).
    ///
    /// Takes a resolver function for testability (avoids `set_var` in
    /// tests). Unlike path-like overrides, a numeric or boolean variable
    /// that fails to parse is a hard error.
    pub fn apply_overrides(
        &mut self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        // Source.
        if let Some(v) = env("GRIDWATCH_SOURCE_URL") {
            self.source.url = v;
        }
        if let Some(v) = env("GRIDWATCH_SOURCE_TIMEOUT_SECS") {
            self.source.request_timeout_secs = parse_u64("GRIDWATCH_SOURCE_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = env("GRIDWATCH_SOURCE_VERIFY_TLS") {
            self.source.verify_tls = parse_bool("GRIDWATCH_SOURCE_VERIFY_TLS", &v)?;
        }

        // Ntfy.
        if let Some(v) = env("GRIDWATCH_NTFY_ENABLED") {
            self.ntfy.enabled = parse_bool("GRIDWATCH_NTFY_ENABLED", &v)?;
        }
        if let Some(v) = env("GRIDWATCH_NTFY_TOPIC_URL") {
            self.ntfy.topic_url = v;
        }
        if let Some(v) = env("GRIDWATCH_NTFY_AUTH_TOKEN") {
            self.ntfy.auth_token = v;
        }
        if let Some(v) = env("GRIDWATCH_NTFY_TIMEOUT_SECS") {
            self.ntfy.request_timeout_secs = parse_u64("GRIDWATCH_NTFY_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = env("GRIDWATCH_NTFY_VERIFY_TLS") {
            self.ntfy.verify_tls = parse_bool("GRIDWATCH_NTFY_VERIFY_TLS", &v)?;
        }

        // Thresholds.
        if let Some(v) = env("GRIDWATCH_WARNING_MIN_HZ") {
            self.thresholds.warning_min_hz = parse_f64("GRIDWATCH_WARNING_MIN_HZ", &v)?;
        }
        if let Some(v) = env("GRIDWATCH_WARNING_MAX_HZ") {
            self.thresholds.warning_max_hz = parse_f64("GRIDWATCH_WARNING_MAX_HZ", &v)?;
        }
        if let Some(v) = env("GRIDWATCH_CRITICAL_MIN_HZ") {
            self.thresholds.critical_min_hz = parse_f64("GRIDWATCH_CRITICAL_MIN_HZ", &v)?;
        }
        if let Some(v) = env("GRIDWATCH_CRITICAL_MAX_HZ") {
            self.thresholds.critical_max_hz = parse_f64("GRIDWATCH_CRITICAL_MAX_HZ", &v)?;
        }
        if let Some(v) = env("GRIDWATCH_MIN_HZ") {
            self.thresholds.min_hz = Some(parse_f64("GRIDWATCH_MIN_HZ", &v)?);
        }
        if let Some(v) = env("GRIDWATCH_MAX_HZ") {
            self.thresholds.max_hz = Some(parse_f64("GRIDWATCH_MAX_HZ", &v)?);
        }

        Ok(())
    }

    /// Validate the configuration and produce the active threshold set.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] on a missing source URL, missing ntfy
    /// topic URL or auth token while ntfy is enabled, or any boundary
    /// ordering violation.
    pub fn validate(&self) -> Result<ThresholdSet, ConfigError> {
        if self.source.url.is_empty() {
            return Err(ConfigError::MissingSourceUrl);
        }
        if self.ntfy.enabled {
            if self.ntfy.topic_url.is_empty() {
                return Err(ConfigError::MissingNtfyField("topic_url"));
            }
            if self.ntfy.auth_token.is_empty() {
                return Err(ConfigError::MissingNtfyField("auth_token"));
            }
        }
        self.thresholds.build()
    }
}

fn parse_u64(name: &'static str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidOverride {
            name,
            value: value.to_owned(),
            expected: "a non-negative integer",
        })
}

fn parse_f64(name: &'static str, value: &str) -> Result<f64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidOverride {
            name,
            value: value.to_owned(),
            expected: "a number",
        })
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ConfigError::InvalidOverride {
            name,
            value: value.to_owned(),
            expected: "true or false",
        }),
    }
}

// ── Source config ───────────────────────────────────────────────

/// Frequency API settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// API endpoint URL. Required, no default.
    pub url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Whether to verify the server TLS certificate.
    pub verify_tls: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            request_timeout_secs: 10,
            verify_tls: true,
        }
    }
}

// ── Ntfy config ─────────────────────────────────────────────────

/// ntfy notification settings.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct NtfyConfig {
    /// Whether the dispatcher attempts delivery at all.
    pub enabled: bool,
    /// Topic URL to POST notifications to. Required iff enabled.
    pub topic_url: String,
    /// Bearer token for the topic. Required iff enabled.
    pub auth_token: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Whether to verify the server TLS certificate.
    pub verify_tls: bool,
}

impl Default for NtfyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            topic_url: String::new(),
            auth_token: String::new(),
            request_timeout_secs: 10,
            verify_tls: false,
        }
    }
}

impl fmt::Debug for NtfyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NtfyConfig")
            .field("enabled", &self.enabled)
            .field("topic_url", &self.topic_url)
            .field("auth_token", &"__REDACTED__")
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("verify_tls", &self.verify_tls)
            .finish()
    }
}

// ── Thresholds config ───────────────────────────────────────────

/// Alert band boundaries.
///
/// Either the four warning/critical boundaries, or the simplified two-band
/// profile via `min_hz`/`max_hz` (which must be set together and takes
/// precedence over the four when present).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ThresholdsConfig {
    /// Lower warning boundary in Hz.
    pub warning_min_hz: f64,
    /// Upper warning boundary in Hz.
    pub warning_max_hz: f64,
    /// Lower critical boundary in Hz.
    pub critical_min_hz: f64,
    /// Upper critical boundary in Hz.
    pub critical_max_hz: f64,
    /// Simplified profile: single lower boundary in Hz.
    pub min_hz: Option<f64>,
    /// Simplified profile: single upper boundary in Hz.
    pub max_hz: Option<f64>,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            warning_min_hz: 49.850,
            warning_max_hz: 50.150,
            critical_min_hz: 49.600,
            critical_max_hz: 50.400,
            min_hz: None,
            max_hz: None,
        }
    }
}

impl ThresholdsConfig {
    /// Validate the boundary ordering and produce the threshold set.
    ///
    /// The two-band profile maps onto the same [`ThresholdSet`] with the
    /// critical bounds at ±∞, so the evaluation path stays single.
    pub fn build(&self) -> Result<ThresholdSet, ConfigError> {
        match (self.min_hz, self.max_hz) {
            (Some(min), Some(max)) => {
                if !min.is_finite() || !max.is_finite() {
                    return Err(ConfigError::InvalidThresholds(
                        "'min_hz' and 'max_hz' must be finite numbers",
                    ));
                }
                if min >= max {
                    return Err(ConfigError::InvalidThresholds(
                        "'min_hz' needs to be lower than 'max_hz'",
                    ));
                }
                Ok(ThresholdSet {
                    critical_min: f64::NEG_INFINITY,
                    warning_min: min,
                    warning_max: max,
                    critical_max: f64::INFINITY,
                })
            }
            (None, None) => {
                let bounds = [
                    self.warning_min_hz,
                    self.warning_max_hz,
                    self.critical_min_hz,
                    self.critical_max_hz,
                ];
                if !bounds.iter().all(|v| v.is_finite()) {
                    return Err(ConfigError::InvalidThresholds(
                        "all boundaries must be finite numbers",
                    ));
                }
                if self.warning_min_hz <= 0.0 {
                    return Err(ConfigError::InvalidThresholds(
                        "'warning_min_hz' must be positive",
                    ));
                }
                if self.warning_min_hz >= self.warning_max_hz {
                    return Err(ConfigError::InvalidThresholds(
                        "'warning_min_hz' needs to be lower than 'warning_max_hz'",
                    ));
                }
                if self.critical_min_hz >= self.warning_min_hz {
                    return Err(ConfigError::InvalidThresholds(
                        "'critical_min_hz' needs to be lower than 'warning_min_hz'",
                    ));
                }
                if self.critical_max_hz <= self.warning_max_hz {
                    return Err(ConfigError::InvalidThresholds(
                        "'critical_max_hz' needs to be higher than 'warning_max_hz'",
                    ));
                }
                if self.critical_min_hz >= self.critical_max_hz {
                    return Err(ConfigError::InvalidThresholds(
                        "'critical_min_hz' needs to be lower than 'critical_max_hz'",
                    ));
                }
                Ok(ThresholdSet {
                    critical_min: self.critical_min_hz,
                    warning_min: self.warning_min_hz,
                    warning_max: self.warning_max_hz,
                    critical_max: self.critical_max_hz,
                })
            }
            _ => Err(ConfigError::InvalidThresholds(
                "'min_hz' and 'max_hz' must be set together",
            )),
        }
    }
}
