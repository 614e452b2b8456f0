//! Tests for configuration parsing, env overrides, and validation.

use gridwatch::config::{Config, ConfigError};

// ---------------------------------------------------------------------------
// TOML parsing
// ---------------------------------------------------------------------------

#[test]
fn parse_complete_config() {
    let toml_str = r#"
[source]
url = "https://api.example.org/frequency.xml"
request_timeout_secs = 5
verify_tls = false

[ntfy]
enabled = true
topic_url = "https://ntfy.example.org/grid"
auth_token = "tk_secret"
request_timeout_secs = 7
verify_tls = true

[thresholds]
warning_min_hz = 49.80
warning_max_hz = 50.20
critical_min_hz = 49.50
critical_max_hz = 50.50
"#;

    let config = Config::from_toml(toml_str).expect("should parse");

    assert_eq!(config.source.url, "https://api.example.org/frequency.xml");
    assert_eq!(config.source.request_timeout_secs, 5);
    assert!(!config.source.verify_tls);

    assert!(config.ntfy.enabled);
    assert_eq!(config.ntfy.topic_url, "https://ntfy.example.org/grid");
    assert_eq!(config.ntfy.auth_token, "tk_secret");
    assert_eq!(config.ntfy.request_timeout_secs, 7);
    assert!(config.ntfy.verify_tls);

    assert!((config.thresholds.warning_min_hz - 49.80).abs() < f64::EPSILON);
    assert!((config.thresholds.warning_max_hz - 50.20).abs() < f64::EPSILON);
    assert!((config.thresholds.critical_min_hz - 49.50).abs() < f64::EPSILON);
    assert!((config.thresholds.critical_max_hz - 50.50).abs() < f64::EPSILON);
    assert!(config.thresholds.min_hz.is_none());
    assert!(config.thresholds.max_hz.is_none());
}

#[test]
fn parse_partial_config_uses_defaults() {
    let toml_str = r#"
[source]
url = "https://api.example.org/frequency.xml"
"#;

    let config = Config::from_toml(toml_str).expect("should parse");

    assert_eq!(config.source.request_timeout_secs, 10);
    assert!(config.source.verify_tls);
    assert!(!config.ntfy.enabled);
    assert!((config.thresholds.warning_min_hz - 49.850).abs() < f64::EPSILON);
    assert!((config.thresholds.warning_max_hz - 50.150).abs() < f64::EPSILON);
    assert!((config.thresholds.critical_min_hz - 49.600).abs() < f64::EPSILON);
    assert!((config.thresholds.critical_max_hz - 50.400).abs() < f64::EPSILON);
}

#[test]
fn parse_empty_config_uses_defaults() {
    let config = Config::from_toml("").expect("should parse empty");
    assert!(config.source.url.is_empty());
    assert!(!config.ntfy.enabled);
}

#[test]
fn invalid_toml_is_rejected() {
    assert!(Config::from_toml("this is {{ not valid toml").is_err());
}

#[test]
fn non_numeric_threshold_in_toml_is_rejected() {
    let toml_str = r#"
[thresholds]
warning_min_hz = "forty-nine"
"#;
    assert!(Config::from_toml(toml_str).is_err());
}

#[test]
fn negative_timeout_in_toml_is_rejected() {
    let toml_str = r#"
[source]
request_timeout_secs = -5
"#;
    assert!(Config::from_toml(toml_str).is_err());
}

// ---------------------------------------------------------------------------
// Env overrides
// ---------------------------------------------------------------------------

#[test]
fn env_overrides_win_over_file() {
    let toml_str = r#"
[source]
url = "https://from-file.example.org/api"
request_timeout_secs = 20

[thresholds]
warning_min_hz = 49.80
"#;

    let mut config = Config::from_toml(toml_str).expect("should parse");

    let env = |key: &str| -> Option<String> {
        match key {
            "GRIDWATCH_SOURCE_URL" => Some("https://from-env.example.org/api".to_owned()),
            "GRIDWATCH_WARNING_MIN_HZ" => Some("49.70".to_owned()),
            _ => None,
        }
    };
    config.apply_overrides(env).expect("should apply");

    // Env wins over file.
    assert_eq!(config.source.url, "https://from-env.example.org/api");
    assert!((config.thresholds.warning_min_hz - 49.70).abs() < f64::EPSILON);

    // File value kept when no env override.
    assert_eq!(config.source.request_timeout_secs, 20);
}

#[test]
fn env_enables_ntfy() {
    let mut config = Config::from_toml("").expect("should parse");

    let env = |key: &str| -> Option<String> {
        match key {
            "GRIDWATCH_NTFY_ENABLED" => Some("true".to_owned()),
            "GRIDWATCH_NTFY_TOPIC_URL" => Some("https://ntfy.example.org/grid".to_owned()),
            "GRIDWATCH_NTFY_AUTH_TOKEN" => Some("tk_env".to_owned()),
            _ => None,
        }
    };
    config.apply_overrides(env).expect("should apply");

    assert!(config.ntfy.enabled);
    assert_eq!(config.ntfy.topic_url, "https://ntfy.example.org/grid");
    assert_eq!(config.ntfy.auth_token, "tk_env");
}

#[test]
fn env_sets_two_band_profile() {
    let mut config = Config::from_toml("").expect("should parse");

    let env = |key: &str| -> Option<String> {
        match key {
            "GRIDWATCH_MIN_HZ" => Some("49.85".to_owned()),
            "GRIDWATCH_MAX_HZ" => Some("50.15".to_owned()),
            _ => None,
        }
    };
    config.apply_overrides(env).expect("should apply");

    assert_eq!(config.thresholds.min_hz, Some(49.85));
    assert_eq!(config.thresholds.max_hz, Some(50.15));
}

#[test]
fn non_numeric_env_threshold_is_an_error() {
    let mut config = Config::from_toml("").expect("should parse");

    let env = |key: &str| -> Option<String> {
        match key {
            "GRIDWATCH_WARNING_MIN_HZ" => Some("forty-nine".to_owned()),
            _ => None,
        }
    };

    let err = config.apply_overrides(env).expect_err("should reject");
    assert!(matches!(err, ConfigError::InvalidOverride { name, .. }
        if name == "GRIDWATCH_WARNING_MIN_HZ"));
}

#[test]
fn non_numeric_env_timeout_is_an_error() {
    let mut config = Config::from_toml("").expect("should parse");

    let env = |key: &str| -> Option<String> {
        match key {
            "GRIDWATCH_SOURCE_TIMEOUT_SECS" => Some("-1".to_owned()),
            _ => None,
        }
    };

    let err = config.apply_overrides(env).expect_err("should reject");
    assert!(matches!(err, ConfigError::InvalidOverride { .. }));
}

#[test]
fn invalid_env_bool_is_an_error() {
    let mut config = Config::from_toml("").expect("should parse");

    let env = |key: &str| -> Option<String> {
        match key {
            "GRIDWATCH_NTFY_ENABLED" => Some("yes please".to_owned()),
            _ => None,
        }
    };

    let err = config.apply_overrides(env).expect_err("should reject");
    assert!(matches!(err, ConfigError::InvalidOverride { .. }));
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn config_with_source_url() -> Config {
    Config::from_toml(
        r#"
[source]
url = "https://api.example.org/frequency.xml"
"#,
    )
    .expect("should parse")
}

#[test]
fn validate_rejects_missing_source_url() {
    let config = Config::from_toml("").expect("should parse");
    let err = config.validate().expect_err("should reject");
    assert!(matches!(err, ConfigError::MissingSourceUrl));
}

#[test]
fn validate_rejects_enabled_ntfy_without_topic_url() {
    let mut config = config_with_source_url();
    config.ntfy.enabled = true;
    config.ntfy.auth_token = "tk".to_owned();

    let err = config.validate().expect_err("should reject");
    assert!(matches!(err, ConfigError::MissingNtfyField("topic_url")));
}

#[test]
fn validate_rejects_enabled_ntfy_without_auth_token() {
    let mut config = config_with_source_url();
    config.ntfy.enabled = true;
    config.ntfy.topic_url = "https://ntfy.example.org/grid".to_owned();

    let err = config.validate().expect_err("should reject");
    assert!(matches!(err, ConfigError::MissingNtfyField("auth_token")));
}

#[test]
fn validate_accepts_disabled_ntfy_without_credentials() {
    let config = config_with_source_url();
    config.validate().expect("should validate");
}

#[test]
fn validate_produces_the_active_threshold_set() {
    let config = config_with_source_url();
    let thresholds = config.validate().expect("should validate");

    assert!((thresholds.critical_min - 49.600).abs() < f64::EPSILON);
    assert!((thresholds.warning_min - 49.850).abs() < f64::EPSILON);
    assert!((thresholds.warning_max - 50.150).abs() < f64::EPSILON);
    assert!((thresholds.critical_max - 50.400).abs() < f64::EPSILON);
    assert!(thresholds.has_critical_band());
}

#[test]
fn validate_rejects_inverted_warning_band() {
    let mut config = config_with_source_url();
    config.thresholds.warning_min_hz = 50.20;
    config.thresholds.warning_max_hz = 50.15;

    let err = config.validate().expect_err("should reject");
    assert!(matches!(err, ConfigError::InvalidThresholds(_)));
}

#[test]
fn validate_rejects_critical_min_not_below_warning_min() {
    let mut config = config_with_source_url();
    config.thresholds.critical_min_hz = 49.85;

    let err = config.validate().expect_err("should reject");
    assert!(matches!(err, ConfigError::InvalidThresholds(_)));
}

#[test]
fn validate_rejects_critical_max_not_above_warning_max() {
    let mut config = config_with_source_url();
    config.thresholds.critical_max_hz = 50.15;

    let err = config.validate().expect_err("should reject");
    assert!(matches!(err, ConfigError::InvalidThresholds(_)));
}

#[test]
fn validate_rejects_non_positive_warning_min() {
    let mut config = config_with_source_url();
    config.thresholds.critical_min_hz = -1.0;
    config.thresholds.warning_min_hz = 0.0;

    let err = config.validate().expect_err("should reject");
    assert!(matches!(err, ConfigError::InvalidThresholds(_)));
}

#[test]
fn validate_rejects_non_finite_boundary() {
    let mut config = config_with_source_url();
    config.thresholds.critical_max_hz = f64::NAN;

    let err = config.validate().expect_err("should reject");
    assert!(matches!(err, ConfigError::InvalidThresholds(_)));
}

// ---------------------------------------------------------------------------
// Two-band profile
// ---------------------------------------------------------------------------

#[test]
fn two_band_profile_collapses_to_infinite_critical_bounds() {
    let mut config = config_with_source_url();
    config.thresholds.min_hz = Some(49.85);
    config.thresholds.max_hz = Some(50.15);

    let thresholds = config.validate().expect("should validate");

    assert!(!thresholds.has_critical_band());
    assert_eq!(thresholds.critical_min, f64::NEG_INFINITY);
    assert_eq!(thresholds.critical_max, f64::INFINITY);
    assert!((thresholds.warning_min - 49.85).abs() < f64::EPSILON);
    assert!((thresholds.warning_max - 50.15).abs() < f64::EPSILON);
}

#[test]
fn two_band_profile_rejects_inverted_bounds() {
    let mut config = config_with_source_url();
    config.thresholds.min_hz = Some(50.15);
    config.thresholds.max_hz = Some(49.85);

    let err = config.validate().expect_err("should reject");
    assert!(matches!(err, ConfigError::InvalidThresholds(_)));
}

#[test]
fn two_band_profile_rejects_half_set_bounds() {
    let mut config = config_with_source_url();
    config.thresholds.min_hz = Some(49.85);

    let err = config.validate().expect_err("should reject");
    assert!(matches!(err, ConfigError::InvalidThresholds(_)));
}

// ---------------------------------------------------------------------------
// Secrets
// ---------------------------------------------------------------------------

#[test]
fn debug_output_redacts_the_auth_token() {
    let mut config = Config::from_toml("").expect("should parse");
    config.ntfy.auth_token = "tk_very_secret".to_owned();

    let rendered = format!("{:?}", config.ntfy);
    assert!(!rendered.contains("tk_very_secret"));
    assert!(rendered.contains("__REDACTED__"));
}
