use std::time::Duration;

use serde::Deserialize;
use validator::Validate;

use domain::models::{AlertPolicy, RadiusLimits, TriggerCoupling};
use domain::services::EditorSettings;
use persistence::BackendSettings;

/// Built-in defaults, layered under every other source.
const DEFAULTS: &str = r#"
    [backend]
    base_url = "http://localhost:5000/api"
    timeout_ms = 10000

    [logging]
    level = "info"
    format = "pretty"

    [editor]
    min_radius_meters = 50.0
    max_radius_meters = 10000.0
    default_radius_meters = 500.0
    default_dwell_minutes = 15
    trigger_coupling = "speed_exclusive"
"#;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Config {
    #[validate(nested)]
    pub backend: BackendConfig,
    #[validate(nested)]
    pub logging: LoggingConfig,
    #[validate(nested)]
    pub editor: EditorConfig,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BackendConfig {
    /// API root the `/geofences` routes hang off.
    #[validate(url)]
    pub base_url: String,

    #[serde(default = "default_timeout_ms")]
    #[validate(range(min = 1))]
    pub timeout_ms: u64,

    /// Bearer token; requests are unauthenticated without one.
    #[serde(default)]
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    #[validate(custom(function = "validate_log_format"))]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EditorConfig {
    #[validate(range(min = 1.0))]
    pub min_radius_meters: f64,

    #[validate(range(min = 1.0))]
    pub max_radius_meters: f64,

    pub default_radius_meters: f64,

    #[validate(range(min = 1))]
    pub default_dwell_minutes: u32,

    #[serde(default)]
    pub trigger_coupling: TriggerCoupling,
}

fn default_timeout_ms() -> u64 {
    10_000
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "pretty".to_string()
}

fn validate_log_format(format: &str) -> Result<(), validator::ValidationError> {
    match format {
        "json" | "pretty" => Ok(()),
        _ => Err(validator::ValidationError::new("log_format")),
    }
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid configuration: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. built-in defaults
    /// 2. config/default.toml (optional)
    /// 3. config/local.toml - local overrides (optional, not in git)
    /// 4. Environment variables with FLEET__ prefix, e.g. FLEET__BACKEND__BASE_URL
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(DEFAULTS, config::FileFormat::Toml))
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("FLEET").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Uses only the built-in defaults and the given overrides, no files or
    /// environment.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(DEFAULTS, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        // Validation is left to the caller so tests can inspect invalid configs.
        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        Validate::validate(self)?;

        let editor = &self.editor;
        if editor.min_radius_meters > editor.max_radius_meters {
            return Err(ConfigValidationError::InvalidValue(
                "editor.min_radius_meters cannot exceed editor.max_radius_meters".to_string(),
            ));
        }
        if !(editor.min_radius_meters..=editor.max_radius_meters)
            .contains(&editor.default_radius_meters)
        {
            return Err(ConfigValidationError::InvalidValue(
                "editor.default_radius_meters must lie between the min and max radius"
                    .to_string(),
            ));
        }

        if matches!(&self.backend.api_token, Some(token) if token.trim().is_empty()) {
            return Err(ConfigValidationError::InvalidValue(
                "backend.api_token cannot be blank; unset it instead".to_string(),
            ));
        }

        Ok(())
    }
}

impl BackendConfig {
    pub fn settings(&self) -> BackendSettings {
        BackendSettings {
            base_url: self.base_url.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
            api_token: self.api_token.clone(),
        }
    }
}

impl EditorConfig {
    pub fn settings(&self) -> EditorSettings {
        EditorSettings {
            radius_limits: RadiusLimits {
                min: self.min_radius_meters,
                max: self.max_radius_meters,
            },
            alert_policy: AlertPolicy {
                coupling: self.trigger_coupling,
                default_dwell_minutes: self.default_dwell_minutes,
            },
            default_radius_meters: self.default_radius_meters,
        }
    }
}
