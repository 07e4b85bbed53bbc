use crate::adapters::http::DEFAULT_BASE_URL;
use crate::core::coordinator::ResolverSettings;
use crate::domain::model::{DEFAULT_COUNTRY, DEFAULT_METHOD, DEFAULT_PLACEHOLDER};
use crate::utils::error::{ResolveError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Engine configuration. Every table and field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub api: ApiConfig,
    pub defaults: DefaultsConfig,
    pub location: LocationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_seconds: 10,
        }
    }
}

/// Parameters sent with every schedule lookup unless overridden.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub country: String,
    pub method: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            country: DEFAULT_COUNTRY.to_string(),
            method: DEFAULT_METHOD,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub timeout_seconds: u64,
    pub geocode_timeout_seconds: u64,
    pub placeholder_label: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 15,
            geocode_timeout_seconds: 5,
            placeholder_label: DEFAULT_PLACEHOLDER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

impl EngineConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ResolveError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        let config: Self = toml::from_str(&processed_content).map_err(|e| {
            ResolveError::ConfigError {
                message: format!("TOML parsing error: {}", e),
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Replaces `${VAR}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ResolveError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_seconds)
    }

    pub fn to_settings(&self) -> ResolverSettings {
        ResolverSettings {
            location_timeout: Duration::from_secs(self.location.timeout_seconds),
            geocode_timeout: Duration::from_secs(self.location.geocode_timeout_seconds),
            placeholder_label: self.location.placeholder_label.clone(),
            country: self.defaults.country.clone(),
            method: self.defaults.method,
        }
    }
}

impl Validate for EngineConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("api.base_url", &self.api.base_url)?;
        validation::validate_range("api.timeout_seconds", self.api.timeout_seconds, 1, 120)?;
        validation::validate_non_empty_string("defaults.country", &self.defaults.country)?;
        validation::validate_range("defaults.method", self.defaults.method, 0, 99)?;
        validation::validate_range(
            "location.timeout_seconds",
            self.location.timeout_seconds,
            1,
            300,
        )?;
        validation::validate_range(
            "location.geocode_timeout_seconds",
            self.location.geocode_timeout_seconds,
            1,
            300,
        )?;
        validation::validate_non_empty_string(
            "location.placeholder_label",
            &self.location.placeholder_label,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();

        assert_eq!(config.api.base_url, "https://api.aladhan.com/v1");
        assert_eq!(config.defaults.country, "Turkey");
        assert_eq!(config.defaults.method, 13);
        assert_eq!(config.logging.format, LogFormat::Compact);

        let settings = config.to_settings();
        assert_eq!(settings.location_timeout, Duration::from_secs(15));
        assert_eq!(settings.geocode_timeout, Duration::from_secs(5));
        assert_eq!(settings.placeholder_label, "Unknown");
    }

    #[test]
    fn test_partial_tables_override_fields() {
        let config = EngineConfig::from_toml_str(
            r#"
[defaults]
country = "Egypt"
method = 5

[location]
geocode_timeout_seconds = 2
placeholder_label = "Current Location"

[logging]
format = "json"
"#,
        )
        .unwrap();

        assert_eq!(config.defaults.country, "Egypt");
        assert_eq!(config.defaults.method, 5);
        assert_eq!(config.location.timeout_seconds, 15);
        assert_eq!(config.location.placeholder_label, "Current Location");
        assert_eq!(config.to_settings().geocode_timeout, Duration::from_secs(2));
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("VAKIT_TEST_BASE_URL", "http://localhost:9090/v1");
        let config = EngineConfig::from_toml_str(
            r#"
[api]
base_url = "${VAKIT_TEST_BASE_URL}"
"#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "http://localhost:9090/v1");
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let bad_url = EngineConfig::from_toml_str("[api]\nbase_url = \"ftp://nope\"\n");
        assert!(matches!(
            bad_url,
            Err(ResolveError::InvalidConfigValueError { .. })
        ));

        let zero_timeout = EngineConfig::from_toml_str("[location]\ntimeout_seconds = 0\n");
        assert!(zero_timeout.is_err());

        let zero_geocode =
            EngineConfig::from_toml_str("[location]\ngeocode_timeout_seconds = 0\n");
        assert!(zero_geocode.is_err());

        let blank_country = EngineConfig::from_toml_str("[defaults]\ncountry = \" \"\n");
        assert!(blank_country.is_err());

        let bad_format = EngineConfig::from_toml_str("[logging]\nformat = \"xml\"\n");
        assert!(matches!(bad_format, Err(ResolveError::ConfigError { .. })));
    }
}
