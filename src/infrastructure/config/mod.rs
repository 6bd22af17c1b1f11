use std::path::PathBuf;
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::error::{AppError, Result};
use crate::domain::schema::{FeatureSchema, DEFAULT_FEATURE_COUNT, DEFAULT_FEATURE_PREFIX};

pub const ENV_PREFIX: &str = "GATEWAY_";
pub const ENV_CONFIG_PATH: &str = "GATEWAY_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "gateway.toml";

/// Runtime settings, layered as defaults < `gateway.toml` < `GATEWAY_*` env vars.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct GatewayConfig {
    #[validate(length(min = 1))]
    pub host: String,
    pub port: u16,
    #[validate(url)]
    pub prediction_service_url: String,
    #[validate(range(min = 1, max = 300))]
    pub request_timeout_secs: u64,
    /// Where uploads are buffered; the system temp dir when unset
    #[serde(default)]
    pub upload_dir: Option<PathBuf>,
    #[validate(range(min = 1))]
    pub max_upload_bytes: u64,
    pub delimiter: char,
    pub feature_prefix: String,
    #[validate(range(min = 1, max = 100000))]
    pub feature_count: usize,
    /// Explicit slot names; overrides `feature_prefix`/`feature_count`
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            prediction_service_url: "http://127.0.0.1:8000".to_string(),
            request_timeout_secs: 10,
            upload_dir: None,
            max_upload_bytes: 10 * 1024 * 1024,
            delimiter: ',',
            feature_prefix: DEFAULT_FEATURE_PREFIX.to_string(),
            feature_count: DEFAULT_FEATURE_COUNT,
            feature_names: None,
        }
    }
}

impl GatewayConfig {
    /// Load from the config file named by `GATEWAY_CONFIG` (or
    /// `gateway.toml`) and the environment, then validate.
    pub fn load() -> Result<Self> {
        let path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_FILE.to_string());

        let config: Self = Self::figment(&path)
            .extract()
            .map_err(|e| AppError::ConfigError(format!("Failed to load configuration: {}", e)))?;

        config.validate_settings()?;
        Ok(config)
    }

    pub fn figment(path: &str) -> Figment {
        Figment::from(Serialized::defaults(GatewayConfig::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn validate_settings(&self) -> Result<()> {
        self.validate()
            .map_err(|e| AppError::ConfigError(format!("Invalid configuration: {}", e)))?;

        let url = url::Url::parse(&self.prediction_service_url).map_err(|e| {
            AppError::ConfigError(format!("Invalid prediction_service_url: {}", e))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::ConfigError(format!(
                "prediction_service_url must use http or https, got {}",
                url.scheme()
            )));
        }

        if !self.delimiter.is_ascii() || matches!(self.delimiter, '"' | '\n' | '\r') {
            return Err(AppError::ConfigError(format!(
                "Unsupported delimiter: {:?}",
                self.delimiter
            )));
        }

        self.build_schema().map(|_| ())
    }

    pub fn build_schema(&self) -> Result<FeatureSchema> {
        match &self.feature_names {
            Some(names) => FeatureSchema::from_names(names),
            None => FeatureSchema::positional(&self.feature_prefix, self.feature_count),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn upload_dir_or_default(&self) -> PathBuf {
        self.upload_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("spectral-gateway-uploads"))
    }

    /// Delimiter as the single byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> u8 {
        if self.delimiter.is_ascii() {
            self.delimiter as u8
        } else {
            b','
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults_are_valid() {
        let config = GatewayConfig::default();
        assert!(config.validate_settings().is_ok());
        assert_eq!(config.build_schema().unwrap().len(), 100);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_file_and_env_layers() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "gateway.toml",
                r#"
                    port = 6001
                    prediction_service_url = "http://model.internal:9000"
                    delimiter = ";"
                "#,
            )?;
            jail.set_env("GATEWAY_PORT", "7002");
            jail.set_env("GATEWAY_FEATURE_COUNT", "12");

            let config: GatewayConfig = GatewayConfig::figment("gateway.toml").extract()?;

            assert_eq!(config.port, 7002);
            assert_eq!(config.prediction_service_url, "http://model.internal:9000");
            assert_eq!(config.delimiter_byte(), b';');
            assert_eq!(config.build_schema().map_err(|e| e.to_string())?.len(), 12);
            Ok(())
        });
    }

    #[test]
    fn test_explicit_feature_names_override_prefix() {
        let config = GatewayConfig {
            feature_names: Some(vec!["band_a".to_string(), "band_b".to_string()]),
            ..Default::default()
        };

        let schema = config.build_schema().unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(&*schema.names()[1], "band_b");
    }

    #[test]
    fn test_rejects_invalid_settings() {
        let bad_url = GatewayConfig {
            prediction_service_url: "not a url".to_string(),
            ..Default::default()
        };
        let bad_scheme = GatewayConfig {
            prediction_service_url: "ftp://model.internal".to_string(),
            ..Default::default()
        };
        let no_slots = GatewayConfig {
            feature_count: 0,
            ..Default::default()
        };
        let duplicate_names = GatewayConfig {
            feature_names: Some(vec!["Wave_0".to_string(), "wave_0".to_string()]),
            ..Default::default()
        };
        let quote_delimiter = GatewayConfig {
            delimiter: '"',
            ..Default::default()
        };

        for config in [bad_url, bad_scheme, no_slots, duplicate_names, quote_delimiter] {
            assert_eq!(config.validate_settings().unwrap_err().kind(), "config_error");
        }
    }
}
