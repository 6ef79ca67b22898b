use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Tool configuration, loaded from `coingen.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub check: CheckConfig,
    #[serde(default)]
    pub signing: SigningConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(level) = &self.general.log_level {
            if !matches!(
                level.to_lowercase().as_str(),
                "trace" | "debug" | "info" | "warn" | "error" | "off"
            ) {
                return Err(ConfigError::InvalidGeneral(format!(
                    "unknown log_level '{}'",
                    level
                )));
            }
        }

        if self.registry.coins.as_os_str().is_empty() {
            return Err(ConfigError::InvalidRegistry(
                "coins path cannot be empty".to_string(),
            ));
        }

        if let Some(key_file) = &self.signing.key_file {
            if key_file.as_os_str().is_empty() {
                return Err(ConfigError::InvalidSigning(
                    "key_file cannot be empty; omit it to use the placeholder key".to_string(),
                ));
            }
        }

        if self.output.coins_json.as_os_str().is_empty()
            || self.output.coindefs_json.as_os_str().is_empty()
        {
            return Err(ConfigError::InvalidOutput(
                "output paths cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Shared general configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeneralConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    /// Worker threads for per-coin processing (0 = one per CPU)
    #[serde(default)]
    pub threads: usize,
}

/// Registry input locations
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RegistryConfig {
    /// JSON array of bitcoin-like coin records
    pub coins: PathBuf,
    /// JSON array of `{key, name}` misc coins
    #[serde(skip_serializing_if = "Option::is_none")]
    pub misc: Option<PathBuf>,
    /// JSON object mapping coin key to support flags
    #[serde(skip_serializing_if = "Option::is_none")]
    pub support: Option<PathBuf>,
    /// Base directory for relative icon paths (defaults to the coins file's directory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icons_dir: Option<PathBuf>,
}

/// Check command defaults
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct CheckConfig {
    /// Treat missing support info as an error
    #[serde(default)]
    pub fail_missing_support: bool,
}

/// Signing key source
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SigningConfig {
    /// File holding the hex-encoded 32-byte Ed25519 seed. Without it the
    /// placeholder development key is used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_file: Option<PathBuf>,
}

/// Output file locations
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OutputConfig {
    pub coins_json: PathBuf,
    pub coindefs_json: PathBuf,
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid general configuration: {0}")]
    InvalidGeneral(String),
    #[error("Invalid registry configuration: {0}")]
    InvalidRegistry(String),
    #[error("Invalid signing configuration: {0}")]
    InvalidSigning(String),
    #[error("Invalid output configuration: {0}")]
    InvalidOutput(String),
}

/// Default implementations
impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            threads: 0,
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            coins: PathBuf::from("defs/coins.json"),
            misc: Some(PathBuf::from("defs/misc.json")),
            support: Some(PathBuf::from("defs/support.json")),
            icons_dir: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            coins_json: PathBuf::from("coins.json"),
            coindefs_json: PathBuf::from("coindefs.json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_parsing() {
        let yaml = r#"
general:
  log_level: debug
  threads: 4
registry:
  coins: "registry/bitcoin.json"
  support: "registry/support.json"
  icons_dir: "registry/icons"
check:
  fail_missing_support: true
signing:
  key_file: "/run/secrets/coindef.key"
output:
  coins_json: "out/coins.json"
  coindefs_json: "out/coindefs.json"
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.general.threads, 4);
        assert_eq!(config.registry.coins, PathBuf::from("registry/bitcoin.json"));
        assert_eq!(config.registry.misc, None);
        assert!(config.check.fail_missing_support);
        assert_eq!(config.signing.key_file, Some(PathBuf::from("/run/secrets/coindef.key")));
        assert_eq!(config.output.coindefs_json, PathBuf::from("out/coindefs.json"));
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.general.log_level.as_deref(), Some("info"));
        assert_eq!(config.registry.coins, PathBuf::from("defs/coins.json"));
        assert!(!config.check.fail_missing_support);
        assert!(config.signing.key_file.is_none());
        assert_eq!(config.output.coins_json, PathBuf::from("coins.json"));
    }

    #[test]
    fn test_validation_errors() {
        let yaml = r#"
general:
  log_level: loud
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidGeneral(_))));

        let yaml = r#"
registry:
  coins: ""
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRegistry(_))));

        let yaml = r#"
signing:
  key_file: ""
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidSigning(_))));
    }

    #[test]
    fn test_unknown_sections_rejected() {
        let yaml = r#"
templates:
  dir: "templates"
"#;
        assert!(serde_yaml::from_str::<Config>(yaml).is_err());
    }
}
