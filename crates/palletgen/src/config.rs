// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Generator configuration.
//!
//! Supports both programmatic and file-based configuration. Command-line
//! flags are applied on top of a loaded file by the CLI.

use crate::codegen::ident::sanitize;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// What to do with a call whose argument types cannot be encoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnsupportedPolicy {
    /// Omit the call, report it and leave a note in the source.
    #[default]
    Skip,
    /// Abort the run.
    Fail,
}

impl std::str::FromStr for UnsupportedPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "fail" => Ok(Self::Fail),
            other => Err(ConfigError::Invalid(format!(
                "Unknown unsupported-argument policy '{}' (expected skip or fail)",
                other
            ))),
        }
    }
}

/// Generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Chain RPC endpoint (`ws://`, `wss://`, `http://`, `https://`).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Metadata snapshot file; takes precedence over `endpoint`.
    #[serde(default)]
    pub metadata: Option<PathBuf>,

    /// Output directory for generated sources.
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Call groups to generate (pallet names, case-insensitive).
    #[serde(default)]
    pub groups: Vec<String>,

    /// Unsupported-argument policy.
    #[serde(default)]
    pub policy: UnsupportedPolicy,

    /// Solidity version pragma.
    #[serde(default = "default_pragma")]
    pub pragma: String,

    /// Name of the call index contract.
    #[serde(default = "default_calls_contract")]
    pub calls_contract: String,

    /// Name of the primitive codec library.
    #[serde(default = "default_codec_library")]
    pub codec_library: String,

    /// Write the primitive codec library next to the encoders.
    #[serde(default = "default_true")]
    pub emit_codec_library: bool,

    /// Write the call index contract.
    #[serde(default = "default_true")]
    pub emit_calls_contract: bool,

    /// RPC request timeout (seconds).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Log level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_endpoint() -> String {
    "wss://westend-asset-hub-rpc.polkadot.io".to_string()
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("contracts")
}

fn default_pragma() -> String {
    "^0.8.24".to_string()
}

fn default_calls_contract() -> String {
    "PalletCalls".to_string()
}

fn default_codec_library() -> String {
    "ScaleCodec".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            metadata: None,
            out_dir: default_out_dir(),
            groups: Vec::new(),
            policy: UnsupportedPolicy::Skip,
            pragma: default_pragma(),
            calls_contract: default_calls_contract(),
            codec_library: default_codec_library(),
            emit_codec_library: true,
            emit_calls_contract: true,
            timeout_secs: 30,
            log_level: "info".to_string(),
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Use a snapshot file instead of the RPC endpoint.
    pub fn with_metadata(mut self, path: impl Into<PathBuf>) -> Self {
        self.metadata = Some(path.into());
        self
    }

    /// Set the output directory.
    pub fn with_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = dir.into();
        self
    }

    /// Set the unsupported-argument policy.
    pub fn with_policy(mut self, policy: UnsupportedPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Add a call group.
    pub fn group(mut self, name: impl Into<String>) -> Self {
        self.groups.push(name.into());
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.metadata.is_none() {
            let scheme_ok = ["ws://", "wss://", "http://", "https://"]
                .iter()
                .any(|s| self.endpoint.starts_with(s));
            if !scheme_ok {
                return Err(ConfigError::Invalid(format!(
                    "Endpoint '{}' must start with ws://, wss://, http:// or https://",
                    self.endpoint
                )));
            }
        }

        if self.pragma.trim().is_empty() {
            return Err(ConfigError::Invalid("Empty Solidity pragma".into()));
        }

        for (what, name) in [
            ("calls_contract", &self.calls_contract),
            ("codec_library", &self.codec_library),
        ] {
            if !is_identifier(name) {
                return Err(ConfigError::Invalid(format!(
                    "{} '{}' is not a valid Solidity identifier",
                    what, name
                )));
            }
        }

        if self.calls_contract == self.codec_library {
            return Err(ConfigError::Invalid(
                "calls_contract and codec_library must differ".into(),
            ));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout_secs must be > 0".into()));
        }

        if let Some(i) = self.groups.iter().position(|g| g.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!("Group {} is empty", i)));
        }

        Ok(())
    }
}

fn is_identifier(name: &str) -> bool {
    !name.is_empty() && sanitize(name) == name && !name.starts_with(|c: char| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GeneratorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.policy, UnsupportedPolicy::Skip);
        assert_eq!(config.codec_library, "ScaleCodec");
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            metadata = "westmint.json"
            out_dir = "out"
            groups = ["Balances", "ForeignAssets"]
            policy = "fail"
            emit_calls_contract = false
        "#;
        let config: GeneratorConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.metadata, Some(PathBuf::from("westmint.json")));
        assert_eq!(config.groups.len(), 2);
        assert_eq!(config.policy, UnsupportedPolicy::Fail);
        assert!(!config.emit_calls_contract);
        assert!(config.emit_codec_library);
        assert_eq!(config.pragma, "^0.8.24");
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = GeneratorConfig::default()
            .with_metadata("meta.json")
            .group("Balances");
        let text = config.to_toml().unwrap();
        let back: GeneratorConfig = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_validation_errors() {
        let bad_endpoint = GeneratorConfig {
            endpoint: "ftp://node".into(),
            ..Default::default()
        };
        assert!(bad_endpoint.validate().is_err());
        assert!(bad_endpoint.clone().with_metadata("m.json").validate().is_ok());

        let bad_name = GeneratorConfig {
            calls_contract: "Pallet Calls".into(),
            ..Default::default()
        };
        assert!(bad_name.validate().is_err());

        let zero_timeout = GeneratorConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(zero_timeout.validate().is_err());
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("SKIP".parse::<UnsupportedPolicy>().unwrap(), UnsupportedPolicy::Skip);
        assert_eq!("fail".parse::<UnsupportedPolicy>().unwrap(), UnsupportedPolicy::Fail);
        assert!("maybe".parse::<UnsupportedPolicy>().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("palletgen.toml");
        std::fs::write(&path, "out_dir = \"gen\"\ntimeout_secs = 5\n").unwrap();
        let config = GeneratorConfig::from_file(&path).unwrap();
        assert_eq!(config.out_dir, PathBuf::from("gen"));
        assert_eq!(config.timeout_secs, 5);

        std::fs::write(&path, "timeout_secs = 0\n").unwrap();
        assert!(matches!(
            GeneratorConfig::from_file(&path),
            Err(ConfigError::Invalid(_))
        ));
    }
}
