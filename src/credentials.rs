//! Where the API key comes from.
//!
//! Two interchangeable providers sit behind [`CredentialProvider`]; the
//! settings pick one instead of having one entry point per source.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::properties::PropertiesLoader;
use crate::types::API_KEY_NAME;

/// An API key. Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

pub trait CredentialProvider {
    fn api_key(&self) -> Result<Secret, ConfigError>;

    /// Human readable source, for logs.
    fn describe(&self) -> String;
}

/// Trims the raw value and rejects absence or emptiness.
pub fn validate_secret(raw: Option<&str>, key: &str, origin: &str) -> Result<Secret, ConfigError> {
    let raw = raw.ok_or_else(|| ConfigError::MissingKey {
        key: key.to_string(),
        origin: origin.to_string(),
    })?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyValue {
            key: key.to_string(),
            origin: origin.to_string(),
        });
    }
    Ok(Secret(trimmed.to_string()))
}

/// Reads the key from a properties file found by [`PropertiesLoader`].
#[derive(Debug, Clone)]
pub struct PropertiesCredentials {
    loader: PropertiesLoader,
    key: String,
}

impl PropertiesCredentials {
    pub fn new(loader: PropertiesLoader) -> Self {
        Self {
            loader,
            key: API_KEY_NAME.to_string(),
        }
    }
}

impl CredentialProvider for PropertiesCredentials {
    fn api_key(&self) -> Result<Secret, ConfigError> {
        let props = self.loader.load()?;
        validate_secret(props.get(&self.key), &self.key, props.origin())
    }

    fn describe(&self) -> String {
        format!("{} from properties file", self.key)
    }
}

/// Reads the key from the process environment (after `.env` is applied).
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    var: String,
}

impl EnvCredentials {
    pub fn new() -> Self {
        Self::with_var(API_KEY_NAME)
    }

    pub fn with_var(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialProvider for EnvCredentials {
    fn api_key(&self) -> Result<Secret, ConfigError> {
        let value = std::env::var(&self.var).ok();
        validate_secret(value.as_deref(), &self.var, "environment")
    }

    fn describe(&self) -> String {
        format!("{} from environment", self.var)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CredentialSource {
    #[default]
    File,
    Env,
}

pub fn credentials_from(source: CredentialSource, loader: PropertiesLoader) -> Box<dyn CredentialProvider> {
    match source {
        CredentialSource::File => Box::new(PropertiesCredentials::new(loader)),
        CredentialSource::Env => Box::new(EnvCredentials::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn loader_with(contents: &str) -> (TempDir, PropertiesLoader) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.properties");
        fs::write(&path, contents).unwrap();
        let loader = PropertiesLoader::new(None, vec![path]);
        (dir, loader)
    }

    #[test]
    fn reads_key_from_file() {
        let (_dir, loader) = loader_with("OPENAI_API_KEY=abc123\n");
        let secret = PropertiesCredentials::new(loader).api_key().unwrap();
        assert_eq!(secret.expose(), "abc123");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let (_dir, loader) = loader_with("OPENAI_API_KEY=  sk-test-42 \t\n");
        let secret = PropertiesCredentials::new(loader).api_key().unwrap();
        assert_eq!(secret.expose(), "sk-test-42");
    }

    #[test]
    fn whitespace_only_value_is_an_error() {
        let (_dir, loader) = loader_with("OPENAI_API_KEY=   \n");
        let err = PropertiesCredentials::new(loader).api_key().unwrap_err();
        assert!(matches!(err, ConfigError::EmptyValue { .. }), "{err:?}");
    }

    #[test]
    fn missing_key_is_an_error() {
        let (_dir, loader) = loader_with("SOMETHING_ELSE=1\n");
        let err = PropertiesCredentials::new(loader).api_key().unwrap_err();
        assert!(matches!(err, ConfigError::MissingKey { .. }), "{err:?}");
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn missing_file_propagates_not_found() {
        let dir = TempDir::new().unwrap();
        let loader = PropertiesLoader::new(None, vec![dir.path().join("nope.properties")]);
        let err = PropertiesCredentials::new(loader).api_key().unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn unset_env_var_is_missing() {
        let provider = EnvCredentials::with_var("QA_GENAI_DEMO_SURELY_UNSET_VAR");
        assert!(matches!(provider.api_key(), Err(ConfigError::MissingKey { .. })));
    }

    #[test]
    fn validate_rejects_blank() {
        assert!(validate_secret(Some(" \n "), "K", "o").is_err());
        assert_eq!(validate_secret(Some(" v "), "K", "o").unwrap().expose(), "v");
    }

    #[test]
    fn debug_output_is_redacted() {
        let secret = validate_secret(Some("sk-very-secret"), "K", "o").unwrap();
        assert!(!format!("{secret:?}").contains("sk-very-secret"));
    }

    #[test]
    fn source_selects_provider() {
        let (_dir, loader) = loader_with("OPENAI_API_KEY=abc123\n");
        let provider = credentials_from(CredentialSource::File, loader.clone());
        assert!(provider.describe().contains("properties"));
        assert_eq!(provider.api_key().unwrap().expose(), "abc123");

        let provider = credentials_from(CredentialSource::Env, loader);
        assert!(provider.describe().contains("environment"));
    }
}
