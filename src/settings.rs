//! Run settings. Every recognized option is a field below; unknown keys in
//! a settings file are rejected. Defaults reproduce the demo as shipped.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::credentials::CredentialSource;
use crate::error::ConfigError;
use crate::output::OutputMode;
use crate::prompt::{self, PromptPreset};
use crate::types::{BASE_URL_ENV, DEFAULT_API_BASE, DEFAULT_MODEL, DEFAULT_WAIT_TIMEOUT_SECS};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub generation: GenerationSettings,
    pub login: LoginSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationSettings {
    pub model: String,
    pub api_base: String,
    pub credentials: CredentialSource,
    pub preset: PromptPreset,
    /// Overrides the preset's template. Must contain `{task}`.
    pub template: Option<String>,
    /// Overrides the preset's task text.
    pub task: Option<String>,
    pub output: OutputMode,
    /// Unset means the HTTP client's own behaviour, no explicit timeout.
    pub timeout_secs: Option<u64>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            credentials: CredentialSource::default(),
            preset: PromptPreset::default(),
            template: None,
            task: None,
            output: OutputMode::default(),
            timeout_secs: None,
        }
    }
}

impl GenerationSettings {
    pub fn template(&self) -> &str {
        self.template.as_deref().unwrap_or(self.preset.template())
    }

    pub fn task(&self) -> &str {
        self.task.as_deref().unwrap_or(self.preset.task())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoginSettings {
    pub base_url: String,
    pub expected_login_title: String,
    pub expected_dashboard_title: String,
    pub username: String,
    pub password: String,
    /// CSS selectors for the form controls.
    pub username_field: String,
    pub password_field: String,
    pub submit_button: String,
    pub dashboard_url_fragment: String,
    pub dashboard_header_xpath: String,
    pub wait_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub headless: bool,
    pub maximized: bool,
}

impl Default for LoginSettings {
    fn default() -> Self {
        Self {
            base_url: "https://opensource-demo.orangehrmlive.com/".to_string(),
            expected_login_title: "OrangeHRM".to_string(),
            expected_dashboard_title: "OrangeHRM".to_string(),
            username: "Admin".to_string(),
            password: "admin123".to_string(),
            username_field: "input[name='username']".to_string(),
            password_field: "input[name='password']".to_string(),
            submit_button: "button[type='submit']".to_string(),
            dashboard_url_fragment: "/dashboard".to_string(),
            dashboard_header_xpath: "//h6[text()='Dashboard']".to_string(),
            wait_timeout_secs: DEFAULT_WAIT_TIMEOUT_SECS,
            poll_interval_ms: 250,
            headless: false,
            maximized: true,
        }
    }
}

impl Settings {
    /// Defaults when `path` is `None`, otherwise the JSON file on top of them.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let file = File::open(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings = serde_json::from_reader(BufReader::new(file)).map_err(|e| {
            ConfigError::Malformed {
                origin: path.display().to_string(),
                line: e.line(),
                reason: e.to_string(),
            }
        })?;
        Ok(settings)
    }

    /// Apply the client-library environment conventions (`OPENAI_BASE_URL`).
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.generation.api_base = base.trim().to_string();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let g = &self.generation;
        require("generation.model", &g.model)?;
        require("generation.api_base", &g.api_base)?;
        prompt::check_template(g.template())?;
        if g.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid("generation.timeout_secs must be positive".into()));
        }

        let l = &self.login;
        require("login.base_url", &l.base_url)?;
        require("login.username_field", &l.username_field)?;
        require("login.password_field", &l.password_field)?;
        require("login.submit_button", &l.submit_button)?;
        require("login.dashboard_url_fragment", &l.dashboard_url_fragment)?;
        require("login.dashboard_header_xpath", &l.dashboard_header_xpath)?;
        if l.wait_timeout_secs == 0 {
            return Err(ConfigError::Invalid("login.wait_timeout_secs must be positive".into()));
        }
        if l.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("login.poll_interval_ms must be positive".into()));
        }
        Ok(())
    }
}

fn require(name: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        Err(ConfigError::Invalid(format!("{name} must not be empty")))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_the_demo() {
        let s = Settings::load(None).unwrap();
        assert_eq!(s.generation.model, "gpt-4.1-mini");
        assert_eq!(s.generation.credentials, CredentialSource::File);
        assert_eq!(s.login.expected_login_title, "OrangeHRM");
        assert_eq!(s.login.wait_timeout_secs, 10);
        assert!(s.login.maximized);
        s.validate().unwrap();
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{"generation": {"preset": "question", "credentials": "env"}, "login": {"headless": true}}"#,
        )
        .unwrap();

        let s = Settings::load(Some(&path)).unwrap();
        assert_eq!(s.generation.preset, PromptPreset::Question);
        assert_eq!(s.generation.credentials, CredentialSource::Env);
        assert_eq!(s.generation.task(), "what is time in India now");
        assert!(s.login.headless);
        assert_eq!(s.login.username, "Admin");
    }

    #[test]
    fn unknown_option_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"generation": {"modle": "typo"}}"#).unwrap();
        assert!(matches!(
            Settings::load(Some(&path)),
            Err(ConfigError::Malformed { .. })
        ));
    }

    #[test]
    fn missing_file_is_unreadable() {
        let dir = TempDir::new().unwrap();
        let err = Settings::load(Some(&dir.path().join("absent.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::Unreadable { .. }));
    }

    #[test]
    fn template_override_needs_placeholder() {
        let mut s = Settings::default();
        s.generation.template = Some("static prompt".into());
        assert!(matches!(s.validate(), Err(ConfigError::Invalid(_))));
        s.generation.template = Some("Summarise: {task}".into());
        s.validate().unwrap();
    }

    #[test]
    fn zero_wait_is_invalid() {
        let mut s = Settings::default();
        s.login.wait_timeout_secs = 0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn base_url_comes_from_env_convention() {
        let mut s = Settings::default();
        s.apply_env(|name| (name == "OPENAI_BASE_URL").then(|| " http://localhost:8080/v1 ".to_string()));
        assert_eq!(s.generation.api_base, "http://localhost:8080/v1");

        let mut s = Settings::default();
        s.apply_env(|_| None);
        assert_eq!(s.generation.api_base, DEFAULT_API_BASE);
    }
}
