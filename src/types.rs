use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;

pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const API_KEY_NAME: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV: &str = "OPENAI_BASE_URL";
pub const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 10;

/// The immutable input/model pair sent to the text-generation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestDescriptor {
    input: String,
    model: String,
}

impl RequestDescriptor {
    pub fn new(input: impl Into<String>, model: impl Into<String>) -> Result<Self, ConfigError> {
        let input = input.into();
        let model = model.into();
        if input.trim().is_empty() {
            return Err(ConfigError::Invalid("prompt input is empty".into()));
        }
        if model.trim().is_empty() {
            return Err(ConfigError::Invalid("model identifier is empty".into()));
        }
        Ok(Self { input, model })
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Whatever the service answered. Not validated beyond being JSON.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct ResponseValue(pub Value);

impl ResponseValue {
    /// The `output` member, or `null` when the service omitted it.
    pub fn output(&self) -> &Value {
        self.0.get("output").unwrap_or(&Value::Null)
    }

    /// Concatenated `output_text` parts of every output message.
    pub fn output_text(&self) -> String {
        let mut text = String::new();
        let Some(items) = self.output().as_array() else {
            return text;
        };
        for item in items {
            let Some(parts) = item.get("content").and_then(Value::as_array) else {
                continue;
            };
            for part in parts {
                if part.get("type").and_then(Value::as_str) != Some("output_text") {
                    continue;
                }
                if let Some(t) = part.get("text").and_then(Value::as_str) {
                    if !text.is_empty() {
                        text.push('\n');
                    }
                    text.push_str(t);
                }
            }
        }
        text
    }
}

/// Linear progression of the browser login scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoginStage {
    Created,
    NavigatedToLoginPage,
    CredentialsEntered,
    Submitted,
    DashboardLoaded,
    Closed,
}

impl fmt::Display for LoginStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoginStage::Created => "created",
            LoginStage::NavigatedToLoginPage => "navigated-to-login-page",
            LoginStage::CredentialsEntered => "credentials-entered",
            LoginStage::Submitted => "submitted",
            LoginStage::DashboardLoaded => "dashboard-loaded",
            LoginStage::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// What a passing login scenario observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginReport {
    pub login_title: String,
    pub dashboard_title: String,
    pub dashboard_url: String,
    pub stages: Vec<LoginStage>,
}
