use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::types::LoginStage;

/// Failures while locating, reading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config.properties not found. Tried paths: {}", join_paths(.tried))]
    NotFound { tried: Vec<PathBuf> },

    #[error("failed to read {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{origin}:{line}: {reason}")]
    Malformed {
        origin: String,
        line: usize,
        reason: String,
    },

    #[error("{key} not found in {origin}")]
    MissingKey { key: String, origin: String },

    #[error("{key} is empty in {origin}")]
    EmptyValue { key: String, origin: String },

    #[error("invalid settings: {0}")]
    Invalid(String),
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Failures of the single round trip to the text-generation service.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("could not set up HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("request to text-generation service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("OpenAI API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("could not decode service response: {0}")]
    Decode(String),
}

/// Why a login scenario stopped before reaching the dashboard.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("could not open browser session: {0:#}")]
    Launch(anyhow::Error),

    #[error("[{stage}] {what}: expected {expected:?}, got {actual:?}")]
    Assertion {
        stage: LoginStage,
        what: String,
        expected: String,
        actual: String,
    },

    #[error("[{stage}] {source}")]
    Timeout {
        stage: LoginStage,
        #[source]
        source: WaitTimeout,
    },

    #[error("[{stage}] browser command failed: {cause:#}")]
    Driver {
        stage: LoginStage,
        cause: anyhow::Error,
    },
}

impl ScenarioError {
    /// Last stage the scenario reached before failing.
    pub fn stage(&self) -> LoginStage {
        match self {
            ScenarioError::Launch(_) => LoginStage::Created,
            ScenarioError::Assertion { stage, .. }
            | ScenarioError::Timeout { stage, .. }
            | ScenarioError::Driver { stage, .. } => *stage,
        }
    }
}

/// An explicit wait ran out of time.
#[derive(Debug, Error)]
#[error("timed out after {timeout:?} waiting for {condition}")]
pub struct WaitTimeout {
    pub condition: String,
    pub timeout: Duration,
}
