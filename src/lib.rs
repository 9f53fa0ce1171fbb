pub mod brain;
pub mod browser;
pub mod credentials;
pub mod error;
pub mod generate;
pub mod login;
pub mod output;
pub mod prompt;
pub mod properties;
pub mod settings;
pub mod types;
pub mod wait;

pub use error::{ConfigError, ScenarioError, ServiceError};
pub use settings::Settings;

use std::process::ExitCode;

/// `RUST_LOG` wins; otherwise `info` and up go to stderr.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Log a failed run once and turn it into a non-zero exit status.
pub fn exit_status(tag: &str, result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{tag} {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_exits_zero() {
        let code = exit_status("[Agent]", Ok(()));
        assert_eq!(format!("{code:?}"), format!("{:?}", ExitCode::SUCCESS));
    }

    #[test]
    fn failure_exits_non_zero() {
        let result = Err(anyhow::anyhow!("quota exceeded").context("error calling OpenAI"));
        let code = exit_status("[Agent]", result);
        assert_eq!(format!("{code:?}"), format!("{:?}", ExitCode::FAILURE));
    }
}
