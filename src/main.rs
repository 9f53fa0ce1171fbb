use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use log::info;

use qa_genai_demo::brain::OpenAiClient;
use qa_genai_demo::credentials::{CredentialProvider, CredentialSource, credentials_from};
use qa_genai_demo::generate::{descriptor_for, run_generation};
use qa_genai_demo::output::OutputMode;
use qa_genai_demo::prompt::PromptPreset;
use qa_genai_demo::properties::PropertiesLoader;
use qa_genai_demo::settings::{GenerationSettings, Settings};

/// Send one prompt to the text-generation service and print the answer.
#[derive(Parser, Debug)]
#[command(name = "genai", version)]
struct Cli {
    /// JSON settings file; built-in defaults otherwise
    #[arg(long)]
    settings: Option<PathBuf>,
    #[arg(long, value_enum)]
    preset: Option<PromptPreset>,
    /// Replaces the preset's task text (question or user story)
    #[arg(long)]
    task: Option<String>,
    #[arg(long)]
    model: Option<String>,
    /// Where the API key is read from
    #[arg(long, value_enum)]
    credentials: Option<CredentialSource>,
    #[arg(long, value_enum)]
    output: Option<OutputMode>,
    /// Also write the printed result to this file
    #[arg(long)]
    save: Option<PathBuf>,
}

impl Cli {
    fn apply(&self, g: &mut GenerationSettings) {
        if let Some(preset) = self.preset {
            g.preset = preset;
        }
        if let Some(task) = &self.task {
            g.task = Some(task.clone());
        }
        if let Some(model) = &self.model {
            g.model = model.clone();
        }
        if let Some(source) = self.credentials {
            g.credentials = source;
        }
        if let Some(output) = self.output {
            g.output = output;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    qa_genai_demo::init_logging();

    let cli = Cli::parse();
    qa_genai_demo::exit_status("[Agent]", run(cli).await)
}

async fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load(cli.settings.as_deref())?;
    settings.apply_env(|name| std::env::var(name).ok());
    cli.apply(&mut settings.generation);
    settings.validate()?;
    let generation = &settings.generation;

    let provider = credentials_from(generation.credentials, PropertiesLoader::with_defaults());
    info!("[Agent] Reading {}", provider.describe());
    let api_key = provider.api_key().context("failed to load API key")?;

    let client = OpenAiClient::new(
        api_key,
        &generation.api_base,
        generation.timeout_secs.map(Duration::from_secs),
    )?;
    let descriptor = descriptor_for(generation)?;

    run_generation(
        &client,
        &descriptor,
        generation.output,
        cli.save.as_deref(),
        &mut std::io::stdout(),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flags_keeps_settings() {
        let cli = Cli::try_parse_from(["genai"]).unwrap();
        let mut g = GenerationSettings::default();
        cli.apply(&mut g);
        assert_eq!(g, GenerationSettings::default());
    }

    #[test]
    fn flags_override_settings() {
        let cli = Cli::try_parse_from([
            "genai",
            "--preset",
            "question",
            "--task",
            "what is time in Tokyo now",
            "--credentials",
            "env",
            "--output",
            "text",
            "--model",
            "gpt-4.1",
        ])
        .unwrap();
        let mut g = GenerationSettings::default();
        cli.apply(&mut g);
        assert_eq!(g.preset, PromptPreset::Question);
        assert_eq!(g.task(), "what is time in Tokyo now");
        assert_eq!(g.credentials, CredentialSource::Env);
        assert_eq!(g.output, OutputMode::Text);
        assert_eq!(g.model, "gpt-4.1");
    }

    #[test]
    fn unknown_preset_is_rejected() {
        assert!(Cli::try_parse_from(["genai", "--preset", "poem"]).is_err());
    }
}
