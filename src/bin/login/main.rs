mod dom;
mod hands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Result, anyhow};
use clap::Parser;
use dotenvy::dotenv;
use log::info;

use qa_genai_demo::login::LoginScenario;
use qa_genai_demo::settings::{LoginSettings, Settings};

/// Drive the demo login page in Chrome and check the dashboard appears.
#[derive(Parser, Debug)]
#[command(name = "login-smoke", version)]
struct Cli {
    /// JSON settings file; built-in defaults otherwise
    #[arg(long)]
    settings: Option<PathBuf>,
    #[arg(long)]
    base_url: Option<String>,
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    password: Option<String>,
    /// Run Chrome without a window
    #[arg(long)]
    headless: bool,
}

impl Cli {
    fn apply(&self, l: &mut LoginSettings) {
        if let Some(url) = &self.base_url {
            l.base_url = url.clone();
        }
        if let Some(username) = &self.username {
            l.username = username.clone();
        }
        if let Some(password) = &self.password {
            l.password = password.clone();
        }
        if self.headless {
            l.headless = true;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    qa_genai_demo::init_logging();

    let cli = Cli::parse();
    qa_genai_demo::exit_status("[Login]", run(cli).await)
}

async fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::load(cli.settings.as_deref())?;
    cli.apply(&mut settings.login);
    settings.validate()?;

    info!("[Login] Testing {}", settings.login.base_url);
    let scenario = LoginScenario::new(settings.login);

    // headless_chrome blocks; keep it off the runtime threads
    let outcome = tokio::task::spawn_blocking(move || scenario.run(&hands::ChromeDriver))
        .await
        .map_err(|e| anyhow!("Login scenario panicked: {}", e))?;

    match outcome {
        Ok(report) => {
            println!(
                "PASS: logged in, title {:?}, dashboard at {}",
                report.dashboard_title, report.dashboard_url
            );
            Ok(())
        }
        Err(e) => {
            let stage = e.stage();
            Err(anyhow::Error::from(e).context(format!("FAIL at {stage}")))
        }
    }
}
