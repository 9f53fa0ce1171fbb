//! End-to-end smoke test of a login page.
//!
//! Stages run strictly in order: `Created -> NavigatedToLoginPage ->
//! CredentialsEntered -> Submitted -> DashboardLoaded -> Closed`. The first
//! failed check ends the run, and the session is closed whichever stage
//! that happened in.

use std::time::Duration;

use log::{info, warn};

use crate::browser::{BrowserDriver, LaunchSettings, Locator, PageSession};
use crate::error::ScenarioError;
use crate::settings::LoginSettings;
use crate::types::{LoginReport, LoginStage};
use crate::wait::{Wait, WaitError};

/// Closes the session when dropped unless already closed.
struct SessionGuard {
    session: Box<dyn PageSession>,
    closed: bool,
}

impl SessionGuard {
    fn new(session: Box<dyn PageSession>) -> Self {
        Self {
            session,
            closed: false,
        }
    }

    fn page(&mut self) -> &mut dyn PageSession {
        self.session.as_mut()
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.session.close() {
            warn!("[Hands] Failed to close browser session: {e:#}");
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.close();
    }
}

struct Progress {
    stage: LoginStage,
    stages: Vec<LoginStage>,
}

impl Progress {
    fn new() -> Self {
        Self {
            stage: LoginStage::Created,
            stages: vec![LoginStage::Created],
        }
    }

    fn advance(&mut self, next: LoginStage) {
        info!("[Login] {} -> {}", self.stage, next);
        self.stage = next;
        self.stages.push(next);
    }

    fn driver(&self) -> impl Fn(anyhow::Error) -> ScenarioError + '_ {
        move |cause| ScenarioError::Driver {
            stage: self.stage,
            cause,
        }
    }

    fn waited(&self, err: WaitError) -> ScenarioError {
        match err {
            WaitError::Timeout(source) => ScenarioError::Timeout {
                stage: self.stage,
                source,
            },
            WaitError::Probe(cause) => ScenarioError::Driver {
                stage: self.stage,
                cause,
            },
        }
    }

    fn assert_eq(&self, what: &str, expected: &str, actual: &str) -> Result<(), ScenarioError> {
        if expected == actual {
            return Ok(());
        }
        Err(ScenarioError::Assertion {
            stage: self.stage,
            what: what.to_string(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        })
    }
}

pub struct LoginScenario {
    settings: LoginSettings,
    wait: Wait,
}

impl LoginScenario {
    pub fn new(settings: LoginSettings) -> Self {
        let wait = Wait::new(
            Duration::from_secs(settings.wait_timeout_secs),
            Duration::from_millis(settings.poll_interval_ms),
        );
        Self::with_wait(settings, wait)
    }

    pub fn with_wait(settings: LoginSettings, wait: Wait) -> Self {
        Self { settings, wait }
    }

    pub fn run(&self, driver: &dyn BrowserDriver) -> Result<LoginReport, ScenarioError> {
        let launch = LaunchSettings::from(&self.settings);
        let session = driver.open_session(&launch).map_err(ScenarioError::Launch)?;
        let mut guard = SessionGuard::new(session);
        let mut progress = Progress::new();

        let outcome = self.drive(guard.page(), &mut progress);
        guard.close();

        match outcome {
            Ok(mut report) => {
                progress.advance(LoginStage::Closed);
                report.stages = progress.stages;
                Ok(report)
            }
            Err(e) => {
                warn!("[Login] Scenario failed at {}: {e}", e.stage());
                Err(e)
            }
        }
    }

    fn drive(&self, page: &mut dyn PageSession, progress: &mut Progress) -> Result<LoginReport, ScenarioError> {
        let s = &self.settings;
        let username = Locator::Css(s.username_field.clone());
        let password = Locator::Css(s.password_field.clone());
        let submit = Locator::Css(s.submit_button.clone());
        let header = Locator::XPath(s.dashboard_header_xpath.clone());

        page.navigate(&s.base_url).map_err(progress.driver())?;
        progress.advance(LoginStage::NavigatedToLoginPage);

        let login_title = page.title().map_err(progress.driver())?;
        progress.assert_eq("login page title", &s.expected_login_title, &login_title)?;

        self.wait
            .until(&format!("{username} to be visible"), || page.is_visible(&username))
            .map_err(|e| progress.waited(e))?;
        page.clear_and_type(&username, &s.username)
            .map_err(progress.driver())?;
        page.clear_and_type(&password, &s.password)
            .map_err(progress.driver())?;
        progress.advance(LoginStage::CredentialsEntered);

        page.click(&submit).map_err(progress.driver())?;
        progress.advance(LoginStage::Submitted);

        let fragment = &s.dashboard_url_fragment;
        self.wait
            .until(&format!("url to contain {fragment:?}"), || {
                Ok(page.current_url()?.contains(fragment.as_str()))
            })
            .map_err(|e| progress.waited(e))?;
        progress.advance(LoginStage::DashboardLoaded);

        let dashboard_url = page.current_url().map_err(progress.driver())?;
        let dashboard_title = page.title().map_err(progress.driver())?;
        progress.assert_eq("dashboard title", &s.expected_dashboard_title, &dashboard_title)?;

        self.wait
            .until(&format!("{header} to be visible"), || page.is_visible(&header))
            .map_err(|e| progress.waited(e))?;

        Ok(LoginReport {
            login_title,
            dashboard_title,
            dashboard_url,
            stages: Vec::new(),
        })
    }
}
