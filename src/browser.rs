//! The slice of a browser the login scenario needs. The Chrome-backed
//! implementation lives with the `login-smoke` binary.

use std::fmt;

use anyhow::Result;

use crate::settings::LoginSettings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Locator {
    Css(String),
    XPath(String),
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Css(s) => write!(f, "css={s}"),
            Locator::XPath(s) => write!(f, "xpath={s}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSettings {
    pub headless: bool,
    pub maximized: bool,
}

impl From<&LoginSettings> for LaunchSettings {
    fn from(s: &LoginSettings) -> Self {
        Self {
            headless: s.headless,
            maximized: s.maximized,
        }
    }
}

pub trait BrowserDriver {
    fn open_session(&self, options: &LaunchSettings) -> Result<Box<dyn PageSession>>;
}

/// One live page. Lookups that find nothing are `Ok(false)`, not errors.
pub trait PageSession {
    fn navigate(&mut self, url: &str) -> Result<()>;
    fn title(&mut self) -> Result<String>;
    fn current_url(&mut self) -> Result<String>;
    fn is_visible(&mut self, locator: &Locator) -> Result<bool>;
    /// Empty the field, then type into it.
    fn clear_and_type(&mut self, locator: &Locator, text: &str) -> Result<()>;
    fn click(&mut self, locator: &Locator) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}
