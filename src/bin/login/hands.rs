use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use headless_chrome::browser::tab::NoElementFound;
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use log::{debug, info, warn};

use qa_genai_demo::browser::{BrowserDriver, LaunchSettings, Locator, PageSession};

use crate::dom;

/// Launches a fresh local Chrome per session.
pub struct ChromeDriver;

impl BrowserDriver for ChromeDriver {
    fn open_session(&self, options: &LaunchSettings) -> Result<Box<dyn PageSession>> {
        Ok(Box::new(ChromeSession::launch(options)?))
    }
}

pub struct ChromeSession {
    browser: Option<Browser>,
    tab: Arc<Tab>,
}

impl ChromeSession {
    pub fn launch(options: &LaunchSettings) -> Result<Self> {
        let chrome_path = find_chrome()?;
        info!("[Hands] Starting Chrome from {}", chrome_path.display());

        let mut args = vec![
            OsStr::new("--no-first-run"),
            OsStr::new("--no-default-browser-check"),
        ];
        if options.maximized {
            args.push(OsStr::new("--start-maximized"));
        }

        let launch = LaunchOptions {
            headless: options.headless,
            path: Some(chrome_path),
            args,
            ..Default::default()
        };

        let browser = Browser::new(launch).map_err(|e| anyhow!("Browser launch failed: {e}"))?;
        let tab = browser.new_tab()?;
        info!("[Hands] Chrome ready.");

        Ok(Self {
            browser: Some(browser),
            tab,
        })
    }

    fn find(&self, locator: &Locator) -> Result<Element<'_>> {
        match locator {
            Locator::Css(selector) => self.tab.find_element(selector),
            Locator::XPath(query) => self.tab.find_element_by_xpath(query),
        }
    }
}

impl PageSession for ChromeSession {
    fn navigate(&mut self, url: &str) -> Result<()> {
        debug!("[Hands] Navigating to {url}");
        self.tab.navigate_to(url)?.wait_until_navigated()?;
        Ok(())
    }

    fn title(&mut self) -> Result<String> {
        dom::get_page_title(&self.tab)
    }

    fn current_url(&mut self) -> Result<String> {
        dom::get_current_url(&self.tab)
    }

    fn is_visible(&mut self, locator: &Locator) -> Result<bool> {
        match self.find(locator) {
            Ok(element) => dom::is_displayed(&element),
            Err(e) => absent_as_false(e),
        }
    }

    fn clear_and_type(&mut self, locator: &Locator, text: &str) -> Result<()> {
        let element = self.find(locator)?;
        element.click()?;
        dom::clear_input(&element)?;
        element.type_into(text)?;
        Ok(())
    }

    fn click(&mut self, locator: &Locator) -> Result<()> {
        debug!("[Hands] Clicking {locator}");
        self.find(locator)?.click()?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let Some(browser) = self.browser.take() else {
            return Ok(());
        };
        if let Err(e) = self.tab.close(true) {
            warn!("[Hands] Tab did not close cleanly: {e}");
        }
        // dropping the browser terminates the Chrome process
        drop(browser);
        info!("[Hands] Browser closed.");
        Ok(())
    }
}

/// A missing element only means "not yet"; a dead tab or lost connection
/// must fail the wait right away.
fn absent_as_false(err: anyhow::Error) -> Result<bool> {
    if err.downcast_ref::<NoElementFound>().is_some() {
        Ok(false)
    } else {
        Err(err)
    }
}

/// `CHROME_PATH` if set, otherwise whatever Chrome/Chromium is installed.
fn find_chrome() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os("CHROME_PATH").map(PathBuf::from) {
        if path.exists() {
            return Ok(path);
        }
        warn!("[Hands] CHROME_PATH {} does not exist", path.display());
    }
    headless_chrome::browser::default_executable().map_err(|e| {
        anyhow!("Chrome executable not found ({e}). Install Chrome or set CHROME_PATH.")
    })
}
