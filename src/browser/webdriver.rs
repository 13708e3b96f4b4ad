use std::time::Duration;

use async_trait::async_trait;
use thirtyfour::prelude::*;
use thirtyfour::{ChromiumLikeCapabilities, WindowHandle};
use tracing::{debug, info, instrument};

use crate::browser::{Browser, PageElement, Query};
use crate::error::Result;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// How to reach and configure the Chrome session.
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// Address of a running ChromeDriver.
    pub webdriver_url: String,
    /// Explicit Chrome binary, e.g. inside a container.
    pub chrome_binary: Option<String>,
    pub page_load_timeout: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            webdriver_url: "http://localhost:9515".to_string(),
            chrome_binary: None,
            page_load_timeout: Duration::from_secs(30),
        }
    }
}

/// A headless Chrome session driven over the WebDriver protocol.
pub struct WebDriverBrowser {
    driver: WebDriver,
}

impl WebDriverBrowser {
    /// Start a headless Chrome session through ChromeDriver.
    #[instrument(skip_all, fields(webdriver_url = %config.webdriver_url))]
    pub async fn connect(config: &DriverConfig) -> Result<Self> {
        let mut caps = DesiredCapabilities::chrome();
        caps.set_headless()?;
        caps.set_no_sandbox()?;
        caps.set_disable_dev_shm_usage()?;
        caps.set_disable_gpu()?;
        caps.add_arg("--window-size=1920,1080")?;
        caps.add_arg(&format!("--user-agent={USER_AGENT}"))?;
        if let Some(binary) = &config.chrome_binary {
            debug!(binary, "using explicit chrome binary");
            caps.set_binary(binary)?;
        }

        let driver = WebDriver::new(&config.webdriver_url, caps).await?;
        driver.set_page_load_timeout(config.page_load_timeout).await?;
        info!("chrome session started");
        Ok(Self { driver })
    }
}

#[async_trait(?Send)]
impl Query for WebDriverBrowser {
    type Element = WebElement;

    async fn query(&self, selector: &str) -> Result<Vec<WebElement>> {
        Ok(self.driver.find_all(By::Css(selector.to_string())).await?)
    }
}

#[async_trait(?Send)]
impl Browser for WebDriverBrowser {
    type Context = WindowHandle;

    async fn navigate(&mut self, url: &str) -> Result<()> {
        debug!(url, "navigating");
        Ok(self.driver.goto(url).await?)
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        self.driver
            .query(By::Css(selector.to_string()))
            .wait(timeout, WAIT_POLL_INTERVAL)
            .first()
            .await?;
        Ok(())
    }

    async fn current_context(&self) -> Result<WindowHandle> {
        Ok(self.driver.window().await?)
    }

    async fn open_context(&mut self) -> Result<WindowHandle> {
        Ok(self.driver.new_tab().await?)
    }

    async fn switch_context(&mut self, context: &WindowHandle) -> Result<()> {
        Ok(self.driver.switch_to_window(context.clone()).await?)
    }

    async fn close_context(&mut self, context: &WindowHandle) -> Result<()> {
        self.driver.switch_to_window(context.clone()).await?;
        Ok(self.driver.close_window().await?)
    }

    async fn quit(self) -> Result<()> {
        Ok(self.driver.quit().await?)
    }
}

#[async_trait(?Send)]
impl Query for WebElement {
    type Element = WebElement;

    async fn query(&self, selector: &str) -> Result<Vec<WebElement>> {
        Ok(self.find_all(By::Css(selector.to_string())).await?)
    }
}

#[async_trait(?Send)]
impl PageElement for WebElement {
    async fn text(&self) -> Result<String> {
        Ok(WebElement::text(self).await?)
    }

    async fn attr(&self, name: &str) -> Result<Option<String>> {
        Ok(WebElement::attr(self, name).await?)
    }

    fn key(&self) -> String {
        self.element_id().to_string()
    }
}
