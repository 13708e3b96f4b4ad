//! The slice of a browsing engine the scraper relies on.
//!
//! [`webdriver::WebDriverBrowser`] drives a real Chrome through ChromeDriver,
//! [`snapshot::SnapshotBrowser`] serves fixed HTML pages from memory.

pub mod snapshot;
pub mod webdriver;

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::error::Result;

/// Anything CSS selectors can be evaluated against: a whole page or one element.
#[async_trait(?Send)]
pub trait Query {
    type Element: PageElement;

    /// All elements matching `selector`, in document order.
    async fn query(&self, selector: &str) -> Result<Vec<Self::Element>>;
}

/// A handle to one element of the current page.
#[async_trait(?Send)]
pub trait PageElement: Query<Element = Self> + Sized {
    /// Rendered text of the element and its descendants.
    async fn text(&self) -> Result<String>;

    async fn attr(&self, name: &str) -> Result<Option<String>>;

    /// Identity of the element within its page, used to de-duplicate query results.
    fn key(&self) -> String;
}

#[async_trait(?Send)]
pub trait Browser: Query {
    /// Handle to a browsing context (a tab or window).
    type Context: Clone + PartialEq + Debug;

    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Wait until `selector` matches, failing after `timeout`.
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<()>;

    async fn current_context(&self) -> Result<Self::Context>;

    /// Open a new, empty context without switching to it.
    async fn open_context(&mut self) -> Result<Self::Context>;

    async fn switch_context(&mut self, context: &Self::Context) -> Result<()>;

    /// Close `context`. Focus is undefined afterwards until the next switch.
    async fn close_context(&mut self, context: &Self::Context) -> Result<()>;

    /// End the browser session.
    async fn quit(self) -> Result<()>;
}

/// A secondary browsing context that is focused while it is held.
///
/// [`SecondaryContext::release`] closes it and returns focus to the context
/// that was active when it was opened. Callers must release it on every path.
pub struct SecondaryContext<'a, B: Browser> {
    browser: &'a mut B,
    primary: B::Context,
    secondary: B::Context,
}

impl<'a, B: Browser> SecondaryContext<'a, B> {
    pub async fn open(browser: &'a mut B) -> Result<Self> {
        let primary = browser.current_context().await?;
        let secondary = browser.open_context().await?;
        if let Err(e) = browser.switch_context(&secondary).await {
            if let Err(close_err) = browser.close_context(&secondary).await {
                warn!(error = %close_err, "failed to close unused secondary context");
            }
            browser.switch_context(&primary).await?;
            return Err(e);
        }
        Ok(Self {
            browser,
            primary,
            secondary,
        })
    }

    pub fn browser(&mut self) -> &mut B {
        self.browser
    }

    /// Close the secondary context and refocus the primary one.
    ///
    /// Switching back is attempted even when closing fails.
    pub async fn release(self) -> Result<()> {
        let closed = self.browser.close_context(&self.secondary).await;
        self.browser.switch_context(&self.primary).await?;
        closed
    }
}

#[cfg(test)]
mod tests {
    use super::snapshot::SnapshotBrowser;
    use super::*;

    #[tokio::test]
    async fn test_secondary_context_restores_primary() {
        let mut browser = SnapshotBrowser::new()
            .with_page("https://tips.test/", "<body><p>listing</p></body>")
            .with_page("https://tips.test/match/1", "<body><p>detail</p></body>");
        browser.navigate("https://tips.test/").await.unwrap();
        let primary = browser.current_context().await.unwrap();

        let mut tab = SecondaryContext::open(&mut browser).await.unwrap();
        tab.browser().navigate("https://tips.test/match/1").await.unwrap();
        let detail = tab.browser().query("p").await.unwrap();
        assert_eq!(detail[0].text().await.unwrap(), "detail");
        assert_ne!(tab.browser().current_context().await.unwrap(), primary);
        tab.release().await.unwrap();

        assert_eq!(browser.current_context().await.unwrap(), primary);
        assert_eq!(browser.open_contexts(), 1);
        let listing = browser.query("p").await.unwrap();
        assert_eq!(listing[0].text().await.unwrap(), "listing");
    }
}
