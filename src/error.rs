use ::scraper::error::SelectorErrorKind;

/// All errors that can occur while scraping tips or submitting them.
#[derive(thiserror::Error, Debug)]
pub enum TipsError {
    /// The WebDriver session failed (connection, navigation, stale element, etc.).
    #[error("webdriver error: {0}")]
    Driver(#[from] thirtyfour::error::WebDriverError),

    /// A CSS selector string could not be parsed.
    #[error("invalid CSS selector: {0}")]
    Selector(String),

    /// The browser has no page registered for the requested URL.
    #[error("page not found: {url}")]
    PageNotFound { url: String },

    /// A bounded wait for an element ran out.
    #[error("timed out waiting for {selector}")]
    Timeout { selector: String },

    /// An element handle no longer points into a live document.
    #[error("stale element: {context}")]
    StaleElement { context: String },

    /// A browsing context handle does not refer to an open context.
    #[error("browsing context not found")]
    ContextNotFound,

    /// HTTP request failed (network, DNS, TLS, timeout, etc.).
    #[error("http request failed for {url}: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    /// Server returned a status other than 200/201.
    #[error("unexpected status {status} for {url}: {body}")]
    UnexpectedStatus {
        url: String,
        status: reqwest::StatusCode,
        body: String,
    },

    /// A saved page for an offline run could not be read.
    #[error("failed to read page file {path}: {source}")]
    PageFile {
        path: String,
        source: std::io::Error,
    },

    /// Reading the interactive API prompt failed.
    #[error("failed to read prompt: {0}")]
    Prompt(#[from] std::io::Error),
}

impl<'a> From<SelectorErrorKind<'a>> for TipsError {
    fn from(err: SelectorErrorKind<'a>) -> Self {
        TipsError::Selector(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, TipsError>;
