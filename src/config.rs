use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::browser::webdriver::DriverConfig;
use crate::error::Result;

pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_LISTING_URL: &str = "https://www.academiadasapostasbrasil.com/";
pub const DEFAULT_MAX_CANDIDATES: usize = 5;

/// Waits and delays applied around page loads and submissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timings {
    pub listing_load_timeout: Duration,
    /// Pause after the listing loads, for script-rendered rows.
    pub listing_settle: Duration,
    pub detail_load_timeout: Duration,
    pub detail_settle: Duration,
    /// Pause between two submissions.
    pub submit_pacing: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            listing_load_timeout: Duration::from_secs(20),
            listing_settle: Duration::from_secs(5),
            detail_load_timeout: Duration::from_secs(15),
            detail_settle: Duration::from_secs(3),
            submit_pacing: Duration::from_secs(1),
        }
    }
}

impl Timings {
    /// No settle delays or pacing; for pages that are already complete.
    pub fn immediate() -> Self {
        Self {
            listing_settle: Duration::ZERO,
            detail_settle: Duration::ZERO,
            submit_pacing: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Runtime settings, read from the environment (and an optional `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the tips API; `None` when `API_URL` is unset.
    pub api_url: Option<String>,
    pub listing_url: String,
    /// Saved listing page to scan instead of starting Chrome.
    pub offline_listing: Option<PathBuf>,
    pub driver: DriverConfig,
    pub max_candidates: usize,
    pub timings: Timings,
}

impl Config {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let defaults = Timings::default();
        let timings = Timings {
            listing_settle: env_parse("SETTLE_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.listing_settle),
            detail_settle: env_parse("DETAIL_SETTLE_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.detail_settle),
            submit_pacing: env_parse("SUBMIT_PACING_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.submit_pacing),
            ..defaults
        };

        let driver = DriverConfig {
            webdriver_url: env_string("WEBDRIVER_URL")
                .unwrap_or_else(|| DriverConfig::default().webdriver_url),
            chrome_binary: env_string("CHROME_BIN"),
            ..DriverConfig::default()
        };

        let config = Self {
            api_url: env_string("API_URL"),
            listing_url: env_string("LISTING_URL")
                .unwrap_or_else(|| DEFAULT_LISTING_URL.to_string()),
            offline_listing: env_string("LISTING_HTML").map(PathBuf::from),
            driver,
            max_candidates: env_parse("MAX_CANDIDATES")
                .map(|n: u64| n as usize)
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_MAX_CANDIDATES),
            timings,
        };
        debug!(?config, "loaded configuration");
        config
    }

    /// The configured API URL, or one typed at the prompt, or [`DEFAULT_API_URL`].
    pub fn resolve_api_url(&self) -> Result<String> {
        if let Some(url) = &self.api_url {
            return Ok(url.clone());
        }
        let stdin = io::stdin();
        prompt_api_url(&mut stdin.lock(), &mut io::stdout())
    }
}

/// Ask for the API URL. An empty answer or a closed input falls back to the default.
pub fn prompt_api_url(input: &mut impl BufRead, output: &mut impl Write) -> Result<String> {
    write!(output, "Digite a URL da sua API (padrão: {DEFAULT_API_URL}): ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let answer = answer.trim();
    Ok(if answer.is_empty() {
        DEFAULT_API_URL.to_string()
    } else {
        answer.to_string()
    })
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse(key: &str) -> Option<u64> {
    env_string(key).and_then(|v| v.parse::<u64>().ok())
}
