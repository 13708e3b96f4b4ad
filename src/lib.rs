//! Scrapes upcoming match tips from a betting-tips site and forwards them to a tips API.

pub use client::TipsApi;
pub use config::{Config, Timings};
pub use error::{Result, TipsError};
pub use model::*;
pub use pipeline::{submit_all, RunOutcome, SubmissionReport, TipsScraper};

pub mod browser;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod scraper;
pub mod text;
