//! Run orchestration: scan the listing, then submit every candidate.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

use crate::browser::Browser;
use crate::client::TipsApi;
use crate::config::{Config, Timings};
use crate::error::Result;
use crate::model::MatchCandidate;
use crate::scraper::scan_listing;

/// Tally of one submission pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubmissionReport {
    pub succeeded: usize,
    pub failed: usize,
}

impl SubmissionReport {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The listing produced nothing to submit, or could not be loaded.
    NoCandidates,
    Submitted(SubmissionReport),
}

/// Submit candidates one by one, waiting `pacing` between two submissions.
///
/// A rejected tip is counted and logged; the remaining tips are still sent.
pub async fn submit_all(
    api: &TipsApi,
    candidates: &[MatchCandidate],
    pacing: Duration,
) -> SubmissionReport {
    let mut report = SubmissionReport::default();
    for (index, tip) in candidates.iter().enumerate() {
        if index > 0 && !pacing.is_zero() {
            sleep(pacing).await;
        }

        info!(
            id = tip.id(),
            teams = %tip.teams,
            league = %tip.league,
            category = %tip.category,
            match_time = %tip.match_time,
            prediction = %tip.prediction,
            odds = tip.odds.first().map(|o| o.value),
            confidence = tip.confidence,
            "submitting tip"
        );
        match api.submit(tip).await {
            Ok(()) => {
                report.succeeded += 1;
                info!(id = tip.id(), "tip submitted");
            }
            Err(e) => {
                report.failed += 1;
                warn!(id = tip.id(), error = %e, "tip rejected");
            }
        }
    }
    report
}

/// One scrape-and-submit run over a browser session.
pub struct TipsScraper<B> {
    browser: B,
    api: TipsApi,
    listing_url: String,
    max_candidates: usize,
    timings: Timings,
}

impl<B: Browser> TipsScraper<B> {
    pub fn new(browser: B, api: TipsApi, config: &Config) -> Self {
        Self {
            browser,
            api,
            listing_url: config.listing_url.clone(),
            max_candidates: config.max_candidates,
            timings: config.timings.clone(),
        }
    }

    /// Scan the listing and submit what it yields.
    ///
    /// A listing that fails to load is logged and treated as empty.
    #[instrument(skip(self), fields(listing = %self.listing_url))]
    pub async fn run(&mut self) -> RunOutcome {
        let candidates = match scan_listing(
            &mut self.browser,
            &self.listing_url,
            self.max_candidates,
            &self.timings,
        )
        .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                error!(error = %e, "failed to scan the listing page");
                vec![]
            }
        };

        if candidates.is_empty() {
            return RunOutcome::NoCandidates;
        }
        info!(count = candidates.len(), "submitting candidates");
        let report = submit_all(&self.api, &candidates, self.timings.submit_pacing).await;
        RunOutcome::Submitted(report)
    }

    /// End the browser session.
    pub async fn shutdown(self) -> Result<()> {
        self.browser.quit().await
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::browser::snapshot::SnapshotBrowser;
    use crate::model::Category;

    const LISTING: &str = "https://tips.test/";

    fn config(max_candidates: usize) -> Config {
        Config {
            api_url: None,
            listing_url: LISTING.to_string(),
            offline_listing: None,
            driver: Default::default(),
            max_candidates,
            timings: Timings::immediate(),
        }
    }

    fn tip(teams: &str) -> MatchCandidate {
        MatchCandidate::new(
            Category::Football,
            "Brasileirão",
            teams,
            "2026-10-16 20:00",
            80,
            None,
        )
    }

    #[tokio::test]
    async fn test_submit_all_counts_failures_and_continues() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/tips"))
            .and(body_partial_json(serde_json::json!({ "teams": "Bahia vs Vitória" })))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/tips"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let api = TipsApi::new(&server.uri());
        let tips = [
            tip("Flamengo vs Palmeiras"),
            tip("Bahia vs Vitória"),
            tip("Grêmio vs Internacional"),
        ];
        let report = submit_all(&api, &tips, Duration::ZERO).await;
        assert_eq!(report, SubmissionReport { succeeded: 2, failed: 1 });
        assert_eq!(report.total(), 3);
        assert_eq!(server.received_requests().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_run_submits_scanned_candidates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/tips"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let browser = SnapshotBrowser::new().with_page(
            LISTING,
            r#"<html><body><table><tbody>
                <tr><td>18:00</td><td>Flamengo vs Palmeiras</td></tr>
                <tr><td>FT</td><td>Santos vs Sport</td></tr>
                <tr><td>21:00</td><td>Fortaleza vs Ceará</td></tr>
            </tbody></table></body></html>"#,
        );
        let mut scraper = TipsScraper::new(browser, TipsApi::new(&server.uri()), &config(5));

        let outcome = scraper.run().await;
        assert_eq!(
            outcome,
            RunOutcome::Submitted(SubmissionReport { succeeded: 2, failed: 0 })
        );
        scraper.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_run_without_candidates() {
        let server = MockServer::start().await;
        let api = TipsApi::new(&server.uri());

        let empty = SnapshotBrowser::new()
            .with_page(LISTING, "<html><body><p>Sem jogos hoje</p></body></html>");
        let mut scraper = TipsScraper::new(empty, api.clone(), &config(5));
        assert_eq!(scraper.run().await, RunOutcome::NoCandidates);

        // listing page cannot be loaded
        let mut scraper = TipsScraper::new(SnapshotBrowser::new(), api, &config(5));
        assert_eq!(scraper.run().await, RunOutcome::NoCandidates);

        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
