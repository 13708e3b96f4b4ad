use std::time::Duration;

use reqwest::StatusCode;
use tracing::{debug, instrument};

use crate::error::{Result, TipsError};
use crate::model::MatchCandidate;

const TIPS_PATH: &str = "/api/tips";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the downstream tips API.
///
/// # Examples
///
/// ```no_run
/// # async fn example(tip: &tips_scraper::MatchCandidate) -> tips_scraper::Result<()> {
/// use tips_scraper::TipsApi;
///
/// let api = TipsApi::new("http://localhost:3000");
/// api.submit(tip).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TipsApi {
    http: reqwest::Client,
    base_url: String,
}

impl TipsApi {
    /// Create a new client with default settings.
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a new client using the provided [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            http: client,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}{TIPS_PATH}", self.base_url)
    }

    /// Post one tip. Only `200 OK` and `201 Created` count as accepted.
    #[instrument(skip(self, tip), fields(id = tip.id()))]
    pub async fn submit(&self, tip: &MatchCandidate) -> Result<()> {
        let url = self.endpoint();
        let response = self
            .http
            .post(&url)
            .json(tip)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| TipsError::Http {
                url: url.clone(),
                source: e,
            })?;

        let status = response.status();
        if !matches!(status, StatusCode::OK | StatusCode::CREATED) {
            let body = response.text().await.unwrap_or_default();
            return Err(TipsError::UnexpectedStatus { url, status, body });
        }

        debug!(%status, "tip accepted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::model::{Category, Odds};

    fn tip() -> MatchCandidate {
        let mut tip = MatchCandidate::new(
            Category::Football,
            "Libertadores",
            "Flamengo vs Palmeiras",
            "2026-10-16 21:30",
            75,
            Some("https://tips.test/match/1"),
        );
        tip.odds = vec![Odds {
            bookmaker: "Bet365".to_string(),
            value: 1.95,
        }];
        tip
    }

    async fn server_replying(status: u16) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/tips"))
            .respond_with(ResponseTemplate::new(status).set_body_string("boom"))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn test_submit_accepts_ok_and_created() {
        for status in [200, 201] {
            let server = server_replying(status).await;
            let api = TipsApi::new(&server.uri());
            assert!(api.submit(&tip()).await.is_ok(), "status {status}");
        }
    }

    #[tokio::test]
    async fn test_submit_rejects_other_statuses() {
        for status in [202, 500] {
            let server = server_replying(status).await;
            let api = TipsApi::new(&server.uri());
            match api.submit(&tip()).await {
                Err(TipsError::UnexpectedStatus { status: s, body, .. }) => {
                    assert_eq!(s.as_u16(), status);
                    assert_eq!(body, "boom");
                }
                other => panic!("expected UnexpectedStatus, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_submit_unreachable_host() {
        let api = TipsApi::new("http://127.0.0.1:1");
        assert!(matches!(
            api.submit(&tip()).await,
            Err(TipsError::Http { .. })
        ));
    }

    #[tokio::test]
    async fn test_payload_shape() {
        let server = server_replying(201).await;
        let api = TipsApi::new(&format!("{}/", server.uri()));
        let tip = tip();
        api.submit(&tip).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(
            body,
            json!({
                "id": tip.id(),
                "category": "football",
                "league": "Libertadores",
                "teams": "Flamengo vs Palmeiras",
                "matchTime": "2026-10-16 21:30",
                "prediction": "Predição não disponível",
                "description": "",
                "odds": [{ "house": "Bet365", "value": 1.95 }],
                "confidence": 75,
            })
        );
    }
}
