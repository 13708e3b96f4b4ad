use itertools::Itertools;
use reqwest::Url;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::browser::{Browser, PageElement, Query};
use crate::config::Timings;
use crate::error::Result;
use crate::model::MatchCandidate;
use crate::scraper::candidate::build_candidate;
use crate::scraper::detail::enrich;
use crate::scraper::resolve::first_match;
use crate::scraper::selectors;

/// Where the listing entries live on the page.
enum Container<E> {
    /// The livescores table body; entries are its rows.
    Table(E),
    /// No table body was found; entries are loose match-like elements.
    Loose(Vec<E>),
}

#[derive(Debug, Clone, Copy)]
enum EntryKind {
    Row,
    Loose,
}

/// Text and detail link of one listing entry.
struct Entry {
    text: String,
    link: Option<String>,
}

/// Load the listing page and collect up to `quota` upcoming match candidates.
///
/// Candidates with a detail link are enriched one at a time, before the next
/// entry is read. Entries that cannot be read are logged and skipped; only a
/// listing page that fails to load is an error.
#[instrument(skip(browser, timings))]
pub async fn scan_listing<B: Browser>(
    browser: &mut B,
    url: &str,
    quota: usize,
    timings: &Timings,
) -> Result<Vec<MatchCandidate>> {
    browser.navigate(url).await?;
    browser
        .wait_for(selectors::PAGE_ROOT, timings.listing_load_timeout)
        .await?;
    sleep(timings.listing_settle).await;

    let base = Url::parse(url).ok();
    let candidates = match locate_container(browser).await {
        Container::Table(table) => {
            let rows = table.query(selectors::LISTING_ROW).await?;
            info!(rows = rows.len(), "scanning listing table");
            scan_entries(browser, rows, EntryKind::Row, base.as_ref(), quota, timings).await
        }
        Container::Loose(elements) => {
            info!(elements = elements.len(), "scanning loose match elements");
            let kind = EntryKind::Loose;
            scan_entries(browser, elements, kind, base.as_ref(), quota, timings).await
        }
    };

    info!(count = candidates.len(), "listing scan finished");
    Ok(candidates)
}

async fn locate_container<B: Browser>(browser: &B) -> Container<B::Element> {
    if let Some(matched) = first_match(browser, selectors::LISTING_TABLE).await {
        if let Some(table) = matched.elements.into_iter().next() {
            debug!(selector = matched.selector, "found listing table");
            return Container::Table(table);
        }
    }

    warn!("listing table not found, trying loose match elements");
    let mut elements = vec![];
    for &selector in selectors::LISTING_LOOSE {
        match browser.query(selector).await {
            Ok(found) => {
                if !found.is_empty() {
                    debug!(selector, count = found.len(), "found loose elements");
                }
                elements.extend(found);
            }
            Err(e) => debug!(selector, error = %e, "loose selector failed"),
        }
    }
    Container::Loose(elements.into_iter().unique_by(|e| e.key()).collect())
}

async fn scan_entries<B: Browser>(
    browser: &mut B,
    entries: Vec<B::Element>,
    kind: EntryKind,
    base: Option<&Url>,
    quota: usize,
    timings: &Timings,
) -> Vec<MatchCandidate> {
    let mut candidates = Vec::with_capacity(quota);
    for (index, element) in entries.iter().enumerate() {
        if candidates.len() >= quota {
            debug!(quota, "candidate quota reached");
            break;
        }
        let position = index + 1;

        let entry = match kind {
            EntryKind::Row => read_row(element, base).await,
            EntryKind::Loose => read_loose(element, base).await,
        };
        let entry = match entry {
            Ok(Some(entry)) => entry,
            Ok(None) => continue,
            Err(e) => {
                warn!(position, error = %e, "skipping unreadable listing entry");
                continue;
            }
        };

        let Some(candidate) = build_candidate(&entry.text, position, entry.link.as_deref())
        else {
            continue;
        };
        let candidate = match candidate.detail_url.clone() {
            Some(link) => match enrich(browser, &link, timings).await {
                Some(details) => candidate.merge(details),
                None => candidate,
            },
            None => {
                debug!(position, "no detail link, keeping listing fields");
                candidate
            }
        };

        info!(
            position,
            id = candidate.id(),
            teams = %candidate.teams,
            accepted = candidates.len() + 1,
            quota,
            "accepted candidate"
        );
        candidates.push(candidate);
    }
    candidates
}

async fn read_row<E: PageElement>(row: &E, base: Option<&Url>) -> Result<Option<Entry>> {
    let cells = row.query(selectors::LISTING_CELL).await?;
    if cells.len() < 2 {
        debug!(cells = cells.len(), "row has too few cells");
        return Ok(None);
    }
    let text = row.text().await?.trim().to_string();

    let mut link = None;
    for anchor in row.query(selectors::LISTING_CELL_LINK).await? {
        if let Some(href) = anchor.attr("href").await? {
            if is_detail_link(&href) {
                link = Some(absolutize(base, &href));
                break;
            }
        }
    }
    Ok(Some(Entry { text, link }))
}

async fn read_loose<E: PageElement>(element: &E, base: Option<&Url>) -> Result<Option<Entry>> {
    let href = element
        .attr("href")
        .await?
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty());
    let text = element.text().await?.trim().to_string();
    if href.is_none() && text.is_empty() {
        return Ok(None);
    }
    Ok(Some(Entry {
        text,
        link: href.map(|h| absolutize(base, &h)),
    }))
}

fn is_detail_link(href: &str) -> bool {
    let href = href.to_lowercase();
    selectors::DETAIL_LINK_KEYWORDS
        .iter()
        .any(|k| href.contains(k))
}

/// Resolve a possibly relative `href` against the listing URL.
fn absolutize(base: Option<&Url>, href: &str) -> String {
    base.and_then(|b| b.join(href).ok())
        .map(String::from)
        .unwrap_or_else(|| href.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::snapshot::SnapshotBrowser;
    use crate::model::PREDICTION_UNAVAILABLE;

    const LISTING: &str = "https://tips.test/";

    fn row(time: &str, teams: &str, status: &str, link: &str) -> String {
        format!(
            r#"<tr><td>{time}</td><td><a href="{link}">{teams}</a></td><td>{status}</td></tr>"#
        )
    }

    fn listing_page(rows: &[String]) -> String {
        format!(
            r#"<html><body><div class="livescores"><table><tbody>
                <tr><th>Hora</th><th>Jogo</th></tr>
                {}
            </tbody></table></div></body></html>"#,
            rows.join("\n")
        )
    }

    fn detail_page(prediction: &str) -> String {
        format!(
            r#"<html><body><div class="preview_bet"><p>{prediction}</p><p class="preview_odd">1.80</p></div></body></html>"#
        )
    }

    #[tokio::test]
    async fn test_scan_skips_finished_rows_and_honors_quota() {
        let rows = [
            row("18:00", "Flamengo vs Palmeiras", "", "/match/1"),
            row("18:30", "Santos vs Sport", "Terminado", "/match/2"),
            row("19:00", "Grêmio vs Internacional", "", "/match/3"),
            row("19:30", "Bahia vs Vitória", "", "/match/4"),
            row("20:00", "Vasco vs Botafogo", "FT", "/match/5"),
            row("20:30", "Cruzeiro vs Atlético", "", "/match/6"),
            row("21:00", "Fortaleza vs Ceará", "", "/match/7"),
        ];
        let mut browser = SnapshotBrowser::new().with_page(LISTING, &listing_page(&rows));
        for id in [1, 3, 4, 6, 7] {
            browser = browser.with_page(
                &format!("https://tips.test/match/{id}"),
                &detail_page(&format!("Tip do jogo {id}")),
            );
        }

        let candidates = scan_listing(&mut browser, LISTING, 5, &Timings::immediate())
            .await
            .unwrap();

        let teams = candidates.iter().map(|c| c.teams.as_str()).collect_vec();
        assert_eq!(
            teams,
            vec![
                "Flamengo vs Palmeiras",
                "Grêmio vs Internacional",
                "Bahia vs Vitória",
                "Cruzeiro vs Atlético",
                "Fortaleza vs Ceará",
            ]
        );
        assert_eq!(candidates[0].prediction, "Tip do jogo 1");
        assert_eq!(candidates[4].odds[0].value, 1.80);
        assert_eq!(
            candidates[2].detail_url.as_deref(),
            Some("https://tips.test/match/4")
        );
        assert_eq!(browser.open_contexts(), 1);
        assert_eq!(
            browser.history(),
            [
                "https://tips.test/",
                "https://tips.test/match/1",
                "https://tips.test/match/3",
                "https://tips.test/match/4",
                "https://tips.test/match/6",
                "https://tips.test/match/7",
            ]
        );
    }

    #[tokio::test]
    async fn test_scan_stops_at_quota() {
        let clubs = [
            "Ajax", "Benfica", "Celtic", "Dortmund", "Everton", "Fiorentina", "Getafe", "Hertha",
        ];
        let rows = clubs
            .iter()
            .zip(1..)
            .map(|(club, id)| {
                row("18:00", &format!("{club} vs Rival"), "", &format!("/match/{id}"))
            })
            .collect_vec();
        let mut browser = SnapshotBrowser::new().with_page(LISTING, &listing_page(&rows));

        let candidates = scan_listing(&mut browser, LISTING, 5, &Timings::immediate())
            .await
            .unwrap();
        assert_eq!(candidates.len(), 5);
        assert_eq!(candidates[4].teams, "Everton vs Rival");
        // detail pages are missing: enrichment fails, placeholders remain
        assert!(candidates
            .iter()
            .all(|c| c.prediction == PREDICTION_UNAVAILABLE && c.odds.is_empty()));
        assert!(!browser
            .history()
            .iter()
            .any(|u| u == "https://tips.test/match/6"));
    }

    #[tokio::test]
    async fn test_failed_enrichment_keeps_candidate_and_context() {
        let rows = [
            row("18:00", "Flamengo vs Palmeiras", "", "/match/1"),
            row("19:00", "Grêmio vs Internacional", "", "/match/2"),
        ];
        let mut browser = SnapshotBrowser::new()
            .with_page(LISTING, &listing_page(&rows))
            .with_broken_page("https://tips.test/match/1", &detail_page("Quebrado"))
            .with_page("https://tips.test/match/2", &detail_page("Vitória do Grêmio"));
        browser.navigate(LISTING).await.unwrap();
        let primary = browser.current_context().await.unwrap();

        let candidates = scan_listing(&mut browser, LISTING, 5, &Timings::immediate())
            .await
            .unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].prediction, PREDICTION_UNAVAILABLE);
        assert!(candidates[0].odds.is_empty());
        assert_eq!(candidates[1].prediction, "Vitória do Grêmio");
        assert_eq!(browser.current_context().await.unwrap(), primary);
        assert_eq!(browser.open_contexts(), 1);
    }

    #[tokio::test]
    async fn test_row_without_detail_link() {
        let rows = [row("18:00", "Flamengo vs Palmeiras", "", "/noticias/1")];
        let mut browser = SnapshotBrowser::new().with_page(LISTING, &listing_page(&rows));

        let candidates = scan_listing(&mut browser, LISTING, 5, &Timings::immediate())
            .await
            .unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].detail_url, None);
        assert_eq!(browser.history(), ["https://tips.test/"]);
    }

    #[tokio::test]
    async fn test_loose_elements_are_deduplicated() {
        let page = r#"<html><body>
            <div class="match-card">Bahia vs Vitória 16:00</div>
            <a class="match-link" href="/match/9">Flamengo vs Palmeiras 20:00</a>
            <div class="event-box">Santos vs Sport Encerrado</div>
            <div class="game-row"></div>
        </body></html>"#;
        let mut browser = SnapshotBrowser::new().with_page(LISTING, page);

        let candidates = scan_listing(&mut browser, LISTING, 5, &Timings::immediate())
            .await
            .unwrap();
        let teams = candidates.iter().map(|c| c.teams.as_str()).collect_vec();
        assert_eq!(teams, vec!["Bahia vs Vitória", "Flamengo vs Palmeiras"]);
        assert_eq!(
            candidates[1].detail_url.as_deref(),
            Some("https://tips.test/match/9")
        );
    }

    #[tokio::test]
    async fn test_unreadable_entries_are_skipped() {
        let page = r#"<html><body><div class="match-card">Bahia vs Vitória</div></body></html>"#;
        let mut browser = SnapshotBrowser::new().with_broken_page(LISTING, page);

        let candidates = scan_listing(&mut browser, LISTING, 5, &Timings::immediate())
            .await
            .unwrap();
        assert!(candidates.is_empty());
    }

    #[tokio::test]
    async fn test_listing_load_failure_is_an_error() {
        let mut browser = SnapshotBrowser::new();
        let result = scan_listing(&mut browser, LISTING, 5, &Timings::immediate()).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_detail_links() {
        assert!(is_detail_link("https://tips.test/Match/123"));
        assert!(is_detail_link("/fixture/99"));
        assert!(!is_detail_link("/noticias/1"));

        let base = Url::parse("https://tips.test/hoje/").unwrap();
        assert_eq!(
            absolutize(Some(&base), "/match/1"),
            "https://tips.test/match/1"
        );
        assert_eq!(absolutize(None, "/match/1"), "/match/1");
    }
}
