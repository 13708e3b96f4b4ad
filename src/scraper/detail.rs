use tokio::time::sleep;
use tracing::{debug, instrument, warn};

use crate::browser::{Browser, Query, SecondaryContext};
use crate::config::Timings;
use crate::error::Result;
use crate::model::{DetailFields, Odds};
use crate::scraper::resolve::{extract_text, first_match, Pick};
use crate::scraper::selectors;
use crate::text;

const BOOKMAKER: &str = "Bet365";
const SUGGESTION_HEADING: &str = "**Sugestão de aposta:**";
const PREVIEW_HEADING: &str = "**Previsão:**";
const MIN_TEXT_LEN: usize = 4;

/// Visit a match detail page in a secondary context and scrape its tip fields.
///
/// The secondary context is always closed and the previous context refocused
/// before returning. Any failure is logged and yields `None`.
#[instrument(skip(browser, timings))]
pub async fn enrich<B: Browser>(
    browser: &mut B,
    url: &str,
    timings: &Timings,
) -> Option<DetailFields> {
    let mut tab = match SecondaryContext::open(browser).await {
        Ok(tab) => tab,
        Err(e) => {
            warn!(error = %e, "could not open a context for the detail page");
            return None;
        }
    };

    let scraped = scrape_detail(tab.browser(), url, timings).await;

    if let Err(e) = tab.release().await {
        warn!(error = %e, "failed to restore the listing context");
    }

    match scraped {
        Ok(fields) => {
            debug!(
                odds = fields.odds.len(),
                prediction = fields.prediction.is_some(),
                description = fields.description.is_some(),
                league = ?fields.league,
                "scraped detail page"
            );
            Some(fields)
        }
        Err(e) => {
            warn!(error = %e, "failed to scrape detail page");
            None
        }
    }
}

async fn scrape_detail<B: Browser>(
    browser: &mut B,
    url: &str,
    timings: &Timings,
) -> Result<DetailFields> {
    browser.navigate(url).await?;
    browser
        .wait_for(selectors::PAGE_ROOT, timings.detail_load_timeout)
        .await?;
    sleep(timings.detail_settle).await;

    let page = &*browser;
    Ok(DetailFields {
        odds: parse_odds(page).await?,
        prediction: parse_prediction(page).await?,
        description: parse_description(page).await?,
        league: parse_league(page).await?,
    })
}

/// At most one price: the first selector whose first element holds a number.
pub(crate) async fn parse_odds<Q: Query>(page: &Q) -> Result<Vec<Odds>> {
    let value =
        extract_text(page, selectors::DETAIL_ODDS, Pick::Nth(0), text::parse_decimal).await?;
    Ok(value
        .map(|value| Odds {
            bookmaker: BOOKMAKER.to_string(),
            value,
        })
        .into_iter()
        .collect())
}

pub(crate) async fn parse_prediction<Q: Query>(page: &Q) -> Result<Option<String>> {
    let suggestion = extract_text(page, selectors::DETAIL_PREDICTION, Pick::Nth(0), |t| {
        let is_odd = t.to_lowercase().starts_with("odd");
        (is_long_enough(t) && !is_odd && !text::is_bare_number(t)).then(|| t.to_string())
    })
    .await?;
    if suggestion.is_some() {
        return Ok(suggestion);
    }

    debug!("falling back to generic prediction selectors");
    extract_text(page, selectors::DETAIL_PREDICTION_FALLBACK, Pick::From(0), |t| {
        (is_long_enough(t) && !text::is_bare_number(t)).then(|| t.to_string())
    })
    .await
}

/// The suggestion intro and the preview body, each under its own heading.
pub(crate) async fn parse_description<Q: Query>(page: &Q) -> Result<Option<String>> {
    let long_text = |t: &str| is_long_enough(t).then(|| t.to_string());
    let intro =
        extract_text(page, selectors::DETAIL_SUGGESTION_INTRO, Pick::Nth(0), long_text).await?;
    let body =
        extract_text(page, selectors::DETAIL_PREVIEW_BODY, Pick::Nth(0), long_text).await?;

    let sections = [(SUGGESTION_HEADING, intro), (PREVIEW_HEADING, body)]
        .into_iter()
        .filter_map(|(heading, text)| text.map(|t| format!("{heading}\n{t}")))
        .collect::<Vec<_>>();
    Ok((!sections.is_empty()).then(|| sections.join("\n\n")))
}

/// League name from the dated match header, or from generic league markup.
pub(crate) async fn parse_league<Q: Query>(page: &Q) -> Result<Option<String>> {
    let long_text = |t: &str| is_long_enough(t).then(|| t.to_string());

    if let Some(header) = first_match(page, &[selectors::DETAIL_LEAGUE_HEADER]).await {
        if header.elements.len() >= 2 {
            let league = extract_text(page, &[header.selector], Pick::From(1), long_text).await?;
            if league.is_some() {
                return Ok(league);
            }
        } else {
            debug!("match header has a single item, no league in it");
        }
    }

    for &selector in selectors::DETAIL_LEAGUE_FALLBACK {
        if let Some(matched) = first_match(page, &[selector]).await {
            if matched.elements.len() >= 2 {
                let league = extract_text(page, &[selector], Pick::Nth(1), long_text).await?;
                if league.is_some() {
                    return Ok(league);
                }
            }
        }
    }
    Ok(None)
}

fn is_long_enough(text: &str) -> bool {
    text.chars().count() >= MIN_TEXT_LEN
}
