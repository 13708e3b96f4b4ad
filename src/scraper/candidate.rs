use std::ops::RangeInclusive;

use chrono::Local;
use rand::Rng;
use tracing::debug;

use crate::model::MatchCandidate;
use crate::text;

/// Range of the random display confidence attached to every tip.
pub const CONFIDENCE_RANGE: RangeInclusive<u8> = 60..=90;

/// Turn one listing entry into a candidate, or `None` if the match is already over.
///
/// `position` is the 1-based position of the entry in the listing and is only
/// used for logging. The detail page is not visited here.
pub fn build_candidate(
    text: &str,
    position: usize,
    detail_url: Option<&str>,
) -> Option<MatchCandidate> {
    let text = text.trim();
    if text::is_finished(text) {
        debug!(position, "skipping finished match");
        return None;
    }

    let category = text::classify_category(text);
    let teams = text::extract_teams(text);
    let league = text::extract_league(text);
    let match_time = format!(
        "{} {}",
        Local::now().format("%Y-%m-%d"),
        text::extract_time(text)
    );
    let confidence = rand::thread_rng().gen_range(CONFIDENCE_RANGE);

    let candidate = MatchCandidate::new(
        category,
        &league,
        &teams,
        &match_time,
        confidence,
        detail_url,
    );
    debug!(
        position,
        id = candidate.id(),
        teams = %candidate.teams,
        category = %candidate.category,
        "built candidate"
    );
    Some(candidate)
}
