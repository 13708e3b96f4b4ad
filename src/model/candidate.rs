use chrono::Utc;
use serde::Serialize;
use strum_macros::{Display, EnumString};
use uuid::Uuid;

use crate::model::DetailFields;

/// Placeholder for `teams` when fewer than two team names could be recovered.
pub const TEAMS_UNIDENTIFIED: &str = "Times não identificados";
/// Placeholder for `league` when no known competition was found.
pub const LEAGUE_UNIDENTIFIED: &str = "Liga não identificada";
/// Placeholder for `prediction` until a detail page provides one.
pub const PREDICTION_UNAVAILABLE: &str = "Predição não disponível";

/// Sport a tip belongs to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumString, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    #[default]
    Football,
    Basketball,
    Tennis,
}

/// A betting price quoted by a bookmaker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Odds {
    #[serde(rename = "house")]
    pub bookmaker: String,
    pub value: f64,
}

/// One extracted, not yet submitted match tip.
///
/// Serializes to the payload accepted by the tips API. `detail_url` is only
/// used while scraping and is never part of the payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCandidate {
    id: String,
    pub category: Category,
    pub league: String,
    pub teams: String,
    pub match_time: String,
    pub prediction: String,
    pub description: String,
    pub odds: Vec<Odds>,
    /// Random display value in `[60, 90]`. It carries no information about
    /// the quality of the prediction.
    pub confidence: u8,
    #[serde(skip)]
    pub detail_url: Option<String>,
}

impl MatchCandidate {
    /// Create a candidate with a fresh id and placeholder prediction, description and odds.
    pub fn new(
        category: Category,
        league: &str,
        teams: &str,
        match_time: &str,
        confidence: u8,
        detail_url: Option<&str>,
    ) -> Self {
        Self {
            id: new_id(),
            category,
            league: league.trim().to_string(),
            teams: teams.trim().to_string(),
            match_time: match_time.trim().to_string(),
            prediction: PREDICTION_UNAVAILABLE.to_string(),
            description: String::new(),
            odds: vec![],
            confidence,
            detail_url: detail_url
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Fold detail page fields into the candidate.
    ///
    /// Only values the detail page actually produced replace the
    /// placeholders; everything else is carried over unchanged.
    pub fn merge(self, details: DetailFields) -> Self {
        let keep = |value: Option<String>, current: String| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(current)
        };
        Self {
            odds: if details.odds.is_empty() {
                self.odds
            } else {
                details.odds
            },
            prediction: keep(details.prediction, self.prediction),
            description: keep(details.description, self.description),
            league: keep(details.league, self.league),
            ..self
        }
    }
}

fn new_id() -> String {
    let token = Uuid::new_v4().simple().to_string();
    format!("match_{}_{}", &token[..8], Utc::now().timestamp())
}
