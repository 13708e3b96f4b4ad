use crate::model::Odds;

/// Fields scraped from a match detail page, merged into a [`MatchCandidate`](crate::model::MatchCandidate).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailFields {
    pub odds: Vec<Odds>,
    pub prediction: Option<String>,
    pub description: Option<String>,
    pub league: Option<String>,
}
