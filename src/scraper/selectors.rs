//! Selector fallback chains for the tips site.
//!
//! Every chain is ordered most specific first; the generic substring-class
//! selectors at the end only exist to survive layout changes.

/// Body of the livescores table on the listing page.
pub const LISTING_TABLE: &[&str] = &[
    ".widget-double-container-left.mb-content .widget-double.livescores.large .tabs_framed.small_tabs .fh_main_tab tbody",
    ".livescores tbody",
    ".widget-double tbody",
    ".mb-content tbody",
    "tbody",
];

pub const LISTING_ROW: &str = "tr";
pub const LISTING_CELL: &str = "td";
pub const LISTING_CELL_LINK: &str = "td a";

/// Loose match elements, unioned when no table body exists.
pub const LISTING_LOOSE: &[&str] = &[
    "[class*='match']",
    "[class*='game']",
    "[class*='fixture']",
    "[class*='event']",
    "a[href*='match']",
    "a[href*='game']",
    "a[href*='fixture']",
    ".match-row",
    ".game-row",
    ".fixture-row",
];

/// Substrings of an `href` that mark a match detail link.
pub const DETAIL_LINK_KEYWORDS: &[&str] = &["match", "game", "fixture"];

pub const PAGE_ROOT: &str = "body";

pub const DETAIL_ODDS: &[&str] = &[
    "bet-suggestion > preview_bet_odd > div.preview_bet > p.preview_odd",
    ".bet-suggestion .preview_bet_odd .preview_bet p.preview_odd",
    ".preview_bet p.preview_odd",
    "p.preview_odd",
    "[class*='odd']",
    "[class*='bet']",
    "[class*='quote']",
    "[class*='price']",
    ".odds",
    ".bet-odds",
];

/// The short bet suggestion: first paragraph of the suggestion block that is not the odd.
pub const DETAIL_PREDICTION: &[&str] = &[
    "#_preview div.preview_main_container article div.preview_container div.preview_resume div.bet-suggestion div.preview_bet_odd div.preview_bet p:not(.preview_odd)",
    "#_preview div.preview_main_container article div.bet-suggestion div.preview_bet_odd div.preview_bet p:not(.preview_odd)",
    "div.bet-suggestion div.preview_bet_odd div.preview_bet p:not(.preview_odd)",
    "div.preview_bet_odd div.preview_bet p:not(.preview_odd)",
    "div.preview_bet p:not(.preview_odd)",
    "div.preview_bet p:first-child",
    "div.preview_bet p",
];

/// Older and generic prediction markup, tried when [`DETAIL_PREDICTION`] finds nothing.
pub const DETAIL_PREDICTION_FALLBACK: &[&str] = &[
    "bet-suggestion > preview_bet_odd > div.preview_bet > p",
    ".bet-suggestion .preview_bet_odd .preview_bet > p",
    ".preview_bet > p",
    "div.preview_bet p",
    "[class*='prediction']",
    "[class*='tip']",
    "[class*='recommendation']",
    "[class*='forecast']",
    ".prediction",
    ".tip",
    ".recommendation",
];

pub const DETAIL_SUGGESTION_INTRO: &[&str] = &[
    "#_preview div.preview_main_container article div.preview_resume div.preview_intro.toggle_content",
    "div.preview_resume div.preview_intro.toggle_content",
    "div.preview_intro.toggle_content",
    ".preview_intro.toggle_content",
];

pub const DETAIL_PREVIEW_BODY: &[&str] = &[
    "#_preview div.preview_main_container article div.preview_pre_intro div.preview_body",
    "div.preview_pre_intro div.preview_body",
    "div.preview_body",
];

/// Items of the dated match header; the first one is the date, not the league.
pub const DETAIL_LEAGUE_HEADER: &str = "td.stats-game-head-date ul li.gamehead";

pub const DETAIL_LEAGUE_FALLBACK: &[&str] = &[
    ".stats-game-head-date ul li.gamehead",
    "ul li.gamehead",
    "[class*='league']",
    "[class*='competition']",
    "[class*='tournament']",
    "[class*='championship']",
    ".league",
    ".competition",
];
