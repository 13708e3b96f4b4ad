//! Heuristics that turn raw listing text into tip fields.
//!
//! Everything here is pure string processing; none of it touches the browser.

use std::sync::LazyLock;

use chrono::Local;
use regex::Regex;

use crate::model::{Category, LEAGUE_UNIDENTIFIED, TEAMS_UNIDENTIFIED};

const FOOTBALL_KEYWORDS: &[&str] = &[
    "futebol",
    "football",
    "soccer",
    "brasileirão",
    "champions",
    "liga",
    "serie a",
    "serie b",
];
const BASKETBALL_KEYWORDS: &[&str] = &["basquete", "basketball", "nba", "euroleague"];
const TENNIS_KEYWORDS: &[&str] = &["tênis", "tennis", "wimbledon", "roland garros", "us open"];

const FINISHED_KEYWORDS: &[&str] = &[
    "terminado",
    "finalizado",
    "encerrado",
    "finished",
    "ended",
    "adiado",
    "adiada",
    "postponed",
    "cancelado",
    "cancelada",
    "cancelled",
    "canceled",
    "completed",
];

const LEAGUE_KEYWORDS: &[&str] = &[
    "brasileirão",
    "serie a",
    "serie b",
    "champions",
    "europa league",
    "copa do brasil",
    "libertadores",
    "sul-americana",
    "nba",
    "euroleague",
];

const STOPWORDS: &[&str] = &[
    "previsão",
    "previsao",
    "terminado",
    "finalizado",
    "adiado",
    "adiada",
    "postponed",
    "cancelado",
    "cancelada",
    "cancelled",
    "canceled",
    "encerrado",
    "live",
    "vivo",
    "hoje",
    "amanhã",
    "amanha",
    "today",
    "tomorrow",
    "preview",
    "resultado",
    "placar",
    "transmissão",
    "transmissao",
];

static CLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{1,2}[:h]\d{2}(?::\d{2})?").unwrap());
static LIVE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(?:live|ao\s+vivo)\b").unwrap());
static AO_VIVO: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bao\s+vivo\b").unwrap());
static VERSUS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+(?:vs\.?|versus)\s+").unwrap());
static TRAILING_SCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\d+[-.\s:]*\d*[.\s]*$").unwrap());
static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());
static FULL_TIME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bft\b").unwrap());
static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());
static DECIMAL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").unwrap());

static TIME_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(\d{1,2}):(\d{2})").unwrap(),
        Regex::new(r"(\d{1,2})h(\d{2})").unwrap(),
        Regex::new(r"(\d{1,2}):(\d{2}):\d{2}").unwrap(),
    ]
});

/// Guess the sport from keywords; football wins ties and is the fallback.
pub fn classify_category(text: &str) -> Category {
    let text = text.to_lowercase();
    let has_any = |keywords: &[&str]| keywords.iter().any(|k| text.contains(k));
    if has_any(FOOTBALL_KEYWORDS) {
        Category::Football
    } else if has_any(BASKETBALL_KEYWORDS) {
        Category::Basketball
    } else if has_any(TENNIS_KEYWORDS) {
        Category::Tennis
    } else {
        Category::Football
    }
}

/// Whether a listing entry describes a match that is over, postponed or cancelled.
///
/// A live marker (`live` or `ao vivo` as whole words) always wins, even if a
/// finished keyword is also present.
pub fn is_finished(text: &str) -> bool {
    let text = text.to_lowercase();
    if LIVE.is_match(&text) {
        return false;
    }
    FINISHED_KEYWORDS.iter().any(|k| text.contains(k)) || FULL_TIME.is_match(&text)
}

/// Recover `"Home vs Away"` from a listing entry, or [`TEAMS_UNIDENTIFIED`].
pub fn extract_teams(text: &str) -> String {
    let text = CLOCK.replace_all(text, "");
    let text = AO_VIVO.replace_all(&text, " ");

    let sides = VERSUS.splitn(&text, 3).collect::<Vec<_>>();
    if sides.len() >= 2 {
        let home = clean_team_name(sides[0]);
        let away = clean_team_name(sides[1]);
        if !home.is_empty() && !away.is_empty() {
            return format!("{home} vs {away}");
        }
    }

    // scores such as "2-1" or "3x1" must not survive as team names
    let stripped = PUNCTUATION.replace_all(&text, " ");
    let stripped = DIGITS.replace_all(&stripped, " ");
    let words = stripped
        .split_whitespace()
        .filter(|w| w.chars().count() > 2 && !is_stopword(w))
        .take(2)
        .collect::<Vec<_>>();
    match words.as_slice() {
        [home, away] => format!("{home} vs {away}"),
        _ => TEAMS_UNIDENTIFIED.to_string(),
    }
}

fn clean_team_name(side: &str) -> String {
    let side = side.split_whitespace().collect::<Vec<_>>().join(" ");
    let side = TRAILING_SCORE.replace(&side, "");
    let side = PUNCTUATION.replace_all(&side, " ");
    side.split_whitespace()
        .filter(|w| w.chars().count() > 1 && !is_stopword(w) && !is_numeric(w))
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word.to_lowercase().as_str())
}

fn is_numeric(word: &str) -> bool {
    word.chars().all(|c| c.is_ascii_digit())
}

/// Kickoff clock time as `HH:MM`, or the current local time when the text has none.
pub fn extract_time(text: &str) -> String {
    TIME_PATTERNS
        .iter()
        .find_map(|pattern| pattern.captures(text))
        .and_then(|caps| {
            let hour = caps[1].parse::<u8>().ok()?;
            Some(format!("{hour:02}:{}", &caps[2]))
        })
        .unwrap_or_else(|| Local::now().format("%H:%M").to_string())
}

/// First known competition mentioned in the text, title-cased.
pub fn extract_league(text: &str) -> String {
    let text = text.to_lowercase();
    LEAGUE_KEYWORDS
        .iter()
        .copied()
        .find(|k| text.contains(*k))
        .map(title_case)
        .unwrap_or_else(|| LEAGUE_UNIDENTIFIED.to_string())
}

fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut boundary = true;
    for c in text.chars() {
        if c.is_alphabetic() {
            if boundary {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            boundary = false;
        } else {
            out.push(c);
            boundary = true;
        }
    }
    out
}

/// First positive decimal number in the text (`"Odd 1.95"` gives `1.95`).
pub fn parse_decimal(text: &str) -> Option<f64> {
    DECIMAL
        .find(text)
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| *v > 0.0)
}

/// True when the text is just a number, e.g. a stray odds value.
pub(crate) fn is_bare_number(text: &str) -> bool {
    DECIMAL.find(text).is_some_and(|m| m.as_str() == text)
}
