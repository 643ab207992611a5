//! Grouping keys for pick phrases.
//!
//! `"Arsenal ML @ 2.10"` and `"arsenal moneyline"` describe the same pick and
//! both canonicalize to `arsenal:moneyline`.
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

/// Bet types recognized through the alias table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Market {
    Moneyline,
    BothTeamsToScore,
    DrawNoBet,
    AsianHandicap,
}

impl Market {
    pub fn tag(self) -> &'static str {
        match self {
            Market::Moneyline => "moneyline",
            Market::BothTeamsToScore => "both_teams_to_score",
            Market::DrawNoBet => "draw_no_bet",
            Market::AsianHandicap => "asian_handicap",
        }
    }
}

/// Aliases in lookup order; the first one present in a phrase wins.
pub const ALIASES: [(&str, Market); 10] = [
    ("ml", Market::Moneyline),
    ("moneyline", Market::Moneyline),
    ("money line", Market::Moneyline),
    ("to win", Market::Moneyline),
    ("btts", Market::BothTeamsToScore),
    ("both teams to score", Market::BothTeamsToScore),
    ("dnb", Market::DrawNoBet),
    ("draw no bet", Market::DrawNoBet),
    ("ah", Market::AsianHandicap),
    ("asian handicap", Market::AsianHandicap),
];

const PUNCTUATION: &[char] = &['@', '(', ')', '[', ']', ':', '-', '–', ','];

const TOTAL_SUBJECT: &str = "total";

static ALIAS_RES: Lazy<Vec<(Regex, Market)>> = Lazy::new(|| {
    ALIASES
        .iter()
        .map(|(alias, market)| {
            let re = Regex::new(&format!(r"\b{}\b", regex::escape(alias))).unwrap();
            (re, *market)
        })
        .collect()
});

static TOTAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(over|under)\s+([+\-]?[\d.]+)").unwrap());

static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+\-]?(?:\d+(?:\.\d*)?|\.\d+)$").unwrap());

/// The bet-type half of a [`CanonicalKey`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BetType {
    Market(Market),
    /// Goals line, kept exactly as written (sign included).
    Over(String),
    Under(String),
}

impl fmt::Display for BetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BetType::Market(market) => f.write_str(market.tag()),
            BetType::Over(line) => write!(f, "over_{}", line),
            BetType::Under(line) => write!(f, "under_{}", line),
        }
    }
}

/// Identity under which equivalent picks are grouped.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CanonicalKey {
    /// `<subject>:<bettype>`; the subject of a goals total is always `total`.
    Pick { subject: String, bet: BetType },
    /// No bet type recognized: the whole phrase, lowercased and underscore-joined.
    Unrecognized(String),
}

impl CanonicalKey {
    pub fn is_recognized(&self) -> bool {
        matches!(self, CanonicalKey::Pick { .. })
    }

    pub fn bet(&self) -> Option<&BetType> {
        match self {
            CanonicalKey::Pick { bet, .. } => Some(bet),
            CanonicalKey::Unrecognized(_) => None,
        }
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CanonicalKey::Pick { subject, bet } => write!(f, "{}:{}", subject, bet),
            CanonicalKey::Unrecognized(key) => f.write_str(key),
        }
    }
}

/// Maps a raw pick phrase to its grouping key.
///
/// Alias matches are anchored on word boundaries, so `ml` inside `html`
/// does not count as a moneyline mention.
pub fn canonicalize(phrase: &str) -> CanonicalKey {
    let lower = phrase.trim().to_lowercase();

    let alias = ALIAS_RES
        .iter()
        .find_map(|(re, market)| re.find(&lower).map(|m| (m.range(), *market)));

    if let Some((range, market)) = alias {
        let mut rest = String::with_capacity(lower.len());
        rest.push_str(&lower[..range.start]);
        rest.push(' ');
        rest.push_str(&lower[range.end..]);

        return CanonicalKey::Pick {
            subject: subject_of(&rest),
            bet: BetType::Market(market),
        };
    }

    if let Some(caps) = TOTAL_RE.captures(&lower) {
        let line = caps[2].to_string();
        let bet = match &caps[1] {
            "over" => BetType::Over(line),
            _ => BetType::Under(line),
        };
        return CanonicalKey::Pick {
            subject: TOTAL_SUBJECT.to_string(),
            bet,
        };
    }

    CanonicalKey::Unrecognized(lower.split_whitespace().collect::<Vec<_>>().join("_"))
}

/// Strips punctuation and odds from what is left of a phrase once its alias is gone.
fn subject_of(rest: &str) -> String {
    let spaced = rest.replace(PUNCTUATION, " ");

    let mut tokens = Vec::new();
    let mut words = spaced.split_whitespace().peekable();
    while let Some(word) = words.next() {
        if NUMBER_RE.is_match(word) {
            words.next_if_eq(&"odds");
            continue;
        }
        tokens.push(word);
    }

    tokens.join("_")
}
