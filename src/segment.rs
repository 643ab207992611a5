//! Splitting free-text comment lines into betting-pick phrases.
//!
//! A line is handed to an ordered list of [`Matcher`] stages and the first
//! stage that finds anything wins. The default [`Segmenter`] runs a single
//! structured pattern first and only falls back to three narrower patterns
//! when that finds nothing.
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use rustc_hash::FxHashSet;
use tracing::debug;

/// `[Team1 [vs Team2]] [-|,] [Qualifier] (ML | BTTS | Over/Under n [goals]) [@ odds]`
///
/// Team names must start with an uppercase letter, keywords match in any case.
static STRUCTURED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?:([A-Z][A-Za-z\s]+?)(?:\s+(?i:vs?\.?|v)\s+([A-Z][A-Za-z\s]+?))?\s*[-–,]?\s*)?",
        r"((?:[A-Z][A-Za-z\s]+?\s+)?(?i:ML|BTTS|(?:Over|Under)\s+[+\-]?[\d.]+(?:\s+goals?)?))",
        r"(?:\s*@\s*([\d.]+))?",
    ))
    .unwrap()
});

static TEAM_MONEYLINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z][A-Za-z\s]+?)\s+(?i:ML)(?:\s*@\s*([\d.]+))?").unwrap());

static FIXTURE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"([A-Z][A-Za-z\s]+?)\s+(?i:vs?\.?|v)\s+([A-Z][A-Za-z\s]+?)\s*[-–]\s*",
        r"([A-Za-z]+(?:\s+[A-Za-z]+)*)(?:\s*@\s*([\d.]+))?",
    ))
    .unwrap()
});

static BARE_TOTAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i:over|under)\s+[+\-]?[\d.]+(?:\s+(?i:goals?))?").unwrap());

static DEFAULT_SEGMENTER: Lazy<Segmenter> = Lazy::new(Segmenter::default);

/// A single strategy for pulling pick phrases out of a line.
///
/// Implementations are pure: the same line always yields the same phrases.
pub trait Matcher: Send + Sync {
    fn name(&self) -> &'static str;

    /// All phrases found in `line`, in order of appearance. May contain duplicates.
    fn find(&self, line: &str) -> Vec<String>;
}

/// The primary grammar; rebuilds each match into a normalized phrase.
#[derive(Clone, Copy, Debug, Default)]
pub struct Structured;

impl Matcher for Structured {
    fn name(&self) -> &'static str {
        "structured"
    }

    fn find(&self, line: &str) -> Vec<String> {
        STRUCTURED_RE
            .captures_iter(line)
            .filter_map(|caps| {
                let group = |i: usize| caps.get(i).map_or("", |m| m.as_str().trim());
                let (team1, team2, bet, odds) = (group(1), group(2), group(3), group(4));

                let mut pick = if !team1.is_empty() && !team2.is_empty() {
                    format!("{} vs {} - {}", team1, team2, bet)
                } else if !team1.is_empty() {
                    format!("{} {}", team1, bet)
                } else {
                    bet.to_string()
                };
                if !odds.is_empty() {
                    pick = format!("{} @ {}", pick, odds);
                }

                let pick = pick.trim();
                (!pick.is_empty()).then(|| pick.to_string())
            })
            .collect()
    }
}

/// A narrow pattern whose non-empty capture groups are joined with spaces.
///
/// Patterns without capture groups contribute the whole match instead.
#[derive(Clone, Debug)]
pub struct JoinedCaptures {
    name: &'static str,
    regex: &'static Lazy<Regex>,
}

impl JoinedCaptures {
    pub fn team_moneyline() -> Self {
        Self {
            name: "team-moneyline",
            regex: &TEAM_MONEYLINE_RE,
        }
    }

    pub fn fixture() -> Self {
        Self {
            name: "fixture",
            regex: &FIXTURE_RE,
        }
    }

    pub fn bare_total() -> Self {
        Self {
            name: "bare-total",
            regex: &BARE_TOTAL_RE,
        }
    }

    fn join(caps: &Captures<'_>) -> String {
        if caps.len() == 1 {
            return caps[0].trim().to_string();
        }
        caps.iter()
            .skip(1)
            .flatten()
            .map(|m| m.as_str())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }
}

impl Matcher for JoinedCaptures {
    fn name(&self) -> &'static str {
        self.name
    }

    fn find(&self, line: &str) -> Vec<String> {
        self.regex
            .captures_iter(line)
            .map(|caps| Self::join(&caps))
            .filter(|pick| !pick.is_empty())
            .collect()
    }
}

/// Runs every inner matcher over the whole line and concatenates the results.
pub struct AllOf {
    name: &'static str,
    matchers: Vec<Box<dyn Matcher>>,
}

impl AllOf {
    pub fn new(name: &'static str, matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { name, matchers }
    }
}

impl Matcher for AllOf {
    fn name(&self) -> &'static str {
        self.name
    }

    fn find(&self, line: &str) -> Vec<String> {
        self.matchers.iter().flat_map(|m| m.find(line)).collect()
    }
}

/// An ordered list of [`Matcher`] stages combined by "first non-empty wins".
pub struct Segmenter {
    stages: Vec<Box<dyn Matcher>>,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(vec![
            Box::new(Structured),
            Box::new(AllOf::new(
                "fallback",
                vec![
                    Box::new(JoinedCaptures::team_moneyline()),
                    Box::new(JoinedCaptures::fixture()),
                    Box::new(JoinedCaptures::bare_total()),
                ],
            )),
        ])
    }
}

impl Segmenter {
    pub fn new(stages: Vec<Box<dyn Matcher>>) -> Self {
        Self { stages }
    }

    /// Returns the deduplicated pick phrases of a single line, first occurrence first.
    pub fn segment(&self, line: &str) -> Vec<String> {
        for stage in &self.stages {
            let found = dedup(stage.find(line));
            if !found.is_empty() {
                debug!(stage = stage.name(), picks = found.len(), "segmented line");
                return found;
            }
        }
        Vec::new()
    }
}

/// Segments `line` with the default [`Segmenter`].
pub fn segment_line(line: &str) -> Vec<String> {
    DEFAULT_SEGMENTER.segment(line)
}

/// Picks and notes extracted from one comment body, each newline-joined.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractedPick {
    /// Distinct pick phrases across the whole body, first occurrence first.
    pub picks: String,
    /// Every non-empty trimmed line of the body, pick lines included.
    pub notes: String,
}

impl ExtractedPick {
    pub fn has_picks(&self) -> bool {
        !self.picks.is_empty()
    }
}

/// Runs the default [`Segmenter`] over every line of `body`.
pub fn extract_picks_and_notes(body: &str) -> ExtractedPick {
    let mut picks = Vec::new();
    let mut notes = Vec::new();

    for line in body.split('\n').map(str::trim).filter(|l| !l.is_empty()) {
        picks.extend(segment_line(line));
        notes.push(line);
    }

    ExtractedPick {
        picks: dedup(picks).join("\n"),
        notes: notes.join("\n"),
    }
}

fn dedup(phrases: Vec<String>) -> Vec<String> {
    let mut seen = FxHashSet::default();
    phrases
        .into_iter()
        .filter(|p| seen.insert(p.clone()))
        .collect()
}
