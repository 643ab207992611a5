//! Grouping picked comments into ranked, vote-weighted pick cards.
use crate::canonical::canonicalize;
use crate::models::PickedComment;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Author shown on every [`PickCard`]; provenance lives in `contributors`.
pub const COMMUNITY_AUTHOR: &str = "Community";

/// Divider placed between the attributed note blocks of a [`PickCard`].
pub const NOTE_SEPARATOR: &str = "\n\n---\n";

/// One canonical pick with the votes and provenance of every comment naming it.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct PickCard {
    /// The canonical key this card groups.
    pub id: String,
    pub author: String,
    /// The shortest phrasing seen for this key.
    pub picks: String,
    pub notes: String,
    pub ups: i64,
    pub downs: i64,
    /// One entry per contributing phrase, in encounter order; an author who
    /// names the pick twice is listed twice.
    pub contributors: Vec<String>,
}

#[derive(Debug)]
struct Bucket {
    key: String,
    variants: Vec<String>,
    notes: Vec<String>,
    contributors: Vec<String>,
    ups: i64,
    downs: i64,
}

impl Bucket {
    fn new(key: String) -> Self {
        Self {
            key,
            variants: Vec::new(),
            notes: Vec::new(),
            contributors: Vec::new(),
            ups: 0,
            downs: 0,
        }
    }

    fn add_variant(&mut self, phrase: &str) {
        if !self.variants.iter().any(|v| v == phrase) {
            self.variants.push(phrase.to_string());
        }
    }

    fn add_comment(&mut self, comment: &PickedComment) {
        self.ups = self.ups.saturating_add(comment.ups);
        self.downs = self.downs.saturating_add(comment.downs);
        self.contributors.push(comment.author.clone());
        if !comment.notes.is_empty() {
            self.notes
                .push(format!("**{}:** {}", comment.author, comment.notes));
        }
    }

    fn into_card(self) -> PickCard {
        // min_by_key keeps the first of equally short variants
        let picks = self
            .variants
            .iter()
            .min_by_key(|v| v.chars().count())
            .cloned()
            .unwrap_or_default();

        PickCard {
            id: self.key,
            author: COMMUNITY_AUTHOR.to_string(),
            picks,
            notes: self.notes.join(NOTE_SEPARATOR),
            ups: self.ups,
            downs: self.downs,
            contributors: self.contributors,
        }
    }
}

/// Groups every pick phrase of `comments` by canonical key and ranks the
/// resulting cards by descending `ups`.
///
/// Every phrase adds its comment's full vote count, author and note block to
/// the phrase's key, so a comment naming the same key twice counts twice.
/// Ties keep the order in which keys were first seen. Nothing is retained
/// between calls.
pub fn aggregate(comments: &[PickedComment]) -> Vec<PickCard> {
    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    let mut buckets: Vec<Bucket> = Vec::new();

    for comment in comments {
        for phrase in comment
            .picks
            .split('\n')
            .map(str::trim)
            .filter(|p| !p.is_empty())
        {
            let key = canonicalize(phrase).to_string();
            let slot = *index.entry(key.clone()).or_insert_with(|| {
                buckets.push(Bucket::new(key));
                buckets.len() - 1
            });

            let bucket = &mut buckets[slot];
            bucket.add_variant(phrase);
            bucket.add_comment(comment);
        }
    }

    let mut cards: Vec<PickCard> = buckets.into_iter().map(Bucket::into_card).collect();
    cards.sort_by(|a, b| b.ups.cmp(&a.ups));

    debug!(
        comments = comments.len(),
        cards = cards.len(),
        "aggregated picks"
    );
    cards
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(author: &str, picks: &str, ups: i64) -> PickedComment {
        PickedComment {
            id: format!("id_{}", author),
            author: author.to_string(),
            body: picks.to_string(),
            picks: picks.to_string(),
            notes: picks.to_string(),
            ups,
            downs: 0,
        }
    }

    #[test]
    fn test_alias_phrasings_merge() {
        let cards = aggregate(&[
            comment("alice", "Al Nassr ML", 10),
            comment("bob", "al nassr moneyline", 5),
        ]);

        assert_eq!(cards.len(), 1);
        let card = &cards[0];
        assert_eq!(card.id, "al_nassr:moneyline");
        assert_eq!(card.author, COMMUNITY_AUTHOR);
        assert_eq!(card.ups, 15);
        assert_eq!(card.contributors, vec!["alice", "bob"]);
        assert_eq!(card.picks, "Al Nassr ML");
    }

    #[test]
    fn test_shortest_variant_ties_keep_first_seen() {
        let cards = aggregate(&[
            comment("alice", "Arsenal ML @ 2.10", 1),
            comment("bob", "arsenal ml", 1),
            comment("carol", "Arsenal ML", 1),
        ]);
        assert_eq!(cards[0].picks, "arsenal ml");
    }

    #[test]
    fn test_sorted_by_ups_with_stable_ties() {
        let cards = aggregate(&[
            comment("alice", "Porto ML", 3),
            comment("bob", "Lyon DNB", 7),
            comment("carol", "Roma AH", 3),
        ]);
        let ids: Vec<_> = cards.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["lyon:draw_no_bet", "porto:moneyline", "roma:asian_handicap"]
        );
    }

    #[test]
    fn test_votes_count_per_phrase() {
        let cards = aggregate(&[
            comment("alice", "Porto ML\nLyon DNB", 4),
            comment("bob", "Porto ML\nPorto ML @ 1.8", 2),
        ]);

        let porto = cards.iter().find(|c| c.id == "porto:moneyline").unwrap();
        assert_eq!(porto.ups, 8);
        assert_eq!(porto.contributors, vec!["alice", "bob", "bob"]);
        assert_eq!(porto.notes.matches("**bob:**").count(), 2);
        assert_eq!(porto.picks, "Porto ML");

        let lyon = cards.iter().find(|c| c.id == "lyon:draw_no_bet").unwrap();
        assert_eq!(lyon.ups, 4);
    }

    #[test]
    fn test_vote_sums_saturate() {
        let mut loud = comment("bob", "Porto ML", i64::MAX);
        loud.downs = i64::MIN;
        let mut louder = comment("carol", "Porto ML", 1);
        louder.downs = -1;

        let cards = aggregate(&[loud, louder]);
        assert_eq!(cards[0].ups, i64::MAX);
        assert_eq!(cards[0].downs, i64::MIN);
    }

    #[test]
    fn test_repeat_author_is_listed_each_time() {
        let cards = aggregate(&[comment("alice", "Porto ML", 1), comment("alice", "Porto ML", 1)]);
        assert_eq!(cards[0].contributors, vec!["alice", "alice"]);
    }

    #[test]
    fn test_notes_are_attributed_and_separated() {
        let mut quiet = comment("bob", "Porto ML", 1);
        quiet.notes.clear();
        let cards = aggregate(&[
            comment("alice", "Porto ML", 1),
            quiet,
            comment("carol", "porto moneyline", 1),
        ]);
        assert_eq!(
            cards[0].notes,
            "**alice:** Porto ML\n\n---\n**carol:** porto moneyline"
        );
    }

    #[test]
    fn test_blank_picks_contribute_nothing() {
        let cards = aggregate(&[comment("alice", "\n  \n", 50), comment("bob", "Porto ML", 1)]);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].ups, 1);
        assert_eq!(cards[0].contributors, vec!["bob"]);
    }

    #[test]
    fn test_negative_votes_sum() {
        let mut sour = comment("bob", "Porto ML", -3);
        sour.downs = 2;
        let cards = aggregate(&[comment("alice", "Porto ML", 5), sour]);
        assert_eq!(cards[0].ups, 2);
        assert_eq!(cards[0].downs, 2);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let comments = vec![
            comment("alice", "Arsenal vs Chelsea - BTTS\nOver 2.5 goals", 9),
            comment("bob", "Over 2.5 @ 1.7", 9),
        ];
        let first = aggregate(&comments);
        let second = aggregate(&comments);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(&[]).is_empty());
    }
}
