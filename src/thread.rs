//! Turning a fetched thread payload into a comment tree and walking it.
use crate::models::{Listing, PickedComment, RawComment, Thing, DELETED_AUTHOR};
use crate::segment::extract_picks_and_notes;
use serde_json::Value;
use tracing::{debug, warn};

/// Builds the comment forest of a thread payload.
///
/// The payload is either a single listing or an array of them (the thread
/// endpoint returns `[submission, comments]`). Anything that is not a comment
/// is skipped, and malformed nodes degrade to defaults rather than failing.
pub fn parse_payload(payload: Value) -> Vec<RawComment> {
    let listings = match payload {
        Value::Array(listings) => listings,
        other => vec![other],
    };

    listings.into_iter().flat_map(comments_from_listing).collect()
}

/// Builds the comment tree below one listing without recursing into replies.
///
/// Nodes are created parent-first into a flat arena and then folded back
/// into their parents from the highest index down.
fn comments_from_listing(listing: Value) -> Vec<RawComment> {
    let mut arena: Vec<(Option<usize>, Option<RawComment>)> = Vec::new();
    let mut pending: Vec<(Option<usize>, Value)> = vec![(None, listing)];

    while let Some((parent, listing)) = pending.pop() {
        for child in listing_children(listing) {
            let thing: Thing = match serde_json::from_value(child) {
                Ok(thing) => thing,
                Err(e) => {
                    warn!(error = %e, "skipping malformed thing");
                    continue;
                }
            };
            if !thing.is_comment() {
                continue;
            }

            let (comment, replies) = comment_from_data(thing.data);
            arena.push((parent, Some(comment)));
            if let Some(replies) = replies {
                pending.push((Some(arena.len() - 1), replies));
            }
        }
    }

    let mut roots = Vec::new();
    for i in (0..arena.len()).rev() {
        let (parent, slot) = &mut arena[i];
        let parent = *parent;
        let Some(mut comment) = slot.take() else {
            continue;
        };
        // children were folded in highest index first
        comment.replies.reverse();

        match parent {
            Some(p) => {
                if let Some(parent) = arena[p].1.as_mut() {
                    parent.replies.push(comment);
                }
            }
            None => roots.push(comment),
        }
    }
    roots.reverse();
    roots
}

fn listing_children(listing: Value) -> Vec<Value> {
    match serde_json::from_value::<Listing>(listing) {
        Ok(listing) => listing.data.children,
        Err(e) => {
            warn!(error = %e, "treating malformed listing as empty");
            Vec::new()
        }
    }
}

/// Reads one comment's fields leniently, returning its replies listing if any.
fn comment_from_data(mut data: Value) -> (RawComment, Option<Value>) {
    let replies = data
        .as_object_mut()
        .and_then(|fields| fields.remove("replies"))
        .filter(Value::is_object);

    let text = |key: &str| data.get(key).and_then(Value::as_str).map(str::to_string);
    let count = |key: &str| data.get(key).and_then(Value::as_i64).unwrap_or(0);

    let comment = RawComment {
        id: text("id").unwrap_or_default(),
        author: text("author")
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DELETED_AUTHOR.to_string()),
        body: text("body").unwrap_or_default(),
        ups: count("ups"),
        downs: count("downs"),
        replies: Vec::new(),
    };

    (comment, replies)
}

/// Pre-order iterator over a comment forest: parents before their replies,
/// siblings in thread order.
pub struct Preorder<'a> {
    stack: Vec<&'a RawComment>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a RawComment;

    fn next(&mut self) -> Option<Self::Item> {
        let comment = self.stack.pop()?;
        self.stack.extend(comment.replies.iter().rev());
        Some(comment)
    }
}

/// Walks every comment of the forest in pre-order.
pub fn walk(comments: &[RawComment]) -> Preorder<'_> {
    Preorder {
        stack: comments.iter().rev().collect(),
    }
}

/// Extracts picks from the forest in pre-order, keeping only comments with picks.
///
/// A comment without picks is dropped together with its whole reply subtree.
pub fn annotate(comments: &[RawComment]) -> Vec<PickedComment> {
    let mut picked = Vec::new();
    let mut stack: Vec<&RawComment> = comments.iter().rev().collect();

    while let Some(comment) = stack.pop() {
        let extracted = extract_picks_and_notes(&comment.body);
        if !extracted.has_picks() {
            continue;
        }
        stack.extend(comment.replies.iter().rev());

        picked.push(PickedComment {
            id: comment.id.clone(),
            author: comment.author.clone(),
            body: comment.body.clone(),
            picks: extracted.picks,
            notes: extracted.notes,
            ups: comment.ups,
            downs: comment.downs,
        });
    }

    debug!(picked = picked.len(), "annotated thread");
    picked
}
