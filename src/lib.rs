//! # pickfeed
//!
//! The `pickfeed` crate turns a forum betting thread into a ranked,
//! deduplicated feed of community picks, weighted by upvotes.
//!
//! Comment bodies are split into pick phrases ([`segment`]), each phrase is
//! mapped to a grouping key so that `"Arsenal ML"` and `"arsenal moneyline"`
//! land together ([`canonical`]), and the votes of every comment naming a
//! key are summed into a [`PickCard`] ([`aggregate`](mod@aggregate)).
//!
//! ## Ranking a thread snapshot
//!
//! ```rust,no_run
//! use pickfeed::{Feed, Store};
//!
//! let feed = Feed::new(Store::new("comments.json"));
//! for card in feed.cards().unwrap() {
//!     println!("{:>4}  {}", card.ups, card.picks);
//! }
//! ```
//!
//! ## Keeping the snapshot fresh
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use pickfeed::{Client, Store, ThreadQuery};
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let client = Client::new().unwrap();
//! let store = Store::new("comments.json");
//! let query = ThreadQuery::new();
//! let url = "https://www.reddit.com/r/SoccerBetting/comments/1q19f1t/.json";
//!
//! let mut payloads = client.watch(url, &query, Duration::from_secs(120));
//! while let Some(payload) = payloads.next().await {
//!     if let Ok(payload) = payload {
//!         store.save(&payload).unwrap();
//!     }
//! }
//! # }
//! ```
//!
//! **NOTE**: Nothing is cached between reads; every [`Feed::cards`] call
//! recomputes the ranking from the snapshot on disk.

pub mod aggregate;
pub mod canonical;
pub mod config;
pub mod models;
pub mod segment;
pub mod thread;

mod client;
mod error;
mod feed;
mod query;
mod store;

pub use aggregate::{aggregate, PickCard};
pub use canonical::{canonicalize, CanonicalKey};
pub use client::Client;
pub use error::{Error, Result};
pub use feed::{refresh, Feed, FeedDocument};
pub use query::{CommentSort, ThreadQuery};
pub use store::Store;
