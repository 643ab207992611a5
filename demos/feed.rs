//! Prints the ranked picks of a stored thread snapshot.
//!
//! ```text
//! cargo run --example feed -- comments.json
//! ```
use pickfeed::{Feed, Store};

fn main() {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "comments.json".to_string());
    let feed = Feed::new(Store::new(path));

    match feed.cards() {
        Ok(cards) if cards.is_empty() => println!("no picks yet"),
        Ok(cards) => {
            for card in cards {
                println!(
                    "{:>5}  {:<40} {}",
                    card.ups,
                    card.picks,
                    card.contributors.join(", ")
                );
            }
        }
        Err(e) => eprintln!("error: {}", e),
    }
}
