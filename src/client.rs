use crate::error::Result;
use crate::query::ThreadQuery;
use async_stream::stream;
use futures::stream::Stream;
use governor::{Quota, RateLimiter};
use once_cell::sync::OnceCell;
use std::num::NonZeroU32;
use std::pin::Pin;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::debug;

type ThreadRateLimiter = RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
    governor::middleware::NoOpMiddleware,
>;

pub const DEFAULT_USER_AGENT: &str = concat!("pickfeed/", env!("CARGO_PKG_VERSION"));
const DEFAULT_REQUESTS_PER_MINUTE: u32 = 30;
static LIMITER: OnceCell<ThreadRateLimiter> = OnceCell::new();

/// A global rate limiter so that every client shares one request budget.
///
/// The quota is fixed by whichever client is constructed first.
fn rate_limiter(per_minute: NonZeroU32) -> &'static ThreadRateLimiter {
    LIMITER.get_or_init(|| RateLimiter::direct(Quota::per_minute(per_minute)))
}

/// An asynchronous `Client` that fetches the raw JSON payload of a discussion thread.
///
/// This client is built on top of a [`reqwest::Client`], so as per that documentation
/// it is advised you create a single one and **reuse** it. `Client` is both
/// [`Send`] and [`Sync`] so you don't need to wrap it to reuse it.
#[derive(Clone)]
pub struct Client {
    client: reqwest::Client,
    limiter: &'static ThreadRateLimiter,
}

impl Client {
    /// Creates a new client with the default user agent and request budget.
    ///
    /// # Example
    /// ```rust,no_run
    /// use pickfeed::Client;
    ///
    /// let client = Client::new().unwrap();
    /// ```
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(DEFAULT_USER_AGENT)
            .build()?;
        Ok(Self::with_client(client, default_quota()))
    }

    /// Creates a new client with the given backing [`reqwest::Client`].
    ///
    /// Thread endpoints tend to reject requests without a descriptive user
    /// agent, so set one on `client`.
    pub fn with_client(client: reqwest::Client, requests_per_minute: NonZeroU32) -> Self {
        let limiter = rate_limiter(requests_per_minute);
        Self { client, limiter }
    }

    /// Fetches the thread at `url` once and returns the response body untouched.
    ///
    /// # Example
    /// ```rust,no_run
    /// use pickfeed::{Client, ThreadQuery};
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let client = Client::new().unwrap();
    /// let query = ThreadQuery::new().limit(500);
    ///
    /// let payload = client
    ///     .fetch_thread("https://www.reddit.com/r/SoccerBetting/comments/1q19f1t/.json", &query)
    ///     .await
    ///     .unwrap();
    /// println!("fetched {} bytes", payload.len());
    /// # }
    /// ```
    pub async fn fetch_thread(&self, url: &str, query: &ThreadQuery) -> Result<Vec<u8>> {
        // Ensure each request is gated behind the rate limiter
        self.limiter.until_ready().await;

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await?
            .error_for_status()?;
        let body = response.bytes().await?;

        debug!(url, bytes = body.len(), "fetched thread");
        Ok(body.to_vec())
    }

    /// Returns a [`Stream`] that fetches the thread once per `every`, starting immediately.
    ///
    /// The stream never ends on its own; a failed fetch yields an `Err` and the
    /// next tick tries again. `every` must be non-zero.
    ///
    /// [`Stream`]: futures::Stream
    pub fn watch<'a>(
        &'a self,
        url: &'a str,
        query: &'a ThreadQuery,
        every: Duration,
    ) -> Pin<Box<dyn Stream<Item = Result<Vec<u8>>> + 'a>> {
        Box::pin(stream! {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                yield self.fetch_thread(url, query).await;
            }
        })
    }
}

fn default_quota() -> NonZeroU32 {
    NonZeroU32::new(DEFAULT_REQUESTS_PER_MINUTE).unwrap_or(NonZeroU32::MIN)
}
