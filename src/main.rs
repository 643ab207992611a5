use anyhow::{Context, Result};
use futures::StreamExt;
use pickfeed::config::Settings;
use pickfeed::{Feed, Store};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG: &str = "pickfeed.toml";

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::from_default_env().add_directive("pickfeed=info".parse()?);
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut once = false;
    let mut config_path = DEFAULT_CONFIG.to_string();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--once" => once = true,
            path => config_path = path.to_string(),
        }
    }

    let settings = Settings::load(&config_path)
        .with_context(|| format!("loading settings from {}", config_path))?;
    let client = settings.client()?;
    let store = Store::new(&settings.snapshot_path);
    let feed = Feed::new(store.clone());
    let query = settings.query();

    info!(
        thread = %settings.thread_url,
        every = ?settings.refresh_every,
        "starting pick feed"
    );

    if once {
        pickfeed::refresh(&client, &store, &settings.thread_url, &query).await?;
        publish(&feed, &settings)?;
        return Ok(());
    }

    let mut payloads = client.watch(&settings.thread_url, &query, settings.refresh_every);
    loop {
        tokio::select! {
            next = payloads.next() => {
                let Some(payload) = next else { break };
                match payload.map(|p| store.save(&p).map(|()| p.len())) {
                    Ok(Ok(bytes)) => {
                        info!(bytes, "snapshot refreshed");
                        if let Err(e) = publish(&feed, &settings) {
                            error!(error = %e, "publishing feed failed");
                        }
                    }
                    Ok(Err(e)) => warn!(error = %e, "keeping previous snapshot"),
                    Err(e) => warn!(error = %e, "fetch failed"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received, stopping");
                break;
            }
        }
    }

    Ok(())
}

/// Recomputes the ranking from the snapshot and writes it to the feed path.
fn publish(feed: &Feed, settings: &Settings) -> Result<()> {
    let document = feed.document().context("building feed")?;
    document
        .write_to(&settings.feed_path)
        .with_context(|| format!("writing {}", settings.feed_path.display()))?;

    match document.comments.first() {
        Some(top) => info!(
            cards = document.comments.len(),
            top = %top.picks,
            ups = top.ups,
            "feed published"
        ),
        None => info!("feed published with no picks yet"),
    }
    Ok(())
}
