use crate::client::{Client, DEFAULT_USER_AGENT};
use crate::query::{CommentSort, ThreadQuery};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime settings, read from an optional config file and `PICKFEED__*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// JSON endpoint of the discussion thread.
    #[serde(default)]
    pub thread_url: String,
    #[serde(default = "default_ua")]
    pub user_agent: String,
    #[serde(with = "humantime_serde", default = "default_refresh_every")]
    pub refresh_every: Duration,
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub timeout: Duration,
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: NonZeroU32,
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
    #[serde(default = "default_feed_path")]
    pub feed_path: PathBuf,
    #[serde(default)]
    pub comment_limit: Option<u32>,
    #[serde(default)]
    pub comment_depth: Option<u32>,
    #[serde(default)]
    pub sort: Option<CommentSort>,
}

fn default_ua() -> String {
    DEFAULT_USER_AGENT.into()
}
fn default_refresh_every() -> Duration {
    Duration::from_secs(120)
}
fn default_timeout() -> Duration {
    Duration::from_secs(10)
}
fn default_requests_per_minute() -> NonZeroU32 {
    NonZeroU32::new(30).unwrap_or(NonZeroU32::MIN)
}
fn default_snapshot_path() -> PathBuf {
    PathBuf::from("comments.json")
}
fn default_feed_path() -> PathBuf {
    PathBuf::from("feed.json")
}

impl Settings {
    /// Loads `path` (if it exists) and layers the environment over it.
    pub fn load(path: &str) -> Result<Self> {
        let cfg = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix("PICKFEED")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("building config")?;

        let settings: Settings = cfg.try_deserialize().context("deserializing config")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(!self.thread_url.trim().is_empty(), "thread_url missing");
        anyhow::ensure!(
            !self.refresh_every.is_zero(),
            "refresh_every must be > 0"
        );
        Ok(())
    }

    pub fn query(&self) -> ThreadQuery {
        let mut query = ThreadQuery::new();
        if let Some(limit) = self.comment_limit {
            query = query.limit(limit);
        }
        if let Some(depth) = self.comment_depth {
            query = query.depth(depth);
        }
        if let Some(sort) = self.sort {
            query = query.sort(sort);
        }
        query
    }

    pub fn client(&self) -> Result<Client> {
        let client = reqwest::Client::builder()
            .user_agent(self.user_agent.clone())
            .timeout(self.timeout)
            .build()
            .context("building http client")?;
        Ok(Client::with_client(client, self.requests_per_minute))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::fs;

    fn write_config(name: &str, contents: &str) -> String {
        let mut dir = env::temp_dir();
        dir.push(format!("pickfeed_config_{}", name));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("pickfeed.toml");
        fs::write(&path, contents).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_file_with_env_override() {
        let path = write_config(
            "env",
            r#"
thread_url = "https://example.com/thread/.json"
refresh_every = "30s"
comment_limit = 200
sort = "top"
"#,
        );
        env::set_var("PICKFEED__FEED_PATH", "out/picks.json");

        let settings = Settings::load(&path).unwrap();
        env::remove_var("PICKFEED__FEED_PATH");

        assert_eq!(settings.refresh_every, Duration::from_secs(30));
        assert_eq!(settings.feed_path, PathBuf::from("out/picks.json"));
        assert_eq!(settings.snapshot_path, PathBuf::from("comments.json"));
        assert_eq!(
            settings.query(),
            ThreadQuery::new().limit(200).sort(CommentSort::Top)
        );
    }

    #[test]
    fn test_missing_thread_url_is_rejected() {
        let path = write_config("missing_url", "refresh_every = \"1m\"\n");
        let err = Settings::load(&path).unwrap_err();
        assert!(err.to_string().contains("thread_url"));
    }

    #[test]
    fn test_zero_refresh_is_rejected() {
        let path = write_config(
            "zero_refresh",
            "thread_url = \"https://example.com/t.json\"\nrefresh_every = \"0s\"\n",
        );
        assert!(Settings::load(&path).is_err());
    }
}
