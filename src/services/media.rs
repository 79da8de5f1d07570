//! Media playback: open the best YouTube match in the browser

use std::path::PathBuf;
use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use super::USER_AGENT;
use crate::{Error, Result};

/// Plays media for a search term
#[async_trait]
pub trait MediaPlayer: Send + Sync {
    /// Start playback of the best match for `query`
    async fn play(&self, query: &str) -> Result<()>;
}

/// First video id embedded in a YouTube results page
static VIDEO_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""videoId":"([A-Za-z0-9_-]{11})""#).expect("video id pattern is valid")
});

/// Opens YouTube videos with the system URL opener
pub struct YouTube {
    client: reqwest::Client,
    opener: Option<PathBuf>,
}

impl YouTube {
    /// Use the platform URL opener, if one is installed
    ///
    /// A missing opener only fails `play` requests.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new() -> Result<Self> {
        let opener = match find_opener() {
            Ok(opener) => {
                tracing::debug!(opener = %opener.display(), "media opener found");
                Some(opener)
            }
            Err(e) => {
                tracing::warn!(error = %e, "media playback disabled");
                None
            }
        };
        Self::with_opener(opener)
    }

    fn with_opener(opener: Option<PathBuf>) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client, opener })
    }

    /// Resolve a search term to a watch URL, or the results page if no video is found
    async fn resolve(&self, query: &str) -> Result<String> {
        let results = search_url(query);
        let page = self
            .client
            .get(&results)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(first_video_url(&page).unwrap_or(results))
    }
}

#[async_trait]
impl MediaPlayer for YouTube {
    async fn play(&self, query: &str) -> Result<()> {
        let Some(opener) = &self.opener else {
            return Err(Error::Media("no URL opener installed".to_string()));
        };

        let url = self.resolve(query).await?;
        tracing::info!(query, url = %url, "opening media");

        let status = tokio::process::Command::new(opener)
            .args(opener_args(&url))
            .status()
            .await?;

        if !status.success() {
            return Err(Error::Media(format!("opener exited with {status}")));
        }
        Ok(())
    }
}

fn search_url(query: &str) -> String {
    format!(
        "https://www.youtube.com/results?search_query={}",
        urlencoding::encode(query)
    )
}

fn first_video_url(page: &str) -> Option<String> {
    VIDEO_ID
        .captures(page)
        .and_then(|c| c.get(1))
        .map(|id| format!("https://www.youtube.com/watch?v={}", id.as_str()))
}

#[cfg(target_os = "windows")]
fn find_opener() -> Result<PathBuf> {
    which::which("cmd").map_err(|e| Error::Media(format!("cmd not found: {e}")))
}

#[cfg(target_os = "macos")]
fn find_opener() -> Result<PathBuf> {
    which::which("open").map_err(|e| Error::Media(format!("open not found: {e}")))
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn find_opener() -> Result<PathBuf> {
    which::which("xdg-open").map_err(|e| Error::Media(format!("xdg-open not found: {e}")))
}

#[cfg(target_os = "windows")]
fn opener_args(url: &str) -> Vec<String> {
    vec!["/C".to_string(), "start".to_string(), String::new(), url.to_string()]
}

#[cfg(not(target_os = "windows"))]
fn opener_args(url: &str) -> Vec<String> {
    vec![url.to_string()]
}
