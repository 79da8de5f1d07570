//! Top headlines via NewsAPI

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::USER_AGENT;
use crate::Result;

/// Source of current headlines
#[async_trait]
pub trait HeadlineProvider: Send + Sync {
    /// Up to `limit` headline titles, most important first
    async fn top_headlines(&self, limit: usize) -> Result<Vec<String>>;
}

/// <https://newsapi.org> top headlines
pub struct NewsApi {
    client: reqwest::Client,
    api_key: SecretString,
    country: String,
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    status: String,
    #[serde(default)]
    articles: Vec<Article>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Article {
    title: Option<String>,
}

impl NewsApi {
    /// Create a client for one country's top headlines
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new(api_key: SecretString, country: String) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            api_key,
            country,
        })
    }
}

#[async_trait]
impl HeadlineProvider for NewsApi {
    async fn top_headlines(&self, limit: usize) -> Result<Vec<String>> {
        let page_size = limit.to_string();
        let response = self
            .client
            .get("https://newsapi.org/v2/top-headlines")
            .header("X-Api-Key", self.api_key.expose_secret())
            .query(&[("country", self.country.as_str()), ("pageSize", page_size.as_str())])
            .send()
            .await?;

        // Error bodies are JSON too; parse before checking the HTTP status
        let body = response.text().await?;
        let headlines = parse_headlines(&body, limit)?;
        tracing::debug!(count = headlines.len(), "fetched headlines");
        Ok(headlines)
    }
}

fn parse_headlines(body: &str, limit: usize) -> Result<Vec<String>> {
    let response: NewsResponse = serde_json::from_str(body)?;

    // A rejected request carries no articles and reads as "no news"
    if response.status != "ok" {
        tracing::warn!(
            status = %response.status,
            message = response.message.as_deref().unwrap_or_default(),
            "news API returned no articles"
        );
        return Ok(Vec::new());
    }

    Ok(response
        .articles
        .into_iter()
        .filter_map(|a| a.title)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .take(limit)
        .collect())
}
