//! Encyclopedic lookup via the MediaWiki API

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;

use super::USER_AGENT;
use crate::{Error, Result};

/// First `[[target]]`, `[[target|label]]` or `[[target#section]]` on a line
static WIKILINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[([^\[\]|#]+)[^\[\]]*\]\]").expect("wikilink pattern is valid")
});

/// Link prefixes that never name an article
const NON_ARTICLE_PREFIXES: &[&str] = &[
    "category", "file", "help", "image", "portal", "special", "template", "wikipedia",
    "wikt", "wiktionary",
];

/// Outcome of a summary lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Summary {
    /// The page exists; its leading sentences
    Found(String),
    /// The title is a disambiguation page; candidate titles in page order
    Ambiguous(Vec<String>),
    /// No page with that title
    NotFound,
    /// The service failed
    ServiceError(String),
}

/// Summary and search over an encyclopedia
#[async_trait]
pub trait Encyclopedia: Send + Sync {
    /// Leading `sentences` sentences of the page titled `topic`
    async fn summary(&self, topic: &str, sentences: u32) -> Summary;

    /// Page titles matching `query`, best match first
    async fn search(&self, query: &str) -> Result<Vec<String>>;
}

/// Wikipedia via the MediaWiki action API
pub struct Wikipedia {
    client: reqwest::Client,
    endpoint: String,
}

impl Wikipedia {
    /// English Wikipedia
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new() -> Result<Self> {
        Self::with_endpoint("https://en.wikipedia.org/w/api.php")
    }

    /// Any MediaWiki `api.php` endpoint
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    async fn request(&self, action: &str, params: &[(&str, &str)]) -> Result<String> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("action", action), ("format", "json"), ("formatversion", "2")])
            .query(params)
            .send()
            .await?;

        let response = response.error_for_status().map_err(Error::Http)?;
        Ok(response.text().await?)
    }

    async fn query(&self, params: &[(&str, &str)]) -> Result<String> {
        self.request("query", params).await
    }

    async fn fetch_summary(&self, topic: &str, sentences: u32) -> Result<Summary> {
        let sentences = sentences.max(1).to_string();
        let body = self
            .query(&[
                ("prop", "extracts|pageprops"),
                ("ppprop", "disambiguation"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("exsentences", sentences.as_str()),
                ("redirects", "1"),
                ("titles", topic),
            ])
            .await?;

        match parse_page(&body)? {
            PageKind::Missing => Ok(Summary::NotFound),
            PageKind::Disambiguation(title) => {
                // prop=links is sorted by title; the wikitext keeps the page's own order
                let body = self
                    .request(
                        "parse",
                        &[("page", title.as_str()), ("prop", "wikitext"), ("redirects", "1")],
                    )
                    .await?;
                Ok(Summary::Ambiguous(parse_candidates(&body)?))
            }
            PageKind::Article(extract) => Ok(Summary::Found(extract)),
        }
    }
}

#[async_trait]
impl Encyclopedia for Wikipedia {
    async fn summary(&self, topic: &str, sentences: u32) -> Summary {
        tracing::debug!(topic, sentences, "wikipedia summary");

        match self.fetch_summary(topic, sentences).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::warn!(error = %e, topic, "wikipedia summary failed");
                Summary::ServiceError(e.to_string())
            }
        }
    }

    async fn search(&self, query: &str) -> Result<Vec<String>> {
        tracing::debug!(query, "wikipedia search");

        let body = self
            .query(&[("list", "search"), ("srsearch", query), ("srlimit", "10"), ("srprop", "")])
            .await?;
        parse_search(&body)
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    query: Option<QueryBody>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    info: String,
}

#[derive(Debug, Deserialize)]
struct ParseResponse {
    parse: Option<ParseBody>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ParseBody {
    #[serde(default)]
    wikitext: String,
}

#[derive(Debug, Default, Deserialize)]
struct QueryBody {
    #[serde(default)]
    pages: Vec<Page>,
    #[serde(default)]
    search: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    title: String,
    #[serde(default)]
    missing: bool,
    #[serde(default)]
    invalid: bool,
    extract: Option<String>,
    pageprops: Option<PageProps>,
}

#[derive(Debug, Deserialize)]
struct PageProps {
    disambiguation: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: String,
}

#[derive(Debug, PartialEq, Eq)]
enum PageKind {
    Missing,
    Disambiguation(String),
    Article(String),
}

fn parse_query(body: &str) -> Result<QueryBody> {
    let response: QueryResponse = serde_json::from_str(body)?;
    if let Some(error) = response.error {
        return Err(Error::Encyclopedia(error.info));
    }
    Ok(response.query.unwrap_or_default())
}

fn parse_page(body: &str) -> Result<PageKind> {
    let Some(page) = parse_query(body)?.pages.into_iter().next() else {
        return Ok(PageKind::Missing);
    };

    if page.missing || page.invalid {
        return Ok(PageKind::Missing);
    }

    if page.pageprops.is_some_and(|p| p.disambiguation.is_some()) {
        return Ok(PageKind::Disambiguation(page.title));
    }

    match page.extract.map(|e| e.trim().to_string()) {
        Some(extract) if !extract.is_empty() => Ok(PageKind::Article(extract)),
        _ => Ok(PageKind::Missing),
    }
}

fn parse_candidates(body: &str) -> Result<Vec<String>> {
    let response: ParseResponse = serde_json::from_str(body)?;
    if let Some(error) = response.error {
        return Err(Error::Encyclopedia(error.info));
    }
    let wikitext = response.parse.map(|p| p.wikitext).unwrap_or_default();
    Ok(wikitext_candidates(&wikitext))
}

/// Article targets of a disambiguation page's list entries, in page order
///
/// Each `*` or `#` entry contributes its first article link.
fn wikitext_candidates(wikitext: &str) -> Vec<String> {
    let mut candidates: Vec<String> = Vec::new();

    for line in wikitext.lines().map(str::trim_start) {
        if !line.starts_with(['*', '#']) {
            continue;
        }

        let target = WIKILINK
            .captures_iter(line)
            .map(|c| c[1].trim().replace('_', " "))
            .find(|t| is_article_target(t));

        if let Some(target) = target
            && !candidates.contains(&target)
        {
            candidates.push(target);
        }
    }

    candidates
}

fn is_article_target(target: &str) -> bool {
    if target.is_empty() || target.starts_with(':') {
        return false;
    }
    target.split_once(':').is_none_or(|(prefix, _)| {
        !NON_ARTICLE_PREFIXES.contains(&prefix.trim().to_lowercase().as_str())
    })
}

fn parse_search(body: &str) -> Result<Vec<String>> {
    Ok(parse_query(body)?
        .search
        .into_iter()
        .map(|h| h.title)
        .collect())
}
