//! Person lookup with disambiguation and search fallbacks

use crate::Result;
use crate::services::{Encyclopedia, Summary};

/// Sentences requested per summary
pub const SUMMARY_SENTENCES: u32 = 1;

/// Spoken when a disambiguation could not be resolved
pub const TOO_BROAD: &str = "Your query is too broad. Please be more specific.";

/// Spoken when neither the title nor a search turned anything up
pub const NOT_FOUND: &str = "I couldn't find any information about that.";

/// Spoken when a summary request itself failed
pub const LOOKUP_FAILED: &str = "Something went wrong while searching Wikipedia.";

/// Resolve a name to the sentence to speak
///
/// 1. Direct summary.
/// 2. Ambiguous: summary of the first candidate only.
/// 3. Not found: search, then summary of the first hit.
/// 4. Summary service error: lookup apology.
///
/// # Errors
///
/// Returns error if the search itself fails; the caller apologizes generically
pub async fn lookup_person(encyclopedia: &dyn Encyclopedia, name: &str) -> Result<String> {
    match encyclopedia.summary(name, SUMMARY_SENTENCES).await {
        Summary::Found(text) => Ok(text),
        Summary::Ambiguous(candidates) => {
            Ok(resolve_ambiguous(encyclopedia, name, &candidates).await)
        }
        Summary::NotFound => search_fallback(encyclopedia, name).await,
        Summary::ServiceError(e) => {
            tracing::error!(error = %e, name, "encyclopedia lookup failed");
            Ok(LOOKUP_FAILED.to_string())
        }
    }
}

async fn resolve_ambiguous(
    encyclopedia: &dyn Encyclopedia,
    name: &str,
    candidates: &[String],
) -> String {
    let Some(first) = candidates.first() else {
        tracing::warn!(name, "disambiguation without candidates");
        return TOO_BROAD.to_string();
    };

    tracing::debug!(name, candidate = %first, "ambiguous, trying first candidate");
    match encyclopedia.summary(first, SUMMARY_SENTENCES).await {
        Summary::Found(text) => text,
        other => {
            tracing::warn!(candidate = %first, result = ?other, "disambiguation fallback failed");
            TOO_BROAD.to_string()
        }
    }
}

async fn search_fallback(encyclopedia: &dyn Encyclopedia, name: &str) -> Result<String> {
    let results = encyclopedia.search(name).await?;

    let Some(first) = results.first() else {
        tracing::debug!(name, "no search results");
        return Ok(NOT_FOUND.to_string());
    };

    tracing::debug!(name, hit = %first, "not found, trying first search hit");
    match encyclopedia.summary(first, SUMMARY_SENTENCES).await {
        Summary::Found(text) => Ok(text),
        other => {
            tracing::warn!(hit = %first, result = ?other, "search fallback failed");
            Ok(NOT_FOUND.to_string())
        }
    }
}
