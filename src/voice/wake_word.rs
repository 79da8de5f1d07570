//! Wake word stripping and utterance normalization

use std::fmt;

/// A normalized spoken command
///
/// Lower-cased, with the first occurrence of a wake word removed and
/// surrounding whitespace trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance(String);

impl Utterance {
    /// Normalize a raw transcript
    ///
    /// `wake_words` are expected lower-cased; the first one found in the
    /// transcript has its first occurrence removed.
    #[must_use]
    pub fn from_transcript(transcript: &str, wake_words: &[String]) -> Self {
        let mut command = transcript.to_lowercase();

        if let Some(wake_word) = wake_words
            .iter()
            .find(|w| !w.is_empty() && command.contains(w.as_str()))
        {
            tracing::debug!(wake_word, "stripping wake word");
            command = command.replacen(wake_word.as_str(), "", 1);
        }

        let trimmed = command.trim_matches(|c: char| c.is_whitespace() || c == ',' || c == '.');
        Self(trimmed.to_string())
    }

    /// The normalized command text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether nothing but the wake word was said
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Utterance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
