//! Speech I/O adapter
//!
//! Wraps capture + transcription and synthesis + playback behind `listen`
//! and `speak`. One instance is built at startup and shared by every worker;
//! it owns the output lock that keeps utterances from overlapping.

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::Utterance;
use crate::{ListenError, Result};

/// Captures one spoken phrase and returns its raw transcript
#[async_trait]
pub trait Listener: Send + Sync {
    /// Record and transcribe a single phrase
    ///
    /// # Errors
    ///
    /// Returns why no transcript could be produced
    async fn capture(&self) -> std::result::Result<String, ListenError>;
}

/// Turns text into audible speech
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Synthesize and play `text`, returning once playback finished
    ///
    /// # Errors
    ///
    /// Returns error if synthesis or playback fails
    async fn say(&self, text: &str) -> Result<()>;
}

/// Process-wide speech input/output
pub struct SpeechIo {
    listener: Box<dyn Listener>,
    synthesizer: Box<dyn Synthesizer>,
    wake_words: Vec<String>,
    output: Mutex<()>,
}

impl SpeechIo {
    /// Create the adapter
    ///
    /// `wake_words` are lower-cased and stripped from transcripts.
    #[must_use]
    pub fn new(
        listener: Box<dyn Listener>,
        synthesizer: Box<dyn Synthesizer>,
        wake_words: Vec<String>,
    ) -> Self {
        Self {
            listener,
            synthesizer,
            wake_words,
            output: Mutex::new(()),
        }
    }

    /// Capture and normalize one spoken command
    ///
    /// # Errors
    ///
    /// Returns the capture error; the caller is expected to apologize
    pub async fn listen(&self) -> std::result::Result<Utterance, ListenError> {
        let transcript = self
            .listener
            .capture()
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "listen failed"))?;

        let utterance = Utterance::from_transcript(&transcript, &self.wake_words);
        tracing::info!(command = %utterance, "command received");
        Ok(utterance)
    }

    /// Speak `text`, waiting for any other utterance to finish first
    ///
    /// Never fails: synthesis errors are logged and the utterance dropped.
    pub async fn speak(&self, text: &str) {
        tracing::info!(text, "speaking");

        let _guard = self.output.lock().await;
        if let Err(e) = self.synthesizer.say(text).await {
            tracing::error!(error = %e, "speaking failed");
        }
    }
}
