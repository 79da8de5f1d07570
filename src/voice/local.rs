//! Local audio devices backed by cloud STT/TTS

use async_trait::async_trait;

use super::capture::{SAMPLE_RATE, record_phrase, samples_to_wav};
use super::playback::AudioPlayback;
use super::speech::{Listener, Synthesizer};
use super::stt::SpeechToText;
use super::tts::TextToSpeech;
use crate::config::CaptureSettings;
use crate::{Error, ListenError, Result};

/// Listens on the default microphone
pub struct MicrophoneListener {
    stt: SpeechToText,
    settings: CaptureSettings,
}

impl MicrophoneListener {
    #[must_use]
    pub const fn new(stt: SpeechToText, settings: CaptureSettings) -> Self {
        Self { stt, settings }
    }
}

#[async_trait]
impl Listener for MicrophoneListener {
    async fn capture(&self) -> std::result::Result<String, ListenError> {
        let settings = self.settings;
        let samples = tokio::task::spawn_blocking(move || record_phrase(&settings))
            .await
            .map_err(|e| ListenError::Other(format!("capture task failed: {e}")))??;

        let wav =
            samples_to_wav(&samples, SAMPLE_RATE).map_err(|e| ListenError::Other(e.to_string()))?;
        self.stt.transcribe(wav).await
    }
}

/// Speaks through the default output device
pub struct SpeakerSynthesizer {
    tts: TextToSpeech,
}

impl SpeakerSynthesizer {
    #[must_use]
    pub const fn new(tts: TextToSpeech) -> Self {
        Self { tts }
    }
}

#[async_trait]
impl Synthesizer for SpeakerSynthesizer {
    async fn say(&self, text: &str) -> Result<()> {
        let audio = self.tts.synthesize(text).await?;

        tokio::task::spawn_blocking(move || AudioPlayback::play_mp3(&audio))
            .await
            .map_err(|e| Error::Audio(format!("playback task failed: {e}")))?
    }
}

/// Hands back a fixed transcript instead of recording
///
/// Lets a typed command travel the same path as a spoken one.
pub struct TypedListener {
    transcript: String,
}

impl TypedListener {
    #[must_use]
    pub fn new(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
        }
    }
}

#[async_trait]
impl Listener for TypedListener {
    async fn capture(&self) -> std::result::Result<String, ListenError> {
        if self.transcript.trim().is_empty() {
            return Err(ListenError::NotUnderstood);
        }
        Ok(self.transcript.clone())
    }
}
