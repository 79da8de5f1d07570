//! Text-to-speech (TTS) processing

use secrecy::{ExposeSecret, SecretString};

use crate::config::{TtsProvider, VoiceConfig};
use crate::{Error, Result};

/// `ElevenLabs` output encoding at the default playback rate
const ELEVENLABS_OUTPUT_FORMAT: &str = "mp3_24000_48";

/// Synthesizes speech from text
pub struct TextToSpeech {
    client: reqwest::Client,
    api_key: SecretString,
    voice: String,
    speed: f32,
    model: String,
    provider: TtsProvider,
}

impl TextToSpeech {
    /// Create a new TTS client from voice settings
    ///
    /// # Errors
    ///
    /// Returns error if the provider's API key is missing
    pub fn new(config: &VoiceConfig, api_key: Option<SecretString>) -> Result<Self> {
        let api_key = api_key.ok_or_else(|| {
            Error::Config(match config.tts_provider {
                TtsProvider::OpenAI => "OPENAI_API_KEY required for TTS".to_string(),
                TtsProvider::ElevenLabs => "ELEVENLABS_API_KEY required for TTS".to_string(),
            })
        })?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            voice: config.tts_voice.clone(),
            speed: config.tts_speed,
            model: config.tts_model.clone(),
            provider: config.tts_provider,
        })
    }

    /// Synthesize text to MP3 audio
    ///
    /// # Errors
    ///
    /// Returns error if synthesis fails
    pub async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let request = match self.provider {
            TtsProvider::OpenAI => self.openai_request(text),
            TtsProvider::ElevenLabs => self.elevenlabs_request(text),
        };

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, provider = ?self.provider, "TTS API error");
            return Err(Error::Tts(format!("{:?} TTS error {status}: {body}", self.provider)));
        }

        let audio = response.bytes().await?;
        tracing::debug!(audio_bytes = audio.len(), "synthesized");
        Ok(audio.to_vec())
    }

    fn openai_request(&self, text: &str) -> reqwest::RequestBuilder {
        #[derive(serde::Serialize)]
        struct SpeechRequest<'a> {
            model: &'a str,
            input: &'a str,
            voice: &'a str,
            speed: f32,
        }

        self.client
            .post("https://api.openai.com/v1/audio/speech")
            .bearer_auth(self.api_key.expose_secret())
            .json(&SpeechRequest {
                model: &self.model,
                input: text,
                voice: &self.voice,
                speed: self.speed,
            })
    }

    fn elevenlabs_request(&self, text: &str) -> reqwest::RequestBuilder {
        #[derive(serde::Serialize)]
        struct SpeechRequest<'a> {
            text: &'a str,
            model_id: &'a str,
        }

        let url = format!(
            "https://api.elevenlabs.io/v1/text-to-speech/{}",
            urlencoding::encode(&self.voice)
        );

        self.client
            .post(&url)
            .query(&[("output_format", ELEVENLABS_OUTPUT_FORMAT)])
            .header("xi-api-key", self.api_key.expose_secret())
            .header("Accept", "audio/mpeg")
            .json(&SpeechRequest {
                text,
                model_id: &self.model,
            })
    }
}
