//! Speech-to-text (STT) processing

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};

use crate::config::SttProvider;
use crate::{Error, ListenError, Result};

/// Response from OpenAI Whisper transcription API
#[derive(serde::Deserialize)]
struct WhisperResponse {
    text: String,
}

/// Response from Deepgram transcription API
#[derive(serde::Deserialize)]
struct DeepgramResponse {
    results: DeepgramResults,
}

#[derive(serde::Deserialize)]
struct DeepgramResults {
    channels: Vec<DeepgramChannel>,
}

#[derive(serde::Deserialize)]
struct DeepgramChannel {
    alternatives: Vec<DeepgramAlternative>,
}

#[derive(serde::Deserialize)]
struct DeepgramAlternative {
    transcript: String,
}

/// Transcribes speech to text
pub struct SpeechToText {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    provider: SttProvider,
}

impl SpeechToText {
    /// Create a new STT client
    ///
    /// # Errors
    ///
    /// Returns error if the provider's API key is missing
    pub fn new(provider: SttProvider, api_key: Option<SecretString>, model: String) -> Result<Self> {
        let api_key = api_key.ok_or_else(|| {
            Error::Config(match provider {
                SttProvider::Whisper => "OPENAI_API_KEY required for Whisper".to_string(),
                SttProvider::Deepgram => "DEEPGRAM_API_KEY required for Deepgram".to_string(),
            })
        })?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            model,
            provider,
        })
    }

    /// Transcribe WAV audio to text
    ///
    /// # Errors
    ///
    /// `NotUnderstood` when the service could not make out any words,
    /// `ServiceUnavailable` when it could not be reached, `Other` otherwise
    pub async fn transcribe(&self, wav: Vec<u8>) -> std::result::Result<String, ListenError> {
        tracing::debug!(audio_bytes = wav.len(), provider = ?self.provider, "starting transcription");

        let transcript = match self.provider {
            SttProvider::Whisper => self.transcribe_whisper(wav).await?,
            SttProvider::Deepgram => self.transcribe_deepgram(wav).await?,
        };

        let transcript = transcript.trim();
        if transcript.is_empty() {
            return Err(ListenError::NotUnderstood);
        }

        tracing::info!(transcript, "transcription complete");
        Ok(transcript.to_string())
    }

    /// Transcribe using OpenAI Whisper
    async fn transcribe_whisper(&self, wav: Vec<u8>) -> std::result::Result<String, ListenError> {
        let part = reqwest::multipart::Part::bytes(wav)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| ListenError::Other(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone());

        let response = self
            .client
            .post("https://api.openai.com/v1/audio/transcriptions")
            .bearer_auth(self.api_key.expose_secret())
            .multipart(form)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Whisper request failed"))?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "Whisper API error");
            return Err(classify_failure(status, &body));
        }

        parse_whisper(&body)
    }

    /// Transcribe using Deepgram
    async fn transcribe_deepgram(&self, wav: Vec<u8>) -> std::result::Result<String, ListenError> {
        let url = format!(
            "https://api.deepgram.com/v1/listen?model={}&punctuate=true",
            urlencoding::encode(&self.model)
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Token {}", self.api_key.expose_secret()))
            .header("Content-Type", "audio/wav")
            .body(wav)
            .send()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "Deepgram request failed"))?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "Deepgram API error");
            return Err(classify_failure(status, &body));
        }

        parse_deepgram(&body)
    }
}

/// Map an unsuccessful STT response to the capture error taxonomy
#[must_use]
pub fn classify_failure(status: StatusCode, body: &str) -> ListenError {
    if status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
    {
        ListenError::ServiceUnavailable(format!("STT service returned {status}"))
    } else if status == StatusCode::BAD_REQUEST
        || status == StatusCode::UNSUPPORTED_MEDIA_TYPE
        || status == StatusCode::UNPROCESSABLE_ENTITY
    {
        ListenError::NotUnderstood
    } else {
        ListenError::Other(format!("STT service returned {status}: {body}"))
    }
}

fn parse_whisper(body: &str) -> std::result::Result<String, ListenError> {
    serde_json::from_str::<WhisperResponse>(body)
        .map(|r| r.text)
        .map_err(|e| ListenError::Other(format!("invalid Whisper response: {e}")))
}

fn parse_deepgram(body: &str) -> std::result::Result<String, ListenError> {
    let response: DeepgramResponse = serde_json::from_str(body)
        .map_err(|e| ListenError::Other(format!("invalid Deepgram response: {e}")))?;

    Ok(response
        .results
        .channels
        .into_iter()
        .next()
        .and_then(|c| c.alternatives.into_iter().next())
        .map(|a| a.transcript)
        .unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_is_config_error() {
        let result = SpeechToText::new(SttProvider::Whisper, None, "whisper-1".to_string());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_classify_failure() {
        assert!(matches!(
            classify_failure(StatusCode::SERVICE_UNAVAILABLE, ""),
            ListenError::ServiceUnavailable(_)
        ));
        assert!(matches!(
            classify_failure(StatusCode::TOO_MANY_REQUESTS, ""),
            ListenError::ServiceUnavailable(_)
        ));
        assert_eq!(
            classify_failure(StatusCode::BAD_REQUEST, "invalid audio"),
            ListenError::NotUnderstood
        );
        assert!(matches!(
            classify_failure(StatusCode::UNAUTHORIZED, "bad key"),
            ListenError::Other(_)
        ));
    }

    #[test]
    fn test_parse_whisper() {
        assert_eq!(
            parse_whisper(r#"{"text": "Alexa, what time is it?"}"#).unwrap(),
            "Alexa, what time is it?"
        );
        assert!(matches!(parse_whisper("not json"), Err(ListenError::Other(_))));
    }

    #[test]
    fn test_parse_deepgram() {
        let body = r#"{"results":{"channels":[{"alternatives":[{"transcript":"play jazz","confidence":0.9}]}]}}"#;
        assert_eq!(parse_deepgram(body).unwrap(), "play jazz");

        let empty = r#"{"results":{"channels":[]}}"#;
        assert_eq!(parse_deepgram(empty).unwrap(), "");
    }
}
