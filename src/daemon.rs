//! Daemon - the main herald service
//!
//! Wires speech I/O, the lookup services and the dispatcher into a pipeline
//! and serves the trigger endpoint until interrupted.

use std::sync::Arc;

use crate::api::{ApiServer, ApiState};
use crate::config::{JokeSource, SttProvider, TtsProvider};
use crate::dispatch::{DispatchSettings, Dispatcher, Services};
use crate::pipeline::Pipeline;
use crate::services::{
    BundledJokes, DadJokeApi, HeadlineProvider, JokeProvider, NewsApi, Wikipedia, YouTube,
};
use crate::voice::{
    Listener, MicrophoneListener, SpeakerSynthesizer, SpeechIo, SpeechToText, TextToSpeech,
};
use crate::{Config, Result};

/// The herald daemon
pub struct Daemon {
    config: Config,
}

impl Daemon {
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Loaded configuration
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Listener recording from the default microphone
    ///
    /// # Errors
    ///
    /// Returns error if the STT provider's API key is missing
    pub fn microphone(&self) -> Result<Box<dyn Listener>> {
        let voice = &self.config.voice;
        let key = match voice.stt_provider {
            SttProvider::Whisper => self.config.api_keys.openai.clone(),
            SttProvider::Deepgram => self.config.api_keys.deepgram.clone(),
        };
        let stt = SpeechToText::new(voice.stt_provider, key, voice.stt_model.clone())?;
        Ok(Box::new(MicrophoneListener::new(stt, voice.capture)))
    }

    /// Speech synthesis through the configured TTS provider
    ///
    /// # Errors
    ///
    /// Returns error if the TTS provider's API key is missing
    pub fn text_to_speech(&self) -> Result<TextToSpeech> {
        let key = match self.config.voice.tts_provider {
            TtsProvider::OpenAI => self.config.api_keys.openai.clone(),
            TtsProvider::ElevenLabs => self.config.api_keys.elevenlabs.clone(),
        };
        TextToSpeech::new(&self.config.voice, key)
    }

    /// Build the lookup services from configuration
    ///
    /// # Errors
    ///
    /// Returns error if an HTTP client cannot be built
    pub fn services(&self) -> Result<Services> {
        let headlines: Option<Arc<dyn HeadlineProvider>> = match &self.config.news.api_key {
            Some(key) => Some(Arc::new(NewsApi::new(
                key.clone(),
                self.config.news.country.clone(),
            )?)),
            None => {
                tracing::warn!("NEWS_API_KEY not set, news requests will be apologized for");
                None
            }
        };

        let jokes: Arc<dyn JokeProvider> = match self.config.jokes {
            JokeSource::Bundled => Arc::new(BundledJokes),
            JokeSource::DadJokeApi => Arc::new(DadJokeApi::new()?),
        };

        Ok(Services {
            media: Arc::new(YouTube::new()?),
            encyclopedia: Arc::new(Wikipedia::new()?),
            headlines,
            jokes,
        })
    }

    /// Assemble a pipeline around the given listener
    ///
    /// # Errors
    ///
    /// Returns error if synthesis or a service cannot be set up
    pub fn pipeline(&self, listener: Box<dyn Listener>) -> Result<Arc<Pipeline>> {
        let synthesizer = SpeakerSynthesizer::new(self.text_to_speech()?);
        let speech = Arc::new(SpeechIo::new(
            listener,
            Box::new(synthesizer),
            self.config.assistant.wake_words.clone(),
        ));

        let dispatcher = Dispatcher::new(
            Arc::clone(&speech),
            self.services()?,
            DispatchSettings::from(&self.config),
        );

        Ok(Arc::new(Pipeline::new(speech, dispatcher)))
    }

    /// Serve the trigger endpoint until Ctrl-C
    ///
    /// # Errors
    ///
    /// Returns error if setup fails or the server cannot bind
    pub async fn run(self) -> Result<()> {
        let pipeline = self.pipeline(self.microphone()?)?;

        let state = ApiState {
            pipeline,
            assistant_name: self.config.assistant.name.clone(),
            news_configured: self.config.news.api_key.is_some(),
        };

        tracing::info!(
            assistant = %self.config.assistant.name,
            wake_words = ?self.config.assistant.wake_words,
            stt = ?self.config.voice.stt_provider,
            tts = ?self.config.voice.tts_provider,
            "daemon running"
        );

        let server = ApiServer::new(state, &self.config.api_server);
        server.run(shutdown_signal()).await?;

        tracing::info!("daemon stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}
