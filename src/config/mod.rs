//! Configuration management for Herald

pub mod file;

use std::time::Duration;

use secrecy::SecretString;

use crate::{Error, Result};

use file::HeraldConfigFile;

/// Default assistant name
pub const DEFAULT_ASSISTANT_NAME: &str = "Alexa";

/// Default API server port
pub const DEFAULT_PORT: u16 = 5000;

/// Herald configuration
#[derive(Debug)]
pub struct Config {
    /// Assistant identity
    pub assistant: AssistantConfig,

    /// Voice configuration
    pub voice: VoiceConfig,

    /// Headline provider configuration
    pub news: NewsConfig,

    /// Where jokes come from
    pub jokes: JokeSource,

    /// HTTP API server configuration
    pub api_server: ApiServerConfig,

    /// API keys
    pub api_keys: ApiKeys,
}

/// Assistant identity
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Display name (used in the trigger acknowledgment)
    pub name: String,

    /// Lower-cased wake words stripped from transcripts
    pub wake_words: Vec<String>,
}

/// HTTP API server configuration
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    /// Address to bind
    pub host: String,

    /// Port to listen on
    pub port: u16,
}

/// Speech-to-text backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SttProvider {
    Whisper,
    Deepgram,
}

/// Text-to-speech backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtsProvider {
    OpenAI,
    ElevenLabs,
}

/// Joke provider backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JokeSource {
    /// Offline list shipped with the binary
    #[default]
    Bundled,
    /// icanhazdadjoke.com
    DadJokeApi,
}

/// Voice processing configuration
#[derive(Debug, Clone)]
pub struct VoiceConfig {
    /// STT backend
    pub stt_provider: SttProvider,

    /// STT model (e.g. "whisper-1", "nova-2")
    pub stt_model: String,

    /// TTS backend
    pub tts_provider: TtsProvider,

    /// TTS model (e.g. "tts-1", "eleven_monolingual_v1")
    pub tts_model: String,

    /// TTS voice identifier
    pub tts_voice: String,

    /// TTS speed multiplier (0.25 to 4.0)
    pub tts_speed: f32,

    /// Capture timings
    pub capture: CaptureSettings,
}

/// Timings and thresholds for a single `listen` call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureSettings {
    /// Ambient noise calibration period
    pub calibration: Duration,

    /// How long to wait for speech to start
    pub onset_timeout: Duration,

    /// Maximum phrase length once speech started
    pub phrase_limit: Duration,

    /// Lowest RMS energy treated as speech
    pub energy_floor: f32,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            calibration: Duration::from_secs(1),
            onset_timeout: Duration::from_secs(5),
            phrase_limit: Duration::from_secs(7),
            energy_floor: 0.02,
        }
    }
}

/// Headline provider configuration
#[derive(Debug)]
pub struct NewsConfig {
    /// NewsAPI key; no default
    pub api_key: Option<SecretString>,

    /// Two-letter country code
    pub country: String,

    /// Headlines read per request
    pub max_headlines: usize,

    /// Pause after each headline
    pub headline_pause: Duration,
}

/// API keys for speech services
#[derive(Debug, Default)]
pub struct ApiKeys {
    /// `OpenAI` API key (Whisper and TTS)
    pub openai: Option<SecretString>,

    /// `Deepgram` API key (optional STT)
    pub deepgram: Option<SecretString>,

    /// `ElevenLabs` API key (optional TTS)
    pub elevenlabs: Option<SecretString>,
}

impl Config {
    /// Load configuration from the environment and the TOML config file
    ///
    /// Precedence: env > toml > default.
    ///
    /// # Errors
    ///
    /// Returns error if a provider name is not recognized
    pub fn load() -> Result<Self> {
        let fc = file::load_config_file();
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Build configuration from a parsed config file and an env lookup
    ///
    /// # Errors
    ///
    /// Returns error if a provider name is not recognized
    pub fn from_sources(fc: HeraldConfigFile, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let secret = |key: &str, fallback: Option<String>| {
            env(key)
                .or(fallback)
                .filter(|v| !v.trim().is_empty())
                .map(SecretString::from)
        };

        let api_keys = ApiKeys {
            openai: secret("OPENAI_API_KEY", fc.api_keys.openai),
            deepgram: secret("DEEPGRAM_API_KEY", fc.api_keys.deepgram),
            elevenlabs: secret("ELEVENLABS_API_KEY", fc.api_keys.elevenlabs),
        };

        let name = fc
            .assistant
            .name
            .unwrap_or_else(|| DEFAULT_ASSISTANT_NAME.to_string());
        let wake_words = env("HERALD_WAKE_WORDS")
            .map(|v| v.split(',').map(ToString::to_string).collect())
            .or(fc.assistant.wake_words)
            .unwrap_or_else(|| vec![name.clone()]);
        let assistant = AssistantConfig {
            wake_words: normalize_wake_words(wake_words),
            name,
        };

        let api_server = ApiServerConfig {
            host: env("HERALD_HOST")
                .or(fc.server.host)
                .unwrap_or_else(|| "127.0.0.1".to_string()),
            port: env("HERALD_PORT")
                .and_then(|s| s.parse().ok())
                .or(fc.server.port)
                .unwrap_or(DEFAULT_PORT),
        };

        let stt_provider = parse_stt_provider(
            &env("HERALD_STT_PROVIDER")
                .or(fc.voice.stt_provider)
                .unwrap_or_else(|| "whisper".to_string()),
        )?;
        let tts_provider = parse_tts_provider(
            &env("HERALD_TTS_PROVIDER")
                .or(fc.voice.tts_provider)
                .unwrap_or_else(|| "openai".to_string()),
        )?;

        let defaults = CaptureSettings::default();
        let voice = VoiceConfig {
            stt_provider,
            stt_model: env("HERALD_STT_MODEL")
                .or(fc.voice.stt_model)
                .unwrap_or_else(|| default_stt_model(stt_provider).to_string()),
            tts_provider,
            tts_model: env("HERALD_TTS_MODEL")
                .or(fc.voice.tts_model)
                .unwrap_or_else(|| default_tts_model(tts_provider).to_string()),
            tts_voice: env("HERALD_TTS_VOICE")
                .or(fc.voice.tts_voice)
                .unwrap_or_else(|| "nova".to_string()),
            tts_speed: fc.voice.tts_speed.unwrap_or(1.0).clamp(0.25, 4.0),
            capture: CaptureSettings {
                calibration: secs_or(fc.voice.calibration_secs, defaults.calibration),
                onset_timeout: secs_or(fc.voice.onset_timeout_secs, defaults.onset_timeout),
                phrase_limit: secs_or(fc.voice.phrase_limit_secs, defaults.phrase_limit),
                energy_floor: fc.voice.energy_floor.unwrap_or(defaults.energy_floor),
            },
        };

        let news = NewsConfig {
            api_key: secret("NEWS_API_KEY", fc.news.api_key),
            country: env("HERALD_NEWS_COUNTRY")
                .or(fc.news.country)
                .unwrap_or_else(|| "us".to_string()),
            max_headlines: fc.news.max_headlines.unwrap_or(3),
            headline_pause: secs_or(fc.news.headline_pause_secs, Duration::from_secs(1)),
        };

        let jokes = match fc.jokes.source.as_deref() {
            None | Some("bundled") => JokeSource::Bundled,
            Some("icanhazdadjoke") => JokeSource::DadJokeApi,
            Some(other) => {
                return Err(Error::Config(format!("unknown joke source: {other}")));
            }
        };

        Ok(Self {
            assistant,
            voice,
            news,
            jokes,
            api_server,
            api_keys,
        })
    }
}

fn parse_stt_provider(name: &str) -> Result<SttProvider> {
    match name.to_lowercase().as_str() {
        "whisper" | "openai" => Ok(SttProvider::Whisper),
        "deepgram" => Ok(SttProvider::Deepgram),
        other => Err(Error::Config(format!("unknown STT provider: {other}"))),
    }
}

fn parse_tts_provider(name: &str) -> Result<TtsProvider> {
    match name.to_lowercase().as_str() {
        "openai" => Ok(TtsProvider::OpenAI),
        "elevenlabs" => Ok(TtsProvider::ElevenLabs),
        other => Err(Error::Config(format!("unknown TTS provider: {other}"))),
    }
}

const fn default_stt_model(provider: SttProvider) -> &'static str {
    match provider {
        SttProvider::Whisper => "whisper-1",
        SttProvider::Deepgram => "nova-2",
    }
}

const fn default_tts_model(provider: TtsProvider) -> &'static str {
    match provider {
        TtsProvider::OpenAI => "tts-1",
        TtsProvider::ElevenLabs => "eleven_monolingual_v1",
    }
}

fn secs_or(secs: Option<f64>, default: Duration) -> Duration {
    secs.filter(|s| s.is_finite() && *s >= 0.0)
        .map_or(default, Duration::from_secs_f64)
}

fn normalize_wake_words(words: Vec<String>) -> Vec<String> {
    words
        .into_iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}
