//! TOML configuration file loading
//!
//! Supports `~/.config/herald/config.toml` (or `$HERALD_CONFIG`) as a persistent config source.
//! All fields are optional; the file is a partial overlay on top of defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::Result;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct HeraldConfigFile {
    /// Assistant identity
    #[serde(default)]
    pub assistant: AssistantFileConfig,

    /// Voice/audio configuration
    #[serde(default)]
    pub voice: VoiceFileConfig,

    /// Headline provider configuration
    #[serde(default)]
    pub news: NewsFileConfig,

    /// Joke provider configuration
    #[serde(default)]
    pub jokes: JokesFileConfig,

    /// API keys for external services
    #[serde(default)]
    pub api_keys: ApiKeysFileConfig,

    /// Server configuration
    #[serde(default)]
    pub server: ServerFileConfig,
}

/// Assistant identity
#[derive(Debug, Default, Deserialize)]
pub struct AssistantFileConfig {
    /// Display name used in acknowledgments (e.g. "Alexa")
    pub name: Option<String>,

    /// Wake words stripped from transcripts
    pub wake_words: Option<Vec<String>>,
}

/// Voice processing configuration
#[derive(Debug, Default, Deserialize)]
pub struct VoiceFileConfig {
    /// STT provider ("whisper" or "deepgram")
    pub stt_provider: Option<String>,

    /// STT model (e.g. "whisper-1")
    pub stt_model: Option<String>,

    /// TTS provider ("openai" or "elevenlabs")
    pub tts_provider: Option<String>,

    /// TTS model (e.g. "tts-1")
    pub tts_model: Option<String>,

    /// TTS voice identifier (e.g. "nova")
    pub tts_voice: Option<String>,

    /// TTS speed multiplier
    pub tts_speed: Option<f32>,

    /// Ambient noise calibration period
    pub calibration_secs: Option<f64>,

    /// How long to wait for speech to start
    pub onset_timeout_secs: Option<f64>,

    /// Maximum phrase duration once speech started
    pub phrase_limit_secs: Option<f64>,

    /// Lowest RMS energy considered speech
    pub energy_floor: Option<f32>,
}

/// Headline provider configuration
#[derive(Debug, Default, Deserialize)]
pub struct NewsFileConfig {
    /// API key (prefer the `NEWS_API_KEY` env var)
    pub api_key: Option<String>,

    /// Two-letter country code for top headlines
    pub country: Option<String>,

    /// Number of headlines read out
    pub max_headlines: Option<usize>,

    /// Pause after each headline
    pub headline_pause_secs: Option<f64>,
}

/// Joke provider configuration
#[derive(Debug, Default, Deserialize)]
pub struct JokesFileConfig {
    /// "bundled" or "icanhazdadjoke"
    pub source: Option<String>,
}

/// API keys configuration
#[derive(Debug, Default, Deserialize)]
pub struct ApiKeysFileConfig {
    pub openai: Option<String>,
    pub deepgram: Option<String>,
    pub elevenlabs: Option<String>,
}

/// Server configuration
#[derive(Debug, Default, Deserialize)]
pub struct ServerFileConfig {
    /// Address to bind
    pub host: Option<String>,

    /// Port to listen on
    pub port: Option<u16>,
}

/// Load the TOML config file from the standard path
///
/// Returns `HeraldConfigFile::default()` if the file doesn't exist or can't be parsed.
pub fn load_config_file() -> HeraldConfigFile {
    let Some(path) = config_file_path() else {
        return HeraldConfigFile::default();
    };

    if !path.exists() {
        return HeraldConfigFile::default();
    }

    match read_config_file(&path) {
        Ok(config) => {
            tracing::info!(path = %path.display(), "loaded config file");
            config
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "failed to load config file, using defaults"
            );
            HeraldConfigFile::default()
        }
    }
}

/// Read and parse a config file
///
/// # Errors
///
/// Returns error if the file cannot be read or is not valid TOML
pub fn read_config_file(path: &Path) -> Result<HeraldConfigFile> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Return the config file path: `$HERALD_CONFIG` or `~/.config/herald/config.toml`
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("HERALD_CONFIG") {
        return Some(PathBuf::from(path));
    }

    directories::BaseDirs::new().map(|d| d.config_dir().join("herald").join("config.toml"))
}
