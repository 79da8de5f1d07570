//! Voice processing module
//!
//! Handles audio capture, phrase detection, STT, TTS and playback, exposed to
//! the rest of the crate through the [`SpeechIo`] adapter.

mod capture;
mod detector;
mod local;
mod playback;
mod speech;
mod stt;
mod tts;
mod wake_word;

pub use capture::{AudioCapture, SAMPLE_RATE, record_phrase, samples_to_wav};
pub use detector::{PhraseDetector, PhraseState, calculate_energy, calibrate_threshold};
pub use local::{MicrophoneListener, SpeakerSynthesizer, TypedListener};
pub use playback::{AudioPlayback, DecodedAudio, PLAYBACK_SAMPLE_RATE, decode_mp3};
pub use speech::{Listener, SpeechIo, Synthesizer};
pub use stt::{SpeechToText, classify_failure};
pub use tts::TextToSpeech;
pub use wake_word::Utterance;
