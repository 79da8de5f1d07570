//! Phrase detection
//!
//! Energy-based segmentation of a live audio stream into a single spoken
//! phrase: wait for speech onset, record until a pause or the phrase limit.

use std::time::Duration;

use crate::config::CaptureSettings;

/// Ambient energy multiplier applied after calibration
const AMBIENT_RATIO: f32 = 1.5;

/// Silence that ends a phrase (0.8s at 16kHz)
const END_SILENCE_SAMPLES: usize = 12_800;

/// Voiced audio needed before a pause counts as a phrase (0.3s at 16kHz)
const MIN_PHRASE_SAMPLES: usize = 4800;

/// State of the phrase detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhraseState {
    /// No speech yet
    Waiting,
    /// Speech started, recording
    Speaking,
    /// A full phrase was recorded
    Complete,
    /// No speech started before the onset timeout
    TimedOut,
}

/// Splits incoming audio into one phrase
pub struct PhraseDetector {
    threshold: f32,
    state: PhraseState,
    buffer: Vec<f32>,
    waited: usize,
    voiced: usize,
    silence: usize,
    onset_limit: usize,
    phrase_limit: usize,
    onset_timeout: Duration,
    listen_timeout: Duration,
}

impl PhraseDetector {
    /// Create a detector for one `listen` call
    ///
    /// `threshold` is the RMS energy above which a chunk counts as speech.
    #[must_use]
    pub fn new(threshold: f32, settings: &CaptureSettings, sample_rate: u32) -> Self {
        tracing::debug!(threshold, ?settings, "phrase detector initialized");

        Self {
            threshold,
            state: PhraseState::Waiting,
            buffer: Vec::new(),
            waited: 0,
            voiced: 0,
            silence: 0,
            onset_limit: duration_to_samples(settings.onset_timeout, sample_rate),
            phrase_limit: duration_to_samples(settings.phrase_limit, sample_rate),
            onset_timeout: settings.onset_timeout,
            listen_timeout: settings.onset_timeout + settings.phrase_limit,
        }
    }

    /// Apply wall-clock limits, given the time since listening started
    ///
    /// Covers a stalled device, where sample counts stop advancing. A phrase
    /// in progress when the overall limit passes is returned as recorded.
    pub fn expire(&mut self, elapsed: Duration) -> PhraseState {
        match self.state {
            PhraseState::Waiting if elapsed >= self.onset_timeout => {
                tracing::debug!(?elapsed, "no speech before deadline");
                self.state = PhraseState::TimedOut;
            }
            PhraseState::Speaking if elapsed >= self.listen_timeout => {
                tracing::debug!(?elapsed, samples = self.buffer.len(), "phrase deadline reached");
                self.state = PhraseState::Complete;
            }
            _ => {}
        }

        self.state
    }

    /// Feed a chunk of samples and return the resulting state
    pub fn process(&mut self, samples: &[f32]) -> PhraseState {
        let energy = calculate_energy(samples);
        let is_speech = energy > self.threshold;

        match self.state {
            PhraseState::Waiting => {
                if is_speech {
                    self.state = PhraseState::Speaking;
                    self.buffer.clear();
                    self.buffer.extend_from_slice(samples);
                    self.voiced = samples.len();
                    self.silence = 0;
                    tracing::trace!(energy, "speech onset");
                } else {
                    self.waited += samples.len();
                    if self.waited >= self.onset_limit {
                        tracing::debug!(waited = self.waited, "no speech before timeout");
                        self.state = PhraseState::TimedOut;
                    }
                }
            }
            PhraseState::Speaking => {
                self.buffer.extend_from_slice(samples);

                if is_speech {
                    self.voiced += samples.len();
                    self.silence = 0;
                } else {
                    self.silence += samples.len();
                }

                if self.buffer.len() >= self.phrase_limit {
                    tracing::debug!(samples = self.buffer.len(), "phrase limit reached");
                    self.buffer.truncate(self.phrase_limit);
                    self.state = PhraseState::Complete;
                } else if self.silence >= END_SILENCE_SAMPLES {
                    if self.voiced >= MIN_PHRASE_SAMPLES {
                        tracing::debug!(samples = self.buffer.len(), "phrase complete");
                        self.state = PhraseState::Complete;
                    } else {
                        // Too short to be a phrase, keep waiting
                        tracing::trace!(voiced = self.voiced, "discarding blip");
                        self.waited += self.buffer.len();
                        self.buffer.clear();
                        self.state = if self.waited >= self.onset_limit {
                            PhraseState::TimedOut
                        } else {
                            PhraseState::Waiting
                        };
                    }
                }
            }
            PhraseState::Complete | PhraseState::TimedOut => {}
        }

        self.state
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> PhraseState {
        self.state
    }

    /// Take the recorded phrase
    pub fn take_phrase(&mut self) -> Vec<f32> {
        std::mem::take(&mut self.buffer)
    }
}

/// RMS energy of a chunk
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn calculate_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Speech threshold derived from ambient noise captured during calibration
#[must_use]
pub fn calibrate_threshold(ambient: &[f32], floor: f32) -> f32 {
    (calculate_energy(ambient) * AMBIENT_RATIO).max(floor)
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn duration_to_samples(duration: Duration, sample_rate: u32) -> usize {
    (duration.as_secs_f64() * f64::from(sample_rate)) as usize
}
