//! Audio capture from microphone

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, Stream};

use super::detector::{PhraseDetector, PhraseState, calibrate_threshold};
use crate::config::CaptureSettings;
use crate::{Error, ListenError, Result};

/// Sample rate for audio capture (16kHz for speech)
pub const SAMPLE_RATE: u32 = 16000;

/// How often the capture buffer is drained while recording
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// An open input stream from the default input device
///
/// Capture stops when the value is dropped.
pub struct AudioCapture {
    buffer: Arc<Mutex<Vec<f32>>>,
    _stream: Stream,
}

impl AudioCapture {
    /// Open the default input device and start capturing
    ///
    /// # Errors
    ///
    /// Returns error if no suitable input device can be opened
    pub fn open() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| Error::Audio("no input device available".to_string()))?;

        let config = device
            .supported_input_configs()
            .map_err(|e| Error::Audio(e.to_string()))?
            .find(|c| {
                c.channels() == 1
                    && c.min_sample_rate() <= SampleRate(SAMPLE_RATE)
                    && c.max_sample_rate() >= SampleRate(SAMPLE_RATE)
            })
            .ok_or_else(|| Error::Audio("no mono 16kHz input config".to_string()))?
            .with_sample_rate(SampleRate(SAMPLE_RATE))
            .config();

        let buffer = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&buffer);

        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = sink.lock() {
                        buf.extend_from_slice(data);
                    }
                },
                |err| {
                    tracing::error!(error = %err, "audio capture error");
                },
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?;

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = SAMPLE_RATE,
            "audio capture started"
        );

        Ok(Self {
            buffer,
            _stream: stream,
        })
    }

    /// Take the samples captured since the last call
    #[must_use]
    pub fn take_buffer(&self) -> Vec<f32> {
        self.buffer
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default()
    }
}

/// Record a single phrase from the default input device
///
/// Blocks the calling thread: calibrates against ambient noise, waits for
/// speech onset and records until the phrase ends. Run on a blocking thread.
///
/// # Errors
///
/// Returns `ListenError::Other` if the device cannot be opened or no speech
/// starts before the onset timeout, even when the device stops delivering
/// samples
pub fn record_phrase(settings: &CaptureSettings) -> std::result::Result<Vec<f32>, ListenError> {
    let capture = AudioCapture::open().map_err(|e| ListenError::Other(e.to_string()))?;

    std::thread::sleep(settings.calibration);
    let ambient = capture.take_buffer();
    let threshold = calibrate_threshold(&ambient, settings.energy_floor);
    tracing::debug!(threshold, ambient_samples = ambient.len(), "calibrated");

    let mut detector = PhraseDetector::new(threshold, settings, SAMPLE_RATE);
    tracing::info!("listening");
    let started = Instant::now();

    loop {
        std::thread::sleep(POLL_INTERVAL);

        detector.process(&capture.take_buffer());
        match detector.expire(started.elapsed()) {
            PhraseState::Complete => {
                let phrase = detector.take_phrase();
                tracing::debug!(samples = phrase.len(), "phrase captured");
                return Ok(phrase);
            }
            PhraseState::TimedOut => {
                return Err(ListenError::Other(
                    "timed out waiting for speech".to_string(),
                ));
            }
            PhraseState::Waiting | PhraseState::Speaking => {}
        }
    }
}

/// Convert f32 samples to 16-bit mono WAV bytes for STT APIs
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    let mut writer =
        hound::WavWriter::new(&mut cursor, spec).map_err(|e| Error::Audio(e.to_string()))?;

    for &sample in samples {
        #[allow(clippy::cast_possible_truncation)]
        let pcm = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
        writer
            .write_sample(pcm)
            .map_err(|e| Error::Audio(e.to_string()))?;
    }

    writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;

    Ok(cursor.into_inner())
}
