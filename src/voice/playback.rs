//! Audio playback to speakers

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleRate, StreamConfig};

use crate::{Error, Result};

/// Default playback sample rate (matches requested TTS output)
pub const PLAYBACK_SAMPLE_RATE: u32 = 24000;

/// Mono samples decoded from a compressed stream
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Plays audio to the default output device
///
/// All playback is blocking; call from a blocking thread.
pub struct AudioPlayback {
    device: Device,
    config: StreamConfig,
    sample_rate: u32,
}

impl AudioPlayback {
    /// Open the default output device at the default playback rate
    ///
    /// # Errors
    ///
    /// Returns error if no suitable output device can be opened
    pub fn open() -> Result<Self> {
        Self::open_at(PLAYBACK_SAMPLE_RATE)
    }

    /// Open the default output device at `sample_rate`
    ///
    /// # Errors
    ///
    /// Returns error if no suitable output device can be opened
    pub fn open_at(sample_rate: u32) -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Audio("no output device available".to_string()))?;

        let supports_rate = |c: &cpal::SupportedStreamConfigRange| {
            c.min_sample_rate() <= SampleRate(sample_rate)
                && c.max_sample_rate() >= SampleRate(sample_rate)
        };

        // Prefer mono, fall back to stereo
        let supported = [1, 2]
            .into_iter()
            .find_map(|channels| {
                device
                    .supported_output_configs()
                    .ok()?
                    .find(|c| c.channels() == channels && supports_rate(c))
            })
            .ok_or_else(|| {
                Error::Audio(format!("no output config supports {sample_rate}Hz"))
            })?;

        let config = supported.with_sample_rate(SampleRate(sample_rate)).config();

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate,
            channels = config.channels,
            "audio playback initialized"
        );

        Ok(Self {
            device,
            config,
            sample_rate,
        })
    }

    /// Play mono samples and wait for playback to finish
    ///
    /// # Errors
    ///
    /// Returns error if the output stream fails
    pub fn play(&self, samples: Vec<f32>) -> Result<()> {
        if samples.is_empty() {
            return Ok(());
        }

        let channels = usize::from(self.config.channels);
        let total = samples.len();
        let samples = Arc::new(samples);
        let position = Arc::new(AtomicUsize::new(0));
        let finished = Arc::new(AtomicBool::new(false));

        let stream = {
            let samples = Arc::clone(&samples);
            let position = Arc::clone(&position);
            let finished = Arc::clone(&finished);

            self.device
                .build_output_stream(
                    &self.config,
                    move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                        for frame in data.chunks_mut(channels) {
                            let pos = position.load(Ordering::Relaxed);
                            let sample = samples.get(pos).copied().unwrap_or_else(|| {
                                finished.store(true, Ordering::Release);
                                0.0
                            });
                            frame.fill(sample);
                            if pos < samples.len() {
                                position.store(pos + 1, Ordering::Relaxed);
                            }
                        }
                    },
                    |err| {
                        tracing::error!(error = %err, "audio playback error");
                    },
                    None,
                )
                .map_err(|e| Error::Audio(e.to_string()))?
        };

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;

        let duration_ms = (total as u64 * 1000) / u64::from(self.sample_rate);
        let timeout = Duration::from_millis(duration_ms + 500);
        let start = Instant::now();

        while !finished.load(Ordering::Acquire) && start.elapsed() < timeout {
            std::thread::sleep(Duration::from_millis(50));
        }

        // Let the device drain its last buffer
        std::thread::sleep(Duration::from_millis(100));

        drop(stream);
        tracing::debug!(samples = total, "playback complete");

        Ok(())
    }

    /// Decode MP3 bytes and play them on a device opened at their sample rate
    ///
    /// # Errors
    ///
    /// Returns error if decoding or playback fails
    pub fn play_mp3(mp3_data: &[u8]) -> Result<()> {
        let decoded = decode_mp3(mp3_data)?;
        if decoded.samples.is_empty() {
            return Ok(());
        }
        Self::open_at(decoded.sample_rate)?.play(decoded.samples)
    }
}

/// Decode MP3 bytes to mono f32 samples
///
/// The rate of the first frame applies to the whole stream.
///
/// # Errors
///
/// Returns error on a corrupt stream
pub fn decode_mp3(mp3_data: &[u8]) -> Result<DecodedAudio> {
    let mut decoder = minimp3::Decoder::new(Cursor::new(mp3_data));
    let mut samples = Vec::new();
    let mut sample_rate = None;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                let rate = u32::try_from(frame.sample_rate).unwrap_or(PLAYBACK_SAMPLE_RATE);
                if *sample_rate.get_or_insert(rate) != rate {
                    tracing::warn!(rate, "MP3 sample rate changed mid-stream");
                }
                let channels = frame.channels.max(1);
                samples.extend(frame.data.chunks(channels).map(|chunk| {
                    let sum: f32 = chunk.iter().map(|&s| f32::from(s) / 32768.0).sum();
                    #[allow(clippy::cast_precision_loss)]
                    let mixed = sum / chunk.len() as f32;
                    mixed
                }));
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => return Err(Error::Audio(format!("MP3 decode error: {e}"))),
        }
    }

    let sample_rate = sample_rate.unwrap_or(PLAYBACK_SAMPLE_RATE);
    tracing::debug!(samples = samples.len(), sample_rate, "decoded MP3");
    Ok(DecodedAudio {
        samples,
        sample_rate,
    })
}

