//! Shared test utilities
//!
//! In-memory stand-ins for the microphone, speaker and lookup services.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use herald::dispatch::{DispatchSettings, Dispatcher, Services};
use herald::services::{Encyclopedia, HeadlineProvider, JokeProvider, MediaPlayer, Summary};
use herald::voice::{Listener, SpeechIo, Synthesizer};
use herald::{Error, ListenError, Pipeline, Result};

/// Hands out queued transcripts, one per capture
pub struct ScriptedListener {
    script: Mutex<VecDeque<std::result::Result<String, ListenError>>>,
}

impl ScriptedListener {
    pub fn new(script: Vec<std::result::Result<String, ListenError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
        }
    }

    pub fn saying(transcripts: &[&str]) -> Self {
        Self::new(transcripts.iter().map(|t| Ok((*t).to_string())).collect())
    }
}

#[async_trait]
impl Listener for ScriptedListener {
    async fn capture(&self) -> std::result::Result<String, ListenError> {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ListenError::Other("script exhausted".to_string())))
    }
}

/// Everything the recording synthesizer was asked to say
#[derive(Default)]
pub struct Transcript {
    lines: Mutex<Vec<String>>,
    active: AtomicUsize,
    overlaps: AtomicUsize,
}

impl Transcript {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    /// Times a `say` started while another was still in progress
    pub fn overlaps(&self) -> usize {
        self.overlaps.load(Ordering::SeqCst)
    }

    /// Wait until at least `count` lines were spoken
    pub async fn wait_for(&self, count: usize) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while self.lines.lock().unwrap().len() < count {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("timed out waiting for speech");
    }
}

/// Records spoken lines, taking `delay` per line
pub struct RecordingSynthesizer {
    transcript: Arc<Transcript>,
    delay: Duration,
    fail: bool,
}

impl RecordingSynthesizer {
    pub fn new(transcript: Arc<Transcript>) -> Self {
        Self {
            transcript,
            delay: Duration::ZERO,
            fail: false,
        }
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Record the line, then report a synthesis failure
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl Synthesizer for RecordingSynthesizer {
    async fn say(&self, text: &str) -> Result<()> {
        if self.transcript.active.fetch_add(1, Ordering::SeqCst) > 0 {
            self.transcript.overlaps.fetch_add(1, Ordering::SeqCst);
        }

        tokio::time::sleep(self.delay).await;
        self.transcript.lines.lock().unwrap().push(text.to_string());

        self.transcript.active.fetch_sub(1, Ordering::SeqCst);

        if self.fail {
            return Err(Error::Tts("synthesis failed".to_string()));
        }
        Ok(())
    }
}

/// Encyclopedia answering from a fixed table
#[derive(Default)]
pub struct FakeEncyclopedia {
    summaries: HashMap<String, Summary>,
    search_results: Option<Vec<String>>,
    summary_calls: Mutex<Vec<String>>,
    search_calls: Mutex<Vec<String>>,
}

impl FakeEncyclopedia {
    #[must_use]
    pub fn with_summary(mut self, topic: &str, summary: Summary) -> Self {
        self.summaries.insert(topic.to_string(), summary);
        self
    }

    /// Search results; without this, search fails
    #[must_use]
    pub fn with_search(mut self, results: &[&str]) -> Self {
        self.search_results = Some(results.iter().map(ToString::to_string).collect());
        self
    }

    pub fn summary_calls(&self) -> Vec<String> {
        self.summary_calls.lock().unwrap().clone()
    }

    pub fn search_calls(&self) -> Vec<String> {
        self.search_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Encyclopedia for FakeEncyclopedia {
    async fn summary(&self, topic: &str, _sentences: u32) -> Summary {
        self.summary_calls.lock().unwrap().push(topic.to_string());
        self.summaries
            .get(topic)
            .cloned()
            .unwrap_or(Summary::NotFound)
    }

    async fn search(&self, query: &str) -> Result<Vec<String>> {
        self.search_calls.lock().unwrap().push(query.to_string());
        self.search_results
            .clone()
            .ok_or_else(|| Error::Encyclopedia("search unavailable".to_string()))
    }
}

/// Headline provider returning a fixed result
pub struct FakeHeadlines {
    headlines: Option<Vec<String>>,
    calls: AtomicUsize,
    last_limit: AtomicUsize,
}

impl FakeHeadlines {
    pub fn returning(headlines: &[&str]) -> Self {
        Self {
            headlines: Some(headlines.iter().map(ToString::to_string).collect()),
            calls: AtomicUsize::new(0),
            last_limit: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            headlines: None,
            calls: AtomicUsize::new(0),
            last_limit: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_limit(&self) -> usize {
        self.last_limit.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HeadlineProvider for FakeHeadlines {
    async fn top_headlines(&self, limit: usize) -> Result<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_limit.store(limit, Ordering::SeqCst);
        self.headlines
            .clone()
            .ok_or_else(|| Error::News("apiKeyInvalid".to_string()))
    }
}

/// Joke provider returning a fixed joke, or failing
pub struct FakeJokes {
    joke: Option<String>,
    calls: AtomicUsize,
}

impl FakeJokes {
    pub fn telling(joke: &str) -> Self {
        Self {
            joke: Some(joke.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            joke: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JokeProvider for FakeJokes {
    async fn joke(&self) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.joke
            .clone()
            .ok_or_else(|| Error::Joke("no jokes today".to_string()))
    }
}

/// Media player recording what it was asked to play
#[derive(Default)]
pub struct FakeMedia {
    played: Mutex<Vec<String>>,
    fail: bool,
}

impl FakeMedia {
    pub fn failing() -> Self {
        Self {
            played: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn played(&self) -> Vec<String> {
        self.played.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaPlayer for FakeMedia {
    async fn play(&self, query: &str) -> Result<()> {
        self.played.lock().unwrap().push(query.to_string());
        if self.fail {
            return Err(Error::Media("no opener".to_string()));
        }
        Ok(())
    }
}

/// A dispatcher wired to fakes, with handles for inspection
pub struct Harness {
    pub transcript: Arc<Transcript>,
    pub media: Arc<FakeMedia>,
    pub encyclopedia: Arc<FakeEncyclopedia>,
    pub headlines: Option<Arc<FakeHeadlines>>,
    pub jokes: Arc<FakeJokes>,
    pub settings: DispatchSettings,
    pub speak_delay: Duration,
}

impl Default for Harness {
    fn default() -> Self {
        Self {
            transcript: Arc::new(Transcript::default()),
            media: Arc::new(FakeMedia::default()),
            encyclopedia: Arc::new(FakeEncyclopedia::default()),
            headlines: Some(Arc::new(FakeHeadlines::returning(&[]))),
            jokes: Arc::new(FakeJokes::telling("knock knock")),
            settings: DispatchSettings {
                max_headlines: 3,
                headline_pause: Duration::ZERO,
            },
            speak_delay: Duration::ZERO,
        }
    }
}

impl Harness {
    pub fn services(&self) -> Services {
        Services {
            media: self.media.clone(),
            encyclopedia: self.encyclopedia.clone(),
            headlines: self
                .headlines
                .clone()
                .map(|h| h as Arc<dyn HeadlineProvider>),
            jokes: self.jokes.clone(),
        }
    }

    pub fn speech(&self, listener: ScriptedListener) -> Arc<SpeechIo> {
        let synthesizer =
            RecordingSynthesizer::new(self.transcript.clone()).with_delay(self.speak_delay);
        Arc::new(SpeechIo::new(
            Box::new(listener),
            Box::new(synthesizer),
            vec!["alexa".to_string()],
        ))
    }

    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(
            self.speech(ScriptedListener::new(Vec::new())),
            self.services(),
            self.settings,
        )
    }

    pub fn pipeline(&self, listener: ScriptedListener) -> Arc<Pipeline> {
        let speech = self.speech(listener);
        let dispatcher = Dispatcher::new(speech.clone(), self.services(), self.settings);
        Arc::new(Pipeline::new(speech, dispatcher))
    }

    /// Normalize and dispatch one transcript
    pub async fn say(&self, transcript: &str) -> Vec<String> {
        let utterance = herald::Utterance::from_transcript(transcript, &["alexa".to_string()]);
        self.dispatcher().dispatch(&utterance).await;
        self.transcript.lines()
    }
}
