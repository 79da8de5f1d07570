//! Command dispatch
//!
//! Maps a normalized utterance to exactly one action and speaks the result.
//! Every branch ends in speech; failures inside an action become a generic
//! apology rather than an error returned to the caller.

mod intent;
mod lookup;

use std::sync::Arc;
use std::time::Duration;

pub use intent::Intent;
pub use lookup::{LOOKUP_FAILED, NOT_FOUND, SUMMARY_SENTENCES, TOO_BROAD, lookup_person};

use crate::Result;
use crate::config::Config;
use crate::services::{Encyclopedia, HeadlineProvider, JokeProvider, MediaPlayer};
use crate::voice::{SpeechIo, Utterance};

/// Opening line before headlines are read
pub const NEWS_INTRO: &str = "Here are the latest headlines.";

/// Spoken when the news service returned nothing
pub const NO_NEWS: &str = "Sorry, I couldn't find any news at the moment.";

/// Spoken when the news service could not be reached
pub const NEWS_FAILED: &str = "Sorry, I couldn't fetch the news.";

/// Reply to being asked out
pub const DATE_REPLY: &str = "Sorry, I have a headache.";

/// Reply to "are you single"
pub const SINGLE_REPLY: &str = "I am in a relationship with wifi.";

/// Re-prompt for unrecognized commands
pub const REPROMPT: &str = "Please say the command again.";

/// Spoken when an action failed
pub const GENERIC_FAILURE: &str = "Something went wrong while processing your request.";

/// Backends used by dispatched actions
#[derive(Clone)]
pub struct Services {
    /// Media playback
    pub media: Arc<dyn MediaPlayer>,
    /// Person lookups
    pub encyclopedia: Arc<dyn Encyclopedia>,
    /// Headlines, absent when no news key is configured
    pub headlines: Option<Arc<dyn HeadlineProvider>>,
    /// Jokes
    pub jokes: Arc<dyn JokeProvider>,
}

/// Tunables for dispatched actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchSettings {
    /// Headlines read per news request
    pub max_headlines: usize,
    /// Pause between headlines
    pub headline_pause: Duration,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            max_headlines: 3,
            headline_pause: Duration::from_secs(1),
        }
    }
}

impl From<&Config> for DispatchSettings {
    fn from(config: &Config) -> Self {
        Self {
            max_headlines: config.news.max_headlines,
            headline_pause: config.news.headline_pause,
        }
    }
}

/// Routes utterances to actions
pub struct Dispatcher {
    speech: Arc<SpeechIo>,
    services: Services,
    settings: DispatchSettings,
}

impl Dispatcher {
    #[must_use]
    pub const fn new(speech: Arc<SpeechIo>, services: Services, settings: DispatchSettings) -> Self {
        Self {
            speech,
            services,
            settings,
        }
    }

    /// Execute the action an utterance asks for
    ///
    /// Returns once everything the action says has been spoken.
    pub async fn dispatch(&self, utterance: &Utterance) {
        let intent = Intent::parse(utterance);
        tracing::info!(?intent, "dispatching");

        if let Err(e) = self.execute(intent).await {
            tracing::error!(error = %e, "command failed");
            self.speech.speak(GENERIC_FAILURE).await;
        }
    }

    async fn execute(&self, intent: Intent) -> Result<()> {
        match intent {
            Intent::PlayMedia(query) => {
                self.speech.speak(&format!("Playing {query}")).await;
                self.services.media.play(&query).await?;
            }
            Intent::TellTime => {
                let now = chrono::Local::now().format("%I:%M %p");
                self.speech.speak(&format!("Current time is {now}")).await;
            }
            Intent::LookupPerson(name) => {
                let info = lookup_person(self.services.encyclopedia.as_ref(), &name).await?;
                self.speech.speak(&info).await;
            }
            Intent::FetchNews => self.read_news().await,
            Intent::TellDate => self.speech.speak(DATE_REPLY).await,
            Intent::Relationship => self.speech.speak(SINGLE_REPLY).await,
            Intent::TellJoke => {
                let joke = self.services.jokes.joke().await?;
                self.speech.speak(&joke).await;
            }
            Intent::Unrecognized => self.speech.speak(REPROMPT).await,
        }
        Ok(())
    }

    async fn read_news(&self) {
        let Some(headlines) = &self.services.headlines else {
            tracing::warn!("news requested but no news API key is configured");
            self.speech.speak(NEWS_FAILED).await;
            return;
        };

        let titles = match headlines.top_headlines(self.settings.max_headlines).await {
            Ok(titles) => titles,
            Err(e) => {
                tracing::error!(error = %e, "fetching headlines failed");
                self.speech.speak(NEWS_FAILED).await;
                return;
            }
        };

        if titles.is_empty() {
            self.speech.speak(NO_NEWS).await;
            return;
        }

        self.speech.speak(NEWS_INTRO).await;
        for (idx, title) in titles.iter().take(self.settings.max_headlines).enumerate() {
            self.speech.speak(&format!("{}. {title}", idx + 1)).await;
            tokio::time::sleep(self.settings.headline_pause).await;
        }
    }
}
