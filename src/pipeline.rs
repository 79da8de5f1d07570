//! One listen → dispatch cycle, run as a detached worker

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::dispatch::Dispatcher;
use crate::voice::SpeechIo;

/// The full command cycle shared by every worker
pub struct Pipeline {
    speech: Arc<SpeechIo>,
    dispatcher: Dispatcher,
}

impl Pipeline {
    #[must_use]
    pub const fn new(speech: Arc<SpeechIo>, dispatcher: Dispatcher) -> Self {
        Self { speech, dispatcher }
    }

    /// The speech adapter this pipeline speaks through
    #[must_use]
    pub fn speech(&self) -> &Arc<SpeechIo> {
        &self.speech
    }

    /// Listen for one command and act on it
    ///
    /// Capture failures are apologized for and end the cycle.
    pub async fn run_once(&self) {
        match self.speech.listen().await {
            Ok(utterance) => self.dispatcher.dispatch(&utterance).await,
            Err(e) => self.speech.speak(e.apology()).await,
        }
    }

    /// Spawn a detached worker running one cycle
    ///
    /// The caller may drop the handle; the worker keeps running.
    pub fn trigger(self: &Arc<Self>) -> JoinHandle<()> {
        let run = uuid::Uuid::new_v4();
        let span = tracing::info_span!("worker", %run);
        let pipeline = Arc::clone(self);

        tracing::debug!(%run, "spawning worker");
        tokio::spawn(
            async move {
                pipeline.run_once().await;
                tracing::debug!("worker finished");
            }
            .instrument(span),
        )
    }
}
