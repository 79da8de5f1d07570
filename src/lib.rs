//! Herald - a voice-driven command assistant
//!
//! A POST to the trigger endpoint spawns a worker that listens for one spoken
//! command, matches it against a fixed keyword table and answers out loud.
//!
//! # Architecture
//!
//! ```text
//! POST /start-alexa ──► Pipeline::trigger ──► worker task
//!                                               │
//!        SpeechIo::listen ◄─────────────────────┤  capture → STT → Utterance
//!                                               │
//!        Dispatcher::dispatch ◄─────────────────┤  Intent → action
//!             │                                 │
//!             ├── media / encyclopedia / news / jokes
//!             │
//!        SpeechIo::speak ◄──────────────────────┘  TTS → speaker (one at a time)
//! ```

pub mod api;
pub mod config;
pub mod daemon;
pub mod dispatch;
pub mod error;
pub mod pipeline;
pub mod services;
pub mod voice;

pub use config::Config;
pub use daemon::Daemon;
pub use dispatch::{Dispatcher, Intent, Services};
pub use error::{Error, ListenError, Result};
pub use pipeline::Pipeline;
pub use voice::{SpeechIo, Utterance};
