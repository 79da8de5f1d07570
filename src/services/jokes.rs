//! Joke providers

use async_trait::async_trait;
use rand::seq::SliceRandom;
use serde::Deserialize;

use super::USER_AGENT;
use crate::{Error, Result};

/// Source of jokes
#[async_trait]
pub trait JokeProvider: Send + Sync {
    /// One joke, ready to be spoken
    async fn joke(&self) -> Result<String>;
}

/// Programmer jokes shipped with the binary
const JOKES: &[&str] = &[
    "Why do programmers prefer dark mode? Because light attracts bugs.",
    "There are 10 types of people in the world: those who understand binary and those who don't.",
    "A SQL query walks into a bar, walks up to two tables and asks, can I join you?",
    "Why did the developer go broke? Because he used up all his cache.",
    "How many programmers does it take to change a light bulb? None, that's a hardware problem.",
    "I would tell you a UDP joke, but you might not get it.",
    "Debugging is like being the detective in a crime movie where you are also the murderer.",
    "Why do Java developers wear glasses? Because they can't C sharp.",
    "A programmer's partner says: go to the store and get a loaf of bread, and if they have eggs, get a dozen. The programmer comes back with twelve loaves of bread.",
    "To understand recursion, you must first understand recursion.",
    "The best thing about a boolean is that even if you are wrong, you are only off by a bit.",
    "Why was the function sad after the party? It didn't get called back.",
];

/// Offline jokes picked at random
#[derive(Debug, Default, Clone, Copy)]
pub struct BundledJokes;

#[async_trait]
impl JokeProvider for BundledJokes {
    async fn joke(&self) -> Result<String> {
        JOKES
            .choose(&mut rand::thread_rng())
            .map(|j| (*j).to_string())
            .ok_or_else(|| Error::Joke("no bundled jokes".to_string()))
    }
}

/// <https://icanhazdadjoke.com>
pub struct DadJokeApi {
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct DadJoke {
    joke: String,
}

impl DadJokeApi {
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl JokeProvider for DadJokeApi {
    async fn joke(&self) -> Result<String> {
        let response = self
            .client
            .get("https://icanhazdadjoke.com/")
            .header("Accept", "application/json")
            .send()
            .await?
            .error_for_status()?;

        let joke: DadJoke = response.json().await?;
        Ok(joke.joke)
    }
}
