//! Keyword intent matching

use crate::voice::Utterance;

/// What a spoken command asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Play media matching the query
    PlayMedia(String),
    /// Tell the current time
    TellTime,
    /// Look a person up in the encyclopedia
    LookupPerson(String),
    /// Read the top headlines
    FetchNews,
    /// Asked out on a date
    TellDate,
    /// Asked about relationship status
    Relationship,
    /// Tell a joke
    TellJoke,
    /// Nothing matched
    Unrecognized,
}

/// Keyword table, checked in order; first match wins
const KEYWORDS: &[(&str, Keyword)] = &[
    ("play", Keyword::Play),
    ("time", Keyword::Time),
    ("who is", Keyword::WhoIs),
    ("news", Keyword::News),
    ("date", Keyword::Date),
    ("are you single", Keyword::Single),
    ("joke", Keyword::Joke),
];

#[derive(Debug, Clone, Copy)]
enum Keyword {
    Play,
    Time,
    WhoIs,
    News,
    Date,
    Single,
    Joke,
}

impl Intent {
    /// Classify an utterance
    #[must_use]
    pub fn parse(utterance: &Utterance) -> Self {
        let command = utterance.as_str();

        let Some((trigger, keyword)) = KEYWORDS
            .iter()
            .find(|(trigger, _)| command.contains(trigger))
        else {
            return Self::Unrecognized;
        };

        match keyword {
            Keyword::Play => Self::PlayMedia(remainder(command, trigger)),
            Keyword::Time => Self::TellTime,
            Keyword::WhoIs => Self::LookupPerson(remainder(command, trigger)),
            Keyword::News => Self::FetchNews,
            Keyword::Date => Self::TellDate,
            Keyword::Single => Self::Relationship,
            Keyword::Joke => Self::TellJoke,
        }
    }
}

/// The command with every occurrence of the trigger removed
fn remainder(command: &str, trigger: &str) -> String {
    command.replace(trigger, "").trim().to_string()
}
