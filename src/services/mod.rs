//! External lookup services
//!
//! Each collaborator the dispatcher talks to sits behind a trait so the
//! dispatch logic can be exercised without the network.

mod encyclopedia;
mod jokes;
mod media;
mod news;

pub use encyclopedia::{Encyclopedia, Summary, Wikipedia};
pub use jokes::{BundledJokes, DadJokeApi, JokeProvider};
pub use media::{MediaPlayer, YouTube};
pub use news::{HeadlineProvider, NewsApi};

/// User agent sent to public APIs
pub(crate) const USER_AGENT: &str = concat!("herald/", env!("CARGO_PKG_VERSION"));
