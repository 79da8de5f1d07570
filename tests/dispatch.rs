//! Dispatcher and pipeline integration tests
//!
//! Drives full command cycles through in-memory speech and services.

use std::sync::Arc;
use std::time::Duration;

use herald::ListenError;
use herald::dispatch::{
    DATE_REPLY, GENERIC_FAILURE, LOOKUP_FAILED, NEWS_FAILED, NEWS_INTRO, NO_NEWS, NOT_FOUND,
    REPROMPT, SINGLE_REPLY, TOO_BROAD,
};
use herald::services::Summary;
use regex::Regex;

mod common;
use common::{FakeEncyclopedia, FakeHeadlines, FakeJokes, FakeMedia, Harness, ScriptedListener};

fn found(text: &str) -> Summary {
    Summary::Found(text.to_string())
}

#[tokio::test]
async fn test_play_announces_then_plays() {
    let harness = Harness::default();

    let lines = harness.say("Alexa play despacito").await;

    assert_eq!(lines, vec!["Playing despacito"]);
    assert_eq!(harness.media.played(), vec!["despacito"]);
}

#[tokio::test]
async fn test_play_takes_priority_over_time() {
    let harness = Harness::default();

    let lines = harness.say("play the time song").await;

    assert_eq!(lines, vec!["Playing the time song"]);
    assert_eq!(harness.media.played(), vec!["the time song"]);
}

#[tokio::test]
async fn test_media_failure_apologizes() {
    let harness = Harness {
        media: Arc::new(FakeMedia::failing()),
        ..Harness::default()
    };

    let lines = harness.say("play lofi beats").await;

    assert_eq!(lines, vec!["Playing lofi beats", GENERIC_FAILURE]);
}

#[tokio::test]
async fn test_time_end_to_end() {
    let harness = Harness::default();
    let pipeline = harness.pipeline(ScriptedListener::saying(&["Alexa what time is it"]));

    pipeline.run_once().await;

    let lines = harness.transcript.lines();
    assert_eq!(lines.len(), 1);
    let format = Regex::new(r"^Current time is (0[1-9]|1[0-2]):[0-5]\d (AM|PM)$").unwrap();
    assert!(format.is_match(&lines[0]), "unexpected time line: {}", lines[0]);
}

#[tokio::test]
async fn test_who_is_found() {
    let harness = Harness {
        encyclopedia: Arc::new(
            FakeEncyclopedia::default()
                .with_summary("ada lovelace", found("Ada Lovelace was a mathematician.")),
        ),
        ..Harness::default()
    };

    let lines = harness.say("alexa who is Ada Lovelace").await;

    assert_eq!(lines, vec!["Ada Lovelace was a mathematician."]);
    assert_eq!(harness.encyclopedia.summary_calls(), vec!["ada lovelace"]);
    assert!(harness.encyclopedia.search_calls().is_empty());
}

#[tokio::test]
async fn test_who_is_is_repeatable() {
    let harness = Harness {
        encyclopedia: Arc::new(
            FakeEncyclopedia::default().with_summary("grace hopper", found("Grace Hopper was a computer scientist.")),
        ),
        ..Harness::default()
    };

    harness.say("who is grace hopper").await;
    let lines = harness.say("who is grace hopper").await;

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], lines[1]);
}

#[tokio::test]
async fn test_ambiguous_uses_first_candidate_only() {
    let harness = Harness {
        encyclopedia: Arc::new(
            FakeEncyclopedia::default()
                .with_summary(
                    "mercury",
                    Summary::Ambiguous(vec!["X".to_string(), "Y".to_string(), "Z".to_string()]),
                )
                .with_summary("X", found("X is a planet."))
                .with_summary("Y", found("Y is an element.")),
        ),
        ..Harness::default()
    };

    let lines = harness.say("who is mercury").await;

    assert_eq!(lines, vec!["X is a planet."]);
    assert_eq!(harness.encyclopedia.summary_calls(), vec!["mercury", "X"]);
}

#[tokio::test]
async fn test_ambiguous_candidate_failure_is_too_broad() {
    let harness = Harness {
        encyclopedia: Arc::new(FakeEncyclopedia::default().with_summary(
            "john smith",
            Summary::Ambiguous(vec!["John Smith (explorer)".to_string()]),
        )),
        ..Harness::default()
    };

    let lines = harness.say("who is john smith").await;

    assert_eq!(lines, vec![TOO_BROAD]);
}

#[tokio::test]
async fn test_ambiguous_without_candidates_is_too_broad() {
    let harness = Harness {
        encyclopedia: Arc::new(
            FakeEncyclopedia::default().with_summary("smith", Summary::Ambiguous(Vec::new())),
        ),
        ..Harness::default()
    };

    let lines = harness.say("who is smith").await;

    assert_eq!(lines, vec![TOO_BROAD]);
    assert_eq!(harness.encyclopedia.summary_calls(), vec!["smith"]);
}

#[tokio::test]
async fn test_not_found_with_empty_search_skips_summary() {
    let harness = Harness {
        encyclopedia: Arc::new(FakeEncyclopedia::default().with_search(&[])),
        ..Harness::default()
    };

    let lines = harness.say("who is zzyzx qwerty").await;

    assert_eq!(lines, vec![NOT_FOUND]);
    assert_eq!(harness.encyclopedia.summary_calls(), vec!["zzyzx qwerty"]);
    assert_eq!(harness.encyclopedia.search_calls(), vec!["zzyzx qwerty"]);
}

#[tokio::test]
async fn test_not_found_falls_back_to_first_search_hit() {
    let harness = Harness {
        encyclopedia: Arc::new(
            FakeEncyclopedia::default()
                .with_search(&["Alan Turing", "Turing machine"])
                .with_summary("Alan Turing", found("Alan Turing was a logician.")),
        ),
        ..Harness::default()
    };

    let lines = harness.say("who is turing").await;

    assert_eq!(lines, vec!["Alan Turing was a logician."]);
    assert_eq!(harness.encyclopedia.summary_calls(), vec!["turing", "Alan Turing"]);
}

#[tokio::test]
async fn test_search_hit_not_found_apologizes() {
    let harness = Harness {
        encyclopedia: Arc::new(FakeEncyclopedia::default().with_search(&["Ghost Page"])),
        ..Harness::default()
    };

    let lines = harness.say("who is ghost").await;

    assert_eq!(lines, vec![NOT_FOUND]);
}

#[tokio::test]
async fn test_encyclopedia_service_error() {
    let harness = Harness {
        encyclopedia: Arc::new(FakeEncyclopedia::default().with_summary(
            "anyone",
            Summary::ServiceError("connection refused".to_string()),
        )),
        ..Harness::default()
    };

    let lines = harness.say("who is anyone").await;

    assert_eq!(lines, vec![LOOKUP_FAILED]);
    assert!(harness.encyclopedia.search_calls().is_empty());
}

#[tokio::test]
async fn test_search_failure_is_generic_failure() {
    // No search results configured: search errors
    let harness = Harness::default();

    let lines = harness.say("who is nobody").await;

    assert_eq!(lines, vec![GENERIC_FAILURE]);
    assert_eq!(harness.encyclopedia.search_calls(), vec!["nobody"]);
    assert_eq!(harness.encyclopedia.summary_calls(), vec!["nobody"]);
}

#[tokio::test]
async fn test_news_reads_numbered_headlines() {
    let harness = Harness {
        headlines: Some(Arc::new(FakeHeadlines::returning(&["Rain", "Markets up", "Cat elected"]))),
        ..Harness::default()
    };

    let lines = harness.say("alexa what's the news").await;

    assert_eq!(
        lines,
        vec![NEWS_INTRO, "1. Rain", "2. Markets up", "3. Cat elected"]
    );
    let headlines = harness.headlines.as_ref().unwrap();
    assert_eq!(headlines.calls(), 1);
    assert_eq!(headlines.last_limit(), 3);
}

#[tokio::test]
async fn test_news_pauses_after_each_headline() {
    let pause = Duration::from_millis(50);
    let mut harness = Harness {
        headlines: Some(Arc::new(FakeHeadlines::returning(&["Rain", "Markets up", "Cat elected"]))),
        ..Harness::default()
    };
    harness.settings.headline_pause = pause;

    let started = std::time::Instant::now();
    let lines = harness.say("news").await;

    assert_eq!(lines.len(), 4);
    assert!(
        started.elapsed() >= pause * 3,
        "read three headlines in {:?}",
        started.elapsed()
    );
}

#[tokio::test]
async fn test_news_never_reads_more_than_the_limit() {
    let mut harness = Harness {
        headlines: Some(Arc::new(FakeHeadlines::returning(&["a", "b", "c", "d"]))),
        ..Harness::default()
    };
    harness.settings.max_headlines = 2;

    let lines = harness.say("news").await;

    assert_eq!(lines, vec![NEWS_INTRO, "1. a", "2. b"]);
}

#[tokio::test]
async fn test_news_with_zero_articles_apologizes_once() {
    let harness = Harness::default();

    let lines = harness.say("tell me the news").await;

    assert_eq!(lines, vec![NO_NEWS]);
}

#[tokio::test]
async fn test_news_failure() {
    let harness = Harness {
        headlines: Some(Arc::new(FakeHeadlines::failing())),
        ..Harness::default()
    };

    let lines = harness.say("news").await;

    assert_eq!(lines, vec![NEWS_FAILED]);
}

#[tokio::test]
async fn test_news_without_provider() {
    let harness = Harness {
        headlines: None,
        ..Harness::default()
    };

    let lines = harness.say("news").await;

    assert_eq!(lines, vec![NEWS_FAILED]);
}

#[tokio::test]
async fn test_canned_replies() {
    let harness = Harness::default();

    harness.say("alexa will you go on a date with me").await;
    let lines = harness.say("alexa are you single").await;

    assert_eq!(lines, vec![DATE_REPLY, SINGLE_REPLY]);
}

#[tokio::test]
async fn test_joke() {
    let harness = Harness {
        jokes: Arc::new(FakeJokes::telling("I told a UDP joke.")),
        ..Harness::default()
    };

    let lines = harness.say("tell me a joke").await;

    assert_eq!(lines, vec!["I told a UDP joke."]);
}

#[tokio::test]
async fn test_joke_failure_apologizes() {
    let harness = Harness {
        jokes: Arc::new(FakeJokes::failing()),
        ..Harness::default()
    };

    let lines = harness.say("joke please").await;

    assert_eq!(lines, vec![GENERIC_FAILURE]);
}

#[tokio::test]
async fn test_unrecognized_invokes_no_service() {
    let harness = Harness::default();

    let lines = harness.say("turn on the lights").await;

    assert_eq!(lines, vec![REPROMPT]);
    assert!(harness.media.played().is_empty());
    assert!(harness.encyclopedia.summary_calls().is_empty());
    assert!(harness.encyclopedia.search_calls().is_empty());
    assert_eq!(harness.headlines.as_ref().unwrap().calls(), 0);
    assert_eq!(harness.jokes.calls(), 0);
}

#[tokio::test]
async fn test_wake_word_alone_reprompts() {
    let harness = Harness::default();

    let lines = harness.say("Alexa.").await;

    assert_eq!(lines, vec![REPROMPT]);
}

#[tokio::test]
async fn test_listen_failures_are_apologized_for() {
    let harness = Harness::default();
    let pipeline = harness.pipeline(ScriptedListener::new(vec![
        Err(ListenError::NotUnderstood),
        Err(ListenError::ServiceUnavailable("503".to_string())),
        Err(ListenError::Other("device busy".to_string())),
    ]));

    for _ in 0..3 {
        pipeline.run_once().await;
    }

    assert_eq!(
        harness.transcript.lines(),
        vec![
            "Sorry, I could not understand. Please try again.",
            "Speech recognition service is unavailable.",
            "Sorry, something went wrong.",
        ]
    );
}

#[tokio::test]
async fn test_trigger_runs_detached_worker() {
    let harness = Harness::default();
    let pipeline = harness.pipeline(ScriptedListener::saying(&["are you single"]));

    pipeline.trigger().await.unwrap();

    assert_eq!(harness.transcript.lines(), vec![SINGLE_REPLY]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_workers_never_speak_over_each_other() {
    let harness = Harness {
        headlines: Some(Arc::new(FakeHeadlines::returning(&["one", "two"]))),
        speak_delay: Duration::from_millis(10),
        ..Harness::default()
    };
    let pipeline = harness.pipeline(ScriptedListener::saying(&[
        "news",
        "tell me a joke",
        "are you single",
        "news",
    ]));

    let workers: Vec<_> = (0..4).map(|_| pipeline.trigger()).collect();
    for worker in workers {
        worker.await.unwrap();
    }

    // Two news runs of three lines each, one joke and one reply
    assert_eq!(harness.transcript.lines().len(), 8);
    assert_eq!(harness.transcript.overlaps(), 0);
}

#[tokio::test]
async fn test_synthesis_failure_does_not_stop_the_worker() {
    let transcript = Arc::new(common::Transcript::default());
    let synthesizer = common::RecordingSynthesizer::new(transcript.clone()).failing();
    let speech = Arc::new(herald::SpeechIo::new(
        Box::new(ScriptedListener::saying(&["news"])),
        Box::new(synthesizer),
        vec!["alexa".to_string()],
    ));
    let harness = Harness {
        headlines: Some(Arc::new(FakeHeadlines::returning(&["a", "b"]))),
        ..Harness::default()
    };
    let dispatcher = herald::Dispatcher::new(speech.clone(), harness.services(), harness.settings);
    let pipeline = herald::Pipeline::new(speech, dispatcher);

    pipeline.run_once().await;

    assert_eq!(transcript.lines(), vec![NEWS_INTRO, "1. a", "2. b"]);
}
