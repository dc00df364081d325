//! Countdown display
//!
//! A fixed 20 second countdown opened once per reminder. It shows the cached
//! joke, or fetches one itself, and closes shortly after reaching zero or as
//! soon as it is dismissed. It never talks to the coordinator.

use std::{future::Future, time::Duration};

use tokio::{
    io::{AsyncBufReadExt, BufReader},
    time::{interval, sleep_until, Instant, MissedTickBehavior},
};
use tracing::{debug, warn};

use crate::{
    services::{fetch_and_cache, JokeSource},
    state::PreferenceStore,
    utils::shutdown_signal,
};

pub const COUNTDOWN_SECONDS: u64 = 20;

/// How long zero stays on screen before the display closes
pub const CLOSE_DELAY: Duration = Duration::from_millis(700);

pub const NO_JOKE: &str = "(no joke available)";

/// Something the display wants drawn
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Tick(u64),
    Joke(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    Elapsed,
    Dismissed,
}

pub struct CountdownDisplay<J> {
    store: PreferenceStore,
    jokes: J,
    seconds: u64,
}

impl<J: JokeSource> CountdownDisplay<J> {
    pub fn new(store: PreferenceStore, jokes: J) -> Self {
        Self { store, jokes, seconds: COUNTDOWN_SECONDS }
    }

    /// Run the countdown, handing every frame to `render`, until it elapses
    /// or `dismiss` completes
    pub async fn run<R, D>(&self, mut render: R, dismiss: D) -> CloseReason
    where
        R: FnMut(Frame),
        D: Future<Output = ()>,
    {
        tokio::pin!(dismiss);
        let joke = self.resolve_joke();
        tokio::pin!(joke);
        let close = sleep_until(Instant::now() + CLOSE_DELAY);
        tokio::pin!(close);

        let mut ticks = interval(Duration::from_secs(1));
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut remaining = self.seconds;
        let mut joke_shown = false;
        let mut closing = false;

        loop {
            tokio::select! {
                biased;

                _ = &mut dismiss => {
                    debug!("Countdown dismissed with {}s left", remaining);
                    return CloseReason::Dismissed;
                }
                joke = &mut joke, if !joke_shown => {
                    joke_shown = true;
                    render(Frame::Joke(joke));
                }
                _ = ticks.tick(), if !closing => {
                    render(Frame::Tick(remaining));
                    if remaining == 0 {
                        closing = true;
                        close.as_mut().reset(Instant::now() + CLOSE_DELAY);
                    } else {
                        remaining -= 1;
                    }
                }
                _ = &mut close, if closing => return CloseReason::Elapsed,
            }
        }
    }

    /// Cached joke if there is one, otherwise a fresh one which is cached in
    /// turn
    async fn resolve_joke(&self) -> String {
        match self.store.last_joke().await {
            Ok(Some(joke)) => return joke,
            Ok(None) => {}
            Err(e) => warn!("Could not read cached joke: {}", e),
        }

        match fetch_and_cache(&self.jokes, &self.store).await {
            Ok(joke) => joke,
            Err(e) => {
                warn!("Countdown joke fetch failed: {}", e);
                NO_JOKE.to_string()
            }
        }
    }
}

/// Run the countdown on the terminal. Enter or Ctrl-C dismisses it.
pub async fn run_in_terminal<J: JokeSource>(display: CountdownDisplay<J>) -> CloseReason {
    println!("Look 20 feet away 👀");

    let reason = display
        .run(
            |frame| match frame {
                Frame::Tick(seconds) => println!("{:>2}s", seconds),
                Frame::Joke(joke) => println!("{}", joke),
            },
            async {
                tokio::select! {
                    _ = enter_pressed() => {}
                    _ = shutdown_signal() => {}
                }
            },
        )
        .await;

    debug!("Countdown closed: {:?}", reason);
    reason
}

/// Completes on the first line read from stdin. A closed stdin never
/// completes.
async fn enter_pressed() {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    match lines.next_line().await {
        Ok(Some(_)) => {}
        Ok(None) => std::future::pending().await,
        Err(e) => {
            debug!("stdin unavailable: {}", e);
            std::future::pending().await
        }
    }
}

#[cfg(test)]
mod tests {
    use std::future::pending;

    use async_trait::async_trait;
    use tempfile::TempDir;
    use tokio::time::sleep;

    use super::*;
    use crate::services::JokeError;

    struct SlowJokes {
        delay: Duration,
        result: Result<String, JokeError>,
    }

    #[async_trait]
    impl JokeSource for SlowJokes {
        async fn fetch(&self) -> Result<String, JokeError> {
            sleep(self.delay).await;
            self.result.clone()
        }
    }

    fn display(dir: &TempDir, delay_secs: u64, result: Result<String, JokeError>) -> CountdownDisplay<SlowJokes> {
        CountdownDisplay::new(
            PreferenceStore::new(dir.path()),
            SlowJokes { delay: Duration::from_secs(delay_secs), result },
        )
    }

    fn ticks(frames: &[Frame]) -> Vec<u64> {
        frames
            .iter()
            .filter_map(|f| match f {
                Frame::Tick(s) => Some(*s),
                Frame::Joke(_) => None,
            })
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn counts_down_and_closes_after_zero() {
        let dir = TempDir::new().unwrap();
        let display = display(&dir, 0, Ok("ha".into()));

        let started = Instant::now();
        let mut frames = Vec::new();
        let reason = display.run(|f| frames.push(f), pending()).await;

        assert_eq!(reason, CloseReason::Elapsed);
        assert_eq!(ticks(&frames), (0..=COUNTDOWN_SECONDS).rev().collect::<Vec<_>>());
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(COUNTDOWN_SECONDS) + CLOSE_DELAY);
        assert!(elapsed < Duration::from_secs(COUNTDOWN_SECONDS + 2));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_joke_does_not_hold_up_ticks() {
        let dir = TempDir::new().unwrap();
        let display = display(&dir, 5, Ok("late joke".into()));

        let mut frames = Vec::new();
        display.run(|f| frames.push(f), pending()).await;

        let joke_at = frames
            .iter()
            .position(|f| *f == Frame::Joke("late joke".into()))
            .unwrap();
        assert!(ticks(&frames[..joke_at]).len() >= 5);
        assert_eq!(ticks(&frames).len(), COUNTDOWN_SECONDS as usize + 1);

        let store = PreferenceStore::new(dir.path());
        assert_eq!(store.last_joke().await.unwrap().as_deref(), Some("late joke"));
    }

    #[tokio::test(start_paused = true)]
    async fn cached_joke_is_shown_without_fetching() {
        let dir = TempDir::new().unwrap();
        PreferenceStore::new(dir.path()).set_last_joke("cached").await.unwrap();
        let display = display(&dir, 0, Err(JokeError::Missing));

        let mut frames = Vec::new();
        display.run(|f| frames.push(f), pending()).await;

        assert!(frames.contains(&Frame::Joke("cached".into())));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_fetch_shows_placeholder() {
        let dir = TempDir::new().unwrap();
        let display = display(&dir, 0, Err(JokeError::Transport("offline".into())));

        let mut frames = Vec::new();
        display.run(|f| frames.push(f), pending()).await;

        assert!(frames.contains(&Frame::Joke(NO_JOKE.into())));
        let store = PreferenceStore::new(dir.path());
        assert_eq!(store.last_joke().await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn dismissal_closes_early() {
        let dir = TempDir::new().unwrap();
        let display = display(&dir, 0, Ok("ha".into()));

        let started = Instant::now();
        let mut frames = Vec::new();
        let reason = display
            .run(|f| frames.push(f), sleep(Duration::from_millis(3_500)))
            .await;

        assert_eq!(reason, CloseReason::Dismissed);
        assert_eq!(ticks(&frames), vec![20, 19, 18, 17]);
        assert!(started.elapsed() < Duration::from_secs(4));
    }
}
