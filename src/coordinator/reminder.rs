//! The reminder sequence: sound, joke notification, countdown display

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    services::{
        fetch_and_cache, AudioPlayer, DisplayLauncher, JokeSource, Notifier, FALLBACK_MESSAGE,
        NOTIFICATION_TITLE,
    },
    state::{store::DEFAULT_SOUND, PreferenceStore},
};

/// Everything a reminder touches outside the coordinator
#[derive(Clone)]
pub struct ReminderServices {
    pub store: PreferenceStore,
    pub jokes: Arc<dyn JokeSource>,
    pub notifier: Arc<dyn Notifier>,
    pub audio: Arc<dyn AudioPlayer>,
    pub display: Arc<dyn DisplayLauncher>,
}

impl ReminderServices {
    /// Run one reminder and return the notification body that was shown.
    ///
    /// Each step is isolated: a failing sound, joke, notification or display
    /// is logged and the remaining steps still run.
    pub async fn run_reminder(&self) -> String {
        info!("Showing reminder");

        let ((), joke) = tokio::join!(self.play_selected_sound(), self.fetch_joke());
        let body = joke.unwrap_or_else(|| FALLBACK_MESSAGE.to_string());

        if let Err(e) = self.notifier.notify(NOTIFICATION_TITLE, &body).await {
            warn!("{}", e);
        }

        if let Err(e) = self.display.open_countdown().await {
            warn!("{}", e);
        }

        body
    }

    /// Fetch a fresh joke and cache it; `None` on any failure
    pub async fn fetch_joke(&self) -> Option<String> {
        match fetch_and_cache(self.jokes.as_ref(), &self.store).await {
            Ok(joke) => Some(joke),
            Err(e) => {
                warn!("Joke fetch failed: {}", e);
                None
            }
        }
    }

    /// The cached joke, if any
    pub async fn last_joke(&self) -> Option<String> {
        self.store.last_joke().await.unwrap_or_else(|e| {
            warn!("Failed to read cached joke: {}", e);
            None
        })
    }

    async fn play_selected_sound(&self) {
        let sound = self.store.selected_sound().await.unwrap_or_else(|e| {
            warn!("Failed to read sound preference: {}", e);
            DEFAULT_SOUND.to_string()
        });

        if let Err(e) = self.audio.ensure_ready().await {
            warn!("Audio unavailable: {}", e);
            return;
        }

        if let Err(e) = self.audio.play(&sound).await {
            warn!("Audio play failed: {}", e);
        }
    }
}
