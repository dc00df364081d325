//! Control panel
//!
//! A short-lived controller and observer of the coordinator. It loads the
//! persisted preferences on open, sends commands, and renders whatever the
//! acknowledgements and broadcasts tell it. It never owns timer state.

pub mod client;
pub mod view;

use serde_json::json;
use tracing::{info, warn};

use crate::{
    api::Request,
    config::PanelAction,
    services::{fetch_and_cache, JokeSource},
    state::PreferenceStore,
    utils::{parse_minutes, shutdown_signal, DEFAULT_INTERVAL_MINUTES, DEFAULT_SNOOZE_MINUTES},
};

pub use client::PanelClient;
pub use view::PanelView;

pub struct Panel<J> {
    client: PanelClient,
    store: PreferenceStore,
    jokes: J,
    view: PanelView,
}

impl<J: JokeSource> Panel<J> {
    /// Open the panel: load preferences and sync with the coordinator if it
    /// is reachable
    pub async fn open(client: PanelClient, store: PreferenceStore, jokes: J) -> Self {
        let mut view = PanelView::new();

        let sound = store.selected_sound().await.map_err(|e| warn!("{}", e)).ok();
        let last_joke = store.last_joke().await.map_err(|e| warn!("{}", e)).ok().flatten();
        view.load_preferences(sound, last_joke);

        match client.status().await {
            Ok(status) => view.apply_status(&status.timer),
            Err(e) => warn!("Could not read coordinator status: {}", e),
        }

        Self { client, store, jokes, view }
    }

    pub fn view(&self) -> &PanelView {
        &self.view
    }

    /// Persist the sound choice, then tell the coordinator to start
    pub async fn start(&mut self, interval: Option<String>, sound: Option<String>) {
        let interval = interval.unwrap_or_else(|| self.view.interval.clone());
        let minutes = parse_minutes(&interval, DEFAULT_INTERVAL_MINUTES);
        let sound = sound.unwrap_or_else(|| self.view.sound.clone());

        if let Err(e) = self.store.set_selected_sound(&sound).await {
            warn!("Failed to save sound preference: {}", e);
        }

        self.fire_and_forget(&Request::StartTimer { interval: Some(json!(minutes)) }).await;
        self.view.interval = minutes.to_string();
        self.view.sound = sound;
        self.view.set_running();
    }

    pub async fn stop(&mut self) {
        self.fire_and_forget(&Request::StopTimer).await;
        self.view.set_stopped();
    }

    pub async fn snooze(&mut self, minutes: Option<String>) {
        let minutes = minutes
            .map(|m| parse_minutes(&m, DEFAULT_SNOOZE_MINUTES))
            .unwrap_or(DEFAULT_SNOOZE_MINUTES);

        match self.client.command(&Request::Snooze { snooze_minutes: Some(json!(minutes)) }).await {
            Ok(ack) => self.view.apply_ack(&ack),
            Err(e) => warn!("Snooze failed: {}", e),
        }
    }

    pub async fn remind_now(&mut self) {
        if let Err(e) = self.client.command(&Request::ShowReminderNow).await {
            warn!("Reminder request failed: {}", e);
        }
    }

    /// Fetch a joke straight from the joke source, caching it for everyone
    pub async fn fetch_joke(&mut self) {
        self.view.joke_fetching();
        println!("{}", self.view.joke);

        let result = fetch_and_cache(&self.jokes, &self.store).await;
        if let Err(e) = &result {
            warn!("Joke fetch failed: {}", e);
        }
        self.view.joke_result(&result);
    }

    /// Ask the coordinator for a joke (`FETCH_JOKE`) or its cached one
    /// (`GET_LAST_JOKE`)
    pub async fn coordinator_joke(&mut self, request: Request) {
        match self.client.joke(&request).await {
            Ok(Some(joke)) => self.view.joke = joke,
            Ok(None) => self.view.joke = view::JOKE_TRY_AGAIN.to_string(),
            Err(e) => {
                warn!("{}", e);
                self.view.joke = view::JOKE_CHECK_NETWORK.to_string();
            }
        }
    }

    /// Print the view every time a broadcast changes it, until interrupted
    pub async fn watch(&mut self) -> Result<(), String> {
        println!("{}", self.view);
        let client = self.client.clone();
        let view = &mut self.view;

        tokio::select! {
            result = client.watch(|message| {
                view.apply(&message);
                println!("{}", view);
            }) => result,
            _ = shutdown_signal() => Ok(()),
        }
    }

    async fn fire_and_forget(&self, request: &Request) {
        if let Err(e) = self.client.send(request).await {
            warn!("{} not delivered: {}", request.name(), e);
        }
    }
}

/// Run one panel action and print the resulting view
pub async fn run<J: JokeSource>(
    action: PanelAction,
    client: PanelClient,
    store: PreferenceStore,
    jokes: J,
) -> Result<(), String> {
    let mut panel = Panel::open(client, store, jokes).await;
    info!("Panel action: {:?}", action);

    match action {
        PanelAction::Start { interval, sound } => panel.start(interval, sound).await,
        PanelAction::Stop => panel.stop().await,
        PanelAction::Snooze { minutes } => panel.snooze(minutes).await,
        PanelAction::Remind => panel.remind_now().await,
        PanelAction::Joke { via_coordinator: false } => panel.fetch_joke().await,
        PanelAction::Joke { via_coordinator: true } => panel.coordinator_joke(Request::FetchJoke).await,
        PanelAction::LastJoke => panel.coordinator_joke(Request::GetLastJoke).await,
        PanelAction::Status => {}
        PanelAction::Watch => return panel.watch().await,
    }

    println!("{}", panel.view());
    Ok(())
}
