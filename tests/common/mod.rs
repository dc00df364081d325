//! Shared fixtures for the integration tests

#![allow(dead_code)]

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use axum::Router;
use tokio::{
    net::TcpListener,
    sync::{broadcast, watch},
    task::JoinHandle,
};

use look_away::{
    api::create_router,
    coordinator::{Coordinator, ReminderServices},
    services::{AudioPlayer, JokeError, JokeSource, NoDisplay, Notifier},
    state::{AppState, Indicator, PreferenceStore},
    tasks::AlarmService,
};

pub const JOKE: &str = "I'm reading a book about anti-gravity. It's impossible to put down.";

pub struct StaticJokes;

#[async_trait]
impl JokeSource for StaticJokes {
    async fn fetch(&self) -> Result<String, JokeError> {
        Ok(JOKE.to_string())
    }
}

#[derive(Default)]
pub struct Notifications(pub Mutex<Vec<String>>);

#[async_trait]
impl Notifier for Notifications {
    async fn notify(&self, _title: &str, body: &str) -> Result<(), String> {
        self.0.lock().unwrap().push(body.to_string());
        Ok(())
    }
}

pub struct Silent;

#[async_trait]
impl AudioPlayer for Silent {
    async fn ensure_ready(&self) -> Result<(), String> {
        Ok(())
    }

    async fn play(&self, _sound: &str) -> Result<(), String> {
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub notifications: Arc<Notifications>,
    pub coordinator: JoinHandle<()>,
}

/// Router backed by a real coordinator with quiet services
pub fn test_app(store: PreferenceStore) -> TestApp {
    let notifications = Arc::new(Notifications::default());
    let services = ReminderServices {
        store,
        jokes: Arc::new(StaticJokes),
        notifier: notifications.clone(),
        audio: Arc::new(Silent),
        display: Arc::new(NoDisplay),
    };

    let (events_tx, _) = broadcast::channel(64);
    let (indicator_tx, indicator_rx) = watch::channel(Indicator::Gray);
    let (handle, coordinator) = Coordinator::new(
        AlarmService::new(),
        services,
        events_tx.clone(),
        indicator_tx,
    )
    .spawn();

    let state = Arc::new(AppState::new(handle, events_tx, indicator_rx, 0, "127.0.0.1".to_string()));

    TestApp {
        router: create_router(state),
        notifications,
        coordinator,
    }
}

/// Serve a router on an ephemeral local port
pub async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}
