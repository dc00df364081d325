//! Shared state behind the HTTP API

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};

use crate::coordinator::CoordinatorHandle;
use super::{Broadcast, Indicator};

/// Everything a request handler needs to reach the coordinator
#[derive(Debug)]
pub struct AppState {
    /// Command channel into the coordinator
    pub coordinator: CoordinatorHandle,
    /// Topic the coordinator publishes broadcasts on
    pub events_tx: broadcast::Sender<Broadcast>,
    /// Current status indicator colour
    pub indicator_rx: watch::Receiver<Indicator>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    pub fn new(
        coordinator: CoordinatorHandle,
        events_tx: broadcast::Sender<Broadcast>,
        indicator_rx: watch::Receiver<Indicator>,
        port: u16,
        host: String,
    ) -> Self {
        Self {
            coordinator,
            events_tx,
            indicator_rx,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    /// Remember the most recent command for the status endpoint
    pub fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }

    pub fn indicator(&self) -> Indicator {
        *self.indicator_rx.borrow()
    }

    /// Listen for coordinator broadcasts
    pub fn subscribe(&self) -> broadcast::Receiver<Broadcast> {
        self.events_tx.subscribe()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }
}
