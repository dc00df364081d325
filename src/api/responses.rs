//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{Indicator, TimerSnapshot};

/// Acknowledgement of a timer command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
    #[serde(default, rename = "snoozeMinutes", skip_serializing_if = "Option::is_none")]
    pub snooze_minutes: Option<f64>,
}

impl Ack {
    pub fn ok() -> Self {
        Self { ok: true, snooze_minutes: None }
    }

    pub fn snoozed(minutes: f64) -> Self {
        Self { ok: true, snooze_minutes: Some(minutes) }
    }
}

/// Answer to the joke requests; `joke` is null when there is none
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JokeReply {
    pub joke: Option<String>,
}

/// Exactly one of these answers every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply {
    Ack(Ack),
    Joke(JokeReply),
}

/// Status response with timer information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerSnapshot,
    pub indicator: Indicator,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
