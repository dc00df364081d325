//! Typed command messages accepted on `POST /message`

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A command for the coordinator. Numeric fields are kept as raw JSON so
/// that junk like `"abc"` can fall back to a default instead of being
/// rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Request {
    StartTimer {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        interval: Option<Value>,
    },
    StopTimer,
    Snooze {
        #[serde(default, rename = "snoozeMinutes", skip_serializing_if = "Option::is_none")]
        snooze_minutes: Option<Value>,
    },
    ShowReminderNow,
    FetchJoke,
    GetLastJoke,
}

impl Request {
    /// Wire name, used for last-action tracking
    pub fn name(&self) -> &'static str {
        match self {
            Request::StartTimer { .. } => "START_TIMER",
            Request::StopTimer => "STOP_TIMER",
            Request::Snooze { .. } => "SNOOZE",
            Request::ShowReminderNow => "SHOW_REMINDER_NOW",
            Request::FetchJoke => "FETCH_JOKE",
            Request::GetLastJoke => "GET_LAST_JOKE",
        }
    }
}
