//! Unsolicited messages pushed to whichever display is listening

use serde::{Deserialize, Serialize};

/// Broadcast published by the coordinator. Nobody acknowledges these, and
/// having no subscriber at all is normal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Broadcast {
    #[serde(rename_all = "camelCase")]
    CountdownUpdate { seconds_left: u64 },
    TimerStopped,
    #[serde(rename_all = "camelCase")]
    Snoozed { snooze_minutes: f64 },
}

/// Status indicator shown next to the app name (the tray/badge colour)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    Green,
    Gray,
}

impl Indicator {
    pub fn for_active(active: bool) -> Self {
        if active { Self::Green } else { Self::Gray }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn broadcasts_use_wire_names() {
        let tick = serde_json::to_value(Broadcast::CountdownUpdate { seconds_left: 42 }).unwrap();
        assert_eq!(tick, json!({"type": "COUNTDOWN_UPDATE", "secondsLeft": 42}));

        let stopped = serde_json::to_value(Broadcast::TimerStopped).unwrap();
        assert_eq!(stopped, json!({"type": "TIMER_STOPPED"}));

        let snoozed: Broadcast =
            serde_json::from_value(json!({"type": "SNOOZED", "snoozeMinutes": 5.0})).unwrap();
        assert_eq!(snoozed, Broadcast::Snoozed { snooze_minutes: 5.0 });
    }
}
