//! Transient control panel fields and how messages change them

use std::fmt;

use crate::{
    api::Ack,
    services::JokeError,
    state::{store::DEFAULT_SOUND, Broadcast, TimerSnapshot},
};

pub const STATUS_RUNNING: &str = "Timer running";
pub const STATUS_STOPPED: &str = "Timer stopped";
pub const NEXT_UNKNOWN: &str = "Next in: --:--";
pub const JOKE_FETCHING: &str = "Fetching a dad joke…";
pub const JOKE_TRY_AGAIN: &str = "Couldn't fetch a joke — try again.";
pub const JOKE_CHECK_NETWORK: &str = "Couldn't fetch a joke — check network.";

/// What the panel shows. None of it is authoritative; it is rebuilt from
/// acknowledgements, broadcasts and the persisted preferences.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelView {
    pub status: String,
    pub next: String,
    pub joke: String,
    pub interval: String,
    pub sound: String,
    /// Interval and sound inputs are locked while the timer runs
    pub inputs_locked: bool,
    pub start_enabled: bool,
    pub stop_enabled: bool,
}

impl PanelView {
    /// Freshly opened panel: nothing known yet, stop disabled
    pub fn new() -> Self {
        Self {
            status: String::new(),
            next: NEXT_UNKNOWN.to_string(),
            joke: String::new(),
            interval: "20".to_string(),
            sound: DEFAULT_SOUND.to_string(),
            inputs_locked: false,
            start_enabled: true,
            stop_enabled: false,
        }
    }

    /// Apply the one-time load of persisted preferences
    pub fn load_preferences(&mut self, sound: Option<String>, last_joke: Option<String>) {
        if let Some(sound) = sound {
            self.sound = sound;
        }
        if let Some(joke) = last_joke {
            self.joke = joke;
        }
        self.stop_enabled = false;
    }

    pub fn set_running(&mut self) {
        self.status = STATUS_RUNNING.to_string();
        self.inputs_locked = true;
        self.start_enabled = false;
        self.stop_enabled = true;
    }

    pub fn set_stopped(&mut self) {
        self.status = STATUS_STOPPED.to_string();
        self.inputs_locked = false;
        self.start_enabled = true;
        self.stop_enabled = false;
        self.next = NEXT_UNKNOWN.to_string();
    }

    /// React to an unsolicited coordinator broadcast
    pub fn apply(&mut self, message: &Broadcast) {
        match message {
            Broadcast::CountdownUpdate { seconds_left } => {
                self.next = format_next(*seconds_left);
                self.set_running();
            }
            Broadcast::TimerStopped => self.set_stopped(),
            Broadcast::Snoozed { snooze_minutes } => {
                self.status = format!("Snoozed {}m", snooze_minutes);
            }
        }
    }

    /// React to a snooze acknowledgement
    pub fn apply_ack(&mut self, ack: &Ack) {
        if let Some(minutes) = ack.snooze_minutes {
            self.apply(&Broadcast::Snoozed { snooze_minutes: minutes });
        }
    }

    /// Sync with a status snapshot taken when the panel opens
    pub fn apply_status(&mut self, timer: &TimerSnapshot) {
        match timer.seconds_left {
            Some(seconds_left) if timer.active => {
                self.apply(&Broadcast::CountdownUpdate { seconds_left });
                self.interval = timer.period_minutes.to_string();
            }
            _ => self.set_stopped(),
        }
    }

    pub fn joke_fetching(&mut self) {
        self.joke = JOKE_FETCHING.to_string();
    }

    pub fn joke_result(&mut self, result: &Result<String, JokeError>) {
        self.joke = match result {
            Ok(joke) => joke.clone(),
            Err(e) if e.is_network() => JOKE_CHECK_NETWORK.to_string(),
            Err(_) => JOKE_TRY_AGAIN.to_string(),
        };
    }
}

impl Default for PanelView {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PanelView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let toggle = |enabled: bool| if enabled { "enabled" } else { "disabled" };
        let lock = if self.inputs_locked { " (locked)" } else { "" };

        writeln!(f, "{}", if self.status.is_empty() { "-" } else { self.status.as_str() })?;
        writeln!(f, "{}", self.next)?;
        writeln!(f, "Interval: {} min{}", self.interval, lock)?;
        writeln!(f, "Sound: {}{}", self.sound, lock)?;
        writeln!(f, "Start: {}  Stop: {}", toggle(self.start_enabled), toggle(self.stop_enabled))?;
        if !self.joke.is_empty() {
            writeln!(f, "Joke: {}", self.joke)?;
        }
        Ok(())
    }
}

/// `Next in: MM:SS`
pub fn format_next(seconds_left: u64) -> String {
    format!("Next in: {:02}:{:02}", seconds_left / 60, seconds_left % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn countdown_formats_minutes_and_seconds() {
        assert_eq!(format_next(0), "Next in: 00:00");
        assert_eq!(format_next(37), "Next in: 00:37");
        assert_eq!(format_next(20 * 60), "Next in: 20:00");
        assert_eq!(format_next(125 * 60 + 5), "Next in: 125:05");
    }

    #[test]
    fn tick_switches_to_running() {
        let mut view = PanelView::new();
        view.apply(&Broadcast::CountdownUpdate { seconds_left: 61 });

        assert_eq!(view.status, STATUS_RUNNING);
        assert_eq!(view.next, "Next in: 01:01");
        assert!(view.inputs_locked);
        assert!(!view.start_enabled);
        assert!(view.stop_enabled);
    }

    #[test]
    fn stopped_resets_countdown() {
        let mut view = PanelView::new();
        view.apply(&Broadcast::CountdownUpdate { seconds_left: 61 });
        view.apply(&Broadcast::TimerStopped);

        assert_eq!(view.status, STATUS_STOPPED);
        assert_eq!(view.next, NEXT_UNKNOWN);
        assert!(view.start_enabled);
        assert!(!view.stop_enabled);
    }

    #[test]
    fn snooze_updates_status_only() {
        let mut view = PanelView::new();
        view.set_running();
        view.apply_ack(&Ack::snoozed(5.0));
        assert_eq!(view.status, "Snoozed 5m");
        assert!(view.stop_enabled);

        view.apply_ack(&Ack::ok());
        assert_eq!(view.status, "Snoozed 5m");
    }

    #[test]
    fn preferences_fill_sound_and_joke() {
        let mut view = PanelView::new();
        view.load_preferences(Some("chime.mp3".into()), None);
        assert_eq!(view.sound, "chime.mp3");
        assert!(view.joke.is_empty());

        view.load_preferences(None, Some("cached".into()));
        assert_eq!(view.sound, "chime.mp3");
        assert_eq!(view.joke, "cached");
    }

    #[test]
    fn joke_failures_show_placeholders() {
        let mut view = PanelView::new();
        view.joke_fetching();
        assert_eq!(view.joke, JOKE_FETCHING);

        view.joke_result(&Err(JokeError::Missing));
        assert_eq!(view.joke, JOKE_TRY_AGAIN);

        view.joke_result(&Err(JokeError::Transport("dns".into())));
        assert_eq!(view.joke, JOKE_CHECK_NETWORK);

        view.joke_result(&Ok("ha".into()));
        assert_eq!(view.joke, "ha");
    }

    #[test]
    fn status_snapshot_syncs_view() {
        let mut view = PanelView::new();
        view.apply_status(&TimerSnapshot {
            active: true,
            period_minutes: 30.0,
            seconds_left: Some(90),
            next_fire_at: None,
        });
        assert_eq!(view.status, STATUS_RUNNING);
        assert_eq!(view.next, "Next in: 01:30");
        assert_eq!(view.interval, "30");

        view.apply_status(&TimerSnapshot {
            active: false,
            period_minutes: 30.0,
            seconds_left: None,
            next_fire_at: None,
        });
        assert_eq!(view.status, STATUS_STOPPED);
    }
}
