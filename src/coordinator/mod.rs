//! Timer coordinator
//!
//! A single task owns the [`TimerState`] and is the only thing that mutates
//! it. Commands arrive over a channel, each carrying a oneshot for its
//! acknowledgement; alarm fires arrive from the [`AlarmService`]. Handlers
//! apply all state changes synchronously and push anything slow (joke
//! fetches, notifications, sound) onto spawned tasks, so a hanging request
//! never delays the next command.

pub mod reminder;

use tokio::{
    sync::{broadcast, mpsc, oneshot, watch},
    task::JoinHandle,
    time::Instant,
};
use tracing::{debug, error, info, warn};

use crate::{
    state::{Broadcast, Indicator, TimerSnapshot, TimerState},
    tasks::{spawn_countdown_ticker, AlarmFired, AlarmService, REMINDER_ALARM},
    utils::{minutes_to_duration, valid_minutes_or, DEFAULT_INTERVAL_MINUTES, DEFAULT_SNOOZE_MINUTES},
};

pub use reminder::ReminderServices;

const COMMAND_BUFFER: usize = 32;

/// Requests handled by the coordinator
#[derive(Debug)]
pub enum Command {
    Start { interval_minutes: f64, reply: oneshot::Sender<()> },
    Stop { reply: oneshot::Sender<()> },
    Snooze { minutes: f64, reply: oneshot::Sender<f64> },
    ShowReminderNow { reply: oneshot::Sender<()> },
    FetchJoke { reply: oneshot::Sender<Option<String>> },
    GetLastJoke { reply: oneshot::Sender<Option<String>> },
    Status { reply: oneshot::Sender<TimerSnapshot> },
}

/// Cheap, cloneable way to talk to a running coordinator
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    tx: mpsc::Sender<Command>,
}

impl CoordinatorHandle {
    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T, String> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| "Coordinator is not running".to_string())?;
        response
            .await
            .map_err(|_| "Coordinator dropped the request".to_string())
    }

    pub async fn start(&self, interval_minutes: f64) -> Result<(), String> {
        self.request(|reply| Command::Start { interval_minutes, reply }).await
    }

    pub async fn stop(&self) -> Result<(), String> {
        self.request(|reply| Command::Stop { reply }).await
    }

    /// Returns the snooze length actually applied
    pub async fn snooze(&self, minutes: f64) -> Result<f64, String> {
        self.request(|reply| Command::Snooze { minutes, reply }).await
    }

    /// Resolves once the reminder has been shown
    pub async fn show_reminder_now(&self) -> Result<(), String> {
        self.request(|reply| Command::ShowReminderNow { reply }).await
    }

    pub async fn fetch_joke(&self) -> Result<Option<String>, String> {
        self.request(|reply| Command::FetchJoke { reply }).await
    }

    pub async fn last_joke(&self) -> Result<Option<String>, String> {
        self.request(|reply| Command::GetLastJoke { reply }).await
    }

    pub async fn status(&self) -> Result<TimerSnapshot, String> {
        self.request(|reply| Command::Status { reply }).await
    }
}

pub struct Coordinator {
    timer: TimerState,
    /// Generation of the alarm this coordinator believes is live
    alarm_generation: Option<u64>,
    alarms: AlarmService,
    ticker: Option<JoinHandle<()>>,
    events: broadcast::Sender<Broadcast>,
    indicator: watch::Sender<Indicator>,
    services: ReminderServices,
}

impl Coordinator {
    /// Build a coordinator, adopting the reminder alarm if one is already
    /// scheduled (the previous coordinator went away but the alarm did not).
    pub fn new(
        alarms: AlarmService,
        services: ReminderServices,
        events: broadcast::Sender<Broadcast>,
        indicator: watch::Sender<Indicator>,
    ) -> Self {
        let mut coordinator = Self {
            timer: TimerState::new(DEFAULT_INTERVAL_MINUTES),
            alarm_generation: None,
            alarms,
            ticker: None,
            events,
            indicator,
            services,
        };

        match coordinator.alarms.get(REMINDER_ALARM) {
            Ok(Some(alarm)) => {
                info!("Adopting existing reminder alarm (generation {})", alarm.generation);
                coordinator.alarm_generation = Some(alarm.generation);
                coordinator.timer.resync(duration_minutes(alarm.period), alarm.scheduled_time);
            }
            Ok(None) => {}
            Err(e) => error!("Failed to look up reminder alarm: {}", e),
        }
        coordinator.publish_indicator();

        coordinator
    }

    /// Run the coordinator on its own task
    pub fn spawn(self) -> (CoordinatorHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let fired = self.alarms.subscribe();
        let task = tokio::spawn(self.run(rx, fired));
        (CoordinatorHandle { tx }, task)
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<Command>,
        mut fired: broadcast::Receiver<AlarmFired>,
    ) {
        info!("Starting timer coordinator");
        if self.timer.is_active() {
            self.restart_ticker();
        }

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                fire = fired.recv() => match fire {
                    Ok(fire) => self.handle_fire(fire),
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!("Coordinator missed {} alarm fires", missed);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        error!("Alarm service went away");
                        break;
                    }
                },
            }
        }

        self.stop_ticker();
        info!("Timer coordinator stopped");
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Start { interval_minutes, reply } => {
                self.start(interval_minutes);
                let _ = reply.send(());
            }
            Command::Stop { reply } => {
                self.stop();
                let _ = reply.send(());
            }
            Command::Snooze { minutes, reply } => {
                let applied = self.snooze(minutes);
                let _ = reply.send(applied);
            }
            Command::ShowReminderNow { reply } => {
                self.after_reminder(Instant::now());
                let services = self.services.clone();
                tokio::spawn(async move {
                    services.run_reminder().await;
                    let _ = reply.send(());
                });
            }
            Command::FetchJoke { reply } => {
                let services = self.services.clone();
                tokio::spawn(async move {
                    let _ = reply.send(services.fetch_joke().await);
                });
            }
            Command::GetLastJoke { reply } => {
                let services = self.services.clone();
                tokio::spawn(async move {
                    let _ = reply.send(services.last_joke().await);
                });
            }
            Command::Status { reply } => {
                let _ = reply.send(self.timer.snapshot(Instant::now()));
            }
        }
    }

    fn start(&mut self, interval_minutes: f64) {
        if self.timer.is_active() {
            debug!("Start ignored, timer already running");
            return;
        }

        let minutes = valid_minutes_or(interval_minutes, DEFAULT_INTERVAL_MINUTES);
        let period = minutes_to_duration(minutes);

        let alarm = match self.alarms.create(REMINDER_ALARM, period, period) {
            Ok(alarm) => alarm,
            Err(e) => {
                error!("Failed to schedule reminder alarm: {}", e);
                return;
            }
        };

        self.alarm_generation = Some(alarm.generation);
        self.timer.start(minutes, Instant::now());
        self.timer.arm(alarm.scheduled_time);
        self.publish_indicator();
        self.restart_ticker();
        info!("Timer started, reminding every {} minutes", minutes);
    }

    fn stop(&mut self) {
        if let Err(e) = self.alarms.clear(REMINDER_ALARM) {
            error!("Failed to clear reminder alarm: {}", e);
        }
        self.alarm_generation = None;
        self.timer.stop();
        self.stop_ticker();
        self.publish_indicator();
        self.broadcast(Broadcast::TimerStopped);
        info!("Timer stopped");
    }

    /// Delay the next reminder; later reminders keep the configured period
    fn snooze(&mut self, minutes: f64) -> f64 {
        let minutes = valid_minutes_or(minutes, DEFAULT_SNOOZE_MINUTES);

        match self.alarms.create(REMINDER_ALARM, minutes_to_duration(minutes), self.timer.period()) {
            Ok(alarm) => {
                self.alarm_generation = Some(alarm.generation);
                self.timer.arm(alarm.scheduled_time);
            }
            Err(e) => {
                error!("Failed to reschedule reminder alarm: {}", e);
                self.timer.snooze(minutes, Instant::now());
            }
        }

        self.publish_indicator();
        self.restart_ticker();
        self.broadcast(Broadcast::Snoozed { snooze_minutes: minutes });
        info!("Snoozed for {} minutes", minutes);
        minutes
    }

    fn handle_fire(&mut self, fire: AlarmFired) {
        if fire.name != REMINDER_ALARM {
            return;
        }

        // Only the live alarm counts; a fire queued before Stop or Snooze
        // replaced it is dropped
        let live = match self.alarms.get(REMINDER_ALARM) {
            Ok(live) => live,
            Err(e) => {
                error!("Failed to look up reminder alarm: {}", e);
                return;
            }
        };
        if live.map(|alarm| alarm.generation) != Some(fire.generation) {
            debug!("Ignoring stale alarm fire (generation {})", fire.generation);
            return;
        }

        if self.alarm_generation != Some(fire.generation) {
            info!("Resynchronizing timer state from reminder alarm");
            self.alarm_generation = Some(fire.generation);
        }
        self.timer.resync(duration_minutes(fire.period), fire.next_fire_at);
        self.publish_indicator();
        self.restart_ticker();

        let services = self.services.clone();
        tokio::spawn(async move {
            services.run_reminder().await;
        });
    }

    /// Schedule bookkeeping after a reminder shown on demand
    fn after_reminder(&mut self, now: Instant) {
        match self.timer.reschedule_from(now) {
            Some(_) => self.restart_ticker(),
            None => self.stop_ticker(),
        }
    }

    fn restart_ticker(&mut self) {
        self.stop_ticker();
        if let Some(next_fire_at) = self.timer.next_fire_at() {
            self.ticker = Some(spawn_countdown_ticker(next_fire_at, self.events.clone()));
        }
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }

    fn publish_indicator(&self) {
        self.indicator.send_replace(Indicator::for_active(self.timer.is_active()));
    }

    fn broadcast(&self, message: Broadcast) {
        // Having no listener is the normal case
        if self.events.send(message).is_err() {
            debug!("Broadcast dropped, no listeners");
        }
    }
}

impl Drop for Coordinator {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}

fn duration_minutes(period: std::time::Duration) -> f64 {
    period.as_secs_f64() / 60.0
}
