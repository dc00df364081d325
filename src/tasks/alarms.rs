//! Named recurring wake-ups
//!
//! The alarm service owns the schedule that decides when a reminder fires. It
//! outlives any single coordinator: a coordinator that is torn down and
//! rebuilt re-subscribes and finds its alarm still ticking.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use tokio::{
    sync::broadcast,
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{debug, info};

/// Name of the one alarm that drives reminders
pub const REMINDER_ALARM: &str = "eyeBreakAlarm";

/// Shortest period an alarm may recur at
pub const MIN_PERIOD: Duration = Duration::from_secs(1);

/// Delivered to subscribers every time an alarm goes off
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmFired {
    pub name: String,
    /// Identifies which `create` call produced this fire
    pub generation: u64,
    pub period: Duration,
    /// When this alarm will go off again
    pub next_fire_at: Instant,
}

/// Snapshot of a scheduled alarm
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlarmInfo {
    pub generation: u64,
    pub period: Duration,
    pub scheduled_time: Instant,
}

#[derive(Debug)]
struct AlarmEntry {
    generation: u64,
    first_fire: Instant,
    period: Duration,
    task: JoinHandle<()>,
}

impl AlarmEntry {
    fn scheduled_after(&self, now: Instant) -> Instant {
        next_fire_after(self.first_fire, self.period, now)
    }
}

/// First fire of the schedule `first_fire + k * period` that is still ahead
/// of `now`
fn next_fire_after(first_fire: Instant, period: Duration, now: Instant) -> Instant {
    if now < first_fire {
        return first_fire;
    }
    let elapsed = (now - first_fire).as_nanos();
    let periods = elapsed / period.as_nanos() + 1;
    u32::try_from(periods)
        .ok()
        .and_then(|n| period.checked_mul(n))
        .map(|offset| first_fire + offset)
        .unwrap_or(now + period)
}

#[derive(Debug, Clone)]
pub struct AlarmService {
    alarms: Arc<Mutex<HashMap<String, AlarmEntry>>>,
    fired_tx: broadcast::Sender<AlarmFired>,
    generations: Arc<AtomicU64>,
}

impl AlarmService {
    pub fn new() -> Self {
        let (fired_tx, _) = broadcast::channel(16);
        Self {
            alarms: Arc::new(Mutex::new(HashMap::new())),
            fired_tx,
            generations: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Receive every future alarm fire
    pub fn subscribe(&self) -> broadcast::Receiver<AlarmFired> {
        self.fired_tx.subscribe()
    }

    /// Schedule `name` to fire after `delay` and then every `period`.
    ///
    /// An existing alarm with the same name is replaced. Must be called from
    /// within a tokio runtime.
    pub fn create(&self, name: &str, delay: Duration, period: Duration) -> Result<AlarmInfo, String> {
        let period = period.max(MIN_PERIOD);
        let first_fire = Instant::now() + delay;
        let generation = self.generations.fetch_add(1, Ordering::Relaxed);

        let task = tokio::spawn(alarm_loop(
            name.to_string(),
            generation,
            first_fire,
            period,
            self.fired_tx.clone(),
        ));

        let mut alarms = self.alarms.lock()
            .map_err(|e| format!("Failed to lock alarms: {}", e))?;
        if let Some(previous) = alarms.insert(
            name.to_string(),
            AlarmEntry { generation, first_fire, period, task },
        ) {
            previous.task.abort();
        }

        info!("Alarm {} scheduled: first in {:?}, then every {:?}", name, delay, period);
        Ok(AlarmInfo { generation, period, scheduled_time: first_fire })
    }

    /// Cancel `name`. Returns whether an alarm was actually removed.
    pub fn clear(&self, name: &str) -> Result<bool, String> {
        let mut alarms = self.alarms.lock()
            .map_err(|e| format!("Failed to lock alarms: {}", e))?;

        match alarms.remove(name) {
            Some(entry) => {
                entry.task.abort();
                info!("Alarm {} cleared", name);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Look up a scheduled alarm
    pub fn get(&self, name: &str) -> Result<Option<AlarmInfo>, String> {
        let alarms = self.alarms.lock()
            .map_err(|e| format!("Failed to lock alarms: {}", e))?;

        let now = Instant::now();
        Ok(alarms.get(name).map(|entry| AlarmInfo {
            generation: entry.generation,
            period: entry.period,
            scheduled_time: entry.scheduled_after(now),
        }))
    }

    /// Number of alarms currently scheduled
    pub fn len(&self) -> usize {
        self.alarms.lock().map(|alarms| alarms.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for AlarmService {
    fn default() -> Self {
        Self::new()
    }
}

async fn alarm_loop(
    name: String,
    generation: u64,
    first_fire: Instant,
    period: Duration,
    fired_tx: broadcast::Sender<AlarmFired>,
) {
    let mut ticks = interval_at(first_fire, period);
    // After a long sleep fire once, not once per missed period
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let fired_at = ticks.tick().await;
        debug!("Alarm {} fired (generation {})", name, generation);

        // A late tick reports its missed deadline, so look ahead from the
        // real current time
        let now = Instant::now().max(fired_at);
        let fired = AlarmFired {
            name: name.clone(),
            generation,
            period,
            next_fire_at: next_fire_after(first_fire, period, now),
        };
        if fired_tx.send(fired).is_err() {
            debug!("Alarm {} fired with nobody listening", name);
        }
    }
}
