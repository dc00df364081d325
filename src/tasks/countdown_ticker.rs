//! Once-a-second countdown broadcast for open control panels

use std::time::Duration;

use tokio::{
    sync::broadcast,
    task::JoinHandle,
    time::{interval, Instant, MissedTickBehavior},
};
use tracing::debug;

use crate::state::{timer_state::seconds_until, Broadcast};

/// Spawn the countdown broadcast towards `next_fire_at`.
///
/// Publishes the remaining whole seconds immediately and then every second,
/// and exits after publishing 0. The caller owns the handle and must abort it
/// before starting another ticker.
pub fn spawn_countdown_ticker(
    next_fire_at: Instant,
    events: broadcast::Sender<Broadcast>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticks = interval(Duration::from_secs(1));
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticks.tick().await;
            let seconds_left = seconds_until(next_fire_at, Instant::now());

            // No listener is fine, panels come and go
            let _ = events.send(Broadcast::CountdownUpdate { seconds_left });

            if seconds_left == 0 {
                debug!("Countdown reached zero, ticker stopping");
                break;
            }
        }
    })
}
