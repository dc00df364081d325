//! Background tasks module
//! 
//! This module contains the timers that run alongside the coordinator: the
//! named wake-up alarms and the cosmetic countdown broadcast.

pub mod alarms;
pub mod countdown_ticker;

// Re-export main types and functions
pub use alarms::{AlarmFired, AlarmInfo, AlarmService, REMINDER_ALARM};
pub use countdown_ticker::spawn_countdown_ticker;
