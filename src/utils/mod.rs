//! Utility functions module
//! 
//! This module contains utility functions used throughout the application.

pub mod minutes;
pub mod signals;

// Re-export main functions
pub use minutes::{
    minutes_or, minutes_to_duration, parse_minutes, valid_minutes_or,
    DEFAULT_INTERVAL_MINUTES, DEFAULT_SNOOZE_MINUTES,
};
pub use signals::shutdown_signal;
