//! Lenient interpretation of minute values typed by the user

use std::time::Duration;

use serde_json::Value;

/// Reminder period used when none (or garbage) is given
pub const DEFAULT_INTERVAL_MINUTES: f64 = 20.0;
/// Snooze length used when none (or garbage) is given
pub const DEFAULT_SNOOZE_MINUTES: f64 = 5.0;
/// Anything longer than a year is treated as a typo
pub const MAX_MINUTES: f64 = 525_600.0;

/// Interpret a JSON value as a positive number of minutes.
///
/// Numbers and numeric strings are accepted; zero, negatives, non-finite
/// values, absurdly large values and anything else yield `default`.
pub fn minutes_or(value: Option<&Value>, default: f64) -> f64 {
    let parsed = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    sanitize(parsed, default)
}

/// Same as [`minutes_or`] for raw command line text
pub fn parse_minutes(input: &str, default: f64) -> f64 {
    sanitize(input.trim().parse::<f64>().ok(), default)
}

/// Same as [`minutes_or`] for an already numeric value
pub fn valid_minutes_or(minutes: f64, default: f64) -> f64 {
    sanitize(Some(minutes), default)
}

/// Convert a (sanitized) minute count into a duration
pub fn minutes_to_duration(minutes: f64) -> Duration {
    Duration::from_secs_f64(minutes * 60.0)
}

fn sanitize(parsed: Option<f64>, default: f64) -> f64 {
    match parsed {
        Some(m) if m.is_finite() && m > 0.0 && m <= MAX_MINUTES => m,
        _ => default,
    }
}
