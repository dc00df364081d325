//! Look Away - periodic eye-break reminders
//!
//! A background coordinator owns the reminder timer and fires a sound, a
//! dad joke notification and a short countdown every period. A control panel
//! drives it over a small HTTP API and follows its countdown broadcasts.

pub mod config;
pub mod state;
pub mod api;
pub mod coordinator;
pub mod services;
pub mod tasks;
pub mod utils;
pub mod panel;
pub mod countdown;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
pub use api::create_router;
pub use coordinator::{Coordinator, CoordinatorHandle};
pub use utils::signals::shutdown_signal;
