//! State management module
//! 
//! This module contains the coordinator's timer state, the shared server
//! state, broadcast messages and the persisted preference store.

pub mod app_state;
pub mod events;
pub mod store;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use events::{Broadcast, Indicator};
pub use store::PreferenceStore;
pub use timer_state::{TimerSnapshot, TimerState};
