//! External collaborators module
//! 
//! This module contains the joke source, notifications, sound playback and
//! the countdown display launcher. Each sits behind a small trait so the
//! coordinator can be driven with fakes.

pub mod audio;
pub mod display;
pub mod jokes;
pub mod notifier;

// Re-export main types
pub use audio::{AudioPlayer, CommandPlayer};
pub use display::{DisplayLauncher, NoDisplay, ProcessLauncher};
pub use jokes::{fetch_and_cache, HttpJokeSource, JokeError, JokeSource, FALLBACK_MESSAGE};
pub use notifier::{DesktopNotifier, Notifier, NOTIFICATION_TITLE};
