//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::services::jokes::DEFAULT_JOKE_URL;

/// CLI argument parsing structure
#[derive(Debug, Parser)]
#[command(name = "look-away")]
#[command(about = "Periodic eye-break reminders: look 20 feet away for 20 seconds")]
#[command(version)]
pub struct Config {
    /// Host address of the coordinator
    #[arg(long, global = true, default_value = "127.0.0.1")]
    pub host: String,

    /// Port of the coordinator
    #[arg(short, long, global = true, default_value = "20554")]
    pub port: u16,

    /// Directory holding storage.json
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Dad joke endpoint
    #[arg(long, global = true, default_value = DEFAULT_JOKE_URL)]
    pub joke_url: String,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the timer coordinator
    Serve(ServeArgs),
    /// Control and observe the running coordinator
    Panel {
        #[command(subcommand)]
        action: PanelAction,
    },
    /// Show the 20 second countdown
    Countdown,
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Directory holding the reminder sounds
    #[arg(long)]
    pub sounds_dir: Option<PathBuf>,

    /// Audio player command, e.g. "paplay" or "aplay -q"
    #[arg(long)]
    pub player: Option<String>,

    /// Terminal command wrapping the countdown display, e.g. "x-terminal-emulator -e"
    #[arg(long)]
    pub terminal: Option<String>,

    /// Do not open a countdown display on reminders
    #[arg(long)]
    pub no_display: bool,

    /// Notification icon
    #[arg(long)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum PanelAction {
    /// Save the sound and start the timer
    Start {
        /// Minutes between reminders
        #[arg(short, long)]
        interval: Option<String>,
        /// Sound file name
        #[arg(short, long)]
        sound: Option<String>,
    },
    /// Stop the timer
    Stop,
    /// Push the next reminder out
    Snooze {
        #[arg(short, long)]
        minutes: Option<String>,
    },
    /// Show a reminder right away
    Remind,
    /// Fetch a fresh dad joke
    Joke {
        /// Ask the coordinator instead of the joke source
        #[arg(long)]
        via_coordinator: bool,
    },
    /// Show the last cached joke
    LastJoke,
    /// Show the timer state
    Status,
    /// Follow the countdown until interrupted
    Watch,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.address())
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// `--data-dir`, or the platform data directory
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("look-away")
        })
    }
}

impl ServeArgs {
    /// `--sounds-dir`, or `sounds/` under the data directory
    pub fn sounds_dir(&self, data_dir: &std::path::Path) -> PathBuf {
        self.sounds_dir.clone().unwrap_or_else(|| data_dir.join("sounds"))
    }
}
