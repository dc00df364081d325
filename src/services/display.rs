//! Opening the countdown display

use std::{path::PathBuf, process::Stdio};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

#[async_trait]
pub trait DisplayLauncher: Send + Sync {
    /// Open a fresh countdown display. Returns once it has been launched.
    async fn open_countdown(&self) -> Result<(), String>;
}

/// Launches the countdown as a separate process, optionally inside a terminal
/// emulator (`--terminal "x-terminal-emulator -e"`)
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    argv: Vec<String>,
}

impl ProcessLauncher {
    pub fn new(terminal: Option<&str>, program: PathBuf, args: Vec<String>) -> Self {
        let mut argv: Vec<String> = terminal
            .map(|t| t.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        argv.push(program.to_string_lossy().into_owned());
        argv.extend(args);
        Self { argv }
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }
}

#[async_trait]
impl DisplayLauncher for ProcessLauncher {
    async fn open_countdown(&self) -> Result<(), String> {
        let mut child = Command::new(&self.argv[0])
            .args(&self.argv[1..])
            .stdin(Stdio::null())
            .spawn()
            .map_err(|e| format!("Failed to launch countdown display: {}", e))?;

        info!("Countdown display launched");

        // Reap the child so it does not linger as a zombie
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) if status.success() => debug!("Countdown display closed"),
                Ok(status) => warn!("Countdown display exited with {}", status),
                Err(e) => warn!("Failed to wait for countdown display: {}", e),
            }
        });

        Ok(())
    }
}

/// Used with `--no-display`
#[derive(Debug, Clone, Default)]
pub struct NoDisplay;

#[async_trait]
impl DisplayLauncher for NoDisplay {
    async fn open_countdown(&self) -> Result<(), String> {
        debug!("Countdown display disabled");
        Ok(())
    }
}
