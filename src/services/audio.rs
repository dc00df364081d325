//! Reminder sound playback through an external player

use std::{
    path::{Path, PathBuf},
    process::Stdio,
};

use async_trait::async_trait;
use tokio::{process::Command, sync::OnceCell};
use tracing::{debug, info};

/// Players probed in order when none is configured
const CANDIDATE_PLAYERS: &[&[&str]] = &[
    &["paplay"],
    &["aplay", "-q"],
    &["afplay"],
    &["ffplay", "-nodisp", "-autoexit", "-loglevel", "quiet"],
];

#[async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Make sure something can play sounds, creating it on first use
    async fn ensure_ready(&self) -> Result<(), String>;

    /// Play a sound file by identifier
    async fn play(&self, sound: &str) -> Result<(), String>;
}

/// Plays sounds from a directory with a command line player
#[derive(Debug)]
pub struct CommandPlayer {
    sounds_dir: PathBuf,
    configured: Option<Vec<String>>,
    resolved: OnceCell<Vec<String>>,
}

impl CommandPlayer {
    /// `player` is a full command line such as `"mpv --no-video"`; when absent
    /// the first available well-known player is used.
    pub fn new(sounds_dir: impl Into<PathBuf>, player: Option<&str>) -> Self {
        let configured = player
            .map(|p| p.split_whitespace().map(str::to_string).collect::<Vec<_>>())
            .filter(|argv| !argv.is_empty());

        Self {
            sounds_dir: sounds_dir.into(),
            configured,
            resolved: OnceCell::new(),
        }
    }

    /// Resolve an identifier to a file inside the sounds directory
    pub fn sound_path(&self, sound: &str) -> Result<PathBuf, String> {
        let name = Path::new(sound)
            .file_name()
            .ok_or_else(|| format!("Invalid sound identifier: {:?}", sound))?;
        Ok(self.sounds_dir.join(name))
    }

    async fn resolve(&self) -> Result<Vec<String>, String> {
        if let Some(argv) = &self.configured {
            check_available(&argv[0]).await?;
            return Ok(argv.clone());
        }

        for candidate in CANDIDATE_PLAYERS {
            if check_available(candidate[0]).await.is_ok() {
                return Ok(candidate.iter().map(|s| s.to_string()).collect());
            }
        }

        Err("No audio player found (tried paplay, aplay, afplay, ffplay)".to_string())
    }
}

#[async_trait]
impl AudioPlayer for CommandPlayer {
    async fn ensure_ready(&self) -> Result<(), String> {
        let argv = self.resolved.get_or_try_init(|| self.resolve()).await?;
        debug!("Audio player ready: {}", argv.join(" "));
        Ok(())
    }

    async fn play(&self, sound: &str) -> Result<(), String> {
        let argv = self.resolved.get_or_try_init(|| self.resolve()).await?;
        let path = self.sound_path(sound)?;

        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(format!("Sound file not found: {}", path.display()));
        }

        info!("Playing {}", path.display());
        let output = Command::new(&argv[0])
            .args(&argv[1..])
            .arg(&path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| format!("Failed to execute {}: {}", argv[0], e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("{} failed: {}", argv[0], stderr.trim()));
        }

        Ok(())
    }
}

/// Check that a program can be spawned at all; its exit code is irrelevant
async fn check_available(program: &str) -> Result<(), String> {
    Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .map_err(|_| format!("{} is not available", program))?;
    Ok(())
}
