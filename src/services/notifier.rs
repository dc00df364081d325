//! Desktop notifications

use async_trait::async_trait;
use notify_rust::Notification;
use tracing::debug;

pub const NOTIFICATION_TITLE: &str = "Look 20 feet away 👀";

const APP_NAME: &str = "Look Away";
const DEFAULT_ICON: &str = "appointment-soon";

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Show a notification; delivery is fire-and-forget
    async fn notify(&self, title: &str, body: &str) -> Result<(), String>;
}

/// Notifications through the platform notification server
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    icon: String,
}

impl DesktopNotifier {
    pub fn new(icon: Option<String>) -> Self {
        Self {
            icon: icon.unwrap_or_else(|| DEFAULT_ICON.to_string()),
        }
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new(None)
    }
}

#[async_trait]
impl Notifier for DesktopNotifier {
    async fn notify(&self, title: &str, body: &str) -> Result<(), String> {
        let mut notification = Notification::new();
        notification
            .appname(APP_NAME)
            .summary(title)
            .body(body)
            .icon(&self.icon);

        #[cfg(all(unix, not(target_os = "macos")))]
        notification.urgency(notify_rust::Urgency::Critical);

        // Talking to the notification daemon blocks
        tokio::task::spawn_blocking(move || notification.show().map(|_| ()))
            .await
            .map_err(|e| format!("Notification task failed: {}", e))?
            .map_err(|e| format!("Failed to show notification: {}", e))?;

        debug!("Notification shown: {}", title);
        Ok(())
    }
}
