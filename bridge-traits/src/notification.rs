//! Notification presenter contract.
//!
//! The presenter is the host facility that renders a persistent, tappable
//! system notification (Android `NotificationManager` + foreground service,
//! iOS `UNUserNotificationCenter`, desktop notification daemons). The core
//! treats it as an opaque sink: it asks for a channel to exist, presents a
//! notification and later withdraws it. Taps travel back through the session
//! owner, not through this trait.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Importance assigned to a notification channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationImportance {
    Low,
    Default,
    High,
}

/// Per-notification priority for hosts without channel support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationPriority {
    Default,
    High,
    Max,
}

/// Semantic category hint used by the host to rank the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationCategory {
    Alarm,
    Transport,
    Service,
}

/// Icon reference passed through to the host.
///
/// Resolving a named icon (drawable, mipmap, asset catalog) is entirely the
/// host's job; the core never inspects the name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NotificationIcon {
    #[default]
    Default,
    Named(String),
}

impl NotificationIcon {
    /// Build an icon reference from an optional caller-supplied name.
    /// Blank names fall back to the host default.
    pub fn from_name(name: Option<&str>) -> Self {
        match name.map(str::trim) {
            Some(name) if !name.is_empty() => Self::Named(name.to_string()),
            _ => Self::Default,
        }
    }
}

/// Channel the alert notifications are posted to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationChannelSpec {
    pub id: String,
    pub name: String,
    pub description: String,
    pub importance: NotificationImportance,
    /// The channel itself plays no sound; audio comes from the renderer.
    pub silent: bool,
    pub vibration: bool,
}

/// Everything the host needs to render the persistent notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationContent {
    pub id: i32,
    pub channel_id: String,
    pub title: String,
    pub body: String,
    pub icon: NotificationIcon,
    pub ongoing: bool,
    pub priority: NotificationPriority,
    pub category: NotificationCategory,
    /// Bring the application to the foreground when the user taps.
    pub open_app_on_tap: bool,
}

/// Host notification facility.
///
/// # Example
///
/// ```ignore
/// use bridge_traits::notification::NotificationPresenter;
///
/// async fn clear(presenter: &dyn NotificationPresenter) {
///     presenter.withdraw(888).await.ok();
/// }
/// ```
#[async_trait::async_trait]
pub trait NotificationPresenter: Send + Sync {
    /// Make sure the channel exists. Hosts without channels return `Ok(())`.
    async fn ensure_channel(&self, channel: &NotificationChannelSpec) -> Result<()>;

    /// Show (or replace) the notification identified by `content.id`.
    async fn present(&self, content: &NotificationContent) -> Result<()>;

    /// Remove the notification. Must succeed when nothing is shown.
    async fn withdraw(&self, notification_id: i32) -> Result<()>;
}
