//! # Alert Configuration
//!
//! Settings shared by the playback session and the service façade: which
//! notification channel alerts are posted to, how the notification looks,
//! the fallbacks applied to start requests and the audio attributes handed
//! to the renderer.
//!
//! ## Usage
//!
//! ```
//! use core_runtime::config::AlertConfig;
//!
//! let config = AlertConfig::builder()
//!     .channel_name("Door Alerts")
//!     .notification_id(42)
//!     .default_title("Doorbell")
//!     .build()
//!     .expect("valid config");
//!
//! assert_eq!(config.notification.id, 42);
//! ```
//!
//! ## Validation
//!
//! [`AlertConfigBuilder::build`] fails fast with [`Error::Config`] when an
//! identifier is empty or a numeric setting is zero:
//!
//! ```should_panic
//! use core_runtime::config::AlertConfig;
//!
//! AlertConfig::builder()
//!     .channel_id("")
//!     .build()
//!     .expect("empty channel id is rejected");
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{
    AudioAttributes, AudioContentType, AudioUsage, NotificationCategory, NotificationChannelSpec,
    NotificationImportance, NotificationPriority,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CHANNEL_ID: &str = "generic_audio_alert_channel";
pub const DEFAULT_CHANNEL_NAME: &str = "Critical Alerts";
pub const DEFAULT_CHANNEL_DESCRIPTION: &str = "Notifications for critical audio alerts";
pub const DEFAULT_NOTIFICATION_ID: i32 = 888;
pub const DEFAULT_TITLE: &str = "Alert";
pub const DEFAULT_BODY: &str = "Playing audio...";
pub const DEFAULT_METHOD_CHANNEL: &str = "generic_audio_notification";

fn default_channel() -> NotificationChannelSpec {
    NotificationChannelSpec {
        id: DEFAULT_CHANNEL_ID.to_string(),
        name: DEFAULT_CHANNEL_NAME.to_string(),
        description: DEFAULT_CHANNEL_DESCRIPTION.to_string(),
        importance: NotificationImportance::High,
        silent: true,
        vibration: true,
    }
}

/// Presentation settings for the persistent notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    pub id: i32,
    pub priority: NotificationPriority,
    pub category: NotificationCategory,
    pub ongoing: bool,
    pub open_app_on_tap: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            id: DEFAULT_NOTIFICATION_ID,
            priority: NotificationPriority::Max,
            category: NotificationCategory::Alarm,
            ongoing: true,
            open_app_on_tap: true,
        }
    }
}

/// Values substituted for fields a start request leaves out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StartDefaults {
    pub title: String,
    pub body: String,
    pub looping: bool,
}

impl Default for StartDefaults {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            body: DEFAULT_BODY.to_string(),
            looping: true,
        }
    }
}

/// Complete alert configuration. Deserialises from camel-case JSON so a host
/// can ship it alongside its own settings; missing keys take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertConfig {
    pub notification_channel: NotificationChannelSpec,
    pub notification: NotificationSettings,
    pub defaults: StartDefaults,
    pub audio_attributes: AudioAttributes,
    pub method_channel_name: String,
    pub event_buffer_size: usize,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            notification_channel: default_channel(),
            notification: NotificationSettings::default(),
            defaults: StartDefaults::default(),
            audio_attributes: AudioAttributes::default(),
            method_channel_name: DEFAULT_METHOD_CHANNEL.to_string(),
            event_buffer_size: DEFAULT_EVENT_BUFFER_SIZE,
        }
    }
}

impl AlertConfig {
    pub fn builder() -> AlertConfigBuilder {
        AlertConfigBuilder::default()
    }

    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Invalid alert config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let channel = &self.notification_channel;
        if channel.id.trim().is_empty() {
            return Err(Error::Config(
                "Notification channel id cannot be empty".to_string(),
            ));
        }

        if channel.name.trim().is_empty() {
            return Err(Error::Config(
                "Notification channel name cannot be empty".to_string(),
            ));
        }

        if self.notification.id == 0 {
            return Err(Error::Config(
                "Notification id must be non-zero (0 is rejected by foreground services)"
                    .to_string(),
            ));
        }

        if self.method_channel_name.trim().is_empty() {
            return Err(Error::Config(
                "Method channel name cannot be empty".to_string(),
            ));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Builder for [`AlertConfig`].
#[derive(Debug, Default)]
pub struct AlertConfigBuilder {
    config: AlertConfig,
}

impl AlertConfigBuilder {
    pub fn channel_id(mut self, id: impl Into<String>) -> Self {
        self.config.notification_channel.id = id.into();
        self
    }

    pub fn channel_name(mut self, name: impl Into<String>) -> Self {
        self.config.notification_channel.name = name.into();
        self
    }

    pub fn channel_description(mut self, description: impl Into<String>) -> Self {
        self.config.notification_channel.description = description.into();
        self
    }

    pub fn channel_importance(mut self, importance: NotificationImportance) -> Self {
        self.config.notification_channel.importance = importance;
        self
    }

    pub fn vibration(mut self, enabled: bool) -> Self {
        self.config.notification_channel.vibration = enabled;
        self
    }

    pub fn notification_id(mut self, id: i32) -> Self {
        self.config.notification.id = id;
        self
    }

    pub fn priority(mut self, priority: NotificationPriority) -> Self {
        self.config.notification.priority = priority;
        self
    }

    pub fn category(mut self, category: NotificationCategory) -> Self {
        self.config.notification.category = category;
        self
    }

    pub fn open_app_on_tap(mut self, open: bool) -> Self {
        self.config.notification.open_app_on_tap = open;
        self
    }

    pub fn default_title(mut self, title: impl Into<String>) -> Self {
        self.config.defaults.title = title.into();
        self
    }

    pub fn default_body(mut self, body: impl Into<String>) -> Self {
        self.config.defaults.body = body.into();
        self
    }

    pub fn default_loop(mut self, looping: bool) -> Self {
        self.config.defaults.looping = looping;
        self
    }

    pub fn audio_content_type(mut self, content_type: AudioContentType) -> Self {
        self.config.audio_attributes.content_type = content_type;
        self
    }

    pub fn audio_usage(mut self, usage: AudioUsage) -> Self {
        self.config.audio_attributes.usage = usage;
        self
    }

    pub fn method_channel_name(mut self, name: impl Into<String>) -> Self {
        self.config.method_channel_name = name.into();
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.config.event_buffer_size = size;
        self
    }

    pub fn build(self) -> Result<AlertConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
