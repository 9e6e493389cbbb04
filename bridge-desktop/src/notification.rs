//! Notification presenter for desktop hosts
//!
//! Desktop builds have no persistent foreground notification to post, so the
//! presenter logs each request and keeps the currently visible notifications
//! in memory. Embedders that own a real notification daemon implement
//! [`NotificationPresenter`] themselves.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    NotificationChannelSpec, NotificationContent, NotificationPresenter,
};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Tracing-backed notification presenter.
#[derive(Debug, Default)]
pub struct TracingNotificationPresenter {
    channels: RwLock<HashMap<String, NotificationChannelSpec>>,
    visible: RwLock<HashMap<i32, NotificationContent>>,
}

impl TracingNotificationPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notification currently shown under `id`, if any.
    pub async fn visible(&self, id: i32) -> Option<NotificationContent> {
        self.visible.read().await.get(&id).cloned()
    }

    pub async fn visible_count(&self) -> usize {
        self.visible.read().await.len()
    }

    pub async fn has_channel(&self, id: &str) -> bool {
        self.channels.read().await.contains_key(id)
    }
}

#[async_trait]
impl NotificationPresenter for TracingNotificationPresenter {
    async fn ensure_channel(&self, channel: &NotificationChannelSpec) -> Result<()> {
        let mut channels = self.channels.write().await;
        if channels.contains_key(&channel.id) {
            return Ok(());
        }

        debug!(
            channel = %channel.id,
            name = %channel.name,
            importance = ?channel.importance,
            "notification channel registered"
        );
        channels.insert(channel.id.clone(), channel.clone());
        Ok(())
    }

    async fn present(&self, content: &NotificationContent) -> Result<()> {
        if !self.has_channel(&content.channel_id).await {
            return Err(BridgeError::NotAvailable(format!(
                "notification channel '{}' has not been created",
                content.channel_id
            )));
        }

        info!(
            notification_id = content.id,
            channel = %content.channel_id,
            title = %content.title,
            body = %content.body,
            priority = ?content.priority,
            "notification shown"
        );
        self.visible
            .write()
            .await
            .insert(content.id, content.clone());
        Ok(())
    }

    async fn withdraw(&self, notification_id: i32) -> Result<()> {
        if self.visible.write().await.remove(&notification_id).is_some() {
            info!(notification_id, "notification withdrawn");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::{
        NotificationCategory, NotificationIcon, NotificationImportance, NotificationPriority,
    };

    fn channel() -> NotificationChannelSpec {
        NotificationChannelSpec {
            id: "alerts".into(),
            name: "Alerts".into(),
            description: "Alert channel".into(),
            importance: NotificationImportance::High,
            silent: true,
            vibration: true,
        }
    }

    fn content(title: &str) -> NotificationContent {
        NotificationContent {
            id: 888,
            channel_id: "alerts".into(),
            title: title.into(),
            body: "Playing audio...".into(),
            icon: NotificationIcon::Default,
            ongoing: true,
            priority: NotificationPriority::Max,
            category: NotificationCategory::Alarm,
            open_app_on_tap: true,
        }
    }

    #[tokio::test]
    async fn test_present_requires_channel() {
        let presenter = TracingNotificationPresenter::new();
        let result = presenter.present(&content("Alert")).await;
        assert!(matches!(result, Err(BridgeError::NotAvailable(_))));
    }

    #[tokio::test]
    async fn test_present_replaces_same_id() {
        let presenter = TracingNotificationPresenter::new();
        presenter.ensure_channel(&channel()).await.unwrap();
        presenter.ensure_channel(&channel()).await.unwrap();

        presenter.present(&content("First")).await.unwrap();
        presenter.present(&content("Second")).await.unwrap();

        assert_eq!(presenter.visible_count().await, 1);
        assert_eq!(presenter.visible(888).await.unwrap().title, "Second");
    }

    #[tokio::test]
    async fn test_withdraw_is_idempotent() {
        let presenter = TracingNotificationPresenter::new();
        presenter.ensure_channel(&channel()).await.unwrap();
        presenter.present(&content("Alert")).await.unwrap();

        presenter.withdraw(888).await.unwrap();
        presenter.withdraw(888).await.unwrap();

        assert!(presenter.visible(888).await.is_none());
    }
}
