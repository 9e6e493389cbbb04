//! Tap forwarding to the application layer.

use async_trait::async_trait;
use bridge_traits::MethodChannel;
use core_playback::{TapEvent, TapHandler};
use std::sync::Arc;
use tracing::{debug, error};

use crate::args::methods;

/// Delivers tap events over the method channel as `onNotificationTapped`.
pub struct ChannelTapForwarder {
    channel: Arc<dyn MethodChannel>,
}

impl ChannelTapForwarder {
    pub fn new(channel: Arc<dyn MethodChannel>) -> Self {
        Self { channel }
    }
}

#[async_trait]
impl TapHandler for ChannelTapForwarder {
    async fn on_tap(&self, event: TapEvent) {
        let payload = match serde_json::to_value(&event) {
            Ok(payload) => payload,
            Err(err) => {
                error!(error = %err, "failed to encode tap payload");
                return;
            }
        };

        match self
            .channel
            .invoke_method(methods::ON_NOTIFICATION_TAPPED, payload)
            .await
        {
            Ok(()) => debug!(channel = self.channel.name(), "tap forwarded"),
            Err(err) => error!(
                channel = self.channel.name(),
                error = %err,
                "failed to forward notification tap"
            ),
        }
    }
}
