//! Typed method-call arguments.

use bridge_traits::{error::Result, MethodCall};
use core_playback::StartRequest;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Method names understood by [`crate::AlertPlugin::handle_method_call`].
pub mod methods {
    pub const START_AUDIO: &str = "startAudio";
    pub const STOP_AUDIO: &str = "stopAudio";
    pub const GET_PLATFORM_VERSION: &str = "getPlatformVersion";
    pub const GET_PACKAGE_NAME: &str = "getPackageName";

    /// Outbound: delivered to the application when the notification is tapped.
    pub const ON_NOTIFICATION_TAPPED: &str = "onNotificationTapped";
}

/// Arguments of `startAudio`. Absent and `null` fields both fall back to the
/// configured defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StartAudioArgs {
    pub url: Option<String>,
    pub title: Option<String>,
    pub body: Option<String>,
    pub icon: Option<String>,
    #[serde(rename = "loop")]
    pub looping: Option<bool>,
}

impl StartAudioArgs {
    /// Decode from a method call, key by key, so a type mismatch names the
    /// offending argument.
    ///
    /// A `url` that is not a string is treated as absent: the alert is still
    /// shown, only without audio.
    pub fn from_call(call: &MethodCall) -> Result<Self> {
        let url = call.argument::<String>("url").unwrap_or_else(|err| {
            warn!(error = %err, "unusable stream url, showing notification only");
            None
        });

        Ok(Self {
            url,
            title: call.argument("title")?,
            body: call.argument("body")?,
            icon: call.argument("icon")?,
            looping: call.argument("loop")?,
        })
    }
}

impl From<StartAudioArgs> for StartRequest {
    fn from(args: StartAudioArgs) -> Self {
        StartRequest {
            url: args.url,
            title: args.title,
            body: args.body,
            icon: args.icon,
            looping: args.looping,
        }
    }
}
