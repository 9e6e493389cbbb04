//! Plugin façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (notification
//! presenter, audio renderer, method channel, platform info) into the shared
//! playback core and answers the application's method calls. Desktop apps
//! typically enable the `desktop-shims` feature (which depends on
//! `bridge-desktop`); mobile hosts supply their own bridges.
//!
//! ## Method calls
//!
//! | Method | Arguments | Reply |
//! |---|---|---|
//! | `startAudio` | `url`, `title`, `body`, `icon`, `loop` (all optional) | `null` |
//! | `stopAudio` | none | `null` |
//! | `getPlatformVersion` | none | version string |
//! | `getPackageName` | none | application id |
//!
//! Taps on the notification reach the application as an outbound
//! `onNotificationTapped` call carrying `{timestamp, title, body, url}`.

pub mod args;
pub mod error;
pub mod tap;

pub use args::{methods, StartAudioArgs};
pub use error::{Result, ServiceError};
pub use tap::ChannelTapForwarder;

use std::sync::Arc;

use bridge_traits::{
    AudioRenderer, Clock, MethodCall, MethodChannel, MethodResponse, NotificationPresenter,
    PlatformInfo,
};
use core_playback::{PlaybackSession, SessionDependencies};
use core_runtime::config::AlertConfig;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Error code returned when a method call carries malformed arguments.
pub const INVALID_ARGUMENT: &str = "INVALID_ARGUMENT";

/// Aggregated handle to all bridge dependencies the plugin requires.
#[derive(Clone)]
pub struct PluginDependencies {
    pub presenter: Arc<dyn NotificationPresenter>,
    pub renderer: Arc<dyn AudioRenderer>,
    pub method_channel: Arc<dyn MethodChannel>,
    pub platform_info: Arc<dyn PlatformInfo>,
    pub clock: Arc<dyn Clock>,
}

impl PluginDependencies {
    /// Construct a dependency bundle from explicit bridge handles.
    pub fn new(
        presenter: Arc<dyn NotificationPresenter>,
        renderer: Arc<dyn AudioRenderer>,
        method_channel: Arc<dyn MethodChannel>,
        platform_info: Arc<dyn PlatformInfo>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            presenter,
            renderer,
            method_channel,
            platform_info,
            clock,
        }
    }
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct AlertPlugin {
    session: PlaybackSession,
    platform_info: Arc<dyn PlatformInfo>,
}

impl AlertPlugin {
    /// Create the plugin and its playback session. Must be called from within
    /// a Tokio runtime.
    pub fn new(config: AlertConfig, deps: PluginDependencies) -> Result<Self> {
        if deps.method_channel.name() != config.method_channel_name {
            return Err(ServiceError::InitializationFailed(format!(
                "method channel '{}' does not match configured '{}'",
                deps.method_channel.name(),
                config.method_channel_name
            )));
        }

        let session = PlaybackSession::new(
            config,
            SessionDependencies {
                presenter: deps.presenter,
                renderer: deps.renderer,
                tap_handler: Arc::new(ChannelTapForwarder::new(deps.method_channel)),
                clock: deps.clock,
            },
        )?;

        info!("alert plugin ready");
        Ok(Self {
            session,
            platform_info: deps.platform_info,
        })
    }

    /// Answer a method call from the application layer.
    pub async fn handle_method_call(&self, call: MethodCall) -> MethodResponse {
        debug!(method = %call.method, "method call");
        match call.method.as_str() {
            methods::START_AUDIO => match StartAudioArgs::from_call(&call) {
                Ok(args) => {
                    self.start_audio(args).await;
                    MethodResponse::success_empty()
                }
                Err(err) => {
                    warn!(error = %err, "startAudio rejected");
                    MethodResponse::Error {
                        code: INVALID_ARGUMENT.to_string(),
                        message: err.to_string(),
                    }
                }
            },
            methods::STOP_AUDIO => {
                self.stop_audio().await;
                MethodResponse::success_empty()
            }
            methods::GET_PLATFORM_VERSION => {
                MethodResponse::Success(Value::String(self.platform_version()))
            }
            methods::GET_PACKAGE_NAME => MethodResponse::Success(Value::String(self.package_name())),
            other => {
                debug!(method = other, "method not implemented");
                MethodResponse::NotImplemented
            }
        }
    }

    pub async fn start_audio(&self, args: StartAudioArgs) {
        if let Err(err) = self.session.start(args.into()).await {
            warn!(error = %err, "startAudio ignored");
        }
    }

    pub async fn stop_audio(&self) {
        self.session.stop().await;
    }

    /// Entry point for the host's notification tap intent.
    pub async fn on_notification_tapped(&self) {
        self.session.notification_tapped().await;
    }

    pub fn platform_version(&self) -> String {
        self.platform_info.platform_version()
    }

    pub fn package_name(&self) -> String {
        self.platform_info.package_name()
    }

    /// The underlying session, for renderer wiring and diagnostics.
    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    /// Called when the host's background context is destroyed.
    pub async fn shutdown(&self) {
        self.session.shutdown().await;
    }
}

/// Convenience bootstrapper for desktop hosts.
///
/// ```ignore
/// use core_runtime::config::AlertConfig;
///
/// let plugin = core_service::bootstrap_desktop(
///     AlertConfig::default(),
///     "com.example.alerts",
///     method_channel,
/// )?;
/// ```
#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
pub fn bootstrap_desktop(
    config: AlertConfig,
    package_name: impl Into<String>,
    method_channel: Arc<dyn MethodChannel>,
) -> Result<AlertPlugin> {
    use bridge_desktop::{DesktopPlatformInfo, HttpProbeRenderer, TracingNotificationPresenter};
    use bridge_traits::SystemClock;

    let deps = PluginDependencies::new(
        Arc::new(TracingNotificationPresenter::new()),
        Arc::new(HttpProbeRenderer::new()?),
        method_channel,
        Arc::new(DesktopPlatformInfo::new(package_name)),
        Arc::new(SystemClock),
    );
    AlertPlugin::new(config, deps)
}
