//! # Desktop Bridge Implementations
//!
//! Default implementations of the alert bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! Desktop has no foreground-service notification or platform media player
//! the core can drive, so these shims stand in for them:
//! - `NotificationPresenter` as a tracing-backed presenter that keeps the
//!   visible notifications in memory
//! - `AudioRenderer` that probes the stream with `reqwest` (or the local
//!   filesystem for `file://` sources) and reports readiness
//! - `PlatformInfo` from the compile-time OS and architecture
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{DesktopPlatformInfo, HttpProbeRenderer, TracingNotificationPresenter};
//!
//! let presenter = TracingNotificationPresenter::new();
//! let renderer = HttpProbeRenderer::new()?;
//! let platform = DesktopPlatformInfo::new("com.example.alerts");
//! ```

mod notification;
mod platform;
mod renderer;

pub use notification::TracingNotificationPresenter;
pub use platform::DesktopPlatformInfo;
pub use renderer::HttpProbeRenderer;
