//! Desktop walkthrough of the alert plugin.
//!
//! Starts an alert for the URL given on the command line (or a
//! notification-only alert when none is given), waits for the stream probe,
//! then simulates the user tapping the notification.
//!
//! ```text
//! cargo run -p core-service --example alert_demo -- https://example.com/siren.mp3
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bridge_traits::{error::Result as BridgeResult, LogLevel, MethodCall, MethodChannel};
use core_runtime::config::AlertConfig;
use core_runtime::events::{CoreEvent, SessionEvent};
use core_runtime::logging::{init_logging, LogFormat, LoggingConfig};
use serde_json::{json, Value};

struct PrintingChannel;

#[async_trait]
impl MethodChannel for PrintingChannel {
    fn name(&self) -> &str {
        core_runtime::config::DEFAULT_METHOD_CHANNEL
    }

    async fn invoke_method(&self, method: &str, arguments: Value) -> BridgeResult<()> {
        println!("-> app: {method}({arguments})");
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(
        LoggingConfig::default()
            .with_format(LogFormat::Compact)
            .with_level(LogLevel::Debug),
    )?;

    let plugin = core_service::bootstrap_desktop(
        AlertConfig::default(),
        "com.example.alerts",
        Arc::new(PrintingChannel),
    )?;
    let mut events = plugin.session().subscribe();

    let version = plugin
        .handle_method_call(MethodCall::bare("getPlatformVersion"))
        .await;
    println!("platform: {version:?}");

    let url = std::env::args().nth(1);
    plugin
        .handle_method_call(MethodCall::new(
            "startAudio",
            json!({ "url": url, "title": "Demo alert", "loop": false }),
        ))
        .await;

    // Give the probe a moment to report
    let deadline = tokio::time::sleep(Duration::from_secs(5));
    tokio::pin!(deadline);
    loop {
        tokio::select! {
            _ = &mut deadline => break,
            event = events.recv() => match event {
                Ok(event) => {
                    println!("event: {}", event.description());
                    if !matches!(event, CoreEvent::Session(SessionEvent::Starting { .. })) {
                        break;
                    }
                }
                Err(_) => break,
            },
        }
    }

    plugin.on_notification_tapped().await;
    plugin.shutdown().await;
    Ok(())
}
