//! Probing audio renderer for desktop hosts
//!
//! Confirms that a stream is reachable and reports `Ready`, without decoding
//! or playing anything. `http(s)` sources are probed with a `GET` whose body
//! is never read; `file://` sources must exist on disk. Anything else is
//! rejected at prepare time.

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    AudioRenderer, PlaybackSessionId, RendererListener, RendererRequest, RendererSignal,
};
use reqwest::{Client, Url};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Renderer that validates sources and tracks session lifecycles.
pub struct HttpProbeRenderer {
    client: Client,
    sessions: Arc<RwLock<HashMap<PlaybackSessionId, TrackedSession>>>,
}

struct TrackedSession {
    looping: bool,
    playing: bool,
    probe: Option<JoinHandle<()>>,
}

impl HttpProbeRenderer {
    /// Create a renderer with default timeouts
    pub fn new() -> Result<Self> {
        Self::with_timeout(Duration::from_secs(15))
    }

    /// Create a renderer whose probes give up after `timeout`
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("audio-alert-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BridgeError::OperationFailed(format!("HTTP client: {e}")))?;

        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn is_playing(&self, session: PlaybackSessionId) -> bool {
        self.sessions
            .read()
            .await
            .get(&session)
            .map_or(false, |tracked| tracked.playing)
    }

    pub async fn active_sessions(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn parse_source(url: &str) -> Result<Url> {
        let parsed =
            Url::parse(url).map_err(|e| BridgeError::InvalidSource(format!("{url}: {e}")))?;
        match parsed.scheme() {
            "http" | "https" | "file" => Ok(parsed),
            other => Err(BridgeError::InvalidSource(format!(
                "unsupported scheme '{other}'"
            ))),
        }
    }

    async fn probe(client: Client, url: Url) -> std::result::Result<(), String> {
        if url.scheme() == "file" {
            let path = url
                .to_file_path()
                .map_err(|_| format!("invalid file path: {url}"))?;
            let metadata = tokio::fs::metadata(&path)
                .await
                .map_err(|e| format!("{}: {e}", path.display()))?;
            return if metadata.is_file() {
                Ok(())
            } else {
                Err(format!("{} is not a file", path.display()))
            };
        }

        let response = client.get(url).send().await.map_err(|e| e.to_string())?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(format!("HTTP {}", status.as_u16()))
        }
    }
}

#[async_trait]
impl AudioRenderer for HttpProbeRenderer {
    async fn prepare(
        &self,
        request: RendererRequest,
        listener: Arc<dyn RendererListener>,
    ) -> Result<()> {
        let url = Self::parse_source(&request.url)?;
        let session = request.session;
        let client = self.client.clone();

        // Held across the spawn so the probe cannot report before it is tracked
        let mut sessions = self.sessions.write().await;
        let probe = tokio::spawn(async move {
            match Self::probe(client, url).await {
                Ok(()) => listener.on_signal(session, RendererSignal::Ready),
                Err(message) => {
                    warn!(%session, error = %message, "stream probe failed");
                    listener.on_signal(session, RendererSignal::Error { message });
                }
            }
        });

        debug!(%session, looping = request.looping, attributes = ?request.attributes, "probing stream");
        sessions.insert(
            session,
            TrackedSession {
                looping: request.looping,
                playing: false,
                probe: Some(probe),
            },
        );
        Ok(())
    }

    async fn start(&self, session: PlaybackSessionId) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let tracked = sessions.get_mut(&session).ok_or_else(|| {
            BridgeError::OperationFailed(format!("session {session} was never prepared"))
        })?;

        tracked.playing = true;
        tracked.probe = None;
        info!(%session, looping = tracked.looping, "playback started");
        Ok(())
    }

    async fn release(&self, session: PlaybackSessionId) -> Result<()> {
        if let Some(tracked) = self.sessions.write().await.remove(&session) {
            if let Some(probe) = tracked.probe {
                probe.abort();
            }
            info!(%session, "renderer released");
        }
        Ok(())
    }
}
