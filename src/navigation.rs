//! Router lifecycle events and a broadcast bus to deliver them

use futures::Stream;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::warn;

/// Router lifecycle events; only `NavigationEnd` triggers a title pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RouterEvent {
    NavigationStart { id: u64, url: String },
    NavigationEnd { id: u64, url: String },
    NavigationCancel { id: u64, url: String, reason: String },
    NavigationError { id: u64, url: String, error: String },
}

impl RouterEvent {
    pub fn is_navigation_end(&self) -> bool {
        matches!(self, Self::NavigationEnd { .. })
    }

    pub fn url(&self) -> &str {
        match self {
            Self::NavigationStart { url, .. }
            | Self::NavigationEnd { url, .. }
            | Self::NavigationCancel { url, .. }
            | Self::NavigationError { url, .. } => url,
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            Self::NavigationStart { id, .. }
            | Self::NavigationEnd { id, .. }
            | Self::NavigationCancel { id, .. }
            | Self::NavigationError { id, .. } => *id,
        }
    }
}

/// Broadcast channel of router events
#[derive(Debug, Clone)]
pub struct NavigationBus {
    sender: broadcast::Sender<RouterEvent>,
}

impl Default for NavigationBus {
    fn default() -> Self {
        Self::new(64)
    }
}

impl NavigationBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event; returns how many subscribers saw it
    pub fn emit(&self, event: RouterEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Subscribe as a stream. Lagged receivers skip what they missed.
    pub fn events(&self) -> impl Stream<Item = RouterEvent> + Send + 'static {
        BroadcastStream::new(self.sender.subscribe()).filter_map(|event| match event {
            Ok(event) => Some(event),
            Err(err) => {
                warn!(error = %err, "navigation subscriber lagged");
                None
            }
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
