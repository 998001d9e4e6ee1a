//! Title session event log
//!
//! Append-only audit trail of what a session did on each navigation.
//! - Event: envelope with id + timestamp + kind
//! - EventKind: navigation / resolution / publish / lifecycle
//! - EventLog: thread-safe, cloneable handle to one shared log

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Single event in the session log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Monotonic sequence ID (for ordering)
    pub id: u64,
    /// Time since the log was created (ms)
    pub timestamp_ms: u64,
    pub kind: EventKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    // ═══════════════════════════════════════════
    // NAVIGATION
    // ═══════════════════════════════════════════
    /// Emitted last, once the pass for this navigation is complete
    NavigationHandled {
        navigation_id: u64,
        url: String,
    },

    // ═══════════════════════════════════════════
    // RESOLUTION
    // ═══════════════════════════════════════════
    TitlesResolved {
        labels: Vec<String>,
        templated: bool,
    },
    /// Deepest segment had no title; previous state kept
    TitlesRetained {
        labels: Vec<String>,
    },

    // ═══════════════════════════════════════════
    // PUBLISH
    // ═══════════════════════════════════════════
    TitlePublished {
        title: String,
    },
    /// Empty or missing title; nothing sent to the sink
    PublishSkipped,

    // ═══════════════════════════════════════════
    // LIFECYCLE
    // ═══════════════════════════════════════════
    SessionStarted {
        initial: Option<String>,
    },
    SessionTornDown,
}

impl EventKind {
    /// Published title, if this is a publish event
    pub fn published_title(&self) -> Option<&str> {
        match self {
            Self::TitlePublished { title } => Some(title.as_str()),
            _ => None,
        }
    }

    pub fn is_lifecycle_event(&self) -> bool {
        matches!(self, Self::SessionStarted { .. } | Self::SessionTornDown)
    }
}

/// Thread-safe, append-only event log
#[derive(Clone)]
pub struct EventLog {
    events: Arc<RwLock<Vec<Event>>>,
    start_time: Instant,
    next_id: Arc<AtomicU64>,
    handled: Arc<AtomicUsize>,
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
            start_time: Instant::now(),
            next_id: Arc::new(AtomicU64::new(0)),
            handled: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Emit an event (thread-safe, returns event ID)
    pub fn emit(&self, kind: EventKind) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let event = Event {
            id,
            timestamp_ms: self.start_time.elapsed().as_millis() as u64,
            kind,
        };

        let handled = matches!(event.kind, EventKind::NavigationHandled { .. });
        self.events.write().push(event);
        if handled {
            self.handled.fetch_add(1, Ordering::SeqCst);
        }
        id
    }

    /// Get all events (cloned)
    pub fn events(&self) -> Vec<Event> {
        self.events.read().clone()
    }

    /// Titles sent to the sink, in order
    pub fn published_titles(&self) -> Vec<String> {
        self.events
            .read()
            .iter()
            .filter_map(|e| e.kind.published_title().map(str::to_string))
            .collect()
    }

    /// Number of navigations the session has fully handled
    pub fn navigations_handled(&self) -> usize {
        self.handled.load(Ordering::SeqCst)
    }

    /// Serialize to JSON for persistence/debugging
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self.events()).unwrap_or(Value::Null)
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog")
            .field("len", &self.len())
            .finish()
    }
}
