//! Title session
//!
//! A `TitleSession` subscribes to router events when it starts. Each
//! `NavigationEnd` runs one synchronous pass: read the current snapshot,
//! resolve titles, format, publish to the sink. Other router events are ignored.
//!
//! Consumers that need to force a title (views not driven by route data) get a
//! cloneable `TitleHandle` instead of reaching for a global.
//!
//! Recording into an `EventLog` is opt-in via `TitleSessionBuilder::event_log`;
//! a session without one keeps nothing but a handled-navigation counter.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::{Stream, StreamExt};
use parking_lot::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::error::TitleError;
use crate::event_log::{EventKind, EventLog};
use crate::navigation::RouterEvent;
use crate::resolve::{format, resolve_titles};
use crate::snapshot::{RouteSnapshot, SnapshotSource};
use crate::title_config::TitleConfig;

/// Display surface receiving the final title
pub trait TitleSink: Send + Sync {
    fn set_title(&self, title: &str);
}

impl<F> TitleSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn set_title(&self, title: &str) {
        self(title)
    }
}

/// In-memory document title (records every publish)
#[derive(Debug, Clone, Default)]
pub struct DocumentTitle {
    history: Arc<RwLock<Vec<String>>>,
}

impl DocumentTitle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current title, if anything was ever published
    pub fn current(&self) -> Option<String> {
        self.history.read().last().cloned()
    }

    pub fn history(&self) -> Vec<String> {
        self.history.read().clone()
    }

    pub fn publish_count(&self) -> usize {
        self.history.read().len()
    }
}

impl TitleSink for DocumentTitle {
    fn set_title(&self, title: &str) {
        self.history.write().push(title.to_string());
    }
}

/// Shared access to a session's title state
#[derive(Clone)]
pub struct TitleHandle {
    state: Arc<Mutex<TitleConfig>>,
    sink: Arc<dyn TitleSink>,
    log: Option<EventLog>,
    handled: Arc<AtomicUsize>,
}

impl TitleHandle {
    fn new(state: TitleConfig, sink: Arc<dyn TitleSink>, log: Option<EventLog>) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            sink,
            log,
            handled: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn record(&self, kind: EventKind) {
        if let Some(log) = &self.log {
            log.emit(kind);
        }
    }

    /// Title derived from the current state (None when there are no entries)
    pub fn get_title(&self) -> Option<String> {
        format(&self.state.lock())
    }

    /// Publish `label` to the sink. Missing or empty labels are ignored.
    pub fn set_title(&self, label: Option<&str>) {
        match label {
            Some(label) if !label.is_empty() => {
                debug!(title = label, "publishing title");
                self.sink.set_title(label);
                self.record(EventKind::TitlePublished {
                    title: label.to_string(),
                });
            }
            _ => {
                debug!("empty title, nothing published");
                self.record(EventKind::PublishSkipped);
            }
        }
    }

    /// Snapshot of the current title state
    pub fn config(&self) -> TitleConfig {
        self.state.lock().clone()
    }

    /// One full pass for a completed navigation
    pub fn handle_navigation(&self, navigation_id: u64, url: &str, snapshot: &RouteSnapshot) {
        let title = {
            let mut state = self.state.lock();
            match resolve_titles(snapshot) {
                Some(resolved) => {
                    self.record(EventKind::TitlesResolved {
                        labels: resolved.labels().iter().map(|l| l.to_string()).collect(),
                        templated: resolved.template.is_some(),
                    });
                    *state = resolved;
                }
                None => {
                    debug!(url, "no title on deepest segment, keeping previous title");
                    self.record(EventKind::TitlesRetained {
                        labels: state.labels().iter().map(|l| l.to_string()).collect(),
                    });
                }
            }
            format(&state)
        };

        self.set_title(title.as_deref());
        self.record(EventKind::NavigationHandled {
            navigation_id,
            url: url.to_string(),
        });
        self.handled.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of navigations fully handled so far
    pub fn navigations_handled(&self) -> usize {
        self.handled.load(Ordering::SeqCst)
    }

    /// The session's event log, if one was supplied
    pub fn events(&self) -> Option<&EventLog> {
        self.log.as_ref()
    }
}

impl std::fmt::Debug for TitleHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TitleHandle")
            .field("state", &*self.state.lock())
            .finish()
    }
}

/// Options for starting a session
#[derive(Debug, Default)]
pub struct TitleSessionBuilder {
    initial_title: Option<String>,
    log: Option<EventLog>,
}

impl TitleSessionBuilder {
    /// Seed the state with the page's default title
    pub fn initial_title(mut self, title: impl Into<String>) -> Self {
        self.initial_title = Some(title.into());
        self
    }

    /// Record session activity into `log` (nothing is recorded otherwise)
    pub fn event_log(mut self, log: EventLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Subscribe to `events` and start handling navigations.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn start<S>(
        self,
        sink: Arc<dyn TitleSink>,
        events: S,
        snapshots: Arc<dyn SnapshotSource>,
    ) -> Result<TitleSession, TitleError>
    where
        S: Stream<Item = RouterEvent> + Send + 'static,
    {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| TitleError::NoRuntime)?;

        let state = match &self.initial_title {
            Some(title) => TitleConfig::with_initial(title.clone()),
            None => TitleConfig::new(),
        };
        let handle = TitleHandle::new(state, sink, self.log);
        handle.record(EventKind::SessionStarted {
            initial: self.initial_title,
        });

        let active = Arc::new(Mutex::new(true));
        let task_active = Arc::clone(&active);
        let task_handle = handle.clone();
        let subscription = runtime.spawn(async move {
            let mut events = Box::pin(events);
            while let Some(event) = events.next().await {
                let RouterEvent::NavigationEnd { id, url } = event else {
                    continue;
                };
                // held for the whole pass so teardown waits for it to finish
                let handled = {
                    let active = task_active.lock();
                    if *active {
                        let snapshot = snapshots.current();
                        task_handle.handle_navigation(id, &url, &snapshot);
                    }
                    *active
                };
                if !handled {
                    debug!(navigation_id = id, "session torn down, navigation dropped");
                    break;
                }
            }
            debug!("navigation subscription finished");
        });

        info!("title session started");
        Ok(TitleSession {
            handle,
            active,
            subscription: Some(subscription),
        })
    }
}

/// Long-lived title session owning its state and subscription
#[derive(Debug)]
pub struct TitleSession {
    handle: TitleHandle,
    /// Cleared on teardown; checked by the subscription before every pass
    active: Arc<Mutex<bool>>,
    subscription: Option<JoinHandle<()>>,
}

impl TitleSession {
    pub fn builder() -> TitleSessionBuilder {
        TitleSessionBuilder::default()
    }

    /// Start with default options
    pub fn start<S>(
        sink: Arc<dyn TitleSink>,
        events: S,
        snapshots: Arc<dyn SnapshotSource>,
    ) -> Result<Self, TitleError>
    where
        S: Stream<Item = RouterEvent> + Send + 'static,
    {
        Self::builder().start(sink, events, snapshots)
    }

    pub fn get_title(&self) -> Option<String> {
        self.handle.get_title()
    }

    pub fn set_title(&self, label: Option<&str>) {
        self.handle.set_title(label)
    }

    /// Handle for consumers that need to read or force the title
    pub fn handle(&self) -> TitleHandle {
        self.handle.clone()
    }

    pub fn config(&self) -> TitleConfig {
        self.handle.config()
    }

    pub fn events(&self) -> Option<&EventLog> {
        self.handle.events()
    }

    pub fn navigations_handled(&self) -> usize {
        self.handle.navigations_handled()
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Release the subscription. Further calls do nothing.
    ///
    /// Blocks until an in-flight pass completes; no pass starts afterwards.
    pub fn teardown(&mut self) {
        let Some(subscription) = self.subscription.take() else {
            debug!("title session already torn down");
            return;
        };
        *self.active.lock() = false;
        subscription.abort();
        self.handle.record(EventKind::SessionTornDown);
        info!("title session torn down");
    }
}

impl Drop for TitleSession {
    fn drop(&mut self) {
        self.teardown();
    }
}
