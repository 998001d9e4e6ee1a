//! Active route chain snapshots
//!
//! A snapshot is the chain of currently matched segments, root first. Each
//! segment carries its typed `title` slot plus the data its resolvers produced,
//! keyed by resolver key. Lookups that miss return None; callers skip them.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::title_config::RouteTitleConfig;

/// Data attached to one active segment
#[derive(Debug, Clone, Default)]
pub struct SegmentData {
    /// Well-known `title` slot
    pub title: Option<Arc<RouteTitleConfig>>,
    /// Resolver key → resolved value
    resolved: FxHashMap<String, Value>,
}

impl SegmentData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<Arc<RouteTitleConfig>>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_resolved(mut self, resolver_key: impl Into<String>, value: Value) -> Self {
        self.insert_resolved(resolver_key, value);
        self
    }

    pub fn insert_resolved(&mut self, resolver_key: impl Into<String>, value: Value) {
        self.resolved.insert(resolver_key.into(), value);
    }

    /// The whole bucket a resolver produced
    pub fn resolved(&self, resolver_key: &str) -> Option<&Value> {
        self.resolved.get(resolver_key)
    }

    /// `data[resolver_key][item_key]`, with the bucket it came from.
    /// Null counts as missing.
    pub fn lookup(&self, resolver_key: &str, item_key: &str) -> Option<(&Value, &Value)> {
        let bucket = self.resolved.get(resolver_key)?;
        let item = bucket.get(item_key)?;
        if item.is_null() {
            return None;
        }
        Some((item, bucket))
    }
}

/// One segment of the active chain
#[derive(Debug, Clone, Default)]
pub struct RouteSnapshot {
    pub data: SegmentData,
    pub first_child: Option<Box<RouteSnapshot>>,
}

impl RouteSnapshot {
    pub fn new(data: SegmentData) -> Self {
        Self {
            data,
            first_child: None,
        }
    }

    /// Root segment carrying no data
    pub fn root() -> Self {
        Self::default()
    }

    pub fn with_child(mut self, child: RouteSnapshot) -> Self {
        self.first_child = Some(Box::new(child));
        self
    }

    /// Build a chain from segments in root-to-leaf order.
    /// Returns a bare root for an empty iterator.
    pub fn chain(segments: impl IntoIterator<Item = SegmentData>) -> Self {
        let mut segments: Vec<SegmentData> = segments.into_iter().collect();
        let Some(leaf) = segments.pop() else {
            return Self::root();
        };
        segments
            .into_iter()
            .rev()
            .fold(Self::new(leaf), |child, data| Self::new(data).with_child(child))
    }

    pub fn first_child(&self) -> Option<&RouteSnapshot> {
        self.first_child.as_deref()
    }

    /// Number of segments including this one
    pub fn depth(&self) -> usize {
        let mut depth = 1;
        let mut node = self;
        while let Some(child) = node.first_child() {
            depth += 1;
            node = child;
        }
        depth
    }
}

/// Accessor for the current route snapshot (read on every navigation)
pub trait SnapshotSource: Send + Sync {
    fn current(&self) -> Arc<RouteSnapshot>;
}

impl<F> SnapshotSource for F
where
    F: Fn() -> Arc<RouteSnapshot> + Send + Sync,
{
    fn current(&self) -> Arc<RouteSnapshot> {
        self()
    }
}

/// Snapshot holder that a router (or a test) swaps before signalling
#[derive(Debug, Clone, Default)]
pub struct SharedSnapshot {
    inner: Arc<parking_lot::RwLock<Arc<RouteSnapshot>>>,
}

impl SharedSnapshot {
    pub fn new(snapshot: RouteSnapshot) -> Self {
        Self {
            inner: Arc::new(parking_lot::RwLock::new(Arc::new(snapshot))),
        }
    }

    pub fn replace(&self, snapshot: RouteSnapshot) {
        *self.inner.write() = Arc::new(snapshot);
    }
}

impl SnapshotSource for SharedSnapshot {
    fn current(&self) -> Arc<RouteSnapshot> {
        self.inner.read().clone()
    }
}
