//! Titles for views that aren't driven by route data

use crate::session::TitleHandle;

/// A fixed label a view publishes when it initializes
#[derive(Debug, Clone, Default)]
pub struct ViewTitle {
    pub label: Option<String>,
}

impl ViewTitle {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
        }
    }

    /// Publish the label through the session (empty or missing: no-op)
    pub fn init(&self, titles: &TitleHandle) {
        titles.set_title(self.label.as_deref());
    }
}
