//! Title resolution pass
//!
//! Walks the active chain from the root's first child down to the deepest
//! active segment. Every segment with a `title` contributes its label, then one
//! entry per resolver binding whose data is present (declared order). The
//! deepest template seen governs formatting.
//!
//! When the deepest segment carries no `title`, the previous state is returned
//! untouched, so navigating to an untitled page never blanks the title.

use serde_json::Value;
use tracing::debug;

use crate::snapshot::RouteSnapshot;
use crate::title_config::{TitleConfig, TitleEntry};

/// Run one resolution pass over `root`, starting from `previous`
pub fn resolve(root: &RouteSnapshot, previous: TitleConfig) -> TitleConfig {
    resolve_titles(root).unwrap_or(previous)
}

/// Fresh titles for `root`, or None when the deepest active segment is untitled
pub fn resolve_titles(root: &RouteSnapshot) -> Option<TitleConfig> {
    let mut titles = Vec::new();
    let mut template = None;
    let mut deepest_titled = false;

    let mut child = root.first_child();
    while let Some(segment) = child {
        deepest_titled = false;

        if let Some(config) = segment.data.title.as_deref() {
            deepest_titled = true;
            titles.push(TitleEntry::label(config.label.clone()));

            if let Some(candidate) = &config.template {
                template = Some(candidate.clone());
            }

            for binding in &config.resolvers {
                let Some((resolver_key, item_key)) = binding.keys() else {
                    continue;
                };
                if let Some((item, bucket)) = segment.data.lookup(resolver_key, item_key) {
                    titles.push(TitleEntry::resolved(label_text(item), bucket.clone()));
                }
            }
        }

        child = segment.first_child();
    }

    if deepest_titled {
        debug!(entries = titles.len(), templated = template.is_some(), "titles resolved");
        Some(TitleConfig { template, titles })
    } else {
        debug!("deepest segment has no title");
        None
    }
}

/// Compute the display title: template over all labels, else the first label
pub fn format(config: &TitleConfig) -> Option<String> {
    let first = config.titles.first()?;
    match &config.template {
        Some(template) => Some(template.call_labels(&config.labels())),
        None => Some(first.label.clone()),
    }
}

fn label_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
