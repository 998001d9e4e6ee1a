//! Title configuration model
//!
//! - `RouteTitleConfig`: declarative, attached to a route segment under `title`
//! - `TitleEntry`: one label produced by a resolution pass
//! - `TitleConfig`: per-session state (entries + governing template)

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::template::{self, TemplateFn};

/// Binding from a segment's resolved data to an extra label
///
/// Both keys are optional on purpose: a binding missing either one is
/// malformed and simply produces no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResolverBinding {
    #[serde(default, alias = "resolver", alias = "resolverKey")]
    pub resolver_key: Option<String>,
    #[serde(default, alias = "itemKey")]
    pub item_key: Option<String>,
}

impl ResolverBinding {
    pub fn new(resolver_key: impl Into<String>, item_key: impl Into<String>) -> Self {
        Self {
            resolver_key: Some(resolver_key.into()),
            item_key: Some(item_key.into()),
        }
    }

    /// Both keys, or None when the binding is malformed
    pub fn keys(&self) -> Option<(&str, &str)> {
        match (self.resolver_key.as_deref(), self.item_key.as_deref()) {
            (Some(r), Some(i)) if !r.is_empty() && !i.is_empty() => Some((r, i)),
            _ => None,
        }
    }
}

/// Raw form as written in route files (template is a skeleton string)
#[derive(Debug, Deserialize)]
struct RouteTitleConfigRaw {
    label: String,
    #[serde(default)]
    template: Option<String>,
    #[serde(default)]
    resolvers: Vec<ResolverBinding>,
}

/// Title metadata declared on a route segment
#[derive(Debug, Clone)]
pub struct RouteTitleConfig {
    pub label: String,
    pub template: Option<TemplateFn>,
    pub resolvers: Vec<ResolverBinding>,
}

impl<'de> Deserialize<'de> for RouteTitleConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RouteTitleConfigRaw::deserialize(deserializer)?;
        let template = match raw.template {
            Some(skeleton) => Some(
                template::parse_cached(&skeleton)
                    .map(TemplateFn::from)
                    .map_err(<D::Error as serde::de::Error>::custom)?,
            ),
            None => None,
        };
        Ok(RouteTitleConfig {
            label: raw.label,
            template,
            resolvers: raw.resolvers,
        })
    }
}

impl RouteTitleConfig {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            template: None,
            resolvers: Vec::new(),
        }
    }

    pub fn with_template(mut self, template: impl Into<TemplateFn>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn with_resolver(mut self, resolver_key: &str, item_key: &str) -> Self {
        self.resolvers.push(ResolverBinding::new(resolver_key, item_key));
        self
    }

    pub fn with_binding(mut self, binding: ResolverBinding) -> Self {
        self.resolvers.push(binding);
        self
    }
}

/// One label in a resolved title chain (root-to-leaf order)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleEntry {
    pub label: String,
    /// The resolver bucket the label was read from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<Value>,
}

impl TitleEntry {
    pub fn label(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            resolved: None,
        }
    }

    pub fn resolved(label: impl Into<String>, resolved: Value) -> Self {
        Self {
            label: label.into(),
            resolved: Some(resolved),
        }
    }
}

/// Session title state: the chain of entries and the template governing it
#[derive(Debug, Clone, Default)]
pub struct TitleConfig {
    pub template: Option<TemplateFn>,
    pub titles: Vec<TitleEntry>,
}

impl TitleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// State seeded with a single entry (e.g. the page's default title)
    pub fn with_initial(label: impl Into<String>) -> Self {
        Self {
            template: None,
            titles: vec![TitleEntry::label(label)],
        }
    }

    pub fn labels(&self) -> Vec<&str> {
        self.titles.iter().map(|t| t.label.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }
}
