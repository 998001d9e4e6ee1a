//! Declarative route table
//!
//! Routes are loaded from YAML and only serve as a data source: a URL is
//! matched against the tree to produce the active `RouteSnapshot` chain a
//! title session reads. Matching rules:
//! - literal segments match exactly, `:param` segments match anything
//! - an empty path consumes nothing (used for default children)
//! - the whole URL must be consumed; first match in declaration order wins
//!
//! ```yaml
//! schema: route-title/routes@0.1
//! default_title: Angular Router Course
//! routes:
//!   - path: ":courseUrl"
//!     resolve: [course]
//!     title:
//!       label: Course
//!       resolvers:
//!         - resolver: course
//!           itemKey: description
//!     children:
//!       - path: ""
//!         title: { label: Lessons List }
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::TitleError;
use crate::snapshot::{RouteSnapshot, SegmentData};
use crate::title_config::RouteTitleConfig;

pub const ROUTES_SCHEMA: &str = "route-title/routes@0.1";

static RESOLVER_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid resolver key regex"));

/// One declared route
#[derive(Debug, Clone, Deserialize)]
pub struct RouteDef {
    #[serde(default)]
    pub path: String,
    /// Resolver keys whose data is attached to this segment
    #[serde(default)]
    pub resolve: Vec<String>,
    #[serde(default)]
    pub title: Option<Arc<RouteTitleConfig>>,
    #[serde(default)]
    pub children: Vec<RouteDef>,
}

impl RouteDef {
    fn parts(&self) -> Vec<&str> {
        split_path(&self.path)
    }

    /// Match `segments` against this route and its children
    fn match_chain<'a>(&'a self, segments: &[&str]) -> Option<Vec<&'a RouteDef>> {
        let parts = self.parts();
        if parts.len() > segments.len() {
            return None;
        }
        let matched = parts
            .iter()
            .zip(segments)
            .all(|(part, segment)| part.starts_with(':') || part == segment);
        if !matched {
            return None;
        }

        let remaining = &segments[parts.len()..];
        if let Some(mut chain) = match_routes(&self.children, remaining) {
            chain.insert(0, self);
            return Some(chain);
        }
        if remaining.is_empty() {
            return Some(vec![self]);
        }
        None
    }

    /// Total number of routes in this subtree
    fn count(&self) -> usize {
        1 + self.children.iter().map(RouteDef::count).sum::<usize>()
    }
}

fn match_routes<'a>(routes: &'a [RouteDef], segments: &[&str]) -> Option<Vec<&'a RouteDef>> {
    routes.iter().find_map(|route| route.match_chain(segments))
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

#[derive(Debug, Deserialize)]
struct RouteTableRaw {
    schema: String,
    #[serde(default)]
    default_title: Option<String>,
    #[serde(default)]
    routes: Vec<RouteDef>,
}

/// Route tree loaded from a routes file
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    pub default_title: Option<String>,
    pub routes: Vec<RouteDef>,
}

impl RouteTable {
    pub fn from_yaml(yaml: &str) -> Result<Self, TitleError> {
        let raw: RouteTableRaw = serde_yaml::from_str(yaml)?;
        if raw.schema != ROUTES_SCHEMA {
            return Err(TitleError::InvalidSchema {
                expected: ROUTES_SCHEMA.to_string(),
                found: raw.schema,
            });
        }
        Ok(Self {
            default_title: raw.default_title,
            routes: raw.routes,
        })
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TitleError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Check resolver keys, sibling paths and title bindings
    pub fn validate(&self) -> Result<(), TitleError> {
        validate_routes(&self.routes, "/")
    }

    pub fn route_count(&self) -> usize {
        self.routes.iter().map(RouteDef::count).sum()
    }

    /// Matched route definitions for `url`, root-most first
    pub fn matches(&self, url: &str) -> Option<Vec<&RouteDef>> {
        let path = url.split(['?', '#']).next().unwrap_or_default();
        match_routes(&self.routes, &split_path(path))
    }

    /// Build the active chain for `url`, attaching resolved data per segment.
    /// An unmatched URL yields a bare root.
    pub fn activate(&self, url: &str, resolved: &FxHashMap<String, Value>) -> RouteSnapshot {
        let Some(chain) = self.matches(url) else {
            debug!(url, "no route matched");
            return RouteSnapshot::root();
        };

        let segments = chain.into_iter().map(|route| {
            let mut data = SegmentData::new();
            data.title = route.title.clone();
            for key in &route.resolve {
                if let Some(value) = resolved.get(key) {
                    data.insert_resolved(key.clone(), value.clone());
                }
            }
            data
        });

        RouteSnapshot::new(SegmentData::new()).with_child(RouteSnapshot::chain(segments))
    }
}

fn validate_routes(routes: &[RouteDef], parent: &str) -> Result<(), TitleError> {
    let mut seen = HashSet::new();
    for route in routes {
        let normalized = split_path(&route.path).join("/");
        if !seen.insert(normalized.clone()) {
            return Err(TitleError::DuplicatePath {
                path: route.path.clone(),
                parent: parent.to_string(),
            });
        }

        for key in &route.resolve {
            if !RESOLVER_KEY.is_match(key) {
                return Err(TitleError::InvalidResolverKey {
                    key: key.clone(),
                    route: route.path.clone(),
                });
            }
        }

        if let Some(title) = &route.title {
            for binding in &title.resolvers {
                let Some((resolver_key, _)) = binding.keys() else {
                    debug!(route = %route.path, "incomplete resolver binding ignored");
                    continue;
                };
                if !route.resolve.iter().any(|k| k == resolver_key) {
                    return Err(TitleError::UnknownResolver {
                        key: resolver_key.to_string(),
                        route: route.path.clone(),
                    });
                }
            }
        }

        let child_parent = if parent == "/" {
            format!("/{}", normalized)
        } else {
            format!("{}/{}", parent, normalized)
        };
        validate_routes(&route.children, &child_parent)?;
    }
    Ok(())
}

/// One scripted navigation: a URL plus the data its resolvers produced
#[derive(Debug, Clone, Deserialize)]
pub struct Navigation {
    pub url: String,
    #[serde(default)]
    pub resolved: FxHashMap<String, Value>,
}

/// Ordered navigations for simulation
#[derive(Debug, Clone, Deserialize)]
pub struct NavigationScript {
    pub navigations: Vec<Navigation>,
}

impl NavigationScript {
    pub fn from_yaml(yaml: &str) -> Result<Self, TitleError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, TitleError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }
}
