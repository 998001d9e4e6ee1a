//! Title templates
//!
//! A template is a list of literal fragments interleaved with placeholder keys:
//! `fragments[0] key[0] fragments[1] key[1] ... fragments[n]`.
//!
//! - Integer keys index into the positional values
//! - Named keys look up the trailing dictionary (last value, when it is an object)
//! - Anything missing renders as empty text
//!
//! Skeleton strings (`"{0}: {1}"`, `"I'm {name}"`) are tokenized once and cached.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::error::TitleError;

/// Placeholder key: positional index or dictionary name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlaceholderKey {
    Index(usize),
    Name(String),
}

impl From<usize> for PlaceholderKey {
    fn from(index: usize) -> Self {
        Self::Index(index)
    }
}

impl From<&str> for PlaceholderKey {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for PlaceholderKey {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// Reusable formatter built from fragments + keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    fragments: Vec<String>,
    keys: Vec<PlaceholderKey>,
}

/// Build a template from literal fragments and placeholder keys.
///
/// ```
/// use route_title::template::template;
/// use serde_json::json;
///
/// let t = template(["", ": ", ""], [0usize, 1]);
/// assert_eq!(t.format(&[json!("Course"), json!("Lesson 3")]), "Course: Lesson 3");
/// ```
pub fn template<S, K>(
    fragments: impl IntoIterator<Item = S>,
    keys: impl IntoIterator<Item = K>,
) -> Template
where
    S: Into<String>,
    K: Into<PlaceholderKey>,
{
    Template::new(fragments, keys)
}

impl Template {
    /// Fragments shorter than `keys.len() + 1` are padded with empty text.
    pub fn new<S, K>(
        fragments: impl IntoIterator<Item = S>,
        keys: impl IntoIterator<Item = K>,
    ) -> Self
    where
        S: Into<String>,
        K: Into<PlaceholderKey>,
    {
        let mut fragments: Vec<String> = fragments.into_iter().map(Into::into).collect();
        let keys: Vec<PlaceholderKey> = keys.into_iter().map(Into::into).collect();
        if fragments.len() < keys.len() + 1 {
            fragments.resize(keys.len() + 1, String::new());
        }
        Self { fragments, keys }
    }

    /// Parse a skeleton string: `{0}` positional, `{name}` named, `{{`/`}}` literal braces
    pub fn parse(skeleton: &str) -> Result<Self, TitleError> {
        let mut fragments = Vec::new();
        let mut keys = Vec::new();
        let mut literal = String::new();
        let mut chars = skeleton.char_indices().peekable();

        while let Some((i, ch)) = chars.next() {
            match ch {
                '{' if chars.peek().map(|(_, c)| *c) == Some('{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek().map(|(_, c)| *c) == Some('}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for (_, c) in chars.by_ref() {
                        if c == '}' {
                            closed = true;
                            break;
                        }
                        name.push(c);
                    }
                    if !closed {
                        return Err(TitleError::TemplateParse {
                            position: i,
                            details: "unterminated placeholder".to_string(),
                        });
                    }
                    let name = name.trim();
                    if name.is_empty() {
                        return Err(TitleError::TemplateParse {
                            position: i,
                            details: "empty placeholder".to_string(),
                        });
                    }
                    fragments.push(std::mem::take(&mut literal));
                    keys.push(match name.parse::<usize>() {
                        Ok(index) => PlaceholderKey::Index(index),
                        Err(_) => PlaceholderKey::Name(name.to_string()),
                    });
                }
                '}' => {
                    return Err(TitleError::TemplateParse {
                        position: i,
                        details: "unmatched '}' (use '}}' for a literal brace)".to_string(),
                    });
                }
                _ => literal.push(ch),
            }
        }
        fragments.push(literal);

        Ok(Self { fragments, keys })
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn keys(&self) -> &[PlaceholderKey] {
        &self.keys
    }

    /// Format with positional values; a trailing object doubles as the named dictionary
    pub fn format(&self, values: &[Value]) -> String {
        let dict = values.last().and_then(Value::as_object);

        let mut result = String::with_capacity(self.fragments.iter().map(String::len).sum());
        result.push_str(&self.fragments[0]);
        for (i, key) in self.keys.iter().enumerate() {
            let value = match key {
                PlaceholderKey::Index(index) => values.get(*index),
                PlaceholderKey::Name(name) => dict.and_then(|d| d.get(name)),
            };
            if let Some(value) = value {
                push_value(&mut result, value);
            }
            result.push_str(&self.fragments[i + 1]);
        }
        result
    }

    /// Format a list of labels (positional only)
    pub fn format_labels<S: AsRef<str>>(&self, labels: &[S]) -> String {
        let values: Vec<Value> = labels
            .iter()
            .map(|l| Value::String(l.as_ref().to_string()))
            .collect();
        self.format(&values)
    }
}

fn push_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => {}
        Value::String(s) => out.push_str(s),
        other => out.push_str(&other.to_string()),
    }
}

/// Type-erased, shareable template function
///
/// Route configs carry one of these; the deepest one along a chain wins.
/// Equality is identity (`ptr_eq`), since arbitrary closures can't be compared.
#[derive(Clone)]
pub struct TemplateFn(Arc<dyn Fn(&[Value]) -> String + Send + Sync>);

impl TemplateFn {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) -> String + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, values: &[Value]) -> String {
        (self.0)(values)
    }

    /// Apply to the labels of a title chain
    pub fn call_labels<S: AsRef<str>>(&self, labels: &[S]) -> String {
        let values: Vec<Value> = labels
            .iter()
            .map(|l| Value::String(l.as_ref().to_string()))
            .collect();
        self.call(&values)
    }

    pub fn ptr_eq(&self, other: &TemplateFn) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl From<Template> for TemplateFn {
    fn from(template: Template) -> Self {
        Self::new(move |values| template.format(values))
    }
}

impl From<Arc<Template>> for TemplateFn {
    fn from(template: Arc<Template>) -> Self {
        Self::new(move |values| template.format(values))
    }
}

impl fmt::Debug for TemplateFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TemplateFn(..)")
    }
}

/// Cache of parsed skeleton strings
pub struct TemplateCache {
    cache: DashMap<String, Arc<Template>>,
}

impl Default for TemplateCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateCache {
    pub fn new() -> Self {
        Self {
            cache: DashMap::new(),
        }
    }

    /// Parse a skeleton (with caching)
    pub fn parse(&self, skeleton: &str) -> Result<Arc<Template>, TitleError> {
        if let Some(cached) = self.cache.get(skeleton) {
            return Ok(cached.value().clone());
        }

        let template = Arc::new(Template::parse(skeleton)?);
        self.cache.insert(skeleton.to_string(), Arc::clone(&template));
        Ok(template)
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

/// Global template cache instance
pub static TEMPLATE_CACHE: Lazy<TemplateCache> = Lazy::new(TemplateCache::new);

/// Convenience function for parsing skeletons through the global cache
pub fn parse_cached(skeleton: &str) -> Result<Arc<Template>, TitleError> {
    TEMPLATE_CACHE.parse(skeleton)
}
