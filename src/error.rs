//! Error types with fix suggestions
//!
//! The resolution core never fails. These errors only come from the edges:
//! loading route tables, parsing template skeletons and starting a session.

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

#[derive(Error, Debug)]
pub enum TitleError {
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ─────────────────────────────────────────────────────────────
    // Route table errors (TITLE-010 to TITLE-013)
    // ─────────────────────────────────────────────────────────────

    #[error("TITLE-010: Invalid schema: expected '{expected}', got '{found}'")]
    InvalidSchema { expected: String, found: String },

    #[error("TITLE-011: Invalid resolver key '{key}' on route '{route}'")]
    InvalidResolverKey { key: String, route: String },

    #[error("TITLE-012: Duplicate route path '{path}' under '{parent}'")]
    DuplicatePath { path: String, parent: String },

    #[error("TITLE-013: Title on route '{route}' binds resolver '{key}' which the route does not resolve")]
    UnknownResolver { key: String, route: String },

    // ─────────────────────────────────────────────────────────────
    // Template errors (TITLE-020)
    // ─────────────────────────────────────────────────────────────

    #[error("TITLE-020: Template parse error at position {position}: {details}")]
    TemplateParse { position: usize, details: String },

    // ─────────────────────────────────────────────────────────────
    // Session errors (TITLE-030)
    // ─────────────────────────────────────────────────────────────

    #[error("TITLE-030: Title session needs a running tokio runtime")]
    NoRuntime,
}

impl FixSuggestion for TitleError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            TitleError::YamlParse(_) => Some("Check YAML syntax: indentation and quoting"),
            TitleError::JsonParse(_) => Some("Check the JSON value is well formed (try parsing with jq)"),
            TitleError::Io(_) => Some("Check file path and permissions"),
            TitleError::InvalidSchema { .. } => {
                Some("Start the routes file with: schema: route-title/routes@0.1")
            }
            TitleError::InvalidResolverKey { .. } => {
                Some("Resolver keys are identifiers: letters, digits and underscores")
            }
            TitleError::DuplicatePath { .. } => {
                Some("Merge the duplicate routes or give them distinct paths")
            }
            TitleError::UnknownResolver { .. } => {
                Some("Add the key to the route's resolve: list or fix the binding")
            }
            TitleError::TemplateParse { .. } => {
                Some("Placeholders look like {0} or {name}; escape braces as {{ and }}")
            }
            TitleError::NoRuntime => Some("Start the session from inside #[tokio::main] or a runtime"),
        }
    }
}
