//! route-title - document titles from navigation segment chains

pub mod error;
pub mod event_log;
pub mod navigation;
pub mod resolve;
pub mod routes;
pub mod session;
pub mod snapshot;
pub mod template;
pub mod title_config;
pub mod view_title;

pub use error::{FixSuggestion, TitleError};
pub use event_log::{Event, EventKind, EventLog};
pub use navigation::{NavigationBus, RouterEvent};
pub use resolve::{format, resolve, resolve_titles};
pub use routes::{Navigation, NavigationScript, RouteDef, RouteTable};
pub use session::{DocumentTitle, TitleHandle, TitleSession, TitleSessionBuilder, TitleSink};
pub use snapshot::{RouteSnapshot, SegmentData, SharedSnapshot, SnapshotSource};
pub use template::{template, PlaceholderKey, Template, TemplateFn};
pub use title_config::{ResolverBinding, RouteTitleConfig, TitleConfig, TitleEntry};
pub use view_title::ViewTitle;
