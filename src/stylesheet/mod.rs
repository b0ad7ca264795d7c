//! Stylesheet management: loading, scoping, refreshing and unloading.
//!
//! The [`StyleSheetRepository`] owns every [`StyleSheet`]. Reading sources,
//! parsing text and watching for changes are delegated to the
//! [`ResourceSource`], [`StyleSheetParser`] and [`ChangeMonitor`] traits.

pub mod http;
pub mod monitor;
pub mod notification;
pub mod parser;
pub mod refresh;
pub mod repository;
pub mod scope;
pub mod sheet;
pub mod source;

pub use http::{HttpSource, DEFAULT_HTTP_TIMEOUT};
pub use monitor::{ChangeCallback, ChangeMonitor, NotifyMonitor, WatchGuard};
pub use notification::{Notifier, ObserverId, RefreshOutcome, StyleSheetEvent};
pub use parser::{CssStyleSheetParser, StyleSheetParser};
pub use refresh::{RefreshRequest, RefreshTimer};
pub use repository::{
    RepositoryConfig, StyleSheetRepository, DEFAULT_ERROR_RETRY_INTERVAL, DEFAULT_REFRESH_INTERVAL,
};
pub use scope::StyleSheetScope;
pub use sheet::{Monitoring, RefreshState, SourceUrl, StyleSheet, StyleSheetId};
pub use source::{FileSource, ResourceSource, Revision, StandardSource};
