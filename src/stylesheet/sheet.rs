//! Stylesheet records: identity, grouping, activation and refresh state.

use std::fmt;
use std::path::{Path, PathBuf};

use slotmap::new_key_type;
use tokio::time::Instant;

use crate::css::model::StyleSheetContent;
use crate::stylesheet::monitor::WatchGuard;
use crate::stylesheet::source::Revision;

new_key_type! {
    /// Unique, stable identifier for a stylesheet in a repository.
    pub struct StyleSheetId;
}

/// Location a stylesheet was loaded from; the stylesheet's identity.
///
/// Either a `file://` URL, a plain file system path, or any other
/// scheme-qualified location understood by the configured source.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceUrl(String);

impl SourceUrl {
    pub fn new(url: impl Into<String>) -> Self {
        SourceUrl(url.into())
    }

    /// A `file://` URL for `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        SourceUrl(format!("file://{}", path.as_ref().display()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The file system path this URL refers to, if it is local.
    pub fn to_file_path(&self) -> Option<PathBuf> {
        if let Some(path) = self.0.strip_prefix("file://") {
            return Some(PathBuf::from(path));
        }
        if self.0.contains("://") {
            None
        } else {
            Some(PathBuf::from(&self.0))
        }
    }

    /// `true` for `http://` and `https://` locations.
    pub fn is_remote(&self) -> bool {
        self.0.starts_with("http://") || self.0.starts_with("https://")
    }

    /// Last path component, ignoring any query or fragment.
    pub fn last_component(&self) -> &str {
        let end = self.0.find(['?', '#']).unwrap_or(self.0.len());
        let path = self.0[..end].trim_end_matches('/');
        path.rsplit('/').next().unwrap_or(path)
    }
}

impl fmt::Display for SourceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceUrl {
    fn from(url: &str) -> Self {
        SourceUrl::new(url)
    }
}

impl From<String> for SourceUrl {
    fn from(url: String) -> Self {
        SourceUrl(url)
    }
}

/// How a refreshable stylesheet learns about changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Monitoring {
    /// Checked by the repository's polling timer.
    Polling,
    /// Pushed by a [`ChangeMonitor`](crate::stylesheet::ChangeMonitor).
    FileEvents,
}

/// Refresh bookkeeping for a refreshable stylesheet.
#[derive(Debug)]
pub struct RefreshState {
    /// Modification marker of the content currently loaded.
    pub last_modified: Option<Revision>,
    /// When the source last failed to read; cleared by the next good read.
    pub failed_at: Option<Instant>,
    pub monitoring: Monitoring,
    pub(crate) guard: Option<WatchGuard>,
}

impl RefreshState {
    pub(crate) fn new() -> Self {
        Self {
            last_modified: None,
            failed_at: None,
            monitoring: Monitoring::Polling,
            guard: None,
        }
    }
}

/// A loaded stylesheet.
#[derive(Debug)]
pub struct StyleSheet {
    url: SourceUrl,
    name: String,
    group: Option<String>,
    active: bool,
    content: StyleSheetContent,
    refresh: Option<RefreshState>,
}

impl StyleSheet {
    /// An active stylesheet in the default group, named after the last path
    /// component of `url`.
    pub fn new(url: impl Into<SourceUrl>, content: StyleSheetContent) -> Self {
        let url = url.into();
        let name = url.last_component().to_string();
        Self {
            url,
            name,
            group: None,
            active: true,
            content,
            refresh: None,
        }
    }

    /// Set the name (builder).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Put the sheet in a named group (builder).
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub(crate) fn with_optional_group(mut self, group: Option<String>) -> Self {
        self.group = group;
        self
    }

    pub(crate) fn refreshable(mut self) -> Self {
        self.refresh = Some(RefreshState::new());
        self
    }

    pub fn url(&self) -> &SourceUrl {
        &self.url
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn group(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn content(&self) -> &StyleSheetContent {
        &self.content
    }

    /// Raw value of a variable defined by this sheet.
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.content.variable(name)
    }

    pub fn is_refreshable(&self) -> bool {
        self.refresh.is_some()
    }

    pub fn refresh_state(&self) -> Option<&RefreshState> {
        self.refresh.as_ref()
    }

    /// `true` if this sheet is refreshable and checked by the polling timer.
    pub fn is_polling(&self) -> bool {
        self.refresh
            .as_ref()
            .is_some_and(|r| r.monitoring == Monitoring::Polling)
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub(crate) fn set_content(&mut self, content: StyleSheetContent) {
        self.content = content;
    }

    pub(crate) fn refresh_state_mut(&mut self) -> Option<&mut RefreshState> {
        self.refresh.as_mut()
    }
}
