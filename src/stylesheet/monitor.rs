//! Change monitoring for refreshable stylesheets.
//!
//! A [`ChangeMonitor`] pushes change notifications for a source location.
//! Monitoring lasts as long as the returned [`WatchGuard`] is alive.

use std::fmt;
use std::path::PathBuf;

use notify::{RecursiveMode, Watcher};

use crate::stylesheet::sheet::SourceUrl;

/// Invoked (possibly from another thread) when a watched source changes.
pub type ChangeCallback = Box<dyn Fn() + Send + Sync>;

/// Watches source locations for changes.
pub trait ChangeMonitor: Send + Sync {
    /// Start watching `url`. Returns `None` if the location cannot be
    /// monitored; the caller falls back to polling.
    fn watch(&self, url: &SourceUrl, on_change: ChangeCallback) -> Option<WatchGuard>;
}

/// Keeps a watch alive; dropping it stops monitoring.
pub struct WatchGuard {
    on_drop: Option<Box<dyn FnOnce() + Send>>,
}

impl WatchGuard {
    /// A guard that keeps `resource` alive until dropped.
    pub fn new(resource: impl Send + 'static) -> Self {
        Self::from_fn(move || drop(resource))
    }

    /// A guard that runs `teardown` when dropped.
    pub fn from_fn(teardown: impl FnOnce() + Send + 'static) -> Self {
        Self {
            on_drop: Some(Box::new(teardown)),
        }
    }
}

impl Drop for WatchGuard {
    fn drop(&mut self) {
        if let Some(teardown) = self.on_drop.take() {
            teardown();
        }
    }
}

impl fmt::Debug for WatchGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchGuard")
            .field("armed", &self.on_drop.is_some())
            .finish()
    }
}

/// File system monitor backed by the platform's recommended `notify` watcher.
///
/// Watches the parent directory of each file so editors that replace files
/// on save are still seen. Only local locations can be watched.
#[derive(Debug, Default, Clone, Copy)]
pub struct NotifyMonitor;

impl NotifyMonitor {
    pub fn new() -> Self {
        Self
    }
}

impl ChangeMonitor for NotifyMonitor {
    fn watch(&self, url: &SourceUrl, on_change: ChangeCallback) -> Option<WatchGuard> {
        let path = url.to_file_path()?;
        let path = path.canonicalize().unwrap_or(path);
        let file_name = path.file_name()?.to_os_string();
        let directory = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let handler = move |result: notify::Result<notify::Event>| match result {
            Ok(event) => {
                let relevant = event.kind.is_modify() || event.kind.is_create();
                let ours = event
                    .paths
                    .iter()
                    .any(|p| p.file_name() == Some(file_name.as_os_str()));
                if relevant && ours {
                    on_change();
                }
            }
            Err(err) => log::warn!("file watcher error: {err}"),
        };

        let mut watcher = match notify::recommended_watcher(handler) {
            Ok(watcher) => watcher,
            Err(err) => {
                log::warn!("cannot create file watcher for {url}: {err}");
                return None;
            }
        };
        if let Err(err) = watcher.watch(&directory, RecursiveMode::NonRecursive) {
            log::warn!("cannot watch {}: {err}", directory.display());
            return None;
        }
        log::debug!("watching {url} for changes");
        Some(WatchGuard::new(watcher))
    }
}
