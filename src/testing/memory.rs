//! In-memory stylesheet sources and a manually triggered change monitor.

use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime};

use crate::stylesheet::{
    ChangeCallback, ChangeMonitor, ResourceSource, Revision, SourceUrl, WatchGuard,
};

// ---------------------------------------------------------------------------
// MemorySource
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct MemoryFile {
    text: String,
    revision: u64,
    reads: usize,
    unavailable: bool,
}

#[derive(Debug, Default)]
struct MemoryFiles {
    files: HashMap<SourceUrl, MemoryFile>,
    bundle: HashMap<String, SourceUrl>,
    clock: u64,
    etags: bool,
}

/// A [`ResourceSource`] backed by a shared in-memory file table.
///
/// Clones share the same table, so a test can keep one handle and hand
/// another to a repository. Every write advances the file's modification
/// marker: a timestamp by default, or an `ETag` like a web server's with
/// [`with_etags`](Self::with_etags).
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    inner: Arc<Mutex<MemoryFiles>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file (builder).
    pub fn with_file(self, url: impl Into<SourceUrl>, text: impl Into<String>) -> Self {
        self.insert(url, text);
        self
    }

    /// Report `ETag` markers instead of timestamps (builder).
    pub fn with_etags(self) -> Self {
        self.files().etags = true;
        self
    }

    /// Map a bundle name to a URL (builder).
    pub fn with_bundle(self, name: &str, url: impl Into<SourceUrl>) -> Self {
        self.files().bundle.insert(name.to_string(), url.into());
        self
    }

    /// Create or replace a file.
    pub fn insert(&self, url: impl Into<SourceUrl>, text: impl Into<String>) {
        let mut files = self.files();
        files.clock += 1;
        let revision = files.clock;
        let file = files.files.entry(url.into()).or_default();
        file.text = text.into();
        file.revision = revision;
    }

    /// Advance a file's modification marker without changing its text.
    pub fn touch(&self, url: impl Into<SourceUrl>) {
        let mut files = self.files();
        files.clock += 1;
        let revision = files.clock;
        if let Some(file) = files.files.get_mut(&url.into()) {
            file.revision = revision;
        }
    }

    /// Make reads of an existing file fail, like an unreachable server,
    /// until called again with `false`. The file keeps existing.
    pub fn set_unavailable(&self, url: impl Into<SourceUrl>, unavailable: bool) {
        if let Some(file) = self.files().files.get_mut(&url.into()) {
            file.unavailable = unavailable;
        }
    }

    pub fn remove(&self, url: impl Into<SourceUrl>) -> bool {
        self.files().files.remove(&url.into()).is_some()
    }

    /// How many times a file was read.
    pub fn read_count(&self, url: impl Into<SourceUrl>) -> usize {
        self.files().files.get(&url.into()).map_or(0, |f| f.reads)
    }

    fn files(&self) -> MutexGuard<'_, MemoryFiles> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ResourceSource for MemorySource {
    fn resolve_bundle(&self, name: &str) -> Option<SourceUrl> {
        self.files().bundle.get(name).cloned()
    }

    fn exists(&self, url: &SourceUrl) -> bool {
        self.files().files.contains_key(url)
    }

    fn read(&self, url: &SourceUrl) -> io::Result<String> {
        let mut files = self.files();
        let file = files
            .files
            .get_mut(url)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, url.to_string()))?;
        file.reads += 1;
        if file.unavailable {
            return Err(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                format!("{url} unavailable"),
            ));
        }
        Ok(file.text.clone())
    }

    fn modified(&self, url: &SourceUrl) -> Option<Revision> {
        let files = self.files();
        let file = files.files.get(url)?;
        if file.unavailable {
            return None;
        }
        Some(if files.etags {
            Revision::ETag(format!("\"r{}\"", file.revision))
        } else {
            Revision::Timestamp(SystemTime::UNIX_EPOCH + Duration::from_secs(file.revision))
        })
    }
}

// ---------------------------------------------------------------------------
// ManualMonitor
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Watches {
    next_id: u64,
    callbacks: HashMap<u64, (SourceUrl, ChangeCallback)>,
}

/// A [`ChangeMonitor`] whose change notifications are sent by the test with
/// [`trigger`](Self::trigger).
#[derive(Clone, Default)]
pub struct ManualMonitor {
    watches: Arc<Mutex<Watches>>,
    only: Option<Vec<SourceUrl>>,
}

impl std::fmt::Debug for ManualMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualMonitor")
            .field("watched", &self.watched_count())
            .field("only", &self.only)
            .finish()
    }
}

impl ManualMonitor {
    /// A monitor accepting every location.
    pub fn new() -> Self {
        Self::default()
    }

    /// Only accept the given locations; others fall back to polling
    /// (builder).
    pub fn watching<U: Into<SourceUrl>>(mut self, urls: impl IntoIterator<Item = U>) -> Self {
        self.only = Some(urls.into_iter().map(Into::into).collect());
        self
    }

    /// Report a change of `url`. Returns `false` if nothing watches it.
    pub fn trigger(&self, url: impl Into<SourceUrl>) -> bool {
        let url = url.into();
        let watches = self.watches();
        let mut fired = false;
        for (watched, callback) in watches.callbacks.values() {
            if *watched == url {
                callback();
                fired = true;
            }
        }
        fired
    }

    /// Number of live watches.
    pub fn watched_count(&self) -> usize {
        self.watches().callbacks.len()
    }

    fn watches(&self) -> MutexGuard<'_, Watches> {
        self.watches.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ChangeMonitor for ManualMonitor {
    fn watch(&self, url: &SourceUrl, on_change: ChangeCallback) -> Option<WatchGuard> {
        if self.only.as_ref().is_some_and(|only| !only.contains(url)) {
            return None;
        }
        let id = {
            let mut watches = self.watches();
            watches.next_id += 1;
            let id = watches.next_id;
            watches.callbacks.insert(id, (url.clone(), on_change));
            id
        };
        let shared = Arc::clone(&self.watches);
        Some(WatchGuard::from_fn(move || {
            let mut watches = shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            watches.callbacks.remove(&id);
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn memory_source_tracks_revisions_and_reads() {
        let source = MemorySource::new().with_file("mem://a.css", "x");
        let url = SourceUrl::new("mem://a.css");
        let first = source.modified(&url).unwrap();

        assert_eq!(source.read(&url).unwrap(), "x");
        assert_eq!(source.read_count("mem://a.css"), 1);

        source.touch("mem://a.css");
        let second = source.modified(&url).unwrap();
        assert_ne!(second, first);

        assert!(source.remove("mem://a.css"));
        assert!(!source.exists(&url));
        assert!(source.read(&url).is_err());
    }

    #[test]
    fn memory_source_etags_and_outages() {
        let source = MemorySource::new().with_etags().with_file("mem://a.css", "x");
        let url = SourceUrl::new("mem://a.css");
        assert_eq!(source.modified(&url), Some(Revision::ETag("\"r1\"".into())));

        source.set_unavailable("mem://a.css", true);
        assert!(source.exists(&url));
        assert_eq!(source.modified(&url), None);
        assert_eq!(source.read(&url).unwrap_err().kind(), io::ErrorKind::ConnectionRefused);

        source.set_unavailable("mem://a.css", false);
        assert_eq!(source.read(&url).unwrap(), "x");
        assert_eq!(source.read_count("mem://a.css"), 2);
    }

    #[test]
    fn manual_monitor_triggers_until_guard_dropped() {
        let monitor = ManualMonitor::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let guard = {
            let hits = hits.clone();
            monitor.watch(
                &SourceUrl::new("mem://a.css"),
                Box::new(move || {
                    hits.fetch_add(1, Ordering::SeqCst);
                }),
            )
        };
        assert!(guard.is_some());
        assert!(monitor.trigger("mem://a.css"));
        assert!(!monitor.trigger("mem://b.css"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        drop(guard);
        assert!(!monitor.trigger("mem://a.css"));
        assert_eq!(monitor.watched_count(), 0);
    }

    #[test]
    fn manual_monitor_can_refuse_locations() {
        let monitor = ManualMonitor::new().watching(["mem://a.css"]);
        assert!(monitor.watch(&SourceUrl::new("mem://b.css"), Box::new(|| {})).is_none());
        assert!(monitor.watch(&SourceUrl::new("mem://a.css"), Box::new(|| {})).is_some());
    }
}
