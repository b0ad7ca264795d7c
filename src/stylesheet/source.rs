//! Access to stylesheet sources.

use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::SystemTime;

use crate::stylesheet::http::HttpSource;
use crate::stylesheet::sheet::SourceUrl;

/// Opaque marker identifying one version of a source.
///
/// Two markers are only ever compared for equality: a differing marker
/// means the source changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Revision {
    /// File modification time.
    Timestamp(SystemTime),
    /// HTTP `ETag` header, quotes included.
    ETag(String),
    /// HTTP `Last-Modified` header, as sent.
    LastModified(String),
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Revision::Timestamp(time) => write!(f, "{time:?}"),
            Revision::ETag(tag) => write!(f, "etag {tag}"),
            Revision::LastModified(date) => write!(f, "last-modified {date}"),
        }
    }
}

/// Resolves, reads and stats stylesheet sources.
pub trait ResourceSource: Send + Sync {
    /// Location of a stylesheet bundled with the application.
    fn resolve_bundle(&self, name: &str) -> Option<SourceUrl>;

    fn exists(&self, url: &SourceUrl) -> bool;

    fn read(&self, url: &SourceUrl) -> io::Result<String>;

    /// Current modification marker; `None` when unknown.
    fn modified(&self, url: &SourceUrl) -> Option<Revision>;
}

/// Reads stylesheets from the local file system.
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    bundle_root: Option<PathBuf>,
}

impl FileSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve bundle names relative to `root` (builder).
    pub fn with_bundle_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.bundle_root = Some(root.into());
        self
    }

    fn path(url: &SourceUrl) -> io::Result<PathBuf> {
        url.to_file_path().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::Unsupported,
                format!("not a local file: {url}"),
            )
        })
    }
}

impl ResourceSource for FileSource {
    fn resolve_bundle(&self, name: &str) -> Option<SourceUrl> {
        let path = match &self.bundle_root {
            Some(root) => root.join(name),
            None => PathBuf::from(name),
        };
        path.is_file().then(|| SourceUrl::from_path(path))
    }

    fn exists(&self, url: &SourceUrl) -> bool {
        url.to_file_path().is_some_and(|p| p.is_file())
    }

    fn read(&self, url: &SourceUrl) -> io::Result<String> {
        fs::read_to_string(Self::path(url)?)
    }

    fn modified(&self, url: &SourceUrl) -> Option<Revision> {
        let path = url.to_file_path()?;
        fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .map(Revision::Timestamp)
    }
}

/// Local files through [`FileSource`], `http://` and `https://` locations
/// through [`HttpSource`].
#[derive(Debug, Clone, Default)]
pub struct StandardSource {
    files: FileSource,
    http: HttpSource,
}

impl StandardSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve bundle names relative to `root` (builder).
    pub fn with_bundle_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.files = self.files.with_bundle_root(root);
        self
    }

    /// Fetch remote stylesheets with `http` (builder).
    pub fn with_http(mut self, http: HttpSource) -> Self {
        self.http = http;
        self
    }

    fn route(&self, url: &SourceUrl) -> &dyn ResourceSource {
        if url.is_remote() {
            return &self.http;
        }
        &self.files
    }
}

impl ResourceSource for StandardSource {
    fn resolve_bundle(&self, name: &str) -> Option<SourceUrl> {
        self.files.resolve_bundle(name)
    }

    fn exists(&self, url: &SourceUrl) -> bool {
        self.route(url).exists(url)
    }

    fn read(&self, url: &SourceUrl) -> io::Result<String> {
        self.route(url).read(url)
    }

    fn modified(&self, url: &SourceUrl) -> Option<Revision> {
        self.route(url).modified(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_source_reads_local_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.css");
        fs::write(&path, ".title { color: red; }").unwrap();

        let source = FileSource::new();
        let url = SourceUrl::from_path(&path);
        assert!(source.exists(&url));
        assert_eq!(source.read(&url).unwrap(), ".title { color: red; }");
        assert!(source.modified(&url).is_some());
    }

    #[test]
    fn file_source_missing_and_remote() {
        let source = FileSource::new();
        let missing = SourceUrl::new("/definitely/not/here.css");
        assert!(!source.exists(&missing));
        assert!(source.read(&missing).is_err());
        assert!(source.modified(&missing).is_none());

        let remote = SourceUrl::new("https://cdn.example/a.css");
        assert!(!source.exists(&remote));
        assert_eq!(
            source.read(&remote).unwrap_err().kind(),
            io::ErrorKind::Unsupported
        );
    }

    #[test]
    fn bundle_resolution_uses_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("theme.css"), "").unwrap();
        let source = FileSource::new().with_bundle_root(dir.path());
        let url = source.resolve_bundle("theme.css").unwrap();
        assert_eq!(url.last_component(), "theme.css");
        assert!(source.resolve_bundle("missing.css").is_none());
    }

    #[test]
    fn file_revision_follows_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.css");
        fs::write(&path, "a { b: c; }").unwrap();
        let url = SourceUrl::from_path(&path);
        let source = FileSource::new();

        let first = source.modified(&url).unwrap();
        assert!(matches!(first, Revision::Timestamp(_)));

        let later = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(2_000_000_000);
        fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(later)
            .unwrap();
        let second = source.modified(&url).unwrap();
        assert_ne!(second, first);
        assert_eq!(second, Revision::Timestamp(later));
    }

    #[test]
    fn standard_source_routes_by_scheme() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.css"), "--x: 1;").unwrap();
        let source = StandardSource::new()
            .with_bundle_root(dir.path())
            .with_http(HttpSource::with_timeout(std::time::Duration::from_secs(2)));

        let local = source.resolve_bundle("app.css").unwrap();
        assert!(source.exists(&local));
        assert_eq!(source.read(&local).unwrap(), "--x: 1;");

        // Nothing listens on port 1: the request reaches the HTTP source and fails.
        let remote = SourceUrl::new("http://127.0.0.1:1/app.css");
        assert!(!source.exists(&remote));
        assert!(source.read(&remote).is_err());
        assert_eq!(source.modified(&remote), None);
    }
}
