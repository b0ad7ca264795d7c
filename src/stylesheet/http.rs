//! Remote stylesheets over HTTP.

use std::fmt;
use std::io;
use std::time::Duration;

use crate::stylesheet::sheet::SourceUrl;
use crate::stylesheet::source::{ResourceSource, Revision};

/// Timeout applied to every request unless configured otherwise.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Reads `http://` and `https://` stylesheets with a blocking `ureq` agent.
///
/// Changes are detected with a `HEAD` request. The `ETag` header is the
/// modification marker when the server sends one, `Last-Modified` otherwise.
/// A server sending neither is re-read on every poll.
#[derive(Clone)]
pub struct HttpSource {
    agent: ureq::Agent,
}

impl fmt::Debug for HttpSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpSource").finish_non_exhaustive()
    }
}

impl Default for HttpSource {
    fn default() -> Self {
        Self::with_timeout(DEFAULT_HTTP_TIMEOUT)
    }
}

impl From<ureq::Agent> for HttpSource {
    fn from(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl HttpSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        ureq::AgentBuilder::new().timeout(timeout).build().into()
    }

    fn head(&self, url: &SourceUrl) -> io::Result<ureq::Response> {
        if !url.is_remote() {
            return Err(not_remote(url));
        }
        self.agent
            .head(url.as_str())
            .call()
            .map_err(|err| to_io_error(url, err))
    }
}

impl ResourceSource for HttpSource {
    fn resolve_bundle(&self, _name: &str) -> Option<SourceUrl> {
        None
    }

    fn exists(&self, url: &SourceUrl) -> bool {
        self.head(url).is_ok()
    }

    fn read(&self, url: &SourceUrl) -> io::Result<String> {
        if !url.is_remote() {
            return Err(not_remote(url));
        }
        let response = self
            .agent
            .get(url.as_str())
            .call()
            .map_err(|err| to_io_error(url, err))?;
        log::debug!("downloaded {url}, marker {:?}", revision_of(&response));
        response.into_string()
    }

    fn modified(&self, url: &SourceUrl) -> Option<Revision> {
        match self.head(url) {
            Ok(response) => revision_of(&response),
            Err(err) => {
                log::debug!("cannot check {url} for changes: {err}");
                None
            }
        }
    }
}

fn revision_of(response: &ureq::Response) -> Option<Revision> {
    if let Some(tag) = response.header("ETag") {
        return Some(Revision::ETag(tag.to_string()));
    }
    response
        .header("Last-Modified")
        .map(|date| Revision::LastModified(date.to_string()))
}

fn not_remote(url: &SourceUrl) -> io::Error {
    io::Error::new(io::ErrorKind::Unsupported, format!("not an http(s) location: {url}"))
}

fn to_io_error(url: &SourceUrl, err: ureq::Error) -> io::Error {
    match err {
        ureq::Error::Status(404, _) => {
            io::Error::new(io::ErrorKind::NotFound, format!("{url}: HTTP 404"))
        }
        ureq::Error::Status(code, _) => io::Error::other(format!("{url}: HTTP {code}")),
        ureq::Error::Transport(transport) => io::Error::other(format!("{url}: {transport}")),
    }
}
