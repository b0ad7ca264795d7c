//! The stylesheet repository: loads, tracks, refreshes and unloads
//! stylesheets.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use slotmap::SlotMap;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::css::model::StyleSheetContent;
use crate::error::StyleError;
use crate::stylesheet::monitor::{ChangeMonitor, NotifyMonitor};
use crate::stylesheet::notification::{Notifier, ObserverId, RefreshOutcome, StyleSheetEvent};
use crate::stylesheet::parser::{CssStyleSheetParser, StyleSheetParser};
use crate::stylesheet::refresh::{RefreshRequest, RefreshTimer};
use crate::stylesheet::scope::StyleSheetScope;
use crate::stylesheet::sheet::{Monitoring, SourceUrl, StyleSheet, StyleSheetId};
use crate::stylesheet::source::{ResourceSource, Revision, StandardSource};

// ---------------------------------------------------------------------------
// RepositoryConfig
// ---------------------------------------------------------------------------

/// Default period of the polling timer.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Default pause before polling a source again after it failed to read.
pub const DEFAULT_ERROR_RETRY_INTERVAL: Duration = Duration::from_secs(30);

/// Configuration for a [`StyleSheetRepository`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryConfig {
    /// Period of the polling timer. Zero keeps the timer off.
    pub refresh_interval: Duration,
    /// Polls skip a sheet for this long after its source failed to read.
    /// Forced and explicit reloads are not affected.
    pub error_retry_interval: Duration,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            error_retry_interval: DEFAULT_ERROR_RETRY_INTERVAL,
        }
    }
}

impl RepositoryConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the polling period (builder).
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Set the pause after a failed read (builder).
    pub fn with_error_retry_interval(mut self, interval: Duration) -> Self {
        self.error_retry_interval = interval;
        self
    }
}

// ---------------------------------------------------------------------------
// StyleSheetRepository
// ---------------------------------------------------------------------------

/// Owns every loaded stylesheet.
///
/// Stylesheets are kept in insertion order; later sheets take precedence in
/// the cascade. Each source URL is loaded at most once.
///
/// The polling timer and change monitors only queue [`RefreshRequest`]s; the
/// owner applies them with [`process_pending_refreshes`](Self::process_pending_refreshes)
/// or [`next_refresh`](Self::next_refresh).
pub struct StyleSheetRepository {
    sheets: SlotMap<StyleSheetId, StyleSheet>,
    order: Vec<StyleSheetId>,
    parser: Arc<dyn StyleSheetParser>,
    source: Arc<dyn ResourceSource>,
    monitor: Option<Arc<dyn ChangeMonitor>>,
    notifier: Notifier,
    requests_tx: mpsc::UnboundedSender<RefreshRequest>,
    requests_rx: mpsc::UnboundedReceiver<RefreshRequest>,
    timer: Option<RefreshTimer>,
    timer_enabled: bool,
    config: RepositoryConfig,
}

impl fmt::Debug for StyleSheetRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StyleSheetRepository")
            .field("stylesheets", &self.order.len())
            .field("monitored", &self.monitor.is_some())
            .field("timer_enabled", &self.timer_enabled)
            .field("timer_running", &self.timer.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl Default for StyleSheetRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleSheetRepository {
    /// A repository reading local files and `http(s)` locations through
    /// [`StandardSource`], parsing with [`CssStyleSheetParser`] and watching
    /// refreshable local files with [`NotifyMonitor`].
    pub fn new() -> Self {
        Self::with_config(RepositoryConfig::default())
    }

    pub fn with_config(config: RepositoryConfig) -> Self {
        let (requests_tx, requests_rx) = mpsc::unbounded_channel();
        Self {
            sheets: SlotMap::with_key(),
            order: Vec::new(),
            parser: Arc::new(CssStyleSheetParser),
            source: Arc::new(StandardSource::new()),
            monitor: Some(Arc::new(NotifyMonitor::new())),
            notifier: Notifier::new(),
            requests_tx,
            requests_rx,
            timer: None,
            timer_enabled: false,
            config,
        }
    }

    /// Use `parser` for stylesheet text (builder).
    pub fn with_parser(mut self, parser: impl StyleSheetParser + 'static) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    /// Read sources through `source` (builder).
    pub fn with_source(mut self, source: impl ResourceSource + 'static) -> Self {
        self.source = Arc::new(source);
        self
    }

    /// Watch refreshable sheets with `monitor` (builder).
    pub fn with_monitor(mut self, monitor: impl ChangeMonitor + 'static) -> Self {
        self.monitor = Some(Arc::new(monitor));
        self
    }

    /// Poll every refreshable sheet instead of watching it (builder).
    pub fn without_monitor(mut self) -> Self {
        self.monitor = None;
        self
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    // -- Lookup -------------------------------------------------------------

    pub fn get(&self, id: StyleSheetId) -> Option<&StyleSheet> {
        self.sheets.get(id)
    }

    pub fn find_by_url(&self, url: &SourceUrl) -> Option<StyleSheetId> {
        self.iter().find(|(_, s)| s.url() == url).map(|(id, _)| id)
    }

    /// The oldest stylesheet named `name`.
    pub fn find_by_name(&self, name: &str) -> Option<StyleSheetId> {
        self.iter().find(|(_, s)| s.name() == name).map(|(id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Every stylesheet, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (StyleSheetId, &StyleSheet)> + '_ {
        self.order
            .iter()
            .filter_map(|&id| self.sheets.get(id).map(|sheet| (id, sheet)))
    }

    /// Active stylesheets in `scope`, oldest first.
    pub fn active_stylesheets(&self, scope: &StyleSheetScope) -> Vec<&StyleSheet> {
        self.iter()
            .map(|(_, sheet)| sheet)
            .filter(|sheet| sheet.is_active() && scope.contains(sheet))
            .collect()
    }

    /// Activate or deactivate a stylesheet. Emits
    /// [`StyleSheetEvent::InvalidateAll`] when the flag changes.
    pub fn set_active(&mut self, id: StyleSheetId, active: bool) -> Result<(), StyleError> {
        let sheet = self.sheets.get_mut(id).ok_or(StyleError::UnknownStyleSheet)?;
        if sheet.is_active() != active {
            sheet.set_active(active);
            self.notifier.notify(StyleSheetEvent::InvalidateAll);
        }
        Ok(())
    }

    // -- Notifications ------------------------------------------------------

    pub fn subscribe(
        &mut self,
        observer: impl FnMut(&StyleSheetEvent) + Send + 'static,
    ) -> ObserverId {
        self.notifier.subscribe(observer)
    }

    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// A channel receiving every future event.
    pub fn events(&mut self) -> mpsc::UnboundedReceiver<StyleSheetEvent> {
        self.notifier.channel()
    }

    // -- Loading ------------------------------------------------------------

    /// Load a stylesheet bundled with the application.
    pub fn load_from_bundle(
        &mut self,
        path: &str,
        name: Option<&str>,
        group: Option<&str>,
    ) -> Result<StyleSheetId, StyleError> {
        match self.source.resolve_bundle(path) {
            Some(url) => self.load_local(url, name, group),
            None => {
                log::warn!("stylesheet {path} not found in bundle");
                Err(StyleError::NotFound(path.to_string()))
            }
        }
    }

    /// Load, parse and store a stylesheet.
    ///
    /// Returns the existing id if `url` is already loaded. On failure nothing
    /// is stored.
    pub fn load_local(
        &mut self,
        url: impl Into<SourceUrl>,
        name: Option<&str>,
        group: Option<&str>,
    ) -> Result<StyleSheetId, StyleError> {
        let url = url.into();
        if let Some(id) = self.find_by_url(&url) {
            log::debug!("stylesheet {url} already loaded");
            return Ok(id);
        }
        let content = self.read_and_parse(&url).inspect_err(|err| {
            log::warn!("cannot load stylesheet: {}", describe(err));
        })?;
        let sheet = Self::build(url, content, name, group);
        Ok(self.insert(sheet))
    }

    /// Load a stylesheet that is refreshed when its source changes.
    ///
    /// The sheet is stored even if the initial load fails; it is retried on
    /// the next change. Changes are watched by the configured monitor, or
    /// polled by the refresh timer if watching is not possible.
    pub fn load_refreshable(
        &mut self,
        url: impl Into<SourceUrl>,
        name: Option<&str>,
        group: Option<&str>,
    ) -> Result<StyleSheetId, StyleError> {
        let url = url.into();
        if let Some(id) = self.find_by_url(&url) {
            log::debug!("stylesheet {url} already loaded");
            return Ok(id);
        }
        if !self.source.exists(&url) {
            log::warn!("refreshable stylesheet {url} not found");
            return Err(StyleError::NotFound(url.to_string()));
        }

        let sheet = Self::build(url, StyleSheetContent::new(), name, group).refreshable();
        let id = self.insert(sheet);
        self.reload(id, true)?;
        self.start_monitoring(id);
        Ok(id)
    }

    /// Add an already built stylesheet.
    ///
    /// Returns the existing id if a sheet with the same URL is loaded.
    pub fn register(&mut self, sheet: StyleSheet) -> StyleSheetId {
        match self.find_by_url(sheet.url()) {
            Some(id) => id,
            None => self.insert(sheet),
        }
    }

    fn build(
        url: SourceUrl,
        content: StyleSheetContent,
        name: Option<&str>,
        group: Option<&str>,
    ) -> StyleSheet {
        let sheet = StyleSheet::new(url, content).with_optional_group(group.map(str::to_string));
        match name {
            Some(name) => sheet.with_name(name),
            None => sheet,
        }
    }

    fn insert(&mut self, sheet: StyleSheet) -> StyleSheetId {
        log::debug!("stylesheet {} loaded as '{}'", sheet.url(), sheet.name());
        let id = self.sheets.insert(sheet);
        self.order.push(id);
        self.notifier.notify(StyleSheetEvent::InvalidateAll);
        id
    }

    fn read_and_parse(&self, url: &SourceUrl) -> Result<StyleSheetContent, StyleError> {
        if !self.source.exists(url) {
            return Err(StyleError::NotFound(url.to_string()));
        }
        let text = self.source.read(url).map_err(|source| StyleError::ReadFailed {
            url: url.clone(),
            source,
        })?;
        self.parser.parse(&text).map_err(|source| StyleError::ParseFailed {
            url: url.clone(),
            source,
        })
    }

    fn start_monitoring(&mut self, id: StyleSheetId) {
        let Some(url) = self.sheets.get(id).map(|s| s.url().clone()) else {
            return;
        };
        let guard = self.monitor.as_ref().and_then(|monitor| {
            let tx = self.requests_tx.clone();
            monitor.watch(
                &url,
                Box::new(move || {
                    let _ = tx.send(RefreshRequest::Modified(id));
                }),
            )
        });

        let watched = guard.is_some();
        if let Some(state) = self.sheets.get_mut(id).and_then(StyleSheet::refresh_state_mut) {
            state.guard = guard;
            state.monitoring = if watched {
                Monitoring::FileEvents
            } else {
                Monitoring::Polling
            };
        }
        if !watched {
            log::debug!("polling {url} for changes");
            self.enable_refresh_timer();
        }
    }

    // -- Refresh ------------------------------------------------------------

    /// Reload every active, polled, refreshable stylesheet.
    ///
    /// `force` reloads sheets even if their source is unchanged. Without
    /// `force`, a sheet whose source failed to read within the configured
    /// [`error_retry_interval`](RepositoryConfig::error_retry_interval) is
    /// skipped.
    pub fn reload_all(&mut self, force: bool) {
        self.notifier.notify(StyleSheetEvent::WillRefresh(None));
        let now = Instant::now();
        let polled: Vec<StyleSheetId> = self
            .iter()
            .filter(|(_, s)| s.is_active() && s.is_polling())
            .filter(|(_, s)| force || !self.backing_off(s, now))
            .map(|(id, _)| id)
            .collect();
        for id in polled {
            self.refresh(id, force);
        }
    }

    fn backing_off(&self, sheet: &StyleSheet, now: Instant) -> bool {
        let waiting = sheet
            .refresh_state()
            .and_then(|state| state.failed_at)
            .is_some_and(|at| now.saturating_duration_since(at) < self.config.error_retry_interval);
        if waiting {
            log::trace!("skipping {} after a failed read", sheet.url());
        }
        waiting
    }

    /// Reload one refreshable stylesheet.
    ///
    /// Emits one `WillRefresh` and one `DidRefresh`. A failed read or parse
    /// is reported as [`RefreshOutcome::Failed`] and keeps the previous
    /// content.
    pub fn reload(&mut self, id: StyleSheetId, force: bool) -> Result<RefreshOutcome, StyleError> {
        let sheet = self.sheets.get(id).ok_or(StyleError::UnknownStyleSheet)?;
        if !sheet.is_refreshable() {
            return Err(StyleError::NotRefreshable(sheet.url().clone()));
        }
        self.notifier.notify(StyleSheetEvent::WillRefresh(Some(id)));
        Ok(self.refresh(id, force))
    }

    fn refresh(&mut self, id: StyleSheetId, force: bool) -> RefreshOutcome {
        let Some(sheet) = self.sheets.get(id) else {
            return RefreshOutcome::Failed("unknown stylesheet".into());
        };
        let url = sheet.url().clone();
        let previous = sheet.refresh_state().and_then(|r| r.last_modified.clone());
        let modified = self.source.modified(&url);

        let outcome = if !force && modified.is_some() && modified == previous {
            RefreshOutcome::Unchanged
        } else {
            match self.read_and_parse(&url) {
                Ok(content) => {
                    if let Some(sheet) = self.sheets.get_mut(id) {
                        sheet.set_content(content);
                    }
                    self.record_modified(id, modified);
                    self.record_failure(id, None);
                    log::debug!("stylesheet {url} refreshed");
                    RefreshOutcome::Refreshed
                }
                Err(err) => {
                    // A broken file is not re-parsed until it changes again.
                    if matches!(err, StyleError::ParseFailed { .. }) {
                        self.record_modified(id, modified);
                        self.record_failure(id, None);
                    } else {
                        self.record_failure(id, Some(Instant::now()));
                    }
                    let reason = describe(&err);
                    log::warn!("cannot refresh stylesheet: {reason}");
                    RefreshOutcome::Failed(reason)
                }
            }
        };

        self.notifier.notify(StyleSheetEvent::DidRefresh {
            sheet: id,
            url,
            outcome: outcome.clone(),
        });
        outcome
    }

    fn record_modified(&mut self, id: StyleSheetId, modified: Option<Revision>) {
        if let Some(state) = self.sheets.get_mut(id).and_then(StyleSheet::refresh_state_mut) {
            state.last_modified = modified;
        }
    }

    fn record_failure(&mut self, id: StyleSheetId, at: Option<Instant>) {
        if let Some(state) = self.sheets.get_mut(id).and_then(StyleSheet::refresh_state_mut) {
            state.failed_at = at;
        }
    }

    /// Apply every queued refresh request without waiting. Returns the number
    /// of requests handled.
    pub fn process_pending_refreshes(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(request) = self.requests_rx.try_recv() {
            self.handle_request(request);
            handled += 1;
        }
        handled
    }

    /// Wait for the next refresh request and apply it.
    pub async fn next_refresh(&mut self) -> Option<RefreshRequest> {
        let request = self.requests_rx.recv().await?;
        self.handle_request(request);
        Some(request)
    }

    fn handle_request(&mut self, request: RefreshRequest) {
        match request {
            RefreshRequest::Poll => self.reload_all(false),
            RefreshRequest::Modified(id) => {
                // The sheet may have been unloaded since the change was seen.
                if self.sheets.get(id).is_some_and(StyleSheet::is_refreshable) {
                    let _ = self.reload(id, true);
                }
            }
        }
    }

    // -- Unloading ----------------------------------------------------------

    /// Stop monitoring and remove a stylesheet.
    pub fn unload(&mut self, id: StyleSheetId) -> Result<StyleSheet, StyleError> {
        let mut sheet = self.sheets.remove(id).ok_or(StyleError::UnknownStyleSheet)?;
        Self::teardown(&mut sheet);
        self.order.retain(|&other| other != id);
        log::debug!("stylesheet {} unloaded", sheet.url());
        self.notifier.notify(StyleSheetEvent::InvalidateAll);
        self.stop_timer_if_idle();
        Ok(sheet)
    }

    /// Stop monitoring and remove every stylesheet.
    pub fn unload_all(&mut self) {
        for id in self.order.drain(..) {
            if let Some(mut sheet) = self.sheets.remove(id) {
                Self::teardown(&mut sheet);
            }
        }
        self.sheets.clear();
        log::debug!("all stylesheets unloaded");
        self.notifier.notify(StyleSheetEvent::InvalidateAll);
        self.stop_timer_if_idle();
    }

    fn teardown(sheet: &mut StyleSheet) {
        if let Some(state) = sheet.refresh_state_mut() {
            state.guard = None;
        }
    }

    // -- Timer --------------------------------------------------------------

    /// Start the polling timer. Idempotent.
    ///
    /// Without a tokio runtime, or with a zero interval, the timer stays off;
    /// [`reload_all`](Self::reload_all) can still be called directly.
    pub fn enable_refresh_timer(&mut self) {
        self.timer_enabled = true;
        if self.timer.is_none() {
            self.timer = RefreshTimer::start(self.config.refresh_interval, self.requests_tx.clone());
        }
    }

    /// Stop the polling timer. Idempotent.
    pub fn disable_refresh_timer(&mut self) {
        self.timer_enabled = false;
        self.timer = None;
    }

    pub fn is_refresh_timer_enabled(&self) -> bool {
        self.timer_enabled
    }

    /// `true` if a timer task is actually running.
    pub fn is_refresh_timer_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn refresh_interval(&self) -> Duration {
        self.config.refresh_interval
    }

    /// Change the polling period, restarting a running timer.
    pub fn set_refresh_interval(&mut self, interval: Duration) {
        self.config.refresh_interval = interval;
        if self.timer_enabled {
            self.timer = None;
            self.timer = RefreshTimer::start(interval, self.requests_tx.clone());
        }
    }

    fn stop_timer_if_idle(&mut self) {
        if self.timer_enabled && !self.sheets.values().any(StyleSheet::is_polling) {
            self.disable_refresh_timer();
        }
    }
}

/// An error with its source chain, for logs and failure outcomes.
fn describe(err: &StyleError) -> String {
    let mut text = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = std::error::Error::source(cause);
    }
    text
}
