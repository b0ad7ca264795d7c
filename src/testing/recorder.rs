//! Observation helpers: an event recorder and a counting parser.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::css::model::StyleSheetContent;
use crate::css::parser::ParseError;
use crate::stylesheet::{CssStyleSheetParser, StyleSheetEvent, StyleSheetParser};

/// Collects [`StyleSheetEvent`]s delivered to its observers.
#[derive(Debug, Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<StyleSheetEvent>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// An observer recording into this recorder, for
    /// [`StyleSheetRepository::subscribe`](crate::stylesheet::StyleSheetRepository::subscribe).
    pub fn observer(&self) -> impl FnMut(&StyleSheetEvent) + Send + 'static {
        let events = Arc::clone(&self.events);
        move |event| {
            events
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .push(event.clone());
        }
    }

    pub fn events(&self) -> Vec<StyleSheetEvent> {
        self.lock().clone()
    }

    /// Event names in delivery order.
    pub fn names(&self) -> Vec<&'static str> {
        self.lock().iter().map(StyleSheetEvent::name).collect()
    }

    /// Number of recorded events named `name`.
    pub fn count(&self, name: &str) -> usize {
        self.lock().iter().filter(|e| e.name() == name).count()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, Vec<StyleSheetEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A [`StyleSheetParser`] that counts its invocations and delegates to
/// [`CssStyleSheetParser`].
#[derive(Debug, Clone, Default)]
pub struct CountingParser {
    calls: Arc<AtomicUsize>,
}

impl CountingParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl StyleSheetParser for CountingParser {
    fn parse(&self, source: &str) -> Result<StyleSheetContent, ParseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        CssStyleSheetParser.parse(source)
    }
}
