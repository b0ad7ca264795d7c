//! Stylesheet lifecycle notifications.

use std::fmt;

use slotmap::{new_key_type, SlotMap};
use tokio::sync::mpsc;

use crate::stylesheet::sheet::{SourceUrl, StyleSheetId};

/// Result of one refresh attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New content was read, parsed and stored.
    Refreshed,
    /// The source was not modified; nothing was re-read.
    Unchanged,
    /// Reading or parsing failed; the previous content was kept.
    Failed(String),
}

impl RefreshOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, RefreshOutcome::Failed(_))
    }
}

/// An event published by a [`StyleSheetRepository`](crate::stylesheet::StyleSheetRepository).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyleSheetEvent {
    /// Styles derived from the repository must be recomputed.
    InvalidateAll,
    /// A refresh is starting: of every polled sheet (`None`) or of one sheet.
    WillRefresh(Option<StyleSheetId>),
    /// A refresh of `sheet` finished. Sent exactly once per attempt.
    DidRefresh {
        sheet: StyleSheetId,
        url: SourceUrl,
        outcome: RefreshOutcome,
    },
}

impl StyleSheetEvent {
    /// Stable event name.
    pub fn name(&self) -> &'static str {
        match self {
            StyleSheetEvent::InvalidateAll => "invalidate-all",
            StyleSheetEvent::WillRefresh(_) => "will-refresh",
            StyleSheetEvent::DidRefresh { outcome, .. } if outcome.is_success() => {
                "did-refresh-success"
            }
            StyleSheetEvent::DidRefresh { .. } => "did-refresh-failure",
        }
    }
}

impl fmt::Display for StyleSheetEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleSheetEvent::DidRefresh { url, .. } => write!(f, "{} {url}", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}

new_key_type! {
    /// Handle returned by [`Notifier::subscribe`].
    pub struct ObserverId;
}

type Observer = Box<dyn FnMut(&StyleSheetEvent) + Send>;

/// Fan-out of [`StyleSheetEvent`]s to callbacks and channels.
#[derive(Default)]
pub struct Notifier {
    observers: SlotMap<ObserverId, Observer>,
    channels: Vec<mpsc::UnboundedSender<StyleSheetEvent>>,
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("observers", &self.observers.len())
            .field("channels", &self.channels.len())
            .finish()
    }
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback invoked synchronously for every event.
    pub fn subscribe(&mut self, observer: impl FnMut(&StyleSheetEvent) + Send + 'static) -> ObserverId {
        self.observers.insert(Box::new(observer))
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ObserverId) -> bool {
        self.observers.remove(id).is_some()
    }

    /// A receiver for every future event. Dropping it unsubscribes.
    pub fn channel(&mut self) -> mpsc::UnboundedReceiver<StyleSheetEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.channels.push(tx);
        rx
    }

    pub fn notify(&mut self, event: StyleSheetEvent) {
        log::trace!("stylesheet event: {event}");
        for observer in self.observers.values_mut() {
            observer(&event);
        }
        self.channels.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn event_names() {
        let mut sheets: SlotMap<StyleSheetId, ()> = SlotMap::with_key();
        let id = sheets.insert(());
        let did = |outcome| StyleSheetEvent::DidRefresh {
            sheet: id,
            url: SourceUrl::new("mem://a.css"),
            outcome,
        };
        assert_eq!(StyleSheetEvent::InvalidateAll.name(), "invalidate-all");
        assert_eq!(StyleSheetEvent::WillRefresh(None).name(), "will-refresh");
        assert_eq!(did(RefreshOutcome::Refreshed).name(), "did-refresh-success");
        assert_eq!(did(RefreshOutcome::Unchanged).name(), "did-refresh-success");
        assert_eq!(did(RefreshOutcome::Failed("io".into())).name(), "did-refresh-failure");
        assert_eq!(did(RefreshOutcome::Refreshed).to_string(), "did-refresh-success mem://a.css");
    }

    #[test]
    fn observers_receive_events_until_unsubscribed() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut notifier = Notifier::new();
        let id = {
            let seen = seen.clone();
            notifier.subscribe(move |e| seen.lock().unwrap().push(e.name()))
        };

        notifier.notify(StyleSheetEvent::InvalidateAll);
        assert!(notifier.unsubscribe(id));
        assert!(!notifier.unsubscribe(id));
        notifier.notify(StyleSheetEvent::WillRefresh(None));

        assert_eq!(*seen.lock().unwrap(), vec!["invalidate-all"]);
    }

    #[test]
    fn channels_receive_events_and_close_cleanly() {
        let mut notifier = Notifier::new();
        let mut rx = notifier.channel();
        let dropped = notifier.channel();
        drop(dropped);

        notifier.notify(StyleSheetEvent::InvalidateAll);
        assert_eq!(rx.try_recv().unwrap(), StyleSheetEvent::InvalidateAll);
        assert!(rx.try_recv().is_err());
        assert_eq!(notifier.channels.len(), 1);
    }
}
