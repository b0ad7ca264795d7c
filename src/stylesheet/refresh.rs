//! Refresh requests and the polling timer.
//!
//! Neither the timer nor change monitors touch stylesheet content. They send
//! [`RefreshRequest`]s to the owning repository, which handles them in its own
//! context.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::stylesheet::sheet::StyleSheetId;

/// Work queued for a repository by its timer or change monitors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshRequest {
    /// Poll every polled sheet for changes.
    Poll,
    /// A monitored sheet changed on disk.
    Modified(StyleSheetId),
}

/// A running polling timer. Cancelled when dropped.
#[derive(Debug)]
pub struct RefreshTimer {
    cancel_tx: Option<oneshot::Sender<()>>,
    period: Duration,
}

impl RefreshTimer {
    /// Start sending [`RefreshRequest::Poll`] every `period`, first after one
    /// full period.
    ///
    /// Returns `None` without a tokio runtime, or for a zero period.
    pub fn start(period: Duration, sender: mpsc::UnboundedSender<RefreshRequest>) -> Option<Self> {
        if period.is_zero() {
            return None;
        }
        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                log::warn!("no tokio runtime; stylesheet polling is disabled");
                return None;
            }
        };
        let (cancel_tx, mut cancel_rx) = oneshot::channel();

        handle.spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        log::trace!("stylesheet poll tick");
                        if sender.send(RefreshRequest::Poll).is_err() {
                            break;
                        }
                    }
                    _ = &mut cancel_rx => break,
                }
            }
        });

        Some(Self {
            cancel_tx: Some(cancel_tx),
            period,
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Stop the timer; further ticks are not sent.
    pub fn cancel(&mut self) {
        if let Some(tx) = self.cancel_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
