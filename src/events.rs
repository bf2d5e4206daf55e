//! Event queue feeding the single-threaded renderer.

use std::io;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};

use crossterm::event::Event as CEvent;
use tracing::debug;

use crate::progress::{ScanObserver, WalkControl};
use crate::scan::WalkSummary;

pub const QUEUE_DEPTH: usize = 64;

#[derive(Debug, Clone)]
pub enum AppEvent {
    Input(CEvent),
    /// Periodic redraw while the walk is running.
    Tick,
    WalkFinished,
    PackagesFinished,
}

#[derive(Debug, Clone)]
pub struct EventSender {
    tx: SyncSender<AppEvent>,
}

pub fn channel() -> (EventSender, Receiver<AppEvent>) {
    let (tx, rx) = mpsc::sync_channel(QUEUE_DEPTH);
    (EventSender { tx }, rx)
}

impl EventSender {
    /// Delivers `event`, waiting for room in the queue. Returns false once the
    /// renderer has gone away.
    pub fn send(&self, event: AppEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    /// Queues `event` unless the queue is already full, in which case a redraw is
    /// pending anyway. Returns false once the renderer has gone away.
    pub fn request(&self, event: AppEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) | Err(TrySendError::Full(_)) => true,
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

impl ScanObserver for EventSender {
    fn on_walk_error(&self, path: &Path, err: &io::Error) -> WalkControl {
        debug!("Skipping unreadable directory {}: {}", path.display(), err);
        WalkControl::SkipDir
    }

    fn on_walk_finish(&self, _summary: Option<&WalkSummary>) {
        self.send(AppEvent::WalkFinished);
    }

    fn on_packages_finish(&self, _count: Option<usize>) {
        self.send(AppEvent::PackagesFinished);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_coalesces_when_full() {
        let (tx, rx) = channel();
        for _ in 0..QUEUE_DEPTH * 2 {
            assert!(tx.request(AppEvent::Tick));
        }
        assert_eq!(rx.try_iter().count(), QUEUE_DEPTH);
    }

    #[test]
    fn test_request_reports_disconnected_renderer() {
        let (tx, rx) = channel();
        drop(rx);
        assert!(!tx.request(AppEvent::Tick));
        assert!(!tx.send(AppEvent::WalkFinished));
    }

    #[test]
    fn test_walk_finish_is_delivered_once() {
        let (tx, rx) = channel();
        tx.on_walk_finish(None);
        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], AppEvent::WalkFinished));
    }
}
