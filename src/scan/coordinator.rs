use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use super::{ScanState, View};
use crate::events::{AppEvent, EventSender};

/// Runs the scans in the background for the interactive display and tracks which view
/// is selected.
pub struct Coordinator {
    state: Arc<ScanState>,
    events: EventSender,
    tick_interval: Duration,
    view: View,
}

impl Coordinator {
    pub fn new(state: Arc<ScanState>, events: EventSender, tick_interval: Duration) -> Self {
        Self {
            state,
            events,
            tick_interval,
            view: View::default(),
        }
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn tab_forward(&mut self) {
        self.view = self.view.next();
    }

    pub fn tab_backward(&mut self) {
        self.view = self.view.prev();
    }

    /// Starts the package query, the walk and the redraw ticker.
    pub fn start(&self) -> io::Result<()> {
        self.spawn_package_query()?;
        self.spawn_walk()?;
        self.spawn_ticker()?;
        Ok(())
    }

    pub fn spawn_walk(&self) -> io::Result<JoinHandle<()>> {
        // Raised here so the ticker cannot observe a finished walk before it started
        self.state.set_accumulating(true);

        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        thread::Builder::new()
            .name("walker".into())
            .spawn(move || {
                if let Err(err) = state.scan_files_and_folders(&events) {
                    warn!("Walk failed: {}", err);
                }
            })
            .inspect_err(|_| self.state.set_accumulating(false))
    }

    pub fn spawn_package_query(&self) -> io::Result<JoinHandle<()>> {
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        thread::Builder::new()
            .name("packages".into())
            .spawn(move || {
                if let Err(err) = state.scan_packages(&events) {
                    debug!("Package list unavailable: {}", err);
                }
            })
    }

    /// Requests a redraw every tick while the walk is running, then exits.
    pub fn spawn_ticker(&self) -> io::Result<JoinHandle<()>> {
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let interval = self.tick_interval;
        thread::Builder::new()
            .name("ticker".into())
            .spawn(move || {
                while state.is_accumulating() {
                    thread::sleep(interval);
                    if !events.request(AppEvent::Tick) {
                        break;
                    }
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events;

    #[test]
    fn test_tab_cycles_views() {
        let (tx, _rx) = events::channel();
        let state = Arc::new(ScanState::new("/", 5, false));
        let mut coordinator = Coordinator::new(state, tx, Duration::from_millis(10));

        assert_eq!(coordinator.view(), View::Files);
        coordinator.tab_forward();
        coordinator.tab_forward();
        assert_eq!(coordinator.view(), View::Packages);
        coordinator.tab_forward();
        assert_eq!(coordinator.view(), View::Files);
        coordinator.tab_backward();
        assert_eq!(coordinator.view(), View::Packages);
    }

    #[test]
    fn test_ticker_stops_when_walk_finishes() {
        let (tx, rx) = events::channel();
        let state = Arc::new(ScanState::new("/", 5, false));
        state.set_accumulating(true);
        let coordinator = Coordinator::new(Arc::clone(&state), tx, Duration::from_millis(5));

        let ticker = coordinator.spawn_ticker().unwrap();
        assert!(matches!(rx.recv().unwrap(), AppEvent::Tick));
        state.set_accumulating(false);
        ticker.join().unwrap();
    }
}
