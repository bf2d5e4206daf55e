//! Interactive display.
//!
//! Everything that reaches the screen goes through one event queue. Input, the redraw
//! ticker and the background scans all post to it and the loop below is its only
//! consumer, so drawing never races with a scan.

mod draw;

use std::io::{self, Stdout};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::{debug, error};

use crate::config::Settings;
use crate::events::{self, AppEvent, EventSender};
use crate::scan::{Coordinator, ScanState};

pub use draw::render;

/// Restores the terminal when dropped, including on early returns.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("enabling raw mode")?;
        execute!(io::stdout(), EnterAlternateScreen).context("entering alternate screen")?;
        Ok(TerminalGuard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if let Err(err) = disable_raw_mode() {
            error!("Failed to disable raw mode: {}", err);
        }
        if let Err(err) = execute!(io::stdout(), LeaveAlternateScreen) {
            error!("Failed to leave alternate screen: {}", err);
        }
    }
}

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    TabForward,
    TabBackward,
    None,
}

pub fn key_action(key: &KeyEvent) -> KeyAction {
    if key.kind != KeyEventKind::Press {
        return KeyAction::None;
    }
    match key.code {
        KeyCode::Char('q') => KeyAction::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
        KeyCode::Tab => KeyAction::TabForward,
        KeyCode::BackTab => KeyAction::TabBackward,
        _ => KeyAction::None,
    }
}

/// Runs the interactive display until the user quits. Background scans still running
/// at that point are abandoned with the process.
pub fn run(state: ScanState, settings: &Settings) -> Result<()> {
    let (tx, rx) = events::channel();
    let mut coordinator = Coordinator::new(Arc::new(state), tx.clone(), settings.refresh_interval);

    let _guard = TerminalGuard::enter()?;
    let mut terminal =
        Terminal::new(CrosstermBackend::new(io::stdout())).context("creating terminal")?;
    terminal.clear()?;

    spawn_input_reader(tx)?;
    coordinator.start().context("starting scans")?;

    event_loop(&mut terminal, &mut coordinator, &rx)
}

fn spawn_input_reader(tx: EventSender) -> io::Result<()> {
    thread::Builder::new().name("input".into()).spawn(move || loop {
        match event::read() {
            Ok(ev) => {
                if !tx.send(AppEvent::Input(ev)) {
                    break;
                }
            }
            Err(err) => {
                error!("Failed to read terminal input: {}", err);
                break;
            }
        }
    })?;
    Ok(())
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    coordinator: &mut Coordinator,
    rx: &Receiver<AppEvent>,
) -> Result<()> {
    loop {
        terminal.draw(|frame| render(frame, coordinator.view(), coordinator.state()))?;

        let Ok(first) = rx.recv() else {
            return Ok(());
        };
        // Everything already queued is folded into the next draw
        for ev in std::iter::once(first).chain(rx.try_iter()) {
            if handle_event(ev, coordinator) {
                return Ok(());
            }
        }
    }
}

/// Applies one event; returns true when the program should exit.
fn handle_event(ev: AppEvent, coordinator: &mut Coordinator) -> bool {
    match ev {
        AppEvent::Input(CEvent::Key(key)) => match key_action(&key) {
            KeyAction::Quit => return true,
            KeyAction::TabForward => coordinator.tab_forward(),
            KeyAction::TabBackward => coordinator.tab_backward(),
            KeyAction::None => {}
        },
        AppEvent::WalkFinished => debug!("Walk finished"),
        AppEvent::PackagesFinished => debug!("Package query finished"),
        AppEvent::Input(_) | AppEvent::Tick => {}
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::View;
    use std::time::Duration;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> AppEvent {
        AppEvent::Input(CEvent::Key(KeyEvent::new(code, modifiers)))
    }

    #[test]
    fn test_key_bindings() {
        let (tx, _rx) = events::channel();
        let state = Arc::new(ScanState::new("/", 5, false));
        let mut coordinator = Coordinator::new(state, tx, Duration::from_millis(250));

        assert!(!handle_event(press(KeyCode::Tab, KeyModifiers::NONE), &mut coordinator));
        assert_eq!(coordinator.view(), View::Folders);
        assert!(!handle_event(press(KeyCode::BackTab, KeyModifiers::SHIFT), &mut coordinator));
        assert!(!handle_event(press(KeyCode::BackTab, KeyModifiers::SHIFT), &mut coordinator));
        assert_eq!(coordinator.view(), View::Packages);

        assert!(!handle_event(press(KeyCode::Char('x'), KeyModifiers::NONE), &mut coordinator));
        assert!(!handle_event(AppEvent::Tick, &mut coordinator));
        assert!(handle_event(press(KeyCode::Char('q'), KeyModifiers::NONE), &mut coordinator));
        assert!(handle_event(press(KeyCode::Char('c'), KeyModifiers::CONTROL), &mut coordinator));
    }
}
