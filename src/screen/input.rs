//! Keyboard handling during playback
//!
//! In raw mode Ctrl-C arrives as a key event rather than a signal, so a
//! background thread watches for quit keys and trips the cancel token.

use crate::playback::CancelToken;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// How often the listener re-checks its shutdown flag
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Whether a key press asks playback to stop (`q`, `Esc`, `Ctrl-C`)
pub fn is_quit_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Act on one terminal event read; returns whether to keep listening
fn handle_event(event: std::io::Result<Event>, cancel: &CancelToken) -> bool {
    match event {
        Ok(Event::Key(key)) => {
            if is_quit_key(&key) {
                tracing::debug!(code = ?key.code, "quit key pressed");
                cancel.cancel();
            }
            true
        }
        Ok(_) => true,
        Err(e) => {
            tracing::warn!(error = %e, "key listener stopped: read failed");
            false
        }
    }
}

/// Background thread turning quit keys into cancellation
pub struct KeyListener {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl KeyListener {
    /// Start listening; a quit key cancels `cancel`
    pub fn spawn(cancel: CancelToken) -> std::io::Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = Arc::clone(&running);

        let handle = std::thread::Builder::new()
            .name("asciiplay-keys".to_owned())
            .spawn(move || {
                while running_clone.load(Ordering::Relaxed) && !cancel.is_cancelled() {
                    let keep_listening = match event::poll(POLL_INTERVAL) {
                        Ok(true) => handle_event(event::read(), &cancel),
                        Ok(false) => true,
                        Err(e) => {
                            tracing::warn!(error = %e, "key listener stopped: poll failed");
                            false
                        }
                    };
                    if !keep_listening {
                        break;
                    }
                }
            })?;

        Ok(KeyListener {
            running,
            handle: Some(handle),
        })
    }

    /// Stop the thread and wait for it
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for KeyListener {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}
