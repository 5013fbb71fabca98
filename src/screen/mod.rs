//! Terminal output
//!
//! Each frame is written as one batch: every line is positioned explicitly
//! from the top-left corner, the rest of the screen is cleared, and the batch
//! is flushed once, so a frame never appears half drawn.

pub mod input;

pub use input::KeyListener;

use crate::Result;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    execute, queue,
    style::Print,
    terminal::{
        self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use std::io::{self, Stdout, Write};

/// Fallback size when the terminal cannot be queried
pub const FALLBACK_VIEWPORT: Viewport = Viewport { cols: 80, rows: 24 };

/// Drawable area in character cells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// Columns
    pub cols: u16,
    /// Rows
    pub rows: u16,
}

/// Destination for rendered frames
pub trait Screen {
    /// Area frames should be rendered for.
    fn viewport(&self) -> Viewport;

    /// Replace the screen contents with `text`.
    fn present(&mut self, text: &str) -> Result<()>;
}

/// Full-screen terminal output via crossterm
///
/// Enters the alternate screen in raw mode with the cursor hidden; the
/// terminal is restored when the value is dropped.
pub struct TerminalScreen {
    out: Stdout,
    active: bool,
}

impl TerminalScreen {
    /// Take over the terminal
    pub fn enter() -> Result<Self> {
        let mut out = io::stdout();
        enable_raw_mode()?;
        if let Err(e) = execute!(out, EnterAlternateScreen, Hide, Clear(ClearType::All)) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }
        Ok(TerminalScreen { out, active: true })
    }

    /// Give the terminal back. Safe to call more than once.
    pub fn restore(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        let _ = execute!(self.out, Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

impl Screen for TerminalScreen {
    fn viewport(&self) -> Viewport {
        match terminal::size() {
            // Last row stays free so a full frame never scrolls
            Ok((cols, rows)) => Viewport {
                cols,
                rows: rows.saturating_sub(1),
            },
            Err(_) => FALLBACK_VIEWPORT,
        }
    }

    fn present(&mut self, text: &str) -> Result<()> {
        for (row, line) in text.lines().enumerate() {
            queue!(
                self.out,
                MoveTo(0, row as u16),
                Print(line),
                Clear(ClearType::UntilNewLine)
            )?;
        }
        let next_row = text.lines().count() as u16;
        queue!(self.out, MoveTo(0, next_row), Clear(ClearType::FromCursorDown))?;
        self.out.flush()?;
        Ok(())
    }
}

impl Drop for TerminalScreen {
    fn drop(&mut self) {
        self.restore();
    }
}
