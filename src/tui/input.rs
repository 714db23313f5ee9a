//! Raw keyboard input.
//!
//! `RawInputReader` holds the terminal in raw mode for as long as it lives
//! and turns crossterm key events into the plain characters the prompt
//! editor understands.

use std::io;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

use super::prompt::{KeySource, DELETE, INTERRUPT, OTHER_KEY};

// ============================================================================
// KEY MAPPING
// ============================================================================

/// Map a crossterm key event to the character the editor should see.
///
/// Keys without a character of their own (arrows, function keys, chords
/// other than Ctrl+C) all become `OTHER_KEY`, so they still count as a key
/// press. Key releases and bare modifiers return None.
pub fn map_key(key: KeyEvent) -> Option<char> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if let KeyCode::Modifier(_) = key.code {
        return None;
    }

    // Ctrl+C is the only chord with a meaning of its own
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('C') => Some(INTERRUPT),
            _ => Some(OTHER_KEY),
        };
    }
    if key.modifiers.contains(KeyModifiers::ALT) {
        return Some(OTHER_KEY);
    }

    match key.code {
        KeyCode::Enter => Some('\r'),
        KeyCode::Backspace | KeyCode::Delete => Some(DELETE),
        KeyCode::Char(c) => Some(c),
        _ => Some(OTHER_KEY),
    }
}

// ============================================================================
// RAW MODE GUARD
// ============================================================================

/// Exclusive raw-mode access to the keyboard. Dropping it restores the
/// terminal's previous line discipline.
#[derive(Debug)]
pub struct RawInputReader {
    _private: (),
}

impl RawInputReader {
    pub fn acquire() -> io::Result<Self> {
        enable_raw_mode()?;
        tracing::debug!("raw mode enabled");
        Ok(RawInputReader { _private: () })
    }
}

impl Drop for RawInputReader {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        tracing::debug!("raw mode released");
    }
}

impl KeySource for RawInputReader {
    fn read_char(&mut self) -> io::Result<char> {
        loop {
            if let Event::Key(key) = event::read()? {
                if let Some(ch) = map_key(key) {
                    return Ok(ch);
                }
            }
            // resize, focus, mouse, releases: keep waiting
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
