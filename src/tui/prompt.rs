//! Framed prompt: draw a screen, collect one answer.
//!
//! Split in two:
//! - `LineEditor`: pure character accumulation and commit rules
//! - `FramedPrompt`: the redraw/read loop over two capability traits
//!
//! The traits are the seam between the kiosk logic and the terminal.
//! Tests drive the prompt with scripted keys and a recording sink.

use std::io;

use super::state::{PromptRequest, SessionError};
use super::view::{layout_frame, FrameGeometry, FrameLayout, KIOSK_FRAME};

/// Interrupt (Ctrl+C).
pub const INTERRUPT: char = '\x03';
/// Delete, as sent by most terminals for Backspace.
pub const DELETE: char = '\x7f';
/// Backspace proper.
pub const BACKSPACE: char = '\x08';
/// A key press with no character of its own: Esc, arrows, function keys, chords.
pub const OTHER_KEY: char = '\x1b';

// ============================================================================
// CAPABILITIES
// ============================================================================

/// Something that yields one character per call, blocking until it can.
pub trait KeySource {
    fn read_char(&mut self) -> io::Result<char>;
}

/// Something that can show a computed frame.
pub trait FrameSink {
    fn present(&mut self, layout: &FrameLayout) -> io::Result<()>;
}

// ============================================================================
// LINE EDITOR (pure)
// ============================================================================

/// What happened after feeding one character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    /// Keep reading.
    Continue,
    /// The answer is final.
    Commit(String),
    /// Abort the session.
    Interrupt,
}

/// Input buffer for one prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineEditor {
    buffer: String,
    max_chars: Option<usize>,
    limit: usize,
}

impl LineEditor {
    /// `max_chars` is the prompt's own cap; `width_limit` the frame's.
    pub fn new(max_chars: Option<usize>, width_limit: usize) -> Self {
        let limit = match max_chars {
            Some(max) => max.min(width_limit),
            None => width_limit,
        };
        LineEditor {
            buffer: String::new(),
            max_chars,
            limit,
        }
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Apply one character.
    pub fn feed(&mut self, ch: char) -> EditOutcome {
        match ch {
            INTERRUPT => EditOutcome::Interrupt,
            BACKSPACE | DELETE => {
                self.buffer.pop();
                EditOutcome::Continue
            }
            '\r' | '\n' => {
                let trimmed = self.buffer.trim();
                if !trimmed.is_empty() || self.max_chars == Some(1) {
                    EditOutcome::Commit(trimmed.to_string())
                } else {
                    EditOutcome::Continue
                }
            }
            // A single-key screen takes any key; a text line ignores these
            c if c.is_control() => {
                if self.max_chars == Some(1) {
                    EditOutcome::Commit(self.buffer.trim().to_string())
                } else {
                    EditOutcome::Continue
                }
            }
            c => {
                self.buffer.push(c);
                if self.buffer.chars().count() >= self.limit {
                    EditOutcome::Commit(self.buffer.trim().to_string())
                } else {
                    EditOutcome::Continue
                }
            }
        }
    }
}

// ============================================================================
// FRAMED PROMPT (effects via traits)
// ============================================================================

/// Draws prompt screens and reads answers.
pub struct FramedPrompt<K, S> {
    keys: K,
    sink: S,
    geometry: FrameGeometry,
}

impl<K: KeySource, S: FrameSink> FramedPrompt<K, S> {
    pub fn new(keys: K, sink: S) -> Self {
        Self::with_geometry(keys, sink, KIOSK_FRAME)
    }

    pub fn with_geometry(keys: K, sink: S, geometry: FrameGeometry) -> Self {
        FramedPrompt {
            keys,
            sink,
            geometry,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Show `request` and return the committed answer.
    ///
    /// The frame is redrawn after every key. Display-only screens are
    /// drawn once and answer "" without touching the key source.
    pub fn prompt(&mut self, request: &PromptRequest) -> Result<String, SessionError> {
        let mut editor = LineEditor::new(request.max_chars, self.geometry.input_limit());
        self.draw(request, editor.buffer())?;

        if request.ignore_input {
            return Ok(String::new());
        }

        loop {
            let ch = self.keys.read_char()?;
            match editor.feed(ch) {
                EditOutcome::Continue => self.draw(request, editor.buffer())?,
                EditOutcome::Commit(answer) => {
                    self.draw(request, editor.buffer())?;
                    return Ok(answer);
                }
                EditOutcome::Interrupt => return Err(SessionError::Interrupted),
            }
        }
    }

    fn draw(&mut self, request: &PromptRequest, buffer: &str) -> io::Result<()> {
        let layout = layout_frame(self.geometry, request, buffer, request.show_caret);
        self.sink.present(&layout)
    }
}

// ============================================================================
// TEST DOUBLES
// ============================================================================

/// Key source replaying a fixed script. Running dry is an error.
#[derive(Debug, Clone, Default)]
pub struct ScriptedKeys {
    keys: std::collections::VecDeque<char>,
}

impl ScriptedKeys {
    pub fn new(script: &str) -> Self {
        ScriptedKeys {
            keys: script.chars().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.keys.len()
    }
}

impl KeySource for ScriptedKeys {
    fn read_char(&mut self) -> io::Result<char> {
        self.keys
            .pop_front()
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "key script exhausted"))
    }
}

/// Sink that keeps the plain text of every frame shown.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub frames: Vec<String>,
}

impl RecordingSink {
    pub fn last(&self) -> Option<&str> {
        self.frames.last().map(String::as_str)
    }
}

impl FrameSink for RecordingSink {
    fn present(&mut self, layout: &FrameLayout) -> io::Result<()> {
        self.frames.push(layout.to_text());
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
