//! Session state algebra: pure types, zero effects.
//!
//! These types define the whole dialogue state space. The transition
//! function (`update`) and the prompt renderer both program against them.
//!
//! Design principle: SessionState is a plain, totally ordered tag. Data a
//! visitor has entered lives in SessionAnswers, which is passed into and
//! returned from every transition rather than held in shared mutables.

use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::corpus::CorpusError;
use crate::types::{Command, SessionAnswers};

// ============================================================================
// SESSION STATES
// ============================================================================

/// Where the visitor is in the dialogue.
///
/// Declaration order is dialogue order; Goodbye wraps back to Idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum SessionState {
    /// Attract screen. Any key starts a session.
    #[default]
    Idle,
    /// Free-text name prompt.
    AwaitingName,
    /// Single digit 1-4.
    AwaitingCategory,
    /// Topic-specific introduction. Any key.
    TopicIntro,
    /// Single letter A or B.
    AwaitingSubAnswer,
    /// Free-text answer that fills the fortune template.
    AwaitingFreeText,
    /// Any key.
    DestinyPause1,
    /// Input ignored, fixed pause.
    DestinyPause2,
    /// Any key.
    DestinyPause3,
    /// Fortune on screen and on paper.
    RevealFortune,
    /// Any key ends the session.
    Goodbye,
}

impl SessionState {
    /// Every state in dialogue order.
    pub const ALL: [SessionState; 11] = [
        SessionState::Idle,
        SessionState::AwaitingName,
        SessionState::AwaitingCategory,
        SessionState::TopicIntro,
        SessionState::AwaitingSubAnswer,
        SessionState::AwaitingFreeText,
        SessionState::DestinyPause1,
        SessionState::DestinyPause2,
        SessionState::DestinyPause3,
        SessionState::RevealFortune,
        SessionState::Goodbye,
    ];
}

// ============================================================================
// PROMPT REQUESTS
// ============================================================================

/// Everything the framed prompt needs to draw one screen and read one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    /// Text above the input line. Split on '\n'.
    pub pre_text: String,
    /// Text below the input line. Split on '\n'.
    pub post_text: String,
    /// Input cap. None = frame width fallback.
    pub max_chars: Option<usize>,
    /// Draw once and return "" without reading a key.
    pub ignore_input: bool,
    /// Shifts the block down (positive) or up (negative).
    pub vertical_offset: i32,
    pub show_caret: bool,
}

impl PromptRequest {
    /// Open-ended text entry with a visible caret.
    pub fn free_text(pre_text: impl Into<String>) -> Self {
        PromptRequest {
            pre_text: pre_text.into(),
            post_text: String::new(),
            max_chars: None,
            ignore_input: false,
            vertical_offset: 0,
            show_caret: true,
        }
    }

    /// One-character answer with a hint underneath.
    pub fn single_char(pre_text: impl Into<String>, post_text: impl Into<String>) -> Self {
        PromptRequest {
            post_text: post_text.into(),
            max_chars: Some(1),
            ..PromptRequest::free_text(pre_text)
        }
    }

    /// A screen that waits for any key, without a caret.
    pub fn any_key(pre_text: impl Into<String>, vertical_offset: i32) -> Self {
        PromptRequest {
            max_chars: Some(1),
            vertical_offset,
            show_caret: false,
            ..PromptRequest::free_text(pre_text)
        }
    }

    /// A screen drawn once, with no input at all.
    pub fn display_only(pre_text: impl Into<String>, vertical_offset: i32) -> Self {
        PromptRequest {
            ignore_input: true,
            ..PromptRequest::any_key(pre_text, vertical_offset)
        }
    }

    pub fn with_post_text(mut self, post_text: impl Into<String>) -> Self {
        self.post_text = post_text.into();
        self
    }
}

// ============================================================================
// TRANSITIONS
// ============================================================================

/// Side effect requested by a pure transition.
///
/// Pure code never executes these; the driving loop does, in order,
/// after forwarding the command code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send the fortune to the printer.
    Print(String),
    /// Block for a fixed pacing delay.
    Hold(Duration),
}

/// Result of a pure state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: SessionState,
    pub answers: SessionAnswers,
    pub command: Command,
    pub effects: Vec<Effect>,
}

impl Transition {
    /// Move to `state`, emitting the no-op code.
    pub fn to(state: SessionState, answers: SessionAnswers) -> Self {
        Transition {
            state,
            answers,
            command: Command::Noop,
            effects: Vec::new(),
        }
    }

    pub fn with_command(mut self, command: Command) -> Self {
        self.command = command;
        self
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// What one machine step hands to the driving loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// State the machine is in after the step.
    pub state: SessionState,
    pub command: Command,
    pub effects: Vec<Effect>,
}

// ============================================================================
// ERRORS
// ============================================================================

/// Why a session step could not complete.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The interrupt key was pressed. Not a failure; ends the process.
    #[error("interrupted")]
    Interrupted,

    /// A topic screen was reached before the answer it depends on.
    #[error("{state:?} needs a {missing} answer that was never given")]
    Incomplete {
        state: SessionState,
        missing: &'static str,
    },

    #[error(transparent)]
    Corpus(#[from] CorpusError),

    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

// ============================================================================
// TESTS
// ============================================================================
