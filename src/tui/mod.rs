//! Kiosk terminal interface.
//!
//! Organized along FP/Unix boundaries:
//! - `state`: Pure data types (SessionState, PromptRequest, Transition)
//! - `update`: Pure transitions and screen composition
//! - `view`: Pure frame layout, plus ratatui drawing
//! - `theme`: Style constants
//! - `prompt`: Line editing over key/frame capability traits
//! - `input`, `run`: Effects (raw keyboard, terminal, main loop)

pub mod input;
pub mod prompt;
pub mod run;
pub mod state;
pub mod theme;
pub mod update;
pub mod view;

pub use run::run;
