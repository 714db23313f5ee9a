//! Kiosk color semantics and style constants.
//!
//! Pure data, consumed by the view layer.
//!
//! Color semantics:
//! - Light magenta: the frame and the fortune teller's words
//! - Magenta: what the visitor types
//! - Light cyan: the caret

use ratatui::style::{Color, Modifier, Style};

// ============================================================================
// FRAME STYLES
// ============================================================================

/// Border characters and padding.
pub const STYLE_FRAME: Style = Style::new().fg(Color::LightMagenta);

/// Static prompt text inside the frame.
pub const STYLE_TEXT: Style = Style::new()
    .fg(Color::LightMagenta)
    .add_modifier(Modifier::BOLD);

// ============================================================================
// INPUT STYLES
// ============================================================================

/// Text the visitor has typed so far.
pub const STYLE_INPUT: Style = Style::new().fg(Color::Magenta);

/// Caret after the typed text.
pub const STYLE_CARET: Style = Style::new()
    .fg(Color::LightCyan)
    .add_modifier(Modifier::SLOW_BLINK);

// ============================================================================
// TESTS
// ============================================================================
