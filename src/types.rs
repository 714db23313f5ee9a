//! Domain types for fortune-kiosk.
//!
//! Session answers, command codes, and the configuration structs the
//! binary assembles from its command line.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;

// ============================================================================
// SESSION ANSWERS
// ============================================================================

/// Fortune category chosen at the category prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Love,
    Fortune,
    Wisdom,
    Surprise,
}

impl Topic {
    /// All topics in menu order (1-4).
    pub const ALL: [Topic; 4] = [Topic::Love, Topic::Fortune, Topic::Wisdom, Topic::Surprise];

    /// Map a menu number to a topic. Only 1-4 are valid.
    pub fn from_menu_number(n: u32) -> Option<Topic> {
        match n {
            1 => Some(Topic::Love),
            2 => Some(Topic::Fortune),
            3 => Some(Topic::Wisdom),
            4 => Some(Topic::Surprise),
            _ => None,
        }
    }

    /// Human-facing name.
    pub fn name(self) -> &'static str {
        match self {
            Topic::Love => "love",
            Topic::Fortune => "fortune",
            Topic::Wisdom => "wisdom",
            Topic::Surprise => "surprise",
        }
    }

    /// Slug used inside corpus keys.
    ///
    /// The script file spells the surprise topic "surprize" in its keys.
    pub fn corpus_slug(self) -> &'static str {
        match self {
            Topic::Love => "love",
            Topic::Fortune => "fortune",
            Topic::Wisdom => "wisdom",
            Topic::Surprise => "surprize",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Answer to the topic-specific A/B question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SubAnswer {
    A,
    B,
}

impl SubAnswer {
    pub const ALL: [SubAnswer; 2] = [SubAnswer::A, SubAnswer::B];

    /// Parse a committed prompt result, case-insensitively.
    pub fn parse(input: &str) -> Option<SubAnswer> {
        match input.to_uppercase().as_str() {
            "A" => Some(SubAnswer::A),
            "B" => Some(SubAnswer::B),
            _ => None,
        }
    }

    /// Letter used inside corpus keys (always uppercase).
    pub fn letter(self) -> &'static str {
        match self {
            SubAnswer::A => "A",
            SubAnswer::B => "B",
        }
    }
}

impl fmt::Display for SubAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

/// Everything one visitor has told the kiosk so far.
///
/// Created empty on entering Idle, filled in prompt by prompt, and
/// dropped when the session returns to Idle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionAnswers {
    pub name: String,
    /// None until a valid menu number is entered.
    pub category: Option<Topic>,
    /// None until A or B is entered.
    pub sub_answer: Option<SubAnswer>,
    pub free_text: String,
}

// ============================================================================
// COMMAND CODES
// ============================================================================

/// One-character cue for the lighting/motion microcontroller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// '1' — a visitor woke the kiosk.
    SessionStarted,
    /// '2' — the fortune is about to be revealed.
    FortuneReady,
    /// '3' — the visitor left; back to attract mode.
    SessionEnded,
    /// '_' — nothing changed for the hardware.
    Noop,
}

impl Command {
    pub fn as_char(self) -> char {
        match self {
            Command::SessionStarted => '1',
            Command::FortuneReady => '2',
            Command::SessionEnded => '3',
            Command::Noop => '_',
        }
    }

    /// Byte to put on the wire, if this code is part of the serial protocol.
    ///
    /// The microcontroller only understands '0'..='8'.
    pub fn wire_byte(self) -> Option<u8> {
        match self.as_char() {
            c @ '0'..='8' => Some(c as u8),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable pretty output.
    #[default]
    Human,
    /// Machine-readable JSON.
    Json,
}

/// Fixed-duration delays the dialogue imposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Pause on the second destiny screen. Input cannot skip it.
    pub destiny_pause: Duration,
    /// Hold after the fortune is sent to the printer.
    pub reveal_hold: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            destiny_pause: Duration::from_secs(3),
            reveal_hold: Duration::from_secs(2),
        }
    }
}

impl Pacing {
    /// No delays at all (tests, rehearsals).
    pub fn instant() -> Self {
        Self {
            destiny_pause: Duration::ZERO,
            reveal_hold: Duration::ZERO,
        }
    }
}

/// Which serial device carries the command codes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SerialPortChoice {
    /// Look for a USB-serial bridge under /dev.
    #[default]
    Auto,
    /// Use this device path.
    Path(PathBuf),
    /// Run without a microcontroller.
    Disabled,
}

/// Configuration for the serial command channel.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    pub port: SerialPortChoice,
    /// Line speed. Must match the microcontroller sketch.
    pub baud: u32,
    /// How long to wait for an acknowledgment line after each command.
    pub ack_timeout: Duration,
    /// Delay after opening the port (the board resets on open).
    pub settle: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: SerialPortChoice::Auto,
            baud: 9600,
            ack_timeout: Duration::from_secs(1),
            settle: Duration::from_secs(2),
        }
    }
}

/// Configuration for the receipt printer.
#[derive(Debug, Clone)]
pub struct PrinterConfig {
    /// Character device the printer is attached to.
    pub device: PathBuf,
    /// Blank lines appended after each fortune to feed paper.
    pub feed_lines: usize,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from("/dev/ttyS0"),
            feed_lines: 0,
        }
    }
}

/// Everything the `run` command needs.
#[derive(Debug, Clone)]
pub struct KioskConfig {
    /// Tab-separated script file.
    pub corpus_path: PathBuf,
    pub serial: SerialConfig,
    pub printer: PrinterConfig,
    pub pacing: Pacing,
    /// Seed for text selection. None = seeded from the OS.
    pub seed: Option<u64>,
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            corpus_path: PathBuf::from("Fortune cookie - Script.tsv"),
            serial: SerialConfig::default(),
            printer: PrinterConfig::default(),
            pacing: Pacing::default(),
            seed: None,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_numbers_map_to_topics_in_order() {
        assert_eq!(Topic::from_menu_number(1), Some(Topic::Love));
        assert_eq!(Topic::from_menu_number(2), Some(Topic::Fortune));
        assert_eq!(Topic::from_menu_number(3), Some(Topic::Wisdom));
        assert_eq!(Topic::from_menu_number(4), Some(Topic::Surprise));
    }

    #[test]
    fn test_menu_numbers_outside_range_are_rejected() {
        assert_eq!(Topic::from_menu_number(0), None);
        assert_eq!(Topic::from_menu_number(5), None);
    }

    #[test]
    fn test_surprise_uses_script_spelling_in_keys() {
        assert_eq!(Topic::Surprise.name(), "surprise");
        assert_eq!(Topic::Surprise.corpus_slug(), "surprize");
    }

    #[test]
    fn test_sub_answer_parse_is_case_insensitive() {
        assert_eq!(SubAnswer::parse("a"), Some(SubAnswer::A));
        assert_eq!(SubAnswer::parse("B"), Some(SubAnswer::B));
        assert_eq!(SubAnswer::parse("c"), None);
        assert_eq!(SubAnswer::parse(""), None);
    }

    #[test]
    fn test_command_chars() {
        assert_eq!(Command::SessionStarted.as_char(), '1');
        assert_eq!(Command::FortuneReady.as_char(), '2');
        assert_eq!(Command::SessionEnded.as_char(), '3');
        assert_eq!(Command::Noop.as_char(), '_');
    }

    #[test]
    fn test_noop_has_no_wire_byte() {
        assert_eq!(Command::SessionStarted.wire_byte(), Some(b'1'));
        assert_eq!(Command::Noop.wire_byte(), None);
    }

    #[test]
    fn test_default_pacing_matches_dialogue_timing() {
        let pacing = Pacing::default();
        assert_eq!(pacing.destiny_pause, Duration::from_secs(3));
        assert_eq!(pacing.reveal_hold, Duration::from_secs(2));
    }

    #[test]
    fn test_answers_serialize_to_compact_json() {
        let answers = SessionAnswers {
            name: "Lee".into(),
            category: Some(Topic::Wisdom),
            sub_answer: Some(SubAnswer::B),
            free_text: "tea".into(),
        };
        let json = serde_json::to_string(&answers).unwrap();
        assert_eq!(
            json,
            r#"{"name":"Lee","category":"wisdom","sub_answer":"B","free_text":"tea"}"#
        );
    }
}
