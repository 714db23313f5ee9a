//! TUI effects boundary: terminal lifecycle, main loop, effect execution.
//!
//! This is the only module with side effects besides the input guard. It
//! wires the pure layers (state, update, view) to the real terminal via
//! crossterm and ratatui, and to the peripherals.
//!
//! The loop is single-threaded and synchronous: block on a key, step the
//! machine, send the command code, run the effects in order, repeat. It
//! only ends on an error; an interrupt arrives as `SessionError::Interrupted`
//! and unwinds through the guards so the terminal is restored.

use std::io::{self, Stdout};
use std::thread;

use crossterm::cursor::{Hide, Show};
use crossterm::terminal::{disable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::corpus::Corpus;
use crate::peripheral::Peripherals;
use crate::types::{Command, KioskConfig};

use super::input::RawInputReader;
use super::prompt::{FrameSink, FramedPrompt, KeySource};
use super::state::{Effect, SessionError, Step};
use super::update::KioskStateMachine;
use super::view::{render, FrameLayout};

// ============================================================================
// TERMINAL LIFECYCLE
// ============================================================================

/// Alternate-screen ratatui terminal. Dropping it puts the normal screen back.
pub struct TerminalScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalScreen {
    pub fn acquire() -> io::Result<Self> {
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        stdout.execute(Hide)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(TerminalScreen { terminal })
    }
}

impl FrameSink for TerminalScreen {
    fn present(&mut self, layout: &FrameLayout) -> io::Result<()> {
        // Full repaint: a fallback printer message may have scribbled on screen
        self.terminal.clear()?;
        self.terminal.draw(|frame| render(layout, frame))?;
        Ok(())
    }
}

impl Drop for TerminalScreen {
    fn drop(&mut self) {
        let _ = restore_screen();
    }
}

fn restore_screen() -> io::Result<()> {
    let mut stdout = io::stdout();
    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Install a panic hook that restores the terminal before printing the panic.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        // Best-effort terminal restoration
        let _ = disable_raw_mode();
        let _ = restore_screen();
        original_hook(panic_info);
    }));
}

// ============================================================================
// EFFECT HANDLING
// ============================================================================

/// Forward one step's outputs: command code first, then effects in order.
pub fn apply_step(step: Step, io: &mut impl Peripherals) {
    io.send_command(step.command);

    for effect in step.effects {
        match effect {
            Effect::Print(text) => io.print(&text),
            Effect::Hold(duration) => {
                if !duration.is_zero() {
                    thread::sleep(duration);
                }
            }
        }
    }
}

// ============================================================================
// MAIN LOOP
// ============================================================================

/// Run one machine step and apply its outputs.
pub fn drive_once<K: KeySource, S: FrameSink>(
    machine: &mut KioskStateMachine<'_>,
    prompt: &mut FramedPrompt<K, S>,
    io: &mut impl Peripherals,
) -> Result<Step, SessionError> {
    let step = machine.step(prompt)?;
    apply_step(step.clone(), io);
    Ok(step)
}

/// Put the microcontroller in its idle routine before the first visitor.
pub fn announce_startup(io: &mut impl Peripherals) {
    io.send_command(Command::SessionEnded);
}

/// Step forever. Only returns with an error (an interrupt included).
pub fn drive<K: KeySource, S: FrameSink>(
    machine: &mut KioskStateMachine<'_>,
    prompt: &mut FramedPrompt<K, S>,
    io: &mut impl Peripherals,
) -> SessionError {
    loop {
        if let Err(e) = drive_once(machine, prompt, io) {
            return e;
        }
    }
}

/// Take over the terminal and run kiosk sessions until interrupted.
///
/// This is the main entry point for the kiosk. Raw mode and the alternate
/// screen are held by guards for the whole call, so they are released on
/// every way out.
pub fn run(
    corpus: &Corpus,
    config: &KioskConfig,
    io: &mut impl Peripherals,
) -> Result<(), SessionError> {
    install_panic_hook();
    let keys = RawInputReader::acquire()?;
    let screen = TerminalScreen::acquire()?;
    let mut prompt = FramedPrompt::new(keys, screen);
    let mut machine = KioskStateMachine::new(corpus, config.pacing, config.seed);

    announce_startup(io);
    tracing::info!("kiosk running");
    let reason = drive(&mut machine, &mut prompt, io);
    tracing::info!(reason = %reason, state = ?machine.state(), "kiosk stopped");

    Err(reason)
}

// ============================================================================
// TESTS
// ============================================================================
