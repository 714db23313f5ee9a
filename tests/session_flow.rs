//! End-to-end kiosk sessions over scripted keys and recorded peripherals.

use fortune_kiosk::corpus::Corpus;
use fortune_kiosk::peripheral::Peripherals;
use fortune_kiosk::report::audit_corpus;
use fortune_kiosk::script::{required_prefixes, FORTUNE_TEMPLATE_ROOT};
use fortune_kiosk::tui::prompt::{FramedPrompt, RecordingSink, ScriptedKeys};
use fortune_kiosk::tui::run::{announce_startup, drive, drive_once};
use fortune_kiosk::tui::state::{SessionError, SessionState};
use fortune_kiosk::tui::update::KioskStateMachine;
use fortune_kiosk::types::{Command, Pacing};

#[derive(Debug, Default)]
struct Recorded {
    commands: Vec<char>,
    printed: Vec<String>,
}

impl Peripherals for Recorded {
    fn send_command(&mut self, command: Command) {
        self.commands.push(command.as_char());
    }

    fn print(&mut self, text: &str) {
        self.printed.push(text.to_string());
    }
}

impl Recorded {
    /// Codes that actually reach the wire.
    fn wire(&self) -> String {
        self.commands.iter().filter(|c| **c != '_').collect()
    }
}

fn kiosk_corpus() -> Corpus {
    let mut tsv = String::from("Key\tSpeaker\tText\n");
    for prefix in required_prefixes() {
        let text = if prefix.starts_with(FORTUNE_TEMPLATE_ROOT) {
            "[PLAYER_NAME], your luck lies in [fortunefeature].\\nGo now.".to_string()
        } else {
            format!("Screen {prefix}")
        };
        tsv.push_str(&format!("{prefix}01\tteller\t{text}\n"));
    }
    Corpus::parse(&tsv)
}

fn prompt(script: &str) -> FramedPrompt<ScriptedKeys, RecordingSink> {
    FramedPrompt::new(ScriptedKeys::new(script), RecordingSink::default())
}

/// Drive until the machine is back in Idle after a full session.
fn run_session(
    machine: &mut KioskStateMachine<'_>,
    prompt: &mut FramedPrompt<ScriptedKeys, RecordingSink>,
    io: &mut Recorded,
) {
    loop {
        let step = drive_once(machine, prompt, io).unwrap();
        if step.state == SessionState::Idle {
            break;
        }
    }
}

#[test]
fn test_corpus_passes_audit() {
    assert!(audit_corpus(&kiosk_corpus()).is_clean());
}

#[test]
fn test_full_session_prints_personal_fortune() {
    let corpus = kiosk_corpus();
    let mut machine = KioskStateMachine::new(&corpus, Pacing::instant(), Some(5));
    let mut prompt = prompt(" Lee\r2 a red shoes\rxxxx");
    let mut io = Recorded::default();

    run_session(&mut machine, &mut prompt, &mut io);

    assert_eq!(io.wire(), "123");
    assert_eq!(io.printed, vec!["Lee, your luck lies in red shoes.\nGo now."]);
    assert_eq!(machine.state(), SessionState::Idle);
}

#[test]
fn test_startup_sends_idle_before_the_first_visitor() {
    let corpus = kiosk_corpus();
    let mut machine = KioskStateMachine::new(&corpus, Pacing::instant(), Some(5));
    let mut prompt = prompt(" Lee\r2 a red shoes\rxxxx");
    let mut io = Recorded::default();

    announce_startup(&mut io);
    run_session(&mut machine, &mut prompt, &mut io);

    assert_eq!(io.wire(), "3123");
}

#[test]
fn test_one_code_per_step() {
    let corpus = kiosk_corpus();
    let mut machine = KioskStateMachine::new(&corpus, Pacing::instant(), Some(5));
    let mut prompt = prompt("kLee\r1kBroses\rkkkk");
    let mut io = Recorded::default();

    run_session(&mut machine, &mut prompt, &mut io);

    // Idle .. Goodbye: eleven steps, one code each
    assert_eq!(io.commands.len(), 11);
    assert_eq!(io.commands[0], '1');
    assert_eq!(io.commands[8], '2');
    assert_eq!(io.commands[10], '3');
}

#[test]
fn test_invalid_category_reprompts_without_a_code() {
    let corpus = kiosk_corpus();
    let mut machine = KioskStateMachine::new(&corpus, Pacing::instant(), Some(5));
    let mut prompt = prompt("kAnn\r9x3");
    let mut io = Recorded::default();

    drive_once(&mut machine, &mut prompt, &mut io).unwrap();
    drive_once(&mut machine, &mut prompt, &mut io).unwrap();
    for _ in 0..2 {
        let step = drive_once(&mut machine, &mut prompt, &mut io).unwrap();
        assert_eq!(step.state, SessionState::AwaitingCategory);
    }
    let step = drive_once(&mut machine, &mut prompt, &mut io).unwrap();

    assert_eq!(step.state, SessionState::TopicIntro);
    assert_eq!(io.commands, vec!['1', '_', '_', '_', '_']);
}

#[test]
fn test_interrupt_stops_the_loop_with_no_further_codes() {
    let corpus = kiosk_corpus();
    let mut machine = KioskStateMachine::new(&corpus, Pacing::instant(), Some(5));
    let mut prompt = prompt("kLee\r\x03");
    let mut io = Recorded::default();

    let reason = drive(&mut machine, &mut prompt, &mut io);

    assert!(matches!(reason, SessionError::Interrupted));
    assert_eq!(io.commands, vec!['1', '_']);
    assert!(io.printed.is_empty());
}

#[test]
fn test_long_answer_is_cut_at_frame_width() {
    let corpus = kiosk_corpus();
    let mut machine = KioskStateMachine::new(&corpus, Pacing::instant(), Some(5));
    let long_name = "n".repeat(60);
    let mut prompt = prompt(&format!("k{long_name}"));
    let mut io = Recorded::default();

    drive_once(&mut machine, &mut prompt, &mut io).unwrap();
    let step = drive_once(&mut machine, &mut prompt, &mut io).unwrap();

    // 59 wide frame: at most 55 characters before an implicit commit
    assert_eq!(step.state, SessionState::AwaitingCategory);
    assert_eq!(machine.answers().name, "n".repeat(55));
}

#[test]
fn test_empty_enter_does_not_commit_a_name() {
    let corpus = kiosk_corpus();
    let mut machine = KioskStateMachine::new(&corpus, Pacing::instant(), Some(5));
    let mut prompt = prompt("k\r  \rZo\r");
    let mut io = Recorded::default();

    drive_once(&mut machine, &mut prompt, &mut io).unwrap();
    drive_once(&mut machine, &mut prompt, &mut io).unwrap();

    assert_eq!(machine.answers().name, "Zo");
}

#[test]
fn test_every_frame_is_a_full_box() {
    let corpus = kiosk_corpus();
    let mut machine = KioskStateMachine::new(&corpus, Pacing::instant(), Some(5));
    let mut prompt = prompt("kLee\r4kbcats\rkkkk");
    let mut io = Recorded::default();

    run_session(&mut machine, &mut prompt, &mut io);

    for frame in &prompt.sink().frames {
        let rows: Vec<&str> = frame.split('\n').collect();
        assert_eq!(rows.len(), 18);
        assert!(rows.iter().all(|r| r.chars().count() == 59));
    }
}
