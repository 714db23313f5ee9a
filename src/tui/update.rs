//! Pure state transitions: (SessionState, answer) → Transition.
//!
//! This is the core logic of the kiosk. Fully testable without a terminal.
//! `compose` decides what each state shows, `update` decides where an
//! answer leads. Invalid answers keep the current state (re-prompt).
//! `KioskStateMachine` threads the two through a prompt, one step at a time.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::corpus::Corpus;
use crate::placeholder::fill_template;
use crate::script;
use crate::types::{Command, Pacing, SessionAnswers, SubAnswer, Topic};

use super::prompt::{FrameSink, FramedPrompt, KeySource};
use super::state::{Effect, PromptRequest, SessionError, SessionState, Step, Transition};

// ============================================================================
// SCREENS
// ============================================================================

/// Build the screen for `state` from the corpus.
///
/// Texts are chosen at random on every call, so a re-prompt after invalid
/// input may word the question differently.
pub fn compose<R: Rng + ?Sized>(
    state: SessionState,
    answers: &SessionAnswers,
    corpus: &Corpus,
    rng: &mut R,
) -> Result<PromptRequest, SessionError> {
    let mut text = |prefix: &str| corpus.random_text_with_prefix(prefix, &mut *rng);

    let request = match state {
        SessionState::Idle => PromptRequest::any_key(text(script::IDLE)?, 1),
        SessionState::AwaitingName => PromptRequest::free_text(text(script::NAME)? + "\n"),
        SessionState::AwaitingCategory => PromptRequest::single_char(
            text(script::CATEGORY)? + "\n",
            format!("\n{}", text(script::CATEGORY_HINT)?),
        ),
        SessionState::TopicIntro => {
            let topic = require_topic(state, answers)?;
            PromptRequest::any_key(text(&script::topic_intro(topic))?, 1)
        }
        SessionState::AwaitingSubAnswer => {
            let topic = require_topic(state, answers)?;
            PromptRequest::single_char(
                text(&script::sub_question(topic))? + "\n",
                format!("\n{}", text(&script::sub_question_hint(topic))?),
            )
        }
        SessionState::AwaitingFreeText => {
            let topic = require_topic(state, answers)?;
            let sub = require_sub_answer(state, answers)?;
            PromptRequest::free_text(format!(
                "{}\n{}",
                text(&script::free_question(topic, sub))?,
                text(&script::free_question_hint(topic, sub))?
            ))
        }
        SessionState::DestinyPause1 => PromptRequest::any_key(text(script::DESTINY_1)? + "\n", 1)
            .with_post_text(text(script::DESTINY_1_HINT)?),
        SessionState::DestinyPause2 => {
            PromptRequest::display_only(text(script::DESTINY_2)? + "\n", 2)
        }
        SessionState::DestinyPause3 => PromptRequest::any_key(text(script::DESTINY_3)? + "\n", 2),
        SessionState::RevealFortune => {
            let topic = require_topic(state, answers)?;
            let sub = require_sub_answer(state, answers)?;
            let template = text(&script::fortune_template(topic, sub))?;
            PromptRequest::any_key(fill_template(&template, answers), 2)
        }
        SessionState::Goodbye => PromptRequest::any_key(text(script::GOODBYE)? + "\n", 2),
    };

    Ok(request)
}

fn require_topic(state: SessionState, answers: &SessionAnswers) -> Result<Topic, SessionError> {
    answers.category.ok_or(SessionError::Incomplete {
        state,
        missing: "category",
    })
}

fn require_sub_answer(
    state: SessionState,
    answers: &SessionAnswers,
) -> Result<SubAnswer, SessionError> {
    answers.sub_answer.ok_or(SessionError::Incomplete {
        state,
        missing: "A/B",
    })
}

// ============================================================================
// TRANSITIONS
// ============================================================================

/// Pure state transition function.
///
/// `input` is the committed prompt answer, `shown` the screen it answered.
/// The driving loop forwards the command first, then runs the effects in
/// order.
pub fn update(
    state: SessionState,
    mut answers: SessionAnswers,
    input: &str,
    shown: &PromptRequest,
    pacing: &Pacing,
) -> Transition {
    match state {
        SessionState::Idle => Transition::to(SessionState::AwaitingName, SessionAnswers::default())
            .with_command(Command::SessionStarted),
        SessionState::AwaitingName => {
            answers.name = input.to_string();
            Transition::to(SessionState::AwaitingCategory, answers)
        }
        SessionState::AwaitingCategory => match parse_category(input) {
            Some(topic) => {
                answers.category = Some(topic);
                Transition::to(SessionState::TopicIntro, answers)
            }
            None => Transition::to(state, answers),
        },
        SessionState::TopicIntro => Transition::to(SessionState::AwaitingSubAnswer, answers),
        SessionState::AwaitingSubAnswer => match SubAnswer::parse(input) {
            Some(sub) => {
                answers.sub_answer = Some(sub);
                Transition::to(SessionState::AwaitingFreeText, answers)
            }
            None => Transition::to(state, answers),
        },
        SessionState::AwaitingFreeText => {
            answers.free_text = input.to_string();
            Transition::to(SessionState::DestinyPause1, answers)
        }
        SessionState::DestinyPause1 => Transition::to(SessionState::DestinyPause2, answers),
        SessionState::DestinyPause2 => Transition::to(SessionState::DestinyPause3, answers)
            .with_effect(Effect::Hold(pacing.destiny_pause)),
        SessionState::DestinyPause3 => Transition::to(SessionState::RevealFortune, answers)
            .with_command(Command::FortuneReady),
        SessionState::RevealFortune => Transition::to(SessionState::Goodbye, answers)
            .with_effect(Effect::Print(shown.pre_text.clone()))
            .with_effect(Effect::Hold(pacing.reveal_hold)),
        SessionState::Goodbye => Transition::to(SessionState::Idle, SessionAnswers::default())
            .with_command(Command::SessionEnded),
    }
}

/// Menu digit → topic. Anything but a whole number 1-4 is None.
fn parse_category(input: &str) -> Option<Topic> {
    input
        .trim()
        .parse::<u32>()
        .ok()
        .and_then(Topic::from_menu_number)
}

// ============================================================================
// STATE MACHINE
// ============================================================================

/// Owns the session: current state, answers and the random source.
pub struct KioskStateMachine<'c> {
    corpus: &'c Corpus,
    state: SessionState,
    answers: SessionAnswers,
    pacing: Pacing,
    rng: StdRng,
}

impl<'c> KioskStateMachine<'c> {
    /// A machine in Idle. A seed makes text selection reproducible.
    pub fn new(corpus: &'c Corpus, pacing: Pacing, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        KioskStateMachine {
            corpus,
            state: SessionState::Idle,
            answers: SessionAnswers::default(),
            pacing,
            rng,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn answers(&self) -> &SessionAnswers {
        &self.answers
    }

    /// Show the current screen, wait for the answer, advance.
    pub fn step<K: KeySource, S: FrameSink>(
        &mut self,
        prompt: &mut FramedPrompt<K, S>,
    ) -> Result<Step, SessionError> {
        let request = compose(self.state, &self.answers, self.corpus, &mut self.rng)?;
        let input = prompt.prompt(&request)?;

        let from = self.state;
        let transition = update(
            from,
            self.answers.clone(),
            &input,
            &request,
            &self.pacing,
        );

        if transition.state == from {
            tracing::debug!(state = ?from, %input, "answer rejected, re-prompting");
        } else {
            tracing::debug!(from = ?from, to = ?transition.state, command = %transition.command, "transition");
        }
        if from == SessionState::RevealFortune {
            match serde_json::to_string(&transition.answers) {
                Ok(summary) => tracing::info!(%summary, "fortune revealed"),
                Err(e) => tracing::warn!(error = %e, "could not summarize session"),
            }
        }

        self.state = transition.state;
        self.answers = transition.answers;

        Ok(Step {
            state: transition.state,
            command: transition.command,
            effects: transition.effects,
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::prompt::{RecordingSink, ScriptedKeys};
    use std::time::Duration;

    /// One entry per required prefix, with recognizable text.
    fn full_corpus() -> Corpus {
        let mut tsv = String::from("key\tnote\ttext\n");
        for prefix in script::required_prefixes() {
            let text = if prefix.starts_with(script::FORTUNE_TEMPLATE_ROOT) {
                format!("{prefix}: [PLAYER_NAME], seek [lovefeature][pet]")
            } else {
                format!("text of {prefix}")
            };
            tsv.push_str(&format!("{prefix}1\t\t{text}\n"));
        }
        Corpus::parse(&tsv)
    }

    fn answers(name: &str, topic: Option<Topic>, sub: Option<SubAnswer>, free: &str) -> SessionAnswers {
        SessionAnswers {
            name: name.to_string(),
            category: topic,
            sub_answer: sub,
            free_text: free.to_string(),
        }
    }

    fn step_from(state: SessionState, input: &str) -> Transition {
        update(
            state,
            SessionAnswers::default(),
            input,
            &PromptRequest::free_text(""),
            &Pacing::default(),
        )
    }

    // --- update ---

    #[test]
    fn test_idle_starts_session_with_fresh_answers() {
        let stale = answers("Old", Some(Topic::Love), Some(SubAnswer::A), "x");
        let t = update(
            SessionState::Idle,
            stale,
            "k",
            &PromptRequest::free_text(""),
            &Pacing::default(),
        );
        assert_eq!(t.state, SessionState::AwaitingName);
        assert_eq!(t.command, Command::SessionStarted);
        assert_eq!(t.answers, SessionAnswers::default());
    }

    #[test]
    fn test_name_is_recorded() {
        let t = step_from(SessionState::AwaitingName, "Lee");
        assert_eq!(t.state, SessionState::AwaitingCategory);
        assert_eq!(t.answers.name, "Lee");
        assert_eq!(t.command, Command::Noop);
    }

    #[test]
    fn test_menu_digits_map_to_topics() {
        let expected = [
            ("1", Topic::Love),
            ("2", Topic::Fortune),
            ("3", Topic::Wisdom),
            ("4", Topic::Surprise),
        ];
        for (input, topic) in expected {
            let t = step_from(SessionState::AwaitingCategory, input);
            assert_eq!(t.state, SessionState::TopicIntro);
            assert_eq!(t.answers.category, Some(topic));
        }
    }

    #[test]
    fn test_invalid_category_reprompts_with_noop() {
        for input in ["0", "5", "x", "", "-1"] {
            let t = step_from(SessionState::AwaitingCategory, input);
            assert_eq!(t.state, SessionState::AwaitingCategory, "input {input:?}");
            assert_eq!(t.command, Command::Noop);
            assert_eq!(t.answers.category, None);
        }
    }

    #[test]
    fn test_sub_answer_is_case_insensitive() {
        assert_eq!(
            step_from(SessionState::AwaitingSubAnswer, "b").answers.sub_answer,
            Some(SubAnswer::B)
        );
        assert_eq!(
            step_from(SessionState::AwaitingSubAnswer, "A").answers.sub_answer,
            Some(SubAnswer::A)
        );
    }

    #[test]
    fn test_invalid_sub_answer_reprompts() {
        let t = step_from(SessionState::AwaitingSubAnswer, "c");
        assert_eq!(t.state, SessionState::AwaitingSubAnswer);
    }

    #[test]
    fn test_destiny_pause_holds_for_configured_time() {
        let pacing = Pacing {
            destiny_pause: Duration::from_millis(30),
            reveal_hold: Duration::from_millis(20),
        };
        let t = update(
            SessionState::DestinyPause2,
            SessionAnswers::default(),
            "",
            &PromptRequest::free_text(""),
            &pacing,
        );
        assert_eq!(t.state, SessionState::DestinyPause3);
        assert_eq!(t.effects, vec![Effect::Hold(Duration::from_millis(30))]);
    }

    #[test]
    fn test_fortune_ready_is_sent_entering_reveal() {
        let t = step_from(SessionState::DestinyPause3, "x");
        assert_eq!(t.state, SessionState::RevealFortune);
        assert_eq!(t.command, Command::FortuneReady);
    }

    #[test]
    fn test_reveal_prints_shown_fortune_then_holds() {
        let shown = PromptRequest::any_key("Lee, beware red shoes", 2);
        let t = update(
            SessionState::RevealFortune,
            SessionAnswers::default(),
            "k",
            &shown,
            &Pacing::default(),
        );
        assert_eq!(t.state, SessionState::Goodbye);
        assert_eq!(
            t.effects,
            vec![
                Effect::Print("Lee, beware red shoes".to_string()),
                Effect::Hold(Duration::from_secs(2)),
            ]
        );
    }

    #[test]
    fn test_goodbye_ends_session_and_clears_answers() {
        let t = update(
            SessionState::Goodbye,
            answers("Lee", Some(Topic::Wisdom), Some(SubAnswer::B), "tea"),
            "k",
            &PromptRequest::free_text(""),
            &Pacing::default(),
        );
        assert_eq!(t.state, SessionState::Idle);
        assert_eq!(t.command, Command::SessionEnded);
        assert_eq!(t.answers, SessionAnswers::default());
    }

    #[test]
    fn test_every_state_has_a_successor_on_valid_input() {
        let valid = |s: SessionState| match s {
            SessionState::AwaitingCategory => "1",
            SessionState::AwaitingSubAnswer => "a",
            _ => "x",
        };
        for state in SessionState::ALL {
            let t = step_from(state, valid(state));
            assert_ne!(t.state, state, "{state:?} did not advance");
        }
    }

    // --- compose ---

    #[test]
    fn test_screens_follow_the_dialogue_table() {
        let corpus = full_corpus();
        let mut rng = StdRng::seed_from_u64(7);
        let done = answers("Lee", Some(Topic::Love), Some(SubAnswer::A), "red shoes");

        let idle = compose(SessionState::Idle, &done, &corpus, &mut rng).unwrap();
        assert_eq!(idle, PromptRequest::any_key("text of cook_01", 1));

        let category = compose(SessionState::AwaitingCategory, &done, &corpus, &mut rng).unwrap();
        assert_eq!(category.pre_text, "text of cook_03\n");
        assert_eq!(category.post_text, "\ntext of sc_03");
        assert_eq!(category.max_chars, Some(1));

        let free = compose(SessionState::AwaitingFreeText, &done, &corpus, &mut rng).unwrap();
        assert_eq!(free.pre_text, "text of cook_06_love_A\ntext of sc_06_love_A");
        assert_eq!(free.max_chars, None);

        let pause1 = compose(SessionState::DestinyPause1, &done, &corpus, &mut rng).unwrap();
        assert_eq!(pause1.post_text, "text of sc_07");
        assert!(!pause1.show_caret);

        let pause2 = compose(SessionState::DestinyPause2, &done, &corpus, &mut rng).unwrap();
        assert!(pause2.ignore_input);
        assert_eq!(pause2.vertical_offset, 2);
    }

    #[test]
    fn test_surprise_topic_uses_corpus_spelling() {
        let corpus = full_corpus();
        let mut rng = StdRng::seed_from_u64(1);
        let a = answers("", Some(Topic::Surprise), None, "");
        let intro = compose(SessionState::TopicIntro, &a, &corpus, &mut rng).unwrap();
        assert_eq!(intro.pre_text, "text of cook_04_surprize");
    }

    #[test]
    fn test_fortune_is_filled_from_answers() {
        let corpus = full_corpus();
        let mut rng = StdRng::seed_from_u64(3);
        let a = answers("Lee", Some(Topic::Fortune), Some(SubAnswer::B), "red shoes");
        let reveal = compose(SessionState::RevealFortune, &a, &corpus, &mut rng).unwrap();
        assert_eq!(
            reveal.pre_text,
            "fortune_fortune_B_: Lee, seek red shoesred shoes"
        );
    }

    #[test]
    fn test_topic_screen_without_category_is_an_error() {
        let corpus = full_corpus();
        let mut rng = StdRng::seed_from_u64(3);
        let err = compose(
            SessionState::TopicIntro,
            &SessionAnswers::default(),
            &corpus,
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, SessionError::Incomplete { missing: "category", .. }));
    }

    #[test]
    fn test_missing_corpus_text_is_an_error() {
        let corpus = Corpus::parse("key\tnote\ttext\n");
        let mut rng = StdRng::seed_from_u64(3);
        let err = compose(SessionState::Idle, &SessionAnswers::default(), &corpus, &mut rng)
            .unwrap_err();
        assert!(matches!(err, SessionError::Corpus(_)));
    }

    // --- machine ---

    #[test]
    fn test_machine_runs_a_whole_session() {
        let corpus = full_corpus();
        let mut machine = KioskStateMachine::new(&corpus, Pacing::instant(), Some(42));
        // any, name, category, intro, A/B, free, pause1, (pause2 reads nothing), pause3, reveal, goodbye
        let keys = ScriptedKeys::new("kLee\r2ka\rred shoes\rkkkk");
        let mut prompt = FramedPrompt::new(keys, RecordingSink::default());

        let mut commands = Vec::new();
        let mut printed = Vec::new();
        loop {
            let step = machine.step(&mut prompt).unwrap();
            commands.push(step.command);
            for effect in step.effects {
                if let Effect::Print(text) = effect {
                    printed.push(text);
                }
            }
            if step.state == SessionState::Idle {
                break;
            }
        }

        let sent: Vec<Command> = commands
            .into_iter()
            .filter(|c| *c != Command::Noop)
            .collect();
        assert_eq!(
            sent,
            vec![
                Command::SessionStarted,
                Command::FortuneReady,
                Command::SessionEnded
            ]
        );
        assert_eq!(printed.len(), 1);
        assert!(printed[0].contains("Lee"));
        assert!(printed[0].contains("red shoes"));
        assert_eq!(machine.answers(), &SessionAnswers::default());
    }

    #[test]
    fn test_seeded_machines_show_the_same_screens() {
        let mut tsv = String::from("key\tnote\ttext\n");
        for i in 0..20 {
            tsv.push_str(&format!("cook_01_{i}\t\tgreeting {i}\n"));
        }
        let corpus = Corpus::parse(&tsv);

        let run = |seed| {
            let mut machine = KioskStateMachine::new(&corpus, Pacing::instant(), Some(seed));
            let mut prompt = FramedPrompt::new(ScriptedKeys::new("k"), RecordingSink::default());
            machine.step(&mut prompt).unwrap();
            prompt.sink().frames[0].clone()
        };
        assert_eq!(run(9), run(9));
    }
}
