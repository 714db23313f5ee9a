//! Corpus key scheme for the kiosk dialogue.
//!
//! The dialogue reads every line it shows from the corpus by key prefix.
//! These are the prefixes, as named constants and builders, plus the full
//! list a corpus has to satisfy before a session may start.

use crate::types::{SubAnswer, Topic};

/// Attract screen shown while idle.
pub const IDLE: &str = "cook_01";
/// Name question.
pub const NAME: &str = "cook_02";
/// Category menu.
pub const CATEGORY: &str = "cook_03";
/// Hint under the category menu.
pub const CATEGORY_HINT: &str = "sc_03";
/// First destiny screen and its hint.
pub const DESTINY_1: &str = "cook_07";
pub const DESTINY_1_HINT: &str = "sc_07";
/// Second destiny screen (input ignored, fixed pause).
pub const DESTINY_2: &str = "cook_08";
/// Third destiny screen.
pub const DESTINY_3: &str = "cook_09";
/// Farewell screen.
pub const GOODBYE: &str = "cook_10";

/// Prefix shared by all fortune templates.
pub const FORTUNE_TEMPLATE_ROOT: &str = "fortune_";

pub fn topic_intro(topic: Topic) -> String {
    format!("cook_04_{}", topic.corpus_slug())
}

pub fn sub_question(topic: Topic) -> String {
    format!("cook_05_{}", topic.corpus_slug())
}

pub fn sub_question_hint(topic: Topic) -> String {
    format!("sc_05_{}", topic.corpus_slug())
}

pub fn free_question(topic: Topic, sub: SubAnswer) -> String {
    format!("cook_06_{}_{}", topic.corpus_slug(), sub.letter())
}

pub fn free_question_hint(topic: Topic, sub: SubAnswer) -> String {
    format!("sc_06_{}_{}", topic.corpus_slug(), sub.letter())
}

/// Fortune templates for a topic and A/B answer.
///
/// The trailing underscore keeps `_A_` from matching `_AB...` style keys.
pub fn fortune_template(topic: Topic, sub: SubAnswer) -> String {
    format!("{FORTUNE_TEMPLATE_ROOT}{}_{}_", topic.corpus_slug(), sub.letter())
}

/// Every prefix the state machine may look up during a session.
pub fn required_prefixes() -> Vec<String> {
    let mut prefixes: Vec<String> = [IDLE, NAME, CATEGORY, CATEGORY_HINT]
        .into_iter()
        .map(str::to_string)
        .collect();

    for topic in Topic::ALL {
        prefixes.push(topic_intro(topic));
        prefixes.push(sub_question(topic));
        prefixes.push(sub_question_hint(topic));
        for sub in SubAnswer::ALL {
            prefixes.push(free_question(topic, sub));
            prefixes.push(free_question_hint(topic, sub));
            prefixes.push(fortune_template(topic, sub));
        }
    }

    prefixes.extend(
        [DESTINY_1, DESTINY_1_HINT, DESTINY_2, DESTINY_3, GOODBYE]
            .into_iter()
            .map(str::to_string),
    );
    prefixes
}

// ============================================================================
// TESTS
// ============================================================================
