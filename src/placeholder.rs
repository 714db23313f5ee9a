//! Fortune template placeholders.
//!
//! Pure functions — no I/O, easily testable.
//!
//! Templates carry bracket-delimited tokens from a fixed table. Each token
//! is bound to one collected answer. Substitution is literal and
//! case-sensitive and applied token by token in table order, replacing
//! every occurrence. Brackets that are not in the table are copied through
//! verbatim.

use crate::types::SessionAnswers;

/// Longest bracketed run still considered a token when scanning templates.
const MAX_TOKEN_LEN: usize = 32;

/// A known template token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    LoveFeature,
    FortuneFeature,
    Pet,
    WisdomFeature,
    PlayerName,
}

/// Which collected answer fills a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    FreeText,
    Name,
}

impl Placeholder {
    /// Every token the engine knows how to fill.
    pub const ALL: [Placeholder; 5] = [
        Placeholder::LoveFeature,
        Placeholder::FortuneFeature,
        Placeholder::Pet,
        Placeholder::WisdomFeature,
        Placeholder::PlayerName,
    ];

    /// Literal token text, brackets included.
    pub fn token(self) -> &'static str {
        match self {
            Placeholder::LoveFeature => "[lovefeature]",
            Placeholder::FortuneFeature => "[fortunefeature]",
            Placeholder::Pet => "[pet]",
            Placeholder::WisdomFeature => "[wisdomfeature]",
            Placeholder::PlayerName => "[PLAYER_NAME]",
        }
    }

    pub fn binding(self) -> Binding {
        match self {
            Placeholder::PlayerName => Binding::Name,
            _ => Binding::FreeText,
        }
    }

    /// Exact, case-sensitive lookup.
    pub fn from_token(token: &str) -> Option<Placeholder> {
        Placeholder::ALL.into_iter().find(|p| p.token() == token)
    }

    fn value(self, answers: &SessionAnswers) -> &str {
        match self.binding() {
            Binding::FreeText => &answers.free_text,
            Binding::Name => &answers.name,
        }
    }
}

/// Fill every known token in `template` from `answers`.
///
/// Tokens are replaced one after another in table order, so a token that
/// arrives inside an answer is filled by a later replacement.
pub fn fill_template(template: &str, answers: &SessionAnswers) -> String {
    Placeholder::ALL
        .into_iter()
        .fold(template.to_string(), |text, placeholder| {
            text.replace(placeholder.token(), placeholder.value(answers))
        })
}

/// Bracketed tokens in `template` that are not in the placeholder table.
///
/// Used to catch authoring typos when the corpus is loaded.
pub fn unknown_tokens(template: &str) -> Vec<String> {
    bracketed_tokens(template)
        .filter(|token| Placeholder::from_token(token).is_none())
        .map(str::to_string)
        .collect()
}

/// Every `[...]` run with a short, single-line, non-empty body.
fn bracketed_tokens(template: &str) -> impl Iterator<Item = &str> {
    template.match_indices('[').filter_map(move |(open, _)| {
        let tail = &template[open + 1..];
        let close = tail.find(|c: char| c == ']' || c == '[' || c == '\n')?;
        let body = &tail[..close];
        let closes_here = tail[close..].starts_with(']');
        (closes_here && !body.is_empty() && body.len() <= MAX_TOKEN_LEN)
            .then(|| &template[open..open + close + 2])
    })
}

// ============================================================================
// TESTS
// ============================================================================
