//! Keyed text corpus for the kiosk dialogue.
//!
//! Built once from a tab-separated script file and never mutated.
//! Lookups select texts by key prefix; the literal two-character
//! sequence `\n` is turned into a line break only when text is retrieved.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

/// Column holding the record key.
const KEY_COLUMN: usize = 0;

/// Column holding the display text. Column 1 is present but unused.
const TEXT_COLUMN: usize = 2;

/// Rows are padded to at least this many fields.
const MIN_FIELDS: usize = 3;

/// Errors raised while loading or querying the corpus.
///
/// All of these are content defects: fatal at startup, never retried.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("could not read corpus {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no corpus entry has a key starting with '{prefix}'")]
    EmptySelection { prefix: String },

    #[error("template '{key}' uses unknown placeholder {token}")]
    UnknownPlaceholder { key: String, token: String },
}

/// Immutable key → text mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    texts: BTreeMap<String, String>,
}

impl Corpus {
    /// Parse tab-separated source. The first line is a header and is skipped.
    ///
    /// Blank lines are ignored; a repeated key keeps the last row.
    pub fn parse(source: &str) -> Self {
        let texts = source
            .lines()
            .skip(1)
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(split_row)
            .map(|mut fields| {
                let text = std::mem::take(&mut fields[TEXT_COLUMN]);
                let key = std::mem::take(&mut fields[KEY_COLUMN]);
                (key, text)
            })
            .collect();

        Corpus { texts }
    }

    /// Read and parse a script file.
    pub fn load(path: &Path) -> Result<Self, CorpusError> {
        let source = fs::read_to_string(path).map_err(|source| CorpusError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let corpus = Corpus::parse(&source);
        tracing::info!(path = %path.display(), entries = corpus.len(), "corpus loaded");
        Ok(corpus)
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    /// Raw stored text for an exact key (escapes not decoded).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.texts.get(key).map(String::as_str)
    }

    /// All (key, raw text) entries whose key starts with `prefix`.
    pub fn entries_with_prefix<'a, 'p>(
        &'a self,
        prefix: &'p str,
    ) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.texts
            .range(prefix.to_string()..)
            .take_while(move |(key, _)| key.starts_with(prefix))
            .map(|(key, text)| (key.as_str(), text.as_str()))
    }

    /// Raw texts whose key starts with `prefix`. Order carries no meaning.
    pub fn texts_with_prefix(&self, prefix: &str) -> Vec<&str> {
        self.entries_with_prefix(prefix).map(|(_, text)| text).collect()
    }

    /// Pick one text under `prefix` uniformly at random and decode escapes.
    pub fn random_text_with_prefix<R: Rng + ?Sized>(
        &self,
        prefix: &str,
        rng: &mut R,
    ) -> Result<String, CorpusError> {
        self.texts_with_prefix(prefix)
            .choose(rng)
            .map(|text| decode_escapes(text))
            .ok_or_else(|| CorpusError::EmptySelection {
                prefix: prefix.to_string(),
            })
    }
}

/// Turn the literal two-character `\n` sequence into a real line break.
pub fn decode_escapes(text: &str) -> String {
    text.replace("\\n", "\n")
}

/// Split a trimmed line on tabs and pad it to [`MIN_FIELDS`].
fn split_row(line: &str) -> Vec<String> {
    let mut fields: Vec<String> = line.split('\t').map(str::to_string).collect();
    if fields.len() < MIN_FIELDS {
        fields.resize(MIN_FIELDS, String::new());
    }
    fields
}

// ============================================================================
// TESTS
// ============================================================================
