//! Corpus audit and report formatting.
//!
//! `audit_corpus` checks a loaded corpus against the dialogue's key scheme
//! and the placeholder table. `format_report` is pure:
//! (CorpusReport, OutputFormat) → String.

use serde::Serialize;

use crate::corpus::{Corpus, CorpusError};
use crate::placeholder::unknown_tokens;
use crate::script::{required_prefixes, FORTUNE_TEMPLATE_ROOT};
use crate::types::OutputFormat;

/// How many entries a required prefix selects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrefixCoverage {
    pub prefix: String,
    pub entries: usize,
}

/// A template token outside the placeholder table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnknownToken {
    pub key: String,
    pub token: String,
}

/// Results of auditing a corpus.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CorpusReport {
    /// Total records loaded.
    pub entries: usize,
    /// Coverage of every required prefix, in dialogue order.
    pub coverage: Vec<PrefixCoverage>,
    /// Required prefixes that select nothing.
    pub missing_prefixes: Vec<String>,
    /// Unknown tokens found in fortune templates.
    pub unknown_tokens: Vec<UnknownToken>,
}

impl CorpusReport {
    /// True when a session can run on this corpus without a content defect.
    pub fn is_clean(&self) -> bool {
        self.missing_prefixes.is_empty() && self.unknown_tokens.is_empty()
    }

    /// Turn the first defect into an error.
    pub fn ensure_clean(&self) -> Result<(), CorpusError> {
        if let Some(prefix) = self.missing_prefixes.first() {
            return Err(CorpusError::EmptySelection {
                prefix: prefix.clone(),
            });
        }
        if let Some(unknown) = self.unknown_tokens.first() {
            return Err(CorpusError::UnknownPlaceholder {
                key: unknown.key.clone(),
                token: unknown.token.clone(),
            });
        }
        Ok(())
    }
}

/// Check required prefixes and template tokens.
pub fn audit_corpus(corpus: &Corpus) -> CorpusReport {
    let coverage: Vec<PrefixCoverage> = required_prefixes()
        .into_iter()
        .map(|prefix| {
            let entries = corpus.entries_with_prefix(&prefix).count();
            PrefixCoverage { prefix, entries }
        })
        .collect();

    let missing_prefixes = coverage
        .iter()
        .filter(|c| c.entries == 0)
        .map(|c| c.prefix.clone())
        .collect();

    let unknown_tokens = corpus
        .entries_with_prefix(FORTUNE_TEMPLATE_ROOT)
        .flat_map(|(key, text)| {
            unknown_tokens(text).into_iter().map(move |token| UnknownToken {
                key: key.to_string(),
                token,
            })
        })
        .collect();

    CorpusReport {
        entries: corpus.len(),
        coverage,
        missing_prefixes,
        unknown_tokens,
    }
}

/// Format a corpus report for output.
pub fn format_report(report: &CorpusReport, format: OutputFormat) -> String {
    match format {
        OutputFormat::Human => format_human(report),
        OutputFormat::Json => format_json(report),
    }
}

// ============================================================================
// HUMAN FORMAT
// ============================================================================

fn format_human(report: &CorpusReport) -> String {
    let mut out = String::new();

    if !report.missing_prefixes.is_empty() {
        out.push_str("=== Missing Prefixes (no entries) ===\n");
        for prefix in &report.missing_prefixes {
            out.push_str(&format!("  {}\n", prefix));
        }
        out.push('\n');
    }

    if !report.unknown_tokens.is_empty() {
        out.push_str("=== Unknown Placeholders ===\n");
        for unknown in &report.unknown_tokens {
            out.push_str(&format!("  {} uses {}\n", unknown.key, unknown.token));
        }
        out.push('\n');
    }

    out.push_str("=== Coverage ===\n");
    for c in &report.coverage {
        out.push_str(&format!("  {:<24} {}\n", c.prefix, c.entries));
    }
    out.push('\n');

    out.push_str(&format_summary(report));
    out
}

fn format_summary(report: &CorpusReport) -> String {
    let mut out = String::new();
    out.push_str("=== Summary ===\n");
    out.push_str(&format!("Entries:           {}\n", report.entries));
    out.push_str(&format!("Required prefixes: {}\n", report.coverage.len()));
    out.push_str(&format!("Missing prefixes:  {}\n", report.missing_prefixes.len()));
    out.push_str(&format!("Unknown tokens:    {}\n", report.unknown_tokens.len()));
    out.push_str(if report.is_clean() {
        "Status:            ready\n"
    } else {
        "Status:            NOT READY\n"
    });
    out
}

// ============================================================================
// JSON FORMAT
// ============================================================================

fn format_json(report: &CorpusReport) -> String {
    serde_json::to_string_pretty(report)
        .unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_corpus() -> Corpus {
        let mut source = String::from("key\tnote\ttext\n");
        for prefix in required_prefixes() {
            let text = if prefix.starts_with(FORTUNE_TEMPLATE_ROOT) {
                "[PLAYER_NAME], seek [pet]"
            } else {
                "line"
            };
            source.push_str(&format!("{prefix}1\t\t{text}\n"));
        }
        Corpus::parse(&source)
    }

    #[test]
    fn test_complete_corpus_is_clean() {
        let report = audit_corpus(&complete_corpus());
        assert!(report.is_clean());
        assert!(report.ensure_clean().is_ok());
        assert_eq!(report.coverage.len(), required_prefixes().len());
    }

    #[test]
    fn test_empty_corpus_misses_everything() {
        let report = audit_corpus(&Corpus::default());
        assert_eq!(report.missing_prefixes.len(), required_prefixes().len());
        assert!(matches!(
            report.ensure_clean(),
            Err(CorpusError::EmptySelection { ref prefix }) if prefix == "cook_01"
        ));
    }

    #[test]
    fn test_template_typo_is_reported() {
        let mut source = String::from("key\tnote\ttext\n");
        source.push_str("fortune_love_A_1\t\tDear [PLAYER_NAM]\n");
        let report = audit_corpus(&Corpus::parse(&source));
        assert_eq!(
            report.unknown_tokens,
            vec![UnknownToken {
                key: "fortune_love_A_1".into(),
                token: "[PLAYER_NAM]".into(),
            }]
        );
    }

    #[test]
    fn test_human_report_flags_missing_prefix() {
        let report = audit_corpus(&Corpus::default());
        let out = format_report(&report, OutputFormat::Human);
        assert!(out.contains("Missing Prefixes"));
        assert!(out.contains("NOT READY"));
    }

    #[test]
    fn test_human_report_for_clean_corpus_says_ready() {
        let report = audit_corpus(&complete_corpus());
        let out = format_report(&report, OutputFormat::Human);
        assert!(!out.contains("Missing Prefixes"));
        assert!(out.contains("Status:            ready"));
    }

    #[test]
    fn test_json_report_is_valid() {
        let report = audit_corpus(&complete_corpus());
        let out = format_report(&report, OutputFormat::Json);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["missing_prefixes"], serde_json::json!([]));
        assert!(value["entries"].as_u64().unwrap() > 0);
    }
}
