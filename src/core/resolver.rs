//! Patient / user identifier recovery heuristics
//!
//! Some analyzers label the user ID properly, others bury it behind zero
//! padding or control bytes, and a few omit the label entirely. This module
//! recovers an ID from packet text through an ordered chain of independent
//! strategies; the first acceptable non-empty result wins.
//!
//! Strategy order:
//! 1. `explicit-label`: "User ID" / "UserID" / "ID" followed by a token
//! 2. `zero-run-prefix`: token right after a zero run or control characters
//! 3. `longest-header-word`: longest plausible word in the header zone
//! 4. `first-short-run`: first short alphanumeric run in the header zone

use regex::Regex;
use std::sync::LazyLock;

/// How far into the packet text the header-zone strategies look
const HEADER_ZONE: usize = 800;

/// Measurement and label names that can never be a patient ID
const DENYLIST: &[&str] = &[
    "WBC", "RBC", "HGB", "HCT", "MCV", "MCH", "MCHC", "RDW", "PLT", "MPV", "PCT", "PDW", "CRP",
    "RESULT", "NO", "DATE", "SID", "PID",
];

static RE_EXPLICIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:User\s*ID|UserID|ID)[:.\s]*([A-Za-z][A-Za-z0-9_-]{1,20})").unwrap()
});
static RE_ZERO_RUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:0{2,}|[\x00-\x1f\x7f]+)([A-Za-z][A-Za-z0-9_-]{1,20})").unwrap()
});
static RE_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Za-z0-9][A-Za-z0-9_-]{1,20}").unwrap());
static RE_SHORT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Za-z0-9_-]{2,15})\b").unwrap());

type Strategy = fn(&str) -> Option<String>;

/// The resolution chain in priority order; each entry is independently
/// testable.
static STRATEGIES: &[(&str, Strategy)] = &[
    ("explicit-label", explicit_label),
    ("zero-run-prefix", zero_run_prefix),
    ("longest-header-word", longest_header_word),
    ("first-short-run", first_short_run),
];

/// Resolve a user/patient ID from packet text, or `None` if every strategy
/// comes up empty
pub fn resolve_id(text: &str) -> Option<String> {
    for (name, strategy) in STRATEGIES {
        if let Some(id) = strategy(text) {
            tracing::trace!("ID resolved via {}: {}", name, id);
            return Some(id);
        }
    }
    None
}

fn is_all_zeros(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b == b'0')
}

fn header_zone(text: &str) -> &str {
    match text.char_indices().nth(HEADER_ZONE) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Strategy A: explicit "User ID"/"UserID"/"ID" label, all-zero values
/// rejected
fn explicit_label(text: &str) -> Option<String> {
    let candidate = RE_EXPLICIT.captures(text)?.get(1)?.as_str();
    if is_all_zeros(candidate) {
        return None;
    }
    Some(candidate.to_string())
}

/// Strategy B: token immediately following a run of zeros or control
/// characters
fn zero_run_prefix(text: &str) -> Option<String> {
    RE_ZERO_RUN
        .captures(text)?
        .get(1)
        .map(|m| m.as_str().to_string())
}

/// Strategy C: longest word in the header zone that is neither a known
/// measurement label nor purely numeric; ties go to the first occurrence
fn longest_header_word(text: &str) -> Option<String> {
    let zone = header_zone(text);
    let mut best: Option<&str> = None;
    for m in RE_WORD.find_iter(zone) {
        let word = m.as_str();
        if DENYLIST.iter().any(|d| d.eq_ignore_ascii_case(word)) {
            continue;
        }
        if word.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        if best.map_or(true, |b| word.len() > b.len()) {
            best = Some(word);
        }
    }
    best.map(str::to_string)
}

/// Strategy D: first short alphanumeric run anywhere in the header zone
fn first_short_run(text: &str) -> Option<String> {
    RE_SHORT_RUN
        .captures(header_zone(text))?
        .get(1)
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_label() {
        assert_eq!(
            explicit_label("User ID: PATIENT42\n! 6.23"),
            Some("PATIENT42".to_string())
        );
        assert_eq!(explicit_label("ID. J-DOE_1"), Some("J-DOE_1".to_string()));
        assert_eq!(explicit_label("no label here 123"), None);
    }

    #[test]
    fn test_explicit_label_rejects_digits_first() {
        // Token must lead with a letter for the explicit strategy
        assert_eq!(explicit_label("ID: 1234567"), None);
    }

    #[test]
    fn test_zero_run_prefix() {
        assert_eq!(
            zero_run_prefix("junk 000ABC123 junk"),
            Some("ABC123".to_string())
        );
        assert_eq!(
            zero_run_prefix("\x01\x02XYZ99"),
            Some("XYZ99".to_string())
        );
        assert_eq!(zero_run_prefix("0A"), None);
    }

    #[test]
    fn test_longest_header_word_skips_denylist() {
        let text = "WBC RBC SAMPLE_LONG_NAME HGB";
        assert_eq!(
            longest_header_word(text),
            Some("SAMPLE_LONG_NAME".to_string())
        );
    }

    #[test]
    fn test_longest_header_word_skips_numeric() {
        assert_eq!(
            longest_header_word("123456789012 AB7"),
            Some("AB7".to_string())
        );
    }

    #[test]
    fn test_longest_header_word_tie_first_wins() {
        assert_eq!(longest_header_word("AAA BBB"), Some("AAA".to_string()));
    }

    #[test]
    fn test_first_short_run() {
        assert_eq!(first_short_run("?? 42x rest"), Some("42x".to_string()));
        assert_eq!(first_short_run("- . ,"), None);
    }

    #[test]
    fn test_chain_priority() {
        // Explicit label beats everything else present in the text
        let text = "000ZZZ999 User ID: REAL_ONE LONGEST_WORD_HERE";
        assert_eq!(resolve_id(text), Some("REAL_ONE".to_string()));

        // Without a label, the zero-run strategy takes over
        let text = "measurement 000ABC123 LONGEST_WORD_HERE";
        assert_eq!(resolve_id(text), Some("ABC123".to_string()));
    }

    #[test]
    fn test_no_candidates() {
        assert_eq!(resolve_id(""), None);
        assert_eq!(resolve_id(". , ;"), None);
    }
}
