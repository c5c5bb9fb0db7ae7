//! Shared text helpers for the keyword classifiers.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use super::lexicon::{QUESTION_STARTERS, STOPWORDS};

static EXCLAMATION_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!{2,}").expect("exclamation regex is valid"));

/// Count occurrences of `term` in `haystack` (both lowercase). Alphanumeric
/// term edges must sit on a word boundary, so "cool" does not match "school".
/// Emoji and punctuation edges match anywhere.
pub fn count_term(haystack: &str, term: &str) -> usize {
    let Some(first) = term.chars().next() else {
        return 0;
    };
    let last = term.chars().next_back().unwrap_or(first);

    let mut count = 0;
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(term) {
        let begin = start + pos;
        let end = begin + term.len();

        let before_ok = !first.is_alphanumeric()
            || haystack[..begin]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_alphanumeric());
        let after_ok = !last.is_alphanumeric()
            || haystack[end..]
                .chars()
                .next()
                .map_or(true, |c| !c.is_alphanumeric());

        if before_ok && after_ok {
            count += 1;
            start = end;
        } else {
            start = begin + first.len_utf8();
        }
    }
    count
}

pub fn contains_term(haystack: &str, term: &str) -> bool {
    count_term(haystack, term) > 0
}

pub fn contains_any(haystack: &str, terms: &[&str]) -> bool {
    terms.iter().any(|t| contains_term(haystack, t))
}

/// Lowercase word tokens; apostrophes stay inside words ("don't").
pub fn tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|t| t.trim_matches('\''))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Content words: longer than three characters, not a stopword, not a number.
pub fn significant_words(text: &str) -> BTreeSet<String> {
    tokens(text)
        .into_iter()
        .filter(|t| t.chars().count() > 3)
        .filter(|t| !t.chars().all(|c| c.is_ascii_digit()))
        .filter(|t| !STOPWORDS.contains(&t.as_str()))
        .collect()
}

/// A `?` anywhere, or a leading question word in a sentence that does not
/// close with `.` or `!`.
pub fn is_question(text: &str) -> bool {
    if text.contains('?') {
        return true;
    }
    let trimmed = text.trim_end();
    if trimmed.ends_with('.') || trimmed.ends_with('!') {
        return false;
    }
    tokens(text)
        .first()
        .is_some_and(|first| QUESTION_STARTERS.contains(&first.as_str()))
}

pub fn is_emoji(c: char) -> bool {
    matches!(c as u32,
        0x1F300..=0x1F3FA
        | 0x1F400..=0x1F64F
        | 0x1F680..=0x1F6FF
        | 0x1F900..=0x1FAFF
        | 0x1F1E6..=0x1F1FF
        | 0x2600..=0x27BF
        | 0x2B50 | 0x2B55 | 0x2B06 | 0x2B07 | 0x2934 | 0x2935
        | 0x203C | 0x2049 | 0x3030 | 0x303D)
}

pub fn emojis(text: &str) -> Vec<String> {
    text.chars().filter(|&c| is_emoji(c)).map(String::from).collect()
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Runs of two or more `!`.
pub fn exclamation_runs(text: &str) -> usize {
    EXCLAMATION_RUN_RE.find_iter(text).count()
}

/// Words of three or more letters written entirely in capitals.
pub fn shouted_words(text: &str) -> usize {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphabetic()))
        .filter(|w| w.chars().count() >= 3)
        .filter(|w| w.chars().all(|c| c.is_alphabetic() && c.is_uppercase()))
        .count()
}
