//! Surface-level conversation style: lengths, emoji, languages, pacing and
//! the writing habits a reply should mirror.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

use super::lexicon::{ABBREVIATIONS, FORMAL_MARKERS, HINGLISH_MARKERS, SPANISH_MARKERS};
use super::text::{contains_any, emojis, is_question, tokens, word_count};
use crate::config::AnalysisConfig;
use crate::types::NormalizedMessage;

static LAUGHTER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:a?(?:ha){2,}h?|(?:he){2,}|lo+l|lmao+|rofl)\b|😂|🤣")
        .expect("laughter regex is valid")
});

// ============================================================================
// Message length
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LengthStyle {
    #[default]
    Short,
    Medium,
    Long,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MessageLength {
    pub average_chars: f32,
    pub average_words: f32,
    pub shortest: usize,
    pub longest: usize,
    pub self_average_words: f32,
    pub other_average_words: f32,
    pub style: LengthStyle,
}

fn mean(values: impl Iterator<Item = usize>) -> f32 {
    let (sum, n) = values.fold((0usize, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum as f32 / n as f32
    }
}

pub fn analyze_length(messages: &[NormalizedMessage]) -> MessageLength {
    if messages.is_empty() {
        return MessageLength::default();
    }

    let chars = || messages.iter().map(|m| m.text.chars().count());
    let average_words = mean(messages.iter().map(|m| word_count(&m.text)));

    let style = if average_words <= 5.0 {
        LengthStyle::Short
    } else if average_words >= 20.0 {
        LengthStyle::Long
    } else {
        LengthStyle::Medium
    };

    MessageLength {
        average_chars: mean(chars()),
        average_words,
        shortest: chars().min().unwrap_or(0),
        longest: chars().max().unwrap_or(0),
        self_average_words: mean(messages.iter().filter(|m| m.is_outgoing).map(|m| word_count(&m.text))),
        other_average_words: mean(messages.iter().filter(|m| !m.is_outgoing).map(|m| word_count(&m.text))),
        style,
    }
}

// ============================================================================
// Emoji usage
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmojiFrequency {
    #[default]
    None,
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmojiUsage {
    pub total: usize,
    pub messages_with_emoji: usize,
    pub frequency: EmojiFrequency,
    pub top: Vec<String>,
}

pub fn analyze_emoji(messages: &[NormalizedMessage]) -> EmojiUsage {
    let per_message: Vec<Vec<String>> = messages.iter().map(|m| emojis(&m.text)).collect();
    let with_emoji = per_message.iter().filter(|e| !e.is_empty()).count();

    // (count, first seen) per emoji
    let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for (order, emoji) in per_message.iter().flatten().enumerate() {
        let entry = counts.entry(emoji.as_str()).or_insert((0, order));
        entry.0 += 1;
    }
    let mut ranked: Vec<(&str, usize, usize)> = counts.into_iter().map(|(e, (c, o))| (e, c, o)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    let share = if messages.is_empty() {
        0.0
    } else {
        with_emoji as f32 / messages.len() as f32
    };
    let frequency = match share {
        s if s <= 0.0 => EmojiFrequency::None,
        s if s < 0.2 => EmojiFrequency::Low,
        s if s < 0.5 => EmojiFrequency::Moderate,
        _ => EmojiFrequency::High,
    };

    EmojiUsage {
        total: per_message.iter().map(Vec::len).sum(),
        messages_with_emoji: with_emoji,
        frequency,
        top: ranked.into_iter().take(5).map(|(e, _, _)| e.to_string()).collect(),
    }
}

// ============================================================================
// Language mix
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageMix {
    pub primary: String,
    pub languages: Vec<String>,
    pub scripts: Vec<String>,
    pub is_mixed: bool,
    /// Share of classified messages written in romanized Hindi
    pub hinglish_ratio: f32,
}

impl Default for LanguageMix {
    fn default() -> Self {
        Self {
            primary: "unknown".to_string(),
            languages: Vec::new(),
            scripts: Vec::new(),
            is_mixed: false,
            hinglish_ratio: 0.0,
        }
    }
}

/// Script name and the language it implies when a message is written in it.
fn script_of(c: char) -> Option<(&'static str, &'static str)> {
    let script = match c as u32 {
        0x0041..=0x005A | 0x0061..=0x007A | 0x00C0..=0x024F => ("latin", "english"),
        0x0370..=0x03FF => ("greek", "greek"),
        0x0400..=0x04FF => ("cyrillic", "russian"),
        0x0590..=0x05FF => ("hebrew", "hebrew"),
        0x0600..=0x06FF | 0x0750..=0x077F => ("arabic", "arabic"),
        0x0900..=0x097F => ("devanagari", "hindi"),
        0x0980..=0x09FF => ("bengali", "bengali"),
        0x0A00..=0x0A7F => ("gurmukhi", "punjabi"),
        0x0A80..=0x0AFF => ("gujarati", "gujarati"),
        0x0B80..=0x0BFF => ("tamil", "tamil"),
        0x0C00..=0x0C7F => ("telugu", "telugu"),
        0x0E00..=0x0E7F => ("thai", "thai"),
        0x3040..=0x30FF => ("kana", "japanese"),
        0x4E00..=0x9FFF => ("han", "chinese"),
        0xAC00..=0xD7AF => ("hangul", "korean"),
        _ => return None,
    };
    Some(script)
}

/// Latin-script text is refined by marker vocabulary.
fn latin_language(text: &str) -> &'static str {
    let words = tokens(text);
    if words.is_empty() {
        return "english";
    }
    let share = |markers: &[&str]| {
        let hits = words.iter().filter(|w| markers.contains(&w.as_str())).count();
        (hits, hits as f32 / words.len() as f32)
    };

    let (hindi_hits, hindi_share) = share(HINGLISH_MARKERS);
    if hindi_hits >= 2 || (hindi_hits == 1 && hindi_share >= 0.34) {
        return "hinglish";
    }
    let (spanish_hits, spanish_share) = share(SPANISH_MARKERS);
    if spanish_hits >= 2 || (spanish_hits == 1 && spanish_share >= 0.5) {
        return "spanish";
    }
    "english"
}

struct MessageLanguage {
    language: &'static str,
    scripts: Vec<&'static str>,
}

fn classify_message(text: &str) -> Option<MessageLanguage> {
    let mut script_counts: Vec<(&'static str, &'static str, usize)> = Vec::new();
    for (script, language) in text.chars().filter_map(script_of) {
        match script_counts.iter_mut().find(|(s, _, _)| *s == script) {
            Some(entry) => entry.2 += 1,
            None => script_counts.push((script, language, 1)),
        }
    }

    let (dominant, language, _) = *script_counts.iter().max_by_key(|(_, _, n)| *n)?;
    let language = if dominant == "latin" { latin_language(text) } else { language };
    Some(MessageLanguage {
        language,
        scripts: script_counts.iter().map(|(s, _, _)| *s).collect(),
    })
}

pub fn analyze_language(messages: &[NormalizedMessage]) -> LanguageMix {
    let classified: Vec<MessageLanguage> = messages.iter().filter_map(|m| classify_message(&m.text)).collect();
    if classified.is_empty() {
        return LanguageMix::default();
    }

    let rank = |items: Vec<&'static str>| -> Vec<String> {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for item in items {
            match counts.iter_mut().find(|(s, _)| *s == item) {
                Some(entry) => entry.1 += 1,
                None => counts.push((item, 1)),
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts.into_iter().map(|(s, _)| s.to_string()).collect()
    };

    let languages = rank(classified.iter().map(|m| m.language).collect());
    let scripts = rank(classified.iter().flat_map(|m| m.scripts.iter().copied()).collect());
    let hinglish = classified.iter().filter(|m| m.language == "hinglish").count();
    let mixed_script_message = classified.iter().any(|m| m.scripts.len() > 1);

    LanguageMix {
        primary: languages[0].clone(),
        is_mixed: languages.len() > 1 || mixed_script_message,
        languages,
        scripts,
        hinglish_ratio: hinglish as f32 / classified.len() as f32,
    }
}

// ============================================================================
// Pacing
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Pace {
    Rapid,
    Steady,
    Slow,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Pacing {
    pub pace: Pace,
    pub average_gap_seconds: Option<f64>,
    pub last_gap_seconds: Option<f64>,
}

pub fn analyze_pacing(messages: &[NormalizedMessage], config: &AnalysisConfig) -> Pacing {
    let gap = |pair: &[NormalizedMessage]| -> Option<f64> {
        let (a, b) = (pair[0].timestamp?, pair[1].timestamp?);
        let secs = (b - a).num_seconds();
        (secs > 0).then_some(secs as f64)
    };

    let gaps: Vec<f64> = messages.windows(2).filter_map(gap).collect();
    if gaps.is_empty() {
        return Pacing::default();
    }

    let average = gaps.iter().sum::<f64>() / gaps.len() as f64;
    let pace = if average <= config.rapid_pace_secs {
        Pace::Rapid
    } else if average >= config.slow_pace_secs {
        Pace::Slow
    } else {
        Pace::Steady
    };

    Pacing {
        pace,
        average_gap_seconds: Some(average),
        last_gap_seconds: messages.windows(2).last().and_then(gap),
    }
}

// ============================================================================
// Style markers
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StyleBasis {
    OwnMessages,
    AllMessages,
    #[default]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Formality {
    Casual,
    #[default]
    Neutral,
    Formal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StyleMarkers {
    pub basis: StyleBasis,
    pub lowercase_only: bool,
    pub uses_punctuation: bool,
    pub uses_abbreviations: bool,
    pub uses_emoji: bool,
    pub uses_laughter: bool,
    pub exclamation_rate: f32,
    pub question_rate: f32,
    pub formality: Formality,
}

pub fn analyze_style(messages: &[NormalizedMessage]) -> StyleMarkers {
    let own: Vec<&NormalizedMessage> = messages.iter().filter(|m| m.is_outgoing).collect();
    let (basis, sample): (StyleBasis, Vec<&NormalizedMessage>) = if !own.is_empty() {
        (StyleBasis::OwnMessages, own)
    } else if !messages.is_empty() {
        (StyleBasis::AllMessages, messages.iter().collect())
    } else {
        return StyleMarkers::default();
    };

    let n = sample.len() as f32;
    let lettered: Vec<&str> = sample
        .iter()
        .map(|m| m.text.as_str())
        .filter(|t| t.chars().any(char::is_alphabetic))
        .collect();
    let lowercase_only = !lettered.is_empty() && lettered.iter().all(|t| !t.chars().any(char::is_uppercase));

    let punctuated = sample
        .iter()
        .filter(|m| m.text.trim_end().ends_with(|c: char| matches!(c, '.' | '!' | '?')))
        .count();
    let uses_abbreviations = sample
        .iter()
        .any(|m| tokens(&m.text).iter().any(|t| ABBREVIATIONS.contains(&t.as_str())));
    let uses_emoji = sample.iter().any(|m| !emojis(&m.text).is_empty());
    let uses_laughter = sample.iter().any(|m| LAUGHTER_RE.is_match(&m.text));
    let formal_hits = sample
        .iter()
        .filter(|m| contains_any(&m.text.to_lowercase(), FORMAL_MARKERS))
        .count();

    let informal_signals = [lowercase_only, uses_abbreviations, uses_emoji, uses_laughter]
        .iter()
        .filter(|s| **s)
        .count();
    let formality = if informal_signals >= 2 {
        Formality::Casual
    } else if formal_hits >= 1 && informal_signals == 0 {
        Formality::Formal
    } else {
        Formality::Neutral
    };

    StyleMarkers {
        basis,
        lowercase_only,
        uses_punctuation: punctuated as f32 / n >= 0.5,
        uses_abbreviations,
        uses_emoji,
        uses_laughter,
        exclamation_rate: sample.iter().filter(|m| m.text.contains('!')).count() as f32 / n,
        question_rate: sample.iter().filter(|m| is_question(&m.text)).count() as f32 / n,
        formality,
    }
}
