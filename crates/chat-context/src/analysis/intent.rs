//! Rule-based intent classification over the tail of the conversation.
//!
//! Each message can raise several intents at once; every hit is weighted by
//! how recent the message is (the newest message counts fully, each step back
//! decays by 20%).

use serde::{Deserialize, Serialize};

use super::text::{contains_any, is_question, word_count};
use crate::types::NormalizedMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Question,
    Request,
    Planning,
    Greeting,
    Gratitude,
    Apology,
    Sharing,
    SupportSeeking,
    Agreement,
    Disagreement,
    Farewell,
    #[default]
    CasualChat,
}

const ALL_INTENTS: [IntentKind; 11] = [
    IntentKind::Question,
    IntentKind::Request,
    IntentKind::Planning,
    IntentKind::Greeting,
    IntentKind::Gratitude,
    IntentKind::Apology,
    IntentKind::Sharing,
    IntentKind::SupportSeeking,
    IntentKind::Agreement,
    IntentKind::Disagreement,
    IntentKind::Farewell,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intent {
    pub primary: IntentKind,
    pub secondary: Option<IntentKind>,
    pub confidence: f32,
}

impl Default for Intent {
    fn default() -> Self {
        Self {
            primary: IntentKind::CasualChat,
            secondary: None,
            confidence: 0.3,
        }
    }
}

const REQUEST_PATTERNS: &[&str] = &[
    "can you", "could you", "would you", "will you", "please", "pls", "plz", "need you to",
    "send me", "let me know", "remind me", "bring",
];
const PLANNING_PATTERNS: &[&str] = &[
    "let's", "lets", "tomorrow", "tonight", "later", "meet", "plan", "plans", "what time",
    "schedule", "free on", "are you free", "lunch", "dinner", "weekend", "how about", "pick you up",
];
const GREETING_PATTERNS: &[&str] = &[
    "hi", "hello", "hey", "heyy", "good morning", "good evening", "gm", "yo", "sup", "namaste",
    "hola",
];
const GRATITUDE_PATTERNS: &[&str] = &["thanks", "thank you", "thx", "ty", "appreciate", "shukriya", "grateful"];
const APOLOGY_PATTERNS: &[&str] = &["sorry", "apologies", "my bad", "forgive me", "my fault"];
const SHARING_PATTERNS: &[&str] = &[
    "guess what", "just got", "i got", "check this", "check out", "look at", "did you see",
    "news", "found this",
];
const SUPPORT_PATTERNS: &[&str] = &[
    "i feel", "i'm sad", "im sad", "stressed", "worried", "need to talk", "can't handle",
    "cant handle", "help me", "not okay", "having a hard time", "rough day",
];
const AGREEMENT_PATTERNS: &[&str] = &[
    "yes", "yeah", "yep", "yup", "sure", "ok", "okay", "sounds good", "agreed", "definitely",
    "absolutely", "deal", "haan", "theek",
];
const DISAGREEMENT_PATTERNS: &[&str] = &[
    "no", "nope", "nah", "don't think", "dont think", "disagree", "not really", "i doubt",
];
const FAREWELL_PATTERNS: &[&str] = &[
    "bye", "good night", "goodnight", "gn", "see you", "see ya", "ttyl", "talk later", "take care",
    "later!",
];

fn matches(kind: IntentKind, message: &NormalizedMessage, lower: &str) -> bool {
    match kind {
        IntentKind::Question => is_question(&message.text),
        IntentKind::Request => contains_any(lower, REQUEST_PATTERNS),
        IntentKind::Planning => contains_any(lower, PLANNING_PATTERNS),
        IntentKind::Greeting => word_count(lower) <= 6 && contains_any(lower, GREETING_PATTERNS),
        IntentKind::Gratitude => contains_any(lower, GRATITUDE_PATTERNS),
        IntentKind::Apology => contains_any(lower, APOLOGY_PATTERNS),
        IntentKind::Sharing => {
            contains_any(lower, SHARING_PATTERNS) || !message.media.is_empty() || message.is_forwarded
        }
        IntentKind::SupportSeeking => contains_any(lower, SUPPORT_PATTERNS),
        IntentKind::Agreement => word_count(lower) <= 8 && contains_any(lower, AGREEMENT_PATTERNS),
        IntentKind::Disagreement => contains_any(lower, DISAGREEMENT_PATTERNS),
        IntentKind::Farewell => contains_any(lower, FAREWELL_PATTERNS),
        IntentKind::CasualChat => false,
    }
}

pub fn analyze_intent(messages: &[NormalizedMessage], recent_focus: usize) -> Intent {
    let tail = &messages[messages.len().saturating_sub(recent_focus)..];
    let mut scores = [0.0f32; ALL_INTENTS.len()];

    for (age, message) in tail.iter().rev().enumerate() {
        let weight = 0.8f32.powi(age as i32);
        let lower = message.text.to_lowercase();
        for (slot, kind) in ALL_INTENTS.iter().enumerate() {
            if matches(*kind, message, &lower) {
                scores[slot] += weight;
            }
        }
    }

    let total: f32 = scores.iter().sum();
    if total <= 0.0 {
        return Intent::default();
    }

    // Stable ranking: equal scores keep declaration order
    let mut ranked: Vec<(IntentKind, f32)> = ALL_INTENTS
        .iter()
        .copied()
        .zip(scores)
        .filter(|(_, score)| *score > 0.0)
        .collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let (primary, primary_score) = ranked[0];
    Intent {
        primary,
        secondary: ranked.get(1).map(|(kind, _)| *kind),
        confidence: (primary_score / total).min(0.95),
    }
}
