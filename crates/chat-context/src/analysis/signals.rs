use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::lexicon::TOPIC_KEYWORDS;
use super::recency_weight;
use super::sentiment::weighted_score;
use super::text::{count_term, exclamation_runs, is_question, shouted_words};
use crate::types::NormalizedMessage;

// ============================================================================
// Unanswered question
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct UnansweredQuestion {
    pub has_question: bool,
    pub question: Option<String>,
    pub asked_by: Option<String>,
}

/// The most recent question, if no other speaker has written since. Once
/// the newest question has a reply every earlier question has one too, so
/// the scan stops at the first question it meets.
pub fn find_unanswered_question(messages: &[NormalizedMessage]) -> UnansweredQuestion {
    let Some(pos) = messages.iter().rposition(|m| is_question(&m.text)) else {
        return UnansweredQuestion::default();
    };

    let asked = &messages[pos];
    let answered = messages[pos + 1..].iter().any(|m| m.speaker != asked.speaker);
    if answered {
        return UnansweredQuestion::default();
    }

    UnansweredQuestion {
        has_question: true,
        question: Some(asked.text.clone()),
        asked_by: Some(asked.speaker.clone()),
    }
}

// ============================================================================
// Conversation flow
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FlowType {
    #[default]
    Empty,
    SingleMessage,
    Monologue,
    BackAndForth,
    OneSided,
    Mixed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationFlow {
    #[serde(rename = "type")]
    pub flow_type: FlowType,
    pub description: String,
}

impl Default for ConversationFlow {
    fn default() -> Self {
        Self {
            flow_type: FlowType::Empty,
            description: "No messages yet".to_string(),
        }
    }
}

pub fn analyze_flow(messages: &[NormalizedMessage]) -> ConversationFlow {
    let (flow_type, description) = match messages {
        [] => return ConversationFlow::default(),
        [only] => (FlowType::SingleMessage, format!("A single message from {}", only.speaker)),
        _ => {
            let counts = messages.iter().fold(HashMap::<&str, usize>::new(), |mut acc, m| {
                *acc.entry(m.speaker.as_str()).or_default() += 1;
                acc
            });

            // Dominant speaker; ties go to whoever spoke last
            let last_speaker = messages[messages.len() - 1].speaker.as_str();
            let (dominant, top) = counts
                .iter()
                .map(|(s, c)| (*s, *c))
                .max_by_key(|(s, c)| (*c, *s == last_speaker))
                .unwrap_or((last_speaker, 0));

            let alternations = messages.windows(2).filter(|w| w[0].speaker != w[1].speaker).count();
            let alternation_ratio = alternations as f32 / (messages.len() - 1) as f32;
            let share = top as f32 / messages.len() as f32;

            if counts.len() == 1 {
                (FlowType::Monologue, format!("Only {} has been talking", dominant))
            } else if alternation_ratio >= 0.5 {
                (
                    FlowType::BackAndForth,
                    format!("Active back-and-forth between {} participants", counts.len()),
                )
            } else if share >= 0.75 {
                (FlowType::OneSided, format!("{} is doing most of the talking", dominant))
            } else {
                (
                    FlowType::Mixed,
                    "Mixed exchange with runs of consecutive messages".to_string(),
                )
            }
        }
    };

    ConversationFlow { flow_type, description }
}

// ============================================================================
// Urgency
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Urgency {
    pub level: UrgencyLevel,
    pub score: f32,
}

pub fn analyze_urgency(
    messages: &[NormalizedMessage],
    terms: &BTreeMap<String, f32>,
    recent_focus: usize,
) -> Urgency {
    let score: f32 = messages
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let keywords = weighted_score(std::slice::from_ref(m), terms);
            let exclaims = exclamation_runs(&m.text) as f32;
            let shouting = if shouted_words(&m.text) >= 2 { 1.0 } else { 0.0 };
            recency_weight(i, messages.len(), recent_focus) * (keywords + exclaims + shouting)
        })
        .sum();

    let level = if score >= 5.0 {
        UrgencyLevel::High
    } else if score >= 2.0 {
        UrgencyLevel::Medium
    } else {
        UrgencyLevel::Low
    };

    Urgency {
        level,
        score: (score * 100.0).round() / 100.0,
    }
}

// ============================================================================
// Coarse topics
// ============================================================================

const MAX_TOPICS: usize = 5;

/// Topic labels ordered by keyword hits; equal counts keep table order.
pub fn detect_topics(messages: &[NormalizedMessage]) -> Vec<String> {
    let lowered: Vec<String> = messages.iter().map(|m| m.text.to_lowercase()).collect();

    let mut hits: Vec<(&str, usize)> = TOPIC_KEYWORDS
        .iter()
        .map(|(label, keywords)| {
            let count = lowered
                .iter()
                .map(|text| keywords.iter().map(|k| count_term(text, k)).sum::<usize>())
                .sum();
            (*label, count)
        })
        .filter(|(_, count)| *count > 0)
        .collect();

    hits.sort_by(|a, b| b.1.cmp(&a.1));
    hits.into_iter()
        .take(MAX_TOPICS)
        .map(|(label, _)| label.to_string())
        .collect()
}
