use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::text::{count_term, is_question};
use crate::config::AnalysisConfig;
use crate::types::NormalizedMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Positive,
    Negative,
    Inquisitive,
    #[default]
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub tone: Tone,
    pub confidence: f32,
}

impl Default for Sentiment {
    fn default() -> Self {
        Self {
            tone: Tone::Neutral,
            confidence: 0.5,
        }
    }
}

/// Sum of `weight * occurrences` for every table term across the messages.
pub fn weighted_score(messages: &[NormalizedMessage], table: &BTreeMap<String, f32>) -> f32 {
    messages
        .iter()
        .map(|m| {
            let lower = m.text.to_lowercase();
            table
                .iter()
                .map(|(term, weight)| weight * count_term(&lower, term) as f32)
                .sum::<f32>()
        })
        .sum()
}

pub fn analyze_sentiment(
    messages: &[NormalizedMessage],
    positive: &BTreeMap<String, f32>,
    negative: &BTreeMap<String, f32>,
    config: &AnalysisConfig,
) -> Sentiment {
    if messages.is_empty() {
        return Sentiment::default();
    }

    let pos = weighted_score(messages, positive);
    let neg = weighted_score(messages, negative);
    let total = pos + neg;

    if pos > 0.0 && pos > neg * config.sentiment_ratio {
        return Sentiment {
            tone: Tone::Positive,
            confidence: (pos / total).min(0.95),
        };
    }
    if neg > 0.0 && neg > pos * config.sentiment_ratio {
        return Sentiment {
            tone: Tone::Negative,
            confidence: (neg / total).min(0.95),
        };
    }

    let questions = messages.iter().filter(|m| is_question(&m.text)).count();
    let question_share = questions as f32 / messages.len() as f32;
    if question_share > config.question_ratio {
        return Sentiment {
            tone: Tone::Inquisitive,
            confidence: question_share.clamp(0.5, 0.9),
        };
    }

    Sentiment::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KeywordWeights;

    fn msgs(texts: &[&str]) -> Vec<NormalizedMessage> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| NormalizedMessage::new(i, "Friend", *t, false, None))
            .collect()
    }

    fn run(texts: &[&str]) -> Sentiment {
        let weights = KeywordWeights::default();
        analyze_sentiment(&msgs(texts), &weights.positive, &weights.negative, &AnalysisConfig::default())
    }

    #[test]
    fn test_empty_is_neutral() {
        assert_eq!(run(&[]), Sentiment::default());
    }

    #[test]
    fn test_positive_dominance() {
        let s = run(&["that was awesome", "love it 😍", "ok"]);
        assert_eq!(s.tone, Tone::Positive);
        assert!(s.confidence > 0.5);
    }

    #[test]
    fn test_negative_dominance() {
        let s = run(&["this is terrible", "I'm so upset 😢"]);
        assert_eq!(s.tone, Tone::Negative);
    }

    #[test]
    fn test_balanced_questions_are_inquisitive() {
        let s = run(&["where is it?", "when do we leave?", "no idea", "the station"]);
        assert_eq!(s.tone, Tone::Inquisitive);
    }

    #[test]
    fn test_plain_chat_is_neutral() {
        let s = run(&["just working", "same here", "the bus is late"]);
        assert_eq!(s.tone, Tone::Neutral);
        assert_eq!(s.confidence, 0.5);
    }
}
