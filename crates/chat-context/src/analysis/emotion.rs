use serde::{Deserialize, Serialize};

use super::lexicon::EMOTION_LEXICON;
use super::recency_weight;
use super::text::{count_term, exclamation_runs, shouted_words};
use crate::types::NormalizedMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmotionKind {
    #[default]
    Neutral,
    Happy,
    Excited,
    Sad,
    Angry,
    Anxious,
    Frustrated,
    Affectionate,
}

impl EmotionKind {
    fn from_label(label: &str) -> Self {
        match label {
            "happy" => Self::Happy,
            "excited" => Self::Excited,
            "sad" => Self::Sad,
            "angry" => Self::Angry,
            "anxious" => Self::Anxious,
            "frustrated" => Self::Frustrated,
            "affectionate" => Self::Affectionate,
            _ => Self::Neutral,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Intensity {
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct EmotionalState {
    pub state: EmotionKind,
    pub intensity: Intensity,
    pub indicators: Vec<String>,
}

const MAX_INDICATORS: usize = 6;

pub fn analyze_emotion(messages: &[NormalizedMessage], recent_focus: usize) -> EmotionalState {
    let mut scores = vec![0.0f32; EMOTION_LEXICON.len()];
    let mut indicators: Vec<Vec<&str>> = vec![Vec::new(); EMOTION_LEXICON.len()];
    let mut emphasis = 0.0f32;

    for (i, message) in messages.iter().enumerate() {
        let weight = recency_weight(i, messages.len(), recent_focus);
        let lower = message.text.to_lowercase();

        for (slot, (_, terms)) in EMOTION_LEXICON.iter().enumerate() {
            for term in terms.iter() {
                let hits = count_term(&lower, term);
                if hits > 0 {
                    scores[slot] += weight * hits as f32;
                    if !indicators[slot].contains(term) {
                        indicators[slot].push(term);
                    }
                }
            }
        }

        emphasis += weight * (exclamation_runs(&message.text) + shouted_words(&message.text)) as f32;
    }

    // First label wins ties
    let best = scores
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (slot, &score)| match best {
            Some((_, top)) if top >= score => best,
            _ if score > 0.0 => Some((slot, score)),
            _ => best,
        });

    let Some((slot, score)) = best else {
        return EmotionalState::default();
    };

    let signal = score + emphasis * 0.5;
    let intensity = if signal >= 4.0 {
        Intensity::High
    } else if signal >= 2.0 {
        Intensity::Medium
    } else {
        Intensity::Low
    };

    EmotionalState {
        state: EmotionKind::from_label(EMOTION_LEXICON[slot].0),
        intensity,
        indicators: indicators[slot]
            .iter()
            .take(MAX_INDICATORS)
            .map(|s| s.to_string())
            .collect(),
    }
}
