//! Conversation Analyzer
//!
//! Pure, multi-signal reading of a conversation window. Every signal is an
//! independent keyword/regex classifier with a documented default, so an
//! empty or signal-free window still yields a fully populated result.

pub mod emotion;
pub mod intent;
pub mod lexicon;
pub mod sentiment;
pub mod signals;
pub mod style;
pub mod text;

pub use emotion::{EmotionKind, EmotionalState, Intensity};
pub use intent::{Intent, IntentKind};
pub use sentiment::{Sentiment, Tone};
pub use signals::{ConversationFlow, FlowType, UnansweredQuestion, Urgency, UrgencyLevel};
pub use style::{
    EmojiFrequency, EmojiUsage, Formality, LanguageMix, LengthStyle, MessageLength, Pace, Pacing, StyleBasis,
    StyleMarkers,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::config::{AnalysisConfig, KeywordWeights};
use crate::topics::{TopicAnalysis, TopicAnalyzer};
use crate::types::NormalizedMessage;

/// Full weight for the trailing `recent_focus` messages, half for the rest.
pub(crate) fn recency_weight(index: usize, len: usize, recent_focus: usize) -> f32 {
    if index >= len.saturating_sub(recent_focus) {
        1.0
    } else {
        0.5
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub message_count: usize,
    pub speakers: BTreeSet<String>,
    pub last_speaker: Option<String>,
    pub has_unanswered_question: UnansweredQuestion,
    pub conversation_flow: ConversationFlow,
    pub sentiment: Sentiment,
    pub topics: Vec<String>,
    pub topic_analysis: TopicAnalysis,
    pub urgency: Urgency,
    pub intent: Intent,
    pub emotional_state: EmotionalState,
    pub message_length: MessageLength,
    pub emoji_usage: EmojiUsage,
    pub language_mix: LanguageMix,
    pub pacing: Pacing,
    pub style_markers: StyleMarkers,
}

/// Holds the tuning and shared knowledge an analysis needs; `analyze` itself
/// keeps no state between calls.
#[derive(Debug, Clone, Default)]
pub struct ConversationAnalyzer {
    config: AnalysisConfig,
    keywords: KeywordWeights,
    topics: TopicAnalyzer,
}

impl ConversationAnalyzer {
    pub fn new(config: AnalysisConfig, keywords: KeywordWeights, topics: TopicAnalyzer) -> Self {
        Self {
            config,
            keywords: keywords.normalized(),
            topics,
        }
    }

    pub fn analyze(&self, messages: &[NormalizedMessage]) -> AnalysisResult {
        if messages.is_empty() {
            return AnalysisResult::default();
        }

        let focus = self.config.recent_focus;
        let result = AnalysisResult {
            message_count: messages.len(),
            speakers: messages.iter().map(|m| m.speaker.clone()).collect(),
            last_speaker: messages.last().map(|m| m.speaker.clone()),
            has_unanswered_question: signals::find_unanswered_question(messages),
            conversation_flow: signals::analyze_flow(messages),
            sentiment: sentiment::analyze_sentiment(
                messages,
                &self.keywords.positive,
                &self.keywords.negative,
                &self.config,
            ),
            topics: signals::detect_topics(messages),
            topic_analysis: self.topics.analyze(messages),
            urgency: signals::analyze_urgency(messages, &self.keywords.urgency, focus),
            intent: intent::analyze_intent(messages, focus),
            emotional_state: emotion::analyze_emotion(messages, focus),
            message_length: style::analyze_length(messages),
            emoji_usage: style::analyze_emoji(messages),
            language_mix: style::analyze_language(messages),
            pacing: style::analyze_pacing(messages, &self.config),
            style_markers: style::analyze_style(messages),
        };

        tracing::debug!(
            messages = result.message_count,
            tone = ?result.sentiment.tone,
            intent = ?result.intent.primary,
            urgency = ?result.urgency.level,
            "[Analyzer] Conversation analyzed"
        );
        result
    }
}
