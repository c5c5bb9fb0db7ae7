//! Conversation pipeline facade
//!
//! Wires normalization, windowing, analysis, smart selection and context
//! formatting together. The pipeline owns its configuration, the speaker
//! alias cache and a shared knowledge base; every run is otherwise a pure
//! function of its candidates, the display name and the reference date.

use chrono::{Local, NaiveDate};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::analysis::{AnalysisResult, ConversationAnalyzer};
use crate::config::PipelineConfig;
use crate::context::context_lines;
use crate::error::{PipelineError, Result};
use crate::normalize::{normalize_candidates, SpeakerResolver, TimestampReconciler};
use crate::selection::{SmartSelection, SmartSelector};
use crate::topics::{KnowledgeBase, TopicAnalyzer};
use crate::types::{NormalizedMessage, RawMessageCandidate};
use crate::window::select_window;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStats {
    pub candidates: usize,
    pub dropped_empty: usize,
    pub duplicates_removed: usize,
    pub after_dedup: usize,
    pub window_size: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineOutput {
    /// The analysis window, chronologically ordered
    pub messages: Vec<NormalizedMessage>,
    pub analysis: AnalysisResult,
    pub smart_selection: Option<SmartSelection>,
    pub context_lines: Vec<String>,
    pub stats: PipelineStats,
}

/// One conversation in a batch request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub candidates: Vec<RawMessageCandidate>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Parse a JSON array of candidates, failing on anything else.
pub fn parse_candidates(json: &str) -> Result<Vec<RawMessageCandidate>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if !value.is_array() {
        return Err(PipelineError::InvalidInput(
            "expected a JSON array of message candidates".to_string(),
        ));
    }
    Ok(serde_json::from_value(value)?)
}

pub struct ConversationPipeline {
    config: PipelineConfig,
    resolver: SpeakerResolver,
    analyzer: ConversationAnalyzer,
    selector: SmartSelector,
    knowledge: Arc<KnowledgeBase>,
    group_by_date: bool,
}

impl ConversationPipeline {
    /// Build a pipeline with the built-in knowledge base.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        Self::with_knowledge(config, Arc::new(KnowledgeBase::builtin()))
    }

    pub fn with_knowledge(config: PipelineConfig, knowledge: Arc<KnowledgeBase>) -> Result<Self> {
        config.validate()?;

        let topics = TopicAnalyzer::new(Arc::clone(&knowledge));
        let analyzer = ConversationAnalyzer::new(config.analysis.clone(), config.keywords.clone(), topics);
        let selector = SmartSelector::new(config.selection.clone(), config.speakers.unknown_label.clone());

        tracing::info!(
            max_messages = config.window.max_messages,
            trigger = config.selection.trigger_threshold,
            budget = config.selection.budget,
            activities = knowledge.activities.len(),
            "[Pipeline] Initialized conversation pipeline"
        );

        Ok(Self {
            resolver: SpeakerResolver::new(&config.speakers),
            analyzer,
            selector,
            knowledge,
            config,
            group_by_date: false,
        })
    }

    /// Group context lines under date headers.
    pub fn with_date_grouping(mut self, enabled: bool) -> Self {
        self.group_by_date = enabled;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn knowledge(&self) -> &Arc<KnowledgeBase> {
        &self.knowledge
    }

    pub fn resolver(&self) -> &SpeakerResolver {
        &self.resolver
    }

    /// Run against the local calendar date.
    pub fn run(&self, candidates: &[RawMessageCandidate], display_name: Option<&str>) -> PipelineOutput {
        self.run_at(candidates, display_name, Local::now().date_naive())
    }

    /// Run with an explicit reference date for relative labels.
    pub fn run_at(
        &self,
        candidates: &[RawMessageCandidate],
        display_name: Option<&str>,
        today: NaiveDate,
    ) -> PipelineOutput {
        let reconciler = TimestampReconciler::new(today, self.config.dates.same_weekday_policy);
        let normalized = normalize_candidates(candidates, &self.resolver, &reconciler, display_name, &self.config.dedup);
        let window = select_window(&normalized.messages, &self.config.window);

        let analysis = self.analyzer.analyze(window.messages());
        let smart_selection = self.selector.select(window.messages());

        let lines = match &smart_selection {
            Some(selection) => context_lines(&selection.selected, &selection.gaps, today, self.group_by_date),
            None => context_lines(window.messages(), &[], today, self.group_by_date),
        };

        let stats = PipelineStats {
            candidates: normalized.stats.candidates,
            dropped_empty: normalized.stats.dropped_empty,
            duplicates_removed: normalized.stats.duplicates_removed,
            after_dedup: normalized.stats.normalized,
            window_size: window.len(),
        };

        tracing::info!(
            candidates = stats.candidates,
            kept = stats.after_dedup,
            window = stats.window_size,
            selected = smart_selection.as_ref().map(|s| s.selected_count),
            "[Pipeline] Conversation processed"
        );

        PipelineOutput {
            messages: window.into_messages(),
            analysis,
            smart_selection,
            context_lines: lines,
            stats,
        }
    }

    /// Process independent conversations in parallel. Each result matches
    /// what a sequential `run_at` would produce.
    pub fn run_batch_at(&self, conversations: &[Conversation], today: NaiveDate) -> Vec<PipelineOutput> {
        conversations
            .par_iter()
            .map(|c| self.run_at(&c.candidates, c.display_name.as_deref(), today))
            .collect()
    }

    pub fn run_batch(&self, conversations: &[Conversation]) -> Vec<PipelineOutput> {
        self.run_batch_at(conversations, Local::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{FlowType, IntentKind, Tone, UrgencyLevel};
    use crate::selection::Quality;

    fn today() -> NaiveDate {
        // A Wednesday
        NaiveDate::from_ymd_opt(2024, 3, 13).unwrap()
    }

    fn pipeline() -> ConversationPipeline {
        ConversationPipeline::new(PipelineConfig::default()).unwrap()
    }

    fn lunch_exchange() -> Vec<RawMessageCandidate> {
        vec![
            RawMessageCandidate::new(0, "Hey, what are you up to?").with_speaker("Friend").with_time("12:00"),
            RawMessageCandidate::new(1, "Just working").with_speaker("You").with_time("12:01"),
            RawMessageCandidate::new(2, "Cool, lunch later?").with_speaker("Friend").with_time("12:02"),
            RawMessageCandidate::new(3, "Sure, what time?").with_speaker("You").with_time("12:03"),
            RawMessageCandidate::new(4, "How about 12:30?").with_speaker("Friend").with_time("12:04"),
        ]
    }

    fn alternating(n: usize) -> Vec<RawMessageCandidate> {
        (0..n)
            .map(|i| {
                let speaker = if i % 2 == 1 { "You" } else { "Friend" };
                RawMessageCandidate::new(i, format!("message number {}", i)).with_speaker(speaker)
            })
            .collect()
    }

    #[test]
    fn test_scenario_simple_exchange() {
        let out = pipeline().run_at(&lunch_exchange(), None, today());

        assert_eq!(out.messages.len(), 5);
        assert_eq!(out.analysis.message_count, 5);
        assert_eq!(out.analysis.last_speaker.as_deref(), Some("Friend"));
        assert!(out.analysis.has_unanswered_question.has_question);
        assert_eq!(out.analysis.has_unanswered_question.asked_by.as_deref(), Some("Friend"));
        assert_eq!(out.analysis.conversation_flow.flow_type, FlowType::BackAndForth);
        assert_eq!(out.analysis.intent.primary, IntentKind::Question);
        assert!(out.analysis.topics.contains(&"food".to_string()));
        assert!(out.smart_selection.is_none());
        assert_eq!(out.context_lines.len(), 5);
        assert_eq!(out.context_lines[4], "[12:04] Friend: How about 12:30?");
        assert!(out.messages[1].is_outgoing);
    }

    #[test]
    fn test_scenario_duplicate_captures() {
        let candidates = vec![
            RawMessageCandidate::new(7, "OK").with_speaker("Friend"),
            RawMessageCandidate::new(3, "ok").with_speaker("Friend"),
        ];
        let out = pipeline().run_at(&candidates, None, today());
        assert_eq!(out.messages.len(), 1);
        assert_eq!(out.messages[0].source_index, 3);
        assert_eq!(out.stats.duplicates_removed, 1);
        assert_eq!(out.stats.after_dedup, 1);
    }

    #[test]
    fn test_scenario_long_alternating_conversation() {
        let out = pipeline().run_at(&alternating(60), None, today());

        assert!(out.messages.len() <= 40);
        assert!(out.messages.iter().any(|m| m.is_outgoing));
        assert!(out.messages.iter().any(|m| !m.is_outgoing));
        assert_eq!(out.messages.last().map(|m| m.source_index), Some(59));
        assert_eq!(out.stats.candidates, 60);
        assert_eq!(out.stats.window_size, out.messages.len());
    }

    #[test]
    fn test_scenario_empty_input() {
        let out = pipeline().run_at(&[], None, today());
        assert!(out.messages.is_empty());
        assert_eq!(out.analysis.sentiment.tone, Tone::Neutral);
        assert_eq!(out.analysis.urgency.level, UrgencyLevel::Low);
        assert!(out.analysis.topics.is_empty());
        assert!(out.smart_selection.is_none());
        assert!(out.context_lines.is_empty());
        assert_eq!(out.stats, PipelineStats::default());
    }

    #[test]
    fn test_smart_selection_keeps_the_tail() {
        // Small windows never trim, so a 35-message window reaches the selector
        let config = PipelineConfig {
            window: crate::config::WindowConfig {
                max_messages: 50,
                recent_window: 40,
                min_recent_count: 40,
            },
            ..PipelineConfig::default()
        };
        let pipeline = ConversationPipeline::new(config).unwrap();
        let out = pipeline.run_at(&alternating(35), None, today());

        let selection = out.smart_selection.expect("35 messages exceed the trigger");
        assert!(selection.selected_count <= 25);
        assert_eq!(selection.original_count, 35);
        let tail: Vec<usize> = selection.selected.iter().rev().take(5).map(|m| m.source_index).collect();
        assert_eq!(tail, vec![34, 33, 32, 31, 30]);
        assert!(out.context_lines[0].starts_with("[…"));
        assert_ne!(selection.context_quality.quality, Quality::Poor);
    }

    #[test]
    fn test_display_name_marks_self_messages() {
        let candidates = vec![
            RawMessageCandidate::new(0, "hi Priya").with_speaker("Sam"),
            RawMessageCandidate::new(1, "hey Sam").with_speaker("Priya"),
        ];
        let out = pipeline().run_at(&candidates, Some("Priya"), today());
        assert!(!out.messages[0].is_outgoing);
        assert!(out.messages[1].is_outgoing);
        assert_eq!(out.messages[1].speaker, "Priya");
    }

    #[test]
    fn test_date_grouping_uses_reconciled_labels() {
        let candidates = vec![
            RawMessageCandidate::new(0, "see you tomorrow")
                .with_speaker("Friend")
                .with_time("9:00 PM")
                .with_date_label("Yesterday"),
            RawMessageCandidate::new(1, "morning!").with_speaker("You").with_time("8:15 AM").with_date_label("Today"),
        ];
        let pipeline = pipeline().with_date_grouping(true);
        let out = pipeline.run_at(&candidates, None, today());
        assert_eq!(
            out.context_lines,
            vec![
                "--- Today ---",
                "[08:15] You: morning!",
                "--- Yesterday ---",
                "[21:00] Friend: see you tomorrow",
            ]
        );
    }

    #[test]
    fn test_batch_matches_sequential_runs() {
        let pipeline = pipeline();
        let conversations = vec![
            Conversation {
                candidates: lunch_exchange(),
                display_name: None,
            },
            Conversation {
                candidates: alternating(60),
                display_name: Some("Sam".to_string()),
            },
        ];
        let batch = pipeline.run_batch_at(&conversations, today());
        assert_eq!(batch.len(), 2);
        for (conversation, output) in conversations.iter().zip(&batch) {
            let sequential = pipeline.run_at(&conversation.candidates, conversation.display_name.as_deref(), today());
            assert_eq!(&sequential, output);
        }
    }

    #[test]
    fn test_parse_candidates_fails_fast() {
        let parsed = parse_candidates(r#"[{"captureIndex": 0, "text": "hi", "speakerHint": "Friend"}]"#).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].speaker_hint.as_deref(), Some("Friend"));

        assert!(matches!(parse_candidates(r#"{"text": "hi"}"#), Err(PipelineError::InvalidInput(_))));
        assert!(matches!(parse_candidates("not json"), Err(PipelineError::Json(_))));
        assert!(parse_candidates(r#"[{"text": "missing index"}]"#).is_err());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = PipelineConfig::default();
        config.selection.budget = 0;
        assert!(ConversationPipeline::new(config).is_err());
    }
}
