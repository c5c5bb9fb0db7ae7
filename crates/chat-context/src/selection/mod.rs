//! Smart Selector
//!
//! Reduces an oversized window to a bounded, relevance-ranked subset. The
//! trailing messages are always kept verbatim; earlier ones compete on a
//! relevance score against the most recent message. Output stays in
//! chronological order with explicit gap markers where messages were
//! skipped.

pub mod quality;

pub use quality::{
    assess_quality, detect_topic_changes, overlap, stem, ContextQuality, Quality, TopicChange, TopicFlow,
    LOW_COHERENCE, VERY_LOW_COHERENCE,
};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::analysis::lexicon::CHARGED_VOCABULARY;
use crate::analysis::text::{contains_any, is_question, significant_words};
use crate::config::SelectionConfig;
use crate::types::NormalizedMessage;

/// `skipped` messages were left out immediately before `selected[position]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gap {
    pub position: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartSelection {
    pub selected: Vec<NormalizedMessage>,
    pub original_count: usize,
    pub selected_count: usize,
    /// Relevance score of each selected message, index-aligned with `selected`
    pub scores: Vec<f32>,
    pub gaps: Vec<Gap>,
    /// `at_index` points into `selected`
    pub topic_changes: Vec<TopicChange>,
    pub context_quality: ContextQuality,
}

impl SmartSelection {
    pub fn skipped_count(&self) -> usize {
        self.original_count - self.selected_count
    }
}

#[derive(Debug, Clone)]
pub struct SmartSelector {
    config: SelectionConfig,
    unknown_label: String,
}

impl SmartSelector {
    pub fn new(config: SelectionConfig, unknown_label: impl Into<String>) -> Self {
        Self {
            config,
            unknown_label: unknown_label.into(),
        }
    }

    pub fn should_select(&self, window_len: usize) -> bool {
        window_len > self.config.trigger_threshold
    }

    /// Relevance of one message against the content words of the anchor
    /// (most recent) message, capped at 1.0.
    pub fn score_message(message: &NormalizedMessage, anchor_words: &BTreeSet<String>) -> f32 {
        let mut score = 0.0f32;

        if is_question(&message.text) {
            score += 0.5;
        }

        let shared = significant_words(&message.text).intersection(anchor_words).count();
        score += 0.3 * shared as f32;

        if message.text.chars().count() > 50 {
            score += 0.2;
        }

        if contains_any(&message.text.to_lowercase(), CHARGED_VOCABULARY) {
            score += 0.3;
        }

        score.min(1.0)
    }

    /// Select from the window, or `None` when it is within the threshold.
    pub fn select(&self, window: &[NormalizedMessage]) -> Option<SmartSelection> {
        if !self.should_select(window.len()) {
            return None;
        }

        let n = window.len();
        let anchor_words = window.last().map(|m| significant_words(&m.text)).unwrap_or_default();
        let scores: Vec<f32> = window.iter().map(|m| Self::score_message(m, &anchor_words)).collect();

        // The tail is kept no matter how it scores
        let budget = self.config.budget.min(n);
        let keep = self.config.always_include_last.min(budget);
        let tail_start = n - keep;

        // Ties prefer the more recent message
        let mut candidates: Vec<usize> = (0..tail_start)
            .filter(|&i| scores[i] > self.config.relevance_threshold)
            .collect();
        candidates.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.cmp(&a))
        });
        candidates.truncate(budget - keep);

        let mut indices: Vec<usize> = candidates;
        indices.extend(tail_start..n);
        indices.sort_unstable();

        let gaps = gap_markers(&indices);
        let selected: Vec<NormalizedMessage> = indices.iter().map(|&i| window[i].clone()).collect();

        // Topic flow and quality are graded on the selection, not the full window
        let flow = detect_topic_changes(&selected, self.config.cluster_size, self.config.topic_similarity_floor);
        let skipped_share = (n - indices.len()) as f32 / n as f32;
        let context_quality = assess_quality(&selected, &flow, skipped_share, &self.unknown_label);

        let selection = SmartSelection {
            selected,
            original_count: n,
            selected_count: indices.len(),
            scores: indices.iter().map(|&i| scores[i]).collect(),
            gaps,
            topic_changes: flow.changes,
            context_quality,
        };

        tracing::debug!(
            original = selection.original_count,
            selected = selection.selected_count,
            gaps = selection.gaps.len(),
            quality = ?selection.context_quality.quality,
            "[Selector] Smart selection applied"
        );
        Some(selection)
    }
}

/// Gap markers for sorted window indices, including a leading gap when the
/// first kept message is not the first in the window.
fn gap_markers(indices: &[usize]) -> Vec<Gap> {
    let mut expected = 0;
    let mut gaps = Vec::new();
    for (position, &index) in indices.iter().enumerate() {
        if index > expected {
            gaps.push(Gap {
                position,
                skipped: index - expected,
            });
        }
        expected = index + 1;
    }
    gaps
}
