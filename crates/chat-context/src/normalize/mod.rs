//! Normalization: raw collector captures → deduplicated, speaker-resolved,
//! chronologically ordered messages.

pub mod dedup;
pub mod speaker;
pub mod text;
pub mod timestamp;

pub use dedup::{deduplicate, sort_chronologically};
pub use speaker::{sanitize_name, ResolvedSpeaker, SpeakerHints, SpeakerResolver, SpeakerStrategy};
pub use text::clean_text;
pub use timestamp::{parse_time_hint, parse_time_of_day, ParsedTime, Reconciled, TimestampReconciler};

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::config::DedupConfig;
use crate::types::{NormalizedMessage, RawMessageCandidate};

/// Counters describing what normalization did to a batch of candidates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizeStats {
    pub candidates: usize,
    pub dropped_empty: usize,
    pub duplicates_removed: usize,
    pub normalized: usize,
}

#[derive(Debug, Clone)]
pub struct Normalized {
    pub messages: Vec<NormalizedMessage>,
    pub stats: NormalizeStats,
}

/// Turn one candidate into a message, or `None` when its text is empty.
pub fn normalize_candidate(
    candidate: &RawMessageCandidate,
    resolver: &SpeakerResolver,
    reconciler: &TimestampReconciler,
    display_name: Option<&str>,
) -> Option<NormalizedMessage> {
    let text = clean_text(&candidate.text);
    if text.is_empty() {
        return None;
    }

    let speaker = resolver.resolve(&SpeakerHints::from_candidate(candidate), display_name);
    let reconciled = reconciler.reconcile(
        candidate.timestamp_hint.as_ref(),
        candidate.date_label_hint.as_deref(),
    );

    let mut message = NormalizedMessage::new(
        candidate.capture_index,
        speaker.speaker,
        text,
        speaker.is_outgoing,
        reconciled.timestamp,
    );
    message.date = reconciled.date;
    message.media = candidate.media_tags.iter().cloned().collect();
    message.reactions = candidate.reactions.clone();
    message.is_forwarded = candidate.is_forwarded;
    message.quoted = candidate.quoted.clone();
    Some(message)
}

/// Run the full normalization stage: clean, resolve, reconcile, drop empty
/// records, deduplicate in capture order, then sort chronologically.
pub fn normalize_candidates(
    candidates: &[RawMessageCandidate],
    resolver: &SpeakerResolver,
    reconciler: &TimestampReconciler,
    display_name: Option<&str>,
    dedup: &DedupConfig,
) -> Normalized {
    let mut messages: Vec<NormalizedMessage> = candidates
        .iter()
        .filter_map(|c| normalize_candidate(c, resolver, reconciler, display_name))
        .collect();
    let dropped_empty = candidates.len() - messages.len();

    messages.sort_by_key(|m| m.source_index);
    let before_dedup = messages.len();
    let tolerance = dedup.time_tolerance_secs.map(Duration::seconds);
    let messages = sort_chronologically(deduplicate(messages, tolerance));

    let stats = NormalizeStats {
        candidates: candidates.len(),
        dropped_empty,
        duplicates_removed: before_dedup - messages.len(),
        normalized: messages.len(),
    };

    tracing::debug!(
        candidates = stats.candidates,
        dropped_empty = stats.dropped_empty,
        duplicates = stats.duplicates_removed,
        kept = stats.normalized,
        "[Normalizer] Normalized candidates"
    );

    Normalized { messages, stats }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SameWeekdayPolicy, SpeakerConfig};
    use chrono::NaiveDate;

    fn setup() -> (SpeakerResolver, TimestampReconciler) {
        (
            SpeakerResolver::new(&SpeakerConfig::default()),
            TimestampReconciler::new(NaiveDate::from_ymd_opt(2024, 3, 13).unwrap(), SameWeekdayPolicy::SevenDaysPrior),
        )
    }

    #[test]
    fn test_empty_text_is_dropped() {
        let (resolver, reconciler) = setup();
        let candidates = vec![
            RawMessageCandidate::new(0, "   ").with_speaker("Friend"),
            RawMessageCandidate::new(1, "hello").with_speaker("Friend"),
        ];
        let out = normalize_candidates(&candidates, &resolver, &reconciler, None, &DedupConfig::default());
        assert_eq!(out.messages.len(), 1);
        assert_eq!(out.stats.dropped_empty, 1);
    }

    #[test]
    fn test_annotations_are_carried_over() {
        let (resolver, reconciler) = setup();
        let candidate = RawMessageCandidate::new(4, "look at this")
            .with_speaker("Friend")
            .with_media("image")
            .with_reaction("😂", Some("You"))
            .with_quote("where are you?", Some("You"))
            .forwarded();
        let message = normalize_candidate(&candidate, &resolver, &reconciler, None).unwrap();
        assert_eq!(message.media, vec!["image".to_string()]);
        assert_eq!(message.reactions.len(), 1);
        assert!(message.is_forwarded);
        assert_eq!(message.quoted.as_ref().map(|q| q.text.as_str()), Some("where are you?"));
    }

    #[test]
    fn test_duplicates_removed_before_sort() {
        let (resolver, reconciler) = setup();
        let candidates = vec![
            RawMessageCandidate::new(7, "OK").with_speaker("Friend").with_time("10:01"),
            RawMessageCandidate::new(3, "ok").with_speaker("Friend").with_time("10:00"),
            RawMessageCandidate::new(5, "see you").with_speaker("You").with_time("09:59"),
        ];
        let out = normalize_candidates(&candidates, &resolver, &reconciler, None, &DedupConfig::default());
        assert_eq!(out.stats.duplicates_removed, 1);
        let indices: Vec<usize> = out.messages.iter().map(|m| m.source_index).collect();
        assert_eq!(indices, vec![5, 3]);
        assert!(out.messages[0].is_outgoing);
    }
}
