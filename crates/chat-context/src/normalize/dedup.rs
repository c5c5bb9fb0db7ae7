//! Duplicate-capture collapsing and chronological ordering.
//!
//! Deduplication has to run before the chronological sort: capture order is
//! the tie-break signal, and two captures of one message can end up with
//! slightly different reconciled timestamps.

use chrono::{Duration, NaiveDateTime};
use std::collections::HashMap;

use crate::types::NormalizedMessage;

#[derive(Default)]
struct DedupState {
    kept: Vec<NormalizedMessage>,
    slots_by_key: HashMap<String, Vec<usize>>,
}

impl DedupState {
    fn absorb(mut self, message: NormalizedMessage, tolerance: Option<Duration>) -> Self {
        let existing = self.slots_by_key.get(&message.dedup_key).and_then(|slots| {
            slots
                .iter()
                .copied()
                .find(|&slot| same_capture(&self.kept[slot], &message, tolerance))
        });

        match existing {
            Some(slot) => {
                if message.source_index < self.kept[slot].source_index {
                    self.kept[slot] = message;
                }
            }
            None => {
                let slot = self.kept.len();
                self.slots_by_key
                    .entry(message.dedup_key.clone())
                    .or_default()
                    .push(slot);
                self.kept.push(message);
            }
        }
        self
    }
}

/// Without a tolerance every same-key record is a duplicate. With one, two
/// records whose timestamps are both known and further apart than the
/// tolerance are treated as the same phrase said twice.
fn same_capture(kept: &NormalizedMessage, candidate: &NormalizedMessage, tolerance: Option<Duration>) -> bool {
    match (tolerance, kept.timestamp, candidate.timestamp) {
        (Some(tol), Some(a), Some(b)) => {
            let gap = if a > b { a - b } else { b - a };
            gap <= tol
        }
        _ => true,
    }
}

/// Collapse duplicate captures, converging on the earliest capture of each
/// logical message. Input is expected in capture order; output keeps the
/// position of each message's first sighting.
pub fn deduplicate(messages: Vec<NormalizedMessage>, tolerance: Option<Duration>) -> Vec<NormalizedMessage> {
    messages
        .into_iter()
        .fold(DedupState::default(), |state, message| state.absorb(message, tolerance))
        .kept
}

/// Sort by timestamp with capture order as the tie-break. Records without a
/// timestamp borrow the nearest known one from earlier captures (or later
/// ones when nothing precedes them) so they stay where they were captured.
pub fn sort_chronologically(mut messages: Vec<NormalizedMessage>) -> Vec<NormalizedMessage> {
    messages.sort_by_key(|m| m.source_index);

    let forward: Vec<Option<NaiveDateTime>> = messages
        .iter()
        .scan(None, |last, m| {
            if m.timestamp.is_some() {
                *last = m.timestamp;
            }
            Some(*last)
        })
        .collect();
    let first_known = messages.iter().find_map(|m| m.timestamp);

    let mut keyed: Vec<(Option<NaiveDateTime>, NormalizedMessage)> = forward
        .into_iter()
        .map(|ts| ts.or(first_known))
        .zip(messages)
        .collect();

    keyed.sort_by(|(ta, a), (tb, b)| ta.cmp(tb).then(a.source_index.cmp(&b.source_index)));
    keyed.into_iter().map(|(_, m)| m).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(2024, 3, 13).unwrap().and_hms_opt(h, m, 0)
    }

    fn msg(idx: usize, speaker: &str, text: &str, ts: Option<NaiveDateTime>) -> NormalizedMessage {
        NormalizedMessage::new(idx, speaker, text, speaker == "You", ts)
    }

    #[test]
    fn test_case_insensitive_duplicates_keep_earliest_capture() {
        let out = deduplicate(vec![msg(3, "Friend", "ok", None), msg(7, "Friend", "OK", None)], None);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source_index, 3);
    }

    #[test]
    fn test_smaller_index_replaces_kept_record() {
        let out = deduplicate(vec![msg(7, "Friend", "OK", None), msg(3, "Friend", "ok", None)], None);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].source_index, 3);
        assert_eq!(out[0].text, "ok");
    }

    #[test]
    fn test_different_speakers_are_not_duplicates() {
        let out = deduplicate(vec![msg(0, "Friend", "ok", None), msg(1, "You", "ok", None)], None);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_deduplicate_is_idempotent() {
        let input = vec![
            msg(0, "Friend", "hey", at(9, 0)),
            msg(1, "You", "hi!", at(9, 1)),
            msg(2, "Friend", "Hey", at(9, 0)),
            msg(3, "You", "hi!", at(9, 2)),
            msg(4, "Friend", "lunch?", at(9, 5)),
        ];
        let once = deduplicate(input, None);
        let twice = deduplicate(once.clone(), None);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }

    #[test]
    fn test_tolerance_keeps_repeated_phrases_apart() {
        let input = vec![
            msg(0, "Friend", "ok", at(9, 0)),
            msg(1, "Friend", "ok", at(9, 1)),
            msg(2, "Friend", "ok", at(18, 0)),
        ];
        let out = deduplicate(input, Some(Duration::minutes(5)));
        let indices: Vec<usize> = out.iter().map(|m| m.source_index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn test_sort_orders_by_time_then_capture() {
        let input = vec![
            msg(0, "Friend", "second", at(10, 0)),
            msg(1, "You", "first", at(9, 0)),
            msg(2, "Friend", "tie a", at(11, 0)),
            msg(3, "You", "tie b", at(11, 0)),
        ];
        let sorted = sort_chronologically(input);
        let texts: Vec<&str> = sorted.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "tie a", "tie b"]);

        for pair in sorted.windows(2) {
            if let (Some(a), Some(b)) = (pair[0].timestamp, pair[1].timestamp) {
                assert!(a <= b);
            }
        }
    }

    #[test]
    fn test_untimed_records_stay_at_capture_position() {
        let input = vec![
            msg(0, "Friend", "no time yet", None),
            msg(1, "Friend", "morning", at(9, 0)),
            msg(2, "You", "untimed reply", None),
            msg(3, "Friend", "noon", at(12, 0)),
        ];
        let sorted = sort_chronologically(input);
        let indices: Vec<usize> = sorted.iter().map(|m| m.source_index).collect();
        assert_eq!(indices, vec![0, 1, 2, 3]);
    }
}
