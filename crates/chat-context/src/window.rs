//! Recency windowing
//!
//! Bounds the working set and trims it to the trailing stretch that holds
//! the most recent two-sided exchange, so analysis never runs on an
//! isolated monologue tail.

use serde::{Deserialize, Serialize};

use crate::config::WindowConfig;
use crate::types::NormalizedMessage;

/// Ordered, bounded, trailing subset of a conversation. Non-empty whenever
/// its source was non-empty, and always ends with the last source message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationWindow {
    messages: Vec<NormalizedMessage>,
}

impl ConversationWindow {
    pub fn messages(&self) -> &[NormalizedMessage] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<NormalizedMessage> {
        self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&NormalizedMessage> {
        self.messages.last()
    }
}

impl From<Vec<NormalizedMessage>> for ConversationWindow {
    fn from(messages: Vec<NormalizedMessage>) -> Self {
        Self { messages }
    }
}

/// Select the analysis window from a deduplicated, sorted message list.
pub fn select_window(messages: &[NormalizedMessage], config: &WindowConfig) -> ConversationWindow {
    // Step 1: hard cap
    let capped = &messages[messages.len().saturating_sub(config.max_messages)..];

    // Step 2: short conversations are kept whole
    if capped.len() <= config.min_recent_count {
        return ConversationWindow::from(capped.to_vec());
    }

    // Step 3: scan backward until both sides were seen and the minimum is
    // met, or the recent window is exhausted
    let mut seen_self = false;
    let mut seen_other = false;
    let mut scanned = 0;

    for message in capped.iter().rev() {
        scanned += 1;
        if message.is_outgoing {
            seen_self = true;
        } else {
            seen_other = true;
        }

        if scanned >= config.recent_window {
            break;
        }
        if seen_self && seen_other && scanned >= config.min_recent_count {
            break;
        }
    }

    let start = capped.len() - scanned;
    tracing::debug!(
        input = messages.len(),
        capped = capped.len(),
        window = scanned,
        two_sided = seen_self && seen_other,
        "[Window] Selected conversation window"
    );
    ConversationWindow::from(capped[start..].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation(n: usize, outgoing: impl Fn(usize) -> bool) -> Vec<NormalizedMessage> {
        (0..n)
            .map(|i| {
                let out = outgoing(i);
                let speaker = if out { "You" } else { "Friend" };
                NormalizedMessage::new(i, speaker, format!("message {}", i), out, None)
            })
            .collect()
    }

    #[test]
    fn test_empty_input_gives_empty_window() {
        let window = select_window(&[], &WindowConfig::default());
        assert!(window.is_empty());
    }

    #[test]
    fn test_short_conversations_are_untouched() {
        let messages = conversation(5, |i| i % 2 == 1);
        let window = select_window(&messages, &WindowConfig::default());
        assert_eq!(window.len(), 5);
    }

    #[test]
    fn test_alternating_sixty_is_capped_and_trimmed() {
        let messages = conversation(60, |i| i % 2 == 1);
        let window = select_window(&messages, &WindowConfig::default());

        assert!(window.len() <= 40);
        assert_eq!(window.len(), 16);
        assert_eq!(window.last().unwrap().source_index, 59);
        assert!(window.messages().iter().any(|m| m.is_outgoing));
        assert!(window.messages().iter().any(|m| !m.is_outgoing));
    }

    #[test]
    fn test_scan_extends_until_other_side_appears() {
        // The local user only spoke 25 messages before the end
        let messages = conversation(50, |i| i == 24);
        let window = select_window(&messages, &WindowConfig::default());
        assert_eq!(window.len(), 26);
        assert_eq!(window.messages()[0].source_index, 24);
    }

    #[test]
    fn test_monologue_stops_at_recent_window() {
        let messages = conversation(50, |_| false);
        let window = select_window(&messages, &WindowConfig::default());
        assert_eq!(window.len(), 40);
        assert_eq!(window.last().unwrap().source_index, 49);
    }

    #[test]
    fn test_window_always_ends_with_last_message() {
        for n in [1, 16, 17, 33, 80] {
            let messages = conversation(n, |i| i % 3 == 0);
            let window = select_window(&messages, &WindowConfig::default());
            assert!(!window.is_empty());
            assert_eq!(window.last(), messages.last());
        }
    }
}
