//! Topic-shift detection and context-quality grading for smart selections.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::analysis::lexicon::TOPIC_FILLER;
use crate::analysis::signals::find_unanswered_question;
use crate::analysis::text::significant_words;
use crate::types::NormalizedMessage;

const LABEL_KEYWORDS: usize = 3;
/// Mean topic similarity below this makes the context poor
pub const VERY_LOW_COHERENCE: f32 = 0.1;
/// Mean topic similarity below this makes the context fair
pub const LOW_COHERENCE: f32 = 0.2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicChange {
    pub before_topic: String,
    pub after_topic: String,
    /// Index (into the compared messages) of the first message of the new cluster
    pub at_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Quality {
    #[default]
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextQuality {
    pub quality: Quality,
    pub issues: Vec<String>,
    pub coherence: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TopicFlow {
    pub changes: Vec<TopicChange>,
    /// Mean similarity of each comparable cluster to the topic it was
    /// compared against (1.0 when nothing was comparable)
    pub coherence: f32,
}

/// Crude suffix folding so "flights"/"flight" and "booked"/"booking" meet.
pub fn stem(word: &str) -> String {
    fn cut(word: &str, suffix_len: usize) -> &str {
        &word[..word.len() - suffix_len]
    }

    if word.ends_with("'s") {
        return cut(word, 2).to_string();
    }
    let len = word.chars().count();
    if len > 4 && word.ends_with("ies") {
        return format!("{}y", cut(word, 3));
    }
    if len > 4 && ["ches", "shes", "sses", "xes"].iter().any(|s| word.ends_with(s)) {
        return cut(word, 2).to_string();
    }
    if len > 5 && word.ends_with("ing") {
        return undouble(cut(word, 3));
    }
    if len > 4 && word.ends_with("ed") {
        return undouble(cut(word, 2));
    }
    if len > 3 && word.ends_with('s') && !word.ends_with("ss") && !word.ends_with("us") {
        return cut(word, 1).to_string();
    }
    word.to_string()
}

/// "planning" -> "plann" -> "plan"
fn undouble(stem: &str) -> String {
    let mut chars: Vec<char> = stem.chars().collect();
    let n = chars.len();
    if n >= 3
        && chars[n - 1] == chars[n - 2]
        && chars[n - 1].is_alphabetic()
        && !matches!(chars[n - 1], 'l' | 's' | 'z' | 'e' | 'o')
    {
        chars.pop();
    }
    chars.into_iter().collect()
}

fn content_words(message: &NormalizedMessage) -> impl Iterator<Item = String> {
    significant_words(&message.text)
        .into_iter()
        .filter(|w| !TOPIC_FILLER.contains(&w.as_str()))
}

/// Every stemmed content word of a cluster.
fn topic_words(cluster: &[NormalizedMessage]) -> BTreeSet<String> {
    cluster.iter().flat_map(content_words).map(|w| stem(&w)).collect()
}

/// Most frequent content words; ties resolve alphabetically.
fn topic_label(messages: &[NormalizedMessage]) -> String {
    let counts = messages
        .iter()
        .flat_map(content_words)
        .fold(BTreeMap::<String, usize>::new(), |mut acc, word| {
            *acc.entry(word).or_default() += 1;
            acc
        });
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
        .into_iter()
        .take(LABEL_KEYWORDS)
        .map(|(w, _)| w)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Overlap coefficient `|A ∩ B| / min(|A|, |B|)`; 0.0 when either set is empty.
pub fn overlap(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f32 {
    let smaller = a.len().min(b.len());
    if smaller == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f32 / smaller as f32
}

/// Walk fixed-size clusters and compare each one with the vocabulary of the
/// current topic (every cluster since the last change). A cluster sharing
/// less than `floor` of its words starts a new topic. Clusters with no
/// content words (all "ok"/"lol") are skipped.
pub fn detect_topic_changes(messages: &[NormalizedMessage], cluster_size: usize, floor: f32) -> TopicFlow {
    let size = cluster_size.max(1);
    let mut topic: BTreeSet<String> = BTreeSet::new();
    let mut topic_start = 0;
    let mut changes = Vec::new();
    let mut similarities = Vec::new();

    for (i, cluster) in messages.chunks(size).enumerate() {
        let start = i * size;
        let words = topic_words(cluster);
        if words.is_empty() {
            continue;
        }
        if topic.is_empty() {
            topic = words;
            topic_start = start;
            continue;
        }

        let similarity = overlap(&words, &topic);
        similarities.push(similarity);
        if similarity < floor {
            changes.push(TopicChange {
                before_topic: topic_label(&messages[topic_start..start]),
                after_topic: topic_label(cluster),
                at_index: start,
            });
            topic = words;
            topic_start = start;
        } else {
            topic.extend(words);
        }
    }

    let coherence = if similarities.is_empty() {
        1.0
    } else {
        similarities.iter().sum::<f32>() / similarities.len() as f32
    };

    TopicFlow { changes, coherence }
}

/// Grade how usable the conversation is as reply context. Any poor-level
/// issue makes the whole context poor; otherwise any issue makes it fair.
pub fn assess_quality(
    messages: &[NormalizedMessage],
    flow: &TopicFlow,
    skipped_share: f32,
    unknown_label: &str,
) -> ContextQuality {
    let mut poor = Vec::new();
    let mut fair = Vec::new();

    match messages.last() {
        Some(last) if last.speaker == unknown_label => {
            poor.push("last speaker could not be identified".to_string());
        }
        Some(last) => {
            let open_question = find_unanswered_question(messages).has_question;
            if !open_question && last.is_outgoing {
                fair.push("no open question or incoming message to reply to".to_string());
            }
        }
        None => poor.push("conversation is empty".to_string()),
    }

    if flow.coherence < VERY_LOW_COHERENCE {
        poor.push(format!("topic coherence is very low ({:.2})", flow.coherence));
    } else if flow.coherence < LOW_COHERENCE {
        fair.push(format!("topic coherence is low ({:.2})", flow.coherence));
    }
    if flow.changes.len() >= 3 {
        fair.push(format!("conversation changes topic {} times", flow.changes.len()));
    }
    if skipped_share > 0.6 {
        fair.push(format!("{:.0}% of the conversation was skipped", skipped_share * 100.0));
    }

    let quality = if !poor.is_empty() {
        Quality::Poor
    } else if !fair.is_empty() {
        Quality::Fair
    } else {
        Quality::Good
    };

    poor.extend(fair);
    ContextQuality {
        quality,
        issues: poor,
        coherence: flow.coherence,
    }
}
