use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Time hint attached to a raw capture: either an already-absolute
/// date-time or whatever text the collector found next to the message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimestampHint {
    Absolute(NaiveDateTime),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub emoji: String,
    #[serde(default)]
    pub reacted_by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotedMessage {
    pub text: String,
    #[serde(default)]
    pub sender: Option<String>,
}

/// Unvalidated record emitted by the collector. May duplicate another
/// capture of the same conversational turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessageCandidate {
    pub capture_index: usize,
    pub text: String,
    #[serde(default)]
    pub speaker_hint: Option<String>,
    #[serde(default)]
    pub timestamp_hint: Option<TimestampHint>,
    #[serde(default)]
    pub date_label_hint: Option<String>,
    #[serde(default)]
    pub is_outgoing_hint: Option<bool>,
    /// Layout/class cue such as "message-out"
    #[serde(default)]
    pub layout_hint: Option<String>,
    #[serde(default)]
    pub media_tags: BTreeSet<String>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    #[serde(default)]
    pub is_forwarded: bool,
    #[serde(default)]
    pub quoted: Option<QuotedMessage>,
}

impl RawMessageCandidate {
    pub fn new(capture_index: usize, text: impl Into<String>) -> Self {
        Self {
            capture_index,
            text: text.into(),
            speaker_hint: None,
            timestamp_hint: None,
            date_label_hint: None,
            is_outgoing_hint: None,
            layout_hint: None,
            media_tags: BTreeSet::new(),
            reactions: Vec::new(),
            is_forwarded: false,
            quoted: None,
        }
    }

    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker_hint = Some(speaker.into());
        self
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.timestamp_hint = Some(TimestampHint::Text(time.into()));
        self
    }

    pub fn with_timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp_hint = Some(TimestampHint::Absolute(timestamp));
        self
    }

    pub fn with_date_label(mut self, label: impl Into<String>) -> Self {
        self.date_label_hint = Some(label.into());
        self
    }

    pub fn with_outgoing(mut self, outgoing: bool) -> Self {
        self.is_outgoing_hint = Some(outgoing);
        self
    }

    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout_hint = Some(layout.into());
        self
    }

    pub fn with_media(mut self, tag: impl Into<String>) -> Self {
        self.media_tags.insert(tag.into());
        self
    }

    pub fn with_reaction(mut self, emoji: impl Into<String>, by: Option<&str>) -> Self {
        self.reactions.push(Reaction {
            emoji: emoji.into(),
            reacted_by: by.map(str::to_string),
        });
        self
    }

    pub fn forwarded(mut self) -> Self {
        self.is_forwarded = true;
        self
    }

    pub fn with_quote(mut self, text: impl Into<String>, sender: Option<&str>) -> Self {
        self.quoted = Some(QuotedMessage {
            text: text.into(),
            sender: sender.map(str::to_string),
        });
        self
    }
}

/// A validated, speaker-resolved message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedMessage {
    pub id: String,
    pub text: String,
    pub speaker: String,
    pub is_outgoing: bool,
    pub timestamp: Option<NaiveDateTime>,
    /// Calendar date resolved from the date label, kept even when no time parsed
    pub date: Option<NaiveDate>,
    pub dedup_key: String,
    pub source_index: usize,
    #[serde(default)]
    pub media: Vec<String>,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    #[serde(default)]
    pub is_forwarded: bool,
    #[serde(default)]
    pub quoted: Option<QuotedMessage>,
}

impl NormalizedMessage {
    pub fn new(
        source_index: usize,
        speaker: impl Into<String>,
        text: impl Into<String>,
        is_outgoing: bool,
        timestamp: Option<NaiveDateTime>,
    ) -> Self {
        let speaker = speaker.into();
        let text = text.into().trim().to_string();
        let dedup_key = dedup_key(&speaker, &text);

        Self {
            id: message_id(&dedup_key, source_index),
            text,
            speaker,
            is_outgoing,
            date: timestamp.map(|t| t.date()),
            timestamp,
            dedup_key,
            source_index,
            media: Vec::new(),
            reactions: Vec::new(),
            is_forwarded: false,
            quoted: None,
        }
    }
}

/// `lowercase(speaker) + "::" + lowercase(trim(text))`
pub fn dedup_key(speaker: &str, text: &str) -> String {
    format!("{}::{}", speaker.to_lowercase(), text.trim().to_lowercase())
}

/// Deterministic id so repeated runs over the same snapshot agree.
fn message_id(dedup_key: &str, source_index: usize) -> String {
    let name = format!("{}#{}", dedup_key, source_index);
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()).to_string()
}
