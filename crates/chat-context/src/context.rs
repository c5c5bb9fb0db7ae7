//! Flattened, human-readable context lines for prompt builders.
//!
//! One line per message with time, speaker, text and annotations; explicit
//! gap lines where a smart selection skipped messages; optional date
//! headers with the most recent date first.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::selection::Gap;
use crate::types::NormalizedMessage;

pub const UNDATED_HEADER: &str = "Earlier";

/// Render a single message line, e.g.
/// `[12:30] Friend: (forwarded) look at this [media: image] [reactions: 😂 by You]`
pub fn render_message(message: &NormalizedMessage) -> String {
    let mut line = String::new();

    if let Some(ts) = message.timestamp {
        line.push_str(&format!("[{}] ", ts.format("%H:%M")));
    }
    line.push_str(&message.speaker);
    line.push_str(": ");

    if message.is_forwarded {
        line.push_str("(forwarded) ");
    }
    if let Some(quoted) = &message.quoted {
        match &quoted.sender {
            Some(sender) => line.push_str(&format!("(replying to {}: \"{}\") ", sender, quoted.text)),
            None => line.push_str(&format!("(replying to \"{}\") ", quoted.text)),
        }
    }
    line.push_str(&message.text.replace('\n', " / "));

    if !message.media.is_empty() {
        line.push_str(&format!(" [media: {}]", message.media.join(", ")));
    }
    if !message.reactions.is_empty() {
        let reactions: Vec<String> = message
            .reactions
            .iter()
            .map(|r| match &r.reacted_by {
                Some(by) => format!("{} by {}", r.emoji, by),
                None => r.emoji.clone(),
            })
            .collect();
        line.push_str(&format!(" [reactions: {}]", reactions.join(", ")));
    }

    line
}

pub fn gap_line(skipped: usize) -> String {
    let noun = if skipped == 1 { "message" } else { "messages" };
    format!("[… {} earlier {} skipped …]", skipped, noun)
}

/// `Today`, `Yesterday`, a weekday name inside the last week, otherwise
/// `12 Mar 2024`.
pub fn date_header(date: NaiveDate, today: NaiveDate) -> String {
    let days_ago = (today - date).num_days();
    match days_ago {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        2..=6 => date.format("%A").to_string(),
        _ => date.format("%-d %b %Y").to_string(),
    }
}

fn message_date(message: &NormalizedMessage) -> Option<NaiveDate> {
    message.date.or_else(|| message.timestamp.map(|t| t.date()))
}

/// Build context lines. `gaps` positions index into `messages`.
pub fn context_lines(messages: &[NormalizedMessage], gaps: &[Gap], today: NaiveDate, group_by_date: bool) -> Vec<String> {
    let skipped_before: BTreeMap<usize, usize> = gaps.iter().map(|g| (g.position, g.skipped)).collect();
    let lines_for = |position: usize, message: &NormalizedMessage| -> Vec<String> {
        let mut lines = Vec::with_capacity(2);
        if let Some(&skipped) = skipped_before.get(&position) {
            lines.push(gap_line(skipped));
        }
        lines.push(render_message(message));
        lines
    };

    if !group_by_date {
        return messages
            .iter()
            .enumerate()
            .flat_map(|(i, m)| lines_for(i, m))
            .collect();
    }

    let mut groups: BTreeMap<Option<NaiveDate>, Vec<String>> = BTreeMap::new();
    for (i, message) in messages.iter().enumerate() {
        groups.entry(message_date(message)).or_default().extend(lines_for(i, message));
    }

    let undated = groups.remove(&None);
    let mut out = Vec::new();
    for (date, lines) in groups.into_iter().rev() {
        let header = date.map_or_else(|| UNDATED_HEADER.to_string(), |d| date_header(d, today));
        out.push(format!("--- {} ---", header));
        out.extend(lines);
    }
    if let Some(lines) = undated {
        out.push(format!("--- {} ---", UNDATED_HEADER));
        out.extend(lines);
    }
    out
}
