use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::analysis::lexicon;
use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PipelineConfig {
    pub window: WindowConfig,
    pub selection: SelectionConfig,
    pub speakers: SpeakerConfig,
    pub dates: DateConfig,
    pub dedup: DedupConfig,
    pub analysis: AnalysisConfig,
    pub keywords: KeywordWeights,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Hard cap applied before any soft trimming
    pub max_messages: usize,
    /// Upper bound on how far the backward scan may reach
    pub recent_window: usize,
    /// Windows at or below this size are never trimmed
    pub min_recent_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    /// Smart selection runs only when the window is larger than this
    pub trigger_threshold: usize,
    /// Total number of messages a selection may hold
    pub budget: usize,
    pub always_include_last: usize,
    pub relevance_threshold: f32,
    /// Messages per cluster for topic-change detection
    pub cluster_size: usize,
    /// A cluster sharing less than this share of its words with the current
    /// topic starts a new topic
    pub topic_similarity_floor: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeakerConfig {
    pub current_user_label: String,
    pub unknown_label: String,
    /// Names that always mean "the local user" (compared case-insensitively)
    pub self_synonyms: Vec<String>,
    pub alias_cache_size: usize,
}

/// How a weekday label that names today's weekday is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SameWeekdayPolicy {
    /// "Monday" seen on a Monday means last week's Monday
    #[default]
    SevenDaysPrior,
    /// "Monday" seen on a Monday means today
    SameDay,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DateConfig {
    pub same_weekday_policy: SameWeekdayPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DedupConfig {
    /// When set, same-key records whose known timestamps differ by more than
    /// this many seconds are kept as separate messages.
    pub time_tolerance_secs: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub rapid_pace_secs: f64,
    pub slow_pace_secs: f64,
    /// Dominance ratio needed for a positive or negative tone
    pub sentiment_ratio: f32,
    /// Share of question messages that makes a neutral conversation inquisitive
    pub question_ratio: f32,
    /// Number of trailing messages weighted fully for intent and urgency
    pub recent_focus: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordWeights {
    pub urgency: BTreeMap<String, f32>,
    pub positive: BTreeMap<String, f32>,
    pub negative: BTreeMap<String, f32>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            max_messages: 50,
            recent_window: 40,
            min_recent_count: 16,
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            trigger_threshold: 30,
            budget: 25,
            always_include_last: 5,
            relevance_threshold: 0.3,
            cluster_size: 5,
            topic_similarity_floor: 0.1,
        }
    }
}

impl Default for SpeakerConfig {
    fn default() -> Self {
        Self {
            current_user_label: "You".to_string(),
            unknown_label: "Other".to_string(),
            self_synonyms: lexicon::SELF_SYNONYMS.iter().map(|s| s.to_string()).collect(),
            alias_cache_size: 256,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            rapid_pace_secs: 90.0,
            slow_pace_secs: 600.0,
            sentiment_ratio: 1.5,
            question_ratio: 0.3,
            recent_focus: 5,
        }
    }
}

impl Default for KeywordWeights {
    fn default() -> Self {
        fn table(entries: &[(&str, f32)]) -> BTreeMap<String, f32> {
            entries.iter().map(|(k, w)| (k.to_string(), *w)).collect()
        }

        Self {
            urgency: table(lexicon::URGENCY_TERMS),
            positive: table(lexicon::POSITIVE_TERMS),
            negative: table(lexicon::NEGATIVE_TERMS),
        }
    }
}

impl KeywordWeights {
    /// Trim and lowercase every term so it matches lowercased message text.
    /// Blank terms are dropped; case variants of one term keep the larger weight.
    pub fn normalized(self) -> Self {
        fn fold(table: BTreeMap<String, f32>) -> BTreeMap<String, f32> {
            table.into_iter().fold(BTreeMap::new(), |mut acc, (term, weight)| {
                let term = term.trim().to_lowercase();
                if !term.is_empty() {
                    let slot = acc.entry(term).or_insert(weight);
                    *slot = slot.max(weight);
                }
                acc
            })
        }

        Self {
            urgency: fold(self.urgency),
            positive: fold(self.positive),
            negative: fold(self.negative),
        }
    }
}

impl PipelineConfig {
    /// Validate config values, returning errors for clearly broken configurations.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: &str| Err(PipelineError::InvalidConfig(msg.to_string()));

        if self.window.max_messages == 0 {
            return invalid("window.max_messages must be > 0");
        }
        if self.window.recent_window == 0 {
            return invalid("window.recent_window must be > 0");
        }
        if self.window.min_recent_count > self.window.recent_window {
            return invalid("window.min_recent_count must be <= recent_window");
        }
        if self.selection.budget == 0 {
            return invalid("selection.budget must be > 0");
        }
        if self.selection.always_include_last > self.selection.budget {
            return invalid("selection.always_include_last must be <= budget");
        }
        if self.selection.cluster_size == 0 {
            return invalid("selection.cluster_size must be > 0");
        }
        if !(0.0..=1.0).contains(&self.selection.relevance_threshold) {
            return invalid("selection.relevance_threshold must be in [0.0, 1.0]");
        }
        if !(0.0..=1.0).contains(&self.selection.topic_similarity_floor) {
            return invalid("selection.topic_similarity_floor must be in [0.0, 1.0]");
        }
        if self.speakers.current_user_label.trim().is_empty() {
            return invalid("speakers.current_user_label must not be empty");
        }
        if self.speakers.unknown_label.trim().is_empty() {
            return invalid("speakers.unknown_label must not be empty");
        }
        if self.analysis.rapid_pace_secs >= self.analysis.slow_pace_secs {
            return invalid("analysis.rapid_pace_secs must be < slow_pace_secs");
        }
        if self.analysis.sentiment_ratio < 1.0 {
            return invalid("analysis.sentiment_ratio must be >= 1.0");
        }
        if !(0.0..=1.0).contains(&self.analysis.question_ratio) {
            return invalid("analysis.question_ratio must be in [0.0, 1.0]");
        }
        if let Some(secs) = self.dedup.time_tolerance_secs {
            if secs < 0 {
                return invalid("dedup.time_tolerance_secs must be >= 0");
            }
        }
        Ok(())
    }

    /// Load config from a JSON file, falling back to defaults for missing fields.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window.max_messages, 50);
        assert_eq!(config.window.recent_window, 40);
        assert_eq!(config.window.min_recent_count, 16);
        assert_eq!(config.speakers.current_user_label, "You");
        assert!(config.keywords.urgency.contains_key("urgent"));
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"window": {"max_messages": 20}}"#).unwrap();
        assert_eq!(config.window.max_messages, 20);
        assert_eq!(config.window.recent_window, 40);
        assert_eq!(config.selection.budget, 25);
        assert_eq!(config.dates.same_weekday_policy, SameWeekdayPolicy::SevenDaysPrior);
    }

    #[test]
    fn test_rejects_broken_values() {
        let mut config = PipelineConfig::default();
        config.selection.always_include_last = 40;
        assert!(matches!(config.validate(), Err(PipelineError::InvalidConfig(_))));

        let mut config = PipelineConfig::default();
        config.window.min_recent_count = 45;
        assert!(config.validate().is_err());

        let mut config = PipelineConfig::default();
        config.selection.relevance_threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_weekday_policy_parses_snake_case() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"dates": {"same_weekday_policy": "same_day"}}"#).unwrap();
        assert_eq!(config.dates.same_weekday_policy, SameWeekdayPolicy::SameDay);
    }

    #[test]
    fn test_keyword_terms_are_normalized() {
        let mut keywords = KeywordWeights::default();
        keywords.urgency.insert("  Hospital ".to_string(), 5.0);
        keywords.urgency.insert("HURRY".to_string(), 4.0);
        keywords.positive.insert("   ".to_string(), 1.0);

        let keywords = keywords.normalized();
        assert_eq!(keywords.urgency.get("hospital"), Some(&5.0));
        assert_eq!(keywords.urgency.get("hurry"), Some(&4.0));
        assert!(!keywords.urgency.contains_key("HURRY"));
        assert!(keywords.positive.keys().all(|k| !k.trim().is_empty()));
    }
}
