//! Topic Analyzer
//!
//! Knowledge-base driven reading of what a conversation is about: entities,
//! activities, the dominant context, how deep the exchange goes, and the
//! register it is written in. Everything is word/phrase matching against
//! an injected [`KnowledgeBase`]; vocabulary gaps degrade to a generic
//! summary instead of failing.

pub mod knowledge;

pub use knowledge::{ActivityPattern, ContextKind, KnowledgeBase};

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::analysis::text::{count_term, significant_words, word_count};
use crate::types::NormalizedMessage;

pub const GENERAL_SUMMARY: &str = "general conversation";

const MAX_PROPER_NOUNS: usize = 10;
const MAX_KEYWORDS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Depth {
    #[default]
    Surface,
    Medium,
    Deep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Register {
    Informal,
    #[default]
    Neutral,
    Formal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Entities {
    pub tools: Vec<String>,
    pub technologies: Vec<String>,
    pub people: Vec<String>,
    /// Capitalized words that do not open a sentence
    pub proper_nouns: Vec<String>,
}

impl Entities {
    fn known_count(&self) -> usize {
        self.tools.len() + self.technologies.len() + self.people.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityMatch {
    pub name: String,
    pub score: u32,
    pub context: ContextKind,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicAnalysis {
    pub summary: String,
    pub primary_context: Option<ContextKind>,
    pub context_scores: BTreeMap<ContextKind, u32>,
    pub entities: Entities,
    pub activities: Vec<ActivityMatch>,
    pub keywords: Vec<String>,
    pub depth: Depth,
    pub technical_density: f32,
    pub conversation_type: String,
    pub suggested_response: String,
    pub confidence: Confidence,
    pub register: Register,
}

impl Default for TopicAnalysis {
    fn default() -> Self {
        Self {
            summary: GENERAL_SUMMARY.to_string(),
            primary_context: None,
            context_scores: BTreeMap::new(),
            entities: Entities::default(),
            activities: Vec::new(),
            keywords: Vec::new(),
            depth: Depth::Surface,
            technical_density: 0.0,
            conversation_type: "casual".to_string(),
            suggested_response: "conversational".to_string(),
            confidence: Confidence::Low,
            register: Register::Neutral,
        }
    }
}

/// Stateless analyzer over a shared knowledge base.
#[derive(Debug, Clone, Default)]
pub struct TopicAnalyzer {
    knowledge: Arc<KnowledgeBase>,
}

impl TopicAnalyzer {
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        if knowledge.is_normalized() {
            return Self { knowledge };
        }
        tracing::debug!("[Topics] Normalizing knowledge base terms");
        Self {
            knowledge: Arc::new(knowledge.as_ref().clone().normalized()),
        }
    }

    pub fn knowledge(&self) -> &Arc<KnowledgeBase> {
        &self.knowledge
    }

    pub fn analyze(&self, messages: &[NormalizedMessage]) -> TopicAnalysis {
        if messages.is_empty() {
            return TopicAnalysis::default();
        }

        let kb = self.knowledge.as_ref();
        let lowered: Vec<String> = messages.iter().map(|m| m.text.to_lowercase()).collect();
        let occurrences = |term: &str| -> usize { lowered.iter().map(|t| count_term(t, term)).sum() };

        // Entities
        let present = |list: &[String]| -> Vec<String> {
            list.iter().filter(|t| occurrences(t) > 0).cloned().collect()
        };
        let mut entities = Entities {
            tools: present(&kb.tools),
            technologies: present(&kb.technologies),
            people: present(&kb.people),
            proper_nouns: Vec::new(),
        };
        let known: BTreeSet<String> = entities
            .tools
            .iter()
            .chain(&entities.technologies)
            .chain(&entities.people)
            .cloned()
            .collect();
        entities.proper_nouns = proper_nouns(messages, &known);

        // Activities: keyword +2, indicator +1
        let mut activities: Vec<ActivityMatch> = kb
            .activities
            .iter()
            .map(|pattern| {
                let keyword_hits = pattern.keywords.iter().filter(|k| occurrences(k) > 0).count();
                let indicator_hits = pattern.indicators.iter().filter(|k| occurrences(k) > 0).count();
                ActivityMatch {
                    name: pattern.name.clone(),
                    score: (keyword_hits * 2 + indicator_hits) as u32,
                    context: pattern.context,
                    description: pattern.description.clone(),
                }
            })
            .filter(|a| a.score > 0)
            .collect();
        activities.sort_by(|a, b| b.score.cmp(&a.score));

        // Contexts: keyword occurrences plus one per matched activity
        let context_scores: BTreeMap<ContextKind, u32> = ContextKind::ALL
            .iter()
            .map(|kind| {
                let keyword_score: usize = kb
                    .contexts
                    .get(kind)
                    .map(|terms| terms.iter().map(|t| occurrences(t)).sum())
                    .unwrap_or(0);
                let activity_score = activities.iter().filter(|a| a.context == *kind).count();
                (*kind, (keyword_score + activity_score) as u32)
            })
            .filter(|(_, score)| *score > 0)
            .collect();
        let primary_context = ContextKind::ALL
            .iter()
            .copied()
            .filter_map(|kind| context_scores.get(&kind).map(|score| (kind, *score)))
            .fold(None, |best: Option<(ContextKind, u32)>, (kind, score)| match best {
                Some((_, top)) if top >= score => best,
                _ => Some((kind, score)),
            });

        // Depth
        let total_words: usize = messages.iter().map(|m| word_count(&m.text)).sum();
        let technical_terms: usize = kb.tools.iter().chain(&kb.technologies).map(|t| occurrences(t)).sum();
        let technical_density = if total_words == 0 {
            0.0
        } else {
            technical_terms as f32 / total_words as f32
        };
        let average_words = total_words as f32 / messages.len() as f32;
        let depth = if average_words >= 15.0 || technical_density >= 0.08 {
            Depth::Deep
        } else if average_words >= 7.0 || technical_density >= 0.03 {
            Depth::Medium
        } else {
            Depth::Surface
        };

        let keywords = top_keywords(messages);
        let register = self.register(&occurrences);

        let knowledge_gap = entities.known_count() == 0 && activities.is_empty() && context_scores.is_empty();
        if knowledge_gap {
            tracing::debug!(messages = messages.len(), "[Topics] No knowledge base match, using generic summary");
            return TopicAnalysis {
                entities,
                keywords,
                depth,
                technical_density,
                register,
                ..TopicAnalysis::default()
            };
        }

        let summary = summarize(primary_context.map(|(k, _)| k), &activities, &entities, &keywords, depth);
        let signal = primary_context.map_or(0, |(_, s)| s) + activities.first().map_or(0, |a| a.score);
        let confidence = if signal >= 6 {
            Confidence::High
        } else if signal >= 2 {
            Confidence::Medium
        } else {
            Confidence::Low
        };

        let (conversation_type, suggested_response) = match primary_context {
            Some((kind, _)) => (kind.conversation_type().to_string(), kind.response_category().to_string()),
            None => ("casual".to_string(), "conversational".to_string()),
        };

        TopicAnalysis {
            summary,
            primary_context: primary_context.map(|(k, _)| k),
            context_scores,
            entities,
            activities,
            keywords,
            depth,
            technical_density,
            conversation_type,
            suggested_response,
            confidence,
            register,
        }
    }

    fn register(&self, occurrences: &dyn Fn(&str) -> usize) -> Register {
        let informal: usize = self.knowledge.informal_markers.iter().map(|m| occurrences(m)).sum();
        let formal: usize = self.knowledge.formal_markers.iter().map(|m| occurrences(m)).sum();
        match informal.cmp(&formal) {
            std::cmp::Ordering::Greater => Register::Informal,
            std::cmp::Ordering::Less => Register::Formal,
            std::cmp::Ordering::Equal => Register::Neutral,
        }
    }
}

/// Capitalized words that are not the first word of a sentence, skipping
/// ALL-CAPS shouting and anything the knowledge base already named.
fn proper_nouns(messages: &[NormalizedMessage], known: &BTreeSet<String>) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();

    for message in messages {
        for sentence in message.text.split(['.', '!', '?', '\n']) {
            for word in sentence.split_whitespace().skip(1) {
                let clean = word.trim_matches(|c: char| !c.is_alphanumeric());
                let capitalized = clean.chars().next().is_some_and(char::is_uppercase);
                if clean.chars().count() > 2
                    && capitalized
                    && !clean.chars().all(|c| !c.is_lowercase())
                    && clean.chars().all(char::is_alphabetic)
                    && !known.contains(&clean.to_lowercase())
                    && !found.iter().any(|f| f == clean)
                {
                    found.push(clean.to_string());
                }
            }
        }
    }

    found.truncate(MAX_PROPER_NOUNS);
    found
}

fn top_keywords(messages: &[NormalizedMessage]) -> Vec<String> {
    let counts = messages
        .iter()
        .flat_map(|m| significant_words(&m.text))
        .fold(BTreeMap::<String, usize>::new(), |mut acc, word| {
            *acc.entry(word).or_default() += 1;
            acc
        });
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().take(MAX_KEYWORDS).map(|(w, _)| w).collect()
}

fn summarize(
    context: Option<ContextKind>,
    activities: &[ActivityMatch],
    entities: &Entities,
    keywords: &[String],
    depth: Depth,
) -> String {
    let mut summary = context.map_or("conversation", |k| k.label()).to_string();

    let subject = activities
        .first()
        .map(|a| a.description.clone())
        .or_else(|| entities.tools.first().or(entities.technologies.first()).cloned())
        .or_else(|| keywords.first().cloned());
    if let Some(subject) = subject {
        summary.push_str(" about ");
        summary.push_str(&subject);
    }

    if depth != Depth::Surface {
        let participants: Vec<&str> = entities
            .proper_nouns
            .iter()
            .chain(&entities.people)
            .take(3)
            .map(String::as_str)
            .collect();
        if !participants.is_empty() {
            summary.push_str(" involving ");
            summary.push_str(&participants.join(", "));
        }
    }

    if depth == Depth::Deep && !keywords.is_empty() {
        summary.push_str(&format!(" (keywords: {})", keywords.iter().take(3).cloned().collect::<Vec<_>>().join(", ")));
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convo(lines: &[(&str, &str)]) -> Vec<NormalizedMessage> {
        lines
            .iter()
            .enumerate()
            .map(|(i, (speaker, text))| NormalizedMessage::new(i, *speaker, *text, *speaker == "You", None))
            .collect()
    }

    fn analyzer() -> TopicAnalyzer {
        TopicAnalyzer::new(Arc::new(KnowledgeBase::builtin()))
    }

    #[test]
    fn test_empty_window_is_generic() {
        let analysis = analyzer().analyze(&[]);
        assert_eq!(analysis, TopicAnalysis::default());
        assert_eq!(analysis.summary, GENERAL_SUMMARY);
    }

    #[test]
    fn test_lunch_plans_are_social() {
        let analysis = analyzer().analyze(&convo(&[
            ("Friend", "Hey, what are you up to?"),
            ("You", "Just working"),
            ("Friend", "Cool, lunch later?"),
            ("You", "Sure, what time?"),
            ("Friend", "How about 12:30?"),
        ]));
        assert_eq!(analysis.primary_context, Some(ContextKind::Social));
        assert_eq!(analysis.activities[0].name, "meal_plans");
        assert_eq!(analysis.activities[0].score, 4);
        assert!(analysis.summary.starts_with("social chat about making meal plans"));
        assert_eq!(analysis.conversation_type, "social");
        assert_eq!(analysis.suggested_response, "friendly");
        assert_eq!(analysis.depth, Depth::Surface);
    }

    #[test]
    fn test_knowledge_gap_degrades_to_general() {
        let analysis = analyzer().analyze(&convo(&[("Friend", "zzz qqq"), ("You", "hmm")]));
        assert_eq!(analysis.summary, GENERAL_SUMMARY);
        assert_eq!(analysis.confidence, Confidence::Low);
        assert!(analysis.primary_context.is_none());

        let empty_kb = TopicAnalyzer::new(Arc::new(KnowledgeBase::empty()));
        let analysis = empty_kb.analyze(&convo(&[("Friend", "lunch at noon with my boss?")]));
        assert_eq!(analysis.summary, GENERAL_SUMMARY);
    }

    #[test]
    fn test_mixed_case_knowledge_terms_match() {
        let kb = KnowledgeBase {
            tools: vec!["GitHub".to_string(), " Figma ".to_string()],
            contexts: BTreeMap::from([(ContextKind::Technical, vec!["Pull Request".to_string()])]),
            ..KnowledgeBase::empty()
        };
        assert!(!kb.is_normalized());

        let analysis = TopicAnalyzer::new(Arc::new(kb)).analyze(&convo(&[
            ("Friend", "left a comment on your pull request"),
            ("You", "thanks, pushing the fix to github and figma now"),
        ]));
        assert_eq!(analysis.entities.tools, vec!["github".to_string(), "figma".to_string()]);
        assert_eq!(analysis.primary_context, Some(ContextKind::Technical));
    }

    #[test]
    fn test_technical_density_deepens_analysis() {
        let analysis = analyzer().analyze(&convo(&[
            ("Friend", "the api server keeps throwing an error after the docker build"),
            ("You", "did you check the logs? maybe the database migration broke it"),
            ("Friend", "yeah, I pushed a fix to github, redeploying now"),
        ]));
        assert_eq!(analysis.primary_context, Some(ContextKind::Technical));
        assert_eq!(analysis.depth, Depth::Deep);
        assert!(analysis.entities.technologies.contains(&"docker".to_string()));
        assert!(analysis.entities.tools.contains(&"github".to_string()));
        assert_eq!(analysis.activities[0].name, "debugging");
        assert_eq!(analysis.confidence, Confidence::High);
        assert!(analysis.summary.contains("(keywords:"));
    }

    #[test]
    fn test_proper_nouns_skip_sentence_starts() {
        let nouns = proper_nouns(
            &convo(&[("Friend", "Sam said we should meet Priya at Starbucks. Tomorrow works, ASAP if possible")]),
            &BTreeSet::new(),
        );
        assert_eq!(nouns, vec!["Priya".to_string(), "Starbucks".to_string()]);
    }

    #[test]
    fn test_register_follows_markers() {
        let casual = analyzer().analyze(&convo(&[("Friend", "lol bro idk")]));
        assert_eq!(casual.register, Register::Informal);
        let formal = analyzer().analyze(&convo(&[("Friend", "Dear team, kindly review. Regards")]));
        assert_eq!(formal.register, Register::Formal);
    }
}
