//! Static vocabulary the topic analyzer matches against. Loaded once,
//! read-only afterwards, and shared between pipelines through an `Arc`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;

/// Broad setting a conversation belongs to. Declaration order breaks ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextKind {
    Technical,
    Social,
    Work,
    Emotional,
    Personal,
}

impl ContextKind {
    pub const ALL: [ContextKind; 5] = [
        ContextKind::Technical,
        ContextKind::Social,
        ContextKind::Work,
        ContextKind::Emotional,
        ContextKind::Personal,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ContextKind::Technical => "technical discussion",
            ContextKind::Social => "social chat",
            ContextKind::Work => "work coordination",
            ContextKind::Emotional => "emotional conversation",
            ContextKind::Personal => "personal update",
        }
    }

    pub fn conversation_type(&self) -> &'static str {
        match self {
            ContextKind::Technical => "technical",
            ContextKind::Social => "social",
            ContextKind::Work => "professional",
            ContextKind::Emotional => "supportive",
            ContextKind::Personal => "personal",
        }
    }

    pub fn response_category(&self) -> &'static str {
        match self {
            ContextKind::Technical => "informative",
            ContextKind::Social => "friendly",
            ContextKind::Work => "professional",
            ContextKind::Emotional => "empathetic",
            ContextKind::Personal => "warm",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPattern {
    pub name: String,
    /// Each matched keyword scores 2
    pub keywords: Vec<String>,
    /// Each matched indicator scores 1
    #[serde(default)]
    pub indicators: Vec<String>,
    pub context: ContextKind,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct KnowledgeBase {
    pub tools: Vec<String>,
    pub technologies: Vec<String>,
    pub people: Vec<String>,
    pub activities: Vec<ActivityPattern>,
    pub contexts: BTreeMap<ContextKind, Vec<String>>,
    pub informal_markers: Vec<String>,
    pub formal_markers: Vec<String>,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::builtin()
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn activity(name: &str, keywords: &[&str], indicators: &[&str], context: ContextKind, description: &str) -> ActivityPattern {
    ActivityPattern {
        name: name.to_string(),
        keywords: words(keywords),
        indicators: words(indicators),
        context,
        description: description.to_string(),
    }
}

impl KnowledgeBase {
    /// Knowledge base with no vocabulary at all; every analysis degrades to
    /// the generic summary.
    pub fn empty() -> Self {
        Self {
            tools: Vec::new(),
            technologies: Vec::new(),
            people: Vec::new(),
            activities: Vec::new(),
            contexts: BTreeMap::new(),
            informal_markers: Vec::new(),
            formal_markers: Vec::new(),
        }
    }

    pub fn builtin() -> Self {
        let contexts = BTreeMap::from([
            (
                ContextKind::Technical,
                words(&["code", "bug", "deploy", "server", "api", "database", "error", "build", "release", "python", "rust", "github", "laptop"]),
            ),
            (
                ContextKind::Social,
                words(&["party", "hangout", "lunch", "dinner", "drinks", "movie", "fun", "friends", "weekend", "haha", "lol", "coffee"]),
            ),
            (
                ContextKind::Work,
                words(&["meeting", "deadline", "project", "client", "boss", "office", "report", "presentation", "team", "manager"]),
            ),
            (
                ContextKind::Emotional,
                words(&["feel", "feeling", "sad", "happy", "love", "miss", "worried", "stressed", "upset", "sorry", "hurt", "lonely"]),
            ),
            (
                ContextKind::Personal,
                words(&["family", "mom", "dad", "home", "health", "doctor", "trip", "vacation", "birthday", "kids", "wedding"]),
            ),
        ]);

        Self {
            tools: words(&[
                "slack", "zoom", "teams", "whatsapp", "excel", "notion", "jira", "github", "figma", "trello",
                "google docs", "gmail", "spotify", "uber", "netflix",
            ]),
            technologies: words(&[
                "python", "rust", "javascript", "typescript", "react", "api", "database", "docker", "kubernetes",
                "aws", "machine learning", "ai", "server", "frontend", "backend", "linux", "sql",
            ]),
            people: words(&[
                "mom", "dad", "boss", "manager", "friend", "girlfriend", "boyfriend", "wife", "husband", "sister",
                "brother", "colleague", "client", "roommate", "teacher", "doctor",
            ]),
            activities: vec![
                activity("meal_plans", &["lunch", "dinner", "breakfast", "brunch", "coffee"], &["what time", "how about", "let's", "free", "grab"], ContextKind::Social, "making meal plans"),
                activity("meeting_scheduling", &["meeting", "call", "sync", "standup", "appointment"], &["schedule", "reschedule", "calendar", "tomorrow", "available"], ContextKind::Work, "scheduling a meeting"),
                activity("debugging", &["bug", "error", "crash", "fix", "broken"], &["stack trace", "logs", "deploy", "build", "code"], ContextKind::Technical, "troubleshooting a technical problem"),
                activity("travel_planning", &["trip", "flight", "hotel", "vacation", "travel"], &["book", "booking", "ticket", "itinerary", "packing"], ContextKind::Personal, "planning a trip"),
                activity("emotional_support", &["sad", "stressed", "worried", "upset", "lonely", "anxious"], &["talk", "feel", "sorry", "here for you", "hug"], ContextKind::Emotional, "offering or seeking emotional support"),
                activity("celebration", &["birthday", "party", "congrats", "congratulations", "anniversary", "promotion"], &["cake", "gift", "celebrate", "surprise"], ContextKind::Social, "celebrating an occasion"),
                activity("project_work", &["project", "deadline", "report", "presentation", "deliverable"], &["review", "submit", "draft", "client", "update"], ContextKind::Work, "coordinating project work"),
                activity("free_time", &["weekend", "movie", "concert", "game", "hangout"], &["tonight", "saturday", "sunday", "tickets", "join"], ContextKind::Social, "planning free time"),
                activity("health", &["doctor", "sick", "fever", "hospital", "medicine", "workout"], &["appointment", "feeling", "better", "rest"], ContextKind::Personal, "talking about health"),
            ],
            contexts,
            informal_markers: words(&["lol", "haha", "bro", "dude", "gonna", "wanna", "yaar", "omg", "btw", "idk", "lmao", "sup", "ya"]),
            formal_markers: words(&["regards", "kindly", "dear", "sincerely", "please find", "furthermore", "accordingly", "appreciate your"]),
        }
    }

    /// Load a knowledge base from JSON. Missing sections stay at the
    /// built-in vocabulary.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let kb = serde_json::from_str::<Self>(&content)?.normalized();
        tracing::debug!(
            activities = kb.activities.len(),
            contexts = kb.contexts.len(),
            "[Topics] Loaded knowledge base from {:?}",
            path
        );
        Ok(kb)
    }

    /// Trim and lowercase every term; matching runs against lowercased text.
    pub fn normalized(mut self) -> Self {
        for list in self.term_lists_mut() {
            *list = list
                .iter()
                .map(|term| term.trim().to_lowercase())
                .filter(|term| !term.is_empty())
                .collect();
        }
        self
    }

    pub fn is_normalized(&self) -> bool {
        let lists = [&self.tools, &self.technologies, &self.people, &self.informal_markers, &self.formal_markers];
        lists
            .into_iter()
            .chain(self.contexts.values())
            .chain(self.activities.iter().flat_map(|a| [&a.keywords, &a.indicators]))
            .flatten()
            .all(|term| !term.is_empty() && *term == term.trim().to_lowercase())
    }

    fn term_lists_mut(&mut self) -> Vec<&mut Vec<String>> {
        let mut lists = vec![
            &mut self.tools,
            &mut self.technologies,
            &mut self.people,
            &mut self.informal_markers,
            &mut self.formal_markers,
        ];
        lists.extend(self.contexts.values_mut());
        for activity in &mut self.activities {
            lists.push(&mut activity.keywords);
            lists.push(&mut activity.indicators);
        }
        lists
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_every_context() {
        let kb = KnowledgeBase::builtin();
        for kind in ContextKind::ALL {
            assert!(kb.contexts.get(&kind).is_some_and(|terms| !terms.is_empty()));
        }
        assert!(kb.activities.iter().any(|a| a.name == "meal_plans"));
    }

    #[test]
    fn test_partial_json_keeps_builtin_sections() {
        let json = r#"{
            "tools": ["blender"],
            "contexts": {"technical": ["shader", "render"]}
        }"#;
        let kb: KnowledgeBase = serde_json::from_str(json).unwrap();
        assert_eq!(kb.tools, vec!["blender".to_string()]);
        assert_eq!(kb.contexts.len(), 1);
        assert!(!kb.activities.is_empty());
        assert!(kb.people.contains(&"mom".to_string()));
    }

    #[test]
    fn test_activity_patterns_parse_camel_case() {
        let json = r#"{"activities": [{"name": "gardening", "keywords": ["plant"], "context": "personal", "description": "gardening"}]}"#;
        let kb: KnowledgeBase = serde_json::from_str(json).unwrap();
        assert_eq!(kb.activities[0].context, ContextKind::Personal);
        assert!(kb.activities[0].indicators.is_empty());
    }
}
