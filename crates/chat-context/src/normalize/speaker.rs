//! Speaker resolution
//!
//! Maps whatever speaker evidence the collector captured (a name, an
//! explicit direction flag, a layout class) to a canonical speaker and an
//! outgoing flag. Each policy is a pure resolver; the first one that returns
//! `Some` wins and the unknown-speaker default catches everything else.

use lru::LruCache;
use parking_lot::Mutex;
use regex::Regex;
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::sync::LazyLock;

use super::text::clean_text;
use crate::config::SpeakerConfig;
use crate::types::RawMessageCandidate;

static BRACKETED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]").expect("bracketed regex is valid"));
static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d{1,2}[:.]\d{2}(?::\d{2})?(?:\s*[ap]\.?\s*m\b\.?)?")
        .expect("time regex is valid")
});
static DELIVERY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:delivered|read|seen|sent|edited)\b").expect("delivery regex is valid")
});

const OUTGOING_LAYOUT_TOKENS: &[&str] = &["out", "outgoing", "sent", "own", "self", "mine", "right", "me"];
const INCOMING_LAYOUT_TOKENS: &[&str] = &["in", "incoming", "received", "other", "left", "them"];

/// Raw speaker evidence for one record.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpeakerHints<'a> {
    pub name: Option<&'a str>,
    pub outgoing: Option<bool>,
    pub layout: Option<&'a str>,
}

impl<'a> SpeakerHints<'a> {
    pub fn from_candidate(candidate: &'a RawMessageCandidate) -> Self {
        Self {
            name: candidate.speaker_hint.as_deref(),
            outgoing: candidate.is_outgoing_hint,
            layout: candidate.layout_hint.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSpeaker {
    pub speaker: String,
    pub is_outgoing: bool,
}

/// Resolution policies, tried in list order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeakerStrategy {
    StructuralHint,
    SenderName,
    LayoutHint,
}

const DEFAULT_ORDER: [SpeakerStrategy; 3] = [
    SpeakerStrategy::StructuralHint,
    SpeakerStrategy::SenderName,
    SpeakerStrategy::LayoutHint,
];

/// Everything a resolver may look at, with the name already sanitized.
struct Evidence<'a> {
    name: Option<String>,
    outgoing: Option<bool>,
    layout: Option<&'a str>,
    current_user: &'a str,
    unknown: &'a str,
    is_self_name: bool,
}

type Resolver = fn(&Evidence) -> Option<ResolvedSpeaker>;

impl SpeakerStrategy {
    fn resolver(self) -> Resolver {
        match self {
            SpeakerStrategy::StructuralHint => resolve_structural,
            SpeakerStrategy::SenderName => resolve_sender_name,
            SpeakerStrategy::LayoutHint => resolve_layout,
        }
    }
}

fn own(ev: &Evidence) -> ResolvedSpeaker {
    ResolvedSpeaker {
        speaker: ev.current_user.to_string(),
        is_outgoing: true,
    }
}

fn resolve_structural(ev: &Evidence) -> Option<ResolvedSpeaker> {
    match ev.outgoing? {
        true => Some(own(ev)),
        false => {
            let speaker = match &ev.name {
                Some(name) if !ev.is_self_name => name.clone(),
                _ => ev.unknown.to_string(),
            };
            Some(ResolvedSpeaker {
                speaker,
                is_outgoing: false,
            })
        }
    }
}

fn resolve_sender_name(ev: &Evidence) -> Option<ResolvedSpeaker> {
    let name = ev.name.as_ref()?;
    if ev.is_self_name {
        return Some(own(ev));
    }
    Some(ResolvedSpeaker {
        speaker: name.clone(),
        is_outgoing: false,
    })
}

fn resolve_layout(ev: &Evidence) -> Option<ResolvedSpeaker> {
    let layout = ev.layout?.to_lowercase();
    let tokens: Vec<&str> = layout
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    if tokens.iter().any(|t| OUTGOING_LAYOUT_TOKENS.contains(t)) {
        return Some(own(ev));
    }
    if tokens.iter().any(|t| INCOMING_LAYOUT_TOKENS.contains(t)) {
        return Some(ResolvedSpeaker {
            speaker: ev.unknown.to_string(),
            is_outgoing: false,
        });
    }
    None
}

/// Remove timestamps, delivery-state tokens, bracketed noise, contact
/// markers and trailing colons from a candidate name.
pub fn sanitize_name(raw: &str) -> String {
    let stripped = BRACKETED_RE.replace_all(raw, " ");
    let stripped = TIME_RE.replace_all(&stripped, " ");
    let stripped = DELIVERY_RE.replace_all(&stripped, " ");
    let cleaned = clean_text(&stripped).replace('\n', " ");

    cleaned
        .trim_start_matches(|c: char| c == '~' || c.is_whitespace())
        .trim_end_matches(|c: char| matches!(c, ':' | '-' | ',' | '•' | '·') || c.is_whitespace())
        .trim()
        .to_string()
}

pub struct SpeakerResolver {
    current_user_label: String,
    unknown_label: String,
    self_synonyms: HashSet<String>,
    order: Vec<SpeakerStrategy>,
    // raw hint -> sanitized name; safe to drop at any time
    name_cache: Mutex<LruCache<String, String>>,
}

impl SpeakerResolver {
    pub fn new(config: &SpeakerConfig) -> Self {
        let capacity = NonZeroUsize::new(config.alias_cache_size.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            current_user_label: config.current_user_label.clone(),
            unknown_label: config.unknown_label.clone(),
            self_synonyms: config
                .self_synonyms
                .iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            order: DEFAULT_ORDER.to_vec(),
            name_cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Replace the policy order. The unknown-speaker default always runs last.
    pub fn with_strategy_order(mut self, order: Vec<SpeakerStrategy>) -> Self {
        self.order = order;
        self
    }

    pub fn current_user_label(&self) -> &str {
        &self.current_user_label
    }

    pub fn unknown_label(&self) -> &str {
        &self.unknown_label
    }

    /// Resolve one record. `display_name` is the local user's real name when
    /// the caller detected one; it replaces the configured label and is also
    /// treated as a self synonym.
    pub fn resolve(&self, hints: &SpeakerHints, display_name: Option<&str>) -> ResolvedSpeaker {
        let current_user = display_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(self.current_user_label.as_str());

        let name = hints
            .name
            .map(|raw| self.sanitized(raw))
            .filter(|n| !n.is_empty());
        let is_self_name = name
            .as_deref()
            .map(|n| self.is_self(n, current_user))
            .unwrap_or(false);

        let evidence = Evidence {
            name,
            outgoing: hints.outgoing,
            layout: hints.layout,
            current_user,
            unknown: &self.unknown_label,
            is_self_name,
        };

        for strategy in &self.order {
            if let Some(resolved) = (strategy.resolver())(&evidence) {
                tracing::trace!(?strategy, speaker = %resolved.speaker, "[SpeakerResolver] Resolved");
                return resolved;
            }
        }

        ResolvedSpeaker {
            speaker: self.unknown_label.clone(),
            is_outgoing: false,
        }
    }

    pub fn is_self(&self, name: &str, current_user: &str) -> bool {
        let lower = name.trim().to_lowercase();
        self.self_synonyms.contains(&lower)
            || lower == current_user.trim().to_lowercase()
            || lower == self.current_user_label.to_lowercase()
    }

    fn sanitized(&self, raw: &str) -> String {
        if let Some(hit) = self.name_cache.lock().get(raw) {
            return hit.clone();
        }
        let clean = sanitize_name(raw);
        self.name_cache.lock().put(raw.to_string(), clean.clone());
        clean
    }

    pub fn clear_cache(&self) {
        self.name_cache.lock().clear();
    }

    pub fn cached_names(&self) -> usize {
        self.name_cache.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> SpeakerResolver {
        SpeakerResolver::new(&SpeakerConfig::default())
    }

    fn hints<'a>(name: Option<&'a str>, outgoing: Option<bool>, layout: Option<&'a str>) -> SpeakerHints<'a> {
        SpeakerHints { name, outgoing, layout }
    }

    #[test]
    fn test_sanitize_strips_noise() {
        assert_eq!(sanitize_name("Alice:"), "Alice");
        assert_eq!(sanitize_name("[10:42, 12/03/2024] Bob Smith:"), "Bob Smith");
        assert_eq!(sanitize_name("Carol 9:15 PM Seen"), "Carol");
        assert_eq!(sanitize_name("~ Dave"), "Dave");
        assert_eq!(sanitize_name("Delivered"), "");
    }

    #[test]
    fn test_structural_hint_wins() {
        let r = resolver();
        let out = r.resolve(&hints(Some("Alice"), Some(true), None), None);
        assert_eq!(out, ResolvedSpeaker { speaker: "You".into(), is_outgoing: true });

        let incoming = r.resolve(&hints(Some("Alice"), Some(false), Some("message-out")), None);
        assert_eq!(incoming.speaker, "Alice");
        assert!(!incoming.is_outgoing);
    }

    #[test]
    fn test_self_synonyms_force_outgoing() {
        let r = resolver();
        for name in ["You", "me", "ME:", "Tú"] {
            let resolved = r.resolve(&hints(Some(name), None, None), None);
            assert!(resolved.is_outgoing, "{} should resolve to self", name);
            assert_eq!(resolved.speaker, "You");
        }
    }

    #[test]
    fn test_names_that_look_like_pronouns_stay_contacts() {
        let r = resolver();
        for name in ["Mai", "Io", "Yo", "Du"] {
            let resolved = r.resolve(&hints(Some(name), None, None), None);
            assert_eq!(resolved, ResolvedSpeaker { speaker: name.into(), is_outgoing: false });
        }
    }

    #[test]
    fn test_display_name_replaces_label() {
        let r = resolver();
        let resolved = r.resolve(&hints(Some("Priya Sharma"), None, None), Some("Priya Sharma"));
        assert_eq!(resolved, ResolvedSpeaker { speaker: "Priya Sharma".into(), is_outgoing: true });

        let synonym = r.resolve(&hints(Some("You"), None, None), Some("Priya Sharma"));
        assert_eq!(synonym.speaker, "Priya Sharma");
    }

    #[test]
    fn test_layout_fallback_and_default() {
        let r = resolver();
        assert!(r.resolve(&hints(None, None, Some("message-out focusable")), None).is_outgoing);

        let incoming = r.resolve(&hints(None, None, Some("message-in")), None);
        assert_eq!(incoming.speaker, "Other");
        assert!(!incoming.is_outgoing);

        let nothing = r.resolve(&hints(Some("  Seen "), None, Some("bubble")), None);
        assert_eq!(nothing, ResolvedSpeaker { speaker: "Other".into(), is_outgoing: false });
    }

    #[test]
    fn test_strategy_order_is_reorderable() {
        let r = resolver().with_strategy_order(vec![SpeakerStrategy::LayoutHint, SpeakerStrategy::SenderName]);
        let resolved = r.resolve(&hints(Some("Alice"), None, Some("message-out")), None);
        assert!(resolved.is_outgoing);
    }

    #[test]
    fn test_cache_is_discardable() {
        let r = resolver();
        let first = r.resolve(&hints(Some("Alice:"), None, None), None);
        assert_eq!(r.cached_names(), 1);
        r.clear_cache();
        assert_eq!(r.cached_names(), 0);
        let second = r.resolve(&hints(Some("Alice:"), None, None), None);
        assert_eq!(first, second);
    }
}
