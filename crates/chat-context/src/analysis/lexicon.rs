//! Keyword tables behind the conversation classifiers.
//!
//! Weighted tables (urgency, sentiment) are only defaults: `KeywordWeights`
//! in the config carries the live copy so callers can tune them.

/// Names that always refer to the local user. Short romanized pronouns that
/// double as contact names ("Mai", "Io", "Yo") stay out.
pub const SELF_SYNONYMS: &[&str] = &[
    "you", "me", "myself", "tú", "usted", "vous", "toi", "moi", "ich", "você", "मैं", "आप", "我",
    "あなた", "나",
];

pub const URGENCY_TERMS: &[(&str, f32)] = &[
    ("urgent", 3.0),
    ("urgently", 3.0),
    ("emergency", 4.0),
    ("asap", 3.0),
    ("immediately", 3.0),
    ("right now", 2.0),
    ("right away", 2.0),
    ("hurry", 2.0),
    ("quick", 1.0),
    ("quickly", 1.5),
    ("deadline", 2.0),
    ("important", 1.5),
    ("help", 1.0),
    ("call me", 2.0),
    ("pick up", 1.5),
    ("where are you", 1.5),
    ("now", 0.5),
    ("jaldi", 2.0),
    ("abhi", 1.0),
];

pub const POSITIVE_TERMS: &[(&str, f32)] = &[
    ("love", 1.5),
    ("great", 1.0),
    ("awesome", 1.5),
    ("amazing", 1.5),
    ("good", 0.5),
    ("nice", 1.0),
    ("cool", 0.5),
    ("happy", 1.0),
    ("glad", 1.0),
    ("thanks", 1.0),
    ("thank you", 1.0),
    ("perfect", 1.5),
    ("excited", 1.5),
    ("fun", 1.0),
    ("yay", 1.5),
    ("wonderful", 1.5),
    ("congrats", 1.5),
    ("congratulations", 1.5),
    ("haha", 0.5),
    ("lol", 0.5),
    ("mast", 1.0),
    ("badhiya", 1.0),
    ("😊", 1.0),
    ("😀", 1.0),
    ("😄", 1.0),
    ("😍", 1.5),
    ("❤️", 1.5),
    ("❤", 1.5),
    ("👍", 0.5),
    ("🎉", 1.5),
    ("😂", 0.5),
];

pub const NEGATIVE_TERMS: &[(&str, f32)] = &[
    ("sad", 1.5),
    ("angry", 1.5),
    ("upset", 1.5),
    ("hate", 1.5),
    ("annoyed", 1.0),
    ("annoying", 1.0),
    ("terrible", 1.5),
    ("awful", 1.5),
    ("bad", 0.5),
    ("worst", 1.5),
    ("sorry", 0.5),
    ("tired", 0.5),
    ("frustrated", 1.5),
    ("disappointed", 1.5),
    ("worried", 1.0),
    ("stressed", 1.0),
    ("sucks", 1.0),
    ("ugh", 1.0),
    ("cancel", 0.5),
    ("bakwas", 1.0),
    ("😢", 1.5),
    ("😭", 1.5),
    ("😡", 1.5),
    ("😠", 1.5),
    ("😞", 1.0),
    ("💔", 1.5),
];

/// Leading words that make a sentence a question even without a `?`.
pub const QUESTION_STARTERS: &[&str] = &[
    "what", "when", "where", "who", "whom", "whose", "why", "how", "which", "kya", "kab", "kahan",
    "kaise", "kyun", "kaun",
];

pub const EMOTION_LEXICON: &[(&str, &[&str])] = &[
    ("happy", &["happy", "glad", "great", "haha", "lol", "yay", "nice", "good news", "😊", "😀", "😄", "🙂"]),
    ("excited", &["excited", "can't wait", "cant wait", "omg", "awesome", "amazing", "woohoo", "🎉", "🤩", "🔥"]),
    ("sad", &["sad", "miss", "cry", "crying", "lonely", "depressed", "down", "heartbroken", "😢", "😭", "💔", "😞"]),
    ("angry", &["angry", "mad", "furious", "pissed", "hate", "wtf", "😡", "😠", "🤬"]),
    ("anxious", &["worried", "nervous", "anxious", "scared", "afraid", "stressed", "panic", "tension", "😟", "😰", "😬"]),
    ("frustrated", &["frustrated", "annoyed", "ugh", "seriously", "fed up", "sick of", "again?", "🙄", "😤"]),
    ("affectionate", &["love you", "miss you", "babe", "baby", "sweetheart", "darling", "hugs", "xoxo", "❤️", "❤", "😘", "🥰", "😍"]),
];

pub const TOPIC_KEYWORDS: &[(&str, &[&str])] = &[
    ("food", &["lunch", "dinner", "breakfast", "pizza", "restaurant", "eat", "cook", "coffee", "chai", "food", "hungry", "biryani"]),
    ("work", &["work", "office", "meeting", "boss", "project", "deadline", "client", "job", "interview", "shift"]),
    ("travel", &["trip", "flight", "travel", "vacation", "hotel", "airport", "train", "ticket", "visit", "holiday"]),
    ("plans", &["tomorrow", "tonight", "weekend", "later", "plan", "plans", "meet", "free", "schedule"]),
    ("technology", &["code", "app", "bug", "laptop", "phone", "software", "computer", "website", "server", "update"]),
    ("health", &["doctor", "sick", "fever", "gym", "workout", "hospital", "medicine", "headache", "health", "sleep"]),
    ("family", &["mom", "mum", "dad", "sister", "brother", "family", "parents", "kids", "wife", "husband", "mummy", "papa"]),
    ("money", &["money", "pay", "paid", "rent", "salary", "price", "cost", "bill", "bank", "loan", "budget"]),
    ("entertainment", &["movie", "show", "series", "netflix", "music", "song", "concert", "party", "game"]),
    ("sports", &["football", "cricket", "match", "score", "team", "tennis", "basketball", "running"]),
    ("education", &["exam", "class", "study", "college", "school", "assignment", "homework", "course", "lecture"]),
    ("shopping", &["buy", "order", "shop", "shopping", "amazon", "sale", "cart", "store"]),
];

pub const ABBREVIATIONS: &[&str] = &[
    "u", "ur", "r", "idk", "tbh", "brb", "btw", "lol", "lmao", "omg", "pls", "plz", "thx", "ty", "np",
    "imo", "imho", "gonna", "wanna", "gotta", "k", "kk", "ya", "ok", "nvm", "ttyl", "rn", "gn", "gm",
    "bc", "cuz", "tmrw", "yaar", "bro",
];

pub const FORMAL_MARKERS: &[&str] = &[
    "regards", "kindly", "please find", "dear", "sincerely", "thank you for", "would you be able",
    "at your earliest convenience", "i would like to", "please let me know", "best wishes",
];

/// Romanized Hindi words common in Hinglish chat.
pub const HINGLISH_MARKERS: &[&str] = &[
    "hai", "hain", "kya", "nahi", "nahin", "haan", "acha", "accha", "achha", "yaar", "kaise", "kaisa",
    "theek", "thik", "abhi", "kal", "mein", "tum", "tu", "aap", "kar", "karo", "raha", "rahi", "hoon",
    "hu", "bhai", "bas", "chal", "chalo", "matlab", "bohot", "bahut", "kuch", "sab", "mujhe", "tera",
    "mera", "kyun", "kab", "kahan", "pata", "arre", "arey", "ji",
];

pub const SPANISH_MARKERS: &[&str] = &[
    "hola", "que", "qué", "gracias", "pero", "está", "esta", "como", "cómo", "bien", "vamos", "donde",
    "dónde", "por", "favor", "nos", "vemos", "mañana", "sí", "claro",
];

pub const LAUGHTER: &[&str] = &["haha", "hahaha", "hehe", "lol", "lmao", "rofl", "😂", "🤣"];

/// Vocabulary that makes a message emotionally charged for relevance scoring.
pub const CHARGED_VOCABULARY: &[&str] = &[
    "love", "hate", "miss", "sorry", "angry", "upset", "sad", "happy", "excited", "worried", "scared",
    "hurt", "cry", "crying", "furious", "thank", "thanks", "amazing", "terrible", "feel", "feeling",
    "❤️", "❤", "😢", "😭", "😡", "😍", "🥰", "💔",
];

/// Everyday chat words that carry no topic; left out of topic-shift vocabularies.
pub const TOPIC_FILLER: &[&str] = &[
    "after", "again", "anyway", "anywhere", "before", "check", "everything", "first", "found", "give",
    "great", "i'll", "later", "let's", "look", "maybe", "nice", "fine", "same", "says", "send", "sent",
    "start", "thank", "thanks", "time", "today", "wait", "went",
];

pub const STOPWORDS: &[&str] = &[
    "the", "and", "that", "this", "with", "have", "from", "they", "what", "when", "where", "will",
    "would", "there", "their", "about", "just", "like", "your", "yours", "then", "than", "them",
    "were", "been", "into", "some", "very", "really", "okay", "yeah", "also", "only", "over", "much",
    "more", "most", "make", "made", "know", "think", "going", "want", "need", "could", "should",
    "which", "while", "here", "doesn't", "don't", "didn't", "can't", "it's", "i'm", "you're",
    "that's", "what's", "haha", "hahaha", "gonna", "wanna", "sure", "cool", "still", "even",
    "something", "anything", "does", "done", "well", "back", "good", "right", "come", "said",
];
