//! Conversation normalization and analysis.
//!
//! Turns noisy, partially ordered message captures into a clean,
//! deduplicated, chronologically ordered conversation, reads it along
//! several independent signals, and reduces long conversations to a
//! bounded, relevance-ranked context.

pub mod analysis;
pub mod config;
pub mod context;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod selection;
pub mod topics;
pub mod types;
pub mod window;

// Re-export primary types for convenience
pub use analysis::{AnalysisResult, ConversationAnalyzer};
pub use config::{PipelineConfig, SameWeekdayPolicy};
pub use error::{PipelineError, Result};
pub use normalize::{SpeakerResolver, TimestampReconciler};
pub use pipeline::{parse_candidates, Conversation, ConversationPipeline, PipelineOutput, PipelineStats};
pub use selection::{SmartSelection, SmartSelector};
pub use topics::{KnowledgeBase, TopicAnalysis, TopicAnalyzer};
pub use types::{NormalizedMessage, RawMessageCandidate, TimestampHint};
pub use window::{select_window, ConversationWindow};
