pub mod composer;
pub mod concept_bank;
pub mod config;
pub mod dialogue;
pub mod discipline;
pub mod error;
pub mod explanation;
pub mod matcher;
pub mod session;
mod text;
pub mod understanding;

pub use composer::{PromptComposer, TemplateRenderer, TurnContext, TurnPrompt};
pub use concept_bank::{Concept, ConceptBank, SectionNotes};
pub use config::{EngineConfig, GatewayConfig, HistoryConfig, TutorConfig};
pub use dialogue::DialoguePolicy;
pub use discipline::{DEFAULT_DISCIPLINE_LABEL, DisciplineProfile, DisciplineResolver, DisciplineRule};
pub use error::AppError;
pub use explanation::{Section, SectionKind, StructuredExplanation, WorkedExample};
pub use matcher::{ConceptMatch, MisconceptionMatcher};
pub use session::{
    ConclusionReason, DialogueSession, Exchange, ExchangeKind, HintStyle, HistorySummary, SessionId,
    SessionStatus, Speaker, Turn, TurnPlan,
};
pub use understanding::{KeyTermJudge, ReplyIntent, UnderstandingJudge, classify_reply};
