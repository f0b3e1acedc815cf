mod bank_source;
mod completion_judge;
mod discipline_catalog;
mod dry_run_gateway;
mod gemini_gateway;
mod memory_session_store;
mod prompt_renderer;
mod retrying_gateway;

pub use bank_source::{EmbeddedBankSource, FileBankSource};
pub use completion_judge::CompletionJudge;
pub use discipline_catalog::builtin_discipline_rules;
pub use dry_run_gateway::DryRunGateway;
pub use gemini_gateway::HttpCompletionGateway;
pub use memory_session_store::InMemorySessionStore;
pub use prompt_renderer::EmbeddedPromptRenderer;
pub use retrying_gateway::{RetryPolicy, RetryingCompletionGateway};
