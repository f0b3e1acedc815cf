pub mod cli;
pub mod config;
mod context;
mod engine;

pub use context::{AppContext, GatewayMode, JudgeMode};
pub use engine::{ReplyKind, TutorEngine, TutorReply};
