//! socra: Socratic economics tutoring engine for STEM students.

pub mod app;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;

pub use app::{AppContext, GatewayMode, JudgeMode, ReplyKind, TutorEngine, TutorReply};
pub use domain::AppError;
