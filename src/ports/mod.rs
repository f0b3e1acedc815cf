mod bank_source;
mod completion_gateway;
mod session_store;

pub use bank_source::BankSource;
pub use completion_gateway::{CompletionGateway, CompletionRequest};
pub use session_store::{SessionHandle, SessionStore};
