//! Completion service port definition.

use crate::domain::{AppError, Turn};

/// One request to the text-generation service.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// Instruction for the tutor message to generate.
    pub prompt: String,
    /// Prior conversation forwarded as context, oldest first.
    pub history: Vec<Turn>,
    /// Sampling temperature.
    pub temperature: f32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, temperature: f32) -> Self {
        Self { prompt: prompt.into(), history: Vec::new(), temperature }
    }

    pub fn with_history(mut self, history: Vec<Turn>) -> Self {
        self.history = history;
        self
    }
}

/// Port for the external text-generation service.
///
/// Implementations map transport failures to `GatewayUnavailable`,
/// `GatewayTimeout`, or `GatewayInvalidResponse`.
pub trait CompletionGateway: Send + Sync {
    fn generate(&self, request: &CompletionRequest) -> Result<String, AppError>;
}

impl<T: CompletionGateway + ?Sized> CompletionGateway for Box<T> {
    fn generate(&self, request: &CompletionRequest) -> Result<String, AppError> {
        (**self).generate(request)
    }
}

impl<T: CompletionGateway + ?Sized> CompletionGateway for std::sync::Arc<T> {
    fn generate(&self, request: &CompletionRequest) -> Result<String, AppError> {
        (**self).generate(request)
    }
}
