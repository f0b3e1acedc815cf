use crate::domain::AppError;
use crate::ports::{CompletionGateway, CompletionRequest};

/// Gateway that echoes the composed prompt instead of calling the service.
///
/// Used by `socra chat --dry-run` to inspect prompts offline.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunGateway;

impl CompletionGateway for DryRunGateway {
    fn generate(&self, request: &CompletionRequest) -> Result<String, AppError> {
        Ok(format!(
            "[dry-run] temperature={:.1} history={} turn(s)\n{}",
            request.temperature,
            request.history.len(),
            request.prompt
        ))
    }
}
