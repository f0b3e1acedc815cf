//! Understanding judge that asks the completion service for a yes/no verdict.

use std::sync::Arc;

use crate::domain::{AppError, Concept, PromptComposer, TemplateRenderer, UnderstandingJudge};
use crate::ports::{CompletionGateway, CompletionRequest};

const JUDGE_TEMPERATURE: f32 = 0.0;

pub struct CompletionJudge<R> {
    gateway: Arc<dyn CompletionGateway>,
    composer: Arc<PromptComposer<R>>,
}

impl<R: TemplateRenderer> CompletionJudge<R> {
    pub fn new(gateway: Arc<dyn CompletionGateway>, composer: Arc<PromptComposer<R>>) -> Self {
        Self { gateway, composer }
    }
}

impl<R: TemplateRenderer> UnderstandingJudge for CompletionJudge<R> {
    fn engages(&self, concept: &Concept, question: &str, reply: &str) -> Result<bool, AppError> {
        if reply.trim().is_empty() {
            return Ok(false);
        }
        let prompt = self.composer.judgement_prompt(concept, question, reply)?;
        let verdict = self.gateway.generate(&CompletionRequest::new(prompt, JUDGE_TEMPERATURE))?;
        parse_verdict(&verdict)
    }
}

fn parse_verdict(verdict: &str) -> Result<bool, AppError> {
    let word: String = verdict
        .trim_start()
        .chars()
        .take_while(|ch| ch.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_uppercase();
    match word.as_str() {
        "YES" => Ok(true),
        "NO" => Ok(false),
        _ => Err(AppError::GatewayInvalidResponse(format!(
            "expected YES or NO from judge, got '{}'",
            verdict.trim()
        ))),
    }
}
