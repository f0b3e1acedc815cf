use std::path::Path;
use std::sync::Arc;

use crate::app::config::load_config;
use crate::app::engine::TutorEngine;
use crate::domain::{AppError, ConceptBank, DisciplineResolver, PromptComposer, TutorConfig};
use crate::ports::{BankSource, CompletionGateway};
use crate::services::{
    CompletionJudge, DryRunGateway, EmbeddedBankSource, EmbeddedPromptRenderer, FileBankSource,
    HttpCompletionGateway, RetryPolicy, RetryingCompletionGateway, builtin_discipline_rules,
};

/// How tutor messages are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatewayMode {
    /// Call the completion service.
    #[default]
    Live,
    /// Return the composed prompts instead of calling the service.
    DryRun,
}

/// Strategy for deciding whether a reply engages the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum JudgeMode {
    /// Look for the concept's key terms.
    #[default]
    KeyTerms,
    /// Ask the completion service for a yes/no verdict.
    Completion,
}

/// Application context holding the loaded configuration and shared assets.
pub struct AppContext {
    config: TutorConfig,
    bank: Arc<ConceptBank>,
    resolver: DisciplineResolver,
    composer: Arc<PromptComposer<EmbeddedPromptRenderer>>,
}

impl AppContext {
    /// Load configuration and the concept bank. Bank errors are fatal.
    pub fn load(config_path: Option<&Path>, bank_path: Option<&Path>, dir: &Path) -> Result<Self, AppError> {
        let config = load_config(config_path, dir)?;
        let bank = match bank_path {
            Some(path) => load_bank(&FileBankSource::new(path))?,
            None => load_bank(&EmbeddedBankSource)?,
        };
        Self::new(config, bank)
    }

    pub fn new(config: TutorConfig, bank: ConceptBank) -> Result<Self, AppError> {
        let rules = if config.disciplines.is_empty() {
            builtin_discipline_rules()?
        } else {
            config.disciplines.clone()
        };

        Ok(Self {
            config,
            bank: Arc::new(bank),
            resolver: DisciplineResolver::new(rules),
            composer: Arc::new(PromptComposer::new(EmbeddedPromptRenderer::new()?)),
        })
    }

    pub fn config(&self) -> &TutorConfig {
        &self.config
    }

    pub fn bank(&self) -> &ConceptBank {
        &self.bank
    }

    pub fn resolver(&self) -> &DisciplineResolver {
        &self.resolver
    }

    pub fn composer(&self) -> &PromptComposer<EmbeddedPromptRenderer> {
        &self.composer
    }

    /// Build an engine. Live mode needs an API key in the environment.
    pub fn engine(
        &self,
        mode: GatewayMode,
        judge: JudgeMode,
    ) -> Result<TutorEngine<EmbeddedPromptRenderer>, AppError> {
        let gateway: Arc<dyn CompletionGateway> = match mode {
            GatewayMode::DryRun => Arc::new(DryRunGateway),
            GatewayMode::Live => {
                let http = HttpCompletionGateway::from_env_with_config(&self.config.gateway)?;
                let policy = RetryPolicy::from_config(&self.config.gateway);
                tracing::debug!(
                    endpoint = %http.endpoint(),
                    max_attempts = policy.max_attempts(),
                    "using live completion gateway"
                );
                Arc::new(RetryingCompletionGateway::new(http, policy))
            }
        };
        Ok(self.engine_with_gateway(gateway, judge))
    }

    pub fn engine_with_gateway(
        &self,
        gateway: Arc<dyn CompletionGateway>,
        judge: JudgeMode,
    ) -> TutorEngine<EmbeddedPromptRenderer> {
        let engine = TutorEngine::new(
            &self.config,
            Arc::clone(&self.bank),
            self.resolver.clone(),
            Arc::clone(&self.composer),
            Arc::clone(&gateway),
        );
        match judge {
            JudgeMode::KeyTerms => engine,
            JudgeMode::Completion => {
                engine.with_judge(Arc::new(CompletionJudge::new(gateway, Arc::clone(&self.composer))))
            }
        }
    }
}

fn load_bank(source: &dyn BankSource) -> Result<ConceptBank, AppError> {
    let bank = ConceptBank::load(source)?;
    tracing::debug!(source = %source.describe(), concepts = bank.len(), "loaded concept bank");
    Ok(bank)
}
