//! Session API: start, continue and end tutoring dialogues.

use std::sync::{Arc, MutexGuard};

use serde::Serialize;

use crate::domain::composer::SUMMARY_TEMPERATURE;
use crate::domain::{
    AppError, Concept, ConceptBank, ConclusionReason, DialoguePolicy, DialogueSession,
    DisciplineResolver, ExchangeKind, HintStyle, HistorySummary, KeyTermJudge,
    MisconceptionMatcher, PromptComposer, SessionId, SessionStatus, TemplateRenderer, Turn,
    TurnContext, TurnPlan, TurnPrompt, TutorConfig, UnderstandingJudge,
};
use crate::ports::{CompletionGateway, CompletionRequest, SessionStore};
use crate::services::InMemorySessionStore;

/// What the tutor did in response to one student message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplyKind {
    /// No concept matched yet; the tutor asked for more detail.
    Clarification,
    /// A Socratic question (1-based `number`), possibly re-asked with help.
    Question { number: usize, total: usize, hint: Option<HintStyle> },
    Concluded { reason: ConclusionReason },
    /// The session had concluded earlier; nothing changed.
    AlreadyConcluded,
}

/// Tutor response returned by the session API.
#[derive(Debug, Clone, Serialize)]
pub struct TutorReply {
    pub session_id: SessionId,
    pub message: String,
    pub kind: ReplyKind,
    pub status: SessionStatus,
    /// Current concept, if one has been matched.
    pub concept: Option<String>,
}

impl TutorReply {
    pub fn is_concluded(&self) -> bool {
        self.status == SessionStatus::Concluded
    }
}

/// Dialogue engine shared by every session.
///
/// Each turn runs under its session's lock: plan, call the gateway, then
/// commit. A failed gateway call leaves the session untouched.
pub struct TutorEngine<R: TemplateRenderer> {
    bank: Arc<ConceptBank>,
    resolver: DisciplineResolver,
    matcher: MisconceptionMatcher,
    policy: DialoguePolicy,
    composer: Arc<PromptComposer<R>>,
    gateway: Arc<dyn CompletionGateway>,
    judge: Arc<dyn UnderstandingJudge>,
    store: Arc<dyn SessionStore>,
    verbatim_turns: usize,
    summarize: bool,
}

impl<R: TemplateRenderer> TutorEngine<R> {
    pub fn new(
        config: &TutorConfig,
        bank: Arc<ConceptBank>,
        resolver: DisciplineResolver,
        composer: Arc<PromptComposer<R>>,
        gateway: Arc<dyn CompletionGateway>,
    ) -> Self {
        Self {
            bank,
            resolver,
            matcher: MisconceptionMatcher::new(config.engine.min_confidence),
            policy: DialoguePolicy::from(&config.engine),
            composer,
            gateway,
            judge: Arc::new(KeyTermJudge),
            store: Arc::new(InMemorySessionStore::new()),
            verbatim_turns: config.history.verbatim_turns.max(1),
            summarize: config.history.summarize,
        }
    }

    /// Replace the understanding heuristic.
    pub fn with_judge(mut self, judge: Arc<dyn UnderstandingJudge>) -> Self {
        self.judge = judge;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = store;
        self
    }

    pub fn bank(&self) -> &ConceptBank {
        &self.bank
    }

    pub fn resolver(&self) -> &DisciplineResolver {
        &self.resolver
    }

    /// Open a session and answer the student's first message.
    ///
    /// The session is registered only once the first turn succeeds, so a
    /// failed start leaves nothing behind and can simply be retried.
    pub fn start_session(&self, discipline: &str, first_message: &str) -> Result<TutorReply, AppError> {
        let profile = self.resolver.resolve(discipline);
        let mut session = DialogueSession::new(SessionId::generate(), profile);
        tracing::info!(
            session = %session.id(),
            discipline = %session.profile().display_name(),
            generic = session.profile().is_generic(),
            "starting session"
        );

        let reply = self.run_turn(&mut session, first_message)?;
        self.store.insert(session);
        Ok(reply)
    }

    /// Answer a student reply in an existing session.
    pub fn continue_session(&self, id: &SessionId, student_reply: &str) -> Result<TutorReply, AppError> {
        let handle = self.store.get(id).ok_or_else(|| AppError::SessionNotFound(id.to_string()))?;
        let mut session = lock(&handle, id)?;
        self.run_turn(&mut session, student_reply)
    }

    /// Forget a session. Later calls with its id fail with `SessionNotFound`.
    pub fn end_session(&self, id: &SessionId) -> Result<(), AppError> {
        self.store.remove(id).ok_or_else(|| AppError::SessionNotFound(id.to_string()))?;
        tracing::info!(session = %id, "session ended");
        Ok(())
    }

    /// Copy of a session's current state.
    pub fn session(&self, id: &SessionId) -> Result<DialogueSession, AppError> {
        let handle = self.store.get(id).ok_or_else(|| AppError::SessionNotFound(id.to_string()))?;
        let session = lock(&handle, id)?;
        Ok(session.clone())
    }

    pub fn active_sessions(&self) -> usize {
        self.store.len()
    }

    fn run_turn(&self, session: &mut DialogueSession, student_text: &str) -> Result<TutorReply, AppError> {
        let plan =
            self.policy.plan(session, student_text, &self.matcher, &self.bank, self.judge.as_ref())?;
        log_plan(session, &plan);

        let (message, summary) = self.tutor_message(session, student_text, &plan)?;

        let kind = match plan {
            TurnPlan::AlreadyConcluded => ReplyKind::AlreadyConcluded,
            _ => {
                let committed = session.apply(student_text, &plan, message.clone()).ok_or_else(|| {
                    AppError::InternalError(format!(
                        "planned turn {:?} does not fit session '{}'",
                        plan,
                        session.id()
                    ))
                })?;
                if let Some(summary) = summary {
                    session.record_summary(summary);
                }
                self.reply_kind(session, committed)
            }
        };

        if let ReplyKind::Concluded { reason } = kind {
            tracing::info!(session = %session.id(), ?reason, turns = session.turns(), "session concluded");
        }

        Ok(TutorReply {
            session_id: session.id().clone(),
            message,
            kind,
            status: session.status(),
            concept: session.concept().map(|concept| concept.name().to_string()),
        })
    }

    fn reply_kind(&self, session: &DialogueSession, committed: ExchangeKind) -> ReplyKind {
        match committed {
            ExchangeKind::Clarification => ReplyKind::Clarification,
            ExchangeKind::Question { index, hint } => ReplyKind::Question {
                number: index + 1,
                total: session.concept().map(|c| c.question_count()).unwrap_or(0),
                hint,
            },
            ExchangeKind::Conclusion { reason } => ReplyKind::Concluded { reason },
        }
    }

    /// Tutor text for `plan`, plus a history digest to commit with the turn.
    fn tutor_message(
        &self,
        session: &DialogueSession,
        student_text: &str,
        plan: &TurnPlan,
    ) -> Result<(String, Option<HistorySummary>), AppError> {
        let profile = session.profile();
        let current = session.concept().map(Arc::as_ref);

        match plan {
            TurnPlan::AlreadyConcluded => {
                let reason = session.conclusion().unwrap_or(ConclusionReason::StudentEnded);
                return Ok((self.composer.closing_message(profile, current, reason, true)?, None));
            }
            TurnPlan::Conclude(reason) if !plan.needs_completion() => {
                return Ok((self.composer.closing_message(profile, current, *reason, false)?, None));
            }
            _ => {}
        }

        let summary = self.refresh_summary(session)?;
        let digest = summary.as_ref().map(|summary| summary.text.as_str());

        let (prompt, temperature) = match plan {
            TurnPlan::Introduce { concept, .. } => {
                let opening = opening_text(session, student_text);
                let explanation = self.composer.compose(concept, profile, &opening)?;
                let turn = TurnPrompt::Introduce { explanation: &explanation, question_index: 0 };
                (self.render_turn(session, Some(concept.as_ref()), digest, &turn)?, turn.temperature())
            }
            TurnPlan::Clarify => {
                let turn = TurnPrompt::Clarify {
                    student_text,
                    candidates: self.bank.all().iter().map(|c| c.name().to_string()).collect(),
                };
                (self.render_turn(session, None, digest, &turn)?, turn.temperature())
            }
            TurnPlan::Reask { index, style } => {
                let turn = TurnPrompt::Reask { style: *style, question_index: *index, reply: student_text };
                (self.render_turn(session, current, digest, &turn)?, turn.temperature())
            }
            TurnPlan::Advance { next_index } => {
                let turn = TurnPrompt::Advance {
                    previous_index: session.cursor(),
                    reply: student_text,
                    next_index: *next_index,
                };
                (self.render_turn(session, current, digest, &turn)?, turn.temperature())
            }
            TurnPlan::Conclude(_) | TurnPlan::AlreadyConcluded => {
                let turn = TurnPrompt::WrapUp { last_index: session.cursor(), reply: student_text };
                (self.render_turn(session, current, digest, &turn)?, turn.temperature())
            }
        };

        let request = CompletionRequest::new(prompt, temperature).with_history(self.history_window(session));
        let message = self.gateway.generate(&request)?;
        Ok((message, summary))
    }

    /// Digest of the exchanges outside the verbatim window.
    ///
    /// The cached digest is reused while it still covers every omitted
    /// exchange; otherwise only the newly omitted exchanges are folded in.
    fn refresh_summary(&self, session: &DialogueSession) -> Result<Option<HistorySummary>, AppError> {
        let omitted = self.omitted_exchanges(session);
        if !self.summarize || omitted == 0 {
            return Ok(None);
        }

        let previous = session.history_summary();
        let covered = previous.map(|summary| summary.covered).unwrap_or(0);
        if covered >= omitted {
            return Ok(previous.cloned());
        }

        let prompt = self.composer.summary_prompt(
            session.profile(),
            session.concept().map(Arc::as_ref),
            previous.map(|summary| summary.text.as_str()),
            &session.history()[covered..omitted],
        )?;
        let text = self.gateway.generate(&CompletionRequest::new(prompt, SUMMARY_TEMPERATURE))?;
        tracing::debug!(session = %session.id(), covered = omitted, "summarized earlier exchanges");
        Ok(Some(HistorySummary { text: text.trim().to_string(), covered: omitted }))
    }

    fn omitted_exchanges(&self, session: &DialogueSession) -> usize {
        session.history().len().saturating_sub(self.verbatim_turns)
    }

    fn render_turn(
        &self,
        session: &DialogueSession,
        concept: Option<&Concept>,
        history_summary: Option<&str>,
        turn: &TurnPrompt<'_>,
    ) -> Result<String, AppError> {
        let ctx = TurnContext {
            profile: session.profile(),
            concept,
            omitted_exchanges: self.omitted_exchanges(session),
            history_summary,
        };
        self.composer.turn_prompt(ctx, turn)
    }

    /// Most recent exchanges, flattened to turns.
    fn history_window(&self, session: &DialogueSession) -> Vec<Turn> {
        let transcript = session.transcript();
        let keep = self.verbatim_turns.saturating_mul(2);
        transcript[transcript.len().saturating_sub(keep)..].to_vec()
    }
}

fn lock<'a>(
    handle: &'a std::sync::Mutex<DialogueSession>,
    id: &SessionId,
) -> Result<MutexGuard<'a, DialogueSession>, AppError> {
    handle.lock().map_err(|_| AppError::SessionPoisoned(id.to_string()))
}

fn opening_text(session: &DialogueSession, student_text: &str) -> String {
    session
        .unmatched_text()
        .iter()
        .map(String::as_str)
        .chain(std::iter::once(student_text))
        .collect::<Vec<_>>()
        .join(" ")
}

fn log_plan(session: &DialogueSession, plan: &TurnPlan) {
    match plan {
        TurnPlan::Introduce { concept, score } => {
            let pivot = session.concept().is_some();
            tracing::info!(session = %session.id(), concept = %concept.name(), score, pivot, "concept matched");
        }
        TurnPlan::Clarify => {
            tracing::debug!(session = %session.id(), "no confident match, asking for clarification");
        }
        TurnPlan::Reask { index, style } => {
            tracing::debug!(session = %session.id(), question = index + 1, ?style, "re-asking question");
        }
        TurnPlan::Advance { next_index } => {
            tracing::debug!(session = %session.id(), question = next_index + 1, "advancing");
        }
        TurnPlan::Conclude(_) | TurnPlan::AlreadyConcluded => {}
    }
}
