//! Turn planning: decides how a session reacts to a student reply.

use std::sync::Arc;

use crate::domain::config::MAX_HINT_RETRY_LIMIT;
use crate::domain::understanding::{ReplyIntent, classify_reply};
use crate::domain::{
    AppError, ConceptBank, ConclusionReason, DialogueSession, EngineConfig, HintStyle,
    MisconceptionMatcher, SessionStatus, TurnPlan, UnderstandingJudge,
};

/// Limits that bound a dialogue.
#[derive(Debug, Clone, Copy)]
pub struct DialoguePolicy {
    /// Re-asks allowed per question before advancing regardless.
    pub hint_retry_limit: u32,
    /// Student turns allowed before the session is concluded.
    pub max_turns: u32,
    /// Score another concept needs before a reply switches topics.
    pub pivot_confidence: f64,
}

impl From<&EngineConfig> for DialoguePolicy {
    fn from(config: &EngineConfig) -> Self {
        Self {
            hint_retry_limit: config.hint_retry_limit.min(MAX_HINT_RETRY_LIMIT),
            max_turns: config.max_turns,
            pivot_confidence: config.pivot_confidence,
        }
    }
}

impl DialoguePolicy {
    /// Choose the next transition for `reply`. Does not mutate the session.
    pub fn plan(
        &self,
        session: &DialogueSession,
        reply: &str,
        matcher: &MisconceptionMatcher,
        bank: &ConceptBank,
        judge: &dyn UnderstandingJudge,
    ) -> Result<TurnPlan, AppError> {
        if session.is_concluded() {
            return Ok(TurnPlan::AlreadyConcluded);
        }

        let intent = classify_reply(reply);
        if intent == ReplyIntent::Stop {
            return Ok(TurnPlan::Conclude(ConclusionReason::StudentEnded));
        }
        if session.turns().saturating_add(1) > self.max_turns {
            return Ok(TurnPlan::Conclude(ConclusionReason::TurnLimit));
        }

        let concept = match (session.status(), session.concept()) {
            (SessionStatus::AwaitingStudent, Some(concept)) => Arc::clone(concept),
            _ => return Self::plan_opening(session, reply, matcher, bank),
        };
        let question = session.current_question().unwrap_or_default();

        match intent {
            ReplyIntent::Help(style) => Ok(self.reask_or_advance(session, style)),
            ReplyIntent::Stop | ReplyIntent::Answer => {
                if judge.engages(&concept, question, reply)? {
                    return Ok(Self::advance(session));
                }
                if let Some(plan) = self.pivot(&concept, reply, matcher, bank) {
                    return Ok(plan);
                }
                Ok(self.reask_or_advance(session, HintStyle::Hint))
            }
        }
    }

    fn plan_opening(
        session: &DialogueSession,
        reply: &str,
        matcher: &MisconceptionMatcher,
        bank: &ConceptBank,
    ) -> Result<TurnPlan, AppError> {
        let mut text = session.unmatched_text().join(" ");
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(reply);

        match matcher.match_concept(&text, bank) {
            Ok(found) => Ok(TurnPlan::Introduce { concept: found.concept, score: found.score }),
            Err(AppError::NoConfidentMatch { .. }) => Ok(TurnPlan::Clarify),
            Err(err) => Err(err),
        }
    }

    fn reask_or_advance(&self, session: &DialogueSession, style: HintStyle) -> TurnPlan {
        if session.hints_on_current() < self.hint_retry_limit {
            TurnPlan::Reask { index: session.cursor(), style }
        } else {
            Self::advance(session)
        }
    }

    fn advance(session: &DialogueSession) -> TurnPlan {
        let next_index = session.cursor() + 1;
        let total = session.concept().map(|c| c.question_count()).unwrap_or(0);
        if next_index < total {
            TurnPlan::Advance { next_index }
        } else {
            TurnPlan::Conclude(ConclusionReason::QuestionsExhausted)
        }
    }

    fn pivot(
        &self,
        current: &Arc<crate::domain::Concept>,
        reply: &str,
        matcher: &MisconceptionMatcher,
        bank: &ConceptBank,
    ) -> Option<TurnPlan> {
        let current_score = matcher.score(reply, current);
        matcher
            .rank(reply, bank)
            .into_iter()
            .find(|candidate| candidate.concept.name() != current.name())
            .filter(|candidate| candidate.score >= self.pivot_confidence && candidate.score > current_score)
            .map(|candidate| TurnPlan::Introduce { concept: candidate.concept, score: candidate.score })
    }
}
