//! Per-conversation dialogue state.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Concept, DisciplineProfile};

/// Opaque session token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Student,
    Tutor,
}

/// One utterance in the flattened transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No concept selected yet; waiting for a reply that matches one.
    Created,
    /// A student reply is being processed.
    Active,
    AwaitingStudent,
    Concluded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConclusionReason {
    QuestionsExhausted,
    StudentEnded,
    TurnLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HintStyle {
    /// Short nudge toward the economic perspective.
    Hint,
    /// Tiered explanation for a student who says they are stuck.
    Scaffold,
}

/// What the tutor did in one exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExchangeKind {
    Clarification,
    Question { index: usize, hint: Option<HintStyle> },
    Conclusion { reason: ConclusionReason },
}

/// A student message and the tutor response it produced.
#[derive(Debug, Clone, Serialize)]
pub struct Exchange {
    pub student: String,
    pub tutor: String,
    pub kind: ExchangeKind,
    pub recorded_at: DateTime<Utc>,
}

/// Model-written digest of the exchanges no longer sent verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistorySummary {
    pub text: String,
    /// Number of leading exchanges the digest covers.
    pub covered: usize,
}

/// Transition chosen for a student reply, before the tutor text exists.
#[derive(Debug, Clone)]
pub enum TurnPlan {
    /// Ask the student to say more; no concept yet.
    Clarify,
    /// Start (or switch to) a concept at its first question.
    Introduce { concept: Arc<Concept>, score: f64 },
    /// Ask the current question again with help.
    Reask { index: usize, style: HintStyle },
    /// Move to the next question of the current concept.
    Advance { next_index: usize },
    Conclude(ConclusionReason),
    /// Session had already concluded; nothing changes.
    AlreadyConcluded,
}

impl TurnPlan {
    /// Whether carrying out this plan needs the completion service.
    pub fn needs_completion(&self) -> bool {
        !matches!(
            self,
            TurnPlan::AlreadyConcluded
                | TurnPlan::Conclude(ConclusionReason::StudentEnded)
                | TurnPlan::Conclude(ConclusionReason::TurnLimit)
        )
    }
}

/// State of one student conversation.
#[derive(Debug, Clone)]
pub struct DialogueSession {
    id: SessionId,
    profile: DisciplineProfile,
    concept: Option<Arc<Concept>>,
    cursor: usize,
    hints_on_current: u32,
    turns: u32,
    history: Vec<Exchange>,
    status: SessionStatus,
    conclusion: Option<ConclusionReason>,
    unmatched_text: Vec<String>,
    summary: Option<HistorySummary>,
}

impl DialogueSession {
    pub fn new(id: SessionId, profile: DisciplineProfile) -> Self {
        Self {
            id,
            profile,
            concept: None,
            cursor: 0,
            hints_on_current: 0,
            turns: 0,
            history: Vec::new(),
            status: SessionStatus::Created,
            conclusion: None,
            unmatched_text: Vec::new(),
            summary: None,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn profile(&self) -> &DisciplineProfile {
        &self.profile
    }

    pub fn concept(&self) -> Option<&Arc<Concept>> {
        self.concept.as_ref()
    }

    /// Index of the question currently put to the student.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current_question(&self) -> Option<&str> {
        self.concept.as_ref().and_then(|concept| concept.question(self.cursor))
    }

    pub fn hints_on_current(&self) -> u32 {
        self.hints_on_current
    }

    /// Number of student messages processed so far.
    pub fn turns(&self) -> u32 {
        self.turns
    }

    pub fn history(&self) -> &[Exchange] {
        &self.history
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn conclusion(&self) -> Option<ConclusionReason> {
        self.conclusion
    }

    pub fn is_concluded(&self) -> bool {
        self.status == SessionStatus::Concluded
    }

    /// Student text received while no concept was matched.
    pub fn unmatched_text(&self) -> &[String] {
        &self.unmatched_text
    }

    pub fn history_summary(&self) -> Option<&HistorySummary> {
        self.summary.as_ref()
    }

    /// Store a newer digest of the oldest exchanges.
    ///
    /// Digests that cover no more than the current one, or more exchanges than
    /// exist, are ignored.
    pub fn record_summary(&mut self, summary: HistorySummary) -> bool {
        let covered = self.summary.as_ref().map(|current| current.covered).unwrap_or(0);
        if summary.covered <= covered || summary.covered > self.history.len() {
            return false;
        }
        self.summary = Some(summary);
        true
    }

    /// History flattened into alternating student/tutor turns.
    pub fn transcript(&self) -> Vec<Turn> {
        self.history
            .iter()
            .flat_map(|exchange| {
                [
                    Turn { speaker: Speaker::Student, text: exchange.student.clone() },
                    Turn { speaker: Speaker::Tutor, text: exchange.tutor.clone() },
                ]
            })
            .collect()
    }

    /// Commit a planned turn together with the tutor's text.
    ///
    /// Plans that do not fit the current state leave the session untouched
    /// and return `None`.
    pub fn apply(
        &mut self,
        student_text: &str,
        plan: &TurnPlan,
        tutor_text: String,
    ) -> Option<ExchangeKind> {
        if self.is_concluded() || !self.accepts(plan) {
            return None;
        }

        // Counted only once the turn commits.
        self.turns += 1;
        self.status = SessionStatus::Active;

        let kind = match plan {
            TurnPlan::Clarify => {
                self.unmatched_text.push(student_text.to_string());
                self.status = SessionStatus::Created;
                ExchangeKind::Clarification
            }
            TurnPlan::Introduce { concept, .. } => {
                self.concept = Some(Arc::clone(concept));
                self.cursor = 0;
                self.hints_on_current = 0;
                self.unmatched_text.clear();
                self.status = SessionStatus::AwaitingStudent;
                ExchangeKind::Question { index: 0, hint: None }
            }
            TurnPlan::Reask { index, style } => {
                self.hints_on_current += 1;
                self.status = SessionStatus::AwaitingStudent;
                ExchangeKind::Question { index: *index, hint: Some(*style) }
            }
            TurnPlan::Advance { next_index } => {
                self.cursor = *next_index;
                self.hints_on_current = 0;
                self.status = SessionStatus::AwaitingStudent;
                ExchangeKind::Question { index: *next_index, hint: None }
            }
            TurnPlan::Conclude(reason) => {
                self.status = SessionStatus::Concluded;
                self.conclusion = Some(*reason);
                ExchangeKind::Conclusion { reason: *reason }
            }
            TurnPlan::AlreadyConcluded => return None,
        };

        self.history.push(Exchange {
            student: student_text.to_string(),
            tutor: tutor_text,
            kind: kind.clone(),
            recorded_at: Utc::now(),
        });
        Some(kind)
    }

    fn accepts(&self, plan: &TurnPlan) -> bool {
        let question_count = self.concept.as_ref().map(|c| c.question_count()).unwrap_or(0);
        match plan {
            TurnPlan::AlreadyConcluded => false,
            TurnPlan::Clarify => self.status == SessionStatus::Created,
            TurnPlan::Introduce { .. } | TurnPlan::Conclude(_) => true,
            TurnPlan::Reask { index, .. } => {
                self.status == SessionStatus::AwaitingStudent && *index == self.cursor
            }
            TurnPlan::Advance { next_index } => {
                self.status == SessionStatus::AwaitingStudent
                    && *next_index == self.cursor + 1
                    && *next_index < question_count
            }
        }
    }
}
