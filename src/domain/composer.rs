//! Prompt composer: structured explanations and per-turn prompts.

use serde_json::{Value, json};

use crate::domain::{
    AppError, Concept, ConclusionReason, DisciplineProfile, Exchange, HintStyle, SectionKind,
    StructuredExplanation, WorkedExample,
};

/// Sampling temperature for history digests.
pub const SUMMARY_TEMPERATURE: f32 = 0.3;

/// Trait for rendering named templates.
///
/// Keeps the template engine (minijinja) out of the domain layer.
pub trait TemplateRenderer: Send + Sync {
    /// Render `template_name` with `context`.
    fn render(&self, template_name: &str, context: &Value) -> Result<String, AppError>;
}

/// Shared inputs for every turn prompt.
#[derive(Debug, Clone, Copy)]
pub struct TurnContext<'a> {
    pub profile: &'a DisciplineProfile,
    pub concept: Option<&'a Concept>,
    /// Exchanges left out of the history forwarded with the prompt.
    pub omitted_exchanges: usize,
    /// Digest of the omitted exchanges, when one was written.
    pub history_summary: Option<&'a str>,
}

/// The kind of tutor message a prompt asks the completion service for.
#[derive(Debug, Clone)]
pub enum TurnPrompt<'a> {
    Introduce { explanation: &'a StructuredExplanation, question_index: usize },
    Reask { style: HintStyle, question_index: usize, reply: &'a str },
    Advance { previous_index: usize, reply: &'a str, next_index: usize },
    WrapUp { last_index: usize, reply: &'a str },
    Clarify { student_text: &'a str, candidates: Vec<String> },
}

impl TurnPrompt<'_> {
    pub fn template_name(&self) -> &'static str {
        match self {
            TurnPrompt::Introduce { .. } => "turns/introduce.j2",
            TurnPrompt::Reask { style: HintStyle::Hint, .. } => "turns/hint.j2",
            TurnPrompt::Reask { style: HintStyle::Scaffold, .. } => "turns/scaffold.j2",
            TurnPrompt::Advance { .. } => "turns/advance.j2",
            TurnPrompt::WrapUp { .. } => "turns/wrap_up.j2",
            TurnPrompt::Clarify { .. } => "turns/clarify.j2",
        }
    }

    /// Sampling temperature requested for this kind of message.
    pub fn temperature(&self) -> f32 {
        match self {
            TurnPrompt::Introduce { .. } | TurnPrompt::Clarify { .. } => 0.5,
            TurnPrompt::Reask { style: HintStyle::Hint, .. } => 0.6,
            TurnPrompt::Reask { style: HintStyle::Scaffold, .. } => 0.7,
            TurnPrompt::Advance { .. } => 0.4,
            TurnPrompt::WrapUp { .. } => 0.3,
        }
    }
}

/// Builds structured explanations and turn prompts from templates.
#[derive(Debug, Clone)]
pub struct PromptComposer<R> {
    renderer: R,
}

impl<R: TemplateRenderer> PromptComposer<R> {
    pub fn new(renderer: R) -> Self {
        Self { renderer }
    }

    /// Compose the four-section explanation for `concept` as seen from `profile`.
    pub fn compose(
        &self,
        concept: &Concept,
        profile: &DisciplineProfile,
        student_text: &str,
    ) -> Result<StructuredExplanation, AppError> {
        let example = WorkedExample::for_concept(concept);
        let context = json!({
            "concept": concept_context(concept),
            "profile": profile_context(profile),
            "student_text": student_text.trim(),
            "worked_example": {
                "text": example.text,
                "source_question": example.source_question.map(|index| index + 1),
            },
        });

        let mut bodies: [String; 4] = Default::default();
        for (slot, kind) in bodies.iter_mut().zip(SectionKind::ALL) {
            let body = self.renderer.render(kind.template_name(), &context)?;
            let body = body.trim();
            if body.is_empty() {
                return Err(AppError::PromptComposition(format!(
                    "section '{}' rendered empty for concept '{}'",
                    kind.title(),
                    concept.name()
                )));
            }
            *slot = body.to_string();
        }

        Ok(StructuredExplanation::from_bodies(bodies))
    }

    /// Render the prompt for one tutor turn.
    pub fn turn_prompt(&self, ctx: TurnContext<'_>, turn: &TurnPrompt<'_>) -> Result<String, AppError> {
        let mut context = json!({
            "profile": profile_context(ctx.profile),
            "concept": ctx.concept.map(concept_context),
            "omitted_exchanges": ctx.omitted_exchanges,
            "history_summary": ctx.history_summary,
        });

        let extra = match turn {
            TurnPrompt::Introduce { explanation, question_index } => {
                let mut extra = question_context(ctx.concept, *question_index, "question")?;
                extra["explanation"] = json!(explanation.to_markdown());
                extra
            }
            TurnPrompt::Reask { question_index, reply, .. } => {
                let mut extra = question_context(ctx.concept, *question_index, "question")?;
                extra["reply"] = json!(reply.trim());
                extra
            }
            TurnPrompt::Advance { previous_index, reply, next_index } => {
                let mut extra = question_context(ctx.concept, *previous_index, "previous")?;
                merge(&mut extra, question_context(ctx.concept, *next_index, "question")?);
                extra["reply"] = json!(reply.trim());
                extra
            }
            TurnPrompt::WrapUp { last_index, reply } => {
                let mut extra = question_context(ctx.concept, *last_index, "question")?;
                extra["reply"] = json!(reply.trim());
                extra
            }
            TurnPrompt::Clarify { student_text, candidates } => {
                json!({ "student_text": student_text.trim(), "candidates": candidates })
            }
        };
        merge(&mut context, extra);

        self.render_nonempty(turn.template_name(), &context)
    }

    /// Closing message for conclusions that do not call the completion service.
    pub fn closing_message(
        &self,
        profile: &DisciplineProfile,
        concept: Option<&Concept>,
        reason: ConclusionReason,
        already_concluded: bool,
    ) -> Result<String, AppError> {
        let context = json!({
            "profile": profile_context(profile),
            "concept": concept.map(concept_context),
            "reason": reason,
            "already_concluded": already_concluded,
        });
        self.render_nonempty("turns/closing.j2", &context)
    }

    /// Prompt asking for a digest of `exchanges`, folded into `previous` when given.
    pub fn summary_prompt(
        &self,
        profile: &DisciplineProfile,
        concept: Option<&Concept>,
        previous: Option<&str>,
        exchanges: &[Exchange],
    ) -> Result<String, AppError> {
        if exchanges.is_empty() {
            return Err(AppError::PromptComposition("summary requested for no exchanges".to_string()));
        }
        let context = json!({
            "profile": profile_context(profile),
            "concept": concept.map(concept_context),
            "previous_summary": previous,
            "exchanges": exchanges,
        });
        self.render_nonempty("turns/summarize.j2", &context)
    }

    /// Yes/no prompt used by completion-backed understanding judges.
    pub fn judgement_prompt(
        &self,
        concept: &Concept,
        question: &str,
        reply: &str,
    ) -> Result<String, AppError> {
        let context = json!({
            "concept": concept_context(concept),
            "question": question,
            "reply": reply.trim(),
        });
        self.render_nonempty("turns/judge.j2", &context)
    }

    fn render_nonempty(&self, template: &str, context: &Value) -> Result<String, AppError> {
        let rendered = self.renderer.render(template, context)?;
        let rendered = rendered.trim();
        if rendered.is_empty() {
            return Err(AppError::PromptComposition(format!("template '{}' rendered empty", template)));
        }
        Ok(rendered.to_string())
    }
}

fn concept_context(concept: &Concept) -> Value {
    json!({
        "name": concept.name(),
        "misperception": concept.misperception(),
        "faulty_analogy": concept.faulty_analogy(),
        "questions": concept.questions(),
        "question_count": concept.question_count(),
        "assumptions": concept.notes().assumptions,
        "theories": concept.notes().theories,
        "reasoning_steps": concept.notes().reasoning_steps,
        "limitations": concept.notes().limitations,
    })
}

fn profile_context(profile: &DisciplineProfile) -> Value {
    json!({
        "label": profile.label,
        "discipline": profile.display_name(),
        "generic": profile.is_generic(),
        "has_vocabulary": profile.has_vocabulary(),
        "vocabulary": profile.vocabulary,
        "analogies": profile.analogies,
        "guidance": profile.guidance,
    })
}

fn question_context(concept: Option<&Concept>, index: usize, prefix: &str) -> Result<Value, AppError> {
    let concept = concept.ok_or_else(|| {
        AppError::PromptComposition("question prompt requested without a concept".to_string())
    })?;
    let question = concept.question(index).ok_or_else(|| {
        AppError::PromptComposition(format!(
            "question {} out of range for concept '{}'",
            index + 1,
            concept.name()
        ))
    })?;
    let mut fields = serde_json::Map::new();
    fields.insert(prefix.to_string(), json!(question));
    fields.insert(format!("{}_number", prefix), json!(index + 1));
    fields.insert("total".to_string(), json!(concept.question_count()));
    Ok(Value::Object(fields))
}

fn merge(target: &mut Value, extra: Value) {
    if let (Value::Object(target), Value::Object(extra)) = (target, extra) {
        target.extend(extra);
    }
}
