//! Four-part structured explanation value.

use std::fmt;

use serde::Serialize;

use crate::domain::Concept;

/// Section identity, in the order every explanation presents them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Assumptions,
    Theories,
    ReasoningSteps,
    Limitations,
}

impl SectionKind {
    pub const ALL: [SectionKind; 4] =
        [SectionKind::Assumptions, SectionKind::Theories, SectionKind::ReasoningSteps, SectionKind::Limitations];

    pub fn title(&self) -> &'static str {
        match self {
            SectionKind::Assumptions => "Assumptions",
            SectionKind::Theories => "Theories",
            SectionKind::ReasoningSteps => "Reasoning Steps",
            SectionKind::Limitations => "Limitations",
        }
    }

    /// Template name used to render this section.
    pub fn template_name(&self) -> &'static str {
        match self {
            SectionKind::Assumptions => "sections/assumptions.j2",
            SectionKind::Theories => "sections/theories.j2",
            SectionKind::ReasoningSteps => "sections/reasoning_steps.j2",
            SectionKind::Limitations => "sections/limitations.j2",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub kind: SectionKind,
    pub body: String,
}

/// Assumptions, Theories, Reasoning Steps and Limitations, always all four and in that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuredExplanation {
    sections: [Section; 4],
}

impl StructuredExplanation {
    /// Bodies must be given in `SectionKind::ALL` order.
    pub(crate) fn from_bodies(bodies: [String; 4]) -> Self {
        let [assumptions, theories, reasoning, limitations] = bodies;
        Self {
            sections: [
                Section { kind: SectionKind::Assumptions, body: assumptions },
                Section { kind: SectionKind::Theories, body: theories },
                Section { kind: SectionKind::ReasoningSteps, body: reasoning },
                Section { kind: SectionKind::Limitations, body: limitations },
            ],
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, kind: SectionKind) -> &str {
        self.sections.iter().find(|section| section.kind == kind).map(|s| s.body.as_str()).unwrap_or_default()
    }

    /// Markdown rendering with one `##` heading per section.
    pub fn to_markdown(&self) -> String {
        self.sections
            .iter()
            .map(|section| format!("## {}\n{}", section.kind.title(), section.body.trim()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Numeric example anchoring the Reasoning Steps section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkedExample {
    /// Index of the Socratic question the example was drawn from, if any.
    pub source_question: Option<usize>,
    pub text: String,
}

impl WorkedExample {
    /// Pick the first question that already carries numbers; otherwise
    /// build a numeric scenario around the first question.
    pub fn for_concept(concept: &Concept) -> Self {
        if let Some((index, question)) =
            concept.questions().iter().enumerate().find(|(_, q)| q.chars().any(|ch| ch.is_ascii_digit()))
        {
            return Self { source_question: Some(index), text: question.clone() };
        }

        let anchor = concept.question(0).unwrap_or(concept.name());
        Self {
            source_question: None,
            text: format!(
                "Consider \"{}\" with numbers attached: option A returns 100 units of benefit for 60 units of \
                 resources, option B returns 90 units for 40. Net gains are 40 and 50, and choosing A gives up \
                 the 50 that B would have delivered.",
                anchor
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concept(questions: &[&str]) -> Concept {
        Concept::new("C", "m", "a", questions.iter().map(|q| q.to_string()).collect(), vec![]).unwrap()
    }

    #[test]
    fn sections_keep_fixed_order() {
        let explanation = StructuredExplanation::from_bodies([
            "a".to_string(),
            "t".to_string(),
            "r".to_string(),
            "l".to_string(),
        ]);
        let kinds: Vec<_> = explanation.sections().iter().map(|s| s.kind).collect();
        assert_eq!(kinds, SectionKind::ALL.to_vec());
        assert_eq!(explanation.section(SectionKind::ReasoningSteps), "r");
    }

    #[test]
    fn markdown_has_all_headings_in_order() {
        let explanation = StructuredExplanation::from_bodies([
            "a".to_string(),
            "t".to_string(),
            "r".to_string(),
            "l".to_string(),
        ]);
        let markdown = explanation.to_markdown();
        let positions: Vec<_> = SectionKind::ALL
            .iter()
            .map(|kind| markdown.find(&format!("## {}", kind.title())).unwrap())
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn worked_example_prefers_numeric_question() {
        let example = WorkedExample::for_concept(&concept(&["Why?", "What if 3 units cost $40?"]));
        assert_eq!(example.source_question, Some(1));
        assert!(example.text.contains("$40"));
    }

    #[test]
    fn worked_example_is_modeled_on_first_question_without_numbers() {
        let example = WorkedExample::for_concept(&concept(&["Why do prices move?"]));
        assert_eq!(example.source_question, None);
        assert!(example.text.contains("Why do prices move?"));
        assert!(example.text.chars().any(|ch| ch.is_ascii_digit()));
    }
}
