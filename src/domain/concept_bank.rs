//! Concept bank: the validated, immutable catalogue the dialogue engine reads from.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::domain::AppError;
use crate::ports::BankSource;

/// One economics topic with its STEM misconception and ordered question set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Concept {
    name: String,
    misperception: String,
    faulty_analogy: String,
    questions: Vec<String>,
    key_terms: Vec<String>,
    notes: SectionNotes,
}

/// Concept-specific lines for the explanation sections.
///
/// Empty lists fall back to the generic wording of each section template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SectionNotes {
    #[serde(default)]
    pub assumptions: Vec<String>,
    #[serde(default)]
    pub theories: Vec<String>,
    #[serde(default)]
    pub reasoning_steps: Vec<String>,
    #[serde(default)]
    pub limitations: Vec<String>,
}

impl SectionNotes {
    fn cleaned(self) -> Self {
        fn clean(lines: Vec<String>) -> Vec<String> {
            lines.into_iter().map(|line| line.trim().to_string()).filter(|line| !line.is_empty()).collect()
        }
        Self {
            assumptions: clean(self.assumptions),
            theories: clean(self.theories),
            reasoning_steps: clean(self.reasoning_steps),
            limitations: clean(self.limitations),
        }
    }
}

impl Concept {
    /// Build a concept, enforcing the bank schema.
    pub fn new(
        name: impl Into<String>,
        misperception: impl Into<String>,
        faulty_analogy: impl Into<String>,
        questions: Vec<String>,
        key_terms: Vec<String>,
    ) -> Result<Self, AppError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(AppError::malformed_bank("concept is missing 'concept_name'"));
        }

        let misperception = misperception.into().trim().to_string();
        if misperception.is_empty() {
            return Err(AppError::malformed_bank(format!(
                "concept '{}' is missing 'stem_misperception'",
                name
            )));
        }

        if questions.is_empty() {
            return Err(AppError::malformed_bank(format!(
                "concept '{}' has no 'socratic_questions'",
                name
            )));
        }
        let mut cleaned = Vec::with_capacity(questions.len());
        for (idx, question) in questions.into_iter().enumerate() {
            let question = question.trim().to_string();
            if question.is_empty() {
                return Err(AppError::malformed_bank(format!(
                    "question {} of concept '{}' is empty",
                    idx + 1,
                    name
                )));
            }
            cleaned.push(question);
        }

        let key_terms = key_terms
            .into_iter()
            .map(|term| term.trim().to_lowercase())
            .filter(|term| !term.is_empty())
            .collect();

        Ok(Self {
            name,
            misperception,
            faulty_analogy: faulty_analogy.into().trim().to_string(),
            questions: cleaned,
            key_terms,
            notes: SectionNotes::default(),
        })
    }

    /// Attach concept-specific section lines.
    pub fn with_notes(mut self, notes: SectionNotes) -> Self {
        self.notes = notes.cleaned();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn misperception(&self) -> &str {
        &self.misperception
    }

    /// May be empty; the field is optional in bank files.
    pub fn faulty_analogy(&self) -> &str {
        &self.faulty_analogy
    }

    /// Socratic questions in the order they must be asked.
    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn question(&self, index: usize) -> Option<&str> {
        self.questions.get(index).map(String::as_str)
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Lower-cased phrases that signal a reply engages this concept.
    pub fn key_terms(&self) -> &[String] {
        &self.key_terms
    }

    pub fn notes(&self) -> &SectionNotes {
        &self.notes
    }
}

#[derive(Debug, Deserialize)]
struct RawConcept {
    #[serde(default)]
    concept_name: Option<String>,
    #[serde(default)]
    stem_misperception: Option<String>,
    #[serde(default)]
    faulty_analogy: Option<String>,
    #[serde(default)]
    socratic_questions: Option<Vec<String>>,
    #[serde(default)]
    key_terms: Vec<String>,
    #[serde(flatten)]
    notes: SectionNotes,
}

/// Read-only catalogue of concepts, shared by every session.
#[derive(Debug, Clone)]
pub struct ConceptBank {
    concepts: Vec<Arc<Concept>>,
    index: HashMap<String, usize>,
}

impl ConceptBank {
    /// Load and validate a bank from any source.
    pub fn load(source: &dyn BankSource) -> Result<Self, AppError> {
        let content = source.read_bank()?;
        Self::from_json(&content).map_err(|err| match err {
            AppError::MalformedBank(reason) => {
                AppError::MalformedBank(format!("{} ({})", reason, source.describe()))
            }
            other => other,
        })
    }

    /// Parse a bank document: either `{"concepts": [...]}` or a bare array.
    pub fn from_json(content: &str) -> Result<Self, AppError> {
        let document: Value = serde_json::from_str(content)?;
        let entries = match document {
            Value::Object(mut map) => match map.remove("concepts") {
                Some(Value::Array(entries)) => entries,
                Some(_) => {
                    return Err(AppError::malformed_bank("top-level 'concepts' must be a list"));
                }
                None => {
                    return Err(AppError::malformed_bank("missing top-level 'concepts' list"));
                }
            },
            Value::Array(entries) => entries,
            _ => return Err(AppError::malformed_bank("expected an object or a list of concepts")),
        };

        let mut concepts = Vec::with_capacity(entries.len());
        for (idx, entry) in entries.into_iter().enumerate() {
            let raw: RawConcept = serde_json::from_value(entry).map_err(|err| {
                AppError::malformed_bank(format!("concept {}: {}", idx + 1, err))
            })?;
            let concept = Concept::new(
                raw.concept_name.unwrap_or_default(),
                raw.stem_misperception.unwrap_or_default(),
                raw.faulty_analogy.unwrap_or_default(),
                raw.socratic_questions.unwrap_or_default(),
                raw.key_terms,
            )
            .map(|concept| concept.with_notes(raw.notes))
            .map_err(|err| match err {
                AppError::MalformedBank(reason) => {
                    AppError::MalformedBank(format!("concept {}: {}", idx + 1, reason))
                }
                other => other,
            })?;
            concepts.push(concept);
        }

        Self::from_concepts(concepts)
    }

    /// Assemble a bank from already-validated concepts, rejecting duplicates.
    pub fn from_concepts(concepts: Vec<Concept>) -> Result<Self, AppError> {
        if concepts.is_empty() {
            return Err(AppError::malformed_bank("bank contains no concepts"));
        }

        let mut index = HashMap::with_capacity(concepts.len());
        let mut stored = Vec::with_capacity(concepts.len());
        for (position, concept) in concepts.into_iter().enumerate() {
            if index.insert(concept.name().to_string(), position).is_some() {
                return Err(AppError::DuplicateConcept(concept.name().to_string()));
            }
            stored.push(Arc::new(concept));
        }

        Ok(Self { concepts: stored, index })
    }

    pub fn lookup(&self, name: &str) -> Result<Arc<Concept>, AppError> {
        self.index
            .get(name.trim())
            .map(|&position| Arc::clone(&self.concepts[position]))
            .ok_or_else(|| AppError::ConceptNotFound(name.to_string()))
    }

    /// All concepts in load order.
    pub fn all(&self) -> &[Arc<Concept>] {
        &self.concepts
    }

    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const BANK: &str = r#"{
        "concepts": [
            {
                "concept_name": "Opportunity Cost",
                "stem_misperception": "Cost is the sum of inputs.",
                "faulty_analogy": "Cost behaves like mass.",
                "socratic_questions": ["First?", "Second?", "Third?"]
            },
            {
                "concept_name": "Marginal Thinking",
                "stem_misperception": "Averages drive decisions.",
                "socratic_questions": ["Only?"],
                "key_terms": ["Marginal", "  next unit "]
            }
        ]
    }"#;

    #[test]
    fn loads_concepts_in_order() {
        let bank = ConceptBank::from_json(BANK).unwrap();
        let names: Vec<_> = bank.all().iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, vec!["Opportunity Cost", "Marginal Thinking"]);
        assert_eq!(bank.lookup("Opportunity Cost").unwrap().questions(), ["First?", "Second?", "Third?"]);
    }

    #[test]
    fn faulty_analogy_is_optional_and_key_terms_are_normalized() {
        let bank = ConceptBank::from_json(BANK).unwrap();
        let concept = bank.lookup("Marginal Thinking").unwrap();
        assert_eq!(concept.faulty_analogy(), "");
        assert_eq!(concept.key_terms(), ["marginal", "next unit"]);
    }

    #[test]
    fn section_notes_are_optional_and_trimmed() {
        let bank = ConceptBank::from_json(
            r#"[{"concept_name": "Elasticity", "stem_misperception": "Demand is fixed.",
                "socratic_questions": ["q"],
                "theories": [" Price elasticity of demand ", ""],
                "reasoning_steps": ["Estimate the percentage change in quantity."]}]"#,
        )
        .unwrap();
        let notes = bank.lookup("Elasticity").unwrap().notes().clone();
        assert_eq!(notes.theories, ["Price elasticity of demand"]);
        assert_eq!(notes.reasoning_steps.len(), 1);
        assert!(notes.assumptions.is_empty());
        assert!(notes.limitations.is_empty());
    }

    #[test]
    fn accepts_bare_array() {
        let bank = ConceptBank::from_json(
            r#"[{"concept_name": "A", "stem_misperception": "m", "socratic_questions": ["q"]}]"#,
        )
        .unwrap();
        assert_eq!(bank.len(), 1);
    }

    #[test]
    fn rejects_missing_questions() {
        let err = ConceptBank::from_json(
            r#"{"concepts": [{"concept_name": "A", "stem_misperception": "m", "socratic_questions": []}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::MalformedBank(msg) if msg.contains("socratic_questions")));
    }

    #[test]
    fn rejects_blank_name_and_misperception() {
        let err = ConceptBank::from_json(
            r#"{"concepts": [{"concept_name": "  ", "stem_misperception": "m", "socratic_questions": ["q"]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::MalformedBank(_)));

        let err = ConceptBank::from_json(
            r#"{"concepts": [{"concept_name": "A", "socratic_questions": ["q"]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::MalformedBank(msg) if msg.contains("stem_misperception")));
    }

    #[test]
    fn rejects_non_string_question() {
        let err = ConceptBank::from_json(
            r#"{"concepts": [{"concept_name": "A", "stem_misperception": "m", "socratic_questions": [3]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::MalformedBank(msg) if msg.contains("concept 1")));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = ConceptBank::from_json(
            r#"[{"concept_name": "A", "stem_misperception": "m", "socratic_questions": ["q"]},
                {"concept_name": "A", "stem_misperception": "n", "socratic_questions": ["r"]}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, AppError::DuplicateConcept(name) if name == "A"));
    }

    #[test]
    fn rejects_empty_and_shapeless_documents() {
        assert!(matches!(ConceptBank::from_json("[]"), Err(AppError::MalformedBank(_))));
        assert!(matches!(ConceptBank::from_json(r#"{"topics": []}"#), Err(AppError::MalformedBank(_))));
        assert!(matches!(ConceptBank::from_json("not json"), Err(AppError::MalformedBank(_))));
    }

    #[test]
    fn lookup_unknown_name_fails() {
        let bank = ConceptBank::from_json(BANK).unwrap();
        assert!(matches!(bank.lookup("Elasticity"), Err(AppError::ConceptNotFound(_))));
    }

    fn concept_strategy() -> impl Strategy<Value = (String, Vec<String>)> {
        ("[A-Za-z][A-Za-z ]{0,12}[A-Za-z]", prop::collection::vec("[a-z]{1,8}\\?", 1..6))
    }

    proptest! {
        #[test]
        fn lookup_round_trips_question_order(
            entries in prop::collection::btree_map("[A-Z][a-z]{2,10}", prop::collection::vec("[a-z]{1,8}\\?", 1..8), 1..6)
        ) {
            let document = serde_json::json!({
                "concepts": entries.iter().map(|(name, questions)| serde_json::json!({
                    "concept_name": name,
                    "stem_misperception": "misperception",
                    "socratic_questions": questions,
                })).collect::<Vec<_>>()
            });
            let bank = ConceptBank::from_json(&document.to_string()).unwrap();
            for (name, questions) in &entries {
                let concept = bank.lookup(name).unwrap();
                prop_assert_eq!(concept.questions(), questions.as_slice());
            }
        }

        #[test]
        fn concept_new_keeps_trimmed_name((name, questions) in concept_strategy()) {
            let concept = Concept::new(format!(" {} ", name), "m", "", questions.clone(), vec![]).unwrap();
            prop_assert_eq!(concept.name(), name.trim());
            prop_assert_eq!(concept.question_count(), questions.len());
        }
    }
}
