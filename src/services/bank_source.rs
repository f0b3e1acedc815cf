//! Concept bank sources: the embedded default bank and bank files on disk.

use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::AppError;
use crate::ports::BankSource;

const EMBEDDED_BANK: &str = include_str!("../assets/concept_bank.json");

/// Bank compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedBankSource;

impl BankSource for EmbeddedBankSource {
    fn read_bank(&self) -> Result<String, AppError> {
        Ok(EMBEDDED_BANK.to_string())
    }

    fn describe(&self) -> String {
        "embedded concept bank".to_string()
    }
}

/// Bank read from a JSON file.
#[derive(Debug, Clone)]
pub struct FileBankSource {
    path: PathBuf,
}

impl FileBankSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BankSource for FileBankSource {
    fn read_bank(&self) -> Result<String, AppError> {
        fs::read_to_string(&self.path).map_err(|err| {
            AppError::config_error(format!(
                "Failed to read concept bank {}: {}",
                self.path.display(),
                err
            ))
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConceptBank, KeyTermJudge, UnderstandingJudge};
    use tempfile::TempDir;

    #[test]
    fn embedded_bank_loads() {
        let bank = ConceptBank::load(&EmbeddedBankSource).unwrap();
        let concept = bank.lookup("Opportunity Cost and Subjective Value").unwrap();
        assert_eq!(concept.question_count(), 10);
        assert!(concept.questions()[0].starts_with("If building a bridge requires 500 tons of steel"));
        assert!(bank.len() >= 4);
    }

    #[test]
    fn embedded_concepts_carry_their_own_section_notes() {
        let bank = ConceptBank::load(&EmbeddedBankSource).unwrap();
        for concept in bank.all() {
            let notes = concept.notes();
            assert!(!notes.theories.is_empty(), "{} has no theories", concept.name());
            assert!(!notes.reasoning_steps.is_empty(), "{} has no reasoning steps", concept.name());
        }
    }

    #[test]
    fn embedded_key_terms_ignore_incidental_words() {
        let bank = ConceptBank::load(&EmbeddedBankSource).unwrap();
        let cases = [
            ("Opportunity Cost and Subjective Value", "Use steel instead of concrete."),
            ("Opportunity Cost and Subjective Value", "Give me the total for the bridge."),
            ("Marginal Thinking and Sunk Costs", "In the future we add additional floors."),
            ("Market Equilibrium as a Dynamic Process", "The process takes a few weeks."),
        ];
        for (name, reply) in cases {
            let concept = bank.lookup(name).unwrap();
            let question = concept.questions()[0].clone();
            assert!(!KeyTermJudge.engages(&concept, &question, reply).unwrap(), "{:?} engaged {}", reply, name);
        }

        let concept = bank.lookup("Opportunity Cost and Subjective Value").unwrap();
        assert!(KeyTermJudge.engages(&concept, "q", "The houses are the next best alternative.").unwrap());
    }

    #[test]
    fn file_bank_errors_name_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bank.json");
        fs::write(&path, r#"{"concepts": [{"concept_name": "X"}]}"#).unwrap();

        let err = ConceptBank::load(&FileBankSource::new(&path)).unwrap_err();
        match err {
            AppError::MalformedBank(msg) => assert!(msg.contains("bank.json"), "{}", msg),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn missing_file_is_a_configuration_error() {
        let err = FileBankSource::new("/nonexistent/bank.json").read_bank().unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }
}
