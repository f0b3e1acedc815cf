//! Misconception matcher: picks the concept whose misperception best overlaps the student's words.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::text::content_words;
use crate::domain::{AppError, Concept, ConceptBank};

/// A concept paired with its overlap score in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct ConceptMatch {
    pub concept: Arc<Concept>,
    pub score: f64,
}

/// Lexical-overlap matcher with a minimum-confidence cutoff.
#[derive(Debug, Clone, Copy)]
pub struct MisconceptionMatcher {
    min_confidence: f64,
}

impl MisconceptionMatcher {
    pub fn new(min_confidence: f64) -> Self {
        Self { min_confidence }
    }

    pub fn min_confidence(&self) -> f64 {
        self.min_confidence
    }

    /// Best concept for `student_text`, or `NoConfidentMatch` below the threshold.
    ///
    /// Ties go to the concept loaded first.
    pub fn match_concept(
        &self,
        student_text: &str,
        bank: &ConceptBank,
    ) -> Result<ConceptMatch, AppError> {
        let student = content_words(student_text);
        let mut best: Option<ConceptMatch> = None;

        for concept in bank.all() {
            let score = overlap(&student, concept);
            if best.as_ref().is_none_or(|current| score > current.score) {
                best = Some(ConceptMatch { concept: Arc::clone(concept), score });
            }
        }

        match best {
            Some(found) if found.score >= self.min_confidence && found.score > 0.0 => Ok(found),
            Some(found) => Err(AppError::NoConfidentMatch { best_score: found.score }),
            None => Err(AppError::NoConfidentMatch { best_score: 0.0 }),
        }
    }

    /// Every concept ranked by descending score; equal scores keep load order.
    pub fn rank(&self, student_text: &str, bank: &ConceptBank) -> Vec<ConceptMatch> {
        let student = content_words(student_text);
        let mut ranked: Vec<ConceptMatch> = bank
            .all()
            .iter()
            .map(|concept| ConceptMatch { concept: Arc::clone(concept), score: overlap(&student, concept) })
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked
    }

    /// Score of a single concept against `student_text`.
    pub fn score(&self, student_text: &str, concept: &Concept) -> f64 {
        overlap(&content_words(student_text), concept)
    }
}

fn overlap(student: &BTreeSet<String>, concept: &Concept) -> f64 {
    if student.is_empty() {
        return 0.0;
    }
    let corpus = format!("{} {}", concept.misperception(), concept.faulty_analogy());
    let concept_words = content_words(&corpus);
    let shared = student.intersection(&concept_words).count();
    shared as f64 / student.len() as f64
}
