//! Judging whether a student reply engages the misconception behind a question.

use crate::domain::text::{content_words, normalized};
use crate::domain::{AppError, Concept, HintStyle};

/// Replaceable strategy deciding if a reply shows engagement with the concept.
pub trait UnderstandingJudge: Send + Sync {
    fn engages(&self, concept: &Concept, question: &str, reply: &str) -> Result<bool, AppError>;
}

/// Default judge: a reply engages when it uses one of the concept's key terms.
///
/// Concepts without key terms fall back to the content words of their name.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyTermJudge;

impl UnderstandingJudge for KeyTermJudge {
    fn engages(&self, concept: &Concept, _question: &str, reply: &str) -> Result<bool, AppError> {
        let reply_words = content_words(reply);
        if reply_words.is_empty() {
            return Ok(false);
        }

        if concept.key_terms().is_empty() {
            return Ok(content_words(concept.name()).iter().any(|word| reply_words.contains(word)));
        }

        Ok(concept.key_terms().iter().any(|term| {
            let term_words = content_words(term);
            !term_words.is_empty() && term_words.is_subset(&reply_words)
        }))
    }
}

/// How a raw student reply should be treated before judging it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyIntent {
    Stop,
    Help(HintStyle),
    Answer,
}

const STOP_PHRASES: &[&str] =
    &["quit", "exit", "stop", "end", "bye", "goodbye", "end session", "i am done", "i m done", "done"];

const STUCK_PHRASES: &[&str] = &[
    "i don t know",
    "i dont know",
    "dont know",
    "don t know",
    "no idea",
    "not sure",
    "confused",
    "clueless",
    "stuck",
    "help",
    "guide me",
];

/// Classify a reply: explicit stop requests, help requests, or an answer.
pub fn classify_reply(reply: &str) -> ReplyIntent {
    let text = normalized(reply);
    if STOP_PHRASES.contains(&text.as_str()) {
        return ReplyIntent::Stop;
    }
    if text == "hint" {
        return ReplyIntent::Help(HintStyle::Hint);
    }
    if STUCK_PHRASES.contains(&text.as_str()) {
        return ReplyIntent::Help(HintStyle::Scaffold);
    }
    ReplyIntent::Answer
}

#[cfg(test)]
mod tests {
    use super::*;

    fn concept(key_terms: &[&str]) -> Concept {
        Concept::new(
            "Opportunity Cost and Subjective Value",
            "m",
            "",
            vec!["q".into()],
            key_terms.iter().map(|t| t.to_string()).collect(),
        )
        .unwrap()
    }

    #[test]
    fn key_term_phrase_must_be_fully_present() {
        let concept = concept(&["foregone alternative", "next best"]);
        let judge = KeyTermJudge;
        assert!(judge.engages(&concept, "q", "The foregone alternative is the houses.").unwrap());
        assert!(!judge.engages(&concept, "q", "The best option is steel.").unwrap());
    }

    #[test]
    fn steel_tonnage_reply_does_not_engage() {
        let concept = concept(&["opportunity cost", "foregone", "alternative"]);
        let reply = "We need 500 tons of steel at $800 per ton, so the cost is $400,000.";
        assert!(!KeyTermJudge.engages(&concept, "q", reply).unwrap());
    }

    #[test]
    fn falls_back_to_concept_name_words() {
        let concept = concept(&[]);
        assert!(KeyTermJudge.engages(&concept, "q", "It depends on subjective preferences").unwrap());
        assert!(!KeyTermJudge.engages(&concept, "q", "").unwrap());
    }

    #[test]
    fn classifies_stop_and_help_requests() {
        assert_eq!(classify_reply("  Quit "), ReplyIntent::Stop);
        assert_eq!(classify_reply("I'm done"), ReplyIntent::Stop);
        assert_eq!(classify_reply("hint"), ReplyIntent::Help(HintStyle::Hint));
        assert_eq!(classify_reply("I don't know"), ReplyIntent::Help(HintStyle::Scaffold));
        assert_eq!(classify_reply("stuck!"), ReplyIntent::Help(HintStyle::Scaffold));
        assert_eq!(classify_reply("I'm done with the steel estimate, it costs 5"), ReplyIntent::Answer);
    }
}
