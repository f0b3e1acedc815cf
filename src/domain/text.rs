//! Lexical helpers shared by the matcher and the understanding judge.

use std::collections::BTreeSet;

const MIN_WORD_LEN: usize = 3;

const STOPWORDS: &[&str] = &[
    "about", "after", "again", "all", "also", "and", "any", "are", "because", "been", "before",
    "being", "but", "can", "could", "did", "does", "doing", "each", "for", "from", "had", "has",
    "have", "how", "into", "its", "just", "like", "more", "most", "much", "not", "now", "only",
    "other", "our", "out", "over", "same", "should", "some", "such", "than", "that", "the",
    "their", "them", "then", "there", "these", "they", "this", "those", "through", "too", "use",
    "used", "using", "very", "was", "were", "what", "when", "where", "which", "while", "who",
    "why", "will", "with", "would", "you", "your",
];

/// Distinct, stemmed, lower-cased content words of `text`.
pub fn content_words(text: &str) -> BTreeSet<String> {
    words(text)
        .filter(|word| word.chars().count() >= MIN_WORD_LEN)
        .filter(|word| !STOPWORDS.contains(&word.as_str()))
        .map(|word| stem(&word))
        .collect()
}

/// Lower-cased words split on anything that is not alphanumeric.
pub fn normalized(text: &str) -> String {
    words(text).collect::<Vec<_>>().join(" ")
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|ch: char| !ch.is_alphanumeric()).filter(|word| !word.is_empty()).map(str::to_lowercase)
}

fn stem(word: &str) -> String {
    for suffix in ["ing", "ed", "s"] {
        if let Some(root) = word.strip_suffix(suffix) {
            if root.chars().count() >= 4 && !root.ends_with('s') {
                return root.to_string();
            }
        }
    }
    word.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_stopwords_and_short_words() {
        let words = content_words("I used only the cost of a project");
        assert_eq!(words.into_iter().collect::<Vec<_>>(), vec!["cost", "project"]);
    }

    #[test]
    fn stems_common_suffixes() {
        let words = content_words("materials hours calculated");
        assert!(words.contains("material"));
        assert!(words.contains("hour"));
        assert!(words.contains("calculat"));
    }

    #[test]
    fn keeps_double_s_words() {
        assert!(content_words("business loss").contains("business"));
    }

    #[test]
    fn normalized_strips_punctuation() {
        assert_eq!(normalized("  Foregone-Alternative, really!"), "foregone alternative really");
    }
}
