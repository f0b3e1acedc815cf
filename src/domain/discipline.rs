//! Discipline profiles: vocabulary and analogy bias derived from a student's background.

use serde::{Deserialize, Serialize};

use crate::domain::AppError;

/// Label carried by the generic profile when no input was supplied.
pub const DEFAULT_DISCIPLINE_LABEL: &str = "general stem";

/// Configured mapping from discipline labels to phrasing hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DisciplineRule {
    /// Canonical discipline name, e.g. `engineering`.
    pub name: String,
    /// Additional labels that resolve to this rule, e.g. `mechanical`.
    #[serde(default)]
    pub aliases: Vec<String>,
    /// Terms from the discipline to borrow when phrasing assumptions.
    #[serde(default)]
    pub vocabulary: Vec<String>,
    /// Analogies that connect (and contrast) the discipline with economics.
    #[serde(default)]
    pub analogies: Vec<String>,
    /// Free-form guidance forwarded to the completion service.
    #[serde(default)]
    pub guidance: String,
}

impl DisciplineRule {
    pub fn validate(&self) -> Result<(), AppError> {
        if normalize_label(&self.name).is_empty() {
            return Err(AppError::InvalidConfig("discipline name must not be empty".to_string()));
        }
        if self.aliases.iter().any(|alias| normalize_label(alias).is_empty()) {
            return Err(AppError::InvalidConfig(format!(
                "discipline '{}' has an empty alias",
                self.name
            )));
        }
        Ok(())
    }

    fn matches(&self, padded_label: &str) -> bool {
        std::iter::once(&self.name)
            .chain(self.aliases.iter())
            .map(|candidate| format!(" {} ", match_form(candidate)))
            .any(|needle| padded_label.contains(&needle))
    }
}

/// Phrasing bias resolved for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisciplineProfile {
    /// Normalized label as supplied by the student.
    pub label: String,
    /// Name of the rule that matched; `None` for the generic profile.
    pub rule: Option<String>,
    pub vocabulary: Vec<String>,
    pub analogies: Vec<String>,
    pub guidance: String,
}

impl DisciplineProfile {
    /// Generic profile with no vocabulary bias.
    pub fn generic(label: impl Into<String>) -> Self {
        let label = label.into();
        let label = if label.is_empty() { DEFAULT_DISCIPLINE_LABEL.to_string() } else { label };
        Self { label, rule: None, vocabulary: Vec::new(), analogies: Vec::new(), guidance: String::new() }
    }

    pub fn is_generic(&self) -> bool {
        self.rule.is_none()
    }

    pub fn has_vocabulary(&self) -> bool {
        !self.vocabulary.is_empty() || !self.analogies.is_empty()
    }

    /// Name used when addressing the student's field in prompts.
    pub fn display_name(&self) -> &str {
        self.rule.as_deref().unwrap_or(&self.label)
    }
}

/// Resolves free-form discipline labels against configured rules.
#[derive(Debug, Clone, Default)]
pub struct DisciplineResolver {
    rules: Vec<DisciplineRule>,
}

impl DisciplineResolver {
    pub fn new(rules: Vec<DisciplineRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[DisciplineRule] {
        &self.rules
    }

    /// Never fails: unknown labels resolve to the generic profile.
    pub fn resolve(&self, label: &str) -> DisciplineProfile {
        let normalized = normalize_label(label);
        let padded = format!(" {} ", match_form(&normalized));

        match self.rules.iter().find(|rule| rule.matches(&padded)) {
            Some(rule) => DisciplineProfile {
                label: normalized,
                rule: Some(normalize_label(&rule.name)),
                vocabulary: rule.vocabulary.clone(),
                analogies: rule.analogies.clone(),
                guidance: rule.guidance.trim().to_string(),
            },
            None => DisciplineProfile::generic(normalized),
        }
    }
}

/// Trim, case-fold and collapse inner whitespace.
pub fn normalize_label(label: &str) -> String {
    label.split_whitespace().map(str::to_lowercase).collect::<Vec<_>>().join(" ")
}

fn match_form(label: &str) -> String {
    label
        .to_lowercase()
        .chars()
        .map(|ch| if ch.is_alphanumeric() { ch } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
