//! Discipline rules shipped with the binary.

use serde::Deserialize;

use crate::domain::{AppError, DisciplineRule};

const BUILTIN_DISCIPLINES: &str = include_str!("../assets/disciplines.toml");

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DisciplineFile {
    #[serde(default)]
    disciplines: Vec<DisciplineRule>,
}

/// Rules used when the configuration file defines none.
pub fn builtin_discipline_rules() -> Result<Vec<DisciplineRule>, AppError> {
    let file: DisciplineFile = toml::from_str(BUILTIN_DISCIPLINES)?;
    for rule in &file.disciplines {
        rule.validate()?;
    }
    Ok(file.disciplines)
}
