// src/recipe/requirement.rs

//! Dependency references declared by a recipe

use crate::error::{Error, Result};
use crate::version::VersionConstraint;
use std::fmt;

/// A named dependency plus its version constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub name: String,
    pub constraint: VersionConstraint,
    /// Reference as written in the recipe
    reference: String,
}

impl Requirement {
    pub fn new(name: impl Into<String>, constraint: VersionConstraint) -> Self {
        let name = name.into();
        let reference = format!("{}/{}", name, constraint);
        Self {
            name,
            constraint,
            reference,
        }
    }

    /// Parse a reference like "fmt/10.1.0" or "spdlog/[^1.11.0]"
    pub fn parse(reference: &str) -> Result<Self> {
        let (name, expr) = reference.trim().split_once('/').ok_or_else(|| {
            Error::ParseError(format!(
                "Requirement '{}' must be written as name/version",
                reference
            ))
        })?;

        if !is_valid_name(name) {
            return Err(Error::ParseError(format!(
                "Invalid dependency name '{}' in requirement '{}'",
                name, reference
            )));
        }

        Ok(Self {
            name: name.to_string(),
            constraint: VersionConstraint::parse(expr)?,
            reference: reference.trim().to_string(),
        })
    }

    /// The reference text this requirement was parsed from
    pub fn reference(&self) -> &str {
        &self.reference
    }
}

/// Dependency names become file names in generated artifacts
pub(crate) fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '+'))
        && name != "."
        && name != ".."
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reference)
    }
}
