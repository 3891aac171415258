// src/settings/profile.rs

//! Named profiles: TOML files holding axis assignments

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct ProfileFile {
    #[serde(default)]
    settings: BTreeMap<String, String>,
}

/// A named set of axis assignments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub name: String,
    /// Assignments in key order
    pub assignments: Vec<(String, String)>,
}

impl Profile {
    /// Parse a profile from TOML content
    pub fn parse(name: &str, content: &str) -> Result<Self> {
        let file: ProfileFile = toml::from_str(content)
            .map_err(|e| Error::ParseError(format!("Invalid profile '{}': {}", name, e)))?;

        Ok(Self {
            name: name.to_string(),
            assignments: file.settings.into_iter().collect(),
        })
    }

    /// Load a profile from a file; the profile is named after the file stem
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::IoError(format!("Failed to read profile {}: {}", path.display(), e))
        })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "default".to_string());

        Self::parse(&name, &content)
    }
}

/// Parse a command-line assignment like "os=linux"
pub fn parse_assignment(s: &str) -> Result<(String, String)> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| Error::ParseError(format!("Setting '{}' must be written as name=value", s)))?;

    let name = name.trim();
    let value = value.trim();
    if name.is_empty() || value.is_empty() {
        return Err(Error::ParseError(format!(
            "Setting '{}' must be written as name=value",
            s
        )));
    }

    Ok((name.to_string(), value.to_string()))
}
