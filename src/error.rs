// src/error.rs

//! Error types shared by every stage of the recipe lifecycle

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// External toolchain step that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolchainStep {
    Configure,
    Build,
    Install,
}

impl ToolchainStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configure => "configure",
            Self::Build => "build",
            Self::Install => "install",
        }
    }
}

impl fmt::Display for ToolchainStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur while loading, resolving, generating or building a recipe
#[derive(Error, Debug)]
pub enum Error {
    /// The dependency name is not present in the index at all
    #[error("unknown dependency '{0}': not present in the index")]
    UnknownDependency(String),

    /// The index knows the dependency but no version satisfies the constraint
    #[error("no version of '{name}' satisfies '{constraint}' (available: {available})")]
    UnsatisfiableConstraint {
        name: String,
        constraint: String,
        available: String,
    },

    /// Two requirements name the same dependency
    #[error("duplicate requirement for '{0}'")]
    DuplicateRequirement(String),

    /// A version string could not be parsed
    #[error("invalid version '{0}'")]
    InvalidVersion(String),

    /// A version constraint expression could not be parsed
    #[error("invalid version constraint '{expr}': {reason}")]
    InvalidConstraint { expr: String, reason: String },

    /// A configuration axis name or value is not supported
    #[error("invalid value '{value}' for axis '{axis}': {reason}")]
    InvalidAxisValue {
        axis: String,
        value: String,
        reason: String,
    },

    /// A layout directory could not be created
    #[error("failed to create layout directory {}: {source}", .path.display())]
    LayoutIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A generated artifact could not be written
    #[error("failed to write generated artifact {}: {source}", .path.display())]
    GenerationIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A resolved dependency lacks metadata the toolchain needs
    #[error("dependency '{name}' is missing build metadata: {detail}")]
    MissingDependencyMetadata { name: String, detail: String },

    /// The external build toolchain failed
    #[error("{step} step failed ({}): {detail}", exit_status_text(.exit_status))]
    ExternalToolchain {
        step: ToolchainStep,
        exit_status: Option<i32>,
        detail: String,
    },

    /// The dependency index could not be read
    #[error("index error: {0}")]
    IndexError(String),

    /// A recipe, profile or configuration file is malformed
    #[error("parse error: {0}")]
    ParseError(String),

    /// Generic filesystem error
    #[error("I/O error: {0}")]
    IoError(String),
}

fn exit_status_text(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {}", code),
        None => "no exit status".to_string(),
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::IoError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toolchain_error_display() {
        let err = Error::ExternalToolchain {
            step: ToolchainStep::Configure,
            exit_status: Some(1),
            detail: "CMakeLists.txt not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "configure step failed (exit status 1): CMakeLists.txt not found"
        );

        let err = Error::ExternalToolchain {
            step: ToolchainStep::Build,
            exit_status: None,
            detail: "terminated by signal 2".to_string(),
        };
        assert!(err.to_string().contains("no exit status"));
    }

    #[test]
    fn test_unsatisfiable_display_names_dependency() {
        let err = Error::UnsatisfiableConstraint {
            name: "fmt".to_string(),
            constraint: "10.1.0".to_string(),
            available: "9.1.0, 10.0.0".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'fmt'"));
        assert!(msg.contains("9.1.0, 10.0.0"));
    }
}
