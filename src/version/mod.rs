// src/version/mod.rs

//! Version handling and constraint satisfaction for recipe requirements
//!
//! Versions are semver-compatible numerics. Upstream projects often publish
//! short versions, so these are normalized before comparison:
//! - "1" → 1.0.0
//! - "0.1" → 0.1.0
//! - "1.02.3" → 1.2.3
//!
//! Constraint expressions follow the reference syntax used in recipes:
//! - "10.1.0" → exact pin
//! - "[^1.11.0]" → caret range (>= 1.11.0, same major)
//! - "[~1.11.0]" → tilde range (>= 1.11.0, same major.minor)
//! - "[>=1.0 <2.0]" → every term must hold
//! - "[*]" → any released version

use crate::error::{Error, Result};
use semver::{Prerelease, Version};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A concrete package version as published in a dependency index
///
/// Keeps the original spelling for display while comparing on the
/// normalized semver value.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackageVersion {
    raw: String,
    semver: Version,
}

impl PackageVersion {
    /// Parse a version string, accepting short numeric forms
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidVersion(s.to_string()));
        }

        if let Ok(semver) = Version::parse(s) {
            return Ok(Self {
                raw: s.to_string(),
                semver,
            });
        }

        let (core, pre) = match s.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (s, None),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() > 3 {
            return Err(Error::InvalidVersion(s.to_string()));
        }

        let mut numbers = [0u64; 3];
        for (slot, part) in numbers.iter_mut().zip(&parts) {
            *slot = part
                .parse::<u64>()
                .map_err(|_| Error::InvalidVersion(s.to_string()))?;
        }

        let mut semver = Version::new(numbers[0], numbers[1], numbers[2]);
        if let Some(pre) = pre {
            semver.pre = Prerelease::new(pre).map_err(|_| Error::InvalidVersion(s.to_string()))?;
        }

        Ok(Self {
            raw: s.to_string(),
            semver,
        })
    }

    /// The normalized semver value used for comparisons
    pub fn as_semver(&self) -> &Version {
        &self.semver
    }

    /// The version as it was written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_prerelease(&self) -> bool {
        !self.semver.pre.is_empty()
    }
}

impl PartialEq for PackageVersion {
    fn eq(&self, other: &Self) -> bool {
        self.semver == other.semver
    }
}

impl Eq for PackageVersion {}

impl Hash for PackageVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.semver.hash(state);
    }
}

impl Ord for PackageVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.semver.cmp(&other.semver)
    }
}

impl PartialOrd for PackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for PackageVersion {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<PackageVersion> for String {
    fn from(v: PackageVersion) -> Self {
        v.raw
    }
}

/// Version constraint of a single requirement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionConstraint {
    /// Any released version
    Any,
    /// Exact version match
    Exact(PackageVersion),
    /// At least this version, same major (same minor while major is 0)
    Caret(PackageVersion),
    /// At least this version, same major and minor
    Tilde(PackageVersion),
    GreaterThan(PackageVersion),
    GreaterOrEqual(PackageVersion),
    LessThan(PackageVersion),
    LessOrEqual(PackageVersion),
    /// Every term must be satisfied (for ranges like "[>=1.0 <2.0]")
    All(Vec<VersionConstraint>),
}

impl VersionConstraint {
    /// Parse a constraint expression
    ///
    /// A bare version is an exact pin. Bracketed expressions are ranges;
    /// operator terms are also accepted without brackets ("^1.11.0").
    pub fn parse(expr: &str) -> Result<Self> {
        let s = expr.trim();
        if s.is_empty() {
            return Err(invalid(expr, "empty constraint"));
        }

        if let Some(inner) = s.strip_prefix('[') {
            let inner = inner
                .strip_suffix(']')
                .ok_or_else(|| invalid(expr, "missing closing ']'"))?;
            return Self::parse_range(expr, inner);
        }

        if s.starts_with(['^', '~', '>', '<', '=', '*']) {
            return Self::parse_range(expr, s);
        }

        let version = PackageVersion::parse(s)
            .map_err(|_| invalid(expr, &format!("invalid version '{}'", s)))?;
        Ok(VersionConstraint::Exact(version))
    }

    fn parse_range(expr: &str, inner: &str) -> Result<Self> {
        let mut terms = inner
            .split_whitespace()
            .map(|term| Self::parse_term(expr, term))
            .collect::<Result<Vec<_>>>()?;

        match terms.len() {
            0 => Err(invalid(expr, "empty range")),
            1 => Ok(terms.remove(0)),
            _ => Ok(VersionConstraint::All(terms)),
        }
    }

    fn parse_term(expr: &str, term: &str) -> Result<Self> {
        let version = |s: &str| {
            PackageVersion::parse(s).map_err(|_| invalid(expr, &format!("invalid version '{}'", s)))
        };

        // Check two-character operators first
        if term == "*" {
            Ok(VersionConstraint::Any)
        } else if let Some(rest) = term.strip_prefix(">=") {
            Ok(VersionConstraint::GreaterOrEqual(version(rest)?))
        } else if let Some(rest) = term.strip_prefix("<=") {
            Ok(VersionConstraint::LessOrEqual(version(rest)?))
        } else if let Some(rest) = term.strip_prefix('>') {
            Ok(VersionConstraint::GreaterThan(version(rest)?))
        } else if let Some(rest) = term.strip_prefix('<') {
            Ok(VersionConstraint::LessThan(version(rest)?))
        } else if let Some(rest) = term.strip_prefix('^') {
            Ok(VersionConstraint::Caret(version(rest)?))
        } else if let Some(rest) = term.strip_prefix('~') {
            Ok(VersionConstraint::Tilde(version(rest)?))
        } else if let Some(rest) = term.strip_prefix('=') {
            Ok(VersionConstraint::Exact(version(rest)?))
        } else {
            Ok(VersionConstraint::Exact(version(term)?))
        }
    }

    /// Check if a version satisfies this constraint
    ///
    /// Pre-release versions only satisfy exact pins and ranges whose bound
    /// is itself a pre-release.
    pub fn satisfies(&self, version: &PackageVersion) -> bool {
        if version.is_prerelease() && !self.admits_prerelease() {
            return false;
        }
        self.matches(version.as_semver())
    }

    fn admits_prerelease(&self) -> bool {
        match self {
            VersionConstraint::Any => false,
            VersionConstraint::Exact(_) => true,
            VersionConstraint::Caret(b)
            | VersionConstraint::Tilde(b)
            | VersionConstraint::GreaterThan(b)
            | VersionConstraint::GreaterOrEqual(b)
            | VersionConstraint::LessThan(b)
            | VersionConstraint::LessOrEqual(b) => b.is_prerelease(),
            VersionConstraint::All(terms) => terms.iter().any(|t| t.admits_prerelease()),
        }
    }

    fn matches(&self, v: &Version) -> bool {
        match self {
            VersionConstraint::Any => true,
            VersionConstraint::Exact(b) => v == b.as_semver(),
            VersionConstraint::Caret(b) => {
                let b = b.as_semver();
                let compatible = if b.major == 0 {
                    v.major == 0 && v.minor == b.minor
                } else {
                    v.major == b.major
                };
                v >= b && compatible
            }
            VersionConstraint::Tilde(b) => {
                let b = b.as_semver();
                v >= b && v.major == b.major && v.minor == b.minor
            }
            VersionConstraint::GreaterThan(b) => v > b.as_semver(),
            VersionConstraint::GreaterOrEqual(b) => v >= b.as_semver(),
            VersionConstraint::LessThan(b) => v < b.as_semver(),
            VersionConstraint::LessOrEqual(b) => v <= b.as_semver(),
            VersionConstraint::All(terms) => terms.iter().all(|t| t.matches(v)),
        }
    }

    /// Whether this constraint pins a single version
    pub fn is_exact(&self) -> bool {
        matches!(self, VersionConstraint::Exact(_))
    }

    fn fmt_term(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionConstraint::Any => write!(f, "*"),
            VersionConstraint::Exact(v) => write!(f, "={}", v),
            VersionConstraint::Caret(v) => write!(f, "^{}", v),
            VersionConstraint::Tilde(v) => write!(f, "~{}", v),
            VersionConstraint::GreaterThan(v) => write!(f, ">{}", v),
            VersionConstraint::GreaterOrEqual(v) => write!(f, ">={}", v),
            VersionConstraint::LessThan(v) => write!(f, "<{}", v),
            VersionConstraint::LessOrEqual(v) => write!(f, "<={}", v),
            VersionConstraint::All(terms) => {
                for (i, term) in terms.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    term.fmt_term(f)?;
                }
                Ok(())
            }
        }
    }
}

fn invalid(expr: &str, reason: &str) -> Error {
    Error::InvalidConstraint {
        expr: expr.to_string(),
        reason: reason.to_string(),
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let VersionConstraint::Exact(v) = self {
            return write!(f, "{}", v);
        }
        write!(f, "[")?;
        self.fmt_term(f)?;
        write!(f, "]")
    }
}
