// src/settings/mod.rs

//! Configuration axes and profile identities
//!
//! A build variant is identified by four axes: operating system, compiler
//! (kind and version), build type and target architecture. The canonical
//! serialization of those values is the *profile identity*; its digest
//! names the directories that isolate one variant's outputs from another's.
//!
//! Axis values arrive as `name=value` assignments, from a profile file
//! and/or the command line:
//!
//! ```toml
//! [settings]
//! os = "linux"
//! compiler = "gcc"
//! "compiler.version" = "13"
//! build_type = "Release"
//! arch = "x86_64"
//! ```

mod profile;

pub use profile::{parse_assignment, Profile};

use crate::error::{Error, Result};
use crate::hash::{hash_bytes, HashAlgorithm};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use strum::VariantNames;
use strum_macros::{Display, EnumString, VariantNames};

/// Names of the configuration axes a recipe can declare
pub const AXIS_NAMES: [&str; 4] = ["os", "compiler", "build_type", "arch"];

/// Length of the digest prefix used in profile directory names
const PROFILE_DIR_HASH_LEN: usize = 16;

/// Target operating system
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, VariantNames,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Os {
    Linux,
    Windows,
    #[strum(to_string = "macos", serialize = "darwin", serialize = "macosx")]
    Macos,
    Freebsd,
    Android,
}

/// Compiler family
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, VariantNames,
)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum CompilerKind {
    Gcc,
    Clang,
    AppleClang,
    Msvc,
}

/// CMake build type
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, VariantNames,
)]
#[strum(ascii_case_insensitive)]
pub enum BuildType {
    Debug,
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

/// Target architecture
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, VariantNames,
)]
#[strum(ascii_case_insensitive)]
pub enum Arch {
    #[strum(to_string = "x86", serialize = "i686", serialize = "i386")]
    X86,
    #[strum(to_string = "x86_64", serialize = "amd64", serialize = "x64")]
    X86_64,
    #[strum(to_string = "armv7")]
    Armv7,
    #[strum(to_string = "armv8", serialize = "aarch64", serialize = "arm64")]
    Armv8,
    #[strum(to_string = "riscv64")]
    Riscv64,
}

/// Compiler identity: family plus version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Compiler {
    pub kind: CompilerKind,
    pub version: String,
}

impl Compiler {
    pub fn new(kind: CompilerKind, version: impl Into<String>) -> Result<Self> {
        let version = version.into();
        validate_compiler_version(&version)?;
        Ok(Self { kind, version })
    }

    /// Major component of the compiler version
    pub fn major_version(&self) -> &str {
        self.version.split('.').next().unwrap_or(&self.version)
    }
}

impl fmt::Display for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.kind, self.version)
    }
}

impl FromStr for Compiler {
    type Err = Error;

    /// Parse the combined "gcc-13" / "apple-clang-15.0" form
    fn from_str(s: &str) -> Result<Self> {
        match parse_compiler_spec(s)? {
            (kind, Some(version)) => Ok(Self { kind, version }),
            (_, None) => Err(axis_error(
                "compiler.version",
                "",
                "compiler version is required",
            )),
        }
    }
}

/// The full set of configuration axes identifying one build variant
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AxisSet {
    pub os: Os,
    pub compiler: Compiler,
    pub build_type: BuildType,
    pub arch: Arch,
}

impl AxisSet {
    /// Create an axis set, rejecting combinations no toolchain can express
    pub fn new(os: Os, compiler: Compiler, build_type: BuildType, arch: Arch) -> Result<Self> {
        let axes = Self {
            os,
            compiler,
            build_type,
            arch,
        };
        axes.validate()?;
        Ok(axes)
    }

    /// Build an axis set from `name=value` assignments
    ///
    /// Later assignments override earlier ones, so profile values can be
    /// followed by command-line overrides. Every assigned axis must be
    /// recognized and declared by the recipe; every axis must be assigned.
    pub fn from_assignments(assignments: &[(String, String)], declared: &[String]) -> Result<Self> {
        let mut os = None;
        let mut compiler_kind = None;
        let mut compiler_version = None;
        let mut build_type = None;
        let mut arch = None;

        for (name, value) in assignments {
            let name = name.trim();
            let value = value.trim();
            let root = name.split('.').next().unwrap_or(name);

            if !AXIS_NAMES.contains(&root) {
                return Err(axis_error(name, value, "unrecognized axis name"));
            }
            if !declared.iter().any(|d| d == root) {
                return Err(axis_error(name, value, "axis is not declared by the recipe"));
            }

            match name {
                "os" => os = Some(parse_value::<Os>(name, value)?),
                "compiler" => {
                    let (kind, version) = parse_compiler_spec(value)?;
                    compiler_kind = Some(kind);
                    if version.is_some() {
                        compiler_version = version;
                    }
                }
                "compiler.version" => {
                    validate_compiler_version(value)?;
                    compiler_version = Some(value.to_string());
                }
                "build_type" => build_type = Some(parse_value::<BuildType>(name, value)?),
                "arch" => arch = Some(parse_value::<Arch>(name, value)?),
                _ => return Err(axis_error(name, value, "unrecognized axis name")),
            }
        }

        let missing = |axis: &str| axis_error(axis, "", "no value supplied");
        let compiler = Compiler {
            kind: compiler_kind.ok_or_else(|| missing("compiler"))?,
            version: compiler_version.ok_or_else(|| missing("compiler.version"))?,
        };

        Self::new(
            os.ok_or_else(|| missing("os"))?,
            compiler,
            build_type.ok_or_else(|| missing("build_type"))?,
            arch.ok_or_else(|| missing("arch"))?,
        )
    }

    /// Reject combinations the underlying toolchains cannot express
    pub fn validate(&self) -> Result<()> {
        validate_compiler_version(&self.compiler.version)?;

        match self.compiler.kind {
            CompilerKind::Msvc if self.os != Os::Windows => {
                return Err(axis_error(
                    "compiler",
                    &self.compiler.to_string(),
                    &format!("msvc cannot target {}", self.os),
                ));
            }
            CompilerKind::AppleClang if self.os != Os::Macos => {
                return Err(axis_error(
                    "compiler",
                    &self.compiler.to_string(),
                    &format!("apple-clang cannot target {}", self.os),
                ));
            }
            _ => {}
        }

        if self.os == Os::Macos && !matches!(self.arch, Arch::X86_64 | Arch::Armv8) {
            return Err(axis_error(
                "arch",
                &self.arch.to_string(),
                "macos only supports x86_64 and armv8",
            ));
        }

        Ok(())
    }

    /// Canonical `key=value` pairs, sorted by key
    pub fn canonical_pairs(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("arch", self.arch.to_string()),
            ("build_type", self.build_type.to_string()),
            ("compiler", self.compiler.kind.to_string()),
            ("compiler.version", self.compiler.version.clone()),
            ("os", self.os.to_string()),
        ])
    }

    /// Canonical serialization: sorted `key=value` pairs joined by `;`
    pub fn identity(&self) -> String {
        self.canonical_pairs()
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(";")
    }

    /// Stable profile identity derived from the canonical serialization
    pub fn profile_id(&self) -> ProfileId {
        let identity = self.identity();
        let digest = hash_bytes(HashAlgorithm::Xxh128, identity.as_bytes()).value;
        let dir_name = format!(
            "{}-{}",
            self.build_type.to_string().to_lowercase(),
            &digest[..PROFILE_DIR_HASH_LEN]
        );

        ProfileId {
            identity,
            digest,
            dir_name,
        }
    }
}

impl fmt::Display for AxisSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.identity())
    }
}

/// Identity of one configuration, used to isolate build outputs
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProfileId {
    /// Canonical axis serialization
    pub identity: String,
    /// XXH128 digest of `identity`
    pub digest: String,
    /// Directory name for this profile (`<build type>-<digest prefix>`)
    pub dir_name: String,
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.dir_name)
    }
}

fn axis_error(axis: &str, value: &str, reason: &str) -> Error {
    Error::InvalidAxisValue {
        axis: axis.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_value<T>(axis: &str, value: &str) -> Result<T>
where
    T: FromStr + VariantNames,
{
    value.parse::<T>().map_err(|_| {
        axis_error(
            axis,
            value,
            &format!("expected one of: {}", T::VARIANTS.join(", ")),
        )
    })
}

/// Split "gcc-13" into its kind and optional version
fn parse_compiler_spec(value: &str) -> Result<(CompilerKind, Option<String>)> {
    if let Ok(kind) = value.parse::<CompilerKind>() {
        return Ok((kind, None));
    }

    if let Some((kind, version)) = value.rsplit_once('-')
        && let Ok(kind) = kind.parse::<CompilerKind>()
    {
        validate_compiler_version(version)?;
        return Ok((kind, Some(version.to_string())));
    }

    Err(axis_error(
        "compiler",
        value,
        &format!(
            "expected one of: {} (optionally suffixed with -<version>)",
            CompilerKind::VARIANTS.join(", ")
        ),
    ))
}

fn validate_compiler_version(version: &str) -> Result<()> {
    let valid = !version.is_empty()
        && version
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()));

    if valid {
        Ok(())
    } else {
        Err(axis_error(
            "compiler.version",
            version,
            "expected a dotted numeric version",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declared() -> Vec<String> {
        AXIS_NAMES.iter().map(|s| s.to_string()).collect()
    }

    fn assign(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn linux_gcc() -> AxisSet {
        AxisSet::from_assignments(
            &assign(&[
                ("os", "linux"),
                ("compiler", "gcc-13"),
                ("build_type", "Release"),
                ("arch", "x86_64"),
            ]),
            &declared(),
        )
        .unwrap()
    }

    #[test]
    fn test_from_assignments_combined_compiler() {
        let axes = linux_gcc();
        assert_eq!(axes.os, Os::Linux);
        assert_eq!(axes.compiler.kind, CompilerKind::Gcc);
        assert_eq!(axes.compiler.version, "13");
        assert_eq!(axes.build_type, BuildType::Release);
        assert_eq!(axes.arch, Arch::X86_64);
    }

    #[test]
    fn test_from_assignments_split_compiler() {
        let axes = AxisSet::from_assignments(
            &assign(&[
                ("arch", "x86_64"),
                ("compiler.version", "13"),
                ("build_type", "Release"),
                ("compiler", "gcc"),
                ("os", "Linux"),
            ]),
            &declared(),
        )
        .unwrap();
        assert_eq!(axes, linux_gcc());
    }

    #[test]
    fn test_identity_independent_of_assignment_order() {
        let reordered = AxisSet::from_assignments(
            &assign(&[
                ("build_type", "release"),
                ("arch", "amd64"),
                ("os", "linux"),
                ("compiler", "gcc-13"),
            ]),
            &declared(),
        )
        .unwrap();
        assert_eq!(reordered.identity(), linux_gcc().identity());
        assert_eq!(reordered.profile_id(), linux_gcc().profile_id());
        assert_eq!(
            linux_gcc().identity(),
            "arch=x86_64;build_type=Release;compiler=gcc;compiler.version=13;os=linux"
        );
    }

    #[test]
    fn test_later_assignment_overrides() {
        let axes = AxisSet::from_assignments(
            &assign(&[
                ("os", "linux"),
                ("compiler", "gcc-13"),
                ("build_type", "Release"),
                ("arch", "x86_64"),
                ("build_type", "Debug"),
                ("compiler.version", "14"),
            ]),
            &declared(),
        )
        .unwrap();
        assert_eq!(axes.build_type, BuildType::Debug);
        assert_eq!(axes.compiler.version, "14");
    }

    #[test]
    fn test_distinct_axes_distinct_profiles() {
        let release = linux_gcc();
        let mut debug = release.clone();
        debug.build_type = BuildType::Debug;
        let mut clang = release.clone();
        clang.compiler = Compiler::new(CompilerKind::Clang, "17").unwrap();

        let ids = [release.profile_id(), debug.profile_id(), clang.profile_id()];
        assert_ne!(ids[0], ids[1]);
        assert_ne!(ids[0], ids[2]);
        assert_ne!(ids[1].dir_name, ids[2].dir_name);
        assert!(ids[0].dir_name.starts_with("release-"));
        assert_eq!(ids[0].dir_name.len(), "release-".len() + PROFILE_DIR_HASH_LEN);
    }

    #[test]
    fn test_unknown_axis_rejected() {
        let err = AxisSet::from_assignments(&assign(&[("libcxx", "libstdc++11")]), &declared())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidAxisValue { ref axis, .. } if axis == "libcxx"));

        let err = AxisSet::from_assignments(&assign(&[("os.version", "12")]), &declared())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidAxisValue { .. }));
    }

    #[test]
    fn test_undeclared_axis_rejected() {
        let declared = vec!["os".to_string()];
        let err = AxisSet::from_assignments(&assign(&[("arch", "x86_64")]), &declared)
            .unwrap_err();
        assert!(err.to_string().contains("not declared"));
    }

    #[test]
    fn test_missing_axis_rejected() {
        let err = AxisSet::from_assignments(
            &assign(&[("os", "linux"), ("compiler", "gcc-13"), ("arch", "x86_64")]),
            &declared(),
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidAxisValue { ref axis, .. } if axis == "build_type"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        for (axis, value) in [
            ("os", "plan9"),
            ("build_type", "Fast"),
            ("arch", "sparc"),
            ("compiler", "tcc-1"),
            ("compiler", "gcc-thirteen"),
        ] {
            let result = AxisSet::from_assignments(&assign(&[(axis, value)]), &declared());
            assert!(result.is_err(), "{}={} should be rejected", axis, value);
        }
    }

    #[test]
    fn test_unsupported_combinations() {
        let msvc_linux = AxisSet::new(
            Os::Linux,
            Compiler::new(CompilerKind::Msvc, "193").unwrap(),
            BuildType::Release,
            Arch::X86_64,
        );
        assert!(msvc_linux.is_err());

        let apple_clang_linux = AxisSet::new(
            Os::Linux,
            "apple-clang-15".parse().unwrap(),
            BuildType::Release,
            Arch::X86_64,
        );
        assert!(apple_clang_linux.is_err());

        let macos_riscv = AxisSet::new(
            Os::Macos,
            "apple-clang-15".parse().unwrap(),
            BuildType::Release,
            Arch::Riscv64,
        );
        assert!(macos_riscv.is_err());

        let macos_arm = AxisSet::new(
            Os::Macos,
            "apple-clang-15.0".parse().unwrap(),
            BuildType::Debug,
            Arch::Armv8,
        );
        assert!(macos_arm.is_ok());
    }

    #[test]
    fn test_aliases() {
        assert_eq!("darwin".parse::<Os>().unwrap(), Os::Macos);
        assert_eq!("aarch64".parse::<Arch>().unwrap(), Arch::Armv8);
        assert_eq!(Arch::Armv8.to_string(), "armv8");
        assert_eq!(BuildType::RelWithDebInfo.to_string(), "RelWithDebInfo");
        assert_eq!(CompilerKind::AppleClang.to_string(), "apple-clang");
    }
}
