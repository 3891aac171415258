// src/generate/cmake.rs

//! CMake dependency-lookup and toolchain files
//!
//! Each resolved dependency gets a `<name>-config.cmake` declaring an
//! imported INTERFACE target, plus a `<name>-config-version.cmake` with
//! same-major compatibility. The toolchain file pins the build type and
//! compilers for the axis set and points `find_package` at the directory
//! it lives in.

use crate::resolver::{BuildInfo, ResolvedDependency};
use crate::settings::{Arch, AxisSet, CompilerKind, Os};
use std::path::Path;

/// File name of the generated toolchain file
pub const TOOLCHAIN_FILE: &str = "galley_toolchain.cmake";

const HEADER: &str = "# Generated by galley. Changes are overwritten on the next run.";

pub(super) fn config_file_name(dep: &ResolvedDependency) -> String {
    format!("{}-config.cmake", dep.name.to_lowercase())
}

pub(super) fn config_version_file_name(dep: &ResolvedDependency) -> String {
    format!("{}-config-version.cmake", dep.name.to_lowercase())
}

/// Render `<name>-config.cmake`
pub(super) fn render_config(dep: &ResolvedDependency, info: &BuildInfo) -> String {
    let target = dep.cmake_target();
    let includes = join_paths(&info.include_dirs);

    let mut lines = vec![
        HEADER.to_string(),
        format!("# {}/{}", dep.name, dep.version),
        String::new(),
        format!("set({}_VERSION {})", dep.name, quote(dep.version.as_str())),
        format!("set({}_INCLUDE_DIRS {})", dep.name, quote(&includes)),
        format!("set({}_LIBRARIES {})", dep.name, target),
        String::new(),
        format!("if(NOT TARGET {})", target),
        format!("    add_library({} INTERFACE IMPORTED)", target),
        format!("    set_target_properties({} PROPERTIES", target),
        format!("        INTERFACE_INCLUDE_DIRECTORIES {}", quote(&includes)),
    ];

    if !info.lib_dirs.is_empty() {
        lines.push(format!(
            "        INTERFACE_LINK_DIRECTORIES {}",
            quote(&join_paths(&info.lib_dirs))
        ));
    }
    if !info.libs.is_empty() {
        lines.push(format!(
            "        INTERFACE_LINK_LIBRARIES {}",
            quote(&info.libs.join(";"))
        ));
    }
    if !info.defines.is_empty() {
        lines.push(format!(
            "        INTERFACE_COMPILE_DEFINITIONS {}",
            quote(&info.defines.join(";"))
        ));
    }

    lines.push("    )".to_string());
    lines.push("endif()".to_string());

    finish(lines)
}

/// Render `<name>-config-version.cmake`
///
/// A request is compatible when it asks for the same major version and no
/// more than the resolved version.
pub(super) fn render_config_version(dep: &ResolvedDependency) -> String {
    let major = dep.version.as_semver().major;

    let lines = vec![
        HEADER.to_string(),
        format!("# {}/{}", dep.name, dep.version),
        String::new(),
        format!("set(PACKAGE_VERSION {})", quote(dep.version.as_str())),
        String::new(),
        "if(PACKAGE_FIND_VERSION VERSION_GREATER PACKAGE_VERSION)".to_string(),
        "    set(PACKAGE_VERSION_COMPATIBLE FALSE)".to_string(),
        format!("elseif(NOT PACKAGE_FIND_VERSION_MAJOR STREQUAL \"{}\")", major),
        "    set(PACKAGE_VERSION_COMPATIBLE FALSE)".to_string(),
        "else()".to_string(),
        "    set(PACKAGE_VERSION_COMPATIBLE TRUE)".to_string(),
        "    if(PACKAGE_FIND_VERSION STREQUAL PACKAGE_VERSION)".to_string(),
        "        set(PACKAGE_VERSION_EXACT TRUE)".to_string(),
        "    endif()".to_string(),
        "endif()".to_string(),
    ];

    finish(lines)
}

/// Render the toolchain file for an axis set
///
/// `dependencies` are the names `find_package` should resolve from the
/// generators directory.
pub(super) fn render_toolchain<'a>(
    axes: &AxisSet,
    dependencies: impl IntoIterator<Item = &'a str>,
) -> String {
    let (cc, cxx) = compiler_programs(axes.compiler.kind);

    let mut lines = vec![
        HEADER.to_string(),
        format!("# Profile: {}", axes.identity()),
        String::new(),
        "include_guard()".to_string(),
        String::new(),
        format!(
            "set(CMAKE_BUILD_TYPE {} CACHE STRING \"Build type\" FORCE)",
            quote(&axes.build_type.to_string())
        ),
        format!("set(CMAKE_C_COMPILER {})", quote(cc)),
        format!("set(CMAKE_CXX_COMPILER {})", quote(cxx)),
    ];

    if let Some(flag) = arch_flag(axes) {
        lines.push(String::new());
        lines.push(format!("string(APPEND CMAKE_C_FLAGS_INIT \" {}\")", flag));
        lines.push(format!("string(APPEND CMAKE_CXX_FLAGS_INIT \" {}\")", flag));
    }

    if axes.os == Os::Macos {
        let arch = match axes.arch {
            Arch::Armv8 => "arm64",
            _ => "x86_64",
        };
        lines.push(String::new());
        lines.push(format!(
            "set(CMAKE_OSX_ARCHITECTURES {} CACHE STRING \"\" FORCE)",
            quote(arch)
        ));
    }

    lines.push(String::new());
    lines.push(format!("set(GALLEY_OS {})", quote(system_name(axes.os))));
    lines.push(format!("set(GALLEY_ARCH {})", quote(processor_name(axes.arch))));
    lines.push(format!("set(GALLEY_COMPILER {})", quote(&axes.compiler.kind.to_string())));
    lines.push(format!(
        "set(GALLEY_COMPILER_VERSION {})",
        quote(&axes.compiler.version)
    ));

    lines.push(String::new());
    lines.push("list(PREPEND CMAKE_PREFIX_PATH \"${CMAKE_CURRENT_LIST_DIR}\")".to_string());
    lines.push("list(PREPEND CMAKE_MODULE_PATH \"${CMAKE_CURRENT_LIST_DIR}\")".to_string());
    lines.push("set(CMAKE_FIND_PACKAGE_PREFER_CONFIG ON)".to_string());

    let mut first = true;
    for name in dependencies {
        if first {
            lines.push(String::new());
            first = false;
        }
        lines.push(format!("set({}_DIR \"${{CMAKE_CURRENT_LIST_DIR}}\")", name));
    }

    finish(lines)
}

fn compiler_programs(kind: CompilerKind) -> (&'static str, &'static str) {
    match kind {
        CompilerKind::Gcc => ("gcc", "g++"),
        CompilerKind::Clang | CompilerKind::AppleClang => ("clang", "clang++"),
        CompilerKind::Msvc => ("cl", "cl"),
    }
}

/// Word-size flag for GCC-style drivers
fn arch_flag(axes: &AxisSet) -> Option<&'static str> {
    if matches!(axes.compiler.kind, CompilerKind::Msvc) || axes.os == Os::Macos {
        return None;
    }
    match axes.arch {
        Arch::X86 => Some("-m32"),
        Arch::X86_64 => Some("-m64"),
        _ => None,
    }
}

/// Value CMake reports as `CMAKE_SYSTEM_NAME` for the OS
fn system_name(os: Os) -> &'static str {
    match os {
        Os::Linux => "Linux",
        Os::Windows => "Windows",
        Os::Macos => "Darwin",
        Os::Freebsd => "FreeBSD",
        Os::Android => "Android",
    }
}

fn processor_name(arch: Arch) -> &'static str {
    match arch {
        Arch::X86 => "x86",
        Arch::X86_64 => "x86_64",
        Arch::Armv7 => "armv7",
        Arch::Armv8 => "aarch64",
        Arch::Riscv64 => "riscv64",
    }
}

/// CMake list of paths, always with forward slashes
fn join_paths(paths: &[impl AsRef<Path>]) -> String {
    paths
        .iter()
        .map(|p| p.as_ref().to_string_lossy().replace('\\', "/"))
        .collect::<Vec<_>>()
        .join(";")
}

/// Quote a value as a CMake quoted argument
fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn finish(lines: Vec<String>) -> String {
    let mut content = lines.join("\n");
    content.push('\n');
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::Requirement;
    use crate::resolver::IndexEntry;
    use crate::settings::{BuildType, Compiler};
    use crate::version::PackageVersion;
    use std::path::PathBuf;

    fn fmt() -> (ResolvedDependency, BuildInfo) {
        let info = BuildInfo {
            include_dirs: vec![PathBuf::from("/opt/deps/fmt/10.1.0/include")],
            lib_dirs: vec![PathBuf::from("/opt/deps/fmt/10.1.0/lib")],
            libs: vec!["fmt".to_string()],
            defines: vec![],
            cmake_target: None,
        };
        let entry = IndexEntry::new(PackageVersion::parse("10.1.0").unwrap(), "fmt-10.1.0")
            .with_build_info(info.clone());
        let dep = ResolvedDependency::new(&Requirement::parse("fmt/10.1.0").unwrap(), entry).unwrap();
        (dep, info)
    }

    fn axes(os: Os, compiler: &str, arch: Arch) -> AxisSet {
        AxisSet::new(
            os,
            compiler.parse::<Compiler>().unwrap(),
            BuildType::Release,
            arch,
        )
        .unwrap()
    }

    #[test]
    fn test_config_declares_imported_target() {
        let (dep, info) = fmt();
        let content = render_config(&dep, &info);

        assert_eq!(config_file_name(&dep), "fmt-config.cmake");
        assert!(content.contains("add_library(fmt::fmt INTERFACE IMPORTED)"));
        assert!(content.contains("INTERFACE_INCLUDE_DIRECTORIES \"/opt/deps/fmt/10.1.0/include\""));
        assert!(content.contains("INTERFACE_LINK_LIBRARIES \"fmt\""));
        assert!(!content.contains("INTERFACE_COMPILE_DEFINITIONS"));
        assert!(content.ends_with("endif()\n"));
    }

    #[test]
    fn test_config_version_same_major() {
        let (dep, _) = fmt();
        let content = render_config_version(&dep);

        assert_eq!(config_version_file_name(&dep), "fmt-config-version.cmake");
        assert!(content.contains("set(PACKAGE_VERSION \"10.1.0\")"));
        assert!(content.contains("PACKAGE_FIND_VERSION_MAJOR STREQUAL \"10\""));
    }

    #[test]
    fn test_toolchain_linux_gcc() {
        let content = render_toolchain(&axes(Os::Linux, "gcc-13", Arch::X86_64), ["fmt", "spdlog"]);

        assert!(content.contains("set(CMAKE_BUILD_TYPE \"Release\" CACHE STRING \"Build type\" FORCE)"));
        assert!(content.contains("set(CMAKE_CXX_COMPILER \"g++\")"));
        assert!(content.contains("string(APPEND CMAKE_CXX_FLAGS_INIT \" -m64\")"));
        assert!(content.contains("set(fmt_DIR \"${CMAKE_CURRENT_LIST_DIR}\")"));
        assert!(content.contains("set(spdlog_DIR \"${CMAKE_CURRENT_LIST_DIR}\")"));
        assert!(!content.contains("CMAKE_OSX_ARCHITECTURES"));
    }

    #[test]
    fn test_toolchain_macos_arm() {
        let content =
            render_toolchain(&axes(Os::Macos, "apple-clang-15", Arch::Armv8), std::iter::empty());

        assert!(content.contains("set(CMAKE_OSX_ARCHITECTURES \"arm64\" CACHE STRING \"\" FORCE)"));
        assert!(content.contains("set(GALLEY_OS \"Darwin\")"));
        assert!(!content.contains("-m64"));
        assert!(!content.contains("_DIR"));
    }

    #[test]
    fn test_toolchain_msvc() {
        let content =
            render_toolchain(&axes(Os::Windows, "msvc-193", Arch::X86), std::iter::empty());
        assert!(content.contains("set(CMAKE_C_COMPILER \"cl\")"));
        assert!(!content.contains("-m32"));
    }

    #[test]
    fn test_windows_paths_use_forward_slashes() {
        assert_eq!(
            join_paths(&[PathBuf::from(r"C:\deps\fmt\include"), PathBuf::from("/usr/include")]),
            "C:/deps/fmt/include;/usr/include"
        );
        assert_eq!(quote("a\"b"), "\"a\\\"b\"");
    }
}
