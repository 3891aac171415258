// src/generate/presets.rs

//! CMake presets document
//!
//! Uses schema version 4 so every path can be written relative to the
//! presets file through `${fileDir}`.

use super::cmake::TOOLCHAIN_FILE;
use crate::settings::AxisSet;
use serde::Serialize;
use std::collections::BTreeMap;

const SCHEMA_VERSION: u32 = 4;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PresetsDocument {
    version: u32,
    cmake_minimum_required: CMakeVersion,
    configure_presets: Vec<ConfigurePreset>,
    build_presets: Vec<StepPreset>,
    test_presets: Vec<StepPreset>,
}

#[derive(Debug, Serialize)]
struct CMakeVersion {
    major: u32,
    minor: u32,
    patch: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigurePreset {
    name: String,
    display_name: String,
    description: String,
    binary_dir: String,
    toolchain_file: String,
    cache_variables: BTreeMap<&'static str, String>,
}

/// Build and test presets share a shape
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StepPreset {
    name: String,
    configure_preset: String,
    configuration: String,
}

/// Name of the preset generated for an axis set
pub fn preset_name(axes: &AxisSet) -> String {
    format!("galley-{}", axes.build_type.to_string().to_lowercase())
}

/// Render the presets document; the file lives in the generators directory
pub(super) fn render_presets(axes: &AxisSet) -> serde_json::Result<String> {
    let name = preset_name(axes);
    let build_type = axes.build_type.to_string();

    let document = PresetsDocument {
        version: SCHEMA_VERSION,
        cmake_minimum_required: CMakeVersion {
            major: 3,
            minor: 23,
            patch: 0,
        },
        configure_presets: vec![ConfigurePreset {
            name: name.clone(),
            display_name: format!("'{}' config", name),
            description: axes.identity(),
            binary_dir: "${fileDir}/..".to_string(),
            toolchain_file: format!("${{fileDir}}/{}", TOOLCHAIN_FILE),
            cache_variables: BTreeMap::from([("CMAKE_BUILD_TYPE", build_type.clone())]),
        }],
        build_presets: vec![StepPreset {
            name: name.clone(),
            configure_preset: name.clone(),
            configuration: build_type.clone(),
        }],
        test_presets: vec![StepPreset {
            name: name.clone(),
            configure_preset: name,
            configuration: build_type,
        }],
    };

    let mut content = serde_json::to_string_pretty(&document)?;
    content.push('\n');
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{Arch, BuildType, Os};

    fn axes() -> AxisSet {
        AxisSet::new(
            Os::Linux,
            "gcc-13".parse().unwrap(),
            BuildType::RelWithDebInfo,
            Arch::X86_64,
        )
        .unwrap()
    }

    #[test]
    fn test_presets_document() {
        let content = render_presets(&axes()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();

        assert_eq!(value["version"], 4);
        let configure = &value["configurePresets"][0];
        assert_eq!(configure["name"], "galley-relwithdebinfo");
        assert_eq!(configure["binaryDir"], "${fileDir}/..");
        assert_eq!(configure["toolchainFile"], "${fileDir}/galley_toolchain.cmake");
        assert_eq!(configure["cacheVariables"]["CMAKE_BUILD_TYPE"], "RelWithDebInfo");
        assert_eq!(value["buildPresets"][0]["configurePreset"], "galley-relwithdebinfo");
        assert_eq!(value["testPresets"][0]["configuration"], "RelWithDebInfo");
    }

    #[test]
    fn test_presets_render_is_stable() {
        assert_eq!(render_presets(&axes()).unwrap(), render_presets(&axes()).unwrap());
    }
}
