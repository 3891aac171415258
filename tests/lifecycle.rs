// tests/lifecycle.rs

//! End-to-end recipe lifecycle tests: resolve, lay out, generate, build, package.

mod common;

use common::{
    linux_gcc_release, read_dir_contents, setup_default_index, setup_index, setup_source_tree,
    RecordingToolchain, RACE_N_CHASE,
};
use galley::recipe::RECIPE_FILE_NAME;
use galley::{
    parse_recipe_file, validate_recipe, AxisSet, CMakeToolchain, ConstraintResolver, Error,
    FileIndex, Lifecycle, LifecycleState, LayoutRoots, Phase, ToolchainStep,
};
use std::path::Path;

fn axes_for(recipe_dir: &Path, assignments: &[(String, String)]) -> AxisSet {
    let recipe = parse_recipe_file(&recipe_dir.join(RECIPE_FILE_NAME)).unwrap();
    AxisSet::from_assignments(assignments, &recipe.settings).unwrap()
}

fn lifecycle<'a>(
    recipe_dir: &Path,
    index: &'a FileIndex,
    toolchain: &'a dyn galley::BuildToolchain,
) -> Lifecycle<'a> {
    let recipe = parse_recipe_file(&recipe_dir.join(RECIPE_FILE_NAME)).unwrap();
    validate_recipe(&recipe).unwrap();
    let axes = axes_for(recipe_dir, &linux_gcc_release());
    let roots = LayoutRoots::new(recipe_dir, recipe_dir.join("build-galley"));
    Lifecycle::new(recipe, axes, roots, index, toolchain)
}

#[test]
fn test_resolution_pins_highest_satisfying_versions() {
    let (temp_dir, recipe_dir) = setup_source_tree(RACE_N_CHASE);
    let index = FileIndex::new(setup_default_index(temp_dir.path()));

    let recipe = parse_recipe_file(&recipe_dir.join(RECIPE_FILE_NAME)).unwrap();
    let resolution = ConstraintResolver::new(&index)
        .resolve(&recipe.requirements().unwrap())
        .unwrap();

    assert_eq!(resolution.len(), 2);
    assert_eq!(resolution.get("fmt").unwrap().version.to_string(), "10.1.0");
    assert_eq!(resolution.get("spdlog").unwrap().version.to_string(), "1.11.2");
}

#[test]
fn test_missing_pinned_version_fails_resolution() {
    let (temp_dir, recipe_dir) = setup_source_tree(RACE_N_CHASE);
    let index = FileIndex::new(setup_index(
        temp_dir.path(),
        &[("fmt", &["9.1.0", "10.2.1"]), ("spdlog", &["1.11.2"])],
    ));
    let toolchain = RecordingToolchain::default();

    let err = lifecycle(&recipe_dir, &index, &toolchain)
        .run(Phase::Package)
        .unwrap_err();

    assert_eq!(err.state(), LifecycleState::Failed(Phase::Resolve));
    match &err.source {
        Error::UnsatisfiableConstraint { name, constraint, .. } => {
            assert_eq!(name, "fmt");
            assert_eq!(constraint, "10.1.0");
        }
        other => panic!("expected unsatisfiable constraint, got {:?}", other),
    }
    assert!(!recipe_dir.join("build-galley").exists());
    assert!(toolchain.calls().is_empty());
}

#[test]
fn test_repeated_runs_are_deterministic() {
    let (temp_dir, recipe_dir) = setup_source_tree(RACE_N_CHASE);
    let index = FileIndex::new(setup_default_index(temp_dir.path()));
    let toolchain = RecordingToolchain::default();

    let first = lifecycle(&recipe_dir, &index, &toolchain)
        .run(Phase::Generate)
        .unwrap();
    let first_layout = first.layout.clone().unwrap();
    let first_files = read_dir_contents(&first_layout.generated_root);

    let second = lifecycle(&recipe_dir, &index, &toolchain)
        .run(Phase::Generate)
        .unwrap();
    let second_layout = second.layout.clone().unwrap();

    assert_eq!(first_layout, second_layout);
    assert_eq!(first.profile, second.profile);
    assert_eq!(first.artifacts, second.artifacts);
    assert_eq!(first_files, read_dir_contents(&second_layout.generated_root));
    assert!(toolchain.calls().is_empty());
}

#[test]
fn test_configure_failure_stops_before_package() {
    let (temp_dir, recipe_dir) = setup_source_tree(RACE_N_CHASE);
    let index = FileIndex::new(setup_default_index(temp_dir.path()));
    let toolchain = RecordingToolchain::failing(ToolchainStep::Configure);

    let err = lifecycle(&recipe_dir, &index, &toolchain)
        .run(Phase::Package)
        .unwrap_err();

    assert_eq!(err.phase, Phase::Build);
    assert_eq!(err.state(), LifecycleState::Failed(Phase::Build));
    assert!(matches!(
        err.source,
        Error::ExternalToolchain {
            step: ToolchainStep::Configure,
            exit_status: Some(2),
            ..
        }
    ));
    assert_eq!(
        err.history,
        vec![
            LifecycleState::Loaded,
            LifecycleState::Resolved,
            LifecycleState::LaidOut,
            LifecycleState::Generated,
            LifecycleState::Failed(Phase::Build),
        ]
    );
    assert_eq!(toolchain.calls(), vec![ToolchainStep::Configure]);
}

#[test]
fn test_profiles_never_share_output_roots() {
    let (temp_dir, recipe_dir) = setup_source_tree(RACE_N_CHASE);
    let index = FileIndex::new(setup_default_index(temp_dir.path()));
    let toolchain = RecordingToolchain::default();
    let recipe = parse_recipe_file(&recipe_dir.join(RECIPE_FILE_NAME)).unwrap();
    let roots = LayoutRoots::new(&recipe_dir, recipe_dir.join("build-galley"));

    let mut debug = linux_gcc_release();
    debug[3].1 = "Debug".to_string();

    let release_report = Lifecycle::new(
        recipe.clone(),
        axes_for(&recipe_dir, &linux_gcc_release()),
        roots.clone(),
        &index,
        &toolchain,
    )
    .run(Phase::Package)
    .unwrap();
    let debug_report = Lifecycle::new(
        recipe,
        axes_for(&recipe_dir, &debug),
        roots,
        &index,
        &toolchain,
    )
    .run(Phase::Package)
    .unwrap();

    let release = release_report.layout.unwrap();
    let debug = debug_report.layout.unwrap();
    assert_ne!(release_report.profile.digest, debug_report.profile.digest);
    assert_eq!(release.source_root, debug.source_root);
    assert_ne!(release.build_root, debug.build_root);
    assert_ne!(release.generated_root, debug.generated_root);
    assert_ne!(release.package_root, debug.package_root);
    assert_eq!(debug_report.state, LifecycleState::Packaged);
}

#[test]
fn test_generated_files_reference_resolved_dependencies() {
    let (temp_dir, recipe_dir) = setup_source_tree(RACE_N_CHASE);
    let index = FileIndex::new(setup_default_index(temp_dir.path()));
    let toolchain = RecordingToolchain::default();

    let report = lifecycle(&recipe_dir, &index, &toolchain)
        .run(Phase::Generate)
        .unwrap();
    let generated = report.layout.unwrap().generated_root;

    let spdlog = std::fs::read_to_string(generated.join("spdlog-config.cmake")).unwrap();
    assert!(spdlog.contains("/opt/deps/spdlog/1.11.2/include"));
    let version = std::fs::read_to_string(generated.join("fmt-config-version.cmake")).unwrap();
    assert!(version.contains("10.1.0"));
    assert!(generated.join("galley_toolchain.cmake").is_file());
    assert!(generated.join("GalleyPresets.json").is_file());
}

#[test]
#[ignore] // Requires cmake on PATH
fn test_create_with_real_cmake() {
    let (temp_dir, recipe_dir) = setup_source_tree(RACE_N_CHASE);
    let index = FileIndex::new(setup_default_index(temp_dir.path()));
    let toolchain = CMakeToolchain::new("cmake", galley::settings::BuildType::Release);

    let report = lifecycle(&recipe_dir, &index, &toolchain)
        .run(Phase::Package)
        .unwrap();

    let layout = report.layout.unwrap();
    assert_eq!(report.state, LifecycleState::Packaged);
    assert!(layout.package_root.join("share/game.txt").is_file());
}
