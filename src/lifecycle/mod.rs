// src/lifecycle/mod.rs

//! Lifecycle orchestration
//!
//! A run drives one recipe through a fixed sequence of phases for one axis
//! set:
//!
//! ```text
//! Loaded -> Resolved -> LaidOut -> Generated -> Built -> Packaged
//!    \          \           \           \         \
//!     +----------+-----------+-----------+---------+--> Failed(phase)
//! ```
//!
//! Each phase starts only after the previous one completed. The first
//! failure ends the run with the phase attached and the original error
//! untouched; nothing is retried. [`Lifecycle::run`] consumes the
//! lifecycle, so a finished or failed run cannot be re-entered: a new run
//! starts again from `Loaded`.

use crate::error::Error;
use crate::generate::{ArtifactGenerator, GeneratedArtifact};
use crate::layout::{remove_created_dirs, Layout, LayoutRoots};
use crate::recipe::{validate_recipe, Recipe, RecipeIdentity};
use crate::resolver::{ConstraintResolver, DependencyIndex, Resolution};
use crate::settings::{AxisSet, ProfileId};
use crate::toolchain::BuildToolchain;
use std::fmt;
use std::io;
use strum_macros::{Display, EnumString, VariantNames};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// A step of the lifecycle
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, VariantNames,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Phase {
    Resolve,
    Layout,
    Generate,
    /// Configure followed by build
    Build,
    Package,
}

impl Phase {
    /// Every phase, in execution order
    pub const ALL: [Phase; 5] = [
        Phase::Resolve,
        Phase::Layout,
        Phase::Generate,
        Phase::Build,
        Phase::Package,
    ];

    /// State reached when this phase completes
    pub fn completed_state(self) -> LifecycleState {
        match self {
            Phase::Resolve => LifecycleState::Resolved,
            Phase::Layout => LifecycleState::LaidOut,
            Phase::Generate => LifecycleState::Generated,
            Phase::Build => LifecycleState::Built,
            Phase::Package => LifecycleState::Packaged,
        }
    }
}

/// Where a run stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Loaded,
    Resolved,
    LaidOut,
    Generated,
    Built,
    Packaged,
    /// The named phase failed; no later phase ran
    Failed(Phase),
}

impl LifecycleState {
    /// True once no further phase can run
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Packaged | Self::Failed(_))
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loaded => f.write_str("loaded"),
            Self::Resolved => f.write_str("resolved"),
            Self::LaidOut => f.write_str("laid out"),
            Self::Generated => f.write_str("generated"),
            Self::Built => f.write_str("built"),
            Self::Packaged => f.write_str("packaged"),
            Self::Failed(phase) => write!(f, "failed in {} phase", phase),
        }
    }
}

/// A failed run
#[derive(Debug, Error)]
#[error("{phase} phase failed")]
pub struct LifecycleError {
    pub phase: Phase,
    /// The error the phase produced
    #[source]
    pub source: Error,
    /// States visited, ending in `Failed(phase)`
    pub history: Vec<LifecycleState>,
}

impl LifecycleError {
    pub fn state(&self) -> LifecycleState {
        LifecycleState::Failed(self.phase)
    }
}

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct LifecycleReport {
    pub recipe: RecipeIdentity,
    pub profile: ProfileId,
    /// Final state
    pub state: LifecycleState,
    /// States visited, starting at `Loaded`
    pub history: Vec<LifecycleState>,
    pub resolution: Resolution,
    /// Set once the Layout phase ran
    pub layout: Option<Layout>,
    /// Files written by the Generate phase
    pub artifacts: Vec<GeneratedArtifact>,
}

/// Drives one recipe through the lifecycle for one axis set
pub struct Lifecycle<'a> {
    recipe: Recipe,
    identity: RecipeIdentity,
    axes: AxisSet,
    profile: ProfileId,
    roots: LayoutRoots,
    index: &'a dyn DependencyIndex,
    toolchain: &'a dyn BuildToolchain,
    generator: ArtifactGenerator,
    state: LifecycleState,
    history: Vec<LifecycleState>,
}

impl<'a> Lifecycle<'a> {
    pub fn new(
        recipe: Recipe,
        axes: AxisSet,
        roots: LayoutRoots,
        index: &'a dyn DependencyIndex,
        toolchain: &'a dyn BuildToolchain,
    ) -> Self {
        let identity = recipe.identity();
        let profile = axes.profile_id();
        let generator = ArtifactGenerator::for_recipe(&recipe);

        Self {
            recipe,
            identity,
            axes,
            profile,
            roots,
            index,
            toolchain,
            generator,
            state: LifecycleState::Loaded,
            history: vec![LifecycleState::Loaded],
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn profile(&self) -> &ProfileId {
        &self.profile
    }

    /// Run every phase up to and including `last`
    pub fn run(mut self, last: Phase) -> Result<LifecycleReport, LifecycleError> {
        info!(
            "Running {} [{}] through {}",
            self.identity, self.profile.identity, last
        );

        let resolution = self.step(Phase::Resolve, Self::resolve)?;
        if last == Phase::Resolve {
            return Ok(self.finish(resolution, None, Vec::new()));
        }

        let layout = self.step(Phase::Layout, Self::lay_out)?;
        if last == Phase::Layout {
            return Ok(self.finish(resolution, Some(layout), Vec::new()));
        }

        let artifacts = self.step(Phase::Generate, |lc| lc.generate(&resolution, &layout))?;
        if last == Phase::Generate {
            return Ok(self.finish(resolution, Some(layout), artifacts));
        }

        self.step(Phase::Build, |lc| lc.build(&layout))?;
        if last == Phase::Build {
            return Ok(self.finish(resolution, Some(layout), artifacts));
        }

        self.step(Phase::Package, |lc| lc.package(&layout))?;
        Ok(self.finish(resolution, Some(layout), artifacts))
    }

    /// Run one phase and record the resulting transition
    fn step<T>(
        &mut self,
        phase: Phase,
        f: impl FnOnce(&Self) -> crate::Result<T>,
    ) -> Result<T, LifecycleError> {
        debug!("Entering {} phase from state {}", phase, self.state);

        match f(self) {
            Ok(value) => {
                self.transition(phase.completed_state());
                Ok(value)
            }
            Err(source) => {
                self.transition(LifecycleState::Failed(phase));
                error!("{} phase failed for {}: {}", phase, self.identity, source);
                Err(LifecycleError {
                    phase,
                    source,
                    history: self.history.clone(),
                })
            }
        }
    }

    fn transition(&mut self, state: LifecycleState) {
        self.state = state;
        self.history.push(state);
    }

    fn finish(
        self,
        resolution: Resolution,
        layout: Option<Layout>,
        artifacts: Vec<GeneratedArtifact>,
    ) -> LifecycleReport {
        info!("{} [{}] {}", self.identity, self.profile, self.state);

        LifecycleReport {
            recipe: self.identity,
            profile: self.profile,
            state: self.state,
            history: self.history,
            resolution,
            layout,
            artifacts,
        }
    }

    fn resolve(&self) -> crate::Result<Resolution> {
        // The recipe names layout paths; nothing is created for an invalid one
        for warning in validate_recipe(&self.recipe)? {
            debug!("Recipe warning: {}", warning);
        }

        let requirements = self.recipe.requirements()?;
        info!("Resolving {} requirement(s)", requirements.len());
        ConstraintResolver::new(self.index).resolve(&requirements)
    }

    fn lay_out(&self) -> crate::Result<Layout> {
        let layout = Layout::compute(&self.identity, &self.profile, &self.roots);

        if !layout.source_root.is_dir() {
            return Err(Error::LayoutIo {
                path: layout.source_root.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "source root is not a directory"),
            });
        }

        let exported = self.recipe.exported_sources(&layout.source_root)?;
        for pattern in &exported.unmatched {
            warn!("exports_sources pattern '{}' matched no files", pattern);
        }
        debug!("{} exported source file(s)", exported.files.len());

        if let Err((err, created)) = layout.create_dirs() {
            for (path, e) in remove_created_dirs(&created) {
                warn!("Failed to remove {}: {}", path.display(), e);
            }
            return Err(err);
        }

        info!("Build root: {}", layout.build_root.display());
        Ok(layout)
    }

    fn generate(
        &self,
        resolution: &Resolution,
        layout: &Layout,
    ) -> crate::Result<Vec<GeneratedArtifact>> {
        self.generator
            .generate(resolution, &self.axes, &layout.generated_root)
    }

    fn build(&self, layout: &Layout) -> crate::Result<()> {
        self.toolchain
            .configure(&layout.source_root, &layout.build_root, &layout.generated_root)?;
        self.toolchain.build(&layout.build_root)
    }

    fn package(&self, layout: &Layout) -> crate::Result<()> {
        self.toolchain.install(&layout.build_root, &layout.package_root)
    }
}
