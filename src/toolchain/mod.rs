// src/toolchain/mod.rs

//! External build toolchain
//!
//! The lifecycle only needs three blocking operations from the build tool:
//! configure a build tree, build it, and install it into a package root.
//! [`CMakeToolchain`] drives the `cmake` executable; tests substitute
//! their own [`BuildToolchain`].

use crate::config::EngineConfig;
use crate::error::{Error, Result, ToolchainStep};
use crate::generate::TOOLCHAIN_FILE;
use crate::settings::BuildType;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};
use tracing::{debug, info};

/// Number of trailing stderr lines kept in error details
const STDERR_TAIL_LINES: usize = 20;

/// Operations the lifecycle performs through the build tool
///
/// Each call blocks until the underlying process finishes.
pub trait BuildToolchain: Send + Sync {
    /// Configure `build_root` from `source_root` using the files in `generated_root`
    fn configure(&self, source_root: &Path, build_root: &Path, generated_root: &Path) -> Result<()>;

    /// Build a configured tree
    fn build(&self, build_root: &Path) -> Result<()>;

    /// Install a built tree into `package_root`
    fn install(&self, build_root: &Path, package_root: &Path) -> Result<()>;
}

/// Runs the `cmake` executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CMakeToolchain {
    program: PathBuf,
    generator: Option<String>,
    jobs: usize,
    build_type: BuildType,
}

impl CMakeToolchain {
    pub fn new(program: impl Into<PathBuf>, build_type: BuildType) -> Self {
        Self {
            program: program.into(),
            generator: None,
            jobs: 1,
            build_type,
        }
    }

    /// Toolchain for `build_type` using the configured program, generator and jobs
    pub fn from_config(config: &EngineConfig, build_type: BuildType) -> Self {
        Self::new(config.cmake_program.clone(), build_type)
            .with_generator(config.generator.clone())
            .with_jobs(config.jobs)
    }

    /// CMake generator passed with `-G` (e.g. "Ninja")
    pub fn with_generator(mut self, generator: Option<String>) -> Self {
        self.generator = generator;
        self
    }

    /// Parallel build jobs; zero is treated as one
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn configure_args(&self, source_root: &Path, build_root: &Path, generated_root: &Path) -> Vec<OsString> {
        let mut toolchain = OsString::from("-DCMAKE_TOOLCHAIN_FILE=");
        toolchain.push(generated_root.join(TOOLCHAIN_FILE));

        let mut args = vec![
            OsString::from("-S"),
            source_root.as_os_str().to_owned(),
            OsString::from("-B"),
            build_root.as_os_str().to_owned(),
            toolchain,
            OsString::from(format!("-DCMAKE_BUILD_TYPE={}", self.build_type)),
        ];
        if let Some(generator) = &self.generator {
            args.push(OsString::from("-G"));
            args.push(OsString::from(generator));
        }
        args
    }

    fn build_args(&self, build_root: &Path) -> Vec<OsString> {
        vec![
            OsString::from("--build"),
            build_root.as_os_str().to_owned(),
            OsString::from("--config"),
            OsString::from(self.build_type.to_string()),
            OsString::from("--parallel"),
            OsString::from(self.jobs.to_string()),
        ]
    }

    fn install_args(&self, build_root: &Path, package_root: &Path) -> Vec<OsString> {
        vec![
            OsString::from("--install"),
            build_root.as_os_str().to_owned(),
            OsString::from("--prefix"),
            package_root.as_os_str().to_owned(),
            OsString::from("--config"),
            OsString::from(self.build_type.to_string()),
        ]
    }

    fn run(&self, step: ToolchainStep, args: &[OsString]) -> Result<()> {
        debug!("Running {}", display_args(self.program.as_os_str(), args));

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| Error::ExternalToolchain {
                step,
                exit_status: None,
                detail: format!("failed to run {}: {}", self.program.display(), e),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        log_output(step, "stdout", &stdout);
        log_output(step, "stderr", &stderr);

        if !output.status.success() {
            return Err(Error::ExternalToolchain {
                step,
                exit_status: output.status.code(),
                detail: failure_detail(output.status, &stderr),
            });
        }

        Ok(())
    }
}

impl BuildToolchain for CMakeToolchain {
    fn configure(&self, source_root: &Path, build_root: &Path, generated_root: &Path) -> Result<()> {
        info!("Configuring {}", build_root.display());
        self.run(
            ToolchainStep::Configure,
            &self.configure_args(source_root, build_root, generated_root),
        )
    }

    fn build(&self, build_root: &Path) -> Result<()> {
        info!("Building {} ({} jobs)", build_root.display(), self.jobs);
        self.run(ToolchainStep::Build, &self.build_args(build_root))
    }

    fn install(&self, build_root: &Path, package_root: &Path) -> Result<()> {
        info!("Installing into {}", package_root.display());
        self.run(ToolchainStep::Install, &self.install_args(build_root, package_root))
    }
}

fn log_output(step: ToolchainStep, stream: &str, text: &str) {
    for line in text.lines() {
        debug!("[{} {}] {}", step, stream, line);
    }
}

/// Describe a failed process: how it ended plus the tail of its stderr
fn failure_detail(status: ExitStatus, stderr: &str) -> String {
    let ended = match status.code() {
        Some(code) => format!("exited with status {}", code),
        None => termination_signal(status)
            .map(|signal| format!("terminated by signal {}", signal))
            .unwrap_or_else(|| "terminated without an exit status".to_string()),
    };

    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    if lines.is_empty() {
        return ended;
    }

    let tail = &lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..];
    format!("{}\n{}", ended, tail.join("\n"))
}

#[cfg(unix)]
fn termination_signal(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn termination_signal(_status: ExitStatus) -> Option<i32> {
    None
}

/// Render arguments the way a shell user would type them
pub fn display_args(program: &OsStr, args: &[OsString]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(OsString::as_os_str))
        .map(|a| a.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}
