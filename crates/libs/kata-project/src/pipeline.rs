//! Build and run operations on an ephemeral project.
//!
//! Both operations shell out to the toolchain inside the project directory
//! and turn whatever happened into data. A timeout becomes exit code
//! [`TIMEOUT_EXIT_CODE`] with a `Timeout after <ms>ms` message in stderr.
//! Only a toolchain that cannot be started at all is an [`Error`].

use std::{path::Path, time::Duration};

use kata_io::runner::{ProcessOutput, RunOutcome, Runner};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::prelude::*;

/// Exit code reported when a process runs out of time, as `timeout(1)` does.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Compilation is CPU heavy; give it room.
pub const BUILD_TIMEOUT: Duration = Duration::from_secs(30);

/// Learner programs must not be able to hold a request hostage.
pub const RUN_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome of building a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildResult {
    pub success: bool,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

/// Outcome of running a built project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
}

/// How to build and run a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    /// Executable to invoke.
    pub program: String,
    /// Arguments for the build step.
    pub build_args: Vec<String>,
    /// Arguments for the run step; program arguments follow a `--` token.
    pub run_args: Vec<String>,
}

impl Toolchain {
    /// `cargo build --quiet` / `cargo run --quiet -- <args>`.
    pub fn cargo() -> Self {
        Self {
            program: String::from("cargo"),
            build_args: vec![String::from("build"), String::from("--quiet")],
            run_args: vec![String::from("run"), String::from("--quiet")],
        }
    }
}

impl Default for Toolchain {
    fn default() -> Self {
        Self::cargo()
    }
}

/// Stateless build/run operations with independent time limits.
#[derive(Debug, Clone)]
pub struct BuildRunPipeline {
    toolchain: Toolchain,
    build_timeout: Duration,
    run_timeout: Duration,
}

impl BuildRunPipeline {
    pub fn new(toolchain: Toolchain) -> Self {
        Self {
            toolchain,
            build_timeout: BUILD_TIMEOUT,
            run_timeout: RUN_TIMEOUT,
        }
    }

    pub fn with_timeouts(mut self, build_timeout: Duration, run_timeout: Duration) -> Self {
        self.build_timeout = build_timeout;
        self.run_timeout = run_timeout;
        self
    }

    pub fn toolchain(&self) -> &Toolchain {
        &self.toolchain
    }

    /// Build the project once.
    ///
    /// Some toolchains report errors on stdout, so a failed build with an
    /// empty stderr reports stdout instead.
    pub async fn build(&self, project: &Path) -> Result<BuildResult> {
        let runner = self.runner(project, self.toolchain.build_args.clone());
        let output = collapse(runner.run(self.build_timeout).await?);

        let success = output.exit_code == Some(0);
        let stderr = if !success && output.stderr.trim().is_empty() {
            output.stdout
        } else {
            output.stderr
        };
        debug!("Build of {} finished with {:?}", project.display(), output.exit_code);

        Ok(BuildResult {
            success,
            stderr,
            exit_code: output.exit_code,
        })
    }

    /// Run the built project with `args` passed to the program.
    pub async fn run_with_args(&self, project: &Path, args: &[String]) -> Result<RunResult> {
        let mut command_args = self.toolchain.run_args.clone();
        command_args.push(String::from("--"));
        command_args.extend(args.iter().cloned());

        let runner = self.runner(project, command_args);
        let output = collapse(runner.run(self.run_timeout).await?);
        debug!("Run of {} finished with {:?}", project.display(), output.exit_code);

        Ok(RunResult {
            success: output.exit_code == Some(0),
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code: output.exit_code,
        })
    }

    fn runner(&self, project: &Path, args: Vec<String>) -> Runner {
        // A private target dir keeps concurrent projects from sharing artifacts
        Runner::new(self.toolchain.program.as_str(), args)
            .current_dir(project)
            .env("CARGO_TARGET_DIR", project.join("target"))
    }
}

impl Default for BuildRunPipeline {
    fn default() -> Self {
        Self::new(Toolchain::default())
    }
}

fn collapse(outcome: RunOutcome) -> ProcessOutput {
    match outcome {
        RunOutcome::Completed(output) => output,
        RunOutcome::TimedOut { limit } => ProcessOutput {
            stdout: String::new(),
            stderr: format!("Timeout after {}ms", limit.as_millis()),
            exit_code: Some(TIMEOUT_EXIT_CODE),
        },
    }
}
