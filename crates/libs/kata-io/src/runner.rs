//! High-level process runner with a wall-clock limit.

use std::{
    ffi::OsString,
    path::PathBuf,
    time::Duration,
};

use tracing::{debug, warn};

use crate::{
    error::ProcessError,
    process::{drain_pipe, spawn_process, stop_child},
};

/// Captured output of a process that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

/// Result of racing a process against its time limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The process exited and both pipes were drained before the limit.
    Completed(ProcessOutput),
    /// The limit elapsed first; the process group has been killed.
    TimedOut { limit: Duration },
}

/// High-level process runner.
#[derive(Debug, Clone)]
pub struct Runner {
    /// Command to execute.
    command: String,
    /// Command line arguments.
    args: Vec<String>,
    /// Working directory, inherited when unset.
    current_dir: Option<PathBuf>,
    /// Extra environment variables.
    envs: Vec<(OsString, OsString)>,
}

impl Runner {
    /// Create a new runner with command and arguments.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kata_io::runner::Runner;
    ///
    /// let runner = Runner::new("ls", vec!["-la", "/tmp"]);
    /// ```
    pub fn new(command: impl Into<String>, args: Vec<impl Into<String>>) -> Self {
        Self {
            command: command.into(),
            args: args.into_iter().map(|a| a.into()).collect(),
            current_dir: None,
            envs: Vec::new(),
        }
    }

    /// Create a new runner with just a command (no arguments).
    pub fn new_without_args(command: impl Into<String>) -> Self {
        Self::new(command, Vec::<String>::new())
    }

    /// Run the process from `dir`.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Set an environment variable for the process.
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Get the full command string with arguments.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use kata_io::runner::Runner;
    ///
    /// let runner = Runner::new("ls", vec!["-la"]);
    /// assert_eq!(runner.get_full_command(), "ls -la");
    /// ```
    pub fn get_full_command(&self) -> String {
        if self.args.is_empty() {
            return self.command.clone();
        }
        format!("{} {}", &self.command, &self.args.join(" "))
    }

    /// Run the process, giving it at most `limit` to exit and close its pipes.
    ///
    /// Spawn and wait failures are errors. Running out of time is not: the
    /// process group is killed and [`RunOutcome::TimedOut`] is returned.
    pub async fn run(&self, limit: Duration) -> Result<RunOutcome, ProcessError> {
        let mut child = spawn_process(
            &self.command,
            &self.args,
            self.current_dir.as_deref(),
            &self.envs,
        )
        .map_err(|source| ProcessError::Spawn {
            command: self.get_full_command(),
            source,
        })?;
        debug!("Spawned `{}` (pid {:?})", self.get_full_command(), child.id());

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let completion = async {
            tokio::try_join!(child.wait(), drain_pipe(stdout), drain_pipe(stderr))
        };
        let finished = tokio::time::timeout(limit, completion).await;

        match finished {
            Ok(result) => {
                let (status, stdout, stderr) = result.map_err(ProcessError::Wait)?;
                debug!("`{}` exited with {status}", self.get_full_command());
                Ok(RunOutcome::Completed(ProcessOutput {
                    stdout: String::from_utf8_lossy(&stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&stderr).into_owned(),
                    exit_code: status.code(),
                }))
            }
            Err(_) => {
                warn!(
                    "`{}` did not finish within {limit:?}, killing it",
                    self.get_full_command()
                );
                if let Err(err) = stop_child(&mut child).await {
                    warn!("Failed to stop `{}` - {err}", self.get_full_command());
                }
                Ok(RunOutcome::TimedOut { limit })
            }
        }
    }
}
