//! Process error types.

use std::io;

/// Errors that can occur while running a process.
///
/// Timeouts are not represented here, see [`crate::runner::RunOutcome`].
#[derive(thiserror::Error, Debug)]
pub enum ProcessError {
    /// Failed to spawn the process.
    #[error("Failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    /// Failed to wait for the child or to read its output.
    #[error("Failed to wait for child process: {0}")]
    Wait(#[source] io::Error),
}
