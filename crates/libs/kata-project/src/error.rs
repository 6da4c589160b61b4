//! Project and pipeline error types.

/// Infrastructure errors: the project could not be provisioned or a
/// toolchain process could not be run at all.
///
/// Compilation failures and timeouts are not errors, they are reported in
/// [`crate::pipeline::BuildResult`] and [`crate::pipeline::RunResult`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    Process(#[from] kata_io::error::ProcessError),
}
