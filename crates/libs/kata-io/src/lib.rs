//! Process execution for the Kata grading service.
//!
//! Spawns external commands with captured output, closed stdin and a hard
//! wall-clock limit. A timeout is an ordinary outcome, not an error: the
//! process group is killed and [`runner::RunOutcome::TimedOut`] is returned.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use kata_io::runner::{RunOutcome, Runner};
//!
//! # async fn demo() -> Result<(), kata_io::error::ProcessError> {
//! let runner = Runner::new("echo", vec!["Hello, World!"]);
//!
//! match runner.run(Duration::from_secs(5)).await? {
//!     RunOutcome::Completed(output) => println!("Output: {}", output.stdout),
//!     RunOutcome::TimedOut { limit } => println!("Gave up after {limit:?}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod process;
pub mod runner;
