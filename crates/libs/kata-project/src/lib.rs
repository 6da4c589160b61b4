//! Ephemeral cargo projects and the build/run pipeline.
//!
//! Every submission gets its own [`project::EphemeralProject`]: a uniquely
//! named directory under the OS temp root holding a manifest and
//! `src/main.rs`. The [`pipeline::BuildRunPipeline`] builds and runs it with
//! independent time limits, and [`reaper::OrphanReaper`] removes directories
//! left behind by processes that died before cleaning up.
//!
//! # Usage
//!
//! ```rust,no_run
//! use kata_project::{pipeline::BuildRunPipeline, project::EphemeralProject};
//!
//! # async fn demo() -> kata_project::prelude::Result<()> {
//! let project = EphemeralProject::create("fn main() { println!(\"hi\"); }").await?;
//! let pipeline = BuildRunPipeline::default();
//!
//! let build = pipeline.build(project.path()).await?;
//! if build.success {
//!     let run = pipeline.run_with_args(project.path(), &[]).await?;
//!     println!("{}", run.stdout);
//! }
//! project.cleanup().await;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod pipeline;
pub mod prelude;
pub mod project;
pub mod reaper;
