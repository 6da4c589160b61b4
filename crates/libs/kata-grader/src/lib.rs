//! Grading of learner submissions.
//!
//! A submission is graded against a list of [`definition::TestDefinition`]s.
//! The [`engine::GradingEngine`] builds the submission once and evaluates every
//! definition against that single build, producing one
//! [`report::TestResult`] per definition and an aggregate
//! [`report::TestRunResult`].

pub mod check;
pub mod definition;
pub mod engine;
pub mod matching;
pub mod report;

pub use definition::{TestDefinition, TestKind};
pub use engine::GradingEngine;
pub use report::{TestResult, TestRunResult};
