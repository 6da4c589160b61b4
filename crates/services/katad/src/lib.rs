//! Kata grading service (katad)
//!
//! HTTP front end for the execution-and-grading core:
//!
//! - **`POST /api/run`**: build a submission and run it with optional arguments
//! - **`POST /api/test`**: grade a submission against declarative test definitions
//!
//! Every request gets its own ephemeral project, which is removed before the
//! response is sent whatever happened while handling it.

pub mod api;
pub mod config;
pub mod cors;
pub mod error;
pub mod extract;
pub mod models;
pub mod prelude;
