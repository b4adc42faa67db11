//! Core harness for driving virtual-user load against an HTTP service.
//!
//! A [`Scenario`] wraps an async iteration body and resolves to a
//! [`RunReport`] once the configured duration has elapsed. All real
//! concurrency lives here: the caller's body is a plain sequential
//! request/response chain executed per virtual user.

mod config;
mod recorder;
mod report;
mod runner;

pub use config::*;
pub use recorder::*;
pub use report::*;
pub use runner::*;
