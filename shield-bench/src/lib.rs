//! Load-test drivers for the Shield multi-tenant platform API.
//!
//! Two scenarios, both driven by the `shield-bench-core` harness:
//!
//! - the authenticated flow: a one-shot setup phase (root bootstrap,
//!   optional forced password rotation, society onboarding, admin login)
//!   followed by per-virtual-user config read/write iterations;
//! - a health-check smoke scenario with no setup at all.

pub mod bootstrap;
pub mod client;
pub mod config;
pub mod flow;
