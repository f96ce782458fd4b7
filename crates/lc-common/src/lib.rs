//! Lectern shared runtime helpers.
//!
//! Everything here is process-level plumbing used by the binaries:
//! logging setup and small environment variable lookups.

pub mod env;
pub mod logging;

pub use env::{env_flag, env_or, env_or_parse};
