//! Shared infrastructure: errors, permission checks, HTTP middleware

pub mod error;
pub mod middleware;
pub mod permission_checker;
