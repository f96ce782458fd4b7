//! Route Guard Aggregate

pub mod route_guard;
pub mod routes;

pub use route_guard::{AllowedRoles, GuardDecision, RedirectReason, RouteGuard};
pub use routes::{landing_path, RouteTable, ViewRoute, ViewSummary};
