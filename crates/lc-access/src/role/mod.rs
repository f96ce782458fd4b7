//! Role Aggregate
//!
//! Roles, role normalization, and the static permission table.

pub mod entity;
pub mod permissions;

pub use entity::{normalize_role, roles_match, Role};
pub use permissions::{has_all, has_any, has_permission, permissions_for, Permission};
