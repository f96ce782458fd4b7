//! Lectern Access
//!
//! Access control for the Lectern content portal:
//! - Closed role set with synonym-aware normalization
//! - Static role → permission table
//! - Session persistence over pluggable client storage
//! - Route guard (authentication, then role membership)
//! - Permission checker in `any`/`all` modes
//! - axum integration: guard layer and session extractors
//!
//! ## Module Organization
//!
//! - `role` - roles, normalization, permission table
//! - `session` - user, session, storage, session manager
//! - `guard` - route guard and the portal's view routes
//! - `shared` - errors, permission checker, HTTP middleware

pub mod guard;
pub mod role;
pub mod session;
pub mod shared;

pub use shared::error::{AccessError, Result};

pub use guard::{landing_path, AllowedRoles, GuardDecision, RedirectReason, RouteGuard, RouteTable, ViewRoute};
pub use role::{has_all, has_any, has_permission, normalize_role, permissions_for, roles_match, Permission, Role};
pub use session::{ClientStorage, FileStorage, MemoryStorage, Session, SessionKeys, SessionManager, User};
pub use shared::permission_checker::{checks, CheckMode, PermissionChecker, PermissionQuery};

/// HTTP integration re-exports
pub mod http {
    pub use crate::shared::middleware::{
        CurrentSession, GuardLayer, GuardMiddleware, OptionalSession, PermissionQueryParams, SessionCookies,
    };
}
