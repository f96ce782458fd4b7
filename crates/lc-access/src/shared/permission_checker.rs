//! Permission Checker
//!
//! Answers "may the current user do X?" for a single permission or a list,
//! in `any` or `all` mode. Built fresh from the session for every check.

use serde::{Deserialize, Serialize};

use crate::role::{Permission, Role};
use crate::session::{ClientStorage, Session, SessionManager};
use crate::shared::error::{AccessError, Result};

/// How a list of permissions is combined
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckMode {
    /// At least one permission is held
    #[default]
    Any,
    /// Every permission is held
    All,
}

/// One permission name or a list of them
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionQuery {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for PermissionQuery {
    fn from(p: &str) -> Self {
        Self::One(p.to_string())
    }
}

impl From<String> for PermissionQuery {
    fn from(p: String) -> Self {
        Self::One(p)
    }
}

impl From<Permission> for PermissionQuery {
    fn from(p: Permission) -> Self {
        Self::One(p.as_str().to_string())
    }
}

impl From<Vec<String>> for PermissionQuery {
    fn from(ps: Vec<String>) -> Self {
        Self::Many(ps)
    }
}

impl From<&[&str]> for PermissionQuery {
    fn from(ps: &[&str]) -> Self {
        Self::Many(ps.iter().map(|p| p.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for PermissionQuery {
    fn from(ps: [&str; N]) -> Self {
        Self::Many(ps.iter().map(|p| p.to_string()).collect())
    }
}

impl From<&[Permission]> for PermissionQuery {
    fn from(ps: &[Permission]) -> Self {
        Self::Many(ps.iter().map(|p| p.as_str().to_string()).collect())
    }
}

impl PermissionQuery {
    fn names(&self) -> Vec<&str> {
        match self {
            Self::One(p) => vec![p.as_str()],
            Self::Many(ps) => ps.iter().map(String::as_str).collect(),
        }
    }
}

/// Permission view of the current user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionChecker {
    authenticated: bool,
    role: Option<Role>,
}

impl PermissionChecker {
    pub fn for_session(session: Option<&Session>) -> Self {
        Self {
            authenticated: session.is_some(),
            role: session.and_then(Session::role),
        }
    }

    /// Reads the session from storage now
    pub fn from_manager<S: ClientStorage>(sessions: &SessionManager<S>) -> Self {
        Self::for_session(sessions.current().as_ref())
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// Permissions held; empty when signed out or the role is unknown
    pub fn permissions(&self) -> &'static [Permission] {
        self.role.map(|r| r.permissions()).unwrap_or(&[])
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        let Some(role) = self.role else {
            return false;
        };
        permission
            .parse::<Permission>()
            .map(|p| role.has_permission(p))
            .unwrap_or(false)
    }

    /// Check one permission, or a list combined by `mode`.
    ///
    /// A single permission ignores `mode`. An empty list is false in `Any`
    /// mode and true in `All` mode, except that a user without a known role
    /// fails every check.
    pub fn check(&self, query: impl Into<PermissionQuery>, mode: CheckMode) -> bool {
        if self.role.is_none() {
            return false;
        }
        let query = query.into();
        let names = query.names();
        match (mode, &query) {
            (_, PermissionQuery::One(p)) => self.has_permission(p),
            (CheckMode::Any, _) => names.iter().any(|p| self.has_permission(p)),
            (CheckMode::All, _) => names.iter().all(|p| self.has_permission(p)),
        }
    }

    /// Like [`check`](Self::check), as a `Result` suitable for handlers
    pub fn require(&self, query: impl Into<PermissionQuery>, mode: CheckMode) -> Result<()> {
        if !self.authenticated {
            return Err(AccessError::unauthorized("Authentication required"));
        }
        let query = query.into();
        let names = query.names().join(", ");
        if self.check(query, mode) {
            Ok(())
        } else {
            Err(AccessError::forbidden(format!("Missing permission: {}", names)))
        }
    }
}

/// Common checks used by portal handlers
pub mod checks {
    use super::*;

    pub fn can_upload(checker: &PermissionChecker) -> Result<()> {
        checker.require(
            [Permission::UploadContent.as_str(), Permission::UploadPublications.as_str()],
            CheckMode::Any,
        )
    }

    pub fn can_review(checker: &PermissionChecker) -> Result<()> {
        checker.require(Permission::ReviewContent, CheckMode::All)
    }

    pub fn can_publish(checker: &PermissionChecker) -> Result<()> {
        checker.require(
            [Permission::ApproveContent.as_str(), Permission::PublishContent.as_str()],
            CheckMode::All,
        )
    }

    pub fn is_admin(checker: &PermissionChecker) -> Result<()> {
        checker.require(
            [Permission::ManageUsers.as_str(), Permission::ManageRoles.as_str()],
            CheckMode::All,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MemoryStorage, User};

    fn checker(role: &str) -> PermissionChecker {
        let session = Session::new("tok", User::new("1", "u@example.com").with_role(role));
        PermissionChecker::for_session(session.as_ref())
    }

    #[test]
    fn test_single_permission() {
        assert!(checker("teacher").check("edit_own_content", CheckMode::Any));
        assert!(checker("teacher").check("edit_own_content", CheckMode::All));
        assert!(!checker("student").check("edit_own_content", CheckMode::Any));
    }

    #[test]
    fn test_modes() {
        let perms = ["upload_content", "publish_content"];
        assert!(checker("scholar").check(perms, CheckMode::Any));
        assert!(!checker("scholar").check(perms, CheckMode::All));
        assert!(checker("admin").check(["publish_content", "manage_users"], CheckMode::All));
    }

    #[test]
    fn test_empty_list() {
        let empty: Vec<String> = Vec::new();
        assert!(!checker("student").check(empty.clone(), CheckMode::Any));
        assert!(checker("student").check(empty.clone(), CheckMode::All));
        assert!(!checker("janitor").check(empty, CheckMode::All));
    }

    #[test]
    fn test_signed_out_has_nothing() {
        let signed_out = PermissionChecker::for_session(None);
        assert!(!signed_out.is_authenticated());
        assert!(signed_out.permissions().is_empty());
        assert!(!signed_out.check("view_courses", CheckMode::Any));
        assert!(matches!(
            signed_out.require("view_courses", CheckMode::Any),
            Err(AccessError::Unauthorized { .. })
        ));
    }

    #[test]
    fn test_publisher_matches_scholar() {
        let scholar = checker("scholar");
        let publisher = checker("publisher");
        for p in Permission::ALL {
            assert_eq!(scholar.check(p, CheckMode::Any), publisher.check(p, CheckMode::Any));
        }
        assert_eq!(scholar.permissions(), publisher.permissions());
    }

    #[test]
    fn test_require_forbidden() {
        let err = checker("student").require("manage_users", CheckMode::Any).unwrap_err();
        assert!(matches!(err, AccessError::Forbidden { ref message } if message.contains("manage_users")));
    }

    #[test]
    fn test_named_checks() {
        assert!(checks::can_upload(&checker("teacher")).is_ok());
        assert!(checks::can_upload(&checker("publisher")).is_ok());
        assert!(checks::can_upload(&checker("reviewer")).is_err());
        assert!(checks::can_review(&checker("reviewer")).is_ok());
        assert!(checks::can_publish(&checker("editor")).is_ok());
        assert!(checks::can_publish(&checker("reviewer")).is_err());
        assert!(checks::is_admin(&checker("admin")).is_ok());
        assert!(checks::is_admin(&checker("editor")).is_err());
    }

    #[test]
    fn test_from_manager_reads_storage() {
        let sessions = SessionManager::new(MemoryStorage::new());
        assert!(!PermissionChecker::from_manager(&sessions).is_authenticated());

        sessions
            .login("tok", &User::new("9", "r@example.com").with_role("Reviewer"))
            .unwrap();
        let checker = PermissionChecker::from_manager(&sessions);
        assert_eq!(checker.role(), Some(Role::Reviewer));
        assert!(checker.check("approve_content", CheckMode::Any));
    }
}
