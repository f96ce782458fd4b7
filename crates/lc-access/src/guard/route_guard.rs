//! Route Guard
//!
//! Two checks, in order, on every navigation:
//! 1. authentication presence (token and user), else redirect to login
//! 2. role membership against the route's allow-list, else redirect home
//!
//! A failed check is final for that evaluation.

use serde::Serialize;
use tracing::debug;

use crate::role::Role;
use crate::session::{ClientStorage, Session, SessionManager};

/// Roles a route admits. An undeclared list admits any authenticated user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedRoles {
    declared: bool,
    roles: Vec<Role>,
}

impl AllowedRoles {
    /// No restriction beyond authentication
    pub fn any() -> Self {
        Self::default()
    }

    /// Admit exactly these roles. An empty list is the same as [`any`](Self::any).
    pub fn only(roles: impl IntoIterator<Item = Role>) -> Self {
        let mut list: Vec<Role> = Vec::new();
        for role in roles {
            if !list.contains(&role) {
                list.push(role);
            }
        }
        Self {
            declared: !list.is_empty(),
            roles: list,
        }
    }

    /// Build from raw role names as declared on a route.
    ///
    /// Names are normalized with synonym folding. Unrecognized names admit
    /// nobody, so a list made only of unknown names rejects every user.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut declared = false;
        let mut roles = Vec::new();
        for name in names {
            declared = true;
            if let Some(role) = Role::parse(Some(name.as_ref())) {
                if !roles.contains(&role) {
                    roles.push(role);
                }
            }
        }
        Self { declared, roles }
    }

    pub fn is_restricted(&self) -> bool {
        self.declared
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn permits(&self, role: Option<Role>) -> bool {
        if !self.declared {
            return true;
        }
        role.map(|r| self.roles.contains(&r)).unwrap_or(false)
    }
}

/// Why a navigation was redirected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedirectReason {
    /// No token or no user in storage
    Unauthenticated,
    /// Authenticated, but the role is not on the allow-list
    RoleNotAllowed,
}

/// Outcome of a guard evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Render(Session),
    Redirect { to: String, reason: RedirectReason },
}

impl GuardDecision {
    pub fn is_render(&self) -> bool {
        matches!(self, Self::Render(_))
    }

    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Self::Render(_) => None,
            Self::Redirect { to, .. } => Some(to),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    login_path: String,
    home_path: String,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new("/login", "/")
    }
}

impl RouteGuard {
    pub fn new(login_path: impl Into<String>, home_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
            home_path: home_path.into(),
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    pub fn home_path(&self) -> &str {
        &self.home_path
    }

    /// Evaluate an already-loaded session against a route's allow-list.
    pub fn evaluate(&self, session: Option<Session>, allowed: &AllowedRoles) -> GuardDecision {
        let Some(session) = session else {
            debug!(to = %self.login_path, "No session, redirecting to login");
            return GuardDecision::Redirect {
                to: self.login_path.clone(),
                reason: RedirectReason::Unauthenticated,
            };
        };

        if !allowed.permits(session.role()) {
            debug!(
                user_id = %session.user.id,
                role = session.raw_role().unwrap_or(""),
                to = %self.home_path,
                "Role not allowed, redirecting home"
            );
            return GuardDecision::Redirect {
                to: self.home_path.clone(),
                reason: RedirectReason::RoleNotAllowed,
            };
        }

        GuardDecision::Render(session)
    }

    /// Read the session from storage and evaluate it.
    pub fn check<S: ClientStorage>(
        &self,
        sessions: &SessionManager<S>,
        allowed: &AllowedRoles,
    ) -> GuardDecision {
        self.evaluate(sessions.current(), allowed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MemoryStorage, User};

    fn session_with_role(role: &str) -> Option<Session> {
        Session::new("tok", User::new("1", "u@example.com").with_role(role))
    }

    #[test]
    fn test_teacher_allowed_on_teacher_or_scholar() {
        let guard = RouteGuard::default();
        let allowed = AllowedRoles::from_names(["Teacher", "Scholar"]);
        assert!(guard.evaluate(session_with_role("Teacher"), &allowed).is_render());
    }

    #[test]
    fn test_publisher_allowed_via_synonym() {
        let guard = RouteGuard::default();
        let allowed = AllowedRoles::from_names(["Scholar"]);
        assert!(guard.evaluate(session_with_role("Publisher"), &allowed).is_render());

        let allowed = AllowedRoles::from_names(["publisher"]);
        assert!(guard.evaluate(session_with_role("scholar"), &allowed).is_render());
    }

    #[test]
    fn test_student_redirected_home_from_admin() {
        let guard = RouteGuard::default();
        let decision = guard.evaluate(session_with_role("Student"), &AllowedRoles::from_names(["Admin"]));
        assert_eq!(
            decision,
            GuardDecision::Redirect {
                to: "/".to_string(),
                reason: RedirectReason::RoleNotAllowed,
            }
        );
    }

    #[test]
    fn test_no_session_always_goes_to_login() {
        let guard = RouteGuard::default();
        for allowed in [
            AllowedRoles::any(),
            AllowedRoles::from_names(["Admin"]),
            AllowedRoles::from_names(Vec::<String>::new()),
        ] {
            let decision = guard.evaluate(None, &allowed);
            assert_eq!(decision.redirect_target(), Some("/login"));
        }
    }

    #[test]
    fn test_empty_allow_list_admits_any_authenticated_user() {
        let guard = RouteGuard::default();
        let allowed = AllowedRoles::from_names(Vec::<&str>::new());
        assert!(!allowed.is_restricted());
        assert!(guard.evaluate(session_with_role("Student"), &allowed).is_render());
        assert!(guard.evaluate(session_with_role("janitor"), &allowed).is_render());
    }

    #[test]
    fn test_unknown_role_is_restricted() {
        let guard = RouteGuard::default();
        let allowed = AllowedRoles::from_names(["Student", "Teacher"]);
        let decision = guard.evaluate(session_with_role("janitor"), &allowed);
        assert_eq!(decision.redirect_target(), Some("/"));
    }

    #[test]
    fn test_unknown_names_only_reject_everyone() {
        let allowed = AllowedRoles::from_names(["wizard"]);
        assert!(allowed.is_restricted());
        assert!(allowed.roles().is_empty());
        for role in Role::ALL {
            assert!(!allowed.permits(Some(role)));
        }
    }

    #[test]
    fn test_only_deduplicates() {
        let allowed = AllowedRoles::only([Role::Admin, Role::Admin, Role::Editor]);
        assert_eq!(allowed.roles(), &[Role::Admin, Role::Editor]);
        assert!(!AllowedRoles::only([]).is_restricted());
    }

    #[test]
    fn test_check_reads_storage_each_time() {
        let guard = RouteGuard::new("/signin", "/home");
        let sessions = SessionManager::new(MemoryStorage::new());
        let allowed = AllowedRoles::only([Role::Editor]);

        assert_eq!(guard.check(&sessions, &allowed).redirect_target(), Some("/signin"));

        sessions
            .login("tok", &User::new("3", "e@example.com").with_role("editor"))
            .unwrap();
        assert!(guard.check(&sessions, &allowed).is_render());

        sessions.logout().unwrap();
        assert_eq!(guard.check(&sessions, &allowed).redirect_target(), Some("/signin"));
    }
}
