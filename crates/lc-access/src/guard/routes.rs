//! Protected views of the portal and the roles each one admits.

use serde::Serialize;

use super::route_guard::AllowedRoles;
use crate::role::Role;
use crate::session::Session;

/// A protected view
#[derive(Debug, Clone)]
pub struct ViewRoute {
    pub path: String,
    pub title: String,
    pub allowed: AllowedRoles,
}

impl ViewRoute {
    pub fn new(path: impl Into<String>, title: impl Into<String>, allowed: AllowedRoles) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            allowed,
        }
    }

    pub fn summary(&self) -> ViewSummary {
        ViewSummary {
            path: self.path.clone(),
            title: self.title.clone(),
            roles: self.allowed.roles().to_vec(),
            restricted: self.allowed.is_restricted(),
        }
    }
}

/// Serializable description of a route
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSummary {
    pub path: String,
    pub title: String,
    pub roles: Vec<Role>,
    pub restricted: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<ViewRoute>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_route(mut self, route: ViewRoute) -> Self {
        self.routes.push(route);
        self
    }

    /// The portal's protected views
    pub fn portal() -> Self {
        let mut table = Self::new()
            .with_route(ViewRoute::new("/courses", "Course Catalog", AllowedRoles::any()))
            .with_route(ViewRoute::new("/publications", "Publications", AllowedRoles::any()));

        for role in Role::ALL {
            table = table.with_route(ViewRoute::new(
                role.dashboard_path(),
                format!("{} Dashboard", role.label()),
                AllowedRoles::only([role]),
            ));
        }

        table
            .with_route(ViewRoute::new(
                "/upload",
                "Upload Content",
                AllowedRoles::from_names(["Teacher", "Scholar"]),
            ))
            .with_route(ViewRoute::new(
                "/review-queue",
                "Review Queue",
                AllowedRoles::from_names(["Reviewer", "Editor", "Admin"]),
            ))
            .with_route(ViewRoute::new(
                "/publishing",
                "Publishing Desk",
                AllowedRoles::from_names(["Editor", "Admin"]),
            ))
            .with_route(ViewRoute::new(
                "/admin/users",
                "User Management",
                AllowedRoles::from_names(["Admin"]),
            ))
    }

    pub fn routes(&self) -> &[ViewRoute] {
        &self.routes
    }

    pub fn find(&self, path: &str) -> Option<&ViewRoute> {
        let path = path.trim_end_matches('/');
        self.routes.iter().find(|r| r.path == path)
    }

    /// Views the session's role can open
    pub fn visible_to(&self, session: &Session) -> Vec<&ViewRoute> {
        let role = session.role();
        self.routes.iter().filter(|r| r.allowed.permits(role)).collect()
    }
}

/// Where to send a user after login: their dashboard, or `fallback` for
/// unrecognized roles.
pub fn landing_path<'a>(session: &Session, fallback: &'a str) -> &'a str {
    session.role().map(|r| r.dashboard_path()).unwrap_or(fallback)
}
