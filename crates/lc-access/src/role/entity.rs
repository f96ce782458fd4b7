//! Role Entity
//!
//! Closed set of platform roles. Free-form role text from storage or the
//! wire is parsed into a [`Role`]; synonyms are folded in at parse time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::error::AccessError;

/// Platform role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Browses and enrolls in courses
    Student,
    /// Authors and uploads courses
    Teacher,
    /// Authors publications (also known as "publisher")
    #[serde(alias = "publisher")]
    Scholar,
    /// Curates and publishes approved content
    Editor,
    /// Reviews submitted content
    Reviewer,
    /// Platform administrator
    Admin,
}

/// Alternate role names accepted on input, mapped to their canonical role
const SYNONYMS: &[(&str, Role)] = &[("publisher", Role::Scholar)];

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Student,
        Role::Teacher,
        Role::Scholar,
        Role::Editor,
        Role::Reviewer,
        Role::Admin,
    ];

    /// Canonical lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Teacher => "teacher",
            Self::Scholar => "scholar",
            Self::Editor => "editor",
            Self::Reviewer => "reviewer",
            Self::Admin => "admin",
        }
    }

    /// Display label used in dashboards and navigation
    pub fn label(&self) -> &'static str {
        match self {
            Self::Student => "Student",
            Self::Teacher => "Teacher",
            Self::Scholar => "Scholar",
            Self::Editor => "Editor",
            Self::Reviewer => "Reviewer",
            Self::Admin => "Administrator",
        }
    }

    /// Landing view after login
    pub fn dashboard_path(&self) -> &'static str {
        match self {
            Self::Student => "/student/dashboard",
            Self::Teacher => "/teacher/dashboard",
            Self::Scholar => "/scholar/dashboard",
            Self::Editor => "/editor/dashboard",
            Self::Reviewer => "/reviewer/dashboard",
            Self::Admin => "/admin/dashboard",
        }
    }

    /// Parse free-form role text. Case and surrounding whitespace are ignored.
    /// Returns `None` for missing or unrecognized roles.
    pub fn parse(raw: Option<&str>) -> Option<Role> {
        raw.and_then(|r| r.parse().ok())
    }
}

impl FromStr for Role {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();

        if let Some(role) = Role::ALL.iter().find(|r| r.as_str() == lowered) {
            return Ok(*role);
        }
        SYNONYMS
            .iter()
            .find(|(alias, _)| *alias == lowered)
            .map(|(_, role)| *role)
            .ok_or_else(|| AccessError::UnknownRole(s.to_string()))
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalize a raw role to its canonical lowercase name.
///
/// Unknown or missing roles normalize to `""`, which matches nothing.
pub fn normalize_role(raw: Option<&str>) -> String {
    Role::parse(raw)
        .map(|r| r.as_str().to_string())
        .unwrap_or_default()
}

/// Whether two raw role names denote the same role, synonyms included.
/// Unknown roles never match, not even themselves.
pub fn roles_match(stored: Option<&str>, target: Option<&str>) -> bool {
    match (Role::parse(stored), Role::parse(target)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
