//! Permissions and the static role → permission table.
//!
//! The table is fixed at build time: there are no dynamic grants and no
//! revocation. Lookups are exact membership tests.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::entity::Role;
use crate::shared::error::AccessError;

/// Fine-grained capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    // Browsing
    ViewCourses,
    ViewPublications,
    EnrollCourses,
    DownloadContent,
    TrackProgress,
    RateContent,

    // Authoring
    UploadContent,
    EditOwnContent,
    DeleteOwnContent,
    CreateCourses,
    UploadPublications,
    SubmitForReview,
    ViewOwnAnalytics,
    ManageEnrollments,

    // Review
    ViewReviewQueue,
    ReviewContent,
    ApproveContent,
    RejectContent,
    RequestRevisions,

    // Editorial
    EditAnyContent,
    PublishContent,
    UnpublishContent,
    ManageCategories,
    FeatureContent,

    // Administration
    DeleteAnyContent,
    ManageUsers,
    ManageRoles,
    ViewPlatformAnalytics,
    ViewReports,
    ManageSettings,
}

impl Permission {
    pub const ALL: [Permission; 30] = [
        Permission::ViewCourses,
        Permission::ViewPublications,
        Permission::EnrollCourses,
        Permission::DownloadContent,
        Permission::TrackProgress,
        Permission::RateContent,
        Permission::UploadContent,
        Permission::EditOwnContent,
        Permission::DeleteOwnContent,
        Permission::CreateCourses,
        Permission::UploadPublications,
        Permission::SubmitForReview,
        Permission::ViewOwnAnalytics,
        Permission::ManageEnrollments,
        Permission::ViewReviewQueue,
        Permission::ReviewContent,
        Permission::ApproveContent,
        Permission::RejectContent,
        Permission::RequestRevisions,
        Permission::EditAnyContent,
        Permission::PublishContent,
        Permission::UnpublishContent,
        Permission::ManageCategories,
        Permission::FeatureContent,
        Permission::DeleteAnyContent,
        Permission::ManageUsers,
        Permission::ManageRoles,
        Permission::ViewPlatformAnalytics,
        Permission::ViewReports,
        Permission::ManageSettings,
    ];

    /// Wire tag, e.g. `edit_own_content`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ViewCourses => "view_courses",
            Self::ViewPublications => "view_publications",
            Self::EnrollCourses => "enroll_courses",
            Self::DownloadContent => "download_content",
            Self::TrackProgress => "track_progress",
            Self::RateContent => "rate_content",
            Self::UploadContent => "upload_content",
            Self::EditOwnContent => "edit_own_content",
            Self::DeleteOwnContent => "delete_own_content",
            Self::CreateCourses => "create_courses",
            Self::UploadPublications => "upload_publications",
            Self::SubmitForReview => "submit_for_review",
            Self::ViewOwnAnalytics => "view_own_analytics",
            Self::ManageEnrollments => "manage_enrollments",
            Self::ViewReviewQueue => "view_review_queue",
            Self::ReviewContent => "review_content",
            Self::ApproveContent => "approve_content",
            Self::RejectContent => "reject_content",
            Self::RequestRevisions => "request_revisions",
            Self::EditAnyContent => "edit_any_content",
            Self::PublishContent => "publish_content",
            Self::UnpublishContent => "unpublish_content",
            Self::ManageCategories => "manage_categories",
            Self::FeatureContent => "feature_content",
            Self::DeleteAnyContent => "delete_any_content",
            Self::ManageUsers => "manage_users",
            Self::ManageRoles => "manage_roles",
            Self::ViewPlatformAnalytics => "view_platform_analytics",
            Self::ViewReports => "view_reports",
            Self::ManageSettings => "manage_settings",
        }
    }
}

impl FromStr for Permission {
    type Err = AccessError;

    /// Exact tag match; permission tags are case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .iter()
            .find(|p| p.as_str() == s)
            .copied()
            .ok_or_else(|| AccessError::UnknownPermission(s.to_string()))
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

use Permission::*;

const STUDENT: &[Permission] = &[
    ViewCourses,
    ViewPublications,
    EnrollCourses,
    DownloadContent,
    TrackProgress,
    RateContent,
];

const TEACHER: &[Permission] = &[
    ViewCourses,
    ViewPublications,
    DownloadContent,
    UploadContent,
    EditOwnContent,
    DeleteOwnContent,
    CreateCourses,
    SubmitForReview,
    ViewOwnAnalytics,
    ManageEnrollments,
];

const SCHOLAR: &[Permission] = &[
    ViewCourses,
    ViewPublications,
    DownloadContent,
    UploadContent,
    EditOwnContent,
    DeleteOwnContent,
    UploadPublications,
    SubmitForReview,
    ViewOwnAnalytics,
];

const REVIEWER: &[Permission] = &[
    ViewCourses,
    ViewPublications,
    DownloadContent,
    ViewReviewQueue,
    ReviewContent,
    ApproveContent,
    RejectContent,
    RequestRevisions,
];

const EDITOR: &[Permission] = &[
    ViewCourses,
    ViewPublications,
    DownloadContent,
    ViewReviewQueue,
    ReviewContent,
    ApproveContent,
    RejectContent,
    RequestRevisions,
    EditAnyContent,
    PublishContent,
    UnpublishContent,
    ManageCategories,
    FeatureContent,
    ViewReports,
];

const ADMIN: &[Permission] = &[
    ViewCourses,
    ViewPublications,
    DownloadContent,
    ViewReviewQueue,
    ReviewContent,
    ApproveContent,
    RejectContent,
    EditAnyContent,
    PublishContent,
    UnpublishContent,
    ManageCategories,
    FeatureContent,
    DeleteAnyContent,
    ManageUsers,
    ManageRoles,
    ViewPlatformAnalytics,
    ViewReports,
    ManageSettings,
];

/// Static permission set for a role
pub fn permissions_for(role: Role) -> &'static [Permission] {
    match role {
        Role::Student => STUDENT,
        Role::Teacher => TEACHER,
        Role::Scholar => SCHOLAR,
        Role::Editor => EDITOR,
        Role::Reviewer => REVIEWER,
        Role::Admin => ADMIN,
    }
}

impl Role {
    pub fn permissions(&self) -> &'static [Permission] {
        permissions_for(*self)
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }

    /// True if the role holds at least one of `permissions`
    pub fn has_any(&self, permissions: &[Permission]) -> bool {
        permissions.iter().any(|p| self.has_permission(*p))
    }

    /// True if the role holds every one of `permissions`
    pub fn has_all(&self, permissions: &[Permission]) -> bool {
        permissions.iter().all(|p| self.has_permission(*p))
    }
}

/// Exact membership check on raw role and permission names.
///
/// Unknown roles and unknown permission tags are never members.
pub fn has_permission(role: Option<&str>, permission: &str) -> bool {
    let Some(role) = Role::parse(role) else {
        return false;
    };
    permission
        .parse::<Permission>()
        .map(|p| role.has_permission(p))
        .unwrap_or(false)
}

/// True if the role holds any of the named permissions. Empty list → false.
pub fn has_any<S: AsRef<str>>(role: Option<&str>, permissions: &[S]) -> bool {
    permissions.iter().any(|p| has_permission(role, p.as_ref()))
}

/// True if the role holds all of the named permissions.
/// An empty list passes for known roles; unknown roles fail every check.
pub fn has_all<S: AsRef<str>>(role: Option<&str>, permissions: &[S]) -> bool {
    Role::parse(role).is_some() && permissions.iter().all(|p| has_permission(role, p.as_ref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_sizes() {
        for role in Role::ALL {
            let count = role.permissions().len();
            assert!((5..=20).contains(&count), "{} has {} permissions", role, count);
        }
    }

    #[test]
    fn test_table_has_no_duplicates() {
        for role in Role::ALL {
            let perms = role.permissions();
            for (i, p) in perms.iter().enumerate() {
                assert!(!perms[i + 1..].contains(p), "{} lists {} twice", role, p);
            }
        }
    }

    #[test]
    fn test_tag_round_trip() {
        for p in Permission::ALL {
            assert_eq!(p.as_str().parse::<Permission>().unwrap(), p);
        }
        assert!("Edit_Own_Content".parse::<Permission>().is_err());
    }

    #[test]
    fn test_exact_membership() {
        assert!(has_permission(Some("teacher"), "edit_own_content"));
        assert!(!has_permission(Some("student"), "edit_own_content"));
        assert!(has_permission(Some("Admin"), "manage_users"));
        assert!(!has_permission(Some("editor"), "manage_users"));
    }

    #[test]
    fn test_unknown_role_has_nothing() {
        for p in Permission::ALL {
            assert!(!has_permission(Some("janitor"), p.as_str()));
            assert!(!has_permission(None, p.as_str()));
        }
        assert!(!has_all(Some("janitor"), &[] as &[&str]));
        assert!(!has_any(Some("janitor"), &["view_courses"]));
    }

    #[test]
    fn test_unknown_permission_is_never_held() {
        assert!(!has_permission(Some("admin"), "launch_rockets"));
        assert!(!has_all(Some("admin"), &["manage_users", "launch_rockets"]));
        assert!(has_any(Some("admin"), &["manage_users", "launch_rockets"]));
    }

    #[test]
    fn test_any_and_all() {
        let perms = ["upload_content", "publish_content"];
        assert!(has_any(Some("teacher"), &perms));
        assert!(!has_all(Some("teacher"), &perms));
        assert!(has_all(Some("editor"), &["publish_content", "edit_any_content"]));
        assert!(!has_any(Some("student"), &[] as &[&str]));
        assert!(has_all(Some("student"), &[] as &[&str]));
    }

    #[test]
    fn test_scholar_publisher_symmetry() {
        for p in Permission::ALL {
            assert_eq!(
                has_permission(Some("scholar"), p.as_str()),
                has_permission(Some("publisher"), p.as_str()),
                "mismatch on {}",
                p
            );
        }
    }

    #[test]
    fn test_typed_checks() {
        assert!(Role::Reviewer.has_all(&[ReviewContent, ApproveContent]));
        assert!(!Role::Reviewer.has_any(&[PublishContent, ManageUsers]));
        assert!(Role::Scholar.has_permission(UploadPublications));
        assert!(!Role::Teacher.has_permission(UploadPublications));
    }
}
