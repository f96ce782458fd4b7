//! Access Integration Tests
//!
//! Role resolution, session handling, and the guard wired into axum routers.

use lc_access::{
    has_permission, normalize_role, AllowedRoles, CheckMode, ClientStorage, GuardDecision, MemoryStorage,
    Permission, PermissionChecker, RedirectReason, Role, RouteGuard, SessionManager, User,
};

mod resolver_tests {
    use super::*;

    #[test]
    fn test_unknown_roles_hold_no_permissions() {
        for raw in ["", "guest", "superuser", "stu dent", "scholar-publisher"] {
            assert!(Role::parse(Some(raw)).is_none());
            for p in Permission::ALL {
                assert!(!has_permission(Some(raw), p.as_str()), "{:?} held {}", raw, p);
            }
        }
    }

    #[test]
    fn test_synonym_symmetry_across_all_permissions() {
        for p in Permission::ALL {
            assert_eq!(
                has_permission(Some("Scholar"), p.as_str()),
                has_permission(Some("PUBLISHER"), p.as_str())
            );
        }
        assert_eq!(normalize_role(Some("Publisher")), normalize_role(Some("scholar")));
    }

    #[test]
    fn test_every_role_can_browse() {
        for role in Role::ALL {
            assert!(role.has_permission(Permission::ViewCourses), "{} cannot browse", role);
        }
    }

    #[test]
    fn test_only_admin_manages_users() {
        for role in Role::ALL {
            assert_eq!(role.has_permission(Permission::ManageUsers), role == Role::Admin);
        }
    }
}

mod guard_tests {
    use super::*;

    fn manager_with(role: &str) -> SessionManager<MemoryStorage> {
        let manager = SessionManager::new(MemoryStorage::new());
        manager
            .login("tok", &User::new("1", "u@example.com").with_role(role))
            .unwrap();
        manager
    }

    #[test]
    fn test_documented_examples() {
        let guard = RouteGuard::default();

        let decision = guard.check(&manager_with("Teacher"), &AllowedRoles::from_names(["Teacher", "Scholar"]));
        assert!(decision.is_render());

        let decision = guard.check(&manager_with("Publisher"), &AllowedRoles::from_names(["Scholar"]));
        assert!(decision.is_render());

        let decision = guard.check(&manager_with("Student"), &AllowedRoles::from_names(["Admin"]));
        assert_eq!(
            decision,
            GuardDecision::Redirect {
                to: "/".to_string(),
                reason: RedirectReason::RoleNotAllowed
            }
        );
    }

    #[test]
    fn test_malformed_storage_redirects_to_login() {
        let storage = MemoryStorage::new();
        storage.set("token", "tok").unwrap();
        storage.set("user", "not json").unwrap();

        let decision = RouteGuard::default().check(&SessionManager::new(storage), &AllowedRoles::any());
        assert_eq!(decision.redirect_target(), Some("/login"));
    }

    #[test]
    fn test_checker_follows_logout() {
        let manager = manager_with("Editor");
        assert!(PermissionChecker::from_manager(&manager).check("publish_content", CheckMode::Any));

        manager.logout().unwrap();
        assert!(!PermissionChecker::from_manager(&manager).check("publish_content", CheckMode::Any));
    }
}

mod http_tests {
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        routing::get,
        Json, Router,
    };
    use lc_access::http::{CurrentSession, GuardLayer, PermissionQueryParams, SessionCookies};
    use lc_access::{AllowedRoles, PermissionChecker, RouteGuard};
    use axum::extract::Query;
    use tower::ServiceExt;

    fn cookie_header(token: &str, user_json: &str) -> String {
        format!("token={}; user={}", token, urlencoding::encode(user_json))
    }

    fn app(allowed: AllowedRoles) -> Router {
        let cookies = SessionCookies::default();
        let layer = GuardLayer::new(RouteGuard::default(), cookies.clone(), allowed);

        Router::new()
            .route(
                "/view",
                get(|CurrentSession(session): CurrentSession| async move { session.user.email.clone() }),
            )
            .route_layer(layer)
            .route(
                "/check",
                get(|checker: PermissionChecker, Query(params): Query<PermissionQueryParams>| async move {
                    Json(checker.check(params.query(), params.mode))
                }),
            )
            .with_state(cookies)
    }

    async fn get_with_cookie(app: Router, uri: &str, cookie: Option<String>) -> axum::response::Response {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap()
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_no_cookies_redirects_to_login() {
        let response = get_with_cookie(app(AllowedRoles::any()), "/view", None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }

    #[tokio::test]
    async fn test_allowed_role_renders() {
        let cookie = cookie_header("tok", r#"{"id":1,"email":"p@example.com","role":"Publisher"}"#);
        let response = get_with_cookie(app(AllowedRoles::from_names(["Scholar"])), "/view", Some(cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "p@example.com");
    }

    #[tokio::test]
    async fn test_wrong_role_redirects_home() {
        let cookie = cookie_header("tok", r#"{"id":1,"email":"s@example.com","role":"Student"}"#);
        let response = get_with_cookie(app(AllowedRoles::from_names(["Admin"])), "/view", Some(cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
    }

    #[tokio::test]
    async fn test_malformed_user_cookie_redirects_to_login() {
        let cookie = "token=tok; user=%7B%22id%22".to_string();
        let response = get_with_cookie(app(AllowedRoles::any()), "/view", Some(cookie)).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }

    #[tokio::test]
    async fn test_empty_token_redirects_to_login() {
        let cookie = cookie_header("", r#"{"id":1,"email":"a@example.com","role":"Admin"}"#);
        let response = get_with_cookie(app(AllowedRoles::any()), "/view", Some(cookie)).await;
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }

    #[tokio::test]
    async fn test_permission_endpoint_modes() {
        let cookie = cookie_header("tok", r#"{"id":1,"email":"t@example.com","role":"Teacher"}"#);

        let response = get_with_cookie(
            app(AllowedRoles::any()),
            "/check?permission=upload_content,publish_content&mode=any",
            Some(cookie.clone()),
        )
        .await;
        assert_eq!(body_string(response).await, "true");

        let response = get_with_cookie(
            app(AllowedRoles::any()),
            "/check?permission=upload_content,publish_content&mode=all",
            Some(cookie),
        )
        .await;
        assert_eq!(body_string(response).await, "false");
    }

    #[tokio::test]
    async fn test_permission_endpoint_signed_out() {
        let response = get_with_cookie(app(AllowedRoles::any()), "/check?permission=view_courses", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "false");
    }
}
