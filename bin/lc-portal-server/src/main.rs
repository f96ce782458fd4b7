//! Lectern Portal Server
//!
//! Serves the portal's protected views behind the route guard:
//! - Session endpoints: create (login) and destroy (logout) the session cookies
//! - Identity and permission-check endpoints for the front-end
//! - One guarded endpoint per portal view
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LECTERN_CONFIG` | - | Path to TOML config |
//! | `LECTERN_HTTP_PORT` | `8080` | HTTP port |
//! | `LECTERN_LOGIN_PATH` | `/login` | Redirect target for signed-out users |
//! | `LECTERN_HOME_PATH` | `/` | Redirect target for disallowed roles |
//! | `RUST_LOG` | `info` | Log level |

use std::sync::Arc;

use anyhow::{bail, Result};
use axum::{
    extract::{FromRef, Query, State},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Utc};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use lc_access::guard::ViewSummary;
use lc_access::http::{CurrentSession, GuardLayer, OptionalSession, PermissionQueryParams, SessionCookies};
use lc_access::{
    checks, landing_path, AccessError, AllowedRoles, Permission, PermissionChecker, Role, RouteGuard, RouteTable,
    SessionKeys, User,
};
use lc_config::{AppConfig, ConfigLoader};

/// Routes served regardless of configuration
const FIXED_ROUTES: &[&str] = &[
    "/health",
    "/session",
    "/api/me",
    "/api/permissions",
    "/api/capabilities",
    "/api/admin/roles",
];

#[derive(Parser, Debug)]
#[command(name = "lc-portal-server", about = "Lectern portal server")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, env = "LECTERN_CONFIG")]
    config: Option<String>,

    /// Print an example configuration and exit
    #[arg(long)]
    print_example_config: bool,
}

#[derive(Clone)]
struct PortalState {
    cookies: SessionCookies,
    guard: RouteGuard,
    routes: Arc<RouteTable>,
}

impl FromRef<PortalState> for SessionCookies {
    fn from_ref(state: &PortalState) -> Self {
        state.cookies.clone()
    }
}

impl PortalState {
    fn from_config(config: &AppConfig) -> Self {
        let keys = SessionKeys {
            token: config.session.token_key.clone(),
            user: config.session.user_key.clone(),
        };
        Self {
            cookies: SessionCookies::new(keys).with_secure(config.session.secure_cookies),
            guard: RouteGuard::new(config.guard.login_path.clone(), config.guard.home_path.clone()),
            routes: Arc::new(RouteTable::portal()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreateSessionRequest {
    token: String,
    user: User,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionResponse {
    user: User,
    role: Option<Role>,
    role_label: Option<&'static str>,
    landing_path: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MeResponse {
    user: User,
    role: Option<Role>,
    role_label: Option<&'static str>,
    permissions: Vec<Permission>,
    views: Vec<ViewSummary>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PermissionCheckResponse {
    allowed: bool,
    authenticated: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ViewResponse {
    view: ViewSummary,
    user: User,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CapabilitiesResponse {
    can_upload: bool,
    can_review: bool,
    can_publish: bool,
    is_admin: bool,
}

#[derive(Debug, Serialize)]
struct RoleGrant {
    role: Role,
    label: &'static str,
    permissions: &'static [Permission],
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: DateTime<Utc>,
    version: &'static str,
}

async fn create_session(
    State(state): State<PortalState>,
    jar: CookieJar,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(CookieJar, Json<SessionResponse>), AccessError> {
    let (jar, session) = state.cookies.store(jar, &req.token, &req.user)?;
    info!(user_id = %session.user.id, role = session.raw_role().unwrap_or(""), "Session created");

    let role = session.role();
    let body = SessionResponse {
        landing_path: landing_path(&session, state.guard.home_path()).to_string(),
        role,
        role_label: role.map(|r| r.label()),
        user: session.user,
    };
    Ok((jar, Json(body)))
}

async fn destroy_session(
    State(state): State<PortalState>,
    OptionalSession(session): OptionalSession,
    jar: CookieJar,
) -> (CookieJar, StatusCode) {
    if let Some(session) = session {
        info!(user_id = %session.user.id, "Session destroyed");
    }
    (state.cookies.clear(jar), StatusCode::NO_CONTENT)
}

async fn me(State(state): State<PortalState>, CurrentSession(session): CurrentSession) -> Json<MeResponse> {
    let role = session.role();
    let views = state
        .routes
        .visible_to(&session)
        .into_iter()
        .map(|r| r.summary())
        .collect();

    Json(MeResponse {
        role,
        role_label: role.map(|r| r.label()),
        permissions: role.map(|r| r.permissions().to_vec()).unwrap_or_default(),
        views,
        user: session.user,
    })
}

async fn check_permissions(
    checker: PermissionChecker,
    Query(params): Query<PermissionQueryParams>,
) -> Json<PermissionCheckResponse> {
    Json(PermissionCheckResponse {
        allowed: checker.check(params.query(), params.mode),
        authenticated: checker.is_authenticated(),
    })
}

async fn capabilities(checker: PermissionChecker) -> Json<CapabilitiesResponse> {
    Json(CapabilitiesResponse {
        can_upload: checks::can_upload(&checker).is_ok(),
        can_review: checks::can_review(&checker).is_ok(),
        can_publish: checks::can_publish(&checker).is_ok(),
        is_admin: checks::is_admin(&checker).is_ok(),
    })
}

/// Full role/permission table, for administrators only
async fn role_grants(checker: PermissionChecker) -> Result<Json<Vec<RoleGrant>>, AccessError> {
    checks::is_admin(&checker)?;

    let grants = Role::ALL
        .into_iter()
        .map(|role| RoleGrant {
            role,
            label: role.label(),
            permissions: role.permissions(),
        })
        .collect();
    Ok(Json(grants))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP",
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn login_page(State(state): State<PortalState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "view": "login",
        "sessionEndpoint": "/session",
        "loginPath": state.guard.login_path(),
    }))
}

async fn home_page(State(state): State<PortalState>, OptionalSession(session): OptionalSession) -> impl IntoResponse {
    let next = session
        .as_ref()
        .map(|s| landing_path(s, state.guard.home_path()).to_string());
    Json(serde_json::json!({
        "view": "home",
        "authenticated": session.is_some(),
        "dashboard": next,
    }))
}

/// One guarded route per portal view
fn views_router(state: &PortalState) -> Router<PortalState> {
    let base = GuardLayer::new(state.guard.clone(), state.cookies.clone(), AllowedRoles::any());

    state.routes.routes().iter().fold(Router::new(), |router, route| {
        let summary = route.summary();
        let layer = base.with_allowed(route.allowed.clone());
        router.route(
            &route.path,
            get(move |CurrentSession(session): CurrentSession| {
                let view = summary.clone();
                async move { Json(ViewResponse { view, user: session.user }) }
            })
            .route_layer(layer),
        )
    })
}

/// Reject guard paths the router cannot serve.
///
/// Neither path may shadow a fixed route. The login path may not be a portal
/// view. The home path may be an open view, which then serves as home, but
/// not a restricted one: a disallowed role would be redirected to it forever.
fn check_guard_paths(state: &PortalState) -> Result<()> {
    let login = state.guard.login_path();
    let home = state.guard.home_path();

    for (name, path) in [("login_path", login), ("home_path", home)] {
        if FIXED_ROUTES.contains(&path) {
            bail!("guard.{} '{}' collides with a built-in route", name, path);
        }
    }
    if state.routes.find(login).is_some() {
        bail!("guard.login_path '{}' is a portal view", login);
    }
    if let Some(view) = state.routes.find(home) {
        if view.allowed.is_restricted() {
            bail!("guard.home_path '{}' is a restricted portal view", home);
        }
    }
    Ok(())
}

fn build_router(state: PortalState, config: &AppConfig) -> Result<Router> {
    check_guard_paths(&state)?;

    let cors = if config.dev_mode {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .http
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(origins).allow_methods(Any).allow_headers(Any)
    };

    let mut router = Router::new()
        .route("/health", get(health))
        .route(state.guard.login_path(), get(login_page))
        .route("/session", post(create_session).delete(destroy_session))
        .route("/api/me", get(me))
        .route("/api/permissions", get(check_permissions))
        .route("/api/capabilities", get(capabilities))
        .route("/api/admin/roles", get(role_grants));

    let home = state.guard.home_path();
    if state.routes.routes().iter().any(|r| r.path == home) {
        info!(home_path = home, "Home path is a portal view, not registering a landing route");
    } else {
        router = router.route(home, get(home_page));
    }

    Ok(router
        .merge(views_router(&state))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_example_config {
        println!("{}", AppConfig::example_toml());
        return Ok(());
    }

    lc_common::logging::init_logging("lc-portal-server");
    info!("Starting Lectern Portal Server");

    let loader = match &args.config {
        Some(path) => ConfigLoader::with_path(path),
        None => ConfigLoader::new(),
    };
    let config = loader.load()?;

    let state = PortalState::from_config(&config);
    info!(
        views = state.routes.routes().len(),
        login_path = state.guard.login_path(),
        home_path = state.guard.home_path(),
        "Route table loaded"
    );

    let app = build_router(state, &config)?;

    let addr = format!("{}:{}", config.http.host, config.http.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Portal server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Portal server shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
