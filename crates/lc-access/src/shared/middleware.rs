//! HTTP Middleware
//!
//! Exposes the route guard and the permission checker to axum. The session
//! entries live in cookies named after the storage keys (`token`, `user`);
//! the user cookie holds JSON, percent-encoded once by the cookie jar.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap, Request},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

use crate::guard::{AllowedRoles, GuardDecision, RouteGuard};
use crate::session::{decode_user, Session, SessionKeys, User};
use crate::shared::error::{AccessError, Result};
use crate::shared::permission_checker::{CheckMode, PermissionChecker, PermissionQuery};

/// Reads and writes the session cookies
#[derive(Debug, Clone)]
pub struct SessionCookies {
    keys: SessionKeys,
    secure: bool,
}

impl Default for SessionCookies {
    fn default() -> Self {
        Self::new(SessionKeys::default())
    }
}

impl SessionCookies {
    pub fn new(keys: SessionKeys) -> Self {
        Self { keys, secure: false }
    }

    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn keys(&self) -> &SessionKeys {
        &self.keys
    }

    /// Session from the jar. Missing, blank, or malformed entries yield `None`.
    pub fn read(&self, jar: &CookieJar) -> Option<Session> {
        let token = jar.get(&self.keys.token)?.value().to_string();
        let user = decode_user(jar.get(&self.keys.user)?.value())?;
        Session::new(token, user)
    }

    pub fn from_headers(&self, headers: &HeaderMap) -> Option<Session> {
        self.read(&CookieJar::from_headers(headers))
    }

    /// Add both session cookies to the jar
    pub fn store(&self, jar: CookieJar, token: &str, user: &User) -> Result<(CookieJar, Session)> {
        let session = Session::new(token, user.clone())
            .ok_or_else(|| AccessError::validation("token must not be empty"))?;
        let user_json = serde_json::to_string(user)?;

        let jar = jar
            .add(self.cookie(self.keys.token.clone(), session.token.clone()))
            .add(self.cookie(self.keys.user.clone(), user_json));
        Ok((jar, session))
    }

    /// Remove both session cookies
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build(self.keys.token.clone()).path("/"))
            .remove(Cookie::build(self.keys.user.clone()).path("/"))
    }

    fn cookie(&self, name: String, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .build()
    }
}

/// Authenticated session extractor.
///
/// Uses the session placed in request extensions by [`GuardLayer`] when
/// present, otherwise reads the cookies. Rejects with 401.
pub struct CurrentSession(pub Session);

impl std::ops::Deref for CurrentSession {
    type Target = Session;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
    SessionCookies: FromRef<S>,
{
    type Rejection = AccessError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> std::result::Result<Self, Self::Rejection> {
        session_from_parts(parts, state)
            .map(CurrentSession)
            .ok_or_else(|| AccessError::unauthorized("Missing or invalid session"))
    }
}

/// Session extractor that never rejects
pub struct OptionalSession(pub Option<Session>);

impl std::ops::Deref for OptionalSession {
    type Target = Option<Session>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for OptionalSession
where
    S: Send + Sync,
    SessionCookies: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> std::result::Result<Self, Self::Rejection> {
        Ok(OptionalSession(session_from_parts(parts, state)))
    }
}

impl<S> FromRequestParts<S> for PermissionChecker
where
    S: Send + Sync,
    SessionCookies: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> std::result::Result<Self, Self::Rejection> {
        Ok(PermissionChecker::for_session(session_from_parts(parts, state).as_ref()))
    }
}

fn session_from_parts<S>(parts: &Parts, state: &S) -> Option<Session>
where
    SessionCookies: FromRef<S>,
{
    if let Some(session) = parts.extensions.get::<Session>() {
        return Some(session.clone());
    }
    SessionCookies::from_ref(state).from_headers(&parts.headers)
}

/// Query string for permission checks: `?permission=a,b&mode=all`
#[derive(Debug, Clone, Deserialize)]
pub struct PermissionQueryParams {
    pub permission: String,
    #[serde(default)]
    pub mode: CheckMode,
}

impl PermissionQueryParams {
    pub fn query(&self) -> PermissionQuery {
        let names: Vec<String> = self
            .permission
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect();
        match names.as_slice() {
            [single] => PermissionQuery::One(single.clone()),
            _ => PermissionQuery::Many(names),
        }
    }
}

/// Layer that guards every request to the wrapped service
#[derive(Clone)]
pub struct GuardLayer {
    guard: Arc<RouteGuard>,
    cookies: Arc<SessionCookies>,
    allowed: Arc<AllowedRoles>,
}

impl GuardLayer {
    pub fn new(guard: RouteGuard, cookies: SessionCookies, allowed: AllowedRoles) -> Self {
        Self {
            guard: Arc::new(guard),
            cookies: Arc::new(cookies),
            allowed: Arc::new(allowed),
        }
    }

    /// Same guard and cookies, different allow-list
    pub fn with_allowed(&self, allowed: AllowedRoles) -> Self {
        Self {
            guard: self.guard.clone(),
            cookies: self.cookies.clone(),
            allowed: Arc::new(allowed),
        }
    }
}

impl<S> Layer<S> for GuardLayer {
    type Service = GuardMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        GuardMiddleware {
            inner,
            layer: self.clone(),
        }
    }
}

#[derive(Clone)]
pub struct GuardMiddleware<S> {
    inner: S,
    layer: GuardLayer,
}

impl<S, B> Service<Request<B>> for GuardMiddleware<S>
where
    S: Service<Request<B>, Response = Response> + Send + Clone + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        let session = self.layer.cookies.from_headers(req.headers());

        match self.layer.guard.evaluate(session, &self.layer.allowed) {
            GuardDecision::Render(session) => {
                req.extensions_mut().insert(session);
                let future = self.inner.call(req);
                Box::pin(future)
            }
            GuardDecision::Redirect { to, reason } => {
                tracing::debug!(path = %req.uri().path(), ?reason, %to, "Guard redirect");
                Box::pin(async move { Ok(Redirect::to(&to).into_response()) })
            }
        }
    }
}
