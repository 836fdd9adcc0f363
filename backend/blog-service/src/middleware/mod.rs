/// HTTP middleware utilities for blog-service
///
/// Session authentication resolves the viewer from a bearer token or the
/// session cookie but never rejects a request itself: anonymous requests pass
/// through, and routes that need a user ask for `CurrentUser`, which turns a
/// missing viewer into the login redirect. A verified viewer is mirrored into
/// the local users table before the handler runs, so posts, comments and
/// follows always reference an existing user.
use crate::db::BlogStore;
use crate::error::AppError;
use crate::metrics::http::record_http_request;
use crate::security::TokenVerifier;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, Error, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

// =====================================================================
// Session authentication
// =====================================================================

/// Authenticated viewer stored in request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub id: i64,
    pub username: String,
}

/// Where anonymous viewers are sent
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub login_url: String,
}

impl AuthSettings {
    /// `login_url?next=<path>` with the path's slashes left readable
    pub fn login_redirect(&self, path_and_query: &str) -> String {
        format!(
            "{}?next={}",
            self.login_url,
            urlencoding::encode(path_and_query).replace("%2F", "/")
        )
    }
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            login_url: "/login/".to_string(),
        }
    }
}

pub struct SessionAuthMiddleware {
    verifier: Arc<TokenVerifier>,
    store: Arc<dyn BlogStore>,
    cookie_name: Rc<str>,
}

impl SessionAuthMiddleware {
    pub fn new(verifier: Arc<TokenVerifier>, store: Arc<dyn BlogStore>, cookie_name: &str) -> Self {
        Self {
            verifier,
            store,
            cookie_name: Rc::from(cookie_name),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for SessionAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = SessionAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(SessionAuthMiddlewareService {
            service: Rc::new(service),
            verifier: self.verifier.clone(),
            store: self.store.clone(),
            cookie_name: self.cookie_name.clone(),
        }))
    }
}

pub struct SessionAuthMiddlewareService<S> {
    service: Rc<S>,
    verifier: Arc<TokenVerifier>,
    store: Arc<dyn BlogStore>,
    cookie_name: Rc<str>,
}

impl<S> SessionAuthMiddlewareService<S> {
    fn session_token(&self, req: &ServiceRequest) -> Option<String> {
        let bearer = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(|t| t.trim().to_string());

        bearer.or_else(|| {
            req.cookie(&self.cookie_name)
                .map(|cookie| cookie.value().to_string())
        })
    }
}

impl<S, B> Service<ServiceRequest> for SessionAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let viewer = self.session_token(&req).and_then(|token| {
            match self
                .verifier
                .verify(&token)
                .and_then(|claims| Ok((claims.user_id()?, claims.username)))
            {
                Ok((id, username)) => Some(Viewer { id, username }),
                Err(e) => {
                    tracing::debug!("Ignoring invalid session token: {}", e);
                    None
                }
            }
        });

        let service = self.service.clone();
        let store = self.store.clone();
        Box::pin(async move {
            if let Some(viewer) = viewer {
                // Viewer stays authenticated when mirroring fails.
                if let Err(e) = store.upsert_user(viewer.id, &viewer.username).await {
                    tracing::warn!(user_id = viewer.id, "Failed to mirror viewer: {:#}", e);
                }
                req.extensions_mut().insert(viewer);
            }
            service.call(req).await
        })
    }
}

/// Viewer if the request carries a valid session
#[derive(Debug, Clone)]
pub struct MaybeViewer(pub Option<Viewer>);

impl MaybeViewer {
    pub fn id(&self) -> Option<i64> {
        self.0.as_ref().map(|v| v.id)
    }
}

impl FromRequest for MaybeViewer {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        ready(Ok(MaybeViewer(req.extensions().get::<Viewer>().cloned())))
    }
}

/// Viewer required; anonymous requests are redirected to login
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Viewer);

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        if let Some(viewer) = req.extensions().get::<Viewer>().cloned() {
            return ready(Ok(CurrentUser(viewer)));
        }

        let path_and_query = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| req.path());
        let location = match req.app_data::<web::Data<AuthSettings>>() {
            Some(settings) => settings.login_redirect(path_and_query),
            None => AuthSettings::default().login_redirect(path_and_query),
        };

        ready(Err(AppError::Unauthenticated { location }))
    }
}

// =====================================================================
// Metrics middleware
// =====================================================================

/// Records `blog_http_requests_total` and `blog_http_request_duration_seconds`
pub struct MetricsMiddleware;

impl<S, B> Transform<S, ServiceRequest> for MetricsMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = MetricsMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(MetricsMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct MetricsMiddlewareService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for MetricsMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let method = req.method().to_string();
        let start = Instant::now();

        Box::pin(async move {
            let res = service.call(req).await;
            let elapsed = start.elapsed().as_secs_f64();

            let (route, status) = match &res {
                Ok(res) => (
                    res.request()
                        .match_pattern()
                        .unwrap_or_else(|| "unmatched".to_string()),
                    res.status().as_u16(),
                ),
                Err(e) => (
                    "unmatched".to_string(),
                    e.as_response_error().status_code().as_u16(),
                ),
            };
            record_http_request(&method, &route, status, elapsed);
            res
        })
    }
}
