//! Tower access-control middleware.
//!
//! `AccessLayer` and `AccessService` wrap any inner service with
//! session resolution and ACL authorization. On ALLOW the resolved
//! identity and session ride into the inner service as request
//! extensions; on DENY the inner service never runs.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::response::IntoResponse;
use http::{Request, StatusCode};
use tower::{Layer, Service};

use warden_acl::Decision;
use warden_core::Action;
use warden_session::Session;

use crate::resolver::IdentityResolver;
use crate::AccessConfig;

/// Tower `Layer` that wraps services with access control.
#[derive(Clone)]
pub struct AccessLayer {
    resolver: Arc<IdentityResolver>,
    config: AccessConfig,
}

impl AccessLayer {
    /// Create a new access layer over the given resolver and config.
    pub fn new(resolver: Arc<IdentityResolver>, config: AccessConfig) -> Self {
        Self { resolver, config }
    }
}

impl<S> Layer<S> for AccessLayer {
    type Service = AccessService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AccessService {
            inner,
            resolver: self.resolver.clone(),
            config: self.config.clone(),
        }
    }
}

/// Tower `Service` that authorizes requests before forwarding them.
///
/// Every request, allowed or denied, touches its session exactly once;
/// a session created on first contact is handed back via `Set-Cookie`
/// on whichever response goes out.
#[derive(Clone)]
pub struct AccessService<S> {
    inner: S,
    resolver: Arc<IdentityResolver>,
    config: AccessConfig,
}

impl<S> Service<Request<Body>> for AccessService<S>
where
    S: Service<Request<Body>, Error = Infallible> + Clone + Send + 'static,
    S::Response: IntoResponse,
    S::Future: Send,
{
    type Response = axum::response::Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        let resolver = self.resolver.clone();
        let config = self.config.clone();

        Box::pin(async move {
            let token = cookie_value(&req, &config.cookie_name);
            let mut resolved = match resolver.resolve(token.as_deref()) {
                Ok(resolved) => resolved,
                Err(err) => {
                    log::error!("session resolution failed: {err}");
                    return Ok(store_failure_response());
                }
            };

            let resource = req.uri().path().to_string();
            let decision = match Action::from_method(req.method().as_str()) {
                Some(action) => {
                    resolver
                        .graph()
                        .authorize(&resolved.identity, &resource, action)
                }
                // Methods outside the action vocabulary are denied
                // without consulting the graph.
                None => Decision::Deny,
            };

            resolved.session.touch();
            if let Err(err) = resolver.sessions().save(resolved.session.clone()) {
                log::warn!("session save failed for {}: {err}", resolved.session.token);
            }
            let set_cookie = resolved
                .created
                .then(|| session_cookie(&config.cookie_name, &resolved.session));

            if decision == Decision::Deny {
                log::debug!(
                    "access denied method={} resource={resource}",
                    req.method()
                );
                let mut response = denied_response(&resource);
                append_cookie(&mut response, set_cookie);
                return Ok(response);
            }

            req.extensions_mut().insert(resolved.identity);
            req.extensions_mut().insert(resolved.session);
            let response = inner
                .call(req)
                .await
                .unwrap_or_else(|infallible| match infallible {});
            let mut response = response.into_response();
            append_cookie(&mut response, set_cookie);
            Ok(response)
        })
    }
}

/// Extract a cookie value from the Cookie header.
fn cookie_value(req: &Request<Body>, name: &str) -> Option<String> {
    let header = req
        .headers()
        .get(http::header::COOKIE)?
        .to_str()
        .ok()?;
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// Build the Set-Cookie value handing a created session to the client.
fn session_cookie(name: &str, session: &Session) -> String {
    format!(
        "{name}={token}; Path=/; HttpOnly; SameSite=Lax",
        token = session.token
    )
}

fn append_cookie(response: &mut axum::response::Response, cookie: Option<String>) {
    if let Some(cookie) = cookie {
        if let Ok(value) = http::HeaderValue::from_str(&cookie) {
            response
                .headers_mut()
                .append(http::header::SET_COOKIE, value);
        }
    }
}

/// Build a 403 response with a stable JSON body.
fn denied_response(resource: &str) -> axum::response::Response {
    let body = serde_json::json!({
        "error": {
            "category": "authorization",
            "message": "access denied",
            "resource": resource,
        }
    });
    (
        StatusCode::FORBIDDEN,
        [(http::header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
        .into_response()
}

/// Build a 500 response for a session store that cannot answer.
fn store_failure_response() -> axum::response::Response {
    let body = serde_json::json!({
        "error": {
            "category": "session",
            "message": "session store unavailable",
        }
    });
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(http::header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
        .into_response()
}
