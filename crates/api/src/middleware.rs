//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::{to_bytes, Body},
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use chainvote_core::{AuthService, OrganizationService, UserService, VoteService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub organization_service: OrganizationService,
    pub vote_service: VoteService,
    /// Deployment environment; error diagnostics are added outside production.
    pub environment: String,
}

/// Authentication middleware.
///
/// A valid bearer token puts the verified [`Session`](chainvote_core::Session)
/// into request extensions; anything else leaves the request anonymous and
/// the extractors decide whether that is acceptable.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(session) = state.auth_service.verify_token(token)
    {
        req.extensions_mut().insert(session);
    }

    next.run(req).await
}

/// Error diagnostics middleware.
///
/// Outside production, error responses carrying the standard JSON envelope
/// get the request path and method spliced in to ease client debugging.
pub async fn error_diagnostics(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    let method = req.method().to_string();

    let response = next.run(req).await;

    let is_error =
        response.status().is_client_error() || response.status().is_server_error();
    if state.environment == "production" || !is_error {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let Ok(bytes) = to_bytes(body, 1024 * 1024).await else {
        return Response::from_parts(parts, Body::empty());
    };

    match serde_json::from_slice::<serde_json::Value>(&bytes) {
        Ok(serde_json::Value::Object(mut envelope)) => {
            envelope.insert("path".to_string(), serde_json::Value::String(path));
            envelope.insert("method".to_string(), serde_json::Value::String(method));
            let body = serde_json::to_vec(&envelope).unwrap_or_else(|_| bytes.to_vec());
            // The body length changed; the old header would truncate it.
            parts.headers.remove(axum::http::header::CONTENT_LENGTH);
            Response::from_parts(parts, Body::from(body))
        }
        // Not a JSON object body; pass it through untouched.
        _ => Response::from_parts(parts, Body::from(bytes)),
    }
}
