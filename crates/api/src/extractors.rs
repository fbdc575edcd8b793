//! Request extractors.
//!
//! Rejections are `AppError` values so they render through the same
//! `{success: false, message}` envelope as every other error.

use axum::{extract::FromRequestParts, http::request::Parts};
use chainvote_common::AppError;
use chainvote_core::Session;

/// Authenticated session extractor.
#[derive(Debug, Clone)]
pub struct AuthSession(pub Session);

impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by the auth middleware when a valid bearer token is present
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(AuthSession)
            .ok_or_else(|| AppError::Unauthorized("authentication required".to_string()))
    }
}

/// Optional authenticated session extractor.
#[derive(Debug, Clone)]
pub struct MaybeAuthSession(pub Option<Session>);

impl<S> FromRequestParts<S> for MaybeAuthSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(parts.extensions.get::<Session>().cloned()))
    }
}

/// Global-admin session extractor. Rejects non-admin sessions with 403.
#[derive(Debug, Clone)]
pub struct AdminSession(pub Session);

impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("authentication required".to_string()))?;

        if !session.is_admin {
            return Err(AppError::Forbidden("admin access required".to_string()));
        }

        Ok(Self(session))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};
    use axum::response::IntoResponse;

    fn session(is_admin: bool) -> Session {
        Session {
            user_id: "user1".to_string(),
            address: "0xaabbccddeeff00112233445566778899aabbccdd".to_string(),
            is_admin,
            admin_organization_id: is_admin.then(|| "org1".to_string()),
        }
    }

    #[tokio::test]
    async fn test_auth_session_missing() {
        let request = Request::builder().body(()).unwrap();
        let (mut parts, ()) = request.into_parts();

        let result = AuthSession::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_admin_session_rejects_plain_user() {
        let mut request = Request::builder().body(()).unwrap();
        request.extensions_mut().insert(session(false));
        let (mut parts, ()) = request.into_parts();

        let result = AdminSession::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_admin_session_accepts_admin() {
        let mut request = Request::builder().body(()).unwrap();
        request.extensions_mut().insert(session(true));
        let (mut parts, ()) = request.into_parts();

        let result = AdminSession::from_request_parts(&mut parts, &()).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_maybe_session_is_none_without_auth() {
        let request = Request::builder().body(()).unwrap();
        let (mut parts, ()) = request.into_parts();

        let MaybeAuthSession(maybe) = MaybeAuthSession::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(maybe.is_none());
    }

    #[tokio::test]
    async fn test_rejection_renders_standard_envelope() {
        let request = Request::builder().body(()).unwrap();
        let (mut parts, ()) = request.into_parts();

        let err = AuthSession::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert!(body["message"].as_str().unwrap().contains("Unauthorized"));
    }
}
