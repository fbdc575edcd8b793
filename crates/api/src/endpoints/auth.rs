//! Authentication endpoints.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chainvote_common::AppResult;
use chainvote_core::services::auth::{NonceChallenge, VerifiedLogin};
use chainvote_core::services::user::Membership;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{middleware::AppState, response::ApiResponse};

/// Nonce request: `{address}`.
#[derive(Debug, Deserialize, Validate)]
pub struct NonceRequest {
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
}

/// Request a login nonce for a wallet.
async fn request_nonce(
    State(state): State<AppState>,
    Json(req): Json<NonceRequest>,
) -> AppResult<ApiResponse<NonceChallenge>> {
    req.validate()?;
    let challenge = state.auth_service.request_nonce(&req.address).await?;
    Ok(ApiResponse::ok(challenge))
}

/// Signature verification request: `{address, signature, message}`.
#[derive(Debug, Deserialize, Validate)]
pub struct VerifySignatureRequest {
    #[validate(length(min = 1, message = "address is required"))]
    pub address: String,
    #[validate(length(min = 1, message = "signature is required"))]
    pub signature: String,
    #[validate(length(min = 1, message = "message is required"))]
    pub message: String,
}

/// Verify a signed challenge and hand out a session token.
async fn verify_signature(
    State(state): State<AppState>,
    Json(req): Json<VerifySignatureRequest>,
) -> AppResult<ApiResponse<VerifiedLogin>> {
    req.validate()?;
    let login = state
        .auth_service
        .verify_signature(&req.address, &req.signature, &req.message)
        .await?;
    Ok(ApiResponse::ok(login).with_message("Login successful"))
}

/// Auth status response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatusResponse {
    pub organizations: Vec<Membership>,
}

/// Membership status for a wallet. Unknown wallets read as an empty
/// organization list rather than an error.
async fn auth_status(
    State(state): State<AppState>,
    Path(wallet_address): Path<String>,
) -> AppResult<ApiResponse<AuthStatusResponse>> {
    let organizations = state.user_service.organizations(&wallet_address).await?;
    Ok(ApiResponse::ok(AuthStatusResponse { organizations }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/nonce", post(request_nonce))
        .route("/verify-signature", post(verify_signature))
        .route("/status/{wallet_address}", get(auth_status))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_nonce_request_takes_address_field() {
        let req: NonceRequest =
            serde_json::from_str(r#"{"address": "0xaabbccddeeff00112233445566778899aabbccdd"}"#)
                .unwrap();
        assert!(req.validate().is_ok());
        assert!(req.address.starts_with("0x"));

        // The documented body carries `address`, nothing else.
        assert!(serde_json::from_str::<NonceRequest>(r#"{"walletAddress": "0xab"}"#).is_err());
    }

    #[test]
    fn test_verify_signature_request_fields() {
        let req: VerifySignatureRequest = serde_json::from_str(
            r#"{
                "address": "0xaabbccddeeff00112233445566778899aabbccdd",
                "signature": "0xdeadbeef",
                "message": "Sign this message to login: abc"
            }"#,
        )
        .unwrap();
        assert!(req.validate().is_ok());

        let empty: VerifySignatureRequest =
            serde_json::from_str(r#"{"address": "", "signature": "", "message": ""}"#).unwrap();
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_auth_status_response_shape() {
        let body = serde_json::to_value(AuthStatusResponse {
            organizations: vec![],
        })
        .unwrap();

        assert!(body["organizations"].as_array().unwrap().is_empty());
        assert!(body.get("registered").is_none());
    }
}
