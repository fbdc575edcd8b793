//! User endpoints.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chainvote_common::AppResult;
use chainvote_core::services::user::Membership;
use chainvote_db::entities::user;
use serde::Deserialize;
use validator::Validate;

use crate::{middleware::AppState, response::ApiResponse};

/// User registration request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserRequest {
    #[validate(length(min = 1, message = "walletAddress is required"))]
    pub wallet_address: String,
}

/// Register a wallet. Idempotent; re-registration reports the existing user.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterUserRequest>,
) -> AppResult<ApiResponse<user::Model>> {
    req.validate()?;
    let registration = state.user_service.register(&req.wallet_address).await?;

    let response = if registration.already_registered {
        ApiResponse::ok(registration.user).with_message("User already registered")
    } else {
        ApiResponse::created(registration.user).with_message("User registered")
    };
    Ok(response)
}

/// Get a user by wallet address.
async fn get_user(
    State(state): State<AppState>,
    Path(wallet_address): Path<String>,
) -> AppResult<ApiResponse<user::Model>> {
    let user = state.user_service.get(&wallet_address).await?;
    Ok(ApiResponse::ok(user))
}

/// List the organizations a wallet belongs to.
async fn user_organizations(
    State(state): State<AppState>,
    Path(wallet_address): Path<String>,
) -> AppResult<ApiResponse<Vec<Membership>>> {
    let memberships = state.user_service.organizations(&wallet_address).await?;
    Ok(ApiResponse::ok(memberships))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/{wallet_address}", get(get_user))
        .route("/{wallet_address}/organizations", get(user_organizations))
}
