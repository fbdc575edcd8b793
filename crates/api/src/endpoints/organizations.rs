//! Organization endpoints.

use axum::{
    extract::{Path, State},
    routing::{get, patch, post},
    Json, Router,
};
use chainvote_common::AppResult;
use chainvote_core::services::organization::RegisterOrganizationInput;
use chainvote_core::services::vote::VoteView;
use chainvote_db::entities::organization;
use serde::Deserialize;
use validator::Validate;

use crate::{
    extractors::{AdminSession, AuthSession},
    middleware::AppState,
    response::ApiResponse,
};

/// Organization registration request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterOrganizationRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    pub business_number: Option<String>,
    #[validate(length(min = 1, message = "adminAddress is required"))]
    pub admin_address: String,
}

/// Register an organization and bind its admin. Global admin only.
async fn register(
    AdminSession(_session): AdminSession,
    State(state): State<AppState>,
    Json(req): Json<RegisterOrganizationRequest>,
) -> AppResult<ApiResponse<organization::Model>> {
    req.validate()?;
    let org = state
        .organization_service
        .register(RegisterOrganizationInput {
            name: req.name,
            business_number: req.business_number,
            admin_address: req.admin_address,
        })
        .await?;
    Ok(ApiResponse::created(org).with_message("Organization registered"))
}

/// List all organizations.
async fn list(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<organization::Model>>> {
    let orgs = state.organization_service.list().await?;
    Ok(ApiResponse::ok(orgs))
}

/// List the organizations administered by the session wallet.
async fn mine(
    AuthSession(session): AuthSession,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<organization::Model>>> {
    let orgs = state
        .organization_service
        .administered_by(&session.address)
        .await?;
    Ok(ApiResponse::ok(orgs))
}

/// Get one organization.
async fn get_organization(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<organization::Model>> {
    let org = state.organization_service.get(&id).await?;
    Ok(ApiResponse::ok(org))
}

/// List an organization's votes.
async fn organization_votes(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<Vec<VoteView>>> {
    let votes = state.vote_service.organization_votes(&id).await?;
    Ok(ApiResponse::ok(votes))
}

/// Admin reassignment request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdminRequest {
    #[validate(length(min = 1, message = "adminAddress is required"))]
    pub admin_address: String,
}

/// Rebind an organization's admin. Global admin only. The previous admin's
/// flags are left as they are.
async fn update_admin(
    AdminSession(_session): AdminSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateAdminRequest>,
) -> AppResult<ApiResponse<organization::Model>> {
    req.validate()?;
    let org = state
        .organization_service
        .update_admin(&id, &req.admin_address)
        .await?;
    Ok(ApiResponse::ok(org).with_message("Organization admin updated"))
}

/// Credit top-up request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCreditRequest {
    pub amount: f64,
}

/// Add credit to an organization's balance. Any authenticated caller.
async fn add_credit(
    AuthSession(_session): AuthSession,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AddCreditRequest>,
) -> AppResult<ApiResponse<organization::Model>> {
    let org = state
        .organization_service
        .add_credit(&id, req.amount)
        .await?;
    Ok(ApiResponse::ok(org).with_message("Credit added"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/", get(list))
        .route("/mine", get(mine))
        .route("/{id}", get(get_organization))
        .route("/{id}/votes", get(organization_votes))
        .route("/{id}/admin", patch(update_admin))
        .route("/{id}/credit", post(add_credit))
}
