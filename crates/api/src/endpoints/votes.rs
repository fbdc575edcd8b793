//! Vote endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chainvote_common::AppResult;
use chainvote_core::services::vote::{
    CreateVoteInput, SubmissionReceipt, VoteResults, VoteView,
};
use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use validator::Validate;

use crate::{extractors::AuthSession, middleware::AppState, response::ApiResponse};

/// Vote creation request.
///
/// The owning organization always comes from the session; an
/// `organizationId` field in the body is ignored.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateVoteRequest {
    #[validate(length(min = 1, message = "title is required"))]
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    #[validate(length(min = 1, message = "network is required"))]
    pub network: String,
    pub contract_address: Option<String>,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    #[validate(length(min = 1, message = "at least one option is required"))]
    pub options: Vec<String>,
}

/// Create a vote for the session's organization.
async fn create_vote(
    AuthSession(session): AuthSession,
    State(state): State<AppState>,
    Json(req): Json<CreateVoteRequest>,
) -> AppResult<ApiResponse<VoteView>> {
    req.validate()?;
    let view = state
        .vote_service
        .create_vote(
            &session,
            CreateVoteInput {
                title: req.title,
                description: req.description,
                image_url: req.image_url,
                network: req.network,
                contract_address: req.contract_address,
                start_time: req.start_time,
                end_time: req.end_time,
                options: req.options,
            },
        )
        .await?;
    Ok(ApiResponse::created(view).with_message("Vote created"))
}

/// List all votes.
async fn list_votes(State(state): State<AppState>) -> AppResult<ApiResponse<Vec<VoteView>>> {
    let votes = state.vote_service.list_votes().await?;
    Ok(ApiResponse::ok(votes))
}

/// List active votes available to a wallet.
async fn available_votes(
    State(state): State<AppState>,
    Path(wallet_address): Path<String>,
) -> AppResult<ApiResponse<Vec<VoteView>>> {
    let votes = state.vote_service.available_votes(&wallet_address).await?;
    Ok(ApiResponse::ok(votes))
}

/// Optional wallet context for vote detail reads.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteDetailQuery {
    pub wallet_address: Option<String>,
}

/// Get one vote.
async fn get_vote(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<VoteDetailQuery>,
) -> AppResult<ApiResponse<VoteView>> {
    let view = state
        .vote_service
        .get_vote(&id, query.wallet_address.as_deref())
        .await?;
    Ok(ApiResponse::ok(view))
}

/// Vote submission request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubmitVoteRequest {
    #[validate(length(min = 1, message = "walletAddress is required"))]
    pub wallet_address: String,
    pub option_index: i32,
    #[validate(length(min = 1, message = "signature is required"))]
    pub signature: String,
}

/// Submit a ballot on a vote.
async fn submit_vote(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<SubmitVoteRequest>,
) -> AppResult<ApiResponse<SubmissionReceipt>> {
    req.validate()?;
    let receipt = state
        .vote_service
        .submit_vote(&id, &req.wallet_address, req.option_index, &req.signature)
        .await?;
    Ok(ApiResponse::created(receipt).with_message("Vote submitted"))
}

/// Tally a vote.
async fn vote_results(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<VoteResults>> {
    let results = state.vote_service.vote_results(&id).await?;
    Ok(ApiResponse::ok(results))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_vote).get(list_votes))
        .route("/available/{wallet_address}", get(available_votes))
        .route("/{id}", get(get_vote))
        .route("/{id}/vote", post(submit_vote))
        .route("/{id}/results", get(vote_results))
}
