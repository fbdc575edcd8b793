//! Vote service: ballot creation, listings, submission, and tallying.

use chainvote_common::{eth, AppError, AppResult, IdGenerator};
use chainvote_db::{
    entities::{submission, vote, vote_option},
    repositories::{
        OrganizationRepository, SubmissionRepository, UserRepository, VoteOptionRepository,
        VoteRepository,
    },
};
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::Set;
use serde::Serialize;

use super::Session;

/// Input for creating a vote.
#[derive(Debug, Clone)]
pub struct CreateVoteInput {
    pub title: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub network: String,
    pub contract_address: Option<String>,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    pub options: Vec<String>,
}

/// A vote with its options and participation data.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteView {
    #[serde(flatten)]
    pub vote: vote::Model,
    pub organization_name: Option<String>,
    pub options: Vec<vote_option::Model>,
    /// Number of submissions recorded so far.
    pub participated: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_voted: Option<bool>,
    /// Token-gated access is not enforced; every caller passes.
    pub has_access: bool,
}

/// Receipt returned after a recorded submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub tx_hash: String,
}

/// Tally for a single option.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionResult {
    pub option_index: i32,
    pub option_name: String,
    pub votes_count: i32,
    /// `round(count / total * 100)`; 0 when no votes. Per-option rounding
    /// means the column need not sum to exactly 100.
    pub percentage: i32,
}

/// Full tally of a vote.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteResults {
    pub vote_id: String,
    pub title: String,
    pub status: vote::VoteStatus,
    pub total_votes: i64,
    pub results: Vec<OptionResult>,
}

/// Vote service for business logic.
#[derive(Clone)]
pub struct VoteService {
    vote_repo: VoteRepository,
    option_repo: VoteOptionRepository,
    submission_repo: SubmissionRepository,
    user_repo: UserRepository,
    org_repo: OrganizationRepository,
    id_gen: IdGenerator,
}

impl VoteService {
    /// Create a new vote service.
    #[must_use]
    pub const fn new(
        vote_repo: VoteRepository,
        option_repo: VoteOptionRepository,
        submission_repo: SubmissionRepository,
        user_repo: UserRepository,
        org_repo: OrganizationRepository,
    ) -> Self {
        Self {
            vote_repo,
            option_repo,
            submission_repo,
            user_repo,
            org_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a vote with its options.
    ///
    /// The owning organization is always the session's admin organization;
    /// any client-supplied organization id is ignored upstream.
    pub async fn create_vote(
        &self,
        session: &Session,
        input: CreateVoteInput,
    ) -> AppResult<VoteView> {
        let Some(organization_id) = session.admin_organization_id.as_deref() else {
            return Err(AppError::Forbidden(
                "only an organization admin can create votes".to_string(),
            ));
        };

        if input.title.trim().is_empty() {
            return Err(AppError::Validation("title is required".to_string()));
        }
        if input.network.trim().is_empty() {
            return Err(AppError::Validation("network is required".to_string()));
        }
        if input.options.is_empty() {
            return Err(AppError::Validation(
                "at least one option is required".to_string(),
            ));
        }
        if input.options.iter().any(|o| o.trim().is_empty()) {
            return Err(AppError::Validation(
                "option names cannot be empty".to_string(),
            ));
        }
        if input.end_time <= input.start_time {
            return Err(AppError::Validation(
                "end time must be after start time".to_string(),
            ));
        }

        let vote_id = self.id_gen.generate();
        let vote_model = vote::ActiveModel {
            id: Set(vote_id.clone()),
            organization_id: Set(organization_id.to_string()),
            contract_address: Set(input
                .contract_address
                .unwrap_or_else(|| format!("0x{}", "0".repeat(40)))),
            title: Set(input.title),
            description: Set(input.description.unwrap_or_default()),
            image_url: Set(input.image_url.unwrap_or_default()),
            network: Set(input.network),
            start_time: Set(input.start_time),
            end_time: Set(input.end_time),
            status: Set(vote::VoteStatus::Active),
            created_at: Set(Utc::now().into()),
        };

        let option_models = input
            .options
            .iter()
            .enumerate()
            .map(|(index, name)| vote_option::ActiveModel {
                id: Set(self.id_gen.generate()),
                vote_id: Set(vote_id.clone()),
                option_name: Set(name.clone()),
                option_index: Set(index as i32),
                votes_count: Set(0),
            })
            .collect();

        let created = self
            .vote_repo
            .create_with_options(vote_model, option_models)
            .await?;

        self.view_of(created, None).await
    }

    /// List all votes, newest first.
    pub async fn list_votes(&self) -> AppResult<Vec<VoteView>> {
        let votes = self.vote_repo.find_all().await?;
        self.views_of(votes, None).await
    }

    /// List active votes a wallet can participate in.
    ///
    /// `has_voted` is filled in when the wallet resolves to a known user.
    pub async fn available_votes(&self, wallet_address: &str) -> AppResult<Vec<VoteView>> {
        let address = eth::normalize_address(wallet_address)?;
        let user = self.user_repo.find_by_wallet(&address).await?;

        let votes = self.vote_repo.find_by_status(vote::VoteStatus::Active).await?;
        self.views_of(votes, user.map(|u| u.id)).await
    }

    /// Get one vote with options and participation data.
    pub async fn get_vote(
        &self,
        vote_id: &str,
        wallet_address: Option<&str>,
    ) -> AppResult<VoteView> {
        let vote = self.vote_repo.get_by_id(vote_id).await?;

        let user_id = match wallet_address {
            Some(address) => {
                let address = eth::normalize_address(address)?;
                self.user_repo.find_by_wallet(&address).await?.map(|u| u.id)
            }
            None => None,
        };

        self.view_of(vote, user_id).await
    }

    /// List an organization's votes with options and participation data.
    pub async fn organization_votes(&self, organization_id: &str) -> AppResult<Vec<VoteView>> {
        self.org_repo.get_by_id(organization_id).await?;
        let votes = self.vote_repo.find_by_organization(organization_id).await?;
        self.views_of(votes, None).await
    }

    /// Record a wallet's submission on a vote.
    ///
    /// The duplicate check here is a fast path; the storage unique index on
    /// (vote_id, user_id) is what actually guarantees one ballot per user,
    /// and its violation surfaces as the same `Conflict`.
    pub async fn submit_vote(
        &self,
        vote_id: &str,
        wallet_address: &str,
        option_index: i32,
        signature: &str,
    ) -> AppResult<SubmissionReceipt> {
        if wallet_address.is_empty() || signature.is_empty() || option_index < 0 {
            return Err(AppError::Validation(
                "walletAddress, optionIndex and signature are required".to_string(),
            ));
        }

        let address = eth::normalize_address(wallet_address)?;
        let user = self.user_repo.get_by_wallet(&address).await?;
        let vote = self.vote_repo.get_by_id(vote_id).await?;

        if self.submission_repo.has_submitted(&vote.id, &user.id).await? {
            return Err(AppError::Conflict(
                "already voted on this vote".to_string(),
            ));
        }

        let tx_hash = self.id_gen.generate_tx_hash();
        let model = submission::ActiveModel {
            id: Set(self.id_gen.generate()),
            vote_id: Set(vote.id.clone()),
            user_id: Set(user.id),
            option_index: Set(option_index),
            tx_hash: Set(tx_hash.clone()),
            status: Set("confirmed".to_string()),
            created_at: Set(Utc::now().into()),
        };

        self.submission_repo
            .record(model, &vote.id, option_index)
            .await?;

        Ok(SubmissionReceipt { tx_hash })
    }

    /// Tally a vote.
    pub async fn vote_results(&self, vote_id: &str) -> AppResult<VoteResults> {
        let vote = self.vote_repo.get_by_id(vote_id).await?;
        let options = self.option_repo.find_by_vote(&vote.id).await?;

        let total_votes: i64 = options.iter().map(|o| i64::from(o.votes_count)).sum();
        let results = options
            .into_iter()
            .map(|o| OptionResult {
                option_index: o.option_index,
                option_name: o.option_name,
                percentage: percentage(o.votes_count, total_votes),
                votes_count: o.votes_count,
            })
            .collect();

        Ok(VoteResults {
            vote_id: vote.id,
            title: vote.title,
            status: vote.status,
            total_votes,
            results,
        })
    }

    async fn views_of(
        &self,
        votes: Vec<vote::Model>,
        user_id: Option<String>,
    ) -> AppResult<Vec<VoteView>> {
        let mut views = Vec::with_capacity(votes.len());
        for vote in votes {
            views.push(self.view_of(vote, user_id.clone()).await?);
        }
        Ok(views)
    }

    async fn view_of(&self, vote: vote::Model, user_id: Option<String>) -> AppResult<VoteView> {
        let organization_name = self
            .org_repo
            .find_by_id(&vote.organization_id)
            .await?
            .map(|o| o.name);
        let options = self.option_repo.find_by_vote(&vote.id).await?;
        let participated = self.submission_repo.count_by_vote(&vote.id).await?;

        let has_voted = match user_id {
            Some(uid) => Some(self.submission_repo.has_submitted(&vote.id, &uid).await?),
            None => None,
        };

        Ok(VoteView {
            vote,
            organization_name,
            options,
            participated,
            has_voted,
            has_access: true,
        })
    }
}

/// Rounded share of `count` in `total`, as a whole percentage.
/// Round-half-up for the non-negative inputs seen here; 0 when `total` is 0.
fn percentage(count: i32, total: i64) -> i32 {
    if total == 0 {
        return 0;
    }
    ((f64::from(count) / total as f64) * 100.0).round() as i32
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    const WALLET: &str = "0xaabbccddeeff00112233445566778899aabbccdd";

    fn test_session(admin_org: Option<&str>) -> Session {
        Session {
            user_id: "user1".to_string(),
            address: WALLET.to_string(),
            is_admin: admin_org.is_some(),
            admin_organization_id: admin_org.map(ToString::to_string),
        }
    }

    fn test_vote(id: &str) -> vote::Model {
        vote::Model {
            id: id.to_string(),
            organization_id: "org1".to_string(),
            contract_address: format!("0x{}", "0".repeat(40)),
            title: "Board election".to_string(),
            description: String::new(),
            image_url: String::new(),
            network: "sepolia".to_string(),
            start_time: Utc::now().into(),
            end_time: Utc::now().into(),
            status: vote::VoteStatus::Active,
            created_at: Utc::now().into(),
        }
    }

    fn test_option(id: &str, index: i32, count: i32) -> vote_option::Model {
        vote_option::Model {
            id: id.to_string(),
            vote_id: "vote1".to_string(),
            option_name: format!("Option {index}"),
            option_index: index,
            votes_count: count,
        }
    }

    fn test_user(id: &str) -> chainvote_db::entities::user::Model {
        chainvote_db::entities::user::Model {
            id: id.to_string(),
            wallet_address: WALLET.to_string(),
            is_admin: false,
            admin_organization_id: None,
            login_nonce: None,
            created_at: Utc::now().into(),
        }
    }

    fn test_submission(id: &str) -> submission::Model {
        submission::Model {
            id: id.to_string(),
            vote_id: "vote1".to_string(),
            user_id: "user1".to_string(),
            option_index: 1,
            tx_hash: format!("0x{}", "ab".repeat(32)),
            status: "confirmed".to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn service(db: sea_orm::DatabaseConnection) -> VoteService {
        let db = Arc::new(db);
        VoteService::new(
            VoteRepository::new(db.clone()),
            VoteOptionRepository::new(db.clone()),
            SubmissionRepository::new(db.clone()),
            UserRepository::new(db.clone()),
            OrganizationRepository::new(db),
        )
    }

    #[test]
    fn test_percentage_rounding() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(1, 1), 100);
        assert_eq!(percentage(1, 2), 50);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        // Round-half-up: 1/8 = 12.5 -> 13.
        assert_eq!(percentage(1, 8), 13);
    }

    #[tokio::test]
    async fn test_create_vote_requires_admin_org() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = service(db);

        let input = CreateVoteInput {
            title: "Board election".to_string(),
            description: None,
            image_url: None,
            network: "sepolia".to_string(),
            contract_address: None,
            start_time: Utc::now().into(),
            end_time: (Utc::now() + chrono::Duration::days(1)).into(),
            options: vec!["A".to_string(), "B".to_string()],
        };

        let result = svc.create_vote(&test_session(None), input).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_create_vote_rejects_empty_options() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = service(db);

        let input = CreateVoteInput {
            title: "Board election".to_string(),
            description: None,
            image_url: None,
            network: "sepolia".to_string(),
            contract_address: None,
            start_time: Utc::now().into(),
            end_time: (Utc::now() + chrono::Duration::days(1)).into(),
            options: vec![],
        };

        let result = svc.create_vote(&test_session(Some("org1")), input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_submit_vote_unknown_user() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<chainvote_db::entities::user::Model>::new()])
            .into_connection();
        let svc = service(db);

        let result = svc.submit_vote("vote1", WALLET, 0, "0xsig").await;
        assert!(matches!(result, Err(AppError::UserNotFound(_))));
    }

    #[tokio::test]
    async fn test_submit_vote_duplicate_is_conflict() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_user("user1")]])
            .append_query_results([[test_vote("vote1")]])
            .append_query_results([[maplit::btreemap! {
                "num_items" => sea_orm::Value::BigInt(Some(1))
            }]])
            .into_connection();
        let svc = service(db);

        let result = svc.submit_vote("vote1", WALLET, 0, "0xsig").await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_submit_vote_returns_tx_hash() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_user("user1")]])
            .append_query_results([[test_vote("vote1")]])
            .append_query_results([[maplit::btreemap! {
                "num_items" => sea_orm::Value::BigInt(Some(0))
            }]])
            .append_query_results([[test_submission("sub1")]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let svc = service(db);

        let receipt = svc.submit_vote("vote1", WALLET, 1, "0xsig").await.unwrap();
        assert!(receipt.tx_hash.starts_with("0x"));
        assert_eq!(receipt.tx_hash.len(), 66);
    }

    #[tokio::test]
    async fn test_submit_vote_missing_signature() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = service(db);

        let result = svc.submit_vote("vote1", WALLET, 0, "").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_vote_results_two_options_one_vote() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_vote("vote1")]])
            .append_query_results([vec![test_option("opt1", 0, 0), test_option("opt2", 1, 1)]])
            .into_connection();
        let svc = service(db);

        let results = svc.vote_results("vote1").await.unwrap();
        assert_eq!(results.total_votes, 1);
        assert_eq!(results.results[0].percentage, 0);
        assert_eq!(results.results[1].percentage, 100);
    }

    #[tokio::test]
    async fn test_vote_results_even_split() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_vote("vote1")]])
            .append_query_results([vec![test_option("opt1", 0, 1), test_option("opt2", 1, 1)]])
            .into_connection();
        let svc = service(db);

        let results = svc.vote_results("vote1").await.unwrap();
        assert_eq!(results.total_votes, 2);
        assert_eq!(results.results[0].percentage, 50);
        assert_eq!(results.results[1].percentage, 50);
    }

    #[tokio::test]
    async fn test_vote_results_empty_vote() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_vote("vote1")]])
            .append_query_results([vec![test_option("opt1", 0, 0), test_option("opt2", 1, 0)]])
            .into_connection();
        let svc = service(db);

        let results = svc.vote_results("vote1").await.unwrap();
        assert_eq!(results.total_votes, 0);
        assert!(results.results.iter().all(|r| r.percentage == 0));
    }
}
