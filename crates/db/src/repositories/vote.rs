//! Vote and vote option repositories.

use std::sync::Arc;

use crate::entities::{vote, vote_option, Vote, VoteOption};
use crate::map_db_err;
use chainvote_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};

/// Vote repository for database operations.
#[derive(Clone)]
pub struct VoteRepository {
    db: Arc<DatabaseConnection>,
}

impl VoteRepository {
    /// Create a new vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a vote by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<vote::Model>> {
        Vote::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a vote by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<vote::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::VoteNotFound(id.to_string()))
    }

    /// List all votes, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<vote::Model>> {
        Vote::find()
            .order_by_desc(vote::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List votes owned by an organization, newest first.
    pub async fn find_by_organization(&self, organization_id: &str) -> AppResult<Vec<vote::Model>> {
        Vote::find()
            .filter(vote::Column::OrganizationId.eq(organization_id))
            .order_by_desc(vote::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List votes with the given status, newest first.
    pub async fn find_by_status(&self, status: vote::VoteStatus) -> AppResult<Vec<vote::Model>> {
        Vote::find()
            .filter(vote::Column::Status.eq(status))
            .order_by_desc(vote::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a vote together with its options in one transaction.
    ///
    /// Either the vote and every option land, or nothing does.
    pub async fn create_with_options(
        &self,
        vote_model: vote::ActiveModel,
        option_models: Vec<vote_option::ActiveModel>,
    ) -> AppResult<vote::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let created = vote_model.insert(&txn).await.map_err(map_db_err)?;

        for option in option_models {
            option.insert(&txn).await.map_err(map_db_err)?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(created)
    }
}

/// Vote option repository for database operations.
#[derive(Clone)]
pub struct VoteOptionRepository {
    db: Arc<DatabaseConnection>,
}

impl VoteOptionRepository {
    /// Create a new vote option repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// List options of a vote in option-index order.
    pub async fn find_by_vote(&self, vote_id: &str) -> AppResult<Vec<vote_option::Model>> {
        VoteOption::find()
            .filter(vote_option::Column::VoteId.eq(vote_id))
            .order_by_asc(vote_option::Column::OptionIndex)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_vote(id: &str, organization_id: &str) -> vote::Model {
        vote::Model {
            id: id.to_string(),
            organization_id: organization_id.to_string(),
            contract_address: "0x1111111111111111111111111111111111111111".to_string(),
            title: "Board election".to_string(),
            description: "Annual board election".to_string(),
            image_url: "https://example.com/banner.png".to_string(),
            network: "sepolia".to_string(),
            start_time: Utc::now().into(),
            end_time: Utc::now().into(),
            status: vote::VoteStatus::Active,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_option(id: &str, vote_id: &str, index: i32) -> vote_option::Model {
        vote_option::Model {
            id: id.to_string(),
            vote_id: vote_id.to_string(),
            option_name: format!("Option {index}"),
            option_index: index,
            votes_count: 0,
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found_returns_error() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<vote::Model>::new()])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::VoteNotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_organization() {
        let vote = create_test_vote("vote1", "org1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[vote.clone()]])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let result = repo.find_by_organization("org1").await.unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "vote1");
    }

    #[tokio::test]
    async fn test_create_with_options_commits_all_rows() {
        let vote = create_test_vote("vote1", "org1");
        let opt_a = create_test_option("opt1", "vote1", 0);
        let opt_b = create_test_option("opt2", "vote1", 1);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[vote.clone()]])
                .append_query_results([[opt_a.clone()]])
                .append_query_results([[opt_b.clone()]])
                .into_connection(),
        );

        let vote_model = vote::ActiveModel {
            id: sea_orm::Set(vote.id.clone()),
            organization_id: sea_orm::Set(vote.organization_id.clone()),
            contract_address: sea_orm::Set(vote.contract_address.clone()),
            title: sea_orm::Set(vote.title.clone()),
            description: sea_orm::Set(vote.description.clone()),
            image_url: sea_orm::Set(vote.image_url.clone()),
            network: sea_orm::Set(vote.network.clone()),
            start_time: sea_orm::Set(vote.start_time),
            end_time: sea_orm::Set(vote.end_time),
            status: sea_orm::Set(vote.status),
            created_at: sea_orm::Set(vote.created_at),
        };
        let option_model = |o: &vote_option::Model| vote_option::ActiveModel {
            id: sea_orm::Set(o.id.clone()),
            vote_id: sea_orm::Set(o.vote_id.clone()),
            option_name: sea_orm::Set(o.option_name.clone()),
            option_index: sea_orm::Set(o.option_index),
            votes_count: sea_orm::Set(o.votes_count),
        };

        let repo = VoteRepository::new(db);
        let created = repo
            .create_with_options(vote_model, vec![option_model(&opt_a), option_model(&opt_b)])
            .await
            .unwrap();

        assert_eq!(created.id, "vote1");
    }

    #[tokio::test]
    async fn test_options_ordered_by_index() {
        let opts = vec![
            create_test_option("opt1", "vote1", 0),
            create_test_option("opt2", "vote1", 1),
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([opts.clone()])
                .into_connection(),
        );

        let repo = VoteOptionRepository::new(db);
        let result = repo.find_by_vote("vote1").await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].option_index, 0);
        assert_eq!(result[1].option_index, 1);
    }
}
