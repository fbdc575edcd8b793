//! Submission repository.

use std::sync::Arc;

use crate::entities::{submission, vote_option, Submission, VoteOption};
use crate::map_db_err;
use chainvote_common::{AppError, AppResult};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, TransactionTrait,
};

/// Submission repository for database operations.
#[derive(Clone)]
pub struct SubmissionRepository {
    db: Arc<DatabaseConnection>,
}

impl SubmissionRepository {
    /// Create a new submission repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Check if a user has already submitted on a vote.
    pub async fn has_submitted(&self, vote_id: &str, user_id: &str) -> AppResult<bool> {
        let count = Submission::find()
            .filter(submission::Column::VoteId.eq(vote_id))
            .filter(submission::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Count submissions recorded on a vote.
    pub async fn count_by_vote(&self, vote_id: &str) -> AppResult<u64> {
        Submission::find()
            .filter(submission::Column::VoteId.eq(vote_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Record a submission and bump the chosen option's tally in one
    /// transaction.
    ///
    /// The unique (vote_id, user_id) index rejects a concurrent duplicate at
    /// the insert; the whole transaction rolls back and no tally moves. The
    /// increment is a single UPDATE, never read-modify-write.
    pub async fn record(
        &self,
        model: submission::ActiveModel,
        vote_id: &str,
        option_index: i32,
    ) -> AppResult<submission::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let created = model.insert(&txn).await.map_err(map_db_err)?;

        let updated = VoteOption::update_many()
            .col_expr(
                vote_option::Column::VotesCount,
                Expr::col(vote_option::Column::VotesCount).add(1),
            )
            .filter(vote_option::Column::VoteId.eq(vote_id))
            .filter(vote_option::Column::OptionIndex.eq(option_index))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        // Dropping the transaction rolls the insert back too.
        if updated.rows_affected == 0 {
            return Err(AppError::Validation(format!(
                "unknown option index {option_index} for vote {vote_id}"
            )));
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(created)
    }
}
