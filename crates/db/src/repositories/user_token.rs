//! User token repository.

use std::sync::Arc;

use crate::entities::{user_token, UserToken};
use chainvote_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// User token repository for database operations.
#[derive(Clone)]
pub struct UserTokenRepository {
    db: Arc<DatabaseConnection>,
}

impl UserTokenRepository {
    /// Create a new user token repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// List a user's membership rows.
    pub async fn find_by_user(&self, user_id: &str) -> AppResult<Vec<user_token::Model>> {
        UserToken::find()
            .filter(user_token::Column::UserId.eq(user_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_token(id: &str, user_id: &str, org_id: &str, minted: bool) -> user_token::Model {
        user_token::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            organization_id: org_id.to_string(),
            token_minted: minted,
            approved_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_user() {
        let token = create_test_token("tok1", "user1", "org1", true);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[token.clone()]])
                .into_connection(),
        );

        let repo = UserTokenRepository::new(db);
        let result = repo.find_by_user("user1").await.unwrap();

        assert_eq!(result.len(), 1);
        assert!(result[0].token_minted);
    }

    #[tokio::test]
    async fn test_find_by_user_empty() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user_token::Model>::new()])
                .into_connection(),
        );

        let repo = UserTokenRepository::new(db);
        let result = repo.find_by_user("user1").await.unwrap();

        assert!(result.is_empty());
    }
}
