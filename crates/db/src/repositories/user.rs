//! User repository.

use std::sync::Arc;

use crate::entities::{user, User};
use crate::map_db_err;
use chainvote_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by wallet address. Callers pass the lowercase canonical form.
    pub async fn find_by_wallet(&self, wallet_address: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::WalletAddress.eq(wallet_address))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user by wallet address, returning an error if not found.
    pub async fn get_by_wallet(&self, wallet_address: &str) -> AppResult<user::Model> {
        self.find_by_wallet(wallet_address)
            .await?
            .ok_or_else(|| AppError::UserNotFound(wallet_address.to_string()))
    }

    /// Create a new user.
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model.insert(self.db.as_ref()).await.map_err(map_db_err)
    }

    /// Store a fresh login nonce for a user.
    pub async fn set_login_nonce(&self, id: &str, nonce: &str) -> AppResult<()> {
        let model = user::ActiveModel {
            id: Set(id.to_string()),
            login_nonce: Set(Some(nonce.to_string())),
            ..Default::default()
        };
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Clear a user's login nonce after successful verification.
    pub async fn clear_login_nonce(&self, id: &str) -> AppResult<()> {
        let model = user::ActiveModel {
            id: Set(id.to_string()),
            login_nonce: Set(None),
            ..Default::default()
        };
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Promote a user to admin of the given organization.
    pub async fn set_admin_organization(
        &self,
        id: &str,
        organization_id: &str,
    ) -> AppResult<user::Model> {
        let model = user::ActiveModel {
            id: Set(id.to_string()),
            is_admin: Set(true),
            admin_organization_id: Set(Some(organization_id.to_string())),
            ..Default::default()
        };
        model.update(self.db.as_ref()).await.map_err(map_db_err)
    }
}
