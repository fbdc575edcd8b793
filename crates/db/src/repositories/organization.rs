//! Organization repository.

use std::sync::Arc;

use crate::entities::{organization, Organization};
use crate::map_db_err;
use chainvote_common::{AppError, AppResult};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};

/// Organization repository for database operations.
#[derive(Clone)]
pub struct OrganizationRepository {
    db: Arc<DatabaseConnection>,
}

impl OrganizationRepository {
    /// Create a new organization repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an organization by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<organization::Model>> {
        Organization::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an organization by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<organization::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::OrganizationNotFound(id.to_string()))
    }

    /// Find organizations administered by a wallet address (lowercase canonical).
    pub async fn find_by_admin_address(
        &self,
        admin_address: &str,
    ) -> AppResult<Vec<organization::Model>> {
        Organization::find()
            .filter(organization::Column::AdminAddress.eq(admin_address))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List all organizations, newest first.
    pub async fn find_all(&self) -> AppResult<Vec<organization::Model>> {
        Organization::find()
            .order_by_desc(organization::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new organization.
    pub async fn create(&self, model: organization::ActiveModel) -> AppResult<organization::Model> {
        model.insert(self.db.as_ref()).await.map_err(map_db_err)
    }

    /// Update an organization.
    pub async fn update(&self, model: organization::ActiveModel) -> AppResult<organization::Model> {
        model.update(self.db.as_ref()).await.map_err(map_db_err)
    }

    /// Add credit atomically (single UPDATE query, no fetch).
    pub async fn add_credit(&self, id: &str, amount: f64) -> AppResult<()> {
        Organization::update_many()
            .col_expr(
                organization::Column::CreditBalance,
                Expr::col(organization::Column::CreditBalance).add(amount),
            )
            .filter(organization::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
