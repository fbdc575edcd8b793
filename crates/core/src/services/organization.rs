//! Organization service.

use chainvote_common::{eth, AppError, AppResult, IdGenerator};
use chainvote_db::{
    entities::{organization, user},
    repositories::{OrganizationRepository, UserRepository},
};
use chrono::Utc;
use sea_orm::Set;

/// Input for registering an organization.
#[derive(Debug, Clone)]
pub struct RegisterOrganizationInput {
    pub name: String,
    pub business_number: Option<String>,
    pub admin_address: String,
}

/// Organization service for business logic.
#[derive(Clone)]
pub struct OrganizationService {
    org_repo: OrganizationRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl OrganizationService {
    /// Create a new organization service.
    #[must_use]
    pub const fn new(org_repo: OrganizationRepository, user_repo: UserRepository) -> Self {
        Self {
            org_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register an organization and bind its admin.
    ///
    /// The admin's user row is created on demand; an existing user is
    /// promoted in place.
    pub async fn register(
        &self,
        input: RegisterOrganizationInput,
    ) -> AppResult<organization::Model> {
        if input.name.trim().is_empty() {
            return Err(AppError::Validation(
                "organization name is required".to_string(),
            ));
        }
        let admin_address = eth::normalize_address(&input.admin_address)?;

        let model = organization::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name),
            business_number: Set(input.business_number),
            admin_address: Set(admin_address.clone()),
            credit_balance: Set(0.0),
            created_at: Set(Utc::now().into()),
        };
        let org = self.org_repo.create(model).await?;

        self.bind_admin(&admin_address, &org.id).await?;
        Ok(org)
    }

    /// Replace an organization's admin.
    ///
    /// The previous admin's flags are left untouched; only the new binding
    /// is written.
    pub async fn update_admin(
        &self,
        org_id: &str,
        admin_address: &str,
    ) -> AppResult<organization::Model> {
        let admin_address = eth::normalize_address(admin_address)?;
        let org = self.org_repo.get_by_id(org_id).await?;

        let model = organization::ActiveModel {
            id: Set(org.id.clone()),
            admin_address: Set(admin_address.clone()),
            ..Default::default()
        };
        let updated = self.org_repo.update(model).await?;

        self.bind_admin(&admin_address, &updated.id).await?;
        Ok(updated)
    }

    /// Add credit to an organization's balance.
    ///
    /// The balance moves via a single atomic UPDATE; the returned model is
    /// re-read afterwards.
    pub async fn add_credit(&self, org_id: &str, amount: f64) -> AppResult<organization::Model> {
        if amount.is_nan() || amount <= 0.0 {
            return Err(AppError::Validation(
                "credit amount must be positive".to_string(),
            ));
        }

        // Existence check first so an unknown org reads as 404, not a no-op.
        self.org_repo.get_by_id(org_id).await?;
        self.org_repo.add_credit(org_id, amount).await?;
        self.org_repo.get_by_id(org_id).await
    }

    /// List all organizations.
    pub async fn list(&self) -> AppResult<Vec<organization::Model>> {
        self.org_repo.find_all().await
    }

    /// Get an organization by ID.
    pub async fn get(&self, org_id: &str) -> AppResult<organization::Model> {
        self.org_repo.get_by_id(org_id).await
    }

    /// List the organizations administered by a wallet address.
    pub async fn administered_by(&self, admin_address: &str) -> AppResult<Vec<organization::Model>> {
        let address = eth::normalize_address(admin_address)?;
        self.org_repo.find_by_admin_address(&address).await
    }

    async fn bind_admin(&self, admin_address: &str, org_id: &str) -> AppResult<user::Model> {
        let user = match self.user_repo.find_by_wallet(admin_address).await? {
            Some(user) => user,
            None => {
                let model = user::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    wallet_address: Set(admin_address.to_string()),
                    is_admin: Set(false),
                    admin_organization_id: Set(None),
                    login_nonce: Set(None),
                    created_at: Set(Utc::now().into()),
                };
                self.user_repo.create(model).await?
            }
        };

        self.user_repo
            .set_admin_organization(&user.id, org_id)
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    const ADMIN: &str = "0xaabbccddeeff00112233445566778899aabbccdd";

    fn test_org(id: &str, balance: f64) -> organization::Model {
        organization::Model {
            id: id.to_string(),
            name: "Acme Collective".to_string(),
            business_number: None,
            admin_address: ADMIN.to_string(),
            credit_balance: balance,
            created_at: Utc::now().into(),
        }
    }

    fn test_user(id: &str, is_admin: bool) -> user::Model {
        user::Model {
            id: id.to_string(),
            wallet_address: ADMIN.to_string(),
            is_admin,
            admin_organization_id: is_admin.then(|| "org1".to_string()),
            login_nonce: None,
            created_at: Utc::now().into(),
        }
    }

    fn service(db: sea_orm::DatabaseConnection) -> OrganizationService {
        let db = Arc::new(db);
        OrganizationService::new(
            OrganizationRepository::new(db.clone()),
            UserRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_register_requires_name() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = service(db);

        let result = svc
            .register(RegisterOrganizationInput {
                name: "  ".to_string(),
                business_number: None,
                admin_address: ADMIN.to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_register_creates_org_and_promotes_admin() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_org("org1", 0.0)]]) // insert org
            .append_query_results([[test_user("user1", false)]]) // find admin user
            .append_query_results([[test_user("user1", true)]]) // promote
            .into_connection();
        let svc = service(db);

        let org = svc
            .register(RegisterOrganizationInput {
                name: "Acme Collective".to_string(),
                business_number: None,
                admin_address: ADMIN.to_string(),
            })
            .await
            .unwrap();

        assert_eq!(org.id, "org1");
    }

    #[tokio::test]
    async fn test_add_credit_rejects_non_positive_amount() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let svc = service(db);

        assert!(matches!(
            svc.add_credit("org1", 0.0).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            svc.add_credit("org1", -5.0).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_add_credit_unknown_org_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<organization::Model>::new()])
            .into_connection();
        let svc = service(db);

        assert!(matches!(
            svc.add_credit("missing", 10.0).await,
            Err(AppError::OrganizationNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_add_credit_returns_updated_balance() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_org("org1", 0.0)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([[test_org("org1", 10.0)]])
            .into_connection();
        let svc = service(db);

        let org = svc.add_credit("org1", 10.0).await.unwrap();
        assert!((org.credit_balance - 10.0).abs() < f64::EPSILON);
    }
}
