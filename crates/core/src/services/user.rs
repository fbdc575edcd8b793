//! User service.

use chainvote_common::{eth, AppResult, IdGenerator};
use chainvote_db::{
    entities::user,
    repositories::{OrganizationRepository, UserRepository, UserTokenRepository},
};
use chrono::Utc;
use sea_orm::Set;
use serde::Serialize;

/// Registration outcome: the user row plus whether it already existed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub user: user::Model,
    pub already_registered: bool,
}

/// An organization a user belongs to, with approval state.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub organization_id: String,
    pub organization_name: String,
    /// `approved` once the membership token is minted, `pending` before.
    pub status: &'static str,
    pub approved_at: Option<chrono::DateTime<chrono::FixedOffset>>,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    user_token_repo: UserTokenRepository,
    org_repo: OrganizationRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        user_token_repo: UserTokenRepository,
        org_repo: OrganizationRepository,
    ) -> Self {
        Self {
            user_repo,
            user_token_repo,
            org_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a wallet address. Idempotent: an existing user is returned
    /// as-is and flagged `already_registered`.
    pub async fn register(&self, wallet_address: &str) -> AppResult<Registration> {
        let address = eth::normalize_address(wallet_address)?;

        if let Some(user) = self.user_repo.find_by_wallet(&address).await? {
            return Ok(Registration {
                user,
                already_registered: true,
            });
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            wallet_address: Set(address),
            is_admin: Set(false),
            admin_organization_id: Set(None),
            login_nonce: Set(None),
            created_at: Set(Utc::now().into()),
        };
        let user = self.user_repo.create(model).await?;

        Ok(Registration {
            user,
            already_registered: false,
        })
    }

    /// Look up a user by wallet address.
    pub async fn get(&self, wallet_address: &str) -> AppResult<user::Model> {
        let address = eth::normalize_address(wallet_address)?;
        self.user_repo.get_by_wallet(&address).await
    }

    /// List the organizations a wallet belongs to, most recently approved
    /// first. An unknown wallet yields an empty list rather than an error.
    pub async fn organizations(&self, wallet_address: &str) -> AppResult<Vec<Membership>> {
        let address = eth::normalize_address(wallet_address)?;
        let Some(user) = self.user_repo.find_by_wallet(&address).await? else {
            return Ok(vec![]);
        };

        let mut tokens = self.user_token_repo.find_by_user(&user.id).await?;
        tokens.sort_by(|a, b| b.approved_at.cmp(&a.approved_at));

        let mut memberships = Vec::with_capacity(tokens.len());
        for token in tokens {
            let Some(org) = self.org_repo.find_by_id(&token.organization_id).await? else {
                continue;
            };
            memberships.push(Membership {
                organization_id: org.id,
                organization_name: org.name,
                status: if token.token_minted {
                    "approved"
                } else {
                    "pending"
                },
                approved_at: token.approved_at,
            });
        }

        Ok(memberships)
    }
}
