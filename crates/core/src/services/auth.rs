//! Authentication service.
//!
//! Wallet-based login: the server hands out a single-use nonce, the wallet
//! signs a challenge containing it, and a successful recovery mints a
//! short-lived HS256 session token.

use chainvote_common::{
    config::AuthConfig, eth, AppError, AppResult, IdGenerator,
};
use chainvote_db::{entities::user, repositories::UserRepository};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::Set;
use serde::{Deserialize, Serialize};

/// Challenge handed to a wallet before login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NonceChallenge {
    pub nonce: String,
    pub message: String,
}

/// Public view of an authenticated user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    pub address: String,
    pub is_admin: bool,
    pub admin_organization_id: Option<String>,
}

/// Result of a successful signature verification.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedLogin {
    pub token: String,
    pub user: AuthUser,
}

/// JWT claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// User ID.
    pub sub: String,
    /// Lowercase canonical wallet address.
    pub address: String,
    pub is_admin: bool,
    pub admin_organization_id: Option<String>,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

/// Verified session attached to authenticated requests.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: String,
    pub address: String,
    pub is_admin: bool,
    pub admin_organization_id: Option<String>,
}

impl From<Claims> for Session {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            address: claims.address,
            is_admin: claims.is_admin,
            admin_organization_id: claims.admin_organization_id,
        }
    }
}

/// Authentication service for business logic.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    auth: AuthConfig,
    id_gen: IdGenerator,
}

impl AuthService {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, auth: AuthConfig) -> Self {
        Self {
            user_repo,
            auth,
            id_gen: IdGenerator::new(),
        }
    }

    /// Issue a login nonce for a wallet address.
    ///
    /// The user row is created on first contact. Re-requesting replaces the
    /// stored nonce, so only the most recent challenge can be answered.
    pub async fn request_nonce(&self, address: &str) -> AppResult<NonceChallenge> {
        let address = eth::normalize_address(address)?;
        let user = self.find_or_create_user(&address).await?;

        let nonce = self.id_gen.generate_nonce();
        self.user_repo.set_login_nonce(&user.id, &nonce).await?;

        let message = format!("Sign this message to login: {nonce}");
        Ok(NonceChallenge { nonce, message })
    }

    /// Verify a signed challenge and mint a session token.
    ///
    /// The nonce is cleared only after every check passes; a failed attempt
    /// leaves it valid for a retry with the same challenge.
    pub async fn verify_signature(
        &self,
        address: &str,
        signature: &str,
        message: &str,
    ) -> AppResult<VerifiedLogin> {
        if address.is_empty() || signature.is_empty() || message.is_empty() {
            return Err(AppError::Validation(
                "address, signature and message are required".to_string(),
            ));
        }

        let address = eth::normalize_address(address)?;
        let recovered = eth::recover_address(message, signature)?;
        if recovered != address {
            return Err(AppError::Unauthorized(
                "signature does not match address".to_string(),
            ));
        }

        let user = self.user_repo.get_by_wallet(&address).await?;

        let valid_nonce = user
            .login_nonce
            .as_deref()
            .is_some_and(|nonce| message.contains(nonce));
        if !valid_nonce {
            return Err(AppError::Unauthorized(
                "invalid or expired login nonce".to_string(),
            ));
        }

        // Single use: consume the nonce before handing out the token.
        self.user_repo.clear_login_nonce(&user.id).await?;

        let token = self.mint_token(&user)?;
        Ok(VerifiedLogin {
            token,
            user: AuthUser {
                id: user.id,
                address: user.wallet_address,
                is_admin: user.is_admin,
                admin_organization_id: user.admin_organization_id,
            },
        })
    }

    /// Mint a session token for a user.
    pub fn mint_token(&self, user: &user::Model) -> AppResult<String> {
        let exp = (Utc::now() + Duration::hours(self.auth.token_ttl_hours)).timestamp();
        let claims = Claims {
            sub: user.id.clone(),
            address: user.wallet_address.clone(),
            is_admin: user.is_admin,
            admin_organization_id: user.admin_organization_id.clone(),
            exp,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.auth.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("failed to sign token: {e}")))
    }

    /// Verify a session token and return the session it carries.
    ///
    /// Missing, malformed, or expired tokens all read as `Unauthorized`.
    pub fn verify_token(&self, token: &str) -> AppResult<Session> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.auth.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map(|data| data.claims.into())
        .map_err(|_| AppError::Unauthorized("invalid or expired token".to_string()))
    }

    async fn find_or_create_user(&self, address: &str) -> AppResult<user::Model> {
        if let Some(user) = self.user_repo.find_by_wallet(address).await? {
            return Ok(user);
        }

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            wallet_address: Set(address.to_string()),
            is_admin: Set(false),
            admin_organization_id: Set(None),
            login_nonce: Set(None),
            created_at: Set(Utc::now().into()),
        };
        self.user_repo.create(model).await
    }
}
