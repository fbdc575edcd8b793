//! User entity: one row per known wallet address.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Wallet address, stored in lowercase canonical form.
    #[sea_orm(unique)]
    pub wallet_address: String,

    /// Global admin flag (may register organizations and reassign admins).
    pub is_admin: bool,

    /// Organization this user administers, if any.
    #[sea_orm(nullable)]
    pub admin_organization_id: Option<String>,

    /// Pending login challenge. Set on nonce request, cleared exactly once
    /// on successful signature verification; a consumed nonce can never be
    /// replayed.
    #[sea_orm(nullable)]
    #[serde(skip_serializing)]
    pub login_nonce: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::organization::Entity",
        from = "Column::AdminOrganizationId",
        to = "super::organization::Column::Id"
    )]
    Organization,

    #[sea_orm(has_many = "super::submission::Entity")]
    Submission,
}

impl Related<super::organization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organization.def()
    }
}

impl Related<super::submission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
