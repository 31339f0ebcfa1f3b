//! Account entity for database

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub username: String,
    /// Upper-cased username, unique
    #[sea_orm(unique)]
    pub normalized_username: String,
    pub email: String,
    /// Upper-cased e-mail, unique
    #[sea_orm(unique)]
    pub normalized_email: String,
    pub password_hash: String,
    pub email_confirmed: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone_number: Option<String>,
    pub access_failed_count: i32,
    pub lockout_end: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::confirmation_code::Entity")]
    ConfirmationCodes,
}

impl Related<super::confirmation_code::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ConfirmationCodes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
