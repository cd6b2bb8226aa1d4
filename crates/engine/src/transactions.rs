//! Transaction primitives.
//!
//! A `Transaction` is a dated monetary movement recorded against one wallet.
//! `flow` is free text (usually `income` or `expenses`); the stored amount is
//! not applied to the wallet balance.

use core::fmt;

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

use crate::Tag;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub id: i32,
    pub user_id: Option<i32>,
    pub wallet_id: Option<i32>,
    pub flow: String,
    pub category: String,
    pub date: DateTime<Utc>,
    pub note: Option<String>,
    pub amount: i32,
    /// Storage path of the attached image, relative to the media root.
    pub image: Option<String>,
    /// Attached tags, ordered by id.
    pub tags: Vec<Tag>,
}

impl Transaction {
    pub(crate) fn from_model(model: Model, tags: Vec<Tag>) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            wallet_id: model.wallet_id,
            flow: model.flow,
            category: model.category,
            date: model.date,
            note: model.note,
            amount: model.amount,
            image: model.image,
            tags,
        }
    }

    pub fn tag_ids(&self) -> Vec<i32> {
        self.tags.iter().map(|tag| tag.id).collect()
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.category)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: Option<i32>,
    pub wallet_id: Option<i32>,
    pub flow: String,
    pub category: String,
    pub date: DateTimeUtc,
    #[sea_orm(column_type = "Text", nullable)]
    pub note: Option<String>,
    pub amount: i32,
    pub image: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Users,
    #[sea_orm(
        belongs_to = "super::wallets::Entity",
        from = "Column::WalletId",
        to = "super::wallets::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Wallets,
    #[sea_orm(has_many = "super::transaction_tags::Entity")]
    TransactionTags,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::wallets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Wallets.def()
    }
}

impl Related<super::transaction_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionTags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
