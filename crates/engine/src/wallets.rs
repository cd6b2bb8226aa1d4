//! The module contains `Wallet` struct and its implementation.

use core::fmt;

use sea_orm::entity::prelude::*;

/// A wallet.
///
/// A wallet is a representation of a real wallet, a bank account or anything
/// else where money are kept. The balance is a plain integer in the wallet
/// currency and is not derived from the transactions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wallet {
    pub id: i32,
    /// Owning account, `None` for orphaned rows.
    pub user_id: Option<i32>,
    pub name: String,
    pub balance: i32,
    pub currency: String,
}

impl fmt::Display for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<Model> for Wallet {
    fn from(value: Model) -> Self {
        Self {
            id: value.id,
            user_id: value.user_id,
            name: value.name,
            balance: value.balance,
            currency: value.currency,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "wallets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: Option<i32>,
    pub name: String,
    pub balance: i32,
    pub currency: String,
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
    #[sea_orm(has_many = "super::transactions::Entity")]
    Transactions,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
