//! Owner scoping.
//!
//! Every resource with an owner implements [`OwnedEntity`]; listing goes
//! through [`owned_by`] and single-row access through [`require_owned`], so
//! the same predicate guards wallets, tags and transactions. A row owned by
//! somebody else is reported exactly like a missing row.

use sea_orm::{ConnectionTrait, QueryFilter, Select, prelude::*};

use crate::{EngineError, ResultEngine, tags, transactions, wallets};

pub(super) trait OwnedEntity: EntityTrait {
    /// Column holding the owning account id.
    fn owner_column() -> Self::Column;

    /// Label used in not-found errors.
    fn label() -> &'static str;
}

impl OwnedEntity for wallets::Entity {
    fn owner_column() -> Self::Column {
        wallets::Column::UserId
    }

    fn label() -> &'static str {
        "wallet"
    }
}

impl OwnedEntity for tags::Entity {
    fn owner_column() -> Self::Column {
        tags::Column::UserId
    }

    fn label() -> &'static str {
        "tag"
    }
}

impl OwnedEntity for transactions::Entity {
    fn owner_column() -> Self::Column {
        transactions::Column::UserId
    }

    fn label() -> &'static str {
        "transaction"
    }
}

/// All rows of `E` owned by `user_id`.
pub(super) fn owned_by<E: OwnedEntity>(user_id: i32) -> Select<E> {
    E::find().filter(E::owner_column().eq(user_id))
}

/// The row `id` of `E`, if `user_id` owns it.
pub(super) async fn require_owned<E, C>(db: &C, user_id: i32, id: i32) -> ResultEngine<E::Model>
where
    E: OwnedEntity,
    E::PrimaryKey: PrimaryKeyTrait<ValueType = i32>,
    C: ConnectionTrait,
{
    E::find_by_id(id)
        .filter(E::owner_column().eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("{} not exists", E::label())))
}
