//! Transactions: listing with keyword search, detail, writes and the image
//! side channel.

use std::collections::HashMap;

use sea_orm::{
    ConnectionTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait, prelude::*,
    sea_query::SimpleExpr,
};

use crate::{ResultEngine, Tag, Transaction, tags, transaction_tags, transactions};

use super::access::owned_by;

mod image;
mod list;
mod write;

/// Tags of the links matching `links`, grouped by transaction and ordered
/// by tag id.
async fn tags_by_transaction<C: ConnectionTrait>(
    db: &C,
    links: SimpleExpr,
) -> ResultEngine<HashMap<i32, Vec<Tag>>> {
    let rows = transaction_tags::Entity::find()
        .filter(links)
        .find_also_related(tags::Entity)
        .order_by_asc(transaction_tags::Column::TagId)
        .all(db)
        .await?;

    let mut by_transaction: HashMap<i32, Vec<Tag>> = HashMap::new();
    for (link, tag) in rows {
        if let Some(tag) = tag {
            by_transaction
                .entry(link.transaction_id)
                .or_default()
                .push(tag.into());
        }
    }
    Ok(by_transaction)
}

/// Attach tags to rows owned by `user_id`, keeping the row order.
async fn with_tags<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    models: Vec<transactions::Model>,
) -> ResultEngine<Vec<Transaction>> {
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let owned = owned_by::<transactions::Entity>(user_id)
        .select_only()
        .column(transactions::Column::Id)
        .into_query();
    let mut tags =
        tags_by_transaction(db, transaction_tags::Column::TransactionId.in_subquery(owned)).await?;
    Ok(models
        .into_iter()
        .map(|model| {
            let model_tags = tags.remove(&model.id).unwrap_or_default();
            Transaction::from_model(model, model_tags)
        })
        .collect())
}

async fn with_tags_one<C: ConnectionTrait>(
    db: &C,
    model: transactions::Model,
) -> ResultEngine<Transaction> {
    let mut tags =
        tags_by_transaction(db, transaction_tags::Column::TransactionId.eq(model.id)).await?;
    let model_tags = tags.remove(&model.id).unwrap_or_default();
    Ok(Transaction::from_model(model, model_tags))
}

/// Image references of the transactions matching `condition`.
pub(super) async fn images_of<C: ConnectionTrait>(
    db: &C,
    condition: SimpleExpr,
) -> ResultEngine<Vec<String>> {
    let images: Vec<Option<String>> = transactions::Entity::find()
        .select_only()
        .column(transactions::Column::Image)
        .filter(condition)
        .filter(transactions::Column::Image.is_not_null())
        .into_tuple()
        .all(db)
        .await?;
    Ok(images.into_iter().flatten().collect())
}

/// Delete the transactions matching `condition` and their tag links.
pub(super) async fn delete_where<C: ConnectionTrait>(
    db: &C,
    condition: SimpleExpr,
) -> ResultEngine<u64> {
    let ids: Vec<i32> = transactions::Entity::find()
        .select_only()
        .column(transactions::Column::Id)
        .filter(condition)
        .into_tuple()
        .all(db)
        .await?;
    if ids.is_empty() {
        return Ok(0);
    }

    transaction_tags::Entity::delete_many()
        .filter(transaction_tags::Column::TransactionId.is_in(ids.iter().copied()))
        .exec(db)
        .await?;
    let deleted = transactions::Entity::delete_many()
        .filter(transactions::Column::Id.is_in(ids))
        .exec(db)
        .await?;
    Ok(deleted.rows_affected)
}
