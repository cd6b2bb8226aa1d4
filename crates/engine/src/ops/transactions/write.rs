use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, ConnectionTrait, QueryFilter, QuerySelect, TransactionTrait, prelude::*,
};

use crate::{
    EngineError, ResultEngine, Transaction, TransactionCmd, UpdateMode, ValidationErrors, tags,
    transaction_tags, transactions,
    util::{self, CATEGORY_MAX_LEN, FLOW_MAX_LEN, NOTE_MAX_LEN, REQUIRED},
    wallets,
};

use super::super::{Engine, access::require_owned, with_tx};
use super::with_tags_one;

fn does_not_exist(id: i32) -> String {
    format!("Invalid pk \"{id}\" - object does not exist.")
}

/// Field values after validation, ready to be written.
///
/// `tags` is `None` when the stored tag set must stay untouched.
struct Fields {
    flow: String,
    category: String,
    wallet_id: Option<i32>,
    date: DateTime<Utc>,
    note: Option<String>,
    amount: i32,
    tags: Option<Vec<i32>>,
}

/// Validate `cmd`. Fields missing from it fall back to `base` when one is
/// given (partial update) and are required otherwise.
async fn resolve<C: ConnectionTrait>(
    db: &C,
    cmd: TransactionCmd,
    base: Option<&transactions::Model>,
) -> ResultEngine<Fields> {
    let mut errors = ValidationErrors::new();

    let flow = match (cmd.flow.as_deref(), base) {
        (None, Some(base)) => Some(base.flow.clone()),
        (value, _) => util::required_text(&mut errors, "flow", value, FLOW_MAX_LEN),
    };
    let category = match (cmd.category.as_deref(), base) {
        (None, Some(base)) => Some(base.category.clone()),
        (value, _) => util::required_text(&mut errors, "category", value, CATEGORY_MAX_LEN),
    };
    let date = cmd.date.or(base.map(|base| base.date));
    if date.is_none() {
        errors.add("date", REQUIRED);
    }
    let amount = cmd.amount.or(base.map(|base| base.amount));
    if amount.is_none() {
        errors.add("amount", REQUIRED);
    }
    let note = match cmd.note.as_deref() {
        Some(note) => util::optional_text(&mut errors, "note", Some(note), NOTE_MAX_LEN),
        None => base.and_then(|base| base.note.clone()),
    };

    let wallet_id = match (cmd.wallet_id, base) {
        (Some(wallet_id), _) => {
            let exists = wallets::Entity::find_by_id(wallet_id)
                .one(db)
                .await?
                .is_some();
            if !exists {
                errors.add("wallet", does_not_exist(wallet_id));
            }
            Some(wallet_id)
        }
        (None, Some(base)) => base.wallet_id,
        (None, None) => {
            errors.add("wallet", REQUIRED);
            None
        }
    };

    let tags = match cmd.tags {
        Some(ids) => {
            let ids: Vec<i32> = ids.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
            if !ids.is_empty() {
                let found: BTreeSet<i32> = tags::Entity::find()
                    .select_only()
                    .column(tags::Column::Id)
                    .filter(tags::Column::Id.is_in(ids.iter().copied()))
                    .into_tuple::<i32>()
                    .all(db)
                    .await?
                    .into_iter()
                    .collect();
                for id in ids.iter().filter(|id| !found.contains(id)) {
                    errors.add("tags", does_not_exist(*id));
                }
            }
            Some(ids)
        }
        None if base.is_some() => None,
        None => Some(Vec::new()),
    };

    errors.into_result()?;
    let (Some(flow), Some(category), Some(date), Some(amount)) = (flow, category, date, amount)
    else {
        return Err(EngineError::Validation(ValidationErrors::single(
            "flow", REQUIRED,
        )));
    };

    Ok(Fields {
        flow,
        category,
        wallet_id,
        date,
        note,
        amount,
        tags,
    })
}

/// Replace the tag links of `transaction_id` with `tag_ids`.
async fn replace_tags<C: ConnectionTrait>(
    db: &C,
    transaction_id: i32,
    tag_ids: &[i32],
) -> ResultEngine<()> {
    transaction_tags::Entity::delete_many()
        .filter(transaction_tags::Column::TransactionId.eq(transaction_id))
        .exec(db)
        .await?;
    if tag_ids.is_empty() {
        return Ok(());
    }

    let links = tag_ids.iter().map(|tag_id| transaction_tags::ActiveModel {
        transaction_id: ActiveValue::Set(transaction_id),
        tag_id: ActiveValue::Set(*tag_id),
    });
    transaction_tags::Entity::insert_many(links)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

impl Engine {
    /// Records a transaction owned by `user_id`.
    ///
    /// The wallet and the tags only have to exist; they may belong to another
    /// account.
    pub async fn create_transaction(
        &self,
        user_id: i32,
        cmd: TransactionCmd,
    ) -> ResultEngine<Transaction> {
        let transaction = with_tx!(self, |db_tx| {
            let fields = resolve(&db_tx, cmd, None).await?;
            let model = transactions::ActiveModel {
                user_id: ActiveValue::Set(Some(user_id)),
                wallet_id: ActiveValue::Set(fields.wallet_id),
                flow: ActiveValue::Set(fields.flow),
                category: ActiveValue::Set(fields.category),
                date: ActiveValue::Set(fields.date),
                note: ActiveValue::Set(fields.note),
                amount: ActiveValue::Set(fields.amount),
                image: ActiveValue::Set(None),
                ..Default::default()
            }
            .insert(&db_tx)
            .await?;
            replace_tags(&db_tx, model.id, fields.tags.as_deref().unwrap_or_default()).await?;
            with_tags_one(&db_tx, model).await
        })?;

        tracing::debug!(user_id, transaction_id = transaction.id, "transaction created");
        Ok(transaction)
    }

    /// Updates a transaction of `user_id`.
    ///
    /// With [`UpdateMode::Partial`] only the fields present in `cmd` change.
    /// With [`UpdateMode::Full`] the command must be complete; a missing note
    /// is cleared and missing tags empty the tag set. The image is never
    /// touched here.
    pub async fn update_transaction(
        &self,
        user_id: i32,
        transaction_id: i32,
        cmd: TransactionCmd,
        mode: UpdateMode,
    ) -> ResultEngine<Transaction> {
        let transaction = with_tx!(self, |db_tx| {
            let current =
                require_owned::<transactions::Entity, _>(&db_tx, user_id, transaction_id).await?;
            let base = match mode {
                UpdateMode::Partial => Some(&current),
                UpdateMode::Full => None,
            };
            let fields = resolve(&db_tx, cmd, base).await?;

            let mut active: transactions::ActiveModel = current.clone().into();
            active.wallet_id = ActiveValue::Set(fields.wallet_id);
            active.flow = ActiveValue::Set(fields.flow);
            active.category = ActiveValue::Set(fields.category);
            active.date = ActiveValue::Set(fields.date);
            active.note = ActiveValue::Set(fields.note);
            active.amount = ActiveValue::Set(fields.amount);
            let model = active.update(&db_tx).await?;

            if let Some(tag_ids) = fields.tags.as_deref() {
                replace_tags(&db_tx, transaction_id, tag_ids).await?;
            }
            with_tags_one(&db_tx, model).await
        })?;

        tracing::debug!(user_id, transaction_id, ?mode, "transaction updated");
        Ok(transaction)
    }

    /// Deletes a transaction of `user_id` and releases its image.
    pub async fn delete_transaction(&self, user_id: i32, transaction_id: i32) -> ResultEngine<()> {
        let image = with_tx!(self, |db_tx| {
            let current =
                require_owned::<transactions::Entity, _>(&db_tx, user_id, transaction_id).await?;
            super::delete_where(&db_tx, transactions::Column::Id.eq(transaction_id)).await?;
            Ok::<_, EngineError>(current.image)
        })?;

        if let Some(image) = image {
            self.media.release(&image).await;
        }
        tracing::debug!(user_id, transaction_id, "transaction deleted");
        Ok(())
    }
}
