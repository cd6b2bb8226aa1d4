use sea_orm::QueryOrder;

use crate::{ResultEngine, Transaction, transactions, util::Keyword};

use super::super::{
    Engine,
    access::{owned_by, require_owned},
};
use super::{with_tags, with_tags_one};

impl Transaction {
    fn mentions(&self, keyword: &Keyword) -> bool {
        keyword.found_in(&self.category)
            || self.note.as_deref().is_some_and(|note| keyword.found_in(note))
            || self.tags.iter().any(|tag| keyword.found_in(&tag.name))
    }
}

impl Engine {
    /// Lists the transactions owned by `user_id`, newest first.
    ///
    /// With a non-blank `keyword`, only transactions whose category, note or
    /// any tag name contains it (case-insensitively) are returned.
    pub async fn list_transactions(
        &self,
        user_id: i32,
        keyword: Option<&str>,
    ) -> ResultEngine<Vec<Transaction>> {
        let models = owned_by::<transactions::Entity>(user_id)
            .order_by_desc(transactions::Column::Date)
            .order_by_desc(transactions::Column::Id)
            .all(&self.database)
            .await?;
        let mut found = with_tags(&self.database, user_id, models).await?;

        // SQLite's LOWER() only folds ASCII, so matching happens here.
        if let Some(keyword) = keyword.and_then(Keyword::new) {
            found.retain(|transaction| transaction.mentions(&keyword));
        }
        Ok(found)
    }

    /// Returns one transaction of `user_id` with its tags.
    ///
    /// Missing and foreign transactions both fail with `KeyNotFound`.
    pub async fn transaction(&self, user_id: i32, transaction_id: i32) -> ResultEngine<Transaction> {
        let model =
            require_owned::<transactions::Entity, _>(&self.database, user_id, transaction_id)
                .await?;
        with_tags_one(&self.database, model).await
    }
}
