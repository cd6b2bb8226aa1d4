use sea_orm::{ActiveValue, DbErr, prelude::*};

use crate::{EngineError, ResultEngine, Transaction, media::validate_image, transactions};

use super::super::{Engine, access::require_owned};
use super::with_tags_one;

impl Engine {
    /// Attaches an uploaded image to a transaction of `user_id`, replacing
    /// the previous one.
    ///
    /// Ownership is checked before the upload is decoded, so a foreign
    /// transaction is reported as missing whatever the payload. The old file
    /// is released only once the row points at the new one.
    pub async fn upload_transaction_image(
        &self,
        user_id: i32,
        transaction_id: i32,
        bytes: Vec<u8>,
    ) -> ResultEngine<Transaction> {
        let current =
            require_owned::<transactions::Entity, _>(&self.database, user_id, transaction_id)
                .await?;
        let image = validate_image(bytes).await?;
        let reference = self.media.store_transaction_image(&image).await?;

        let previous = current.image.clone();
        let mut active: transactions::ActiveModel = current.into();
        active.image = ActiveValue::Set(Some(reference.clone()));
        let model = match active.update(&self.database).await {
            Ok(model) => model,
            Err(err) => {
                self.media.release(&reference).await;
                return Err(match err {
                    DbErr::RecordNotUpdated => {
                        EngineError::KeyNotFound("transaction not exists".to_string())
                    }
                    other => other.into(),
                });
            }
        };

        if let Some(previous) = previous {
            self.media.release(&previous).await;
        }
        tracing::debug!(
            user_id,
            transaction_id,
            extension = image.extension(),
            "transaction image replaced"
        );
        with_tags_one(&self.database, model).await
    }
}
