use sea_orm::{ActiveValue, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    EngineError, ResultEngine, ValidationErrors, Wallet, WalletCmd, transactions,
    util::{self, CURRENCY_MAX_LEN, WALLET_NAME_MAX_LEN},
    wallets,
};

use super::{Engine, access::owned_by, with_tx};

impl Engine {
    /// Lists the wallets owned by `user_id`, richest first.
    pub async fn list_wallets(&self, user_id: i32) -> ResultEngine<Vec<Wallet>> {
        let wallets = owned_by::<wallets::Entity>(user_id)
            .order_by_desc(wallets::Column::Balance)
            .order_by_asc(wallets::Column::Id)
            .all(&self.database)
            .await?;
        Ok(wallets.into_iter().map(Wallet::from).collect())
    }

    /// Adds a wallet owned by `user_id`. The owner is never taken from the
    /// command.
    pub async fn create_wallet(&self, user_id: i32, cmd: WalletCmd) -> ResultEngine<Wallet> {
        let mut errors = ValidationErrors::new();
        let name = util::required_text(&mut errors, "name", cmd.name.as_deref(), WALLET_NAME_MAX_LEN);
        let currency = util::required_text(
            &mut errors,
            "currency",
            cmd.currency.as_deref(),
            CURRENCY_MAX_LEN,
        );
        errors.into_result()?;
        let (Some(name), Some(currency)) = (name, currency) else {
            return Err(EngineError::Validation(ValidationErrors::single(
                "name",
                util::REQUIRED,
            )));
        };

        let model = wallets::ActiveModel {
            user_id: ActiveValue::Set(Some(user_id)),
            name: ActiveValue::Set(name),
            balance: ActiveValue::Set(cmd.balance.unwrap_or(0)),
            currency: ActiveValue::Set(currency),
            ..Default::default()
        }
        .insert(&self.database)
        .await?;

        tracing::debug!(user_id, wallet_id = model.id, "wallet created");
        Ok(model.into())
    }

    /// Deletes a wallet together with its transactions and releases their
    /// images.
    ///
    /// This is an operator action: it is not scoped to a principal.
    pub async fn delete_wallet(&self, wallet_id: i32) -> ResultEngine<()> {
        let images = with_tx!(self, |db_tx| {
            wallets::Entity::find_by_id(wallet_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("wallet not exists".to_string()))?;

            let on_wallet = transactions::Column::WalletId.eq(wallet_id);
            let images = super::transactions::images_of(&db_tx, on_wallet.clone()).await?;
            super::transactions::delete_where(&db_tx, on_wallet).await?;
            wallets::Entity::delete_by_id(wallet_id).exec(&db_tx).await?;
            Ok::<_, EngineError>(images)
        })?;

        for image in &images {
            self.media.release(image).await;
        }
        tracing::info!(wallet_id, "wallet deleted");
        Ok(())
    }
}
