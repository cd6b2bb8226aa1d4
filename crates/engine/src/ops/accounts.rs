use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QuerySelect, SqlErr, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    Account, EngineError, ProfileUpdate, RegisterCmd, ResultEngine, ValidationErrors,
    auth_tokens,
    password::{hash_password, verify_password},
    tags, transaction_tags, transactions, users,
    util::{self, ACCOUNT_NAME_MAX_LEN, REQUIRED},
    wallets,
};

use super::{Engine, with_tx};

const EMAIL_TAKEN: &str = "user with this email already exists.";

/// `true` when `err` is a violated unique index, i.e. a concurrent writer
/// inserted the same key first.
fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

impl Engine {
    /// Creates a regular account.
    ///
    /// The email is lower-cased before it is checked for uniqueness and
    /// stored; the password is kept only as a salted hash.
    pub async fn register(&self, cmd: RegisterCmd) -> ResultEngine<Account> {
        self.insert_account(cmd, false).await
    }

    /// Creates an account with the staff and superuser flags set.
    pub async fn create_superuser(&self, cmd: RegisterCmd) -> ResultEngine<Account> {
        self.insert_account(cmd, true).await
    }

    async fn insert_account(&self, cmd: RegisterCmd, superuser: bool) -> ResultEngine<Account> {
        let mut errors = ValidationErrors::new();
        let email = util::email(&mut errors, cmd.email.as_deref());
        let password = util::password(&mut errors, cmd.password.as_deref());
        let name = util::optional_text(&mut errors, "name", cmd.name.as_deref(), ACCOUNT_NAME_MAX_LEN);

        if let Some(email) = email.as_deref()
            && self.find_user_by_email(email).await?.is_some()
        {
            errors.add("email", EMAIL_TAKEN);
        }
        errors.into_result()?;

        let (Some(email), Some(password)) = (email, password) else {
            return Err(EngineError::Validation(ValidationErrors::single(
                "email", REQUIRED,
            )));
        };

        let model = users::ActiveModel {
            email: ActiveValue::Set(email),
            password: ActiveValue::Set(hash_password(&password)?),
            name: ActiveValue::Set(name.unwrap_or_default()),
            is_active: ActiveValue::Set(true),
            is_staff: ActiveValue::Set(superuser),
            is_superuser: ActiveValue::Set(superuser),
            ..Default::default()
        }
        .insert(&self.database)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                EngineError::Validation(ValidationErrors::single("email", EMAIL_TAKEN))
            } else {
                err.into()
            }
        })?;

        tracing::info!(user_id = model.id, superuser, "account created");
        Ok(model.into())
    }

    async fn find_user_by_email(&self, email: &str) -> ResultEngine<Option<users::Model>> {
        users::Entity::find()
            .filter(users::Column::Email.eq(util::normalize_email(email)))
            .one(&self.database)
            .await
            .map_err(Into::into)
    }

    /// Looks an account up by email (case-insensitive).
    pub async fn account_by_email(&self, email: &str) -> ResultEngine<Account> {
        self.find_user_by_email(email)
            .await?
            .map(Account::from)
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))
    }

    /// Checks the credentials and returns the account's bearer token,
    /// creating it on first login.
    ///
    /// Wrong password, unknown email and inactive account all produce the
    /// same [`EngineError::InvalidCredentials`].
    pub async fn authenticate(
        &self,
        email: Option<&str>,
        password: Option<&str>,
    ) -> ResultEngine<String> {
        let mut errors = ValidationErrors::new();
        let email = util::required_text(&mut errors, "email", email, usize::MAX);
        let password = match password {
            None => {
                errors.add("password", REQUIRED);
                None
            }
            Some("") => {
                errors.add("password", util::BLANK);
                None
            }
            Some(password) => Some(password),
        };
        errors.into_result()?;
        let (Some(email), Some(password)) = (email, password) else {
            return Err(EngineError::InvalidCredentials);
        };

        let user = self
            .find_user_by_email(&email)
            .await?
            .filter(|user| user.is_active)
            .filter(|user| verify_password(password, &user.password))
            .ok_or(EngineError::InvalidCredentials)?;

        if let Some(token) = self.token_of(user.id).await? {
            return Ok(token);
        }

        let inserted = auth_tokens::ActiveModel {
            key: ActiveValue::Set(Uuid::new_v4().simple().to_string()),
            user_id: ActiveValue::Set(user.id),
            created_at: ActiveValue::Set(Utc::now()),
        }
        .insert(&self.database)
        .await;

        match inserted {
            Ok(token) => {
                tracing::info!(user_id = user.id, "token issued");
                Ok(token.key)
            }
            // Another login of the same account issued it first.
            Err(err) if is_unique_violation(&err) => self
                .token_of(user.id)
                .await?
                .ok_or(EngineError::Database(err)),
            Err(err) => Err(err.into()),
        }
    }

    async fn token_of(&self, user_id: i32) -> ResultEngine<Option<String>> {
        let token = auth_tokens::Entity::find()
            .filter(auth_tokens::Column::UserId.eq(user_id))
            .one(&self.database)
            .await?;
        Ok(token.map(|token| token.key))
    }

    /// Resolves a bearer token to its active account.
    pub async fn principal(&self, token: &str) -> ResultEngine<Account> {
        let (_, user) = auth_tokens::Entity::find_by_id(token.to_string())
            .find_also_related(users::Entity)
            .one(&self.database)
            .await?
            .ok_or(EngineError::Unauthorized)?;

        user.filter(|user| user.is_active)
            .map(Account::from)
            .ok_or(EngineError::Unauthorized)
    }

    /// Returns the caller's own account.
    pub async fn profile(&self, user_id: i32) -> ResultEngine<Account> {
        users::Entity::find_by_id(user_id)
            .one(&self.database)
            .await?
            .map(Account::from)
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))
    }

    /// Updates name and/or password of the caller's own account.
    pub async fn update_profile(&self, user_id: i32, update: ProfileUpdate) -> ResultEngine<Account> {
        let mut errors = ValidationErrors::new();
        let name = update
            .name
            .as_deref()
            .map(|name| util::optional_text(&mut errors, "name", Some(name), ACCOUNT_NAME_MAX_LEN));
        let password = update
            .password
            .as_deref()
            .map(|password| util::password(&mut errors, Some(password)));
        errors.into_result()?;

        let current = users::Entity::find_by_id(user_id)
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;

        let mut active: users::ActiveModel = current.clone().into();
        if let Some(name) = name {
            active.name = ActiveValue::Set(name.unwrap_or_default());
        }
        if let Some(Some(password)) = password {
            active.password = ActiveValue::Set(hash_password(&password)?);
        }
        if !active.is_changed() {
            return Ok(current.into());
        }
        let model = active.update(&self.database).await?;

        Ok(model.into())
    }

    /// Deletes an account with everything it owns, then releases the images
    /// of the deleted transactions.
    pub async fn delete_account(&self, user_id: i32) -> ResultEngine<()> {
        let images = with_tx!(self, |db_tx| {
            users::Entity::find_by_id(user_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;

            // Transactions of other accounts may sit on this account's
            // wallets or carry its tags.
            let wallet_ids: Vec<i32> = wallets::Entity::find()
                .select_only()
                .column(wallets::Column::Id)
                .filter(wallets::Column::UserId.eq(user_id))
                .into_tuple()
                .all(&db_tx)
                .await?;
            let doomed = transactions::Column::UserId
                .eq(user_id)
                .or(transactions::Column::WalletId.is_in(wallet_ids));
            let images = super::transactions::images_of(&db_tx, doomed.clone()).await?;
            super::transactions::delete_where(&db_tx, doomed).await?;

            let tag_ids: Vec<i32> = tags::Entity::find()
                .select_only()
                .column(tags::Column::Id)
                .filter(tags::Column::UserId.eq(user_id))
                .into_tuple()
                .all(&db_tx)
                .await?;
            transaction_tags::Entity::delete_many()
                .filter(transaction_tags::Column::TagId.is_in(tag_ids))
                .exec(&db_tx)
                .await?;
            tags::Entity::delete_many()
                .filter(tags::Column::UserId.eq(user_id))
                .exec(&db_tx)
                .await?;
            wallets::Entity::delete_many()
                .filter(wallets::Column::UserId.eq(user_id))
                .exec(&db_tx)
                .await?;
            auth_tokens::Entity::delete_many()
                .filter(auth_tokens::Column::UserId.eq(user_id))
                .exec(&db_tx)
                .await?;
            users::Entity::delete_by_id(user_id).exec(&db_tx).await?;
            Ok::<_, EngineError>(images)
        })?;

        for image in &images {
            self.media.release(image).await;
        }
        tracing::info!(user_id, "account deleted");
        Ok(())
    }
}
