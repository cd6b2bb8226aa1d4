//! Command structs for engine operations.
//!
//! Fields are optional because they mirror what a client sent: a missing
//! field and an invalid one are reported differently, and partial updates
//! only touch what is present.

use chrono::{DateTime, Utc};

/// Create an account.
#[derive(Clone, Debug, Default)]
pub struct RegisterCmd {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

impl RegisterCmd {
    #[must_use]
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            password: Some(password.into()),
            name: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Change the caller's own profile. The email is not editable.
#[derive(Clone, Debug, Default)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Create a wallet.
#[derive(Clone, Debug, Default)]
pub struct WalletCmd {
    pub name: Option<String>,
    pub currency: Option<String>,
    pub balance: Option<i32>,
}

impl WalletCmd {
    #[must_use]
    pub fn new(name: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            currency: Some(currency.into()),
            balance: None,
        }
    }

    #[must_use]
    pub fn balance(mut self, balance: i32) -> Self {
        self.balance = Some(balance);
        self
    }
}

/// Create a tag.
#[derive(Clone, Debug, Default)]
pub struct TagCmd {
    pub name: Option<String>,
}

impl TagCmd {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

/// Create or update a transaction.
///
/// `tags` holds tag ids; `Some(vec![])` clears the set while `None` means the
/// client did not send the field at all.
#[derive(Clone, Debug, Default)]
pub struct TransactionCmd {
    pub flow: Option<String>,
    pub category: Option<String>,
    pub wallet_id: Option<i32>,
    pub tags: Option<Vec<i32>>,
    pub date: Option<DateTime<Utc>>,
    pub note: Option<String>,
    pub amount: Option<i32>,
}

impl TransactionCmd {
    /// A command with every required field set.
    #[must_use]
    pub fn new(
        flow: impl Into<String>,
        category: impl Into<String>,
        wallet_id: i32,
        amount: i32,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            flow: Some(flow.into()),
            category: Some(category.into()),
            wallet_id: Some(wallet_id),
            tags: None,
            date: Some(date),
            note: None,
            amount: Some(amount),
        }
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn tags(mut self, tags: Vec<i32>) -> Self {
        self.tags = Some(tags);
        self
    }
}

/// How an update treats the fields missing from a [`TransactionCmd`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateMode {
    /// Missing fields keep their stored value, tags included.
    Partial,
    /// Missing fields are reset: required ones are rejected, optional ones
    /// are cleared and the tag set is emptied.
    Full,
}
