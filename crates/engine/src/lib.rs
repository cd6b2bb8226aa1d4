//! Spendings engine.
//!
//! The engine owns the persistent model (accounts, wallets, tags and
//! transactions) and every operation on it. Each read or write is scoped to
//! the requesting account: callers pass the principal id and the engine never
//! returns or mutates rows owned by somebody else.

pub use commands::{ProfileUpdate, RegisterCmd, TagCmd, TransactionCmd, UpdateMode, WalletCmd};
pub use error::{EngineError, ValidationErrors};
pub use media::MediaStore;
pub use ops::{Engine, EngineBuilder};
pub use tags::Tag;
pub use transactions::Transaction;
pub use users::Account;
pub use wallets::Wallet;

mod auth_tokens;
mod commands;
mod error;
mod media;
mod ops;
mod password;
mod tags;
mod transaction_tags;
mod transactions;
mod users;
mod util;
mod wallets;

type ResultEngine<T> = Result<T, EngineError>;
