use sea_orm::DatabaseConnection;

use crate::{MediaStore, ResultEngine};

mod access;
mod accounts;
mod tags;
mod transactions;
mod wallets;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
///
/// `?` inside the block returns early and drops the transaction, which rolls
/// it back.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    media: MediaStore,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Storage used for uploaded images.
    pub fn media(&self) -> &MediaStore {
        &self.media
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    media: MediaStore,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Directory holding uploaded files. Defaults to `./media`.
    pub fn media_root(mut self, root: impl Into<std::path::PathBuf>) -> EngineBuilder {
        self.media = MediaStore::new(root);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        tracing::debug!("media root: {}", self.media.root().display());
        Ok(Engine {
            database: self.database,
            media: self.media,
        })
    }
}
