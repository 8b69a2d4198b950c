//! Document store gateway.
//!
//! [`DocumentStore`] is the one persistence seam of the crate: insert a BSON document into a
//! collection and get back its generated identity, or find documents by equality filter. Typed
//! repositories in [`crate::repositories`] sit on top of it; nothing else talks to the store.
//!
//! The store handle is opened once at startup ([`open_store`]) and shared as
//! `Arc<dyn DocumentStore>`. Conflict resolution for concurrent requests is left entirely to
//! the backend.

mod memory;
mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

use crate::constants::{DOC_COLLECTION, SECTION_COLLECTION};
use crate::{CoreConfig, DocsResult};
use async_trait::async_trait;
use bson::{oid::ObjectId, Document};
use std::fmt;
use std::sync::Arc;

/// The record sets kept in the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Collection {
    Section,
    Doc,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Section => SECTION_COLLECTION,
            Collection::Doc => DOC_COLLECTION,
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub limit: Option<usize>,
}

impl FindOptions {
    pub fn limit(limit: usize) -> Self {
        Self { limit: Some(limit) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store write failed: {0}")]
    Write(String),
    #[error("store read failed: {0}")]
    Read(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Connectivity summary of a store. Building one never fails; problems go in `error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStatus {
    pub backend: &'static str,
    pub database_name: Option<String>,
    pub connected: bool,
    pub collections: Vec<String>,
    pub error: Option<String>,
}

impl StoreStatus {
    pub(crate) fn disconnected(backend: &'static str, database_name: Option<String>) -> Self {
        Self {
            backend,
            database_name,
            connected: false,
            collections: Vec::new(),
            error: None,
        }
    }
}

/// Generic persistence primitives over named collections.
#[async_trait]
pub trait DocumentStore: Send + Sync + fmt::Debug {
    /// Persists `record` and returns its newly generated identity.
    ///
    /// # Errors
    ///
    /// [`StoreError::Unavailable`] when the store cannot be reached, [`StoreError::Write`] on any
    /// other write failure.
    async fn insert(&self, collection: Collection, record: Document) -> StoreResult<ObjectId>;

    /// Returns every record whose top-level fields equal those in `filter`, in store-native
    /// order.
    async fn find(
        &self,
        collection: Collection,
        filter: Document,
        options: FindOptions,
    ) -> StoreResult<Vec<Document>>;

    async fn find_one(
        &self,
        collection: Collection,
        filter: Document,
    ) -> StoreResult<Option<Document>> {
        let found = self.find(collection, filter, FindOptions::limit(1)).await?;
        Ok(found.into_iter().next())
    }

    async fn status(&self) -> StoreStatus;
}

/// Opens the store selected by `cfg`.
///
/// With no database configured the in-memory store is used and nothing survives a restart.
pub async fn open_store(cfg: &CoreConfig) -> DocsResult<Arc<dyn DocumentStore>> {
    match cfg.database() {
        Some(db) => {
            let store = MongoStore::connect(db.url(), db.name()).await?;
            tracing::info!("using MongoDB database '{}'", db.name());
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory store (data is not persisted)");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
