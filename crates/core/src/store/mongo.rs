//! MongoDB-backed document store.

use super::{Collection, DocumentStore, FindOptions, StoreError, StoreResult, StoreStatus};
use crate::constants::{APP_NAME, STATUS_MAX_COLLECTIONS};
use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::options::{ClientOptions, FindOptions as MongoFindOptions};
use mongodb::{Client, Database};

/// Long-lived handle to one MongoDB database.
///
/// The driver pools connections internally, so a single handle is cloned into every request and
/// never torn down explicitly.
#[derive(Clone, Debug)]
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    /// Builds a client for `url` and selects `database_name`.
    ///
    /// The driver connects lazily; an unreachable server surfaces as
    /// [`StoreError::Unavailable`] on the first operation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the URL cannot be parsed or the client cannot be
    /// built.
    pub async fn connect(url: &str, database_name: &str) -> StoreResult<Self> {
        let mut options = ClientOptions::parse(url)
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        options.app_name = Some(APP_NAME.to_string());

        let client =
            Client::with_options(options).map_err(|e| StoreError::Unavailable(e.to_string()))?;

        Ok(Self {
            database: client.database(database_name),
        })
    }

    fn collection(&self, collection: Collection) -> mongodb::Collection<Document> {
        self.database.collection::<Document>(collection.name())
    }
}

/// Connectivity failures are `Unavailable`; everything else goes through `otherwise`.
fn classify(err: MongoError, otherwise: fn(String) -> StoreError) -> StoreError {
    match err.kind.as_ref() {
        ErrorKind::ServerSelection { .. }
        | ErrorKind::Io(_)
        | ErrorKind::DnsResolve { .. }
        | ErrorKind::ConnectionPoolCleared { .. } => StoreError::Unavailable(err.to_string()),
        _ => otherwise(err.to_string()),
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert(&self, collection: Collection, record: Document) -> StoreResult<ObjectId> {
        let result = self
            .collection(collection)
            .insert_one(record, None)
            .await
            .map_err(|e| classify(e, StoreError::Write))?;

        result.inserted_id.as_object_id().ok_or_else(|| {
            StoreError::Write(format!(
                "store returned a non-ObjectId identity: {}",
                result.inserted_id
            ))
        })
    }

    async fn find(
        &self,
        collection: Collection,
        filter: Document,
        options: FindOptions,
    ) -> StoreResult<Vec<Document>> {
        let mut find_options = MongoFindOptions::default();
        find_options.limit = options.limit.and_then(|l| i64::try_from(l).ok());

        let cursor = self
            .collection(collection)
            .find(filter, find_options)
            .await
            .map_err(|e| classify(e, StoreError::Read))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| classify(e, StoreError::Read))
    }

    async fn status(&self) -> StoreStatus {
        let mut status =
            StoreStatus::disconnected("mongodb", Some(self.database.name().to_string()));

        if let Err(e) = self.database.run_command(doc! {"ping": 1}, None).await {
            status.error = Some(e.to_string());
            return status;
        }

        match self.database.list_collection_names(None).await {
            Ok(mut names) => {
                names.sort();
                names.truncate(STATUS_MAX_COLLECTIONS);
                status.connected = true;
                status.collections = names;
            }
            Err(e) => status.error = Some(e.to_string()),
        }

        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_database_url() -> Option<String> {
        std::env::var("DOCSOS_TEST_DATABASE_URL").ok()
    }

    #[tokio::test]
    async fn test_connect_rejects_malformed_url() {
        let result = MongoStore::connect("not a mongodb url", "docsos").await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }

    #[tokio::test]
    #[ignore = "requires a running MongoDB (set DOCSOS_TEST_DATABASE_URL)"]
    async fn test_insert_and_find_against_live_database() {
        let Some(url) = test_database_url() else {
            return;
        };
        let database_name = format!("docsos_test_{}", ObjectId::new().to_hex());
        let store = MongoStore::connect(&url, &database_name).await.unwrap();

        let id = store
            .insert(Collection::Section, doc! {"title": "Intro"})
            .await
            .unwrap();
        let found = store
            .find_one(Collection::Section, doc! {"_id": id})
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.get_str("title").unwrap(), "Intro");

        let status = store.status().await;
        assert!(status.connected);
        assert!(status.collections.contains(&"section".to_string()));

        store.database.drop(None).await.unwrap();
    }
}
