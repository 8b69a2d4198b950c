//! Section records.
//!
//! Stored layout (collection `section`):
//!
//! ```text
//! { _id: ObjectId, title: string, description: string | null, order: int | null }
//! ```

use crate::error::DocsResult;
use crate::store::{Collection, DocumentStore, FindOptions, StoreError};
use crate::validation::NewSection;
use api_shared::Section;
use bson::{doc, oid::ObjectId, Document};
use docsos_identity::RecordId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Serialize)]
struct SectionRecord<'a> {
    title: &'a str,
    description: Option<&'a str>,
    order: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct StoredSection {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    order: Option<i64>,
}

impl From<StoredSection> for Section {
    fn from(stored: StoredSection) -> Self {
        Section {
            id: RecordId::from(stored.id).to_string(),
            title: stored.title,
            description: stored.description,
            order: stored.order,
        }
    }
}

/// Create and list documentation sections.
#[derive(Clone, Debug)]
pub struct SectionRepository {
    store: Arc<dyn DocumentStore>,
}

impl SectionRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Validates a raw payload and stores it as a new section.
    ///
    /// Titles are not unique; two sections may share one.
    ///
    /// # Errors
    ///
    /// - [`DocsError::Validation`](crate::DocsError::Validation) if the payload violates the
    ///   section schema (nothing is written)
    /// - [`DocsError::Store`](crate::DocsError::Store) if the insert fails
    pub async fn create(&self, payload: &Value) -> DocsResult<RecordId> {
        let section = NewSection::validate(payload)?;
        self.insert(&section).await
    }

    /// Stores an already validated section.
    pub async fn insert(&self, section: &NewSection) -> DocsResult<RecordId> {
        let record = bson::to_document(&SectionRecord {
            title: section.title.as_str(),
            description: section.description.as_deref(),
            order: section.order,
        })
        .map_err(|e| StoreError::Write(e.to_string()))?;

        let id = self.store.insert(Collection::Section, record).await?;
        tracing::debug!("created section {}", id);
        Ok(RecordId::from(id))
    }

    /// Lists every section, ascending by `order` with an absent order counted as 0.
    ///
    /// Ties keep the order the store returned them in; callers should not rely on it.
    ///
    /// # Errors
    ///
    /// [`DocsError::Store`](crate::DocsError::Store) if the query fails or a stored record does
    /// not decode as a section.
    pub async fn list(&self) -> DocsResult<Vec<Section>> {
        let records = self
            .store
            .find(Collection::Section, doc! {}, FindOptions::default())
            .await?;

        let mut sections = records
            .into_iter()
            .map(|record| decode_section(record).map(Section::from))
            .collect::<Result<Vec<Section>, StoreError>>()?;
        sections.sort_by_key(|s| s.order.unwrap_or(0));

        Ok(sections)
    }

    /// True if a section with this identity exists.
    pub async fn exists(&self, id: &RecordId) -> DocsResult<bool> {
        let found = self
            .store
            .find_one(Collection::Section, doc! {"_id": id.object_id()})
            .await?;
        Ok(found.is_some())
    }
}

fn decode_section(record: Document) -> Result<StoredSection, StoreError> {
    let id = record.get("_id").cloned();
    bson::from_document::<StoredSection>(record).map_err(|e| {
        tracing::error!("undecodable section record {:?}: {}", id, e);
        StoreError::Read(format!("malformed section record: {}", e))
    })
}
