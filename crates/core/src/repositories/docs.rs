//! Doc records.
//!
//! Stored layout (collection `doc`):
//!
//! ```text
//! { _id: ObjectId, section_id: ObjectId, title: string, content: string,
//!   tags: [string] | null, cover_image: string | null }
//! ```
//!
//! `section_id` is stored in identity form, not as text, so that filtering by section is an
//! exact identity match. The section must exist when the doc is created; nothing keeps the
//! reference valid afterwards.

use crate::config::SectionFilterPolicy;
use crate::constants::SECTION_NOT_FOUND;
use crate::error::{DocsError, DocsResult};
use crate::repositories::sections::SectionRepository;
use crate::store::{Collection, DocumentStore, FindOptions, StoreError};
use crate::validation::NewDoc;
use api_shared::Doc;
use bson::{doc, oid::ObjectId, Document};
use docsos_identity::RecordId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Serialize)]
struct DocRecord<'a> {
    section_id: ObjectId,
    title: &'a str,
    content: &'a str,
    tags: Option<&'a [String]>,
    cover_image: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct StoredDoc {
    #[serde(rename = "_id")]
    id: ObjectId,
    section_id: ObjectId,
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    cover_image: Option<String>,
}

impl From<StoredDoc> for Doc {
    fn from(stored: StoredDoc) -> Self {
        Doc {
            id: RecordId::from(stored.id).to_string(),
            section_id: RecordId::from(stored.section_id).to_string(),
            title: stored.title,
            content: stored.content,
            tags: stored.tags,
            cover_image: stored.cover_image,
        }
    }
}

/// Create and list docs nested under sections.
#[derive(Clone, Debug)]
pub struct DocRepository {
    store: Arc<dyn DocumentStore>,
    sections: SectionRepository,
    filter_policy: SectionFilterPolicy,
}

impl DocRepository {
    pub fn new(store: Arc<dyn DocumentStore>, filter_policy: SectionFilterPolicy) -> Self {
        Self {
            sections: SectionRepository::new(store.clone()),
            store,
            filter_policy,
        }
    }

    /// Validates a raw payload, checks its parent section and stores it as a new doc.
    ///
    /// # Errors
    ///
    /// - [`DocsError::Validation`] if the payload violates the doc schema
    /// - [`DocsError::Reference`] ("Section not found") if `section_id` is not a well-formed
    ///   identity or no such section exists
    /// - [`DocsError::Store`] if the lookup or insert fails
    ///
    /// Nothing is written unless every check passes.
    pub async fn create(&self, payload: &Value) -> DocsResult<RecordId> {
        let doc = NewDoc::validate(payload)?;
        self.insert(&doc).await
    }

    /// Stores an already validated doc after resolving its section reference.
    pub async fn insert(&self, doc: &NewDoc) -> DocsResult<RecordId> {
        let section_id = RecordId::parse(&doc.section_id)
            .map_err(|_| DocsError::Reference(SECTION_NOT_FOUND.into()))?;

        if !self.sections.exists(&section_id).await? {
            return Err(DocsError::Reference(SECTION_NOT_FOUND.into()));
        }

        let record = bson::to_document(&DocRecord {
            section_id: section_id.object_id(),
            title: &doc.title,
            content: &doc.content,
            tags: doc.tags.as_deref(),
            cover_image: doc.cover_image.as_deref(),
        })
        .map_err(|e| StoreError::Write(e.to_string()))?;

        let id = self.store.insert(Collection::Doc, record).await?;
        tracing::debug!("created doc {} in section {}", id, section_id);
        Ok(RecordId::from(id))
    }

    /// Lists docs, optionally restricted to one section.
    ///
    /// An empty filter counts as no filter. A filter that is not a well-formed identity is
    /// handled per [`SectionFilterPolicy`]: `Ignore` logs a warning and returns every doc,
    /// `Reject` fails with [`DocsError::InvalidFilter`].
    pub async fn list(&self, section_id: Option<&str>) -> DocsResult<Vec<Doc>> {
        let filter = self.section_filter(section_id)?;

        let records = self
            .store
            .find(Collection::Doc, filter, FindOptions::default())
            .await?;

        let docs = records
            .into_iter()
            .map(|record| decode_doc(record).map(Doc::from))
            .collect::<Result<Vec<Doc>, StoreError>>()?;
        Ok(docs)
    }

    fn section_filter(&self, section_id: Option<&str>) -> DocsResult<Document> {
        let Some(raw) = section_id.filter(|s| !s.is_empty()) else {
            return Ok(doc! {});
        };

        match RecordId::parse(raw) {
            Ok(id) => Ok(doc! {"section_id": id.object_id()}),
            Err(e) => match self.filter_policy {
                SectionFilterPolicy::Ignore => {
                    tracing::warn!("ignoring malformed section_id filter '{}'", raw);
                    Ok(doc! {})
                }
                SectionFilterPolicy::Reject => Err(DocsError::InvalidFilter(e.to_string())),
            },
        }
    }
}

fn decode_doc(record: Document) -> Result<StoredDoc, StoreError> {
    let id = record.get("_id").cloned();
    bson::from_document::<StoredDoc>(record).map_err(|e| {
        tracing::error!("undecodable doc record {:?}: {}", id, e);
        StoreError::Read(format!("malformed doc record: {}", e))
    })
}
