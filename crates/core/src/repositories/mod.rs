//! Typed repositories, one per entity kind.
//!
//! Each repository wraps the shared [`DocumentStore`](crate::store::DocumentStore) handle and
//! owns the mapping between its entity and the stored record: validated payload in, store
//! identity out, and stored records back to text-identity views for the API.

pub mod docs;
pub mod sections;
