//! Document Store
//!
//! Every aggregate persists through [`DocumentStore`], an object-safe seam
//! over BSON documents. [`MongoStore`] is the production backend;
//! [`MemoryStore`] backs tests and `memory://` dev deployments.
//!
//! The contract: exact-match filters, one descending
//! sort key, a result limit, `$set`, `$inc`, and one atomic
//! insert-plus-increment used by the foundation ledger. Writes that
//! would repeat a value of a unique key (see [`indexes`]) fail with
//! [`PlatformError::Duplicate`](crate::PlatformError::Duplicate).

use async_trait::async_trait;
use bson::{Bson, Document};

use crate::shared::error::Result;

pub mod indexes;
pub mod memory;
pub mod mongo;
pub mod repository;

pub use indexes::initialize_indexes;
pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use repository::{Record, Repository};

/// Sort/limit options for [`DocumentStore::find`]
#[derive(Debug, Clone, Default)]
pub struct FindOptions {
    /// Field to sort by, descending
    pub sort_desc: Option<String>,
    pub limit: Option<i64>,
}

impl FindOptions {
    pub fn limit(limit: i64) -> Self {
        Self { sort_desc: None, limit: Some(limit) }
    }

    /// `created_at` descending, bounded
    pub fn newest_first(limit: i64) -> Self {
        Self {
            sort_desc: Some("created_at".to_string()),
            limit: Some(limit),
        }
    }
}

/// Target of an atomic `$inc`
#[derive(Debug, Clone)]
pub struct Increment {
    pub collection: String,
    pub filter: Document,
    pub field: String,
    pub delta: i64,
}

impl Increment {
    pub fn new(collection: impl Into<String>, filter: Document, field: impl Into<String>, delta: i64) -> Self {
        Self {
            collection: collection.into(),
            filter,
            field: field.into(),
            delta,
        }
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert_one(&self, collection: &str, doc: Document) -> Result<()>;

    async fn find(&self, collection: &str, filter: Document, options: FindOptions) -> Result<Vec<Document>>;

    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>>;

    /// Full-document replace. Returns whether a document matched.
    async fn replace_one(&self, collection: &str, filter: Document, doc: Document) -> Result<bool>;

    /// `$set` merge. Returns whether a document matched.
    async fn set_fields(&self, collection: &str, filter: Document, fields: Document) -> Result<bool>;

    /// Atomic `$inc` on an integer field. Returns whether a document matched.
    async fn increment(&self, target: Increment) -> Result<bool>;

    /// Insert `doc` and apply `target` as one atomic unit.
    ///
    /// When `target.filter` matches nothing, nothing is written and
    /// `false` is returned.
    async fn insert_and_increment(&self, collection: &str, doc: Document, target: Increment) -> Result<bool>;

    async fn delete_one(&self, collection: &str, filter: Document) -> Result<bool>;

    async fn count(&self, collection: &str, filter: Document) -> Result<u64>;

    /// Readiness probe
    async fn ping(&self) -> Result<()>;

    /// Release connections. Called once after the HTTP server drains.
    async fn shutdown(&self);
}

/// Equality filter builder with optional tenant scoping.
#[derive(Debug, Clone, Default)]
pub struct Filter(Document);

impl Filter {
    pub fn new() -> Self {
        Self(Document::new())
    }

    /// Filter by `_id`
    pub fn id(id: &str) -> Self {
        Self::new().eq("_id", id)
    }

    pub fn eq(mut self, field: &str, value: impl Into<Bson>) -> Self {
        self.0.insert(field, value.into());
        self
    }

    /// Adds the clause only when a value is present.
    pub fn eq_opt<V: Into<Bson>>(self, field: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.eq(field, v),
            None => self,
        }
    }

    /// Scope to a brand; `None` leaves the query cross-tenant.
    pub fn brand(self, brand_id: Option<&str>) -> Self {
        self.eq_opt("brand_id", brand_id)
    }

    pub fn into_document(self) -> Document {
        self.0
    }
}

impl From<Filter> for Document {
    fn from(filter: Filter) -> Self {
        filter.0
    }
}
