//! In-process document store.
//!
//! Collections are vectors of BSON documents behind one `RwLock`. Every
//! write takes the write lock for its whole duration, which is what makes
//! `increment` and `insert_and_increment` atomic here, and what makes the
//! unique-key checks race free.

use async_trait::async_trait;
use bson::{Bson, Document};
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::HashMap;

use super::indexes::unique_fields;
use super::{DocumentStore, FindOptions, Increment};
use crate::shared::error::{PlatformError, Result};

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches(doc: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, expected)| doc.get(key).is_some_and(|actual| bson_eq(actual, expected)))
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

fn bson_eq(a: &Bson, b: &Bson) -> bool {
    match (as_f64(a), as_f64(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn bson_cmp(a: &Bson, b: &Bson) -> Ordering {
    if let (Some(x), Some(y)) = (as_f64(a), as_f64(b)) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }
    match (a, b) {
        (Bson::DateTime(x), Bson::DateTime(y)) => x.cmp(y),
        (Bson::String(x), Bson::String(y)) => x.cmp(y),
        (Bson::Boolean(x), Bson::Boolean(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// Descending by `field`; documents missing it sort last.
fn sort_desc(docs: &mut [Document], field: &str) {
    docs.sort_by(|a, b| match (a.get(field), b.get(field)) {
        (Some(x), Some(y)) => bson_cmp(y, x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

fn apply_increment(doc: &mut Document, field: &str, delta: i64) -> Result<()> {
    let current = match doc.get(field) {
        None | Some(Bson::Null) => 0,
        Some(Bson::Int32(v)) => i64::from(*v),
        Some(Bson::Int64(v)) => *v,
        Some(other) => {
            return Err(PlatformError::internal(format!(
                "Cannot increment non-integer field {} ({:?})",
                field,
                other.element_type()
            )))
        }
    };
    let next = current
        .checked_add(delta)
        .ok_or_else(|| PlatformError::internal(format!("Increment overflow on {}", field)))?;
    doc.insert(field, Bson::Int64(next));
    Ok(())
}

fn display(value: &Bson) -> String {
    value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string())
}

/// Reject `candidate` if another document (any but the one at `skip`)
/// already holds its `_id` or one of the collection's unique values.
fn check_unique(docs: &[Document], candidate: &Document, collection: &str, skip: Option<usize>) -> Result<()> {
    let others = || {
        docs.iter()
            .enumerate()
            .filter(move |(i, _)| Some(*i) != skip)
            .map(|(_, d)| d)
    };
    for field in std::iter::once("_id").chain(unique_fields(collection)) {
        let Some(value) = candidate.get(field) else {
            continue;
        };
        if others().any(|d| d.get(field).is_some_and(|v| bson_eq(v, value))) {
            return Err(PlatformError::duplicate(collection, field, display(value)));
        }
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_one(&self, collection: &str, doc: Document) -> Result<()> {
        let mut collections = self.collections.write();
        let docs = collections.entry(collection.to_string()).or_default();
        check_unique(docs, &doc, collection, None)?;
        docs.push(doc);
        Ok(())
    }

    async fn find(&self, collection: &str, filter: Document, options: FindOptions) -> Result<Vec<Document>> {
        let collections = self.collections.read();
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut found: Vec<Document> = docs.iter().filter(|d| matches(d, &filter)).cloned().collect();
        if let Some(field) = options.sort_desc.as_deref() {
            // latest insert first among equal keys
            found.reverse();
            sort_desc(&mut found, field);
        }
        if let Some(limit) = options.limit.filter(|l| *l > 0) {
            found.truncate(limit as usize);
        }
        Ok(found)
    }

    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| matches(d, &filter)).cloned()))
    }

    async fn replace_one(&self, collection: &str, filter: Document, mut doc: Document) -> Result<bool> {
        let mut collections = self.collections.write();
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let Some(position) = docs.iter().position(|d| matches(d, &filter)) else {
            return Ok(false);
        };

        if let Some(id) = docs[position].get("_id").cloned() {
            doc.insert("_id", id);
        }
        check_unique(docs, &doc, collection, Some(position))?;
        docs[position] = doc;
        Ok(true)
    }

    async fn set_fields(&self, collection: &str, filter: Document, fields: Document) -> Result<bool> {
        let mut collections = self.collections.write();
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let Some(position) = docs.iter().position(|d| matches(d, &filter)) else {
            return Ok(false);
        };

        let mut merged = docs[position].clone();
        for (key, value) in fields {
            merged.insert(key, value);
        }
        check_unique(docs, &merged, collection, Some(position))?;
        docs[position] = merged;
        Ok(true)
    }

    async fn increment(&self, target: Increment) -> Result<bool> {
        let mut collections = self.collections.write();
        let Some(doc) = collections
            .get_mut(&target.collection)
            .and_then(|docs| docs.iter_mut().find(|d| matches(d, &target.filter)))
        else {
            return Ok(false);
        };

        apply_increment(doc, &target.field, target.delta)?;
        Ok(true)
    }

    async fn insert_and_increment(&self, collection: &str, doc: Document, target: Increment) -> Result<bool> {
        let mut collections = self.collections.write();

        // Validate both halves before mutating either.
        let Some(position) = collections
            .get(&target.collection)
            .and_then(|docs| docs.iter().position(|d| matches(d, &target.filter)))
        else {
            return Ok(false);
        };
        if let Some(docs) = collections.get(collection) {
            check_unique(docs, &doc, collection, None)?;
        }

        let targets = collections
            .get_mut(&target.collection)
            .ok_or_else(|| PlatformError::internal("increment target vanished"))?;
        apply_increment(&mut targets[position], &target.field, target.delta)?;

        collections.entry(collection.to_string()).or_default().push(doc);
        Ok(true)
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> Result<bool> {
        let mut collections = self.collections.write();
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };
        match docs.iter().position(|d| matches(d, &filter)) {
            Some(index) => {
                docs.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn count(&self, collection: &str, filter: Document) -> Result<u64> {
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| matches(d, &filter)).count() as u64)
            .unwrap_or(0))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn shutdown(&self) {
        tracing::debug!("Memory store shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_find_filters_sorts_and_limits() {
        let store = MemoryStore::new();
        for (id, brand, n) in [("a", "b1", 1), ("b", "b2", 3), ("c", "b1", 2)] {
            store
                .insert_one("items", doc! { "_id": id, "brand_id": brand, "n": n })
                .await
                .unwrap();
        }

        let b1 = store
            .find("items", doc! { "brand_id": "b1" }, FindOptions::default())
            .await
            .unwrap();
        assert_eq!(b1.len(), 2);

        let options = FindOptions { sort_desc: Some("n".into()), limit: Some(2) };
        let top = store.find("items", doc! {}, options).await.unwrap();
        let ids: Vec<_> = top.iter().map(|d| d.get_str("_id").unwrap()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let store = MemoryStore::new();
        store.insert_one("items", doc! { "_id": "x" }).await.unwrap();
        assert!(store.insert_one("items", doc! { "_id": "x" }).await.is_err());
    }

    #[tokio::test]
    async fn test_unique_keys_enforced_on_every_write() {
        let store = MemoryStore::new();
        store
            .insert_one("members", doc! { "_id": "m1", "email": "ruth@example.org" })
            .await
            .unwrap();
        store
            .insert_one("members", doc! { "_id": "m2", "email": "naomi@example.org" })
            .await
            .unwrap();

        let err = store
            .insert_one("members", doc! { "_id": "m3", "email": "ruth@example.org" })
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::Duplicate { ref field, .. } if field == "email"));

        let err = store
            .set_fields("members", doc! { "_id": "m2" }, doc! { "email": "ruth@example.org" })
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::Duplicate { .. }));

        // Rewriting a document with its own value is not a conflict
        assert!(store
            .replace_one("members", doc! { "_id": "m1" }, doc! { "email": "ruth@example.org", "name": "Ruth" })
            .await
            .unwrap());

        // Collections without unique keys accept repeats
        store.insert_one("sermons", doc! { "_id": "s1", "email": "x" }).await.unwrap();
        store.insert_one("sermons", doc! { "_id": "s2", "email": "x" }).await.unwrap();
        assert_eq!(store.count("members", doc! { "email": "ruth@example.org" }).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_numeric_equality_across_widths() {
        let store = MemoryStore::new();
        store.insert_one("items", doc! { "_id": "x", "n": 5_i64 }).await.unwrap();
        let found = store.find_one("items", doc! { "n": 5_i32 }).await.unwrap();
        assert!(found.is_some());
    }

    #[tokio::test]
    async fn test_set_and_replace_report_matches() {
        let store = MemoryStore::new();
        store.insert_one("items", doc! { "_id": "x", "status": "new" }).await.unwrap();

        assert!(store
            .set_fields("items", doc! { "_id": "x" }, doc! { "status": "praying" })
            .await
            .unwrap());
        assert!(!store
            .set_fields("items", doc! { "_id": "missing" }, doc! { "status": "praying" })
            .await
            .unwrap());

        assert!(store
            .replace_one("items", doc! { "_id": "x" }, doc! { "_id": "x", "title": "new" })
            .await
            .unwrap());
        let doc = store.find_one("items", doc! { "_id": "x" }).await.unwrap().unwrap();
        assert!(doc.get("status").is_none());
        assert_eq!(doc.get_str("title").unwrap(), "new");
    }

    #[tokio::test]
    async fn test_insert_and_increment_without_target_writes_nothing() {
        let store = MemoryStore::new();
        let applied = store
            .insert_and_increment(
                "log",
                doc! { "_id": "d1" },
                Increment::new("totals", doc! { "_id": "missing" }, "sum", 5),
            )
            .await
            .unwrap();

        assert!(!applied);
        assert_eq!(store.count("log", doc! {}).await.unwrap(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments() {
        let store = Arc::new(MemoryStore::new());
        store.insert_one("totals", doc! { "_id": "t", "sum": 0_i64 }).await.unwrap();

        let tasks: Vec<_> = (0..50)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move {
                    store
                        .increment(Increment::new("totals", doc! { "_id": "t" }, "sum", i))
                        .await
                })
            })
            .collect();
        for task in tasks {
            assert!(task.await.unwrap().unwrap());
        }

        let doc = store.find_one("totals", doc! { "_id": "t" }).await.unwrap().unwrap();
        assert_eq!(doc.get_i64("sum").unwrap(), (0..50).sum::<i64>());
    }
}
