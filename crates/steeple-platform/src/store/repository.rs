//! Typed repository over the document store.

use bson::Document;
use serde::{de::DeserializeOwned, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;

use super::{DocumentStore, Filter, FindOptions};
use crate::shared::error::Result;

/// An entity persisted in its own collection.
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    fn collection_name() -> &'static str;
    fn id(&self) -> &str;
}

/// Implement [`Record`] for an entity with a `String` `id` field.
///
/// ```rust,ignore
/// impl_record!(Ministry, "ministries");
/// ```
#[macro_export]
macro_rules! impl_record {
    ($entity:ty, $collection:literal) => {
        impl $crate::store::Record for $entity {
            fn collection_name() -> &'static str {
                $collection
            }

            fn id(&self) -> &str {
                &self.id
            }
        }
    };
}

pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Record> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store, _marker: PhantomData }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn to_document(entity: &T) -> Result<Document> {
        Ok(bson::to_document(entity)?)
    }

    pub async fn insert(&self, entity: &T) -> Result<()> {
        self.store
            .insert_one(T::collection_name(), Self::to_document(entity)?)
            .await
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<T>> {
        self.find_one(Filter::id(id)).await
    }

    pub async fn find_one(&self, filter: Filter) -> Result<Option<T>> {
        self.store
            .find_one(T::collection_name(), filter.into_document())
            .await?
            .map(|doc| bson::from_document(doc).map_err(Into::into))
            .transpose()
    }

    pub async fn find(&self, filter: Filter, options: FindOptions) -> Result<Vec<T>> {
        self.store
            .find(T::collection_name(), filter.into_document(), options)
            .await?
            .into_iter()
            .map(|doc| bson::from_document(doc).map_err(Into::into))
            .collect()
    }

    /// Replace the stored document with `entity`. Returns whether it existed.
    pub async fn replace(&self, entity: &T) -> Result<bool> {
        self.store
            .replace_one(
                T::collection_name(),
                Filter::id(entity.id()).into_document(),
                Self::to_document(entity)?,
            )
            .await
    }

    /// Merge `fields` into the document with `id`. Returns whether it existed.
    pub async fn set_fields(&self, id: &str, fields: Document) -> Result<bool> {
        self.store
            .set_fields(T::collection_name(), Filter::id(id).into_document(), fields)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        self.store
            .delete_one(T::collection_name(), Filter::id(id).into_document())
            .await
    }

    pub async fn count(&self, filter: Filter) -> Result<u64> {
        self.store
            .count(T::collection_name(), filter.into_document())
            .await
    }
}
