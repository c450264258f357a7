//! MongoDB-backed document store.

use async_trait::async_trait;
use bson::{doc, Bson, Document};
use futures::{FutureExt, TryStreamExt};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::{Client, Collection, Database};
use tracing::{debug, error, info};

use super::indexes::{initialize_indexes, unique_fields};
use super::{DocumentStore, FindOptions, Increment};
use crate::shared::error::{PlatformError, Result};

/// MongoDB duplicate key error code
const DUPLICATE_KEY: i32 = 11000;

pub struct MongoStore {
    client: Client,
    database: Database,
}

impl MongoStore {
    pub fn new(client: Client, database: Database) -> Self {
        Self { client, database }
    }

    /// Connect, select `database_name` and ensure indexes exist.
    pub async fn connect(uri: &str, database_name: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri).await?;
        let database = client.database(database_name);
        info!(database = database_name, "MongoDB client created");

        initialize_indexes(&database).await?;
        Ok(Self::new(client, database))
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection(name)
    }
}

fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == DUPLICATE_KEY,
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY,
        _ => false,
    }
}

fn display(value: &Bson) -> String {
    value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string())
}

/// Translate a failed write of `doc`; duplicate keys become
/// [`PlatformError::Duplicate`] naming the unique field involved.
fn write_error(error: mongodb::error::Error, collection: &str, doc: &Document) -> PlatformError {
    if !is_duplicate_key(&error) {
        return error.into();
    }
    let (field, value) = unique_fields(collection)
        .find_map(|field| doc.get(field).map(|v| (field, display(v))))
        .unwrap_or_else(|| ("_id", doc.get("_id").map(display).unwrap_or_default()));
    debug!(collection, field, "Duplicate key rejected");
    PlatformError::duplicate(collection, field, value)
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert_one(&self, collection: &str, doc: Document) -> Result<()> {
        self.collection(collection)
            .insert_one(&doc)
            .await
            .map_err(|e| write_error(e, collection, &doc))?;
        Ok(())
    }

    async fn find(&self, collection: &str, filter: Document, options: FindOptions) -> Result<Vec<Document>> {
        let collection = self.collection(collection);
        let mut find = collection.find(filter);
        if let Some(field) = options.sort_desc {
            let mut sort = Document::new();
            sort.insert(field, -1);
            find = find.sort(sort);
        }
        if let Some(limit) = options.limit {
            find = find.limit(limit);
        }
        let cursor = find.await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_one(&self, collection: &str, filter: Document) -> Result<Option<Document>> {
        Ok(self.collection(collection).find_one(filter).await?)
    }

    async fn replace_one(&self, collection: &str, filter: Document, doc: Document) -> Result<bool> {
        let result = self
            .collection(collection)
            .replace_one(filter, &doc)
            .await
            .map_err(|e| write_error(e, collection, &doc))?;
        Ok(result.matched_count > 0)
    }

    async fn set_fields(&self, collection: &str, filter: Document, fields: Document) -> Result<bool> {
        let result = self
            .collection(collection)
            .update_one(filter, doc! { "$set": fields.clone() })
            .await
            .map_err(|e| write_error(e, collection, &fields))?;
        Ok(result.matched_count > 0)
    }

    async fn increment(&self, target: Increment) -> Result<bool> {
        let mut inc = Document::new();
        inc.insert(target.field, target.delta);
        let result = self
            .collection(&target.collection)
            .update_one(target.filter, doc! { "$inc": inc })
            .await?;
        Ok(result.matched_count > 0)
    }

    /// Runs in a transaction through the driver's callback API, which
    /// retries on transient errors such as write conflicts between
    /// concurrent increments of the same target.
    async fn insert_and_increment(&self, collection: &str, doc: Document, target: Increment) -> Result<bool> {
        let targets = self.collection(&target.collection);
        let inserts = self.collection(collection);
        let mut inc = Document::new();
        inc.insert(target.field.as_str(), target.delta);
        let update = doc! { "$inc": inc };

        let mut session = self.client.start_session().await?;
        let applied = session
            .start_transaction()
            .and_run(
                (&targets, &inserts, &target.filter, &update, &doc),
                |session, (targets, inserts, filter, update, doc)| {
                    async move {
                        let updated = targets
                            .update_one(Document::clone(filter), Document::clone(update))
                            .session(&mut *session)
                            .await?;
                        if updated.matched_count == 0 {
                            return Ok(false);
                        }
                        inserts.insert_one(Document::clone(doc)).session(session).await?;
                        Ok(true)
                    }
                    .boxed()
                },
            )
            .await
            .map_err(|e| {
                error!(collection, target = %target.collection, "Insert-and-increment failed: {}", e);
                write_error(e, collection, &doc)
            })?;

        if !applied {
            debug!(collection = %target.collection, "Increment target not found, nothing written");
        }
        Ok(applied)
    }

    async fn delete_one(&self, collection: &str, filter: Document) -> Result<bool> {
        let result = self.collection(collection).delete_one(filter).await?;
        Ok(result.deleted_count > 0)
    }

    async fn count(&self, collection: &str, filter: Document) -> Result<u64> {
        Ok(self.collection(collection).count_documents(filter).await?)
    }

    async fn ping(&self) -> Result<()> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn shutdown(&self) {
        self.client.clone().shutdown().await;
        info!("MongoDB client shut down");
    }
}
