//! SQLite implementation of DocumentStore trait
//!
//! Each collection is a table holding the JSON body next to indexed copies
//! of the id, owner and uniqueness key. The UNIQUE constraint on
//! `unique_key` is what makes [`DocumentStore::toggle`] safe under
//! concurrent requests.

use crate::config::StoreConfig;
use crate::model::{Collection, ObjectId};
use crate::store::{DocumentStore, Filter, StoreError, StoredDocument, Toggled};
use log::{debug, info};
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, TransactionBehavior};
use serde_json::Value;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite implementation of DocumentStore
pub struct SQLiteDocumentStore {
    conn: Mutex<Connection>,
}

impl SQLiteDocumentStore {
    /// Open (creating if needed) the database file named in the configuration
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let db_path = Path::new(&config.db_path);
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::InvalidDocument(format!("cannot create {}: {}", parent.display(), e)))?;
            }
        }
        info!("Opening SQLite document store at {}", db_path.display());
        let conn = Connection::open(db_path)?;
        Self::with_connection(conn, config.wal_mode)
    }

    /// Private database that disappears with the store
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?, false)
    }

    fn with_connection(conn: Connection, wal_mode: bool) -> Result<Self, StoreError> {
        if wal_mode {
            let mode: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
            debug!("SQLite journal mode: {}", mode);
        }
        for collection in Collection::ALL {
            let table = collection.name();
            conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    seq INTEGER PRIMARY KEY AUTOINCREMENT,
                    id TEXT NOT NULL UNIQUE,
                    owner TEXT NOT NULL,
                    unique_key TEXT UNIQUE,
                    body TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS {table}_owner ON {table} (owner);"
            ))?;
        }
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

/// JSON path for a dot separated field name
fn json_path(field: &str) -> Result<String, StoreError> {
    let valid = !field.is_empty()
        && field.split('.').all(|part| {
            !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        });
    if !valid {
        return Err(StoreError::InvalidDocument(format!("invalid filter field: {:?}", field)));
    }
    Ok(format!("$.{}", field))
}

fn parse_body(body: String) -> Result<Value, StoreError> {
    Ok(serde_json::from_str(&body)?)
}

fn map_insert_error(collection: Collection, doc: &StoredDocument, e: rusqlite::Error) -> StoreError {
    let constraint = matches!(
        &e,
        rusqlite::Error::SqliteFailure(failure, _) if failure.code == ErrorCode::ConstraintViolation
    );
    if !constraint {
        return StoreError::Sqlite(e);
    }
    match &doc.unique_key {
        Some(key) if e.to_string().contains("unique_key") => StoreError::Duplicate {
            collection,
            field: "unique_key",
            value: key.clone(),
        },
        _ => StoreError::Duplicate {
            collection,
            field: "id",
            value: doc.id.to_string(),
        },
    }
}

impl DocumentStore for SQLiteDocumentStore {
    fn insert(&self, collection: Collection, doc: &StoredDocument) -> Result<(), StoreError> {
        let body = serde_json::to_string(&doc.body)?;
        let conn = self.lock()?;
        conn.execute(
            &format!("INSERT INTO {} (id, owner, unique_key, body) VALUES (?1, ?2, ?3, ?4)", collection.name()),
            params![doc.id.to_string(), doc.owner.to_string(), doc.unique_key, body],
        )
        .map_err(|e| map_insert_error(collection, doc, e))?;

        debug!("Inserted {} into {}", doc.id, collection);
        Ok(())
    }

    fn find_by_id(&self, collection: Collection, id: &ObjectId) -> Result<Option<Value>, StoreError> {
        let conn = self.lock()?;
        let body: Option<String> = conn
            .query_row(
                &format!("SELECT body FROM {} WHERE id = ?1", collection.name()),
                params![id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        body.map(parse_body).transpose()
    }

    fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>, StoreError> {
        let mut sql = format!("SELECT body FROM {}", collection.name());
        let mut bindings: Vec<String> = Vec::with_capacity(filter.clauses().len() * 2);
        for (i, (field, value)) in filter.clauses().iter().enumerate() {
            sql.push_str(if i == 0 { " WHERE " } else { " AND " });
            sql.push_str(&format!(
                "json_extract(body, ?{}) = json_extract(?{}, '$')",
                bindings.len() + 1,
                bindings.len() + 2
            ));
            bindings.push(json_path(field)?);
            bindings.push(serde_json::to_string(value)?);
        }
        sql.push_str(" ORDER BY seq");

        let conn = self.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(bindings.iter()), |row| row.get::<_, String>(0))?;

        let mut documents = Vec::new();
        for row in rows {
            documents.push(parse_body(row?)?);
        }
        Ok(documents)
    }

    fn update_with(
        &self,
        collection: Collection,
        id: &ObjectId,
        mutate: &mut dyn FnMut(&mut Value) -> Result<bool, StoreError>,
    ) -> Result<Option<Value>, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let table = collection.name();

        let current: Option<String> = tx
            .query_row(&format!("SELECT body FROM {table} WHERE id = ?1"), params![id.to_string()], |row| row.get(0))
            .optional()?;
        let Some(current) = current else {
            return Ok(None);
        };

        let mut body = parse_body(current)?;
        if !mutate(&mut body)? {
            return Ok(Some(body));
        }
        tx.execute(
            &format!("UPDATE {table} SET body = ?1 WHERE id = ?2"),
            params![serde_json::to_string(&body)?, id.to_string()],
        )?;
        tx.commit()?;

        debug!("Updated {} in {}", id, collection);
        Ok(Some(body))
    }

    fn delete_by_id(&self, collection: Collection, id: &ObjectId) -> Result<Option<Value>, StoreError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let table = collection.name();

        let current: Option<String> = tx
            .query_row(&format!("SELECT body FROM {table} WHERE id = ?1"), params![id.to_string()], |row| row.get(0))
            .optional()?;
        let Some(current) = current else {
            return Ok(None);
        };

        tx.execute(&format!("DELETE FROM {table} WHERE id = ?1"), params![id.to_string()])?;
        tx.commit()?;

        debug!("Deleted {} from {}", id, collection);
        parse_body(current).map(Some)
    }

    fn toggle(&self, collection: Collection, doc: &StoredDocument) -> Result<Toggled<Value>, StoreError> {
        let key = doc.unique_key.as_ref().ok_or(StoreError::MissingUniqueKey(collection))?;
        let body = serde_json::to_string(&doc.body)?;
        let table = collection.name();

        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let inserted = tx.execute(
            &format!(
                "INSERT INTO {table} (id, owner, unique_key, body) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(unique_key) DO NOTHING"
            ),
            params![doc.id.to_string(), doc.owner.to_string(), key, body],
        )?;
        if inserted == 1 {
            tx.commit()?;
            debug!("Toggle added {} to {}", key, collection);
            return Ok(Toggled::Added(doc.body.clone()));
        }

        let existing: String = tx.query_row(
            &format!("SELECT body FROM {table} WHERE unique_key = ?1"),
            params![key],
            |row| row.get(0),
        )?;
        tx.execute(&format!("DELETE FROM {table} WHERE unique_key = ?1"), params![key])?;
        tx.commit()?;

        debug!("Toggle removed {} from {}", key, collection);
        Ok(Toggled::Removed(parse_body(existing)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(owner: ObjectId, unique_key: Option<&str>, body: Value) -> StoredDocument {
        let id = ObjectId::new();
        let mut body = body;
        body["_id"] = json!(id.to_string());
        body["owner"] = json!(owner.to_string());
        StoredDocument { id, owner, unique_key: unique_key.map(str::to_string), body }
    }

    #[test]
    fn test_sqlite_store_basic_operations() {
        let store = SQLiteDocumentStore::open_in_memory().unwrap();
        let owner = ObjectId::new();
        let doc = document(owner, None, json!({ "content": "hello", "flag": true }));

        store.insert(Collection::Tweets, &doc).unwrap();
        assert_eq!(store.find_by_id(Collection::Tweets, &doc.id).unwrap(), Some(doc.body.clone()));
        assert_eq!(store.find_by_id(Collection::Comments, &doc.id).unwrap(), None);

        let found = store.find(Collection::Tweets, &Filter::new().eq("owner", owner).eq("flag", true)).unwrap();
        assert_eq!(found.len(), 1);
        assert!(store.find(Collection::Tweets, &Filter::new().eq("flag", false)).unwrap().is_empty());

        let patch = json!({ "content": "edited" });
        let updated = store.update_by_id(Collection::Tweets, &doc.id, patch.as_object().unwrap()).unwrap().unwrap();
        assert_eq!(updated["content"], "edited");
        assert_eq!(updated["flag"], true);

        let deleted = store.delete_by_id(Collection::Tweets, &doc.id).unwrap().unwrap();
        assert_eq!(deleted["content"], "edited");
        assert_eq!(store.delete_by_id(Collection::Tweets, &doc.id).unwrap(), None);
    }

    #[test]
    fn test_sqlite_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            db_path: dir.path().join("nested").join("store.db").to_string_lossy().into_owned(),
            wal_mode: true,
            ..Default::default()
        };
        let doc = document(ObjectId::new(), None, json!({ "name": "kept" }));

        {
            let store = SQLiteDocumentStore::open(&config).unwrap();
            store.insert(Collection::Playlists, &doc).unwrap();
        }

        let reopened = SQLiteDocumentStore::open(&config).unwrap();
        let found = reopened.find_by_id(Collection::Playlists, &doc.id).unwrap().unwrap();
        assert_eq!(found["name"], "kept");
    }

    #[test]
    fn test_sqlite_unique_key_rejects_plain_duplicate_insert() {
        let store = SQLiteDocumentStore::open_in_memory().unwrap();
        let owner = ObjectId::new();
        let first = document(owner, Some("u:video:1"), json!({}));
        let second = document(owner, Some("u:video:1"), json!({}));

        store.insert(Collection::Likes, &first).unwrap();
        let err = store.insert(Collection::Likes, &second).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { field: "unique_key", .. }));
    }

    #[test]
    fn test_json_path_rejects_injection() {
        assert_eq!(json_path("target.kind").unwrap(), "$.target.kind");
        assert!(json_path("").is_err());
        assert!(json_path("a..b").is_err());
        assert!(json_path("x') OR 1=1 --").is_err());
    }
}
