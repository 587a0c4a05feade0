//! Document Store Abstraction
//!
//! This module provides an abstraction over document storage backends,
//! allowing the system to use different implementations (SQLite, in-memory)
//! without affecting the services built on top of it. Backends work on raw
//! JSON documents; [`repository::Repository`] adds the typed entity layer.

pub mod sqlite_store;
pub mod mock_store;
pub mod repository;

#[cfg(test)]
mod comprehensive_test;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::model::{Collection, ObjectId};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("duplicate {field} in {collection}: {value}")]
    Duplicate {
        collection: Collection,
        field: &'static str,
        value: String,
    },
    #[error("{0} documents carry no uniqueness key")]
    MissingUniqueKey(Collection),
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    #[error("store lock poisoned")]
    Poisoned,
}

/// A document as handed to a backend
///
/// `id`, `owner` and `unique_key` are duplicated out of `body` so that
/// backends can index them.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: ObjectId,
    pub owner: ObjectId,
    pub unique_key: Option<String>,
    pub body: Value,
}

/// Conjunction of equality clauses over (possibly nested) document fields
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` (dot separated for nested fields) to equal `value`
    pub fn eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.clauses.push((field.to_string(), value.into()));
        self
    }

    pub fn clauses(&self) -> &[(String, Value)] {
        &self.clauses
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn matches(&self, doc: &Value) -> bool {
        self.clauses.iter().all(|(field, expected)| {
            let pointer = format!("/{}", field.replace('.', "/"));
            doc.pointer(&pointer) == Some(expected)
        })
    }
}

/// Outcome of a toggle: the record that was inserted or the one removed
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "record", rename_all = "lowercase")]
pub enum Toggled<T> {
    Added(T),
    Removed(T),
}

impl<T> Toggled<T> {
    pub fn is_added(&self) -> bool {
        matches!(self, Toggled::Added(_))
    }

    pub fn record(&self) -> &T {
        match self {
            Toggled::Added(record) | Toggled::Removed(record) => record,
        }
    }

    pub fn into_record(self) -> T {
        match self {
            Toggled::Added(record) | Toggled::Removed(record) => record,
        }
    }

    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<Toggled<U>, E> {
        Ok(match self {
            Toggled::Added(record) => Toggled::Added(f(record)?),
            Toggled::Removed(record) => Toggled::Removed(f(record)?),
        })
    }
}

/// Trait defining the document storage interface
///
/// Lookups that find nothing return `Ok(None)`; errors are reserved for
/// backend failures.
pub trait DocumentStore: Send + Sync {
    /// Insert a new document; fails with [`StoreError::Duplicate`] on a key clash
    fn insert(&self, collection: Collection, doc: &StoredDocument) -> Result<(), StoreError>;

    fn find_by_id(&self, collection: Collection, id: &ObjectId) -> Result<Option<Value>, StoreError>;

    /// All documents matching `filter`, in insertion order
    fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>, StoreError>;

    /// Read, modify and write back one document without interleaving writers
    ///
    /// `mutate` returns whether it changed the body; an unchanged body is
    /// not written. Returns the document as stored afterwards.
    fn update_with(
        &self,
        collection: Collection,
        id: &ObjectId,
        mutate: &mut dyn FnMut(&mut Value) -> Result<bool, StoreError>,
    ) -> Result<Option<Value>, StoreError>;

    /// Merge `patch` into the top level of a document and return the result
    fn update_by_id(
        &self,
        collection: Collection,
        id: &ObjectId,
        patch: &Map<String, Value>,
    ) -> Result<Option<Value>, StoreError> {
        self.update_with(collection, id, &mut |body| {
            apply_patch(body, patch)?;
            Ok(true)
        })
    }

    /// Remove a document and return what was removed
    fn delete_by_id(&self, collection: Collection, id: &ObjectId) -> Result<Option<Value>, StoreError>;

    /// Atomically insert `doc`, or if a document with the same uniqueness
    /// key exists, delete that one instead
    fn toggle(&self, collection: Collection, doc: &StoredDocument) -> Result<Toggled<Value>, StoreError>;
}

/// Shallow merge shared by the backends
pub(crate) fn apply_patch(body: &mut Value, patch: &Map<String, Value>) -> Result<(), StoreError> {
    let object = body
        .as_object_mut()
        .ok_or_else(|| StoreError::InvalidDocument("document body is not an object".to_string()))?;
    for (field, value) in patch {
        object.insert(field.clone(), value.clone());
    }
    Ok(())
}
