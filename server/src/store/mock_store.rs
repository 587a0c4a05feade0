//! Mock implementation of DocumentStore trait for testing

use crate::model::{Collection, ObjectId};
use crate::store::{DocumentStore, Filter, StoreError, StoredDocument, Toggled};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

type Collections = HashMap<Collection, Vec<StoredDocument>>;

/// In-memory implementation of DocumentStore for testing
///
/// Every trait call is counted so tests can assert that rejected input
/// never reached the store.
pub struct MockDocumentStore {
    data: Arc<Mutex<Collections>>,
    calls: AtomicUsize,
}

impl MockDocumentStore {
    pub fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(HashMap::new())),
            calls: AtomicUsize::new(0),
        }
    }

    /// Clear all data from the store (useful for test cleanup)
    pub fn clear(&self) {
        if let Ok(mut data) = self.data.lock() {
            data.clear();
        }
    }

    /// Number of documents currently held in a collection
    pub fn document_count(&self, collection: Collection) -> usize {
        self.data
            .lock()
            .map(|data| data.get(&collection).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    /// Number of trait calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn begin(&self) -> Result<MutexGuard<'_, Collections>, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.data.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl Default for MockDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for MockDocumentStore {
    fn insert(&self, collection: Collection, doc: &StoredDocument) -> Result<(), StoreError> {
        let mut data = self.begin()?;
        let documents = data.entry(collection).or_default();

        if documents.iter().any(|d| d.id == doc.id) {
            return Err(StoreError::Duplicate { collection, field: "id", value: doc.id.to_string() });
        }
        if let Some(key) = &doc.unique_key {
            if documents.iter().any(|d| d.unique_key.as_ref() == Some(key)) {
                return Err(StoreError::Duplicate { collection, field: "unique_key", value: key.clone() });
            }
        }

        documents.push(doc.clone());
        Ok(())
    }

    fn find_by_id(&self, collection: Collection, id: &ObjectId) -> Result<Option<Value>, StoreError> {
        let data = self.begin()?;
        Ok(data
            .get(&collection)
            .and_then(|documents| documents.iter().find(|d| d.id == *id))
            .map(|d| d.body.clone()))
    }

    fn find(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>, StoreError> {
        let data = self.begin()?;
        Ok(data
            .get(&collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|d| filter.matches(&d.body))
                    .map(|d| d.body.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn update_with(
        &self,
        collection: Collection,
        id: &ObjectId,
        mutate: &mut dyn FnMut(&mut Value) -> Result<bool, StoreError>,
    ) -> Result<Option<Value>, StoreError> {
        let mut data = self.begin()?;
        let Some(doc) = data
            .get_mut(&collection)
            .and_then(|documents| documents.iter_mut().find(|d| d.id == *id))
        else {
            return Ok(None);
        };

        let mut body = doc.body.clone();
        if mutate(&mut body)? {
            doc.body = body.clone();
        }
        Ok(Some(body))
    }

    fn delete_by_id(&self, collection: Collection, id: &ObjectId) -> Result<Option<Value>, StoreError> {
        let mut data = self.begin()?;
        let Some(documents) = data.get_mut(&collection) else {
            return Ok(None);
        };
        Ok(documents
            .iter()
            .position(|d| d.id == *id)
            .map(|index| documents.remove(index).body))
    }

    fn toggle(&self, collection: Collection, doc: &StoredDocument) -> Result<Toggled<Value>, StoreError> {
        let key = doc.unique_key.as_ref().ok_or(StoreError::MissingUniqueKey(collection))?;
        let mut data = self.begin()?;
        let documents = data.entry(collection).or_default();

        match documents.iter().position(|d| d.unique_key.as_ref() == Some(key)) {
            Some(index) => Ok(Toggled::Removed(documents.remove(index).body)),
            None => {
                documents.push(doc.clone());
                Ok(Toggled::Added(doc.body.clone()))
            }
        }
    }
}
