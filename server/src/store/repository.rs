//! Typed CRUD access to one entity collection

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::model::{Entity, ObjectId};
use crate::store::{apply_patch, DocumentStore, Filter, StoreError, StoredDocument, Toggled};

/// Fields a patch may never overwrite
const IMMUTABLE_FIELDS: [&str; 3] = ["_id", "owner", "createdAt"];

pub struct Repository<T: Entity> {
    store: Arc<dyn DocumentStore>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.store))
    }
}

impl<T: Entity> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    fn to_document(entity: &T) -> Result<StoredDocument, StoreError> {
        Ok(StoredDocument {
            id: entity.id(),
            owner: entity.owner(),
            unique_key: entity.unique_key(),
            body: serde_json::to_value(entity)?,
        })
    }

    fn from_value(value: Value) -> Result<T, StoreError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn create(&self, entity: T) -> Result<T, StoreError> {
        let doc = Self::to_document(&entity)?;
        self.store.insert(T::COLLECTION, &doc)?;
        Ok(entity)
    }

    pub fn find_by_id(&self, id: &ObjectId) -> Result<Option<T>, StoreError> {
        self.store
            .find_by_id(T::COLLECTION, id)?
            .map(Self::from_value)
            .transpose()
    }

    pub fn exists(&self, id: &ObjectId) -> Result<bool, StoreError> {
        Ok(self.store.find_by_id(T::COLLECTION, id)?.is_some())
    }

    pub fn find(&self, filter: &Filter) -> Result<Vec<T>, StoreError> {
        self.store
            .find(T::COLLECTION, filter)?
            .into_iter()
            .map(Self::from_value)
            .collect()
    }

    /// Apply the fields present in `patch` and refresh `updatedAt`
    pub fn update_by_id<P: Serialize>(&self, id: &ObjectId, patch: &P) -> Result<Option<T>, StoreError> {
        let Value::Object(mut fields) = serde_json::to_value(patch)? else {
            return Err(StoreError::InvalidDocument("patch must serialize to an object".to_string()));
        };
        for field in IMMUTABLE_FIELDS {
            fields.remove(field);
        }
        fields.insert("updatedAt".to_string(), serde_json::to_value(Utc::now())?);

        self.store
            .update_by_id(T::COLLECTION, id, &fields)?
            .map(Self::from_value)
            .transpose()
    }

    /// Change one entity in place while the backend holds its write lock
    ///
    /// `mutate` returns whether it changed anything; `updatedAt` is only
    /// refreshed when it did. Identity fields keep their stored values.
    pub fn update_with(&self, id: &ObjectId, mutate: impl FnOnce(&mut T) -> bool) -> Result<Option<T>, StoreError> {
        let mut mutate = Some(mutate);
        let mut apply = |body: &mut Value| -> Result<bool, StoreError> {
            let Some(mutate) = mutate.take() else {
                return Ok(false);
            };
            let mut entity = Self::from_value(body.clone())?;
            if !mutate(&mut entity) {
                return Ok(false);
            }
            let Value::Object(mut fields) = serde_json::to_value(&entity)? else {
                return Err(StoreError::InvalidDocument("entity must serialize to an object".to_string()));
            };
            for field in IMMUTABLE_FIELDS {
                fields.remove(field);
            }
            fields.insert("updatedAt".to_string(), serde_json::to_value(Utc::now())?);
            apply_patch(body, &fields)?;
            Ok(true)
        };

        self.store
            .update_with(T::COLLECTION, id, &mut apply)?
            .map(Self::from_value)
            .transpose()
    }

    pub fn delete_by_id(&self, id: &ObjectId) -> Result<Option<T>, StoreError> {
        self.store
            .delete_by_id(T::COLLECTION, id)?
            .map(Self::from_value)
            .transpose()
    }

    /// Insert `entity`, or remove the stored entity sharing its uniqueness key
    pub fn toggle(&self, entity: T) -> Result<Toggled<T>, StoreError> {
        let doc = Self::to_document(&entity)?;
        self.store.toggle(T::COLLECTION, &doc)?.try_map(Self::from_value)
    }
}
