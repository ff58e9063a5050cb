//! Entity Repository
//!
//! One generic CRUD implementation shared by every record type: id
//! generation, delegation to an `OrderedMap`, and merge-based updates.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{Result, SupplyError};
use crate::map::OrderedMap;

/// Attempts at drawing an unused id before giving up
const MAX_ID_ATTEMPTS: usize = 4;

/// A record type a `Repository` can manage
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Fields accepted on creation
    type Create: Clone;

    /// Fields accepted on update; absent ones are retained
    type Patch;

    /// Lower-case name used in messages ("supplier")
    const KIND: &'static str;

    fn id(&self) -> &str;

    /// Build a validated record, or `BadRequest`
    fn from_create(id: String, payload: Self::Create) -> Result<Self>;

    /// Overlay a patch; on `BadRequest` the record must be unchanged
    fn apply_patch(&mut self, patch: Self::Patch) -> Result<()>;

    /// Stamp the last-modified time
    fn touch(&mut self, now: DateTime<Utc>);
}

/// CRUD over one entity's store
pub struct Repository<E> {
    map: OrderedMap<String, E>,
}

impl<E> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            map: self.map.clone(),
        }
    }
}

impl<E: Entity> Repository<E> {
    pub fn new(map: OrderedMap<String, E>) -> Self {
        Self { map }
    }

    /// Open a repository whose store lives at `config.data_dir`
    pub fn open(config: Config) -> Result<Self> {
        Ok(Self::new(OrderedMap::open(config)?))
    }

    /// Validate, assign a fresh id, and store
    ///
    /// The id is claimed with a single insert-if-vacant, so a collision
    /// never overwrites an existing record.
    pub fn create(&self, payload: E::Create) -> Result<E> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let record = E::from_create(Uuid::new_v4().to_string(), payload.clone())?;
            let id = record.id().to_string();

            if self.map.insert_new(&id, &record)? {
                tracing::debug!(kind = E::KIND, %id, "created");
                return Ok(record);
            }
            tracing::warn!(kind = E::KIND, %id, "generated id already in use");
        }

        Err(SupplyError::Storage(format!(
            "could not allocate an unused {} id",
            E::KIND
        )))
    }

    /// Point lookup, `None` on miss
    pub fn find(&self, id: &str) -> Result<Option<E>> {
        self.map.get(&id.to_string())
    }

    /// Point lookup, `NotFound` on miss
    pub fn get(&self, id: &str) -> Result<E> {
        self.find(id)?.ok_or_else(|| self.not_found(id))
    }

    pub fn contains(&self, id: &str) -> Result<bool> {
        self.map.contains_key(&id.to_string())
    }

    /// Every record, ordered by id
    pub fn list(&self) -> Result<Vec<E>> {
        self.map.values()
    }

    /// Merge a patch into the stored record and stamp `updatedAt`
    pub fn update(&self, id: &str, patch: E::Patch) -> Result<E> {
        let updated = self.map.update(&id.to_string(), |mut record| {
            record.apply_patch(patch)?;
            record.touch(Utc::now());
            Ok(record)
        })?;

        let record = updated.ok_or_else(|| self.not_found(id))?;
        tracing::debug!(kind = E::KIND, id, "updated");
        Ok(record)
    }

    /// Remove a record, returning it
    pub fn delete(&self, id: &str) -> Result<E> {
        let removed = self.map.remove(&id.to_string())?;
        let record = removed.ok_or_else(|| self.not_found(id))?;
        tracing::debug!(kind = E::KIND, id, "deleted");
        Ok(record)
    }

    /// The map underneath
    pub fn map(&self) -> &OrderedMap<String, E> {
        &self.map
    }

    fn not_found(&self, id: &str) -> SupplyError {
        SupplyError::NotFound {
            entity: E::KIND,
            id: id.to_string(),
        }
    }
}
