//! OrderedMap Module
//!
//! A typed, persistent, sorted map over the storage engine.
//!
//! ## Contract
//! - `get`: point lookup, `None` on miss
//! - `insert`: overwrite, returns the previous value
//! - `remove`: returns the removed value
//! - `values`: every value in key order, from one consistent snapshot
//!
//! Keys go through the order-preserving [`Key`] codec; values are
//! serialized with bincode.

mod key;

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Config;
use crate::engine::Engine;
use crate::error::Result;

pub use key::Key;

/// Persistent sorted map from `K` to `V`
pub struct OrderedMap<K, V> {
    engine: Arc<Engine>,
    _types: PhantomData<fn() -> (K, V)>,
}

impl<K, V> Clone for OrderedMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            _types: PhantomData,
        }
    }
}

impl<K, V> OrderedMap<K, V>
where
    K: Key,
    V: Serialize + DeserializeOwned,
{
    /// Wrap an already-open engine
    pub fn new(engine: Arc<Engine>) -> Self {
        Self {
            engine,
            _types: PhantomData,
        }
    }

    /// Open (or create) a map stored under `config.data_dir`
    pub fn open(config: Config) -> Result<Self> {
        Ok(Self::new(Arc::new(Engine::open(config)?)))
    }

    pub fn get(&self, key: &K) -> Result<Option<V>> {
        self.engine
            .get(&key.to_key_bytes())?
            .map(|bytes| decode(&bytes))
            .transpose()
    }

    pub fn contains_key(&self, key: &K) -> Result<bool> {
        Ok(self.engine.get(&key.to_key_bytes())?.is_some())
    }

    /// Insert or overwrite, returning the previous value
    pub fn insert(&self, key: &K, value: &V) -> Result<Option<V>> {
        let bytes = bincode::serialize(value)?;
        self.engine
            .put(&key.to_key_bytes(), &bytes)?
            .map(|old| decode(&old))
            .transpose()
    }

    /// Insert only if the key is vacant; `false` leaves the map untouched
    pub fn insert_new(&self, key: &K, value: &V) -> Result<bool> {
        let bytes = bincode::serialize(value)?;
        self.engine.put_if_absent(&key.to_key_bytes(), &bytes)
    }

    /// Remove a key, returning the value it held
    pub fn remove(&self, key: &K) -> Result<Option<V>> {
        self.engine
            .delete(&key.to_key_bytes())?
            .map(|old| decode(&old))
            .transpose()
    }

    /// Atomically replace an existing value with `f(current)`
    ///
    /// Returns `None` (and writes nothing) if the key is absent.
    pub fn update<F>(&self, key: &K, f: F) -> Result<Option<V>>
    where
        F: FnOnce(V) -> Result<V>,
    {
        let updated = self.engine.update(&key.to_key_bytes(), |bytes| {
            let next = f(decode(&bytes)?)?;
            Ok(bincode::serialize(&next)?)
        })?;

        updated.map(|bytes| decode(&bytes)).transpose()
    }

    /// Every value, in key order
    pub fn values(&self) -> Result<Vec<V>> {
        self.engine
            .scan()?
            .into_iter()
            .map(|(_, value)| decode(&value))
            .collect()
    }

    /// Every `(key, value)` pair, in key order
    pub fn iter(&self) -> Result<Vec<(K, V)>> {
        self.engine
            .scan()?
            .into_iter()
            .map(|(key, value)| Ok((K::from_key_bytes(&key)?, decode(&value)?)))
            .collect()
    }

    /// Number of live entries (full scan)
    pub fn len(&self) -> Result<usize> {
        Ok(self.engine.scan()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// The engine underneath, for flush/compaction/inspection
    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }
}

fn decode<V: DeserializeOwned>(bytes: &[u8]) -> Result<V> {
    Ok(bincode::deserialize(bytes)?)
}
