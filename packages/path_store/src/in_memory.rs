//! In-memory cache store.
//!
//! Values are kept as encoded blobs rather than live objects, so decode
//! failures and size accounting match [`PathStore`](crate::PathStore) exactly.

use std::collections::BTreeMap;

use fscache_core_store::{CacheProvider, Error, Format, Key, Lookup};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A cache that lives only as long as the process.
///
/// # Example
///
/// ```rust
/// use fscache_path_store::InMemoryStore;
/// use fscache_core_store::{CacheProvider, key};
///
/// let mut store = InMemoryStore::new();
///
/// store.put(&key!("users.alice"), "Alice").unwrap();
///
/// let name: Option<String> = store.get(&key!("users.alice")).unwrap();
/// assert_eq!(name.as_deref(), Some("Alice"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    format: Format,
    blobs: BTreeMap<Key, Vec<u8>>,
}

impl InMemoryStore {
    /// Create an empty store using the default format.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format(format: Format) -> Self {
        Self {
            format,
            blobs: BTreeMap::new(),
        }
    }

    /// The encoded blob stored at `key`, if any.
    pub fn raw(&self, key: &Key) -> Option<&[u8]> {
        self.blobs.get(key).map(Vec::as_slice)
    }

    /// Store pre-encoded bytes at `key` without checking them.
    pub fn put_raw(&mut self, key: &Key, bytes: Vec<u8>) {
        self.blobs.insert(key.clone(), bytes);
    }
}

impl CacheProvider for InMemoryStore {
    fn format(&self) -> Format {
        self.format
    }

    fn lookup<T: DeserializeOwned>(&self, key: &Key) -> Result<Lookup<T>, Error> {
        match self.blobs.get(key) {
            Some(bytes) => self
                .format
                .decode(bytes)
                .map(Lookup::Found)
                .map_err(|err| Error::decode(key, self.format, err)),
            None => Ok(Lookup::Absent),
        }
    }

    fn put<T: Serialize + ?Sized>(&mut self, key: &Key, value: &T) -> Result<(), Error> {
        let bytes = self
            .format
            .encode(value)
            .map_err(|err| Error::encode(key, self.format, err))?;
        self.blobs.insert(key.clone(), bytes);
        Ok(())
    }

    fn delete(&mut self, key: &Key) -> Result<bool, Error> {
        Ok(self.blobs.remove(key).is_some())
    }

    fn contains(&self, key: &Key) -> Result<bool, Error> {
        Ok(self.blobs.contains_key(key))
    }

    fn keys(&self) -> Result<Vec<Key>, Error> {
        Ok(self.blobs.keys().cloned().collect())
    }

    fn size(&self) -> Result<u64, Error> {
        Ok(self.blobs.values().map(|blob| blob.len() as u64).sum())
    }

    fn reset(&mut self) -> Result<(), Error> {
        self.blobs.clear();
        Ok(())
    }
}
