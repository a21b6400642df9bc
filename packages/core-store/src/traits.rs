//! The `CacheProvider` trait and the `Lookup` result.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::{Error, Format, Key};

/// Outcome of reading a key that may not be present.
///
/// Keeps "nothing stored here" apart from I/O and decode failures, which are
/// reported through `Err` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    Absent,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Lookup::Absent)
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::Absent => None,
        }
    }

    pub fn unwrap_or(self, default: T) -> T {
        self.into_option().unwrap_or(default)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found(value) => Lookup::Found(f(value)),
            Lookup::Absent => Lookup::Absent,
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Lookup::Found(value),
            None => Lookup::Absent,
        }
    }
}

impl<T> From<Lookup<T>> for Option<T> {
    fn from(value: Lookup<T>) -> Self {
        value.into_option()
    }
}

/// A keyed object cache.
///
/// Implementations map dotted [`Key`]s to serialized values. Callers that only
/// need caching semantics should depend on this trait so the backing store
/// (on disk, in memory, or elsewhere) can be swapped.
///
/// Writes overwrite silently. Deleting a missing key is a no-op. Reading a
/// missing key yields [`Lookup::Absent`], while a blob that fails to decode is
/// an [`Error::Decode`] and is never mistaken for absence.
pub trait CacheProvider {
    /// The format values are serialized with.
    fn format(&self) -> Format;

    /// Read the value stored at `key`.
    fn lookup<T: DeserializeOwned>(&self, key: &Key) -> Result<Lookup<T>, Error>;

    /// Store `value` at `key`, replacing any previous value.
    fn put<T: Serialize + ?Sized>(&mut self, key: &Key, value: &T) -> Result<(), Error>;

    /// Remove the value at `key`. Returns `true` if a value was removed.
    fn delete(&mut self, key: &Key) -> Result<bool, Error>;

    fn contains(&self, key: &Key) -> Result<bool, Error>;

    /// All keys currently holding a value, in ascending order.
    fn keys(&self) -> Result<Vec<Key>, Error>;

    /// Total size in bytes of all stored blobs.
    fn size(&self) -> Result<u64, Error>;

    /// Remove every stored value.
    fn reset(&mut self) -> Result<(), Error> {
        for key in self.keys()? {
            self.delete(&key)?;
        }
        Ok(())
    }

    /// Read the value at `key`, with `None` standing for absence.
    fn get<T: DeserializeOwned>(&self, key: &Key) -> Result<Option<T>, Error> {
        Ok(self.lookup(key)?.into_option())
    }

    /// Read the value at `key`, or `default` if nothing is stored there.
    fn get_or<T: DeserializeOwned>(&self, key: &Key, default: T) -> Result<T, Error> {
        Ok(self.lookup(key)?.unwrap_or(default))
    }

    /// Every stored value, in the order of [`CacheProvider::keys`].
    fn values<T: DeserializeOwned>(&self) -> Result<Vec<T>, Error> {
        Ok(self
            .entries()?
            .into_iter()
            .map(|(_, value)| value)
            .collect())
    }

    /// Every stored key paired with its value.
    ///
    /// A key removed between listing and reading is skipped.
    fn entries<T: DeserializeOwned>(&self) -> Result<Vec<(Key, T)>, Error> {
        let mut entries = Vec::new();
        for key in self.keys()? {
            if let Lookup::Found(value) = self.lookup(&key)? {
                entries.push((key, value));
            }
        }
        Ok(entries)
    }

    fn len(&self) -> Result<usize, Error> {
        Ok(self.keys()?.len())
    }

    fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.len()? == 0)
    }
}

impl<S: CacheProvider> CacheProvider for &mut S {
    fn format(&self) -> Format {
        (**self).format()
    }

    fn lookup<T: DeserializeOwned>(&self, key: &Key) -> Result<Lookup<T>, Error> {
        (**self).lookup(key)
    }

    fn put<T: Serialize + ?Sized>(&mut self, key: &Key, value: &T) -> Result<(), Error> {
        (**self).put(key, value)
    }

    fn delete(&mut self, key: &Key) -> Result<bool, Error> {
        (**self).delete(key)
    }

    fn contains(&self, key: &Key) -> Result<bool, Error> {
        (**self).contains(key)
    }

    fn keys(&self) -> Result<Vec<Key>, Error> {
        (**self).keys()
    }

    fn size(&self) -> Result<u64, Error> {
        (**self).size()
    }

    fn reset(&mut self) -> Result<(), Error> {
        (**self).reset()
    }
}
