//! Cache stores for fscache.
//!
//! `PathStore` keeps each value in its own file under a root directory,
//! turning dotted keys into nested directories. `InMemoryStore` offers the same
//! `CacheProvider` interface without touching disk.
//!
//! ```rust,no_run
//! use fscache_path_store::PathStore;
//! use fscache_core_store::{CacheProvider, Format, key};
//!
//! let mut cache = PathStore::new("/var/cache/mua", Format::Json, true).unwrap();
//! cache.put(&key!("inbox.42.subject"), "Hello").unwrap();
//!
//! let subject: Option<String> = cache.get(&key!("inbox.42.subject")).unwrap();
//! cache.delete(&key!("inbox.42.subject")).unwrap();
//! ```

mod config;
pub mod in_memory;
pub mod layout;
pub mod local_disk;
mod lock;

pub use config::StoreConfig;
pub use in_memory::InMemoryStore;
pub use local_disk::PathStore;

pub use fscache_core_store::{CacheProvider, Error, Format, Key, KeyError, Lookup};
