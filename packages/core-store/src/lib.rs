//! Core fscache types.
//!
//! This crate holds everything a cache backend shares, independent of where
//! the bytes end up:
//! - `Key`: a dotted key split into validated segments
//! - `Format`: the serialization protocol a store writes its blobs in
//! - `CacheProvider`: the swappable cache interface
//! - `Lookup`: found-or-absent result of a read
//! - `Error`: the error taxonomy shared by every backend
//!
//! # Example
//!
//! ```rust
//! use fscache_core_store::{CacheProvider, Error, key};
//!
//! fn remember_subject(cache: &mut impl CacheProvider, subject: &str) -> Result<(), Error> {
//!     cache.put(&key!("mail.headers.subject"), subject)
//! }
//! ```

mod error;
mod format;
mod key;
mod traits;

#[cfg(any(test, feature = "test-utils"))]
pub mod trait_test_suite;

pub use error::{Error, Result};
pub use format::{Format, FormatError};
pub use key::{Key, KeyError, KEY_SEPARATOR};
pub use traits::{CacheProvider, Lookup};
