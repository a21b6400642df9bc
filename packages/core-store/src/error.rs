//! Error types shared by every cache provider.

use std::io;
use std::path::PathBuf;

use crate::format::{Format, FormatError};
use crate::key::{Key, KeyError};

/// Errors raised by cache providers.
///
/// A missing key is never an error. Lookups report it as
/// [`Lookup::Absent`](crate::Lookup::Absent) and deletes treat it as a no-op.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The store root is unusable. Raised only at construction.
    #[error("Cannot initialize store at {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("{0}")]
    Key(#[from] KeyError),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to delete {path}: {source}")]
    Delete {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The stored blob exists but does not deserialize.
    #[error("An error occurred while decoding the value for {key} as {format}: {message}")]
    Decode {
        key: Key,
        format: Format,
        message: String,
    },

    #[error("An error occurred while encoding the value for {key} as {format}: {message}")]
    Encode {
        key: Key,
        format: Format,
        message: String,
    },

    #[error("Failed to list {path}: {message}")]
    Walk { path: PathBuf, message: String },
}

impl Error {
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config { .. })
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode { .. })
    }

    /// Wrap a codec failure for `key` as [`Error::Decode`].
    pub fn decode(key: &Key, format: Format, error: FormatError) -> Self {
        Error::Decode {
            key: key.clone(),
            format,
            message: codec_message(error),
        }
    }

    /// Wrap a codec failure for `key` as [`Error::Encode`].
    pub fn encode(key: &Key, format: Format, error: FormatError) -> Self {
        Error::Encode {
            key: key.clone(),
            format,
            message: codec_message(error),
        }
    }
}

fn codec_message(error: FormatError) -> String {
    match error {
        FormatError::Codec { message, .. } => message,
        other => other.to_string(),
    }
}

pub type Result<T> = std::result::Result<T, Error>;
