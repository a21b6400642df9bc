use std::path::PathBuf;

use fscache_core_store::Format;
use serde::{Deserialize, Serialize};

/// Settings for opening a [`PathStore`](crate::PathStore).
///
/// Deserializable so callers can embed it in their own configuration files:
///
/// ```rust
/// use fscache_path_store::StoreConfig;
/// use fscache_core_store::Format;
///
/// let config: StoreConfig =
///     serde_json::from_str(r#"{"root": "/var/cache/mail", "format": "bincode"}"#).unwrap();
/// assert_eq!(config.format, Format::Bincode);
/// assert!(!config.create_if_missing);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Absolute path of the directory holding the cache tree.
    pub root: PathBuf,
    #[serde(default)]
    pub format: Format,
    /// Create `root` and any missing ancestors instead of failing.
    #[serde(default)]
    pub create_if_missing: bool,
}

impl StoreConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            format: Format::default(),
            create_if_missing: false,
        }
    }

    #[must_use]
    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn create_if_missing(mut self, create_if_missing: bool) -> Self {
        self.create_if_missing = create_if_missing;
        self
    }
}
