//! Dotted keys with validated segments.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Separator between the segments of a dotted key.
pub const KEY_SEPARATOR: char = '.';

/// Characters that may never appear inside a segment.
///
/// Both path separators and the drive separator are rejected on every
/// platform so a key written on one system can never escape the store root on
/// another.
const FORBIDDEN_CHARS: [char; 4] = ['/', '\\', ':', '\0'];

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("key must not be empty")]
    Empty,
    #[error("invalid key segment {segment:?} at position {position}: {message}")]
    InvalidSegment {
        segment: String,
        position: usize,
        message: String,
    },
}

/// A `Key` identifies one stored value.
///
/// The textual form is a dotted string such as `users.alice.profile`. Each
/// segment is non-empty and free of path separators, so the segments can be
/// used directly as directory and file names below a store root.
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Key {
    segments: Vec<String>,
}

impl Key {
    /// Parse a dotted key string.
    ///
    /// ```rust
    /// use fscache_core_store::Key;
    ///
    /// let key = Key::parse("foo.bar").unwrap();
    /// assert_eq!(key.segments(), ["foo", "bar"]);
    ///
    /// assert!(Key::parse("foo..bar").is_err());
    /// assert!(Key::parse(".foo").is_err());
    /// ```
    pub fn parse(key: &str) -> Result<Self, KeyError> {
        if key.is_empty() {
            return Err(KeyError::Empty);
        }

        Self::from_segments(key.split(KEY_SEPARATOR).map(str::to_owned).collect())
    }

    /// Build a key from segments that were already split apart.
    ///
    /// Segments may not contain the key separator, since the result has to
    /// survive a round trip through its dotted form.
    pub fn from_segments(segments: Vec<String>) -> Result<Self, KeyError> {
        if segments.is_empty() {
            return Err(KeyError::Empty);
        }

        for (position, segment) in segments.iter().enumerate() {
            Self::validate_segment(segment, position)?;
        }

        Ok(Key { segments })
    }

    fn validate_segment(segment: &str, position: usize) -> Result<(), KeyError> {
        let invalid = |message: String| KeyError::InvalidSegment {
            segment: segment.to_owned(),
            position,
            message,
        };

        if segment.is_empty() {
            return Err(invalid("empty segment".to_owned()));
        }

        if segment.contains(KEY_SEPARATOR) {
            return Err(invalid(format!(
                "segment contains the key separator '{}'",
                KEY_SEPARATOR
            )));
        }

        if let Some(c) = segment.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
            return Err(invalid(format!("forbidden character {:?}", c)));
        }

        Ok(())
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The segments that become directories, i.e. all but the last.
    pub fn parents(&self) -> &[String] {
        &self.segments[..self.segments.len() - 1]
    }

    /// The last segment, which names the value file.
    pub fn leaf(&self) -> &str {
        // A key always holds at least one segment.
        &self.segments[self.segments.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Always false; present for symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Append a segment, producing a child key.
    pub fn child(&self, segment: &str) -> Result<Key, KeyError> {
        Self::validate_segment(segment, self.segments.len())?;
        let mut segments = self.segments.clone();
        segments.push(segment.to_owned());
        Ok(Key { segments })
    }

    /// Check whether `prefix` names this key or one of its ancestors.
    pub fn starts_with(&self, prefix: &Key) -> bool {
        self.segments.starts_with(&prefix.segments)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", KEY_SEPARATOR)?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl FromStr for Key {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Key::parse(s)
    }
}

impl TryFrom<&str> for Key {
    type Error = KeyError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Key::parse(value)
    }
}

impl TryFrom<String> for Key {
    type Error = KeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Key::parse(&value)
    }
}

impl Serialize for Key {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Key {
    fn deserialize<D>(deserializer: D) -> Result<Key, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Key::parse(&s).map_err(D::Error::custom)
    }
}

/// Build a [`Key`] from a literal. Panics if the key is malformed.
#[macro_export]
macro_rules! key {
    ($key_string:expr) => {
        $crate::Key::parse($key_string).unwrap()
    };
}
