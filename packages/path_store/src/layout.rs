//! Mapping between keys and locations under a store root.
//!
//! A key `a.b.c` lives at `<root>/a/b/c.`: every segment but the last is a
//! directory, and the last one names a file carrying a trailing marker. The
//! marker is what lets `foo` (the file `foo.`) sit beside `foo.bar` (the
//! directory `foo/` holding `bar.`) without colliding. Segments can never end
//! in the marker, since they never contain the key separator.

use std::ffi::{OsStr, OsString};
use std::path::{Component, Path, PathBuf};

use fscache_core_store::{Key, KeyError};

/// Appended to the last segment of a key to name its value file.
pub const LEAF_MARKER: char = '.';

/// Where a key's value lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLocation {
    /// Directories holding the value file, outermost first. The root itself
    /// is not included.
    pub dirs: Vec<PathBuf>,
    pub file: PathBuf,
}

impl KeyLocation {
    /// The directory the value file sits in.
    pub fn parent<'a>(&'a self, root: &'a Path) -> &'a Path {
        self.dirs.last().map(PathBuf::as_path).unwrap_or(root)
    }
}

pub fn encode(root: &Path, key: &Key) -> KeyLocation {
    let mut dirs = Vec::with_capacity(key.len() - 1);
    let mut current = root.to_path_buf();
    for segment in key.parents() {
        current.push(segment);
        dirs.push(current.clone());
    }

    let file = current.join(leaf_file_name(key.leaf()));
    KeyLocation { dirs, file }
}

pub fn leaf_file_name(segment: &str) -> OsString {
    let mut name = OsString::with_capacity(segment.len() + 1);
    name.push(segment);
    name.push(LEAF_MARKER.encode_utf8(&mut [0; 4]));
    name
}

/// The segment named by a value file, or `None` if `file_name` is not one.
pub fn strip_marker(file_name: &OsStr) -> Option<&str> {
    let name = file_name.to_str()?;
    let segment = name.strip_suffix(LEAF_MARKER)?;
    if segment.is_empty() {
        None
    } else {
        Some(segment)
    }
}

/// Rebuild the key for a value file from the directories between the root and
/// the file, plus the file's segment with the marker already stripped.
pub fn decode<'a>(
    dirs: impl IntoIterator<Item = &'a str>,
    leaf: &str,
) -> Result<Key, KeyError> {
    let mut segments: Vec<String> = dirs.into_iter().map(str::to_owned).collect();
    segments.push(leaf.to_owned());
    Key::from_segments(segments)
}

/// Decode the key for the value file at `file_path`, which must lie below
/// `root`.
///
/// Returns `None` for anything that is not a value file this layout could
/// have produced.
pub fn decode_path(root: &Path, file_path: &Path) -> Option<Key> {
    let relative = file_path.strip_prefix(root).ok()?;
    let leaf = strip_marker(relative.file_name()?)?;

    let mut dirs = Vec::new();
    for component in relative.parent()?.components() {
        match component {
            Component::Normal(name) => dirs.push(name.to_str()?),
            _ => return None,
        }
    }

    decode(dirs, leaf).ok()
}
