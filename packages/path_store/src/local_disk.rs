use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::{fs, io};

use fscache_core_store::{CacheProvider, Error, Format, Key, Lookup};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::StoreConfig;
use crate::layout::{self, KeyLocation};
use crate::lock::{self, RootLock};

/// A cache storing each value in its own file below a root directory.
///
/// The directory tree is the whole data structure; see [`crate::layout`] for
/// how keys map onto it. Deleting a key also removes any ancestor directories
/// it leaves empty, so the tree never accumulates dangling directories.
///
/// Cloned handles, and separately opened handles on the same root, serialize
/// their mutations through a shared lock.
#[derive(Clone, Debug)]
pub struct PathStore {
    root: PathBuf,
    format: Format,
    lock: RootLock,
}

impl PathStore {
    pub fn new(
        root: impl Into<PathBuf>,
        format: Format,
        create_if_missing: bool,
    ) -> Result<PathStore, Error> {
        Self::with_config(StoreConfig {
            root: root.into(),
            format,
            create_if_missing,
        })
    }

    pub fn with_config(config: StoreConfig) -> Result<PathStore, Error> {
        let StoreConfig {
            root,
            format,
            create_if_missing,
        } = config;

        let invalid = |message: String| Error::Config {
            path: root.clone(),
            message,
        };

        if !root.is_absolute() {
            return Err(invalid("not an absolute path".to_owned()));
        }

        match fs::metadata(&root) {
            Ok(attr) if attr.is_dir() => {}
            Ok(_) => return Err(invalid("not a directory".to_owned())),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                if !create_if_missing {
                    return Err(invalid("directory does not exist".to_owned()));
                }
                log::debug!("Creating store root {}...", root.display());
                fs::create_dir_all(&root)
                    .map_err(|err| invalid(format!("could not create directory: {}", err)))?;
            }
            Err(err) => return Err(invalid(format!("could not access directory: {}", err))),
        }

        let root = root
            .canonicalize()
            .map_err(|err| invalid(format!("could not resolve directory: {}", err)))?;
        let lock = lock::for_root(&root);

        Ok(PathStore { root, format, lock })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The file that holds (or would hold) the value for `key`.
    pub fn path_for(&self, key: &Key) -> PathBuf {
        layout::encode(&self.root, key).file
    }

    fn create_dir_if_absent(dir: &Path) -> Result<(), Error> {
        match fs::create_dir(dir) {
            Ok(()) => {
                log::trace!("Created directory {}", dir.display());
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
            Err(source) => Err(Error::Write {
                path: dir.to_path_buf(),
                source,
            }),
        }
    }

    /// Write `bytes` to a temporary file beside `location.file` and rename it
    /// into place, so readers see either the old blob or the new one.
    fn write_blob(&self, location: &KeyLocation, bytes: &[u8]) -> Result<(), Error> {
        let write_err = |source: io::Error| Error::Write {
            path: location.file.clone(),
            source,
        };

        // Temporary names never end in the leaf marker, so a half-written
        // blob is never listed as a key.
        #[cfg_attr(not(unix), allow(unused_mut))]
        let mut builder = tempfile::Builder::new();
        // Blobs get the same mode as a plain `File::create`, umask included.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(fs::Permissions::from_mode(0o666));
        }
        let mut tmp = builder
            .tempfile_in(location.parent(&self.root))
            .map_err(write_err)?;
        tmp.write_all(bytes).map_err(write_err)?;
        tmp.flush().map_err(write_err)?;
        tmp.persist(&location.file)
            .map_err(|err| write_err(err.error))?;

        Ok(())
    }

    /// Remove the value file, then prune ancestors that became empty.
    ///
    /// The caller must hold the root lock.
    fn delete_locked(&self, key: &Key) -> Result<bool, Error> {
        let location = layout::encode(&self.root, key);
        log::debug!("Deleting {}...", location.file.display());

        match fs::remove_file(&location.file) {
            Ok(()) => {}
            Err(err) if is_absent(&err) => return Ok(false),
            Err(source) => {
                return Err(Error::Delete {
                    path: location.file,
                    source,
                })
            }
        }

        self.prune_empty_ancestors(&location.dirs)?;
        Ok(true)
    }

    /// Remove directories from the innermost outwards until one is not empty.
    /// Missing directories are skipped. The root is never in `dirs`, so it is
    /// never removed.
    fn prune_empty_ancestors(&self, dirs: &[PathBuf]) -> Result<(), Error> {
        for dir in dirs.iter().rev() {
            match fs::remove_dir(dir) {
                Ok(()) => log::trace!("Pruned empty directory {}", dir.display()),
                Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                Err(err) if err.kind() == io::ErrorKind::DirectoryNotEmpty => break,
                Err(source) => {
                    return Err(Error::Delete {
                        path: dir.clone(),
                        source,
                    })
                }
            }
        }
        Ok(())
    }

    /// Visit every value file below the root, in file name order.
    ///
    /// Files that this layout could not have produced are skipped with a
    /// warning. Entries that vanish mid-walk are skipped silently.
    fn walk_values(
        &self,
        mut visit: impl FnMut(Key, &walkdir::DirEntry) -> Result<(), Error>,
    ) -> Result<(), Error> {
        for entry in walkdir::WalkDir::new(&self.root)
            .min_depth(1)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err)
                    if err
                        .io_error()
                        .is_some_and(|e| e.kind() == io::ErrorKind::NotFound) =>
                {
                    continue;
                }
                Err(err) => {
                    return Err(Error::Walk {
                        path: err
                            .path()
                            .map_or_else(|| self.root.clone(), Path::to_path_buf),
                        message: err.to_string(),
                    })
                }
            };

            if entry.file_type().is_dir() {
                continue;
            }

            match layout::decode_path(&self.root, entry.path()) {
                Some(key) => visit(key, &entry)?,
                None => log::warn!(
                    "Skipping {}: not a value file of this store",
                    entry.path().display()
                ),
            }
        }
        Ok(())
    }
}

/// A missing file, or a regular file where a directory should be, both mean
/// the key holds no value.
fn is_absent(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

impl CacheProvider for PathStore {
    fn format(&self) -> Format {
        self.format
    }

    fn lookup<T: DeserializeOwned>(&self, key: &Key) -> Result<Lookup<T>, Error> {
        let file_path = self.path_for(key);
        log::debug!("Reading {}...", file_path.display());

        let bytes = match fs::read(&file_path) {
            Ok(bytes) => bytes,
            Err(err) if is_absent(&err) => return Ok(Lookup::Absent),
            Err(source) => {
                return Err(Error::Read {
                    path: file_path,
                    source,
                })
            }
        };

        self.format
            .decode(&bytes)
            .map(Lookup::Found)
            .map_err(|err| Error::decode(key, self.format, err))
    }

    fn put<T: Serialize + ?Sized>(&mut self, key: &Key, value: &T) -> Result<(), Error> {
        let bytes = self
            .format
            .encode(value)
            .map_err(|err| Error::encode(key, self.format, err))?;
        let location = layout::encode(&self.root, key);
        log::debug!("Writing {}...", location.file.display());

        let _guard = self.lock.lock();
        let written = location
            .dirs
            .iter()
            .try_for_each(|dir| Self::create_dir_if_absent(dir))
            .and_then(|()| self.write_blob(&location, &bytes));

        if written.is_err() {
            // Drop any directories this write created before failing.
            if let Err(err) = self.prune_empty_ancestors(&location.dirs) {
                log::warn!("Could not clean up after failed write: {}", err);
            }
        }
        written
    }

    fn delete(&mut self, key: &Key) -> Result<bool, Error> {
        let _guard = self.lock.lock();
        self.delete_locked(key)
    }

    fn contains(&self, key: &Key) -> Result<bool, Error> {
        let file_path = self.path_for(key);
        match fs::metadata(&file_path) {
            Ok(attr) => Ok(attr.is_file()),
            Err(err) if is_absent(&err) => Ok(false),
            Err(source) => Err(Error::Read {
                path: file_path,
                source,
            }),
        }
    }

    fn keys(&self) -> Result<Vec<Key>, Error> {
        let mut keys = Vec::new();
        self.walk_values(|key, _| {
            keys.push(key);
            Ok(())
        })?;
        // Directory order differs from key order: "foo" sorts before "foo."
        // on disk, but the key foo comes before foo.bar.
        keys.sort();
        Ok(keys)
    }

    fn size(&self) -> Result<u64, Error> {
        let mut total = 0;
        self.walk_values(|_, entry| {
            let attr = entry.metadata().map_err(|err| Error::Walk {
                path: entry.path().to_path_buf(),
                message: err.to_string(),
            })?;
            total += attr.len();
            Ok(())
        })?;
        Ok(total)
    }

    fn reset(&mut self) -> Result<(), Error> {
        let _guard = self.lock.lock();
        let keys = self.keys()?;
        log::debug!("Resetting {} ({} keys)...", self.root.display(), keys.len());
        for key in keys {
            self.delete_locked(&key)?;
        }
        Ok(())
    }
}


#[cfg(test)]
mod cache_provider_impl_for_path_store_tests {
    use super::*;
    use fscache_core_store::trait_test_suite;

    struct TestPathStore {
        // Holding the directory here removes it once the test store is dropped.
        _dir: tempfile::TempDir,
        store: PathStore,
    }

    impl TestPathStore {
        fn with_format(format: Format) -> TestPathStore {
            let dir = tempfile::tempdir().unwrap();
            let store = PathStore::new(dir.path(), format, false).unwrap();
            TestPathStore { _dir: dir, store }
        }

        fn json() -> TestPathStore {
            Self::with_format(Format::Json)
        }

        fn bincode() -> TestPathStore {
            Self::with_format(Format::Bincode)
        }
    }

    impl CacheProvider for TestPathStore {
        fn format(&self) -> Format {
            self.store.format()
        }

        fn lookup<T: DeserializeOwned>(&self, key: &Key) -> Result<Lookup<T>, Error> {
            self.store.lookup(key)
        }

        fn put<T: Serialize + ?Sized>(&mut self, key: &Key, value: &T) -> Result<(), Error> {
            self.store.put(key, value)
        }

        fn delete(&mut self, key: &Key) -> Result<bool, Error> {
            self.store.delete(key)
        }

        fn contains(&self, key: &Key) -> Result<bool, Error> {
            self.store.contains(key)
        }

        fn keys(&self) -> Result<Vec<Key>, Error> {
            self.store.keys()
        }

        fn size(&self) -> Result<u64, Error> {
            self.store.size()
        }

        fn reset(&mut self) -> Result<(), Error> {
            self.store.reset()
        }
    }

    #[test]
    fn json_store_passes_suite() {
        trait_test_suite::run_all(TestPathStore::json);
    }

    #[test]
    fn bincode_store_passes_suite() {
        trait_test_suite::run_all(TestPathStore::bincode);
    }

    #[test]
    fn reset_leaves_no_directories() {
        let mut test_store = TestPathStore::json();
        for k in ["a.b.c", "a.b.d", "x.y", "z"] {
            test_store.put(&Key::parse(k).unwrap(), k).unwrap();
        }

        test_store.reset().unwrap();

        let root = test_store.store.root();
        assert!(root.is_dir());
        assert_eq!(fs::read_dir(root).unwrap().count(), 0);
    }
}
