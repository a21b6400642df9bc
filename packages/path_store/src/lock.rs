//! Process-wide mutation locks, one per store root.
//!
//! Every `PathStore` opened on the same (canonical) root shares one mutex, so
//! a delete pruning an "empty" directory cannot race a write creating a file
//! inside it. Only mutations take the lock. Other processes are not
//! coordinated with.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::Mutex;

pub(crate) type RootLock = Arc<Mutex<()>>;

lazy_static! {
    static ref ROOT_LOCKS: Mutex<HashMap<PathBuf, RootLock>> = Mutex::new(HashMap::new());
}

/// The lock shared by every store on `root`.
///
/// `root` must already be canonical, otherwise two spellings of one directory
/// would get separate locks. Entries live for the rest of the process.
pub(crate) fn for_root(root: &Path) -> RootLock {
    ROOT_LOCKS
        .lock()
        .entry(root.to_path_buf())
        .or_default()
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_root_shares_lock() {
        let a = for_root(Path::new("/lock-test/shared"));
        let b = for_root(Path::new("/lock-test/shared"));
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn different_roots_do_not_share() {
        let a = for_root(Path::new("/lock-test/one"));
        let b = for_root(Path::new("/lock-test/two"));
        assert!(!Arc::ptr_eq(&a, &b));

        let _held = a.lock();
        assert!(b.try_lock().is_some());
        assert!(a.try_lock().is_none());
    }
}
