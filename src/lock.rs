use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::warn;

use crate::error::Result;

/// Filesystem sentinel guaranteeing at most one live daemon instance.
///
/// The sentinel is created with an exclusive create, so two racing starts
/// cannot both believe they own it. Only the process that created it may
/// remove it; an instance that finds it already present must leave it alone
/// and exit.
#[derive(Debug)]
pub struct RunLock {
    path: PathBuf,
}

impl RunLock {
    /// Try to take ownership of the sentinel at `path`.
    ///
    /// Returns `None` when another instance already holds it.
    pub fn acquire(path: PathBuf) -> Result<Option<Self>> {
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(_) => Ok(Some(Self { path })),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Re-create the sentinel if something removed it mid-run.
    pub fn ensure(&self) -> Result<()> {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for RunLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!("Failed to remove lock file {}: {e}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_creates_the_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autoretry.lock");

        let lock = RunLock::acquire(path.clone()).unwrap().unwrap();

        assert!(path.exists());
        assert_eq!(lock.path(), path);
    }

    #[test]
    fn second_acquire_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autoretry.lock");

        let _lock = RunLock::acquire(path.clone()).unwrap().unwrap();

        assert!(RunLock::acquire(path).unwrap().is_none());
    }

    #[test]
    fn drop_removes_the_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autoretry.lock");

        let lock = RunLock::acquire(path.clone()).unwrap().unwrap();
        drop(lock);

        assert!(!path.exists());
    }

    #[test]
    fn refused_acquire_does_not_delete_the_owners_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autoretry.lock");
        std::fs::write(&path, "").unwrap();

        let refused = RunLock::acquire(path.clone()).unwrap();
        drop(refused);

        assert!(path.exists());
    }

    #[test]
    fn ensure_recreates_a_vanished_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autoretry.lock");

        let lock = RunLock::acquire(path.clone()).unwrap().unwrap();
        std::fs::remove_file(&path).unwrap();

        lock.ensure().unwrap();
        assert!(path.exists());
    }
}
