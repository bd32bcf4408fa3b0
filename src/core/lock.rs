//! core::lock
//!
//! Exclusive store lock for mutating commands.
//!
//! # Architecture
//!
//! Crawls write through the store as they walk, so two of them against the
//! same data directory must not interleave. `StoreLock` takes an fs2
//! exclusive lock on `<data_dir>/lock`; the OS drops it if the process dies.
//!
//! Acquisition never waits: a second `ob` process gets
//! [`LockError::Busy`] and should be retried by the user.
//!
//! # Example
//!
//! ```no_run
//! use openbook::core::lock::StoreLock;
//! use openbook::core::paths::DataPaths;
//!
//! let paths = DataPaths::new("/data".into());
//! let _lock = StoreLock::acquire(&paths)?;
//! // run a crawl; the lock is released when `_lock` goes out of scope
//! # Ok::<(), openbook::core::lock::LockError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;

use crate::core::paths::DataPaths;

#[derive(Debug, Error)]
pub enum LockError {
    #[error("store at {0} is in use by another openbook process")]
    Busy(PathBuf),

    #[error("cannot lock {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Held for the lifetime of a mutating command.
#[derive(Debug)]
pub struct StoreLock {
    path: PathBuf,
    file: File,
}

impl StoreLock {
    /// Create the data directory if needed and take the lock.
    pub fn acquire(paths: &DataPaths) -> Result<Self, LockError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| LockError::Io { path, source }
        };

        fs::create_dir_all(paths.root()).map_err(io_err(paths.root()))?;

        let path = paths.lock_path();
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(io_err(&path))?;

        if let Err(e) = file.try_lock_exclusive() {
            if e.kind() == io::ErrorKind::WouldBlock {
                return Err(LockError::Busy(paths.root().to_path_buf()));
            }
            return Err(LockError::Io { path, source: e });
        }
        tracing::trace!(lock = %path.display(), "acquired store lock");
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}
