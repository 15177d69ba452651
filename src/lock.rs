use std::{
    fs::File,
    io::{ErrorKind, Write},
    ops::{Deref, DerefMut},
};

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::IoContext;
use crate::{Error, Result};

/// Exclusive write access to a file, through `<file>.lock`.
///
/// Contents written to the lock become visible under the guarded name on [`LockedFile::commit`].
/// Dropping the lock without committing discards them.
pub struct LockedFile {
    guarded_path: Utf8PathBuf,
    lock_path: Utf8PathBuf,
    lockfile: Option<File>,
}

impl Deref for LockedFile {
    type Target = File;

    fn deref(&self) -> &Self::Target {
        self.lockfile.as_ref().expect("lock file is open until commit")
    }
}

impl DerefMut for LockedFile {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.lockfile.as_mut().expect("lock file is open until commit")
    }
}

impl LockedFile {
    /// Take the lock on `path`, or return `None` if someone else holds it.
    pub fn try_acquire(path: impl AsRef<Utf8Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .ok_or_else(|| Error::NotFound(format!("file name of '{path}'")))?;
        let lock_path = path.with_file_name(format!("{file_name}.lock"));

        match File::options()
            .write(true)
            .create_new(true)
            .open(&lock_path)
        {
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(None),
            Err(e) => Err(Error::io(lock_path, e)),
            Ok(lockfile) => Ok(Some(Self {
                guarded_path: path.to_owned(),
                lock_path,
                lockfile: Some(lockfile),
            })),
        }
    }

    /// Flush and rename the lock file over the guarded file.
    pub fn commit(mut self) -> Result<()> {
        if let Some(mut file) = self.lockfile.take() {
            file.flush().at(&self.lock_path)?;
            file.sync_all().at(&self.lock_path)?;
        }
        std::fs::rename(&self.lock_path, &self.guarded_path).at(&self.guarded_path)
    }
}

impl Drop for LockedFile {
    fn drop(&mut self) {
        // Still open means `commit` was never called.
        if self.lockfile.take().is_some() {
            let _ = std::fs::remove_file(&self.lock_path);
        }
    }
}
