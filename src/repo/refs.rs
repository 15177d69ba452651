use std::io::Write;
use std::str::FromStr;

use camino::Utf8PathBuf;
use tracing::trace;

use crate::error::IoContext;
use crate::lock::LockedFile;
use crate::{Digest, Error, Result};

impl super::Repo {
    /// Resolve HEAD to a commit id. A symbolic HEAD whose ref does not exist yet (a fresh
    /// repository) resolves to `None`.
    pub fn read_head(&self) -> Result<Option<Digest>> {
        if !self.head_path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.head_path).at(&self.head_path)?;
        let contents = contents.trim();
        if let Some(target) = contents.strip_prefix("ref: ") {
            let path = self.git_dir.join(target);
            if !path.exists() {
                return Ok(None);
            }
            let contents = std::fs::read_to_string(&path).at(&path)?;
            Ok(Some(Digest::from_str(contents.trim())?))
        } else {
            Ok(Some(Digest::from_str(contents)?))
        }
    }

    /// Point HEAD (or the branch it names) at `oid`.
    pub fn update_head(&mut self, oid: &Digest) -> Result<()> {
        let path = self.head_target()?;
        trace!(%path, %oid, "Updating ref");
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).at(parent)?;
        }
        let mut lock = LockedFile::try_acquire(&path)?
            .ok_or_else(|| Error::Io {
                path: path.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::WouldBlock,
                    "ref is locked by another process",
                ),
            })?;
        writeln!(lock, "{oid:x}").at(&path)?;
        lock.commit()
    }

    /// The file an update of HEAD writes to.
    fn head_target(&self) -> Result<Utf8PathBuf> {
        if self.head_path.exists() {
            let contents = std::fs::read_to_string(&self.head_path).at(&self.head_path)?;
            if let Some(target) = contents.trim().strip_prefix("ref: ") {
                return Ok(self.git_dir.join(target));
            }
        }
        Ok(self.head_path.clone())
    }
}

#[cfg(test)]
mod tests {
    use camino::Utf8Path;
    use tempdir::TempDir;

    use crate::digest::Algorithm;
    use crate::repo::Repo;

    use super::*;

    #[test]
    fn test_head_follows_branch() -> Result<()> {
        let dir = TempDir::new("").unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap().to_owned();
        Repo::init(&root)?;
        let mut repo = Repo::open(root.clone(), Algorithm::Sha1)?;

        assert_eq!(repo.read_head()?, None);

        let oid = Digest::from_str("f2ba8f84ab5c1bce84a7b441cb1959cfc7093b7f")?;
        repo.update_head(&oid)?;
        assert_eq!(repo.read_head()?, Some(oid.clone()));

        let master = root.join(".lgit/refs/heads/master");
        assert_eq!(
            std::fs::read_to_string(master).unwrap(),
            "f2ba8f84ab5c1bce84a7b441cb1959cfc7093b7f\n"
        );
        assert_eq!(
            std::fs::read_to_string(root.join(".lgit/HEAD")).unwrap(),
            "ref: refs/heads/master\n"
        );
        Ok(())
    }

    #[test]
    fn test_detached_head() -> Result<()> {
        let dir = TempDir::new("").unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap().to_owned();
        Repo::init(&root)?;
        std::fs::write(
            root.join(".lgit/HEAD"),
            "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391\n",
        )
        .unwrap();
        let mut repo = Repo::open(root.clone(), Algorithm::Sha1)?;
        assert_eq!(
            repo.read_head()?,
            Some(Digest::from_str("e69de29bb2d1d6434b8b29ae775ad8c2e48c5391")?)
        );

        let oid = Digest::from_str("f2ba8f84ab5c1bce84a7b441cb1959cfc7093b7f")?;
        repo.update_head(&oid)?;
        assert_eq!(repo.read_head()?, Some(oid));
        assert!(!root.join(".lgit/refs/heads/master").exists());
        Ok(())
    }
}
