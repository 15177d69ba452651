mod refs;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::*;

use crate::blob;
use crate::commit::{self, Ancestors};
use crate::database::Database;
use crate::digest::Algorithm;
use crate::error::IoContext;
use crate::tree;
use crate::workspace::Workspace;
use crate::{Digest, Error, Result};

/// Name of the storage directory inside a working directory. Never part of a snapshot.
pub const STORAGE_DIR_NAME: &str = ".lgit";

/// A working directory together with its `.lgit` storage directory.
pub struct Repo {
    dir: Utf8PathBuf,
    git_dir: Utf8PathBuf,
    head_path: Utf8PathBuf,
    pub database: Database,
}

impl Repo {
    /// Create the storage layout under `dir`:
    ///
    /// ```text
    /// .lgit/
    ///   objects/
    ///   refs/heads/
    ///   HEAD -> ref: refs/heads/master
    /// ```
    ///
    /// Running it on an existing repository changes nothing.
    pub fn init(dir: &Utf8Path) -> Result<()> {
        let git_dir = dir.join(STORAGE_DIR_NAME);
        trace!(path = %git_dir, "Initialising repo");

        for d in ["objects", "refs/heads"] {
            let dir = git_dir.join(d);
            trace!(path = %dir, "Creating directory");
            std::fs::create_dir_all(&dir).at(&dir)?;
        }

        let head_path = git_dir.join("HEAD");
        if head_path.exists() {
            warn!("Repo already exists, HEAD left untouched");
        } else {
            std::fs::write(&head_path, "ref: refs/heads/master\n").at(&head_path)?;
        }
        Ok(())
    }

    /// Open the repository rooted at `dir`, hashing with `algorithm`.
    pub fn open(dir: Utf8PathBuf, algorithm: Algorithm) -> Result<Self> {
        let git_dir = dir.join(STORAGE_DIR_NAME);
        if !git_dir.is_dir() {
            return Err(Error::NotFound(format!("not an lgit repository: {dir}")));
        }
        let database = Database::open(git_dir.join("objects"), algorithm.provider())?;
        trace!(path = %dir, %algorithm, "Opened repo");
        Ok(Self {
            head_path: git_dir.join("HEAD"),
            dir,
            git_dir,
            database,
        })
    }

    /// Store the file at `path` (relative to the working directory, or absolute) as a blob.
    pub fn write_blob(&self, path: &Utf8Path) -> Result<Digest> {
        blob::write_blob_from_file(&self.database, &self.dir.join(path))
    }

    /// Snapshot the whole working directory.
    pub fn write_tree(&self) -> Result<Digest> {
        tree::write_tree(&self.database, &Workspace, &self.dir, &[STORAGE_DIR_NAME])
    }

    pub fn commit_tree(
        &self,
        tree_id: &Digest,
        parent: Option<&Digest>,
        author: &str,
        committer: &str,
        message: &str,
    ) -> Result<Digest> {
        commit::create_commit(&self.database, tree_id, parent, author, committer, message)
    }

    /// Snapshot the working directory, commit it on top of HEAD, and advance HEAD.
    pub fn commit(&mut self, author: &str, committer: &str, message: &str) -> Result<Digest> {
        trace!(path = %self.dir, "Starting commit");
        let tree_id = self.write_tree()?;
        let parent = self.read_head()?;
        let commit_id = self.commit_tree(&tree_id, parent.as_ref(), author, committer, message)?;
        self.update_head(&commit_id)?;
        info!(commit = %commit_id.short(), tree = %tree_id.short(), "Created commit");
        Ok(commit_id)
    }

    /// History reachable from HEAD, newest first. `None` in a repository without commits.
    pub fn log(&self) -> Result<Option<Ancestors<'_>>> {
        Ok(self
            .read_head()?
            .map(|head| Ancestors::new(&self.database, head)))
    }
}

#[cfg(test)]
mod tests {
    use tempdir::TempDir;

    use super::*;

    #[test]
    fn test_open_requires_init() -> Result<()> {
        let dir = TempDir::new("").unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap().to_owned();
        assert!(matches!(
            Repo::open(root.clone(), Algorithm::Sha1),
            Err(Error::NotFound(_))
        ));
        Repo::init(&root)?;
        Repo::open(root, Algorithm::Sha1)?;
        Ok(())
    }
}
