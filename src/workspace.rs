mod memory;

pub use memory::MemoryWorkspace;

use std::os::unix::fs::MetadataExt;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::*;
use walkdir::WalkDir;

use crate::error::IoContext;
use crate::filemode::FileMode;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File(FileMode),
    Directory,
    Symlink,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub path: Utf8PathBuf,
    pub kind: EntryKind,
}

/// A lazy, single-pass sequence of the entries of one directory.
pub type Entries<'a> = Box<dyn Iterator<Item = Result<DirEntry>> + 'a>;

/// Read access to a directory hierarchy.
pub trait DirectoryListing {
    /// The immediate children of `dir`, in no particular order.
    fn list<'a>(&'a self, dir: &Utf8Path) -> Result<Entries<'a>>;

    fn read_file(&self, path: &Utf8Path) -> Result<Vec<u8>>;

    /// The target of the symlink at `path`, as raw bytes.
    fn read_link(&self, path: &Utf8Path) -> Result<Vec<u8>>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct Workspace;

impl DirectoryListing for Workspace {
    fn list<'a>(&'a self, dir: &Utf8Path) -> Result<Entries<'a>> {
        let root = dir.to_owned();
        let entries = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .into_iter()
            .filter_map(move |entry| match entry {
                Ok(entry) => to_dir_entry(entry).transpose(),
                Err(e) => {
                    let path = e
                        .path()
                        .and_then(Utf8Path::from_path)
                        .map(ToOwned::to_owned)
                        .unwrap_or_else(|| root.clone());
                    Some(Err(Error::io(path, e.into())))
                }
            });
        Ok(Box::new(entries))
    }

    fn read_file(&self, path: &Utf8Path) -> Result<Vec<u8>> {
        std::fs::read(path).at(path)
    }

    fn read_link(&self, path: &Utf8Path) -> Result<Vec<u8>> {
        use std::os::unix::ffi::OsStrExt;
        let target = std::fs::read_link(path).at(path)?;
        Ok(target.as_os_str().as_bytes().to_owned())
    }
}

fn to_dir_entry(entry: walkdir::DirEntry) -> Result<Option<DirEntry>> {
    let file_type = entry.file_type();
    let path = Utf8PathBuf::from_path_buf(entry.into_path())
        .map_err(|p| Error::NonUtf8Path(p.display().to_string()))?;
    let name = path
        .file_name()
        .ok_or_else(|| Error::NonUtf8Path(path.to_string()))?
        .to_owned();

    let kind = if file_type.is_dir() {
        EntryKind::Directory
    } else if file_type.is_symlink() {
        EntryKind::Symlink
    } else if file_type.is_file() {
        let metadata = std::fs::symlink_metadata(&path).at(&path)?;
        EntryKind::File(FileMode::from_file_mode(metadata.mode()))
    } else {
        warn!(%path, "Skipping special file");
        return Ok(None);
    };

    Ok(Some(DirEntry { name, path, kind }))
}

#[cfg(test)]
mod tests {
    use std::fs::Permissions;
    use std::os::unix::fs::PermissionsExt;

    use pretty_assertions::assert_eq;
    use tempdir::TempDir;

    use super::*;

    #[test]
    fn test_list() -> color_eyre::Result<()> {
        let root = TempDir::new("")?;
        let root = Utf8Path::from_path(root.path()).unwrap();

        crate::create_test_files!(root, ["file1", "file2", "dir/file3"]);
        std::fs::set_permissions(root.join("file2"), Permissions::from_mode(0o755))?;
        std::os::unix::fs::symlink("file1", root.join("link"))?;

        let mut entries = Workspace.list(root)?.collect::<Result<Vec<_>>>()?;
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        let kinds = entries
            .iter()
            .map(|e| (e.name.as_str(), e.kind))
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            [
                ("dir", EntryKind::Directory),
                ("file1", EntryKind::File(FileMode::REGULAR)),
                ("file2", EntryKind::File(FileMode::EXECUTABLE)),
                ("link", EntryKind::Symlink),
            ]
        );
        assert_eq!(Workspace.read_link(&root.join("link"))?, b"file1");
        Ok(())
    }

    #[test]
    fn test_list_missing_dir() -> color_eyre::Result<()> {
        let root = TempDir::new("")?;
        let root = Utf8Path::from_path(root.path()).unwrap();

        let listed = Workspace
            .list(&root.join("missing"))
            .and_then(|entries| entries.collect::<Result<Vec<_>>>());
        assert!(matches!(listed, Err(Error::NotFound(_))));
        Ok(())
    }
}
