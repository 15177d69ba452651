use std::collections::HashSet;

use camino::{Utf8Path, Utf8PathBuf};

use super::{DirEntry, DirectoryListing, Entries, EntryKind};
use crate::filemode::FileMode;
use crate::{Error, Result};

#[derive(Debug, Clone)]
enum Node {
    File { data: Vec<u8>, mode: FileMode },
    Directory,
    Symlink(Vec<u8>),
}

/// An in-memory directory hierarchy. Entries are listed in insertion order, so the same content
/// can be presented in different orders.
///
/// Paths are relative; the root is the empty path.
#[derive(Debug, Clone, Default)]
pub struct MemoryWorkspace {
    nodes: Vec<(Utf8PathBuf, Node)>,
    unreadable: HashSet<Utf8PathBuf>,
}

impl MemoryWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, path: impl AsRef<Utf8Path>, data: impl Into<Vec<u8>>) -> &mut Self {
        self.insert(
            path.as_ref(),
            Node::File {
                data: data.into(),
                mode: FileMode::REGULAR,
            },
        )
    }

    pub fn add_executable(
        &mut self,
        path: impl AsRef<Utf8Path>,
        data: impl Into<Vec<u8>>,
    ) -> &mut Self {
        self.insert(
            path.as_ref(),
            Node::File {
                data: data.into(),
                mode: FileMode::EXECUTABLE,
            },
        )
    }

    pub fn add_dir(&mut self, path: impl AsRef<Utf8Path>) -> &mut Self {
        self.insert(path.as_ref(), Node::Directory)
    }

    pub fn add_symlink(&mut self, path: impl AsRef<Utf8Path>, target: &str) -> &mut Self {
        self.insert(path.as_ref(), Node::Symlink(target.as_bytes().to_owned()))
    }

    /// Make listing `path` fail with a permission error.
    pub fn deny(&mut self, path: impl AsRef<Utf8Path>) -> &mut Self {
        self.unreadable.insert(path.as_ref().to_owned());
        self
    }

    fn insert(&mut self, path: &Utf8Path, node: Node) -> &mut Self {
        if let Some(parent) = path.parent() {
            if !parent.as_str().is_empty() && self.get(parent).is_none() {
                self.insert(parent, Node::Directory);
            }
        }
        self.nodes.retain(|(p, _)| p.as_path() != path);
        self.nodes.push((path.to_owned(), node));
        self
    }

    fn get(&self, path: &Utf8Path) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|(p, _)| p.as_path() == path)
            .map(|(_, node)| node)
    }
}

impl DirectoryListing for MemoryWorkspace {
    fn list<'a>(&'a self, dir: &Utf8Path) -> Result<Entries<'a>> {
        if self.unreadable.contains(dir) {
            return Err(Error::Io {
                path: dir.to_owned(),
                source: std::io::ErrorKind::PermissionDenied.into(),
            });
        }
        if !dir.as_str().is_empty() && !matches!(self.get(dir), Some(Node::Directory)) {
            return Err(Error::NotFound(dir.to_string()));
        }

        let dir = dir.to_owned();
        let entries = self
            .nodes
            .iter()
            .filter(move |(path, _)| path.parent() == Some(dir.as_path()))
            .map(|(path, node)| {
                let kind = match node {
                    Node::File { mode, .. } => EntryKind::File(*mode),
                    Node::Directory => EntryKind::Directory,
                    Node::Symlink(_) => EntryKind::Symlink,
                };
                Ok(DirEntry {
                    name: path.file_name().unwrap_or_default().to_owned(),
                    path: path.clone(),
                    kind,
                })
            });
        Ok(Box::new(entries))
    }

    fn read_file(&self, path: &Utf8Path) -> Result<Vec<u8>> {
        match self.get(path) {
            Some(Node::File { data, .. }) => Ok(data.clone()),
            _ => Err(Error::NotFound(path.to_string())),
        }
    }

    fn read_link(&self, path: &Utf8Path) -> Result<Vec<u8>> {
        match self.get(path) {
            Some(Node::Symlink(target)) => Ok(target.clone()),
            _ => Err(Error::NotFound(path.to_string())),
        }
    }
}
