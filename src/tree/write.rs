use camino::Utf8Path;
use tracing::*;

use crate::blob::Blob;
use crate::database::Database;
use crate::filemode::FileMode;
use crate::storable::Storable;
use crate::workspace::{DirectoryListing, EntryKind};
use crate::{Digest, Result};

use super::{Tree, TreeEntry};

/// Snapshot `dir` into the store, bottom-up, returning the id of the root tree.
///
/// Every blob and subtree is stored before the tree that names it. Entries of `dir` itself whose
/// name is in `exclude` are left out; names in subdirectories are not checked.
pub fn write_tree(
    database: &Database,
    listing: &impl DirectoryListing,
    dir: &Utf8Path,
    exclude: &[&str],
) -> Result<Digest> {
    trace!(%dir, "Writing tree");
    let mut entries = Vec::new();

    for entry in listing.list(dir)? {
        let entry = entry?;
        if exclude.contains(&entry.name.as_str()) {
            trace!(path = %entry.path, "Skipping excluded entry");
            continue;
        }

        let (mode, oid) = match entry.kind {
            EntryKind::File(mode) => {
                let data = listing.read_file(&entry.path)?;
                (mode, Blob::new(data).store(database)?)
            }
            EntryKind::Symlink => {
                let target = listing.read_link(&entry.path)?;
                (FileMode::SYMLINK, Blob::new(target).store(database)?)
            }
            EntryKind::Directory => {
                trace!(path = %entry.path, "Traversing subtree");
                (FileMode::DIRECTORY, write_tree(database, listing, &entry.path, &[])?)
            }
        };
        trace!(path = %entry.path, %oid, "Found entry");
        entries.push(TreeEntry::new(entry.name, mode, oid));
    }

    let tree = Tree::new(entries);
    let oid = database.write(&tree.format())?;
    debug!(%dir, %oid, entries = tree.entries().len(), "Stored tree");
    Ok(oid)
}
