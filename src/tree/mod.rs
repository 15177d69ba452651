mod parse;
mod write;

pub use write::write_tree;

use std::io::Write;

use crate::filemode::FileMode;
use crate::storable::{ObjectKind, Storable};
use crate::Digest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    name: String,
    mode: FileMode,
    oid: Digest,
}

impl TreeEntry {
    pub fn new(name: impl Into<String>, mode: FileMode, oid: Digest) -> Self {
        Self {
            name: name.into(),
            mode,
            oid,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> FileMode {
        self.mode
    }

    pub fn kind(&self) -> ObjectKind {
        self.mode.object_kind()
    }

    pub fn oid(&self) -> &Digest {
        &self.oid
    }
}

/// A directory snapshot. Entries are kept sorted by name so that equal directories always
/// encode to equal bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn new(mut entries: Vec<TreeEntry>) -> Self {
        entries.sort_unstable_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));
        Self { entries }
    }

    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries
            .binary_search_by(|e| e.name.as_bytes().cmp(name.as_bytes()))
            .ok()
            .map(|idx| &self.entries[idx])
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Print the tree the way `cat-file -p` does: `<mode> <type> <oid>\t<name>`.
    pub fn pretty_print(&self, out: &mut impl Write) -> std::io::Result<()> {
        for entry in &self.entries {
            writeln!(
                out,
                "{:06o} {} {:x}\t{}",
                entry.mode.0,
                entry.kind(),
                entry.oid,
                entry.name
            )?;
        }
        Ok(())
    }
}

impl Storable for Tree {
    const KIND: ObjectKind = ObjectKind::Tree;

    /// Each entry is `<octal mode> <name>\0<raw oid>`.
    fn payload(&self) -> Vec<u8> {
        let mut data = Vec::new();
        for entry in &self.entries {
            data.extend_from_slice(format!("{:o}", entry.mode).as_bytes());
            data.push(b' ');
            data.extend_from_slice(entry.name.as_bytes());
            data.push(b'\0');
            data.extend_from_slice(&entry.oid);
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;

    use super::*;

    fn oid(hex: &str) -> Digest {
        Digest::from_str(hex).unwrap()
    }

    #[test]
    fn test_empty_tree() {
        assert_eq!(Tree::default().format(), b"tree 0\0");
    }

    #[test]
    fn test_entries_are_sorted() {
        let blob = oid("ce013625030ba8dba906f756967f9e9ca394464a");
        let a = Tree::new(vec![
            TreeEntry::new("b", FileMode::REGULAR, blob.clone()),
            TreeEntry::new("a", FileMode::REGULAR, blob.clone()),
            TreeEntry::new("B", FileMode::EXECUTABLE, blob.clone()),
        ]);
        let b = Tree::new(vec![
            TreeEntry::new("a", FileMode::REGULAR, blob.clone()),
            TreeEntry::new("B", FileMode::EXECUTABLE, blob.clone()),
            TreeEntry::new("b", FileMode::REGULAR, blob),
        ]);
        assert_eq!(a.format(), b.format());
        let names = a.entries().iter().map(|e| e.name()).collect::<Vec<_>>();
        assert_eq!(names, ["B", "a", "b"]);
    }

    #[test]
    fn test_payload() {
        let blob = oid("ce013625030ba8dba906f756967f9e9ca394464a");
        let tree = Tree::new(vec![TreeEntry::new("hello.txt", FileMode::REGULAR, blob.clone())]);

        let mut expected = b"100644 hello.txt\0".to_vec();
        expected.extend_from_slice(&blob);
        assert_eq!(tree.payload(), expected);
        assert_eq!(&tree.format()[..8], b"tree 37\0");
    }

    #[test]
    fn test_get() {
        let blob = oid("ce013625030ba8dba906f756967f9e9ca394464a");
        let tree = Tree::new(vec![
            TreeEntry::new("z", FileMode::REGULAR, blob.clone()),
            TreeEntry::new("dir", FileMode::DIRECTORY, blob.clone()),
        ]);
        assert_eq!(tree.get("dir").unwrap().kind(), ObjectKind::Tree);
        assert_eq!(tree.get("z").unwrap().kind(), ObjectKind::Blob);
        assert!(tree.get("y").is_none());
    }

    #[test]
    fn test_pretty_print() {
        let blob = oid("ce013625030ba8dba906f756967f9e9ca394464a");
        let sub = oid("4b825dc642cb6eb9a060e54bf8d69288fbee4904");
        let tree = Tree::new(vec![
            TreeEntry::new("hello", FileMode::REGULAR, blob),
            TreeEntry::new("empty", FileMode::DIRECTORY, sub),
        ]);
        let mut out = Vec::new();
        tree.pretty_print(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "040000 tree 4b825dc642cb6eb9a060e54bf8d69288fbee4904\tempty\n\
             100644 blob ce013625030ba8dba906f756967f9e9ca394464a\thello\n"
        );
    }
}
