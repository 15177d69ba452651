use crate::filemode::FileMode;
use crate::{Digest, Error, Result};

use super::{Tree, TreeEntry};

impl Tree {
    /// Parse a tree payload (no header) whose entries carry `oid_len`-byte raw digests.
    ///
    /// `oid` is only used for error messages.
    pub fn parse(oid: &Digest, mut bytes: &[u8], oid_len: usize) -> Result<Self> {
        let mut entries = Vec::new();

        while !bytes.is_empty() {
            let nul_idx = memchr::memchr(b'\0', bytes)
                .ok_or_else(|| Error::corrupt(oid, "tree entry without NUL"))?;
            let end = nul_idx + 1 + oid_len;
            if bytes.len() < end {
                return Err(Error::corrupt(oid, "truncated tree entry"));
            }
            entries.push(TreeEntry::parse(oid, &bytes[..end], nul_idx)?);
            bytes = &bytes[end..];
        }

        // Re-sorting would hide a non-canonical tree.
        let tree = Self { entries };
        if tree
            .entries
            .windows(2)
            .any(|w| w[0].name.as_bytes() >= w[1].name.as_bytes())
        {
            return Err(Error::corrupt(oid, "tree entries are not sorted"));
        }
        Ok(tree)
    }
}

impl TreeEntry {
    /// Parses an entry from the tree. Lines are of the form
    /// `<mode> <name>\0<oid>`
    fn parse(oid: &Digest, line: &[u8], nul_idx: usize) -> Result<Self> {
        let space_idx = memchr::memchr(b' ', &line[..nul_idx])
            .ok_or_else(|| Error::corrupt(oid, "tree entry without mode"))?;

        let mode = std::str::from_utf8(&line[..space_idx])
            .ok()
            .and_then(|mode| u32::from_str_radix(mode, 8).ok())
            .map(FileMode)
            .filter(|mode| mode.is_known())
            .ok_or_else(|| Error::corrupt(oid, "invalid mode in tree entry"))?;

        let name = std::str::from_utf8(&line[space_idx + 1..nul_idx])
            .map_err(|_| Error::corrupt(oid, "invalid utf-8 in tree entry name"))?
            .to_owned();
        if name.is_empty() {
            return Err(Error::corrupt(oid, "empty tree entry name"));
        }

        Ok(Self {
            name,
            mode,
            oid: Digest::from_bytes(&line[nul_idx + 1..]),
        })
    }
}
