use tracing::trace;

use crate::database::Database;
use crate::{Digest, Result};

use super::Commit;

/// Walks parent links from a starting commit back to its root.
pub struct Ancestors<'a> {
    database: &'a Database,
    next: Option<Digest>,
}

impl<'a> Ancestors<'a> {
    pub fn new(database: &'a Database, start: Digest) -> Self {
        Self {
            database,
            next: Some(start),
        }
    }
}

impl Iterator for Ancestors<'_> {
    type Item = Result<(Digest, Commit)>;

    fn next(&mut self) -> Option<Self::Item> {
        let oid = self.next.take()?;
        trace!(%oid, "Visiting commit");
        match Commit::load(self.database, &oid) {
            Ok(commit) => {
                self.next = commit.parent().cloned();
                Some(Ok((oid, commit)))
            }
            Err(e) => Some(Err(e)),
        }
    }
}
