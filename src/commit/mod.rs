mod history;
mod parse;

pub use history::Ancestors;

use std::io::Write;

use tracing::debug;

use crate::database::Database;
use crate::storable::{ObjectKind, Storable};
use crate::{Digest, Error, Result};

/// A point in history: one tree snapshot and at most one predecessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    tree_id: Digest,
    parent: Option<Digest>,
    author: String,
    committer: String,
    message: String,
}

impl Commit {
    /// Build a commit, checking that it can be encoded canonically.
    ///
    /// `message` must end with exactly one `\n`; it is stored verbatim. `author` and `committer`
    /// are opaque identity lines such as `Jane Doe <jane@example.com> 1658312219 +0100`.
    pub fn new(
        tree_id: Digest,
        parent: Option<Digest>,
        author: impl Into<String>,
        committer: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Self> {
        let message = message.into();
        if !message.ends_with('\n') || message.ends_with("\n\n") {
            return Err(Error::InvalidMessage);
        }

        let author = author.into();
        let committer = committer.into();
        for ident in [&author, &committer] {
            if ident.contains('\n') {
                return Err(Error::InvalidIdent(ident.clone()));
            }
        }

        Ok(Self {
            tree_id,
            parent,
            author,
            committer,
            message,
        })
    }

    pub fn tree_id(&self) -> &Digest {
        &self.tree_id
    }

    pub fn parent(&self) -> Option<&Digest> {
        self.parent.as_ref()
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn committer(&self) -> &str {
        &self.committer
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Load and decode the commit `oid`.
    pub fn load(database: &Database, oid: &Digest) -> Result<Self> {
        let object = database.load(oid)?;
        if object.kind() != ObjectKind::Commit {
            return Err(Error::corrupt(
                oid,
                format!("expected a commit, found a {}", object.kind()),
            ));
        }
        Self::parse(oid, object.data())
    }

    pub fn pretty_print(&self, out: &mut impl Write) -> std::io::Result<()> {
        out.write_all(&self.payload())
    }
}

impl Storable for Commit {
    const KIND: ObjectKind = ObjectKind::Commit;

    fn payload(&self) -> Vec<u8> {
        let mut data = format!("tree {:x}\n", self.tree_id);
        if let Some(parent) = &self.parent {
            data.push_str(&format!("parent {parent:x}\n"));
        }
        data.push_str(&format!(
            "author {}\ncommitter {}\n\n{}",
            self.author, self.committer, self.message
        ));
        data.into_bytes()
    }
}

/// Record a commit of `tree_id` on top of `parent`.
///
/// Neither `tree_id` nor `parent` has to exist in the store.
pub fn create_commit(
    database: &Database,
    tree_id: &Digest,
    parent: Option<&Digest>,
    author: &str,
    committer: &str,
    message: &str,
) -> Result<Digest> {
    let commit = Commit::new(
        tree_id.clone(),
        parent.cloned(),
        author,
        committer,
        message,
    )?;
    let oid = database.write(&commit.format())?;
    debug!(%oid, tree = %tree_id, parent = ?parent.map(Digest::to_hex), "Stored commit");
    Ok(oid)
}
