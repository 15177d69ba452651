use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{Digest, Error, Result};

use super::Commit;

impl Commit {
    /// Parse a commit payload (no header).
    ///
    /// ## Example
    /// ```text
    /// tree 090c4c5dd61d2e84c832c4cd306b66bf2fabc1f5
    /// parent e6a49274aa0893ce2e2928589100387aee220c5b
    /// author Jamie Quigley <jamie@quigley.xyz> 1658312219 +0100
    /// committer Jamie Quigley <jamie@quigley.xyz> 1658312219 +0100
    ///
    /// Add the thing
    /// ```
    pub fn parse(oid: &Digest, bytes: &[u8]) -> Result<Self> {
        static TREEID_REGEX: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"^tree ([[:xdigit:]]+)$").unwrap());
        static PARENT_REGEX: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"^parent ([[:xdigit:]]+)$").unwrap());
        static IDENT_REGEX: Lazy<Regex> =
            Lazy::new(|| Regex::new(r"^(author|committer) (.*)$").unwrap());

        let text = std::str::from_utf8(bytes)
            .map_err(|_| Error::corrupt(oid, "commit is not valid utf-8"))?;
        let (header, message) = text
            .split_once("\n\n")
            .ok_or_else(|| Error::corrupt(oid, "commit has no message separator"))?;

        let object_id = |hex: &str| {
            Digest::from_str(hex).map_err(|_| Error::corrupt(oid, format!("bad object id {hex}")))
        };

        let mut lines = header.split('\n').peekable();

        let tree_id = lines
            .next()
            .and_then(|line| TREEID_REGEX.captures(line))
            .ok_or_else(|| Error::corrupt(oid, "tree id not found"))
            .and_then(|caps| object_id(&caps[1]))?;

        let mut parent = None;
        while let Some(caps) = lines.peek().copied().and_then(|line| PARENT_REGEX.captures(line)) {
            if parent.is_some() {
                return Err(Error::corrupt(
                    oid,
                    "commits with several parents are unsupported",
                ));
            }
            parent = Some(object_id(&caps[1])?);
            lines.next();
        }

        let mut ident = |field: &str| {
            lines
                .next()
                .and_then(|line| IDENT_REGEX.captures(line))
                .filter(|caps| &caps[1] == field)
                .map(|caps| caps[2].to_owned())
                .ok_or_else(|| Error::corrupt(oid, format!("{field} not found")))
        };
        let author = ident("author")?;
        let committer = ident("committer")?;

        if let Some(line) = lines.next() {
            return Err(Error::corrupt(oid, format!("unexpected header line {line:?}")));
        }

        Commit::new(tree_id, parent, author, committer, message)
            .map_err(|e| Error::corrupt(oid, e.to_string()))
    }
}
