use std::fmt::Display;

use chrono::{DateTime, FixedOffset};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(pub DateTime<FixedOffset>);

impl Timestamp {
    pub fn now() -> Self {
        Self(chrono::offset::Local::now().into())
    }

    /// Parse a timestamp from a unix + HH + mm offset
    pub fn from_git(s: &str) -> Result<Self> {
        DateTime::parse_from_str(s, "%s %z")
            .map(Self)
            .map_err(|e| Error::InvalidIdent(format!("{s}: {e}")))
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format("%s %z"))
    }
}

/// Who made a commit, and when. Renders as the identity line stored in commits:
/// `Jane Doe <jane@example.com> 1658312219 +0100`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub email: String,
    pub when: Timestamp,
}

impl Signature {
    pub fn new(name: impl Into<String>, email: impl Into<String>, when: Timestamp) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            when,
        }
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}> {}", self.name, self.email, self.when)
    }
}
