use std::fmt::Display;
use std::str::FromStr;

use crate::{Digest, Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
}

impl ObjectKind {
    pub fn tag(self) -> &'static str {
        match self {
            ObjectKind::Blob => "blob",
            ObjectKind::Tree => "tree",
            ObjectKind::Commit => "commit",
        }
    }
}

impl Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ObjectKind {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "blob" => Ok(ObjectKind::Blob),
            "tree" => Ok(ObjectKind::Tree),
            "commit" => Ok(ObjectKind::Commit),
            _ => Err(()),
        }
    }
}

/// Something with a canonical on-disk encoding.
pub trait Storable {
    const KIND: ObjectKind;

    /// The type-specific payload, without header.
    fn payload(&self) -> Vec<u8>;

    /// Returns the storable formatted `"{type} {len}\0{data}"`.
    /// e.g.
    /// a blob `"hello\n"` becomes `"blob 6\0hello\n"`
    fn format(&self) -> Vec<u8> {
        frame(Self::KIND, &self.payload())
    }
}

/// Prepend the canonical header to `payload`.
pub fn frame(kind: ObjectKind, payload: &[u8]) -> Vec<u8> {
    let mut formatted = Vec::with_capacity(payload.len() + 16);
    formatted.extend_from_slice(kind.tag().as_bytes());
    formatted.push(b' ');
    formatted.extend_from_slice(format!("{}", payload.len()).as_bytes());
    formatted.push(b'\0');
    formatted.extend_from_slice(payload);
    formatted
}

/// A stored object split into its kind and payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Object {
    kind: ObjectKind,
    data: Vec<u8>,
}

impl Object {
    /// Split raw stored bytes into kind and payload.
    ///
    /// `oid` is only used for error messages.
    pub fn parse(oid: &Digest, mut bytes: Vec<u8>) -> Result<Self> {
        let space_idx = memchr::memchr(b' ', &bytes)
            .ok_or_else(|| Error::corrupt(oid, "missing space in header"))?;
        let nul_idx = memchr::memchr(b'\0', &bytes)
            .ok_or_else(|| Error::corrupt(oid, "missing NUL in header"))?;
        if nul_idx < space_idx {
            return Err(Error::corrupt(oid, "malformed header"));
        }

        let kind = std::str::from_utf8(&bytes[..space_idx])
            .ok()
            .and_then(|tag| tag.parse::<ObjectKind>().ok())
            .ok_or_else(|| {
                Error::corrupt(
                    oid,
                    format!(
                        "unknown object type {:?}",
                        String::from_utf8_lossy(&bytes[..space_idx])
                    ),
                )
            })?;

        let len = &bytes[space_idx + 1..nul_idx];
        if len.is_empty() || !len.iter().all(u8::is_ascii_digit) || (len.len() > 1 && len[0] == b'0')
        {
            return Err(Error::corrupt(oid, "malformed length in header"));
        }
        // All ASCII digits, so this is valid UTF-8.
        let len: usize = std::str::from_utf8(len)
            .ok()
            .and_then(|len| len.parse().ok())
            .ok_or_else(|| Error::corrupt(oid, "length out of range"))?;

        let content_start = nul_idx + 1;
        if bytes.len() - content_start != len {
            return Err(Error::corrupt(
                oid,
                format!(
                    "header declares {len} bytes but payload has {}",
                    bytes.len() - content_start
                ),
            ));
        }

        bytes.drain(..content_start);
        Ok(Self { kind, data: bytes })
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}
