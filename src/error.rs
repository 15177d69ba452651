use camino::Utf8PathBuf;

/// Errors surfaced by the object store and the encoders built on top of it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A path or object id that was asked for does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    #[error("I/O error on '{path}': {source}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A destination buffer is too small for the hex rendering of a digest.
    #[error("destination holds {available} bytes but {needed} are required")]
    InvalidLength { needed: usize, available: usize },

    /// A read buffer is too small for the stored object.
    #[error("object {oid} is {needed} bytes but the buffer holds {available}")]
    BufferTooSmall {
        oid: String,
        needed: usize,
        available: usize,
    },

    #[error("commit message must end with exactly one newline")]
    InvalidMessage,

    /// Author or committer line that would break the commit's line structure.
    #[error("invalid identity line: {0:?}")]
    InvalidIdent(String),

    /// The hashing primitive misbehaved. Treated as an environment fault.
    #[error("digest error: {0}")]
    Digest(String),

    #[error("invalid object id: {0:?}")]
    InvalidObjectId(String),

    /// A stored object could not be decoded.
    #[error("corrupt object {oid}: {reason}")]
    Corrupt { oid: String, reason: String },

    #[error("path is not valid UTF-8: {0}")]
    NonUtf8Path(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Wrap an I/O error with the path it happened on. Missing files become
    /// [`Error::NotFound`].
    pub(crate) fn io(path: impl Into<Utf8PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::NotFound(path.into_string())
        } else {
            Error::Io { path, source }
        }
    }

    pub(crate) fn corrupt(oid: impl std::fmt::LowerHex, reason: impl Into<String>) -> Self {
        Error::Corrupt {
            oid: format!("{oid:x}"),
            reason: reason.into(),
        }
    }
}

/// Attach a path to an `io::Result`, in the spirit of `eyre::WrapErr`.
pub(crate) trait IoContext<T> {
    fn at(self, path: impl Into<Utf8PathBuf>) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn at(self, path: impl Into<Utf8PathBuf>) -> Result<T> {
        self.map_err(|e| Error::io(path, e))
    }
}
