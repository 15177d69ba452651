use std::fs::File;
use std::io::{Read, Write};
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use tracing::*;

use crate::digest::DigestProvider;
use crate::error::IoContext;
use crate::storable::Object;
use crate::util;
use crate::{Digest, Error, Result};

/// The content-addressed object store.
///
/// Objects live under `root` at `xx/yyyy...`, where `xx` is the first two characters of the hex
/// id. The store treats every object as an opaque byte sequence.
pub struct Database {
    root: Utf8PathBuf,
    digest: Arc<dyn DigestProvider>,
}

impl Database {
    /// Open the store rooted at `root`, usually `.lgit/objects`.
    ///
    /// Runs the provider's self-test once.
    pub fn open(root: impl AsRef<Utf8Path>, digest: Arc<dyn DigestProvider>) -> Result<Self> {
        digest.self_test()?;
        trace!(root = %root.as_ref(), algorithm = digest.name(), "Opened object store");
        Ok(Self {
            root: root.as_ref().to_owned(),
            digest,
        })
    }

    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    pub fn digest_provider(&self) -> &dyn DigestProvider {
        &*self.digest
    }

    /// Hash `content` without storing it.
    pub fn hash(&self, content: &[u8]) -> Result<Digest> {
        let oid = self.digest.digest(content);
        if oid.len() != self.digest.output_len() {
            return Err(Error::Digest(format!(
                "{} returned {} bytes, expected {}",
                self.digest.name(),
                oid.len(),
                self.digest.output_len()
            )));
        }
        Ok(oid)
    }

    /// Store `content` under its digest. Writing content that is already present is a no-op.
    pub fn write(&self, content: &[u8]) -> Result<Digest> {
        let oid = self.hash(content)?;
        let object_path = self.object_path(&oid)?;

        if object_path.is_file() {
            trace!(%oid, "Object already present");
            return Ok(oid);
        }
        trace!(%oid, len = content.len(), "Writing object to database");

        let dirname = object_path
            .parent()
            .ok_or_else(|| Error::NotFound(format!("parent of {object_path}")))?;

        if !dirname.is_dir() {
            std::fs::create_dir_all(dirname).at(dirname)?;
        }

        let temp_path = dirname.join(util::tmp_file_name());

        let written = (|| -> std::io::Result<()> {
            let mut file = File::options()
                .write(true)
                .create_new(true)
                .open(&temp_path)?;
            file.write_all(content)?;
            file.sync_all()?;
            drop(file);
            std::fs::rename(&temp_path, &object_path)
        })();

        if let Err(e) = written {
            if let Err(cleanup) = std::fs::remove_file(&temp_path) {
                debug!(path = %temp_path, error = %cleanup, "Could not remove temporary object");
            }
            return Err(Error::Io {
                path: object_path,
                source: e,
            });
        }

        Ok(oid)
    }

    /// Read the object `oid` into `buf`, returning the number of bytes read.
    pub fn read(&self, oid: &Digest, buf: &mut [u8]) -> Result<usize> {
        trace!(%oid, "Reading object from database");
        let object_path = self.object_path(oid)?;

        let mut file = File::open(&object_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(oid.to_hex()),
            _ => Error::Io {
                path: object_path.clone(),
                source: e,
            },
        })?;

        let len = file.metadata().at(&object_path)?.len();
        let len = usize::try_from(len).map_err(|_| Error::BufferTooSmall {
            oid: oid.to_hex(),
            needed: usize::MAX,
            available: buf.len(),
        })?;
        if len > buf.len() {
            return Err(Error::BufferTooSmall {
                oid: oid.to_hex(),
                needed: len,
                available: buf.len(),
            });
        }

        file.read_exact(&mut buf[..len]).at(&object_path)?;
        Ok(len)
    }

    /// Read the full object `oid` into a new buffer.
    pub fn read_to_vec(&self, oid: &Digest) -> Result<Vec<u8>> {
        trace!(%oid, "Reading object from database");
        let object_path = self.object_path(oid)?;
        std::fs::read(&object_path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(oid.to_hex()),
            _ => Error::Io {
                path: object_path,
                source: e,
            },
        })
    }

    /// Read and split the object `oid` into kind and payload.
    pub fn load(&self, oid: &Digest) -> Result<Object> {
        Object::parse(oid, self.read_to_vec(oid)?)
    }

    pub fn exists(&self, oid: &Digest) -> bool {
        self.object_path(oid).map(|p| p.is_file()).unwrap_or(false)
    }

    fn object_path(&self, oid: &Digest) -> Result<Utf8PathBuf> {
        if oid.len() != self.digest.output_len() {
            return Err(Error::InvalidObjectId(oid.to_hex()));
        }
        let mut x = self.root.to_owned();
        let oid = oid.to_hex();
        let (prefix, suffix) = oid.split_at(2);
        debug_assert_eq!(prefix.len(), 2);
        x.push(prefix);
        x.push(suffix);
        Ok(x)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;
    use tempdir::TempDir;

    use crate::digest::{Algorithm, Sha1Provider};
    use crate::storable::{frame, ObjectKind};

    use super::*;

    fn open(dir: &TempDir) -> Result<Database> {
        let root = Utf8Path::from_path(dir.path()).unwrap().join("objects");
        Database::open(root, Arc::new(Sha1Provider))
    }

    fn count_files(root: &Utf8Path) -> usize {
        walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .count()
    }

    #[test]
    fn test_write_then_read() -> Result<()> {
        let dir = TempDir::new("").unwrap();
        let database = open(&dir)?;

        let payloads: [&[u8]; 4] = [b"", b"blob 3\0abc", b"\0\0\0", &[0xa5; 10_000]];
        for payload in payloads {
            let oid = database.write(payload)?;
            let mut buf = vec![0u8; payload.len()];
            let n = database.read(&oid, &mut buf)?;
            assert_eq!(&buf[..n], payload);
            assert_eq!(database.read_to_vec(&oid)?, payload);
        }
        Ok(())
    }

    #[test]
    fn test_layout() -> Result<()> {
        let dir = TempDir::new("").unwrap();
        let database = open(&dir)?;

        let oid = database.write(b"blob 3\0abc")?;
        assert_eq!(oid.to_hex(), "f2ba8f84ab5c1bce84a7b441cb1959cfc7093b7f");
        assert!(database
            .root()
            .join("f2/ba8f84ab5c1bce84a7b441cb1959cfc7093b7f")
            .is_file());
        Ok(())
    }

    #[test]
    fn test_write_is_idempotent() -> Result<()> {
        let dir = TempDir::new("").unwrap();
        let database = open(&dir)?;

        let first = database.write(b"blob 6\0hello\n")?;
        let second = database.write(b"blob 6\0hello\n")?;
        assert_eq!(first, second);
        assert_eq!(count_files(database.root()), 1);
        Ok(())
    }

    #[test]
    fn test_read_missing() -> Result<()> {
        let dir = TempDir::new("").unwrap();
        let database = open(&dir)?;

        let oid = Digest::from_str("0123456789012345678901234567890123456789")?;
        let mut buf = [0u8; 64];
        assert!(matches!(database.read(&oid, &mut buf), Err(Error::NotFound(_))));
        assert!(matches!(database.load(&oid), Err(Error::NotFound(_))));
        assert!(!database.exists(&oid));
        Ok(())
    }

    #[test]
    fn test_buffer_too_small() -> Result<()> {
        let dir = TempDir::new("").unwrap();
        let database = open(&dir)?;

        let oid = database.write(b"blob 3\0abc")?;
        let mut buf = [0u8; 9];
        assert!(matches!(
            database.read(&oid, &mut buf),
            Err(Error::BufferTooSmall {
                needed: 10,
                available: 9,
                ..
            })
        ));
        let mut buf = [0u8; 10];
        assert_eq!(database.read(&oid, &mut buf)?, 10);
        Ok(())
    }

    #[test]
    fn test_wrong_length_id() -> Result<()> {
        let dir = TempDir::new("").unwrap();
        let database = open(&dir)?;
        let oid = Algorithm::Sha256.provider().digest(b"abc");
        assert!(matches!(
            database.read_to_vec(&oid),
            Err(Error::InvalidObjectId(_))
        ));
        Ok(())
    }

    #[test]
    fn test_no_temporary_files_left() -> Result<()> {
        let dir = TempDir::new("").unwrap();
        let database = open(&dir)?;
        for i in 0..32u8 {
            database.write(&frame(ObjectKind::Blob, &[i]))?;
        }
        let leftovers = walkdir::WalkDir::new(database.root())
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("tmp_obj_"))
            .count();
        assert_eq!(leftovers, 0);
        assert_eq!(count_files(database.root()), 32);
        Ok(())
    }

    #[test]
    fn test_load() -> Result<()> {
        let dir = TempDir::new("").unwrap();
        let database = open(&dir)?;
        let oid = database.write(b"blob 3\0abc")?;
        let object = database.load(&oid)?;
        assert_eq!(object.kind(), ObjectKind::Blob);
        assert_eq!(object.data(), b"abc");
        Ok(())
    }

    #[test]
    fn test_failing_provider() {
        struct Broken;
        impl DigestProvider for Broken {
            fn name(&self) -> &'static str {
                "broken"
            }
            fn output_len(&self) -> usize {
                20
            }
            fn digest(&self, _: &[u8]) -> Digest {
                Digest::from_bytes(&[0; 4])
            }
            fn known_vector(&self) -> &'static str {
                "a9993e364706816aba3e25717850c26c9cd0d89d"
            }
        }

        let dir = TempDir::new("").unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap().join("objects");
        assert!(matches!(
            Database::open(root, Arc::new(Broken)),
            Err(Error::Digest(_))
        ));
    }

    #[test]
    /// The store root sits below a regular file, so the fan-out directory can't be created.
    fn test_failed_write_leaves_nothing_behind() -> Result<()> {
        let dir = TempDir::new("").unwrap();
        let base = Utf8Path::from_path(dir.path()).unwrap();
        std::fs::write(base.join("blocker"), "not a directory").unwrap();
        let database = Database::open(base.join("blocker/objects"), Arc::new(Sha1Provider))?;

        let content = b"blob 3\0abc";
        let result = database.write(content);
        assert!(matches!(result, Err(Error::Io { .. })), "{result:?}");

        let oid = database.hash(content)?;
        assert!(!database.exists(&oid));
        let leftovers = walkdir::WalkDir::new(base)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with("tmp_obj_"))
            .count();
        assert_eq!(leftovers, 0);
        Ok(())
    }

    #[test]
    /// Something other than a file at an object's final name doesn't count as the object.
    fn test_write_over_directory_fails() -> Result<()> {
        let dir = TempDir::new("").unwrap();
        let database = open(&dir)?;

        let content = b"blob 3\0abc";
        let oid = database.hash(content)?;
        std::fs::create_dir_all(
            database
                .root()
                .join("f2/ba8f84ab5c1bce84a7b441cb1959cfc7093b7f"),
        )
        .unwrap();
        assert!(!database.exists(&oid));

        let result = database.write(content);
        assert!(matches!(result, Err(Error::Io { .. })), "{result:?}");
        Ok(())
    }

    #[test]
    /// A provider that passes its self-test but later returns a short digest is caught on write.
    fn test_short_digest_on_write() -> Result<()> {
        struct Truncating;
        impl DigestProvider for Truncating {
            fn name(&self) -> &'static str {
                "truncating"
            }
            fn output_len(&self) -> usize {
                20
            }
            fn digest(&self, data: &[u8]) -> Digest {
                let full = Sha1Provider.digest(data);
                if data == b"abc" {
                    full
                } else {
                    Digest::from_bytes(&full[..4])
                }
            }
            fn known_vector(&self) -> &'static str {
                Sha1Provider.known_vector()
            }
        }

        let dir = TempDir::new("").unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap().join("objects");
        let database = Database::open(&root, Arc::new(Truncating))?;

        assert!(matches!(
            database.write(b"blob 3\0abc"),
            Err(Error::Digest(_))
        ));
        assert!(!root.exists());
        Ok(())
    }
}
