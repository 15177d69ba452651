use camino::Utf8Path;
use tracing::trace;

use crate::database::Database;
use crate::error::IoContext;
use crate::storable::{ObjectKind, Storable};
use crate::{Digest, Result};

pub struct Blob {
    data: Vec<u8>,
}

impl Storable for Blob {
    const KIND: ObjectKind = ObjectKind::Blob;

    fn payload(&self) -> Vec<u8> {
        self.data.clone()
    }

    fn format(&self) -> Vec<u8> {
        crate::storable::frame(Self::KIND, &self.data)
    }
}

impl Blob {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    pub fn store(&self, database: &Database) -> Result<Digest> {
        database.write(&self.format())
    }
}

/// Read the file at `path` and store it as a blob.
pub fn write_blob_from_file(database: &Database, path: &Utf8Path) -> Result<Digest> {
    trace!(%path, "Writing blob from file");
    let data = std::fs::read(path).at(path)?;
    Blob::new(data).store(database)
}
