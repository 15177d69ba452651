//! Object storage for a minimal version-control engine.
//!
//! Blobs, trees, and commits are stored under the digest of their canonical encoding,
//! `"<type> <len>\0<payload>"`. The entry points are:
//!
//! - [`write_blob_from_file`]: store one file's bytes
//! - [`write_tree`]: snapshot a directory, returning its Merkle root
//! - [`create_commit`]: record a tree and an optional parent
//! - [`Database::write`] / [`Database::read`]: raw objects by id

#[cfg(test)]
mod test;

pub mod blob;
pub mod commit;
pub mod database;
pub mod digest;
pub mod error;
pub mod filemode;
mod lock;
pub mod repo;
pub mod signature;
pub mod storable;
pub mod tree;
mod util;
pub mod workspace;

pub use blob::write_blob_from_file;
pub use commit::{create_commit, Commit};
pub use database::Database;
pub use digest::{Algorithm, Digest, DigestProvider};
pub use error::{Error, Result};
pub use repo::Repo;
pub use tree::{write_tree, Tree};
