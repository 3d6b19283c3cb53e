//! Storage abstraction and implementations for SkillTrack.
//!
//! The engine talks to a relational-ish store through the [`Storage`]
//! trait. Two backends are provided: an in-memory one (default, also the
//! test backend) and a SQLite one behind the `sqlite` feature. Uploaded
//! artifacts go through the separate [`FileStore`] collaborator trait.

#![warn(missing_docs)]

pub mod trait_;

#[cfg(feature = "memory")]
pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite_storage;

pub mod files;

pub use trait_::{Result, Storage, StorageError};

#[cfg(feature = "memory")]
pub use memory::MemoryStorage;

#[cfg(feature = "sqlite")]
pub use sqlite_storage::SqliteStorage;

pub use files::{allowed_file, FileStore, LocalFileStore, ALLOWED_EXTENSIONS};
