//! Cascade deletion.
//!
//! The store does not cascade; this crate sequences dependent-row removal
//! explicitly so a delete can never leave orphaned submissions behind.

#![warn(missing_docs)]

pub mod deletion;

pub use deletion::{BasicDeletionCoordinator, DeletionCoordinator};
