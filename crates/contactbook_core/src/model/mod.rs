//! Contact domain model.
//!
//! # Responsibility
//! - Define the canonical contact record shared by store, snapshot and
//!   import/export paths.
//!
//! # Invariants
//! - A contact name is never empty; it is the case-insensitive unique key.
//! - Tags are held as a list in memory and comma-joined on disk.

pub mod contact;
