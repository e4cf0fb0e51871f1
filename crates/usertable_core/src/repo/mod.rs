//! Local persistence contracts and implementations.
//!
//! # Responsibility
//! - Define the write-through mirror contract used by the record store.
//! - Isolate SQLite details from store and service orchestration.
//!
//! # Invariants
//! - The mirror is a cache; callers never treat it as the source of truth.

pub mod mirror_repo;
