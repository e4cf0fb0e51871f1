//! Domain model for user records.
//!
//! # Responsibility
//! - Define canonical data structures used by store, mirror and API layers.
//!
//! # Invariants
//! - Every record is identified by a `RecordKey` unique within the store.
//! - Record fields are opaque to core logic.

pub mod record;
