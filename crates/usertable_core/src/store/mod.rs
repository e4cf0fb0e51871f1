//! Session state container for user records.

pub mod record_store;
