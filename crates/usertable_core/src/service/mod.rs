//! Core use-case services.
//!
//! # Responsibility
//! - `sync_service`: remote calls and confirmed store mutations.
//! - `command_service`: user intents and their notifications.

pub mod command_service;
pub mod sync_service;
