//! Core business logic for palaver.
//!
//! The policy-and-ledger heart of the service: who may see what (blocking,
//! community bans, moderation roles) and how votes move reputation counters
//! without ever losing an update.

pub mod services;

pub use services::*;
