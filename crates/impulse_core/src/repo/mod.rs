//! Persistence layer for goals.
//!
//! # Responsibility
//! - Define the storage contract consumed by the registry and counter engine.
//! - Isolate SQLite query details from business orchestration.
//!
//! # Invariants
//! - Storage APIs distinguish corrupt persisted data from transport errors.

pub mod goal_store;
