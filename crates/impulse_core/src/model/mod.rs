//! Domain model for tracked goals.
//!
//! # Responsibility
//! - Define canonical data structures used by the registry and counter engine.
//!
//! # Invariants
//! - Every goal is identified by a stable `GoalId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod goal;
