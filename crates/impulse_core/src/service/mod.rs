//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate storage calls into the shell-facing goal API.
//! - Keep presentation code decoupled from storage details.

pub mod counter_engine;
pub mod goal_registry;
