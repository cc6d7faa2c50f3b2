//! Importers for goal state written by earlier releases.

pub mod legacy_json;
