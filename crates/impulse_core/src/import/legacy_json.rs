//! Legacy JSON state parser.
//!
//! # Responsibility
//! - Read the single-file JSON state written by the 1.x script release
//!   (`~/.impulse_control.json`).
//!
//! # Invariants
//! - Parsing is pure; persistence is left to the registry.
//! - Unknown fields (`history`, `created_at`, `last_updated`) are ignored;
//!   undo availability is recomputed from `counter`.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// File name of the legacy state file inside the user's home directory.
pub const LEGACY_STATE_FILE_NAME: &str = ".impulse_control.json";

/// One goal as recorded by the legacy format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyGoal {
    pub name: String,
    pub counter: u64,
}

#[derive(Debug, Deserialize)]
struct LegacyState {
    #[serde(default)]
    goals: BTreeMap<String, LegacyGoalRecord>,
}

#[derive(Debug, Deserialize)]
struct LegacyGoalRecord {
    #[serde(default)]
    counter: u64,
}

/// Parses legacy state JSON into goals ordered by name.
pub fn parse_legacy_state(json: &str) -> Result<Vec<LegacyGoal>, serde_json::Error> {
    let state: LegacyState = serde_json::from_str(json)?;
    Ok(state
        .goals
        .into_iter()
        .map(|(name, record)| LegacyGoal {
            name,
            counter: record.counter,
        })
        .collect())
}

/// Default legacy state location, when a home directory is known.
pub fn default_legacy_path() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(|home| PathBuf::from(home).join(LEGACY_STATE_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::{parse_legacy_state, LegacyGoal};

    #[test]
    fn parses_counters_and_ignores_extra_fields() {
        let json = r#"{
            "goals": {
                "smoking": {"counter": 3, "history": [0, 1, 2], "created_at": "2024-01-02 10:00:00"},
                "nails": {"counter": 0, "history": [], "last_updated": "2024-01-03 11:00:00"}
            }
        }"#;
        let goals = parse_legacy_state(json).unwrap();
        assert_eq!(
            goals,
            vec![
                LegacyGoal {
                    name: "nails".to_string(),
                    counter: 0
                },
                LegacyGoal {
                    name: "smoking".to_string(),
                    counter: 3
                },
            ]
        );
    }

    #[test]
    fn missing_goals_key_means_empty_state() {
        assert!(parse_legacy_state("{}").unwrap().is_empty());
    }

    #[test]
    fn negative_counter_is_rejected() {
        assert!(parse_legacy_state(r#"{"goals": {"x": {"counter": -1}}}"#).is_err());
        assert!(parse_legacy_state("not json").is_err());
    }
}
