use impulse_core::db::{open_db, open_db_in_memory};
use impulse_core::{
    Goal, GoalStore, GoalValidationError, SqliteGoalStore, StoreError, HISTORY_LIMIT, MAX_COUNT,
};
use rusqlite::params;

#[test]
fn load_on_fresh_database_is_empty() {
    let mut conn = open_db_in_memory().unwrap();
    let store = SqliteGoalStore::try_new(&mut conn).unwrap();
    assert!(store.load().unwrap().is_empty());
}

#[test]
fn save_and_load_roundtrip_preserves_history() {
    let mut conn = open_db_in_memory().unwrap();
    let mut store = SqliteGoalStore::try_new(&mut conn).unwrap();

    let mut goal = Goal::new("smoking").unwrap();
    goal.record_increment(1_000);
    goal.record_increment(2_000);
    store.save(&goal).unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded, vec![goal]);
}

#[test]
fn save_overwrites_existing_record() {
    let mut conn = open_db_in_memory().unwrap();
    let mut store = SqliteGoalStore::try_new(&mut conn).unwrap();

    let mut goal = Goal::new("nails").unwrap();
    store.save(&goal).unwrap();
    goal.record_increment(10);
    goal.record_increment(20);
    goal.revert_increment(30);
    store.save(&goal).unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].count, 1);
    assert_eq!(loaded[0].history, vec![10]);
    assert_eq!(loaded[0].updated_at, 30);
}

#[test]
fn load_preserves_creation_order() {
    let mut conn = open_db_in_memory().unwrap();
    let mut store = SqliteGoalStore::try_new(&mut conn).unwrap();

    let names = ["b-second", "a-first", "c-third"];
    for (offset, name) in names.iter().enumerate() {
        let goal = Goal::with_id(uuid::Uuid::new_v4(), name, 100 + offset as i64).unwrap();
        store.save(&goal).unwrap();
    }

    let loaded: Vec<String> = store.load().unwrap().into_iter().map(|g| g.name).collect();
    assert_eq!(loaded, names);
}

#[test]
fn delete_removes_goal_and_events_and_ignores_missing() {
    let mut conn = open_db_in_memory().unwrap();
    {
        let mut store = SqliteGoalStore::try_new(&mut conn).unwrap();
        let mut goal = Goal::new("snacks").unwrap();
        goal.record_increment(5);
        store.save(&goal).unwrap();

        store.delete(goal.id).unwrap();
        store.delete(goal.id).unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    let events: i64 = conn
        .query_row("SELECT COUNT(*) FROM goal_events;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(events, 0);
}

#[test]
fn counts_beyond_history_limit_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("impulse.sqlite3");

    let mut goal = Goal::new("coffee").unwrap();
    for at in 0..(HISTORY_LIMIT as i64 * 2) {
        goal.record_increment(at);
    }
    {
        let mut conn = open_db(&path).unwrap();
        let mut store = SqliteGoalStore::try_new(&mut conn).unwrap();
        store.save(&goal).unwrap();
    }

    let mut conn = open_db(&path).unwrap();
    let store = SqliteGoalStore::try_new(&mut conn).unwrap();
    let loaded = store.load().unwrap();
    assert_eq!(loaded[0].count, HISTORY_LIMIT as u64 * 2);
    assert_eq!(loaded[0].history.len(), HISTORY_LIMIT);
}

#[test]
fn negative_count_is_reported_as_corrupt() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO goals (id, name, count, created_at, updated_at) VALUES (?1, 'x', -4, 0, 0);",
        params![uuid::Uuid::new_v4().to_string()],
    )
    .unwrap();

    let store = SqliteGoalStore::try_new(&mut conn).unwrap();
    let err = store.load().unwrap_err();
    assert!(err.is_corrupt());
    assert!(matches!(err, StoreError::Corrupt(message) if message.contains("negative count")));
}

#[test]
fn invalid_uuid_is_reported_as_corrupt() {
    let mut conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO goals (id, name, count, created_at, updated_at) VALUES ('nope', 'x', 0, 0, 0);",
        [],
    )
    .unwrap();

    let store = SqliteGoalStore::try_new(&mut conn).unwrap();
    assert!(store.load().unwrap_err().is_corrupt());
}

#[test]
fn more_events_than_count_is_reported_as_corrupt() {
    let mut conn = open_db_in_memory().unwrap();
    let id = uuid::Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO goals (id, name, count, created_at, updated_at) VALUES (?1, 'x', 1, 0, 0);",
        params![id],
    )
    .unwrap();
    for seq in 0..3 {
        conn.execute(
            "INSERT INTO goal_events (goal_id, seq, occurred_at) VALUES (?1, ?2, 0);",
            params![id, seq],
        )
        .unwrap();
    }

    let store = SqliteGoalStore::try_new(&mut conn).unwrap();
    assert!(store.load().unwrap_err().is_corrupt());
}

#[test]
fn unmigrated_connection_is_rejected() {
    let mut conn = rusqlite::Connection::open_in_memory().unwrap();
    let err = SqliteGoalStore::try_new(&mut conn).err().unwrap();
    assert!(err.is_corrupt());
}

#[test]
fn count_above_storage_range_is_refused_without_corruption() {
    let mut conn = open_db_in_memory().unwrap();
    let mut store = SqliteGoalStore::try_new(&mut conn).unwrap();

    let mut goal = Goal::new("coffee").unwrap();
    goal.count = MAX_COUNT + 1;
    let err = store.save(&goal).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Invalid(GoalValidationError::CountOutOfRange(_))
    ));
    assert!(!err.is_corrupt());
    assert!(store.load().unwrap().is_empty());
}
