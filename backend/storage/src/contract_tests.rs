//! The same behavioural checks run against every backend.

use hushwatch_core::{Board, GroupConfig, RecordEntry, UserRef};
use tempfile::TempDir;

use crate::{InMemoryGateway, JsonFileGateway, MessageCommit, PersistenceGateway, SqliteGateway};

fn entry(seconds: f64, last: (i64, &str), breaker: (i64, &str)) -> RecordEntry {
    RecordEntry {
        record_seconds: seconds,
        timestamp: 1_700_000_000.0,
        last_user: UserRef::new(last.0, last.1),
        breaker_user: UserRef::new(breaker.0, breaker.1),
    }
}

async fn backends(dir: &TempDir) -> Vec<Box<dyn PersistenceGateway>> {
    vec![
        Box::new(InMemoryGateway::new()),
        Box::new(JsonFileGateway::open(dir.path().join("db.json")).await),
        Box::new(SqliteGateway::in_memory().unwrap()),
    ]
}

#[tokio::test]
async fn fresh_group_has_defaults() {
    let dir = tempfile::tempdir().unwrap();
    for gateway in backends(&dir).await {
        let state = gateway.load_group(-1).await.unwrap();
        assert_eq!(state.record_seconds, None, "{}", gateway.name());
        assert_eq!(state.last_message_timestamp, None, "{}", gateway.name());
        assert_eq!(state.last_user, None, "{}", gateway.name());
        assert!(state.config.announce_records, "{}", gateway.name());
        assert!(state.leaderboards.is_empty(), "{}", gateway.name());
        assert!(state.history.is_empty(), "{}", gateway.name());
    }
}

#[tokio::test]
async fn setters_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    for gateway in backends(&dir).await {
        gateway.set_record(5, 61.5).await.unwrap();
        gateway.set_last_message_timestamp(5, 1000.25).await.unwrap();
        gateway.set_last_user(5, &UserRef::new(8, "sam")).await.unwrap();
        gateway
            .set_config(5, GroupConfig { announce_records: false })
            .await
            .unwrap();

        assert_eq!(gateway.get_record(5).await.unwrap(), Some(61.5));
        assert_eq!(gateway.get_last_message_timestamp(5).await.unwrap(), Some(1000.25));
        assert_eq!(gateway.get_last_user(5).await.unwrap(), Some(UserRef::new(8, "sam")));
        assert!(!gateway.get_config(5).await.unwrap().announce_records);
    }
}

#[tokio::test]
async fn history_keeps_append_order() {
    let dir = tempfile::tempdir().unwrap();
    for gateway in backends(&dir).await {
        gateway.append_history(3, entry(10.0, (1, "a"), (2, "b"))).await.unwrap();
        gateway.append_history(3, entry(20.0, (2, "b"), (1, "a"))).await.unwrap();
        let history = gateway.get_history(3).await.unwrap();
        let seconds: Vec<f64> = history.iter().map(|e| e.record_seconds).collect();
        assert_eq!(seconds, vec![10.0, 20.0], "{}", gateway.name());
    }
}

#[tokio::test]
async fn commit_applies_record_break() {
    let dir = tempfile::tempdir().unwrap();
    for gateway in backends(&dir).await {
        let commit = MessageCommit::tracking(1700.0, UserRef::new(2, "bea"))
            .with_record(entry(700.0, (1, "al"), (2, "bea")));
        gateway.commit(-77, &commit).await.unwrap();

        let state = gateway.load_group(-77).await.unwrap();
        assert_eq!(state.record_seconds, Some(700.0), "{}", gateway.name());
        assert_eq!(state.last_message_timestamp, Some(1700.0));
        assert_eq!(state.last_user, Some(UserRef::new(2, "bea")));
        assert_eq!(state.leaderboards.score(Board::LastWord, 1), 1);
        assert_eq!(state.leaderboards.score(Board::SilenceBreaker, 2), 1);
        assert_eq!(state.leaderboards.score(Board::SilenceBreaker, 1), 0);
        assert_eq!(state.history.len(), 1);
    }
}

#[tokio::test]
async fn tracking_commit_leaves_aggregates_alone() {
    let dir = tempfile::tempdir().unwrap();
    for gateway in backends(&dir).await {
        gateway
            .commit(4, &MessageCommit::tracking(10.0, UserRef::new(1, "a")))
            .await
            .unwrap();
        let state = gateway.load_group(4).await.unwrap();
        assert_eq!(state.last_message_timestamp, Some(10.0), "{}", gateway.name());
        assert_eq!(state.record_seconds, None);
        assert!(state.leaderboards.is_empty());
        assert!(state.history.is_empty());
    }
}

#[tokio::test]
async fn delete_resets_only_that_group() {
    let dir = tempfile::tempdir().unwrap();
    for gateway in backends(&dir).await {
        gateway.set_record(1, 5.0).await.unwrap();
        gateway.set_record(2, 6.0).await.unwrap();
        gateway
            .increment_leaderboard(1, 9, "z", Board::LastWord)
            .await
            .unwrap();
        gateway.append_history(1, entry(5.0, (9, "z"), (8, "y"))).await.unwrap();

        gateway.delete_group(1).await.unwrap();

        let state = gateway.load_group(1).await.unwrap();
        assert_eq!(state.record_seconds, None, "{}", gateway.name());
        assert!(state.leaderboards.is_empty());
        assert!(state.history.is_empty());
        assert_eq!(gateway.get_record(2).await.unwrap(), Some(6.0));
    }
}
