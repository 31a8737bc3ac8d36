/// SQLite-backed gateway.
///
/// Group scalars live in `groups`, leaderboard rows in `scores` and record
/// history in `history`. A processed message is committed in one transaction.
use std::path::Path;

use async_trait::async_trait;
use hushwatch_core::{
    Board, GroupConfig, GroupId, HushError, Leaderboards, RecordEntry, Result, ScoreEntry, UserId,
    UserRef,
};
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::gateway::{MessageCommit, PersistenceGateway};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS groups (
    group_id               INTEGER PRIMARY KEY,
    record_seconds         REAL,
    last_message_timestamp REAL,
    last_user_id           INTEGER,
    last_user_name         TEXT,
    announce_records       INTEGER NOT NULL DEFAULT 1
);
CREATE TABLE IF NOT EXISTS scores (
    group_id INTEGER NOT NULL,
    board    TEXT    NOT NULL,
    user_id  INTEGER NOT NULL,
    name     TEXT    NOT NULL,
    score    INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (group_id, board, user_id)
);
CREATE TABLE IF NOT EXISTS history (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    group_id          INTEGER NOT NULL,
    record_seconds    REAL    NOT NULL,
    recorded_at       REAL    NOT NULL,
    last_user_id      INTEGER NOT NULL,
    last_user_name    TEXT    NOT NULL,
    breaker_user_id   INTEGER NOT NULL,
    breaker_user_name TEXT    NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_history_group ON history(group_id);
"#;

pub struct SqliteGateway {
    conn: Mutex<Connection>,
}

impl SqliteGateway {
    /// Create or open a database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            HushError::Persistence(format!("open {}: {e}", path.display()))
        })?;
        conn.query_row("PRAGMA journal_mode=WAL", [], |_| Ok(()))
            .map_err(HushError::persistence)?;
        conn.execute_batch(SCHEMA).map_err(HushError::persistence)?;
        info!(path = %path.display(), "SQLite store opened");
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open an in-memory database (for tests).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(HushError::persistence)?;
        conn.execute_batch(SCHEMA).map_err(HushError::persistence)?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

fn ensure_group(conn: &Connection, group: GroupId) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR IGNORE INTO groups (group_id) VALUES (?1)",
        params![group],
    )?;
    Ok(())
}

fn write_tracking(
    conn: &Connection,
    group: GroupId,
    timestamp: f64,
    user: &UserRef,
) -> rusqlite::Result<()> {
    ensure_group(conn, group)?;
    conn.execute(
        "UPDATE groups SET last_message_timestamp = ?2, last_user_id = ?3, last_user_name = ?4
         WHERE group_id = ?1",
        params![group, timestamp, user.id, user.name],
    )?;
    Ok(())
}

fn write_record(conn: &Connection, group: GroupId, seconds: f64) -> rusqlite::Result<()> {
    ensure_group(conn, group)?;
    conn.execute(
        "UPDATE groups SET record_seconds = ?2 WHERE group_id = ?1",
        params![group, seconds],
    )?;
    Ok(())
}

fn bump_score(
    conn: &Connection,
    group: GroupId,
    user_id: UserId,
    user_name: &str,
    board: Board,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO scores (group_id, board, user_id, name, score) VALUES (?1, ?2, ?3, ?4, 1)
         ON CONFLICT(group_id, board, user_id) DO UPDATE SET
           score = score + 1,
           name = excluded.name",
        params![group, board.as_str(), user_id, user_name],
    )?;
    Ok(())
}

fn insert_history(conn: &Connection, group: GroupId, entry: &RecordEntry) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO history
           (group_id, record_seconds, recorded_at, last_user_id, last_user_name,
            breaker_user_id, breaker_user_name)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            group,
            entry.record_seconds,
            entry.timestamp,
            entry.last_user.id,
            entry.last_user.name,
            entry.breaker_user.id,
            entry.breaker_user.name,
        ],
    )?;
    Ok(())
}

#[async_trait]
impl PersistenceGateway for SqliteGateway {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn get_record(&self, group: GroupId) -> Result<Option<f64>> {
        let conn = self.conn.lock().await;
        ensure_group(&conn, group).map_err(HushError::persistence)?;
        conn.query_row(
            "SELECT record_seconds FROM groups WHERE group_id = ?1",
            params![group],
            |row| row.get(0),
        )
        .map_err(HushError::persistence)
    }

    async fn set_record(&self, group: GroupId, seconds: f64) -> Result<()> {
        let conn = self.conn.lock().await;
        write_record(&conn, group, seconds).map_err(HushError::persistence)
    }

    async fn get_last_message_timestamp(&self, group: GroupId) -> Result<Option<f64>> {
        let conn = self.conn.lock().await;
        ensure_group(&conn, group).map_err(HushError::persistence)?;
        conn.query_row(
            "SELECT last_message_timestamp FROM groups WHERE group_id = ?1",
            params![group],
            |row| row.get(0),
        )
        .map_err(HushError::persistence)
    }

    async fn set_last_message_timestamp(&self, group: GroupId, timestamp: f64) -> Result<()> {
        let conn = self.conn.lock().await;
        ensure_group(&conn, group).map_err(HushError::persistence)?;
        conn.execute(
            "UPDATE groups SET last_message_timestamp = ?2 WHERE group_id = ?1",
            params![group, timestamp],
        )
        .map_err(HushError::persistence)?;
        Ok(())
    }

    async fn get_last_user(&self, group: GroupId) -> Result<Option<UserRef>> {
        let conn = self.conn.lock().await;
        let row: Option<(Option<i64>, Option<String>)> = conn
            .query_row(
                "SELECT last_user_id, last_user_name FROM groups WHERE group_id = ?1",
                params![group],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(HushError::persistence)?;
        Ok(match row {
            Some((Some(id), Some(name))) => Some(UserRef { id, name }),
            _ => None,
        })
    }

    async fn set_last_user(&self, group: GroupId, user: &UserRef) -> Result<()> {
        let conn = self.conn.lock().await;
        ensure_group(&conn, group).map_err(HushError::persistence)?;
        conn.execute(
            "UPDATE groups SET last_user_id = ?2, last_user_name = ?3 WHERE group_id = ?1",
            params![group, user.id, user.name],
        )
        .map_err(HushError::persistence)?;
        Ok(())
    }

    async fn get_config(&self, group: GroupId) -> Result<GroupConfig> {
        let conn = self.conn.lock().await;
        ensure_group(&conn, group).map_err(HushError::persistence)?;
        let announce: i64 = conn
            .query_row(
                "SELECT announce_records FROM groups WHERE group_id = ?1",
                params![group],
                |row| row.get(0),
            )
            .map_err(HushError::persistence)?;
        Ok(GroupConfig { announce_records: announce != 0 })
    }

    async fn set_config(&self, group: GroupId, config: GroupConfig) -> Result<()> {
        let conn = self.conn.lock().await;
        ensure_group(&conn, group).map_err(HushError::persistence)?;
        conn.execute(
            "UPDATE groups SET announce_records = ?2 WHERE group_id = ?1",
            params![group, config.announce_records as i64],
        )
        .map_err(HushError::persistence)?;
        Ok(())
    }

    async fn get_leaderboards(&self, group: GroupId) -> Result<Leaderboards> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare("SELECT board, user_id, name, score FROM scores WHERE group_id = ?1")
            .map_err(HushError::persistence)?;
        let rows = stmt
            .query_map(params![group], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })
            .map_err(HushError::persistence)?;

        let mut boards = Leaderboards::default();
        for row in rows {
            let (board, user_id, name, score) = row.map_err(HushError::persistence)?;
            let Ok(board) = board.parse::<Board>() else {
                warn!(group_id = group, board = %board, "Skipping score row for unknown board");
                continue;
            };
            let entry = ScoreEntry { name, score: score.max(0) as u64 };
            match board {
                Board::LastWord => boards.last_word.insert(user_id, entry),
                Board::SilenceBreaker => boards.silence_breaker.insert(user_id, entry),
            };
        }
        Ok(boards)
    }

    async fn increment_leaderboard(
        &self,
        group: GroupId,
        user_id: UserId,
        user_name: &str,
        board: Board,
    ) -> Result<()> {
        let conn = self.conn.lock().await;
        bump_score(&conn, group, user_id, user_name, board).map_err(HushError::persistence)
    }

    async fn get_history(&self, group: GroupId) -> Result<Vec<RecordEntry>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn
            .prepare(
                "SELECT record_seconds, recorded_at, last_user_id, last_user_name,
                        breaker_user_id, breaker_user_name
                 FROM history WHERE group_id = ?1 ORDER BY id ASC",
            )
            .map_err(HushError::persistence)?;
        let entries = stmt
            .query_map(params![group], |row| {
                Ok(RecordEntry {
                    record_seconds: row.get(0)?,
                    timestamp: row.get(1)?,
                    last_user: UserRef { id: row.get(2)?, name: row.get(3)? },
                    breaker_user: UserRef { id: row.get(4)?, name: row.get(5)? },
                })
            })
            .map_err(HushError::persistence)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(HushError::persistence)?;
        Ok(entries)
    }

    async fn append_history(&self, group: GroupId, entry: RecordEntry) -> Result<()> {
        let conn = self.conn.lock().await;
        insert_history(&conn, group, &entry).map_err(HushError::persistence)
    }

    async fn delete_group(&self, group: GroupId) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction().map_err(HushError::persistence)?;
        for sql in [
            "DELETE FROM groups WHERE group_id = ?1",
            "DELETE FROM scores WHERE group_id = ?1",
            "DELETE FROM history WHERE group_id = ?1",
        ] {
            tx.execute(sql, params![group]).map_err(HushError::persistence)?;
        }
        tx.commit().map_err(HushError::persistence)?;
        debug!(group_id = group, "Deleted group rows");
        Ok(())
    }

    async fn commit(&self, group: GroupId, commit: &MessageCommit) -> Result<()> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction().map_err(HushError::persistence)?;
        write_tracking(&tx, group, commit.timestamp, &commit.user)
            .map_err(HushError::persistence)?;
        if let Some(entry) = &commit.record_break {
            write_record(&tx, group, entry.record_seconds).map_err(HushError::persistence)?;
            bump_score(&tx, group, entry.last_user.id, &entry.last_user.name, Board::LastWord)
                .map_err(HushError::persistence)?;
            bump_score(
                &tx,
                group,
                entry.breaker_user.id,
                &entry.breaker_user.name,
                Board::SilenceBreaker,
            )
            .map_err(HushError::persistence)?;
            insert_history(&tx, group, entry).map_err(HushError::persistence)?;
        }
        tx.commit().map_err(HushError::persistence)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn score_rows_keep_latest_name() {
        let store = SqliteGateway::in_memory().unwrap();
        store
            .increment_leaderboard(1, 10, "old", Board::LastWord)
            .await
            .unwrap();
        store
            .increment_leaderboard(1, 10, "new", Board::LastWord)
            .await
            .unwrap();
        let boards = store.get_leaderboards(1).await.unwrap();
        assert_eq!(boards.last_word[&10].score, 2);
        assert_eq!(boards.last_word[&10].name, "new");
    }

    #[tokio::test]
    async fn survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hushwatch.db");
        {
            let store = SqliteGateway::open(&path).unwrap();
            let commit = MessageCommit::tracking(50.0, UserRef::new(2, "b")).with_record(
                RecordEntry {
                    record_seconds: 40.0,
                    timestamp: 60.0,
                    last_user: UserRef::new(1, "a"),
                    breaker_user: UserRef::new(2, "b"),
                },
            );
            store.commit(-9, &commit).await.unwrap();
        }
        let store = SqliteGateway::open(&path).unwrap();
        assert_eq!(store.get_record(-9).await.unwrap(), Some(40.0));
        assert_eq!(store.get_history(-9).await.unwrap().len(), 1);
        assert_eq!(
            store.get_last_user(-9).await.unwrap(),
            Some(UserRef::new(2, "b"))
        );
    }
}
