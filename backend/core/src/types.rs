use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Chat identifier. Telegram group ids are negative, so this stays signed.
pub type GroupId = i64;

pub type UserId = i64;

/// Identity of a message sender. The name is whatever was last seen for the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: UserId,
    pub name: String,
}

impl UserRef {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self { id, name: name.into() }
    }
}

impl fmt::Display for UserRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: u64,
}

/// The two leaderboards kept per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Board {
    /// Credited to the user whose message preceded the record gap.
    LastWord,
    /// Credited to the user whose message ended the record gap.
    SilenceBreaker,
}

impl Board {
    pub const ALL: [Board; 2] = [Board::LastWord, Board::SilenceBreaker];

    pub fn as_str(&self) -> &'static str {
        match self {
            Board::LastWord => "last_word",
            Board::SilenceBreaker => "silence_breaker",
        }
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Board {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "last_word" => Ok(Board::LastWord),
            "silence_breaker" => Ok(Board::SilenceBreaker),
            other => Err(format!("unknown leaderboard: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboards {
    #[serde(default)]
    pub last_word: BTreeMap<UserId, ScoreEntry>,
    #[serde(default)]
    pub silence_breaker: BTreeMap<UserId, ScoreEntry>,
}

impl Leaderboards {
    pub fn board(&self, board: Board) -> &BTreeMap<UserId, ScoreEntry> {
        match board {
            Board::LastWord => &self.last_word,
            Board::SilenceBreaker => &self.silence_breaker,
        }
    }

    fn board_mut(&mut self, board: Board) -> &mut BTreeMap<UserId, ScoreEntry> {
        match board {
            Board::LastWord => &mut self.last_word,
            Board::SilenceBreaker => &mut self.silence_breaker,
        }
    }

    /// Add one point for `user_id` and refresh the stored display name.
    pub fn increment(&mut self, board: Board, user_id: UserId, user_name: &str) {
        let entry = self
            .board_mut(board)
            .entry(user_id)
            .or_insert_with(|| ScoreEntry { name: user_name.to_string(), score: 0 });
        entry.name = user_name.to_string();
        entry.score += 1;
    }

    pub fn score(&self, board: Board, user_id: UserId) -> u64 {
        self.board(board).get(&user_id).map(|e| e.score).unwrap_or(0)
    }

    /// Highest scores first; ties broken by name so output is stable.
    pub fn top(&self, board: Board, limit: usize) -> Vec<(UserId, ScoreEntry)> {
        let mut rows: Vec<(UserId, ScoreEntry)> = self
            .board(board)
            .iter()
            .map(|(id, entry)| (*id, entry.clone()))
            .collect();
        rows.sort_by(|a, b| {
            b.1.score
                .cmp(&a.1.score)
                .then_with(|| a.1.name.cmp(&b.1.name))
                .then_with(|| a.0.cmp(&b.0))
        });
        rows.truncate(limit);
        rows
    }

    pub fn is_empty(&self) -> bool {
        self.last_word.is_empty() && self.silence_breaker.is_empty()
    }
}

/// One record-breaking event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordEntry {
    pub record_seconds: f64,
    /// Wall-clock time the record was registered, not the message time.
    pub timestamp: f64,
    pub last_user: UserRef,
    pub breaker_user: UserRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupConfig {
    #[serde(default = "default_announce")]
    pub announce_records: bool,
}

fn default_announce() -> bool {
    true
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self { announce_records: true }
    }
}

/// Everything persisted for one group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupState {
    #[serde(default)]
    pub record_seconds: Option<f64>,
    #[serde(default)]
    pub last_message_timestamp: Option<f64>,
    #[serde(default, rename = "last_user_info")]
    pub last_user: Option<UserRef>,
    #[serde(default)]
    pub leaderboards: Leaderboards,
    #[serde(default)]
    pub history: Vec<RecordEntry>,
    #[serde(default)]
    pub config: GroupConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increment_creates_then_bumps_and_renames() {
        let mut boards = Leaderboards::default();
        boards.increment(Board::LastWord, 7, "ann");
        boards.increment(Board::LastWord, 7, "Ann B.");
        let entry = &boards.last_word[&7];
        assert_eq!(entry.score, 2);
        assert_eq!(entry.name, "Ann B.");
        assert!(boards.silence_breaker.is_empty());
    }

    #[test]
    fn top_orders_by_score_then_name() {
        let mut boards = Leaderboards::default();
        for _ in 0..3 {
            boards.increment(Board::SilenceBreaker, 1, "zed");
        }
        boards.increment(Board::SilenceBreaker, 2, "bob");
        boards.increment(Board::SilenceBreaker, 3, "amy");

        let top = boards.top(Board::SilenceBreaker, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].1.name, "zed");
        assert_eq!(top[1].1.name, "amy");
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let state: GroupState = serde_json::from_str(r#"{"record_seconds": 12.5}"#).unwrap();
        assert_eq!(state.record_seconds, Some(12.5));
        assert!(state.last_message_timestamp.is_none());
        assert!(state.config.announce_records);
        assert!(state.history.is_empty());
    }

    #[test]
    fn last_user_uses_reference_key() {
        let state = GroupState {
            last_user: Some(UserRef::new(5, "eve")),
            ..Default::default()
        };
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["last_user_info"]["name"], "eve");
        assert_eq!(value["config"]["announce_records"], true);
    }

    #[test]
    fn board_parses_from_persisted_name() {
        assert_eq!("silence_breaker".parse::<Board>().unwrap(), Board::SilenceBreaker);
        assert!("loudest".parse::<Board>().is_err());
    }
}
