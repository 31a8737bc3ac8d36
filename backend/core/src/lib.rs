pub mod clock;
pub mod error;
pub mod event;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{HushError, Result};
pub use event::{MessageEvent, Outcome};
pub use types::{
    Board, GroupConfig, GroupId, GroupState, Leaderboards, RecordEntry, ScoreEntry, UserId,
    UserRef,
};
