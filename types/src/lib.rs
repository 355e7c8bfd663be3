//! Shared types for vcasino.
//!
//! Everything that crosses a crate boundary lives here: the casino domain model (games, sessions,
//! players, history), the state keys and values the ledger reads and writes, and the JSON shapes
//! served by the HTTP API.

pub mod api;
pub mod casino;
pub mod execution;

pub use casino::{GameHistoryRecord, GameSession, GameType, Player, PlayerId, RoundOutcome};
pub use execution::{Key, Value};
