//! Casino domain types.
//!
//! Defines game/session/player/history/leaderboard state and constants used by the execution layer
//! and the server.

mod codec;
mod constants;
mod game;
mod history;
mod leaderboard;
mod player;

pub use codec::{read_bytes32, read_string, string_encode_size, write_bytes32, write_string};
pub use constants::*;
pub use game::*;
pub use history::*;
pub use leaderboard::*;
pub use player::*;
