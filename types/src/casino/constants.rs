/// Maximum name length for player registration
pub const MAX_NAME_LENGTH: usize = 32;

/// Maximum payload length for game moves
pub const MAX_PAYLOAD_LENGTH: usize = 256;

/// Maximum state blob length for an in-flight round
pub const MAX_STATE_BLOB_LENGTH: usize = 1024;

/// Maximum serialized `game_data` length kept on a history record
pub const MAX_GAME_DATA_LENGTH: usize = 16 * 1024;

/// Canonical starting balance for new players (registered and guest alike)
pub const DEFAULT_BALANCE: u64 = 10_000;

/// Chips granted by the once-per-day bonus
pub const DAILY_BONUS: u64 = 1_000;

/// Milliseconds in one bonus day (UTC)
pub const MS_PER_DAY: u64 = 86_400_000;

/// Smallest accepted bet
pub const MIN_BET: u64 = 1;

/// Number of leaderboard entries retained
pub const LEADERBOARD_SIZE: usize = 10;

/// Error codes carried in API error bodies
pub const ERROR_PLAYER_ALREADY_REGISTERED: u8 = 1;
pub const ERROR_PLAYER_NOT_FOUND: u8 = 2;
pub const ERROR_INSUFFICIENT_BALANCE: u8 = 3;
pub const ERROR_INVALID_BET: u8 = 4;
pub const ERROR_ROUND_PENDING: u8 = 5;
pub const ERROR_ROUND_NOT_FOUND: u8 = 6;
pub const ERROR_ROUND_NOT_OWNED: u8 = 7;
pub const ERROR_ROUND_COMPLETE: u8 = 8;
pub const ERROR_INVALID_MOVE: u8 = 9;
pub const ERROR_RATE_LIMITED: u8 = 10;
pub const ERROR_INVALID_SELECTION: u8 = 11;
pub const ERROR_BONUS_ALREADY_CLAIMED: u8 = 12;
pub const ERROR_UNAUTHORIZED: u8 = 15;
pub const ERROR_PERSISTENCE_FAILURE: u8 = 16;
pub const ERROR_INTERNAL: u8 = 17;
