//! JSON request and response shapes served by the settlement API.
//!
//! Field names follow the wire format clients already speak: snake_case everywhere except the
//! legacy slot settlement endpoint, which keeps its camelCase body.

use serde::{Deserialize, Serialize};

use crate::casino::{
    GameHistoryRecord, GameType, LeaderboardEntry, PlayerId, PlayerKind, PlayerStats, RoundOutcome,
};

/// Maximum number of history records returned by one query.
pub const MAX_HISTORY_LIMIT: usize = 100;

/// History records returned when no limit is given.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    #[serde(default)]
    pub guest: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub player: PlayerId,
    pub token: String,
    pub expires_at_ms: u64,
    pub balance: u64,
    pub kind: PlayerKind,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub player: PlayerId,
    pub balance: u64,
    pub active_round: Option<u64>,
    pub stats: PlayerStats,
    /// Settlements accepted in memory but not yet written to storage.
    pub unsynced: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BonusResponse {
    pub balance: u64,
    pub bonus: u64,
    pub persisted: bool,
}

/// Opens a round. `payload` is the game's hex-encoded opening move (its selection).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StartRoundRequest {
    pub game: GameType,
    pub bet: u64,
    #[serde(default)]
    pub payload: String,
}

/// Advances a multi-step round. `payload` is hex-encoded.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MoveRequest {
    #[serde(default)]
    pub payload: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoundResponse {
    pub round_id: u64,
    pub game: GameType,
    pub bet: u64,
    /// Hex commitment to the round seed, fixed before any draw.
    pub commit: String,
    /// Hex round seed; only present once the round is complete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reveal: Option<String>,
    /// Display state while the round is in progress.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<RoundOutcome>,
    pub balance: u64,
    pub persisted: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotSettlementRequest {
    pub bet_amount: u64,
    pub symbols: Vec<String>,
    pub special_count: u8,
    pub win_amount: u64,
    #[serde(default)]
    pub game_data: serde_json::Value,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotSettlementResponse {
    pub success: bool,
    pub balance: u64,
    pub win_amount: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub seq: u64,
    pub game_type: String,
    pub round_id: Option<u64>,
    pub bet_amount: u64,
    pub win_amount: u64,
    pub balance_before: u64,
    pub balance_after: u64,
    pub game_data: serde_json::Value,
    pub timestamp: u64,
}

impl From<&GameHistoryRecord> for HistoryEntry {
    fn from(record: &GameHistoryRecord) -> Self {
        Self {
            seq: record.seq,
            game_type: record.game_type.clone(),
            round_id: record.round_id,
            bet_amount: record.bet_amount,
            win_amount: record.win_amount,
            balance_before: record.balance_before,
            balance_after: record.balance_after,
            game_data: serde_json::from_str(&record.game_data)
                .unwrap_or(serde_json::Value::Null),
            timestamp: record.timestamp,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub records: Vec<HistoryEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub entries: Vec<LeaderboardEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_settlement_request_uses_camel_case() {
        let body = r#"{"betAmount":50,"symbols":["diamond","cherry","diamond","lemon","diamond","star"],"specialCount":3,"winAmount":250,"gameData":{"respins":2}}"#;
        let request: SlotSettlementRequest = serde_json::from_str(body).expect("parse body");
        assert_eq!(request.bet_amount, 50);
        assert_eq!(request.symbols.len(), 6);
        assert_eq!(request.special_count, 3);
        assert_eq!(request.win_amount, 250);
        assert_eq!(request.game_data["respins"], 2);

        let response = SlotSettlementResponse {
            success: true,
            balance: 700,
            win_amount: 250,
        };
        let json = serde_json::to_value(&response).expect("serialize");
        assert_eq!(json["winAmount"], 250);
        assert_eq!(json["balance"], 700);
    }

    #[test]
    fn test_start_round_request_accepts_game_labels() {
        let request: StartRoundRequest =
            serde_json::from_str(r#"{"game":"slots","bet":10}"#).expect("parse alias");
        assert_eq!(request.game, GameType::Slots);
        assert!(request.payload.is_empty());

        let request: StartRoundRequest =
            serde_json::from_str(r#"{"game":"video_poker","bet":10,"payload":"00"}"#)
                .expect("parse");
        assert_eq!(request.game, GameType::VideoPoker);
    }

    #[test]
    fn test_history_entry_parses_game_data() {
        let record = GameHistoryRecord {
            user_id: PlayerId(1),
            seq: 0,
            game_type: "dice".into(),
            round_id: Some(4),
            bet_amount: 100,
            win_amount: 198,
            balance_before: 1000,
            balance_after: 1098,
            game_data: r#"{"roll":40}"#.into(),
            timestamp: 5,
        };
        let entry = HistoryEntry::from(&record);
        assert_eq!(entry.game_data["roll"], 40);

        let broken = GameHistoryRecord {
            game_data: "not json".into(),
            ..record
        };
        assert!(HistoryEntry::from(&broken).game_data.is_null());
    }
}
