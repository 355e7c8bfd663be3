use axum::{
    extract::{rejection::JsonRejection, Path, Query, State as AxumState},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use commonware_utils::{from_hex, hex};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, warn};
use vcasino_execution::{
    casino::slots::SymbolKind, verify_commit_reveal_slices, CommitRevealError, LedgerError,
    RoundUpdate, SlotSubmission,
};
use vcasino_types::{
    api::{
        BalanceResponse, BonusResponse, ErrorResponse, HistoryEntry, HistoryResponse,
        LeaderboardResponse, MoveRequest, RegisterRequest, RegisterResponse, RoundResponse,
        SlotSettlementRequest, SlotSettlementResponse, StartRoundRequest, DEFAULT_HISTORY_LIMIT,
        MAX_HISTORY_LIMIT,
    },
    casino::{
        PlayerId, ERROR_INSUFFICIENT_BALANCE, ERROR_INVALID_SELECTION, ERROR_PERSISTENCE_FAILURE,
        ERROR_UNAUTHORIZED, MAX_GAME_DATA_LENGTH,
    },
};

use crate::Server;

/// Error body returned by every endpoint.
pub(super) struct ApiError {
    status: StatusCode,
    code: u8,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, code: u8, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ERROR_INVALID_SELECTION, message)
    }

    fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            ERROR_UNAUTHORIZED,
            "missing or invalid bearer token",
        )
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        let status = match &err {
            LedgerError::InsufficientBalance { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            LedgerError::InvalidBet
            | LedgerError::InvalidSelection(_)
            | LedgerError::InvalidPlayer(_) => StatusCode::BAD_REQUEST,
            LedgerError::Game(vcasino_execution::GameError::InvalidState)
            | LedgerError::Game(vcasino_execution::GameError::DeckExhausted) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            LedgerError::Game(_) => StatusCode::BAD_REQUEST,
            LedgerError::RoundPending(_)
            | LedgerError::PlayerExists
            | LedgerError::BonusAlreadyClaimed => StatusCode::CONFLICT,
            LedgerError::RoundNotFound | LedgerError::PlayerNotFound => StatusCode::NOT_FOUND,
            LedgerError::RoundNotOwned => StatusCode::FORBIDDEN,
            LedgerError::State(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(?err, "ledger failure");
        }
        Self::new(status, err.code(), err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
                code: self.code,
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

fn authenticate(server: &Server, headers: &HeaderMap) -> Result<PlayerId, ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .ok_or_else(ApiError::unauthorized)?;
    server.authenticate(token).ok_or_else(ApiError::unauthorized)
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::bad_request(rejection.body_text()))
}

fn decode_payload(payload: &str) -> Result<Vec<u8>, ApiError> {
    if payload.is_empty() {
        return Ok(Vec::new());
    }
    from_hex(payload).ok_or_else(|| ApiError::bad_request("payload must be hex"))
}

fn round_response(update: RoundUpdate, persisted: bool) -> RoundResponse {
    let (reveal, outcome) = match update.settlement {
        Some(settlement) => (settlement.reveal.map(|r| hex(&r)), Some(settlement.outcome)),
        None => (None, None),
    };
    RoundResponse {
        round_id: update.round_id,
        game: update.game_type,
        bet: update.bet,
        commit: hex(&update.commit),
        reveal,
        view: update.view,
        outcome,
        balance: update.balance,
        persisted,
    }
}

#[derive(Serialize)]
struct HealthzResponse {
    ok: bool,
}

/// Basic health check endpoint
pub(super) async fn healthz() -> Response {
    Json(HealthzResponse { ok: true }).into_response()
}

pub(super) async fn register(
    AxumState(server): AxumState<Arc<Server>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<RegisterResponse> {
    let request = body(payload)?;
    let registration = server.register(request.name, request.guest).await?;
    Ok(Json(RegisterResponse {
        player: registration.player.id,
        token: registration.token,
        expires_at_ms: registration.expires_at_ms,
        balance: registration.player.balance,
        kind: registration.player.kind,
    }))
}

pub(super) async fn balance(
    AxumState(server): AxumState<Arc<Server>>,
    headers: HeaderMap,
) -> ApiResult<BalanceResponse> {
    let id = authenticate(&server, &headers)?;
    let player = server.player(id).await?;
    Ok(Json(BalanceResponse {
        player: player.id,
        balance: player.balance,
        active_round: player.active_session,
        stats: player.stats,
        unsynced: server.unsynced(),
    }))
}

pub(super) async fn claim_bonus(
    AxumState(server): AxumState<Arc<Server>>,
    headers: HeaderMap,
) -> ApiResult<BonusResponse> {
    let id = authenticate(&server, &headers)?;
    let applied = server.claim_bonus(id).await?;
    Ok(Json(BonusResponse {
        balance: applied.value.player.balance,
        bonus: applied.value.bonus,
        persisted: applied.persisted,
    }))
}

pub(super) async fn start_round(
    AxumState(server): AxumState<Arc<Server>>,
    headers: HeaderMap,
    payload: Result<Json<StartRoundRequest>, JsonRejection>,
) -> ApiResult<RoundResponse> {
    let id = authenticate(&server, &headers)?;
    let request = body(payload)?;
    let payload = decode_payload(&request.payload)?;
    let applied = server
        .start_round(id, request.game, request.bet, &payload)
        .await?;
    Ok(Json(round_response(applied.value, applied.persisted)))
}

pub(super) async fn play_move(
    AxumState(server): AxumState<Arc<Server>>,
    Path(round_id): Path<u64>,
    headers: HeaderMap,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> ApiResult<RoundResponse> {
    let id = authenticate(&server, &headers)?;
    let request = body(payload)?;
    let payload = decode_payload(&request.payload)?;
    let applied = server.play_move(id, round_id, &payload).await?;
    Ok(Json(round_response(applied.value, applied.persisted)))
}

pub(super) async fn get_round(
    AxumState(server): AxumState<Arc<Server>>,
    Path(round_id): Path<u64>,
    headers: HeaderMap,
) -> ApiResult<RoundResponse> {
    let id = authenticate(&server, &headers)?;
    let update = server.round(id, round_id).await?;
    Ok(Json(round_response(update, false)))
}

/// Settle a slot spin played on the client.
///
/// Only registered players may use it. The error statuses are those the client already expects:
/// anything the player got wrong (including an unaffordable bet) is a 400, and a failed write is a
/// 500.
pub(super) async fn play_slots(
    AxumState(server): AxumState<Arc<Server>>,
    headers: HeaderMap,
    payload: Result<Json<SlotSettlementRequest>, JsonRejection>,
) -> ApiResult<SlotSettlementResponse> {
    let id = authenticate(&server, &headers)?;
    if server.player(id).await?.is_guest() {
        return Err(ApiError::unauthorized());
    }
    let request = body(payload)?;
    if request.bet_amount == 0 {
        return Err(ApiError::bad_request("betAmount must be positive"));
    }
    let symbols = request
        .symbols
        .iter()
        .map(|symbol| symbol.parse::<SymbolKind>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| ApiError::bad_request(err.to_string()))?;
    let game_data = request.game_data.to_string();
    if game_data.len() > MAX_GAME_DATA_LENGTH {
        return Err(ApiError::bad_request("gameData too large"));
    }
    let submission = SlotSubmission {
        bet: request.bet_amount,
        symbols,
        special_count: request.special_count,
        win_amount: request.win_amount,
        game_data,
    };

    let applied = match server.settle_slots(id, submission).await {
        Ok(applied) => applied,
        Err(LedgerError::InsufficientBalance { balance, bet }) => {
            return Err(ApiError::new(
                StatusCode::BAD_REQUEST,
                ERROR_INSUFFICIENT_BALANCE,
                format!("insufficient balance: have {balance}, bet {bet}"),
            ));
        }
        Err(err) => return Err(err.into()),
    };
    if server.persistence_enabled() && !applied.persisted {
        warn!(player = %id, "slot settlement accepted but not stored");
        return Err(ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ERROR_PERSISTENCE_FAILURE,
            "failed to store settlement",
        ));
    }
    Ok(Json(SlotSettlementResponse {
        success: true,
        balance: applied.value.player.balance,
        win_amount: applied.value.outcome.win_amount,
    }))
}

#[derive(Deserialize)]
pub(super) struct HistoryQuery {
    limit: Option<usize>,
}

pub(super) async fn history(
    AxumState(server): AxumState<Arc<Server>>,
    headers: HeaderMap,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<HistoryResponse> {
    let id = authenticate(&server, &headers)?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(1, MAX_HISTORY_LIMIT);
    let records = server.history(id, limit).await?;
    Ok(Json(HistoryResponse {
        records: records.iter().map(HistoryEntry::from).collect(),
    }))
}

pub(super) async fn leaderboard(
    AxumState(server): AxumState<Arc<Server>>,
) -> ApiResult<LeaderboardResponse> {
    let leaderboard = server.leaderboard().await?;
    Ok(Json(LeaderboardResponse {
        entries: leaderboard.entries,
    }))
}

#[derive(Deserialize)]
pub(super) struct VerifyRequest {
    commit: String,
    reveal: String,
}

#[derive(Serialize)]
pub(super) struct VerifyResponse {
    valid: bool,
}

/// Check a published commitment against a revealed round seed.
pub(super) async fn verify(
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> ApiResult<VerifyResponse> {
    let request = body(payload)?;
    let commit = from_hex(&request.commit).ok_or_else(|| ApiError::bad_request("commit must be hex"))?;
    let reveal = from_hex(&request.reveal).ok_or_else(|| ApiError::bad_request("reveal must be hex"))?;
    match verify_commit_reveal_slices(&commit, &reveal) {
        Ok(_) => Ok(Json(VerifyResponse { valid: true })),
        Err(CommitRevealError::VerificationFailed) => Ok(Json(VerifyResponse { valid: false })),
        Err(err) => Err(ApiError::bad_request(err.to_string())),
    }
}
