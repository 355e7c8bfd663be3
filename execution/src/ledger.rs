//! Balance ledger.
//!
//! The ledger is the only writer of player balances. A round is opened by validating the bet,
//! resolving the opening move and deducting the bet in one step, so no two rounds can be started
//! against the same funds. When the round completes the win is credited and (for registered
//! players) a history record is appended in the same batch of writes.
//!
//! All writes for one operation are staged and committed with a single [`State::apply`]; a rejected
//! operation leaves state untouched.

use commonware_utils::hex;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};
use vcasino_types::{
    casino::{
        GameHistoryRecord, GameSession, GameType, Leaderboard, Player, PlayerId,
        PlayerInvariantError, PlayerKind, RoundOutcome, DAILY_BONUS, DAILY_BONUS_LABEL,
        DEFAULT_BALANCE, ERROR_BONUS_ALREADY_CLAIMED, ERROR_INSUFFICIENT_BALANCE, ERROR_INTERNAL,
        ERROR_INVALID_BET, ERROR_INVALID_MOVE, ERROR_INVALID_SELECTION,
        ERROR_PLAYER_ALREADY_REGISTERED, ERROR_PLAYER_NOT_FOUND, ERROR_ROUND_COMPLETE,
        ERROR_ROUND_NOT_FOUND, ERROR_ROUND_NOT_OWNED, ERROR_ROUND_PENDING, MAX_GAME_DATA_LENGTH,
        MAX_PAYLOAD_LENGTH, MIN_BET, MS_PER_DAY,
    },
    execution::{Key, Value},
};

use crate::{
    casino::{self, crash, slots, GameError, GameResult, GameRng},
    fairness::{round_rng, HashChain, COMMIT_REVEAL_LEN},
    state::{
        load_counter, load_history, load_leaderboard, load_player, load_session, next_counter,
        raise_counter, Staged, State,
    },
};

/// Check that `bet` may be placed against `balance`.
pub fn validate(balance: u64, bet: u64) -> Result<(), LedgerError> {
    if bet < MIN_BET {
        return Err(LedgerError::InvalidBet);
    }
    if bet > balance {
        return Err(LedgerError::InsufficientBalance { balance, bet });
    }
    Ok(())
}

/// `balance - bet + win` for a validated bet.
pub fn apply(balance: u64, bet: u64, win: u64) -> u64 {
    balance.saturating_sub(bet).saturating_add(win)
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("insufficient balance: have {balance}, bet {bet}")]
    InsufficientBalance { balance: u64, bet: u64 },
    #[error("bet below minimum")]
    InvalidBet,
    #[error("invalid selection: {0}")]
    InvalidSelection(String),
    #[error(transparent)]
    Game(GameError),
    #[error("round {0} is still in progress")]
    RoundPending(u64),
    #[error("round not found")]
    RoundNotFound,
    #[error("round belongs to another player")]
    RoundNotOwned,
    #[error("player not found")]
    PlayerNotFound,
    #[error("player already exists")]
    PlayerExists,
    #[error("invalid player: {0}")]
    InvalidPlayer(#[from] PlayerInvariantError),
    #[error("daily bonus already claimed today")]
    BonusAlreadyClaimed,
    #[error("state error: {0:#}")]
    State(#[from] anyhow::Error),
}

impl From<GameError> for LedgerError {
    fn from(err: GameError) -> Self {
        match err {
            GameError::InvalidSelection(reason) => Self::InvalidSelection(reason.to_string()),
            GameError::InvalidPayload => Self::InvalidSelection("invalid payload".to_string()),
            other => Self::Game(other),
        }
    }
}

impl LedgerError {
    /// Numeric error code shared with clients.
    pub fn code(&self) -> u8 {
        match self {
            Self::InsufficientBalance { .. } => ERROR_INSUFFICIENT_BALANCE,
            Self::InvalidBet => ERROR_INVALID_BET,
            Self::InvalidSelection(_) | Self::InvalidPlayer(_) => ERROR_INVALID_SELECTION,
            Self::Game(GameError::RoundComplete) => ERROR_ROUND_COMPLETE,
            Self::Game(GameError::InvalidState) | Self::Game(GameError::DeckExhausted) => {
                ERROR_INTERNAL
            }
            Self::Game(_) => ERROR_INVALID_MOVE,
            Self::RoundPending(_) => ERROR_ROUND_PENDING,
            Self::RoundNotFound => ERROR_ROUND_NOT_FOUND,
            Self::RoundNotOwned => ERROR_ROUND_NOT_OWNED,
            Self::PlayerNotFound => ERROR_PLAYER_NOT_FOUND,
            Self::PlayerExists => ERROR_PLAYER_ALREADY_REGISTERED,
            Self::BonusAlreadyClaimed => ERROR_BONUS_ALREADY_CLAIMED,
            Self::State(_) => ERROR_INTERNAL,
        }
    }
}

#[derive(Clone, Debug)]
pub struct LedgerConfig {
    /// Starting balance for new players.
    pub default_balance: u64,
    /// Amount credited by a daily bonus claim.
    pub daily_bonus: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            default_balance: DEFAULT_BALANCE,
            daily_bonus: DAILY_BONUS,
        }
    }
}

/// Result of a completed round or other balance change.
#[derive(Clone, Debug)]
pub struct Settlement {
    pub outcome: RoundOutcome,
    /// Player after the change; this is what the persistence layer writes.
    pub player: Player,
    /// History record appended for registered players.
    pub record: Option<GameHistoryRecord>,
    /// Round seed, disclosed once the round is over.
    pub reveal: Option<[u8; COMMIT_REVEAL_LEN]>,
}

/// State of a round after an operation on it.
#[derive(Clone, Debug)]
pub struct RoundUpdate {
    pub round_id: u64,
    pub game_type: GameType,
    pub bet: u64,
    pub commit: [u8; COMMIT_REVEAL_LEN],
    /// Balance after the operation.
    pub balance: u64,
    /// What the player may see of a round still in progress.
    pub view: Option<serde_json::Value>,
    pub settlement: Option<Settlement>,
}

/// A daily bonus credit.
#[derive(Clone, Debug)]
pub struct BonusClaim {
    pub bonus: u64,
    pub player: Player,
    pub record: Option<GameHistoryRecord>,
}

/// A slot spin resolved by the client and submitted for settlement.
#[derive(Clone, Debug)]
pub struct SlotSubmission {
    pub bet: u64,
    pub symbols: Vec<slots::SymbolKind>,
    pub special_count: u8,
    pub win_amount: u64,
    pub game_data: String,
}

/// What a settlement writes into history.
struct SettleInput<'a> {
    game_type: GameType,
    round_id: Option<u64>,
    bet: u64,
    game_data: &'a str,
}

pub struct Ledger<S: State> {
    state: S,
    chain: HashChain,
    config: LedgerConfig,
}

impl<S: State> Ledger<S> {
    pub fn new(state: S, chain: HashChain, config: LedgerConfig) -> Self {
        Self {
            state,
            chain,
            config,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Create a player with the configured starting balance.
    pub async fn register(
        &mut self,
        name: String,
        kind: PlayerKind,
        now_ms: u64,
    ) -> Result<Player, LedgerError> {
        let mut staged = Staged::new(&self.state);
        let mut player =
            Player::with_balance(PlayerId(0), name, kind, self.config.default_balance, now_ms);
        player.validate_invariants()?;
        player.id = PlayerId(next_counter(&mut staged, Key::PlayerCounter).await?);
        staged
            .insert(Key::Player(player.id), Value::Player(player.clone()))
            .await?;
        let changes = staged.into_changes();
        self.state.apply(changes).await?;
        info!(
            player = %player.id,
            guest = player.is_guest(),
            balance = player.balance,
            "player registered"
        );
        Ok(player)
    }

    /// Load a previously persisted player and their history.
    ///
    /// Sessions are not persisted, so a round left open at shutdown is dropped here.
    pub async fn restore(
        &mut self,
        mut player: Player,
        history: Vec<GameHistoryRecord>,
    ) -> Result<(), LedgerError> {
        if load_player(&self.state, player.id).await?.is_some() {
            return Err(LedgerError::PlayerExists);
        }
        let mut staged = Staged::new(&self.state);
        if let Some(round_id) = player.active_session.take() {
            warn!(player = %player.id, round_id, "dropping round left open at shutdown");
        }
        let (history, stray): (Vec<_>, Vec<_>) = history
            .into_iter()
            .partition(|record| record.user_id == player.id);
        if !stray.is_empty() {
            warn!(player = %player.id, stray = stray.len(), "ignoring history of other players");
        }
        player.history_len = player
            .history_len
            .max(history.iter().map(|r| r.seq.saturating_add(1)).max().unwrap_or(0));
        let next_round = history
            .iter()
            .filter_map(|r| r.round_id)
            .max()
            .map_or(1, |id| id.saturating_add(1));
        for record in history {
            staged
                .insert(Key::History(player.id, record.seq), Value::History(record))
                .await?;
        }
        raise_counter(&mut staged, Key::RoundCounter, next_round).await?;
        raise_counter(&mut staged, Key::PlayerCounter, player.id.0.saturating_add(1)).await?;
        if !player.is_guest() {
            let mut leaderboard = load_leaderboard(&staged).await?;
            leaderboard.update(&player);
            staged
                .insert(Key::Leaderboard, Value::Leaderboard(leaderboard))
                .await?;
        }
        staged
            .insert(Key::Player(player.id), Value::Player(player))
            .await?;
        let changes = staged.into_changes();
        self.state.apply(changes).await?;
        Ok(())
    }

    /// Round id the next round will be given.
    pub async fn next_round_id(&self) -> Result<u64, LedgerError> {
        Ok(load_counter(&self.state, &Key::RoundCounter).await?)
    }

    /// Make sure no round id below `next` is handed out again.
    ///
    /// Round seeds are derived from the round id, so ids used before a restart must stay retired.
    pub async fn reserve_round_ids(&mut self, next: u64) -> Result<(), LedgerError> {
        let mut staged = Staged::new(&self.state);
        raise_counter(&mut staged, Key::RoundCounter, next).await?;
        let changes = staged.into_changes();
        self.state.apply(changes).await?;
        Ok(())
    }

    pub async fn player(&self, id: PlayerId) -> Result<Player, LedgerError> {
        load_player(&self.state, id)
            .await?
            .ok_or(LedgerError::PlayerNotFound)
    }

    pub async fn leaderboard(&self) -> Result<Leaderboard, LedgerError> {
        Ok(load_leaderboard(&self.state).await?)
    }

    /// Most recent history records of a player, newest first.
    pub async fn history(
        &self,
        id: PlayerId,
        limit: usize,
    ) -> Result<Vec<GameHistoryRecord>, LedgerError> {
        let player = self.player(id).await?;
        let mut records = Vec::with_capacity(limit.min(player.history_len as usize));
        for seq in (0..player.history_len).rev().take(limit) {
            if let Some(record) = load_history(&self.state, id, seq).await? {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Validate the bet, open a round and resolve its opening move.
    pub async fn begin_round(
        &mut self,
        player_id: PlayerId,
        game_type: GameType,
        bet: u64,
        payload: &[u8],
        now_ms: u64,
    ) -> Result<RoundUpdate, LedgerError> {
        self.begin_round_with(player_id, game_type, bet, payload, now_ms, casino::start_game)
            .await
    }

    pub(crate) async fn begin_round_with<F>(
        &mut self,
        player_id: PlayerId,
        game_type: GameType,
        bet: u64,
        payload: &[u8],
        now_ms: u64,
        resolve: F,
    ) -> Result<RoundUpdate, LedgerError>
    where
        F: FnOnce(&mut GameSession, &[u8], &mut GameRng) -> Result<GameResult, GameError>,
    {
        if payload.len() > MAX_PAYLOAD_LENGTH {
            return Err(LedgerError::InvalidSelection("payload too long".to_string()));
        }
        let mut staged = Staged::new(&self.state);
        let mut player = load_player(&staged, player_id)
            .await?
            .ok_or(LedgerError::PlayerNotFound)?;
        if let Some(pending) = player.active_session {
            return Err(LedgerError::RoundPending(pending));
        }
        validate(player.balance, bet)?;

        let round_id = next_counter(&mut staged, Key::RoundCounter).await?;
        let pair = self.chain.generate(round_id);
        let mut session = GameSession::new(round_id, player_id, game_type, bet, now_ms);
        session.commit = pair.commit;

        let mut rng = round_rng(&pair.reveal, round_id, 0);
        let result = match resolve(&mut session, payload, &mut rng) {
            Ok(result) => result,
            Err(err) => {
                warn!(
                    player = %player_id,
                    game_type = %game_type,
                    bet,
                    ?err,
                    "round rejected"
                );
                return Err(err.into());
            }
        };
        player.balance -= bet;
        info!(
            player = %player_id,
            session_id = round_id,
            game_type = %game_type,
            bet,
            "round started"
        );

        let update = match result {
            GameResult::Continue(view) => {
                player.active_session = Some(round_id);
                let balance = player.balance;
                staged
                    .insert(Key::Player(player_id), Value::Player(player))
                    .await?;
                staged
                    .insert(Key::Session(round_id), Value::Session(session.clone()))
                    .await?;
                round_update(&session, balance, Some(view), None)
            }
            GameResult::Complete(outcome) => {
                let settlement =
                    settle_round(&mut staged, player, &session, outcome, pair.reveal, now_ms)
                        .await?;
                round_update(&session, settlement.player.balance, None, Some(settlement))
            }
        };
        let changes = staged.into_changes();
        self.state.apply(changes).await?;
        Ok(update)
    }

    /// Advance a multi-step round.
    pub async fn play_move(
        &mut self,
        player_id: PlayerId,
        round_id: u64,
        payload: &[u8],
        now_ms: u64,
    ) -> Result<RoundUpdate, LedgerError> {
        if payload.len() > MAX_PAYLOAD_LENGTH {
            return Err(LedgerError::InvalidSelection("payload too long".to_string()));
        }
        let mut staged = Staged::new(&self.state);
        let mut session = load_session(&staged, round_id)
            .await?
            .ok_or(LedgerError::RoundNotFound)?;
        if session.player != player_id {
            return Err(LedgerError::RoundNotOwned);
        }
        let player = load_player(&staged, player_id)
            .await?
            .ok_or(LedgerError::PlayerNotFound)?;

        // Crash moves are timed by the server clock, never the client.
        let payload = if session.game_type == GameType::Crash {
            crash::stamp_elapsed(payload, now_ms.saturating_sub(session.created_at))?
        } else {
            payload.to_vec()
        };

        session.move_count += 1;
        let reveal = self.chain.derive_reveal(round_id);
        let mut rng = round_rng(&reveal, round_id, session.move_count);
        let result = match casino::process_game_move(&mut session, &payload, &mut rng) {
            Ok(result) => result,
            Err(err) => {
                warn!(
                    player = %player_id,
                    session_id = round_id,
                    game_type = %session.game_type,
                    payload_len = payload.len(),
                    ?err,
                    "move rejected"
                );
                return Err(err.into());
            }
        };
        debug!(
            player = %player_id,
            session_id = round_id,
            game_type = %session.game_type,
            move_count = session.move_count,
            "move processed"
        );

        let update = match result {
            GameResult::Continue(view) => {
                staged
                    .insert(Key::Session(round_id), Value::Session(session.clone()))
                    .await?;
                round_update(&session, player.balance, Some(view), None)
            }
            GameResult::Complete(outcome) => {
                let settlement =
                    settle_round(&mut staged, player, &session, outcome, reveal, now_ms).await?;
                round_update(&session, settlement.player.balance, None, Some(settlement))
            }
        };
        let changes = staged.into_changes();
        self.state.apply(changes).await?;
        Ok(update)
    }

    /// Current view of an open round.
    pub async fn round(&self, player_id: PlayerId, round_id: u64) -> Result<RoundUpdate, LedgerError> {
        let session = load_session(&self.state, round_id)
            .await?
            .ok_or(LedgerError::RoundNotFound)?;
        if session.player != player_id {
            return Err(LedgerError::RoundNotOwned);
        }
        let player = self.player(player_id).await?;
        let view = casino::view_game(&session)?;
        Ok(round_update(&session, player.balance, Some(view), None))
    }

    /// Credit the daily bonus, once per UTC day.
    pub async fn claim_daily_bonus(
        &mut self,
        player_id: PlayerId,
        now_ms: u64,
    ) -> Result<BonusClaim, LedgerError> {
        let mut staged = Staged::new(&self.state);
        let mut player = load_player(&staged, player_id)
            .await?
            .ok_or(LedgerError::PlayerNotFound)?;
        if !player.can_claim_bonus(now_ms) {
            return Err(LedgerError::BonusAlreadyClaimed);
        }
        let bonus = self.config.daily_bonus;
        let balance_before = player.balance;
        player.balance = apply(balance_before, 0, bonus);
        player.last_bonus_day = Some(now_ms / MS_PER_DAY);

        let record = if player.is_guest() {
            None
        } else {
            let record = next_record(
                &mut player,
                DAILY_BONUS_LABEL.to_string(),
                None,
                0,
                bonus,
                balance_before,
                "{}".to_string(),
                now_ms,
            );
            staged
                .insert(
                    Key::History(player_id, record.seq),
                    Value::History(record.clone()),
                )
                .await?;
            Some(record)
        };
        staged
            .insert(Key::Player(player_id), Value::Player(player.clone()))
            .await?;
        let changes = staged.into_changes();
        self.state.apply(changes).await?;
        info!(player = %player_id, bonus, balance = player.balance, "daily bonus claimed");
        Ok(BonusClaim {
            bonus,
            player,
            record,
        })
    }

    /// Settle a client-submitted slot spin after recomputing its payout.
    ///
    /// The declared special count and win amount must match what the symbols pay.
    pub async fn settle_slot_submission(
        &mut self,
        player_id: PlayerId,
        submission: SlotSubmission,
        now_ms: u64,
    ) -> Result<Settlement, LedgerError> {
        if submission.bet < MIN_BET {
            return Err(LedgerError::InvalidBet);
        }
        if submission.symbols.len() != slots::REEL_COUNT {
            return Err(LedgerError::InvalidSelection(format!(
                "expected {} symbols",
                slots::REEL_COUNT
            )));
        }
        if submission.game_data.len() > MAX_GAME_DATA_LENGTH {
            return Err(LedgerError::InvalidSelection("game data too long".to_string()));
        }
        let mut staged = Staged::new(&self.state);
        let mut player = load_player(&staged, player_id)
            .await?
            .ok_or(LedgerError::PlayerNotFound)?;
        if let Some(pending) = player.active_session {
            return Err(LedgerError::RoundPending(pending));
        }
        validate(player.balance, submission.bet)?;

        let special_count = slots::count_specials(&submission.symbols);
        if special_count != submission.special_count {
            warn!(
                player = %player_id,
                declared = submission.special_count,
                actual = special_count,
                "slot submission special count mismatch"
            );
            return Err(LedgerError::InvalidSelection(
                "special count does not match symbols".to_string(),
            ));
        }
        let win = slots::payout(submission.bet, special_count);
        if win != submission.win_amount {
            warn!(
                player = %player_id,
                declared = submission.win_amount,
                actual = win,
                "slot submission win amount mismatch"
            );
            return Err(LedgerError::InvalidSelection(
                "win amount does not match symbols".to_string(),
            ));
        }

        let classification = slots::SlotClassification::from_special_count(special_count);
        let symbols: Vec<&str> = submission.symbols.iter().map(|s| s.as_str()).collect();
        let outcome = RoundOutcome::new(
            GameType::Slots,
            classification.label(),
            win,
            json!({ "symbols": symbols, "specialCount": special_count }),
        );
        player.balance -= submission.bet;
        let input = SettleInput {
            game_type: GameType::Slots,
            round_id: None,
            bet: submission.bet,
            game_data: &submission.game_data,
        };
        let settlement = settle(&mut staged, player, input, outcome, None, now_ms).await?;
        let changes = staged.into_changes();
        self.state.apply(changes).await?;
        Ok(settlement)
    }
}

fn round_update(
    session: &GameSession,
    balance: u64,
    view: Option<serde_json::Value>,
    settlement: Option<Settlement>,
) -> RoundUpdate {
    RoundUpdate {
        round_id: session.id,
        game_type: session.game_type,
        bet: session.bet,
        commit: session.commit,
        balance,
        view,
        settlement,
    }
}

#[allow(clippy::too_many_arguments)]
fn next_record(
    player: &mut Player,
    game_type: String,
    round_id: Option<u64>,
    bet_amount: u64,
    win_amount: u64,
    balance_before: u64,
    game_data: String,
    timestamp: u64,
) -> GameHistoryRecord {
    let seq = player.history_len;
    player.history_len += 1;
    GameHistoryRecord {
        user_id: player.id,
        seq,
        game_type,
        round_id,
        bet_amount,
        win_amount,
        balance_before,
        balance_after: player.balance,
        game_data,
        timestamp,
    }
}

async fn settle_round<S: State>(
    state: &mut S,
    player: Player,
    session: &GameSession,
    outcome: RoundOutcome,
    reveal: [u8; COMMIT_REVEAL_LEN],
    now_ms: u64,
) -> Result<Settlement, LedgerError> {
    let game_data = json!({
        "classification": outcome.classification,
        "detail": outcome.detail,
        "commit": hex(&session.commit),
        "reveal": hex(&reveal),
    })
    .to_string();
    state.delete(&Key::Session(session.id)).await?;
    let input = SettleInput {
        game_type: session.game_type,
        round_id: Some(session.id),
        bet: session.bet,
        game_data: &game_data,
    };
    settle(state, player, input, outcome, Some(reveal), now_ms).await
}

/// Credit a resolved round whose bet was already deducted, and stage the player, history and
/// leaderboard writes.
async fn settle<S: State>(
    state: &mut S,
    mut player: Player,
    input: SettleInput<'_>,
    outcome: RoundOutcome,
    reveal: Option<[u8; COMMIT_REVEAL_LEN]>,
    now_ms: u64,
) -> Result<Settlement, LedgerError> {
    let balance_before = player.balance.saturating_add(input.bet);
    player.balance = apply(balance_before, input.bet, outcome.win_amount);
    player.active_session = None;
    player.stats.record_round(input.bet, outcome.win_amount);

    let record = if player.is_guest() {
        None
    } else {
        let record = next_record(
            &mut player,
            input.game_type.as_str().to_string(),
            input.round_id,
            input.bet,
            outcome.win_amount,
            balance_before,
            input.game_data.to_string(),
            now_ms,
        );
        state
            .insert(
                Key::History(player.id, record.seq),
                Value::History(record.clone()),
            )
            .await?;
        let mut leaderboard = load_leaderboard(state).await?;
        leaderboard.update(&player);
        state
            .insert(Key::Leaderboard, Value::Leaderboard(leaderboard))
            .await?;
        Some(record)
    };
    state
        .insert(Key::Player(player.id), Value::Player(player.clone()))
        .await?;
    info!(
        player = %player.id,
        session_id = ?input.round_id,
        game_type = %input.game_type,
        bet = input.bet,
        win = outcome.win_amount,
        balance = player.balance,
        "round settled"
    );
    Ok(Settlement {
        outcome,
        player,
        record,
        reveal,
    })
}
