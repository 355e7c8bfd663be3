//! Trusted settlement service.
//!
//! The [`Server`] owns the one [`Ledger`] every balance change goes through. HTTP handlers (see
//! [`Api`]) authenticate the caller and hand the request to the server, which runs it through the
//! ledger and then pushes the resulting player snapshot to SQLite when the player is registered and
//! a database is configured.
//!
//! The ledger lock is held from the ledger call until the write is queued, so queued writes follow
//! the order of the changes they record. The SQLite write itself happens after the lock is released.

use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tracing::{info, warn};
use vcasino_execution::{
    BonusClaim, HashChain, Ledger, LedgerConfig, LedgerError, Memory, RoundUpdate, Settlement,
    SlotSubmission,
};
use vcasino_types::casino::{
    GameHistoryRecord, GameType, Leaderboard, Player, PlayerId, PlayerKind,
};

mod api;
pub use api::Api;

mod persistence;
pub use persistence::{
    Persistence, PersistenceError, PlayerWrite, Stored, StoredPlayer, UNSYNCED_WARN_THRESHOLD,
};

mod sessions;
pub use sessions::{SessionStore, DEFAULT_SESSION_TTL_MS};

pub const DEFAULT_HTTP_RATE_LIMIT_PER_SECOND: u64 = 50;
pub const DEFAULT_HTTP_RATE_LIMIT_BURST: u32 = 100;
pub const DEFAULT_HTTP_BODY_LIMIT_BYTES: usize = 64 * 1024;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub ledger: LedgerConfig,
    pub session_ttl_ms: u64,
    pub http_rate_limit_per_second: Option<u64>,
    pub http_rate_limit_burst: Option<u32>,
    pub http_body_limit_bytes: Option<usize>,
    /// Serve `POST /play-slots`, which settles spins resolved by the client.
    pub legacy_slot_endpoint: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ledger: LedgerConfig::default(),
            session_ttl_ms: DEFAULT_SESSION_TTL_MS,
            http_rate_limit_per_second: Some(DEFAULT_HTTP_RATE_LIMIT_PER_SECOND),
            http_rate_limit_burst: Some(DEFAULT_HTTP_RATE_LIMIT_BURST),
            http_body_limit_bytes: Some(DEFAULT_HTTP_BODY_LIMIT_BYTES),
            legacy_slot_endpoint: false,
        }
    }
}

/// A change applied by the ledger, and whether it has reached storage.
#[derive(Clone, Debug)]
pub struct Applied<T> {
    pub value: T,
    pub persisted: bool,
}

/// A newly registered player and their bearer token.
#[derive(Clone, Debug)]
pub struct Registration {
    pub player: Player,
    pub token: String,
    pub expires_at_ms: u64,
}

pub struct Server {
    config: ServerConfig,
    ledger: Mutex<Ledger<Memory>>,
    sessions: SessionStore,
    persistence: Option<Persistence>,
}

impl Server {
    pub fn new(config: ServerConfig, chain: HashChain, persistence: Option<Persistence>) -> Self {
        let ledger = Ledger::new(Memory::default(), chain, config.ledger.clone());
        let sessions = SessionStore::new(config.session_ttl_ms);
        Self {
            config,
            ledger: Mutex::new(ledger),
            sessions,
            persistence,
        }
    }

    pub fn now_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn persistence_enabled(&self) -> bool {
        self.persistence.is_some()
    }

    /// Writes accepted in memory but not yet stored.
    pub fn unsynced(&self) -> usize {
        self.persistence.as_ref().map_or(0, Persistence::unsynced)
    }

    /// Load what storage held at boot. Returns how many players were restored.
    pub async fn restore(&self, stored: Stored) -> Result<usize, LedgerError> {
        let mut ledger = self.ledger.lock().await;
        let mut restored = 0;
        for (player, history) in stored.players {
            let id = player.id;
            match ledger.restore(player, history).await {
                Ok(()) => restored += 1,
                Err(LedgerError::PlayerExists) => {
                    warn!(player = %id, "skipping duplicate stored player");
                }
                Err(err) => return Err(err),
            }
        }
        ledger.reserve_round_ids(stored.next_round_id).await?;
        let next_round_id = ledger.next_round_id().await?;
        info!(restored, next_round_id, "ledger restored");
        if let Some(persistence) = &self.persistence {
            persistence.reserve_round_ids(next_round_id);
        }
        Ok(restored)
    }

    /// Player behind a bearer token.
    pub fn authenticate(&self, token: &str) -> Option<PlayerId> {
        self.sessions.resolve(token, Self::now_ms())
    }

    pub async fn register(&self, name: String, guest: bool) -> Result<Registration, LedgerError> {
        let now = Self::now_ms();
        let kind = if guest {
            PlayerKind::Guest
        } else {
            PlayerKind::Registered
        };
        let (player, ticket) = {
            let mut ledger = self.ledger.lock().await;
            let player = ledger.register(name, kind, now).await?;
            let ticket = self.enqueue(&player, None);
            (player, ticket)
        };
        self.sync(ticket).await;
        let (token, expires_at_ms) = self.sessions.issue(player.id, now);
        Ok(Registration {
            player,
            token,
            expires_at_ms,
        })
    }

    pub async fn player(&self, id: PlayerId) -> Result<Player, LedgerError> {
        self.ledger.lock().await.player(id).await
    }

    pub async fn start_round(
        &self,
        player: PlayerId,
        game_type: GameType,
        bet: u64,
        payload: &[u8],
    ) -> Result<Applied<RoundUpdate>, LedgerError> {
        let now = Self::now_ms();
        let (update, ticket) = {
            let mut ledger = self.ledger.lock().await;
            let update = ledger
                .begin_round(player, game_type, bet, payload, now)
                .await?;
            if let Some(persistence) = &self.persistence {
                persistence.reserve_round_ids(ledger.next_round_id().await?);
            }
            let ticket = self.enqueue_update(&ledger, player, &update).await?;
            (update, ticket)
        };
        Ok(Applied {
            value: update,
            persisted: self.sync(ticket).await,
        })
    }

    pub async fn play_move(
        &self,
        player: PlayerId,
        round_id: u64,
        payload: &[u8],
    ) -> Result<Applied<RoundUpdate>, LedgerError> {
        let now = Self::now_ms();
        let (update, ticket) = {
            let mut ledger = self.ledger.lock().await;
            let update = ledger.play_move(player, round_id, payload, now).await?;
            let ticket = self.enqueue_update(&ledger, player, &update).await?;
            (update, ticket)
        };
        Ok(Applied {
            value: update,
            persisted: self.sync(ticket).await,
        })
    }

    pub async fn round(&self, player: PlayerId, round_id: u64) -> Result<RoundUpdate, LedgerError> {
        self.ledger.lock().await.round(player, round_id).await
    }

    pub async fn claim_bonus(&self, player: PlayerId) -> Result<Applied<BonusClaim>, LedgerError> {
        let now = Self::now_ms();
        let (claim, ticket) = {
            let mut ledger = self.ledger.lock().await;
            let claim = ledger.claim_daily_bonus(player, now).await?;
            let ticket = self.enqueue(&claim.player, claim.record.clone());
            (claim, ticket)
        };
        Ok(Applied {
            value: claim,
            persisted: self.sync(ticket).await,
        })
    }

    pub async fn settle_slots(
        &self,
        player: PlayerId,
        submission: SlotSubmission,
    ) -> Result<Applied<Settlement>, LedgerError> {
        let now = Self::now_ms();
        let (settlement, ticket) = {
            let mut ledger = self.ledger.lock().await;
            let settlement = ledger
                .settle_slot_submission(player, submission, now)
                .await?;
            let ticket = self.enqueue(&settlement.player, settlement.record.clone());
            (settlement, ticket)
        };
        Ok(Applied {
            value: settlement,
            persisted: self.sync(ticket).await,
        })
    }

    pub async fn history(
        &self,
        player: PlayerId,
        limit: usize,
    ) -> Result<Vec<GameHistoryRecord>, LedgerError> {
        self.ledger.lock().await.history(player, limit).await
    }

    pub async fn leaderboard(&self) -> Result<Leaderboard, LedgerError> {
        self.ledger.lock().await.leaderboard().await
    }

    async fn enqueue_update(
        &self,
        ledger: &Ledger<Memory>,
        player: PlayerId,
        update: &RoundUpdate,
    ) -> Result<Option<u64>, LedgerError> {
        Ok(match &update.settlement {
            Some(settlement) => self.enqueue(&settlement.player, settlement.record.clone()),
            None => {
                let stored = ledger.player(player).await?;
                self.enqueue(&stored, None)
            }
        })
    }

    fn enqueue(&self, player: &Player, record: Option<GameHistoryRecord>) -> Option<u64> {
        if player.is_guest() {
            return None;
        }
        let persistence = self.persistence.as_ref()?;
        Some(persistence.enqueue(PlayerWrite {
            player: player.clone(),
            record,
        }))
    }

    async fn sync(&self, ticket: Option<u64>) -> bool {
        let Some(persistence) = &self.persistence else {
            return false;
        };
        let persisted = persistence.sync(ticket).await;
        if persisted {
            info!(?ticket, "player write stored");
        }
        persisted
    }
}
