//! SQLite persistence for registered players.
//!
//! Every balance change of a registered player is queued as a [`PlayerWrite`] (the player row plus,
//! for settlements, one history record) and written in its own transaction. Writes are applied in
//! queue order; a write that fails stays at the head of the queue and is retried before anything
//! queued after it, so the stored balance never skips a step.
//!
//! The next round id is stored alongside the players. Round seeds are derived from round ids, so
//! an id handed out before a restart must never be handed out again.

use commonware_codec::{DecodeExt, Encode};
use rusqlite::{params, Connection, OptionalExtension};
use std::{
    collections::{HashSet, VecDeque},
    path::Path,
    sync::{Arc, Mutex},
};
use thiserror::Error;
use tracing::{error, info, warn};
use vcasino_types::casino::{GameHistoryRecord, Player};

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("corrupt stored row: {0}")]
    Codec(#[from] commonware_codec::Error),
    #[error("persistence worker failed: {0}")]
    Worker(String),
    #[error("{field} {value} does not fit in a sqlite integer")]
    OutOfRange { field: &'static str, value: u64 },
}

/// Backlog size at which (and at every multiple of which) an unsynced warning is logged.
pub const UNSYNCED_WARN_THRESHOLD: usize = 1024;

const NEXT_ROUND_ID: &str = "next_round_id";

/// A player snapshot and the history record (if any) produced by the same change.
#[derive(Clone, Debug)]
pub struct PlayerWrite {
    pub player: Player,
    pub record: Option<GameHistoryRecord>,
}

/// A player loaded at boot together with their history, oldest first.
pub type StoredPlayer = (Player, Vec<GameHistoryRecord>);

/// Everything loaded from the database at boot.
#[derive(Debug, Default)]
pub struct Stored {
    pub players: Vec<StoredPlayer>,
    /// First round id that has never been handed out.
    pub next_round_id: u64,
}

#[derive(Default)]
struct Queue {
    pending: VecDeque<(u64, PlayerWrite)>,
    next_ticket: u64,
    /// Tickets whose write can never be stored.
    rejected: HashSet<u64>,
    next_round_id: u64,
    stored_round_id: u64,
}

struct Inner {
    conn: Mutex<Connection>,
    queue: Mutex<Queue>,
}

#[derive(Clone)]
pub struct Persistence {
    inner: Arc<Inner>,
}

impl Persistence {
    /// Open (or create) the database at `path` and load every stored player.
    pub fn open(path: &Path) -> Result<(Self, Stored), PersistenceError> {
        let conn = Connection::open(path)?;
        init_schema(&conn)?;
        let stored = Stored {
            players: load_players(&conn)?,
            next_round_id: load_next_round_id(&conn)?,
        };
        info!(
            path = %path.display(),
            players = stored.players.len(),
            next_round_id = stored.next_round_id,
            "player persistence opened"
        );
        let persistence = Self::from_connection(conn);
        {
            let mut queue = lock(&persistence.inner.queue);
            queue.next_round_id = stored.next_round_id;
            queue.stored_round_id = stored.next_round_id;
        }
        Ok((persistence, stored))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            inner: Arc::new(Inner {
                conn: Mutex::new(conn),
                queue: Mutex::new(Queue::default()),
            }),
        }
    }

    /// Queue a write and return its ticket.
    ///
    /// Must be called while the change it records is still the latest one for the player, so
    /// tickets follow the order in which changes were made.
    pub fn enqueue(&self, write: PlayerWrite) -> u64 {
        let mut queue = lock(&self.inner.queue);
        let ticket = queue.next_ticket;
        queue.next_ticket += 1;
        queue.pending.push_back((ticket, write));
        let backlog = queue.pending.len();
        if backlog % UNSYNCED_WARN_THRESHOLD == 0 {
            warn!(backlog, "player writes are piling up unsynced");
        }
        ticket
    }

    /// Record that round ids below `next` have been handed out. Stored on the next sync.
    pub fn reserve_round_ids(&self, next: u64) {
        let mut queue = lock(&self.inner.queue);
        queue.next_round_id = queue.next_round_id.max(next);
    }

    /// Writes accepted but not yet stored.
    pub fn unsynced(&self) -> usize {
        lock(&self.inner.queue).pending.len()
    }

    /// Flush the queue and report whether the write behind `ticket` is stored.
    ///
    /// Without a ticket this only flushes (storing the reserved round ids) and returns false.
    pub async fn sync(&self, ticket: Option<u64>) -> bool {
        let inner = self.inner.clone();
        match tokio::task::spawn_blocking(move || flush(&inner)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                error!(?err, unsynced = self.unsynced(), "player write failed; queued for retry");
            }
            Err(err) => {
                let err = PersistenceError::Worker(err.to_string());
                error!(?err, "persistence flush task failed");
            }
        }
        let Some(ticket) = ticket else {
            return false;
        };
        let mut queue = lock(&self.inner.queue);
        if queue.rejected.remove(&ticket) {
            return false;
        }
        queue
            .pending
            .front()
            .map_or(true, |(oldest, _)| *oldest > ticket)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn flush(inner: &Inner) -> Result<(), PersistenceError> {
    let mut conn = lock(&inner.conn);
    let (reserved, stored) = {
        let queue = lock(&inner.queue);
        (queue.next_round_id, queue.stored_round_id)
    };
    if reserved > stored {
        store_next_round_id(&conn, reserved)?;
        let mut queue = lock(&inner.queue);
        queue.stored_round_id = queue.stored_round_id.max(reserved);
    }
    loop {
        let next = lock(&inner.queue).pending.front().cloned();
        let Some((ticket, write)) = next else {
            return Ok(());
        };
        match store(&mut conn, &write) {
            Ok(()) => {}
            Err(err @ PersistenceError::OutOfRange { .. }) => {
                // Retrying cannot help; later writes for the player supersede the row.
                error!(?err, player = %write.player.id, ticket, "dropping unstorable player write");
                lock(&inner.queue).rejected.insert(ticket);
            }
            Err(err) => return Err(err),
        }
        let mut queue = lock(&inner.queue);
        if queue.pending.front().map(|(t, _)| *t) == Some(ticket) {
            queue.pending.pop_front();
        }
    }
}

fn sql_int(field: &'static str, value: u64) -> Result<i64, PersistenceError> {
    i64::try_from(value).map_err(|_| PersistenceError::OutOfRange { field, value })
}

fn store(conn: &mut Connection, write: &PlayerWrite) -> Result<(), PersistenceError> {
    let player = &write.player;
    let id = sql_int("player id", player.id.0)?;
    let balance = sql_int("balance", player.balance)?;
    let record = match &write.record {
        Some(record) => Some((
            sql_int("player id", record.user_id.0)?,
            sql_int("history seq", record.seq)?,
            record,
        )),
        None => None,
    };

    let tx = conn.transaction()?;
    tx.execute(
        "INSERT OR REPLACE INTO players (id, name, balance, player_bytes) VALUES (?1, ?2, ?3, ?4)",
        params![id, player.name, balance, player.encode().to_vec()],
    )?;
    if let Some((user_id, seq, record)) = record {
        tx.execute(
            "INSERT OR REPLACE INTO history (player_id, seq, game_type, record_bytes)
             VALUES (?1, ?2, ?3, ?4)",
            params![user_id, seq, record.game_type, record.encode().to_vec()],
        )?;
    }
    tx.commit()?;
    Ok(())
}

fn store_next_round_id(conn: &Connection, next: u64) -> Result<(), PersistenceError> {
    conn.execute(
        "INSERT INTO meta (key, value) VALUES (?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value = MAX(value, excluded.value)",
        params![NEXT_ROUND_ID, sql_int("round id", next)?],
    )?;
    Ok(())
}

fn load_next_round_id(conn: &Connection) -> Result<u64, PersistenceError> {
    let value = conn
        .query_row(
            "SELECT value FROM meta WHERE key = ?1",
            params![NEXT_ROUND_ID],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(value.map_or(1, |value| u64::try_from(value).unwrap_or(1).max(1)))
}

fn init_schema(conn: &Connection) -> Result<(), PersistenceError> {
    conn.execute_batch(
        "PRAGMA journal_mode=WAL;
         PRAGMA synchronous=NORMAL;
         CREATE TABLE IF NOT EXISTS players (
             id INTEGER PRIMARY KEY,
             name TEXT NOT NULL,
             balance INTEGER NOT NULL,
             player_bytes BLOB NOT NULL
         );
         CREATE TABLE IF NOT EXISTS history (
             player_id INTEGER NOT NULL,
             seq INTEGER NOT NULL,
             game_type TEXT NOT NULL,
             record_bytes BLOB NOT NULL,
             PRIMARY KEY (player_id, seq)
         );
         CREATE TABLE IF NOT EXISTS meta (
             key TEXT PRIMARY KEY,
             value INTEGER NOT NULL
         );",
    )?;
    Ok(())
}

fn load_players(conn: &Connection) -> Result<Vec<StoredPlayer>, PersistenceError> {
    let mut players = Vec::new();
    let mut stmt = conn.prepare("SELECT player_bytes FROM players ORDER BY id ASC")?;
    let rows = stmt.query_map([], |row| row.get::<_, Vec<u8>>(0))?;
    for row in rows {
        let bytes = row?;
        players.push(Player::decode(&mut bytes.as_slice())?);
    }

    let mut stmt =
        conn.prepare("SELECT record_bytes FROM history WHERE player_id = ?1 ORDER BY seq ASC")?;
    let mut stored = Vec::with_capacity(players.len());
    for player in players {
        let id = sql_int("player id", player.id.0)?;
        let rows = stmt.query_map(params![id], |row| row.get::<_, Vec<u8>>(0))?;
        let mut history = Vec::new();
        for row in rows {
            let bytes = row?;
            history.push(GameHistoryRecord::decode(&mut bytes.as_slice())?);
        }
        if history.len() as u64 != player.history_len {
            warn!(
                player = %player.id,
                stored = history.len(),
                expected = player.history_len,
                "history row count differs from player record"
            );
        }
        stored.push((player, history));
    }
    Ok(stored)
}
