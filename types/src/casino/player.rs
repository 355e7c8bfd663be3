use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error as ThisError;

use super::{
    read_string, string_encode_size, write_string, DEFAULT_BALANCE, MAX_NAME_LENGTH, MS_PER_DAY,
};

/// Server-assigned player identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Write for PlayerId {
    fn write(&self, writer: &mut impl BufMut) {
        self.0.write(writer);
    }
}

impl Read for PlayerId {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self(u64::read(reader)?))
    }
}

impl FixedSize for PlayerId {
    const SIZE: usize = u64::SIZE;
}

/// Whether a player's balance is tracked remotely.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum PlayerKind {
    /// Persisted profile; every settlement produces a history record.
    Registered = 0,
    /// Local-only balance; no history, nothing persisted.
    Guest = 1,
}

impl Write for PlayerKind {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for PlayerKind {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        match u8::read(reader)? {
            0 => Ok(Self::Registered),
            1 => Ok(Self::Guest),
            i => Err(Error::InvalidEnum(i)),
        }
    }
}

impl FixedSize for PlayerKind {
    const SIZE: usize = 1;
}

/// Lifetime counters updated at every settlement.
#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlayerStats {
    pub games_played: u64,
    pub total_wagered: u64,
    pub total_won: u64,
    pub biggest_win: u64,
    /// Net result across all settled rounds, `sum(win - bet)`.
    pub total_winnings: i64,
}

impl PlayerStats {
    pub fn record_round(&mut self, bet: u64, win: u64) {
        self.games_played = self.games_played.saturating_add(1);
        self.total_wagered = self.total_wagered.saturating_add(bet);
        self.total_won = self.total_won.saturating_add(win);
        self.biggest_win = self.biggest_win.max(win);
        let net = i128::from(win) - i128::from(bet);
        let total = i128::from(self.total_winnings) + net;
        self.total_winnings = total.clamp(i64::MIN as i128, i64::MAX as i128) as i64;
    }
}

impl Write for PlayerStats {
    fn write(&self, writer: &mut impl BufMut) {
        self.games_played.write(writer);
        self.total_wagered.write(writer);
        self.total_won.write(writer);
        self.biggest_win.write(writer);
        self.total_winnings.write(writer);
    }
}

impl Read for PlayerStats {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            games_played: u64::read(reader)?,
            total_wagered: u64::read(reader)?,
            total_won: u64::read(reader)?,
            biggest_win: u64::read(reader)?,
            total_winnings: i64::read(reader)?,
        })
    }
}

impl FixedSize for PlayerStats {
    const SIZE: usize = 5 * u64::SIZE;
}

#[derive(Debug, ThisError, PartialEq, Eq)]
pub enum PlayerInvariantError {
    #[error("player name too long (len={len}, max={max})")]
    NameTooLong { len: usize, max: usize },
    #[error("player name is empty")]
    NameEmpty,
}

/// Player state for casino games.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub kind: PlayerKind,
    pub balance: u64,
    /// Round currently holding this player's funds, if any.
    pub active_session: Option<u64>,
    /// Day index (`now_ms / MS_PER_DAY`) of the last daily bonus claim.
    pub last_bonus_day: Option<u64>,
    /// Number of history records appended so far.
    pub history_len: u64,
    pub stats: PlayerStats,
    pub created_at: u64,
}

impl Player {
    pub fn new(id: PlayerId, name: String, kind: PlayerKind, created_at: u64) -> Self {
        Self::with_balance(id, name, kind, DEFAULT_BALANCE, created_at)
    }

    pub fn with_balance(
        id: PlayerId,
        name: String,
        kind: PlayerKind,
        balance: u64,
        created_at: u64,
    ) -> Self {
        Self {
            id,
            name,
            kind,
            balance,
            active_session: None,
            last_bonus_day: None,
            history_len: 0,
            stats: PlayerStats::default(),
            created_at,
        }
    }

    pub fn is_guest(&self) -> bool {
        self.kind == PlayerKind::Guest
    }

    pub fn can_claim_bonus(&self, now_ms: u64) -> bool {
        let today = now_ms / MS_PER_DAY;
        self.last_bonus_day.map_or(true, |day| day < today)
    }

    pub fn validate_invariants(&self) -> Result<(), PlayerInvariantError> {
        if self.name.is_empty() {
            return Err(PlayerInvariantError::NameEmpty);
        }
        if self.name.len() > MAX_NAME_LENGTH {
            return Err(PlayerInvariantError::NameTooLong {
                len: self.name.len(),
                max: MAX_NAME_LENGTH,
            });
        }
        Ok(())
    }
}

impl Write for Player {
    fn write(&self, writer: &mut impl BufMut) {
        self.id.write(writer);
        write_string(&self.name, writer);
        self.kind.write(writer);
        self.balance.write(writer);
        self.active_session.write(writer);
        self.last_bonus_day.write(writer);
        self.history_len.write(writer);
        self.stats.write(writer);
        self.created_at.write(writer);
    }
}

impl Read for Player {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            id: PlayerId::read(reader)?,
            name: read_string(reader, MAX_NAME_LENGTH)?,
            kind: PlayerKind::read(reader)?,
            balance: u64::read(reader)?,
            active_session: Option::<u64>::read(reader)?,
            last_bonus_day: Option::<u64>::read(reader)?,
            history_len: u64::read(reader)?,
            stats: PlayerStats::read(reader)?,
            created_at: u64::read(reader)?,
        })
    }
}

impl EncodeSize for Player {
    fn encode_size(&self) -> usize {
        self.id.encode_size()
            + string_encode_size(&self.name)
            + self.kind.encode_size()
            + self.balance.encode_size()
            + self.active_session.encode_size()
            + self.last_bonus_day.encode_size()
            + self.history_len.encode_size()
            + self.stats.encode_size()
            + self.created_at.encode_size()
    }
}
