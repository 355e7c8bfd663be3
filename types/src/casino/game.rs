use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, ReadRangeExt, Write};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use super::{read_bytes32, write_bytes32, PlayerId, MAX_STATE_BLOB_LENGTH};

/// Every game the casino can settle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum GameType {
    #[serde(rename = "diamond_slots", alias = "slots")]
    Slots = 0,
    Roulette = 1,
    Dice = 2,
    Crash = 3,
    Plinko = 4,
    Keno = 5,
    Mines = 6,
    VideoPoker = 7,
    Blackjack = 8,
    SicBo = 9,
    Wheel = 10,
    Bingo = 11,
    Quiz = 12,
    BoxOpening = 13,
    BoxBattle = 14,
    TradingCards = 15,
}

impl GameType {
    pub const ALL: [GameType; 16] = [
        Self::Slots,
        Self::Roulette,
        Self::Dice,
        Self::Crash,
        Self::Plinko,
        Self::Keno,
        Self::Mines,
        Self::VideoPoker,
        Self::Blackjack,
        Self::SicBo,
        Self::Wheel,
        Self::Bingo,
        Self::Quiz,
        Self::BoxOpening,
        Self::BoxBattle,
        Self::TradingCards,
    ];

    /// Label used in history records and API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slots => "diamond_slots",
            Self::Roulette => "roulette",
            Self::Dice => "dice",
            Self::Crash => "crash",
            Self::Plinko => "plinko",
            Self::Keno => "keno",
            Self::Mines => "mines",
            Self::VideoPoker => "video_poker",
            Self::Blackjack => "blackjack",
            Self::SicBo => "sic_bo",
            Self::Wheel => "wheel",
            Self::Bingo => "bingo",
            Self::Quiz => "quiz",
            Self::BoxOpening => "box_opening",
            Self::BoxBattle => "box_battle",
            Self::TradingCards => "trading_cards",
        }
    }

    /// Games that stay open across several moves after the opening one.
    pub fn is_multi_step(&self) -> bool {
        matches!(
            self,
            Self::Crash
                | Self::Mines
                | Self::VideoPoker
                | Self::Blackjack
                | Self::Bingo
                | Self::Quiz
        )
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "slots" {
            return Ok(Self::Slots);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|game| game.as_str() == s)
            .ok_or_else(|| format!("unknown game type: {s}"))
    }
}

impl TryFrom<u8> for GameType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(value as usize)
            .copied()
            .ok_or(Error::InvalidEnum(value))
    }
}

impl Write for GameType {
    fn write(&self, writer: &mut impl BufMut) {
        (*self as u8).write(writer);
    }
}

impl Read for GameType {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Self::try_from(u8::read(reader)?)
    }
}

impl FixedSize for GameType {
    const SIZE: usize = 1;
}

/// An in-flight round.
///
/// The bet has already been deducted from the owner's balance when a session exists. The
/// `state_blob` is owned by the game module that created it and is opaque to everyone else.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSession {
    pub id: u64,
    pub player: PlayerId,
    pub game_type: GameType,
    pub bet: u64,
    pub state_blob: Vec<u8>,
    pub move_count: u32,
    /// Server clock (ms) at round start.
    pub created_at: u64,
    pub is_complete: bool,
    /// Commitment to the round seed, published when the round starts.
    pub commit: [u8; 32],
}

impl GameSession {
    pub fn new(id: u64, player: PlayerId, game_type: GameType, bet: u64, created_at: u64) -> Self {
        Self {
            id,
            player,
            game_type,
            bet,
            state_blob: Vec::new(),
            move_count: 0,
            created_at,
            is_complete: false,
            commit: [0u8; 32],
        }
    }
}

impl Write for GameSession {
    fn write(&self, writer: &mut impl BufMut) {
        self.id.write(writer);
        self.player.write(writer);
        self.game_type.write(writer);
        self.bet.write(writer);
        self.state_blob.write(writer);
        self.move_count.write(writer);
        self.created_at.write(writer);
        self.is_complete.write(writer);
        write_bytes32(&self.commit, writer);
    }
}

impl Read for GameSession {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            id: u64::read(reader)?,
            player: PlayerId::read(reader)?,
            game_type: GameType::read(reader)?,
            bet: u64::read(reader)?,
            state_blob: Vec::<u8>::read_range(reader, 0..=MAX_STATE_BLOB_LENGTH)?,
            move_count: u32::read(reader)?,
            created_at: u64::read(reader)?,
            is_complete: bool::read(reader)?,
            commit: read_bytes32(reader)?,
        })
    }
}

impl EncodeSize for GameSession {
    fn encode_size(&self) -> usize {
        self.id.encode_size()
            + self.player.encode_size()
            + self.game_type.encode_size()
            + self.bet.encode_size()
            + self.state_blob.encode_size()
            + self.move_count.encode_size()
            + self.created_at.encode_size()
            + self.is_complete.encode_size()
            + 32
    }
}

/// Final result of one round.
///
/// `classification` is the game's own outcome label (for example `ultra_jackpot` for six locked
/// diamonds); `detail` carries whatever the presentation layer needs to replay the round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundOutcome {
    pub game_type: GameType,
    pub classification: String,
    pub win_amount: u64,
    pub detail: serde_json::Value,
}

impl RoundOutcome {
    pub fn new(
        game_type: GameType,
        classification: impl Into<String>,
        win_amount: u64,
        detail: serde_json::Value,
    ) -> Self {
        Self {
            game_type,
            classification: classification.into(),
            win_amount,
            detail,
        }
    }

    pub fn is_win(&self) -> bool {
        self.win_amount > 0
    }
}
