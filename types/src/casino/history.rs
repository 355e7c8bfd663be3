use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, Write};
use serde::{Deserialize, Serialize};

use super::{read_string, string_encode_size, write_string, PlayerId, MAX_GAME_DATA_LENGTH};

/// Label written for daily bonus credits.
pub const DAILY_BONUS_LABEL: &str = "daily_bonus";

const MAX_LABEL_LENGTH: usize = 32;

/// Append-only audit row for one balance transition.
///
/// Records are never mutated after they are produced. `balance_after` always equals
/// `balance_before - bet_amount + win_amount`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameHistoryRecord {
    pub user_id: PlayerId,
    /// Position of this record in the player's history.
    pub seq: u64,
    pub game_type: String,
    /// Round that produced this record (absent for bonus credits).
    pub round_id: Option<u64>,
    pub bet_amount: u64,
    pub win_amount: u64,
    pub balance_before: u64,
    pub balance_after: u64,
    /// JSON-encoded display data for the round.
    pub game_data: String,
    pub timestamp: u64,
}

impl GameHistoryRecord {
    /// Net change this record applied to the balance.
    pub fn delta(&self) -> i128 {
        i128::from(self.win_amount) - i128::from(self.bet_amount)
    }

    pub fn is_consistent(&self) -> bool {
        i128::from(self.balance_before) + self.delta() == i128::from(self.balance_after)
    }
}

impl Write for GameHistoryRecord {
    fn write(&self, writer: &mut impl BufMut) {
        self.user_id.write(writer);
        self.seq.write(writer);
        write_string(&self.game_type, writer);
        self.round_id.write(writer);
        self.bet_amount.write(writer);
        self.win_amount.write(writer);
        self.balance_before.write(writer);
        self.balance_after.write(writer);
        write_string(&self.game_data, writer);
        self.timestamp.write(writer);
    }
}

impl Read for GameHistoryRecord {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            user_id: PlayerId::read(reader)?,
            seq: u64::read(reader)?,
            game_type: read_string(reader, MAX_LABEL_LENGTH)?,
            round_id: Option::<u64>::read(reader)?,
            bet_amount: u64::read(reader)?,
            win_amount: u64::read(reader)?,
            balance_before: u64::read(reader)?,
            balance_after: u64::read(reader)?,
            game_data: read_string(reader, MAX_GAME_DATA_LENGTH)?,
            timestamp: u64::read(reader)?,
        })
    }
}

impl EncodeSize for GameHistoryRecord {
    fn encode_size(&self) -> usize {
        self.user_id.encode_size()
            + self.seq.encode_size()
            + string_encode_size(&self.game_type)
            + self.round_id.encode_size()
            + self.bet_amount.encode_size()
            + self.win_amount.encode_size()
            + self.balance_before.encode_size()
            + self.balance_after.encode_size()
            + string_encode_size(&self.game_data)
            + self.timestamp.encode_size()
    }
}
