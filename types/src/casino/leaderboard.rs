use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, ReadRangeExt, Write};
use serde::{Deserialize, Serialize};

use super::{
    read_string, string_encode_size, write_string, Player, PlayerId, LEADERBOARD_SIZE,
    MAX_NAME_LENGTH,
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub player: PlayerId,
    pub name: String,
    pub total_winnings: i64,
    pub games_played: u64,
    pub biggest_win: u64,
    pub rank: u32,
}

impl Write for LeaderboardEntry {
    fn write(&self, writer: &mut impl BufMut) {
        self.player.write(writer);
        write_string(&self.name, writer);
        self.total_winnings.write(writer);
        self.games_played.write(writer);
        self.biggest_win.write(writer);
        self.rank.write(writer);
    }
}

impl Read for LeaderboardEntry {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            player: PlayerId::read(reader)?,
            name: read_string(reader, MAX_NAME_LENGTH)?,
            total_winnings: i64::read(reader)?,
            games_played: u64::read(reader)?,
            biggest_win: u64::read(reader)?,
            rank: u32::read(reader)?,
        })
    }
}

impl EncodeSize for LeaderboardEntry {
    fn encode_size(&self) -> usize {
        self.player.encode_size()
            + string_encode_size(&self.name)
            + self.total_winnings.encode_size()
            + self.games_played.encode_size()
            + self.biggest_win.encode_size()
            + self.rank.encode_size()
    }
}

/// Top players ranked by net lifetime winnings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn update(&mut self, player: &Player) {
        self.entries.retain(|e| e.player != player.id);

        self.entries.push(LeaderboardEntry {
            player: player.id,
            name: player.name.clone(),
            total_winnings: player.stats.total_winnings,
            games_played: player.stats.games_played,
            biggest_win: player.stats.biggest_win,
            rank: 0,
        });

        // Ties keep the earlier player ahead.
        self.entries
            .sort_by(|a, b| b.total_winnings.cmp(&a.total_winnings));
        self.entries.truncate(LEADERBOARD_SIZE);
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.rank = (i + 1) as u32;
        }
    }
}

impl Write for Leaderboard {
    fn write(&self, writer: &mut impl BufMut) {
        self.entries.write(writer);
    }
}

impl Read for Leaderboard {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        Ok(Self {
            entries: Vec::<LeaderboardEntry>::read_range(reader, 0..=LEADERBOARD_SIZE)?,
        })
    }
}

impl EncodeSize for Leaderboard {
    fn encode_size(&self) -> usize {
        self.entries.encode_size()
    }
}
