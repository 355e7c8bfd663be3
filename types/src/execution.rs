//! Keys and values stored by the balance ledger.
//!
//! Every key and value carries a one-byte tag so that encoded state can be inspected (or migrated)
//! without knowing the Rust types in advance.

use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, FixedSize, Read, ReadExt, Write};

use crate::casino::{GameHistoryRecord, GameSession, Leaderboard, Player, PlayerId};

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// Player profile and balance (tag 0)
    Player(PlayerId),
    /// In-flight round (tag 1)
    Session(u64),
    /// History record `seq` of a player (tag 2)
    History(PlayerId, u64),
    /// Global leaderboard (tag 3)
    Leaderboard,
    /// Next round id to hand out (tag 4)
    RoundCounter,
    /// Next player id to hand out (tag 5)
    PlayerCounter,
}

impl Write for Key {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Player(id) => {
                0u8.write(writer);
                id.write(writer);
            }
            Self::Session(id) => {
                1u8.write(writer);
                id.write(writer);
            }
            Self::History(player, seq) => {
                2u8.write(writer);
                player.write(writer);
                seq.write(writer);
            }
            Self::Leaderboard => 3u8.write(writer),
            Self::RoundCounter => 4u8.write(writer),
            Self::PlayerCounter => 5u8.write(writer),
        }
    }
}

impl Read for Key {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let key = match u8::read(reader)? {
            0 => Self::Player(PlayerId::read(reader)?),
            1 => Self::Session(u64::read(reader)?),
            2 => Self::History(PlayerId::read(reader)?, u64::read(reader)?),
            3 => Self::Leaderboard,
            4 => Self::RoundCounter,
            5 => Self::PlayerCounter,
            i => return Err(Error::InvalidEnum(i)),
        };
        Ok(key)
    }
}

impl EncodeSize for Key {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Player(_) => PlayerId::SIZE,
                Self::Session(_) => u64::SIZE,
                Self::History(_, _) => PlayerId::SIZE + u64::SIZE,
                Self::Leaderboard | Self::RoundCounter | Self::PlayerCounter => 0,
            }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[allow(clippy::large_enum_variant)]
pub enum Value {
    Player(Player),
    Session(GameSession),
    History(GameHistoryRecord),
    Leaderboard(Leaderboard),
    Counter(u64),
}

impl Write for Value {
    fn write(&self, writer: &mut impl BufMut) {
        match self {
            Self::Player(player) => {
                0u8.write(writer);
                player.write(writer);
            }
            Self::Session(session) => {
                1u8.write(writer);
                session.write(writer);
            }
            Self::History(record) => {
                2u8.write(writer);
                record.write(writer);
            }
            Self::Leaderboard(leaderboard) => {
                3u8.write(writer);
                leaderboard.write(writer);
            }
            Self::Counter(value) => {
                4u8.write(writer);
                value.write(writer);
            }
        }
    }
}

impl Read for Value {
    type Cfg = ();

    fn read_cfg(reader: &mut impl Buf, _: &Self::Cfg) -> Result<Self, Error> {
        let value = match u8::read(reader)? {
            0 => Self::Player(Player::read(reader)?),
            1 => Self::Session(GameSession::read(reader)?),
            2 => Self::History(GameHistoryRecord::read(reader)?),
            3 => Self::Leaderboard(Leaderboard::read(reader)?),
            4 => Self::Counter(u64::read(reader)?),
            i => return Err(Error::InvalidEnum(i)),
        };
        Ok(value)
    }
}

impl EncodeSize for Value {
    fn encode_size(&self) -> usize {
        u8::SIZE
            + match self {
                Self::Player(player) => player.encode_size(),
                Self::Session(session) => session.encode_size(),
                Self::History(record) => record.encode_size(),
                Self::Leaderboard(leaderboard) => leaderboard.encode_size(),
                Self::Counter(value) => value.encode_size(),
            }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::casino::{GameType, PlayerKind};
    use commonware_codec::Encode;

    #[test]
    fn test_key_tags_are_stable() {
        assert_eq!(Key::Player(PlayerId(7)).encode()[0], 0);
        assert_eq!(Key::Session(7).encode()[0], 1);
        assert_eq!(Key::History(PlayerId(7), 3).encode()[0], 2);
        assert_eq!(Key::Leaderboard.encode().as_ref(), &[3]);
        assert_eq!(Key::RoundCounter.encode().as_ref(), &[4]);
        assert_eq!(Key::PlayerCounter.encode().as_ref(), &[5]);
    }

    #[test]
    fn test_key_encode_size_matches_encoding() {
        for key in [
            Key::Player(PlayerId(1)),
            Key::Session(99),
            Key::History(PlayerId(1), 2),
            Key::Leaderboard,
        ] {
            assert_eq!(key.encode_size(), key.encode().len());
        }
    }

    #[test]
    fn test_value_decode_session() {
        let session = GameSession {
            id: 12,
            player: PlayerId(3),
            game_type: GameType::Mines,
            bet: 250,
            state_blob: vec![3, 0, 0, 0, 1],
            move_count: 2,
            created_at: 1_700_000_000_000,
            is_complete: false,
            commit: [9u8; 32],
        };
        let encoded = Value::Session(session.clone()).encode();
        let decoded = Value::read(&mut &encoded[..]).expect("decode session value");
        assert_eq!(decoded, Value::Session(session));
    }

    #[test]
    fn test_value_rejects_unknown_tag() {
        let bytes = [42u8, 0, 0];
        assert!(matches!(
            Value::read(&mut &bytes[..]),
            Err(Error::InvalidEnum(42))
        ));
    }

    #[test]
    fn test_value_decode_player() {
        let mut player = Player::new(PlayerId(5), "ada".into(), PlayerKind::Registered, 10);
        player.active_session = Some(4);
        player.stats.record_round(100, 250);
        let encoded = Value::Player(player.clone()).encode();
        assert_eq!(encoded.len(), Value::Player(player.clone()).encode_size());
        let decoded = Value::read(&mut &encoded[..]).expect("decode player value");
        assert_eq!(decoded, Value::Player(player));
    }
}
