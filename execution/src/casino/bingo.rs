//! 75-ball bingo on a single 5x5 card.
//!
//! Column `c` holds five distinct numbers from `c*15+1..=c*15+15`; the centre square is free.
//! Numbers are called without replacement. A completed row, column or diagonal pays 10x the bet,
//! but lines only count once at least 25 numbers have been called.
//!
//! State blob format:
//! [card:25 bytes, column-major, centre = 0] [calledLen:u8] [called...]
//!
//! Payload format:
//! Start: (empty)
//! [0, count:u8] = Call up to `count` numbers, stopping at the first win
//! [1] = Abandon (forfeits the bet)

use serde_json::json;

use super::{
    complete, payload::ensure_empty, serialization::StateReader, serialization::StateWriter,
    CasinoGame, GameError, GameResult, GameRng,
};
use vcasino_types::casino::GameSession;

pub const CARD_SIZE: usize = 5;
pub const MAX_BALL: u8 = 75;
pub const WIN_MULTIPLIER: u64 = 10;
/// Calls required before any line is recognised.
pub const MIN_CALLS_FOR_WIN: usize = 25;
const FREE: u8 = 0;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Move {
    Call = 0,
    Abandon = 1,
}

impl TryFrom<u8> for Move {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Move::Call),
            1 => Ok(Move::Abandon),
            _ => Err(GameError::InvalidPayload),
        }
    }
}

/// Winning line kinds, in the order they are checked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Line {
    Row(usize),
    Column(usize),
    Diagonal,
    AntiDiagonal,
}

impl Line {
    pub fn as_str(&self) -> &'static str {
        match self {
            Line::Row(_) => "row",
            Line::Column(_) => "column",
            Line::Diagonal | Line::AntiDiagonal => "diagonal",
        }
    }
}

/// Column-major card: `card[col * 5 + row]`.
pub type BingoCard = [u8; CARD_SIZE * CARD_SIZE];

fn card_index(col: usize, row: usize) -> usize {
    col * CARD_SIZE + row
}

/// Deal a card: five distinct numbers per column from that column's band.
pub fn generate_card(rng: &mut GameRng) -> BingoCard {
    let mut card = [FREE; CARD_SIZE * CARD_SIZE];
    for col in 0..CARD_SIZE {
        let low = (col * 15 + 1) as u8;
        let numbers = rng.sample_distinct(low, low + 14, CARD_SIZE);
        for (row, n) in numbers.into_iter().enumerate() {
            card[card_index(col, row)] = n;
        }
    }
    card[card_index(2, 2)] = FREE;
    card
}

fn marked(card: &BingoCard, called: &[u8]) -> [bool; CARD_SIZE * CARD_SIZE] {
    let mut out = [false; CARD_SIZE * CARD_SIZE];
    for (slot, &n) in out.iter_mut().zip(card.iter()) {
        *slot = n == FREE || called.contains(&n);
    }
    out
}

fn line_complete(m: &[bool; CARD_SIZE * CARD_SIZE], mut cells: impl Iterator<Item = usize>) -> bool {
    cells.all(|i| m[i])
}

/// First completed line on the card, if the call count allows one.
pub fn find_line(card: &BingoCard, called: &[u8]) -> Option<Line> {
    if called.len() < MIN_CALLS_FOR_WIN {
        return None;
    }
    let m = marked(card, called);
    for row in 0..CARD_SIZE {
        if line_complete(&m, (0..CARD_SIZE).map(|c| card_index(c, row))) {
            return Some(Line::Row(row));
        }
    }
    for col in 0..CARD_SIZE {
        if line_complete(&m, (0..CARD_SIZE).map(|r| card_index(col, r))) {
            return Some(Line::Column(col));
        }
    }
    if line_complete(&m, (0..CARD_SIZE).map(|i| card_index(i, i))) {
        return Some(Line::Diagonal);
    }
    if line_complete(&m, (0..CARD_SIZE).map(|i| card_index(i, CARD_SIZE - 1 - i))) {
        return Some(Line::AntiDiagonal);
    }
    None
}

struct BingoState {
    card: BingoCard,
    called: Vec<u8>,
}

impl BingoState {
    fn encode(&self) -> Vec<u8> {
        let mut writer = StateWriter::with_capacity(26 + self.called.len());
        writer.push_bytes(&self.card);
        writer.push_u8_prefixed(&self.called);
        writer.into_inner()
    }

    fn decode(blob: &[u8]) -> Result<Self, GameError> {
        let mut reader = StateReader::new(blob);
        let card: BingoCard = reader
            .read_bytes(CARD_SIZE * CARD_SIZE)
            .and_then(|b| b.try_into().ok())
            .ok_or(GameError::InvalidState)?;
        let called = reader.read_u8_prefixed().ok_or(GameError::InvalidState)?;
        if reader.remaining() != 0
            || called.len() > MAX_BALL as usize
            || called.iter().any(|&n| n == 0 || n > MAX_BALL)
        {
            return Err(GameError::InvalidState);
        }
        Ok(Self { card, called })
    }

    fn uncalled(&self) -> Vec<u8> {
        (1..=MAX_BALL).filter(|n| !self.called.contains(n)).collect()
    }

    fn view(&self) -> serde_json::Value {
        let columns: Vec<&[u8]> = self.card.chunks(CARD_SIZE).collect();
        json!({
            "card": columns,
            "marked": marked(&self.card, &self.called).to_vec(),
            "called": self.called,
            "lastCalled": self.called.last(),
        })
    }
}

/// Card, marks and calls so far.
pub fn view(session: &GameSession) -> Result<serde_json::Value, GameError> {
    Ok(BingoState::decode(&session.state_blob)?.view())
}

pub struct Bingo;

impl CasinoGame for Bingo {
    fn start(
        session: &mut GameSession,
        payload: &[u8],
        rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        ensure_empty(payload)?;
        let state = BingoState {
            card: generate_card(rng),
            called: Vec::new(),
        };
        session.state_blob = state.encode();
        Ok(GameResult::Continue(state.view()))
    }

    fn process_move(
        session: &mut GameSession,
        payload: &[u8],
        rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        if session.is_complete {
            return Err(GameError::RoundComplete);
        }
        let (&action, rest) = payload.split_first().ok_or(GameError::InvalidPayload)?;
        let mut state = BingoState::decode(&session.state_blob)?;

        match Move::try_from(action)? {
            Move::Abandon => {
                if !rest.is_empty() {
                    return Err(GameError::InvalidPayload);
                }
                Ok(complete(
                    session,
                    "abandoned",
                    0,
                    json!({ "called": state.called }),
                ))
            }
            Move::Call => {
                let [count] = rest else {
                    return Err(GameError::InvalidPayload);
                };
                if *count == 0 || *count > MAX_BALL {
                    return Err(GameError::InvalidSelection("call count out of range"));
                }
                let draws = (*count as usize).min(MAX_BALL as usize - state.called.len());
                for _ in 0..draws {
                    let mut pool = state.uncalled();
                    let pick = rng.next_bounded(pool.len() as u8) as usize;
                    state.called.push(pool.swap_remove(pick));
                    if let Some(line) = find_line(&state.card, &state.called) {
                        session.state_blob = state.encode();
                        let mut detail = state.view();
                        detail["line"] = json!(line.as_str());
                        return Ok(complete(
                            session,
                            "bingo",
                            session.bet.saturating_mul(WIN_MULTIPLIER),
                            detail,
                        ));
                    }
                }
                session.state_blob = state.encode();
                if state.called.len() == MAX_BALL as usize {
                    return Ok(complete(session, "no_bingo", 0, state.view()));
                }
                Ok(GameResult::Continue(state.view()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{create_test_rng, create_test_session};
    use vcasino_types::casino::GameType;

    #[test]
    fn test_card_columns_use_their_band() {
        let mut rng = create_test_rng(1);
        let card = generate_card(&mut rng);
        for col in 0..CARD_SIZE {
            let low = (col * 15 + 1) as u8;
            let mut column: Vec<u8> = (0..CARD_SIZE)
                .map(|row| card[card_index(col, row)])
                .filter(|&n| n != FREE)
                .collect();
            assert!(column.iter().all(|n| (low..=low + 14).contains(n)));
            let len = column.len();
            column.sort_unstable();
            column.dedup();
            assert_eq!(column.len(), len);
        }
        assert_eq!(card[card_index(2, 2)], FREE);
    }

    #[test]
    fn test_line_requires_minimum_calls() {
        let card: BingoCard = core::array::from_fn(|i| {
            let (col, row) = (i / CARD_SIZE, i % CARD_SIZE);
            if col == 2 && row == 2 {
                FREE
            } else {
                (col * 15 + row + 1) as u8
            }
        });
        // Top row: 1, 16, 31, 46, 61.
        let mut called = vec![1, 16, 31, 46, 61];
        assert_eq!(find_line(&card, &called), None);
        called.extend(66..=75);
        called.extend(36..=45);
        assert_eq!(called.len(), MIN_CALLS_FOR_WIN);
        assert_eq!(find_line(&card, &called), Some(Line::Row(0)));
    }

    #[test]
    fn test_column_and_diagonal_lines() {
        let card: BingoCard = core::array::from_fn(|i| {
            if i == card_index(2, 2) {
                FREE
            } else {
                (i / CARD_SIZE * 15 + i % CARD_SIZE + 1) as u8
            }
        });
        let filler: Vec<u8> = (66..=75).chain(56..=60).chain(26..=30).collect();
        let mut called = vec![1, 2, 3, 4, 5];
        called.extend(&filler);
        assert_eq!(find_line(&card, &called), Some(Line::Column(0)));

        let mut called = vec![1, 17, 49, 65];
        called.extend(&filler);
        called.extend([6, 7, 8, 9, 10, 11]);
        assert_eq!(find_line(&card, &called), Some(Line::Diagonal));
    }

    #[test]
    fn test_calls_until_bingo() {
        let mut session = create_test_session(GameType::Bingo, 10);
        let mut rng = create_test_rng(2);
        Bingo::start(&mut session, &[], &mut rng).unwrap();
        let mut moves = 0;
        let outcome = loop {
            let mut rng = create_test_rng(100 + moves);
            moves += 1;
            match Bingo::process_move(&mut session, &[0, 10], &mut rng).unwrap() {
                GameResult::Continue(view) => {
                    assert_eq!(view["called"].as_array().unwrap().len() as u64, moves * 10);
                }
                GameResult::Complete(outcome) => break outcome,
            }
        };
        // Every line is complete once all 75 balls are out.
        assert_eq!(outcome.classification, "bingo");
        assert_eq!(outcome.win_amount, 100);
        let state = BingoState::decode(&session.state_blob).unwrap();
        assert!(state.called.len() >= MIN_CALLS_FOR_WIN);
        let mut unique = state.called.clone();
        unique.sort_unstable();
        unique.dedup();
        assert_eq!(unique.len(), state.called.len());
    }

    #[test]
    fn test_abandon_forfeits() {
        let mut session = create_test_session(GameType::Bingo, 10);
        let mut rng = create_test_rng(3);
        Bingo::start(&mut session, &[], &mut rng).unwrap();
        let GameResult::Complete(outcome) =
            Bingo::process_move(&mut session, &[1], &mut rng).unwrap()
        else {
            panic!("abandon completes the round");
        };
        assert_eq!(outcome.classification, "abandoned");
        assert_eq!(outcome.win_amount, 0);
        assert!(matches!(
            Bingo::process_move(&mut session, &[0, 0], &mut rng),
            Err(GameError::RoundComplete)
        ));
    }
}
