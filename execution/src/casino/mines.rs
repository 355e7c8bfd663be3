//! Mines: a 5x5 grid hiding a chosen number of mines.
//!
//! Each safe reveal (a "gem") raises the multiplier by `mines / safe_cells`, so after `g` gems it
//! is `1 + g * mines / (25 - mines)`. Cashing out pays `floor(bet * multiplier)`, computed exactly
//! as `floor(bet * (safe + g * mines) / safe)`. Revealing a mine forfeits the bet. Clearing
//! every safe cell cashes out automatically.
//!
//! State blob format:
//! [mines:u8] [mineMask:u32 BE] [revealedMask:u32 BE]
//!
//! Payload format:
//! Start: [mines:u8] (1..=24)
//! [0, cell:u8] = Reveal cell (0..=24)
//! [1] = Cash out

use serde_json::json;

use super::{
    complete, payload::parse_single, scale, serialization::StateReader,
    serialization::StateWriter, CasinoGame, GameError, GameResult, GameRng,
};
use vcasino_types::casino::GameSession;

pub const GRID_CELLS: u8 = 25;
pub const MIN_MINES: u8 = 1;
pub const MAX_MINES: u8 = 24;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Move {
    Reveal = 0,
    CashOut = 1,
}

impl TryFrom<u8> for Move {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Move::Reveal),
            1 => Ok(Move::CashOut),
            _ => Err(GameError::InvalidPayload),
        }
    }
}

/// Return for cashing out after `gems` safe reveals.
pub fn payout(bet: u64, mines: u8, gems: u8) -> u64 {
    let safe = (GRID_CELLS - mines) as u64;
    scale(bet, safe + gems as u64 * mines as u64, safe)
}

/// Multiplier after `gems` safe reveals, for display.
pub fn multiplier(mines: u8, gems: u8) -> f64 {
    let safe = (GRID_CELLS - mines) as f64;
    1.0 + gems as f64 * (mines as f64 / safe)
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct MinesState {
    mines: u8,
    mine_mask: u32,
    revealed: u32,
}

impl MinesState {
    fn gems(&self) -> u8 {
        self.revealed.count_ones() as u8
    }

    fn safe_cells(&self) -> u8 {
        GRID_CELLS - self.mines
    }

    fn cells(mask: u32) -> Vec<u8> {
        (0..GRID_CELLS).filter(|c| mask & (1 << c) != 0).collect()
    }

    fn decode(blob: &[u8]) -> Result<Self, GameError> {
        let mut reader = StateReader::new(blob);
        let mines = reader.read_u8().ok_or(GameError::InvalidState)?;
        let mine_mask = reader.read_u32_be().ok_or(GameError::InvalidState)?;
        let revealed = reader.read_u32_be().ok_or(GameError::InvalidState)?;
        let grid = (1u32 << GRID_CELLS) - 1;
        if reader.remaining() != 0
            || !(MIN_MINES..=MAX_MINES).contains(&mines)
            || mine_mask & !grid != 0
            || revealed & !grid != 0
            || mine_mask.count_ones() != mines as u32
            || mine_mask & revealed != 0
        {
            return Err(GameError::InvalidState);
        }
        Ok(Self {
            mines,
            mine_mask,
            revealed,
        })
    }

    fn encode(&self) -> Vec<u8> {
        let mut writer = StateWriter::with_capacity(9);
        writer.push_u8(self.mines);
        writer.push_u32_be(self.mine_mask);
        writer.push_u32_be(self.revealed);
        writer.into_inner()
    }

    fn view(&self) -> serde_json::Value {
        json!({
            "mines": self.mines,
            "revealed": Self::cells(self.revealed),
            "gems": self.gems(),
            "multiplier": multiplier(self.mines, self.gems()),
        })
    }
}

/// Public view of a running round; mine positions stay hidden.
pub fn view(session: &GameSession) -> Result<serde_json::Value, GameError> {
    let state = MinesState::decode(&session.state_blob)?;
    let mut value = state.view();
    value["potentialWin"] = json!(payout(session.bet, state.mines, state.gems()));
    Ok(value)
}

fn cash_out(session: &mut GameSession, state: &MinesState) -> GameResult {
    let gems = state.gems();
    let win = payout(session.bet, state.mines, gems);
    complete(
        session,
        "cashed_out",
        win,
        json!({
            "mines": state.mines,
            "gems": gems,
            "multiplier": multiplier(state.mines, gems),
            "minePositions": MinesState::cells(state.mine_mask),
            "revealed": MinesState::cells(state.revealed),
        }),
    )
}

pub struct Mines;

impl CasinoGame for Mines {
    fn start(
        session: &mut GameSession,
        payload: &[u8],
        rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        let mines = parse_single(payload)?;
        if !(MIN_MINES..=MAX_MINES).contains(&mines) {
            return Err(GameError::InvalidSelection("mine count out of range"));
        }
        let mine_mask = rng
            .sample_distinct(0, GRID_CELLS - 1, mines as usize)
            .into_iter()
            .fold(0u32, |mask, cell| mask | (1 << cell));
        let state = MinesState {
            mines,
            mine_mask,
            revealed: 0,
        };
        session.state_blob = state.encode();
        Ok(GameResult::Continue(view(session)?))
    }

    fn process_move(
        session: &mut GameSession,
        payload: &[u8],
        _rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        if session.is_complete {
            return Err(GameError::RoundComplete);
        }
        let (&action, rest) = payload.split_first().ok_or(GameError::InvalidPayload)?;
        let mut state = MinesState::decode(&session.state_blob)?;

        match Move::try_from(action)? {
            Move::Reveal => {
                let cell = parse_single(rest)?;
                if cell >= GRID_CELLS {
                    return Err(GameError::InvalidSelection("cell out of range"));
                }
                let bit = 1u32 << cell;
                if state.revealed & bit != 0 {
                    return Err(GameError::InvalidMove);
                }
                if state.mine_mask & bit != 0 {
                    return Ok(complete(
                        session,
                        "mine",
                        0,
                        json!({
                            "mines": state.mines,
                            "hit": cell,
                            "gems": state.gems(),
                            "minePositions": MinesState::cells(state.mine_mask),
                            "revealed": MinesState::cells(state.revealed),
                        }),
                    ));
                }
                state.revealed |= bit;
                session.state_blob = state.encode();
                if state.gems() == state.safe_cells() {
                    return Ok(cash_out(session, &state));
                }
                Ok(GameResult::Continue(view(session)?))
            }
            Move::CashOut => {
                if !rest.is_empty() {
                    return Err(GameError::InvalidPayload);
                }
                if state.gems() == 0 {
                    return Err(GameError::InvalidMove);
                }
                Ok(cash_out(session, &state))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{create_test_rng, create_test_session};
    use vcasino_types::casino::GameType;

    fn session_with_mines(bet: u64, mine_cells: &[u8]) -> GameSession {
        let mut session = create_test_session(GameType::Mines, bet);
        let state = MinesState {
            mines: mine_cells.len() as u8,
            mine_mask: mine_cells.iter().fold(0, |m, c| m | (1 << c)),
            revealed: 0,
        };
        session.state_blob = state.encode();
        session
    }

    #[test]
    fn test_payout_formula() {
        // 3 mines, 22 safe: each gem adds 3/22.
        assert_eq!(payout(100, 3, 0), 100);
        assert_eq!(payout(100, 3, 1), 113);
        assert_eq!(payout(100, 3, 2), 127);
        assert_eq!(payout(22, 3, 22), 88);
        assert_eq!(payout(10, 24, 1), 250);
        assert!((multiplier(5, 4) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_start_validates_mine_count() {
        let mut rng = create_test_rng(1);
        for bad in [0u8, 25] {
            let mut session = create_test_session(GameType::Mines, 10);
            assert!(matches!(
                Mines::start(&mut session, &[bad], &mut rng),
                Err(GameError::InvalidSelection(_))
            ));
        }
        let mut session = create_test_session(GameType::Mines, 10);
        let result = Mines::start(&mut session, &[5], &mut rng).unwrap();
        assert!(!result.is_complete());
        let state = MinesState::decode(&session.state_blob).unwrap();
        assert_eq!(state.mine_mask.count_ones(), 5);
    }

    #[test]
    fn test_reveal_then_cash_out() {
        let mut rng = create_test_rng(2);
        let mut session = session_with_mines(100, &[0, 1, 2]);
        assert_eq!(
            Mines::process_move(&mut session, &[1], &mut rng),
            Err(GameError::InvalidMove)
        );
        assert!(!Mines::process_move(&mut session, &[0, 10], &mut rng)
            .unwrap()
            .is_complete());
        assert_eq!(
            Mines::process_move(&mut session, &[0, 10], &mut rng),
            Err(GameError::InvalidMove)
        );
        Mines::process_move(&mut session, &[0, 11], &mut rng).unwrap();
        let GameResult::Complete(outcome) =
            Mines::process_move(&mut session, &[1], &mut rng).unwrap()
        else {
            panic!("cash out completes the round");
        };
        assert_eq!(outcome.classification, "cashed_out");
        assert_eq!(outcome.win_amount, 127);
    }

    #[test]
    fn test_mine_forfeits() {
        let mut rng = create_test_rng(3);
        let mut session = session_with_mines(100, &[7]);
        Mines::process_move(&mut session, &[0, 3], &mut rng).unwrap();
        let GameResult::Complete(outcome) =
            Mines::process_move(&mut session, &[0, 7], &mut rng).unwrap()
        else {
            panic!("mine completes the round");
        };
        assert_eq!(outcome.classification, "mine");
        assert_eq!(outcome.win_amount, 0);
        assert!(session.is_complete);
    }

    #[test]
    fn test_clearing_board_cashes_out() {
        let mut rng = create_test_rng(4);
        let mines: Vec<u8> = (1..GRID_CELLS).collect();
        let mut session = session_with_mines(10, &mines);
        let GameResult::Complete(outcome) =
            Mines::process_move(&mut session, &[0, 0], &mut rng).unwrap()
        else {
            panic!("last safe cell completes the round");
        };
        assert_eq!(outcome.win_amount, 250);
    }

    #[test]
    fn test_view_hides_mines() {
        let session = session_with_mines(50, &[4, 9]);
        let value = view(&session).unwrap();
        assert!(value.get("minePositions").is_none());
        assert_eq!(value["potentialWin"], 50);
    }
}
