//! Sic Bo game implementation.
//!
//! State blob format:
//! [die1:u8] [die2:u8] [die3:u8]
//!
//! Payload format:
//! [betType:u8]
//!
//! Bet types:
//! 0 = Small (4-10, pays 2x) - loses on triple
//! 1 = Big (11-17, pays 2x) - loses on triple
//! 2 = Odd total (pays 2x) - loses on triple
//! 3 = Even total (pays 2x) - loses on triple
//! 4 = Any triple (pays 30x)

use serde_json::json;

use super::{complete, payload::parse_single, CasinoGame, GameError, GameResult, GameRng};
use vcasino_types::casino::GameSession;

/// Sic Bo bet types.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BetType {
    Small = 0,
    Big = 1,
    Odd = 2,
    Even = 3,
    AnyTriple = 4,
}

impl TryFrom<u8> for BetType {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(BetType::Small),
            1 => Ok(BetType::Big),
            2 => Ok(BetType::Odd),
            3 => Ok(BetType::Even),
            4 => Ok(BetType::AnyTriple),
            _ => Err(GameError::InvalidSelection("unknown sic bo bet type")),
        }
    }
}

/// Total return multiplier for a winning even-money bet.
const EVEN_MONEY_RETURN: u64 = 2;
/// Total return multiplier for any triple.
const ANY_TRIPLE_RETURN: u64 = 30;

/// Check if dice form a triple (all same).
fn is_triple(dice: &[u8; 3]) -> bool {
    dice[0] == dice[1] && dice[1] == dice[2]
}

/// Total return for a bet against a roll.
pub fn resolve(bet: u64, bet_type: BetType, dice: [u8; 3]) -> u64 {
    let total: u8 = dice.iter().sum();
    let triple = is_triple(&dice);
    let wins = match bet_type {
        BetType::Small => !triple && (4..=10).contains(&total),
        BetType::Big => !triple && (11..=17).contains(&total),
        BetType::Odd => !triple && total % 2 == 1,
        BetType::Even => !triple && total % 2 == 0,
        BetType::AnyTriple => triple,
    };
    if !wins {
        return 0;
    }
    let multiplier = match bet_type {
        BetType::AnyTriple => ANY_TRIPLE_RETURN,
        _ => EVEN_MONEY_RETURN,
    };
    bet.saturating_mul(multiplier)
}

pub struct SicBo;

impl CasinoGame for SicBo {
    fn start(
        session: &mut GameSession,
        payload: &[u8],
        rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        let bet_type = BetType::try_from(parse_single(payload)?)?;

        let dice: [u8; 3] = [rng.roll_die(), rng.roll_die(), rng.roll_die()];
        session.state_blob = dice.to_vec();

        let win = resolve(session.bet, bet_type, dice);
        let classification = if win > 0 { "win" } else { "loss" };
        Ok(complete(
            session,
            classification,
            win,
            json!({
                "dice": dice,
                "total": dice.iter().sum::<u8>(),
                "betType": bet_type as u8,
            }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{create_test_rng, create_test_session};
    use vcasino_types::casino::GameType;

    #[test]
    fn test_small_and_big() {
        assert_eq!(resolve(10, BetType::Small, [1, 2, 3]), 20);
        assert_eq!(resolve(10, BetType::Small, [4, 4, 3]), 0);
        assert_eq!(resolve(10, BetType::Big, [4, 4, 3]), 20);
        assert_eq!(resolve(10, BetType::Big, [6, 6, 6]), 0);
    }

    #[test]
    fn test_triples_lose_parity_bets() {
        assert_eq!(resolve(10, BetType::Odd, [1, 1, 1]), 0);
        assert_eq!(resolve(10, BetType::Even, [2, 2, 2]), 0);
        assert_eq!(resolve(10, BetType::Odd, [1, 1, 3]), 20);
        assert_eq!(resolve(10, BetType::Even, [1, 1, 2]), 20);
    }

    #[test]
    fn test_any_triple_pays_thirty() {
        assert_eq!(resolve(10, BetType::AnyTriple, [5, 5, 5]), 300);
        assert_eq!(resolve(10, BetType::AnyTriple, [5, 5, 4]), 0);
    }

    #[test]
    fn test_invalid_bet_type() {
        let mut rng = create_test_rng(3);
        let mut session = create_test_session(GameType::SicBo, 10);
        assert_eq!(
            SicBo::start(&mut session, &[5], &mut rng),
            Err(GameError::InvalidSelection("unknown sic bo bet type"))
        );
        let result = SicBo::start(&mut session, &[BetType::Big as u8], &mut rng).unwrap();
        assert!(result.is_complete());
        assert_eq!(session.state_blob.len(), 3);
        assert!(session.state_blob.iter().all(|d| (1..=6).contains(d)));
    }
}
