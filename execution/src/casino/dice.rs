//! Roll-under dice.
//!
//! A roll of 1-100 wins when strictly below the chosen target and pays
//! `floor(bet * 99 / roll_under)`.
//!
//! Payload format:
//! [rollUnder:u8] (2-98)

use serde_json::json;

use super::{complete, payload::parse_single, scale, CasinoGame, GameError, GameResult, GameRng};
use vcasino_types::casino::GameSession;

pub const MIN_ROLL_UNDER: u8 = 2;
pub const MAX_ROLL_UNDER: u8 = 98;

/// Return-to-player numerator: a 1% edge over a fair `100 / roll_under` payout.
const RTP_NUMERATOR: u64 = 99;

pub fn resolve(bet: u64, roll_under: u8, roll: u8) -> u64 {
    if roll_under == 0 || roll >= roll_under {
        return 0;
    }
    scale(bet, RTP_NUMERATOR, roll_under as u64)
}

pub fn validate_target(roll_under: u8) -> Result<u8, GameError> {
    if !(MIN_ROLL_UNDER..=MAX_ROLL_UNDER).contains(&roll_under) {
        return Err(GameError::InvalidSelection("roll target must be 2-98"));
    }
    Ok(roll_under)
}

pub struct Dice;

impl CasinoGame for Dice {
    fn start(
        session: &mut GameSession,
        payload: &[u8],
        rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        let roll_under = validate_target(parse_single(payload)?)?;
        let roll = rng.next_bounded(100) + 1;
        session.state_blob = vec![roll];

        let win = resolve(session.bet, roll_under, roll);
        Ok(complete(
            session,
            if win > 0 { "win" } else { "loss" },
            win,
            json!({
                "roll": roll,
                "rollUnder": roll_under,
                "multiplier": RTP_NUMERATOR as f64 / roll_under as f64,
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
    fn test_roll_under_fifty() {
        assert_eq!(resolve(100, 50, 40), 198);
        assert_eq!(resolve(100, 50, 49), 198);
        // Strictly below.
        assert_eq!(resolve(100, 50, 50), 0);
        assert_eq!(resolve(100, 50, 99), 0);
    }

    #[test]
    fn test_payout_floors() {
        assert_eq!(resolve(10, 70, 1), 14);
        assert_eq!(resolve(1000, 2, 1), 49_500);
        assert_eq!(resolve(1000, 98, 97), 1010);
    }

    #[test]
    fn test_target_bounds() {
        let mut rng = create_test_rng(2);
        for bad in [0u8, 1, 99, 100] {
            let mut session = create_test_session(GameType::Dice, 10);
            assert!(matches!(
                Dice::start(&mut session, &[bad], &mut rng),
                Err(GameError::InvalidSelection(_))
            ));
        }
        let mut session = create_test_session(GameType::Dice, 10);
        assert_eq!(
            Dice::start(&mut session, &[], &mut rng),
            Err(GameError::InvalidPayload)
        );
    }

    #[test]
    fn test_rolls_cover_range() {
        let mut seen_low = false;
        let mut seen_high = false;
        for i in 0..2000 {
            let mut rng = create_test_rng(i);
            let mut session = create_test_session(GameType::Dice, 10);
            let GameResult::Complete(outcome) = Dice::start(&mut session, &[50], &mut rng).unwrap()
            else {
                panic!("dice is single-shot");
            };
            let roll = outcome.detail["roll"].as_u64().unwrap();
            assert!((1..=100).contains(&roll));
            seen_low |= roll == 1;
            seen_high |= roll == 100;
        }
        assert!(seen_low && seen_high);
    }
}
