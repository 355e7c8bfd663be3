//! Wheel of fortune: eight equal segments, each with a fixed return multiplier.
//!
//! Payload format:
//! (empty)

use serde_json::json;

use super::{complete, payload::ensure_empty, CasinoGame, GameError, GameResult, GameRng};
use vcasino_types::casino::GameSession;

pub const SEGMENT_MULTIPLIERS: [u64; 8] = [1, 2, 0, 5, 1, 2, 0, 10];

pub fn resolve(bet: u64, segment: usize) -> u64 {
    SEGMENT_MULTIPLIERS
        .get(segment)
        .map_or(0, |m| bet.saturating_mul(*m))
}

pub struct Wheel;

impl CasinoGame for Wheel {
    fn start(
        session: &mut GameSession,
        payload: &[u8],
        rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        ensure_empty(payload)?;
        let segment = rng.next_bounded(SEGMENT_MULTIPLIERS.len() as u8) as usize;
        session.state_blob = vec![segment as u8];

        let multiplier = SEGMENT_MULTIPLIERS[segment];
        Ok(complete(
            session,
            &format!("x{multiplier}"),
            resolve(session.bet, segment),
            json!({ "segment": segment, "multiplier": multiplier }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{create_test_rng, create_test_session};
    use vcasino_types::casino::GameType;

    #[test]
    fn test_segment_payouts() {
        assert_eq!(resolve(10, 7), 100);
        assert_eq!(resolve(10, 2), 0);
        assert_eq!(resolve(10, 0), 10);
        assert_eq!(resolve(10, 8), 0);
    }

    #[test]
    fn test_every_segment_reachable() {
        let mut seen = [false; 8];
        for i in 0..400 {
            let mut rng = create_test_rng(i);
            let mut session = create_test_session(GameType::Wheel, 10);
            Wheel::start(&mut session, &[], &mut rng).unwrap();
            seen[session.state_blob[0] as usize] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}
