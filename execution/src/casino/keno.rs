//! Keno: twenty numbers are drawn from 1-80; the player picks up to ten.
//!
//! The return multiplier depends on how many numbers were picked and how many of them were drawn.
//!
//! Payload format:
//! [count:u8] [number:u8]... (1-10 distinct numbers in 1-80)

use serde_json::json;

use super::{
    complete,
    payload::{encode_number_set, parse_number_set},
    CasinoGame, GameError, GameResult, GameRng,
};
use vcasino_types::casino::GameSession;

pub const MAX_NUMBER: u8 = 80;
pub const DRAW_COUNT: usize = 20;
pub const MAX_PICKS: usize = 10;

/// `(matches, multiplier)` rows indexed by pick count. Missing rows pay nothing.
const PAYOUT_TABLE: [&[(u8, u64)]; MAX_PICKS + 1] = [
    &[],
    &[(1, 3)],
    &[(2, 12)],
    &[(2, 1), (3, 46)],
    &[(2, 1), (3, 5), (4, 91)],
    &[(3, 2), (4, 12), (5, 810)],
    &[(3, 1), (4, 4), (5, 70), (6, 1600)],
    &[(4, 2), (5, 20), (6, 360), (7, 7000)],
    &[(5, 12), (6, 98), (7, 1550), (8, 10_000)],
    &[(5, 6), (6, 44), (7, 335), (8, 4700), (9, 10_000)],
    &[(5, 2), (6, 24), (7, 142), (8, 1000), (9, 4500), (10, 10_000)],
];

/// Multiplier for `matches` hits out of `picks` numbers.
pub fn multiplier(picks: usize, matches: usize) -> u64 {
    PAYOUT_TABLE
        .get(picks)
        .and_then(|row| row.iter().find(|(m, _)| *m as usize == matches))
        .map_or(0, |(_, mult)| *mult)
}

pub fn count_matches(picked: &[u8], drawn: &[u8]) -> usize {
    picked.iter().filter(|n| drawn.contains(n)).count()
}

pub fn resolve(bet: u64, picked: &[u8], drawn: &[u8]) -> u64 {
    bet.saturating_mul(multiplier(picked.len(), count_matches(picked, drawn)))
}

pub fn selection_payload(numbers: &[u8]) -> Vec<u8> {
    encode_number_set(numbers)
}

pub struct Keno;

impl CasinoGame for Keno {
    fn start(
        session: &mut GameSession,
        payload: &[u8],
        rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        let picked = parse_number_set(payload, 1, MAX_NUMBER, MAX_PICKS)?;
        let drawn = rng.sample_distinct(1, MAX_NUMBER, DRAW_COUNT);
        session.state_blob = drawn.clone();

        let matches = count_matches(&picked, &drawn);
        let win = resolve(session.bet, &picked, &drawn);
        Ok(complete(
            session,
            &format!("{matches}_of_{}", picked.len()),
            win,
            json!({
                "drawn": drawn,
                "picked": picked,
                "matches": matches,
                "multiplier": multiplier(picked.len(), matches),
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
    fn test_all_ten_matched_hits_top_cell() {
        let picked: Vec<u8> = (1..=10).collect();
        let mut drawn: Vec<u8> = (1..=10).collect();
        drawn.extend(41..=50);
        assert_eq!(count_matches(&picked, &drawn), 10);
        assert_eq!(multiplier(10, 10), 10_000);
        assert_eq!(resolve(5, &picked, &drawn), 50_000);
    }

    #[test]
    fn test_table_cells() {
        assert_eq!(multiplier(1, 1), 3);
        assert_eq!(multiplier(1, 0), 0);
        assert_eq!(multiplier(3, 2), 1);
        assert_eq!(multiplier(6, 6), 1600);
        assert_eq!(multiplier(9, 9), 10_000);
        assert_eq!(multiplier(10, 4), 0);
        assert_eq!(multiplier(11, 5), 0);
    }

    #[test]
    fn test_start_rejects_bad_picks() {
        let mut rng = create_test_rng(5);
        let mut session = create_test_session(GameType::Keno, 10);
        let eleven: Vec<u8> = (1..=11).collect();
        assert_eq!(
            Keno::start(&mut session, &selection_payload(&eleven), &mut rng),
            Err(GameError::InvalidSelection("too many numbers selected"))
        );
        assert_eq!(
            Keno::start(&mut session, &selection_payload(&[0]), &mut rng),
            Err(GameError::InvalidSelection("number out of range"))
        );
    }

    #[test]
    fn test_draw_is_twenty_unique() {
        let mut rng = create_test_rng(6);
        let mut session = create_test_session(GameType::Keno, 10);
        let result = Keno::start(&mut session, &selection_payload(&[1, 2, 3]), &mut rng).unwrap();
        let GameResult::Complete(outcome) = result else {
            panic!("keno is single-shot");
        };
        let mut drawn = session.state_blob.clone();
        drawn.sort_unstable();
        drawn.dedup();
        assert_eq!(drawn.len(), DRAW_COUNT);
        let matches = outcome.detail["matches"].as_u64().unwrap() as usize;
        assert_eq!(outcome.win_amount, 10 * multiplier(3, matches));
    }
}
