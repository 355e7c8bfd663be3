//! Single-zero roulette with a free-form number selection.
//!
//! The player covers any set of 1-37 distinct numbers from 0-36 with one stake. A hit pays
//! `floor(bet * 36 / covered)`; covering everything is a guaranteed but reduced return.
//!
//! Payload format:
//! [count:u8] [number:u8]...

use serde_json::json;

use super::{
    complete,
    payload::{encode_number_set, parse_number_set},
    scale, CasinoGame, GameError, GameResult, GameRng,
};
use vcasino_types::casino::GameSession;

/// Highest number on the wheel.
pub const MAX_NUMBER: u8 = 36;

/// Red pockets.
pub const RED_NUMBERS: [u8; 18] = [
    1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36,
];

pub fn is_red(number: u8) -> bool {
    RED_NUMBERS.contains(&number)
}

/// Selection covering every red pocket.
pub fn red_numbers() -> Vec<u8> {
    RED_NUMBERS.to_vec()
}

/// Selection covering every black pocket (1-36 minus red; zero is green).
pub fn black_numbers() -> Vec<u8> {
    (1..=MAX_NUMBER).filter(|&n| !is_red(n)).collect()
}

/// Encode a selection as an opening payload.
pub fn selection_payload(numbers: &[u8]) -> Vec<u8> {
    encode_number_set(numbers)
}

/// Payout for a spin given the covered numbers.
pub fn resolve(bet: u64, selected: &[u8], winning: u8) -> u64 {
    if selected.is_empty() || !selected.contains(&winning) {
        return 0;
    }
    scale(bet, 36, selected.len() as u64)
}

fn color(number: u8) -> &'static str {
    if number == 0 {
        "green"
    } else if is_red(number) {
        "red"
    } else {
        "black"
    }
}

pub struct Roulette;

impl CasinoGame for Roulette {
    fn start(
        session: &mut GameSession,
        payload: &[u8],
        rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        let selected = parse_number_set(payload, 0, MAX_NUMBER, MAX_NUMBER as usize + 1)?;
        let winning = rng.spin_roulette();
        session.state_blob = vec![winning];

        let win = resolve(session.bet, &selected, winning);
        let classification = if win > 0 { "hit" } else { "miss" };
        Ok(complete(
            session,
            classification,
            win,
            json!({
                "winningNumber": winning,
                "color": color(winning),
                "selected": selected,
            }),
        ))
    }
}
