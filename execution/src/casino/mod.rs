//! Casino round resolution.
//!
//! Every game implements [`CasinoGame`]: an opening move that validates the player's selection and
//! either resolves the round at once or leaves it open, plus (for multi-step games) follow-up moves.
//! Games never touch balances; they only turn a bet and a stream of [`GameRng`] draws into a
//! [`RoundOutcome`]. Each module also exposes the pure payout rule it applies so the rule can be
//! checked against fixed draws.
//!
//! Games:
//! - Diamond slots (respin chain)
//! - Roulette, Dice, Crash, Plinko, Keno, Mines
//! - Video Poker, Blackjack, Sic Bo, Wheel, Bingo
//! - Quiz ladder, Box opening, Box battle, Trading cards

pub mod bingo;
pub mod blackjack;
pub mod boxes;
mod cards;
pub mod crash;
pub mod dice;
#[cfg(test)]
mod integration_tests;
pub mod keno;
pub mod mines;
mod payload;
pub mod plinko;
pub mod quiz;
mod quiz_bank;
pub mod roulette;
mod serialization;
pub mod sic_bo;
pub mod slots;
pub mod trading_cards;
pub mod video_poker;
pub mod weighted;
pub mod wheel;

use commonware_cryptography::sha256::Sha256;
use commonware_cryptography::Hasher;
use vcasino_types::casino::{GameSession, GameType, RoundOutcome};

/// Deterministic random number generator for one move of one round.
///
/// Uses a SHA256 hash chain seeded from the round seed (the fairness reveal), the round id and the
/// move number, so anyone holding the reveal can replay every draw of a finished round.
#[derive(Clone)]
pub struct GameRng {
    state: [u8; 32],
    index: usize,
}

impl GameRng {
    /// Create a new RNG from a round seed, round ID, and move number.
    pub fn new(seed: &[u8; 32], round_id: u64, move_number: u32) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(seed);
        hasher.update(&round_id.to_be_bytes());
        hasher.update(&move_number.to_be_bytes());
        Self {
            state: hasher.finalize().0,
            index: 0,
        }
    }

    fn next_byte(&mut self) -> u8 {
        if self.index >= 32 {
            let mut hasher = Sha256::new();
            hasher.update(&self.state);
            self.state = hasher.finalize().0;
            self.index = 0;
        }
        let result = self.state[self.index];
        self.index += 1;
        result
    }

    pub fn next_u8(&mut self) -> u8 {
        self.next_byte()
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut out = 0u32;
        for _ in 0..4 {
            out = (out << 8) | self.next_byte() as u32;
        }
        out
    }

    pub fn next_u64(&mut self) -> u64 {
        ((self.next_u32() as u64) << 32) | self.next_u32() as u64
    }

    /// Get a random value in range [0, max).
    pub fn next_bounded(&mut self, max: u8) -> u8 {
        if max == 0 {
            return 0;
        }
        // Rejection sampling keeps the distribution unbiased.
        let limit = u8::MAX - (u8::MAX % max);
        loop {
            let value = self.next_u8();
            if value < limit {
                return value % max;
            }
        }
    }

    /// Get a random value in range [0, max) for wider ranges.
    pub fn next_bounded_u32(&mut self, max: u32) -> u32 {
        if max == 0 {
            return 0;
        }
        let limit = u32::MAX - (u32::MAX % max);
        loop {
            let value = self.next_u32();
            if value < limit {
                return value % max;
            }
        }
    }

    /// Uniform draw in `[low, high]`.
    pub fn next_in_range(&mut self, low: u32, high: u32) -> u32 {
        debug_assert!(low <= high);
        low + self.next_bounded_u32(high - low + 1)
    }

    /// Uniform float in `[0, 1)` with 53 bits of precision.
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform float in the open interval `(0, 1)`.
    pub fn next_f64_open(&mut self) -> f64 {
        loop {
            let value = self.next_f64();
            if value > 0.0 {
                return value;
            }
        }
    }

    /// Draw a card from the deck without replacement.
    pub fn draw_card(&mut self, deck: &mut Vec<u8>) -> Option<u8> {
        if deck.is_empty() {
            return None;
        }
        let idx = self.next_bounded(deck.len() as u8) as usize;
        Some(deck.swap_remove(idx))
    }

    /// Create a shuffled deck of 52 cards.
    pub fn create_deck(&mut self) -> Vec<u8> {
        let mut deck: Vec<u8> = (0..cards::CARDS_PER_DECK).collect();
        self.shuffle(&mut deck);
        deck
    }

    /// Shuffle a slice in place using Fisher-Yates.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.next_bounded_u32((i + 1) as u32) as usize;
            slice.swap(i, j);
        }
    }

    /// Roll a single die (1-6).
    pub fn roll_die(&mut self) -> u8 {
        self.next_bounded(6) + 1
    }

    /// Spin a single-zero roulette wheel (0-36).
    pub fn spin_roulette(&mut self) -> u8 {
        self.next_bounded(37)
    }

    /// Create a shuffled deck excluding specific cards.
    pub fn create_deck_excluding(&mut self, excluded: &[u8]) -> Vec<u8> {
        let mut used: u64 = 0;
        for &card in excluded {
            if cards::is_valid_card(card) {
                used |= 1u64 << card;
            }
        }
        let mut deck: Vec<u8> = (0..cards::CARDS_PER_DECK)
            .filter(|&c| used & (1u64 << c) == 0)
            .collect();
        self.shuffle(&mut deck);
        deck
    }

    /// Draw `count` distinct values from `low..=high`, in draw order.
    pub fn sample_distinct(&mut self, low: u8, high: u8, count: usize) -> Vec<u8> {
        let mut pool: Vec<u8> = (low..=high).collect();
        let count = count.min(pool.len());
        // Partial Fisher-Yates: the first `count` slots end up uniformly chosen.
        for i in 0..count {
            let j = i + self.next_bounded_u32((pool.len() - i) as u32) as usize;
            pool.swap(i, j);
        }
        pool.truncate(count);
        pool
    }
}

/// Result of processing a game move.
#[derive(Clone, Debug, PartialEq)]
pub enum GameResult {
    /// Round still in progress. The value is what the player may see of the current state.
    Continue(serde_json::Value),
    /// Round finished. `win_amount` is the total return credited (stake included).
    Complete(RoundOutcome),
}

impl GameResult {
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }
}

/// Error during round resolution. None of these change any balance.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// Malformed payload bytes.
    #[error("invalid payload")]
    InvalidPayload,
    /// The selection is well-formed but not a playable choice.
    #[error("invalid selection: {0}")]
    InvalidSelection(&'static str),
    /// The move is not allowed in the current round state.
    #[error("invalid move for current round state")]
    InvalidMove,
    /// Round has already completed.
    #[error("round already complete")]
    RoundComplete,
    /// Corrupted state blob.
    #[error("invalid round state")]
    InvalidState,
    /// Deck is exhausted (no more cards to draw).
    #[error("deck exhausted")]
    DeckExhausted,
}

/// Trait for casino game implementations.
pub trait CasinoGame {
    /// Validate the opening selection and set up round state.
    ///
    /// Must not draw from `rng` before the selection has been validated.
    fn start(
        session: &mut GameSession,
        payload: &[u8],
        rng: &mut GameRng,
    ) -> Result<GameResult, GameError>;

    /// Process a follow-up move. Single-shot games never see one.
    fn process_move(
        session: &mut GameSession,
        _payload: &[u8],
        _rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        if session.is_complete {
            return Err(GameError::RoundComplete);
        }
        Err(GameError::InvalidMove)
    }
}

/// Mark the session complete and build its outcome.
pub(crate) fn complete(
    session: &mut GameSession,
    classification: &str,
    win_amount: u64,
    detail: serde_json::Value,
) -> GameResult {
    session.is_complete = true;
    GameResult::Complete(RoundOutcome::new(
        session.game_type,
        classification,
        win_amount,
        detail,
    ))
}

/// `floor(bet * numerator / denominator)` without intermediate overflow.
pub(crate) fn scale(bet: u64, numerator: u64, denominator: u64) -> u64 {
    if denominator == 0 {
        return 0;
    }
    let value = (bet as u128) * (numerator as u128) / (denominator as u128);
    value.min(u64::MAX as u128) as u64
}

/// Dispatch the opening move to the appropriate game module.
pub fn start_game(
    session: &mut GameSession,
    payload: &[u8],
    rng: &mut GameRng,
) -> Result<GameResult, GameError> {
    match session.game_type {
        GameType::Slots => slots::Slots::start(session, payload, rng),
        GameType::Roulette => roulette::Roulette::start(session, payload, rng),
        GameType::Dice => dice::Dice::start(session, payload, rng),
        GameType::Crash => crash::Crash::start(session, payload, rng),
        GameType::Plinko => plinko::Plinko::start(session, payload, rng),
        GameType::Keno => keno::Keno::start(session, payload, rng),
        GameType::Mines => mines::Mines::start(session, payload, rng),
        GameType::VideoPoker => video_poker::VideoPoker::start(session, payload, rng),
        GameType::Blackjack => blackjack::Blackjack::start(session, payload, rng),
        GameType::SicBo => sic_bo::SicBo::start(session, payload, rng),
        GameType::Wheel => wheel::Wheel::start(session, payload, rng),
        GameType::Bingo => bingo::Bingo::start(session, payload, rng),
        GameType::Quiz => quiz::Quiz::start(session, payload, rng),
        GameType::BoxOpening => boxes::BoxOpening::start(session, payload, rng),
        GameType::BoxBattle => boxes::BoxBattle::start(session, payload, rng),
        GameType::TradingCards => trading_cards::TradingCards::start(session, payload, rng),
    }
}

/// Dispatch a follow-up move to the appropriate game module.
pub fn process_game_move(
    session: &mut GameSession,
    payload: &[u8],
    rng: &mut GameRng,
) -> Result<GameResult, GameError> {
    if session.is_complete {
        return Err(GameError::RoundComplete);
    }
    match session.game_type {
        GameType::Slots => slots::Slots::process_move(session, payload, rng),
        GameType::Roulette => roulette::Roulette::process_move(session, payload, rng),
        GameType::Dice => dice::Dice::process_move(session, payload, rng),
        GameType::Crash => crash::Crash::process_move(session, payload, rng),
        GameType::Plinko => plinko::Plinko::process_move(session, payload, rng),
        GameType::Keno => keno::Keno::process_move(session, payload, rng),
        GameType::Mines => mines::Mines::process_move(session, payload, rng),
        GameType::VideoPoker => video_poker::VideoPoker::process_move(session, payload, rng),
        GameType::Blackjack => blackjack::Blackjack::process_move(session, payload, rng),
        GameType::SicBo => sic_bo::SicBo::process_move(session, payload, rng),
        GameType::Wheel => wheel::Wheel::process_move(session, payload, rng),
        GameType::Bingo => bingo::Bingo::process_move(session, payload, rng),
        GameType::Quiz => quiz::Quiz::process_move(session, payload, rng),
        GameType::BoxOpening => boxes::BoxOpening::process_move(session, payload, rng),
        GameType::BoxBattle => boxes::BoxBattle::process_move(session, payload, rng),
        GameType::TradingCards => trading_cards::TradingCards::process_move(session, payload, rng),
    }
}

/// Describe an in-flight round without advancing it.
pub fn view_game(session: &GameSession) -> Result<serde_json::Value, GameError> {
    match session.game_type {
        GameType::Crash => crash::view(session),
        GameType::Mines => mines::view(session),
        GameType::VideoPoker => video_poker::view(session),
        GameType::Blackjack => blackjack::view(session),
        GameType::Bingo => bingo::view(session),
        GameType::Quiz => quiz::view(session),
        _ => Ok(serde_json::Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_is_deterministic() {
        let seed = [7u8; 32];
        let mut a = GameRng::new(&seed, 1, 0);
        let mut b = GameRng::new(&seed, 1, 0);
        for _ in 0..100 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
        let mut c = GameRng::new(&seed, 1, 1);
        let mut a = GameRng::new(&seed, 1, 0);
        let differs = (0..8).any(|_| a.next_u32() != c.next_u32());
        assert!(differs, "move number must change the stream");
    }

    #[test]
    fn test_bounded_draws_stay_in_range() {
        let mut rng = GameRng::new(&[1u8; 32], 2, 0);
        for _ in 0..2000 {
            assert!(rng.next_bounded(37) < 37);
            let v = rng.next_in_range(1000, 10_999);
            assert!((1000..=10_999).contains(&v));
            let f = rng.next_f64_open();
            assert!(f > 0.0 && f < 1.0);
        }
        assert_eq!(rng.next_bounded(0), 0);
        assert_eq!(rng.next_bounded_u32(0), 0);
    }

    #[test]
    fn test_sample_distinct_has_no_duplicates() {
        let mut rng = GameRng::new(&[3u8; 32], 3, 0);
        for _ in 0..50 {
            let mut drawn = rng.sample_distinct(1, 80, 20);
            assert_eq!(drawn.len(), 20);
            assert!(drawn.iter().all(|n| (1..=80).contains(n)));
            drawn.sort_unstable();
            drawn.dedup();
            assert_eq!(drawn.len(), 20);
        }
        assert_eq!(rng.sample_distinct(1, 5, 10).len(), 5);
    }

    #[test]
    fn test_deck_excluding() {
        let mut rng = GameRng::new(&[4u8; 32], 4, 0);
        let deck = rng.create_deck_excluding(&[0, 1, 2, 51]);
        assert_eq!(deck.len(), 48);
        assert!(!deck.contains(&0) && !deck.contains(&51));
        let full = rng.create_deck();
        let mut sorted = full.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..52).collect::<Vec<u8>>());
    }

    #[test]
    fn test_scale_floors() {
        assert_eq!(scale(100, 99, 50), 198);
        assert_eq!(scale(10, 36, 37), 9);
        assert_eq!(scale(u64::MAX, 2, 1), u64::MAX);
        assert_eq!(scale(5, 1, 0), 0);
    }
}
