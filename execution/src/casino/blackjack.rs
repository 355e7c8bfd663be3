//! Blackjack against a dealer who hits below 17.
//!
//! Cards are dealt player, dealer, player, dealer from one shoe per round; later draws come from
//! the cards not yet on the table. A player 21 on the deal sends the dealer straight to play. Hitting
//! to 21 stands automatically and going over 21 loses. A player total above the dealer's (or a
//! dealer bust) returns twice the bet and a push returns the bet. A natural pays like any other win.
//!
//! State blob format:
//! [stage:u8] [playerLen:u8] [playerCards...] [dealerLen:u8] [dealerCards...]
//!
//! Stage: 0 = PlayerTurn, 1 = Complete
//!
//! Payload format:
//! Start: (empty)
//! [0] = Hit
//! [1] = Stand

use serde_json::json;

use super::{
    cards, complete, payload::ensure_empty, payload::parse_single,
    serialization::StateReader, serialization::StateWriter, CasinoGame, GameError, GameResult,
    GameRng,
};
use vcasino_types::casino::GameSession;

/// Most cards a hand can hold without busting (A,A,A,A,2,2,2,2,3,3,3 = 21).
const MAX_HAND_SIZE: usize = 11;
const DEALER_STANDS_ON: u8 = 17;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    PlayerTurn = 0,
    Complete = 1,
}

impl TryFrom<u8> for Stage {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Stage::PlayerTurn),
            1 => Ok(Stage::Complete),
            _ => Err(GameError::InvalidState),
        }
    }
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Move {
    Hit = 0,
    Stand = 1,
}

impl TryFrom<u8> for Move {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Move::Hit),
            1 => Ok(Move::Stand),
            _ => Err(GameError::InvalidPayload),
        }
    }
}

/// How a finished hand went for the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Bust,
    DealerBust,
    Win,
    Push,
    Lose,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Bust => "bust",
            Verdict::DealerBust => "dealer_bust",
            Verdict::Win => "win",
            Verdict::Push => "push",
            Verdict::Lose => "lose",
        }
    }

    /// Total return on `bet`.
    pub fn payout(&self, bet: u64) -> u64 {
        match self {
            Verdict::DealerBust | Verdict::Win => bet.saturating_mul(2),
            Verdict::Push => bet,
            Verdict::Bust | Verdict::Lose => 0,
        }
    }
}

/// Calculate the value of a blackjack hand, returning `(total, is_soft)`.
pub fn hand_value(hand: &[u8]) -> (u8, bool) {
    let mut value: u16 = 0;
    let mut aces: u8 = 0;
    for &card in hand {
        let rank = cards::card_rank(card) + 1; // 1=Ace, 2-10, 11=J, 12=Q, 13=K
        if rank == 1 {
            aces += 1;
            value += 11;
        } else {
            value += rank.min(10) as u16;
        }
    }
    while value > 21 && aces > 0 {
        value -= 10;
        aces -= 1;
    }
    (value.min(255) as u8, aces > 0)
}

/// Compare final totals once the dealer has played.
pub fn settle(player_total: u8, dealer_total: u8) -> Verdict {
    if player_total > 21 {
        Verdict::Bust
    } else if dealer_total > 21 {
        Verdict::DealerBust
    } else if player_total > dealer_total {
        Verdict::Win
    } else if player_total == dealer_total {
        Verdict::Push
    } else {
        Verdict::Lose
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct BlackjackState {
    stage: Stage,
    player: Vec<u8>,
    dealer: Vec<u8>,
}

impl BlackjackState {
    fn on_table(&self) -> Vec<u8> {
        self.player.iter().chain(self.dealer.iter()).copied().collect()
    }

    fn encode(&self) -> Vec<u8> {
        let mut writer = StateWriter::with_capacity(3 + self.player.len() + self.dealer.len());
        writer.push_u8(self.stage as u8);
        writer.push_u8_prefixed(&self.player);
        writer.push_u8_prefixed(&self.dealer);
        writer.into_inner()
    }

    fn decode(blob: &[u8]) -> Result<Self, GameError> {
        let mut reader = StateReader::new(blob);
        let stage = Stage::try_from(reader.read_u8().ok_or(GameError::InvalidState)?)?;
        let player = reader.read_u8_prefixed().ok_or(GameError::InvalidState)?;
        let dealer = reader.read_u8_prefixed().ok_or(GameError::InvalidState)?;
        let valid_hand = |hand: &[u8]| {
            (2..=MAX_HAND_SIZE + 1).contains(&hand.len())
                && hand.iter().all(|&c| cards::is_valid_card(c))
        };
        if reader.remaining() != 0 || !valid_hand(&player) || !valid_hand(&dealer) {
            return Err(GameError::InvalidState);
        }
        Ok(Self {
            stage,
            player,
            dealer,
        })
    }
}

/// Player's hand plus the dealer's up card; the hole card stays hidden.
pub fn view(session: &GameSession) -> Result<serde_json::Value, GameError> {
    let state = BlackjackState::decode(&session.state_blob)?;
    Ok(json!({
        "player": cards::cards_json(&state.player),
        "playerTotal": hand_value(&state.player).0,
        "dealerUpCard": cards::card_json(state.dealer[0]),
        "dealerVisibleTotal": hand_value(&state.dealer[..1]).0,
    }))
}

fn draw(rng: &mut GameRng, deck: &mut Vec<u8>) -> Result<u8, GameError> {
    rng.draw_card(deck).ok_or(GameError::DeckExhausted)
}

/// Play out the dealer's hand, then settle the round.
fn finish(
    session: &mut GameSession,
    mut state: BlackjackState,
    deck: &mut Vec<u8>,
    rng: &mut GameRng,
) -> Result<GameResult, GameError> {
    let player_total = hand_value(&state.player).0;
    if player_total <= 21 {
        while hand_value(&state.dealer).0 < DEALER_STANDS_ON {
            let card = draw(rng, deck)?;
            state.dealer.push(card);
        }
    }
    let dealer_total = hand_value(&state.dealer).0;
    let verdict = settle(player_total, dealer_total);
    state.stage = Stage::Complete;
    session.state_blob = state.encode();
    Ok(complete(
        session,
        verdict.as_str(),
        verdict.payout(session.bet),
        json!({
            "player": cards::cards_json(&state.player),
            "dealer": cards::cards_json(&state.dealer),
            "playerTotal": player_total,
            "dealerTotal": dealer_total,
        }),
    ))
}

pub struct Blackjack;

impl CasinoGame for Blackjack {
    fn start(
        session: &mut GameSession,
        payload: &[u8],
        rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        ensure_empty(payload)?;
        let mut deck = rng.create_deck();
        let mut player = Vec::with_capacity(MAX_HAND_SIZE);
        let mut dealer = Vec::with_capacity(MAX_HAND_SIZE);
        for _ in 0..2 {
            player.push(draw(rng, &mut deck)?);
            dealer.push(draw(rng, &mut deck)?);
        }
        let state = BlackjackState {
            stage: Stage::PlayerTurn,
            player,
            dealer,
        };
        if hand_value(&state.player).0 == 21 {
            return finish(session, state, &mut deck, rng);
        }
        session.state_blob = state.encode();
        Ok(GameResult::Continue(view(session)?))
    }

    fn process_move(
        session: &mut GameSession,
        payload: &[u8],
        rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        if session.is_complete {
            return Err(GameError::RoundComplete);
        }
        let action = Move::try_from(parse_single(payload)?)?;
        let mut state = BlackjackState::decode(&session.state_blob)?;
        if state.stage != Stage::PlayerTurn {
            return Err(GameError::InvalidMove);
        }
        let mut deck = rng.create_deck_excluding(&state.on_table());

        match action {
            Move::Hit => {
                if state.player.len() >= MAX_HAND_SIZE {
                    return Err(GameError::InvalidMove);
                }
                let card = draw(rng, &mut deck)?;
                state.player.push(card);
                if hand_value(&state.player).0 >= 21 {
                    return finish(session, state, &mut deck, rng);
                }
                session.state_blob = state.encode();
                Ok(GameResult::Continue(view(session)?))
            }
            Move::Stand => finish(session, state, &mut deck, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{create_test_rng, create_test_session};
    use vcasino_types::casino::GameType;

    fn session_with(player: &[u8], dealer: &[u8]) -> GameSession {
        let mut session = create_test_session(GameType::Blackjack, 100);
        session.state_blob = BlackjackState {
            stage: Stage::PlayerTurn,
            player: player.to_vec(),
            dealer: dealer.to_vec(),
        }
        .encode();
        session
    }

    #[test]
    fn test_hand_value() {
        assert_eq!(hand_value(&[0, 12]), (21, true)); // A K
        assert_eq!(hand_value(&[0, 13, 8]), (21, true)); // A A 9
        assert_eq!(hand_value(&[0, 13, 26, 39]), (14, true)); // A A A A
        assert_eq!(hand_value(&[9, 10, 11]), (30, false)); // 10 J Q
        assert_eq!(hand_value(&[0, 5, 9]), (17, false)); // A 6 10
    }

    #[test]
    fn test_settle_table() {
        assert_eq!(settle(22, 17), Verdict::Bust);
        assert_eq!(settle(20, 22), Verdict::DealerBust);
        assert_eq!(settle(20, 19), Verdict::Win);
        assert_eq!(settle(18, 18), Verdict::Push);
        assert_eq!(settle(17, 18), Verdict::Lose);
        assert_eq!(Verdict::Win.payout(50), 100);
        assert_eq!(Verdict::DealerBust.payout(50), 100);
        assert_eq!(Verdict::Push.payout(50), 50);
        assert_eq!(Verdict::Lose.payout(50), 0);
    }

    #[test]
    fn test_stand_settles_against_dealer() {
        // Player 10+9 = 19, dealer K+7 = 17 stands.
        let mut session = session_with(&[9, 21], &[12, 6]);
        let mut rng = create_test_rng(1);
        let GameResult::Complete(outcome) =
            Blackjack::process_move(&mut session, &[1], &mut rng).unwrap()
        else {
            panic!("stand completes the round");
        };
        assert_eq!(outcome.classification, "win");
        assert_eq!(outcome.win_amount, 200);
    }

    #[test]
    fn test_hit_until_done() {
        for seed in 0..30 {
            let mut session = session_with(&[1, 2], &[12, 5]); // 2+3 vs K+6
            let mut rng = create_test_rng(seed);
            loop {
                match Blackjack::process_move(&mut session, &[0], &mut rng).unwrap() {
                    GameResult::Continue(view) => {
                        assert!(view["playerTotal"].as_u64().unwrap() < 21);
                    }
                    GameResult::Complete(outcome) => {
                        let state = BlackjackState::decode(&session.state_blob).unwrap();
                        let total = hand_value(&state.player).0;
                        assert!(total >= 21);
                        if total > 21 {
                            assert_eq!(outcome.classification, "bust");
                            assert_eq!(state.dealer.len(), 2, "dealer skips play on a bust");
                        }
                        let mut all = state.on_table();
                        all.sort_unstable();
                        all.dedup();
                        assert_eq!(all.len(), state.player.len() + state.dealer.len());
                        break;
                    }
                }
            }
        }
    }

    #[test]
    fn test_dealer_draws_to_seventeen() {
        for seed in 0..30 {
            let mut session = session_with(&[9, 22], &[1, 2]); // 20 vs 2+3
            let mut rng = create_test_rng(seed);
            Blackjack::process_move(&mut session, &[1], &mut rng).unwrap();
            let state = BlackjackState::decode(&session.state_blob).unwrap();
            assert!(hand_value(&state.dealer).0 >= DEALER_STANDS_ON);
            assert_eq!(state.stage, Stage::Complete);
        }
    }

    #[test]
    fn test_start_deals_two_each() {
        for seed in 0..20 {
            let mut session = create_test_session(GameType::Blackjack, 10);
            let mut rng = create_test_rng(seed);
            let result = Blackjack::start(&mut session, &[], &mut rng).unwrap();
            let state = BlackjackState::decode(&session.state_blob).unwrap();
            if hand_value(&state.player).0 == 21 {
                assert!(result.is_complete());
            } else {
                let GameResult::Continue(view) = result else {
                    panic!("round stays open");
                };
                assert!(view.get("dealer").is_none());
                assert_eq!(state.player.len(), 2);
                assert_eq!(state.dealer.len(), 2);
            }
        }
    }

    #[test]
    fn test_rejects_unknown_move() {
        let mut session = session_with(&[1, 2], &[12, 5]);
        let mut rng = create_test_rng(1);
        assert_eq!(
            Blackjack::process_move(&mut session, &[2], &mut rng),
            Err(GameError::InvalidPayload)
        );
    }
}
