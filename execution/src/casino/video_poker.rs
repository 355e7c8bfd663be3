//! Video Poker (Jacks or Better).
//!
//! Five cards are dealt from a shuffled deck. The player holds any subset once; every non-held
//! card is replaced from a fresh shuffle of the 47 cards not dealt, and the final hand is paid
//! from a fixed table expressed as total return.
//!
//! State blob format:
//! [stage:u8] [card1:u8] [card2:u8] [card3:u8] [card4:u8] [card5:u8]
//!
//! Stage: 0 = Deal (awaiting holds), 1 = Draw (final)
//!
//! Payload format:
//! Start: (empty)
//! [holdMask:u8] - bit 0 = hold card 1, bit 1 = hold card 2, etc.

use serde_json::json;

use super::{
    cards, complete, payload::ensure_empty, payload::parse_single, CasinoGame, GameError,
    GameResult, GameRng,
};
use vcasino_types::casino::GameSession;

/// Video Poker stages.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Deal = 0,
    Draw = 1,
}

impl TryFrom<u8> for Stage {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Stage::Deal),
            1 => Ok(Stage::Draw),
            _ => Err(GameError::InvalidState),
        }
    }
}

/// Poker hand rankings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Hand {
    HighCard = 0,
    JacksOrBetter = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
    RoyalFlush = 9,
}

impl Hand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Hand::HighCard => "high_card",
            Hand::JacksOrBetter => "jacks_or_better",
            Hand::TwoPair => "two_pair",
            Hand::ThreeOfAKind => "three_of_a_kind",
            Hand::Straight => "straight",
            Hand::Flush => "flush",
            Hand::FullHouse => "full_house",
            Hand::FourOfAKind => "four_of_a_kind",
            Hand::StraightFlush => "straight_flush",
            Hand::RoyalFlush => "royal_flush",
        }
    }

    /// Total-return multiplier (a high pair gives the stake back).
    pub fn multiplier(&self) -> u64 {
        match self {
            Hand::HighCard => 0,
            Hand::JacksOrBetter => 1,
            Hand::TwoPair => 2,
            Hand::ThreeOfAKind => 3,
            Hand::Straight => 4,
            Hand::Flush => 6,
            Hand::FullHouse => 9,
            Hand::FourOfAKind => 25,
            Hand::StraightFlush => 50,
            Hand::RoyalFlush => 250,
        }
    }
}

/// Evaluate a 5-card poker hand.
pub fn evaluate_hand(hand: &[u8; 5]) -> Hand {
    // Ace high (2..=14).
    let mut ranks = [0u8; 5];
    for (slot, &card) in ranks.iter_mut().zip(hand.iter()) {
        *slot = cards::card_rank_ace_high(card);
    }
    ranks.sort_unstable();

    let suit = cards::card_suit(hand[0]);
    let is_flush = hand.iter().all(|&c| cards::card_suit(c) == suit);

    let distinct = ranks.windows(2).all(|w| w[0] != w[1]);
    let is_wheel = ranks == [2, 3, 4, 5, 14];
    let is_straight = distinct && (ranks[4] - ranks[0] == 4 || is_wheel);

    let mut counts = [0u8; 15];
    for &r in &ranks {
        counts[r as usize] += 1;
    }
    let mut pairs = 0u8;
    let mut high_pair = false;
    let mut trips = false;
    let mut quads = false;
    for (rank, &count) in counts.iter().enumerate() {
        match count {
            2 => {
                pairs += 1;
                high_pair |= rank >= 11;
            }
            3 => trips = true,
            4 => quads = true,
            _ => {}
        }
    }

    if is_straight && is_flush && ranks[0] == 10 {
        Hand::RoyalFlush
    } else if is_straight && is_flush {
        Hand::StraightFlush
    } else if quads {
        Hand::FourOfAKind
    } else if trips && pairs == 1 {
        Hand::FullHouse
    } else if is_flush {
        Hand::Flush
    } else if is_straight {
        Hand::Straight
    } else if trips {
        Hand::ThreeOfAKind
    } else if pairs == 2 {
        Hand::TwoPair
    } else if pairs == 1 && high_pair {
        Hand::JacksOrBetter
    } else {
        Hand::HighCard
    }
}

struct VideoPokerState {
    stage: Stage,
    cards: [u8; 5],
}

fn parse_state(state: &[u8]) -> Result<VideoPokerState, GameError> {
    let [stage, c1, c2, c3, c4, c5] = state else {
        return Err(GameError::InvalidState);
    };
    let cards = [*c1, *c2, *c3, *c4, *c5];
    if !cards.iter().all(|&c| cards::is_valid_card(c)) {
        return Err(GameError::InvalidState);
    }
    Ok(VideoPokerState {
        stage: Stage::try_from(*stage)?,
        cards,
    })
}

fn serialize_state(stage: Stage, cards: &[u8; 5]) -> Vec<u8> {
    let mut out = Vec::with_capacity(6);
    out.push(stage as u8);
    out.extend_from_slice(cards);
    out
}

/// The dealt hand of a round awaiting holds.
pub fn view(session: &GameSession) -> Result<serde_json::Value, GameError> {
    let state = parse_state(&session.state_blob)?;
    Ok(json!({
        "stage": if state.stage == Stage::Deal { "deal" } else { "draw" },
        "cards": cards::cards_json(&state.cards),
        "hand": evaluate_hand(&state.cards).as_str(),
    }))
}

pub struct VideoPoker;

impl CasinoGame for VideoPoker {
    fn start(
        session: &mut GameSession,
        payload: &[u8],
        rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        ensure_empty(payload)?;
        let mut deck = rng.create_deck();
        let mut dealt = [0u8; 5];
        for card in dealt.iter_mut() {
            *card = rng.draw_card(&mut deck).ok_or(GameError::DeckExhausted)?;
        }
        session.state_blob = serialize_state(Stage::Deal, &dealt);
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
        let hold_mask = parse_single(payload)?;
        if hold_mask & !0x1F != 0 {
            return Err(GameError::InvalidPayload);
        }
        let mut state = parse_state(&session.state_blob)?;
        if state.stage != Stage::Deal {
            return Err(GameError::InvalidMove);
        }

        // Discards are not shuffled back in.
        let dealt = state.cards;
        let mut deck = rng.create_deck_excluding(&dealt);
        for (i, card) in state.cards.iter_mut().enumerate() {
            if hold_mask & (1 << i) == 0 {
                *card = rng.draw_card(&mut deck).ok_or(GameError::DeckExhausted)?;
            }
        }
        session.state_blob = serialize_state(Stage::Draw, &state.cards);

        let hand = evaluate_hand(&state.cards);
        let win = session.bet.saturating_mul(hand.multiplier());
        Ok(complete(
            session,
            hand.as_str(),
            win,
            json!({
                "dealt": cards::cards_json(&dealt),
                "held": hold_mask,
                "cards": cards::cards_json(&state.cards),
                "multiplier": hand.multiplier(),
            }),
        ))
    }
}
