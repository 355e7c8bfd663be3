//! Shared playing-card helpers.
//!
//! Cards are encoded as `0..=51`, where:
//! - suit = card / 13 (0..=3)
//! - rank = card % 13 (0..=12), 0 is Ace and 12 is King

use serde_json::{json, Value};

/// Total cards in a standard deck.
pub(crate) const CARDS_PER_DECK: u8 = 52;

/// Ranks per suit.
pub(crate) const RANKS_PER_SUIT: u8 = 13;

const RANK_LABELS: [&str; 13] = [
    "A", "2", "3", "4", "5", "6", "7", "8", "9", "10", "J", "Q", "K",
];
const SUIT_LABELS: [&str; 4] = ["hearts", "diamonds", "clubs", "spades"];

/// Returns true if `card` is within `0..CARDS_PER_DECK`.
pub(crate) fn is_valid_card(card: u8) -> bool {
    card < CARDS_PER_DECK
}

/// Returns the 0-based rank (0..=12), where 0 is Ace.
pub(crate) fn card_rank(card: u8) -> u8 {
    card % RANKS_PER_SUIT
}

/// Returns the rank for comparisons (2..=14), where Ace is high (14).
pub(crate) fn card_rank_ace_high(card: u8) -> u8 {
    match card_rank(card) {
        0 => 14,
        r => r + 1,
    }
}

/// Returns the suit (0..=3).
pub(crate) fn card_suit(card: u8) -> u8 {
    card / RANKS_PER_SUIT
}

/// Display form of a card, e.g. `{"rank":"Q","suit":"spades"}`.
pub(crate) fn card_json(card: u8) -> Value {
    json!({
        "card": card,
        "rank": RANK_LABELS[card_rank(card) as usize],
        "suit": SUIT_LABELS[(card_suit(card) % 4) as usize],
    })
}

pub(crate) fn cards_json(cards: &[u8]) -> Value {
    Value::Array(cards.iter().map(|&c| card_json(c)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_encoding() {
        assert_eq!(card_rank(0), 0);
        assert_eq!(card_rank_ace_high(0), 14);
        assert_eq!(card_rank_ace_high(12), 13);
        assert_eq!(card_rank_ace_high(1), 2);
        assert_eq!(card_suit(51), 3);
        assert!(!is_valid_card(52));
        assert_eq!(card_json(25)["rank"], "K");
        assert_eq!(card_json(25)["suit"], "diamonds");
    }
}
