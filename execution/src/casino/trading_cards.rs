//! Trading-card boosters: each card's rarity is drawn independently and the pack pays the summed
//! card value. The bet is the booster price.
//!
//! Payload format:
//! [booster:u8] (0 = Starter, 1 = Standard, 2 = Premium, 3 = Mystery)

use serde_json::json;

use super::{
    complete, payload::parse_single, weighted::WeightedTable, CasinoGame, GameError, GameResult,
    GameRng,
};
use vcasino_types::casino::GameSession;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }

    pub fn value(&self) -> u64 {
        match self {
            Rarity::Common => 50,
            Rarity::Uncommon => 150,
            Rarity::Rare => 500,
            Rarity::Epic => 1500,
            Rarity::Legendary => 5000,
        }
    }
}

/// Rarity weights in percent.
pub const RARITY_WEIGHTS: [(Rarity, u32); 5] = [
    (Rarity::Common, 60),
    (Rarity::Uncommon, 25),
    (Rarity::Rare, 10),
    (Rarity::Epic, 4),
    (Rarity::Legendary, 1),
];

pub fn rarity_table() -> Result<WeightedTable<Rarity>, GameError> {
    WeightedTable::new(&RARITY_WEIGHTS).ok_or(GameError::InvalidState)
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Booster {
    Starter = 0,
    Standard = 1,
    Premium = 2,
    Mystery = 3,
}

impl TryFrom<u8> for Booster {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Booster::Starter),
            1 => Ok(Booster::Standard),
            2 => Ok(Booster::Premium),
            3 => Ok(Booster::Mystery),
            _ => Err(GameError::InvalidSelection("unknown booster")),
        }
    }
}

impl Booster {
    pub fn as_str(&self) -> &'static str {
        match self {
            Booster::Starter => "starter",
            Booster::Standard => "standard",
            Booster::Premium => "premium",
            Booster::Mystery => "mystery",
        }
    }

    pub fn price(&self) -> u64 {
        match self {
            Booster::Starter => 200,
            Booster::Standard => 500,
            Booster::Premium => 1000,
            Booster::Mystery => 2000,
        }
    }

    pub fn cards(&self) -> usize {
        match self {
            Booster::Starter => 3,
            Booster::Standard => 5,
            Booster::Premium => 8,
            Booster::Mystery => 12,
        }
    }
}

pub fn pack_value(cards: &[Rarity]) -> u64 {
    cards.iter().map(Rarity::value).sum()
}

pub struct TradingCards;

impl CasinoGame for TradingCards {
    fn start(
        session: &mut GameSession,
        payload: &[u8],
        rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        let booster = Booster::try_from(parse_single(payload)?)?;
        if session.bet != booster.price() {
            return Err(GameError::InvalidSelection("bet must equal the booster price"));
        }
        let table = rarity_table()?;
        let cards: Vec<Rarity> = (0..booster.cards()).map(|_| table.sample(rng)).collect();
        let win = pack_value(&cards);
        let classification = if win > session.bet { "profit" } else { "loss" };
        let labels: Vec<&str> = cards.iter().map(Rarity::as_str).collect();
        Ok(complete(
            session,
            classification,
            win,
            json!({ "booster": booster.as_str(), "cards": labels, "value": win }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{create_test_rng, create_test_session};
    use vcasino_types::casino::GameType;

    #[test]
    fn test_rarity_odds() {
        let table = rarity_table().unwrap();
        assert_eq!(table.total_weight(), 100);
        assert_eq!(table.odds(Rarity::Legendary), (1, 100));
        assert_eq!(table.pick(0), Rarity::Common);
        assert_eq!(table.pick(59), Rarity::Common);
        assert_eq!(table.pick(60), Rarity::Uncommon);
        assert_eq!(table.pick(99), Rarity::Legendary);
    }

    #[test]
    fn test_pack_value() {
        assert_eq!(
            pack_value(&[Rarity::Common, Rarity::Rare, Rarity::Legendary]),
            5550
        );
    }

    #[test]
    fn test_booster_round() {
        let mut session = create_test_session(GameType::TradingCards, 1000);
        let mut rng = create_test_rng(8);
        let GameResult::Complete(outcome) =
            TradingCards::start(&mut session, &[2], &mut rng).unwrap()
        else {
            panic!("booster is single shot");
        };
        assert_eq!(outcome.detail["cards"].as_array().unwrap().len(), 8);
        assert!(outcome.win_amount >= 8 * 50);
        assert!(outcome.win_amount <= 8 * 5000);
    }

    #[test]
    fn test_booster_requires_price() {
        let mut session = create_test_session(GameType::TradingCards, 200);
        let mut rng = create_test_rng(1);
        assert!(matches!(
            TradingCards::start(&mut session, &[1], &mut rng),
            Err(GameError::InvalidSelection(_))
        ));
    }
}
