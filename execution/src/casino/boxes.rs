//! Box opening and box battles. In both, the bet is the price of the box (or battle seat).
//!
//! Box opening pays a uniform amount from the tier's inclusive prize range. A box battle scores
//! every seat uniformly in `1000..=10999`; the top three places share the pot
//! (`cost * players`) 60/30/10 and the player wins ties.
//!
//! Payload format:
//! Box opening: [tier:u8] (0 = Bronze, 1 = Silver, 2 = Gold, 3 = Diamond)
//! Box battle: [mode:u8] (0 = 1v1, 1 = 1v1v1v1, 2 = 2v2, 3 = 3v3, 4 = 2v2v2)

use serde_json::json;

use super::{complete, payload::parse_single, scale, CasinoGame, GameError, GameResult, GameRng};
use vcasino_types::casino::GameSession;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoxTier {
    Bronze = 0,
    Silver = 1,
    Gold = 2,
    Diamond = 3,
}

impl TryFrom<u8> for BoxTier {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(BoxTier::Bronze),
            1 => Ok(BoxTier::Silver),
            2 => Ok(BoxTier::Gold),
            3 => Ok(BoxTier::Diamond),
            _ => Err(GameError::InvalidSelection("unknown box tier")),
        }
    }
}

impl BoxTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoxTier::Bronze => "bronze",
            BoxTier::Silver => "silver",
            BoxTier::Gold => "gold",
            BoxTier::Diamond => "diamond",
        }
    }

    pub fn price(&self) -> u64 {
        match self {
            BoxTier::Bronze => 100,
            BoxTier::Silver => 500,
            BoxTier::Gold => 1000,
            BoxTier::Diamond => 2500,
        }
    }

    /// Inclusive prize range.
    pub fn prize_range(&self) -> (u32, u32) {
        match self {
            BoxTier::Bronze => (10, 300),
            BoxTier::Silver => (100, 1500),
            BoxTier::Gold => (300, 3000),
            BoxTier::Diamond => (1000, 10_000),
        }
    }
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BattleMode {
    OneVsOne = 0,
    FourWay = 1,
    TwoVsTwo = 2,
    ThreeVsThree = 3,
    TwoVsTwoVsTwo = 4,
}

impl TryFrom<u8> for BattleMode {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(BattleMode::OneVsOne),
            1 => Ok(BattleMode::FourWay),
            2 => Ok(BattleMode::TwoVsTwo),
            3 => Ok(BattleMode::ThreeVsThree),
            4 => Ok(BattleMode::TwoVsTwoVsTwo),
            _ => Err(GameError::InvalidSelection("unknown battle mode")),
        }
    }
}

impl BattleMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BattleMode::OneVsOne => "1v1",
            BattleMode::FourWay => "1v1v1v1",
            BattleMode::TwoVsTwo => "2v2",
            BattleMode::ThreeVsThree => "3v3",
            BattleMode::TwoVsTwoVsTwo => "2v2v2",
        }
    }

    pub fn players(&self) -> u8 {
        match self {
            BattleMode::OneVsOne => 2,
            BattleMode::FourWay | BattleMode::TwoVsTwo => 4,
            BattleMode::ThreeVsThree | BattleMode::TwoVsTwoVsTwo => 6,
        }
    }

    pub fn cost(&self) -> u64 {
        match self {
            BattleMode::OneVsOne => 500,
            BattleMode::FourWay => 400,
            BattleMode::TwoVsTwo => 600,
            BattleMode::ThreeVsThree => 800,
            BattleMode::TwoVsTwoVsTwo => 700,
        }
    }

    pub fn pot(&self) -> u64 {
        self.cost() * self.players() as u64
    }
}

pub const SCORE_MIN: u32 = 1000;
pub const SCORE_MAX: u32 = 10_999;
/// Pot share in percent for places 1, 2 and 3.
pub const PLACE_SHARES: [u64; 3] = [60, 30, 10];

/// 1-based place of the player; opponents must strictly beat the player's score to rank above.
pub fn player_place(player_score: u32, opponents: &[u32]) -> usize {
    1 + opponents.iter().filter(|&&s| s > player_score).count()
}

/// Share of the pot paid for `place`.
pub fn place_payout(pot: u64, place: usize) -> u64 {
    PLACE_SHARES
        .get(place.wrapping_sub(1))
        .map_or(0, |&share| scale(pot, share, 100))
}

fn profit_label(win: u64, bet: u64) -> &'static str {
    if win > bet {
        "profit"
    } else {
        "loss"
    }
}

pub struct BoxOpening;

impl CasinoGame for BoxOpening {
    fn start(
        session: &mut GameSession,
        payload: &[u8],
        rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        let tier = BoxTier::try_from(parse_single(payload)?)?;
        if session.bet != tier.price() {
            return Err(GameError::InvalidSelection("bet must equal the box price"));
        }
        let (low, high) = tier.prize_range();
        let win = rng.next_in_range(low, high) as u64;
        Ok(complete(
            session,
            profit_label(win, session.bet),
            win,
            json!({ "tier": tier.as_str(), "price": tier.price(), "prize": win }),
        ))
    }
}

pub struct BoxBattle;

impl CasinoGame for BoxBattle {
    fn start(
        session: &mut GameSession,
        payload: &[u8],
        rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        let mode = BattleMode::try_from(parse_single(payload)?)?;
        if session.bet != mode.cost() {
            return Err(GameError::InvalidSelection("bet must equal the battle cost"));
        }
        let player_score = rng.next_in_range(SCORE_MIN, SCORE_MAX);
        let opponents: Vec<u32> = (1..mode.players())
            .map(|_| rng.next_in_range(SCORE_MIN, SCORE_MAX))
            .collect();
        let place = player_place(player_score, &opponents);
        let win = place_payout(mode.pot(), place);
        let classification = match place {
            1 => "first",
            2 => "second",
            3 => "third",
            _ => "unplaced",
        };
        Ok(complete(
            session,
            classification,
            win,
            json!({
                "mode": mode.as_str(),
                "playerScore": player_score,
                "opponentScores": opponents,
                "place": place,
                "pot": mode.pot(),
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
    fn test_box_prize_in_tier_range() {
        for tier in 0..4u8 {
            let parsed = BoxTier::try_from(tier).unwrap();
            let (low, high) = parsed.prize_range();
            for seed in 0..20 {
                let mut session = create_test_session(GameType::BoxOpening, parsed.price());
                let mut rng = create_test_rng(seed);
                let GameResult::Complete(outcome) =
                    BoxOpening::start(&mut session, &[tier], &mut rng).unwrap()
                else {
                    panic!("box opening is single shot");
                };
                assert!((low as u64..=high as u64).contains(&outcome.win_amount));
            }
        }
    }

    #[test]
    fn test_box_requires_exact_price() {
        let mut session = create_test_session(GameType::BoxOpening, 99);
        let mut rng = create_test_rng(1);
        assert!(matches!(
            BoxOpening::start(&mut session, &[0], &mut rng),
            Err(GameError::InvalidSelection(_))
        ));
        assert!(matches!(
            BoxOpening::start(&mut session, &[4], &mut rng),
            Err(GameError::InvalidSelection(_))
        ));
    }

    #[test]
    fn test_places_and_shares() {
        assert_eq!(player_place(5000, &[4000, 3000]), 1);
        assert_eq!(player_place(5000, &[5000, 3000]), 1);
        assert_eq!(player_place(5000, &[6000, 3000, 7000]), 3);
        assert_eq!(place_payout(1000, 1), 600);
        assert_eq!(place_payout(1000, 2), 300);
        assert_eq!(place_payout(1000, 3), 100);
        assert_eq!(place_payout(1000, 4), 0);
        assert_eq!(place_payout(1000, 0), 0);
        assert_eq!(BattleMode::TwoVsTwoVsTwo.pot(), 4200);
    }

    #[test]
    fn test_battle_round() {
        let mut session = create_test_session(GameType::BoxBattle, 800);
        let mut rng = create_test_rng(4);
        let GameResult::Complete(outcome) =
            BoxBattle::start(&mut session, &[3], &mut rng).unwrap()
        else {
            panic!("box battle is single shot");
        };
        assert_eq!(outcome.detail["opponentScores"].as_array().unwrap().len(), 5);
        let place = outcome.detail["place"].as_u64().unwrap() as usize;
        assert_eq!(outcome.win_amount, place_payout(4800, place));
    }
}
