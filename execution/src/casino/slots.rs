//! Diamond slots with a locking respin chain.
//!
//! Six independent reel positions draw from a weighted symbol pool. A diamond locks its position
//! for the rest of the round. After every spin step that locked at least one new diamond, the
//! still-unlocked positions are spun again; the chain ends when a step locks nothing new or all six
//! positions hold diamonds. The round pays `bet * SPECIAL_MULTIPLIERS[diamonds]`.
//!
//! Payload format:
//! (empty)
//!
//! The whole chain resolves inside the opening move; the outcome detail lists every step so the
//! presentation layer can animate the respins.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::str::FromStr;

use super::{
    complete, payload::ensure_empty, weighted::WeightedTable, CasinoGame, GameError, GameResult,
    GameRng,
};
use vcasino_types::casino::GameSession;

/// Number of reel positions.
pub const REEL_COUNT: usize = 6;

/// Payout multiplier indexed by the number of locked diamonds.
pub const SPECIAL_MULTIPLIERS: [u64; REEL_COUNT + 1] = [0, 1, 2, 5, 12, 40, 200];

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Cherry = 0,
    Lemon = 1,
    Orange = 2,
    Grapes = 3,
    Star = 4,
    Seven = 5,
    /// The special symbol: locks its position and drives the respin chain.
    Diamond = 6,
}

/// Symbol pool weights (total 16).
pub const SYMBOL_WEIGHTS: [(SymbolKind, u32); 7] = [
    (SymbolKind::Cherry, 3),
    (SymbolKind::Lemon, 3),
    (SymbolKind::Orange, 3),
    (SymbolKind::Grapes, 3),
    (SymbolKind::Star, 2),
    (SymbolKind::Seven, 1),
    (SymbolKind::Diamond, 1),
];

impl SymbolKind {
    pub fn is_special(&self) -> bool {
        *self == SymbolKind::Diamond
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cherry => "cherry",
            Self::Lemon => "lemon",
            Self::Orange => "orange",
            Self::Grapes => "grapes",
            Self::Star => "star",
            Self::Seven => "seven",
            Self::Diamond => "diamond",
        }
    }
}

impl FromStr for SymbolKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SYMBOL_WEIGHTS
            .iter()
            .map(|(kind, _)| *kind)
            .find(|kind| kind.as_str() == s)
            .ok_or(GameError::InvalidSelection("unknown slot symbol"))
    }
}

/// The symbol pool used by every slot round.
pub fn symbol_table() -> WeightedTable<SymbolKind> {
    // The weights are a non-empty constant table with a positive total.
    WeightedTable::new(&SYMBOL_WEIGHTS).unwrap_or_else(|| unreachable!("slot weights are non-zero"))
}

/// Payout for a terminal special count.
pub fn payout(bet: u64, special_count: u8) -> u64 {
    let multiplier = SPECIAL_MULTIPLIERS
        .get(special_count as usize)
        .copied()
        .unwrap_or(0);
    bet.saturating_mul(multiplier)
}

/// Count diamonds in a finished reel set.
pub fn count_specials(symbols: &[SymbolKind]) -> u8 {
    symbols.iter().filter(|s| s.is_special()).count() as u8
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotClassification {
    NoWin,
    Diamonds(u8),
    UltraJackpot,
}

impl SlotClassification {
    pub fn from_special_count(count: u8) -> Self {
        match count {
            0 => Self::NoWin,
            c if c as usize >= REEL_COUNT => Self::UltraJackpot,
            c => Self::Diamonds(c),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::NoWin => "no_win".to_string(),
            Self::Diamonds(n) => format!("diamonds_{n}"),
            Self::UltraJackpot => "ultra_jackpot".to_string(),
        }
    }
}

/// What one spin step drew and locked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinStep {
    /// `(position, symbol)` for every position spun this step.
    pub drawn: Vec<(usize, SymbolKind)>,
    pub new_locks: Vec<usize>,
    pub special_count: u8,
}

/// Reel state for one round of diamond slots.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SlotRound {
    symbols: [Option<SymbolKind>; REEL_COUNT],
    locked: [bool; REEL_COUNT],
    steps: Vec<SpinStep>,
    terminal: bool,
}

impl Default for SlotRound {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotRound {
    pub fn new() -> Self {
        Self {
            symbols: [None; REEL_COUNT],
            locked: [false; REEL_COUNT],
            steps: Vec::new(),
            terminal: false,
        }
    }

    pub fn special_count(&self) -> u8 {
        self.locked.iter().filter(|&&l| l).count() as u8
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn is_locked(&self, position: usize) -> bool {
        self.locked.get(position).copied().unwrap_or(false)
    }

    pub fn symbols(&self) -> &[Option<SymbolKind>; REEL_COUNT] {
        &self.symbols
    }

    pub fn steps(&self) -> &[SpinStep] {
        &self.steps
    }

    /// Positions the next spin step will draw for.
    pub fn unlocked_positions(&self) -> Vec<usize> {
        (0..REEL_COUNT).filter(|&i| !self.locked[i]).collect()
    }

    /// Run one spin step, asking `draw` for a symbol at every unlocked position.
    ///
    /// Locked positions are never offered to `draw`.
    pub fn spin_step_with(
        &mut self,
        mut draw: impl FnMut(usize) -> SymbolKind,
    ) -> Result<&SpinStep, GameError> {
        if self.terminal {
            return Err(GameError::RoundComplete);
        }

        let mut drawn = Vec::with_capacity(REEL_COUNT);
        let mut new_locks = Vec::new();
        for position in self.unlocked_positions() {
            let symbol = draw(position);
            self.symbols[position] = Some(symbol);
            drawn.push((position, symbol));
            if symbol.is_special() {
                self.locked[position] = true;
                new_locks.push(position);
            }
        }

        let special_count = self.special_count();
        if new_locks.is_empty() || special_count as usize == REEL_COUNT {
            self.terminal = true;
        }
        self.steps.push(SpinStep {
            drawn,
            new_locks,
            special_count,
        });
        Ok(self.steps.last().unwrap_or_else(|| unreachable!("step just pushed")))
    }

    pub fn spin_step(
        &mut self,
        table: &WeightedTable<SymbolKind>,
        rng: &mut GameRng,
    ) -> Result<&SpinStep, GameError> {
        self.spin_step_with(|_| table.sample(rng))
    }

    /// Spin until the chain terminates. At most `REEL_COUNT` steps can lock something, so this
    /// runs at most `REEL_COUNT + 1` steps.
    pub fn run(&mut self, table: &WeightedTable<SymbolKind>, rng: &mut GameRng) {
        while !self.terminal {
            // Cannot fail: the loop condition excludes the terminal state.
            let _ = self.spin_step(table, rng);
        }
    }

    pub fn classification(&self) -> SlotClassification {
        SlotClassification::from_special_count(self.special_count())
    }

    pub fn payout(&self, bet: u64) -> u64 {
        payout(bet, self.special_count())
    }

    pub fn detail(&self) -> serde_json::Value {
        let symbols: Vec<&str> = self
            .symbols
            .iter()
            .map(|s| s.map(|s| s.as_str()).unwrap_or(""))
            .collect();
        json!({
            "symbols": symbols,
            "locked": self.locked,
            "specialCount": self.special_count(),
            "respins": self.steps.len().saturating_sub(1),
            "steps": self.steps,
            "ultraJackpot": self.classification() == SlotClassification::UltraJackpot,
        })
    }
}

pub struct Slots;

impl CasinoGame for Slots {
    fn start(
        session: &mut GameSession,
        payload: &[u8],
        rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        ensure_empty(payload)?;
        let table = symbol_table();
        let mut round = SlotRound::new();
        round.run(&table, rng);
        session.state_blob.clear();

        let win = round.payout(session.bet);
        Ok(complete(
            session,
            &round.classification().label(),
            win,
            round.detail(),
        ))
    }
}
