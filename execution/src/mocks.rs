//! Helpers for tests in this crate and in downstream crates (behind the `mocks` feature).

use crate::{
    casino::GameRng,
    fairness::HashChain,
    ledger::{Ledger, LedgerConfig},
    state::{Memory, State, Status},
};
use anyhow::{bail, Result};
use vcasino_types::{
    casino::{GameSession, GameType, Player, PlayerId, PlayerKind},
    execution::{Key, Value},
};

/// Master secret used by every test hash chain.
pub const TEST_SECRET: [u8; 32] = [42u8; 32];

/// Creates the hash chain used by test ledgers.
pub fn create_test_chain() -> HashChain {
    HashChain::from_secret(TEST_SECRET)
}

/// Creates a round seed from the test hash chain.
pub fn create_test_seed() -> [u8; 32] {
    create_test_chain().derive_reveal(1)
}

/// Creates a game RNG for the test seed; `salt` stands in for the round id.
pub fn create_test_rng(salt: u64) -> GameRng {
    GameRng::new(&create_test_seed(), salt, 0)
}

/// Creates a fresh session owned by player 1.
pub fn create_test_session(game_type: GameType, bet: u64) -> GameSession {
    GameSession::new(1, PlayerId(1), game_type, bet, 0)
}

/// Creates an in-memory ledger with default configuration.
pub fn create_test_ledger() -> Ledger<Memory> {
    Ledger::new(Memory::default(), create_test_chain(), LedgerConfig::default())
}

/// Restores a registered player with the given balance into `ledger`.
pub async fn create_funded_player<S: State>(
    ledger: &mut Ledger<S>,
    id: u64,
    balance: u64,
) -> Player {
    let player = Player::with_balance(
        PlayerId(id),
        format!("player{id}"),
        PlayerKind::Registered,
        balance,
        0,
    );
    ledger
        .restore(player.clone(), vec![])
        .await
        .expect("restore test player");
    player
}

/// In-memory state whose writes can be made to fail.
#[derive(Default)]
pub struct FailingState {
    inner: Memory,
    fail: bool,
}

impl FailingState {
    pub fn fail_writes(&mut self, fail: bool) {
        self.fail = fail;
    }
}

impl State for FailingState {
    async fn get(&self, key: &Key) -> Result<Option<Value>> {
        self.inner.get(key).await
    }

    async fn insert(&mut self, key: Key, value: Value) -> Result<()> {
        if self.fail {
            bail!("write refused");
        }
        self.inner.insert(key, value).await
    }

    async fn delete(&mut self, key: &Key) -> Result<()> {
        if self.fail {
            bail!("write refused");
        }
        self.inner.delete(key).await
    }

    async fn apply(&mut self, changes: Vec<(Key, Status)>) -> Result<()> {
        if self.fail {
            bail!("write refused");
        }
        self.inner.apply(changes).await
    }
}
