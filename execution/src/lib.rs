//! vcasino execution layer.
//!
//! This crate owns every balance change in the casino. Games (in [`casino`]) turn a bet and a
//! stream of seeded draws into an outcome; the [`Ledger`] validates bets, deducts and credits
//! balances, and appends history; [`fairness`] derives the per-round seeds and lets anyone check a
//! finished round against the commitment published when it opened.
//!
//! ## Determinism requirements
//! - Games never read wall-clock time. The only clock input is the elapsed time the ledger stamps
//!   into crash moves.
//! - Games draw randomness only from the [`GameRng`] they are handed.
//! - Avoid iteration order of hash-based collections influencing outputs.
//!
//! ## Minimal round (example)
//! ```rust
//! # #[cfg(feature = "mocks")]
//! # {
//! use vcasino_execution::mocks::{create_funded_player, create_test_ledger};
//! use vcasino_types::casino::GameType;
//!
//! # futures::executor::block_on(async {
//! let mut ledger = create_test_ledger();
//! let player = create_funded_player(&mut ledger, 1, 1_000).await;
//! let update = ledger
//!     .begin_round(player.id, GameType::Dice, 100, &[50], 0)
//!     .await
//!     .unwrap();
//! let settlement = update.settlement.expect("dice settles in one move");
//! assert_eq!(update.balance, 900 + settlement.outcome.win_amount);
//! # });
//! # }
//! ```

pub mod casino;
pub mod fairness;
pub mod ledger;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

mod state;

pub use casino::{process_game_move, start_game, view_game, GameError, GameResult, GameRng};
pub use fairness::{
    compute_commit, replay_round, round_rng, verify_commit_reveal, verify_commit_reveal_slices,
    CommitRevealError, CommitRevealPair, HashChain, COMMIT_REVEAL_LEN,
};
pub use ledger::{
    BonusClaim, Ledger, LedgerConfig, LedgerError, RoundUpdate, Settlement, SlotSubmission,
};
pub use state::{Memory, Staged, State, Status};
