//! Commit-reveal seeding for provably fair rounds.
//!
//! ## Flow
//!
//! 1. **Commit** - When a round opens the server publishes `commit = hash(reveal)`
//! 2. **Play** - Every draw of the round comes from [`GameRng`] seeded with the reveal
//! 3. **Reveal** - When the round completes the reveal is disclosed
//! 4. **Verify** - Anyone can check `hash(reveal) == commit` and [`replay_round`] the draws
//!
//! ## Hash Chain
//!
//! Reveals are derived from a server master secret:
//! ```text
//! reveal[n] = hash(master_secret || round_id || "reveal")
//! commit[n] = hash(reveal[n])
//! ```

use commonware_cryptography::sha256::Sha256;
use commonware_cryptography::Hasher;
use thiserror::Error;
use vcasino_types::casino::{GameSession, GameType, PlayerId};

use crate::casino::{process_game_move, start_game, GameError, GameResult, GameRng};

/// Length of commit and reveal values in bytes.
pub const COMMIT_REVEAL_LEN: usize = 32;

/// A commit-reveal pair for one round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitRevealPair {
    /// Published when the round opens.
    pub commit: [u8; COMMIT_REVEAL_LEN],
    /// Disclosed when the round completes.
    pub reveal: [u8; COMMIT_REVEAL_LEN],
}

impl CommitRevealPair {
    pub fn verify(&self) -> bool {
        verify_commit_reveal(&self.commit, &self.reveal)
    }
}

/// Compute a commitment from a reveal value.
pub fn compute_commit(reveal: &[u8; COMMIT_REVEAL_LEN]) -> [u8; COMMIT_REVEAL_LEN] {
    let mut hasher = Sha256::new();
    hasher.update(reveal);
    hasher.finalize().0
}

/// Returns `true` if `commit == hash(reveal)`.
pub fn verify_commit_reveal(
    commit: &[u8; COMMIT_REVEAL_LEN],
    reveal: &[u8; COMMIT_REVEAL_LEN],
) -> bool {
    commit == &compute_commit(reveal)
}

/// Verify a commit-reveal pair supplied as raw bytes (e.g. decoded from hex).
pub fn verify_commit_reveal_slices(
    commit: &[u8],
    reveal: &[u8],
) -> Result<[u8; COMMIT_REVEAL_LEN], CommitRevealError> {
    let commit: [u8; COMMIT_REVEAL_LEN] = commit
        .try_into()
        .map_err(|_| CommitRevealError::InvalidCommitLength(commit.len()))?;
    let reveal: [u8; COMMIT_REVEAL_LEN] = reveal
        .try_into()
        .map_err(|_| CommitRevealError::InvalidRevealLength(reveal.len()))?;
    if verify_commit_reveal(&commit, &reveal) {
        Ok(reveal)
    } else {
        Err(CommitRevealError::VerificationFailed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitRevealError {
    #[error("invalid commit length: {0} (expected 32)")]
    InvalidCommitLength(usize),
    #[error("invalid reveal length: {0} (expected 32)")]
    InvalidRevealLength(usize),
    #[error("commit-reveal verification failed")]
    VerificationFailed,
}

/// Derives per-round commit-reveal pairs from a master secret.
#[derive(Clone)]
pub struct HashChain {
    master_secret: [u8; COMMIT_REVEAL_LEN],
}

impl HashChain {
    pub fn from_secret(master_secret: [u8; COMMIT_REVEAL_LEN]) -> Self {
        Self { master_secret }
    }

    /// Generate a chain from a caller-supplied entropy source.
    pub fn random(rng: &mut impl rand::RngCore) -> Self {
        let mut master_secret = [0u8; COMMIT_REVEAL_LEN];
        rng.fill_bytes(&mut master_secret);
        Self { master_secret }
    }

    pub fn generate(&self, round_id: u64) -> CommitRevealPair {
        let reveal = self.derive_reveal(round_id);
        let commit = compute_commit(&reveal);
        CommitRevealPair { commit, reveal }
    }

    pub fn derive_reveal(&self, round_id: u64) -> [u8; COMMIT_REVEAL_LEN] {
        let mut hasher = Sha256::new();
        hasher.update(&self.master_secret);
        hasher.update(&round_id.to_be_bytes());
        hasher.update(b"reveal");
        hasher.finalize().0
    }
}

impl std::fmt::Debug for HashChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HashChain").finish_non_exhaustive()
    }
}

/// RNG for move `move_number` of round `round_id` (the opening move is 0).
pub fn round_rng(reveal: &[u8; COMMIT_REVEAL_LEN], round_id: u64, move_number: u32) -> GameRng {
    GameRng::new(reveal, round_id, move_number)
}

/// Re-run a finished round from its reveal and the payloads the server accepted.
///
/// Returns the result of the last move, which for a complete transcript is the outcome the
/// ledger settled.
pub fn replay_round(
    round_id: u64,
    game_type: GameType,
    bet: u64,
    reveal: &[u8; COMMIT_REVEAL_LEN],
    start_payload: &[u8],
    moves: &[Vec<u8>],
) -> Result<GameResult, GameError> {
    let mut session = GameSession::new(round_id, PlayerId(0), game_type, bet, 0);
    session.commit = compute_commit(reveal);
    let mut rng = round_rng(reveal, round_id, 0);
    let mut result = start_game(&mut session, start_payload, &mut rng)?;
    for payload in moves {
        session.move_count += 1;
        let mut rng = round_rng(reveal, round_id, session.move_count);
        result = process_game_move(&mut session, payload, &mut rng)?;
    }
    Ok(result)
}
