//! Plinko: a ball lands in one of 16 buckets following a clamped normal distribution.
//!
//! The bucket is `clamp(round(g * 2.5 + 7.5), 0, 15)` where `g` is a standard normal draw from the
//! Box-Muller transform. Edge buckets pay the most.
//!
//! Payload format:
//! (empty)

use serde_json::json;

use super::{complete, payload::ensure_empty, scale, CasinoGame, GameError, GameResult, GameRng};
use vcasino_types::casino::GameSession;

pub const BUCKETS: usize = 16;

/// Bucket multipliers in tenths (16x, 9x, ... 0.3x, ... 16x).
pub const BUCKET_MULTIPLIERS_TENTHS: [u64; BUCKETS] =
    [160, 90, 40, 20, 10, 5, 3, 5, 5, 3, 5, 10, 20, 40, 90, 160];

const SPREAD: f64 = 2.5;
const CENTER: f64 = 7.5;

/// Standard normal sample from two uniforms in `(0, 1)`.
pub fn box_muller(u: f64, v: f64) -> f64 {
    (-2.0 * u.ln()).sqrt() * (2.0 * std::f64::consts::PI * v).cos()
}

/// Map a normal sample to a bucket index (half-way values round up).
pub fn bucket_for(gaussian: f64) -> usize {
    let position = (gaussian * SPREAD + CENTER + 0.5).floor();
    position.clamp(0.0, (BUCKETS - 1) as f64) as usize
}

pub fn resolve(bet: u64, bucket: usize) -> u64 {
    BUCKET_MULTIPLIERS_TENTHS
        .get(bucket)
        .map_or(0, |m| scale(bet, *m, 10))
}

pub struct Plinko;

impl CasinoGame for Plinko {
    fn start(
        session: &mut GameSession,
        payload: &[u8],
        rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        ensure_empty(payload)?;
        let u = rng.next_f64_open();
        let v = rng.next_f64_open();
        let bucket = bucket_for(box_muller(u, v));
        session.state_blob = vec![bucket as u8];

        let win = resolve(session.bet, bucket);
        let tenths = BUCKET_MULTIPLIERS_TENTHS[bucket];
        let classification = if tenths >= 10 { "win" } else { "partial_return" };
        Ok(complete(
            session,
            classification,
            win,
            json!({ "bucket": bucket, "multiplier": tenths as f64 / 10.0 }),
        ))
    }
}
