//! Crash: a multiplier climbs from 1.00x until it reaches a hidden crash point.
//!
//! The crash point is drawn when the round opens: `max(1.00, floor(100 / r) / 100)` for uniform
//! `r` in `(0, 1)`, capped at `MAX_CRASH_CENTI`. The multiplier rises 0.01x every 50 ms of server
//! time; a cash-out strictly below the crash point pays `floor(bet * multiplier)`.
//!
//! Multipliers are carried in hundredths ("centi") so that every comparison is exact.
//!
//! State blob format:
//! [crashCenti:u64 BE]
//!
//! Payload format:
//! Start: (empty)
//! [0, elapsedMs:u64 BE] = Cash out at the multiplier reached after `elapsedMs`
//! [1, elapsedMs:u64 BE] = Poll; completes the round as a loss once the crash point is reached

use serde_json::json;

use super::{
    complete, payload::ensure_empty, payload::parse_action_u64, payload::parse_single, scale,
    serialization::StateReader, CasinoGame, GameError, GameResult, GameRng,
};
use vcasino_types::casino::GameSession;

/// 1.00x in hundredths.
pub const BASE_CENTI: u64 = 100;
/// Upper bound on the crash point (10,000x).
pub const MAX_CRASH_CENTI: u64 = 1_000_000;
/// Milliseconds per 0.01x step.
pub const TICK_MS: u64 = 50;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Move {
    CashOut = 0,
    Poll = 1,
}

impl TryFrom<u8> for Move {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Move::CashOut),
            1 => Ok(Move::Poll),
            _ => Err(GameError::InvalidPayload),
        }
    }
}

/// Crash point in hundredths for a uniform draw `r` in `(0, 1)`.
pub fn crash_point_centi(r: f64) -> u64 {
    if r <= 0.0 {
        return MAX_CRASH_CENTI;
    }
    let centi = (BASE_CENTI as f64 / r).floor();
    if !centi.is_finite() || centi >= MAX_CRASH_CENTI as f64 {
        return MAX_CRASH_CENTI;
    }
    (centi as u64).max(BASE_CENTI)
}

/// Multiplier reached after `elapsed_ms` of climbing.
pub fn multiplier_at(elapsed_ms: u64) -> u64 {
    BASE_CENTI.saturating_add(elapsed_ms / TICK_MS)
}

/// Return for cashing out at `cashout_centi`; zero once the crash point has been reached.
pub fn resolve(bet: u64, crash_centi: u64, cashout_centi: u64) -> u64 {
    if cashout_centi >= crash_centi {
        return 0;
    }
    scale(bet, cashout_centi, BASE_CENTI)
}

/// Encode a cash-out move.
pub fn cash_out_payload(elapsed_ms: u64) -> Vec<u8> {
    move_payload(Move::CashOut, elapsed_ms)
}

/// Encode a poll move.
pub fn poll_payload(elapsed_ms: u64) -> Vec<u8> {
    move_payload(Move::Poll, elapsed_ms)
}

/// Turn a client move byte into a full move, using elapsed time measured by the server.
pub fn stamp_elapsed(payload: &[u8], elapsed_ms: u64) -> Result<Vec<u8>, GameError> {
    let action = Move::try_from(parse_single(payload)?)?;
    Ok(move_payload(action, elapsed_ms))
}

fn move_payload(action: Move, elapsed_ms: u64) -> Vec<u8> {
    let mut payload = Vec::with_capacity(9);
    payload.push(action as u8);
    payload.extend_from_slice(&elapsed_ms.to_be_bytes());
    payload
}

fn parse_state(state: &[u8]) -> Result<u64, GameError> {
    let mut reader = StateReader::new(state);
    let crash = reader.read_u64_be().ok_or(GameError::InvalidState)?;
    if reader.remaining() != 0 || crash < BASE_CENTI {
        return Err(GameError::InvalidState);
    }
    Ok(crash)
}

/// Public view of a running round; the crash point stays hidden.
pub fn view(session: &GameSession) -> Result<serde_json::Value, GameError> {
    parse_state(&session.state_blob)?;
    Ok(json!({ "status": "running", "startedAt": session.created_at, "tickMs": TICK_MS }))
}

pub struct Crash;

impl CasinoGame for Crash {
    fn start(
        session: &mut GameSession,
        payload: &[u8],
        rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        ensure_empty(payload)?;
        let crash = crash_point_centi(rng.next_f64_open());
        session.state_blob = crash.to_be_bytes().to_vec();
        Ok(GameResult::Continue(view(session)?))
    }

    fn process_move(
        session: &mut GameSession,
        payload: &[u8],
        _rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        if session.is_complete {
            return Err(GameError::RoundComplete);
        }
        let (action, elapsed_ms) = parse_action_u64(payload)?;
        let action = Move::try_from(action)?;
        let crash = parse_state(&session.state_blob)?;
        let multiplier = multiplier_at(elapsed_ms);

        if multiplier >= crash {
            return Ok(complete(
                session,
                "crashed",
                0,
                json!({ "crashPoint": crash as f64 / 100.0, "cashedOutAt": null }),
            ));
        }
        match action {
            Move::Poll => Ok(GameResult::Continue(json!({
                "status": "running",
                "multiplier": multiplier as f64 / 100.0,
            }))),
            Move::CashOut => {
                let win = resolve(session.bet, crash, multiplier);
                Ok(complete(
                    session,
                    "cashed_out",
                    win,
                    json!({
                        "crashPoint": crash as f64 / 100.0,
                        "cashedOutAt": multiplier as f64 / 100.0,
                    }),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{create_test_rng, create_test_session};
    use vcasino_types::casino::GameType;

    fn session_with_crash(crash: u64) -> GameSession {
        let mut session = create_test_session(GameType::Crash, 100);
        session.state_blob = crash.to_be_bytes().to_vec();
        session
    }

    #[test]
    fn test_crash_point_formula() {
        assert_eq!(crash_point_centi(0.5), 200);
        assert_eq!(crash_point_centi(0.99), 101);
        assert_eq!(crash_point_centi(0.999_999), 100);
        assert_eq!(crash_point_centi(0.3), 333);
        assert_eq!(crash_point_centi(1e-12), MAX_CRASH_CENTI);
        assert_eq!(crash_point_centi(0.0), MAX_CRASH_CENTI);
    }

    #[test]
    fn test_multiplier_climbs_per_tick() {
        assert_eq!(multiplier_at(0), 100);
        assert_eq!(multiplier_at(49), 100);
        assert_eq!(multiplier_at(50), 101);
        assert_eq!(multiplier_at(5_000), 200);
    }

    #[test]
    fn test_cash_out_strictly_before_crash() {
        assert_eq!(resolve(100, 200, 199), 199);
        assert_eq!(resolve(100, 200, 200), 0);
        assert_eq!(resolve(7, 500, 150), 10);
    }

    #[test]
    fn test_cash_out_move() {
        let mut rng = create_test_rng(1);
        let mut session = session_with_crash(250);
        let result = Crash::process_move(&mut session, &cash_out_payload(2_500), &mut rng).unwrap();
        let GameResult::Complete(outcome) = result else {
            panic!("cash out completes the round");
        };
        assert_eq!(outcome.classification, "cashed_out");
        assert_eq!(outcome.win_amount, 150);
        assert_eq!(
            Crash::process_move(&mut session, &cash_out_payload(0), &mut rng),
            Err(GameError::RoundComplete)
        );
    }

    #[test]
    fn test_late_cash_out_loses() {
        let mut rng = create_test_rng(1);
        let mut session = session_with_crash(250);
        let result = Crash::process_move(&mut session, &cash_out_payload(7_500), &mut rng).unwrap();
        let GameResult::Complete(outcome) = result else {
            panic!("crash completes the round");
        };
        assert_eq!(outcome.classification, "crashed");
        assert_eq!(outcome.win_amount, 0);
    }

    #[test]
    fn test_poll_keeps_round_open() {
        let mut rng = create_test_rng(1);
        let mut session = session_with_crash(300);
        let result = Crash::process_move(&mut session, &poll_payload(1_000), &mut rng).unwrap();
        assert!(!result.is_complete());
        assert!(!session.is_complete);
        let result = Crash::process_move(&mut session, &poll_payload(10_000), &mut rng).unwrap();
        assert!(result.is_complete());
    }

    #[test]
    fn test_malformed_moves_leave_round_open() {
        let mut rng = create_test_rng(1);
        let mut session = session_with_crash(300);
        let mut long = cash_out_payload(100);
        long.push(0);
        for payload in [vec![], vec![0], cash_out_payload(100)[..8].to_vec(), long] {
            assert_eq!(
                Crash::process_move(&mut session, &payload, &mut rng),
                Err(GameError::InvalidPayload)
            );
        }
        assert!(!session.is_complete);
    }

    #[test]
    fn test_stamp_elapsed() {
        assert_eq!(stamp_elapsed(&[0], 2_500).unwrap(), cash_out_payload(2_500));
        assert_eq!(stamp_elapsed(&[1], 10).unwrap(), poll_payload(10));
        assert_eq!(stamp_elapsed(&[2], 10), Err(GameError::InvalidPayload));
        assert_eq!(stamp_elapsed(&cash_out_payload(5), 10), Err(GameError::InvalidPayload));
    }

    #[test]
    fn test_start_hides_crash_point() {
        let mut rng = create_test_rng(9);
        let mut session = create_test_session(GameType::Crash, 100);
        let GameResult::Continue(view) = Crash::start(&mut session, &[], &mut rng).unwrap() else {
            panic!("crash stays open after start");
        };
        assert!(view.get("crashPoint").is_none());
        assert!(parse_state(&session.state_blob).unwrap() >= BASE_CENTI);
        assert_eq!(
            Crash::process_move(&mut session, &[0, 1], &mut rng),
            Err(GameError::InvalidPayload)
        );
    }
}
