//! End-to-end tests for rounds settled through the ledger.
//!
//! These drive the full flow from bet validation through resolution to the stored balance and
//! history record, with draws pinned where the exact figures matter.

#[cfg(test)]
mod tests {
    use crate::casino::{
        complete, dice,
        slots::{self, SlotRound, SymbolKind},
        GameResult,
    };
    use crate::fairness::{replay_round, verify_commit_reveal};
    use crate::ledger::LedgerError;
    use crate::mocks::{create_funded_player, create_test_ledger};
    use serde_json::json;
    use vcasino_types::casino::{GameType, PlayerKind};

    const NOW: u64 = 1_700_000_000_000;

    #[tokio::test]
    async fn test_dice_win_settles_exact_balance() {
        let mut ledger = create_test_ledger();
        let player = create_funded_player(&mut ledger, 1, 1000).await;

        let update = ledger
            .begin_round_with(player.id, GameType::Dice, 100, &[50], NOW, |session, payload, _| {
                let roll_under = dice::validate_target(payload[0])?;
                let roll = 40;
                let win = dice::resolve(session.bet, roll_under, roll);
                Ok(complete(
                    session,
                    "win",
                    win,
                    json!({ "roll": roll, "rollUnder": roll_under }),
                ))
            })
            .await
            .unwrap();

        let settlement = update.settlement.unwrap();
        assert_eq!(settlement.outcome.win_amount, 198);
        assert_eq!(update.balance, 1098);
        let record = settlement.record.unwrap();
        assert_eq!(record.balance_before, 1000);
        assert_eq!(record.balance_after, 1098);
        assert_eq!(record.delta(), 98);
        assert_eq!(ledger.player(player.id).await.unwrap().balance, 1098);
    }

    #[tokio::test]
    async fn test_three_diamonds_pay_five_times() {
        use SymbolKind::*;

        let mut ledger = create_test_ledger();
        let player = create_funded_player(&mut ledger, 1, 500).await;
        let mut script = vec![
            Diamond, Diamond, Diamond, Cherry, Lemon, Orange, // locks three
            Cherry, Seven, Star, // nothing new, chain ends
        ]
        .into_iter();

        let update = ledger
            .begin_round_with(player.id, GameType::Slots, 50, &[], NOW, |session, _, _| {
                let mut round = SlotRound::new();
                while !round.is_terminal() {
                    round.spin_step_with(|_| script.next().unwrap_or(Cherry))?;
                }
                Ok(complete(
                    session,
                    &round.classification().label(),
                    round.payout(session.bet),
                    round.detail(),
                ))
            })
            .await
            .unwrap();

        let settlement = update.settlement.unwrap();
        assert_eq!(settlement.outcome.classification, "diamonds_3");
        assert_eq!(settlement.outcome.win_amount, slots::payout(50, 3));
        assert_eq!(settlement.outcome.win_amount, 250);
        assert_eq!(update.balance, 700);
        assert_eq!(settlement.outcome.detail["respins"], 1);
    }

    #[tokio::test]
    async fn test_rejected_bet_leaves_no_trace() {
        let mut ledger = create_test_ledger();
        let player = create_funded_player(&mut ledger, 1, 200).await;

        let err = ledger
            .begin_round(player.id, GameType::Dice, 300, &[50], NOW)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientBalance { .. }));

        let stored = ledger.player(player.id).await.unwrap();
        assert_eq!(stored.balance, 200);
        assert_eq!(stored.history_len, 0);
        assert_eq!(stored.stats.games_played, 0);
        assert!(ledger.history(player.id, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_settled_rounds_replay_from_reveal() {
        let mut ledger = create_test_ledger();
        let player = create_funded_player(&mut ledger, 1, 100_000).await;

        let single_shot: [(GameType, Vec<u8>); 6] = [
            (GameType::Slots, vec![]),
            (GameType::Dice, vec![33]),
            (GameType::Roulette, vec![2, 7, 11]),
            (GameType::Plinko, vec![]),
            (GameType::Wheel, vec![]),
            (GameType::Keno, vec![3, 1, 2, 3]),
        ];
        for (game_type, payload) in single_shot {
            let update = ledger
                .begin_round(player.id, game_type, 100, &payload, NOW)
                .await
                .unwrap();
            let settlement = update.settlement.unwrap();
            let reveal = settlement.reveal.unwrap();
            assert!(verify_commit_reveal(&update.commit, &reveal));

            let replayed =
                replay_round(update.round_id, game_type, 100, &reveal, &payload, &[]).unwrap();
            assert_eq!(replayed, GameResult::Complete(settlement.outcome));
        }

        // A multi-step round replays from its accepted moves.
        let update = ledger
            .begin_round(player.id, GameType::VideoPoker, 100, &[], NOW)
            .await
            .unwrap();
        let done = ledger
            .play_move(player.id, update.round_id, &[0b10101], NOW)
            .await
            .unwrap();
        let settlement = done.settlement.unwrap();
        let replayed = replay_round(
            update.round_id,
            GameType::VideoPoker,
            100,
            &settlement.reveal.unwrap(),
            &[],
            &[vec![0b10101]],
        )
        .unwrap();
        assert_eq!(replayed, GameResult::Complete(settlement.outcome));
    }

    #[tokio::test]
    async fn test_history_is_newest_first() {
        let mut ledger = create_test_ledger();
        let player = ledger
            .register("alice".into(), PlayerKind::Registered, NOW)
            .await
            .unwrap();
        for (i, game_type) in [GameType::Wheel, GameType::Plinko, GameType::Slots]
            .into_iter()
            .enumerate()
        {
            ledger
                .begin_round(player.id, game_type, 10, &[], NOW + i as u64)
                .await
                .unwrap();
        }
        let history = ledger.history(player.id, 2).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].game_type, "diamond_slots");
        assert_eq!(history[1].game_type, "plinko");
        assert_eq!(history[0].seq, 2);
        assert_eq!(history[0].balance_before, history[1].balance_after);
        assert!(history.iter().all(|r| r.is_consistent()));
    }
}
