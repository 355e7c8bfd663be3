//! Quiz ladder: answer questions of rising difficulty to grow a prize.
//!
//! The prize starts at the bet and each correct answer multiplies it by 1.5 (rounded down). The
//! difficulty of the next question is `min(10, answered / 10 + 1)`. A wrong answer forfeits
//! everything; cashing out pays the current prize once at least one answer is in. The 100th correct
//! answer ends the ladder with five times the prize.
//!
//! State blob format:
//! [prize:u64 BE] [answered:u8] [question:u8] [usedMask:u128 BE]
//!
//! Payload format:
//! Start: (empty)
//! [0, answer:u8] = Answer the current question (0..=3)
//! [1] = Cash out
//! [2] = Abandon (forfeits the bet)

use serde_json::json;

use super::{
    complete, payload::ensure_empty, quiz_bank, serialization::StateReader,
    serialization::StateWriter, CasinoGame, GameError, GameResult, GameRng,
};
use vcasino_types::casino::GameSession;

pub const LADDER_LENGTH: u8 = 100;
pub const JACKPOT_MULTIPLIER: u64 = 5;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Move {
    Answer = 0,
    CashOut = 1,
    Abandon = 2,
}

impl TryFrom<u8> for Move {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Move::Answer),
            1 => Ok(Move::CashOut),
            2 => Ok(Move::Abandon),
            _ => Err(GameError::InvalidPayload),
        }
    }
}

/// Difficulty of the question asked after `answered` correct answers.
pub fn difficulty_for(answered: u8) -> u8 {
    (answered / 10 + 1).min(quiz_bank::DIFFICULTY_LEVELS)
}

/// Prize after one more correct answer.
pub fn next_prize(prize: u64) -> u64 {
    prize.saturating_add(prize / 2)
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct QuizState {
    prize: u64,
    answered: u8,
    question: u8,
    used: u128,
}

impl QuizState {
    fn encode(&self) -> Vec<u8> {
        let mut writer = StateWriter::with_capacity(26);
        writer.push_u64_be(self.prize);
        writer.push_u8(self.answered);
        writer.push_u8(self.question);
        writer.push_u128_be(self.used);
        writer.into_inner()
    }

    fn decode(blob: &[u8]) -> Result<Self, GameError> {
        let mut reader = StateReader::new(blob);
        let prize = reader.read_u64_be().ok_or(GameError::InvalidState)?;
        let answered = reader.read_u8().ok_or(GameError::InvalidState)?;
        let question = reader.read_u8().ok_or(GameError::InvalidState)?;
        let used = reader.read_u128_be().ok_or(GameError::InvalidState)?;
        if reader.remaining() != 0
            || answered >= LADDER_LENGTH
            || question as usize >= quiz_bank::QUESTIONS.len()
        {
            return Err(GameError::InvalidState);
        }
        Ok(Self {
            prize,
            answered,
            question,
            used,
        })
    }

    /// Pick an unused question at the current difficulty, recycling the level once exhausted.
    fn ask_next(&mut self, rng: &mut GameRng) -> Result<(), GameError> {
        let level = difficulty_for(self.answered);
        let mut pool: Vec<usize> = quiz_bank::indices_for(level)
            .filter(|&i| self.used & (1u128 << i) == 0)
            .collect();
        if pool.is_empty() {
            for i in quiz_bank::indices_for(level) {
                self.used &= !(1u128 << i);
            }
            pool = quiz_bank::indices_for(level).collect();
        }
        if pool.is_empty() {
            return Err(GameError::InvalidState);
        }
        let pick = pool[rng.next_bounded(pool.len() as u8) as usize];
        self.used |= 1u128 << pick;
        self.question = pick as u8;
        Ok(())
    }

    fn view(&self) -> serde_json::Value {
        let question = &quiz_bank::QUESTIONS[self.question as usize];
        json!({
            "question": question.prompt,
            "answers": question.answers,
            "difficulty": question.difficulty,
            "answered": self.answered,
            "prize": self.prize,
        })
    }
}

/// The open question and the prize at stake. The correct answer is not included.
pub fn view(session: &GameSession) -> Result<serde_json::Value, GameError> {
    Ok(QuizState::decode(&session.state_blob)?.view())
}

pub struct Quiz;

impl CasinoGame for Quiz {
    fn start(
        session: &mut GameSession,
        payload: &[u8],
        rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        ensure_empty(payload)?;
        let mut state = QuizState {
            prize: session.bet,
            answered: 0,
            question: 0,
            used: 0,
        };
        state.ask_next(rng)?;
        session.state_blob = state.encode();
        Ok(GameResult::Continue(state.view()))
    }

    fn process_move(
        session: &mut GameSession,
        payload: &[u8],
        rng: &mut GameRng,
    ) -> Result<GameResult, GameError> {
        if session.is_complete {
            return Err(GameError::RoundComplete);
        }
        let (&action, rest) = payload.split_first().ok_or(GameError::InvalidPayload)?;
        let mut state = QuizState::decode(&session.state_blob)?;

        match Move::try_from(action)? {
            Move::Answer => {
                let [answer] = rest else {
                    return Err(GameError::InvalidPayload);
                };
                if *answer > 3 {
                    return Err(GameError::InvalidSelection("answer out of range"));
                }
                let question = &quiz_bank::QUESTIONS[state.question as usize];
                if *answer != question.correct {
                    return Ok(complete(
                        session,
                        "wrong_answer",
                        0,
                        json!({
                            "answered": state.answered,
                            "question": question.prompt,
                            "correctAnswer": question.correct,
                        }),
                    ));
                }
                state.prize = next_prize(state.prize);
                state.answered += 1;
                if state.answered == LADDER_LENGTH {
                    let win = state.prize.saturating_mul(JACKPOT_MULTIPLIER);
                    return Ok(complete(
                        session,
                        "jackpot",
                        win,
                        json!({ "answered": state.answered, "prize": state.prize }),
                    ));
                }
                state.ask_next(rng)?;
                session.state_blob = state.encode();
                Ok(GameResult::Continue(state.view()))
            }
            Move::CashOut => {
                if !rest.is_empty() {
                    return Err(GameError::InvalidPayload);
                }
                if state.answered == 0 {
                    return Err(GameError::InvalidMove);
                }
                Ok(complete(
                    session,
                    "cashed_out",
                    state.prize,
                    json!({ "answered": state.answered, "prize": state.prize }),
                ))
            }
            Move::Abandon => {
                if !rest.is_empty() {
                    return Err(GameError::InvalidPayload);
                }
                Ok(complete(
                    session,
                    "abandoned",
                    0,
                    json!({ "answered": state.answered }),
                ))
            }
        }
    }
}
