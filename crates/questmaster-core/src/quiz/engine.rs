//! Timed multiple-choice quiz.
//!
//! Like the rest of the core, the engine owns no thread: the caller invokes
//! `tick()` once per second while a session is in progress.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> InProgress -> Submitted
//!  ^                        |
//!  +-------- reset ---------+
//! ```
//!
//! Operations invoked in the wrong state return `QuizError::InvalidState`
//! and leave the engine untouched.
//!
//! The countdown only restarts when it forces the quiz onto the next
//! question. Manual `next()`/`prev()` keep whatever time is left.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::bank::{Question, QuestionBank};
use crate::events::Event;
use crate::gamification::COINS_PER_CORRECT_ANSWER;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizState {
    Idle,
    InProgress,
    Submitted,
}

impl std::fmt::Display for QuizState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            QuizState::Idle => "idle",
            QuizState::InProgress => "in progress",
            QuizState::Submitted => "submitted",
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuizError {
    #[error("cannot {op} while the quiz is {state}")]
    InvalidState { op: &'static str, state: QuizState },

    #[error("option {option} does not exist (question has {available} options)")]
    InvalidOption { option: usize, available: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizConfig {
    pub questions_per_session: usize,
    pub seconds_per_question: u32,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            questions_per_session: 10,
            seconds_per_question: 30,
        }
    }
}

/// The active session.
#[derive(Debug, Clone, Serialize)]
pub struct QuizSession {
    questions: Vec<Question>,
    current: usize,
    answers: Vec<Option<usize>>,
    remaining_secs: u32,
}

impl QuizSession {
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current]
    }

    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    pub fn selected(&self) -> Option<usize> {
        self.answers[self.current]
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 == self.questions.len()
    }

    fn correct_count(&self) -> usize {
        self.questions
            .iter()
            .zip(&self.answers)
            .filter(|(q, a)| **a == Some(q.correct))
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    pub correct: usize,
    pub total: usize,
    pub coins_earned: u32,
}

impl QuizResult {
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total as f64 * 100.0
    }

    pub fn message(&self) -> &'static str {
        match self.percentage() {
            p if p >= 90.0 => "Outstanding performance!",
            p if p >= 80.0 => "Excellent work!",
            p if p >= 70.0 => "Good job!",
            p if p >= 60.0 => "Not bad!",
            _ => "Keep practicing!",
        }
    }
}

/// What a one-second tick did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Counting { remaining_secs: u32 },
    /// Time ran out; moved on with a fresh countdown.
    Advanced { from: usize, to: usize },
    /// Time ran out on the last question.
    AutoSubmitted(QuizResult),
}

#[derive(Debug, Clone)]
enum Phase {
    Idle,
    InProgress(QuizSession),
    Submitted { session: QuizSession, result: QuizResult },
}

#[derive(Debug, Clone)]
pub struct QuizEngine {
    bank: QuestionBank,
    config: QuizConfig,
    phase: Phase,
}

impl QuizEngine {
    pub fn new(bank: QuestionBank, config: QuizConfig) -> Self {
        Self {
            bank,
            config,
            phase: Phase::Idle,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> QuizState {
        match self.phase {
            Phase::Idle => QuizState::Idle,
            Phase::InProgress(_) => QuizState::InProgress,
            Phase::Submitted { .. } => QuizState::Submitted,
        }
    }

    /// The running or just-submitted session.
    pub fn session(&self) -> Option<&QuizSession> {
        match &self.phase {
            Phase::Idle => None,
            Phase::InProgress(session) | Phase::Submitted { session, .. } => Some(session),
        }
    }

    pub fn result(&self) -> Option<&QuizResult> {
        match &self.phase {
            Phase::Submitted { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn config(&self) -> QuizConfig {
        self.config
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Draw a fresh set of distinct questions and start the countdown.
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R, now: DateTime<Utc>) -> Result<Event, QuizError> {
        self.require(QuizState::Idle, "start")?;
        let mut questions = self.bank.questions().to_vec();
        questions.shuffle(rng);
        questions.truncate(self.config.questions_per_session.max(1));

        let count = questions.len();
        self.phase = Phase::InProgress(QuizSession {
            answers: vec![None; count],
            questions,
            current: 0,
            remaining_secs: self.config.seconds_per_question,
        });
        tracing::debug!(questions = count, "quiz started");
        Ok(Event::QuizStarted { questions: count, at: now })
    }

    /// Record (or overwrite) the answer for the current question.
    pub fn select_answer(&mut self, option: usize) -> Result<(), QuizError> {
        let session = self.in_progress_mut("select an answer")?;
        let available = session.current_question().options.len();
        if option >= available {
            return Err(QuizError::InvalidOption { option, available });
        }
        let current = session.current;
        session.answers[current] = Some(option);
        Ok(())
    }

    /// Move forward one question, clamped at the last one.
    pub fn next(&mut self) -> Result<usize, QuizError> {
        let session = self.in_progress_mut("move to the next question")?;
        if !session.is_last() {
            session.current += 1;
        }
        Ok(session.current)
    }

    /// Move back one question, clamped at the first one.
    pub fn prev(&mut self) -> Result<usize, QuizError> {
        let session = self.in_progress_mut("move to the previous question")?;
        session.current = session.current.saturating_sub(1);
        Ok(session.current)
    }

    /// One second of countdown.
    pub fn tick(&mut self) -> Result<TickOutcome, QuizError> {
        let per_question = self.config.seconds_per_question;
        let session = self.in_progress_mut("tick")?;
        session.remaining_secs = session.remaining_secs.saturating_sub(1);
        if session.remaining_secs > 0 {
            return Ok(TickOutcome::Counting {
                remaining_secs: session.remaining_secs,
            });
        }
        if session.is_last() {
            return self.submit().map(TickOutcome::AutoSubmitted);
        }
        let from = session.current;
        session.current += 1;
        session.remaining_secs = per_question;
        Ok(TickOutcome::Advanced {
            from,
            to: session.current,
        })
    }

    /// Score the session and freeze it for the results view.
    pub fn submit(&mut self) -> Result<QuizResult, QuizError> {
        let session = match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::InProgress(session) => session,
            other => {
                self.phase = other;
                return Err(QuizError::InvalidState {
                    op: "submit",
                    state: self.state(),
                });
            }
        };
        let correct = session.correct_count();
        let result = QuizResult {
            correct,
            total: session.questions.len(),
            coins_earned: u32::try_from(correct)
                .unwrap_or(u32::MAX)
                .saturating_mul(COINS_PER_CORRECT_ANSWER),
        };
        tracing::debug!(correct, total = result.total, "quiz submitted");
        self.phase = Phase::Submitted {
            session,
            result: result.clone(),
        };
        Ok(result)
    }

    /// Discard any session and stop the countdown. Valid from every state.
    pub fn reset(&mut self, now: DateTime<Utc>) -> Event {
        self.phase = Phase::Idle;
        Event::QuizReset { at: now }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn require(&self, wanted: QuizState, op: &'static str) -> Result<(), QuizError> {
        let state = self.state();
        if state == wanted {
            Ok(())
        } else {
            Err(QuizError::InvalidState { op, state })
        }
    }

    fn in_progress_mut(&mut self, op: &'static str) -> Result<&mut QuizSession, QuizError> {
        let state = self.state();
        match &mut self.phase {
            Phase::InProgress(session) => Ok(session),
            _ => Err(QuizError::InvalidState { op, state }),
        }
    }
}

impl Default for QuizEngine {
    fn default() -> Self {
        Self::new(QuestionBank::builtin(), QuizConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;
    use std::collections::HashSet;

    fn started() -> QuizEngine {
        let mut engine = QuizEngine::default();
        engine.start(&mut Pcg64::seed_from_u64(7), Utc::now()).unwrap();
        engine
    }

    fn answer_all(engine: &mut QuizEngine, correct_for: usize) {
        let total = engine.session().unwrap().questions().len();
        for i in 0..total {
            let q = engine.session().unwrap().current_question().clone();
            let pick = if i < correct_for { q.correct } else { (q.correct + 1) % q.options.len() };
            engine.select_answer(pick).unwrap();
            engine.next().unwrap();
        }
    }

    #[test]
    fn start_draws_ten_distinct_questions() {
        let engine = started();
        let session = engine.session().unwrap();
        assert_eq!(engine.state(), QuizState::InProgress);
        assert_eq!(session.questions().len(), 10);
        let prompts: HashSet<_> = session.questions().iter().map(|q| q.prompt.as_str()).collect();
        assert_eq!(prompts.len(), 10);
        assert!(session.answers().iter().all(Option::is_none));
        assert_eq!(session.remaining_secs(), 30);
    }

    #[test]
    fn seven_of_ten_earns_seventy_coins() {
        let mut engine = started();
        answer_all(&mut engine, 7);
        let result = engine.submit().unwrap();
        assert_eq!(result.correct, 7);
        assert_eq!(result.coins_earned, 70);
        assert_eq!(result.message(), "Good job!");
        assert_eq!(engine.state(), QuizState::Submitted);
    }

    #[test]
    fn selection_overwrites_and_does_not_advance() {
        let mut engine = started();
        engine.select_answer(0).unwrap();
        engine.select_answer(3).unwrap();
        let session = engine.session().unwrap();
        assert_eq!(session.current_index(), 0);
        assert_eq!(session.selected(), Some(3));
        assert_eq!(
            engine.clone().select_answer(9),
            Err(QuizError::InvalidOption { option: 9, available: 4 })
        );
    }

    #[test]
    fn navigation_clamps_and_keeps_timer() {
        let mut engine = started();
        assert_eq!(engine.prev().unwrap(), 0);
        engine.tick().unwrap();
        engine.tick().unwrap();
        assert_eq!(engine.next().unwrap(), 1);
        assert_eq!(engine.session().unwrap().remaining_secs(), 28);
        for _ in 0..20 {
            engine.next().unwrap();
        }
        assert_eq!(engine.session().unwrap().current_index(), 9);
    }

    #[test]
    fn timeout_advances_then_auto_submits() {
        let mut engine = QuizEngine::new(
            QuestionBank::builtin(),
            QuizConfig {
                questions_per_session: 2,
                seconds_per_question: 3,
            },
        );
        engine.start(&mut Pcg64::seed_from_u64(1), Utc::now()).unwrap();

        assert_eq!(engine.tick().unwrap(), TickOutcome::Counting { remaining_secs: 2 });
        engine.tick().unwrap();
        assert_eq!(engine.tick().unwrap(), TickOutcome::Advanced { from: 0, to: 1 });
        assert_eq!(engine.session().unwrap().remaining_secs(), 3);

        engine.tick().unwrap();
        engine.tick().unwrap();
        match engine.tick().unwrap() {
            TickOutcome::AutoSubmitted(result) => assert_eq!(result.total, 2),
            other => panic!("expected auto-submit, got {other:?}"),
        }
        assert_eq!(engine.state(), QuizState::Submitted);
        assert!(engine.tick().is_err());
    }

    #[test]
    fn wrong_state_operations_are_rejected_without_effect() {
        let mut engine = QuizEngine::default();
        assert_eq!(
            engine.submit(),
            Err(QuizError::InvalidState { op: "submit", state: QuizState::Idle })
        );
        assert!(engine.next().is_err());
        assert!(engine.select_answer(0).is_err());
        assert_eq!(engine.state(), QuizState::Idle);

        let mut engine = started();
        engine.submit().unwrap();
        assert!(engine.start(&mut Pcg64::seed_from_u64(2), Utc::now()).is_err());
        assert!(engine.submit().is_err());
        assert_eq!(engine.result().unwrap().total, 10);

        engine.reset(Utc::now());
        assert_eq!(engine.state(), QuizState::Idle);
        assert!(engine.session().is_none());
    }

    #[test]
    fn small_bank_caps_session_size() {
        let bank = QuestionBank::new(vec![
            Question::new("a?", &["x", "y"], 0),
            Question::new("b?", &["x", "y"], 1),
        ])
        .unwrap();
        let mut engine = QuizEngine::new(bank, QuizConfig::default());
        engine.start(&mut Pcg64::seed_from_u64(3), Utc::now()).unwrap();
        assert_eq!(engine.session().unwrap().questions().len(), 2);
    }
}
