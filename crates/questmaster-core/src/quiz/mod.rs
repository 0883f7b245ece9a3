mod bank;
mod engine;

pub use bank::{Question, QuestionBank};
pub use engine::{QuizConfig, QuizEngine, QuizError, QuizResult, QuizSession, QuizState, TickOutcome};
