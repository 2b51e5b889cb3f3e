//! Learning-style self-assessment: a static question bank plus scoring
//! that tallies one point per answer and picks the dominant style.

pub mod bank;
pub mod score;

pub use bank::{BankError, QuestionBank, QuizOption, QuizQuestion};
pub use score::{score_answers, Answer, ScoreError, StyleScores};
