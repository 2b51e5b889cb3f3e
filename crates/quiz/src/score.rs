use serde::{Deserialize, Serialize};
use studymorph_core::LearningStyle;
use thiserror::Error;

use crate::bank::QuestionBank;

/// One point per answered question, bucketed by style.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleScores {
    pub visual: u32,
    pub auditory: u32,
    pub reading: u32,
    pub kinesthetic: u32,
}

impl StyleScores {
    pub fn tally(styles: &[LearningStyle]) -> Self {
        let mut scores = Self::default();
        for style in styles {
            scores.add(*style);
        }
        scores
    }

    pub fn add(&mut self, style: LearningStyle) {
        match style {
            LearningStyle::Visual => self.visual += 1,
            LearningStyle::Auditory => self.auditory += 1,
            LearningStyle::Reading => self.reading += 1,
            LearningStyle::Kinesthetic => self.kinesthetic += 1,
        }
    }

    pub fn count(&self, style: LearningStyle) -> u32 {
        match style {
            LearningStyle::Visual => self.visual,
            LearningStyle::Auditory => self.auditory,
            LearningStyle::Reading => self.reading,
            LearningStyle::Kinesthetic => self.kinesthetic,
        }
    }

    pub fn total(&self) -> u32 {
        self.visual + self.auditory + self.reading + self.kinesthetic
    }

    /// The style with the highest count. Ties go to the earlier entry in
    /// [`LearningStyle::ALL`], so the result is deterministic.
    pub fn dominant(&self) -> LearningStyle {
        let mut best = LearningStyle::ALL[0];
        for style in LearningStyle::ALL {
            if self.count(style) > self.count(best) {
                best = style;
            }
        }
        best
    }
}

/// One submitted answer: question index and the chosen option index.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Answer {
    pub question: usize,
    pub choice: usize,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoreError {
    #[error("question index {0} out of range")]
    QuestionOutOfRange(usize),
    #[error("choice {choice} out of range for question {question}")]
    ChoiceOutOfRange { question: usize, choice: usize },
}

/// Resolve submitted answers against the bank and tally the styles of
/// the chosen options.
pub fn score_answers(bank: &QuestionBank, answers: &[Answer]) -> Result<StyleScores, ScoreError> {
    let mut scores = StyleScores::default();
    for answer in answers {
        let question = bank
            .questions
            .get(answer.question)
            .ok_or(ScoreError::QuestionOutOfRange(answer.question))?;
        let option = question
            .options
            .get(answer.choice)
            .ok_or(ScoreError::ChoiceOutOfRange {
                question: answer.question,
                choice: answer.choice,
            })?;
        scores.add(option.style);
    }
    Ok(scores)
}
