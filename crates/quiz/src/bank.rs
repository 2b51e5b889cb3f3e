//! Question bank: static YAML, embedded at build time, optionally
//! overridden by a file named in config.

use std::path::Path;

use serde::{Deserialize, Serialize};
use studymorph_core::config::QuizConfig;
use studymorph_core::LearningStyle;
use thiserror::Error;

const EMBEDDED_BANK: &str = include_str!("../../../data/quiz/learning-style-questions.yaml");

/// Options every question must offer, one per learning style.
pub const OPTIONS_PER_QUESTION: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct QuestionBank {
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct QuizQuestion {
    /// Question shown to the student.
    pub prompt: String,
    /// Exactly four options, each tagged with the style it indicates.
    pub options: Vec<QuizOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct QuizOption {
    pub text: String,
    pub style: LearningStyle,
}

#[derive(Debug, Error)]
pub enum BankError {
    #[error("failed to read question bank at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed question bank: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid question bank: {0}")]
    Invalid(String),
}

impl QuestionBank {
    /// Parse and validate a YAML bank.
    pub fn parse(yaml: &str) -> Result<Self, BankError> {
        let bank: QuestionBank = serde_yaml::from_str(yaml)?;
        bank.validate()?;
        Ok(bank)
    }

    /// The bank compiled into the binary. A parse failure here is a
    /// build-data bug, caught by tests.
    pub fn embedded() -> Self {
        Self::parse(EMBEDDED_BANK).expect("embedded question bank must be valid")
    }

    pub fn from_file(path: &Path) -> Result<Self, BankError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| BankError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&yaml)
    }

    /// Load the override file when configured, the embedded bank otherwise.
    pub fn load(config: &QuizConfig) -> Result<Self, BankError> {
        match &config.file {
            Some(path) => {
                let bank = Self::from_file(path)?;
                tracing::info!(
                    path = %path.display(),
                    questions = bank.questions.len(),
                    "loaded question bank override"
                );
                Ok(bank)
            }
            None => Ok(Self::embedded()),
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    fn validate(&self) -> Result<(), BankError> {
        if self.questions.is_empty() {
            return Err(BankError::Invalid("bank has no questions".into()));
        }
        for (i, question) in self.questions.iter().enumerate() {
            if question.options.len() != OPTIONS_PER_QUESTION {
                return Err(BankError::Invalid(format!(
                    "question {i} has {} options, expected {OPTIONS_PER_QUESTION}",
                    question.options.len()
                )));
            }
        }
        Ok(())
    }
}
