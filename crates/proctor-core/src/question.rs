use crate::config::QuestionRules;
use crate::error::{ProctorError, Result};
use serde::{Deserialize, Serialize};

/// Every question offers exactly this many options
pub const OPTION_COUNT: usize = 4;

/// One multiple-choice question as produced by the question supply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question", alias = "prompt")]
    pub prompt: String,
    pub options: Vec<String>,
    #[serde(rename = "correctAnswer", alias = "correct_option_index")]
    pub correct_option_index: usize,
}

impl Question {
    fn check(&self, index: usize) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(ProctorError::configuration(format!(
                "question {index} has an empty prompt"
            )));
        }
        if self.options.len() != OPTION_COUNT {
            return Err(ProctorError::configuration(format!(
                "question {index} has {} options, expected {OPTION_COUNT}",
                self.options.len()
            )));
        }
        if self.correct_option_index >= OPTION_COUNT {
            return Err(ProctorError::configuration(format!(
                "question {index} has correct answer {}, expected 0..={}",
                self.correct_option_index,
                OPTION_COUNT - 1
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn is_correct(&self, option_index: usize) -> bool {
        option_index == self.correct_option_index
    }
}

/// A question set whose shape has been validated.
///
/// Sessions can only be built from a `QuestionSet`, so a malformed set never
/// reaches `start()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionSet {
    questions: Vec<Question>,
}

impl QuestionSet {
    /// # Errors
    ///
    /// Returns a configuration error if the set is empty, has the wrong
    /// length for `rules`, or if any question is malformed.
    pub fn new(questions: Vec<Question>, rules: &QuestionRules) -> Result<Self> {
        if questions.is_empty() {
            return Err(ProctorError::configuration("question set is empty"));
        }
        if let Some(required) = rules.required_count {
            if questions.len() != required {
                return Err(ProctorError::configuration(format!(
                    "question set has {} questions, expected {required}",
                    questions.len()
                )));
            }
        }
        for (index, question) in questions.iter().enumerate() {
            question.check(index)?;
        }
        Ok(Self { questions })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }
}

#[cfg(test)]
pub(crate) fn sample_question(correct: usize) -> Question {
    Question {
        prompt: format!("Which option is number {correct}?"),
        options: (0..OPTION_COUNT).map(|i| format!("Option {i}")).collect(),
        correct_option_index: correct,
    }
}
