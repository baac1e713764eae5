use crate::config::QuestionRules;
use crate::error::{ProctorError, Result};
use crate::question::{Question, QuestionSet};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What the questions should assess
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RoleDescriptor {
    pub role: String,
    pub category: Option<String>,
}

impl RoleDescriptor {
    #[must_use]
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            category: None,
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// External source of assessment questions
#[async_trait]
pub trait QuestionSupply: Send + Sync {
    /// Produce the ordered questions for `descriptor`
    ///
    /// # Errors
    ///
    /// Returns an error if the questions cannot be produced or parsed
    async fn fetch(&self, descriptor: &RoleDescriptor) -> anyhow::Result<Vec<Question>>;

    fn name(&self) -> &str;
}

/// Fetch questions and validate them into a set a session can start with.
///
/// # Errors
///
/// Every failure, whether fetching or validation, is a
/// [`ProctorError::Configuration`]: the session cannot begin.
pub async fn load_question_set(
    supply: &dyn QuestionSupply,
    descriptor: &RoleDescriptor,
    rules: &QuestionRules,
) -> Result<QuestionSet> {
    let questions = supply.fetch(descriptor).await.map_err(|e| {
        ProctorError::configuration(format!(
            "{} could not supply questions for {}: {e:#}",
            supply.name(),
            descriptor.role
        ))
    })?;
    let set = QuestionSet::new(questions, rules)?;
    log::info!(
        "Loaded {} questions for {} from {}",
        set.len(),
        descriptor.role,
        supply.name()
    );
    Ok(set)
}
