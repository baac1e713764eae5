use crate::scoring::SessionResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of one assessment session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Constructed, not yet started
    Idle,
    /// Waiting on the fullscreen request
    EnteringFullscreen,
    /// Questions are being answered and integrity is monitored
    Active,
    /// Finalized with a result
    Completed,
    /// Closed before completion; no result is produced
    Aborted,
}

impl SessionStatus {
    /// Whether the session has ended, either way
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Aborted)
    }

    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::EnteringFullscreen => "entering fullscreen",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Mutable state of the single active session
#[derive(Debug, Clone)]
pub struct AssessmentSession {
    pub(crate) status: SessionStatus,
    pub(crate) current_question_index: usize,
    /// Selected option per question; `None` until answered
    pub(crate) answers: Vec<Option<usize>>,
    pub(crate) remaining_secs: u32,
    pub(crate) correct_answers: usize,
    pub(crate) scored_questions: usize,
    pub(crate) question_transitions: usize,
    pub(crate) result: Option<SessionResult>,
}

impl AssessmentSession {
    #[must_use]
    pub fn new(total_questions: usize, question_duration_secs: u32) -> Self {
        Self {
            status: SessionStatus::Idle,
            current_question_index: 0,
            answers: vec![None; total_questions],
            remaining_secs: question_duration_secs,
            correct_answers: 0,
            scored_questions: 0,
            question_transitions: 0,
            result: None,
        }
    }

    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub const fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    #[must_use]
    pub fn answers(&self) -> &[Option<usize>] {
        &self.answers
    }

    #[must_use]
    pub fn selected(&self) -> Option<usize> {
        self.answers.get(self.current_question_index).copied().flatten()
    }

    #[must_use]
    pub const fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    #[must_use]
    pub const fn correct_answers(&self) -> usize {
        self.correct_answers
    }

    /// Questions scored so far, answered or timed out
    #[must_use]
    pub const fn scored_questions(&self) -> usize {
        self.scored_questions
    }

    /// Number of moves from one question to the next
    #[must_use]
    pub const fn question_transitions(&self) -> usize {
        self.question_transitions
    }

    #[must_use]
    pub const fn result(&self) -> Option<SessionResult> {
        self.result
    }
}

/// Read-only view of the session for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub status: SessionStatus,
    pub question_index: usize,
    /// One-based position shown to the candidate
    pub question_number: usize,
    pub total_questions: usize,
    /// Fraction of the set reached, in `(0, 1]`
    pub progress: f64,
    pub prompt: String,
    pub options: Vec<String>,
    pub remaining_secs: u32,
    pub low_time: bool,
    pub selected: Option<usize>,
    pub correct_so_far: usize,
    pub scored_so_far: usize,
    pub is_last_question: bool,
    pub tab_switch_count: u32,
    pub clipboard_event_count: u32,
    pub latest_cheating_score: f64,
    /// The latest cheating score is above the alert threshold
    pub cheating_alert: bool,
}

impl SessionSnapshot {
    /// Label of the button that advances past this question
    #[must_use]
    pub const fn advance_label(&self) -> &'static str {
        if self.is_last_question {
            "Finish"
        } else {
            "Next"
        }
    }
}
