use super::state::{AssessmentSession, SessionSnapshot, SessionStatus};
use crate::config::EngineConfig;
use crate::error::{ProctorError, Result};
use crate::integrity::{
    ClipboardDecision, ClipboardKind, FrameVerdict, IntegrityMonitor, IntegrityState,
    VisibilityState,
};
use crate::notice::Notice;
use crate::question::{Question, QuestionSet, OPTION_COUNT};
use crate::scoring::{aggregate, ScoringPolicy, SessionResult};

/// What caused an advance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceTrigger {
    /// Explicit "Next"/"Finish" from the candidate
    User,
    /// The question's countdown reached zero
    Timer,
}

/// Outcome of an advance request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// Moved on; the countdown must be restarted for `index`
    NextQuestion { index: usize },
    /// The last question was scored and the session finalized
    Finished(SessionResult),
    /// The request was stale or the session already ended
    Ignored,
}

/// Pure state machine for one proctored session.
///
/// Owns question progression, answer recording, and the integrity state.
/// Nothing here spawns tasks or waits; the runner feeds it timer and
/// integrity events and acts on the transitions it returns.
#[derive(Debug)]
pub struct SessionController {
    questions: QuestionSet,
    session: AssessmentSession,
    monitor: IntegrityMonitor,
    policy: ScoringPolicy,
    question_duration_secs: u32,
    low_time_secs: u32,
    alert_threshold: f64,
}

impl SessionController {
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn new(questions: QuestionSet, config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        let session = AssessmentSession::new(questions.len(), config.timer.question_duration_secs);
        Ok(Self {
            questions,
            session,
            monitor: IntegrityMonitor::default(),
            policy: config.scoring,
            question_duration_secs: config.timer.question_duration_secs,
            low_time_secs: config.timer.low_time_secs,
            alert_threshold: config.integrity.alert_threshold,
        })
    }

    fn invalid(&self, operation: &'static str) -> ProctorError {
        ProctorError::InvalidState {
            operation,
            status: self.session.status,
        }
    }

    /// `Idle -> EnteringFullscreen`
    ///
    /// # Errors
    ///
    /// Returns [`ProctorError::InvalidState`] unless the session is idle.
    pub fn begin_start(&mut self) -> Result<()> {
        if self.session.status != SessionStatus::Idle {
            return Err(self.invalid("start"));
        }
        self.session.status = SessionStatus::EnteringFullscreen;
        Ok(())
    }

    /// `EnteringFullscreen -> Active`. Fullscreen denial is not fatal; it
    /// only adds a notice.
    ///
    /// # Errors
    ///
    /// Returns [`ProctorError::InvalidState`] unless fullscreen entry was
    /// started.
    pub fn activate(&mut self, fullscreen_granted: bool) -> Result<Vec<Notice>> {
        if self.session.status != SessionStatus::EnteringFullscreen {
            return Err(self.invalid("activate"));
        }
        self.session.status = SessionStatus::Active;
        self.session.current_question_index = 0;
        self.session.remaining_secs = self.question_duration_secs;
        let epoch = self.monitor.begin();
        log::info!(
            "Session active: {} questions, monitoring epoch {epoch}",
            self.questions.len()
        );

        let mut notices = vec![Notice::SessionStarted];
        if !fullscreen_granted {
            notices.push(Notice::FullscreenUnavailable);
        }
        Ok(notices)
    }

    /// Record a selection for `question_index`.
    ///
    /// Returns `false` without changing anything when `question_index` is no
    /// longer the current question.
    ///
    /// # Errors
    ///
    /// Returns [`ProctorError::InvalidState`] when the session is not active
    /// and [`ProctorError::UserInput`] for an option that does not exist.
    pub fn submit_answer(&mut self, question_index: usize, option_index: usize) -> Result<bool> {
        if self.session.status != SessionStatus::Active {
            return Err(self.invalid("submit an answer"));
        }
        if question_index != self.session.current_question_index {
            log::debug!(
                "Discarding answer for question {} (current is {})",
                question_index + 1,
                self.session.current_question_index + 1
            );
            return Ok(false);
        }
        if option_index >= OPTION_COUNT {
            return Err(ProctorError::UserInput(format!(
                "option {} does not exist",
                option_index + 1
            )));
        }
        self.session.answers[question_index] = Some(option_index);
        Ok(true)
    }

    /// Score the current question and move on or finalize.
    ///
    /// Whichever of the timer and the candidate advances a question first
    /// wins; the other request names a question that is no longer current
    /// and is ignored. Once the session has ended every request is ignored,
    /// so the result is produced exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`ProctorError::UserInput`] when the candidate advances
    /// without a selection (nothing changes), and
    /// [`ProctorError::InvalidState`] before the session is active.
    pub fn advance(&mut self, question_index: usize, trigger: AdvanceTrigger) -> Result<Transition> {
        match self.session.status {
            SessionStatus::Completed | SessionStatus::Aborted => return Ok(Transition::Ignored),
            SessionStatus::Active => {}
            SessionStatus::Idle | SessionStatus::EnteringFullscreen => {
                return Err(self.invalid("advance"))
            }
        }
        let current = self.session.current_question_index;
        if question_index != current {
            log::debug!(
                "Ignoring {trigger:?} advance for question {} (current is {})",
                question_index + 1,
                current + 1
            );
            return Ok(Transition::Ignored);
        }

        let selected = self.session.answers[current];
        if selected.is_none() && trigger == AdvanceTrigger::User {
            return Err(ProctorError::UserInput(
                Notice::SelectAnswer.message(),
            ));
        }

        let correct = match (selected, self.questions.get(current)) {
            (Some(option), Some(question)) => question.is_correct(option),
            _ => false,
        };
        self.session.scored_questions += 1;
        if correct {
            self.session.correct_answers += 1;
        }

        let next = current + 1;
        if next < self.questions.len() {
            self.session.current_question_index = next;
            self.session.remaining_secs = self.question_duration_secs;
            self.session.question_transitions += 1;
            log::info!(
                "Question {}/{} ({trigger:?})",
                next + 1,
                self.questions.len()
            );
            return Ok(Transition::NextQuestion { index: next });
        }
        Ok(Transition::Finished(self.finalize()))
    }

    fn finalize(&mut self) -> SessionResult {
        self.monitor.end();
        let result = aggregate(
            self.session.correct_answers,
            self.questions.len(),
            self.monitor.latest_cheating_score(),
            &self.policy,
        );
        self.session.status = SessionStatus::Completed;
        self.session.result = Some(result);
        log::info!(
            "Session completed: mcq {:.2}, cheating {:.2}, final {:.2}, qualified {}",
            result.mcq_score,
            result.cheating_score,
            result.final_score,
            result.qualified
        );
        result
    }

    /// Update the countdown shown for `question_index`. Returns whether the
    /// tick applied to the current question.
    pub fn timer_tick(&mut self, question_index: usize, remaining_secs: u32) -> bool {
        if self.session.status != SessionStatus::Active
            || question_index != self.session.current_question_index
        {
            return false;
        }
        self.session.remaining_secs = remaining_secs;
        true
    }

    /// The countdown for `question_index` reached zero
    ///
    /// # Errors
    ///
    /// Returns [`ProctorError::InvalidState`] before the session is active.
    pub fn timer_expired(&mut self, question_index: usize) -> Result<Transition> {
        if self.session.status == SessionStatus::Active
            && question_index == self.session.current_question_index
        {
            self.session.remaining_secs = 0;
            log::info!("Time expired for question {}", question_index + 1);
        }
        self.advance(question_index, AdvanceTrigger::Timer)
    }

    /// End the session without a result. Returns `false` if it had already
    /// ended.
    pub fn abort(&mut self) -> bool {
        if self.session.status.is_terminal() {
            return false;
        }
        self.monitor.end();
        self.session.status = SessionStatus::Aborted;
        log::info!(
            "Session aborted at question {}/{}",
            self.session.current_question_index + 1,
            self.questions.len()
        );
        true
    }

    pub fn record_visibility(&mut self, state: VisibilityState) -> Option<Notice> {
        self.monitor.record_visibility(state)
    }

    pub fn record_clipboard(&mut self, kind: ClipboardKind) -> (ClipboardDecision, Option<Notice>) {
        self.monitor.record_clipboard(kind)
    }

    pub fn apply_verdict(&mut self, epoch: u64, verdict: &FrameVerdict) -> Vec<Notice> {
        self.monitor.apply_verdict(epoch, verdict)
    }

    pub fn record_failure(&mut self, epoch: u64, error: &ProctorError) -> Option<Notice> {
        self.monitor.record_failure(epoch, error)
    }

    pub fn camera_unavailable(&mut self, epoch: u64, error: &ProctorError) -> Option<Notice> {
        self.monitor.camera_unavailable(epoch, error)
    }

    /// Epoch integrity reports for this session must carry
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.monitor.epoch()
    }

    #[must_use]
    pub const fn status(&self) -> SessionStatus {
        self.session.status
    }

    #[must_use]
    pub const fn session(&self) -> &AssessmentSession {
        &self.session
    }

    #[must_use]
    pub const fn current_question_index(&self) -> usize {
        self.session.current_question_index
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.session.current_question_index)
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub const fn result(&self) -> Option<SessionResult> {
        self.session.result
    }

    #[must_use]
    pub const fn integrity(&self) -> IntegrityState {
        self.monitor.state()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let total = self.questions.len();
        let index = self.session.current_question_index;
        let integrity = self.monitor.state();
        let (prompt, options) = self
            .current_question()
            .map(|q| (q.prompt.clone(), q.options.clone()))
            .unwrap_or_default();

        #[allow(clippy::cast_precision_loss)]
        let progress = if total == 0 {
            0.0
        } else {
            (index + 1) as f64 / total as f64
        };

        SessionSnapshot {
            status: self.session.status,
            question_index: index,
            question_number: index + 1,
            total_questions: total,
            progress,
            prompt,
            options,
            remaining_secs: self.session.remaining_secs,
            low_time: self.session.remaining_secs <= self.low_time_secs,
            selected: self.session.selected(),
            correct_so_far: self.session.correct_answers,
            scored_so_far: self.session.scored_questions,
            is_last_question: index + 1 >= total,
            tab_switch_count: integrity.tab_switch_count,
            clipboard_event_count: integrity.clipboard_event_count,
            latest_cheating_score: integrity.latest_cheating_score,
            cheating_alert: integrity.latest_cheating_score > self.alert_threshold,
        }
    }
}

#[cfg(test)]
mod tests;
