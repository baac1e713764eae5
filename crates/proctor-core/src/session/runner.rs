use super::controller::{AdvanceTrigger, SessionController, Transition};
use super::state::SessionStatus;
use crate::camera::Camera;
use crate::config::EngineConfig;
use crate::error::{ProctorError, Result};
use crate::event::{SessionEvent, SessionInput, TimerEvent};
use crate::fullscreen::Fullscreen;
use crate::integrity::{FrameClassifier, FrameSampler, IntegrityState, SamplerSettings};
use crate::notice::{Notice, ResultsPresenter, SessionObserver};
use crate::question::QuestionSet;
use crate::scope::TaskScope;
use crate::scoring::SessionResult;
use crate::timer::QuestionTimer;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

/// External collaborators a session runs against
pub struct SessionServices {
    pub camera: Arc<dyn Camera>,
    pub classifier: Arc<dyn FrameClassifier>,
    pub fullscreen: Fullscreen,
    pub observer: Arc<dyn SessionObserver>,
    pub presenter: Arc<dyn ResultsPresenter>,
}

/// Summary of a finished run, completed or aborted
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionOutcome {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub result: Option<SessionResult>,
    pub integrity: IntegrityState,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub total_questions: usize,
    pub answered: usize,
}

/// Drives a [`SessionController`] from timers, integrity tasks and
/// candidate input.
///
/// Frame sampling only runs when fullscreen was granted.
///
/// Every task the session spawns lives in one [`TaskScope`]. Teardown
/// cancels that scope, stops the countdown, releases the camera and leaves
/// fullscreen; it runs on completion, on abort, and on drop.
pub struct SessionRunner {
    session_id: Uuid,
    controller: SessionController,
    fullscreen: Fullscreen,
    observer: Arc<dyn SessionObserver>,
    presenter: Arc<dyn ResultsPresenter>,
    timer: QuestionTimer,
    sampler: FrameSampler,
    scope: TaskScope,
    events_tx: UnboundedSender<SessionEvent>,
    events_rx: UnboundedReceiver<SessionEvent>,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    torn_down: bool,
    presented: bool,
}

impl SessionRunner {
    /// Build a runner for `questions`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` is invalid.
    pub fn new(questions: QuestionSet, config: &EngineConfig, services: SessionServices) -> Result<Self> {
        let controller = SessionController::new(questions, config)?;
        let settings = SamplerSettings {
            interval: config.integrity.frame_interval(),
            timeout: config.integrity.classifier_timeout(),
            reset_classifier: config.integrity.reset_classifier_on_start,
        };
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Ok(Self {
            session_id: Uuid::new_v4(),
            controller,
            fullscreen: services.fullscreen,
            observer: services.observer,
            presenter: services.presenter,
            timer: QuestionTimer::new(&config.timer),
            sampler: FrameSampler::new(services.camera, services.classifier, settings),
            scope: TaskScope::new("session"),
            events_tx,
            events_rx,
            started_at: Utc::now(),
            ended_at: None,
            torn_down: false,
            presented: false,
        })
    }

    #[must_use]
    pub const fn session_id(&self) -> Uuid {
        self.session_id
    }

    #[must_use]
    pub const fn controller(&self) -> &SessionController {
        &self.controller
    }

    #[must_use]
    pub const fn timer_resets(&self) -> usize {
        self.timer.resets()
    }

    /// Camera releases performed by this session
    #[must_use]
    pub fn camera_releases(&self) -> usize {
        self.sampler.slot().release_count()
    }

    /// Run the session to completion or abort.
    ///
    /// A closed input channel counts as the view going away and aborts the
    /// session, as does Ctrl-C.
    ///
    /// # Errors
    ///
    /// Returns [`ProctorError::InvalidState`] if the session was already run.
    pub async fn run(&mut self, mut inputs: UnboundedReceiver<SessionInput>) -> Result<SessionOutcome> {
        self.controller.begin_start()?;
        self.started_at = Utc::now();
        log::info!("Starting session {}", self.session_id);

        let granted = {
            let enter = self.fullscreen.enter();
            tokio::pin!(enter);
            loop {
                tokio::select! {
                    biased;
                    granted = &mut enter => break Some(granted),
                    input = inputs.recv() => match input {
                        Some(SessionInput::Close) | None => break None,
                        Some(other) => log::debug!("Ignoring {other:?} before session is active"),
                    },
                }
            }
        };
        let Some(granted) = granted else {
            self.abort();
            return Ok(self.outcome());
        };

        for notice in self.controller.activate(granted)? {
            self.notify(&notice);
        }
        self.timer.start(&mut self.scope, 0, self.events_tx.clone());
        if granted {
            self.sampler
                .start(&mut self.scope, self.controller.epoch(), self.events_tx.clone());
        } else {
            log::warn!("Fullscreen unavailable, camera monitoring disabled");
        }
        self.render();

        loop {
            tokio::select! {
                Some(event) = self.events_rx.recv() => {
                    if self.handle_event(event) {
                        break;
                    }
                }
                input = inputs.recv() => {
                    let finished = match input {
                        Some(input) => self.handle_input(input),
                        None => {
                            log::info!("Session view closed");
                            self.abort();
                            true
                        }
                    };
                    if finished {
                        break;
                    }
                }
                Ok(()) = tokio::signal::ctrl_c() => {
                    log::info!("Received Ctrl-C, aborting session...");
                    self.abort();
                    break;
                }
            }
        }

        Ok(self.outcome())
    }

    fn handle_event(&mut self, event: SessionEvent) -> bool {
        match event {
            SessionEvent::Timer(TimerEvent::Tick {
                question_index,
                remaining_secs,
            }) => {
                if self.controller.timer_tick(question_index, remaining_secs) {
                    self.render();
                }
                false
            }
            SessionEvent::Timer(TimerEvent::Expired { question_index }) => {
                let transition = self.controller.timer_expired(question_index);
                self.apply(transition)
            }
            SessionEvent::CameraAcquired { epoch } => {
                if epoch == self.controller.epoch() {
                    log::info!("Camera monitoring started");
                }
                false
            }
            SessionEvent::CameraUnavailable { epoch, error } => {
                if let Some(notice) = self.controller.camera_unavailable(epoch, &error) {
                    self.notify(&notice);
                }
                false
            }
            SessionEvent::FrameClassified { epoch, verdict } => {
                let notices = self.controller.apply_verdict(epoch, &verdict);
                for notice in &notices {
                    self.notify(notice);
                }
                self.render();
                false
            }
            SessionEvent::FrameFailed { epoch, error } => {
                if let Some(notice) = self.controller.record_failure(epoch, &error) {
                    self.notify(&notice);
                }
                false
            }
        }
    }

    fn handle_input(&mut self, input: SessionInput) -> bool {
        match input {
            SessionInput::Select {
                question_index,
                option_index,
            } => {
                match self.controller.submit_answer(question_index, option_index) {
                    Ok(true) => self.render(),
                    Ok(false) => {}
                    Err(e) => log::warn!("Answer rejected: {e}"),
                }
                false
            }
            SessionInput::Next { question_index } => {
                let transition = self.controller.advance(question_index, AdvanceTrigger::User);
                self.apply(transition)
            }
            SessionInput::Visibility(state) => {
                if let Some(notice) = self.controller.record_visibility(state) {
                    self.notify(&notice);
                    self.render();
                }
                false
            }
            SessionInput::Clipboard(kind) => {
                let (decision, notice) = self.controller.record_clipboard(kind);
                log::debug!("Clipboard {kind}: {decision:?}");
                if let Some(notice) = notice {
                    self.notify(&notice);
                }
                false
            }
            SessionInput::Close => {
                self.abort();
                true
            }
        }
    }

    /// Act on a controller transition. Returns whether the session ended.
    fn apply(&mut self, transition: Result<Transition>) -> bool {
        match transition {
            Ok(Transition::NextQuestion { index }) => {
                self.timer
                    .reset(&mut self.scope, index, self.events_tx.clone());
                self.render();
                false
            }
            Ok(Transition::Finished(result)) => {
                self.teardown();
                self.present(&result);
                true
            }
            Ok(Transition::Ignored) => false,
            Err(ProctorError::UserInput(reason)) => {
                log::debug!("Advance rejected: {reason}");
                self.notify(&Notice::SelectAnswer);
                false
            }
            Err(e) => {
                log::warn!("Advance failed: {e}");
                false
            }
        }
    }

    fn present(&mut self, result: &SessionResult) {
        if self.presented {
            return;
        }
        self.presented = true;
        self.presenter.present(result);
    }

    fn notify(&self, notice: &Notice) {
        self.observer.notice(notice);
    }

    fn render(&self) {
        self.observer.render(&self.controller.snapshot());
    }

    /// Abort if still running, then tear down
    pub fn abort(&mut self) {
        self.controller.abort();
        self.teardown();
    }

    /// Release everything the session holds. Idempotent.
    fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.scope.cancel();
        self.timer.stop();
        self.sampler.stop();
        self.fullscreen.exit();
        self.ended_at = Some(Utc::now());
        log::info!(
            "Session {} torn down ({}), {} live tasks",
            self.session_id,
            self.controller.status(),
            self.scope.live_tasks()
        );
    }

    fn outcome(&self) -> SessionOutcome {
        SessionOutcome {
            session_id: self.session_id,
            status: self.controller.status(),
            result: self.controller.result(),
            integrity: self.controller.integrity(),
            started_at: self.started_at,
            ended_at: self.ended_at.unwrap_or_else(Utc::now),
            total_questions: self.controller.total_questions(),
            answered: self.controller.session().scored_questions(),
        }
    }
}

impl Drop for SessionRunner {
    fn drop(&mut self) {
        if !self.torn_down {
            log::debug!("Session {} dropped while running", self.session_id);
            self.abort();
        }
    }
}
