use crate::config::TimerConfig;
use crate::event::{SessionEvent, TimerEvent};
use crate::scope::TaskScope;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::AbortHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Pure countdown for a single question. Expires exactly once.
#[derive(Debug, Clone)]
pub struct Countdown {
    question_index: usize,
    remaining_secs: u32,
    expired: bool,
}

impl Countdown {
    #[must_use]
    pub const fn new(question_index: usize, duration_secs: u32) -> Self {
        Self {
            question_index,
            remaining_secs: duration_secs,
            expired: false,
        }
    }

    /// Advance by one tick. Returns `None` once the countdown has expired.
    pub fn step(&mut self) -> Option<TimerEvent> {
        if self.expired {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.expired = true;
            Some(TimerEvent::Expired {
                question_index: self.question_index,
            })
        } else {
            Some(TimerEvent::Tick {
                question_index: self.question_index,
                remaining_secs: self.remaining_secs,
            })
        }
    }

    #[must_use]
    pub const fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }
}

/// Owns the single countdown task of a session.
///
/// Starting a countdown always cancels the previous one first, so two timers
/// can never run for the same session.
pub struct QuestionTimer {
    duration_secs: u32,
    tick: Duration,
    current: Option<AbortHandle>,
    starts: usize,
    resets: usize,
}

impl QuestionTimer {
    #[must_use]
    pub fn new(config: &TimerConfig) -> Self {
        Self {
            duration_secs: config.question_duration_secs,
            tick: config.tick(),
            current: None,
            starts: 0,
            resets: 0,
        }
    }

    /// Start the countdown for the first question
    pub fn start(
        &mut self,
        scope: &mut TaskScope,
        question_index: usize,
        events: UnboundedSender<SessionEvent>,
    ) {
        self.stop();
        self.spawn(scope, question_index, events);
        self.starts += 1;
    }

    /// Replace the running countdown with a fresh one for the next question
    pub fn reset(
        &mut self,
        scope: &mut TaskScope,
        question_index: usize,
        events: UnboundedSender<SessionEvent>,
    ) {
        self.stop();
        self.spawn(scope, question_index, events);
        self.resets += 1;
        log::debug!("Timer reset for question {}", question_index + 1);
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.current.take() {
            handle.abort();
        }
    }

    #[must_use]
    pub const fn starts(&self) -> usize {
        self.starts
    }

    #[must_use]
    pub const fn resets(&self) -> usize {
        self.resets
    }

    fn spawn(
        &mut self,
        scope: &mut TaskScope,
        question_index: usize,
        events: UnboundedSender<SessionEvent>,
    ) {
        let countdown = Countdown::new(question_index, self.duration_secs);
        self.current = scope.spawn("question-timer", run_countdown(countdown, self.tick, events));
    }
}

impl Drop for QuestionTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_countdown(
    mut countdown: Countdown,
    tick: Duration,
    events: UnboundedSender<SessionEvent>,
) {
    let mut interval = interval_at(Instant::now() + tick, tick);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        interval.tick().await;
        let Some(event) = countdown.step() else {
            return;
        };
        let expired = matches!(event, TimerEvent::Expired { .. });
        if events.send(SessionEvent::Timer(event)).is_err() || expired {
            return;
        }
    }
}
