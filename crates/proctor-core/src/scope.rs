//! Session-scoped task ownership.
//!
//! Every periodic task a session runs (question countdown, frame sampler,
//! in-flight classification calls) is spawned into one [`TaskScope`]. A
//! single [`TaskScope::cancel`] tears all of them down synchronously.

use std::future::Future;
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};

/// Read side of a scope's cancellation signal
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once the owning scope is cancelled or dropped
    pub async fn cancelled(&mut self) {
        // An Err means the sender is gone, which only happens on scope drop.
        let _ = self.rx.wait_for(|cancelled| *cancelled).await;
    }
}

pub struct TaskScope {
    name: &'static str,
    cancel_tx: watch::Sender<bool>,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
}

impl TaskScope {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        let (cancel_tx, _) = watch::channel(false);
        Self {
            name,
            cancel_tx,
            tasks: Vec::new(),
        }
    }

    #[must_use]
    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: self.cancel_tx.subscribe(),
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }

    /// Spawn a task owned by this scope.
    ///
    /// Returns `None` if the scope has already been cancelled; the future is
    /// dropped without running.
    pub fn spawn<F>(&mut self, label: &'static str, task: F) -> Option<AbortHandle>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.is_cancelled() {
            log::debug!("Scope {} cancelled, not spawning {label}", self.name);
            return None;
        }
        self.tasks.retain(|(_, handle)| !handle.is_finished());

        let mut signal = self.signal();
        let handle = tokio::spawn(async move {
            tokio::select! {
                () = task => {}
                () = signal.cancelled() => {}
            }
        });
        let abort = handle.abort_handle();
        self.tasks.push((label, handle));
        Some(abort)
    }

    /// Number of tasks that have not finished yet
    #[must_use]
    pub fn live_tasks(&self) -> usize {
        self.tasks
            .iter()
            .filter(|(_, handle)| !handle.is_finished())
            .count()
    }

    /// Cancel every task in the scope. Idempotent.
    pub fn cancel(&mut self) {
        let already = self.cancel_tx.send_replace(true);
        for (label, handle) in self.tasks.drain(..) {
            if !handle.is_finished() {
                log::debug!("Scope {}: aborting {label}", self.name);
            }
            handle.abort();
        }
        if !already {
            log::debug!("Scope {} cancelled", self.name);
        }
    }
}

impl Drop for TaskScope {
    fn drop(&mut self) {
        self.cancel();
    }
}
