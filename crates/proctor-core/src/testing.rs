//! Doubles for the collaborator traits, shared by the crate's test suites.

use crate::camera::{Camera, CaptureHandle};
use crate::error::{Capability, ProctorError};
use crate::fullscreen::FullscreenAdapter;
use crate::integrity::{ClassificationStatus, Frame, FrameClassifier, FrameVerdict, RiskLevel};
use crate::notice::{Notice, ResultsPresenter, SessionObserver};
use crate::scoring::SessionResult;
use crate::session::SessionSnapshot;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub fn verdict(risk_score: f64, risk_level: RiskLevel, multiple_faces: bool) -> FrameVerdict {
    FrameVerdict {
        status: ClassificationStatus::Success,
        risk_score,
        risk_level,
        multiple_faces_detected: multiple_faces,
        message: None,
    }
}

pub struct ScriptedFullscreen {
    name: &'static str,
    grant: bool,
    pub requests: Arc<AtomicUsize>,
    pub exits: Arc<AtomicUsize>,
}

impl ScriptedFullscreen {
    pub fn new(name: &'static str, grant: bool) -> Self {
        Self {
            name,
            grant,
            requests: Arc::new(AtomicUsize::new(0)),
            exits: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl FullscreenAdapter for ScriptedFullscreen {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn request(&self) -> anyhow::Result<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        if self.grant {
            Ok(())
        } else {
            anyhow::bail!("{} refused", self.name)
        }
    }

    fn exit(&self) -> anyhow::Result<()> {
        self.exits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Camera whose handles count every release call
pub struct CountingCamera {
    deny: bool,
    acquire_delay: Duration,
    pub acquisitions: Arc<AtomicUsize>,
    pub captures: Arc<AtomicUsize>,
    pub releases: Arc<AtomicUsize>,
}

impl CountingCamera {
    pub fn new() -> Self {
        Self {
            deny: false,
            acquire_delay: Duration::ZERO,
            acquisitions: Arc::new(AtomicUsize::new(0)),
            captures: Arc::new(AtomicUsize::new(0)),
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn denied() -> Self {
        Self {
            deny: true,
            ..Self::new()
        }
    }

    pub fn with_acquire_delay(mut self, delay: Duration) -> Self {
        self.acquire_delay = delay;
        self
    }
}

#[async_trait]
impl Camera for CountingCamera {
    async fn acquire(&self) -> Result<Arc<dyn CaptureHandle>, ProctorError> {
        if !self.acquire_delay.is_zero() {
            tokio::time::sleep(self.acquire_delay).await;
        }
        if self.deny {
            return Err(ProctorError::permission(
                Capability::Camera,
                "permission denied",
            ));
        }
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(CountingHandle {
            captures: self.captures.clone(),
            releases: self.releases.clone(),
        }))
    }

    fn name(&self) -> &str {
        "counting"
    }
}

struct CountingHandle {
    captures: Arc<AtomicUsize>,
    releases: Arc<AtomicUsize>,
}

#[async_trait]
impl CaptureHandle for CountingHandle {
    async fn capture(&self) -> anyhow::Result<Frame> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        Ok(Frame::jpeg(vec![0xff, 0xd8, 0xff]))
    }

    fn release(&self) {
        self.releases.fetch_add(1, Ordering::SeqCst);
    }
}

/// Classifier replaying a script of outcomes, then repeating a fallback
pub struct ScriptedClassifier {
    script: Mutex<VecDeque<Result<FrameVerdict, String>>>,
    fallback: FrameVerdict,
    delay: Duration,
    pub calls: Arc<AtomicUsize>,
    pub resets: Arc<AtomicUsize>,
}

impl ScriptedClassifier {
    pub fn returning(fallback: FrameVerdict) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback,
            delay: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
            resets: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn then(self, outcome: Result<FrameVerdict, String>) -> Self {
        self.script.lock().unwrap().push_back(outcome);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait]
impl FrameClassifier for ScriptedClassifier {
    async fn classify(&self, _frame: &Frame) -> anyhow::Result<FrameVerdict> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(verdict)) => Ok(verdict),
            Some(Err(reason)) => Err(anyhow::anyhow!(reason)),
            None => Ok(self.fallback.clone()),
        }
    }

    async fn reset_session(&self) -> anyhow::Result<()> {
        self.resets.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[derive(Default)]
pub struct RecordingObserver {
    pub notices: Mutex<Vec<Notice>>,
    pub snapshots: Mutex<Vec<SessionSnapshot>>,
}

impl RecordingObserver {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&Notice) -> bool) -> usize {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .filter(|&n| predicate(n))
            .count()
    }

    pub fn last_snapshot(&self) -> Option<SessionSnapshot> {
        self.snapshots.lock().unwrap().last().cloned()
    }
}

impl SessionObserver for RecordingObserver {
    fn notice(&self, notice: &Notice) {
        self.notices.lock().unwrap().push(notice.clone());
    }

    fn render(&self, snapshot: &SessionSnapshot) {
        self.snapshots.lock().unwrap().push(snapshot.clone());
    }
}

#[derive(Default)]
pub struct RecordingPresenter {
    pub results: Mutex<Vec<SessionResult>>,
}

impl RecordingPresenter {
    pub fn results(&self) -> Vec<SessionResult> {
        self.results.lock().unwrap().clone()
    }
}

impl ResultsPresenter for RecordingPresenter {
    fn present(&self, result: &SessionResult) {
        self.results.lock().unwrap().push(*result);
    }
}
