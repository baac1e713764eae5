use crate::camera::{Camera, CaptureHandle};
use crate::error::ProctorError;
use crate::event::SessionEvent;
use crate::integrity::FrameClassifier;
use crate::scope::{CancelSignal, TaskScope};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::time::{interval, timeout, MissedTickBehavior};

enum SlotState {
    Empty,
    Held(Arc<dyn CaptureHandle>),
    Closed,
}

/// Holds the session's camera handle and guarantees it is released exactly
/// once, whichever exit path closes the slot first.
pub struct CameraSlot {
    state: Mutex<SlotState>,
    releases: AtomicUsize,
}

impl Default for CameraSlot {
    fn default() -> Self {
        Self {
            state: Mutex::new(SlotState::Empty),
            releases: AtomicUsize::new(0),
        }
    }
}

impl CameraSlot {
    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a freshly acquired handle. If the slot was closed while the
    /// camera was being acquired, the handle is released immediately and
    /// `false` is returned.
    pub fn install(&self, handle: Arc<dyn CaptureHandle>) -> bool {
        let mut state = self.lock();
        if matches!(*state, SlotState::Empty) {
            *state = SlotState::Held(handle);
            return true;
        }
        drop(state);
        handle.release();
        self.releases.fetch_add(1, Ordering::SeqCst);
        false
    }

    #[must_use]
    pub fn handle(&self) -> Option<Arc<dyn CaptureHandle>> {
        match &*self.lock() {
            SlotState::Held(handle) => Some(handle.clone()),
            SlotState::Empty | SlotState::Closed => None,
        }
    }

    /// Close the slot, releasing any held handle. Idempotent.
    pub fn close(&self) {
        let previous = std::mem::replace(&mut *self.lock(), SlotState::Closed);
        if let SlotState::Held(handle) = previous {
            handle.release();
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(*self.lock(), SlotState::Closed)
    }

    /// How many handles this slot has released
    #[must_use]
    pub fn release_count(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }
}

impl Drop for CameraSlot {
    fn drop(&mut self) {
        self.close();
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SamplerSettings {
    pub interval: Duration,
    pub timeout: Duration,
    pub reset_classifier: bool,
}

/// Periodic camera sampling feeding the frame classification service
pub struct FrameSampler {
    camera: Arc<dyn Camera>,
    classifier: Arc<dyn FrameClassifier>,
    slot: Arc<CameraSlot>,
    settings: SamplerSettings,
}

impl FrameSampler {
    #[must_use]
    pub fn new(
        camera: Arc<dyn Camera>,
        classifier: Arc<dyn FrameClassifier>,
        settings: SamplerSettings,
    ) -> Self {
        Self {
            camera,
            classifier,
            slot: Arc::new(CameraSlot::default()),
            settings,
        }
    }

    #[must_use]
    pub fn slot(&self) -> Arc<CameraSlot> {
        self.slot.clone()
    }

    /// Spawn the acquire-then-sample loop into `scope`
    pub fn start(
        &self,
        scope: &mut TaskScope,
        epoch: u64,
        events: UnboundedSender<SessionEvent>,
    ) {
        let task = SamplerTask {
            camera: self.camera.clone(),
            classifier: self.classifier.clone(),
            slot: self.slot.clone(),
            settings: self.settings,
            signal: scope.signal(),
            epoch,
            events,
        };
        if scope.spawn("frame-sampler", task.run()).is_some() {
            log::info!(
                "Frame sampling every {}ms via {}",
                self.settings.interval.as_millis(),
                self.classifier.name()
            );
        }
    }

    /// Release the camera. Safe to call any number of times.
    pub fn stop(&self) {
        self.slot.close();
    }
}

impl Drop for FrameSampler {
    fn drop(&mut self) {
        self.stop();
    }
}

struct SamplerTask {
    camera: Arc<dyn Camera>,
    classifier: Arc<dyn FrameClassifier>,
    slot: Arc<CameraSlot>,
    settings: SamplerSettings,
    signal: CancelSignal,
    epoch: u64,
    events: UnboundedSender<SessionEvent>,
}

impl SamplerTask {
    async fn run(self) {
        let epoch = self.epoch;

        if self.settings.reset_classifier {
            match timeout(self.settings.timeout, self.classifier.reset_session()).await {
                Ok(Ok(())) => log::debug!("Classifier session reset"),
                Ok(Err(e)) => log::warn!("Failed to reset classifier session: {e}"),
                Err(_) => log::warn!("Classifier session reset timed out"),
            }
        }

        let handle = match self.camera.acquire().await {
            Ok(handle) => handle,
            Err(error) => {
                log::warn!("Camera unavailable, frame sampling disabled: {error}");
                self.emit(SessionEvent::CameraUnavailable { epoch, error });
                return;
            }
        };
        if !self.slot.install(handle) {
            log::debug!("Camera acquired after session ended; released");
            return;
        }
        self.emit(SessionEvent::CameraAcquired { epoch });

        let mut ticker = interval(self.settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            let Some(handle) = self.slot.handle() else {
                return;
            };
            let event = self.sample(handle.as_ref()).await;
            if !self.emit(event) {
                return;
            }
        }
    }

    async fn sample(&self, handle: &dyn CaptureHandle) -> SessionEvent {
        let epoch = self.epoch;
        let frame = match handle.capture().await {
            Ok(frame) => frame,
            Err(e) => {
                return SessionEvent::FrameFailed {
                    epoch,
                    error: ProctorError::transient("camera", e.to_string()),
                }
            }
        };

        match timeout(self.settings.timeout, self.classifier.classify(&frame)).await {
            Ok(Ok(verdict)) if verdict.is_success() => {
                SessionEvent::FrameClassified { epoch, verdict }
            }
            Ok(Ok(verdict)) => SessionEvent::FrameFailed {
                epoch,
                error: ProctorError::transient(
                    self.classifier.name(),
                    verdict
                        .message
                        .unwrap_or_else(|| String::from("non-success status")),
                ),
            },
            Ok(Err(e)) => SessionEvent::FrameFailed {
                epoch,
                error: ProctorError::transient(self.classifier.name(), format!("{e:#}")),
            },
            Err(_) => SessionEvent::FrameFailed {
                epoch,
                error: ProctorError::transient(
                    self.classifier.name(),
                    format!("timed out after {}ms", self.settings.timeout.as_millis()),
                ),
            },
        }
    }

    /// Forward an event unless the session has moved on.
    /// Returns `false` when the loop should stop.
    fn emit(&self, event: SessionEvent) -> bool {
        if self.signal.is_cancelled() || self.slot.is_closed() {
            log::debug!("Dropping stale integrity event for epoch {}", self.epoch);
            return false;
        }
        self.events.send(event).is_ok()
    }
}
