//! Integrity monitoring: tab visibility, clipboard use and camera frames.
//!
//! [`IntegrityMonitor`] is the pure state the session folds watcher reports
//! into. The asynchronous half (camera acquisition and frame sampling) lives
//! in [`sampler`] and reports back through session events tagged with the
//! monitor's epoch.

mod classifier;
mod clipboard;
mod sampler;
mod visibility;

pub use classifier::{ClassificationStatus, Frame, FrameClassifier, FrameVerdict, RiskLevel};
pub use clipboard::{ClipboardDecision, ClipboardInterceptor, ClipboardKind};
pub use sampler::{CameraSlot, FrameSampler, SamplerSettings};
pub use visibility::{VisibilityState, VisibilityWatcher};

use crate::error::ProctorError;
use crate::notice::Notice;
use serde::Serialize;

/// Integrity signals gathered over one session
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityState {
    pub tab_switch_count: u32,
    pub clipboard_event_count: u32,
    /// Most recent classifier risk score; overwritten, never accumulated
    pub latest_cheating_score: f64,
}

#[derive(Debug, Clone)]
pub struct IntegrityMonitor {
    visibility: VisibilityWatcher,
    clipboard: ClipboardInterceptor,
    latest_cheating_score: f64,
    epoch: u64,
    active: bool,
    classifier_healthy: bool,
}

impl Default for IntegrityMonitor {
    fn default() -> Self {
        Self {
            visibility: VisibilityWatcher::default(),
            clipboard: ClipboardInterceptor::default(),
            latest_cheating_score: 0.0,
            epoch: 0,
            active: false,
            classifier_healthy: true,
        }
    }
}

impl IntegrityMonitor {
    /// Start watching. Returns the epoch asynchronous reports must carry.
    pub fn begin(&mut self) -> u64 {
        self.epoch += 1;
        self.active = true;
        self.classifier_healthy = true;
        self.clipboard.arm();
        self.epoch
    }

    /// Stop watching. Reports from the ended epoch are ignored from now on.
    pub fn end(&mut self) {
        if self.active {
            log::debug!("Integrity monitoring ended for epoch {}", self.epoch);
        }
        self.active = false;
        self.clipboard.disarm();
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.active && epoch == self.epoch
    }

    pub fn record_visibility(&mut self, state: VisibilityState) -> Option<Notice> {
        if !self.active {
            return None;
        }
        let count = self.visibility.observe(state)?;
        log::warn!("Tab switch detected ({count} so far)");
        Some(Notice::TabSwitch { count })
    }

    pub fn record_clipboard(&mut self, kind: ClipboardKind) -> (ClipboardDecision, Option<Notice>) {
        match self.clipboard.intercept(kind) {
            ClipboardDecision::Suppress => {
                log::warn!("Blocked clipboard {kind}");
                (
                    ClipboardDecision::Suppress,
                    Some(Notice::ClipboardBlocked { kind }),
                )
            }
            ClipboardDecision::Allow => (ClipboardDecision::Allow, None),
        }
    }

    /// Fold a classifier verdict into the state.
    ///
    /// Verdicts from an ended or earlier epoch are discarded.
    pub fn apply_verdict(&mut self, epoch: u64, verdict: &FrameVerdict) -> Vec<Notice> {
        if !self.is_current(epoch) {
            log::debug!("Discarding stale verdict from epoch {epoch}");
            return Vec::new();
        }
        self.classifier_healthy = true;

        if verdict.risk_score.is_finite() {
            self.latest_cheating_score = verdict.risk_score.clamp(0.0, 1.0);
        } else {
            log::warn!("Ignoring non-finite risk score from classifier");
        }

        let mut notices = Vec::new();
        if verdict.is_high_risk() {
            log::warn!(
                "High risk frame (score {:.2})",
                self.latest_cheating_score
            );
            notices.push(Notice::SuspiciousBehavior {
                risk_score: self.latest_cheating_score,
            });
        }
        if verdict.multiple_faces_detected {
            log::warn!("Multiple faces detected in frame");
            notices.push(Notice::MultipleFaces);
        }
        notices
    }

    /// Record a failed sample. The last known score is kept; only the first
    /// failure after a success is surfaced.
    pub fn record_failure(&mut self, epoch: u64, error: &ProctorError) -> Option<Notice> {
        if !self.is_current(epoch) {
            return None;
        }
        log::debug!("Frame sample failed: {error}");
        if !self.classifier_healthy {
            return None;
        }
        self.classifier_healthy = false;
        Some(Notice::ClassifierUnavailable {
            reason: error.to_string(),
        })
    }

    pub fn camera_unavailable(&mut self, epoch: u64, error: &ProctorError) -> Option<Notice> {
        if !self.is_current(epoch) {
            return None;
        }
        Some(Notice::CameraUnavailable {
            reason: error.to_string(),
        })
    }

    #[must_use]
    pub const fn latest_cheating_score(&self) -> f64 {
        self.latest_cheating_score
    }

    #[must_use]
    pub const fn state(&self) -> IntegrityState {
        IntegrityState {
            tab_switch_count: self.visibility.tab_switch_count(),
            clipboard_event_count: self.clipboard.event_count(),
            latest_cheating_score: self.latest_cheating_score,
        }
    }
}
