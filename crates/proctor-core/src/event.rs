use crate::error::ProctorError;
use crate::integrity::{ClipboardKind, FrameVerdict, VisibilityState};

/// Countdown progress for the question currently on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Tick {
        question_index: usize,
        remaining_secs: u32,
    },
    Expired {
        question_index: usize,
    },
}

/// Events produced by tasks the session spawned.
///
/// Integrity events carry the monitoring epoch they were started under so
/// results that outlive their session can be recognised and discarded.
#[derive(Debug)]
pub enum SessionEvent {
    Timer(TimerEvent),
    CameraAcquired { epoch: u64 },
    CameraUnavailable { epoch: u64, error: ProctorError },
    FrameClassified { epoch: u64, verdict: FrameVerdict },
    FrameFailed { epoch: u64, error: ProctorError },
}

/// Input from the presentation binding.
///
/// Answer actions name the question they were issued for; an action for a
/// question that is no longer current is discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    Select {
        question_index: usize,
        option_index: usize,
    },
    Next {
        question_index: usize,
    },
    Visibility(VisibilityState),
    Clipboard(ClipboardKind),
    /// Explicit close or unmount of the session view
    Close,
}
