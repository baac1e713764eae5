use crate::integrity::ClipboardKind;
use crate::scoring::SessionResult;
use crate::session::SessionSnapshot;

/// Severity of a user-facing notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NoticeLevel {
    Info,
    Warning,
    /// Elevated warning raised on high-risk classifier responses
    Alert,
}

/// Non-blocking message raised to the candidate during a session.
/// None of these ever stop progress.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    SessionStarted,
    TabSwitch { count: u32 },
    ClipboardBlocked { kind: ClipboardKind },
    SuspiciousBehavior { risk_score: f64 },
    MultipleFaces,
    CameraUnavailable { reason: String },
    FullscreenUnavailable,
    ClassifierUnavailable { reason: String },
    SelectAnswer,
}

impl Notice {
    #[must_use]
    pub const fn level(&self) -> NoticeLevel {
        match self {
            Self::SessionStarted => NoticeLevel::Info,
            Self::SuspiciousBehavior { .. } | Self::MultipleFaces => NoticeLevel::Alert,
            _ => NoticeLevel::Warning,
        }
    }

    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::SessionStarted => "Interview Started",
            Self::CameraUnavailable { .. } | Self::SelectAnswer => "Error",
            _ => "Warning",
        }
    }

    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::SessionStarted => String::from(
                "Please ensure you are in a well-lit area and your face is visible to the camera.",
            ),
            Self::TabSwitch { count } => format!(
                "Switching tabs is not allowed during the interview! ({count} recorded)"
            ),
            Self::ClipboardBlocked { kind } => {
                format!("{kind} is disabled during the interview!")
            }
            Self::SuspiciousBehavior { risk_score } => {
                format!("Suspicious behavior detected! (risk {risk_score:.2})")
            }
            Self::MultipleFaces => String::from("Multiple faces detected!"),
            Self::CameraUnavailable { reason } => format!(
                "Failed to access camera. Please ensure camera permissions are granted. ({reason})"
            ),
            Self::FullscreenUnavailable => String::from(
                "Fullscreen could not be enabled; the interview continues without it.",
            ),
            Self::ClassifierUnavailable { reason } => {
                format!("Integrity monitoring is temporarily unavailable ({reason})")
            }
            Self::SelectAnswer => String::from("Please select an answer before proceeding"),
        }
    }
}

/// Receives everything the presentation layer shows while a session runs
pub trait SessionObserver: Send + Sync {
    /// Show a non-blocking notice
    fn notice(&self, notice: &Notice);

    /// Redraw the live view after a state change
    fn render(&self, _snapshot: &SessionSnapshot) {}
}

/// Displays the terminal verdict. Carries no logic back into the engine.
pub trait ResultsPresenter: Send + Sync {
    fn present(&self, result: &SessionResult);
}
