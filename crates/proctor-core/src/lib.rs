pub mod camera;
pub mod config;
pub mod error;
pub mod event;
pub mod fullscreen;
pub mod integrity;
pub mod notice;
pub mod question;
pub mod scope;
pub mod scoring;
pub mod session;
pub mod supply;
pub mod timer;

#[cfg(test)]
pub(crate) mod testing;

pub use camera::{Camera, CaptureHandle, NoCamera, SnapshotCamera};
pub use config::EngineConfig;
pub use error::{Capability, ProctorError, Result};
pub use event::SessionInput;
pub use fullscreen::{Fullscreen, FullscreenAdapter};
pub use integrity::{
    ClipboardKind, Frame, FrameClassifier, FrameVerdict, IntegrityState, RiskLevel,
    VisibilityState,
};
pub use notice::{Notice, NoticeLevel, ResultsPresenter, SessionObserver};
pub use question::{Question, QuestionSet};
pub use scoring::{aggregate, ScoringPolicy, SessionResult};
pub use session::{SessionOutcome, SessionRunner, SessionServices, SessionSnapshot, SessionStatus};
pub use supply::{load_question_set, QuestionSupply, RoleDescriptor};
