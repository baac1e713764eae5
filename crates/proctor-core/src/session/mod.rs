//! Session lifecycle: the pure controller and the async runner driving it.

mod controller;
mod runner;
mod state;

pub use controller::{AdvanceTrigger, SessionController, Transition};
pub use runner::{SessionOutcome, SessionRunner, SessionServices};
pub use state::{AssessmentSession, SessionSnapshot, SessionStatus};
