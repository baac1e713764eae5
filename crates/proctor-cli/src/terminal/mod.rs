//! Terminal binding for a proctored session.

pub mod input;
pub mod view;

pub use input::{spawn_reader, TerminalModes};
pub use view::{TerminalObserver, TerminalPresenter};
