use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClipboardKind {
    Copy,
    Cut,
    Paste,
}

impl fmt::Display for ClipboardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copy => write!(f, "Copy"),
            Self::Cut => write!(f, "Cut"),
            Self::Paste => write!(f, "Paste"),
        }
    }
}

/// What the host should do with an intercepted clipboard event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardDecision {
    /// Discard the event's default behaviour
    Suppress,
    Allow,
}

/// Suppresses clipboard use while armed and counts every occurrence
#[derive(Debug, Clone, Default)]
pub struct ClipboardInterceptor {
    armed: bool,
    event_count: u32,
}

impl ClipboardInterceptor {
    pub fn arm(&mut self) {
        self.armed = true;
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }

    pub fn intercept(&mut self, kind: ClipboardKind) -> ClipboardDecision {
        if !self.armed {
            return ClipboardDecision::Allow;
        }
        self.event_count = self.event_count.saturating_add(1);
        log::debug!("Suppressed clipboard {kind} (total {})", self.event_count);
        ClipboardDecision::Suppress
    }

    #[must_use]
    pub const fn event_count(&self) -> u32 {
        self.event_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unarmed_interceptor_allows_and_does_not_count() {
        let mut interceptor = ClipboardInterceptor::default();
        assert_eq!(
            interceptor.intercept(ClipboardKind::Copy),
            ClipboardDecision::Allow
        );
        assert_eq!(interceptor.event_count(), 0);
    }

    #[test]
    fn test_armed_interceptor_suppresses_every_event() {
        let mut interceptor = ClipboardInterceptor::default();
        interceptor.arm();
        assert_eq!(
            interceptor.intercept(ClipboardKind::Paste),
            ClipboardDecision::Suppress
        );
        assert_eq!(
            interceptor.intercept(ClipboardKind::Copy),
            ClipboardDecision::Suppress
        );
        interceptor.disarm();
        assert_eq!(
            interceptor.intercept(ClipboardKind::Cut),
            ClipboardDecision::Allow
        );
        assert_eq!(interceptor.event_count(), 2);
    }
}
