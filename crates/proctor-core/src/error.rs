use thiserror::Error;

/// Errors raised by the assessment engine.
///
/// Only [`ProctorError::Configuration`] is fatal: it stops a session from
/// being constructed. Permission and transient service errors are caught where
/// they happen and surfaced as non-blocking notices; user input errors leave
/// the session untouched so the candidate can be re-prompted.
#[derive(Debug, Error)]
pub enum ProctorError {
    /// Malformed or absent question set, or invalid engine configuration
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Camera or fullscreen access was denied
    #[error("permission denied for {capability}: {reason}")]
    Permission {
        capability: Capability,
        reason: String,
    },

    /// A call to an external service failed; the next attempt may succeed
    #[error("{service} unavailable: {reason}")]
    TransientService { service: String, reason: String },

    /// The candidate attempted an action the session cannot accept yet
    #[error("{0}")]
    UserInput(String),

    /// The operation is not valid for the current session status
    #[error("cannot {operation} while session is {status}")]
    InvalidState {
        operation: &'static str,
        status: crate::session::SessionStatus,
    },
}

/// Capabilities the engine asks the host environment for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Fullscreen,
    Camera,
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fullscreen => write!(f, "fullscreen"),
            Self::Camera => write!(f, "camera"),
        }
    }
}

impl ProctorError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn permission(capability: Capability, reason: impl Into<String>) -> Self {
        Self::Permission {
            capability,
            reason: reason.into(),
        }
    }

    pub fn transient(service: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::TransientService {
            service: service.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error must abort session construction
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

pub type Result<T> = std::result::Result<T, ProctorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_configuration_is_fatal() {
        assert!(ProctorError::configuration("no questions").is_fatal());
        assert!(!ProctorError::permission(Capability::Camera, "denied").is_fatal());
        assert!(!ProctorError::transient("classifier", "timeout").is_fatal());
        assert!(!ProctorError::UserInput("select an answer".to_string()).is_fatal());
    }

    #[test]
    fn test_permission_display_names_capability() {
        let err = ProctorError::permission(Capability::Fullscreen, "no adapter accepted");
        assert_eq!(
            err.to_string(),
            "permission denied for fullscreen: no adapter accepted"
        );
    }
}
