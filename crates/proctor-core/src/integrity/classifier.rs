use anyhow::Result;
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

const ENGINE: base64::engine::GeneralPurpose = base64::engine::general_purpose::STANDARD;

/// One encoded still image captured from the camera
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl Frame {
    #[must_use]
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime: String::from("image/jpeg"),
        }
    }

    /// Encode as a `data:` URL, the form the classification service expects
    #[must_use]
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, ENGINE.encode(&self.bytes))
    }
}

/// Risk bands reported by the classification service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Safe,
    Low,
    Medium,
    High,
    Unknown,
}

impl RiskLevel {
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "SAFE" => Self::Safe,
            "LOW RISK" | "LOW" => Self::Low,
            "MEDIUM RISK" | "MEDIUM" => Self::Medium,
            "HIGH RISK" | "HIGH" => Self::High,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Safe => "SAFE",
            Self::Low => "LOW RISK",
            Self::Medium => "MEDIUM RISK",
            Self::High => "HIGH RISK",
            Self::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassificationStatus {
    Success,
    Error,
}

/// Parsed response for one classified frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameVerdict {
    pub status: ClassificationStatus,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub multiple_faces_detected: bool,
    pub message: Option<String>,
}

impl FrameVerdict {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == ClassificationStatus::Success
    }

    /// Whether this verdict should raise an elevated warning
    #[must_use]
    pub fn is_high_risk(&self) -> bool {
        self.risk_level == RiskLevel::High
    }
}

/// External service scoring a single frame for suspicious behaviour
#[async_trait]
pub trait FrameClassifier: Send + Sync {
    /// Classify one frame
    async fn classify(&self, frame: &Frame) -> Result<FrameVerdict>;

    /// Clear any per-session state the service keeps
    async fn reset_session(&self) -> Result<()> {
        Ok(())
    }

    /// Get the service name for logging
    fn name(&self) -> &str;
}
