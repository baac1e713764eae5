use crate::http::{client_with_timeout, ResponseExt};
use anyhow::{Context, Result};
use async_trait::async_trait;
use proctor_core::config::ClassifierConfig;
use proctor_core::integrity::{ClassificationStatus, Frame, FrameClassifier, FrameVerdict, RiskLevel};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Serialize)]
struct FrameRequest {
    frame: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FrameResponse {
    status: String,
    score: Option<f64>,
    risk_level: Option<String>,
    metrics: FrameMetrics,
    message: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FrameMetrics {
    multiple_faces: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StatusResponse {
    status: String,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    summary: String,
}

impl FrameResponse {
    fn into_verdict(self) -> FrameVerdict {
        let status = if self.status.eq_ignore_ascii_case("success") {
            ClassificationStatus::Success
        } else {
            ClassificationStatus::Error
        };
        FrameVerdict {
            status,
            risk_score: self.score.unwrap_or_default(),
            risk_level: self
                .risk_level
                .as_deref()
                .map_or(RiskLevel::Unknown, RiskLevel::from_label),
            multiple_faces_detected: self.metrics.multiple_faces,
            message: self.message.or(self.error),
        }
    }
}

/// Client for the frame classification service
pub struct HttpFrameClassifier {
    client: Client,
    config: ClassifierConfig,
}

impl HttpFrameClassifier {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: ClassifierConfig, timeout: Duration) -> Result<Self> {
        Ok(Self {
            client: client_with_timeout(timeout)?,
            config,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Check that the service is up
    ///
    /// # Errors
    ///
    /// Returns an error if the service is unreachable or reports a status
    /// other than `ok`.
    pub async fn health(&self) -> Result<()> {
        let url = self.config.endpoint(&self.config.health_path);
        let response: StatusResponse = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to reach classifier at {url}"))?
            .ensure_success("Classifier")
            .await?
            .json()
            .await
            .context("Failed to parse classifier health response")?;

        if response.status != "ok" {
            anyhow::bail!("Classifier reported status {:?}", response.status);
        }
        Ok(())
    }

    /// Fetch the service's text summary of the current session
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or no session is active.
    pub async fn session_summary(&self) -> Result<String> {
        let url = self.config.endpoint("/get-session-summary");
        let response: SummaryResponse = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to reach classifier at {url}"))?
            .ensure_success("Classifier")
            .await?
            .json()
            .await
            .context("Failed to parse classifier summary")?;
        Ok(response.summary)
    }
}

#[async_trait]
impl FrameClassifier for HttpFrameClassifier {
    async fn classify(&self, frame: &Frame) -> Result<FrameVerdict> {
        let url = self.config.endpoint(&self.config.frame_path);
        let body = FrameRequest {
            frame: frame.to_data_url(),
        };

        let response: FrameResponse = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .context("Failed to send frame to classifier")?
            .ensure_success("Classifier")
            .await?
            .json()
            .await
            .context("Failed to parse classifier response")?;

        Ok(response.into_verdict())
    }

    async fn reset_session(&self) -> Result<()> {
        let url = self.config.endpoint(&self.config.reset_path);
        let response: StatusResponse = self
            .client
            .post(&url)
            .send()
            .await
            .context("Failed to reset classifier session")?
            .ensure_success("Classifier")
            .await?
            .json()
            .await
            .unwrap_or_default();
        log::debug!(
            "Classifier session reset: {} {}",
            response.status,
            response.message.unwrap_or_default()
        );
        Ok(())
    }

    fn name(&self) -> &str {
        "classifier"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> FrameVerdict {
        serde_json::from_str::<FrameResponse>(json)
            .unwrap()
            .into_verdict()
    }

    #[test]
    fn test_success_response_parses() {
        let verdict = parse(
            r#"{
                "status": "success",
                "score": 0.82,
                "risk_level": "HIGH RISK",
                "metrics": {
                    "head_tilt": "Left",
                    "mouth_state": "Closed",
                    "gaze_direction": "Center",
                    "multiple_faces": true
                }
            }"#,
        );
        assert!(verdict.is_success());
        assert!(verdict.is_high_risk());
        assert!(verdict.multiple_faces_detected);
        assert!((verdict.risk_score - 0.82).abs() < 1e-9);
    }

    #[test]
    fn test_face_absent_is_not_success() {
        let verdict = parse(
            r#"{"status":"error","message":"No face detected","score":1.0,"risk_level":"HIGH RISK"}"#,
        );
        assert!(!verdict.is_success());
        assert_eq!(verdict.message.as_deref(), Some("No face detected"));
    }

    #[test]
    fn test_missing_fields_degrade_to_defaults() {
        let verdict = parse(r#"{"error":"No frame data provided"}"#);
        assert_eq!(verdict.status, ClassificationStatus::Error);
        assert_eq!(verdict.risk_level, RiskLevel::Unknown);
        assert!(!verdict.multiple_faces_detected);
        assert_eq!(verdict.message.as_deref(), Some("No frame data provided"));
    }

    #[test]
    fn test_request_body_carries_data_url() {
        let body = FrameRequest {
            frame: Frame::jpeg(vec![0xff, 0xd8, 0xff]).to_data_url(),
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"frame":"data:image/jpeg;base64,/9j/"}"#
        );
    }

    #[tokio::test]
    async fn test_unreachable_service_is_an_error() {
        let config = ClassifierConfig {
            base_url: String::from("http://127.0.0.1:9"),
            ..ClassifierConfig::default()
        };
        let classifier = HttpFrameClassifier::new(config, Duration::from_millis(500)).unwrap();
        assert!(classifier.classify(&Frame::jpeg(vec![1])).await.is_err());
        assert!(classifier.health().await.is_err());
    }
}
