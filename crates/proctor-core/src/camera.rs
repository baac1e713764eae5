use crate::error::{Capability, ProctorError};
use crate::integrity::Frame;
use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// An acquired camera. Must be released exactly once.
#[async_trait]
pub trait CaptureHandle: Send + Sync {
    /// Capture and encode a still frame
    async fn capture(&self) -> Result<Frame>;

    /// Release the underlying device
    fn release(&self);
}

/// Source of camera capture handles
#[async_trait]
pub trait Camera: Send + Sync {
    /// Acquire the camera.
    ///
    /// # Errors
    ///
    /// Returns [`ProctorError::Permission`] when access is denied or no
    /// device is available.
    async fn acquire(&self) -> Result<Arc<dyn CaptureHandle>, ProctorError>;

    fn name(&self) -> &str;
}

/// Camera used when none is configured. Always denies access.
pub struct NoCamera;

#[async_trait]
impl Camera for NoCamera {
    async fn acquire(&self) -> Result<Arc<dyn CaptureHandle>, ProctorError> {
        Err(ProctorError::permission(
            Capability::Camera,
            "no camera configured",
        ))
    }

    fn name(&self) -> &str {
        "none"
    }
}

/// Reads the most recent still written by an external capture process,
/// e.g. `ffmpeg -f v4l2 -i /dev/video0 -update 1 frame.jpg`.
pub struct SnapshotCamera {
    path: PathBuf,
}

impl SnapshotCamera {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Camera for SnapshotCamera {
    async fn acquire(&self) -> Result<Arc<dyn CaptureHandle>, ProctorError> {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) if meta.is_file() => {
                log::info!("Camera acquired: {}", self.path.display());
                Ok(Arc::new(SnapshotHandle {
                    path: self.path.clone(),
                    released: AtomicBool::new(false),
                }))
            }
            Ok(_) => Err(ProctorError::permission(
                Capability::Camera,
                format!("{} is not a file", self.path.display()),
            )),
            Err(e) => Err(ProctorError::permission(
                Capability::Camera,
                format!("{}: {e}", self.path.display()),
            )),
        }
    }

    fn name(&self) -> &str {
        "snapshot"
    }
}

struct SnapshotHandle {
    path: PathBuf,
    released: AtomicBool,
}

#[async_trait]
impl CaptureHandle for SnapshotHandle {
    async fn capture(&self) -> Result<Frame> {
        if self.released.load(Ordering::SeqCst) {
            anyhow::bail!("camera already released");
        }
        let bytes = tokio::fs::read(&self.path).await?;
        if bytes.is_empty() {
            anyhow::bail!("empty frame at {}", self.path.display());
        }
        Ok(Frame::jpeg(bytes))
    }

    fn release(&self) {
        if !self.released.swap(true, Ordering::SeqCst) {
            log::info!("Camera released: {}", self.path.display());
        }
    }
}
