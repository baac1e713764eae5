use anyhow::Result;
use async_trait::async_trait;

pub mod terminal;

/// One way of putting the assessment surface into fullscreen
#[async_trait]
pub trait FullscreenAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    /// Request fullscreen. An error means this adapter is unusable here.
    async fn request(&self) -> Result<()>;

    /// Leave fullscreen
    fn exit(&self) -> Result<()>;
}

/// Best-effort fullscreen capability over an ordered list of adapters.
///
/// Adapters are tried in order until one succeeds. Failure of every adapter
/// is not an error: the session proceeds without fullscreen and callers never
/// need to know which adapter was used.
pub struct Fullscreen {
    adapters: Vec<Box<dyn FullscreenAdapter>>,
    engaged: Option<usize>,
}

impl Fullscreen {
    #[must_use]
    pub fn new(adapters: Vec<Box<dyn FullscreenAdapter>>) -> Self {
        Self {
            adapters,
            engaged: None,
        }
    }

    /// A capability with no adapters; `enter` always reports not granted
    #[must_use]
    pub fn unsupported() -> Self {
        Self::new(Vec::new())
    }

    /// Try each adapter in turn. Returns whether fullscreen was granted.
    pub async fn enter(&mut self) -> bool {
        if self.engaged.is_some() {
            return true;
        }
        for (index, adapter) in self.adapters.iter().enumerate() {
            match adapter.request().await {
                Ok(()) => {
                    log::info!("Fullscreen granted by {}", adapter.name());
                    self.engaged = Some(index);
                    return true;
                }
                Err(e) => log::debug!("Fullscreen adapter {} declined: {e}", adapter.name()),
            }
        }
        log::warn!("Fullscreen unavailable, continuing without it");
        false
    }

    /// Leave fullscreen if it was entered. Idempotent and never fails.
    pub fn exit(&mut self) {
        let Some(index) = self.engaged.take() else {
            return;
        };
        if let Some(adapter) = self.adapters.get(index) {
            if let Err(e) = adapter.exit() {
                log::warn!("Failed to leave fullscreen via {}: {e}", adapter.name());
            }
        }
    }

    #[must_use]
    pub const fn is_engaged(&self) -> bool {
        self.engaged.is_some()
    }
}

impl Drop for Fullscreen {
    fn drop(&mut self) {
        self.exit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedFullscreen;

    #[tokio::test]
    async fn test_falls_back_to_next_adapter() {
        let standard = ScriptedFullscreen::new("standard", false);
        let standard_requests = standard.requests.clone();
        let vendor = ScriptedFullscreen::new("vendor", true);
        let vendor_exits = vendor.exits.clone();

        let mut fullscreen = Fullscreen::new(vec![Box::new(standard), Box::new(vendor)]);
        assert!(fullscreen.enter().await);
        assert!(fullscreen.is_engaged());
        assert_eq!(standard_requests.load(std::sync::atomic::Ordering::SeqCst), 1);

        fullscreen.exit();
        fullscreen.exit();
        assert_eq!(vendor_exits.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_all_adapters_failing_is_not_fatal() {
        let mut fullscreen = Fullscreen::new(vec![
            Box::new(ScriptedFullscreen::new("a", false)),
            Box::new(ScriptedFullscreen::new("b", false)),
        ]);
        assert!(!fullscreen.enter().await);
        assert!(!fullscreen.is_engaged());
        fullscreen.exit();
    }

    #[tokio::test]
    async fn test_unsupported_never_grants() {
        assert!(!Fullscreen::unsupported().enter().await);
    }
}
