use serde::{Deserialize, Serialize};

/// Whether the assessment surface is currently visible to the candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisibilityState {
    Visible,
    Hidden,
}

/// Counts transitions of the page to hidden.
///
/// Repeated `Hidden` reports without an intervening `Visible` are the same
/// switch and are counted once.
#[derive(Debug, Clone)]
pub struct VisibilityWatcher {
    last: VisibilityState,
    tab_switch_count: u32,
}

impl Default for VisibilityWatcher {
    fn default() -> Self {
        Self {
            last: VisibilityState::Visible,
            tab_switch_count: 0,
        }
    }
}

impl VisibilityWatcher {
    /// Record a visibility report. Returns the new switch count when this
    /// report is a fresh transition to hidden.
    pub fn observe(&mut self, state: VisibilityState) -> Option<u32> {
        let previous = std::mem::replace(&mut self.last, state);
        if previous == VisibilityState::Visible && state == VisibilityState::Hidden {
            self.tab_switch_count = self.tab_switch_count.saturating_add(1);
            Some(self.tab_switch_count)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn tab_switch_count(&self) -> u32 {
        self.tab_switch_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_hide_counts_once() {
        let mut watcher = VisibilityWatcher::default();
        assert_eq!(watcher.observe(VisibilityState::Hidden), Some(1));
        assert_eq!(watcher.observe(VisibilityState::Hidden), None);
        assert_eq!(watcher.observe(VisibilityState::Visible), None);
        assert_eq!(watcher.observe(VisibilityState::Hidden), Some(2));
        assert_eq!(watcher.tab_switch_count(), 2);
    }

    #[test]
    fn test_visible_reports_never_count() {
        let mut watcher = VisibilityWatcher::default();
        for _ in 0..5 {
            assert_eq!(watcher.observe(VisibilityState::Visible), None);
        }
        assert_eq!(watcher.tab_switch_count(), 0);
    }
}
