//! Manager configuration.

use serde::{Deserialize, Serialize};

use crate::query::MAX_WINDOW;

/// Configuration for a [`crate::KindManager`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Upper bound on results returned by an index-window query.
    /// Values above [`MAX_WINDOW`] are capped to it.
    pub window_ceiling: usize,
    /// Log a warning when an accumulate-all query has no limit.
    pub warn_unbounded: bool,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            window_ceiling: MAX_WINDOW,
            warn_unbounded: true,
        }
    }
}

impl ManagerConfig {
    /// Sets the window ceiling, capped to [`MAX_WINDOW`].
    #[must_use]
    pub fn with_window_ceiling(mut self, ceiling: usize) -> Self {
        self.window_ceiling = ceiling.min(MAX_WINDOW);
        self
    }

    #[must_use]
    pub const fn with_warn_unbounded(mut self, warn: bool) -> Self {
        self.warn_unbounded = warn;
        self
    }

    /// The ceiling actually applied to index windows.
    #[must_use]
    pub fn effective_window_ceiling(&self) -> usize {
        self.window_ceiling.min(MAX_WINDOW)
    }
}
