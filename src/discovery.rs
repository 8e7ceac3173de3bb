use std::sync::Arc;

use crate::ops::WindowOps;
use crate::registry::OverlayRegistry;
use crate::router::EventRouter;

/// Periodic reconciliation pass. Event hooks are the primary mechanism; this
/// sweep is the backstop for notifications the OS coalesced or dropped, and
/// it seeds the registry with the windows that were already open at startup.
pub struct Discovery {
    registry: Arc<OverlayRegistry>,
    ops: Arc<dyn WindowOps>,
    router: Arc<EventRouter>,
}

impl Discovery {
    pub fn new(
        registry: Arc<OverlayRegistry>,
        ops: Arc<dyn WindowOps>,
        router: Arc<EventRouter>,
    ) -> Self {
        Self {
            registry,
            ops,
            router,
        }
    }

    /// Reap pairs whose browser died without a destroy event, then adopt any
    /// visible untracked browser window. Adoption goes through the router's
    /// creation path, so a window picked up here and by an event at the same
    /// time still ends up with exactly one pair.
    pub fn sweep(&self) {
        for pair in self.registry.snapshot() {
            if self.ops.is_window(pair.browser) {
                continue;
            }
            if self.registry.remove(pair.browser).is_some() {
                self.ops.hide_overlay(pair.overlay);
                self.ops.destroy_overlay(pair.overlay);
                tracing::info!(browser = %pair.browser, "reaped dead browser window");
            }
        }

        for window in self.ops.enumerate_targets() {
            if self.ops.is_visible(window) && !self.registry.contains(window) {
                tracing::debug!(%window, "sweep found untracked browser window");
                self.router.adopt(window);
            }
        }
    }
}
