use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::cooldown::CooldownGovernor;
use crate::events::{classify, EventKind, RouterAction};
use crate::ops::{PathSource, WindowOps};
use crate::registry::{OverlayRegistry, TrackedPair, WindowId};
use crate::worker;

/// Margin added to a deferred retry so it lands after the cooldown deadline
/// rather than racing it.
const DEFER_GRACE: Duration = Duration::from_millis(20);

#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub cooldown: Duration,
    pub resolve_retries: u32,
    pub resolve_delay: Duration,
    pub default_font_size: u32,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_millis(500),
            resolve_retries: 5,
            resolve_delay: Duration::from_millis(300),
            default_font_size: 16,
        }
    }
}

/// The callback target for window notifications. Classifies each event,
/// applies cheap registry/window mutations synchronously and hands anything
/// that could block (path resolution) to a detached worker. Nothing in here
/// may wait on the browser process: this runs on the thread the OS delivers
/// notifications to, which serves every tracked pair.
pub struct EventRouter {
    registry: Arc<OverlayRegistry>,
    cooldown: Arc<CooldownGovernor>,
    ops: Arc<dyn WindowOps>,
    paths: Arc<dyn PathSource>,
    config: RouterConfig,
}

impl EventRouter {
    pub fn new(
        registry: Arc<OverlayRegistry>,
        cooldown: Arc<CooldownGovernor>,
        ops: Arc<dyn WindowOps>,
        paths: Arc<dyn PathSource>,
        config: RouterConfig,
    ) -> Self {
        Self {
            registry,
            cooldown,
            ops,
            paths,
            config,
        }
    }

    pub fn handle_event(&self, kind: EventKind, window: WindowId) {
        match classify(kind) {
            RouterAction::Adopt => {
                // Validity checks are only meaningful here; a dying window
                // must still get through to the teardown branch below.
                if !self.ops.is_window(window) || !self.ops.is_target_window(window) {
                    return;
                }
                self.adopt(window);
            }
            RouterAction::Teardown => {
                tracing::debug!(%window, "destroy event, tearing down");
                self.teardown(window);
                self.cooldown.arm(self.config.cooldown);
            }
            RouterAction::Conceal => {
                let Some(pair) = self.registry.get(window) else {
                    return;
                };
                self.ops.hide_overlay(pair.overlay);
                if !self.ops.is_window(window) {
                    // Hidden and already invalid: same as a destroy.
                    self.teardown(window);
                    self.cooldown.arm(self.config.cooldown);
                }
            }
            RouterAction::Reposition => {
                if self.cooldown.is_armed() {
                    self.defer(kind, window);
                    return;
                }
                if !self.ops.is_window(window) {
                    return;
                }
                if let Some(pair) = self.registry.get(window) {
                    self.ops.sync_position(&pair);
                }
            }
            RouterAction::ResolvePath => {
                if self.cooldown.is_armed() {
                    self.defer(kind, window);
                    return;
                }
                if !self.ops.is_window(window) || !self.ops.is_visible(window) {
                    return;
                }
                if let Some(pair) = self.registry.get(window) {
                    self.spawn_resolver(window, pair.overlay);
                }
            }
        }
    }

    /// Start tracking `browser`: create its overlay (hidden, default
    /// geometry), register the pair and kick off path resolution. Shared by
    /// the create/show events and the discovery sweep; the registry's insert
    /// semantics make the two paths idempotent.
    pub fn adopt(&self, browser: WindowId) -> bool {
        if self.registry.contains(browser) {
            return false;
        }
        let Some(overlay) = self.ops.create_overlay(browser) else {
            tracing::warn!(%browser, "overlay creation failed");
            return false;
        };
        let pair = TrackedPair::new(browser, overlay, self.config.default_font_size);
        if !self.registry.insert(pair.clone()) {
            // Lost the insert race; this overlay has no pair to live in.
            self.ops.destroy_overlay(overlay);
            return false;
        }
        tracing::info!(%browser, %overlay, "tracking new browser window");
        self.ops.sync_position(&pair);
        self.spawn_resolver(browser, overlay);
        true
    }

    /// Re-resolve the folder path for a tracked pair. Used by the overlay
    /// surface after the user creates a memo file.
    pub fn request_resolve(&self, browser: WindowId) {
        if let Some(pair) = self.registry.get(browser) {
            self.spawn_resolver(browser, pair.overlay);
        }
    }

    /// Remove the pair for `window` plus any pair whose browser handle has
    /// silently died. No validity check on `window` itself: destroy events
    /// arrive exactly when that check would fail.
    fn teardown(&self, window: WindowId) {
        for pair in self.registry.snapshot() {
            if pair.browser != window && self.ops.is_window(pair.browser) {
                continue;
            }
            if self.registry.remove(pair.browser).is_some() {
                // Hide first so the overlay vanishes with its owner instead
                // of lingering until DestroyWindow completes.
                self.ops.hide_overlay(pair.overlay);
                self.ops.destroy_overlay(pair.overlay);
                tracing::info!(browser = %pair.browser, overlay = %pair.overlay, "pair removed");
            }
        }
    }

    /// Re-issue the event after the cooldown deadline by posting a
    /// safety-recheck through the pair's own message queue. Deferred, not
    /// dropped.
    fn defer(&self, kind: EventKind, window: WindowId) {
        let Some(pair) = self.registry.get(window) else {
            return;
        };
        let wait = self.cooldown.remaining().unwrap_or_default() + DEFER_GRACE;
        tracing::debug!(%window, ?kind, ?wait, "cooldown armed, deferring");
        let ops = Arc::clone(&self.ops);
        let overlay = pair.overlay;
        thread::spawn(move || {
            thread::sleep(wait);
            ops.post_safety_recheck(overlay, kind);
        });
    }

    fn spawn_resolver(&self, browser: WindowId, overlay: WindowId) {
        worker::spawn(
            Arc::clone(&self.registry),
            Arc::clone(&self.ops),
            Arc::clone(&self.paths),
            browser,
            overlay,
            self.config.resolve_retries,
            self.config.resolve_delay,
        );
    }
}
