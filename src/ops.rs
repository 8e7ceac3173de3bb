use std::path::PathBuf;

use crate::events::EventKind;
use crate::registry::{TrackedPair, WindowId};

/// Everything the engine needs from the native window system. The Win32
/// implementation lives in `win_ops`; tests drive the engine through mocks.
///
/// Implementations must tolerate stale ids: any operation on a window that no
/// longer exists is a no-op, never an error.
pub trait WindowOps: Send + Sync {
    /// Does the handle still refer to a live window?
    fn is_window(&self, id: WindowId) -> bool;
    /// Is this a window of the tracked class (a file-browser frame)?
    fn is_target_window(&self, id: WindowId) -> bool;
    fn is_visible(&self, id: WindowId) -> bool;

    /// Create a hidden overlay window owned by `owner`. `None` when creation
    /// fails (e.g. the owner died in the meantime).
    fn create_overlay(&self, owner: WindowId) -> Option<WindowId>;
    fn destroy_overlay(&self, id: WindowId);
    /// Hide immediately, without waiting for teardown.
    fn hide_overlay(&self, id: WindowId);
    /// Place the overlay next to its browser's current frame and apply the
    /// pair's display mode.
    fn sync_position(&self, pair: &TrackedPair);

    /// Post path-resolution-complete into the overlay's message queue. Posts
    /// to an already destroyed overlay are silently discarded.
    fn post_path_resolved(&self, overlay: WindowId, note_exists: bool);
    /// Post safety-recheck so router logic re-runs for this pair on the UI
    /// thread once the cooldown has passed.
    fn post_safety_recheck(&self, overlay: WindowId, kind: EventKind);

    /// All currently open top-level windows of the tracked class.
    fn enumerate_targets(&self) -> Vec<WindowId>;
}

/// Resolves the folder a browser window currently displays. Implementations
/// may block (the shell automation call can hang with the browser), which is
/// why the engine only calls this from worker threads.
pub trait PathSource: Send + Sync {
    fn resolve(&self, browser: WindowId) -> Option<PathBuf>;
}
