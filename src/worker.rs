use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::notes;
use crate::ops::{PathSource, WindowOps};
use crate::registry::{OverlayRegistry, WindowId};

/// Spawn a detached path-finder task for one resolution request. Explorer can
/// take over a second to produce a path after opening or switching tabs, so
/// this never runs on the notification thread. The task is not joined and not
/// cancelled; it stops on its own when the browser handle dies.
pub fn spawn(
    registry: Arc<OverlayRegistry>,
    ops: Arc<dyn WindowOps>,
    paths: Arc<dyn PathSource>,
    browser: WindowId,
    overlay: WindowId,
    retries: u32,
    delay: Duration,
) {
    let spawned = thread::Builder::new()
        .name("path-finder".into())
        .spawn(move || run(&registry, ops.as_ref(), paths.as_ref(), browser, overlay, retries, delay));
    if let Err(err) = spawned {
        tracing::warn!(%browser, %err, "failed to spawn path-finder");
    }
}

/// Worker body. Retries resolution with a fixed delay, then applies whatever
/// it found: the registry write happens before the completion message is
/// posted, so the UI thread handling that message always sees the new state.
pub fn run(
    registry: &OverlayRegistry,
    ops: &dyn WindowOps,
    paths: &dyn PathSource,
    browser: WindowId,
    overlay: WindowId,
    retries: u32,
    delay: Duration,
) {
    let mut resolved = None;
    for attempt in 0..retries {
        if !ops.is_window(browser) {
            tracing::debug!(%browser, "browser gone, abandoning resolution");
            return;
        }
        match paths.resolve(browser) {
            Some(path) => {
                tracing::debug!(%browser, path = %path.display(), attempt, "path resolved");
                resolved = Some(path);
                break;
            }
            None if attempt + 1 < retries => thread::sleep(delay),
            None => {}
        }
    }
    if resolved.is_none() {
        tracing::debug!(%browser, retries, "path still unknown after retries");
    }

    let note_exists = resolved
        .as_deref()
        .map(|folder| notes::note_path(folder).exists())
        .unwrap_or(false);

    let updated = registry.update(browser, |pair| {
        pair.resolved_path = resolved.clone();
        pair.note_exists = note_exists;
        if note_exists {
            // A folder with a memo gets the full panel right away.
            pair.collapsed = false;
        }
    });
    if updated {
        ops.post_path_resolved(overlay, note_exists);
    }
}
