use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;

pub const MIN_FONT_SIZE: u32 = 8;
pub const MAX_FONT_SIZE: u32 = 72;

/// Identity of a native window, detached from any platform handle type so it
/// can cross threads freely. On Windows this is the HWND value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowId(pub isize);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// One tracked Explorer window and the memo overlay bound to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedPair {
    /// The Explorer window being followed. Primary key in the registry.
    pub browser: WindowId,
    /// The overlay window owned by this pair. Created and destroyed only by
    /// the tracking engine.
    pub overlay: WindowId,
    /// Folder currently displayed by the browser. `None` until a path-finder
    /// worker has resolved it.
    pub resolved_path: Option<PathBuf>,
    /// Whether a memo file exists inside `resolved_path`. Cached by the
    /// worker that resolved the path.
    pub note_exists: bool,
    /// User collapsed the overlay down to its badge.
    pub collapsed: bool,
    /// User enlarged the overlay beyond its normal panel size.
    pub expanded: bool,
    pub font_size: u32,
}

impl TrackedPair {
    pub fn new(browser: WindowId, overlay: WindowId, font_size: u32) -> Self {
        Self {
            browser,
            overlay,
            resolved_path: None,
            note_exists: false,
            collapsed: false,
            expanded: false,
            font_size: clamp_font_size(font_size),
        }
    }

    pub fn set_font_size(&mut self, size: u32) {
        self.font_size = clamp_font_size(size);
    }
}

pub fn clamp_font_size(size: u32) -> u32 {
    size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}

/// Shared map of tracked pairs, keyed by the browser window. This is the
/// single source of truth for every other engine component.
///
/// The lock is held only for the duration of a map operation, never across a
/// window-system or COM call.
#[derive(Default)]
pub struct OverlayRegistry {
    pairs: Mutex<HashMap<WindowId, TrackedPair>>,
}

impl OverlayRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new pair. Returns `false` without touching the map when the
    /// browser window is already tracked, which is what makes the router's
    /// and the discovery sweep's creation paths idempotent.
    pub fn insert(&self, pair: TrackedPair) -> bool {
        let mut pairs = self.pairs.lock().unwrap();
        if pairs.contains_key(&pair.browser) {
            return false;
        }
        pairs.insert(pair.browser, pair);
        true
    }

    pub fn contains(&self, browser: WindowId) -> bool {
        self.pairs.lock().unwrap().contains_key(&browser)
    }

    pub fn get(&self, browser: WindowId) -> Option<TrackedPair> {
        self.pairs.lock().unwrap().get(&browser).cloned()
    }

    pub fn find_by_overlay(&self, overlay: WindowId) -> Option<TrackedPair> {
        self.pairs
            .lock()
            .unwrap()
            .values()
            .find(|p| p.overlay == overlay)
            .cloned()
    }

    pub fn remove(&self, browser: WindowId) -> Option<TrackedPair> {
        self.pairs.lock().unwrap().remove(&browser)
    }

    /// Mutate the pair for `browser` in place. Returns `false` when the pair
    /// is no longer tracked.
    pub fn update<F>(&self, browser: WindowId, f: F) -> bool
    where
        F: FnOnce(&mut TrackedPair),
    {
        let mut pairs = self.pairs.lock().unwrap();
        match pairs.get_mut(&browser) {
            Some(pair) => {
                f(pair);
                true
            }
            None => false,
        }
    }

    pub fn update_by_overlay<F>(&self, overlay: WindowId, f: F) -> bool
    where
        F: FnOnce(&mut TrackedPair),
    {
        let mut pairs = self.pairs.lock().unwrap();
        match pairs.values_mut().find(|p| p.overlay == overlay) {
            Some(pair) => {
                f(pair);
                true
            }
            None => false,
        }
    }

    /// Clone the current set of pairs so callers can iterate without holding
    /// the lock across whatever they do per pair.
    pub fn snapshot(&self) -> Vec<TrackedPair> {
        self.pairs.lock().unwrap().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.pairs.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_rejects_duplicate_browser() {
        let reg = OverlayRegistry::new();
        assert!(reg.insert(TrackedPair::new(WindowId(1), WindowId(10), 16)));
        assert!(!reg.insert(TrackedPair::new(WindowId(1), WindowId(11), 16)));
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.get(WindowId(1)).unwrap().overlay, WindowId(10));
    }

    #[test]
    fn remove_returns_pair_once() {
        let reg = OverlayRegistry::new();
        reg.insert(TrackedPair::new(WindowId(2), WindowId(20), 16));
        assert!(reg.remove(WindowId(2)).is_some());
        assert!(reg.remove(WindowId(2)).is_none());
        assert!(reg.is_empty());
    }

    #[test]
    fn update_mutates_in_place() {
        let reg = OverlayRegistry::new();
        reg.insert(TrackedPair::new(WindowId(3), WindowId(30), 16));
        assert!(reg.update(WindowId(3), |p| {
            p.resolved_path = Some(PathBuf::from("C:\\Users"));
            p.note_exists = true;
        }));
        let pair = reg.get(WindowId(3)).unwrap();
        assert_eq!(pair.resolved_path.as_deref(), Some(std::path::Path::new("C:\\Users")));
        assert!(pair.note_exists);
        assert!(!reg.update(WindowId(99), |_| {}));
    }

    #[test]
    fn find_by_overlay_matches_secondary_key() {
        let reg = OverlayRegistry::new();
        reg.insert(TrackedPair::new(WindowId(4), WindowId(40), 16));
        reg.insert(TrackedPair::new(WindowId(5), WindowId(50), 16));
        assert_eq!(reg.find_by_overlay(WindowId(50)).unwrap().browser, WindowId(5));
        assert!(reg.find_by_overlay(WindowId(60)).is_none());
    }

    #[test]
    fn font_size_is_clamped() {
        let mut pair = TrackedPair::new(WindowId(6), WindowId(60), 200);
        assert_eq!(pair.font_size, MAX_FONT_SIZE);
        pair.set_font_size(1);
        assert_eq!(pair.font_size, MIN_FONT_SIZE);
        pair.set_font_size(20);
        assert_eq!(pair.font_size, 20);
    }
}
