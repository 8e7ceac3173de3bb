use crate::registry::TrackedPair;

/// Screen-space frame of a window, in the coordinate convention of the host
/// window system (left/top inclusive, right/bottom exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

/// Overlay geometry knobs, taken from settings.
#[derive(Debug, Clone, Copy)]
pub struct OverlayGeometry {
    /// Normal panel size.
    pub panel: (i32, i32),
    /// Enlarged panel size.
    pub expanded: (i32, i32),
    /// Square badge shown while collapsed or while no memo file exists.
    pub badge: i32,
    /// Distance from the owner's bottom-right corner.
    pub margin: i32,
}

impl Default for OverlayGeometry {
    fn default() -> Self {
        Self {
            panel: (400, 600),
            expanded: (560, 800),
            badge: 40,
            margin: 25,
        }
    }
}

/// True when the overlay shows only its badge: collapsed by the user, or no
/// memo file exists yet for the resolved folder.
pub fn badge_mode(pair: &TrackedPair) -> bool {
    pair.collapsed || !pair.note_exists
}

/// Where the overlay belongs relative to its owner's frame: anchored at the
/// owner's bottom-right corner, inset by the margin. Returns (x, y, w, h).
pub fn overlay_rect(owner: Frame, pair: &TrackedPair, geometry: OverlayGeometry) -> (i32, i32, i32, i32) {
    let (w, h) = if badge_mode(pair) {
        (geometry.badge, geometry.badge)
    } else if pair.expanded {
        geometry.expanded
    } else {
        geometry.panel
    };
    let x = owner.right - w - geometry.margin;
    let y = owner.bottom - h - geometry.margin;
    (x, y, w, h)
}
