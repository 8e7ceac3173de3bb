/// Window notifications the engine reacts to, abstracted away from the raw
/// WinEvent constants so the router and its tests never touch FFI types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Created,
    Shown,
    Hidden,
    /// The window was covered by the compositor (DWM "cloaked"), e.g. when a
    /// tab is merged into another frame.
    Cloaked,
    Destroyed,
    LocationChanged,
    NameChanged,
    ForegroundChanged,
}

impl EventKind {
    /// Stable wire value used when an event kind travels through a posted
    /// window message (the safety-recheck path).
    pub fn to_raw(self) -> u8 {
        match self {
            EventKind::Created => 0,
            EventKind::Shown => 1,
            EventKind::Hidden => 2,
            EventKind::Cloaked => 3,
            EventKind::Destroyed => 4,
            EventKind::LocationChanged => 5,
            EventKind::NameChanged => 6,
            EventKind::ForegroundChanged => 7,
        }
    }

    pub fn from_raw(raw: u8) -> Option<Self> {
        Some(match raw {
            0 => EventKind::Created,
            1 => EventKind::Shown,
            2 => EventKind::Hidden,
            3 => EventKind::Cloaked,
            4 => EventKind::Destroyed,
            5 => EventKind::LocationChanged,
            6 => EventKind::NameChanged,
            7 => EventKind::ForegroundChanged,
            _ => return None,
        })
    }
}

/// What the router does with a notification. One explicit mapping instead of
/// a chain of event hooks whose behavior depends on registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterAction {
    /// Start tracking the window: create its overlay and resolve its path.
    Adopt,
    /// The window is gone (or going): tear the pair down.
    Teardown,
    /// The window left the screen but may come back: hide the overlay.
    Conceal,
    /// The window moved or changed focus: follow it. Cheap and synchronous.
    Reposition,
    /// The displayed folder may have changed: re-resolve asynchronously.
    ResolvePath,
}

pub fn classify(kind: EventKind) -> RouterAction {
    match kind {
        EventKind::Created | EventKind::Shown => RouterAction::Adopt,
        EventKind::Destroyed => RouterAction::Teardown,
        EventKind::Hidden | EventKind::Cloaked => RouterAction::Conceal,
        EventKind::LocationChanged | EventKind::ForegroundChanged => RouterAction::Reposition,
        EventKind::NameChanged => RouterAction::ResolvePath,
    }
}
