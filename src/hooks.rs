use windows::Win32::Foundation::HWND;
use windows::Win32::UI::Accessibility::{SetWinEventHook, UnhookWinEvent, HWINEVENTHOOK};
use windows::Win32::UI::WindowsAndMessaging::{
    CHILDID_SELF, EVENT_OBJECT_CLOAKED, EVENT_OBJECT_CREATE, EVENT_OBJECT_DESTROY,
    EVENT_OBJECT_HIDE, EVENT_OBJECT_LOCATIONCHANGE, EVENT_OBJECT_NAMECHANGE, EVENT_OBJECT_SHOW,
    EVENT_SYSTEM_FOREGROUND, OBJID_WINDOW, WINEVENT_OUTOFCONTEXT, WINEVENT_SKIPOWNPROCESS,
};

use crate::engine;
use crate::events::EventKind;
use crate::win_util;

/// The installed WinEvent hooks. Narrow ranges on purpose: subscribing to
/// everything floods the callback with state-change noise and stalls the
/// message loop.
pub struct EventHooks {
    hooks: Vec<HWINEVENTHOOK>,
}

pub fn install() -> anyhow::Result<EventHooks> {
    let ranges = [
        // Window lifecycle: create, destroy, show, hide.
        (EVENT_OBJECT_CREATE, EVENT_OBJECT_HIDE),
        // Movement and navigation: location change, name change.
        (EVENT_OBJECT_LOCATIONCHANGE, EVENT_OBJECT_NAMECHANGE),
        // Tab merge / compositor hiding.
        (EVENT_OBJECT_CLOAKED, EVENT_OBJECT_CLOAKED),
        // Focus moves between windows.
        (EVENT_SYSTEM_FOREGROUND, EVENT_SYSTEM_FOREGROUND),
    ];
    let mut hooks = Vec::with_capacity(ranges.len());
    for (min, max) in ranges {
        let hook = unsafe {
            SetWinEventHook(
                min,
                max,
                None,
                Some(win_event_proc),
                0,
                0,
                WINEVENT_OUTOFCONTEXT | WINEVENT_SKIPOWNPROCESS,
            )
        };
        if hook.is_invalid() {
            for hook in hooks {
                unsafe {
                    let _ = UnhookWinEvent(hook);
                }
            }
            anyhow::bail!("SetWinEventHook failed for range {min:#x}..{max:#x}");
        }
        hooks.push(hook);
    }
    tracing::info!(count = hooks.len(), "window event hooks installed");
    Ok(EventHooks { hooks })
}

impl EventHooks {
    pub fn uninstall(self) {
        for hook in &self.hooks {
            unsafe {
                let _ = UnhookWinEvent(*hook);
            }
        }
    }
}

fn map_event(event: u32) -> Option<EventKind> {
    Some(match event {
        e if e == EVENT_OBJECT_CREATE => EventKind::Created,
        e if e == EVENT_OBJECT_SHOW => EventKind::Shown,
        e if e == EVENT_OBJECT_HIDE => EventKind::Hidden,
        e if e == EVENT_OBJECT_CLOAKED => EventKind::Cloaked,
        e if e == EVENT_OBJECT_DESTROY => EventKind::Destroyed,
        e if e == EVENT_OBJECT_LOCATIONCHANGE => EventKind::LocationChanged,
        e if e == EVENT_OBJECT_NAMECHANGE => EventKind::NameChanged,
        e if e == EVENT_SYSTEM_FOREGROUND => EventKind::ForegroundChanged,
        _ => return None,
    })
}

/// Delivered on the thread that installed the hooks (the UI thread's message
/// loop). Filters down to whole-window notifications and forwards to the
/// router; no validity check here, because destroy events arrive for handles
/// that are already dead.
unsafe extern "system" fn win_event_proc(
    _hook: HWINEVENTHOOK,
    event: u32,
    hwnd: HWND,
    id_object: i32,
    id_child: i32,
    _id_event_thread: u32,
    _time: u32,
) {
    if id_object != OBJID_WINDOW.0 || id_child != CHILDID_SELF as i32 {
        return;
    }
    let Some(kind) = map_event(event) else {
        return;
    };
    if let Some(engine) = engine::get() {
        engine.router.handle_event(kind, win_util::window_id(hwnd));
    }
}
