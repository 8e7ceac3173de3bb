use windows::Win32::Foundation::{BOOL, HWND, LPARAM, RECT, WPARAM};
use windows::Win32::Graphics::Dwm::{DwmGetWindowAttribute, DWMWA_EXTENDED_FRAME_BOUNDS};
use windows::Win32::UI::WindowsAndMessaging::{
    DestroyWindow, EnumWindows, GetWindowRect, PostMessageW, SetWindowPos, ShowWindow,
    SWP_NOACTIVATE, SWP_NOZORDER, SWP_SHOWWINDOW, SW_HIDE,
};

use crate::events::EventKind;
use crate::ops::WindowOps;
use crate::overlay;
use crate::placement::{self, Frame, OverlayGeometry};
use crate::registry::{TrackedPair, WindowId};
use crate::win_util;

/// `WindowOps` over the live Win32 window system. All methods that mutate
/// window state are only ever called on the UI thread; workers go through the
/// posting methods, which are thread-safe by construction.
pub struct Win32WindowOps {
    geometry: OverlayGeometry,
}

impl Win32WindowOps {
    pub fn new(geometry: OverlayGeometry) -> Self {
        Self { geometry }
    }
}

/// The owner's on-screen frame. DWM reports the bounds without the invisible
/// resize borders; plain GetWindowRect is the fallback when DWM refuses.
fn frame_bounds(hwnd: HWND) -> Option<Frame> {
    let mut rect = RECT::default();
    let dwm = unsafe {
        DwmGetWindowAttribute(
            hwnd,
            DWMWA_EXTENDED_FRAME_BOUNDS,
            &mut rect as *mut RECT as *mut core::ffi::c_void,
            std::mem::size_of::<RECT>() as u32,
        )
    };
    if dwm.is_err() && unsafe { GetWindowRect(hwnd, &mut rect) }.is_err() {
        return None;
    }
    Some(Frame {
        left: rect.left,
        top: rect.top,
        right: rect.right,
        bottom: rect.bottom,
    })
}

impl WindowOps for Win32WindowOps {
    fn is_window(&self, id: WindowId) -> bool {
        win_util::is_window(id)
    }

    fn is_target_window(&self, id: WindowId) -> bool {
        win_util::is_target_class(win_util::hwnd(id))
    }

    fn is_visible(&self, id: WindowId) -> bool {
        win_util::is_window_visible(id)
    }

    fn create_overlay(&self, owner: WindowId) -> Option<WindowId> {
        match overlay::create(win_util::hwnd(owner)) {
            Ok(hwnd) => Some(win_util::window_id(hwnd)),
            Err(err) => {
                tracing::warn!(%owner, %err, "overlay creation failed");
                None
            }
        }
    }

    fn destroy_overlay(&self, id: WindowId) {
        unsafe {
            let _ = DestroyWindow(win_util::hwnd(id));
        }
    }

    fn hide_overlay(&self, id: WindowId) {
        unsafe {
            let _ = ShowWindow(win_util::hwnd(id), SW_HIDE);
        }
    }

    fn sync_position(&self, pair: &TrackedPair) {
        if !win_util::is_window(pair.browser) {
            return;
        }
        let Some(owner) = frame_bounds(win_util::hwnd(pair.browser)) else {
            return;
        };
        let (x, y, w, h) = placement::overlay_rect(owner, pair, self.geometry);
        unsafe {
            // No z-order change: the owner relationship keeps the overlay
            // above its Explorer window while the OS manages stacking.
            let _ = SetWindowPos(
                win_util::hwnd(pair.overlay),
                None,
                x,
                y,
                w,
                h,
                SWP_NOACTIVATE | SWP_NOZORDER | SWP_SHOWWINDOW,
            );
        }
        overlay::set_edit_visible(
            win_util::hwnd(pair.overlay),
            !placement::badge_mode(pair),
        );
    }

    fn post_path_resolved(&self, overlay: WindowId, note_exists: bool) {
        unsafe {
            // A post to a destroyed overlay fails; that race is benign.
            let _ = PostMessageW(
                win_util::hwnd(overlay),
                crate::overlay::WM_APP_PATH_RESOLVED,
                WPARAM(usize::from(note_exists)),
                LPARAM(0),
            );
        }
    }

    fn post_safety_recheck(&self, overlay: WindowId, kind: EventKind) {
        unsafe {
            let _ = PostMessageW(
                win_util::hwnd(overlay),
                crate::overlay::WM_APP_SAFETY_RECHECK,
                WPARAM(0),
                LPARAM(isize::from(kind.to_raw())),
            );
        }
    }

    fn enumerate_targets(&self) -> Vec<WindowId> {
        unsafe extern "system" fn enum_cb(hwnd: HWND, lparam: LPARAM) -> BOOL {
            let out = &mut *(lparam.0 as *mut Vec<WindowId>);
            if win_util::is_target_class(hwnd) {
                out.push(win_util::window_id(hwnd));
            }
            BOOL(1)
        }
        let mut out: Vec<WindowId> = Vec::new();
        unsafe {
            let out_ptr = &mut out as *mut Vec<WindowId>;
            let _ = EnumWindows(Some(enum_cb), LPARAM(out_ptr as isize));
        }
        out
    }
}
